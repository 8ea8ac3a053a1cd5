//! REST CRM API module
//!
//! Contact lookup by unique key and contact updates, with retrying of
//! transient failures behind a pluggable HTTP transport.

pub mod client;
pub mod error;
pub mod models;
pub mod resilience;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::CrmClient;
pub use error::CrmError;
pub use models::Payload;
pub use resilience::ResilienceConfig;
pub use transport::Transport;
