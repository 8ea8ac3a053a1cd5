//! Resilience features for CRM API interactions
//!
//! Provides the retry policy and timeout configuration used by the CRM
//! client's request primitive.

pub mod config;
pub mod retry;

pub use config::ResilienceConfig;
