//! Google Sheets source
//!
//! Authenticates with a service account, fetches one value range and turns
//! it into header-keyed rows.

pub mod auth;
pub mod reader;
pub mod rows;

pub use reader::fetch_sheet_rows;
pub use rows::SheetRow;
