//! Run configuration
//!
//! Built once at startup from the environment (after the `.env` file has been
//! loaded) and passed by reference to every component.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::api::ResilienceConfig;

pub const DEFAULT_SHEETS_RANGE: &str = "Sheet1!A1:Z";
pub const DEFAULT_UNIQUE_KEY_COLUMN: &str = "email";
pub const DEFAULT_LOG_PATH: &str = "out/sync_log.csv";

/// Configuration problems detected before any I/O
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing Google Sheets config. Fill .env")]
    MissingSheets,

    #[error("Missing CRM config. Fill .env")]
    MissingCrm,

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Google Sheets source settings
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Path to the service-account JSON key file
    pub service_account_json: PathBuf,
    pub spreadsheet_id: String,
    /// A1 notation, e.g. `Sheet1!A1:Z`
    pub range: String,
}

/// CRM REST API settings
#[derive(Debug, Clone)]
pub struct CrmConfig {
    pub base_url: String,
    pub token: String,
    pub resilience: ResilienceConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sheets: SheetsConfig,
    pub crm: CrmConfig,
    /// Spreadsheet column matched against the CRM record key of the same name
    pub unique_key_column: String,
    pub log_path: PathBuf,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name: &str| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<L>(lookup: &L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let service_account_json = lookup_non_empty(lookup, "GOOGLE_SERVICE_ACCOUNT_JSON");
        let spreadsheet_id = lookup_non_empty(lookup, "GOOGLE_SHEETS_SPREADSHEET_ID");
        let (Some(service_account_json), Some(spreadsheet_id)) =
            (service_account_json, spreadsheet_id)
        else {
            return Err(ConfigError::MissingSheets);
        };

        let base_url = lookup_non_empty(lookup, "CRM_BASE_URL");
        let token = lookup_non_empty(lookup, "CRM_TOKEN");
        let (Some(base_url), Some(token)) = (base_url, token) else {
            return Err(ConfigError::MissingCrm);
        };

        Ok(Self {
            sheets: SheetsConfig {
                service_account_json: PathBuf::from(service_account_json),
                spreadsheet_id,
                range: lookup_non_empty(lookup, "GOOGLE_SHEETS_RANGE")
                    .unwrap_or_else(|| DEFAULT_SHEETS_RANGE.to_string()),
            },
            crm: CrmConfig {
                base_url,
                token,
                resilience: ResilienceConfig::from_lookup(lookup)?,
            },
            unique_key_column: lookup_non_empty(lookup, "UNIQUE_KEY_COLUMN")
                .unwrap_or_else(|| DEFAULT_UNIQUE_KEY_COLUMN.to_string()),
            log_path: lookup_non_empty(lookup, "LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH)),
        })
    }
}

fn lookup_non_empty<L>(lookup: &L, name: &str) -> Option<String>
where
    L: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

/// Look up and parse an optional variable
pub(crate) fn lookup_parsed<T, L>(lookup: &L, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    L: Fn(&str) -> Option<String>,
{
    match lookup_non_empty(lookup, name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}
