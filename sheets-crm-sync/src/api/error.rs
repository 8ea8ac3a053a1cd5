//! CRM client errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrmError {
    /// Every attempt ended in a transient failure
    #[error("CRM request failed after {attempts} attempts: {last_cause}")]
    RequestFailed { attempts: u32, last_cause: String },

    /// Non-transient, non-success HTTP status
    #[error("CRM returned HTTP {status} for {method} {url}")]
    HttpError {
        status: u16,
        method: String,
        url: String,
    },

    #[error("Invalid CRM response from {url}: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CrmError {
    /// HTTP status carried by the error, if any
    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            CrmError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
