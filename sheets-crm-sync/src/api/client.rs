//! REST CRM client
//!
//! All calls go through a single retry-wrapped request primitive. Each
//! attempt is classified as success, rejection or transient failure; only
//! transient failures are retried, with linear backoff between attempts.

use log::{debug, warn};
use serde_json::Value;

use super::error::CrmError;
use super::models::{CrmRecord, LookupBody, Payload};
use super::resilience::ResilienceConfig;
use super::transport::{CrmRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
use crate::config::CrmConfig;

const CONTACTS: &str = "contacts";

/// Classified result of one attempt
#[derive(Debug)]
enum Attempt {
    /// 2xx response
    Success(HttpResponse),
    /// Non-transient, non-2xx response; returned to the caller as-is
    Rejected(HttpResponse),
    /// Retryable status or network failure
    Transient(String),
}

pub struct CrmClient<T = ReqwestTransport> {
    base_url: String,
    transport: T,
    resilience: ResilienceConfig,
}

impl CrmClient<ReqwestTransport> {
    /// Create a client talking HTTP through reqwest
    pub fn from_config(config: &CrmConfig) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(
            &config.base_url,
            transport,
            config.resilience.clone(),
        ))
    }
}

impl<T: Transport> CrmClient<T> {
    pub fn new(base_url: &str, transport: T, resilience: ResilienceConfig) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            resilience,
        }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    fn classify(&self, result: Result<HttpResponse, TransportError>) -> Attempt {
        match result {
            Ok(response) if self.resilience.retry.is_transient_status(response.status) => {
                Attempt::Transient(format!("HTTP {}", response.status))
            }
            Ok(response) if response.is_success() => Attempt::Success(response),
            Ok(response) => Attempt::Rejected(response),
            Err(err) => Attempt::Transient(err.to_string()),
        }
    }

    /// Send a request, retrying transient failures
    ///
    /// Returns the first non-transient response, whatever its status.
    pub async fn request(&self, request: &CrmRequest) -> Result<HttpResponse, CrmError> {
        let retry = &self.resilience.retry;
        let attempts = retry.attempts();
        let mut last_cause = String::new();

        for attempt in 1..=attempts {
            if self.resilience.request_logging {
                debug!(
                    "{} {} (attempt {}/{})",
                    request.method, request.url, attempt, attempts
                );
            }

            match self.classify(self.transport.send(request).await) {
                Attempt::Success(response) | Attempt::Rejected(response) => {
                    if self.resilience.request_logging {
                        debug!("{} {} -> {}", request.method, request.url, response.status);
                    }
                    return Ok(response);
                }
                Attempt::Transient(cause) => {
                    warn!(
                        "Transient CRM failure on {} {} (attempt {}/{}): {}",
                        request.method, request.url, attempt, attempts, cause
                    );
                    last_cause = cause;
                    if retry.has_attempt_after(attempt) {
                        tokio::time::sleep(retry.delay_for_attempt(attempt)).await;
                    }
                }
            }
        }

        Err(CrmError::RequestFailed {
            attempts,
            last_cause,
        })
    }

    fn ensure_success(request: &CrmRequest, response: &HttpResponse) -> Result<(), CrmError> {
        if response.is_success() {
            Ok(())
        } else {
            Err(CrmError::HttpError {
                status: response.status,
                method: request.method.to_string(),
                url: request.url.clone(),
            })
        }
    }

    /// Look up a contact by a unique key, returning the first match
    pub async fn find_by_key(
        &self,
        key_name: &str,
        key_value: &str,
    ) -> Result<Option<CrmRecord>, CrmError> {
        let request =
            CrmRequest::get(self.collection_url(CONTACTS)).with_query(key_name, key_value);
        let response = self.request(&request).await?;

        if response.status == 404 {
            return Ok(None);
        }
        Self::ensure_success(&request, &response)?;

        let body: LookupBody =
            serde_json::from_str(&response.body).map_err(|source| CrmError::InvalidResponse {
                url: request.url.clone(),
                source,
            })?;
        Ok(body.first_record())
    }

    /// Patch a contact with the given fields
    pub async fn update_record(&self, record_id: &str, payload: &Payload) -> Result<(), CrmError> {
        let url = format!(
            "{}/{}",
            self.collection_url(CONTACTS),
            urlencoding::encode(record_id)
        );
        let body: serde_json::Map<String, Value> = payload
            .iter()
            .map(|(field, value)| (field.clone(), Value::String(value.clone())))
            .collect();
        let request = CrmRequest::patch(url, Value::Object(body));

        let response = self.request(&request).await?;
        Self::ensure_success(&request, &response)
    }
}
