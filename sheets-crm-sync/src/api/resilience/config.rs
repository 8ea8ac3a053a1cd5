//! Resilience configuration
//!
//! Retry policy and request timeout, with defaults overridable from the
//! environment.

use super::retry::RetryConfig;
use crate::config::{ConfigError, lookup_parsed};
use std::time::Duration;

/// Resilience configuration for CRM API operations
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    /// Timeout applied to every single HTTP request
    pub request_timeout: Duration,
    /// Log every request and its classified outcome at debug level
    pub request_logging: bool,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(30),
            request_logging: true,
        }
    }
}

impl ResilienceConfig {
    /// Load resilience settings from environment-style variables
    ///
    /// Unset variables keep their defaults; unparsable ones are rejected.
    pub fn from_lookup<L>(lookup: &L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout_secs: Option<u64> = lookup_parsed(lookup, "CRM_TIMEOUT_SECS")?;
        let max_attempts: Option<u32> = lookup_parsed(lookup, "CRM_MAX_ATTEMPTS")?;
        let base_delay_ms: Option<u64> = lookup_parsed(lookup, "CRM_RETRY_BASE_DELAY_MS")?;

        Ok(Self {
            retry: RetryConfig {
                max_attempts: max_attempts.unwrap_or(defaults.retry.max_attempts),
                base_delay: base_delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.base_delay),
                ..defaults.retry
            },
            request_timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            request_logging: defaults.request_logging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ResilienceConfig::default();

        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(1500));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.request_logging);
    }

    #[test]
    fn test_from_lookup_uses_defaults_when_unset() {
        let config = ResilienceConfig::from_lookup(&lookup_from(&[])).unwrap();

        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let lookup = lookup_from(&[
            ("CRM_TIMEOUT_SECS", "10"),
            ("CRM_MAX_ATTEMPTS", "2"),
            ("CRM_RETRY_BASE_DELAY_MS", "250"),
        ]);
        let config = ResilienceConfig::from_lookup(&lookup).unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.base_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let lookup = lookup_from(&[("CRM_MAX_ATTEMPTS", "many")]);
        let err = ResilienceConfig::from_lookup(&lookup).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: "CRM_MAX_ATTEMPTS", .. }
        ));
    }
}
