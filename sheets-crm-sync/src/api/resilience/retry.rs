//! Retry policy for transient CRM failures
//!
//! Backoff is linear: after failed attempt `n` (1-based) the client waits
//! `base_delay * n`, capped at `max_delay`. No wait follows the last attempt.

use std::time::Duration;

/// HTTP statuses treated as transient (rate limiting and server overload)
pub const TRANSIENT_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry configuration for the CRM request primitive
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay unit multiplied by the attempt number
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
    /// Statuses that trigger another attempt
    pub transient_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1500),
            max_delay: Duration::from_secs(30),
            transient_statuses: TRANSIENT_STATUSES.to_vec(),
        }
    }
}

impl RetryConfig {
    /// Same attempt budget as the default, but without waiting between attempts
    #[cfg(test)]
    pub fn no_delay() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Number of attempts actually made (at least one)
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn is_transient_status(&self, status: u16) -> bool {
        self.transient_statuses.contains(&status)
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt).min(self.max_delay)
    }

    /// Whether another attempt follows the given one
    pub fn has_attempt_after(&self, attempt: u32) -> bool {
        attempt < self.attempts()
    }
}
