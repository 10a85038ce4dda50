//! Retry policy for backend calls

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff between backend attempts
///
/// Attempt `n` (1-based) that fails transiently is followed by a pause of
/// `initial_backoff_ms * backoff_multiplier^(n-1)`, capped at
/// `max_backoff_ms`. No pause follows the last attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,

    /// Pause after the first failure (milliseconds)
    pub initial_backoff_ms: u64,

    /// Growth factor per attempt
    pub backoff_multiplier: f64,

    /// Upper bound on a single pause (milliseconds)
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1_000,
            backoff_multiplier: 2.0,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Pause to take after `attempt` failed
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let millis = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = millis.min(self.max_backoff_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("retry.max_attempts must be at least 1".to_string());
        }
        if !(self.backoff_multiplier >= 1.0) {
            return Err("retry.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err("retry.max_backoff_ms cannot be below initial_backoff_ms".to_string());
        }
        Ok(())
    }
}
