//! Configuration for the Extractor and its cache

use crate::normalize::DEFAULT_MAX_CHARS;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Character budget for the guide text in one request
    pub max_text_chars: usize,

    /// Deadline for a single backend attempt (seconds)
    pub request_timeout_secs: u64,

    /// Deadline for the whole retry loop (seconds)
    pub extraction_timeout_secs: u64,

    /// Sampling temperature sent to the model
    pub temperature: f32,

    /// Retry policy for transient backend failures
    pub retry: RetryPolicy,
}

impl ExtractorConfig {
    /// Get the per-attempt timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the overall extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_chars == 0 {
            return Err("max_text_chars must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs < self.request_timeout_secs {
            return Err("extraction_timeout_secs cannot be below request_timeout_secs".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be within [0, 2]".to_string());
        }
        self.retry.validate()
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_CHARS,
            request_timeout_secs: 60,
            extraction_timeout_secs: 200,
            temperature: 0.1,
            retry: RetryPolicy::default(),
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: less text, short deadlines, fewer retries
    pub fn aggressive() -> Self {
        Self {
            max_text_chars: 8_000,
            request_timeout_secs: 20,
            extraction_timeout_secs: 60,
            temperature: 0.1,
            retry: RetryPolicy {
                max_attempts: 2,
                initial_backoff_ms: 500,
                backoff_multiplier: 2.0,
                max_backoff_ms: 2_000,
            },
        }
    }

    /// Lenient preset: more text, long deadlines, patient retries
    pub fn lenient() -> Self {
        Self {
            max_text_chars: 20_000,
            request_timeout_secs: 120,
            extraction_timeout_secs: 600,
            temperature: 0.1,
            retry: RetryPolicy {
                max_attempts: 5,
                initial_backoff_ms: 2_000,
                backoff_multiplier: 2.0,
                max_backoff_ms: 16_000,
            },
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

/// Configuration for the extraction cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries kept before the least recently used one is evicted
    pub max_entries: usize,

    /// Entry lifetime in seconds; 0 keeps entries until evicted
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            ttl_secs: 3_600,
        }
    }
}

impl CacheConfig {
    /// Entry lifetime, if any
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("cache.max_entries must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_text_chars, 12_000);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_aggressive_config_is_valid() {
        assert!(ExtractorConfig::aggressive().validate().is_ok());
    }

    #[test]
    fn test_lenient_config_is_valid() {
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_max_text_chars() {
        let mut config = ExtractorConfig::default();
        config.max_text_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overall_timeout_below_attempt_timeout() {
        let mut config = ExtractorConfig::default();
        config.extraction_timeout_secs = config.request_timeout_secs - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_retry_policy_propagates() {
        let mut config = ExtractorConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().unwrap_err().contains("max_attempts"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml(
            r#"
            max_text_chars = 500

            [retry]
            max_attempts = 4
            "#,
        )
        .unwrap();
        assert_eq!(parsed.max_text_chars, 500);
        assert_eq!(parsed.retry.max_attempts, 4);
        assert_eq!(parsed.retry.initial_backoff_ms, 1_000);
        assert_eq!(parsed.request_timeout_secs, 60);
    }

    #[test]
    fn test_cache_config() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ttl(), Some(Duration::from_secs(3_600)));

        let forever = CacheConfig {
            ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(forever.ttl(), None);

        let empty = CacheConfig {
            max_entries: 0,
            ..Default::default()
        };
        assert!(empty.validate().is_err());
    }
}
