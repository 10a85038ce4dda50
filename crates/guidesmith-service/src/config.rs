//! Service configuration
//!
//! One TOML document configures the whole pipeline:
//!
//! ```toml
//! max_upload_bytes = 16777216
//!
//! [extractor]
//! max_text_chars = 12000
//! request_timeout_secs = 60
//!
//! [extractor.retry]
//! max_attempts = 3
//!
//! [cache]
//! max_entries = 256
//! ttl_secs = 3600
//!
//! [template]
//! title = "Thesis Template"
//!
//! [llm]
//! provider = "gemini"
//! model = "gemini-2.0-flash"
//! api_key_env = "GOOGLE_API_KEY"
//! ```
//!
//! Every table and key is optional.

use crate::error::ServiceError;
use guidesmith_extractor::{CacheConfig, ExtractorConfig};
use guidesmith_llm::LlmSettings;
use guidesmith_template::TemplateOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default upload limit: 16 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Configuration for `TemplateService`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Uploads larger than this are rejected before loading
    pub max_upload_bytes: usize,

    /// Extraction settings
    pub extractor: ExtractorConfig,

    /// Extraction cache bounds
    pub cache: CacheConfig,

    /// Template content options
    pub template: TemplateOptions,

    /// Language model backend
    pub llm: LlmSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            extractor: ExtractorConfig::default(),
            cache: CacheConfig::default(),
            template: TemplateOptions::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl ServiceConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ServiceError> {
        toml::from_str(toml_str).map_err(|e| ServiceError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, ServiceError> {
        toml::to_string_pretty(self)
            .map_err(|e| ServiceError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.max_upload_bytes == 0 {
            return Err(ServiceError::Config(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        self.extractor.validate().map_err(ServiceError::Config)?;
        self.cache.validate().map_err(ServiceError::Config)?;
        Ok(())
    }
}
