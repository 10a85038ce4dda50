//! Configuration management for the CLI.
//!
//! The config file holds the service tables (`[extractor]`, `[cache]`,
//! `[template]`, `[llm]`) at the top level plus a `[cli]` table for
//! presentation settings.

use crate::error::{CliError, Result};
use guidesmith_llm::ProviderKind;
use guidesmith_service::ServiceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Presentation settings
    #[serde(default)]
    pub cli: Settings,

    /// Pipeline settings
    #[serde(flatten)]
    pub service: ServiceConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".guidesmith").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::path() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let contents = fs::read_to_string(&path)
            .map_err(|e| CliError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.service.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Apply command-line and environment overrides for the backend.
    pub fn apply_overrides(
        &mut self,
        provider: Option<&str>,
        model: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<()> {
        if let Some(name) = provider {
            self.service.llm.provider = ProviderKind::parse(name)
                .ok_or_else(|| CliError::InvalidInput(format!("Unknown provider '{}'", name)))?;
        }
        if let Some(model) = model {
            self.service.llm.model = model.to_string();
        }
        if let Some(key) = api_key {
            self.service.llm.api_key = Some(key.to_string());
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.cli.color);
        assert_eq!(config.cli.format, OutputFormat::Table);
        assert_eq!(config.service.llm.provider, ProviderKind::Gemini);
    }

    #[test]
    fn test_service_tables_at_top_level() {
        let config = Config::from_toml(
            r#"
            max_upload_bytes = 2048

            [cli]
            format = "json"

            [llm]
            provider = "mock"

            [template]
            title = "Skripsi"
            "#,
        )
        .unwrap();

        assert_eq!(config.cli.format, OutputFormat::Json);
        assert!(config.cli.color);
        assert_eq!(config.service.max_upload_bytes, 2048);
        assert_eq!(config.service.llm.provider, ProviderKind::Mock);
        assert_eq!(config.service.template.title, "Skripsi");
    }

    #[test]
    fn test_invalid_service_values_rejected() {
        let result = Config::from_toml("[cache]\nmax_entries = 0");
        assert!(matches!(result, Err(CliError::Service(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.service.llm.model = "gemini-1.5-pro".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.service.llm.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_missing_explicit_path() {
        let result = Config::load(Some(Path::new("/nonexistent/guidesmith.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(Some("Ollama"), Some("llama3.2"), Some("secret"))
            .unwrap();
        assert_eq!(config.service.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.service.llm.model, "llama3.2");
        assert_eq!(config.service.llm.api_key.as_deref(), Some("secret"));

        assert!(config.apply_overrides(Some("openai"), None, None).is_err());
    }
}
