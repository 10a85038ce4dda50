//! Error types for the CLI application.

use guidesmith_service::ServiceError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some files of a batch failed
    #[error("{failed} of {total} file(s) failed")]
    Partial {
        /// Files that failed
        failed: usize,
        /// Files attempted
        total: usize,
    },
}

impl CliError {
    /// Text to show the user; pipeline errors use their user-facing form
    pub fn user_message(&self) -> String {
        match self {
            CliError::Service(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<guidesmith_loader::LoadError> for CliError {
    fn from(err: guidesmith_loader::LoadError) -> Self {
        CliError::Service(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_use_user_message() {
        let err = CliError::from(ServiceError::ExtractionUnavailable("HTTP 500".to_string()));
        assert!(err.user_message().contains("try again later"));
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[test]
    fn test_load_error_conversion() {
        let err: CliError = guidesmith_loader::LoadError::UnsupportedFormat("pdf".to_string()).into();
        assert!(matches!(err, CliError::Service(ServiceError::UnsupportedFormat(_))));
    }
}
