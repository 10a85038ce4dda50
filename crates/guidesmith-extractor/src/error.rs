//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// Unparsable model output is not an error: it produces the fallback rule
/// set and sets `RuleExtraction::used_fallback`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// The backend could not produce a response (retries exhausted,
    /// permanent backend failure, or timeout)
    #[error("Rule extraction unavailable: {0}")]
    ExtractionUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether the caller may try the same request again later
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractorError::ExtractionUnavailable(_))
    }
}
