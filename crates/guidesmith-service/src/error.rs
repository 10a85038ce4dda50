//! Error types for the service layer

use guidesmith_extractor::ExtractorError;
use guidesmith_llm::LlmError;
use guidesmith_loader::LoadError;
use guidesmith_template::TemplateError;
use thiserror::Error;

const MIB: usize = 1024 * 1024;

/// Errors surfaced by `TemplateService`
///
/// Every stage's error folds into one of these. Use `user_message()` for
/// text shown to end users; the `Display` form carries diagnostic detail.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The upload is not a supported guide format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The upload could not be decoded
    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    /// The language model could not produce rules
    #[error("Extraction unavailable: {0}")]
    ExtractionUnavailable(String),

    /// The rule set could not be turned into a template
    #[error("Template render error: {0}")]
    TemplateRenderError(String),

    /// The upload exceeds the configured size limit
    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge {
        /// Upload size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    /// Message suitable for end users
    ///
    /// Backend failures collapse into one "try again later" message without
    /// provider details.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::UnsupportedFormat(_) => {
                "Unsupported file type. Upload a .docx or .txt style guide.".to_string()
            }
            ServiceError::CorruptDocument(_) => {
                "The document could not be read. Check that the file is not damaged.".to_string()
            }
            ServiceError::ExtractionUnavailable(_) => {
                "The formatting assistant is unavailable right now. Please try again later."
                    .to_string()
            }
            ServiceError::TemplateRenderError(_) => {
                "A template could not be generated from the extracted rules.".to_string()
            }
            ServiceError::UploadTooLarge { limit, .. } => format!(
                "The file is too large. The maximum upload size is {} MiB.",
                limit / MIB
            ),
            ServiceError::Config(_) => "The service is not configured correctly.".to_string(),
        }
    }

    /// Whether resubmitting the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::ExtractionUnavailable(_))
    }
}

impl From<LoadError> for ServiceError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::UnsupportedFormat(detail) => ServiceError::UnsupportedFormat(detail),
            LoadError::CorruptDocument(detail) => ServiceError::CorruptDocument(detail),
        }
    }
}

impl From<ExtractorError> for ServiceError {
    fn from(err: ExtractorError) -> Self {
        match err {
            ExtractorError::ExtractionUnavailable(detail) => ServiceError::ExtractionUnavailable(detail),
            ExtractorError::Config(detail) => ServiceError::Config(detail),
        }
    }
}

impl From<TemplateError> for ServiceError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::TemplateRenderError(detail) => ServiceError::TemplateRenderError(detail),
        }
    }
}

impl From<LlmError> for ServiceError {
    /// Only raised while building a backend, so always a setup problem
    fn from(err: LlmError) -> Self {
        ServiceError::Config(err.to_string())
    }
}
