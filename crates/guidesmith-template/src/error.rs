//! Error types for template generation

use thiserror::Error;

/// Errors that can occur while rendering a template
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The rule set broke an invariant or the container could not be written
    #[error("Template render error: {0}")]
    TemplateRenderError(String),
}

impl From<zip::result::ZipError> for TemplateError {
    fn from(err: zip::result::ZipError) -> Self {
        TemplateError::TemplateRenderError(format!("zip: {}", err))
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::TemplateRenderError(format!("io: {}", err))
    }
}
