//! Error types for document loading

use thiserror::Error;

/// Errors that can occur while turning an upload into text
#[derive(Error, Debug)]
pub enum LoadError {
    /// File extension is not one the loader understands
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The bytes do not decode as the declared format
    #[error("Corrupt document: {0}")]
    CorruptDocument(String),
}

impl From<zip::result::ZipError> for LoadError {
    fn from(err: zip::result::ZipError) -> Self {
        LoadError::CorruptDocument(format!("invalid container: {}", err))
    }
}

impl From<quick_xml::Error> for LoadError {
    fn from(err: quick_xml::Error) -> Self {
        LoadError::CorruptDocument(format!("malformed XML: {}", err))
    }
}
