//! Guidesmith Document Loader
//!
//! Turns an uploaded style guide into plain text.
//!
//! # Supported formats
//!
//! - Plain text (`.txt`, `.text`, `.md`): decoded as UTF-8, BOM stripped,
//!   line endings normalized to `\n`
//! - Word documents (`.docx`): paragraph text from `word/document.xml`,
//!   one line per paragraph, tables and images ignored
//!
//! # Example
//!
//! ```
//! use guidesmith_loader::{load, GuideDocument};
//!
//! let doc = GuideDocument::new("guide.txt", b"Use Arial 11pt.\r\n".to_vec()).unwrap();
//! assert_eq!(load(&doc).unwrap(), "Use Arial 11pt.\n");
//! ```

#![warn(missing_docs)]

mod docx;
mod error;
mod plain;

pub use error::LoadError;

/// Container format of an uploaded guide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// UTF-8 text
    PlainText,
    /// Office Open XML word processing document
    Docx,
}

impl DocumentFormat {
    /// Infer the format from a file name's extension (case-insensitive)
    ///
    /// # Errors
    ///
    /// `LoadError::UnsupportedFormat` for any other extension, including none.
    pub fn from_file_name(file_name: &str) -> Result<Self, LoadError> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("txt") | Some("text") | Some("md") => Ok(DocumentFormat::PlainText),
            Some("docx") => Ok(DocumentFormat::Docx),
            Some(other) => Err(LoadError::UnsupportedFormat(format!(".{}", other))),
            None => Err(LoadError::UnsupportedFormat(format!(
                "{} has no extension",
                file_name
            ))),
        }
    }

    /// Short label for logs and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "text",
            DocumentFormat::Docx => "docx",
        }
    }
}

/// An uploaded guide: raw bytes plus where they came from
#[derive(Debug, Clone)]
pub struct GuideDocument {
    /// Original file name as uploaded
    pub file_name: String,
    /// Declared container format
    pub format: DocumentFormat,
    /// Raw file content
    pub bytes: Vec<u8>,
}

impl GuideDocument {
    /// Create a document, deriving the format from the file name
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, LoadError> {
        let file_name = file_name.into();
        let format = DocumentFormat::from_file_name(&file_name)?;
        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }

    /// Create a plain-text document from a string
    pub fn from_text(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            format: DocumentFormat::PlainText,
            bytes: text.into().into_bytes(),
        }
    }

    /// Size of the raw upload in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the upload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Extract the plain text of a guide document
///
/// # Errors
///
/// `LoadError::CorruptDocument` when the bytes cannot be decoded as the
/// declared format.
pub fn load(document: &GuideDocument) -> Result<String, LoadError> {
    let text = match document.format {
        DocumentFormat::PlainText => plain::decode(&document.bytes)?,
        DocumentFormat::Docx => docx::extract_text(&document.bytes)?,
    };

    tracing::debug!(
        file = %document.file_name,
        format = document.format.as_str(),
        bytes = document.bytes.len(),
        chars = text.chars().count(),
        "Loaded guide document"
    );

    Ok(text)
}
