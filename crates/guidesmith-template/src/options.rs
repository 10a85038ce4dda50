//! Generation options

use serde::{Deserialize, Serialize};

/// Title used when none is configured
pub const DEFAULT_TITLE: &str = "Document Template";

/// Knobs for what the generated template contains
///
/// The rule set decides how things look; these options decide which parts
/// of the scaffold are emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    /// Text of the title paragraph
    pub title: String,

    /// Emit one example paragraph per style
    pub include_style_samples: bool,

    /// Emit the closing page listing the applied formatting
    pub include_summary: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            include_style_samples: true,
            include_summary: true,
        }
    }
}

impl TemplateOptions {
    /// Only the title and the section scaffold
    pub fn minimal() -> Self {
        Self {
            include_style_samples: false,
            include_summary: false,
            ..Default::default()
        }
    }

    /// Replace the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}
