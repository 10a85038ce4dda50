//! Extraction outcome types

use guidesmith_domain::FormatRuleSet;
use serde::{Deserialize, Serialize};

/// Outcome of one rule extraction
///
/// `rules` is always fully populated. When the model's answer could not be
/// parsed at all, `rules` is the default set and `used_fallback` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleExtraction {
    /// The merged rule set
    pub rules: FormatRuleSet,

    /// No JSON object could be recovered from the model output
    pub used_fallback: bool,

    /// Field paths that were filled from defaults (e.g. `"paper"`,
    /// `"margins.unit"`, `"headings.3"`)
    pub defaulted_fields: Vec<String>,

    /// Model that produced the answer
    pub model: String,

    /// Backend attempts it took
    pub attempts: u32,
}

impl RuleExtraction {
    /// Whether the model supplied every field itself
    pub fn is_complete(&self) -> bool {
        !self.used_fallback && self.defaulted_fields.is_empty()
    }
}
