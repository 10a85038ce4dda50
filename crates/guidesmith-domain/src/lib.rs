//! Guidesmith Domain Layer
//!
//! Core vocabulary shared by every other crate: the `FormatRuleSet` that a
//! style guide is distilled into, the layout enums it is built from, request
//! identifiers, and the `LlmBackend` trait the extractor talks through.
//!
//! ## Key Concepts
//!
//! - **FormatRuleSet**: fully populated formatting decisions (font, spacing,
//!   margins, headings, paper, numbering, document structure)
//! - **Defaults**: every field has one; `FormatRuleSet::default()` doubles
//!   as the fallback rule set
//! - **Validation**: `FormatRuleSet::validate()` checks the invariants
//!   template generation depends on
//!
//! ## Architecture
//!
//! Pure data and trait definitions only. Infrastructure (HTTP backends,
//! document containers) lives in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod layout;
pub mod request;
pub mod rules;
pub mod traits;

// Re-exports for convenience
pub use layout::{Alignment, LengthUnit, ListStyle, NumberStyle, Orientation, PaperSize};
pub use request::RequestId;
pub use rules::{
    default_document_structure, FontRules, FormatRuleSet, HeadersFooters, HeadingStyle, Margins,
    NumberingRules, PaperRules, MAX_HEADING_LEVEL, RULE_FIELDS,
};
pub use traits::{BackendError, LlmBackend, LlmRequest};
