//! Guidesmith Template Generator
//!
//! Turns a validated `FormatRuleSet` into a `.docx` template.
//!
//! Generation happens in two steps. `TemplateGenerator::build_document`
//! resolves the rules into a `TemplateDocument` (styles, page setup, footer
//! and body blocks in OOXML units), then the docx writer serializes that
//! model. Both steps are deterministic, so the same rules always yield
//! byte-identical output.
//!
//! ```
//! use guidesmith_domain::FormatRuleSet;
//! use guidesmith_template::{generate, DOCX_CONTENT_TYPE};
//!
//! let artifact = generate(&FormatRuleSet::default()).unwrap();
//! assert_eq!(artifact.content_type, DOCX_CONTENT_TYPE);
//! assert_eq!(artifact.document.style("Normal").unwrap().font_family, "Times New Roman");
//! ```

mod docx;
mod error;
mod generator;
mod model;
mod options;

pub use error::TemplateError;
pub use generator::{
    generate, is_chapter_like, TemplateArtifact, TemplateGenerator, DEFAULT_FILE_NAME,
    DOCX_CONTENT_TYPE,
};
pub use model::{
    heading_style_id, Block, ListDefinition, PageNumberFooter, PageSetup, ParagraphStyle,
    TemplateDocument, LIST_STYLE, NORMAL_STYLE, TITLE_STYLE,
};
pub use options::{TemplateOptions, DEFAULT_TITLE};
