//! In-memory template document
//!
//! A `TemplateDocument` is the fully resolved layout: every length is in
//! OOXML units (twips, half-points, 240ths of a line) and every paragraph
//! names the style it uses. The docx writer only serializes it.

use guidesmith_domain::{Alignment, Orientation};

/// Style id of body paragraphs
pub const NORMAL_STYLE: &str = "Normal";
/// Style id of the title paragraph
pub const TITLE_STYLE: &str = "Title";
/// Style id of list paragraphs
pub const LIST_STYLE: &str = "ListParagraph";

/// Style id for a heading level
pub fn heading_style_id(level: u8) -> String {
    format!("Heading{}", level)
}

/// A complete template ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDocument {
    /// Section properties
    pub page: PageSetup,
    /// Paragraph styles, `Normal` first
    pub styles: Vec<ParagraphStyle>,
    /// Marker definition used by the list style
    pub list: ListDefinition,
    /// Footer carrying the page number, if any
    pub footer: Option<PageNumberFooter>,
    /// Body content in document order
    pub blocks: Vec<Block>,
}

/// Page size, orientation and margins
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub width_twips: i64,
    pub height_twips: i64,
    pub orientation: Orientation,
    pub margin_top_twips: i64,
    pub margin_bottom_twips: i64,
    pub margin_left_twips: i64,
    pub margin_right_twips: i64,
    /// `w:pgNumType` format name (e.g. "decimal", "lowerRoman")
    pub page_number_format: String,
}

/// A paragraph style definition
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphStyle {
    pub id: String,
    pub name: String,
    pub based_on: Option<String>,
    pub font_family: String,
    /// `w:sz` value: font size in half-points
    pub size_half_points: u32,
    pub bold: bool,
    pub italic: bool,
    /// RRGGBB without '#'
    pub color: String,
    pub alignment: Alignment,
    /// Line spacing in 240ths of a line (`w:lineRule="auto"`)
    pub line_240ths: u32,
    pub space_after_twips: u32,
    /// Zero-based outline level for headings
    pub outline_level: Option<u8>,
    /// Whether paragraphs of this style carry the list marker
    pub numbered: bool,
}

/// List marker definition (`w:abstractNum`, single level)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDefinition {
    /// `w:numFmt` value: "bullet" or "decimal"
    pub format: String,
    /// `w:lvlText` value
    pub level_text: String,
}

/// Footer with a PAGE field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumberFooter {
    pub alignment: Alignment,
}

/// Body content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph with a single run of text
    Paragraph { style: String, text: String },
    /// Hard page break
    PageBreak,
}

impl Block {
    /// Paragraph in the given style
    pub fn paragraph(style: impl Into<String>, text: impl Into<String>) -> Self {
        Block::Paragraph {
            style: style.into(),
            text: text.into(),
        }
    }
}

impl TemplateDocument {
    /// Look up a style by id
    pub fn style(&self, id: &str) -> Option<&ParagraphStyle> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// (style, text) of every paragraph, in order
    pub fn paragraphs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph { style, text } => Some((style.as_str(), text.as_str())),
            Block::PageBreak => None,
        })
    }

    /// Text of every paragraph in `style`
    pub fn texts_in_style<'a>(&'a self, style: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.paragraphs()
            .filter(move |(s, _)| *s == style)
            .map(|(_, text)| text)
    }
}
