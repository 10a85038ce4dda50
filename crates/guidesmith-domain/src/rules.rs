//! FormatRuleSet - the structured formatting decisions distilled from a guide
//!
//! A `FormatRuleSet` is always fully populated. Every field has a default,
//! and the extractor fills any field the model did not supply from
//! `FormatRuleSet::default()` before the set reaches template generation.

use crate::layout::{Alignment, LengthUnit, ListStyle, NumberStyle, Orientation, PaperSize};
use serde::{Deserialize, Serialize};

/// Top-level field names, in the order they are presented to the model
pub const RULE_FIELDS: &[&str] = &[
    "font",
    "line_spacing",
    "paragraph_spacing_pt",
    "margins",
    "headings",
    "alignment",
    "list_style",
    "paper",
    "headers_footers",
    "numbering",
    "document_structure",
];

/// Largest heading level a rule set may declare (Word ships Heading 1-9)
pub const MAX_HEADING_LEVEL: u8 = 9;

/// Complete set of formatting rules for a document template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRuleSet {
    /// Body font
    pub font: FontRules,

    /// Line spacing as a multiple of single spacing (1.0, 1.5, 2.0)
    pub line_spacing: f64,

    /// Space after each body paragraph, in points
    pub paragraph_spacing_pt: f64,

    /// Page margins
    pub margins: Margins,

    /// Heading styles, one per level starting at 1
    pub headings: Vec<HeadingStyle>,

    /// Body paragraph alignment
    pub alignment: Alignment,

    /// List marker style
    pub list_style: ListStyle,

    /// Paper size and orientation
    pub paper: PaperRules,

    /// Header and footer settings
    pub headers_footers: HeadersFooters,

    /// Page, chapter and section numbering
    pub numbering: NumberingRules,

    /// Ordered section titles the template should contain
    pub document_structure: Vec<String>,
}

/// Body font family and size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRules {
    /// Font family name (e.g. "Times New Roman")
    pub family: String,

    /// Body text size in points
    pub size_pt: f64,
}

/// Page margins in a single unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    /// Top margin
    pub top: f64,
    /// Bottom margin
    pub bottom: f64,
    /// Left margin
    pub left: f64,
    /// Right margin
    pub right: f64,
    /// Unit shared by all four values
    pub unit: LengthUnit,
}

impl Margins {
    /// Same margin on every side
    pub fn uniform(value: f64, unit: LengthUnit) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
            unit,
        }
    }

    /// Margins as (top, bottom, left, right) in twips, rounded
    pub fn to_twips(&self) -> (i64, i64, i64, i64) {
        let t = |v: f64| self.unit.to_twips(v).round() as i64;
        (t(self.top), t(self.bottom), t(self.left), t(self.right))
    }
}

/// Style for one heading level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingStyle {
    /// Heading level, 1-based
    pub level: u8,

    /// Size in points
    pub size_pt: f64,

    /// Bold weight
    pub bold: bool,

    /// Italic
    pub italic: bool,

    /// Hex RGB color without the leading '#', e.g. "000000"
    pub color: String,

    /// Paragraph alignment for the heading
    pub alignment: Alignment,
}

/// Paper size and orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperRules {
    /// Paper size
    pub size: PaperSize,
    /// Orientation
    pub orientation: Orientation,
}

impl PaperRules {
    /// Page (width, height) in millimeters, with landscape swapping the sides
    pub fn page_mm(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Header and footer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadersFooters {
    /// Whether the template carries a header/footer at all
    pub enabled: bool,
    /// Whether the footer shows page numbers
    pub page_numbers: bool,
}

/// Numbering styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRules {
    /// Page number style
    pub page: NumberStyle,
    /// Chapter number style
    pub chapter: NumberStyle,
    /// Section number style
    pub section: NumberStyle,
}

impl Default for FontRules {
    fn default() -> Self {
        Self {
            family: "Times New Roman".to_string(),
            size_pt: 12.0,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(3.0, LengthUnit::Cm)
    }
}

impl Default for PaperRules {
    fn default() -> Self {
        Self {
            size: PaperSize::A4,
            orientation: Orientation::Portrait,
        }
    }
}

impl Default for HeadersFooters {
    fn default() -> Self {
        Self {
            enabled: true,
            page_numbers: true,
        }
    }
}

impl Default for NumberingRules {
    fn default() -> Self {
        Self {
            page: NumberStyle::Arabic,
            chapter: NumberStyle::RomanUpper,
            section: NumberStyle::Decimal,
        }
    }
}

impl HeadingStyle {
    /// Default style for a heading level
    ///
    /// Level 1 is centered 14pt bold, level 2 is 12pt bold, deeper levels
    /// are 12pt bold italic.
    pub fn default_for_level(level: u8) -> Self {
        let (size_pt, italic, alignment) = match level {
            1 => (14.0, false, Alignment::Center),
            2 => (12.0, false, Alignment::Left),
            _ => (12.0, true, Alignment::Left),
        };
        Self {
            level,
            size_pt,
            bold: true,
            italic,
            color: "000000".to_string(),
            alignment,
        }
    }
}

/// Default section list used when a guide names no structure
pub fn default_document_structure() -> Vec<String> {
    [
        "Title Page",
        "Table of Contents",
        "Chapter I Introduction",
        "Chapter II Literature Review",
        "Chapter III Methodology",
        "Chapter IV Results and Discussion",
        "Chapter V Conclusion",
        "References",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for FormatRuleSet {
    /// The fallback rule set: Times New Roman 12pt, 1.5 spacing, 6pt after,
    /// 3 cm margins, A4 portrait, three heading levels
    fn default() -> Self {
        Self {
            font: FontRules::default(),
            line_spacing: 1.5,
            paragraph_spacing_pt: 6.0,
            margins: Margins::default(),
            headings: (1..=3).map(HeadingStyle::default_for_level).collect(),
            alignment: Alignment::Left,
            list_style: ListStyle::Bullet,
            paper: PaperRules::default(),
            headers_footers: HeadersFooters::default(),
            numbering: NumberingRules::default(),
            document_structure: default_document_structure(),
        }
    }
}

impl FormatRuleSet {
    /// Look up the style for a heading level
    pub fn heading(&self, level: u8) -> Option<&HeadingStyle> {
        self.headings.iter().find(|h| h.level == level)
    }

    /// Validate the invariants template generation relies on
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        if self.font.family.trim().is_empty() {
            return Err("font family is empty".to_string());
        }
        if !(self.font.size_pt > 0.0 && self.font.size_pt <= 400.0) {
            return Err(format!("font size {} out of range (0, 400]", self.font.size_pt));
        }
        if !(self.line_spacing > 0.0 && self.line_spacing <= 10.0) {
            return Err(format!("line spacing {} out of range (0, 10]", self.line_spacing));
        }
        if !(self.paragraph_spacing_pt >= 0.0 && self.paragraph_spacing_pt <= 400.0) {
            return Err(format!(
                "paragraph spacing {} out of range [0, 400]",
                self.paragraph_spacing_pt
            ));
        }

        let m = &self.margins;
        for (side, value) in [("top", m.top), ("bottom", m.bottom), ("left", m.left), ("right", m.right)] {
            if !(value >= 0.0) {
                return Err(format!("{} margin {} is negative", side, value));
            }
        }

        let (page_w, page_h) = self.paper.page_mm();
        if m.unit.to_mm(m.left + m.right) >= page_w || m.unit.to_mm(m.top + m.bottom) >= page_h {
            return Err("margins leave no printable area".to_string());
        }

        if self.headings.is_empty() {
            return Err("no heading styles declared".to_string());
        }
        for (idx, heading) in self.headings.iter().enumerate() {
            let expected = idx + 1;
            if heading.level as usize != expected {
                return Err(format!(
                    "heading levels must run 1..=N in order, found level {} at position {}",
                    heading.level, expected
                ));
            }
            if heading.level > MAX_HEADING_LEVEL {
                return Err(format!("heading level {} exceeds {}", heading.level, MAX_HEADING_LEVEL));
            }
            if !(heading.size_pt > 0.0 && heading.size_pt <= 400.0) {
                return Err(format!("heading {} size {} out of range", heading.level, heading.size_pt));
            }
            if !is_hex_color(&heading.color) {
                return Err(format!("heading {} color '{}' is not RRGGBB hex", heading.level, heading.color));
            }
        }

        Ok(())
    }
}

/// Whether `s` is a six-digit hex RGB color without '#'
pub fn is_hex_color(s: &str) -> bool {
    s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit())
}
