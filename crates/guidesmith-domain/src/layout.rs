//! Layout vocabulary - units, alignment, paper and numbering styles
//!
//! Every enum here follows the same shape: a canonical lowercase name from
//! `as_str()` and a lenient `parse()` that accepts the spellings language
//! models tend to produce.

use serde::{Deserialize, Serialize};

/// Twips per inch (OOXML measures page geometry in 1/20 pt)
pub const TWIPS_PER_INCH: f64 = 1440.0;

fn canonical(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Unit for page margins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    /// Centimeters
    Cm,
    /// Millimeters
    Mm,
    /// Inches
    In,
    /// Typographic points (1/72 inch)
    Pt,
}

impl LengthUnit {
    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Cm => "cm",
            LengthUnit::Mm => "mm",
            LengthUnit::In => "in",
            LengthUnit::Pt => "pt",
        }
    }

    /// Parse a unit name or abbreviation
    pub fn parse(s: &str) -> Option<Self> {
        match canonical(s).as_str() {
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => Some(LengthUnit::Cm),
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => Some(LengthUnit::Mm),
            "in" | "inch" | "inches" | "\"" => Some(LengthUnit::In),
            "pt" | "point" | "points" => Some(LengthUnit::Pt),
            _ => None,
        }
    }

    /// Convert a length in this unit to twips
    pub fn to_twips(&self, value: f64) -> f64 {
        match self {
            LengthUnit::Cm => value * TWIPS_PER_INCH / 2.54,
            LengthUnit::Mm => value * TWIPS_PER_INCH / 25.4,
            LengthUnit::In => value * TWIPS_PER_INCH,
            LengthUnit::Pt => value * 20.0,
        }
    }

    /// Convert a length in this unit to millimeters
    pub fn to_mm(&self, value: f64) -> f64 {
        self.to_twips(value) * 25.4 / TWIPS_PER_INCH
    }
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Flush left
    Left,
    /// Centered
    Center,
    /// Flush right
    Right,
    /// Justified on both margins
    Justify,
}

impl Alignment {
    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Parse an alignment name
    pub fn parse(s: &str) -> Option<Self> {
        match canonical(s).as_str() {
            "left" | "start" | "left_aligned" | "flush_left" => Some(Alignment::Left),
            "center" | "centre" | "centered" | "centred" | "middle" => Some(Alignment::Center),
            "right" | "end" | "right_aligned" | "flush_right" => Some(Alignment::Right),
            "justify" | "justified" | "both" | "full" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Marker style for list items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    /// Round bullets
    Bullet,
    /// 1. 2. 3.
    Numbered,
    /// Dashes
    Dash,
}

impl ListStyle {
    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            ListStyle::Bullet => "bullet",
            ListStyle::Numbered => "numbered",
            ListStyle::Dash => "dash",
        }
    }

    /// Parse a list style name
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim() == "•" {
            return Some(ListStyle::Bullet);
        }
        if s.trim() == "-" {
            return Some(ListStyle::Dash);
        }
        match canonical(s).as_str() {
            "bullet" | "bullets" | "bulleted" | "disc" | "dot" => Some(ListStyle::Bullet),
            "numbered" | "number" | "numbers" | "decimal" | "ordered" => Some(ListStyle::Numbered),
            "dash" | "dashes" | "hyphen" | "en_dash" => Some(ListStyle::Dash),
            _ => None,
        }
    }
}

/// Paper size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperSize {
    /// ISO A4, 210 x 297 mm
    A4,
    /// US Letter, 8.5 x 11 in
    Letter,
    /// US Legal, 8.5 x 14 in
    Legal,
}

impl PaperSize {
    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperSize::A4 => "a4",
            PaperSize::Letter => "letter",
            PaperSize::Legal => "legal",
        }
    }

    /// Parse a paper size name
    pub fn parse(s: &str) -> Option<Self> {
        match canonical(s).as_str() {
            "a4" | "iso_a4" => Some(PaperSize::A4),
            "letter" | "us_letter" | "8.5x11" => Some(PaperSize::Letter),
            "legal" | "us_legal" | "8.5x14" => Some(PaperSize::Legal),
            _ => None,
        }
    }

    /// Portrait (width, height) in millimeters
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Taller than wide
    Portrait,
    /// Wider than tall
    Landscape,
}

impl Orientation {
    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }

    /// Parse an orientation name
    pub fn parse(s: &str) -> Option<Self> {
        match canonical(s).as_str() {
            "portrait" | "vertical" => Some(Orientation::Portrait),
            "landscape" | "horizontal" => Some(Orientation::Landscape),
            _ => None,
        }
    }
}

/// Numbering style for pages, chapters and sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberStyle {
    /// 1, 2, 3
    Arabic,
    /// I, II, III
    RomanUpper,
    /// i, ii, iii
    RomanLower,
    /// A, B, C
    LetterUpper,
    /// a, b, c
    LetterLower,
    /// 1.1, 1.2 (hierarchical decimal)
    Decimal,
}

impl NumberStyle {
    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberStyle::Arabic => "arabic",
            NumberStyle::RomanUpper => "roman_upper",
            NumberStyle::RomanLower => "roman_lower",
            NumberStyle::LetterUpper => "letter_upper",
            NumberStyle::LetterLower => "letter_lower",
            NumberStyle::Decimal => "decimal",
        }
    }

    /// Parse a numbering style name
    ///
    /// Single-glyph samples ("I", "i", "A", "a", "1") are matched before the
    /// case-insensitive names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => return Some(NumberStyle::Arabic),
            "I" => return Some(NumberStyle::RomanUpper),
            "i" => return Some(NumberStyle::RomanLower),
            "A" => return Some(NumberStyle::LetterUpper),
            "a" => return Some(NumberStyle::LetterLower),
            "1.1" => return Some(NumberStyle::Decimal),
            _ => {}
        }
        match canonical(s).as_str() {
            "arabic" | "numeric" | "number" | "numbers" => Some(NumberStyle::Arabic),
            "roman_upper" | "upper_roman" | "roman" | "uppercase_roman" => Some(NumberStyle::RomanUpper),
            "roman_lower" | "lower_roman" | "lowercase_roman" => Some(NumberStyle::RomanLower),
            "letter_upper" | "upper_letter" | "upper_alpha" | "alpha_upper" => Some(NumberStyle::LetterUpper),
            "letter_lower" | "lower_letter" | "lower_alpha" | "alpha_lower" => Some(NumberStyle::LetterLower),
            "decimal" | "hierarchical" | "outline" => Some(NumberStyle::Decimal),
            _ => None,
        }
    }

    /// The OOXML `w:numFmt` / `w:pgNumType` format name
    pub fn ooxml_format(&self) -> &'static str {
        match self {
            NumberStyle::Arabic | NumberStyle::Decimal => "decimal",
            NumberStyle::RomanUpper => "upperRoman",
            NumberStyle::RomanLower => "lowerRoman",
            NumberStyle::LetterUpper => "upperLetter",
            NumberStyle::LetterLower => "lowerLetter",
        }
    }
}
