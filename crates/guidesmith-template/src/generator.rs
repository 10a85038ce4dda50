//! Rule set → TemplateDocument → .docx

use crate::docx;
use crate::error::TemplateError;
use crate::model::{
    heading_style_id, Block, ListDefinition, PageNumberFooter, PageSetup, ParagraphStyle,
    TemplateDocument, LIST_STYLE, NORMAL_STYLE, TITLE_STYLE,
};
use crate::options::TemplateOptions;
use guidesmith_domain::{Alignment, FormatRuleSet, HeadingStyle, LengthUnit, ListStyle};
use tracing::{debug, info};

/// MIME type of the produced artifact
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File name offered for download
pub const DEFAULT_FILE_NAME: &str = "template.docx";

const CHAPTER_PLACEHOLDER: &str = "[Chapter content follows the extracted formatting rules]";
const SECTION_PLACEHOLDER: &str = "[Section content goes here]";

/// Sections used when the rule set names no structure
const FALLBACK_SECTIONS: &[&str] = &[
    "Introduction",
    "Literature Review",
    "Methodology",
    "Results and Discussion",
    "Conclusion",
];

/// A rendered template
#[derive(Debug, Clone)]
pub struct TemplateArtifact {
    /// The .docx container
    pub bytes: Vec<u8>,
    /// Always `DOCX_CONTENT_TYPE`
    pub content_type: &'static str,
    /// Suggested file name
    pub file_name: String,
    /// The document the bytes were written from
    pub document: TemplateDocument,
}

/// Builds templates from rule sets
///
/// Generation is deterministic: the same rules and options always produce
/// the same `TemplateDocument` and byte-identical output.
#[derive(Debug, Clone, Default)]
pub struct TemplateGenerator {
    options: TemplateOptions,
}

impl TemplateGenerator {
    /// Create a generator with the given options
    pub fn new(options: TemplateOptions) -> Self {
        Self { options }
    }

    /// The active options
    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Render `rules` into a .docx artifact
    ///
    /// # Errors
    ///
    /// `TemplateError::TemplateRenderError` when the rules fail validation or
    /// the container cannot be written.
    pub fn generate(&self, rules: &FormatRuleSet) -> Result<TemplateArtifact, TemplateError> {
        let document = self.build_document(rules)?;
        let bytes = docx::write(&document)?;

        info!(
            bytes = bytes.len(),
            paragraphs = document.paragraphs().count(),
            styles = document.styles.len(),
            "Template rendered"
        );

        Ok(TemplateArtifact {
            bytes,
            content_type: DOCX_CONTENT_TYPE,
            file_name: DEFAULT_FILE_NAME.to_string(),
            document,
        })
    }

    /// Resolve `rules` into a document model without serializing it
    pub fn build_document(&self, rules: &FormatRuleSet) -> Result<TemplateDocument, TemplateError> {
        rules
            .validate()
            .map_err(|reason| TemplateError::TemplateRenderError(format!("invalid rules: {}", reason)))?;

        let mut blocks = vec![Block::paragraph(TITLE_STYLE, self.options.title.clone())];
        push_sections(&mut blocks, rules);

        if self.options.include_style_samples {
            push_style_samples(&mut blocks, rules);
        }

        if self.options.include_summary {
            blocks.push(Block::PageBreak);
            blocks.push(Block::paragraph(heading_style_id(1), "Applied Formatting Summary"));
            for line in summary_lines(rules) {
                blocks.push(Block::paragraph(NORMAL_STYLE, line));
            }
        }

        debug!(blocks = blocks.len(), "Template document assembled");

        Ok(TemplateDocument {
            page: page_setup(rules),
            styles: styles(rules),
            list: list_definition(rules.list_style),
            footer: (rules.headers_footers.enabled && rules.headers_footers.page_numbers)
                .then_some(PageNumberFooter {
                    alignment: Alignment::Center,
                }),
            blocks,
        })
    }
}

/// Render `rules` with default options
pub fn generate(rules: &FormatRuleSet) -> Result<TemplateArtifact, TemplateError> {
    TemplateGenerator::default().generate(rules)
}

/// Whether a structure entry names a chapter ("Chapter II", "BAB I")
pub fn is_chapter_like(entry: &str) -> bool {
    entry
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case("chapter") || word.eq_ignore_ascii_case("bab"))
}

fn push_sections(blocks: &mut Vec<Block>, rules: &FormatRuleSet) {
    let sub_level = if rules.headings.len() >= 2 { 2 } else { 1 };

    if rules.document_structure.is_empty() {
        for section in FALLBACK_SECTIONS {
            blocks.push(Block::paragraph(heading_style_id(1), *section));
            blocks.push(Block::paragraph(NORMAL_STYLE, CHAPTER_PLACEHOLDER));
        }
        return;
    }

    for entry in &rules.document_structure {
        let (level, placeholder) = if is_chapter_like(entry) {
            (1, CHAPTER_PLACEHOLDER)
        } else {
            (sub_level, SECTION_PLACEHOLDER)
        };
        blocks.push(Block::paragraph(heading_style_id(level), entry.as_str()));
        blocks.push(Block::paragraph(NORMAL_STYLE, placeholder));
    }
}

fn push_style_samples(blocks: &mut Vec<Block>, rules: &FormatRuleSet) {
    blocks.push(Block::PageBreak);
    blocks.push(Block::paragraph(heading_style_id(1), "Style Samples"));
    for heading in &rules.headings {
        blocks.push(Block::paragraph(
            heading_style_id(heading.level),
            format!("Heading {} example", heading.level),
        ));
    }
    blocks.push(Block::paragraph(NORMAL_STYLE, "Body text example"));
    blocks.push(Block::paragraph(LIST_STYLE, "List item example"));
    blocks.push(Block::paragraph(LIST_STYLE, "List item example"));
}

fn summary_lines(rules: &FormatRuleSet) -> Vec<String> {
    let m = &rules.margins;
    let unit = m.unit.as_str();
    let page_numbers = if rules.headers_footers.enabled && rules.headers_footers.page_numbers {
        rules.numbering.page.as_str()
    } else {
        "none"
    };

    vec![
        format!("Font: {}", rules.font.family),
        format!("Font size: {} pt", rules.font.size_pt),
        format!("Line spacing: {}", rules.line_spacing),
        format!("Space after paragraph: {} pt", rules.paragraph_spacing_pt),
        format!(
            "Margins: top {} {unit}, bottom {} {unit}, left {} {unit}, right {} {unit}",
            m.top, m.bottom, m.left, m.right
        ),
        format!("Alignment: {}", rules.alignment.as_str()),
        format!(
            "Paper: {} {}",
            rules.paper.size.as_str(),
            rules.paper.orientation.as_str()
        ),
        format!("Heading levels: {}", rules.headings.len()),
        format!("List style: {}", rules.list_style.as_str()),
        format!(
            "Numbering: chapters {}, sections {}",
            rules.numbering.chapter.as_str(),
            rules.numbering.section.as_str()
        ),
        format!("Page numbers: {}", page_numbers),
    ]
}

fn page_setup(rules: &FormatRuleSet) -> PageSetup {
    let (width_mm, height_mm) = rules.paper.page_mm();
    let (top, bottom, left, right) = rules.margins.to_twips();

    PageSetup {
        width_twips: LengthUnit::Mm.to_twips(width_mm).round() as i64,
        height_twips: LengthUnit::Mm.to_twips(height_mm).round() as i64,
        orientation: rules.paper.orientation,
        margin_top_twips: top,
        margin_bottom_twips: bottom,
        margin_left_twips: left,
        margin_right_twips: right,
        page_number_format: rules.numbering.page.ooxml_format().to_string(),
    }
}

fn half_points(size_pt: f64) -> u32 {
    (size_pt * 2.0).round() as u32
}

fn styles(rules: &FormatRuleSet) -> Vec<ParagraphStyle> {
    let normal = ParagraphStyle {
        id: NORMAL_STYLE.to_string(),
        name: "Normal".to_string(),
        based_on: None,
        font_family: rules.font.family.clone(),
        size_half_points: half_points(rules.font.size_pt),
        bold: false,
        italic: false,
        color: "000000".to_string(),
        alignment: rules.alignment,
        line_240ths: (rules.line_spacing * 240.0).round() as u32,
        space_after_twips: (rules.paragraph_spacing_pt * 20.0).round() as u32,
        outline_level: None,
        numbered: false,
    };

    let title = ParagraphStyle {
        id: TITLE_STYLE.to_string(),
        name: "Title".to_string(),
        based_on: Some(NORMAL_STYLE.to_string()),
        size_half_points: half_points(rules.font.size_pt + 2.0),
        bold: true,
        alignment: Alignment::Center,
        ..normal.clone()
    };

    let list = ParagraphStyle {
        id: LIST_STYLE.to_string(),
        name: "List Paragraph".to_string(),
        based_on: Some(NORMAL_STYLE.to_string()),
        alignment: Alignment::Left,
        numbered: true,
        ..normal.clone()
    };

    let mut styles = vec![normal.clone(), title];
    styles.extend(rules.headings.iter().map(|h| heading_style(&normal, h)));
    styles.push(list);
    styles
}

fn heading_style(normal: &ParagraphStyle, heading: &HeadingStyle) -> ParagraphStyle {
    ParagraphStyle {
        id: heading_style_id(heading.level),
        name: format!("heading {}", heading.level),
        based_on: Some(NORMAL_STYLE.to_string()),
        size_half_points: half_points(heading.size_pt),
        bold: heading.bold,
        italic: heading.italic,
        color: heading.color.to_uppercase(),
        alignment: heading.alignment,
        outline_level: Some(heading.level.saturating_sub(1)),
        ..normal.clone()
    }
}

fn list_definition(style: ListStyle) -> ListDefinition {
    let (format, level_text) = match style {
        ListStyle::Bullet => ("bullet", "\u{2022}"),
        ListStyle::Dash => ("bullet", "\u{2013}"),
        ListStyle::Numbered => ("decimal", "%1."),
    };
    ListDefinition {
        format: format.to_string(),
        level_text: level_text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidesmith_domain::{Margins, Orientation, PaperSize};

    fn headings(doc: &TemplateDocument, level: u8) -> Vec<String> {
        doc.texts_in_style(&heading_style_id(level))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_document_is_deterministic() {
        let rules = FormatRuleSet::default();
        let generator = TemplateGenerator::default();
        let a = generator.build_document(&rules).unwrap();
        let b = generator.build_document(&rules).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_title_comes_first() {
        let generator = TemplateGenerator::new(TemplateOptions::default().with_title("Thesis"));
        let doc = generator.build_document(&FormatRuleSet::default()).unwrap();
        assert_eq!(doc.paragraphs().next(), Some((TITLE_STYLE, "Thesis")));
    }

    #[test]
    fn test_chapters_become_level_one() {
        let mut rules = FormatRuleSet::default();
        rules.document_structure = vec![
            "Abstract".to_string(),
            "BAB I PENDAHULUAN".to_string(),
            "Chapter II Methods".to_string(),
            "References".to_string(),
        ];
        let doc = TemplateGenerator::new(TemplateOptions::minimal())
            .build_document(&rules)
            .unwrap();

        assert_eq!(headings(&doc, 1), vec!["BAB I PENDAHULUAN", "Chapter II Methods"]);
        assert_eq!(headings(&doc, 2), vec!["Abstract", "References"]);
        // one placeholder per entry
        assert_eq!(doc.texts_in_style(NORMAL_STYLE).count(), 4);
    }

    #[test]
    fn test_single_heading_level_keeps_sections_at_one() {
        let mut rules = FormatRuleSet::default();
        rules.headings.truncate(1);
        rules.document_structure = vec!["Preface".to_string()];
        let doc = TemplateGenerator::new(TemplateOptions::minimal())
            .build_document(&rules)
            .unwrap();
        assert_eq!(headings(&doc, 1), vec!["Preface"]);
        assert!(doc.style("Heading2").is_none());
    }

    #[test]
    fn test_empty_structure_uses_fallback_sections() {
        let mut rules = FormatRuleSet::default();
        rules.document_structure.clear();
        let doc = TemplateGenerator::new(TemplateOptions::minimal())
            .build_document(&rules)
            .unwrap();
        assert_eq!(headings(&doc, 1), FALLBACK_SECTIONS.to_vec());
    }

    #[test]
    fn test_style_samples_cover_every_heading() {
        let doc = generate(&FormatRuleSet::default()).unwrap().document;
        let texts: Vec<&str> = doc.paragraphs().map(|(_, t)| t).collect();
        for level in 1..=3 {
            assert!(texts.contains(&format!("Heading {} example", level).as_str()));
        }
        assert!(texts.contains(&"Body text example"));
        assert_eq!(doc.texts_in_style(LIST_STYLE).count(), 2);
    }

    #[test]
    fn test_summary_page() {
        let mut rules = FormatRuleSet::default();
        rules.margins = Margins::uniform(1.0, LengthUnit::In);
        let doc = generate(&rules).unwrap().document;

        let break_pos = doc.blocks.iter().rposition(|b| *b == Block::PageBreak).unwrap();
        assert_eq!(
            doc.blocks[break_pos + 1],
            Block::paragraph("Heading1", "Applied Formatting Summary")
        );
        let summary: Vec<&str> = doc.texts_in_style(NORMAL_STYLE).collect();
        assert!(summary.contains(&"Font: Times New Roman"));
        assert!(summary.contains(&"Font size: 12 pt"));
        assert!(summary.contains(&"Margins: top 1 in, bottom 1 in, left 1 in, right 1 in"));
    }

    #[test]
    fn test_normal_style_from_rules() {
        let mut rules = FormatRuleSet::default();
        rules.font.family = "Arial".to_string();
        rules.font.size_pt = 11.0;
        rules.line_spacing = 2.0;
        rules.paragraph_spacing_pt = 12.0;
        rules.alignment = Alignment::Justify;

        let doc = TemplateGenerator::default().build_document(&rules).unwrap();
        let normal = doc.style(NORMAL_STYLE).unwrap();
        assert_eq!(normal.font_family, "Arial");
        assert_eq!(normal.size_half_points, 22);
        assert_eq!(normal.line_240ths, 480);
        assert_eq!(normal.space_after_twips, 240);
        assert_eq!(normal.alignment, Alignment::Justify);

        let title = doc.style(TITLE_STYLE).unwrap();
        assert_eq!(title.size_half_points, 26);
        assert!(title.bold);
    }

    #[test]
    fn test_heading_styles_follow_rules() {
        let mut rules = FormatRuleSet::default();
        rules.headings[1].color = "1f4e79".to_string();
        let doc = TemplateGenerator::default().build_document(&rules).unwrap();

        let h1 = doc.style("Heading1").unwrap();
        assert_eq!(h1.size_half_points, 28);
        assert_eq!(h1.alignment, Alignment::Center);
        assert_eq!(h1.outline_level, Some(0));

        let h2 = doc.style("Heading2").unwrap();
        assert_eq!(h2.color, "1F4E79");
        assert!(doc.style("Heading3").unwrap().italic);
    }

    #[test]
    fn test_page_setup_landscape_letter() {
        let mut rules = FormatRuleSet::default();
        rules.paper.size = PaperSize::Letter;
        rules.paper.orientation = Orientation::Landscape;
        rules.margins = Margins::uniform(1.0, LengthUnit::In);

        let page = TemplateGenerator::default().build_document(&rules).unwrap().page;
        assert_eq!(page.width_twips, 15840);
        assert_eq!(page.height_twips, 12240);
        assert_eq!(page.margin_left_twips, 1440);
    }

    #[test]
    fn test_footer_follows_header_footer_rules() {
        let mut rules = FormatRuleSet::default();
        let doc = TemplateGenerator::default().build_document(&rules).unwrap();
        assert!(doc.footer.is_some());

        rules.headers_footers.page_numbers = false;
        let doc = TemplateGenerator::default().build_document(&rules).unwrap();
        assert!(doc.footer.is_none());
    }

    #[test]
    fn test_list_definition() {
        assert_eq!(list_definition(ListStyle::Numbered).format, "decimal");
        assert_eq!(list_definition(ListStyle::Dash).level_text, "\u{2013}");
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let mut rules = FormatRuleSet::default();
        rules.margins.top = -2.0;
        let err = generate(&rules).unwrap_err();
        assert!(matches!(err, TemplateError::TemplateRenderError(_)));

        let mut rules = FormatRuleSet::default();
        rules.headings.clear();
        assert!(generate(&rules).is_err());

        // would not fit the w:after twips field
        let mut rules = FormatRuleSet::default();
        rules.paragraph_spacing_pt = 1e12;
        assert!(generate(&rules).is_err());
    }

    #[test]
    fn test_chapter_detection() {
        assert!(is_chapter_like("chapter one"));
        assert!(is_chapter_like("BAB II"));
        assert!(!is_chapter_like("Appendix"));
        assert!(!is_chapter_like("Probability Tables"));
    }
}
