//! WordprocessingML serialization
//!
//! Writes the minimal package Word needs: content types, package and
//! document relationships, `document.xml`, `styles.xml`, `numbering.xml`
//! and, when the template has one, `footer1.xml`. Entries are stored with
//! the zip epoch timestamp and no `docProps` are written, so identical
//! documents produce identical bytes.

use crate::error::TemplateError;
use crate::model::{Block, ListDefinition, PageNumberFooter, ParagraphStyle, TemplateDocument};
use guidesmith_domain::{Alignment, Orientation};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_PACKAGE_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const REL_FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

const CT_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
const CT_FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";
pub(crate) const STYLES_PART: &str = "word/styles.xml";
pub(crate) const NUMBERING_PART: &str = "word/numbering.xml";
pub(crate) const FOOTER_PART: &str = "word/footer1.xml";

const FOOTER_REL_ID: &str = "rId3";
const LIST_NUM_ID: &str = "1";

/// Serialize `doc` into a .docx container
pub(crate) fn write(doc: &TemplateDocument) -> Result<Vec<u8>, TemplateError> {
    let mut parts = vec![
        ("[Content_Types].xml", content_types(doc.footer.is_some())),
        ("_rels/.rels", package_rels()),
        ("word/_rels/document.xml.rels", document_rels(doc.footer.is_some())),
        (DOCUMENT_PART, document_xml(doc)),
        (STYLES_PART, styles_xml(&doc.styles)),
        (NUMBERING_PART, numbering_xml(&doc.list)),
    ];
    if let Some(footer) = &doc.footer {
        parts.push((FOOTER_PART, footer_xml(footer)));
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, xml) in parts {
        zip.start_file(name, options)?;
        zip.write_all(xml.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

/// Minimal string-backed XML emitter with escaping
struct Xml {
    out: String,
}

impl Xml {
    fn new() -> Self {
        Self {
            out: XML_DECLARATION.to_string(),
        }
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, &str)], self_closing: bool) -> &mut Self {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape(*value));
            self.out.push('"');
        }
        self.out.push_str(if self_closing { "/>" } else { ">" });
        self
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.tag(name, attrs, false)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.tag(name, attrs, true)
    }

    fn close(&mut self, name: &str) -> &mut Self {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
        self
    }

    fn text(&mut self, text: &str) -> &mut Self {
        self.out.push_str(&escape(text));
        self
    }

    fn val(&mut self, name: &str, value: &str) -> &mut Self {
        self.empty(name, &[("w:val", value)])
    }

    fn finish(self) -> String {
        self.out
    }
}

fn jc(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

fn content_types(with_footer: bool) -> String {
    let mut xml = Xml::new();
    xml.open("Types", &[("xmlns", NS_CONTENT_TYPES)])
        .empty(
            "Default",
            &[
                ("Extension", "rels"),
                ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
            ],
        )
        .empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")]);

    let mut overrides = vec![
        ("/word/document.xml", CT_MAIN),
        ("/word/styles.xml", CT_STYLES),
        ("/word/numbering.xml", CT_NUMBERING),
    ];
    if with_footer {
        overrides.push(("/word/footer1.xml", CT_FOOTER));
    }
    for (part, content_type) in overrides {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)]);
    }
    xml.close("Types");
    xml.finish()
}

fn package_rels() -> String {
    let mut xml = Xml::new();
    xml.open("Relationships", &[("xmlns", NS_PACKAGE_RELS)])
        .empty(
            "Relationship",
            &[("Id", "rId1"), ("Type", REL_OFFICE_DOCUMENT), ("Target", "word/document.xml")],
        )
        .close("Relationships");
    xml.finish()
}

fn document_rels(with_footer: bool) -> String {
    let mut xml = Xml::new();
    xml.open("Relationships", &[("xmlns", NS_PACKAGE_RELS)])
        .empty("Relationship", &[("Id", "rId1"), ("Type", REL_STYLES), ("Target", "styles.xml")])
        .empty(
            "Relationship",
            &[("Id", "rId2"), ("Type", REL_NUMBERING), ("Target", "numbering.xml")],
        );
    if with_footer {
        xml.empty(
            "Relationship",
            &[("Id", FOOTER_REL_ID), ("Type", REL_FOOTER), ("Target", "footer1.xml")],
        );
    }
    xml.close("Relationships");
    xml.finish()
}

fn document_xml(doc: &TemplateDocument) -> String {
    let mut xml = Xml::new();
    xml.open("w:document", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])
        .open("w:body", &[]);

    for block in &doc.blocks {
        match block {
            Block::Paragraph { style, text } => {
                xml.open("w:p", &[])
                    .open("w:pPr", &[])
                    .val("w:pStyle", style)
                    .close("w:pPr")
                    .open("w:r", &[])
                    .open("w:t", &[("xml:space", "preserve")])
                    .text(text)
                    .close("w:t")
                    .close("w:r")
                    .close("w:p");
            }
            Block::PageBreak => {
                xml.open("w:p", &[])
                    .open("w:r", &[])
                    .empty("w:br", &[("w:type", "page")])
                    .close("w:r")
                    .close("w:p");
            }
        }
    }

    let page = &doc.page;
    xml.open("w:sectPr", &[]);
    if doc.footer.is_some() {
        xml.empty("w:footerReference", &[("w:type", "default"), ("r:id", FOOTER_REL_ID)]);
    }

    let width = page.width_twips.to_string();
    let height = page.height_twips.to_string();
    let mut size: Vec<(&str, &str)> = vec![("w:w", width.as_str()), ("w:h", height.as_str())];
    if page.orientation == Orientation::Landscape {
        size.push(("w:orient", "landscape"));
    }
    xml.empty("w:pgSz", &size);

    let top = page.margin_top_twips.to_string();
    let right = page.margin_right_twips.to_string();
    let bottom = page.margin_bottom_twips.to_string();
    let left = page.margin_left_twips.to_string();
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", top.as_str()),
            ("w:right", right.as_str()),
            ("w:bottom", bottom.as_str()),
            ("w:left", left.as_str()),
            ("w:header", "708"),
            ("w:footer", "708"),
            ("w:gutter", "0"),
        ],
    )
    .empty("w:pgNumType", &[("w:fmt", page.page_number_format.as_str())])
    .close("w:sectPr")
    .close("w:body")
    .close("w:document");
    xml.finish()
}

fn run_fonts(xml: &mut Xml, family: &str) {
    xml.empty(
        "w:rFonts",
        &[
            ("w:ascii", family),
            ("w:hAnsi", family),
            ("w:eastAsia", family),
            ("w:cs", family),
        ],
    );
}

fn styles_xml(styles: &[ParagraphStyle]) -> String {
    let mut xml = Xml::new();
    xml.open("w:styles", &[("xmlns:w", NS_W)]);

    if let Some(normal) = styles.first() {
        let size = normal.size_half_points.to_string();
        xml.open("w:docDefaults", &[])
            .open("w:rPrDefault", &[])
            .open("w:rPr", &[]);
        run_fonts(&mut xml, &normal.font_family);
        xml.val("w:sz", &size)
            .val("w:szCs", &size)
            .close("w:rPr")
            .close("w:rPrDefault")
            .close("w:docDefaults");
    }

    for (idx, style) in styles.iter().enumerate() {
        style_xml(&mut xml, style, idx == 0);
    }

    xml.close("w:styles");
    xml.finish()
}

fn style_xml(xml: &mut Xml, style: &ParagraphStyle, is_default: bool) {
    let mut attrs = vec![("w:type", "paragraph")];
    if is_default {
        attrs.push(("w:default", "1"));
    }
    attrs.push(("w:styleId", style.id.as_str()));

    xml.open("w:style", &attrs).val("w:name", &style.name);
    if let Some(base) = &style.based_on {
        xml.val("w:basedOn", base);
    }
    xml.empty("w:qFormat", &[]);

    let after = style.space_after_twips.to_string();
    let line = style.line_240ths.to_string();
    xml.open("w:pPr", &[]);
    if style.outline_level.is_some() {
        xml.empty("w:keepNext", &[]);
    }
    if style.numbered {
        xml.open("w:numPr", &[])
            .val("w:ilvl", "0")
            .val("w:numId", LIST_NUM_ID)
            .close("w:numPr");
    }
    xml.empty(
        "w:spacing",
        &[("w:after", after.as_str()), ("w:line", line.as_str()), ("w:lineRule", "auto")],
    )
    .val("w:jc", jc(style.alignment));
    if let Some(level) = style.outline_level {
        xml.val("w:outlineLvl", &level.to_string());
    }
    xml.close("w:pPr");

    let size = style.size_half_points.to_string();
    xml.open("w:rPr", &[]);
    run_fonts(xml, &style.font_family);
    if style.bold {
        xml.empty("w:b", &[]).empty("w:bCs", &[]);
    }
    if style.italic {
        xml.empty("w:i", &[]).empty("w:iCs", &[]);
    }
    xml.val("w:color", &style.color)
        .val("w:sz", &size)
        .val("w:szCs", &size)
        .close("w:rPr")
        .close("w:style");
}

fn numbering_xml(list: &ListDefinition) -> String {
    let mut xml = Xml::new();
    xml.open("w:numbering", &[("xmlns:w", NS_W)])
        .open("w:abstractNum", &[("w:abstractNumId", "0")])
        .val("w:multiLevelType", "singleLevel")
        .open("w:lvl", &[("w:ilvl", "0")])
        .val("w:start", "1")
        .val("w:numFmt", &list.format)
        .val("w:lvlText", &list.level_text)
        .val("w:lvlJc", "left")
        .open("w:pPr", &[])
        .empty("w:ind", &[("w:left", "720"), ("w:hanging", "360")])
        .close("w:pPr")
        .close("w:lvl")
        .close("w:abstractNum")
        .open("w:num", &[("w:numId", LIST_NUM_ID)])
        .val("w:abstractNumId", "0")
        .close("w:num")
        .close("w:numbering");
    xml.finish()
}

fn footer_xml(footer: &PageNumberFooter) -> String {
    let mut xml = Xml::new();
    xml.open("w:ftr", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])
        .open("w:p", &[])
        .open("w:pPr", &[])
        .val("w:jc", jc(footer.alignment))
        .close("w:pPr")
        .open("w:r", &[])
        .empty("w:fldChar", &[("w:fldCharType", "begin")])
        .close("w:r")
        .open("w:r", &[])
        .open("w:instrText", &[("xml:space", "preserve")])
        .text(" PAGE ")
        .close("w:instrText")
        .close("w:r")
        .open("w:r", &[])
        .empty("w:fldChar", &[("w:fldCharType", "separate")])
        .close("w:r")
        .open("w:r", &[])
        .open("w:t", &[])
        .text("1")
        .close("w:t")
        .close("w:r")
        .open("w:r", &[])
        .empty("w:fldChar", &[("w:fldCharType", "end")])
        .close("w:r")
        .close("w:p")
        .close("w:ftr");
    xml.finish()
}
