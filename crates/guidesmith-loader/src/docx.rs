//! Paragraph text from `.docx` containers
//!
//! Only `word/document.xml` is read. Text runs (`w:t`) are concatenated per
//! paragraph; `w:tab` inside a run becomes `\t`, `w:br`/`w:cr` become `\n`.
//! Paragraphs inside tables are skipped. Nested paragraphs (text boxes) are
//! folded into the enclosing paragraph.

use crate::LoadError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Largest decompressed `word/document.xml` accepted
const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

pub(crate) fn extract_text(bytes: &[u8]) -> Result<String, LoadError> {
    extract_text_limited(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn extract_text_limited(bytes: &[u8], limit: u64) -> Result<String, LoadError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let part = archive.by_name(DOCUMENT_PART).map_err(|e| match e {
        ZipError::FileNotFound => LoadError::CorruptDocument(format!("missing {}", DOCUMENT_PART)),
        other => other.into(),
    })?;

    let mut xml = String::new();
    // one byte past the limit tells an exact fit from an overflow
    part.take(limit + 1)
        .read_to_string(&mut xml)
        .map_err(|e| LoadError::CorruptDocument(format!("cannot read {}: {}", DOCUMENT_PART, e)))?;
    if xml.len() as u64 > limit {
        return Err(LoadError::CorruptDocument(format!(
            "{} expands beyond {} bytes",
            DOCUMENT_PART, limit
        )));
    }

    paragraphs_from_xml(&xml)
}

fn paragraphs_from_xml(xml: &str) -> Result<String, LoadError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut paragraph_depth = 0usize;
    let mut table_depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" => paragraph_depth += 1,
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" => {
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                    if paragraph_depth == 0 {
                        let text = std::mem::take(&mut current);
                        if table_depth == 0 {
                            paragraphs.push(text);
                        }
                    }
                }
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if paragraph_depth == 0 && table_depth == 0 => {
                    paragraphs.push(String::new())
                }
                // tab stops in paragraph properties share the element name
                b"w:tab" if in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text && paragraph_depth > 0 => {
                current.push_str(&t.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}
