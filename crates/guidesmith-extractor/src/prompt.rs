//! LLM prompt engineering for rule extraction

use crate::normalize::NormalizedText;
use guidesmith_domain::LlmRequest;

/// Builds the single extraction request for one guide
pub struct PromptBuilder<'a> {
    text: &'a NormalizedText,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a NormalizedText) -> Self {
        Self { text }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Instruction and output format
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Truncation notice
        if self.text.is_truncated() {
            prompt.push_str(&format!(
                "Note: the guide was cut to its first {} of {} characters. \
                 Do not guess rules from the missing part.\n\n",
                self.text.char_count(),
                self.text.original_chars()
            ));
        }

        // 3. The guide to analyze
        prompt.push_str("Style guide:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text.as_str());
        prompt.push_str("\n---\n\n");

        // 4. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    /// Build the backend request (system preamble plus prompt)
    pub fn request(&self, temperature: f32) -> LlmRequest {
        LlmRequest::new(SYSTEM_PREAMBLE, self.build()).with_temperature(temperature)
    }
}

/// System instruction sent with every extraction
pub const SYSTEM_PREAMBLE: &str = "You are a meticulous document-formatting analyst. \
You read style guides and thesis writing manuals and extract every formatting rule \
they state, precisely and without invention.";

const EXTRACTION_INSTRUCTIONS: &str = r#"Extract the document formatting rules from the style guide below.
Answer with ONE JSON object with exactly these fields:

{
  "font": {"family": "Times New Roman", "size_pt": 12},
  "line_spacing": 1.5,
  "paragraph_spacing_pt": 6,
  "margins": {"top": 3, "bottom": 3, "left": 4, "right": 3, "unit": "cm"},
  "headings": [
    {"level": 1, "size_pt": 14, "bold": true, "italic": false, "color": "000000", "alignment": "center"},
    {"level": 2, "size_pt": 12, "bold": true, "italic": false, "color": "000000", "alignment": "left"}
  ],
  "alignment": "left",
  "list_style": "bullet",
  "paper": {"size": "a4", "orientation": "portrait"},
  "headers_footers": {"enabled": true, "page_numbers": true},
  "numbering": {"page": "arabic", "chapter": "roman_upper", "section": "decimal"},
  "document_structure": ["Title Page", "Table of Contents", "Chapter I Introduction"]
}

Rules:
- Sizes are numbers in points; line_spacing is a multiple of single spacing (1, 1.15, 1.5, 2)
- margins.unit is one of "cm", "mm", "in", "pt"
- alignment is one of "left", "center", "right", "justify"
- list_style is one of "bullet", "numbered", "dash"
- paper.size is one of "a4", "letter", "legal"; orientation is "portrait" or "landscape"
- numbering styles are one of "arabic", "roman_upper", "roman_lower", "letter_upper", "letter_lower", "decimal"
- headings lists levels 1..N in order; color is six hex digits without '#'
- document_structure lists the required sections in order, using the guide's own titles
- Omit a field entirely when the guide does not state it; do not copy the example values"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Remember: Return ONLY the JSON object, no markdown code blocks, no explanations.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use guidesmith_domain::RULE_FIELDS;

    #[test]
    fn test_prompt_includes_text() {
        let text = normalize("Use Garamond 11pt throughout.", 100);
        let prompt = PromptBuilder::new(&text).build();
        assert!(prompt.contains("Use Garamond 11pt throughout."));
        assert!(prompt.contains("Style guide:"));
    }

    #[test]
    fn test_prompt_names_every_rule_field() {
        let text = normalize("guide", 100);
        let prompt = PromptBuilder::new(&text).build();
        for field in RULE_FIELDS {
            assert!(
                prompt.contains(&format!("\"{}\"", field)),
                "prompt does not mention {}",
                field
            );
        }
    }

    #[test]
    fn test_truncation_notice() {
        let full = normalize("short", 100);
        assert!(!PromptBuilder::new(&full).build().contains("was cut"));

        let cut = normalize(&"a".repeat(50), 10);
        let prompt = PromptBuilder::new(&cut).build();
        assert!(prompt.contains("first 10 of 50 characters"));
    }

    #[test]
    fn test_request_carries_system_and_temperature() {
        let text = normalize("guide", 100);
        let request = PromptBuilder::new(&text).request(0.3);
        assert_eq!(request.system, SYSTEM_PREAMBLE);
        assert_eq!(request.temperature, 0.3);
        assert!(request.prompt.ends_with(OUTPUT_FORMAT_REMINDER));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let text = normalize("Margins 2.5 cm all round", 100);
        assert_eq!(
            PromptBuilder::new(&text).build(),
            PromptBuilder::new(&text).build()
        );
    }
}
