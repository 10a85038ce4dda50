//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use guidesmith_domain::FormatRuleSet;
use guidesmith_service::ExtractedRules;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a rule set.
    pub fn format_rules(&self, rules: &FormatRuleSet) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(rules)?),
            OutputFormat::Table => Ok(self.format_rules_table(rules)),
        }
    }

    /// Format the rules extracted from one guide, with provenance.
    pub fn format_extraction(&self, file: &str, extracted: &ExtractedRules) -> Result<String> {
        let extraction = &extracted.extraction;
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "file": file,
                    "model": extraction.model,
                    "fingerprint": extracted.fingerprint.to_hex(),
                    "from_cache": extracted.from_cache(),
                    "truncated": extracted.truncated,
                    "used_fallback": extraction.used_fallback,
                    "defaulted_fields": extraction.defaulted_fields,
                    "rules": extraction.rules,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let mut out = vec![self.colorize(&format!("Rules extracted from {}", file), "cyan")];
                out.push(self.format_rules_table(&extraction.rules));

                let source = if extracted.from_cache() {
                    "cache".to_string()
                } else {
                    format!("{} ({} attempt(s))", extraction.model, extraction.attempts)
                };
                out.push(self.info(&format!("Source: {}", source)));

                if extracted.truncated {
                    out.push(self.warning(&format!(
                        "Guide truncated from {} characters",
                        extracted.original_chars
                    )));
                }
                if extraction.used_fallback {
                    out.push(self.warning("Model answer unreadable, default rules used"));
                } else if !extraction.defaulted_fields.is_empty() {
                    out.push(self.info(&format!(
                        "Defaulted: {}",
                        extraction.defaulted_fields.join(", ")
                    )));
                }
                Ok(out.join("\n"))
            }
        }
    }

    /// Format rules as a category / setting / value table.
    fn format_rules_table(&self, rules: &FormatRuleSet) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Category", "Setting", "Value"]);

        for [category, setting, value] in rule_rows(rules) {
            builder.push_record([category, setting, value]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// One row per setting, grouped by category.
fn rule_rows(rules: &FormatRuleSet) -> Vec<[String; 3]> {
    let row = |category: &str, setting: &str, value: String| {
        [category.to_string(), setting.to_string(), value]
    };
    let m = &rules.margins;
    let unit = m.unit.as_str();

    let mut rows = vec![
        row("font", "family", rules.font.family.clone()),
        row("font", "size", format!("{} pt", rules.font.size_pt)),
        row("spacing", "line", rules.line_spacing.to_string()),
        row("spacing", "after paragraph", format!("{} pt", rules.paragraph_spacing_pt)),
        row("margins", "top", format!("{} {}", m.top, unit)),
        row("margins", "bottom", format!("{} {}", m.bottom, unit)),
        row("margins", "left", format!("{} {}", m.left, unit)),
        row("margins", "right", format!("{} {}", m.right, unit)),
    ];

    for heading in &rules.headings {
        let mut traits = vec![format!("{} pt", heading.size_pt)];
        if heading.bold {
            traits.push("bold".to_string());
        }
        if heading.italic {
            traits.push("italic".to_string());
        }
        traits.push(heading.alignment.as_str().to_string());
        traits.push(format!("#{}", heading.color));
        rows.push(row("headings", &format!("level {}", heading.level), traits.join(", ")));
    }

    rows.extend([
        row("layout", "alignment", rules.alignment.as_str().to_string()),
        row("layout", "list style", rules.list_style.as_str().to_string()),
        row("paper", "size", rules.paper.size.as_str().to_string()),
        row("paper", "orientation", rules.paper.orientation.as_str().to_string()),
        row("headers/footers", "enabled", rules.headers_footers.enabled.to_string()),
        row("headers/footers", "page numbers", rules.headers_footers.page_numbers.to_string()),
        row("numbering", "page", rules.numbering.page.as_str().to_string()),
        row("numbering", "chapter", rules.numbering.chapter.as_str().to_string()),
        row("numbering", "section", rules.numbering.section.as_str().to_string()),
    ]);

    for (idx, entry) in rules.document_structure.iter().enumerate() {
        rows.push(row("structure", &(idx + 1).to_string(), entry.clone()));
    }

    rows
}
