//! Parse LLM output into a fully populated rule set
//!
//! The model's answer is merged field by field over
//! `FormatRuleSet::default()`. A value is taken when it is present and
//! usable; numeric strings with units ("12pt", "2,5 cm") and spacing words
//! ("double") are coerced. Anything missing or unusable keeps its default and
//! its path is recorded in `defaulted_fields`. Only when no JSON object can
//! be recovered at all does the whole default set stand in.
//!
//! The older shape (`margin`, `spacing.line_spacing`, `font.body_size`,
//! `font.heading_size`, `numbering.page_numbering`) is accepted too.

use guidesmith_domain::{
    default_document_structure, Alignment, FontRules, FormatRuleSet, HeadersFooters,
    HeadingStyle, LengthUnit, ListStyle, Margins, NumberStyle, NumberingRules, Orientation,
    PaperRules, PaperSize, MAX_HEADING_LEVEL, RULE_FIELDS,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Upper bound for any font or heading size, in points
const MAX_SIZE_PT: f64 = 400.0;

/// Upper bound for a line-spacing multiple
const MAX_LINE_SPACING: f64 = 10.0;

/// Result of parsing one model answer
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRules {
    /// The merged rule set
    pub rules: FormatRuleSet,
    /// No JSON object could be recovered
    pub used_fallback: bool,
    /// Paths filled from defaults
    pub defaulted_fields: Vec<String>,
}

impl ParsedRules {
    fn fallback() -> Self {
        Self {
            rules: FormatRuleSet::default(),
            used_fallback: true,
            defaulted_fields: RULE_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Parse a model response into rules, falling back to defaults
pub fn parse_rules(response: &str) -> ParsedRules {
    let object = extract_json_object(response)
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        });

    match object {
        Some(map) => merge_rules(&map),
        None => {
            warn!(
                response_chars = response.chars().count(),
                "No JSON object in model response, using fallback rules"
            );
            ParsedRules::fallback()
        }
    }
}

/// Strip a surrounding Markdown code fence, if any
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            // the opening fence line may carry a language tag
            let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
            body.trim_end().strip_suffix("```").unwrap_or(body)
        }
        None => trimmed,
    }
}

/// The outermost `{...}` span of the response
fn extract_json_object(response: &str) -> Option<&str> {
    let body = strip_code_fences(response);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

fn merge_rules(obj: &Map<String, Value>) -> ParsedRules {
    let defaults = FormatRuleSet::default();
    let mut merger = Merger::default();

    let legacy_spacing = obj.get("spacing").and_then(Value::as_object);
    let legacy_font = obj.get("font").and_then(Value::as_object);

    let font = merger.font(obj.get("font"), &defaults.font);

    let line_spacing = merger.value(
        "line_spacing",
        obj.get("line_spacing")
            .or_else(|| legacy_spacing.and_then(|s| s.get("line_spacing"))),
        line_spacing_multiple,
        defaults.line_spacing,
    );

    let paragraph_spacing_pt = merger.value(
        "paragraph_spacing_pt",
        first(obj, &["paragraph_spacing_pt", "paragraph_spacing"])
            .or_else(|| legacy_spacing.and_then(|s| first(s, &["paragraph_spacing_pt", "paragraph_spacing"]))),
        |v| points(v).filter(|pt| *pt >= 0.0 && *pt <= MAX_SIZE_PT),
        defaults.paragraph_spacing_pt,
    );

    let margins = merger.margins(first(obj, &["margins", "margin"]), &defaults.margins);
    let headings = merger.headings(obj.get("headings"), legacy_font);

    let alignment = merger.value(
        "alignment",
        obj.get("alignment"),
        |v| v.as_str().and_then(Alignment::parse),
        defaults.alignment,
    );
    let list_style = merger.value(
        "list_style",
        first(obj, &["list_style", "bullet_style"]),
        |v| v.as_str().and_then(ListStyle::parse),
        defaults.list_style,
    );

    let paper = merger.paper(obj.get("paper"), &defaults.paper);
    let headers_footers = merger.headers_footers(obj.get("headers_footers"), &defaults.headers_footers);
    let numbering = merger.numbering(obj.get("numbering"), &defaults.numbering);
    let document_structure = merger.value(
        "document_structure",
        obj.get("document_structure"),
        structure_list,
        default_document_structure(),
    );

    let mut rules = FormatRuleSet {
        font,
        line_spacing,
        paragraph_spacing_pt,
        margins,
        headings,
        alignment,
        list_style,
        paper,
        headers_footers,
        numbering,
        document_structure,
    };

    // per-field checks cannot see margins against the page size
    if let Err(reason) = rules.validate() {
        warn!(%reason, "Extracted margins do not fit the page, using default margins");
        rules.margins = defaults.margins.clone();
        merger.record("margins");
    }
    if let Err(reason) = rules.validate() {
        warn!(%reason, "Merged rules still invalid, using fallback rules");
        return ParsedRules::fallback();
    }

    debug!(defaulted = merger.defaulted.len(), "Merged model rules over defaults");

    ParsedRules {
        rules,
        used_fallback: false,
        defaulted_fields: merger.defaulted,
    }
}

/// Collects the paths of fields that were defaulted
#[derive(Default)]
struct Merger {
    defaulted: Vec<String>,
}

impl Merger {
    fn record(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.defaulted.contains(&path) {
            self.defaulted.push(path);
        }
    }

    /// Coerce `value`, or record `path` and return `default`
    fn value<T>(
        &mut self,
        path: &str,
        value: Option<&Value>,
        coerce: impl FnOnce(&Value) -> Option<T>,
        default: T,
    ) -> T {
        match value.and_then(coerce) {
            Some(v) => v,
            None => {
                self.record(path);
                default
            }
        }
    }

    fn font(&mut self, value: Option<&Value>, default: &FontRules) -> FontRules {
        match value {
            Some(Value::Object(map)) => FontRules {
                family: self.value("font.family", map.get("family"), text, default.family.clone()),
                size_pt: self.value(
                    "font.size_pt",
                    first(map, &["size_pt", "size", "body_size"]),
                    size_pt,
                    default.size_pt,
                ),
            },
            Some(Value::String(family)) if !family.trim().is_empty() => {
                self.record("font.size_pt");
                FontRules {
                    family: family.trim().to_string(),
                    size_pt: default.size_pt,
                }
            }
            _ => {
                self.record("font");
                default.clone()
            }
        }
    }

    fn margins(&mut self, value: Option<&Value>, default: &Margins) -> Margins {
        match value {
            Some(Value::Object(map)) => {
                let sides = ["top", "bottom", "left", "right"]
                    .map(|side| (side, map.get(side).and_then(quantity)));

                let declared = map.get("unit").and_then(Value::as_str).and_then(LengthUnit::parse);
                let unit = match declared {
                    Some(unit) => unit,
                    None => {
                        self.record("margins.unit");
                        sides
                            .iter()
                            .find_map(|(_, q)| q.and_then(|(_, unit)| unit))
                            .unwrap_or(default.unit)
                    }
                };

                let defaults = [default.top, default.bottom, default.left, default.right];
                let mut resolved = [0.0; 4];
                for (idx, (side, q)) in sides.iter().enumerate() {
                    resolved[idx] = match q {
                        Some((v, side_unit)) if *v >= 0.0 => {
                            convert(*v, side_unit.unwrap_or(unit), unit)
                        }
                        _ => {
                            self.record(format!("margins.{}", side));
                            convert(defaults[idx], default.unit, unit)
                        }
                    };
                }

                Margins {
                    top: resolved[0],
                    bottom: resolved[1],
                    left: resolved[2],
                    right: resolved[3],
                    unit,
                }
            }
            Some(other) => match quantity(other) {
                Some((v, unit)) if v >= 0.0 => {
                    if unit.is_none() {
                        self.record("margins.unit");
                    }
                    Margins::uniform(v, unit.unwrap_or(default.unit))
                }
                _ => {
                    self.record("margins");
                    default.clone()
                }
            },
            None => {
                self.record("margins");
                default.clone()
            }
        }
    }

    fn headings(
        &mut self,
        value: Option<&Value>,
        legacy_font: Option<&Map<String, Value>>,
    ) -> Vec<HeadingStyle> {
        let entries: Vec<(Option<u8>, &Map<String, Value>)> = match value {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| {
                    item.as_object().map(|o| {
                        let position = u8::try_from(idx + 1).ok();
                        (level_of(o).or(position), o)
                    })
                })
                .collect(),
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(key, item)| {
                    item.as_object()
                        .map(|o| (level_of(o).or_else(|| level_from_key(key)), o))
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut by_level: BTreeMap<u8, HeadingStyle> = BTreeMap::new();
        for (level, entry) in entries {
            let Some(level) = level.filter(|l| (1..=MAX_HEADING_LEVEL).contains(l)) else {
                continue;
            };
            by_level
                .entry(level)
                .or_insert_with(|| self.heading(level, entry));
        }

        let Some(&deepest) = by_level.keys().next_back() else {
            return self.legacy_headings(legacy_font);
        };

        (1..=deepest)
            .map(|level| {
                by_level.remove(&level).unwrap_or_else(|| {
                    self.record(format!("headings.{}", level));
                    HeadingStyle::default_for_level(level)
                })
            })
            .collect()
    }

    fn heading(&mut self, level: u8, entry: &Map<String, Value>) -> HeadingStyle {
        let default = HeadingStyle::default_for_level(level);
        HeadingStyle {
            level,
            size_pt: self.attribute(level, "size_pt", first(entry, &["size_pt", "size"]), size_pt, default.size_pt),
            bold: self.attribute(level, "bold", first(entry, &["bold"]), boolean, default.bold),
            italic: self.attribute(level, "italic", first(entry, &["italic"]), boolean, default.italic),
            color: self.attribute(
                level,
                "color",
                first(entry, &["color", "colour"]),
                hex_color,
                default.color.clone(),
            ),
            alignment: self.attribute(
                level,
                "alignment",
                first(entry, &["alignment", "align"]),
                |v| v.as_str().and_then(Alignment::parse),
                default.alignment,
            ),
        }
    }

    /// Like `value`, but an absent attribute inherits the level default
    /// without being recorded
    fn attribute<T>(
        &mut self,
        level: u8,
        field: &str,
        value: Option<&Value>,
        coerce: impl FnOnce(&Value) -> Option<T>,
        default: T,
    ) -> T {
        let Some(value) = value else {
            return default;
        };
        match coerce(value) {
            Some(parsed) => parsed,
            None => {
                self.record(format!("headings.{}.{}", level, field));
                default
            }
        }
    }

    /// Default headings, sized from `font.heading_size`/`subheading_size`
    fn legacy_headings(&mut self, legacy_font: Option<&Map<String, Value>>) -> Vec<HeadingStyle> {
        let mut headings: Vec<HeadingStyle> = (1..=3).map(HeadingStyle::default_for_level).collect();

        let heading_size = legacy_font
            .and_then(|f| f.get("heading_size"))
            .and_then(size_pt);
        let subheading_size = legacy_font
            .and_then(|f| f.get("subheading_size"))
            .and_then(size_pt);

        if heading_size.is_none() && subheading_size.is_none() {
            self.record("headings");
        }
        if let Some(size) = heading_size {
            headings[0].size_pt = size;
        }
        if let Some(size) = subheading_size {
            headings[1].size_pt = size;
        }
        headings
    }

    fn paper(&mut self, value: Option<&Value>, default: &PaperRules) -> PaperRules {
        match value {
            Some(Value::Object(map)) => PaperRules {
                size: self.value(
                    "paper.size",
                    map.get("size"),
                    |v| v.as_str().and_then(PaperSize::parse),
                    default.size,
                ),
                orientation: self.value(
                    "paper.orientation",
                    map.get("orientation"),
                    |v| v.as_str().and_then(Orientation::parse),
                    default.orientation,
                ),
            },
            Some(Value::String(name)) => match PaperSize::parse(name) {
                Some(size) => {
                    self.record("paper.orientation");
                    PaperRules {
                        size,
                        orientation: default.orientation,
                    }
                }
                None => {
                    self.record("paper");
                    default.clone()
                }
            },
            _ => {
                self.record("paper");
                default.clone()
            }
        }
    }

    fn headers_footers(&mut self, value: Option<&Value>, default: &HeadersFooters) -> HeadersFooters {
        match value {
            Some(Value::Object(map)) => HeadersFooters {
                enabled: self.value("headers_footers.enabled", map.get("enabled"), boolean, default.enabled),
                page_numbers: self.value(
                    "headers_footers.page_numbers",
                    first(map, &["page_numbers", "page_number"]),
                    boolean,
                    default.page_numbers,
                ),
            },
            Some(other) => match boolean(other) {
                Some(enabled) => {
                    self.record("headers_footers.page_numbers");
                    HeadersFooters {
                        enabled,
                        page_numbers: default.page_numbers,
                    }
                }
                None => {
                    self.record("headers_footers");
                    default.clone()
                }
            },
            None => {
                self.record("headers_footers");
                default.clone()
            }
        }
    }

    fn numbering(&mut self, value: Option<&Value>, default: &NumberingRules) -> NumberingRules {
        let style = |v: &Value| v.as_str().and_then(NumberStyle::parse);
        match value {
            Some(Value::Object(map)) => NumberingRules {
                page: self.value(
                    "numbering.page",
                    first(map, &["page", "page_numbering"]),
                    style,
                    default.page,
                ),
                chapter: self.value(
                    "numbering.chapter",
                    first(map, &["chapter", "chapter_numbering"]),
                    style,
                    default.chapter,
                ),
                section: self.value(
                    "numbering.section",
                    first(map, &["section", "section_numbering"]),
                    style,
                    default.section,
                ),
            },
            _ => {
                self.record("numbering");
                default.clone()
            }
        }
    }
}

/// First non-null value among `keys`
fn first<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn quantity_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"^\s*(-?\d+(?:[.,]\d+)?)\s*([A-Za-z]+|")?"#).ok())
        .as_ref()
}

/// A number with an optional length unit: `12`, `"12pt"`, `"2,5 cm"`
fn quantity(value: &Value) -> Option<(f64, Option<LengthUnit>)> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(|v| (v, None)),
        Value::String(s) => {
            let caps = quantity_pattern()?.captures(s)?;
            let number: f64 = caps.get(1)?.as_str().replace(',', ".").parse().ok()?;
            let unit = caps.get(2).and_then(|u| LengthUnit::parse(u.as_str()));
            number.is_finite().then_some((number, unit))
        }
        _ => None,
    }
}

fn convert(value: f64, from: LengthUnit, to: LengthUnit) -> f64 {
    if from == to {
        value
    } else {
        from.to_twips(value) / to.to_twips(1.0)
    }
}

/// A length in points; bare numbers are taken as points
fn points(value: &Value) -> Option<f64> {
    let (number, unit) = quantity(value)?;
    Some(convert(number, unit.unwrap_or(LengthUnit::Pt), LengthUnit::Pt))
}

fn size_pt(value: &Value) -> Option<f64> {
    points(value).filter(|pt| *pt > 0.0 && *pt <= MAX_SIZE_PT)
}

/// Line spacing as a multiple of single spacing
fn line_spacing_multiple(value: &Value) -> Option<f64> {
    if let Value::String(s) = value {
        let lower = s.trim().to_lowercase();
        let word = if lower.contains("half") {
            Some(1.5)
        } else if lower.contains("double") {
            Some(2.0)
        } else if lower.contains("triple") {
            Some(3.0)
        } else if lower.contains("single") {
            Some(1.0)
        } else {
            None
        };
        if word.is_some() {
            return word;
        }
    }
    quantity(value)
        .map(|(number, _)| number)
        .filter(|v| *v > 0.0 && *v <= MAX_LINE_SPACING)
}

fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "no" | "n" | "off" | "0" | "none" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Six hex digits, uppercase, no '#'
fn hex_color(value: &Value) -> Option<String> {
    let raw = value.as_str()?.trim();
    let hex = match raw.to_lowercase().as_str() {
        "black" => "000000".to_string(),
        "white" => "FFFFFF".to_string(),
        _ => raw.trim_start_matches('#').to_uppercase(),
    };
    guidesmith_domain::rules::is_hex_color(&hex).then_some(hex)
}

fn level_of(entry: &Map<String, Value>) -> Option<u8> {
    let (number, _) = quantity(entry.get("level")?)?;
    (number.fract() == 0.0 && number >= 1.0 && number <= MAX_HEADING_LEVEL as f64)
        .then_some(number as u8)
}

/// `"h2"`, `"heading_2"`, `"2"` -> 2
fn level_from_key(key: &str) -> Option<u8> {
    let digits: String = key.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn structure_list(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = value.as_array()?.iter().filter_map(text).collect();
    (!items.is_empty()).then_some(items)
}
