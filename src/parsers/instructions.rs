use crate::model::InstructionSection;
use html_escape::decode_html_entities;
use log::debug;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

/// Label used for steps that don't belong to a named section.
pub const GENERIC_SECTION: &str = "Instructions";

static LIST_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+\s*[.)]|[-*•])\s+").expect("Invalid list prefix regex")
});

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));

/// The shapes `recipeInstructions` items show up in.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Value")]
pub enum InstructionItem {
    Text(String),
    Step {
        text: Option<String>,
        name: Option<String>,
    },
    Section {
        name: Option<String>,
        items: Vec<InstructionItem>,
    },
    Nested(Vec<InstructionItem>),
    Unrecognized,
}

impl From<Value> for InstructionItem {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => InstructionItem::Text(s),
            Value::Array(items) => {
                InstructionItem::Nested(items.into_iter().map(InstructionItem::from).collect())
            }
            Value::Object(ref obj) => {
                let string_field = |key: &str| {
                    obj.get(key)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .filter(|s| !s.trim().is_empty())
                };
                let elements = obj.get("itemListElement");
                if has_type(&value, "HowToSection") || elements.is_some_and(Value::is_array) {
                    let items = match elements {
                        Some(Value::Array(items)) => {
                            items.iter().cloned().map(InstructionItem::from).collect()
                        }
                        _ => Vec::new(),
                    };
                    InstructionItem::Section {
                        name: string_field("name"),
                        items,
                    }
                } else if obj.contains_key("text") || obj.contains_key("name") {
                    InstructionItem::Step {
                        text: string_field("text"),
                        name: string_field("name"),
                    }
                } else {
                    InstructionItem::Unrecognized
                }
            }
            _ => InstructionItem::Unrecognized,
        }
    }
}

/// Checks `@type` as either a string or an array of strings.
pub(crate) fn has_type(value: &Value, wanted: &str) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case(wanted),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case(wanted)),
        _ => false,
    }
}

fn clean_step(text: &str) -> String {
    let decoded = decode_html_entities(&decode_html_entities(text)).into_owned();
    let stripped = HTML_TAG.replace_all(&decoded, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct SectionBuilder {
    sections: Vec<InstructionSection>,
    loose: Vec<String>,
}

impl SectionBuilder {
    fn new() -> Self {
        Self {
            sections: Vec::new(),
            loose: Vec::new(),
        }
    }

    fn push_loose(&mut self, text: &str) {
        let step = clean_step(text);
        if !step.is_empty() {
            self.loose.push(step);
        }
    }

    fn flush(&mut self) {
        if !self.loose.is_empty() {
            self.sections.push(InstructionSection {
                section: GENERIC_SECTION.to_string(),
                steps: std::mem::take(&mut self.loose),
            });
        }
    }

    fn add(&mut self, item: &InstructionItem) {
        match item {
            InstructionItem::Text(text) => {
                for line in text.lines() {
                    self.push_loose(line);
                }
            }
            InstructionItem::Step { text, name } => {
                if let Some(step) = text.as_ref().or(name.as_ref()) {
                    self.push_loose(step);
                }
            }
            InstructionItem::Section { name, items } => {
                self.flush();
                let mut steps = Vec::new();
                collect_section_steps(items, &mut steps);
                if !steps.is_empty() {
                    let label = name
                        .as_deref()
                        .map(clean_step)
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| GENERIC_SECTION.to_string());
                    self.sections.push(InstructionSection {
                        section: label,
                        steps,
                    });
                }
            }
            InstructionItem::Nested(items) => {
                for item in items {
                    self.add(item);
                }
            }
            InstructionItem::Unrecognized => {
                debug!("Skipping unrecognized instruction shape");
            }
        }
    }

    fn finish(mut self) -> Vec<InstructionSection> {
        self.flush();
        self.sections.retain(|s| !s.steps.is_empty());
        self.sections
    }
}

fn collect_section_steps(items: &[InstructionItem], steps: &mut Vec<String>) {
    for item in items {
        let text = match item {
            InstructionItem::Text(text) => Some(text.as_str()),
            InstructionItem::Step { text, name } => text.as_deref().or(name.as_deref()),
            InstructionItem::Section { items, .. } | InstructionItem::Nested(items) => {
                collect_section_steps(items, steps);
                None
            }
            InstructionItem::Unrecognized => None,
        };
        if let Some(step) = text.map(clean_step).filter(|s| !s.is_empty()) {
            steps.push(step);
        }
    }
}

/// Converts a schema.org `recipeInstructions` value into sections.
///
/// Accepts a newline-separated string, arrays of strings, `HowToStep` and
/// `HowToSection` objects (arrays may nest), or a single object. Steps
/// outside any section are grouped under [`GENERIC_SECTION`].
pub fn parse_schema_instructions(value: &Value) -> Vec<InstructionSection> {
    let mut builder = SectionBuilder::new();
    builder.add(&InstructionItem::from(value.clone()));
    builder.finish()
}

/// Splits pasted instruction text into a single section of steps.
///
/// When any line carries a number or bullet prefix the text is treated as a
/// list and prefixes are removed; otherwise each non-empty line is a step.
pub fn parse_freeform_instructions(text: &str) -> Vec<InstructionSection> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let list_mode = lines.iter().any(|l| LIST_PREFIX.is_match(l));
    debug!(
        "Parsing {} instruction lines in {} mode",
        lines.len(),
        if list_mode { "list" } else { "paragraph" }
    );

    let steps: Vec<String> = lines
        .into_iter()
        .map(|line| {
            if list_mode {
                LIST_PREFIX.replace(line, "").trim().to_string()
            } else {
                line.to_string()
            }
        })
        .filter(|s| !s.is_empty())
        .collect();

    if steps.is_empty() {
        return Vec::new();
    }
    vec![InstructionSection {
        section: GENERIC_SECTION.to_string(),
        steps,
    }]
}
