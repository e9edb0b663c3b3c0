use super::{Extractor, ParsingContext};
use crate::error::ImportError;
use crate::model::Recipe;
use crate::parsers::instructions::has_type;
use crate::url_to_text::html::schema::map_recipe;
use log::debug;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

/// JSON-LD script tags, case-insensitive on the type attribute
static JSON_LD_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("Invalid JSON-LD regex")
});

pub struct JsonLdExtractor;

/// What a page's JSON-LD blocks yielded.
#[derive(Debug, Default)]
pub struct JsonLdScan {
    /// Number of `application/ld+json` blocks found, parseable or not
    pub blocks: usize,
    /// Every successfully parsed object, top-level arrays flattened
    pub candidates: Vec<Value>,
}

/// Collects the JSON-LD blocks of a page.
///
/// Blocks are parsed independently; a malformed block is skipped. When the
/// regex scan finds no blocks at all, the document is parsed and scanned
/// again, which catches unquoted or unusual attribute spellings.
pub fn scan_json_ld(html: &str) -> JsonLdScan {
    let mut raw_blocks: Vec<String> = JSON_LD_SCRIPT
        .captures_iter(html)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect();

    if raw_blocks.is_empty() {
        let document = Html::parse_document(html);
        if let Ok(selector) = Selector::parse("script[type='application/ld+json']") {
            raw_blocks = document.select(&selector).map(|s| s.inner_html()).collect();
        }
    }

    debug!("JsonLdExtractor: Found {} JSON-LD script tags", raw_blocks.len());

    let mut scan = JsonLdScan {
        blocks: raw_blocks.len(),
        candidates: Vec::new(),
    };
    for (index, raw) in raw_blocks.iter().enumerate() {
        match serde_json::from_str::<Value>(&sanitize_json(raw)) {
            Ok(Value::Array(items)) => scan.candidates.extend(items),
            Ok(value) => scan.candidates.push(value),
            Err(e) => debug!("JsonLdExtractor: Skipping malformed block {}: {}", index, e),
        }
    }
    scan
}

fn is_recipe_type(value: &Value) -> bool {
    has_type(value, "Recipe")
}

/// Finds the first `Recipe` object, either at the top level of a candidate
/// or inside its `@graph`.
pub fn find_recipe(candidates: &[Value]) -> Option<&Value> {
    candidates.iter().find_map(|candidate| {
        if is_recipe_type(candidate) {
            return Some(candidate);
        }
        candidate
            .get("@graph")
            .and_then(Value::as_array)
            .and_then(|graph| graph.iter().find(|item| is_recipe_type(item)))
    })
}

/// Whether the document declares itself AMP (`<html amp>` or `<html ⚡>`).
pub fn page_declares_amp(html: &str) -> bool {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("html") else {
        return false;
    };
    document
        .select(&selector)
        .next()
        .map(|root| root.value().attrs().any(|(name, _)| name == "amp" || name == "⚡"))
        .unwrap_or(false)
}

impl Extractor for JsonLdExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<Recipe, ImportError> {
        debug!("JsonLdExtractor: Starting parse for URL: {}", context.url);
        let scan = scan_json_ld(&context.html);

        if scan.blocks == 0 {
            return if context.amp_url || page_declares_amp(&context.html) {
                Err(ImportError::AmpWithoutRecipeData)
            } else {
                Err(ImportError::NonStandardFormatting)
            };
        }

        let recipe = find_recipe(&scan.candidates).ok_or_else(|| {
            debug!(
                "JsonLdExtractor: {} candidates, none typed Recipe",
                scan.candidates.len()
            );
            ImportError::NoRecipeData
        })?;

        map_recipe(recipe, &context.url)
    }
}

/// Repairs the common ways sites break their JSON-LD.
///
/// Strips HTML comment and CDATA wrappers, escapes raw newlines and tabs
/// inside strings and drops trailing commas before `]`/`}`.
fn sanitize_json(json_str: &str) -> String {
    let trimmed = json_str
        .trim()
        .trim_start_matches("<!--")
        .trim_end_matches("-->")
        .trim()
        .trim_start_matches("//<![CDATA[")
        .trim_end_matches("//]]>")
        .trim();

    let chars: Vec<char> = trimmed.chars().collect();
    let mut cleaned = String::with_capacity(trimmed.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    cleaned.push(c);
                }
                '\\' => {
                    escaped = true;
                    cleaned.push(c);
                }
                '"' => {
                    in_string = false;
                    cleaned.push(c);
                }
                '\n' => cleaned.push_str("\\n"),
                '\r' => {}
                '\t' => cleaned.push_str("\\t"),
                _ => cleaned.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                cleaned.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some(']') | Some('}')) {
                    cleaned.push(c);
                }
            }
            _ => cleaned.push(c),
        }
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_html_document(json_ld: &str) -> String {
        format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <script type="application/ld+json">
                    {json_ld}
                </script>
            </head>
            <body></body>
            </html>
            "#
        )
    }

    fn context(html: String) -> ParsingContext {
        ParsingContext {
            url: "http://example.com".to_string(),
            html,
            amp_url: false,
        }
    }

    #[test]
    fn test_no_blocks_is_non_standard() {
        let ctx = context("<html><body>Test</body></html>".to_string());
        let err = JsonLdExtractor.parse(&ctx).unwrap_err();
        assert!(matches!(err, ImportError::NonStandardFormatting));
    }

    #[test]
    fn test_no_blocks_on_amp_page() {
        let ctx = context("<html amp><body>Test</body></html>".to_string());
        let err = JsonLdExtractor.parse(&ctx).unwrap_err();
        assert!(matches!(err, ImportError::AmpWithoutRecipeData));

        let mut ctx = context("<html><body>Test</body></html>".to_string());
        ctx.amp_url = true;
        let err = JsonLdExtractor.parse(&ctx).unwrap_err();
        assert!(matches!(err, ImportError::AmpWithoutRecipeData));
    }

    #[test]
    fn test_blocks_without_recipe() {
        let html = create_html_document(r#"{"@type": "WebSite", "name": "Recipe Website"}"#);
        let err = JsonLdExtractor.parse(&context(html)).unwrap_err();
        assert!(matches!(err, ImportError::NoRecipeData));
    }

    #[test]
    fn test_malformed_block_then_valid_block() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">{broken}</script>
            <script type="application/ld+json">
                {"@context": "https://schema.org", "@type": "Recipe", "name": "Tomato Soup"}
            </script>
            </head></html>
        "#;
        let scan = scan_json_ld(html);
        assert_eq!(scan.blocks, 2);
        assert_eq!(scan.candidates.len(), 1);

        let recipe = JsonLdExtractor.parse(&context(html.to_string())).unwrap();
        assert_eq!(recipe.name, "Tomato Soup");
    }

    #[test]
    fn test_recipe_in_graph_and_type_array() {
        let html = create_html_document(
            r#"{
                "@context": "https://schema.org",
                "@graph": [
                    {"@type": "WebPage", "name": "Page"},
                    {"@type": ["Recipe", "NewsArticle"], "name": "Graph Pie"}
                ]
            }"#,
        );
        let recipe = JsonLdExtractor.parse(&context(html)).unwrap();
        assert_eq!(recipe.name, "Graph Pie");
    }

    #[test]
    fn test_top_level_array_is_flattened() {
        let html = create_html_document(
            r#"[
                {"@type": "WebSite", "name": "Recipe Website"},
                {"@type": "recipe", "name": "Pasta Carbonara"}
            ]"#,
        );
        let scan = scan_json_ld(&html);
        assert_eq!(scan.candidates.len(), 2);
        assert_eq!(
            find_recipe(&scan.candidates).unwrap()["name"],
            "Pasta Carbonara"
        );
    }

    #[test]
    fn test_unquoted_type_attribute_uses_dom_scan() {
        let html = r#"<html><head><script type=application/ld+json>{"@type":"Recipe","name":"Dom Cake"}</script></head></html>"#;
        let scan = scan_json_ld(html);
        assert_eq!(scan.blocks, 1);
        assert_eq!(find_recipe(&scan.candidates).unwrap()["name"], "Dom Cake");
    }

    #[test]
    fn test_sanitize_json() {
        assert_eq!(sanitize_json(r#"{"a": [1, 2,], }"#), r#"{"a": [1, 2] }"#);
        assert_eq!(sanitize_json("<!-- {\"a\": 1} -->"), "{\"a\": 1}");
        assert_eq!(sanitize_json("{\"a\": \"line\nbreak\"}"), "{\"a\": \"line\\nbreak\"}");
        assert_eq!(sanitize_json(r#"{"a": "x, ]"}"#), r#"{"a": "x, ]"}"#);
    }
}
