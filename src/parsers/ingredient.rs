//! Free-text ingredient lines into structured [`Ingredient`] records.
//!
//! A line goes through a fixed cascade: cleanup, annotation filter, the
//! salt-and-pepper split, leading parenthetical/slash measures, size notes,
//! number/unit adjacency, and finally name/preparation separation. Each
//! stage is a first-match-wins table of patterns.

use crate::model::{Category, Ingredient};
use crate::parsers::category::categorize;
use crate::parsers::quantity::{normalize_fractions, parse_quantity};
use html_escape::decode_html_entities;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Number, fraction, mixed number or range of those.
const QTY: &str = r"\d+(?:\.\d+)?(?:\s+\d+/\d+|/\d+)?(?:\s*(?:-|–|to)\s*\d+(?:\.\d+)?(?:\s+\d+/\d+|/\d+)?)?";

/// Known units, most specific spelling first, ending with bare size words.
const UNITS: &[&str] = &[
    "tablespoons", "tablespoon", "tbsps", "tbsp", "tbs", "tbl",
    "teaspoons", "teaspoon", "tsps", "tsp",
    "cups", "cup",
    "fluid ounces", "fluid ounce", "fl. oz", "fl oz",
    "ounces", "ounce", "oz",
    "pounds", "pound", "lbs", "lb",
    "kilograms", "kilogram", "kgs", "kg",
    "grams", "gram", "grs", "gr", "g",
    "milligrams", "milligram", "mg",
    "milliliters", "milliliter", "millilitres", "millilitre", "ml",
    "liters", "liter", "litres", "litre", "l",
    "pints", "pint", "pt",
    "quarts", "quart", "qt",
    "gallons", "gallon", "gal",
    "cloves", "clove",
    "cans", "can",
    "jars", "jar",
    "packages", "package", "pkgs", "pkg", "packets", "packet",
    "sticks", "stick",
    "slices", "slice",
    "pieces", "piece",
    "bunches", "bunch",
    "sprigs", "sprig",
    "heads", "head",
    "stalks", "stalk",
    "handfuls", "handful",
    "pinches", "pinch",
    "dashes", "dash",
    "drops", "drop",
    "bags", "bag",
    "boxes", "box",
    "bottles", "bottle",
    "containers", "container",
    "fillets", "fillet",
    "sheets", "sheet",
    "whole", "large", "medium", "small",
];

const METRIC_UNITS: &str = "kg|mg|ml|cl|dl|gr|g|l|oz|lbs|lb";

/// Words that, right after a comma, mark the rest of the line as preparation.
const PREPARATION_WORDS: &[&str] = &[
    "diced", "chopped", "minced", "sliced", "grated", "shredded", "peeled", "crushed",
    "melted", "softened", "cubed", "julienned", "halved", "quartered", "trimmed", "rinsed",
    "drained", "divided", "beaten", "sifted", "toasted", "thinly", "finely", "roughly",
    "coarsely", "freshly", "cut", "torn", "seeded", "deseeded", "cored", "deveined",
    "zested", "juiced", "packed", "lightly", "whisked", "mashed", "pitted", "stemmed",
    "patted", "thawed", "warmed", "chilled", "cold", "boiled", "cooked", "uncooked",
    "room temperature", "at room temperature", "optional", "to taste", "for garnish",
    "for serving", "for dusting", "for frying", "plus more", "or more", "or to taste",
    "about", "approximately", "separated", "smashed", "crumbled", "cleaned", "washed",
    "roasted", "slivered", "ground", "large", "small", "medium",
];

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:garnish(?:es)?|other|notes?|equipment|for serving|to serve)\s*:|suggested\s+toppings?\b|optional\s+toppings?\s*:|[^:\d]{1,40}:$)",
    )
    .expect("Invalid annotation regex")
});

static TRAILING_TO_TASTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?)[,\s]*\b(to taste|as needed)\.?$").expect("Invalid to-taste regex")
});

static SALT_AND_PEPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:kosher|sea|fine|table)\s+)?salt\s*(?:,|and|&|\+)\s*(?:(?:fresh|freshly)\s+)?(?:(?:ground|cracked)\s+)?(?:black\s+)?pepper$",
    )
    .expect("Invalid salt-and-pepper regex")
});

static LEADING_PAREN_MEASURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\(\s*(?:about\s+)?({QTY})\s*(?:({units})\b\.?)?\s*\)\s*(.+)$",
        units = unit_alternation()
    ))
    .expect("Invalid parenthetical measure regex")
});

static LEADING_SLASH_MEASURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^/\s*({QTY})\s*({units})\b\.?\s*(.+)$",
        units = unit_alternation()
    ))
    .expect("Invalid slash measure regex")
});

static LEADING_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^\(([^()]*\b(?:inch(?:es)?|in|cm|mm|large|medium|small|size)\b[^()]*|[^()]*")\)\s*(.*)$"#,
    )
    .expect("Invalid size regex")
});

static SECONDARY_MEASURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:/\s*{QTY}\s*(?:{units})\b\.?|\(\s*((?:about\s+|approx\.?\s+)?{QTY}\s*(?:{units})\b\.?)\s*\))\s*(.*)$",
        units = unit_alternation()
    ))
    .expect("Invalid secondary measure regex")
});

static LEADING_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^({units})\b\.?\s*(.+)$",
        units = unit_alternation()
    ))
    .expect("Invalid leading unit regex")
});

static LEADING_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•▢□◦·]\s*").expect("Invalid bullet regex"));

static LEADING_OF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^of\s+").expect("Invalid 'of' regex"));

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static TRAILING_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\(([^()]*)\)\s*$").expect("Invalid paren regex"));

static PREPARATION_START: LazyLock<Regex> = LazyLock::new(|| {
    let words = PREPARATION_WORDS
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)^(?:{words})\b")).expect("Invalid preparation regex")
});

#[derive(Debug, Clone, Copy)]
enum Adjacency {
    GluedMetric,
    KnownUnit,
    Bare,
}

/// Number/unit shapes tried in order against the start of the line.
static ADJACENCY: LazyLock<Vec<(Adjacency, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Adjacency::GluedMetric,
            Regex::new(&format!(r"(?i)^({QTY})({METRIC_UNITS})\b\.?\s*(.*)$"))
                .expect("Invalid glued unit regex"),
        ),
        (
            Adjacency::KnownUnit,
            Regex::new(&format!(
                r"(?i)^({QTY})\s*({units})\b\.?\s*(.*)$",
                units = unit_alternation()
            ))
            .expect("Invalid unit regex"),
        ),
        (
            Adjacency::Bare,
            Regex::new(&format!(r"^({QTY})\s+()(.+)$")).expect("Invalid bare quantity regex"),
        ),
    ]
});

fn unit_alternation() -> String {
    UNITS
        .iter()
        .map(|u| regex::escape(u))
        .collect::<Vec<_>>()
        .join("|")
}

/// A quantity/unit pair found somewhere in the line.
#[derive(Debug, Clone)]
struct Measure {
    quantity: Option<f64>,
    unit: String,
}

/// Parses one raw ingredient line.
///
/// Returns no records for blank and annotation lines, two for a combined
/// salt-and-pepper line and one otherwise. Never fails: a line that defeats
/// every pattern comes back whole as the ingredient name.
pub fn parse_ingredient_line(raw: &str) -> Vec<Ingredient> {
    let line = clean_line(raw);
    if line.is_empty() {
        return Vec::new();
    }

    if ANNOTATION.is_match(&line) {
        debug!("Skipping annotation line: {}", line);
        return Vec::new();
    }

    if let Some(pair) = split_salt_and_pepper(&line) {
        debug!("Split combined seasoning line: {}", line);
        return pair;
    }

    let ingredient = parse_single(&line).unwrap_or_else(|| {
        debug!("No structure recognized, keeping whole line: {}", line);
        Ingredient {
            name: line.clone(),
            quantity: None,
            unit: String::new(),
            preparation: String::new(),
            category: categorize(&line),
            optional: false,
        }
    });
    vec![ingredient]
}

fn clean_line(raw: &str) -> String {
    // Some feeds double-encode entities
    let decoded = decode_html_entities(&decode_html_entities(raw)).into_owned();
    let without_tags = HTML_TAG.replace_all(&decoded, " ");
    let normalized = normalize_fractions(&without_tags.replace('\u{a0}', " "));
    let collapsed = WHITESPACE.replace_all(normalized.trim(), " ");
    LEADING_BULLET.replace(&collapsed, "").trim().to_string()
}

fn split_salt_and_pepper(line: &str) -> Option<Vec<Ingredient>> {
    let core = match TRAILING_TO_TASTE.captures(line) {
        Some(caps) => caps[1].to_string(),
        None => line.to_string(),
    };
    let core = core.trim().trim_end_matches([',', '.']).trim();
    if !SALT_AND_PEPPER.is_match(core) {
        return None;
    }

    let seasoning = |name: &str| Ingredient {
        name: name.to_string(),
        quantity: Some(0.0),
        unit: String::new(),
        preparation: "to taste".to_string(),
        category: Category::Spices,
        optional: false,
    };
    Some(vec![seasoning("salt"), seasoning("black pepper")])
}

fn parse_single(line: &str) -> Option<Ingredient> {
    let mut rest = line.to_string();
    let mut measure: Option<Measure> = None;
    let mut size_note: Option<String> = None;

    // A leading "(50g)" or "/ 2.5 lb" outranks anything found later.
    for pattern in [&*LEADING_PAREN_MEASURE, &*LEADING_SLASH_MEASURE] {
        if let Some(caps) = pattern.captures(&rest) {
            measure = Some(Measure {
                quantity: parse_quantity(&caps[1]),
                unit: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            });
            rest = caps[3].to_string();
            break;
        }
    }

    if let Some((note, after)) = take_size_note(&rest) {
        size_note = Some(note);
        rest = after;
    }

    let mut bare_count = false;
    if let Some((found, after)) = take_adjacent_measure(&rest) {
        bare_count = found.unit.is_empty();
        if measure.is_none() {
            measure = Some(found);
        }
        rest = after;
    }

    if let Some(caps) = SECONDARY_MEASURE.captures(&rest) {
        let size = caps.get(1).map(|m| m.as_str().trim().to_string());
        rest = caps[2].to_string();
        // "1 (14 oz) can tomatoes": the bracket sizes the item, the unit follows it
        if bare_count {
            if size_note.is_none() {
                size_note = size;
            }
            if let Some(unit_caps) = LEADING_UNIT.captures(&rest) {
                let unit = unit_caps[1].to_string();
                rest = unit_caps[2].to_string();
                if let Some(found) = measure.as_mut().filter(|m| m.unit.is_empty()) {
                    found.unit = unit;
                }
            }
        }
    }
    if size_note.is_none() {
        if let Some((note, after)) = take_size_note(&rest) {
            size_note = Some(note);
            rest = after;
        }
    }
    let rest = LEADING_OF.replace(&rest, "").to_string();

    let (name, mut preparation) = split_name_and_preparation(&rest);
    if name.is_empty() {
        return None;
    }
    if preparation.is_empty() {
        preparation = size_note.unwrap_or_default();
    }

    let Measure { quantity, unit } = measure.unwrap_or(Measure {
        quantity: None,
        unit: String::new(),
    });
    let optional = preparation.to_lowercase().contains("optional");

    Some(Ingredient {
        category: categorize(&name),
        name,
        quantity,
        unit,
        preparation,
        optional,
    })
}

fn take_size_note(text: &str) -> Option<(String, String)> {
    LEADING_SIZE
        .captures(text)
        .map(|caps| (caps[1].trim().to_string(), caps[2].to_string()))
}

fn take_adjacent_measure(text: &str) -> Option<(Measure, String)> {
    ADJACENCY.iter().find_map(|(kind, pattern)| {
        let caps = pattern.captures(text)?;
        debug!("Matched {:?} quantity pattern in: {}", kind, text);
        Some((
            Measure {
                quantity: parse_quantity(&caps[1]),
                unit: caps[2].to_string(),
            },
            caps[3].to_string(),
        ))
    })
}

/// Separates the display name from preparation notes.
///
/// A trailing parenthetical wins. Without one, a comma only splits when what
/// follows it starts with a preparation word, so names that contain commas
/// survive.
fn split_name_and_preparation(text: &str) -> (String, String) {
    let text = text.trim();
    let mut notes = Vec::new();

    let mut name = match TRAILING_PAREN.captures(text) {
        Some(caps) if !caps[1].trim().is_empty() => {
            notes.push(caps[2].trim().to_string());
            caps[1].to_string()
        }
        _ => text.to_string(),
    };

    if notes.is_empty() {
        if let Some(idx) = name.find(',') {
            let after = name[idx + 1..].trim();
            if PREPARATION_START.is_match(after) {
                notes.push(after.to_string());
                name.truncate(idx);
            }
        }
    }

    if notes.is_empty() {
        if let Some(caps) = TRAILING_TO_TASTE.captures(&name) {
            if !caps[1].trim().is_empty() {
                notes.push(caps[2].to_lowercase());
                name = caps[1].to_string();
            }
        }
    }

    let name = name
        .trim()
        .trim_end_matches([',', ';', ':', '.'])
        .trim()
        .to_string();
    let preparation = notes
        .into_iter()
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    (name, preparation)
}
