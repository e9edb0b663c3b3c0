use regex::Regex;
use std::sync::LazyLock;

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*(?:-|–|—|\bto\b)\s*(.+)$").expect("Invalid range regex")
});

static MIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(\d+)\s*/\s*(\d+)$").expect("Invalid mixed regex"));

static FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*/\s*(\d+)$").expect("Invalid fraction regex"));

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)$").expect("Invalid decimal regex"));

const FRACTION_GLYPHS: [(char, &str); 15] = [
    ('½', "1/2"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
];

/// Rewrites unicode vulgar fractions as ASCII `n/d`.
///
/// A digit directly before a glyph turns it into a mixed number, so `1½`
/// becomes `1 1/2`. The fraction slash `⁄` becomes `/`.
pub fn normalize_fractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if let Some((_, ascii)) = FRACTION_GLYPHS.iter().find(|(glyph, _)| *glyph == c) {
            if out.ends_with(|p: char| p.is_ascii_digit()) {
                out.push(' ');
            }
            out.push_str(ascii);
        } else if c == '⁄' {
            out.push('/');
        } else {
            out.push(c);
        }
    }
    out
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses a quantity token into a rounded decimal.
///
/// Ranges give their mean, mixed numbers and fractions their value. Returns
/// `None` for anything that isn't a number, which callers read as "no
/// quantity given".
pub fn parse_quantity(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(caps) = RANGE.captures(token) {
        // A leading minus is a sign, not a range separator
        if !caps[1].is_empty() && caps[1].chars().any(|c| c.is_ascii_digit()) {
            if let (Some(low), Some(high)) = (parse_single(&caps[1]), parse_single(&caps[2])) {
                return Some(round2((low + high) / 2.0));
            }
            return None;
        }
    }

    parse_single(token).map(round2)
}

fn parse_single(token: &str) -> Option<f64> {
    let token = token.trim();

    if let Some(caps) = MIXED.captures(token) {
        let whole: f64 = caps[1].parse().ok()?;
        let fraction = divide(&caps[2], &caps[3])?;
        return Some(whole + fraction);
    }

    if let Some(caps) = FRACTION.captures(token) {
        return divide(&caps[1], &caps[2]);
    }

    if DECIMAL.is_match(token) {
        return token.parse::<f64>().ok();
    }

    None
}

fn divide(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}
