//! Maps a schema.org `Recipe` object onto [`Recipe`].
//!
//! Sites disagree wildly on the shape of every field, so each field is a
//! sum type over the shapes seen in the wild with an `Other` arm that
//! swallows anything else. An unrecognized shape drops that field instead
//! of failing the whole recipe.

use crate::error::ImportError;
use crate::model::{MealType, Nutrition, Rating, Recipe, Servings};
use crate::parsers::{parse_ingredient_line, parse_schema_instructions};
use html_escape::decode_html_entities;
use log::debug;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));

static YIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)(?:\s*(?:-|–|to)\s*\d+)?\s*(\p{L}[\p{L}-]*)?")
        .expect("Invalid yield regex")
});

static MEAL_TYPE_RULES: LazyLock<Vec<(MealType, Regex)>> = LazyLock::new(|| {
    [
        (
            MealType::Breakfast,
            r"\b(?:breakfast|brunch|pancakes?|waffles?|omelets?|omelettes?|granola|oatmeal|porridge|french toast|frittatas?)\b",
        ),
        (
            MealType::Lunch,
            r"\b(?:lunch|lunchbox|sandwich(?:es)?|wraps?|paninis?)\b",
        ),
        (
            MealType::Dinner,
            r"\b(?:dinner|supper|main course|main dish|entr[eé]es?)\b",
        ),
        (
            MealType::Dessert,
            r"\b(?:desserts?|cakes?|cookies?|brownies?|puddings?|tarts?|cheesecakes?|ice cream|sweets?)\b",
        ),
        (
            MealType::Snack,
            r"\b(?:snacks?|appetizers?|dips?|finger foods?|starters?)\b",
        ),
    ]
    .into_iter()
    .map(|(meal, pattern)| (meal, Regex::new(pattern).expect("Invalid meal type regex")))
    .collect()
});

/// Dishes that default to dinner when no meal type matched
static MAIN_DISH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:mains?|pasta|casseroles?|stews?|curry|curries|roast|stir[- ]fry|chili|lasagna|risotto|steak|chicken|beef|pork|lamb|salmon)\b",
    )
    .expect("Invalid main dish regex")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaRecipe {
    name: Option<TextValue>,
    description: Option<TextValue>,
    author: Option<Author>,
    image: Option<ImageType>,
    recipe_ingredient: Option<RecipeIngredients>,
    recipe_instructions: Option<Value>,
    recipe_yield: Option<RecipeYield>,
    prep_time: Option<TextValue>,
    cook_time: Option<TextValue>,
    total_time: Option<TextValue>,
    recipe_category: Option<StringOrList>,
    recipe_cuisine: Option<StringOrList>,
    keywords: Option<StringOrList>,
    nutrition: Option<NutritionType>,
    aggregate_rating: Option<RatingType>,
    video: Option<VideoType>,
}

impl TryFrom<&Value> for SchemaRecipe {
    type Error = serde_json::Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TextObject {
    text: Option<String>,
    name: Option<String>,
    #[serde(rename = "@value")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextValue {
    String(String),
    Number(f64),
    Object(TextObject),
    Other(Value),
}

impl TextValue {
    fn into_text(self) -> Option<String> {
        let raw = match self {
            TextValue::String(s) => s,
            TextValue::Number(n) => n.to_string(),
            TextValue::Object(obj) => obj.text.or(obj.value).or(obj.name)?,
            TextValue::Other(value) => {
                debug!("Ignoring unrecognized text value: {}", value);
                return None;
            }
        };
        non_empty(clean_text(&raw))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<StringOrList>),
    Other(Value),
}

impl StringOrList {
    fn into_strings(self) -> Vec<String> {
        match self {
            StringOrList::String(s) => non_empty(clean_text(&s)).into_iter().collect(),
            StringOrList::List(items) => items.into_iter().flat_map(Self::into_strings).collect(),
            StringOrList::Other(value) => {
                debug!("Ignoring unrecognized string list: {}", value);
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthorObject {
    name: Option<String>,
    #[serde(rename = "@id")]
    _id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Author {
    String(String),
    Multiple(Vec<Author>),
    Object(AuthorObject),
    Other(Value),
}

impl Author {
    fn names(self) -> Vec<String> {
        match self {
            Author::String(name) => vec![name],
            Author::Object(obj) => obj.name.into_iter().collect(),
            Author::Multiple(authors) => authors.into_iter().flat_map(Author::names).collect(),
            Author::Other(value) => {
                debug!("Ignoring unrecognized author: {}", value);
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageObject {
    url: Option<String>,
    content_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageType {
    String(String),
    Multiple(Vec<ImageType>),
    Object(ImageObject),
    Other(Value),
}

impl ImageType {
    fn first_url(self) -> Option<String> {
        match self {
            ImageType::String(url) => non_empty(decode_html_symbols(&url)),
            ImageType::Object(obj) => obj.url.or(obj.content_url).and_then(non_empty),
            ImageType::Multiple(images) => images.into_iter().find_map(ImageType::first_url),
            ImageType::Other(value) => {
                debug!("Ignoring unrecognized image: {}", value);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    name: String,
    amount: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngredientEntry {
    Line(String),
    Object(IngredientObject),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    Many(Vec<IngredientEntry>),
    One(IngredientEntry),
}

impl RecipeIngredients {
    fn into_lines(self) -> Vec<String> {
        let entries = match self {
            RecipeIngredients::Many(entries) => entries,
            RecipeIngredients::One(entry) => vec![entry],
        };
        entries
            .into_iter()
            .flat_map(|entry| match entry {
                IngredientEntry::Line(line) => line.lines().map(str::to_string).collect(),
                IngredientEntry::Object(obj) => {
                    let amount = obj.amount.and_then(TextValue::into_text);
                    match amount {
                        Some(amount) => vec![format!("{} {}", amount, obj.name)],
                        None => vec![obj.name],
                    }
                }
                IngredientEntry::Other(value) => {
                    debug!("Skipping unrecognized ingredient entry: {}", value);
                    Vec::new()
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    Number(f64),
    String(String),
    Array(Vec<RecipeYield>),
    Other(Value),
}

impl RecipeYield {
    fn into_servings(self) -> Option<Servings> {
        match self {
            RecipeYield::Number(n) if n >= 0.0 => Some(Servings {
                default: n.round() as u32,
                unit: "servings".to_string(),
            }),
            RecipeYield::String(s) => servings_from_text(&s),
            RecipeYield::Array(mut items) => {
                // Prefer the descriptive entry ("12 cookies") over a bare number
                let descriptive = items.iter().position(|item| {
                    matches!(item, RecipeYield::String(s) if s.contains(char::is_alphabetic))
                });
                match descriptive {
                    Some(index) => items.swap_remove(index).into_servings(),
                    None => items.into_iter().find_map(RecipeYield::into_servings),
                }
            }
            RecipeYield::Number(n) => {
                debug!("Ignoring negative yield: {}", n);
                None
            }
            RecipeYield::Other(value) => {
                debug!("Ignoring unrecognized yield: {}", value);
                None
            }
        }
    }
}

fn servings_from_text(text: &str) -> Option<Servings> {
    let caps = YIELD.captures(text)?;
    let default = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps
        .get(2)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| "servings".to_string());
    Some(Servings { default, unit })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumericText {
    Number(f64),
    Text(String),
    Other(Value),
}

impl NumericText {
    fn value(&self) -> Option<f64> {
        match self {
            NumericText::Number(n) => Some(*n),
            NumericText::Text(s) => {
                let digits: String = s
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                digits.parse().ok()
            }
            NumericText::Other(value) => {
                debug!("Ignoring unrecognized numeric value: {}", value);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NutritionInfo {
    calories: Option<NumericText>,
    protein_content: Option<NumericText>,
    carbohydrate_content: Option<NumericText>,
    fat_content: Option<NumericText>,
    fiber_content: Option<NumericText>,
    sugar_content: Option<NumericText>,
    sodium_content: Option<NumericText>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NutritionType {
    Object(NutritionInfo),
    Other(Value),
}

impl NutritionType {
    fn into_nutrition(self) -> Option<Nutrition> {
        let info = match self {
            NutritionType::Object(info) => info,
            NutritionType::Other(value) => {
                debug!("Ignoring unrecognized nutrition: {}", value);
                return None;
            }
        };
        let read = |field: &Option<NumericText>| field.as_ref().and_then(NumericText::value);
        let nutrition = Nutrition {
            calories: read(&info.calories),
            protein: read(&info.protein_content),
            carbs: read(&info.carbohydrate_content),
            fat: read(&info.fat_content),
            fiber: read(&info.fiber_content),
            sugar: read(&info.sugar_content),
            sodium: read(&info.sodium_content),
        };
        (!nutrition.is_empty()).then_some(nutrition)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingInfo {
    rating_value: Option<NumericText>,
    rating_count: Option<NumericText>,
    review_count: Option<NumericText>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RatingType {
    Object(RatingInfo),
    Other(Value),
}

impl RatingType {
    fn into_rating(self) -> Option<Rating> {
        let info = match self {
            RatingType::Object(info) => info,
            RatingType::Other(value) => {
                debug!("Ignoring unrecognized rating: {}", value);
                return None;
            }
        };
        let value = info.rating_value.as_ref().and_then(NumericText::value)?;
        let count = info
            .rating_count
            .as_ref()
            .or(info.review_count.as_ref())
            .and_then(NumericText::value)
            .map(|c| c as u32);
        Some(Rating { value, count })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoObject {
    content_url: Option<String>,
    embed_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VideoType {
    String(String),
    Multiple(Vec<VideoType>),
    Object(VideoObject),
    Other(Value),
}

impl VideoType {
    fn first_url(self) -> Option<String> {
        match self {
            VideoType::String(url) => non_empty(url),
            VideoType::Object(obj) => obj
                .content_url
                .or(obj.embed_url)
                .or(obj.url)
                .and_then(non_empty),
            VideoType::Multiple(videos) => videos.into_iter().find_map(VideoType::first_url),
            VideoType::Other(value) => {
                debug!("Ignoring unrecognized video: {}", value);
                None
            }
        }
    }
}

/// Builds a [`Recipe`] from a schema.org `Recipe` object.
///
/// The result is marked custom and carries `source_url`. Fails only when the
/// recipe has no usable name.
pub fn map_recipe(value: &Value, source_url: &str) -> Result<Recipe, ImportError> {
    let schema = SchemaRecipe::try_from(value).map_err(|e| {
        debug!("Recipe object did not deserialize: {}", e);
        ImportError::NoRecipeData
    })?;

    let name = schema
        .name
        .and_then(TextValue::into_text)
        .ok_or(ImportError::MissingName)?;

    let categories = schema
        .recipe_category
        .map(StringOrList::into_strings)
        .unwrap_or_default();
    let keywords = schema
        .keywords
        .map(StringOrList::into_strings)
        .unwrap_or_default();
    let meal_types = infer_meal_types(&name, &categories, &keywords);
    let tags = merge_tags(&categories, &keywords);

    let ingredients: Vec<_> = schema
        .recipe_ingredient
        .map(RecipeIngredients::into_lines)
        .unwrap_or_default()
        .iter()
        .flat_map(|line| parse_ingredient_line(line))
        .collect();

    let instructions = schema
        .recipe_instructions
        .as_ref()
        .map(parse_schema_instructions)
        .unwrap_or_default();

    let author = schema.author.map(Author::names).and_then(|names| {
        let names: Vec<String> = names
            .iter()
            .filter_map(|n| non_empty(clean_text(n)))
            .collect();
        non_empty(names.join(", "))
    });

    let cuisine = schema
        .recipe_cuisine
        .map(StringOrList::into_strings)
        .and_then(|c| non_empty(c.join(", ")));

    debug!(
        "Mapped recipe '{}': {} ingredients, {} instruction sections",
        name,
        ingredients.len(),
        instructions.len()
    );

    Ok(Recipe {
        name,
        description: schema.description.and_then(TextValue::into_text),
        author,
        image: schema.image.and_then(ImageType::first_url),
        ingredients,
        instructions,
        tags,
        cuisine,
        meal_types,
        prep_time: schema.prep_time.and_then(TextValue::into_text),
        cook_time: schema.cook_time.and_then(TextValue::into_text),
        total_time: schema.total_time.and_then(TextValue::into_text),
        servings: schema.recipe_yield.and_then(RecipeYield::into_servings),
        nutrition: schema.nutrition.and_then(NutritionType::into_nutrition),
        rating: schema.aggregate_rating.and_then(RatingType::into_rating),
        video: schema.video.and_then(VideoType::first_url),
        source_url: Some(source_url.to_string()),
        is_custom: true,
    })
}

/// Categories then keywords, comma-split, first spelling wins.
fn merge_tags(categories: &[String], keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    categories
        .iter()
        .chain(keywords)
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .map(str::to_string)
        .collect()
}

fn infer_meal_types(name: &str, categories: &[String], keywords: &[String]) -> Vec<MealType> {
    let text = categories
        .iter()
        .chain(keywords)
        .map(String::as_str)
        .chain(std::iter::once(name))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let meal_types: Vec<MealType> = MEAL_TYPE_RULES
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&text))
        .map(|(meal, _)| *meal)
        .collect();

    if meal_types.is_empty() && MAIN_DISH.is_match(&text) {
        return vec![MealType::Dinner];
    }
    meal_types
}

fn decode_html_symbols(text: &str) -> String {
    // Some sites double-encode entities
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

fn clean_text(text: &str) -> String {
    let decoded = decode_html_symbols(text);
    HTML_TAG
        .replace_all(&decoded, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
