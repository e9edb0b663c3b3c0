pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod parsers;
pub mod pipelines;
pub mod url_to_text;

use log::warn;

pub use builder::{RecipeImporter, RecipeImporterBuilder};
pub use crate::config::{load_config, FetchConfig, IngestConfig};
pub use error::{ImportError, ParseResult};
pub use model::{
    Category, Ingredient, InstructionSection, MealType, Nutrition, PlanItem, Rating, Recipe,
    Servings,
};
pub use parsers::{categorize, parse_ingredient_line, parse_quantity};
pub use pipelines::{
    fix_ingredient_data, parse_ingredient_lines, parse_instruction_text, recipe_from_text,
    RepairReport,
};
pub use url_to_text::fetchers::{FetchedPage, HtmlFetcher};

/// Import a recipe from a web page
///
/// Fetching is configured from `config.toml` and `RECIPE_INGEST__*`
/// environment variables (see [`IngestConfig::load`]); an unreadable
/// configuration falls back to defaults.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() {
/// let result = recipe_ingest::parse_recipe_from_url("https://example.com/recipe").await;
/// if let Some(recipe) = result.recipe() {
///     println!("{}", recipe.name);
/// }
/// # }
/// ```
pub async fn parse_recipe_from_url(url: &str) -> ParseResult {
    let config = load_config().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {}", e);
        IngestConfig::default()
    });

    match RecipeImporter::from_config(&config) {
        Ok(importer) => importer.import_url(url).await,
        Err(e) => ParseResult::from(Err(e)),
    }
}
