pub mod extractors;
pub mod schema;

pub use extractors::{Extractor, JsonLdExtractor, ParsingContext};
pub use schema::map_recipe;
