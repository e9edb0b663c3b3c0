use crate::error::ImportError;
use crate::model::Recipe;
use crate::url_to_text::fetchers::FetchedPage;

mod json_ld;

pub use json_ld::{find_recipe, page_declares_amp, scan_json_ld, JsonLdExtractor, JsonLdScan};

pub struct ParsingContext {
    pub url: String,
    pub html: String,
    /// The page was requested through an AMP URL
    pub amp_url: bool,
}

impl ParsingContext {
    pub fn new(page: FetchedPage, amp_url: bool) -> Self {
        Self {
            url: page.url,
            html: page.html,
            amp_url,
        }
    }
}

pub trait Extractor {
    fn parse(&self, context: &ParsingContext) -> Result<Recipe, ImportError>;
}
