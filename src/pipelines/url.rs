use crate::error::ImportError;
use crate::model::Recipe;
use crate::url_to_text::amp::non_amp_url;
use crate::url_to_text::fetchers::{FetchChain, FetchedPage};
use crate::url_to_text::html::extractors::{Extractor, JsonLdExtractor, ParsingContext};
use log::{info, warn};
use reqwest::Url;

/// Process a URL into a recipe
///
/// This pipeline:
/// 1. Validates the URL (absolute http/https with a host)
/// 2. For AMP URLs, tries the regular page first with the primary fetcher
/// 3. Fetches the requested URL (primary, then fallback when allowed)
/// 4. Extracts the JSON-LD recipe and maps it
///
/// At most three fetches happen, one after another.
pub async fn process(url: &str, fetchers: &FetchChain) -> Result<Recipe, ImportError> {
    let parsed = validate_url(url)?;

    let amp_url = match non_amp_url(&parsed) {
        Some(canonical) => {
            info!("AMP URL detected, trying {} first", canonical);
            match fetchers.fetch_primary(canonical.as_str()).await {
                Ok(page) => match extract(page, false) {
                    Ok(recipe) => return Ok(recipe),
                    Err(e) => warn!("Regular page had no usable recipe: {}", e),
                },
                Err(e) => warn!("Fetching regular page failed: {}", e),
            }
            true
        }
        None => false,
    };

    let page = fetchers.fetch(parsed.as_str()).await?;
    extract(page, amp_url)
}

fn extract(page: FetchedPage, amp_url: bool) -> Result<Recipe, ImportError> {
    let context = ParsingContext::new(page, amp_url);
    JsonLdExtractor.parse(&context)
}

/// Parses `url` and checks it is something we can fetch.
pub fn validate_url(url: &str) -> Result<Url, ImportError> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed).map_err(|_| ImportError::InvalidUrl(trimmed.to_string()))?;
    let has_host = parsed.host_str().is_some_and(|h| !h.is_empty());
    if !matches!(parsed.scheme(), "http" | "https") || !has_host {
        return Err(ImportError::InvalidUrl(trimmed.to_string()));
    }
    Ok(parsed)
}
