use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

use crate::model::Recipe;

/// Errors that can occur during recipe import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// The URL could not be parsed or is not http(s)
    #[error("Invalid URL: {0}. Please enter a full recipe link starting with http:// or https://")]
    InvalidUrl(String),

    /// Failed to fetch the page
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// The page responded, but not with a success status
    #[error("The website responded with HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// The proxy answered with an explicit error payload
    #[error("The recipe proxy could not load this page: {0}")]
    ProxyRejected(String),

    /// The proxy answered with something other than the expected payload
    #[error("The recipe proxy returned an unexpected response: {0}")]
    ProxyResponse(String),

    /// Network-layer failure (connection refused, blocked, timed out)
    #[error("Could not reach this website ({0}). Many recipe sites block automated access; copy the recipe text and use paste import, or enter it manually.")]
    Network(String),

    /// No JSON-LD blocks on a page that looks like AMP
    #[error("This looks like an AMP page. AMP pages often lack recipe data; try the regular version of the page or enter the recipe manually.")]
    AmpWithoutRecipeData,

    /// No JSON-LD blocks at all
    #[error("This website uses non-standard formatting and publishes no structured recipe data. Try copying the recipe and using paste import.")]
    NonStandardFormatting,

    /// JSON-LD is present but none of it describes a Recipe
    #[error("No recipe data found on this page.")]
    NoRecipeData,

    /// A Recipe object was found but it has no usable name
    #[error("The recipe name is missing from this page's recipe data.")]
    MissingName,

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

const NETWORK_MARKERS: [&str; 4] = ["fetch", "network", "cors", "load failed"];

impl ImportError {
    /// Whether a fallback fetcher may be tried after this error.
    ///
    /// An explicit rejection from the proxy is final.
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, ImportError::ProxyRejected(_))
    }

    /// Rewrites transport-level failures into the network guidance error.
    ///
    /// Extraction and mapping errors pass through unchanged.
    pub fn into_user_facing(self) -> Self {
        match self {
            ImportError::FetchError(e) => {
                if e.is_connect() || e.is_timeout() || e.is_request() || mentions_network(&e.to_string())
                {
                    ImportError::Network(e.to_string())
                } else {
                    ImportError::FetchError(e)
                }
            }
            ImportError::ProxyResponse(msg) if mentions_network(&msg) => ImportError::Network(msg),
            other => other,
        }
    }
}

fn mentions_network(message: &str) -> bool {
    let lower = message.to_lowercase();
    NETWORK_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Outcome of a single import attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Success { recipe: Recipe },
    Failure { errors: Vec<String> },
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        match self {
            ParseResult::Success { recipe } => Some(recipe),
            ParseResult::Failure { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            ParseResult::Success { .. } => &[],
            ParseResult::Failure { errors } => errors,
        }
    }
}

impl From<Result<Recipe, ImportError>> for ParseResult {
    fn from(result: Result<Recipe, ImportError>) -> Self {
        match result {
            Ok(recipe) => ParseResult::Success { recipe },
            Err(e) => ParseResult::Failure {
                errors: vec![e.into_user_facing().to_string()],
            },
        }
    }
}

impl Serialize for ParseResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ParseResult", 2)?;
        match self {
            ParseResult::Success { recipe } => {
                state.serialize_field("success", &true)?;
                state.serialize_field("recipe", recipe)?;
            }
            ParseResult::Failure { errors } => {
                state.serialize_field("success", &false)?;
                state.serialize_field("errors", errors)?;
            }
        }
        state.end()
    }
}
