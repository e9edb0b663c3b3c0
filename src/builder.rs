use std::time::Duration;

use log::debug;
use reqwest::Url;

use crate::config::{FetchConfig, IngestConfig};
use crate::error::{ImportError, ParseResult};
use crate::model::Recipe;
use crate::pipelines;
use crate::url_to_text::fetchers::{FetchChain, HtmlFetcher};

/// Builder for configuring a [`RecipeImporter`]
///
/// Explicit settings override the ones from [`RecipeImporterBuilder::config`],
/// which in turn default to [`IngestConfig::default`].
#[derive(Default)]
pub struct RecipeImporterBuilder {
    config: Option<IngestConfig>,
    proxy_url: Option<String>,
    timeout: Option<Duration>,
    direct_fetch: Option<bool>,
    user_agent: Option<String>,
    fetcher: Option<Box<dyn HtmlFetcher>>,
}

impl RecipeImporterBuilder {
    /// Start from a loaded configuration
    ///
    /// # Example
    /// ```no_run
    /// use recipe_ingest::{IngestConfig, RecipeImporter};
    ///
    /// let config = IngestConfig::load().unwrap_or_default();
    /// let builder = RecipeImporter::builder().config(config);
    /// ```
    pub fn config(mut self, config: IngestConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Fetch pages through a proxy endpoint (`POST {"url": ...}`)
    ///
    /// # Example
    /// ```
    /// use recipe_ingest::RecipeImporter;
    ///
    /// let builder = RecipeImporter::builder()
    ///     .proxy_url("http://localhost:8787/api/fetch");
    /// ```
    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    /// Set a timeout for HTTP requests
    ///
    /// # Example
    /// ```
    /// use recipe_ingest::RecipeImporter;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeImporter::builder()
    ///     .timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Whether to fall back to a direct GET when the proxy fails
    pub fn direct_fetch(mut self, enabled: bool) -> Self {
        self.direct_fetch = Some(enabled);
        self
    }

    /// User agent for direct requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a custom fetcher instead of the proxy/direct pair
    ///
    /// The fetcher is used alone, without fallback.
    pub fn fetcher(mut self, fetcher: impl HtmlFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Build the importer
    ///
    /// # Errors
    /// Returns `ImportError::BuilderError` if:
    /// - The timeout is zero
    /// - The proxy URL is not an absolute http(s) URL
    ///
    /// # Example
    /// ```
    /// # use recipe_ingest::RecipeImporter;
    /// let importer = RecipeImporter::builder()
    ///     .proxy_url("http://localhost:8787/api/fetch")
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn build(self) -> Result<RecipeImporter, ImportError> {
        if let Some(fetcher) = self.fetcher {
            debug!("Building importer with custom fetcher '{}'", fetcher.name());
            return Ok(RecipeImporter {
                fetchers: FetchChain::new(fetcher, None),
            });
        }

        let FetchConfig {
            proxy_url,
            direct_fetch,
            timeout,
            user_agent,
        } = self.config.unwrap_or_default().fetch;

        let timeout = self.timeout.unwrap_or(Duration::from_secs(timeout));
        if timeout.is_zero() {
            return Err(ImportError::BuilderError(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        let proxy_url = self
            .proxy_url
            .or(proxy_url)
            .filter(|u| !u.trim().is_empty());
        if let Some(endpoint) = proxy_url.as_deref() {
            let valid = Url::parse(endpoint)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                return Err(ImportError::BuilderError(format!(
                    "Proxy URL must be an absolute http(s) URL: {}",
                    endpoint
                )));
            }
        }

        let fetch = FetchConfig {
            proxy_url,
            direct_fetch: self.direct_fetch.unwrap_or(direct_fetch),
            timeout: timeout.as_secs().max(1),
            user_agent: self.user_agent.unwrap_or(user_agent),
        };
        RecipeImporter::from_fetch_config(&fetch)
    }
}

/// Imports recipes from URLs
pub struct RecipeImporter {
    fetchers: FetchChain,
}

impl RecipeImporter {
    /// Creates a new builder for importing recipes
    ///
    /// # Example
    /// ```
    /// use recipe_ingest::RecipeImporter;
    ///
    /// let builder = RecipeImporter::builder();
    /// ```
    pub fn builder() -> RecipeImporterBuilder {
        RecipeImporterBuilder::default()
    }

    /// Importer configured from [`IngestConfig`]
    pub fn from_config(config: &IngestConfig) -> Result<Self, ImportError> {
        Self::from_fetch_config(&config.fetch)
    }

    fn from_fetch_config(config: &FetchConfig) -> Result<Self, ImportError> {
        Ok(Self {
            fetchers: FetchChain::from_config(config)?,
        })
    }

    /// Import a recipe, keeping the typed error
    pub async fn try_import_url(&self, url: &str) -> Result<Recipe, ImportError> {
        pipelines::url::process(url, &self.fetchers).await
    }

    /// Import a recipe
    ///
    /// Never fails: every error becomes a [`ParseResult::Failure`] carrying
    /// guidance for the user.
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_ingest::RecipeImporter;
    /// # #[tokio::main]
    /// # async fn main() {
    /// let importer = RecipeImporter::builder().build().unwrap();
    /// let result = importer.import_url("https://example.com/recipe").await;
    /// println!("{}", serde_json::to_string(&result).unwrap());
    /// # }
    /// ```
    pub async fn import_url(&self, url: &str) -> ParseResult {
        ParseResult::from(self.try_import_url(url).await)
    }
}
