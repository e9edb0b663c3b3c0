use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IngestConfig {
    /// How pages are fetched
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Configuration for page fetching
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Proxy endpoint that fetches pages on our behalf (`POST {"url": ...}`)
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// Whether to fall back to a direct GET when the proxy fails
    #[serde(default = "default_direct_fetch")]
    pub direct_fetch: bool,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User agent sent on direct requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            direct_fetch: default_direct_fetch(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

// Default value functions
fn default_direct_fetch() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; RecipeIngest/0.3)".to_string()
}

impl IngestConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_INGEST__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_INGEST__FETCH__PROXY_URL
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`IngestConfig::load`] for the lookup order.
pub fn load_config() -> Result<IngestConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPE_INGEST__FETCH__TIMEOUT
        .add_source(
            Environment::with_prefix("RECIPE_INGEST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
