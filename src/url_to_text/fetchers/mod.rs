mod proxy;
mod request;

pub use proxy::ProxyFetcher;
pub use request::RequestFetcher;

use crate::config::FetchConfig;
use crate::error::ImportError;
use async_trait::async_trait;
use log::{info, warn};
use std::time::Duration;

/// HTML retrieved for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    /// Final URL after redirects, as reported by whoever fetched it
    pub url: String,
}

/// Anything that can turn a URL into page HTML.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// Short name used in logs (e.g. "proxy", "direct")
    fn name(&self) -> &str;

    async fn fetch(&self, url: &str) -> Result<FetchedPage, ImportError>;
}

/// A primary fetcher with an optional fallback.
///
/// The fallback runs once, only when the primary failed with an error that
/// allows it (see [`ImportError::allows_fallback`]).
pub struct FetchChain {
    primary: Box<dyn HtmlFetcher>,
    fallback: Option<Box<dyn HtmlFetcher>>,
}

impl FetchChain {
    pub fn new(primary: Box<dyn HtmlFetcher>, fallback: Option<Box<dyn HtmlFetcher>>) -> Self {
        Self { primary, fallback }
    }

    /// Proxy first with direct fallback when a proxy is configured, otherwise
    /// direct only.
    pub fn from_config(config: &FetchConfig) -> Result<Self, ImportError> {
        let timeout = Duration::from_secs(config.timeout);
        let direct = || -> Result<Box<dyn HtmlFetcher>, ImportError> {
            Ok(Box::new(RequestFetcher::new(Some(timeout), &config.user_agent)?))
        };

        match config.proxy_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(endpoint) => {
                let proxy = Box::new(ProxyFetcher::new(endpoint, Some(timeout))?);
                let fallback = if config.direct_fetch {
                    Some(direct()?)
                } else {
                    None
                };
                Ok(Self::new(proxy, fallback))
            }
            None => Ok(Self::new(direct()?, None)),
        }
    }

    /// Fetch with the primary fetcher only.
    pub async fn fetch_primary(&self, url: &str) -> Result<FetchedPage, ImportError> {
        info!("Fetching {} via {}", url, self.primary.name());
        self.primary.fetch(url).await
    }

    /// Fetch with the primary fetcher, then the fallback if allowed.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ImportError> {
        match self.fetch_primary(url).await {
            Ok(page) => Ok(page),
            Err(e) => match &self.fallback {
                Some(fallback) if e.allows_fallback() => {
                    warn!(
                        "{} fetch failed ({}), falling back to {}",
                        self.primary.name(),
                        e,
                        fallback.name()
                    );
                    fallback.fetch(url).await
                }
                _ => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        name: &'static str,
        result: fn() -> Result<FetchedPage, ImportError>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl HtmlFetcher for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _url: &str) -> Result<FetchedPage, ImportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn page() -> Result<FetchedPage, ImportError> {
        Ok(FetchedPage {
            html: "<html></html>".to_string(),
            url: "https://example.com/".to_string(),
        })
    }

    fn chain(
        primary: fn() -> Result<FetchedPage, ImportError>,
    ) -> (FetchChain, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let primary_calls = Arc::new(AtomicUsize::new(0));
        let fallback_calls = Arc::new(AtomicUsize::new(0));
        let chain = FetchChain::new(
            Box::new(Scripted {
                name: "proxy",
                result: primary,
                calls: primary_calls.clone(),
            }),
            Some(Box::new(Scripted {
                name: "direct",
                result: page,
                calls: fallback_calls.clone(),
            })),
        );
        (chain, primary_calls, fallback_calls)
    }

    #[tokio::test]
    async fn test_fallback_runs_after_transport_failure() {
        let (chain, primary, fallback) =
            chain(|| Err(ImportError::ProxyResponse("not json".to_string())));
        assert!(chain.fetch("https://example.com").await.is_ok());
        assert_eq!(primary.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explicit_rejection_is_final() {
        let (chain, _, fallback) =
            chain(|| Err(ImportError::ProxyRejected("domain not allowed".to_string())));
        let err = chain.fetch("https://example.com").await.unwrap_err();
        assert!(matches!(err, ImportError::ProxyRejected(_)));
        assert_eq!(fallback.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_only_skips_fallback() {
        let (chain, _, fallback) =
            chain(|| Err(ImportError::ProxyResponse("not json".to_string())));
        assert!(chain.fetch_primary("https://example.com").await.is_err());
        assert_eq!(fallback.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_from_config_without_proxy() {
        assert!(FetchChain::from_config(&FetchConfig::default()).is_ok());
    }
}
