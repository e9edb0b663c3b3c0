use super::{FetchedPage, HtmlFetcher};
use crate::error::ImportError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct ProxyRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    success: bool,
    html: Option<String>,
    url: Option<String>,
    error: Option<String>,
}

/// Fetches pages through the recipe proxy service.
///
/// Contract: `POST {"url": ...}` answers `{"success": true, "html": ...,
/// "url": ...}` or `{"error": ...}`.
pub struct ProxyFetcher {
    endpoint: String,
    client: Client,
}

impl ProxyFetcher {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ImportError> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(Duration::from_secs(30)))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl HtmlFetcher for ProxyFetcher {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, ImportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ProxyRequest { url })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Error payloads may arrive with a 4xx/5xx status, so read the body first
        let payload: ProxyResponse = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => {
                return Err(ImportError::HttpStatus {
                    status: status.as_u16(),
                    url: self.endpoint.clone(),
                })
            }
            Err(e) => return Err(ImportError::ProxyResponse(e.to_string())),
        };

        if let Some(error) = payload.error.filter(|e| !e.trim().is_empty()) {
            debug!("Proxy rejected {}: {}", url, error);
            return Err(ImportError::ProxyRejected(error));
        }

        match payload.html {
            Some(html) if payload.success => Ok(FetchedPage {
                html,
                url: payload.url.unwrap_or_else(|| url.to_string()),
            }),
            _ if !status.is_success() => Err(ImportError::HttpStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            }),
            _ => Err(ImportError::ProxyResponse(
                "response carried no page HTML".to_string(),
            )),
        }
    }
}
