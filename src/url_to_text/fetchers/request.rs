use super::{FetchedPage, HtmlFetcher};
use crate::error::ImportError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

/// Plain GET against the recipe site itself.
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Result<Self, ImportError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HtmlFetcher for RequestFetcher {
    fn name(&self) -> &str {
        "direct"
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, ImportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), final_url);
        Ok(FetchedPage {
            html,
            url: final_url,
        })
    }
}
