use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{ProviderError, truncate_body},
    model::LocationImage,
};

use super::ImageProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

const PROVIDER: &str = "Unsplash";

#[derive(Debug, Clone)]
pub struct UnsplashProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl UnsplashProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct UsUrls {
    regular: String,
}

#[derive(Debug, Deserialize)]
struct UsPhoto {
    urls: UsUrls,
}

#[derive(Debug, Deserialize)]
struct UsSearchResponse {
    #[serde(default)]
    results: Vec<UsPhoto>,
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    async fn search(&self, text: &str) -> Result<Option<LocationImage>, ProviderError> {
        let url = format!("{}/search/photos", self.base_url.trim_end_matches('/'));

        debug!(text, "searching Unsplash");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("query", text),
                ("client_id", self.api_key.as_str()),
                ("per_page", "1"),
            ])
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ProviderError::Transport {
            provider: PROVIDER,
            source,
        })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body: truncate_body(&body),
            });
        }

        parse_search(&body)
    }
}

pub(crate) fn parse_search(body: &str) -> Result<Option<LocationImage>, ProviderError> {
    let parsed: UsSearchResponse =
        serde_json::from_str(body).map_err(|source| ProviderError::Decode {
            provider: PROVIDER,
            source,
        })?;

    Ok(parsed
        .results
        .into_iter()
        .next()
        .map(|photo| LocationImage {
            url: photo.urls.regular,
        }))
}
