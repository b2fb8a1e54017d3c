//! Tavily Client
//!
//! General web search. Results are normalized into [`WebResult`] records;
//! fields the provider leaves out get placeholder values so the frontend can
//! render every hit.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::models::WebResult;
use crate::types::{UpstreamError, UpstreamResult};

/// Cache fingerprint prefix for this provider
pub const PROVIDER: &str = "tavily";

#[derive(Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_answer: bool,
    search_depth: &'a str,
    include_images: bool,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyItem>,
}

#[derive(Debug, Deserialize)]
struct TavilyItem {
    title: Option<String>,
    content: Option<String>,
    url: Option<String>,
}

pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_results: usize,
}

impl TavilyClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results: 8,
        })
    }

    /// `None` when no API key is configured
    pub fn from_config(config: &SearchConfig) -> reqwest::Result<Option<Self>> {
        let Some(api_key) = config.tavily_api_key.as_deref() else {
            return Ok(None);
        };

        let client = Self::new(
            api_key,
            config.tavily_base_url.as_str(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_max_results(config.max_results);
        Ok(Some(client))
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub async fn search(&self, query: &str) -> UpstreamResult<Vec<WebResult>> {
        info!(query = %query, "Searching the web via Tavily");

        let body = TavilySearchRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
            include_answer: false,
            search_depth: "basic",
            include_images: false,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: TavilySearchResponse = serde_json::from_str(&text)
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        debug!(raw_count = parsed.results.len(), "Raw Tavily response received");

        let results: Vec<WebResult> = parsed.results.into_iter().map(normalize).collect();
        info!(count = results.len(), "Tavily search completed");
        Ok(results)
    }
}

fn normalize(item: TavilyItem) -> WebResult {
    let source = item
        .url
        .as_deref()
        .and_then(host_of)
        .unwrap_or("Tavily")
        .to_string();

    WebResult {
        title: item.title.unwrap_or_else(|| "Untitled".to_string()),
        summary: item
            .content
            .unwrap_or_else(|| "No summary available.".to_string()),
        url: item.url.unwrap_or_else(|| "#".to_string()),
        source,
        kind: "web".to_string(),
    }
}

/// Host part of an absolute URL ("https://host/path" -> "host")
fn host_of(url: &str) -> Option<&str> {
    url.split('/').nth(2).filter(|host| !host.is_empty())
}
