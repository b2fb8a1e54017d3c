//! arXiv Client
//!
//! Queries the arXiv export API, which answers with an Atom feed. The export
//! mirrors are tried in order and the first one answering with a success
//! status is used.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ArxivConfig;
use crate::models::PaperResult;
use crate::types::{UpstreamError, UpstreamResult};
use crate::utils::fallback::first_success;

const USER_AGENT: &str = concat!("research-assistant/", env!("CARGO_PKG_VERSION"));
const UNKNOWN_DATE: &str = "Unknown Date";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

pub struct ArxivClient {
    client: Client,
    endpoints: Vec<String>,
    max_results: usize,
}

impl ArxivClient {
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoints,
            max_results: 10,
        })
    }

    pub fn from_config(config: &ArxivConfig) -> reqwest::Result<Self> {
        Ok(Self::new(config.endpoints.clone(), Duration::from_secs(config.timeout_secs))?
            .with_max_results(config.max_results))
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub async fn search(&self, query: &str) -> UpstreamResult<Vec<PaperResult>> {
        info!(query = %query, "Searching arXiv");

        let search_query = format!("all:{}", query);
        let max_results = self.max_results.to_string();

        let feed = first_success(&self.endpoints, |endpoint| {
            fetch_feed(self.client.get(endpoint).query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ]))
        })
        .await?;

        debug!(bytes = feed.len(), "Raw arXiv feed received");

        let results = parse_feed(&feed)?;
        info!(count = results.len(), "arXiv search completed");
        Ok(results)
    }
}

async fn fetch_feed(request: RequestBuilder) -> UpstreamResult<String> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body: String::new(),
        });
    }
    Ok(response.text().await?)
}

/// Parse an arXiv Atom feed into paper records.
pub fn parse_feed(xml: &str) -> UpstreamResult<Vec<PaperResult>> {
    let feed: AtomFeed =
        quick_xml::de::from_str(xml).map_err(|e| UpstreamError::Parse(e.to_string()))?;

    Ok(feed.entries.into_iter().map(into_paper).collect())
}

fn into_paper(entry: AtomEntry) -> PaperResult {
    let url = entry
        .links
        .iter()
        .find(|link| link.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .map(|link| link.href.clone())
        .unwrap_or_else(|| entry.id.clone());

    let authors: Vec<String> = entry
        .authors
        .into_iter()
        .map(|a| collapse_whitespace(&a.name))
        .filter(|name| !name.is_empty())
        .collect();

    let date = entry
        .published
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());

    PaperResult {
        title: collapse_whitespace(&entry.title),
        summary: entry.summary.trim().to_string(),
        url,
        citation: citation(&authors, &date),
        source: "arXiv".to_string(),
        date,
        authors,
    }
}

/// "A, B (2024-01-31)."
fn citation(authors: &[String], published: &str) -> String {
    let names = if authors.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        authors.join(", ")
    };
    let day = published.split('T').next().unwrap_or(published);
    format!("{} ({}).", names, day)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
