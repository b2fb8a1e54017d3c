use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::db::ToolCallLog;
use crate::llm::LLM;
use crate::search::{ArxivClient, TavilyClient};
use crate::utils::retry::RetryPolicy;

/// Shared state handed to every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub web_cache: Arc<ResponseCache<Vec<WebResult>>>,
    pub tavily: Option<Arc<TavilyClient>>,
    pub arxiv: Arc<ArxivClient>,
    pub llm: Option<Arc<LLM>>,
    pub retry: RetryPolicy,
    pub tool_log: ToolCallLog,
}

impl AppState {
    /// Build clients from configuration. Missing API keys leave the matching
    /// client unset; the endpoints then answer with a configuration error.
    pub fn from_config(config: Config, tool_log: ToolCallLog) -> anyhow::Result<Self> {
        let tavily = TavilyClient::from_config(&config.search)?.map(Arc::new);
        let arxiv = Arc::new(ArxivClient::from_config(&config.arxiv)?);
        let llm = LLM::from_config(&config.llm)?.map(Arc::new);

        Ok(Self {
            web_cache: Arc::new(ResponseCache::new(config.cache.ttl())),
            tavily,
            arxiv,
            llm,
            retry: RetryPolicy::from_config(&config.retry),
            tool_log,
            config,
        })
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry = RetryPolicy::new(self.retry.max_attempts, backoff);
        self
    }
}

/// Normalized web search hit
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WebResult {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Normalized arXiv paper
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PaperResult {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub citation: String,
    pub source: String,
    pub date: String,
    pub authors: Vec<String>,
}

// API Request/Response types

#[derive(Debug, Default, serde::Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SearchWebResponse {
    pub results: Vec<WebResult>,
    pub cached: bool,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SearchArxivResponse {
    pub results: Vec<PaperResult>,
}

/// `null` and absent fields are both treated as missing
#[derive(Debug, Default, serde::Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
}
