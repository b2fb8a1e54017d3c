use async_trait::async_trait;

use crate::config::LLMConfig;
use crate::types::{LLMRequest, LLMResponse, UpstreamError, UpstreamResult};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> UpstreamResult<LLMResponse>;
}

/// Configuration for an LLM provider
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
    model: String,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig, model: impl Into<String>) -> UpstreamResult<Self> {
        let adapter: Box<dyn LLMAdapter> = match provider.name.as_str() {
            "gemini" | "google" => Box::new(crate::llm::gemini::GeminiAdapter::new(
                &provider.api_key,
                &provider.base_url,
                std::time::Duration::from_secs(provider.timeout_secs),
            )?),
            other => {
                return Err(UpstreamError::Client(format!("Unsupported provider: {}", other)))
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.name,
            model: model.into(),
        })
    }

    /// `None` when no API key is configured
    pub fn from_config(config: &LLMConfig) -> UpstreamResult<Option<Self>> {
        let Some(api_key) = config.gemini_api_key.clone() else {
            return Ok(None);
        };

        let provider = LLMProviderConfig {
            name: "gemini".to_string(),
            api_key,
            base_url: config.gemini_base_url.clone(),
            timeout_secs: config.timeout_secs,
        };
        Self::new(provider, config.model.clone()).map(Some)
    }

    /// Wrap an existing adapter
    pub fn with_adapter(
        adapter: Box<dyn LLMAdapter>,
        provider_name: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            adapter,
            provider_name: provider_name.into(),
            model: model.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> UpstreamResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
