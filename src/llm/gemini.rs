// Gemini (Google Generative Language API) adapter
// API Reference: https://ai.google.dev/api/generate-content

use crate::llm::provider::LLMAdapter;
use crate::llm::response::CompletionPayload;
use crate::types::{LLMRequest, LLMResponse, UpstreamError, UpstreamResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

pub struct GeminiAdapter {
    client: Client,
    api_key: String,
    base_url: String,
}

// Request types for the generateContent endpoint
#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

impl GeminiAdapter {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> UpstreamResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn build_request(request: &LLMRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| GeminiContent {
                role: m.role.clone(),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GenerateContentRequest { contents }
    }
}

#[async_trait]
impl LLMAdapter for GeminiAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> UpstreamResult<LLMResponse> {
        let body = Self::build_request(request);

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
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
        let payload: CompletionPayload = serde_json::from_str(&text)
            .map_err(|e| UpstreamError::Parse(format!("Gemini response: {}", e)))?;

        let (shape, content) = payload.extract().ok_or_else(|| {
            warn!(shape = payload.shape(), "Could not extract text from Gemini response");
            UpstreamError::EmptyAnswer
        })?;
        debug!(shape, answer_len = content.len(), "Gemini response received");

        Ok(LLMResponse {
            content,
            model: request.model.clone(),
        })
    }
}
