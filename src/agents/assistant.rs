//! Assistant Agent
//!
//! Answers a question about a piece of context (usually a search result the
//! user picked) with a short LLM completion. Transient network failures get
//! one more try; everything else is reported straight away.

use crate::llm::LLM;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};
use crate::utils::retry::{with_retry, RetryPolicy, Service};
use tracing::{error, info};

pub const MISSING_QUESTION: &str = "Missing question.";
pub const MISSING_CONTEXT: &str = "Missing context.";
pub const NOT_CONFIGURED: &str = "AI assistant is not configured. Please add GEMINI_API_KEY.";

pub struct AssistantAgent;

impl AssistantAgent {
    /// Validate input, then ask the LLM. The upstream is only called once the
    /// question, the context and the client are all present.
    pub async fn answer(
        llm: Option<&LLM>,
        policy: &RetryPolicy,
        question: &str,
        context: &str,
    ) -> AppResult<String> {
        let question = question.trim();
        let context = context.trim();

        if question.is_empty() {
            return Err(AppError::InvalidRequest(MISSING_QUESTION.to_string()));
        }
        if context.is_empty() {
            return Err(AppError::InvalidRequest(MISSING_CONTEXT.to_string()));
        }

        let Some(llm) = llm else {
            error!("GEMINI_API_KEY is missing. Set GEMINI_API_KEY in .env and restart.");
            return Err(AppError::NotConfigured(NOT_CONFIGURED.to_string()));
        };

        let request = LLMRequest {
            model: llm.model().to_string(),
            messages: vec![LLMMessage::user(Self::create_prompt(context, question))],
        };

        info!(
            provider = llm.provider_name(),
            question_len = question.len(),
            context_len = context.len(),
            "Asking assistant"
        );

        let response = with_retry(Service::Assistant, policy, || {
            llm.create_chat_completion(&request)
        })
        .await?;

        info!(answer_len = response.content.len(), "Assistant answered");
        Ok(response.content)
    }

    fn create_prompt(context: &str, question: &str) -> String {
        format!(
            "You are a concise research assistant. Use the context to answer the user's question. \
             Be factual and short (1-3 paragraphs). If the context doesn't contain the answer, \
             say so and give a next-step suggestion.\n\n\
             Context:\n{context}\n\nQuestion:\n{question}\n\nAnswer:"
        )
    }
}
