// LLM abstraction layer

pub mod provider;
pub mod gemini;
pub mod response;

pub use provider::*;
pub use response::CompletionPayload;
pub use crate::types::{LLMMessage, LLMRequest, LLMResponse};
