//! Agent System
//!
//! - **Assistant Agent**: answers questions about a search result with the configured LLM

pub mod assistant;

pub use assistant::AssistantAgent;
