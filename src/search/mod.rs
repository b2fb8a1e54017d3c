//! Search Module
//!
//! Upstream search providers:
//! - Tavily - general web search
//! - arXiv - academic preprints, via the export API with mirror fallback

pub mod arxiv;
pub mod tavily;

pub use arxiv::ArxivClient;
pub use tavily::TavilyClient;
