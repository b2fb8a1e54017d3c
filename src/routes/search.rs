use axum::{
    Router,
    routing::get,
    Json,
    extract::{Query, State},
};
use crate::cache::fingerprint;
use crate::db::ToolCallRecord;
use crate::models::{AppState, SearchArxivResponse, SearchQuery, SearchWebResponse};
use crate::search::tavily;
use crate::types::{AppError, AppResult};
use crate::utils::retry::{with_retry, RetryPolicy, Service};
use tracing::info;

pub const MISSING_QUERY: &str = "Missing query.";
pub const TAVILY_NOT_CONFIGURED: &str = "TAVILY_API_KEY missing in .env";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tools/search_web", get(search_web))
        .route("/tools/search_arxiv", get(search_arxiv))
        .with_state(state)
}

/// GET /tools/search_web?query=...
pub async fn search_web(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchWebResponse>> {
    let Some(client) = state.tavily.clone() else {
        return Err(AppError::NotConfigured(TAVILY_NOT_CONFIGURED.to_string()));
    };
    let query = require_query(params)?;

    let key = fingerprint(tavily::PROVIDER, &query);
    let outcome = state
        .web_cache
        .get_or_fetch(&key, || {
            with_retry(Service::WebSearch, &state.retry, || client.search(&query))
        })
        .await;

    let record = ToolCallRecord::new("search_web", &query);
    match outcome {
        Ok((results, cached)) => {
            info!(query = %query, count = results.len(), cached, "Web search served");
            state.tool_log.record(record.with_results(results.len(), cached));
            Ok(Json(SearchWebResponse { results, cached }))
        }
        Err(failure) => {
            state.tool_log.record(record.failed(failure.to_string()));
            Err(failure.into())
        }
    }
}

/// GET /tools/search_arxiv?query=...
///
/// The mirror fallback already spends its own retries, so the call runs once.
pub async fn search_arxiv(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchArxivResponse>> {
    let query = require_query(params)?;

    let outcome = with_retry(Service::Arxiv, &RetryPolicy::single(), || {
        state.arxiv.search(&query)
    })
    .await;

    let record = ToolCallRecord::new("search_arxiv", &query);
    match outcome {
        Ok(results) => {
            info!(query = %query, count = results.len(), "arXiv search served");
            state.tool_log.record(record.with_results(results.len(), false));
            Ok(Json(SearchArxivResponse { results }))
        }
        Err(failure) => {
            state.tool_log.record(record.failed(failure.to_string()));
            Err(failure.into())
        }
    }
}

fn require_query(params: SearchQuery) -> AppResult<String> {
    params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest(MISSING_QUERY.to_string()))
}
