use axum::{
    Router,
    routing::post,
    Json,
    extract::{rejection::JsonRejection, State},
};
use tracing::warn;
use crate::agents::AssistantAgent;
use crate::db::ToolCallRecord;
use crate::models::{AnswerResponse, AppState, AskRequest};
use crate::types::{AppError, AppResult};

pub const INVALID_BODY: &str = "Invalid request body.";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tools/ask_ai", post(ask_ai))
        .with_state(state)
}

/// POST /tools/ask_ai with `{"question": "...", "context": "..."}`
pub async fn ask_ai(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<Json<AnswerResponse>> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected ask_ai body");
            let err = AppError::InvalidRequest(INVALID_BODY.to_string());
            state
                .tool_log
                .record(ToolCallRecord::new("ask_ai", "").failed(err.user_message()));
            return Err(err);
        }
    };

    let question = request.question.as_deref().unwrap_or_default();
    let context = request.context.as_deref().unwrap_or_default();

    let result = AssistantAgent::answer(state.llm.as_deref(), &state.retry, question, context).await;

    let record = ToolCallRecord::new("ask_ai", question.trim());
    match result {
        Ok(answer) => {
            state.tool_log.record(record.with_results(1, false));
            Ok(Json(AnswerResponse { answer }))
        }
        Err(e) => {
            state.tool_log.record(record.failed(e.user_message()));
            Err(e)
        }
    }
}
