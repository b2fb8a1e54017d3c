// Type definitions and error taxonomy

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::models::ErrorResponse;
use crate::utils::retry::{CallFailure, Transient};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "model"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub model: String,
}

/// Failure talking to an external provider.
///
/// Only carries text so the variants can be built in tests without a live
/// client; the source error is logged where it is converted.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse upstream response: {0}")]
    Parse(String),

    #[error("upstream response contained no usable text")]
    EmptyAnswer,

    #[error("client error: {0}")]
    Client(String),

    #[error("all {attempted} endpoints failed, last error: {last}")]
    AllEndpointsFailed {
        attempted: usize,
        last: String,
        transient: bool,
    },
}

impl Transient for UpstreamError {
    fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Network(_) | UpstreamError::Timeout(_) => true,
            UpstreamError::AllEndpointsFailed { transient, .. } => *transient,
            UpstreamError::Status { .. }
            | UpstreamError::Parse(_)
            | UpstreamError::EmptyAnswer
            | UpstreamError::Client(_) => false,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err.to_string())
        } else if err.is_decode() {
            UpstreamError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            UpstreamError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_connect() || err.is_request() || err.is_body() {
            // DNS resolution and refused connections both land here
            UpstreamError::Network(err.to_string())
        } else {
            UpstreamError::Client(err.to_string())
        }
    }
}

pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Upstream(#[from] CallFailure),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Text shown to the caller. Never includes upstream or database detail.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotConfigured(msg) | AppError::InvalidRequest(msg) => msg.clone(),
            AppError::Upstream(failure) => failure.to_string(),
            AppError::Database(_) => "Something went wrong. Please try again later.".to_string(),
        }
    }
}

/// Errors are reported in the body with a 200 status, which is what existing
/// clients of the tool endpoints check for.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Database(_) = &self {
            error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.user_message(),
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
