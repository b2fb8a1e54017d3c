// Retry utilities
//
// Fixed backoff and a low attempt ceiling: a slow upstream should surface as
// an error quickly instead of holding the request open.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::RetryConfig;

/// Errors that know whether another attempt could succeed.
pub trait Transient {
    /// Network, timeout and DNS-class failures
    fn is_transient(&self) -> bool;
}

/// Upstream service a call belongs to, used to word the caller-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    WebSearch,
    Arxiv,
    Assistant,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::WebSearch => write!(f, "Web search"),
            Service::Arxiv => write!(f, "arXiv search"),
            Service::Assistant => write!(f, "AI assistant"),
        }
    }
}

/// Uniform failure returned to callers once the wrapper gives up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallFailure {
    #[error("{service} temporarily unavailable (network). Please try again.")]
    TemporarilyUnavailable { service: Service },

    #[error("{service} is temporarily unavailable. Please try again later.")]
    Unavailable { service: Service },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    TransientFailure,
    FatalFailure,
}

#[derive(Debug, Clone)]
pub struct RetryAttempt {
    pub attempt_number: u32,
    pub error: Option<String>,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// One attempt, no wait. Used where a layer above already handles fallback.
    pub fn single() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff())
    }
}

/// Run `operation` under `policy`, mapping every failure to a [`CallFailure`].
pub async fn with_retry<F, Fut, T, E>(
    service: Service,
    policy: &RetryPolicy,
    operation: F,
) -> Result<T, CallFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + fmt::Display,
{
    with_retry_detailed(service, policy, operation).await.0
}

/// Same as [`with_retry`] but also returns the record of every attempt.
pub async fn with_retry_detailed<F, Fut, T, E>(
    service: Service,
    policy: &RetryPolicy,
    mut operation: F,
) -> (Result<T, CallFailure>, Vec<RetryAttempt>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = Vec::with_capacity(max_attempts as usize);
    let mut attempt_number = 0;

    loop {
        attempt_number += 1;

        match operation().await {
            Ok(value) => {
                if attempt_number > 1 {
                    info!(service = %service, attempt = attempt_number, "Upstream call recovered");
                }
                attempts.push(RetryAttempt {
                    attempt_number,
                    error: None,
                    outcome: AttemptOutcome::Success,
                });
                return (Ok(value), attempts);
            }
            Err(err) if err.is_transient() => {
                attempts.push(RetryAttempt {
                    attempt_number,
                    error: Some(err.to_string()),
                    outcome: AttemptOutcome::TransientFailure,
                });

                if attempt_number < max_attempts {
                    warn!(
                        service = %service,
                        attempt = attempt_number,
                        error = %err,
                        "Transient upstream failure, retrying"
                    );
                    sleep(policy.backoff).await;
                    continue;
                }

                error!(
                    service = %service,
                    attempts = attempt_number,
                    error = %err,
                    "Upstream network failure, giving up"
                );
                return (Err(CallFailure::TemporarilyUnavailable { service }), attempts);
            }
            Err(err) => {
                error!(
                    service = %service,
                    attempt = attempt_number,
                    error = %err,
                    "Upstream call failed"
                );
                attempts.push(RetryAttempt {
                    attempt_number,
                    error: Some(err.to_string()),
                    outcome: AttemptOutcome::FatalFailure,
                });
                return (Err(CallFailure::Unavailable { service }), attempts);
            }
        }
    }
}
