// Endpoint fallback
//
// Walks an ordered list of equivalent endpoints once and keeps the first
// success. Sits above the retry loop: the list is never re-walked per attempt.

use std::future::Future;
use tracing::{debug, warn};

use crate::types::{UpstreamError, UpstreamResult};
use crate::utils::retry::Transient;

/// Call `send` for each endpoint in order until one succeeds.
///
/// `send` is expected to turn a non-success HTTP status into an error so the
/// next endpoint gets a chance. When every endpoint fails, the combined error
/// is transient only if all of them failed at the transport level.
pub async fn first_success<F, Fut, R>(endpoints: &[String], mut send: F) -> UpstreamResult<R>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = UpstreamResult<R>>,
{
    let mut last: Option<UpstreamError> = None;
    let mut all_transient = true;

    for endpoint in endpoints {
        debug!(endpoint = %endpoint, "Trying endpoint");
        match send(endpoint).await {
            Ok(response) => return Ok(response),
            Err(err) => {
                warn!(endpoint = %endpoint, error = %err, "Endpoint failed, trying next");
                all_transient &= err.is_transient();
                last = Some(err);
            }
        }
    }

    Err(UpstreamError::AllEndpointsFailed {
        attempted: endpoints.len(),
        last: last
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no endpoints configured".to_string()),
        transient: all_transient && !endpoints.is_empty(),
    })
}
