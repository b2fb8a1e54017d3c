use sqlx::postgres::PgPool;
use tracing::{debug, warn};

use super::operations::{DbOperations, ToolCallRecord};

/// Passive sink for tool-call metadata.
///
/// Writes happen on a background task and their failures are only logged, so
/// a slow or missing database never changes what a caller receives.
#[derive(Clone, Default)]
pub struct ToolCallLog {
    pool: Option<PgPool>,
}

impl ToolCallLog {
    pub fn new(pool: Option<PgPool>) -> Self {
        Self { pool }
    }

    pub fn disabled() -> Self {
        Self { pool: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    pub fn record(&self, record: ToolCallRecord) {
        let Some(pool) = self.pool.clone() else {
            debug!(tool = %record.tool, "Tool call sink disabled, skipping");
            return;
        };

        tokio::spawn(async move {
            if let Err(e) = DbOperations::insert_tool_call(&pool, &record).await {
                warn!(tool = %record.tool, error = %e, "Failed to record tool call");
            }
        });
    }
}
