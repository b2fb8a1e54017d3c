use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::AppResult;

/// One row of the `tool_calls` table
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolCallRecord {
    pub id: Uuid,
    pub tool: String,
    pub query: String,
    pub result_count: i32,
    pub cached: bool,
    pub outcome: String,
    pub created_at: DateTime<Utc>,
}

impl ToolCallRecord {
    pub fn new(tool: &str, query: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool: tool.to_string(),
            query: query.to_string(),
            result_count: 0,
            cached: false,
            outcome: "ok".to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn with_results(mut self, count: usize, cached: bool) -> Self {
        self.result_count = i32::try_from(count).unwrap_or(i32::MAX);
        self.cached = cached;
        self
    }

    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.outcome = reason.into();
        self
    }
}

pub struct DbOperations;

impl DbOperations {
    pub async fn insert_tool_call(pool: &PgPool, record: &ToolCallRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tool_calls (id, tool, query, result_count, cached, outcome, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.tool)
        .bind(&record.query)
        .bind(record.result_count)
        .bind(record.cached)
        .bind(&record.outcome)
        .bind(record.created_at)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builders() {
        let record = ToolCallRecord::new("search_web", "rust").with_results(3, true);
        assert_eq!(record.tool, "search_web");
        assert_eq!(record.result_count, 3);
        assert!(record.cached);
        assert_eq!(record.outcome, "ok");

        let failed = ToolCallRecord::new("ask_ai", "why").failed("unavailable");
        assert_eq!(failed.outcome, "unavailable");
        assert_eq!(failed.result_count, 0);
    }
}
