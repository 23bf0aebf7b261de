//! Entity query execution seam.

use crate::errors::AtlasError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Executes entity queries for authorized requests.
///
/// The real execution backend is a separate service; handlers only depend
/// on this seam.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Rows recorded for the given resource identifier.
    async fn entities(&self, resource_id: &str) -> Result<Vec<Value>, AtlasError>;
}

/// In-memory query executor for tests and local runs.
#[derive(Default)]
pub struct MemoryQueryExecutor {
    rows: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryQueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row for a resource identifier.
    pub async fn insert(&self, resource_id: &str, row: Value) {
        let mut rows = self.rows.write().await;
        rows.entry(resource_id.to_string()).or_default().push(row);
    }
}

#[async_trait]
impl QueryExecutor for MemoryQueryExecutor {
    async fn entities(&self, resource_id: &str) -> Result<Vec<Value>, AtlasError> {
        let rows = self.rows.read().await;
        Ok(rows.get(resource_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_executor_returns_seeded_rows() {
        let executor = MemoryQueryExecutor::new();
        executor
            .insert("u1/hashX/serverA/groupB/nameC", json!({"temp": 21.5}))
            .await;

        let rows = executor
            .entities("u1/hashX/serverA/groupB/nameC")
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({"temp": 21.5})]);
    }

    #[tokio::test]
    async fn test_memory_executor_unknown_resource_is_empty() {
        let executor = MemoryQueryExecutor::new();
        let rows = executor.entities("a/b/c/d/e").await.unwrap();
        assert!(rows.is_empty());
    }
}
