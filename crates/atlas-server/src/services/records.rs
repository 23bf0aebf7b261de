//! Admin record store seam.

use crate::errors::AtlasError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Resource metadata record managed through the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRecord {
    /// Full resource identifier the record describes.
    pub id: String,

    /// Free-form metadata payload.
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Storage for admin-managed resource metadata.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. Fails if the identifier already exists.
    async fn insert(&self, record: AdminRecord) -> Result<(), AtlasError>;

    /// Update an existing record. Fails if the identifier is unknown.
    async fn update(&self, record: AdminRecord) -> Result<(), AtlasError>;

    /// Delete a record. Fails if the identifier is unknown.
    async fn delete(&self, resource_id: &str) -> Result<(), AtlasError>;
}

/// In-memory record store for tests and local runs.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, AdminRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: AdminRecord) -> Result<(), AtlasError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(AtlasError::BadRequest(format!(
                "Record already exists: {}",
                record.id
            )));
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn update(&self, record: AdminRecord) -> Result<(), AtlasError> {
        let mut records = self.records.write().await;
        if !records.contains_key(&record.id) {
            return Err(AtlasError::ResourceNotFound(record.id.clone()));
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete(&self, resource_id: &str) -> Result<(), AtlasError> {
        let mut records = self.records.write().await;
        records
            .remove(resource_id)
            .map(|_| ())
            .ok_or_else(|| AtlasError::ResourceNotFound(resource_id.to_string()))
    }
}
