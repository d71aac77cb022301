//! In-memory audit store for tests and throwaway sessions.

use async_trait::async_trait;
use penwright_core::audit::{AuditLogStore, InteractionRecord};
use penwright_core::error::AuditError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps records in a Vec. Nothing survives the process.
#[derive(Clone)]
pub struct InMemoryAuditStore {
    records: Arc<RwLock<Vec<InteractionRecord>>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLogStore for InMemoryAuditStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, record: &InteractionRecord) -> Result<(), AuditError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn query(&self, username: Option<&str>) -> Result<Vec<InteractionRecord>, AuditError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| username.is_none_or(|u| r.username == u))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, AuditError> {
        Ok(self.records.read().await.len())
    }
}
