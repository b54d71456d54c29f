//! In-memory fallback store — test double for the JSON-file record set.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::onboarding::model::UserRecord;

use super::traits::FallbackStore;

/// Record set held in memory. Same merge-by-email semantics as the file
/// store, nothing persisted.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FallbackStore for MemoryStore {
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.email == email)
            .cloned())
    }

    async fn upsert(&self, record: UserRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.email == record.email) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }
}
