//! JSON-file fallback store — one named record set, whole-set
//! read-modify-write on every mutation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::onboarding::model::UserRecord;

use super::traits::FallbackStore;

/// Default file name of the record set.
pub const DEFAULT_SET_NAME: &str = "onboarding-users.json";

/// File-backed record set.
///
/// Every mutation reads the whole set, edits it in memory, and writes it
/// back. The mutex serializes read-modify-write cycles within the process;
/// a single logical session is the expected writer.
pub struct JsonFileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            // A missing file is an empty record set.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, records: &[UserRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

#[async_trait]
impl FallbackStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let _guard = self.guard.lock().await;
        self.read_all().await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let _guard = self.guard.lock().await;
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|r| r.email == email))
    }

    async fn upsert(&self, record: UserRecord) -> Result<(), StoreError> {
        let _guard = self.guard.lock().await;
        let mut records = self.read_all().await?;
        match records.iter_mut().find(|r| r.email == record.email) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.write_all(&records).await?;
        debug!(path = %self.path.display(), count = records.len(), "Local record set written");
        Ok(())
    }
}
