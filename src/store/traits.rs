//! Fallback storage trait — the injected collaborator the orchestrator and
//! report view write to when the remote API fails.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::onboarding::model::UserRecord;

/// A local record set addressed by email.
#[async_trait]
pub trait FallbackStore: Send + Sync {
    /// All records, in insertion order.
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Look up a record by its email key.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Merge-by-email: replace the record with the same email in place, or
    /// append when none exists.
    async fn upsert(&self, record: UserRecord) -> Result<(), StoreError>;
}
