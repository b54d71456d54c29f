//! Remote API seam — the trait the wizard, admin editor, and report view
//! talk through, plus the HTTP implementation.

pub mod client;

pub use client::HttpApi;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::onboarding::model::{Credentials, PageConfiguration, UpdateRequest, UserRecord};

/// The REST surface consumed by the flow.
///
/// Behind a trait so orchestration logic can run against a stub in tests
/// and so an unreachable backend is just another implementation detail.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// `POST /users/register` — create a user from step-1 credentials.
    async fn register(&self, credentials: &Credentials) -> Result<UserRecord, ApiError>;

    /// `GET /users/{email}` — `Ok(None)` when no such user exists.
    async fn get_user(&self, email: &str) -> Result<Option<UserRecord>, ApiError>;

    /// `PUT /users/{email}` — merge-update the provided fields.
    async fn update_user(
        &self,
        email: &str,
        update: &UpdateRequest,
    ) -> Result<UserRecord, ApiError>;

    /// `GET /users` — every record, for the reporting view.
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError>;

    /// `GET /onboarding-config`.
    async fn get_configuration(&self) -> Result<PageConfiguration, ApiError>;

    /// `PUT /onboarding-config` — replace the whole document.
    async fn put_configuration(&self, config: &PageConfiguration) -> Result<(), ApiError>;
}
