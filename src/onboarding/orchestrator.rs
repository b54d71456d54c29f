//! Onboarding orchestrator — wizard-level state, step transitions, and the
//! remote-else-fallback persistence discipline.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::RemoteApi;
use crate::error::{ApiError, Error, FlowError};
use crate::registry::{self, ComponentId};
use crate::store::FallbackStore;

use super::model::{Credentials, PageConfiguration, ProfileUpdate, UpdateRequest, UserRecord};
use super::state::WizardStep;

/// Drives a single onboarding session.
///
/// Owns the view step, the current user record, and the loaded page
/// configuration. All persistence goes through the remote API first and
/// falls back to the local record set when the API is unreachable; the
/// admin configuration path is the one exception (remote only).
pub struct Orchestrator {
    api: Arc<dyn RemoteApi>,
    fallback: Arc<dyn FallbackStore>,
    config: PageConfiguration,
    step: WizardStep,
    user: Option<UserRecord>,
}

impl Orchestrator {
    /// Load the page configuration and start a fresh session at step 1.
    ///
    /// A configuration fetch failure substitutes the hardcoded default so
    /// the flow stays usable offline.
    pub async fn start(api: Arc<dyn RemoteApi>, fallback: Arc<dyn FallbackStore>) -> Self {
        let config = match api.get_configuration().await {
            Ok(config) => config.normalized(),
            Err(e) => {
                warn!(error = %e, "Failed to load page configuration, using default");
                PageConfiguration::default()
            }
        };
        Self {
            api,
            fallback,
            config,
            step: WizardStep::Step1,
            user: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    pub fn configuration(&self) -> &PageConfiguration {
        &self.config
    }

    pub fn is_complete(&self) -> bool {
        self.step.is_terminal()
    }

    /// Components active for the current view step. Step 1 is fixed;
    /// steps 2 and 3 come from the admin configuration.
    pub fn active_components(&self) -> Vec<ComponentId> {
        match self.step {
            WizardStep::Step1 => vec![ComponentId::Email, ComponentId::Password],
            WizardStep::Step2 | WizardStep::Step3 => {
                registry::resolve(self.config.components_for(self.step.number()))
            }
            WizardStep::Complete => Vec::new(),
        }
    }

    /// Step-1 submission: adopt an existing remote record (resuming a
    /// partial onboarding), register a new one, or — when the remote is
    /// unreachable — construct the record locally and write it to the
    /// fallback set. The view moves forward in every outcome.
    pub async fn submit_step1(&mut self, credentials: Credentials) -> Result<&UserRecord, Error> {
        match self.api.get_user(&credentials.email).await {
            Ok(Some(existing)) => {
                // Remote wins over any stale local copy of the same email.
                info!(email = %existing.email, current_step = existing.current_step, "Resuming existing user");
                self.step = WizardStep::resume_from(existing.current_step);
                self.user = Some(existing);
            }
            Ok(None) => {
                let api = Arc::clone(&self.api);
                let creds = credentials.clone();
                let local = UserRecord::new_local(&credentials.email, &credentials.password);
                let record = self
                    .try_remote_or_local(async move { api.register(&creds).await }, local)
                    .await?;
                self.step = WizardStep::resume_from(record.current_step);
                self.user = Some(record);
            }
            Err(e) => {
                warn!(error = %e, "User lookup failed, creating record locally");
                let record = UserRecord::new_local(&credentials.email, &credentials.password);
                self.fallback.upsert(record.clone()).await?;
                self.step = WizardStep::Step2;
                self.user = Some(record);
            }
        }
        Ok(self.user.as_ref().expect("user set in every branch"))
    }

    /// Step-2/3 submission: merge the filtered payload into the record,
    /// advance `current_step`, persist remotely or into the fallback set,
    /// and move the view forward (to `Complete` after step 3).
    pub async fn submit_step(&mut self, payload: ProfileUpdate) -> Result<&UserRecord, Error> {
        if !self.step.is_profile_step() {
            return Err(FlowError::NotAProfileStep { step: self.step }.into());
        }
        let user = self.user.as_ref().ok_or(FlowError::NoActiveUser)?;

        let next_step = self.step.number() + 1;
        let mut merged = user.clone();
        merged.apply(&payload);
        merged.current_step = next_step;

        let request = UpdateRequest {
            profile: payload,
            current_step: Some(next_step),
        };
        let api = Arc::clone(&self.api);
        let email = merged.email.clone();
        let record = self
            .try_remote_or_local(
                async move { api.update_user(&email, &request).await },
                merged,
            )
            .await?;

        self.step = self.step.next().expect("profile steps have a next step");
        self.user = Some(record);
        Ok(self.user.as_ref().expect("just set"))
    }

    /// Rewind the view one step. Legal only from steps 2 and 3; no
    /// persistence side effect, no validation.
    pub fn previous(&mut self) -> Result<WizardStep, FlowError> {
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                Ok(previous)
            }
            None => Err(FlowError::InvalidPrevious { step: self.step }),
        }
    }

    /// Leave the terminal success view and start over with a cleared record.
    pub fn reset(&mut self) {
        self.step = WizardStep::Step1;
        self.user = None;
    }

    /// The dual-write combinator: run the remote persistence future and, on
    /// any failure, merge the locally computed record into the fallback set
    /// instead. Never retries.
    async fn try_remote_or_local<F>(
        &self,
        remote: F,
        local: UserRecord,
    ) -> Result<UserRecord, Error>
    where
        F: Future<Output = Result<UserRecord, ApiError>>,
    {
        match remote.await {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!(error = %e, email = %local.email, "Remote persistence failed, writing to local fallback");
                self.fallback.upsert(local.clone()).await?;
                Ok(local)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;

    /// Remote that always fails, as if the backend were down.
    struct OfflineApi;

    #[async_trait]
    impl RemoteApi for OfflineApi {
        async fn register(&self, _: &Credentials) -> Result<UserRecord, ApiError> {
            Err(ApiError::Request("connection refused".to_string()))
        }
        async fn get_user(&self, _: &str) -> Result<Option<UserRecord>, ApiError> {
            Err(ApiError::Request("connection refused".to_string()))
        }
        async fn update_user(
            &self,
            _: &str,
            _: &UpdateRequest,
        ) -> Result<UserRecord, ApiError> {
            Err(ApiError::Request("connection refused".to_string()))
        }
        async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
            Err(ApiError::Request("connection refused".to_string()))
        }
        async fn get_configuration(&self) -> Result<PageConfiguration, ApiError> {
            Err(ApiError::Request("connection refused".to_string()))
        }
        async fn put_configuration(&self, _: &PageConfiguration) -> Result<(), ApiError> {
            Err(ApiError::Request("connection refused".to_string()))
        }
    }

    /// Remote with a fixed user store and a recorded update log.
    struct FixedApi {
        existing: Option<UserRecord>,
        updates: Mutex<Vec<UpdateRequest>>,
    }

    impl FixedApi {
        fn with_user(user: UserRecord) -> Self {
            Self {
                existing: Some(user),
                updates: Mutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self {
                existing: None,
                updates: Mutex::new(Vec::new()),
            }
        }
    }

    fn remote_user(email: &str, current_step: u8) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: "42".to_string(),
            email: email.to_string(),
            password: Some("secret1".to_string()),
            current_step,
            about_me: Some("from the server".to_string()),
            street_address: None,
            city: None,
            state: None,
            zip: None,
            birthdate: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[async_trait]
    impl RemoteApi for FixedApi {
        async fn register(&self, credentials: &Credentials) -> Result<UserRecord, ApiError> {
            Ok(remote_user(&credentials.email, 2))
        }
        async fn get_user(&self, email: &str) -> Result<Option<UserRecord>, ApiError> {
            Ok(self.existing.clone().filter(|u| u.email == email))
        }
        async fn update_user(
            &self,
            email: &str,
            update: &UpdateRequest,
        ) -> Result<UserRecord, ApiError> {
            self.updates.lock().await.push(update.clone());
            let mut user = self
                .existing
                .clone()
                .unwrap_or_else(|| remote_user(email, 2));
            user.apply(&update.profile);
            if let Some(step) = update.current_step {
                user.current_step = step;
            }
            Ok(user)
        }
        async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
            Ok(self.existing.clone().into_iter().collect())
        }
        async fn get_configuration(&self) -> Result<PageConfiguration, ApiError> {
            Ok(PageConfiguration {
                page2_components: vec!["about_me".to_string()],
                page3_components: vec!["address".to_string()],
            })
        }
        async fn put_configuration(&self, _: &PageConfiguration) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn offline_step1_creates_local_record() {
        let store = Arc::new(MemoryStore::new());
        let mut flow =
            Orchestrator::start(Arc::new(OfflineApi), Arc::clone(&store) as Arc<dyn FallbackStore>)
                .await;

        // Config fetch failed, default substituted
        assert_eq!(
            flow.configuration().page2_components,
            vec!["about_me", "birthdate"]
        );

        flow.submit_step1(Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(flow.step(), WizardStep::Step2);
        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.current_step, 2);
        assert_eq!(stored.password.as_deref(), Some("secret1"));
    }

    #[tokio::test]
    async fn offline_flow_reaches_complete_through_the_fallback() {
        let store = Arc::new(MemoryStore::new());
        let mut flow =
            Orchestrator::start(Arc::new(OfflineApi), Arc::clone(&store) as Arc<dyn FallbackStore>)
                .await;

        flow.submit_step1(Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();

        flow.submit_step(ProfileUpdate {
            about_me: Some("hi".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        assert_eq!(flow.step(), WizardStep::Step3);
        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.about_me.as_deref(), Some("hi"));
        assert_eq!(stored.current_step, 3);

        flow.submit_step(ProfileUpdate {
            street_address: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            zip: Some("12345".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        assert!(flow.is_complete());
        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.current_step, 4);
        assert_eq!(stored.zip.as_deref(), Some("12345"));
        // One record per email, merged in place
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn step1_resumes_an_existing_remote_user() {
        let api = Arc::new(FixedApi::with_user(remote_user("a@b.com", 3)));
        let mut flow =
            Orchestrator::start(api, Arc::new(MemoryStore::new()) as Arc<dyn FallbackStore>).await;

        flow.submit_step1(Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(flow.step(), WizardStep::Step3);
        assert_eq!(
            flow.user().unwrap().about_me.as_deref(),
            Some("from the server")
        );
    }

    #[tokio::test]
    async fn step1_registers_when_no_user_exists() {
        let api = Arc::new(FixedApi::empty());
        let mut flow = Orchestrator::start(
            Arc::clone(&api) as Arc<dyn RemoteApi>,
            Arc::new(MemoryStore::new()) as Arc<dyn FallbackStore>,
        )
        .await;

        flow.submit_step1(Credentials {
            email: "new@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(flow.step(), WizardStep::Step2);
        assert_eq!(flow.user().unwrap().id, "42");
    }

    #[tokio::test]
    async fn update_payload_never_carries_the_password() {
        let api = Arc::new(FixedApi::with_user(remote_user("a@b.com", 2)));
        let mut flow = Orchestrator::start(
            Arc::clone(&api) as Arc<dyn RemoteApi>,
            Arc::new(MemoryStore::new()) as Arc<dyn FallbackStore>,
        )
        .await;

        flow.submit_step1(Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
        flow.submit_step(ProfileUpdate {
            about_me: Some("hi".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

        let updates = api.updates.lock().await;
        assert_eq!(updates.len(), 1);
        let body = serde_json::to_value(&updates[0]).unwrap();
        assert!(body.get("password").is_none());
        assert_eq!(body["currentStep"], 3);
        assert_eq!(body["aboutMe"], "hi");
    }

    #[tokio::test]
    async fn previous_rewinds_the_view_without_persisting() {
        let store = Arc::new(MemoryStore::new());
        let mut flow =
            Orchestrator::start(Arc::new(OfflineApi), Arc::clone(&store) as Arc<dyn FallbackStore>)
                .await;

        assert!(matches!(
            flow.previous(),
            Err(FlowError::InvalidPrevious { .. })
        ));

        flow.submit_step1(Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
        flow.submit_step(ProfileUpdate {
            about_me: Some("hi".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        assert_eq!(flow.step(), WizardStep::Step3);

        assert_eq!(flow.previous().unwrap(), WizardStep::Step2);
        // Persisted record still says step 3 is next
        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.current_step, 3);

        // Going forward again re-submits step 2
        flow.submit_step(ProfileUpdate {
            about_me: Some("hello again".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        assert_eq!(flow.step(), WizardStep::Step3);
        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.about_me.as_deref(), Some("hello again"));
    }

    #[tokio::test]
    async fn submit_step_requires_a_profile_step_and_a_user() {
        let mut flow = Orchestrator::start(
            Arc::new(FixedApi::empty()) as Arc<dyn RemoteApi>,
            Arc::new(MemoryStore::new()) as Arc<dyn FallbackStore>,
        )
        .await;

        let err = flow.submit_step(ProfileUpdate::default()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Flow(FlowError::NotAProfileStep { .. })
        ));
    }

    #[tokio::test]
    async fn active_components_follow_the_loaded_configuration() {
        let api = Arc::new(FixedApi::empty());
        let mut flow = Orchestrator::start(
            Arc::clone(&api) as Arc<dyn RemoteApi>,
            Arc::new(MemoryStore::new()) as Arc<dyn FallbackStore>,
        )
        .await;

        assert_eq!(
            flow.active_components(),
            vec![ComponentId::Email, ComponentId::Password]
        );

        flow.submit_step1(Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
        assert_eq!(flow.active_components(), vec![ComponentId::AboutMe]);

        flow.submit_step(ProfileUpdate {
            about_me: Some("hi".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        assert_eq!(flow.active_components(), vec![ComponentId::Address]);
    }

    #[tokio::test]
    async fn reset_clears_the_session() {
        let store = Arc::new(MemoryStore::new());
        let mut flow =
            Orchestrator::start(Arc::new(OfflineApi), Arc::clone(&store) as Arc<dyn FallbackStore>)
                .await;

        flow.submit_step1(Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
        flow.reset();

        assert_eq!(flow.step(), WizardStep::Step1);
        assert!(flow.user().is_none());
        // The fallback set is untouched by a view reset
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
