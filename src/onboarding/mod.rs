//! Onboarding wizard — three-step flow with admin-configurable pages.
//!
//! Step 1 always collects credentials. Steps 2 and 3 render whatever
//! components the page configuration activates, validate against the
//! aggregate required-field set, and persist through the remote API with a
//! local fallback when the API is unreachable.

pub mod form;
pub mod model;
pub mod orchestrator;
pub mod state;

pub use form::{FilteredPayload, FormState};
pub use model::{Credentials, PageConfiguration, ProfileUpdate, UpdateRequest, UserRecord};
pub use orchestrator::Orchestrator;
pub use state::WizardStep;
