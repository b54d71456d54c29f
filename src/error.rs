//! Error types for Onboard.

use crate::onboarding::state::WizardStep;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),
}

/// Configuration errors — environment variables and the admin-managed
/// page configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Page {page} must have at least one component")]
    EmptyPage { page: u8 },
}

/// Remote API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Unexpected status {status} from {path}")]
    Status { status: u16, path: String },

    #[error("Failed to decode response from {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Storage errors — the local fallback record set and the server database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("User with email {email} already exists")]
    Conflict { email: String },

    #[error("User not found with email: {email}")]
    NotFound { email: String },
}

/// Wizard flow errors — operations that are illegal for the current step.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("No active user record; complete step 1 first")]
    NoActiveUser,

    #[error("Cannot go back from {step}")]
    InvalidPrevious { step: WizardStep },

    #[error("Step {step} does not accept a profile submission")]
    NotAProfileStep { step: WizardStep },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
