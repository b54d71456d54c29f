//! Application configuration, read from `ONBOARD_*` environment variables.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Runtime configuration shared by the wizard, admin, report, and server
/// subcommands.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote API, including the `/api` prefix.
    pub api_base_url: String,
    /// Path of the local fallback record set (JSON file).
    pub fallback_path: PathBuf,
    /// Path of the server's libSQL database file.
    pub db_path: PathBuf,
    /// Port the server listens on.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            fallback_path: PathBuf::from("./data/onboarding-users.json"),
            db_path: PathBuf::from("./data/onboard.db"),
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Build the configuration from the environment, falling back to the
    /// defaults above for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("ONBOARD_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(path) = std::env::var("ONBOARD_FALLBACK_PATH") {
            config.fallback_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("ONBOARD_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var("ONBOARD_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ONBOARD_PORT".to_string(),
                message: format!("not a valid port number: {port}"),
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.port, 8080);
        assert!(config.fallback_path.ends_with("onboarding-users.json"));
    }
}
