//! HTTP implementation of the remote API.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::ApiError;
use crate::onboarding::model::{Credentials, PageConfiguration, UpdateRequest, UserRecord};

use super::RemoteApi;

/// `reqwest`-backed client for the onboarding backend.
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        response.json().await.map_err(|e| ApiError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn register(&self, credentials: &Credentials) -> Result<UserRecord, ApiError> {
        let path = "/users/register";
        let response = self
            .client
            .post(self.url(path))
            .json(credentials)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::decode(response, path).await
    }

    async fn get_user(&self, email: &str) -> Result<Option<UserRecord>, ApiError> {
        let path = format!("/users/{email}");
        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::decode(response, &path).await?))
    }

    async fn update_user(
        &self,
        email: &str,
        update: &UpdateRequest,
    ) -> Result<UserRecord, ApiError> {
        let path = format!("/users/{email}");
        let response = self
            .client
            .put(self.url(&path))
            .json(update)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::decode(response, &path).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let path = "/users";
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::decode(response, path).await
    }

    async fn get_configuration(&self) -> Result<PageConfiguration, ApiError> {
        let path = "/onboarding-config";
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::decode(response, path).await
    }

    async fn put_configuration(&self, config: &PageConfiguration) -> Result<(), ApiError> {
        let path = "/onboarding-config";
        let response = self
            .client
            .put(self.url(path))
            .json(config)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(())
    }
}
