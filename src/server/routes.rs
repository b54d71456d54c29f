//! REST endpoints for users and the page configuration.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use serde_json::json;

use crate::error::StoreError;
use crate::onboarding::model::{Credentials, PageConfiguration, UpdateRequest};

use super::db::ServerDb;

/// Shared state for the REST routes.
#[derive(Clone)]
pub struct RouteState {
    pub db: Arc<ServerDb>,
}

/// POST /api/users/register
async fn register(
    State(state): State<RouteState>,
    Json(credentials): Json<Credentials>,
) -> impl IntoResponse {
    match state.db.insert_user(&credentials.email, &credentials.password).await {
        Ok(user) => (StatusCode::CREATED, Json(json!(user))).into_response(),
        Err(StoreError::Conflict { email }) => (
            StatusCode::CONFLICT,
            Json(json!({"error": format!("User with email {email} already exists")})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/users/{email}
async fn get_user(
    State(state): State<RouteState>,
    Path(email): Path<String>,
) -> impl IntoResponse {
    match state.db.get_user(&email).await {
        Ok(Some(user)) => Json(json!(user)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "User not found"})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// PUT /api/users/{email}
async fn update_user(
    State(state): State<RouteState>,
    Path(email): Path<String>,
    Json(update): Json<UpdateRequest>,
) -> impl IntoResponse {
    match state.db.update_user(&email, &update).await {
        Ok(user) => Json(json!(user)).into_response(),
        Err(StoreError::NotFound { email }) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("User not found with email: {email}")})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/users
async fn list_users(State(state): State<RouteState>) -> impl IntoResponse {
    match state.db.list_users().await {
        Ok(users) => Json(json!(users)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/onboarding-config
async fn get_configuration(State(state): State<RouteState>) -> impl IntoResponse {
    match state.db.get_configuration().await {
        Ok(config) => Json(json!(config)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/onboarding-config/page/{page}
async fn get_page_components(
    State(state): State<RouteState>,
    Path(page): Path<u8>,
) -> impl IntoResponse {
    match state.db.get_configuration().await {
        Ok(config) => Json(json!(config.components_for(page))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// PUT /api/onboarding-config
///
/// Replaces the whole document. The non-empty invariant is enforced here
/// too, so a misbehaving client cannot leave a page blank.
async fn put_configuration(
    State(state): State<RouteState>,
    Json(config): Json<PageConfiguration>,
) -> impl IntoResponse {
    for page in [2u8, 3] {
        if config.components_for(page).is_empty() {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"error": format!("Page {page} must have at least one component")})),
            )
                .into_response();
        }
    }
    match state.db.write_configuration(&config).await {
        Ok(()) => Json(json!(config)).into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: StoreError) -> axum::response::Response {
    tracing::error!(error = %e, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": e.to_string()})),
    )
        .into_response()
}

/// Build the REST routes.
pub fn api_routes(state: RouteState) -> Router {
    Router::new()
        .route("/api/users/register", axum::routing::post(register))
        .route("/api/users", get(list_users))
        .route("/api/users/{email}", get(get_user).put(update_user))
        .route(
            "/api/onboarding-config",
            get(get_configuration).put(put_configuration),
        )
        .route("/api/onboarding-config/page/{page}", get(get_page_components))
        .with_state(state)
}
