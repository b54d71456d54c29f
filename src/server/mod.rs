//! REST backend — axum server over the libSQL database.

pub mod db;
pub mod routes;

pub use db::ServerDb;
pub use routes::{RouteState, api_routes};

use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::{Error, StoreError};

/// Build the full application router, CORS included.
pub fn router(db: Arc<ServerDb>) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    api_routes(RouteState { db }).layer(cors)
}

/// Bind and serve until the process is stopped.
pub async fn serve(db: Arc<ServerDb>, port: u16) -> Result<(), Error> {
    let app = router(db);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(StoreError::Io)?;
    info!(port, "Onboarding API listening");
    axum::serve(listener, app).await.map_err(|e| {
        Error::Store(StoreError::Io(e))
    })
}
