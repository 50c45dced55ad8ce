//! Liveness and health handlers.

use axum::Json;
use axum::extract::State;

use uidhub_core::traits::Store;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /
pub async fn home() -> &'static str {
    "UID entitlement server running"
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match state.store.health_check().await {
        Ok(true) => "available",
        _ => "unavailable",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.to_string(),
    })
}
