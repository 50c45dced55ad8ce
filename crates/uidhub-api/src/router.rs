//! Route definitions for the UidHub HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    let max_body = state.config.server.max_body_bytes;

    Router::new()
        .merge(liveness_routes())
        .merge(entitlement_routes())
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Liveness string and health probe
fn liveness_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::health))
}

/// Entitlement registration, lookup, grant, and removal
fn entitlement_routes() -> Router<AppState> {
    Router::new()
        .route("/uids", get(handlers::entitlement::list_uids))
        .route("/uid", post(handlers::entitlement::upsert_uid))
        .route("/uid/{uid}", get(handlers::entitlement::get_uid))
        .route("/uid/{uid}/check", get(handlers::entitlement::check_uid))
        .route("/uid/{uid}/adddays", post(handlers::entitlement::add_days))
        .route(
            "/uid/{uid}/remove",
            delete(handlers::entitlement::remove_uid),
        )
}
