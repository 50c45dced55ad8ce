//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use uidhub_core::config::AppConfig;
use uidhub_service::EntitlementService;
use uidhub_store::EntitlementStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The entitlement store backend.
    pub store: Arc<dyn EntitlementStore>,
    /// The entitlement lifecycle engine.
    pub entitlements: Arc<EntitlementService>,
}
