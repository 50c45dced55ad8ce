//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use uidhub_api::state::AppState;
use uidhub_core::config::AppConfig;
use uidhub_core::types::key::KeyScope;
use uidhub_service::EntitlementService;
use uidhub_store::{EntitlementStore, MemoryEntitlementStore};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
}

impl TestApp {
    /// Create a test application over a fresh in-memory store
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryEntitlementStore::new(KeyScope::Uid)))
    }

    /// Create a test application over the given store
    pub fn with_store(store: Arc<dyn EntitlementStore>) -> Self {
        let entitlements = Arc::new(EntitlementService::new(Arc::clone(&store), KeyScope::Uid));
        let state = AppState {
            config: Arc::new(AppConfig::default()),
            store,
            entitlements,
        };
        Self {
            router: uidhub_api::build_router(state),
        }
    }

    /// Fire one request and decode the response body.
    ///
    /// Non-JSON bodies come back as a JSON string value.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }
}
