//! # uidhub-api
//!
//! HTTP API layer for UidHub built on Axum.
//!
//! Provides the REST endpoints, DTOs, middleware, and error mapping. All
//! handlers delegate to the entitlement engine; no lifecycle logic lives
//! here.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
