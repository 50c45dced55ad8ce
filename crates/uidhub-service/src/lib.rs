//! # uidhub-service
//!
//! The entitlement lifecycle engine. All date arithmetic and
//! extension-vs-reset decisions live here; the HTTP layer and the store
//! backends are thin collaborators on either side.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod entitlement;

pub use entitlement::{AccessStatus, EntitlementService, GrantOutcome, UpsertOutcome};
