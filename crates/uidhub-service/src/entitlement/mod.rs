//! Entitlement engine.

pub mod service;

pub use service::{AccessStatus, EntitlementService, GrantOutcome, UpsertOutcome};
