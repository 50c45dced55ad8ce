//! # uidhub-entity
//!
//! Domain entity models for UidHub.

pub mod entitlement;

pub use entitlement::{EntitlementRecord, EntitlementView, UpsertMetadata};
