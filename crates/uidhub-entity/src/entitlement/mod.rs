//! Entitlement record entity.

pub mod model;

pub use model::{EntitlementRecord, EntitlementView, UpsertMetadata};
