//! # uidhub-store
//!
//! Entitlement store backends for UidHub. The engine talks to the
//! [`EntitlementStore`] trait object; concrete backends exist for
//! PostgreSQL, a flat JSON file, and an in-memory map (tests).

pub mod backends;
pub mod connection;
pub mod manager;
pub mod migration;

use async_trait::async_trait;

use uidhub_core::result::AppResult;
use uidhub_core::traits::Store;
use uidhub_core::types::key::UidKey;
use uidhub_entity::EntitlementRecord;

/// The concrete store contract the entitlement engine depends on.
///
/// Keyed CRUD comes from the generic [`Store`] supertrait; the methods
/// here are the entitlement-specific queries, following the convention
/// that entity-specific lookups live on the concrete store rather than
/// the generic contract.
#[async_trait]
pub trait EntitlementStore: Store<EntitlementRecord, UidKey> {
    /// Find a record by identifier alone, irrespective of the match scope.
    ///
    /// Identifier-addressed reads (get, check, grant, remove) never carry
    /// a region; under the region-scoped variant this returns the first
    /// record whose `uid` matches.
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<EntitlementRecord>>;
}

pub use backends::file::FileEntitlementStore;
pub use backends::memory::MemoryEntitlementStore;
pub use backends::postgres::PostgresEntitlementStore;
pub use manager::StoreManager;
