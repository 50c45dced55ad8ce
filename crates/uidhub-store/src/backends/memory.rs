//! In-memory entitlement store.
//!
//! Used by unit and router tests; nothing is persisted.

use async_trait::async_trait;
use dashmap::DashMap;

use uidhub_core::error::AppError;
use uidhub_core::result::AppResult;
use uidhub_core::traits::Store;
use uidhub_core::types::key::{KeyScope, UidKey};
use uidhub_entity::EntitlementRecord;

/// Entitlement store backed by a concurrent in-process map.
#[derive(Debug, Default)]
pub struct MemoryEntitlementStore {
    scope: KeyScope,
    records: DashMap<String, EntitlementRecord>,
}

impl MemoryEntitlementStore {
    /// Create an empty store with the given match scope.
    pub fn new(scope: KeyScope) -> Self {
        Self {
            scope,
            records: DashMap::new(),
        }
    }
}

#[async_trait]
impl crate::EntitlementStore for MemoryEntitlementStore {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<EntitlementRecord>> {
        if let Some(record) = self.records.get(uid) {
            return Ok(Some(record.value().clone()));
        }
        Ok(self
            .records
            .iter()
            .find(|r| r.value().uid == uid)
            .map(|r| r.value().clone()))
    }
}

#[async_trait]
impl Store<EntitlementRecord, UidKey> for MemoryEntitlementStore {
    async fn find(&self, key: &UidKey) -> AppResult<Option<EntitlementRecord>> {
        Ok(self
            .records
            .get(&key.composed())
            .map(|r| r.value().clone()))
    }

    async fn insert(&self, record: &EntitlementRecord) -> AppResult<()> {
        let key = record.key(self.scope).composed();
        if self.records.contains_key(&key) {
            return Err(AppError::conflict(format!(
                "Record already exists for uid {}",
                record.uid
            )));
        }
        self.records.insert(key, record.clone());
        Ok(())
    }

    async fn update(&self, record: &EntitlementRecord) -> AppResult<()> {
        let key = record.key(self.scope).composed();
        match self.records.get_mut(&key) {
            Some(mut existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "No record for uid {}",
                record.uid
            ))),
        }
    }

    async fn delete(&self, key: &UidKey) -> AppResult<bool> {
        Ok(self.records.remove(&key.composed()).is_some())
    }

    async fn list_all(&self) -> AppResult<Vec<EntitlementRecord>> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.records.len() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
