//! Entitlement lifecycle engine.
//!
//! Every durable fact lives in the injected store; the engine is stateless
//! between calls apart from its per-identifier lock table. Expiration is
//! always computed lazily at read time — there is no background sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use uidhub_core::error::AppError;
use uidhub_core::result::AppResult;
use uidhub_core::traits::Store;
use uidhub_core::types::key::{KeyScope, UidKey};
use uidhub_entity::{EntitlementRecord, EntitlementView, UpsertMetadata};
use uidhub_store::EntitlementStore;

/// Guidance returned whenever a check finds no active window.
const NO_ACCESS_MESSAGE: &str = "No active days. Contact the administrator.";

/// Result of a metadata upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertOutcome {
    /// The upserted identifier.
    pub uid: String,
    /// Total records in the store after the write.
    pub total: u64,
}

/// Result of a grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantOutcome {
    /// The granted identifier.
    pub uid: String,
    /// Days applied by this grant.
    pub days_added: i64,
    /// The new expiration instant.
    pub expire_date: DateTime<Utc>,
}

/// Result of an access check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessStatus {
    /// The checked identifier.
    pub uid: String,
    /// Whether an entitlement window is open right now.
    pub active: bool,
    /// Whole days until expiry; only present when active.
    pub days_left: Option<i64>,
    /// The expiration instant; only present when active.
    pub expire_date: Option<DateTime<Utc>>,
    /// Guidance when inactive.
    pub message: Option<String>,
}

/// The entitlement lifecycle engine.
///
/// Mutating operations serialize per identifier through the lock table,
/// so two concurrent grants for the same uid both apply instead of the
/// later write clobbering the earlier one. Locks key on the uid alone;
/// that is coarser than the region-scoped match key but correct for both
/// scopes.
pub struct EntitlementService {
    store: Arc<dyn EntitlementStore>,
    scope: KeyScope,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl EntitlementService {
    /// Create a new engine over the given store.
    pub fn new(store: Arc<dyn EntitlementStore>, scope: KeyScope) -> Self {
        Self {
            store,
            scope,
            locks: DashMap::new(),
        }
    }

    fn uid_lock(&self, uid: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(uid.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Register or refresh a client's metadata.
    ///
    /// Creates an ungranted record on first sight; otherwise overwrites the
    /// metadata fields and `last_seen` only. Grant state is never touched.
    pub async fn upsert_metadata(&self, meta: UpsertMetadata) -> AppResult<UpsertOutcome> {
        if meta.uid.is_empty() {
            return Err(AppError::validation("uid is required"));
        }

        let uid = meta.uid.clone();
        let key = UidKey::new(self.scope, uid.clone(), &meta.region);
        let lock = self.uid_lock(&uid);
        let _guard = lock.lock().await;

        let now = Utc::now();
        match self.store.find(&key).await? {
            Some(mut record) => {
                record.apply_metadata(meta, now);
                self.store.update(&record).await?;
            }
            None => {
                let record = EntitlementRecord::new(meta, now);
                self.store.insert(&record).await?;
                info!(uid = %uid, "Registered new uid");
            }
        }

        let total = self.store.count().await?;
        Ok(UpsertOutcome { uid, total })
    }

    /// Fetch one record, with the live countdown attached when granted.
    pub async fn get(&self, uid: &str) -> AppResult<EntitlementView> {
        let record = self
            .store
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("UID {uid} not found")))?;
        Ok(record.view(Utc::now()))
    }

    /// Check whether an identifier has an open entitlement window.
    ///
    /// Pure read: never mutates the record and never deletes a lapsed one.
    pub async fn check_active(&self, uid: &str) -> AppResult<AccessStatus> {
        let now = Utc::now();
        let record = self.store.find_by_uid(uid).await?;

        let status = match record {
            Some(record) if record.is_active(now) => AccessStatus {
                uid: uid.to_string(),
                active: true,
                days_left: record.days_left(now),
                expire_date: record.expire_date,
                message: None,
            },
            _ => AccessStatus {
                uid: uid.to_string(),
                active: false,
                days_left: None,
                expire_date: None,
                message: Some(NO_ACCESS_MESSAGE.to_string()),
            },
        };
        Ok(status)
    }

    /// Extend an identifier's entitlement window by `days`.
    ///
    /// A window that is still open is stacked onto; a lapsed or absent
    /// window starts fresh from now, discarding any unused balance.
    /// `days_remaining` records only this grant's size.
    pub async fn grant_days(&self, uid: &str, days: i64) -> AppResult<GrantOutcome> {
        if days <= 0 {
            return Err(AppError::validation("days must be greater than 0"));
        }

        let lock = self.uid_lock(uid);
        let _guard = lock.lock().await;

        let mut record = self
            .store
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("UID {uid} not found")))?;

        let now = Utc::now();
        let expire_date = record.next_expiry(days, now);
        record.expire_date = Some(expire_date);
        record.days_remaining = days;
        self.store.update(&record).await?;

        info!(uid = %uid, days, expire = %expire_date, "Granted days");

        Ok(GrantOutcome {
            uid: uid.to_string(),
            days_added: days,
            expire_date,
        })
    }

    /// Delete an identifier's record.
    pub async fn remove(&self, uid: &str) -> AppResult<()> {
        let lock = self.uid_lock(uid);
        let _guard = lock.lock().await;

        let record = self
            .store
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("UID {uid} not found")))?;

        self.store.delete(&record.key(self.scope)).await?;
        info!(uid = %uid, "Removed uid");
        Ok(())
    }

    /// Every record in the store. Order is store-defined.
    pub async fn list_all(&self) -> AppResult<Vec<EntitlementRecord>> {
        self.store.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uidhub_core::error::ErrorKind;
    use uidhub_core::traits::Store;
    use uidhub_store::MemoryEntitlementStore;

    fn engine() -> (Arc<MemoryEntitlementStore>, EntitlementService) {
        let store = Arc::new(MemoryEntitlementStore::new(KeyScope::Uid));
        let service = EntitlementService::new(store.clone(), KeyScope::Uid);
        (store, service)
    }

    fn meta(uid: &str) -> UpsertMetadata {
        UpsertMetadata {
            uid: uid.to_string(),
            region: "sa".to_string(),
            openid: "open-1".to_string(),
            access_token: "tok-1".to_string(),
            platform: "android".to_string(),
        }
    }

    async fn seed_with_expiry(
        store: &MemoryEntitlementStore,
        uid: &str,
        expire: DateTime<Utc>,
    ) {
        let mut record = EntitlementRecord::new(meta(uid), Utc::now());
        record.expire_date = Some(expire);
        record.days_remaining = 1;
        store.insert(&record).await.unwrap();
    }

    fn close_to(actual: DateTime<Utc>, expected: DateTime<Utc>) -> bool {
        (actual - expected).num_seconds().abs() <= 2
    }

    #[tokio::test]
    async fn test_upsert_creates_ungranted_record() {
        let (store, service) = engine();
        let outcome = service.upsert_metadata(meta("1001")).await.unwrap();
        assert_eq!(outcome.uid, "1001");
        assert_eq!(outcome.total, 1);

        let record = store.find_by_uid("1001").await.unwrap().unwrap();
        assert_eq!(record.days_remaining, 0);
        assert_eq!(record.expire_date, None);
        assert_eq!(record.first_seen, record.last_seen);
    }

    #[tokio::test]
    async fn test_upsert_rejects_empty_uid() {
        let (store, service) = engine();
        let err = service.upsert_metadata(meta("")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reupsert_updates_metadata_only() {
        let (store, service) = engine();
        service.upsert_metadata(meta("1001")).await.unwrap();

        let before = store.find_by_uid("1001").await.unwrap().unwrap();
        seeded_grant(&store, "1001", Utc::now() + Duration::days(4)).await;

        let mut update = meta("1001");
        update.platform = "ios".to_string();
        update.openid = "open-2".to_string();
        let outcome = service.upsert_metadata(update).await.unwrap();
        assert_eq!(outcome.total, 1);

        let after = store.find_by_uid("1001").await.unwrap().unwrap();
        assert_eq!(after.platform, "ios");
        assert_eq!(after.openid, "open-2");
        assert_eq!(after.first_seen, before.first_seen);
        assert!(after.last_seen >= before.last_seen);
        assert!(after.expire_date.is_some());
    }

    async fn seeded_grant(store: &MemoryEntitlementStore, uid: &str, expire: DateTime<Utc>) {
        let mut record = store.find_by_uid(uid).await.unwrap().unwrap();
        record.expire_date = Some(expire);
        store.update(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_grant_fresh_starts_from_now() {
        let (_, service) = engine();
        service.upsert_metadata(meta("1001")).await.unwrap();

        let outcome = service.grant_days("1001", 10).await.unwrap();
        assert_eq!(outcome.days_added, 10);
        assert!(close_to(outcome.expire_date, Utc::now() + Duration::days(10)));
    }

    #[tokio::test]
    async fn test_grant_stacks_on_active_window() {
        let (store, service) = engine();
        let expire = Utc::now() + Duration::days(10);
        seed_with_expiry(&store, "1001", expire).await;

        let outcome = service.grant_days("1001", 5).await.unwrap();
        assert_eq!(outcome.expire_date, expire + Duration::days(5));

        let record = store.find_by_uid("1001").await.unwrap().unwrap();
        assert_eq!(record.days_remaining, 5);
    }

    #[tokio::test]
    async fn test_grant_resets_lapsed_window() {
        let (store, service) = engine();
        seed_with_expiry(&store, "1001", Utc::now() - Duration::days(1)).await;

        let outcome = service.grant_days("1001", 5).await.unwrap();
        assert!(close_to(outcome.expire_date, Utc::now() + Duration::days(5)));
    }

    #[tokio::test]
    async fn test_grant_rejects_non_positive_days() {
        let (store, service) = engine();
        let expire = Utc::now() + Duration::days(3);
        seed_with_expiry(&store, "1001", expire).await;

        for days in [0, -3] {
            let err = service.grant_days("1001", days).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
        }

        let record = store.find_by_uid("1001").await.unwrap().unwrap();
        assert_eq!(record.expire_date, Some(expire));
    }

    #[tokio::test]
    async fn test_grant_unknown_uid_is_not_found() {
        let (_, service) = engine();
        let err = service.grant_days("ghost", 5).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_check_active_on_final_day() {
        let (store, service) = engine();
        seed_with_expiry(&store, "1001", Utc::now() + Duration::seconds(1)).await;

        let status = service.check_active("1001").await.unwrap();
        assert!(status.active);
        assert_eq!(status.days_left, Some(0));
        assert!(status.expire_date.is_some());
        assert_eq!(status.message, None);
    }

    #[tokio::test]
    async fn test_check_active_expired_and_ungranted() {
        let (store, service) = engine();
        seed_with_expiry(&store, "expired", Utc::now() - Duration::seconds(1)).await;
        service.upsert_metadata(meta("fresh")).await.unwrap();

        for uid in ["expired", "fresh", "ghost"] {
            let status = service.check_active(uid).await.unwrap();
            assert!(!status.active, "{uid} should be inactive");
            assert_eq!(status.days_left, None);
            assert_eq!(status.expire_date, None);
            assert_eq!(status.message.as_deref(), Some(NO_ACCESS_MESSAGE));
        }
    }

    #[tokio::test]
    async fn test_check_never_mutates() {
        let (store, service) = engine();
        let expire = Utc::now() - Duration::days(2);
        seed_with_expiry(&store, "1001", expire).await;

        service.check_active("1001").await.unwrap();

        let record = store.find_by_uid("1001").await.unwrap().unwrap();
        assert_eq!(record.expire_date, Some(expire));
    }

    #[tokio::test]
    async fn test_get_attaches_days_left() {
        let (store, service) = engine();
        seed_with_expiry(&store, "1001", Utc::now() + Duration::days(7) + Duration::hours(1))
            .await;

        let view = service.get("1001").await.unwrap();
        assert_eq!(view.days_left, Some(7));

        let err = service.get("ghost").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_remove_then_not_found() {
        let (_, service) = engine();
        service.upsert_metadata(meta("1001")).await.unwrap();

        service.remove("1001").await.unwrap();
        let err = service.remove("1001").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_all_round_trip() {
        let (_, service) = engine();
        service.upsert_metadata(meta("1001")).await.unwrap();

        let records = service.list_all().await.unwrap();
        let matching: Vec<_> = records.iter().filter(|r| r.uid == "1001").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].platform, "android");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_grants_both_apply() {
        let (store, service) = engine();
        service.upsert_metadata(meta("1001")).await.unwrap();
        let service = Arc::new(service);

        let a = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.grant_days("1001", 5).await }
        });
        let b = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.grant_days("1001", 5).await }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let record = store.find_by_uid("1001").await.unwrap().unwrap();
        let expire = record.expire_date.unwrap();
        assert!(close_to(expire, Utc::now() + Duration::days(10)));
    }
}
