//! Entitlement record model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use uidhub_core::types::key::{KeyScope, UidKey};

/// One tracked identifier and its access entitlement.
///
/// A record is created on the first metadata upsert with no grant attached;
/// `expire_date` stays `None` until the first successful grant. Metadata
/// upserts and grants touch disjoint field sets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntitlementRecord {
    /// Caller-supplied identifier.
    pub uid: String,
    /// Optional partition tag (empty when absent).
    pub region: String,
    /// Opaque external account reference.
    pub openid: String,
    /// Opaque credential blob.
    pub access_token: String,
    /// Client platform tag.
    pub platform: String,
    /// Size of the most recent grant in days. Informational only; activity
    /// is always computed from `expire_date`.
    pub days_remaining: i64,
    /// Absolute instant the entitlement lapses. `None` = never granted.
    pub expire_date: Option<DateTime<Utc>>,
    /// Set once, at creation.
    pub first_seen: DateTime<Utc>,
    /// Updated on every metadata upsert.
    pub last_seen: DateTime<Utc>,
}

impl EntitlementRecord {
    /// Create a fresh, ungranted record from upsert metadata.
    pub fn new(meta: UpsertMetadata, now: DateTime<Utc>) -> Self {
        Self {
            uid: meta.uid,
            region: meta.region,
            openid: meta.openid,
            access_token: meta.access_token,
            platform: meta.platform,
            days_remaining: 0,
            expire_date: None,
            first_seen: now,
            last_seen: now,
        }
    }

    /// Overwrite the metadata fields and touch `last_seen`.
    ///
    /// `expire_date`, `days_remaining`, and `first_seen` are never touched
    /// by a metadata upsert.
    pub fn apply_metadata(&mut self, meta: UpsertMetadata, now: DateTime<Utc>) {
        self.region = meta.region;
        self.openid = meta.openid;
        self.access_token = meta.access_token;
        self.platform = meta.platform;
        self.last_seen = now;
    }

    /// The record's match key under the given scope.
    pub fn key(&self, scope: KeyScope) -> UidKey {
        UidKey::new(scope, self.uid.clone(), &self.region)
    }

    /// Whether the entitlement is active at `now`.
    ///
    /// A record with no `expire_date` is never active; an `expire_date`
    /// exactly equal to `now` counts as lapsed.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expire_date, Some(expire) if expire > now)
    }

    /// Whole days between `now` and the expiration instant, clamped to 0.
    ///
    /// Returns `None` when no grant was ever made. On the final day of an
    /// active window this is 0.
    pub fn days_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expire_date
            .map(|expire| (expire - now).num_days().max(0))
    }

    /// The expiration instant a grant of `days` would produce at `now`.
    ///
    /// No prior window or a lapsed one starts fresh from `now`; a window
    /// that is still open at `now` is stacked onto.
    pub fn next_expiry(&self, days: i64, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.expire_date {
            Some(expire) if expire >= now => expire + Duration::days(days),
            _ => now + Duration::days(days),
        }
    }

    /// Build the read view, attaching `days_left` when a grant exists.
    pub fn view(&self, now: DateTime<Utc>) -> EntitlementView {
        EntitlementView {
            days_left: self.days_left(now),
            record: self.clone(),
        }
    }
}

/// Metadata fields accepted by the upsert operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertMetadata {
    /// Caller-supplied identifier.
    pub uid: String,
    /// Optional partition tag.
    pub region: String,
    /// Opaque external account reference.
    pub openid: String,
    /// Opaque credential blob.
    pub access_token: String,
    /// Client platform tag.
    pub platform: String,
}

/// Read view of a record with the live countdown attached.
///
/// `days_left` is computed at read time and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementView {
    /// The underlying record.
    #[serde(flatten)]
    pub record: EntitlementRecord,
    /// Whole days until expiry, clamped to 0. Absent when never granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,
}
