//! PostgreSQL entitlement store.

use async_trait::async_trait;
use sqlx::PgPool;

use uidhub_core::error::{AppError, ErrorKind};
use uidhub_core::result::AppResult;
use uidhub_core::traits::Store;
use uidhub_core::types::key::{KeyScope, UidKey};
use uidhub_entity::EntitlementRecord;

const COLUMNS: &str = "uid, region, openid, access_token, platform, \
                       days_remaining, expire_date, first_seen, last_seen";

/// Entitlement store backed by a PostgreSQL table.
///
/// Queries use runtime binds so the crate builds without a live database.
/// The match scope decides whether `region` participates in the WHERE
/// clause or is just another metadata column.
#[derive(Debug, Clone)]
pub struct PostgresEntitlementStore {
    pool: PgPool,
    scope: KeyScope,
}

impl PostgresEntitlementStore {
    /// Create a new store over an existing pool.
    pub fn new(pool: PgPool, scope: KeyScope) -> Self {
        Self { pool, scope }
    }
}

#[async_trait]
impl crate::EntitlementStore for PostgresEntitlementStore {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<EntitlementRecord>> {
        sqlx::query_as::<_, EntitlementRecord>(&format!(
            "SELECT {COLUMNS} FROM entitlements WHERE uid = $1 LIMIT 1"
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find record", e))
    }
}

#[async_trait]
impl Store<EntitlementRecord, UidKey> for PostgresEntitlementStore {
    async fn find(&self, key: &UidKey) -> AppResult<Option<EntitlementRecord>> {
        let query = match key.region {
            None => format!("SELECT {COLUMNS} FROM entitlements WHERE uid = $1"),
            Some(_) => {
                format!("SELECT {COLUMNS} FROM entitlements WHERE uid = $1 AND region = $2")
            }
        };

        let mut q = sqlx::query_as::<_, EntitlementRecord>(&query).bind(&key.uid);
        if let Some(region) = &key.region {
            q = q.bind(region);
        }

        q.fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find record", e))
    }

    async fn insert(&self, record: &EntitlementRecord) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO entitlements ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(&record.uid)
        .bind(&record.region)
        .bind(&record.openid)
        .bind(&record.access_token)
        .bind(&record.platform)
        .bind(record.days_remaining)
        .bind(record.expire_date)
        .bind(record.first_seen)
        .bind(record.last_seen)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert record", e))?;
        Ok(())
    }

    async fn update(&self, record: &EntitlementRecord) -> AppResult<()> {
        // Under uid scope the region column is writable metadata; under
        // uid-region scope it is part of the match key.
        let result = match self.scope {
            KeyScope::Uid => {
                sqlx::query(
                    "UPDATE entitlements SET region = $2, openid = $3, access_token = $4, \
                     platform = $5, days_remaining = $6, expire_date = $7, last_seen = $8 \
                     WHERE uid = $1",
                )
                .bind(&record.uid)
                .bind(&record.region)
                .bind(&record.openid)
                .bind(&record.access_token)
                .bind(&record.platform)
                .bind(record.days_remaining)
                .bind(record.expire_date)
                .bind(record.last_seen)
                .execute(&self.pool)
                .await
            }
            KeyScope::UidRegion => {
                sqlx::query(
                    "UPDATE entitlements SET openid = $3, access_token = $4, \
                     platform = $5, days_remaining = $6, expire_date = $7, last_seen = $8 \
                     WHERE uid = $1 AND region = $2",
                )
                .bind(&record.uid)
                .bind(&record.region)
                .bind(&record.openid)
                .bind(&record.access_token)
                .bind(&record.platform)
                .bind(record.days_remaining)
                .bind(record.expire_date)
                .bind(record.last_seen)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update record", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "No record for uid {}",
                record.uid
            )));
        }
        Ok(())
    }

    async fn delete(&self, key: &UidKey) -> AppResult<bool> {
        let query = match key.region {
            None => "DELETE FROM entitlements WHERE uid = $1".to_string(),
            Some(_) => "DELETE FROM entitlements WHERE uid = $1 AND region = $2".to_string(),
        };

        let mut q = sqlx::query(&query).bind(&key.uid);
        if let Some(region) = &key.region {
            q = q.bind(region);
        }

        let result = q
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete record", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> AppResult<Vec<EntitlementRecord>> {
        sqlx::query_as::<_, EntitlementRecord>(&format!("SELECT {COLUMNS} FROM entitlements"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list records", e))
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entitlements")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count records", e))?;
        Ok(count as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
