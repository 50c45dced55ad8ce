//! Store backend selection.

use std::sync::Arc;

use tracing::info;

use uidhub_core::config::store::StoreConfig;
use uidhub_core::error::AppError;
use uidhub_core::result::AppResult;

use crate::EntitlementStore;
use crate::backends::file::FileEntitlementStore;
use crate::backends::memory::MemoryEntitlementStore;
use crate::backends::postgres::PostgresEntitlementStore;
use crate::{connection, migration};

/// Constructs the configured store backend.
///
/// The store is built exactly once at process start and injected wherever
/// it is needed; there is no process-global handle.
pub struct StoreManager;

impl StoreManager {
    /// Build the backend named by `config.backend`.
    ///
    /// For the PostgreSQL backend this connects the pool and runs the
    /// bootstrap migrations before returning.
    pub async fn create(config: &StoreConfig) -> AppResult<Arc<dyn EntitlementStore>> {
        info!(backend = %config.backend, scope = ?config.key_scope, "Initializing entitlement store");

        match config.backend.as_str() {
            "postgres" => {
                let pool = connection::create_pool(&config.database).await?;
                migration::run_migrations(&pool).await?;
                Ok(Arc::new(PostgresEntitlementStore::new(
                    pool,
                    config.key_scope,
                )))
            }
            "file" => Ok(Arc::new(
                FileEntitlementStore::open(&config.file, config.key_scope).await?,
            )),
            "memory" => Ok(Arc::new(MemoryEntitlementStore::new(config.key_scope))),
            other => Err(AppError::configuration(format!(
                "Unknown store backend: {other}"
            ))),
        }
    }
}
