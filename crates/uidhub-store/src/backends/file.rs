//! Flat-file entitlement store.
//!
//! The whole collection lives in one pretty-printed JSON document that is
//! rewritten on every mutation. An in-memory index keyed by the match key
//! is rebuilt at load and kept in sync, so lookups never scan the
//! collection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{error, info};

use uidhub_core::config::store::{CorruptStorePolicy, FileStoreConfig};
use uidhub_core::error::{AppError, ErrorKind};
use uidhub_core::result::AppResult;
use uidhub_core::traits::Store;
use uidhub_core::types::key::{KeyScope, UidKey};
use uidhub_entity::EntitlementRecord;

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FileDocument {
    entitlements: Vec<EntitlementRecord>,
}

/// Entitlement store persisted as a single JSON document.
#[derive(Debug)]
pub struct FileEntitlementStore {
    path: PathBuf,
    scope: KeyScope,
    index: RwLock<HashMap<String, EntitlementRecord>>,
}

impl FileEntitlementStore {
    /// Open the store, loading and indexing the persisted collection.
    ///
    /// A missing file starts an empty collection. An unparsable file is a
    /// [`ErrorKind::CorruptStore`] error unless the configured policy is
    /// [`CorruptStorePolicy::StartEmpty`].
    pub async fn open(config: &FileStoreConfig, scope: KeyScope) -> AppResult<Self> {
        let path = PathBuf::from(&config.path);
        let index = match Self::load(&path, scope).await {
            Ok(index) => index,
            Err(e) if e.kind == ErrorKind::CorruptStore => match config.on_corrupt {
                CorruptStorePolicy::Fail => return Err(e),
                CorruptStorePolicy::StartEmpty => {
                    error!(
                        path = %path.display(),
                        error = %e,
                        "Persisted collection is corrupt; starting empty per configuration"
                    );
                    HashMap::new()
                }
            },
            Err(e) => return Err(e),
        };

        info!(path = %path.display(), records = index.len(), "File store loaded");

        Ok(Self {
            path,
            scope,
            index: RwLock::new(index),
        })
    }

    async fn load(path: &Path, scope: KeyScope) -> AppResult<HashMap<String, EntitlementRecord>> {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read store file: {}", path.display()),
                    e,
                ));
            }
        };

        let doc: FileDocument = serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::CorruptStore,
                format!("Failed to parse store file: {}", path.display()),
                e,
            )
        })?;

        let mut index = HashMap::with_capacity(doc.entitlements.len());
        for record in doc.entitlements {
            index.insert(record.key(scope).composed(), record);
        }
        Ok(index)
    }

    /// Rewrite the whole document from the index, via temp file + rename.
    async fn persist(&self, index: &HashMap<String, EntitlementRecord>) -> AppResult<()> {
        let doc = FileDocument {
            entitlements: index.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&doc)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to create store directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json.as_bytes()).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write store file: {}", tmp.display()),
                e,
            )
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace store file: {}", self.path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

#[async_trait]
impl crate::EntitlementStore for FileEntitlementStore {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<EntitlementRecord>> {
        let index = self.index.read().await;
        if let Some(record) = index.get(uid) {
            return Ok(Some(record.clone()));
        }
        // Region-scoped index keys are composed; fall back to a scan.
        Ok(index.values().find(|r| r.uid == uid).cloned())
    }
}

#[async_trait]
impl Store<EntitlementRecord, UidKey> for FileEntitlementStore {
    async fn find(&self, key: &UidKey) -> AppResult<Option<EntitlementRecord>> {
        Ok(self.index.read().await.get(&key.composed()).cloned())
    }

    async fn insert(&self, record: &EntitlementRecord) -> AppResult<()> {
        let key = record.key(self.scope).composed();
        let mut index = self.index.write().await;
        if index.contains_key(&key) {
            return Err(AppError::conflict(format!(
                "Record already exists for uid {}",
                record.uid
            )));
        }
        index.insert(key, record.clone());
        self.persist(&index).await
    }

    async fn update(&self, record: &EntitlementRecord) -> AppResult<()> {
        let key = record.key(self.scope).composed();
        let mut index = self.index.write().await;
        match index.get_mut(&key) {
            Some(existing) => *existing = record.clone(),
            None => {
                return Err(AppError::not_found(format!(
                    "No record for uid {}",
                    record.uid
                )));
            }
        }
        self.persist(&index).await
    }

    async fn delete(&self, key: &UidKey) -> AppResult<bool> {
        let mut index = self.index.write().await;
        if index.remove(&key.composed()).is_none() {
            return Ok(false);
        }
        self.persist(&index).await?;
        Ok(true)
    }

    async fn list_all(&self) -> AppResult<Vec<EntitlementRecord>> {
        Ok(self.index.read().await.values().cloned().collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.index.read().await.len() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
