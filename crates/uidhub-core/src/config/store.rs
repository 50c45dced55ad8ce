//! Entitlement store configuration.

use serde::{Deserialize, Serialize};

use crate::types::key::KeyScope;

/// Entitlement store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend: `"postgres"`, `"file"`, or `"memory"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Record uniqueness scope.
    #[serde(default)]
    pub key_scope: KeyScope,
    /// Flat-file backend settings.
    #[serde(default)]
    pub file: FileStoreConfig,
    /// PostgreSQL backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            key_scope: KeyScope::default(),
            file: FileStoreConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

/// Flat-file backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStoreConfig {
    /// Path of the JSON document holding the record collection.
    #[serde(default = "default_file_path")]
    pub path: String,
    /// Policy when the persisted collection cannot be parsed.
    #[serde(default)]
    pub on_corrupt: CorruptStorePolicy,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: default_file_path(),
            on_corrupt: CorruptStorePolicy::default(),
        }
    }
}

/// What to do when the persisted collection fails to parse at load.
///
/// The previous generation of this service swallowed parse failures and
/// silently started with an empty collection; that behavior is only
/// available as an explicit opt-in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CorruptStorePolicy {
    /// Refuse to start; the operator must repair or remove the file.
    #[default]
    Fail,
    /// Log the corruption and start with an empty collection.
    StartEmpty,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

fn default_backend() -> String {
    "file".to_string()
}

fn default_file_path() -> String {
    "data/entitlements.json".to_string()
}

fn default_url() -> String {
    "postgres://localhost:5432/uidhub".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
