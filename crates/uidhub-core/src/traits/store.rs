//! Generic durable-store trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Generic keyed record store.
///
/// The trait is defined with generic type parameters so that each entity
/// can have a strongly typed store contract. The engine performs its own
/// find-then-write sequences, so the contract is deliberately primitive:
/// `insert` and `update` are distinct operations rather than a combined
/// upsert.
#[async_trait]
pub trait Store<Entity, Key>: Send + Sync + 'static
where
    Entity: Send + Sync + 'static + serde::Serialize,
    Key: Send + Sync + 'static,
{
    /// Find a record by its match key.
    async fn find(&self, key: &Key) -> AppResult<Option<Entity>>;

    /// Insert a new record. The key must not already be present.
    async fn insert(&self, entity: &Entity) -> AppResult<()>;

    /// Overwrite the record with the same match key.
    async fn update(&self, entity: &Entity) -> AppResult<()>;

    /// Delete a record by its match key. Returns `true` if a record existed.
    async fn delete(&self, key: &Key) -> AppResult<bool>;

    /// Return every record. Order is backend-defined.
    async fn list_all(&self) -> AppResult<Vec<Entity>>;

    /// Count total records.
    async fn count(&self) -> AppResult<u64>;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
