//! Abstract record store: the capability set the coordinator depends on.
//! Records travel as JSON documents; the store assigns `id` and maintains
//! `created_at`/`updated_at`. Implementations: [`postgres::PostgresStore`]
//! for production, [`memory::MemoryStore`] as an injectable fake for tests
//! and local development.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up one record by id; `None` when absent.
    async fn find_by_id(&self, table: &str, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// Persist a new record; returns the stored document with store-assigned
    /// `id` and timestamps merged in.
    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError>;

    /// Shallow-merge `patch` into the record's document and bump its
    /// `updated_at`; `None` when the record no longer exists.
    async fn update(&self, table: &str, id: Uuid, patch: Value)
        -> Result<Option<Value>, StoreError>;

    /// Remove a record; `false` when it was already gone.
    async fn delete(&self, table: &str, id: Uuid) -> Result<bool, StoreError>;

    /// All records in the table, ordered ascending by the named system field.
    async fn list_all(&self, table: &str, order_by: &str) -> Result<Vec<Value>, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Table and order-by names are interpolated into SQL, so both stores hold
/// them to plain identifiers.
pub(crate) fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
