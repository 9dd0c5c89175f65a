//! Postgres-backed record store. One JSONB document column per record plus
//! store-maintained system columns:
//!
//! ```sql
//! CREATE TABLE players (
//!     id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     data       JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::config;
use crate::store::{is_valid_identifier, RecordStore, StoreError};

/// Records come back as a single JSON object: document fields merged with the
/// system columns.
const RECORD_EXPR: &str =
    "data || jsonb_build_object('id', id, 'created_at', created_at, 'updated_at', updated_at)";

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool from `DATABASE_URL` with the configured limits.
    pub async fn connect() -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        let store_config = &config::config().store;
        let pool = PgPoolOptions::new()
            .max_connections(store_config.max_connections)
            .acquire_timeout(Duration::from_secs(store_config.connection_timeout_secs))
            .connect(&url)
            .await?;

        tracing::info!("connected record store pool");
        Ok(Self::new(pool))
    }

    fn checked_identifier<'a>(&self, name: &'a str) -> Result<&'a str, StoreError> {
        if is_valid_identifier(name) {
            Ok(name)
        } else {
            Err(StoreError::InvalidIdentifier(name.to_string()))
        }
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn find_by_id(&self, table: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let table = self.checked_identifier(table)?;
        let sql = format!("SELECT {} AS record FROM \"{}\" WHERE id = $1", RECORD_EXPR, table);

        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| r.try_get("record").map_err(StoreError::from)).transpose()
    }

    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        let table = self.checked_identifier(table)?;
        let sql = format!(
            "INSERT INTO \"{}\" (data) VALUES ($1) RETURNING {} AS record",
            table, RECORD_EXPR
        );

        let row = sqlx::query(&sql).bind(record).fetch_one(&self.pool).await?;
        row.try_get("record").map_err(StoreError::from)
    }

    async fn update(
        &self,
        table: &str,
        id: Uuid,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        let table = self.checked_identifier(table)?;
        // `||` is a shallow JSONB merge, matching the patch contract.
        let sql = format!(
            "UPDATE \"{}\" SET data = data || $2, updated_at = now() \
             WHERE id = $1 RETURNING {} AS record",
            table, RECORD_EXPR
        );

        let row = sqlx::query(&sql).bind(id).bind(patch).fetch_optional(&self.pool).await?;
        row.map(|r| r.try_get("record").map_err(StoreError::from)).transpose()
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<bool, StoreError> {
        let table = self.checked_identifier(table)?;
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", table);

        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self, table: &str, order_by: &str) -> Result<Vec<Value>, StoreError> {
        let table = self.checked_identifier(table)?;
        let order_by = self.checked_identifier(order_by)?;
        let sql = format!(
            "SELECT {} AS record FROM \"{}\" ORDER BY \"{}\" ASC",
            RECORD_EXPR, table, order_by
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|r| r.try_get("record").map_err(StoreError::from))
            .collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
