//! In-memory record store. Same contract as the Postgres implementation,
//! held behind the same trait so services can be exercised without a live
//! database.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{is_valid_identifier, RecordStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, HashMap<Uuid, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_identifier(name: &str) -> Result<(), StoreError> {
        if is_valid_identifier(name) {
            Ok(())
        } else {
            Err(StoreError::InvalidIdentifier(name.to_string()))
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_by_id(&self, table: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        Self::check_identifier(table)?;
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|t| t.get(&id)).cloned())
    }

    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        Self::check_identifier(table)?;
        let mut document = match record {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Query(format!(
                    "expected a JSON object record, got {}",
                    other
                )))
            }
        };

        let id = Uuid::new_v4();
        let now = json!(Utc::now());
        document.insert("id".to_string(), json!(id));
        document.insert("created_at".to_string(), now.clone());
        document.insert("updated_at".to_string(), now);

        let stored = Value::Object(document);
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        id: Uuid,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        Self::check_identifier(table)?;
        let patch = match patch {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Query(format!(
                    "expected a JSON object patch, got {}",
                    other
                )))
            }
        };

        let mut tables = self.tables.write().await;
        let Some(stored) = tables.get_mut(table).and_then(|t| t.get_mut(&id)) else {
            return Ok(None);
        };

        if let Value::Object(document) = stored {
            for (key, value) in patch {
                document.insert(key, value);
            }
            document.insert("updated_at".to_string(), json!(Utc::now()));
        }
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<bool, StoreError> {
        Self::check_identifier(table)?;
        let mut tables = self.tables.write().await;
        Ok(tables.get_mut(table).and_then(|t| t.remove(&id)).is_some())
    }

    async fn list_all(&self, table: &str, order_by: &str) -> Result<Vec<Value>, StoreError> {
        Self::check_identifier(table)?;
        Self::check_identifier(order_by)?;

        let tables = self.tables.read().await;
        let mut records: Vec<Value> =
            tables.get(table).map(|t| t.values().cloned().collect()).unwrap_or_default();

        // RFC 3339 trims trailing zero fractions, so string order is not
        // chronological across sub-second precision; compare timestamps as
        // timestamps and fall back to string order for other fields.
        records.sort_by(|a, b| {
            let ka = a.get(order_by);
            let kb = b.get(order_by);
            match (parse_timestamp(ka), parse_timestamp(kb)) {
                (Some(ta), Some(tb)) => ta.cmp(&tb),
                _ => {
                    let sa = ka.map(Value::to_string).unwrap_or_default();
                    let sb = kb.map(Value::to_string).unwrap_or_default();
                    sa.cmp(&sb)
                }
            }
        });
        Ok(records)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn parse_timestamp(value: Option<&Value>) -> Option<chrono::DateTime<Utc>> {
    value.and_then(Value::as_str).and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let stored = store
            .insert("players", json!({ "name": "Dana" }))
            .await
            .unwrap();

        assert_eq!(stored["name"], json!("Dana"));
        assert!(stored["id"].as_str().unwrap().parse::<Uuid>().is_ok());
        assert!(stored.get("created_at").is_some());
        assert_eq!(stored["created_at"], stored["updated_at"]);
    }

    #[tokio::test]
    async fn update_merges_shallow_and_bumps_updated_at() {
        let store = MemoryStore::new();
        let stored = store
            .insert("players", json!({ "name": "Dana", "age": 27 }))
            .await
            .unwrap();
        let id: Uuid = stored["id"].as_str().unwrap().parse().unwrap();

        let updated = store
            .update("players", id, json!({ "age": 28 }))
            .await
            .unwrap()
            .expect("record exists");
        assert_eq!(updated["name"], json!("Dana"));
        assert_eq!(updated["age"], json!(28));
    }

    #[tokio::test]
    async fn update_of_missing_record_returns_none() {
        let store = MemoryStore::new();
        let result = store.update("players", Uuid::new_v4(), json!({})).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_existed() {
        let store = MemoryStore::new();
        let stored = store.insert("players", json!({ "name": "Dana" })).await.unwrap();
        let id: Uuid = stored["id"].as_str().unwrap().parse().unwrap();

        assert!(store.delete("players", id).await.unwrap());
        assert!(!store.delete("players", id).await.unwrap());
    }

    #[tokio::test]
    async fn list_all_orders_timestamps_chronologically() {
        let store = MemoryStore::new();
        let first = store.insert("players", json!({ "name": "half-second" })).await.unwrap();
        let second = store.insert("players", json!({ "name": "whole-second" })).await.unwrap();
        let first_id: Uuid = first["id"].as_str().unwrap().parse().unwrap();
        let second_id: Uuid = second["id"].as_str().unwrap().parse().unwrap();

        // A whole second serializes without a fraction and sorts after ".5"
        // as a string; chronological comparison must still put it first.
        store
            .update("players", first_id, json!({ "created_at": "2025-01-01T12:00:00.500Z" }))
            .await
            .unwrap();
        store
            .update("players", second_id, json!({ "created_at": "2025-01-01T12:00:00Z" }))
            .await
            .unwrap();

        let records = store.list_all("players", "created_at").await.unwrap();
        assert_eq!(records[0]["name"], json!("whole-second"));
        assert_eq!(records[1]["name"], json!("half-second"));
    }

    #[tokio::test]
    async fn list_all_orders_by_requested_field() {
        let store = MemoryStore::new();
        store.insert("players", json!({ "name": "b" })).await.unwrap();
        store.insert("players", json!({ "name": "a" })).await.unwrap();

        let by_name = store.list_all("players", "name").await.unwrap();
        assert_eq!(by_name[0]["name"], json!("a"));
        assert_eq!(by_name[1]["name"], json!("b"));
    }
}
