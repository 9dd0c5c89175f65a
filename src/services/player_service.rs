//! Player record coordinator: sequences store calls around the pure series
//! engine and translates failures into the API error taxonomy. Validation
//! always runs before the first store round-trip, so a rejected request never
//! leaves partial state behind.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{CreatePlayerRequest, Player, UpdatePlayerRequest};
use crate::series::{self, SeriesUpdate};
use crate::store::RecordStore;

const PLAYERS_TABLE: &str = "players";

#[derive(Clone)]
pub struct PlayerService {
    store: Arc<dyn RecordStore>,
}

impl PlayerService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreatePlayerRequest) -> Result<Player, ApiError> {
        let errors = request.field_errors();
        if !errors.is_empty() {
            return Err(ApiError::validation_error("Invalid player payload", Some(errors)));
        }

        // Normalize the initial series through the engine so the
        // one-entry-per-date invariant holds from the first write.
        let initial_series = series::replace(request.performances.as_deref().unwrap_or(&[]));

        let mut document = request.attribute_map();
        document.insert("performances".to_string(), to_json(&initial_series)?);

        let stored = self.store.insert(PLAYERS_TABLE, Value::Object(document)).await?;
        parse_player(stored)
    }

    pub async fn get(&self, id: Uuid, window_days: Option<u32>) -> Result<Player, ApiError> {
        let mut player = self.load(id).await?;

        if let Some(days) = window_days {
            player.performances = series::windowed_view(&player.performances, days, Utc::now());
        }
        Ok(player)
    }

    pub async fn list(&self) -> Result<Vec<Player>, ApiError> {
        let records = self.store.list_all(PLAYERS_TABLE, "created_at").await?;
        records.into_iter().map(parse_player).collect()
    }

    pub async fn update(&self, id: Uuid, request: UpdatePlayerRequest) -> Result<Player, ApiError> {
        let series_update = SeriesUpdate::from_request(
            request.performances.clone(),
            request.append_performances.clone(),
        )
        .map_err(|e| ApiError::validation_error(e.to_string(), None))?;

        if !request.has_attribute_patch() && series_update.is_no_change() {
            return Err(ApiError::validation_error(
                "Update request must include at least one attribute or series change",
                None,
            ));
        }

        let errors = request.field_errors();
        if !errors.is_empty() {
            return Err(ApiError::validation_error("Invalid player payload", Some(errors)));
        }

        let existing = self.load(id).await?;

        let mut patch = request.attribute_patch();
        if !series_update.is_no_change() {
            let next_series = series_update.apply(&existing.performances);
            patch.insert("performances".to_string(), to_json(&next_series)?);
        }

        // Read-modify-write without a version token: a concurrent update
        // races and the last writer wins on the whole patched set.
        let stored = self
            .store
            .update(PLAYERS_TABLE, id, Value::Object(patch))
            .await?
            .ok_or_else(|| not_found(id))?;
        parse_player(stored)
    }

    /// Delete-of-absent reports success: delete is idempotent from the
    /// caller's point of view, and the series goes with the record.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let existed = self.store.delete(PLAYERS_TABLE, id).await?;
        if !existed {
            tracing::debug!("delete of absent player {}", id);
        }
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Player, ApiError> {
        let record = self
            .store
            .find_by_id(PLAYERS_TABLE, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        parse_player(record)
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("player {} not found", id))
}

fn parse_player(record: Value) -> Result<Player, ApiError> {
    serde_json::from_value(record).map_err(|e| {
        tracing::error!("stored player record is malformed: {}", e);
        ApiError::store_failure("stored player record is malformed", e.to_string())
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!("serialization failure: {}", e);
        ApiError::store_failure("failed to serialize record", e.to_string())
    })
}
