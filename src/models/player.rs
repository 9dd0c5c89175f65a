use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::performance::{PerformanceEntry, PerformanceEntryPatch};

/// A stored player record. `id`, `created_at` and `updated_at` are assigned
/// and maintained by the record store, never by API input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub performances: Vec<PerformanceEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// POST /players payload: attributes plus an optional initial series.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
    pub position: Option<String>,
    pub age: Option<u32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub nationality: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
    pub performances: Option<Vec<PerformanceEntryPatch>>,
}

impl CreatePlayerRequest {
    pub fn field_errors(&self) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "must not be empty".to_string());
        }
        collect_measurement_errors(self.height_cm, self.weight_kg, &mut errors);
        if let Some(entries) = &self.performances {
            for (i, entry) in entries.iter().enumerate() {
                entry.collect_field_errors(&format!("performances[{}]", i), &mut errors);
            }
        }
        errors
    }

    /// Domain fields for the store document, series excluded.
    pub fn attribute_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::from(self.name.trim()));
        insert_opt(&mut map, "position", self.position.as_deref().map(Value::from));
        insert_opt(&mut map, "age", self.age.map(Value::from));
        insert_opt(&mut map, "height_cm", self.height_cm.map(Value::from));
        insert_opt(&mut map, "weight_kg", self.weight_kg.map(Value::from));
        insert_opt(&mut map, "nationality", self.nationality.as_deref().map(Value::from));
        insert_opt(&mut map, "image_url", self.image_url.as_deref().map(Value::from));
        map.insert("is_active".to_string(), Value::from(self.is_active.unwrap_or(true)));
        insert_opt(&mut map, "notes", self.notes.as_deref().map(Value::from));
        map
    }
}

/// PUT /players/{id} payload. `performances` replaces the whole series,
/// `append_performances` reconciles into it; the two are mutually exclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlayerRequest {
    pub name: Option<String>,
    pub position: Option<String>,
    pub age: Option<u32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub nationality: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
    pub performances: Option<Vec<PerformanceEntryPatch>>,
    pub append_performances: Option<Vec<PerformanceEntryPatch>>,
}

impl UpdatePlayerRequest {
    pub fn has_attribute_patch(&self) -> bool {
        self.name.is_some()
            || self.position.is_some()
            || self.age.is_some()
            || self.height_cm.is_some()
            || self.weight_kg.is_some()
            || self.nationality.is_some()
            || self.image_url.is_some()
            || self.is_active.is_some()
            || self.notes.is_some()
    }

    pub fn field_errors(&self) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.insert("name".to_string(), "must not be empty".to_string());
            }
        }
        collect_measurement_errors(self.height_cm, self.weight_kg, &mut errors);
        if let Some(entries) = &self.performances {
            for (i, entry) in entries.iter().enumerate() {
                entry.collect_field_errors(&format!("performances[{}]", i), &mut errors);
            }
        }
        if let Some(entries) = &self.append_performances {
            for (i, entry) in entries.iter().enumerate() {
                entry.collect_field_errors(&format!("append_performances[{}]", i), &mut errors);
            }
        }
        errors
    }

    /// Scalar fields present in this request, as a store-level patch.
    pub fn attribute_patch(&self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "name", self.name.as_deref().map(|n| Value::from(n.trim())));
        insert_opt(&mut map, "position", self.position.as_deref().map(Value::from));
        insert_opt(&mut map, "age", self.age.map(Value::from));
        insert_opt(&mut map, "height_cm", self.height_cm.map(Value::from));
        insert_opt(&mut map, "weight_kg", self.weight_kg.map(Value::from));
        insert_opt(&mut map, "nationality", self.nationality.as_deref().map(Value::from));
        insert_opt(&mut map, "image_url", self.image_url.as_deref().map(Value::from));
        insert_opt(&mut map, "is_active", self.is_active.map(Value::from));
        insert_opt(&mut map, "notes", self.notes.as_deref().map(Value::from));
        map
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn collect_measurement_errors(
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    errors: &mut HashMap<String, String>,
) {
    for (field, value) in [("height_cm", height_cm), ("weight_kg", weight_kg)] {
        if let Some(v) = value {
            if !v.is_finite() || v <= 0.0 {
                errors.insert(field.to_string(), "must be a positive number".to_string());
            }
        }
    }
}
