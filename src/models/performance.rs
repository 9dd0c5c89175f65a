use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One observation for one calendar date. The `date` is the natural key
/// within a player's series; counting stats default to zero when a submission
/// omits them, percentage and derived stats stay null until reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub rebounds: u32,
    #[serde(default)]
    pub steals: u32,
    #[serde(default)]
    pub blocks: u32,
    #[serde(default)]
    pub turnovers: u32,
    #[serde(default)]
    pub fouls: u32,
    #[serde(default)]
    pub minutes_played: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_goal_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_point_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_throw_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
}

/// Wire shape for a submitted performance entry. Every stat is optional so
/// that presence/absence can drive field-level reconciliation: a field left
/// out of a submission must not clobber the stored value for the same date.
///
/// An explicit JSON `null` deserializes the same as an omitted field, so an
/// append can never clear a stored stat back to null; callers that want to
/// drop a stat submit a whole-series replace instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntryPatch {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assists: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnovers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fouls: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_played: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_goal_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_point_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_throw_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
}

/// Derived stats carry 2-decimal precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl PerformanceEntryPatch {
    /// Field-level overwrite into an existing same-date entry: fields present
    /// here replace the stored values, absent fields keep them.
    pub fn apply_to(&self, entry: &mut PerformanceEntry) {
        if let Some(v) = self.points {
            entry.points = v;
        }
        if let Some(v) = self.assists {
            entry.assists = v;
        }
        if let Some(v) = self.rebounds {
            entry.rebounds = v;
        }
        if let Some(v) = self.steals {
            entry.steals = v;
        }
        if let Some(v) = self.blocks {
            entry.blocks = v;
        }
        if let Some(v) = self.turnovers {
            entry.turnovers = v;
        }
        if let Some(v) = self.fouls {
            entry.fouls = v;
        }
        if let Some(v) = self.minutes_played {
            entry.minutes_played = v;
        }
        if let Some(v) = self.field_goal_pct {
            entry.field_goal_pct = Some(v);
        }
        if let Some(v) = self.three_point_pct {
            entry.three_point_pct = Some(v);
        }
        if let Some(v) = self.free_throw_pct {
            entry.free_throw_pct = Some(v);
        }
        if let Some(v) = self.efficiency {
            entry.efficiency = Some(round2(v));
        }
        if let Some(v) = self.overall_score {
            entry.overall_score = Some(round2(v));
        }
    }

    /// Build a full entry from this patch alone, defaulting omitted counting
    /// stats to zero.
    pub fn materialize(&self) -> PerformanceEntry {
        PerformanceEntry {
            date: self.date,
            points: self.points.unwrap_or(0),
            assists: self.assists.unwrap_or(0),
            rebounds: self.rebounds.unwrap_or(0),
            steals: self.steals.unwrap_or(0),
            blocks: self.blocks.unwrap_or(0),
            turnovers: self.turnovers.unwrap_or(0),
            fouls: self.fouls.unwrap_or(0),
            minutes_played: self.minutes_played.unwrap_or(0),
            field_goal_pct: self.field_goal_pct,
            three_point_pct: self.three_point_pct,
            free_throw_pct: self.free_throw_pct,
            efficiency: self.efficiency.map(round2),
            overall_score: self.overall_score.map(round2),
        }
    }

    /// Range checks for the non-integer stats. `label` prefixes the field key
    /// in the error map, e.g. `performances[2].field_goal_pct`.
    pub fn collect_field_errors(&self, label: &str, errors: &mut HashMap<String, String>) {
        for (field, value) in [
            ("field_goal_pct", self.field_goal_pct),
            ("three_point_pct", self.three_point_pct),
            ("free_throw_pct", self.free_throw_pct),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                    errors.insert(
                        format!("{}.{}", label, field),
                        "must be a number between 0 and 100".to_string(),
                    );
                }
            }
        }
        if let Some(v) = self.overall_score {
            if !v.is_finite() || !(0.0..=10.0).contains(&v) {
                errors.insert(
                    format!("{}.overall_score", label),
                    "must be a number between 0 and 10".to_string(),
                );
            }
        }
        if let Some(v) = self.efficiency {
            if !v.is_finite() {
                errors.insert(
                    format!("{}.efficiency", label),
                    "must be a finite number".to_string(),
                );
            }
        }
    }
}
