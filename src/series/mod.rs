//! Performance series reconciliation and windowed retrieval.
//!
//! Pure functions over a player's date-keyed series: no I/O, inputs are never
//! mutated. Merging goes through an explicit ordered map keyed by date, so
//! the one-entry-per-date invariant holds by construction and output order
//! never depends on the insertion order of the merge itself.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::models::performance::{PerformanceEntry, PerformanceEntryPatch};

pub const MIN_WINDOW_DAYS: u32 = 1;
pub const MAX_WINDOW_DAYS: u32 = 365;

/// How an update request touches the stored series. Replace-vs-append is a
/// construction-time choice; a payload carrying both is rejected before it
/// can reach the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesUpdate {
    Replace(Vec<PerformanceEntryPatch>),
    Append(Vec<PerformanceEntryPatch>),
    NoChange,
}

#[derive(Debug, thiserror::Error)]
#[error("performances and append_performances are mutually exclusive")]
pub struct AmbiguousSeriesUpdate;

impl SeriesUpdate {
    pub fn from_request(
        replace: Option<Vec<PerformanceEntryPatch>>,
        append: Option<Vec<PerformanceEntryPatch>>,
    ) -> Result<Self, AmbiguousSeriesUpdate> {
        match (replace, append) {
            (Some(_), Some(_)) => Err(AmbiguousSeriesUpdate),
            (Some(entries), None) => Ok(SeriesUpdate::Replace(entries)),
            (None, Some(entries)) => Ok(SeriesUpdate::Append(entries)),
            (None, None) => Ok(SeriesUpdate::NoChange),
        }
    }

    pub fn is_no_change(&self) -> bool {
        matches!(self, SeriesUpdate::NoChange)
    }

    pub fn apply(&self, current: &[PerformanceEntry]) -> Vec<PerformanceEntry> {
        match self {
            SeriesUpdate::Replace(entries) => replace(entries),
            SeriesUpdate::Append(entries) => merge_append(current, entries),
            SeriesUpdate::NoChange => current.to_vec(),
        }
    }
}

/// Reconcile `incoming` into `current`, keyed by date. An incoming entry that
/// shares a date with a stored one overwrites only the fields it carries; a
/// new date inserts a full entry with counting stats defaulted. The result
/// holds exactly one entry per distinct date in the union, ascending by date.
pub fn merge_append(
    current: &[PerformanceEntry],
    incoming: &[PerformanceEntryPatch],
) -> Vec<PerformanceEntry> {
    let mut by_date: BTreeMap<NaiveDate, PerformanceEntry> =
        current.iter().map(|e| (e.date, e.clone())).collect();

    for patch in incoming {
        match by_date.entry(patch.date) {
            Entry::Occupied(mut existing) => patch.apply_to(existing.get_mut()),
            Entry::Vacant(slot) => {
                slot.insert(patch.materialize());
            }
        }
    }

    by_date.into_values().collect()
}

/// Discard all prior history: `incoming` becomes the authoritative series.
/// Normalized through the same date-keyed map, so duplicate dates inside
/// `incoming` collapse to one entry instead of violating uniqueness.
pub fn replace(incoming: &[PerformanceEntryPatch]) -> Vec<PerformanceEntry> {
    merge_append(&[], incoming)
}

/// Trailing-window read view: entries dated on or after the reference date
/// minus `window_days` (clamped to [1, 365]), most recent first. Never
/// mutates the stored series.
pub fn windowed_view(
    series: &[PerformanceEntry],
    window_days: u32,
    reference: DateTime<Utc>,
) -> Vec<PerformanceEntry> {
    let days = window_days.clamp(MIN_WINDOW_DAYS, MAX_WINDOW_DAYS);
    let threshold = reference.date_naive() - Duration::days(days as i64);

    let mut view: Vec<PerformanceEntry> =
        series.iter().filter(|e| e.date >= threshold).cloned().collect();
    view.sort_by(|a, b| b.date.cmp(&a.date));
    view
}
