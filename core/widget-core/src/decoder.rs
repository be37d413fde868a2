//! Snapshot decoding.
//!
//! Turns the raw `habits` / `habitCount` values into a [`Snapshot`]. The
//! decoder fails soft: any problem with the payload yields an empty task
//! list with a zero count, reported through [`DecodeReport::failure`] and a
//! warning log, never an error that could stop the widget from rendering.

use std::collections::HashSet;

use habit_widget_protocol::{Task, SCHEMA_VERSION};

use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    #[error("malformed habits payload: {0}")]
    Malformed(String),

    #[error("unsupported habits schema version {found} (supported up to {supported})")]
    UnsupportedSchema { found: i64, supported: i64 },
}

/// Result of one decode, with the side-channel diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub snapshot: Snapshot,
    /// Set when the payload was discarded.
    pub failure: Option<DecodeFailure>,
    /// Tasks dropped because an earlier task had the same id.
    pub duplicates_dropped: usize,
}

/// Decodes a published payload, discarding diagnostics.
///
/// Absent and empty payloads decode to an empty task list; an absent count
/// decodes to zero.
pub fn decode(raw_payload: Option<&str>, raw_count: Option<i64>) -> Snapshot {
    decode_with_report(raw_payload, raw_count, None).snapshot
}

/// Decodes a published payload and reports what was discarded.
///
/// `schema_version` is the value of `habitsSchemaVersion`; absent means 1.
pub fn decode_with_report(
    raw_payload: Option<&str>,
    raw_count: Option<i64>,
    schema_version: Option<i64>,
) -> DecodeReport {
    let total_count = clamp_count(raw_count);

    let version = schema_version.unwrap_or(1);
    if version > SCHEMA_VERSION {
        let failure = DecodeFailure::UnsupportedSchema {
            found: version,
            supported: SCHEMA_VERSION,
        };
        tracing::warn!(error = %failure, "Discarding habits payload");
        return DecodeReport {
            snapshot: Snapshot::empty(),
            failure: Some(failure),
            duplicates_dropped: 0,
        };
    }

    let payload = match raw_payload.map(str::trim) {
        Some(payload) if !payload.is_empty() => payload,
        _ => {
            return DecodeReport {
                snapshot: Snapshot::new(Vec::new(), total_count),
                failure: None,
                duplicates_dropped: 0,
            }
        }
    };

    match serde_json::from_str::<Vec<Task>>(payload) {
        Ok(tasks) => {
            let (tasks, duplicates_dropped) = dedupe_by_id(tasks);
            if duplicates_dropped > 0 {
                tracing::debug!(duplicates_dropped, "Dropped duplicate task ids");
            }
            DecodeReport {
                snapshot: Snapshot::new(tasks, total_count),
                failure: None,
                duplicates_dropped,
            }
        }
        Err(err) => {
            let failure = DecodeFailure::Malformed(err.to_string());
            tracing::warn!(error = %failure, "Discarding habits payload");
            DecodeReport {
                snapshot: Snapshot::empty(),
                failure: Some(failure),
                duplicates_dropped: 0,
            }
        }
    }
}

fn clamp_count(raw_count: Option<i64>) -> u32 {
    match raw_count {
        Some(count) if count > 0 => u32::try_from(count).unwrap_or(u32::MAX),
        _ => 0,
    }
}

/// Keeps the first task for each id, preserving order.
fn dedupe_by_id(tasks: Vec<Task>) -> (Vec<Task>, usize) {
    let before = tasks.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<Task> = tasks
        .into_iter()
        .filter(|task| seen.insert(task.id.clone()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
