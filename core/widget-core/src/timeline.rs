//! Timeline building.
//!
//! Each refresh the hosting runtime asks for one [`Entry`]. Preview requests
//! get the fixed demonstration snapshot with no store I/O; live requests
//! read the app-group store and decode it.
//!
//! The builder never schedules itself. Every timeline it returns carries
//! [`ReloadPolicy::Never`], so a new entry exists only when the host asks
//! again (typically after the owning app reloads widget timelines).

use chrono::{DateTime, Utc};
use habit_widget_protocol::{HABITS_KEY, HABIT_COUNT_KEY, SCHEMA_VERSION_KEY};
use serde::Serialize;

use crate::decoder::decode_with_report;
use crate::snapshot::Snapshot;
use crate::store::SharedStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    Preview,
    Live,
}

/// One immutable render unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    date: DateTime<Utc>,
    snapshot: Snapshot,
    source: EntrySource,
}

impl Entry {
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn source(&self) -> EntrySource {
        self.source
    }

    pub fn is_preview(&self) -> bool {
        self.source == EntrySource::Preview
    }
}

/// When the host may replace an entry on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Only an explicit reload request produces a new entry.
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub entries: Vec<Entry>,
    pub policy: ReloadPolicy,
}

pub struct TimelineBuilder<S> {
    store: S,
    preview: Snapshot,
}

impl<S: SharedStore> TimelineBuilder<S> {
    /// `preview` is what galleries and previews show; it is never read from
    /// the store.
    pub fn new(store: S, preview: Snapshot) -> Self {
        Self { store, preview }
    }

    pub fn with_demo_preview(store: S) -> Self {
        Self::new(store, Snapshot::demo())
    }

    pub fn build(&self, for_preview: bool) -> Entry {
        self.build_at(for_preview, Utc::now())
    }

    pub fn build_at(&self, for_preview: bool, now: DateTime<Utc>) -> Entry {
        if for_preview {
            return Entry {
                date: now,
                snapshot: self.preview.clone(),
                source: EntrySource::Preview,
            };
        }

        Entry {
            date: now,
            snapshot: self.read_live(),
            source: EntrySource::Live,
        }
    }

    /// Entry shown before the host has asked for real data.
    pub fn placeholder(&self) -> Entry {
        self.build(true)
    }

    pub fn timeline(&self, for_preview: bool) -> Timeline {
        Timeline {
            entries: vec![self.build(for_preview)],
            policy: ReloadPolicy::Never,
        }
    }

    fn read_live(&self) -> Snapshot {
        let payload = self.store.read_string(HABITS_KEY);
        let count = self.store.read_int(HABIT_COUNT_KEY);
        let version = self.store.read_int(SCHEMA_VERSION_KEY);

        let report = decode_with_report(payload.as_deref(), count, version);
        tracing::debug!(
            tasks = report.snapshot.tasks.len(),
            total_count = report.snapshot.total_count,
            decode_failed = report.failure.is_some(),
            "Built live widget entry"
        );
        report.snapshot
    }
}
