//! Projection of the canonical list into the app-group store.
//!
//! Every publish rewrites the whole store document in one rename, so the
//! widget never reads `habits` from one version and `habitCount` from
//! another. Keys this publisher does not own are carried over unchanged.

use std::path::{Path, PathBuf};

use habit_widget_protocol::{
    StoreDocument, Task, HABITS_KEY, HABIT_COUNT_KEY, SCHEMA_VERSION, SCHEMA_VERSION_KEY,
};

use crate::atomic::atomic_write;
use crate::error::{RelayError, Result};

pub struct SnapshotPublisher {
    store_file: PathBuf,
    limit: Option<usize>,
}

impl SnapshotPublisher {
    pub fn new(store_file: &Path) -> Self {
        SnapshotPublisher {
            store_file: store_file.to_path_buf(),
            limit: None,
        }
    }

    /// Caps the number of tasks serialized into the payload. The count key
    /// still carries the full total.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn publish(&self, tasks: &[Task]) -> Result<()> {
        let payload_tasks = match self.limit {
            Some(limit) => &tasks[..tasks.len().min(limit)],
            None => tasks,
        };
        let payload = serde_json::to_string(payload_tasks).map_err(|e| RelayError::Json {
            context: "serializing task payload".to_string(),
            source: e,
        })?;

        let mut document = self.existing_document();
        document.set_string(HABITS_KEY, payload);
        document.set_int(HABIT_COUNT_KEY, tasks.len() as i64);
        document.set_int(SCHEMA_VERSION_KEY, SCHEMA_VERSION);

        let content = serde_json::to_string_pretty(&document).map_err(|e| RelayError::Json {
            context: "serializing store document".to_string(),
            source: e,
        })?;
        atomic_write(&self.store_file, &content)?;

        tracing::debug!(
            total = tasks.len(),
            published = payload_tasks.len(),
            path = %self.store_file.display(),
            "Published snapshot"
        );
        Ok(())
    }

    fn existing_document(&self) -> StoreDocument {
        let content = match fs_err::read_to_string(&self.store_file) {
            Ok(content) => content,
            Err(_) => return StoreDocument::new(),
        };
        serde_json::from_str(&content).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Replacing unreadable app-group store");
            StoreDocument::new()
        })
    }
}
