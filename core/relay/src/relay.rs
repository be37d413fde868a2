//! MutationRelay: the only writer of task state.
//!
//! Intents from any source (socket deliveries, the `apply` subcommand) funnel
//! through [`MutationRelay::apply`]. Every write runs in one critical section:
//! take the writer lock, re-read the canonical file, mutate, save, publish.
//! Relays in other processes see each other's changes, and publishes land in
//! the same order as mutations.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use habit_widget_core::StorageConfig;
use habit_widget_protocol::{Intent, Task};

use crate::canonical::{CanonicalStore, RelayOutcome};
use crate::error::Result;
use crate::lock::WriterLock;
use crate::publish::SnapshotPublisher;

pub struct MutationRelay {
    canonical: Mutex<CanonicalStore>,
    writer_lock: Option<PathBuf>,
    publisher: SnapshotPublisher,
}

impl MutationRelay {
    pub fn open(storage: &StorageConfig, publish_limit: Option<usize>) -> Self {
        let canonical = CanonicalStore::load(&storage.canonical_tasks_file());
        let publisher = SnapshotPublisher::new(&storage.store_file()).with_limit(publish_limit);
        Self::new(canonical, publisher).with_writer_lock(&storage.writer_lock_file())
    }

    /// A relay that only serializes writers inside this process.
    pub fn new(canonical: CanonicalStore, publisher: SnapshotPublisher) -> Self {
        MutationRelay {
            canonical: Mutex::new(canonical),
            writer_lock: None,
            publisher,
        }
    }

    pub fn with_writer_lock(mut self, path: &Path) -> Self {
        self.writer_lock = Some(path.to_path_buf());
        self
    }

    pub fn apply(&self, intent: &Intent) -> Result<RelayOutcome> {
        let outcome = self.write(|canonical| {
            let outcome = canonical.apply(intent)?;
            if outcome.is_mutation() {
                self.publisher.publish(canonical.tasks())?;
            }
            Ok(outcome)
        })?;

        match &outcome {
            RelayOutcome::Toggled { task_id, completed } => {
                tracing::info!(task_id = %task_id, completed, "Toggled task");
            }
            RelayOutcome::Ignored(reason) => {
                tracing::info!(reason = %reason, "Ignored intent");
            }
            RelayOutcome::AddTaskRequested => {
                tracing::info!("Add-task flow requested from widget");
            }
        }

        Ok(outcome)
    }

    /// Parses a deep link and applies it.
    pub fn apply_url(&self, url: &str) -> Result<RelayOutcome> {
        let intent = Intent::parse_url(url).map_err(|err| {
            habit_widget_protocol::ErrorInfo::new("invalid_intent", err.to_string())
        })?;
        self.apply(&intent)
    }

    pub fn add_task(&self, name: &str) -> Result<Task> {
        let task = self.write(|canonical| {
            let task = canonical.add(name)?;
            self.publisher.publish(canonical.tasks())?;
            Ok(task)
        })?;
        tracing::info!(task_id = %task.id, "Added task");
        Ok(task)
    }

    /// Republishes the current list without mutating it.
    pub fn publish(&self) -> Result<()> {
        self.write(|canonical| self.publisher.publish(canonical.tasks()))
    }

    /// The list as of the last write section.
    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks().to_vec()
    }

    fn write<T>(&self, f: impl FnOnce(&mut CanonicalStore) -> Result<T>) -> Result<T> {
        let mut canonical = self.lock();
        let _writer = match &self.writer_lock {
            Some(path) => Some(WriterLock::acquire(path)?),
            None => None,
        };
        canonical.refresh()?;
        f(&mut *canonical)
    }

    fn lock(&self) -> MutexGuard<'_, CanonicalStore> {
        // Poisoned lock: keep serving with the last in-memory list.
        self.canonical
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
