//! The owning app's canonical task list.
//!
//! This is the single source of truth. The app-group store is a projection of
//! it, rebuilt by the publisher after every mutation.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "tasks": [{ "id": "habit-01J...", "name": "Make Bed", "completed": false }]
//! }
//! ```
//!
//! Loading follows the same defensive rules as the widget's reader: a missing,
//! empty, corrupt or unsupported-version file yields an empty list and a
//! warning, never an error. Re-reading before a mutation is stricter about
//! I/O failures; see [`CanonicalStore::refresh`].

use std::fmt;
use std::path::{Path, PathBuf};

use habit_widget_protocol::{Intent, IntentAction, Task};
use serde::{Deserialize, Serialize};

use crate::atomic::atomic_write;
use crate::error::{RelayError, Result};

const FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct TasksFile {
    version: u32,
    tasks: Vec<Task>,
}

/// Result of applying one intent to the canonical list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// A task's completion flag was flipped.
    Toggled { task_id: String, completed: bool },
    /// Nothing changed.
    Ignored(IgnoreReason),
    /// The app should present its add-task flow. The list is unchanged.
    AddTaskRequested,
}

impl RelayOutcome {
    pub fn is_mutation(&self) -> bool {
        matches!(self, RelayOutcome::Toggled { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The id does not name a task. Usually a stale widget row for a task
    /// the app has since deleted.
    UnknownTask(String),
    /// A legacy intent arrived and every task is already complete.
    NoIncompleteTask,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::UnknownTask(id) => write!(f, "no task with id {id:?}"),
            IgnoreReason::NoIncompleteTask => f.write_str("no incomplete task"),
        }
    }
}

#[derive(Debug)]
pub struct CanonicalStore {
    tasks: Vec<Task>,
    file_path: Option<PathBuf>,
}

impl CanonicalStore {
    pub fn new_in_memory() -> Self {
        CanonicalStore {
            tasks: Vec::new(),
            file_path: None,
        }
    }

    pub fn new(file_path: &Path) -> Self {
        CanonicalStore {
            tasks: Vec::new(),
            file_path: Some(file_path.to_path_buf()),
        }
    }

    pub fn load(file_path: &Path) -> Self {
        let tasks = read_tasks(file_path).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to read canonical tasks, starting empty");
            Vec::new()
        });
        CanonicalStore {
            tasks,
            file_path: Some(file_path.to_path_buf()),
        }
    }

    /// Replaces the in-memory list with what is on disk.
    ///
    /// Another process may have written the file since this store last saw
    /// it. Unlike [`CanonicalStore::load`], an unreadable file is an error:
    /// mutating a guessed list and saving it would erase the real one.
    pub fn refresh(&mut self) -> Result<()> {
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };
        self.tasks = read_tasks(file_path).map_err(|e| RelayError::Io {
            context: "re-reading canonical tasks".to_string(),
            source: e,
        })?;
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Appends a new incomplete task with a freshly minted id and saves.
    pub fn add(&mut self, name: &str) -> Result<Task> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RelayError::EmptyTaskName);
        }

        let task = Task::new(format!("habit-{}", ulid::Ulid::new()), name);
        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        Ok(task)
    }

    /// Applies one intent and saves if it changed anything.
    ///
    /// On a save error the in-memory list is left as it was before the call.
    pub fn apply(&mut self, intent: &Intent) -> Result<RelayOutcome> {
        let mut next = self.tasks.clone();
        let outcome = resolve(&mut next, intent);
        if outcome.is_mutation() {
            self.commit(next)?;
        }
        Ok(outcome)
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        self.write(&next)?;
        self.tasks = next;
        Ok(())
    }

    fn write(&self, tasks: &[Task]) -> Result<()> {
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        let file = TasksFile {
            version: FILE_VERSION,
            tasks: tasks.to_vec(),
        };
        let content = serde_json::to_string_pretty(&file).map_err(|e| RelayError::Json {
            context: "serializing canonical tasks".to_string(),
            source: e,
        })?;

        atomic_write(file_path, &content)
    }
}

/// Reads the canonical file. A missing, empty, corrupt or unsupported-version
/// file is an empty list; only I/O failures are errors.
fn read_tasks(file_path: &Path) -> std::io::Result<Vec<Task>> {
    let content = match fs_err::read_to_string(file_path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    if content.trim().is_empty() {
        tracing::warn!("Empty canonical tasks file, treating as empty");
        return Ok(Vec::new());
    }

    match serde_json::from_str::<TasksFile>(&content) {
        Ok(file) if file.version == FILE_VERSION => Ok(file.tasks),
        Ok(file) => {
            tracing::warn!(
                version = file.version,
                expected = FILE_VERSION,
                "Unsupported canonical tasks version, treating as empty"
            );
            Ok(Vec::new())
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to parse canonical tasks, treating as empty");
            Ok(Vec::new())
        }
    }
}

fn resolve(tasks: &mut [Task], intent: &Intent) -> RelayOutcome {
    match intent.action {
        IntentAction::AddTask => RelayOutcome::AddTaskRequested,
        IntentAction::Complete => {
            let task_id = intent.task_id.as_deref().unwrap_or_default();
            // An exact id wins, even over the legacy sentinel.
            if let Some(index) = tasks.iter().position(|task| task.id == task_id) {
                return toggle(tasks, index);
            }
            if !intent.is_legacy() {
                return RelayOutcome::Ignored(IgnoreReason::UnknownTask(task_id.to_string()));
            }
            match legacy_target(tasks) {
                Some(index) => toggle(tasks, index),
                None => RelayOutcome::Ignored(IgnoreReason::NoIncompleteTask),
            }
        }
    }
}

fn toggle(tasks: &mut [Task], index: usize) -> RelayOutcome {
    let task = &mut tasks[index];
    task.completed = !task.completed;
    RelayOutcome::Toggled {
        task_id: task.id.clone(),
        completed: task.completed,
    }
}

// The id-less intent targets the most recently added task still open.
fn legacy_target(tasks: &[Task]) -> Option<usize> {
    tasks.iter().rposition(|task| !task.completed)
}
