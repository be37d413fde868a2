//! The task collection as last published by the owning app.

use habit_widget_protocol::Task;
use serde::Serialize;

/// Ordered tasks plus the authoritative count.
///
/// `total_count` may exceed `tasks.len()` when the publisher truncates the
/// payload. The reverse is tolerated but not expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub total_count: u32,
}

impl Snapshot {
    pub fn new(tasks: Vec<Task>, total_count: u32) -> Self {
        Self { tasks, total_count }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Fixed demonstration data shown in widget galleries and previews.
    pub fn demo() -> Self {
        let tasks = vec![
            Task::new("preview-1", "Clean the Toilet"),
            Task::new("preview-2", "Brush Teeth"),
            Task::new("preview-3", "Make Bed"),
        ];
        Self {
            total_count: tasks.len() as u32,
            tasks,
        }
    }

    /// The first `limit` tasks in publish order.
    pub fn visible_tasks(&self, limit: usize) -> &[Task] {
        &self.tasks[..self.tasks.len().min(limit)]
    }
}
