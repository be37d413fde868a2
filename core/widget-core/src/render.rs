//! Presentation model handed to the widget view layer.
//!
//! The Swift view draws exactly what is in a [`WidgetView`]; every decision
//! about truncation, the count badge, and which URL a tap submits is made
//! here so both sizes stay consistent with the snapshot.

use habit_widget_protocol::Intent;
use serde::{Deserialize, Serialize};

use crate::config::WidgetConfig;
use crate::timeline::Entry;

/// Presentation size chosen by the hosting runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum WidgetSize {
    /// Title and count badge only.
    Compact,
    /// Title, count badge, interactive rows and the add affordance.
    Full,
}

/// One interactive task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
pub struct TaskRow {
    pub id: String,
    pub name: String,
    pub completed: bool,
    /// Deep link submitted when the row's toggle is tapped.
    pub action_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
pub struct WidgetView {
    pub title: String,
    /// Authoritative total, not the number of rows shown.
    pub count_badge: String,
    pub total_count: u32,
    pub rows: Vec<TaskRow>,
    pub add_action_url: Option<String>,
    pub generated_at: String,
    pub is_preview: bool,
    pub size: WidgetSize,
}

pub fn render(entry: &Entry, size: WidgetSize, config: &WidgetConfig) -> WidgetView {
    let snapshot = entry.snapshot();

    let (rows, add_action_url) = match size {
        WidgetSize::Compact => (Vec::new(), None),
        WidgetSize::Full => {
            let rows = snapshot
                .visible_tasks(config.row_limit())
                .iter()
                .map(|task| TaskRow {
                    id: task.id.clone(),
                    name: display_name(&task.name),
                    completed: task.completed,
                    action_url: Intent::complete(task.id.as_str()).to_url(),
                })
                .collect();
            (rows, Some(Intent::add_task().to_url()))
        }
    };

    WidgetView {
        title: config.title.clone(),
        count_badge: snapshot.total_count.to_string(),
        total_count: snapshot.total_count,
        rows,
        add_action_url,
        generated_at: entry.date().to_rfc3339(),
        is_preview: entry.is_preview(),
        size,
    }
}

fn display_name(name: &str) -> String {
    if name.trim().is_empty() {
        String::new()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::timeline::TimelineBuilder;
    use habit_widget_protocol::{StoreDocument, Task, HABITS_KEY, HABIT_COUNT_KEY};

    fn live_entry(tasks: &[Task], count: i64) -> Entry {
        let mut document = StoreDocument::new();
        document.set_string(HABITS_KEY, serde_json::to_string(tasks).unwrap());
        document.set_int(HABIT_COUNT_KEY, count);
        TimelineBuilder::with_demo_preview(MemoryStore::from_document(document)).build(false)
    }

    fn tasks(n: usize) -> Vec<Task> {
        (1..=n)
            .map(|i| Task::new(format!("habit-{i}"), format!("Habit {i}")))
            .collect()
    }

    #[test]
    fn test_full_size_truncates_to_seven_rows() {
        let view = render(&live_entry(&tasks(10), 10), WidgetSize::Full, &WidgetConfig::default());

        assert_eq!(view.rows.len(), 7);
        assert_eq!(view.rows[0].id, "habit-1");
        assert_eq!(view.rows[6].id, "habit-7");
        assert_eq!(view.count_badge, "10");
    }

    #[test]
    fn test_badge_uses_total_count_not_payload_length() {
        let view = render(&live_entry(&tasks(2), 25), WidgetSize::Full, &WidgetConfig::default());
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.count_badge, "25");
    }

    #[test]
    fn test_rows_carry_complete_urls() {
        let view = render(&live_entry(&tasks(1), 1), WidgetSize::Full, &WidgetConfig::default());
        assert_eq!(view.rows[0].action_url, "habitWidget://complete?id=habit-1");
        assert_eq!(
            view.add_action_url.as_deref(),
            Some("habitWidget://task:add?id=")
        );
    }

    #[test]
    fn test_compact_size_has_no_rows() {
        let view = render(&live_entry(&tasks(3), 3), WidgetSize::Compact, &WidgetConfig::default());
        assert!(view.rows.is_empty());
        assert!(view.add_action_url.is_none());
        assert_eq!(view.count_badge, "3");
        assert_eq!(view.title, "Habit Task Tracker");
    }

    #[test]
    fn test_configured_row_limit_applies() {
        let config = WidgetConfig {
            max_rows: 2,
            ..WidgetConfig::default()
        };
        let view = render(&live_entry(&tasks(5), 5), WidgetSize::Full, &config);
        assert_eq!(view.rows.len(), 2);
    }

    #[test]
    fn test_blank_names_render_empty() {
        let view = render(
            &live_entry(&[Task::new("a", "   ")], 1),
            WidgetSize::Full,
            &WidgetConfig::default(),
        );
        assert_eq!(view.rows[0].name, "");
    }

    #[test]
    fn test_preview_flag_propagates() {
        let entry = TimelineBuilder::with_demo_preview(MemoryStore::new()).build(true);
        let view = render(&entry, WidgetSize::Full, &WidgetConfig::default());
        assert!(view.is_preview);
        assert_eq!(view.rows.len(), 3);
    }
}
