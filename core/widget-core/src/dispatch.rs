//! Action dispatch.
//!
//! A tap in the widget becomes exactly one [`Intent`], encoded as a deep
//! link and handed to a [`BackgroundDelivery`]. Dispatch is fire-and-forget:
//! nothing waits for the relay, nothing retries, and a failed submission is
//! logged and dropped. The next refresh simply shows pre-mutation state
//! until the owning app republishes.
//!
//! Intents carry no sequence number. Two quick toggles may be applied in
//! either order, which is only safe because toggles of distinct tasks
//! commute. Any new action must keep that property.
//!
//! The dispatcher holds no store handle; it cannot write shared state.

use std::sync::{Arc, Mutex};

use habit_widget_protocol::Intent;

use crate::error::{Result, WidgetError};

/// Opaque "deliver this URL to whoever owns the scheme" primitive.
pub trait BackgroundDelivery: Send + Sync {
    fn submit(&self, url: &str, app_group: &str) -> Result<()>;
}

pub struct ActionDispatcher {
    app_group: String,
    delivery: Arc<dyn BackgroundDelivery>,
}

impl ActionDispatcher {
    pub fn new(app_group: impl Into<String>, delivery: Arc<dyn BackgroundDelivery>) -> Self {
        Self {
            app_group: app_group.into(),
            delivery,
        }
    }

    /// Requests a completion toggle for `task_id`.
    ///
    /// Fails only for an empty id, before anything is submitted.
    pub fn dispatch_complete(&self, task_id: &str) -> Result<Intent> {
        if task_id.trim().is_empty() {
            return Err(WidgetError::EmptyTaskId);
        }
        Ok(self.dispatch(Intent::complete(task_id)))
    }

    /// Entry point kept for widget intents registered without a task id.
    /// The relay picks the task.
    pub fn dispatch_complete_legacy(&self) -> Intent {
        self.dispatch(Intent::complete_legacy())
    }

    pub fn dispatch_add_task(&self) -> Intent {
        self.dispatch(Intent::add_task())
    }

    fn dispatch(&self, intent: Intent) -> Intent {
        let url = intent.to_url();
        match self.delivery.submit(&url, &self.app_group) {
            Ok(()) => tracing::debug!(url = %url, "Intent submitted"),
            Err(err) => tracing::warn!(error = %err, url = %url, "Intent delivery failed; dropping"),
        }
        intent
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Simple Deliveries
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub url: String,
    pub app_group: String,
}

/// Keeps every submission in memory. Used by tests and previews.
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    submissions: Mutex<Vec<Submission>>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl BackgroundDelivery for RecordingDelivery {
    fn submit(&self, url: &str, app_group: &str) -> Result<()> {
        if let Ok(mut guard) = self.submissions.lock() {
            guard.push(Submission {
                url: url.to_string(),
                app_group: app_group.to_string(),
            });
        }
        Ok(())
    }
}

/// Drops every submission. Selected when delivery is turned off in config.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledDelivery;

impl BackgroundDelivery for DisabledDelivery {
    fn submit(&self, url: &str, _app_group: &str) -> Result<()> {
        tracing::debug!(url = %url, "Delivery disabled; intent not sent");
        Ok(())
    }
}
