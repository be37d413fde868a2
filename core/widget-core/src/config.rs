//! Widget preferences.
//!
//! Loaded from `widget.json` in the app-group root. Every field has a
//! default, so a missing or partial file is never an error; a malformed
//! one is logged and replaced by defaults.

use serde::{Deserialize, Serialize};
use std::env;

use crate::storage::{StorageConfig, DEFAULT_APP_GROUP};

/// Hard cap on rows the full-size widget renders.
pub const MAX_VISIBLE_ROWS: u32 = 7;

const DELIVERY_ENV: &str = "HABIT_WIDGET_DELIVERY_ENABLED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// App-group identifier attached to every dispatched intent.
    pub app_group: String,
    pub title: String,
    /// Rows shown by the full-size widget; never more than [`MAX_VISIBLE_ROWS`].
    pub max_rows: u32,
    /// When false, intents are built but dropped instead of delivered.
    pub delivery_enabled: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            app_group: DEFAULT_APP_GROUP.to_string(),
            title: "Habit Task Tracker".to_string(),
            max_rows: MAX_VISIBLE_ROWS,
            delivery_enabled: true,
        }
    }
}

impl WidgetConfig {
    pub fn row_limit(&self) -> usize {
        self.max_rows.min(MAX_VISIBLE_ROWS) as usize
    }

    /// Applies `HABIT_WIDGET_DELIVERY_ENABLED` if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = env::var(DELIVERY_ENV) {
            self.delivery_enabled = parse_flag(&value);
        }
        self
    }
}

/// Loads widget.json, returning defaults if it doesn't exist or can't be parsed.
pub fn load_widget_config_with_storage(storage: &StorageConfig) -> WidgetConfig {
    let path = storage.config_file();
    let content = match fs_err::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return WidgetConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read widget config; using defaults");
            return WidgetConfig::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %path.display(),
                "Malformed widget config; using defaults"
            );
            WidgetConfig::default()
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}
