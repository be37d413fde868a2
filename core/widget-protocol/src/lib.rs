//! Shared schema for the habit widget and the app-side relay.
//!
//! This crate is shared by the widget extension and the relay to prevent
//! schema drift. It owns three contracts:
//!
//! - the task record and the keys of the app-group store,
//! - the on-disk shape of the app-group store document,
//! - the deep-link intent codec and the envelope it travels in.
//!
//! The relay remains the authority on validation; the widget only builds
//! values that already pass it.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod intent;

pub use intent::{Intent, IntentAction, IntentParseError, LEGACY_TASK_ID, URL_SCHEME};

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_REQUEST_BYTES: usize = 16 * 1024;
pub const MAX_URL_BYTES: usize = 2048;

// ═══════════════════════════════════════════════════════════════════════════════
// App-Group Store Schema
// ═══════════════════════════════════════════════════════════════════════════════

/// Store key holding the JSON-array serialization of the task list.
pub const HABITS_KEY: &str = "habits";
/// Store key holding the authoritative task count.
pub const HABIT_COUNT_KEY: &str = "habitCount";
/// Store key holding the payload schema version. Absent means version 1.
pub const SCHEMA_VERSION_KEY: &str = "habitsSchemaVersion";
/// Highest payload schema version this build understands.
pub const SCHEMA_VERSION: i64 = 1;

/// The atomic unit of state.
///
/// `id` is assigned once by the canonical writer and never changes. The
/// completion flag is written as `completed`; `isCompleted` is accepted on
/// read for payloads published by older app builds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(alias = "isCompleted")]
    pub completed: bool,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            completed: false,
        }
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// On-disk JSON document backing one app-group namespace.
///
/// Values are kept as raw JSON so a reader can tell a missing key from a key
/// of the wrong type. Writers replace the whole document on every publish.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreDocument {
    values: Map<String, Value>,
}

impl StoreDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Integers are read as-is; decimal strings are accepted as a fallback.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values
            .insert(key.to_string(), Value::String(value.into()));
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), Value::from(value));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Delivery Envelope
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// One deep link on its way from the widget to the relay.
///
/// Sent as a single newline-terminated JSON line. The relay never answers;
/// the sender's contract ends once the line is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryRequest {
    pub protocol_version: u32,
    pub request_id: String,
    pub sent_at: String,
    pub app_group: String,
    pub url: String,
}

impl DeliveryRequest {
    pub fn validate(&self) -> Result<(), ErrorInfo> {
        if self.protocol_version != PROTOCOL_VERSION {
            return Err(ErrorInfo::new(
                "protocol_mismatch",
                format!("unsupported protocol version {}", self.protocol_version),
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err(ErrorInfo::new(
                "invalid_request_id",
                "request_id is required",
            ));
        }
        if self.request_id.len() > 128 {
            return Err(ErrorInfo::new(
                "invalid_request_id",
                "request_id must be 128 characters or fewer",
            ));
        }
        if DateTime::parse_from_rfc3339(&self.sent_at).is_err() {
            return Err(ErrorInfo::new("invalid_timestamp", "sent_at must be RFC3339"));
        }
        if self.app_group.trim().is_empty() {
            return Err(ErrorInfo::new("invalid_app_group", "app_group is required"));
        }
        if self.url.trim().is_empty() {
            return Err(ErrorInfo::new("invalid_url", "url is required"));
        }
        if self.url.len() > MAX_URL_BYTES {
            return Err(ErrorInfo::new(
                "invalid_url",
                format!("url must be {} bytes or fewer", MAX_URL_BYTES),
            ));
        }
        Ok(())
    }

    /// Validates the envelope and decodes the intent it carries.
    pub fn intent(&self) -> Result<Intent, ErrorInfo> {
        self.validate()?;
        Intent::parse_url(&self.url)
            .map_err(|err| ErrorInfo::new("invalid_intent", err.to_string()))
    }
}

pub fn parse_delivery(line: &[u8]) -> Result<DeliveryRequest, ErrorInfo> {
    let request: DeliveryRequest = serde_json::from_slice(line).map_err(|err| {
        ErrorInfo::new(
            "invalid_json",
            format!("delivery request is invalid JSON: {}", err),
        )
    })?;
    request.validate()?;
    Ok(request)
}
