//! Error types for habit-widget-core operations.
//! Keep WidgetFfiError minimal and stable to avoid breaking the Swift extension.

// ═══════════════════════════════════════════════════════════════════════════════
// FFI-Compatible Error (for Swift)
// ═══════════════════════════════════════════════════════════════════════════════

/// FFI-safe error type for use across the language boundary.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum WidgetFfiError {
    #[error("{message}")]
    General { message: String },
}

impl From<WidgetError> for WidgetFfiError {
    fn from(err: WidgetError) -> Self {
        WidgetFfiError::General {
            message: err.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Internal Error (for Rust-only use)
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors the widget side can surface to its caller.
///
/// Snapshot decoding and intent delivery never return these to the render
/// path; they degrade and log instead.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Could not resolve a directory for the app-group store")]
    StoreDirNotFound,

    // ─────────────────────────────────────────────────────────────────────
    // Dispatch Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Task id must not be empty")]
    EmptyTaskId,

    #[error("Delivery request rejected: {code}: {message}")]
    InvalidDelivery { code: String, message: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using WidgetError.
pub type Result<T> = std::result::Result<T, WidgetError>;
