//! Error types for the relay.

use std::path::PathBuf;

use habit_widget_protocol::ErrorInfo;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("IO error {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Rejected request ({}): {}", .0.code, .0.message)]
    Rejected(ErrorInfo),

    #[error("Task name must not be empty")]
    EmptyTaskName,

    #[error("{} has no parent directory", .0.display())]
    NoParentDir(PathBuf),
}

impl From<ErrorInfo> for RelayError {
    fn from(info: ErrorInfo) -> Self {
        RelayError::Rejected(info)
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
