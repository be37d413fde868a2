//! Deep-link intent codec.
//!
//! An intent travels as `habitWidget://<action>?id=<id>`. The action
//! `task:add` contains a colon, so the authority is not a host:port and the
//! URL is split by hand rather than through a generic URL parser.

use std::fmt;

pub const URL_SCHEME: &str = "habitWidget";

/// Task id sent by the legacy "complete" entry point that carries no id.
/// The relay resolves it to an implicit task.
pub const LEGACY_TASK_ID: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentAction {
    Complete,
    AddTask,
}

impl IntentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentAction::Complete => "complete",
            IntentAction::AddTask => "task:add",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "complete" => Some(IntentAction::Complete),
            "task:add" => Some(IntentAction::AddTask),
            _ => None,
        }
    }
}

impl fmt::Display for IntentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentParseError {
    #[error("url has no scheme separator: {0}")]
    MissingScheme(String),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("unknown intent action: {0}")]
    UnknownAction(String),

    #[error("complete intent requires a task id")]
    MissingTaskId,

    #[error("task id is not valid UTF-8 after percent-decoding")]
    InvalidEncoding,
}

/// A single mutation request from the widget toward the canonical side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub action: IntentAction,
    /// Subject of the action. `None` for actions without a subject.
    pub task_id: Option<String>,
}

impl Intent {
    pub fn complete(task_id: impl Into<String>) -> Self {
        Self {
            action: IntentAction::Complete,
            task_id: Some(task_id.into()),
        }
    }

    pub fn complete_legacy() -> Self {
        Self::complete(LEGACY_TASK_ID)
    }

    pub fn add_task() -> Self {
        Self {
            action: IntentAction::AddTask,
            task_id: None,
        }
    }

    /// True when this intent came from the id-less legacy entry point.
    pub fn is_legacy(&self) -> bool {
        self.action == IntentAction::Complete && self.task_id.as_deref() == Some(LEGACY_TASK_ID)
    }

    /// Encodes the intent. Ids outside the RFC 3986 unreserved set are
    /// percent-encoded; opaque ids such as UUIDs pass through unchanged.
    pub fn to_url(&self) -> String {
        let id = self.task_id.as_deref().unwrap_or("");
        format!(
            "{}://{}?id={}",
            URL_SCHEME,
            self.action.as_str(),
            urlencoding::encode(id)
        )
    }

    pub fn parse_url(url: &str) -> Result<Self, IntentParseError> {
        let url = url.trim();
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| IntentParseError::MissingScheme(url.to_string()))?;

        // Hosts may hand the link back with a lowercased scheme.
        if !scheme.eq_ignore_ascii_case(URL_SCHEME) {
            return Err(IntentParseError::UnsupportedScheme(scheme.to_string()));
        }

        let (action, query) = match rest.split_once('?') {
            Some((action, query)) => (action, query),
            None => (rest, ""),
        };
        let action = action.trim_end_matches('/');
        let action = IntentAction::parse(action)
            .ok_or_else(|| IntentParseError::UnknownAction(action.to_string()))?;

        let task_id = query_value(query, "id")
            .map(|raw| {
                urlencoding::decode(raw)
                    .map(|decoded| decoded.into_owned())
                    .map_err(|_| IntentParseError::InvalidEncoding)
            })
            .transpose()?
            .filter(|id| !id.is_empty());

        match action {
            IntentAction::Complete => match task_id {
                Some(id) => Ok(Intent::complete(id)),
                None => Err(IntentParseError::MissingTaskId),
            },
            IntentAction::AddTask => Ok(Intent::add_task()),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

fn query_value<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| match pair.split_once('=') {
            Some((k, v)) => Some((k, v)),
            None if !pair.is_empty() => Some((pair, "")),
            None => None,
        })
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}
