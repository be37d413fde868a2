//! Storage configuration and path management for the app-group namespace.
//!
//! Both the widget extension and the owning app resolve the same root, so
//! every path either side touches is decided here.
//!
//! ## Design Principles
//!
//! - **Single source of truth**: All path decisions centralized here
//! - **Testable**: `StorageConfig::with_root()` enables test injection
//! - **Overridable**: `HABIT_WIDGET_GROUP_DIR` and `HABIT_WIDGET_SOCKET`

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, WidgetError};

/// App-group identifier shared by the widget extension and the owning app.
pub const DEFAULT_APP_GROUP: &str = "group.com.example.habitTaskTrackerGroup";

const GROUP_DIR_ENV: &str = "HABIT_WIDGET_GROUP_DIR";
const SOCKET_ENV: &str = "HABIT_WIDGET_SOCKET";
const SOCKET_NAME: &str = "relay.sock";

/// Central configuration for all app-group storage paths.
///
/// Production code uses [`StorageConfig::resolve`]; tests use
/// [`StorageConfig::with_root`] with a temp directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Root of the app-group container.
    root: PathBuf,
    /// Relay socket location when overridden from the environment.
    socket_override: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolves the app-group root for this installation.
    ///
    /// On macOS this is the group container under `~/Library/Group Containers`;
    /// elsewhere it lives under the platform data directory.
    pub fn resolve() -> Result<Self> {
        let root = match env::var_os(GROUP_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_group_root().ok_or(WidgetError::StoreDirNotFound)?,
        };
        let socket_override = env::var_os(SOCKET_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Ok(Self {
            root,
            socket_override,
        })
    }

    /// Creates a StorageConfig with a custom root directory.
    /// Used for testing with temp directories.
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            socket_override: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Shared Files
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to the shared key-value document read by the widget.
    pub fn store_file(&self) -> PathBuf {
        self.root.join("shared-store.json")
    }

    /// Path to widget.json (widget preferences).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("widget.json")
    }

    /// Path to the relay's listening socket.
    pub fn socket_path(&self) -> PathBuf {
        self.socket_override
            .clone()
            .unwrap_or_else(|| self.root.join(SOCKET_NAME))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Owning-App Paths
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to relay/ (data owned by the canonical writer).
    pub fn relay_dir(&self) -> PathBuf {
        self.root.join("relay")
    }

    /// Path to the canonical task list. Only the relay reads or writes it.
    pub fn canonical_tasks_file(&self) -> PathBuf {
        self.relay_dir().join("tasks.json")
    }

    /// Path to the lock file every relay process holds while it writes.
    pub fn writer_lock_file(&self) -> PathBuf {
        self.relay_dir().join("writer.lock")
    }

    /// Path to logs/ (rolling log files for both binaries).
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the root directory and standard subdirectories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs_err::create_dir_all(&self.root)?;
        fs_err::create_dir_all(self.relay_dir())?;
        fs_err::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn default_group_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join("Library")
            .join("Group Containers")
            .join(DEFAULT_APP_GROUP)
    })
}

#[cfg(not(target_os = "macos"))]
fn default_group_root() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(DEFAULT_APP_GROUP))
}
