//! File logging for the hook binary.
//!
//! The hook runs inside the widget extension's process budget, so stdout is
//! reserved for its JSON output and logs go to a daily rolling file under the
//! app-group `logs/` directory.

use habit_widget_core::StorageConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "HABIT_WIDGET_DEBUG_LOG";
const LOG_FILE_PREFIX: &str = "widget-hook.log";

/// Installs the subscriber. The returned guard flushes buffered lines on drop
/// and must live until the process exits.
///
/// Logging is best effort: if the logs directory cannot be created the hook
/// runs without a subscriber.
pub fn init() -> Option<WorkerGuard> {
    let storage = StorageConfig::resolve().ok()?;
    let logs_dir = storage.logs_dir();
    if let Err(err) = fs_err::create_dir_all(&logs_dir) {
        eprintln!("habit-widget-hook: logging disabled: {err}");
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}

fn env_filter() -> EnvFilter {
    if debug_enabled(std::env::var(DEBUG_ENV).ok().as_deref()) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn debug_enabled(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "TRUE" | "yes" | "YES"))
}
