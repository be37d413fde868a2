//! habit-widget-hook: CLI entry points for the habit widget.
//!
//! Thin process wrapper around habit-widget-core, called by the widget
//! extension (or by hand while debugging) once per activation.
//!
//! ## Subcommands
//!
//! - `timeline`: Read the app-group store and print the rendered view as JSON
//! - `complete`: Submit a toggle intent for one task (or the legacy intent)
//! - `add-task`: Submit the add-task intent

mod intent;
mod logging;
mod timeline;

use clap::{Parser, Subcommand, ValueEnum};
use habit_widget_core::{StorageConfig, WidgetError, WidgetSize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error(transparent)]
    Widget(#[from] WidgetError),

    #[error("Failed to encode view: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser)]
#[command(name = "habit-widget-hook")]
#[command(about = "Habit widget timeline and intent dispatch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one timeline entry and print it as JSON
    Timeline {
        /// Render the fixed preview snapshot instead of live data
        #[arg(long)]
        preview: bool,

        /// Widget size to render
        #[arg(long, value_enum, default_value_t = SizeArg::Full)]
        size: SizeArg,
    },

    /// Toggle a task's completion through the relay
    Complete {
        /// Task id; omit to send the legacy intent without an id
        #[arg(long)]
        id: Option<String>,
    },

    /// Ask the owning app to start its add-task flow
    AddTask,
}

#[derive(Clone, Copy, ValueEnum)]
enum SizeArg {
    Compact,
    Full,
}

impl From<SizeArg> for WidgetSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Compact => WidgetSize::Compact,
            SizeArg::Full => WidgetSize::Full,
        }
    }
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    let storage = match StorageConfig::resolve() {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!(error = %e, "habit-widget-hook could not resolve app group");
            eprintln!("habit-widget-hook: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Timeline { preview, size } => timeline::run(storage, preview, size.into()),
        Commands::Complete { id } => intent::complete(storage, id.as_deref()),
        Commands::AddTask => intent::add_task(storage),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "habit-widget-hook failed");
        eprintln!("habit-widget-hook: {e}");
        std::process::exit(1);
    }
}
