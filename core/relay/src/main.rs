//! habit-relay: the owning app's single writer for habit task state.
//!
//! Holds the canonical task list, applies intents delivered by the widget,
//! and republishes the app-group snapshot after every mutation.
//!
//! ## Subcommands
//!
//! - `serve`: Listen on the relay socket for widget deliveries
//! - `apply`: Apply one deep link (as the URL handler would)
//! - `publish`: Rewrite the app-group snapshot from the canonical list
//! - `add`: Append a task and publish

mod atomic;
mod canonical;
mod error;
mod lock;
mod publish;
mod relay;
mod server;

use std::env;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use habit_widget_core::{load_widget_config_with_storage, StorageConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::canonical::RelayOutcome;
use crate::relay::MutationRelay;

#[derive(Parser)]
#[command(name = "habit-relay")]
#[command(about = "Single writer for habit widget state")]
#[command(version)]
struct Cli {
    /// Publish at most this many tasks into the widget payload
    #[arg(long, global = true)]
    publish_limit: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for widget deliveries on the relay socket
    Serve,

    /// Apply one habitWidget:// deep link
    Apply {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Republish the snapshot without changing any task
    Publish,

    /// Add a task and publish
    Add {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let storage = match StorageConfig::resolve() {
        Ok(storage) => storage,
        Err(err) => {
            error!(error = %err, "Failed to resolve app-group directory");
            std::process::exit(1);
        }
    };

    if let Err(err) = storage.ensure_dirs() {
        error!(error = %err, root = %storage.root().display(), "Failed to prepare app-group directory");
        std::process::exit(1);
    }

    let relay = MutationRelay::open(&storage, cli.publish_limit);

    let result = match cli.command {
        Commands::Serve => serve(&storage, relay),
        Commands::Apply { url } => relay.apply_url(&url).map(report_outcome),
        Commands::Publish => relay.publish(),
        Commands::Add { name } => relay.add_task(&name).map(|task| println!("{}", task.id)),
    };

    if let Err(err) = result {
        error!(error = %err, "habit-relay failed");
        std::process::exit(1);
    }
}

fn serve(storage: &StorageConfig, relay: MutationRelay) -> error::Result<()> {
    let config = load_widget_config_with_storage(storage);
    let socket_path = storage.socket_path();

    // The widget may have rendered before the relay ever ran.
    relay.publish()?;

    let listener = server::bind(&socket_path)?;
    info!(
        path = %socket_path.display(),
        app_group = %config.app_group,
        tasks = relay.tasks().len(),
        "Habit relay started"
    );

    server::serve(listener, Arc::new(relay), config.app_group);
    Ok(())
}

fn report_outcome(outcome: RelayOutcome) {
    match outcome {
        RelayOutcome::Toggled { task_id, completed } => {
            println!("toggled {task_id} completed={completed}")
        }
        RelayOutcome::Ignored(reason) => println!("ignored: {reason}"),
        RelayOutcome::AddTaskRequested => println!("add-task requested"),
    }
}

fn init_logging() {
    let debug_enabled = env::var("HABIT_WIDGET_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
