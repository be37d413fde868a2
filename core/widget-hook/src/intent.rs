//! `complete` and `add-task`: fire one intent at the relay and exit.
//!
//! Delivery failures are logged by the dispatcher and never change the exit
//! status; the widget shows the next published snapshot either way. The
//! submitted URL is echoed on stdout.

use habit_widget_core::{Intent, StorageConfig, WidgetEngine};

use crate::HookError;

pub fn complete(storage: StorageConfig, task_id: Option<&str>) -> Result<(), HookError> {
    let engine = WidgetEngine::with_storage(storage);
    let intent = match task_id {
        Some(id) => engine.dispatcher().dispatch_complete(id)?,
        None => engine.dispatcher().dispatch_complete_legacy(),
    };
    report(&intent);
    Ok(())
}

pub fn add_task(storage: StorageConfig) -> Result<(), HookError> {
    let engine = WidgetEngine::with_storage(storage);
    let intent = engine.dispatcher().dispatch_add_task();
    report(&intent);
    Ok(())
}

fn report(intent: &Intent) {
    let url = intent.to_url();
    tracing::info!(url = %url, legacy = intent.is_legacy(), "Dispatched intent");
    println!("{url}");
}
