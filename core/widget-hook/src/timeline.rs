//! `timeline`: one widget refresh, printed as JSON.
//!
//! ## Usage
//!
//! ```bash
//! habit-widget-hook timeline --size full
//! habit-widget-hook timeline --preview
//! ```

use std::io::Write;

use habit_widget_core::{StorageConfig, WidgetEngine, WidgetSize, WidgetView};

use crate::HookError;

pub fn run(storage: StorageConfig, preview: bool, size: WidgetSize) -> Result<(), HookError> {
    let engine = WidgetEngine::with_storage(storage);
    let view = engine.view(preview, size);

    tracing::debug!(
        preview,
        rows = view.rows.len(),
        total = view.total_count,
        "Rendered widget view"
    );

    let stdout = std::io::stdout();
    write_view(&mut stdout.lock(), &view)
}

fn write_view<W: Write>(out: &mut W, view: &WidgetView) -> Result<(), HookError> {
    serde_json::to_writer_pretty(&mut *out, view)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
