//! # habit-widget-core
//!
//! Widget-side half of the habit tracker's state synchronization: reads the
//! snapshot the owning app publishes into the app-group store, turns it into
//! render entries, and sends toggle intents back as deep links.
//!
//! ## Design Principles
//!
//! - **Read-only**: The widget never writes the app-group store. The
//!   [`SharedStore`] trait has no write methods; the owning app's relay is
//!   the only writer.
//! - **Graceful degradation**: Missing or corrupt data renders as an empty
//!   list with a zero count, never as an error.
//! - **Fire-and-forget**: Dispatch submits one intent and returns. No
//!   retries, no acknowledgements, no ordering across intents.
//! - **Synchronous**: No async runtime. One read-decode-build per activation.
//! - **FFI-ready**: UniFFI annotations expose [`WidgetEngine`] to Swift.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use habit_widget_core::{TimelineBuilder, MemoryStore};
//!
//! let builder = TimelineBuilder::with_demo_preview(MemoryStore::new());
//! let entry = builder.build(false);
//! ```

// UniFFI scaffolding for Swift bindings
uniffi::setup_scaffolding!();

pub mod config;
pub mod decoder;
pub mod delivery;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod render;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod timeline;

pub use config::{load_widget_config_with_storage, WidgetConfig, MAX_VISIBLE_ROWS};
pub use decoder::{decode, decode_with_report, DecodeFailure, DecodeReport};
pub use delivery::SocketDelivery;
pub use dispatch::{
    ActionDispatcher, BackgroundDelivery, DisabledDelivery, RecordingDelivery, Submission,
};
pub use engine::WidgetEngine;
pub use error::{Result, WidgetError, WidgetFfiError};
pub use render::{render, TaskRow, WidgetSize, WidgetView};
pub use snapshot::Snapshot;
pub use storage::{StorageConfig, DEFAULT_APP_GROUP};
pub use store::{AppGroupStore, MemoryStore, SharedStore};
pub use timeline::{Entry, EntrySource, ReloadPolicy, Timeline, TimelineBuilder};

pub use habit_widget_protocol::{Intent, IntentAction, Task};
