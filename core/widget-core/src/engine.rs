//! WidgetEngine - the entry point for the Swift widget extension.
//!
//! Each method is one widget activation: it opens the app-group store fresh,
//! does its work, and keeps nothing between calls. The engine itself only
//! holds configuration.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use habit_widget_core::{WidgetEngine, WidgetSize};
//!
//! let engine = WidgetEngine::new()?;
//! let view = engine.view(false, WidgetSize::Full);
//! engine.complete(view.rows[0].id.clone())?;
//! ```

use std::sync::Arc;

use crate::config::{load_widget_config_with_storage, WidgetConfig};
use crate::delivery::SocketDelivery;
use crate::dispatch::{ActionDispatcher, BackgroundDelivery, DisabledDelivery};
use crate::error::WidgetFfiError;
use crate::render::{render, WidgetSize, WidgetView};
use crate::snapshot::Snapshot;
use crate::storage::StorageConfig;
use crate::store::AppGroupStore;
use crate::timeline::{Entry, Timeline, TimelineBuilder};

#[derive(uniffi::Object)]
pub struct WidgetEngine {
    storage: StorageConfig,
    config: WidgetConfig,
    dispatcher: ActionDispatcher,
    preview: Snapshot,
}

impl WidgetEngine {
    /// Creates an engine over a custom storage root.
    ///
    /// Delivery goes to the relay socket unless config turns it off.
    pub fn with_storage(storage: StorageConfig) -> Self {
        let config = load_widget_config_with_storage(&storage).with_env_overrides();
        let delivery: Arc<dyn BackgroundDelivery> = if config.delivery_enabled {
            Arc::new(SocketDelivery::new(storage.socket_path()))
        } else {
            Arc::new(DisabledDelivery)
        };
        Self::with_delivery(storage, config, delivery)
    }

    pub fn with_delivery(
        storage: StorageConfig,
        config: WidgetConfig,
        delivery: Arc<dyn BackgroundDelivery>,
    ) -> Self {
        let dispatcher = ActionDispatcher::new(config.app_group.clone(), delivery);
        Self {
            storage,
            config,
            dispatcher,
            preview: Snapshot::demo(),
        }
    }

    /// Replaces the snapshot shown for previews and placeholders.
    pub fn with_preview(mut self, preview: Snapshot) -> Self {
        self.preview = preview;
        self
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn entry(&self, for_preview: bool) -> Entry {
        self.builder().build(for_preview)
    }

    pub fn timeline(&self, for_preview: bool) -> Timeline {
        self.builder().timeline(for_preview)
    }

    fn builder(&self) -> TimelineBuilder<AppGroupStore> {
        let store = AppGroupStore::open(&self.storage.store_file());
        TimelineBuilder::new(store, self.preview.clone())
    }
}

#[uniffi::export]
impl WidgetEngine {
    /// Creates an engine for this installation's app group.
    #[uniffi::constructor]
    pub fn new() -> Result<Self, WidgetFfiError> {
        Ok(Self::with_storage(StorageConfig::resolve()?))
    }

    /// Builds and renders one entry. Never fails; corrupt or missing data
    /// renders as an empty list.
    pub fn view(&self, for_preview: bool, size: WidgetSize) -> WidgetView {
        render(&self.entry(for_preview), size, &self.config)
    }

    pub fn placeholder_view(&self, size: WidgetSize) -> WidgetView {
        render(&self.builder().placeholder(), size, &self.config)
    }

    /// Toggle entry point for intents that carry a task id.
    pub fn complete(&self, task_id: String) -> Result<(), WidgetFfiError> {
        self.dispatcher.dispatch_complete(&task_id)?;
        Ok(())
    }

    /// Toggle entry point for intents registered before ids were attached.
    pub fn complete_legacy(&self) {
        self.dispatcher.dispatch_complete_legacy();
    }

    pub fn add_task(&self) {
        self.dispatcher.dispatch_add_task();
    }

    pub fn app_group_dir(&self) -> String {
        self.storage.root().to_string_lossy().to_string()
    }
}
