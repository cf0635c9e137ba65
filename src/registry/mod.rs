//! Application registry collaborator.
//!
//! The registry decides which apps exist and which are active (mounted and
//! visible). The router only consumes it: inactive apps are skipped when a
//! navigation notification is rebroadcast.

pub mod memory;

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::host::AppEvent;

pub use memory::MemoryRegistry;

/// Unique, stable app identifier.
pub type AppName = String;

/// Direct per-app event callback.
pub type EventCallback = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// What the router needs to know about one app instance.
#[derive(Clone)]
pub struct AppRecord {
    pub name: AppName,
    pub base_url: Url,
    pub on_navigation_changed: Option<EventCallback>,
    pub on_hash_changed: Option<EventCallback>,
}

impl AppRecord {
    pub fn new(name: impl Into<AppName>, base_url: Url) -> Self {
        Self {
            name: name.into(),
            base_url,
            on_navigation_changed: None,
            on_hash_changed: None,
        }
    }

    pub fn with_navigation_callback(mut self, callback: EventCallback) -> Self {
        self.on_navigation_changed = Some(callback);
        self
    }

    pub fn with_hash_callback(mut self, callback: EventCallback) -> Self {
        self.on_hash_changed = Some(callback);
        self
    }
}

impl fmt::Debug for AppRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppRecord")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .field("on_navigation_changed", &self.on_navigation_changed.is_some())
            .field("on_hash_changed", &self.on_hash_changed.is_some())
            .finish()
    }
}

/// Source of truth for app existence and activity.
pub trait AppRegistry: Send + Sync {
    fn is_active(&self, name: &str) -> bool;

    fn active_apps(&self) -> Vec<AppName>;

    fn app(&self, name: &str) -> Option<AppRecord>;
}
