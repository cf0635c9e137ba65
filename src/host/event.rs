//! Events exchanged with the host navigation context.

use serde::Serialize;
use serde_json::Value;

/// A real "navigation changed" notification from the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavigationEvent {
    /// Shared history state carried by the notification.
    pub state: Value,
}

impl NavigationEvent {
    pub fn new(state: Value) -> Self {
        Self { state }
    }
}

/// App-scoped synthetic event re-emitted by the broadcaster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppEvent {
    NavigationChanged {
        app: String,
        /// The app's own state partition.
        state: Value,
    },
    HashChanged {
        app: String,
        old_url: String,
        new_url: String,
    },
}

impl AppEvent {
    /// Event name as seen by listeners on the host, e.g. `hash-changed:sub1`.
    pub fn name(&self) -> String {
        match self {
            AppEvent::NavigationChanged { app, .. } => format!("navigation-changed:{app}"),
            AppEvent::HashChanged { app, .. } => format!("hash-changed:{app}"),
        }
    }

    pub fn app(&self) -> &str {
        match self {
            AppEvent::NavigationChanged { app, .. } | AppEvent::HashChanged { app, .. } => app,
        }
    }

    /// Short kind label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AppEvent::NavigationChanged { .. } => "navigation_changed",
            AppEvent::HashChanged { .. } => "hash_changed",
        }
    }
}
