//! Navigation event broadcaster.
//!
//! # Responsibilities
//! - Own the single subscription to the host's navigation notifications
//! - Re-sync every active app's shadow location from the shared URL
//! - Re-emit app-scoped navigation-changed / hash-changed events
//!
//! # Ordering
//! ```text
//! for each active app:
//!     read encoded path → update shadow location → detect hash change
//!     → navigation-changed:<app> (host, then direct callback)
//!     → hash-changed:<app>       (host, then direct callback), if hash moved
//! ```
//!
//! # Design Decisions
//! - Inactive apps receive nothing and keep their location untouched
//! - The handler never yields; an app's location is complete before any of
//!   its events fire
//! - The host holds only a weak reference back to the broadcaster

use std::sync::{Arc, Mutex, PoisonError};

use crate::host::{AppEvent, NavigationEvent, SharedNavigationState, SubscriptionId};
use crate::observability::metrics;
use crate::registry::{AppRegistry, EventCallback};
use crate::router::RouteTable;

/// Fans one real navigation notification out to every active app.
pub struct Broadcaster {
    shared: SharedNavigationState,
    registry: Arc<dyn AppRegistry>,
    routes: RouteTable,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl Broadcaster {
    pub fn new(
        shared: SharedNavigationState,
        registry: Arc<dyn AppRegistry>,
        routes: RouteTable,
    ) -> Arc<Self> {
        Arc::new(Self {
            shared,
            registry,
            routes,
            subscription: Mutex::new(None),
        })
    }

    /// Subscribe to the host. Returns false if already subscribed.
    pub fn attach(self: &Arc<Self>) -> bool {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if subscription.is_some() {
            return false;
        }

        let weak = Arc::downgrade(self);
        let id = self.shared.host().subscribe(Arc::new(move |event: &NavigationEvent| {
            if let Some(broadcaster) = weak.upgrade() {
                broadcaster.handle(event);
            }
        }));
        *subscription = Some(id);
        tracing::debug!(subscription = id.0, "Navigation broadcaster attached");
        true
    }

    /// Drop the host subscription, if any.
    pub fn detach(&self) {
        let taken = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(id) = taken {
            self.shared.host().unsubscribe(id);
            tracing::debug!(subscription = id.0, "Navigation broadcaster detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Process one real navigation notification.
    pub fn handle(&self, event: &NavigationEvent) {
        for app in self.registry.active_apps() {
            let Some(location) = self.routes.get(&app).map(|r| r.location.clone()) else {
                tracing::trace!(app = %app, "Active app has no router, skipping");
                continue;
            };
            let record = self.registry.app(&app);

            let old_href = location.href();
            let mut hash_changed = false;
            let shared_parts = self.shared.shared_parts();
            if let Some(path) = self.shared.multiplexer().read_app_path(&shared_parts, &app) {
                let old_hash = location.hash();
                if let Err(e) = location.update_from_path(&path) {
                    location.report(&e);
                }
                hash_changed = location.hash() != old_hash;
            }

            let navigation = AppEvent::NavigationChanged {
                app: app.clone(),
                state: self.shared.partitions().get(&app, &event.state),
            };
            self.dispatch(
                &navigation,
                record.as_ref().and_then(|r| r.on_navigation_changed.as_ref()),
            );

            if hash_changed {
                let hash_change = AppEvent::HashChanged {
                    app: app.clone(),
                    old_url: old_href,
                    new_url: location.href(),
                };
                self.dispatch(
                    &hash_change,
                    record.as_ref().and_then(|r| r.on_hash_changed.as_ref()),
                );
            }
        }
    }

    fn dispatch(&self, event: &AppEvent, callback: Option<&EventCallback>) {
        tracing::debug!(app = event.app(), event = %event.name(), "Dispatching app event");
        metrics::record_event(event.kind());
        self.shared.host().dispatch_app_event(event);
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

impl Drop for Broadcaster {
    fn drop(&mut self) {
        self.detach();
    }
}
