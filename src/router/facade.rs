//! Router facade.
//!
//! Creates and tears down each app's location/history pair and owns the one
//! broadcaster. It is the only component allowed to do either.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use url::Url;

use crate::host::SharedNavigationState;
use crate::registry::{AppName, AppRegistry};
use crate::router::error::{RouterError, RouterResult};
use crate::router::events::Broadcaster;
use crate::router::history::VirtualHistory;
use crate::router::location::VirtualLocation;

/// Live routers keyed by app name.
pub type RouteTable = Arc<DashMap<AppName, MicroRouter>>;

/// The location/history pair handed to one child app.
#[derive(Debug, Clone)]
pub struct MicroRouter {
    pub location: VirtualLocation,
    pub history: VirtualHistory,
}

/// Entry point for embedders.
pub struct Router {
    shared: SharedNavigationState,
    routes: RouteTable,
    broadcaster: Arc<Broadcaster>,
}

impl Router {
    /// Build the router and attach the single host subscription.
    pub fn new(shared: SharedNavigationState, registry: Arc<dyn AppRegistry>) -> Self {
        let routes: RouteTable = Arc::new(DashMap::new());
        let broadcaster = Broadcaster::new(shared.clone(), registry, routes.clone());
        broadcaster.attach();
        Self {
            shared,
            routes,
            broadcaster,
        }
    }

    pub fn shared(&self) -> &SharedNavigationState {
        &self.shared
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Create the pair for `app`, positioned at `base`. The shared URL is not
    /// touched.
    pub fn create(&self, app: &str, base: &str) -> RouterResult<MicroRouter> {
        let base_url = Url::parse(base).map_err(|source| RouterError::InvalidBaseUrl {
            app: app.to_string(),
            url: base.to_string(),
            source,
        })?;

        let location = VirtualLocation::new(app, base_url, self.shared.clone());
        let history = VirtualHistory::new(self.shared.clone(), location.clone());
        let router = MicroRouter { location, history };

        if self.routes.insert(app.to_string(), router.clone()).is_some() {
            tracing::debug!(app, "Replaced existing app router");
        } else {
            tracing::debug!(app, base, "Created app router");
        }
        Ok(router)
    }

    pub fn route(&self, app: &str) -> Option<MicroRouter> {
        self.routes.get(app).map(|r| r.value().clone())
    }

    /// Names of apps with a live router, sorted.
    pub fn apps(&self) -> Vec<AppName> {
        let mut names: Vec<AppName> = self.routes.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Sync `location` with the shared URL on app start or resume.
    ///
    /// An encoded entry already present wins and is decoded into the
    /// location. Otherwise the location's current path is written into the
    /// shared URL and the app's partition key is ensured, replacing the
    /// current history entry.
    pub fn init_with_shared_url(&self, location: &VirtualLocation) {
        let app = location.app();
        let shared_parts = self.shared.shared_parts();
        let multiplexer = self.shared.multiplexer();

        if let Some(path) = multiplexer.read_app_path(&shared_parts, app) {
            tracing::debug!(app, path = %path, "Restoring app path from shared URL");
            if let Err(e) = location.update_from_path(&path) {
                location.report(&e);
            }
            return;
        }

        let host = self.shared.host();
        let current = host.state();
        let partitions = self.shared.partitions();
        let state = partitions.set(app, &current, partitions.get(app, &current));
        let multiplexed = multiplexer.write_app_path(&shared_parts, app, &location.parts());
        tracing::debug!(app, full_path = %multiplexed.full_path, "First-time attach");
        host.replace_state(state, None, Some(&multiplexed.full_path));
    }

    /// Tear down `location`'s footprint in the shared URL and shared state.
    pub fn clear(&self, location: &VirtualLocation) {
        let app = location.app();
        location.reset_to_base();

        let host = self.shared.host();
        let state = self.shared.partitions().delete(app, &host.state());
        let full_path = self
            .shared
            .multiplexer()
            .remove_app_path(&self.shared.shared_parts(), app);
        tracing::debug!(app, full_path = %full_path, "Cleared app from shared URL");
        host.replace_state(state, None, Some(&full_path));
    }

    /// Drop the app's pair from the route table.
    pub fn destroy(&self, app: &str) -> Option<MicroRouter> {
        let removed = self.routes.remove(app).map(|(_, router)| router);
        if removed.is_some() {
            tracing::debug!(app, "Destroyed app router");
        }
        removed
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("apps", &self.apps())
            .field("attached", &self.broadcaster.is_attached())
            .finish()
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.broadcaster.detach();
    }
}
