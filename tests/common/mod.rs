//! Shared fixtures for integration tests.

use std::sync::{Arc, Mutex};

use url::Url;

use navmux::config::MuxConfig;
use navmux::host::{AppEvent, MemoryHost, SharedNavigationState};
use navmux::registry::{AppRecord, MemoryRegistry};
use navmux::router::{MicroRouter, Router};

/// A host, a registry and a router wired together.
pub struct Harness {
    pub host: Arc<MemoryHost>,
    pub registry: MemoryRegistry,
    pub router: Router,
}

/// Build a harness with default naming and reload policy.
pub fn harness(shared_url: &str) -> Harness {
    harness_with(shared_url, &MuxConfig::default())
}

pub fn harness_with(shared_url: &str, config: &MuxConfig) -> Harness {
    let host = Arc::new(MemoryHost::new(shared_url).unwrap());
    let shared = SharedNavigationState::new(host.clone(), config);
    let registry = MemoryRegistry::new();
    let router = Router::new(shared, Arc::new(registry.clone()));
    Harness {
        host,
        registry,
        router,
    }
}

/// Events delivered through an app's direct callbacks.
pub type EventLog = Arc<Mutex<Vec<AppEvent>>>;

impl Harness {
    /// Register `app`, create its router and sync it with the shared URL.
    pub fn mount(&self, app: &str, base: &str, active: bool) -> (MicroRouter, EventLog) {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let on_nav = log.clone();
        let on_hash = log.clone();
        let record = AppRecord::new(app, Url::parse(base).unwrap())
            .with_navigation_callback(Arc::new(move |e: &AppEvent| {
                on_nav.lock().unwrap().push(e.clone())
            }))
            .with_hash_callback(Arc::new(move |e: &AppEvent| {
                on_hash.lock().unwrap().push(e.clone())
            }));
        self.registry.register(record);
        self.registry.set_active(app, active);

        let pair = self.router.create(app, base).unwrap();
        self.router.init_with_shared_url(&pair.location);
        (pair, log)
    }

    /// Names of app events seen by the host, in dispatch order.
    #[allow(dead_code)]
    pub fn event_names(&self) -> Vec<String> {
        self.host.app_events().iter().map(AppEvent::name).collect()
    }
}
