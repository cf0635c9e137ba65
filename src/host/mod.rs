//! Host navigation context.
//!
//! # Data Flow
//! ```text
//! child app ──▶ VirtualLocation / VirtualHistory
//!                 │  (rewritten URL + partitioned state)
//!                 ▼
//!          SharedNavigationState ──▶ NavigationHost (one real URL, one history)
//!                                        │
//!                         navigation changed notification
//!                                        ▼
//!                                   Broadcaster ──▶ app-scoped events
//! ```
//!
//! # Design Decisions
//! - The host is a capability trait; browsers, webviews and tests implement it
//! - Every read of the shared URL goes back to the host, never to a cache
//! - `SharedNavigationState` is the one explicit handle passed to components

pub mod event;
pub mod memory;
pub mod parts;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::config::{HashReloadPolicy, MuxConfig};
use crate::query::QueryMultiplexer;
use crate::state::StatePartitions;

pub use self::event::{AppEvent, NavigationEvent};
pub use self::memory::{HistoryEntry, HostOp, MemoryHost};
pub use self::parts::UrlParts;

/// Callback registered for real navigation notifications.
pub type NavigationListener = Arc<dyn Fn(&NavigationEvent) + Send + Sync>;

/// Handle returned by [`NavigationHost::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The single real navigation context being multiplexed.
pub trait NavigationHost: Send + Sync {
    /// Absolute URL currently shown in the address bar.
    fn current_url(&self) -> Url;

    /// Current history state, `Null` when none was stored.
    fn state(&self) -> Value;

    fn push_state(&self, state: Value, title: Option<&str>, url: Option<&str>);

    fn replace_state(&self, state: Value, title: Option<&str>, url: Option<&str>);

    fn go(&self, delta: i64);

    fn back(&self) {
        self.go(-1);
    }

    fn forward(&self) {
        self.go(1);
    }

    /// Number of entries in the session history.
    fn length(&self) -> usize;

    /// Navigate the whole page to `url`, adding a history entry.
    fn assign(&self, url: &str);

    /// Navigate the whole page to `url`, replacing the current entry.
    fn replace(&self, url: &str);

    fn reload(&self, forced: bool);

    /// Emit a real navigation-changed notification to every subscriber.
    fn dispatch_navigation(&self, event: NavigationEvent);

    /// Deliver an app-scoped synthetic event to host-level listeners.
    fn dispatch_app_event(&self, event: &AppEvent);

    fn subscribe(&self, listener: NavigationListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Process-wide handle to the one shared URL and shared state.
#[derive(Clone)]
pub struct SharedNavigationState {
    host: Arc<dyn NavigationHost>,
    multiplexer: QueryMultiplexer,
    partitions: StatePartitions,
    hash_policy: HashReloadPolicy,
}

impl SharedNavigationState {
    pub fn new(host: Arc<dyn NavigationHost>, config: &MuxConfig) -> Self {
        Self {
            host,
            multiplexer: QueryMultiplexer::new(config.naming.query_prefix.clone()),
            partitions: StatePartitions::new(config.naming.state_key.clone()),
            hash_policy: config.navigation.hash_reload_policy,
        }
    }

    pub fn host(&self) -> &dyn NavigationHost {
        self.host.as_ref()
    }

    pub fn multiplexer(&self) -> &QueryMultiplexer {
        &self.multiplexer
    }

    pub fn partitions(&self) -> &StatePartitions {
        &self.partitions
    }

    pub fn hash_policy(&self) -> HashReloadPolicy {
        self.hash_policy
    }

    /// Fresh snapshot of the shared URL's pathname, search and hash.
    pub fn shared_parts(&self) -> UrlParts {
        UrlParts::from_url(&self.host.current_url())
    }
}

impl fmt::Debug for SharedNavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedNavigationState")
            .field("url", &self.host.current_url().as_str())
            .field("multiplexer", &self.multiplexer)
            .field("partitions", &self.partitions)
            .field("hash_policy", &self.hash_policy)
            .finish()
    }
}
