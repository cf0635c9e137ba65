//! Per-app virtual location.
//!
//! # Responsibilities
//! - Hold the app's shadow location (its logical URL, decoded)
//! - Translate field writes into multiplexed shared-URL writes
//! - Decide per write between reload, synthetic navigation, or nothing
//!
//! # Decision Rules
//! ```text
//! href     same pathname+search: push if hash moved, then
//!                                event if hash set, reload if hash empty
//!          otherwise:            push, reload
//! pathname same pathname and app has a hash: event
//!          otherwise:            replace if pathname same else push, reload
//! search   same search and app has a hash: event
//!          otherwise:            replace if search same else push, reload
//! hash     hash moved:           push, event
//! ```
//!
//! # Design Decisions
//! - The shadow is only changed by authoritative updates (broadcaster,
//!   history, facade); setters ask the host and let the resulting
//!   notification flow back
//! - Shared state is passed through unchanged on every URL write
//! - No lock is held while the host is called, since the host may notify
//!   synchronously

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use url::Url;

use crate::config::HashReloadPolicy;
use crate::host::{NavigationEvent, SharedNavigationState, UrlParts};
use crate::observability::metrics;
use crate::router::error::RouterError;

/// How a rewritten URL enters the host history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HistoryMethod {
    Push,
    Replace,
}

struct LocationInner {
    app: String,
    base: Url,
    shared: SharedNavigationState,
    current: RwLock<Url>,
}

/// Location object handed to one child app.
#[derive(Clone)]
pub struct VirtualLocation {
    inner: Arc<LocationInner>,
}

impl VirtualLocation {
    /// Create a location positioned at `base`.
    pub fn new(app: impl Into<String>, base: Url, shared: SharedNavigationState) -> Self {
        Self {
            inner: Arc::new(LocationInner {
                app: app.into(),
                current: RwLock::new(base.clone()),
                base,
                shared,
            }),
        }
    }

    pub fn app(&self) -> &str {
        &self.inner.app
    }

    pub fn base(&self) -> &Url {
        &self.inner.base
    }

    // --- Getters ---

    pub fn url(&self) -> Url {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn parts(&self) -> UrlParts {
        UrlParts::from_url(&self.url())
    }

    pub fn href(&self) -> String {
        self.url().to_string()
    }

    pub fn pathname(&self) -> String {
        self.parts().pathname
    }

    pub fn search(&self) -> String {
        self.parts().search
    }

    pub fn hash(&self) -> String {
        self.parts().hash
    }

    pub fn origin(&self) -> String {
        self.inner.base.origin().ascii_serialization()
    }

    pub fn protocol(&self) -> String {
        format!("{}:", self.url().scheme())
    }

    pub fn hostname(&self) -> String {
        self.url().host_str().unwrap_or_default().to_string()
    }

    pub fn port(&self) -> String {
        self.url().port().map(|p| p.to_string()).unwrap_or_default()
    }

    pub fn host(&self) -> String {
        let url = self.url();
        let hostname = url.host_str().unwrap_or_default();
        match url.port() {
            Some(port) => format!("{hostname}:{port}"),
            None => hostname.to_string(),
        }
    }

    // --- Setters ---

    pub fn set_href(&self, value: &str) {
        let host = self.inner.shared.host();
        let target = match self.resolve(value) {
            Ok(target) => target,
            Err(e) => {
                self.report(&e);
                host.assign(value);
                return;
            }
        };

        if !self.is_same_origin(&target) {
            host.assign(value);
            return;
        }

        let current = self.parts();
        let target = UrlParts::from_url(&target);

        if target.pathname == current.pathname && target.search == current.search {
            if target.hash != current.hash {
                let full_path = self.multiplex(&target).full_path;
                self.write_shared(HistoryMethod::Push, &full_path);
            }
            let reload = target.hash.is_empty()
                && self.inner.shared.hash_policy() == HashReloadPolicy::ReloadWhenEmpty;
            if reload {
                self.force_reload();
            } else {
                self.synthesize_navigation();
            }
        } else {
            let full_path = self.multiplex(&target).full_path;
            self.write_shared(HistoryMethod::Push, &full_path);
            self.force_reload();
        }
    }

    /// Field setters have no host-level fallback: a value that cannot be
    /// resolved is reported and dropped.
    pub fn set_pathname(&self, value: &str) {
        let current = self.parts();
        let path = format!(
            "/{}{}{}",
            value.trim_start_matches('/'),
            current.search,
            current.hash
        );
        let Some(target) = self.resolve_or_report(&path) else {
            return;
        };

        if target.pathname == current.pathname && !current.hash.is_empty() {
            self.synthesize_navigation();
        } else {
            let method = if target.pathname == current.pathname {
                HistoryMethod::Replace
            } else {
                HistoryMethod::Push
            };
            let full_path = self.multiplex(&target).full_path;
            self.write_shared(method, &full_path);
            self.force_reload();
        }
    }

    pub fn set_search(&self, value: &str) {
        let current = self.parts();
        let path = format!(
            "{}?{}{}",
            current.pathname,
            value.trim_start_matches('?'),
            current.hash
        );
        let Some(target) = self.resolve_or_report(&path) else {
            return;
        };

        if target.search == current.search && !current.hash.is_empty() {
            self.synthesize_navigation();
        } else {
            let method = if target.search == current.search {
                HistoryMethod::Replace
            } else {
                HistoryMethod::Push
            };
            let full_path = self.multiplex(&target).full_path;
            self.write_shared(method, &full_path);
            self.force_reload();
        }
    }

    pub fn set_hash(&self, value: &str) {
        let current = self.parts();
        let path = format!(
            "{}{}#{}",
            current.pathname,
            current.search,
            value.trim_start_matches('#')
        );
        let Some(target) = self.resolve_or_report(&path) else {
            return;
        };

        if target.hash != current.hash {
            let full_path = self.multiplex(&target).full_path;
            self.write_shared(HistoryMethod::Push, &full_path);
            self.synthesize_navigation();
        }
    }

    // --- Whole-page navigation ---

    pub fn assign(&self, url: &str) {
        self.inner.shared.host().assign(url);
    }

    pub fn replace(&self, url: &str) {
        self.inner.shared.host().replace(url);
    }

    pub fn reload(&self, forced: bool) {
        self.inner.shared.host().reload(forced);
    }

    // --- Authoritative updates ---

    /// Move the shadow location to `path`, resolved against the base URL.
    pub fn update_from_path(&self, path: &str) -> Result<(), RouterError> {
        let next = self.resolve(path)?;
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    /// Move the shadow location back to the base URL.
    pub fn reset_to_base(&self) {
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = self.inner.base.clone();
    }

    // --- Internals shared with history and facade ---

    pub(crate) fn resolve(&self, target: &str) -> Result<Url, RouterError> {
        self.inner
            .base
            .join(target)
            .map_err(|source| RouterError::UrlResolution {
                app: self.inner.app.clone(),
                target: target.to_string(),
                source,
            })
    }

    pub(crate) fn is_same_origin(&self, target: &Url) -> bool {
        target.origin() == self.inner.base.origin()
    }

    pub(crate) fn report(&self, error: &RouterError) {
        metrics::record_resolution_failure(&self.inner.app);
        tracing::error!(app = %self.inner.app, error = %error, "Navigation not multiplexed");
    }

    fn resolve_or_report(&self, path: &str) -> Option<UrlParts> {
        match self.resolve(path) {
            Ok(url) => Some(UrlParts::from_url(&url)),
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    fn multiplex(&self, target: &UrlParts) -> crate::query::MultiplexedPath {
        let shared = &self.inner.shared;
        shared
            .multiplexer()
            .write_app_path(&shared.shared_parts(), &self.inner.app, target)
    }

    fn write_shared(&self, method: HistoryMethod, full_path: &str) {
        let host = self.inner.shared.host();
        let state = host.state();
        match method {
            HistoryMethod::Push => host.push_state(state, None, Some(full_path)),
            HistoryMethod::Replace => host.replace_state(state, None, Some(full_path)),
        }
    }

    fn force_reload(&self) {
        metrics::record_reload(&self.inner.app);
        tracing::debug!(app = %self.inner.app, "Location write forces reload");
        self.inner.shared.host().reload(false);
    }

    fn synthesize_navigation(&self) {
        metrics::record_synthetic_navigation(&self.inner.app);
        tracing::debug!(app = %self.inner.app, "Location write emits navigation event");
        let host = self.inner.shared.host();
        host.dispatch_navigation(NavigationEvent::new(host.state()));
    }
}

impl fmt::Debug for VirtualLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualLocation")
            .field("app", &self.inner.app)
            .field("href", &self.href())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MuxConfig;
    use crate::host::{HostOp, MemoryHost, NavigationHost};
    use crate::observability::metrics::testing::CountingRecorder;
    use serde_json::{json, Value};

    fn setup(shared_url: &str, config: &MuxConfig) -> (Arc<MemoryHost>, VirtualLocation) {
        let host = Arc::new(MemoryHost::new(shared_url).unwrap());
        let shared = SharedNavigationState::new(host.clone(), config);
        let base = Url::parse("http://localhost:3001/").unwrap();
        (host, VirtualLocation::new("sub1", base, shared))
    }

    fn default_setup(shared_url: &str) -> (Arc<MemoryHost>, VirtualLocation) {
        setup(shared_url, &MuxConfig::default())
    }

    #[test]
    fn test_getters_follow_shadow() {
        let (_, location) = default_setup("http://localhost:3000/home");
        location.update_from_path("/detail?id=1#top").unwrap();
        assert_eq!(location.href(), "http://localhost:3001/detail?id=1#top");
        assert_eq!(location.pathname(), "/detail");
        assert_eq!(location.search(), "?id=1");
        assert_eq!(location.hash(), "#top");
        assert_eq!(location.origin(), "http://localhost:3001");
        assert_eq!(location.host(), "localhost:3001");
        assert_eq!(location.hostname(), "localhost");
        assert_eq!(location.port(), "3001");
        assert_eq!(location.protocol(), "http:");
    }

    #[test]
    fn test_set_pathname_pushes_and_reloads() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.set_pathname("detail");

        assert_eq!(host.url(), "http://localhost:3000/home?app-sub1=%2Fdetail");
        assert_eq!(host.reload_count(), 1);
        assert!(matches!(host.journal()[0], HostOp::Push { .. }));
        // Shadow waits for an authoritative update
        assert_eq!(location.pathname(), "/");
    }

    #[test]
    fn test_set_pathname_same_value_replaces() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.set_pathname("///");

        assert!(matches!(host.journal()[0], HostOp::Replace { .. }));
        assert_eq!(host.length(), 1);
        assert_eq!(host.reload_count(), 1);
    }

    #[test]
    fn test_set_pathname_same_value_with_hash_emits_event() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.update_from_path("/page#anchor").unwrap();
        location.set_pathname("/page");

        assert_eq!(host.reload_count(), 0);
        assert_eq!(host.journal(), vec![HostOp::Navigation { state: Value::Null }]);
    }

    #[test]
    fn test_set_search() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.update_from_path("/list").unwrap();
        location.set_search("??page=2");

        assert_eq!(host.url(), "http://localhost:3000/home?app-sub1=%2Flist%3Fpage%25M22");
        assert_eq!(host.reload_count(), 1);
    }

    #[test]
    fn test_set_hash_pushes_and_emits_event() {
        let (host, location) = default_setup("http://localhost:3000/home?app-sub1=%2Fdetail");
        location.update_from_path("/detail").unwrap();
        location.set_hash("top");

        assert_eq!(host.url(), "http://localhost:3000/home?app-sub1=%2Fdetail%23top");
        assert_eq!(host.reload_count(), 0);
        let journal = host.journal();
        assert!(matches!(journal[0], HostOp::Push { .. }));
        assert!(matches!(journal[1], HostOp::Navigation { .. }));
    }

    #[test]
    fn test_set_hash_unchanged_is_noop() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.update_from_path("/detail#top").unwrap();
        location.set_hash("#top");
        assert!(host.journal().is_empty());
    }

    #[test]
    fn test_set_href_hash_only() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.update_from_path("/detail").unwrap();
        location.set_href("/detail#section");

        assert_eq!(host.url(), "http://localhost:3000/home?app-sub1=%2Fdetail%23section");
        assert_eq!(host.reload_count(), 0);
        assert!(matches!(host.journal()[1], HostOp::Navigation { .. }));
    }

    #[test]
    fn test_set_href_clearing_hash_reloads() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.update_from_path("/detail#section").unwrap();
        location.set_href("/detail");
        assert_eq!(host.reload_count(), 1);
        assert_eq!(host.url(), "http://localhost:3000/home?app-sub1=%2Fdetail");
    }

    #[test]
    fn test_set_href_clearing_hash_never_reload_policy() {
        let mut config = MuxConfig::default();
        config.navigation.hash_reload_policy = HashReloadPolicy::NeverReload;
        let (host, location) = setup("http://localhost:3000/home", &config);
        location.update_from_path("/detail#section").unwrap();
        location.set_href("/detail");

        assert_eq!(host.reload_count(), 0);
        assert!(matches!(host.journal()[1], HostOp::Navigation { .. }));
    }

    #[test]
    fn test_set_href_new_path_reloads() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.set_href("http://localhost:3001/other?x=1");
        assert_eq!(host.url(), "http://localhost:3000/home?app-sub1=%2Fother%3Fx%25M21");
        assert_eq!(host.reload_count(), 1);
    }

    #[test]
    fn test_set_href_cross_origin_passes_through() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.set_href("https://example.com/away");
        assert_eq!(
            host.journal(),
            vec![HostOp::Assign { url: "https://example.com/away".into() }]
        );
    }

    #[test]
    fn test_hash_mode_attach() {
        let (host, location) = default_setup("http://localhost:3000/#/dashboard");
        location.set_pathname("/detail");
        assert_eq!(host.url(), "http://localhost:3000/#/dashboard?app-sub1=%2Fdetail");
        assert_eq!(host.reload_count(), 1);
    }

    #[test]
    fn test_location_writes_preserve_shared_state() {
        let (host, location) = default_setup("http://localhost:3000/home");
        host.replace_state(json!({"microAppState": {"sub2": {"k": 1}}}), None, None);
        location.set_pathname("/detail");
        assert_eq!(host.state(), json!({"microAppState": {"sub2": {"k": 1}}}));
    }

    #[test]
    fn test_unresolvable_href_is_delegated() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.set_href("http://[oops");

        assert_eq!(
            host.journal(),
            vec![HostOp::Rejected {
                method: "assign".into(),
                url: "http://[oops".into(),
                title: None,
                state: Value::Null,
            }]
        );
        assert_eq!(location.pathname(), "/");
        assert!(location.update_from_path("http://[oops").is_err());
    }

    #[test]
    fn test_set_href_identical_url_writes_nothing() {
        let (host, location) = default_setup("http://localhost:3000/home?app-sub1=%2Fd%23x");
        location.update_from_path("/d#x").unwrap();

        let recorder = CountingRecorder::default();
        ::metrics::with_local_recorder(&recorder, || location.set_href("/d#x"));

        assert_eq!(recorder.total("navmux_url_writes_total"), 0);
        assert_eq!(recorder.total("navmux_synthetic_navigations_total"), 1);
        assert_eq!(host.journal(), vec![HostOp::Navigation { state: Value::Null }]);
    }

    #[test]
    fn test_set_href_new_path_counts_one_write() {
        let (_, location) = default_setup("http://localhost:3000/home");

        let recorder = CountingRecorder::default();
        ::metrics::with_local_recorder(&recorder, || location.set_href("/other"));

        assert_eq!(recorder.total("navmux_url_writes_total"), 1);
        assert_eq!(recorder.total("navmux_reloads_total"), 1);
    }

    #[test]
    fn test_unresolvable_pathname_is_reported_and_dropped() {
        let (host, location) = default_setup("http://localhost:3000/home");

        let recorder = CountingRecorder::default();
        ::metrics::with_local_recorder(&recorder, || location.set_pathname("\\[oops"));

        assert_eq!(recorder.total("navmux_resolution_failures_total"), 1);
        assert_eq!(recorder.total("navmux_url_writes_total"), 0);
        assert!(host.journal().is_empty());
        assert_eq!(host.reload_count(), 0);
        assert_eq!(location.pathname(), "/");
    }

    #[test]
    fn test_delegates_whole_page_navigation() {
        let (host, location) = default_setup("http://localhost:3000/home");
        location.assign("/a");
        location.replace("/b");
        location.reload(true);
        assert_eq!(
            host.journal(),
            vec![
                HostOp::Assign { url: "http://localhost:3000/a".into() },
                HostOp::ReplaceLocation { url: "http://localhost:3000/b".into() },
                HostOp::Reload { forced: true },
            ]
        );
    }

    #[test]
    fn test_reset_to_base() {
        let (_, location) = default_setup("http://localhost:3000/home");
        location.update_from_path("/x?y#z").unwrap();
        location.reset_to_base();
        assert_eq!(location.href(), "http://localhost:3001/");
    }
}
