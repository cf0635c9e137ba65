//! In-memory navigation host.
//!
//! # Responsibilities
//! - Keep one session history stack of `{url, state}` entries
//! - Record every operation so callers can inspect what a child triggered
//! - Deliver navigation notifications synchronously to subscribers
//!
//! # Design Decisions
//! - `push_state`/`replace_state` never notify, matching browser semantics
//! - `go` notifies only when the target entry exists
//! - Listeners run with no internal lock held, so they may call back in
//! - A URL the host cannot resolve is journaled as `Rejected` with the
//!   arguments it arrived with, and history is left alone

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::host::{AppEvent, NavigationEvent, NavigationHost, NavigationListener, SubscriptionId};

/// One entry of the session history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub url: String,
    pub state: Value,
}

/// Journal record of a host operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostOp {
    Push { url: String, state: Value },
    Replace { url: String, state: Value },
    Assign { url: String },
    ReplaceLocation { url: String },
    Reload { forced: bool },
    Go { delta: i64 },
    Navigation { state: Value },
    /// A call whose URL the host could not resolve, with its arguments as
    /// received.
    Rejected {
        method: String,
        url: String,
        title: Option<String>,
        state: Value,
    },
}

#[derive(Debug)]
struct StoredEntry {
    url: Url,
    state: Value,
}

#[derive(Debug)]
struct HostInner {
    entries: Vec<StoredEntry>,
    index: usize,
    journal: Vec<HostOp>,
    app_events: Vec<AppEvent>,
    reloads: usize,
    limit: Option<usize>,
}

/// A [`NavigationHost`] backed by plain memory.
///
/// The operation journal and the app event log grow with every call unless
/// a cap is set with [`MemoryHost::with_journal_limit`]; long-lived
/// embedders should set one or call [`MemoryHost::clear_journal`].
pub struct MemoryHost {
    inner: Mutex<HostInner>,
    listeners: Mutex<Vec<(SubscriptionId, NavigationListener)>>,
    next_id: AtomicU64,
}

impl MemoryHost {
    /// Create a host whose address bar starts at `initial_url`.
    pub fn new(initial_url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(initial_url)?;
        Ok(Self {
            inner: Mutex::new(HostInner {
                entries: vec![StoredEntry {
                    url,
                    state: Value::Null,
                }],
                index: 0,
                journal: Vec::new(),
                app_events: Vec::new(),
                reloads: 0,
                limit: None,
            }),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Keep only the newest `limit` journal records and app events.
    pub fn with_journal_limit(mut self, limit: usize) -> Self {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.limit = Some(limit);
        trim(&mut inner.journal, limit);
        trim(&mut inner.app_events, limit);
        self
    }

    /// Current address as an absolute string.
    pub fn url(&self) -> String {
        let inner = self.lock();
        inner.entries[inner.index].url.to_string()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock()
            .entries
            .iter()
            .map(|entry| HistoryEntry {
                url: entry.url.to_string(),
                state: entry.state.clone(),
            })
            .collect()
    }

    pub fn index(&self) -> usize {
        self.lock().index
    }

    pub fn journal(&self) -> Vec<HostOp> {
        self.lock().journal.clone()
    }

    /// Forget recorded operations and events, keeping the history stack.
    pub fn clear_journal(&self) {
        let mut inner = self.lock();
        inner.journal.clear();
        inner.app_events.clear();
    }

    pub fn app_events(&self) -> Vec<AppEvent> {
        self.lock().app_events.clone()
    }

    pub fn reload_count(&self) -> usize {
        self.lock().reloads
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_listeners().len()
    }

    fn lock(&self) -> MutexGuard<'_, HostInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, NavigationListener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve `target` against the current entry; `None` keeps the current
    /// URL. An unresolvable target is journaled as rejected.
    fn resolve(
        inner: &mut HostInner,
        method: &str,
        target: Option<&str>,
        title: Option<&str>,
        state: &Value,
    ) -> Option<Url> {
        let current = &inner.entries[inner.index].url;
        let Some(target) = target else {
            return Some(current.clone());
        };
        match current.join(target) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(method, url = target, error = %e, "Host rejected URL");
                Self::record(
                    inner,
                    HostOp::Rejected {
                        method: method.to_string(),
                        url: target.to_string(),
                        title: title.map(str::to_string),
                        state: state.clone(),
                    },
                );
                None
            }
        }
    }

    fn record(inner: &mut HostInner, op: HostOp) {
        inner.journal.push(op);
        if let Some(limit) = inner.limit {
            trim(&mut inner.journal, limit);
        }
    }

    fn push_entry(inner: &mut HostInner, url: Url, state: Value) {
        let keep = inner.index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(StoredEntry { url, state });
        inner.index = keep;
    }
}

fn trim<T>(log: &mut Vec<T>, limit: usize) {
    if log.len() > limit {
        log.drain(..log.len() - limit);
    }
}

impl NavigationHost for MemoryHost {
    fn current_url(&self) -> Url {
        let inner = self.lock();
        inner.entries[inner.index].url.clone()
    }

    fn state(&self) -> Value {
        let inner = self.lock();
        inner.entries[inner.index].state.clone()
    }

    fn push_state(&self, state: Value, title: Option<&str>, url: Option<&str>) {
        let mut inner = self.lock();
        if let Some(url) = Self::resolve(&mut inner, "push_state", url, title, &state) {
            Self::record(&mut inner, HostOp::Push {
                url: url.to_string(),
                state: state.clone(),
            });
            Self::push_entry(&mut inner, url, state);
        }
    }

    fn replace_state(&self, state: Value, title: Option<&str>, url: Option<&str>) {
        let mut inner = self.lock();
        if let Some(url) = Self::resolve(&mut inner, "replace_state", url, title, &state) {
            Self::record(&mut inner, HostOp::Replace {
                url: url.to_string(),
                state: state.clone(),
            });
            let index = inner.index;
            inner.entries[index] = StoredEntry { url, state };
        }
    }

    fn go(&self, delta: i64) {
        let state = {
            let mut inner = self.lock();
            Self::record(&mut inner, HostOp::Go { delta });
            let target = inner.index as i64 + delta;
            if delta == 0 || target < 0 || target >= inner.entries.len() as i64 {
                return;
            }
            inner.index = target as usize;
            inner.entries[inner.index].state.clone()
        };
        self.dispatch_navigation(NavigationEvent::new(state));
    }

    fn length(&self) -> usize {
        self.lock().entries.len()
    }

    fn assign(&self, url: &str) {
        let mut inner = self.lock();
        if let Some(url) = Self::resolve(&mut inner, "assign", Some(url), None, &Value::Null) {
            Self::record(&mut inner, HostOp::Assign { url: url.to_string() });
            Self::push_entry(&mut inner, url, Value::Null);
        }
    }

    fn replace(&self, url: &str) {
        let mut inner = self.lock();
        if let Some(url) = Self::resolve(&mut inner, "replace", Some(url), None, &Value::Null) {
            Self::record(&mut inner, HostOp::ReplaceLocation { url: url.to_string() });
            let index = inner.index;
            inner.entries[index] = StoredEntry {
                url,
                state: Value::Null,
            };
        }
    }

    fn reload(&self, forced: bool) {
        let mut inner = self.lock();
        Self::record(&mut inner, HostOp::Reload { forced });
        inner.reloads += 1;
    }

    fn dispatch_navigation(&self, event: NavigationEvent) {
        Self::record(
            &mut self.lock(),
            HostOp::Navigation {
                state: event.state.clone(),
            },
        );
        let listeners: Vec<NavigationListener> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    fn dispatch_app_event(&self, event: &AppEvent) {
        tracing::trace!(event = %event.name(), "Host received app event");
        let mut inner = self.lock();
        inner.app_events.push(event.clone());
        if let Some(limit) = inner.limit {
            trim(&mut inner.app_events, limit);
        }
    }

    fn subscribe(&self, listener: NavigationListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_listeners().retain(|(existing, _)| *existing != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_push_and_replace() {
        let host = MemoryHost::new("http://localhost/home").unwrap();
        host.push_state(json!({"a": 1}), None, Some("/next?x=1"));
        assert_eq!(host.url(), "http://localhost/next?x=1");
        assert_eq!(host.state(), json!({"a": 1}));
        assert_eq!(host.length(), 2);

        host.replace_state(Value::Null, None, Some("#frag"));
        assert_eq!(host.url(), "http://localhost/next?x=1#frag");
        assert_eq!(host.length(), 2);
        assert_eq!(host.state(), Value::Null);
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let host = MemoryHost::new("http://localhost/").unwrap();
        host.push_state(Value::Null, None, Some("/a"));
        host.push_state(Value::Null, None, Some("/b"));
        host.back();
        host.push_state(Value::Null, None, Some("/c"));
        let urls: Vec<String> = host.entries().into_iter().map(|e| e.url).collect();
        assert_eq!(urls, vec!["http://localhost/", "http://localhost/a", "http://localhost/c"]);
    }

    #[test]
    fn test_go_notifies_subscribers() {
        let host = MemoryHost::new("http://localhost/").unwrap();
        host.push_state(json!(1), None, Some("/a"));

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let id = host.subscribe(Arc::new(move |event: &NavigationEvent| {
            assert_eq!(event.state, Value::Null);
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        host.back();
        assert_eq!(host.url(), "http://localhost/");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Out of range: ignored
        host.go(-5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        host.unsubscribe(id);
        host.forward();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(host.subscriber_count(), 0);
    }

    #[test]
    fn test_listener_may_reenter_host() {
        let host = Arc::new(MemoryHost::new("http://localhost/").unwrap());
        let inner = host.clone();
        host.subscribe(Arc::new(move |_: &NavigationEvent| {
            let _ = inner.current_url();
            inner.replace_state(json!("seen"), None, None);
        }));
        host.dispatch_navigation(NavigationEvent::default());
        assert_eq!(host.state(), json!("seen"));
    }

    #[test]
    fn test_rejected_calls_keep_their_arguments() {
        let host = MemoryHost::new("http://localhost/").unwrap();
        host.push_state(json!({"k": 1}), Some("title"), Some("http://[bad"));
        host.assign("http://[bad");

        assert_eq!(
            host.journal(),
            vec![
                HostOp::Rejected {
                    method: "push_state".into(),
                    url: "http://[bad".into(),
                    title: Some("title".into()),
                    state: json!({"k": 1}),
                },
                HostOp::Rejected {
                    method: "assign".into(),
                    url: "http://[bad".into(),
                    title: None,
                    state: Value::Null,
                },
            ]
        );
        assert_eq!(host.length(), 1);
    }

    #[test]
    fn test_journal_limit_keeps_newest() {
        let host = MemoryHost::new("http://localhost/").unwrap().with_journal_limit(2);
        host.reload(false);
        host.reload(true);
        host.go(0);
        for app in ["a", "b", "c"] {
            host.dispatch_app_event(&AppEvent::NavigationChanged {
                app: app.into(),
                state: Value::Null,
            });
        }

        assert_eq!(
            host.journal(),
            vec![HostOp::Reload { forced: true }, HostOp::Go { delta: 0 }]
        );
        let apps: Vec<String> = host.app_events().iter().map(|e| e.app().to_string()).collect();
        assert_eq!(apps, vec!["b", "c"]);
        assert_eq!(host.reload_count(), 2);
    }

    #[test]
    fn test_reload_and_assign_recorded() {
        let host = MemoryHost::new("http://localhost/").unwrap();
        host.assign("/other");
        host.reload(false);
        assert_eq!(host.reload_count(), 1);
        assert_eq!(
            host.journal(),
            vec![
                HostOp::Assign { url: "http://localhost/other".into() },
                HostOp::Reload { forced: false },
            ]
        );
    }
}
