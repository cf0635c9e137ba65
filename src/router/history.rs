//! Per-app virtual history.
//!
//! Wraps the one real history. `push_state`/`replace_state` are the only
//! members that take a URL, so they are the only ones rewritten: the state
//! argument becomes the full shared state with this app's partition swapped
//! in, and the URL becomes the shared URL with this app's entry rewritten.
//! Everything else is forwarded untouched.

use std::fmt;

use serde_json::Value;

use crate::host::{SharedNavigationState, UrlParts};
use crate::router::location::{HistoryMethod, VirtualLocation};

/// History object handed to one child app.
#[derive(Clone)]
pub struct VirtualHistory {
    shared: SharedNavigationState,
    location: VirtualLocation,
}

impl VirtualHistory {
    pub fn new(shared: SharedNavigationState, location: VirtualLocation) -> Self {
        Self { shared, location }
    }

    pub fn app(&self) -> &str {
        self.location.app()
    }

    /// This app's partition of the shared history state.
    pub fn state(&self) -> Value {
        self.shared
            .partitions()
            .get(self.app(), &self.shared.host().state())
    }

    pub fn push_state(&self, state: Value, title: Option<&str>, url: Option<&str>) {
        self.delegate(HistoryMethod::Push, state, title, url);
    }

    pub fn replace_state(&self, state: Value, title: Option<&str>, url: Option<&str>) {
        self.delegate(HistoryMethod::Replace, state, title, url);
    }

    pub fn go(&self, delta: i64) {
        self.shared.host().go(delta);
    }

    pub fn back(&self) {
        self.shared.host().back();
    }

    pub fn forward(&self) {
        self.shared.host().forward();
    }

    pub fn length(&self) -> usize {
        self.shared.host().length()
    }

    fn delegate(&self, method: HistoryMethod, state: Value, title: Option<&str>, url: Option<&str>) {
        let host = self.shared.host();
        let app = self.app();

        let mut out_state = state;
        let mut out_url = url.map(str::to_string);
        let mut target_path = None;

        match url.filter(|url| !url.is_empty()) {
            Some(raw) => match self.location.resolve(raw) {
                Ok(target) if self.location.is_same_origin(&target) => {
                    let target = UrlParts::from_url(&target);
                    let multiplexed = self.shared.multiplexer().write_app_path(
                        &self.shared.shared_parts(),
                        app,
                        &target,
                    );
                    out_state = self.shared.partitions().set(app, &host.state(), out_state);
                    out_url = Some(multiplexed.full_path);
                    target_path = Some(target.full_path());
                }
                Ok(_) => {
                    tracing::debug!(app, url = raw, "Cross-origin history target left as-is");
                }
                Err(e) => self.location.report(&e),
            },
            None => {
                out_state = self.shared.partitions().set(app, &host.state(), out_state);
            }
        }

        match method {
            HistoryMethod::Push => host.push_state(out_state, title, out_url.as_deref()),
            HistoryMethod::Replace => host.replace_state(out_state, title, out_url.as_deref()),
        }

        if let Some(path) = target_path {
            if let Err(e) = self.location.update_from_path(&path) {
                self.location.report(&e);
            }
        }
    }
}

impl fmt::Debug for VirtualHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualHistory")
            .field("app", &self.app())
            .finish()
    }
}
