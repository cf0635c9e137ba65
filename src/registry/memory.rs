//! DashMap-backed registry for embedders without their own app bookkeeping.

use std::sync::Arc;

use dashmap::DashMap;

use crate::registry::{AppName, AppRecord, AppRegistry};

#[derive(Debug, Clone)]
struct Registration {
    record: AppRecord,
    active: bool,
}

/// A thread-safe registry of app records.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    inner: Arc<DashMap<AppName, Registration>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an app. Newly registered apps start inactive.
    pub fn register(&self, record: AppRecord) {
        let active = self
            .inner
            .get(&record.name)
            .map(|r| r.active)
            .unwrap_or(false);
        self.inner
            .insert(record.name.clone(), Registration { record, active });
    }

    /// Mark an app active or inactive. Returns false for unknown apps.
    pub fn set_active(&self, name: &str, active: bool) -> bool {
        match self.inner.get_mut(name) {
            Some(mut registration) => {
                registration.active = active;
                tracing::debug!(app = name, active, "App activity changed");
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, name: &str) -> Option<AppRecord> {
        self.inner.remove(name).map(|(_, r)| r.record)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl AppRegistry for MemoryRegistry {
    fn is_active(&self, name: &str) -> bool {
        self.inner.get(name).map(|r| r.active).unwrap_or(false)
    }

    fn active_apps(&self) -> Vec<AppName> {
        let mut names: Vec<AppName> = self
            .inner
            .iter()
            .filter(|r| r.value().active)
            .map(|r| r.key().clone())
            .collect();
        names.sort();
        names
    }

    fn app(&self, name: &str) -> Option<AppRecord> {
        self.inner.get(name).map(|r| r.record.clone())
    }
}
