//! Per-app partitions of the shared history state.

use serde_json::{Map, Value};

/// Reads and writes app partitions under one reserved top-level key.
#[derive(Debug, Clone)]
pub struct StatePartitions {
    key: String,
}

impl StatePartitions {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Reserved top-level field holding the partitions.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Copy of `shared` with `app`'s partition set to `app_state`.
    pub fn set(&self, app: &str, shared: &Value, app_state: Value) -> Value {
        let mut root = as_object(shared);
        let mut partitions = root
            .get(&self.key)
            .map(as_object)
            .unwrap_or_default();
        partitions.insert(app.to_string(), app_state);
        root.insert(self.key.clone(), Value::Object(partitions));
        Value::Object(root)
    }

    /// `app`'s partition, or `Null` when it has none.
    pub fn get(&self, app: &str, shared: &Value) -> Value {
        shared
            .get(&self.key)
            .and_then(|partitions| partitions.get(app))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Copy of `shared` without `app`'s partition. State that holds no
    /// partition mapping comes back unchanged.
    pub fn delete(&self, app: &str, shared: &Value) -> Value {
        let mut result = shared.clone();
        if let Some(Value::Object(partitions)) = result
            .as_object_mut()
            .and_then(|root| root.get_mut(&self.key))
        {
            partitions.remove(app);
        }
        result
    }
}

fn as_object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}
