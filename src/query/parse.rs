//! Order-preserving query string parsing.
//!
//! Keys and values are kept exactly as they appear in the URL. Nothing is
//! decoded and pairs are never regrouped, so re-serializing a parsed query
//! reproduces the original bytes for every pair the caller did not touch.

use indexmap::IndexMap;

/// Value stored under one query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// `key` (no `=`) is `None`, `key=value` is `Some(value)`.
    Single(Option<String>),
    /// A key that appeared more than once, in order of appearance.
    Multi(Vec<Option<String>>),
}

impl QueryValue {
    /// First non-empty value, if any.
    pub fn first_value(&self) -> Option<&str> {
        match self {
            QueryValue::Single(v) => v.as_deref().filter(|v| !v.is_empty()),
            QueryValue::Multi(values) => values
                .first()
                .and_then(|v| v.as_deref())
                .filter(|v| !v.is_empty()),
        }
    }

    fn push(&mut self, value: Option<String>) {
        match self {
            QueryValue::Multi(values) => values.push(value),
            QueryValue::Single(first) => {
                let first = first.take();
                *self = QueryValue::Multi(vec![first, value]);
            }
        }
    }
}

/// Grouped lookup view: one value per key, keys in first-seen order.
pub type QueryMap = IndexMap<String, QueryValue>;

/// Parsed query pairs in URL order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryEntries {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryEntries {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Every value recorded under `key`, grouped.
    pub fn get(&self, key: &str) -> Option<QueryValue> {
        let mut found: Option<QueryValue> = None;
        for (_, value) in self.pairs.iter().filter(|(k, _)| k == key) {
            match found.as_mut() {
                Some(existing) => existing.push(value.clone()),
                None => found = Some(QueryValue::Single(value.clone())),
            }
        }
        found
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Store `value` at the first position of `key`, dropping later repeats,
    /// or append it when `key` is absent.
    pub fn set(&mut self, key: &str, value: String) {
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                self.pairs[pos].1 = Some(value);
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= pos || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), Some(value))),
        }
    }

    /// Drop every pair under `key`. Returns false when there was none.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| k != key);
        self.pairs.len() != before
    }

    /// Grouped view for lookups.
    pub fn grouped(&self) -> QueryMap {
        let mut map = QueryMap::new();
        for (key, value) in &self.pairs {
            match map.get_mut(key) {
                Some(existing) => existing.push(value.clone()),
                None => {
                    map.insert(key.clone(), QueryValue::Single(value.clone()));
                }
            }
        }
        map
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

/// Parse a query string without its leading `?`. An empty string has no
/// pairs.
pub fn parse_query(query: &str) -> QueryEntries {
    if query.is_empty() {
        return QueryEntries::default();
    }
    let pairs = query
        .split('&')
        .map(|item| match item.find('=') {
            Some(pos) => (item[..pos].to_string(), Some(item[pos + 1..].to_string())),
            None => (item.to_string(), None),
        })
        .collect();
    QueryEntries { pairs }
}

/// Serialize pairs back into a query string without a leading `?`.
pub fn stringify_query(query: &QueryEntries) -> String {
    let mut result = String::new();

    for (index, (key, value)) in query.iter().enumerate() {
        if index > 0 {
            result.push('&');
        }
        result.push_str(key);
        if let Some(value) = value {
            result.push('=');
            result.push_str(value);
        }
    }

    result
}
