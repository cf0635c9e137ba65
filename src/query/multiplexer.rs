//! Per-app path entries inside the shared URL.
//!
//! # Responsibilities
//! - Read an app's encoded path from the hash-query or the search
//! - Write an app's path, choosing hash-route or query-route storage
//! - Remove an app's entry and tidy the separator it leaves behind
//!
//! # Design Decisions
//! - Mode is decided per snapshot: hash-route iff hash is set and search is not
//! - Only the touched side (search or hash-query) is re-serialized
//! - Entries that belong to the host or other apps are never decoded

use crate::codec;
use crate::host::UrlParts;
use crate::observability::metrics;
use crate::query::parse::{parse_query, stringify_query, QueryEntries, QueryValue};

/// Query entries found in the shared URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedQuery {
    /// Entries of `search`, when it carries anything beyond `?`.
    pub search: Option<QueryEntries>,
    /// Entries after the first `?` inside `hash`.
    pub hash: Option<QueryEntries>,
}

/// Outcome of writing an app's path into the shared URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplexedPath {
    /// `pathname + search + hash` of the rewritten shared URL.
    pub full_path: String,
    /// The entry was stored in the hash-query rather than the search.
    pub attached_to_hash: bool,
}

/// Reads and writes `<prefix><app>=<encoded path>` entries.
#[derive(Debug, Clone)]
pub struct QueryMultiplexer {
    prefix: String,
}

impl QueryMultiplexer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Key under which `app` stores its path.
    pub fn key(&self, app: &str) -> String {
        format!("{}{}", self.prefix, app)
    }

    /// Split the shared URL's search and hash-query into entries.
    pub fn parse_shared_url(shared: &UrlParts) -> SharedQuery {
        let mut query = SharedQuery::default();

        if !shared.search.is_empty() && shared.search != "?" {
            query.search = Some(parse_query(&shared.search[1..]));
        }

        if let Some(pos) = shared.hash.find('?') {
            query.hash = Some(parse_query(&shared.hash[pos + 1..]));
        }

        query
    }

    /// Decoded path recorded for `app`, hash-query first.
    pub fn read_app_path(&self, shared: &UrlParts, app: &str) -> Option<String> {
        let key = self.key(app);
        let query = Self::parse_shared_url(shared);

        let lookup = |entries: &Option<QueryEntries>| {
            entries
                .as_ref()
                .and_then(|entries| entries.get(&key))
                .and_then(|value| value.first_value().map(str::to_string))
        };

        lookup(&query.hash)
            .or_else(|| lookup(&query.search))
            .map(|token| codec::decode(&token))
    }

    /// Store `target` as `app`'s path and return the rewritten shared path.
    pub fn write_app_path(&self, shared: &UrlParts, app: &str, target: &UrlParts) -> MultiplexedPath {
        let key = self.key(app);
        let encoded = codec::encode(&target.full_path());
        let query = Self::parse_shared_url(shared);
        let mut parts = shared.clone();

        let attached_to_hash = !shared.hash.is_empty() && shared.search.is_empty();
        if attached_to_hash {
            let mut entries = query.hash.unwrap_or_default();
            entries.set(&key, encoded);
            let base = match shared.hash.find('?') {
                Some(pos) => shared.hash[..=pos].to_string(),
                None => format!("{}?", shared.hash),
            };
            parts.hash = base + &stringify_query(&entries);
        } else {
            let mut entries = query.search.unwrap_or_default();
            entries.set(&key, encoded);
            parts.search = format!("?{}", stringify_query(&entries));
        }

        let full_path = parts.full_path();
        metrics::record_url_write(if attached_to_hash { "hash" } else { "query" });
        tracing::debug!(app, %full_path, attached_to_hash, "Multiplexed app path");

        MultiplexedPath {
            full_path,
            attached_to_hash,
        }
    }

    /// Drop `app`'s entry and return the rewritten shared path.
    pub fn remove_app_path(&self, shared: &UrlParts, app: &str) -> String {
        let key = self.key(app);
        let query = Self::parse_shared_url(shared);
        let mut parts = shared.clone();

        if let Some(mut entries) = query.hash.filter(|e| holds_entry(e, &key)) {
            entries.remove(&key);
            let rest = stringify_query(&entries);
            let pos = shared.hash.find('?').unwrap_or(shared.hash.len());
            let keep = if rest.is_empty() { pos } else { pos + 1 };
            parts.hash = format!("{}{}", &shared.hash[..keep], rest);
        } else if let Some(mut entries) = query.search.filter(|e| holds_entry(e, &key)) {
            entries.remove(&key);
            let rest = stringify_query(&entries);
            parts.search = if rest.is_empty() {
                String::new()
            } else {
                format!("?{rest}")
            };
        }

        parts.full_path()
    }
}

fn holds_entry(entries: &QueryEntries, key: &str) -> bool {
    match entries.get(key) {
        Some(QueryValue::Multi(_)) => true,
        Some(single) => single.first_value().is_some(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mux() -> QueryMultiplexer {
        QueryMultiplexer::new("app-")
    }

    #[test]
    fn test_write_query_mode() {
        let shared = UrlParts::new("/home", "", "");
        let out = mux().write_app_path(&shared, "sub1", &UrlParts::new("/detail", "", ""));
        assert_eq!(out.full_path, "/home?app-sub1=%2Fdetail");
        assert!(!out.attached_to_hash);
    }

    #[test]
    fn test_write_keeps_host_params() {
        let shared = UrlParts::new("/home", "?lang=en&debug", "#anchor");
        let out = mux().write_app_path(&shared, "sub1", &UrlParts::new("/a", "?b=1", ""));
        assert_eq!(out.full_path, "/home?lang=en&debug&app-sub1=%2Fa%3Fb%25M21#anchor");
        assert!(!out.attached_to_hash);
    }

    #[test]
    fn test_write_keeps_interleaved_host_repeats() {
        let shared = UrlParts::new("/list", "?tag=a&page=2&tag=b", "");
        let out = mux().write_app_path(&shared, "sub1", &UrlParts::new("/x", "", ""));
        assert_eq!(out.full_path, "/list?tag=a&page=2&tag=b&app-sub1=%2Fx");

        let shared = parts_of(&out.full_path);
        assert_eq!(mux().remove_app_path(&shared, "sub1"), "/list?tag=a&page=2&tag=b");
    }

    #[test]
    fn test_write_overwrites_in_place() {
        let shared = UrlParts::new("/home", "?app-sub1=%2Fold&x=1", "");
        let out = mux().write_app_path(&shared, "sub1", &UrlParts::new("/new", "", ""));
        assert_eq!(out.full_path, "/home?app-sub1=%2Fnew&x=1");
    }

    #[test]
    fn test_write_hash_mode() {
        let shared = UrlParts::new("/", "", "#/dashboard");
        let out = mux().write_app_path(&shared, "sub1", &UrlParts::new("/detail", "", ""));
        assert_eq!(out.full_path, "/#/dashboard?app-sub1=%2Fdetail");
        assert!(out.attached_to_hash);

        let shared = UrlParts::new("/", "", "#/dashboard?tab=2");
        let out = mux().write_app_path(&shared, "sub1", &UrlParts::new("/detail", "", ""));
        assert_eq!(out.full_path, "/#/dashboard?tab=2&app-sub1=%2Fdetail");
    }

    #[test]
    fn test_read_prefers_hash() {
        let shared = UrlParts::new("/", "", "#/x?app-sub1=%2Ffrom-hash");
        assert_eq!(mux().read_app_path(&shared, "sub1").as_deref(), Some("/from-hash"));

        let shared = UrlParts::new("/", "?app-sub1=%2Ffrom-search", "#/x?app-sub1=%2Ffrom-hash");
        assert_eq!(mux().read_app_path(&shared, "sub1").as_deref(), Some("/from-hash"));

        let shared = UrlParts::new("/", "?app-sub1=%2Ffrom-search", "#/x?app-sub1=");
        assert_eq!(mux().read_app_path(&shared, "sub1").as_deref(), Some("/from-search"));
    }

    #[test]
    fn test_read_absent() {
        let shared = UrlParts::new("/home", "?app-other=%2F", "");
        assert_eq!(mux().read_app_path(&shared, "sub1"), None);
        assert_eq!(mux().read_app_path(&UrlParts::new("/", "?", ""), "sub1"), None);
    }

    #[test]
    fn test_remove_from_search() {
        let shared = UrlParts::new("/home", "?x=1&app-sub1=%2Fa", "#top");
        assert_eq!(mux().remove_app_path(&shared, "sub1"), "/home?x=1#top");

        let shared = UrlParts::new("/home", "?app-sub1=%2Fa", "");
        assert_eq!(mux().remove_app_path(&shared, "sub1"), "/home");
    }

    #[test]
    fn test_remove_last_hash_entry_strips_question_mark() {
        let shared = UrlParts::new("/", "", "#/page?app-sub1=%2Fa");
        assert_eq!(mux().remove_app_path(&shared, "sub1"), "/#/page");

        let shared = UrlParts::new("/", "", "#/page?k=v&app-sub1=%2Fa");
        assert_eq!(mux().remove_app_path(&shared, "sub1"), "/#/page?k=v");
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let shared = UrlParts::new("/home", "?x=%2F1", "#h");
        assert_eq!(mux().remove_app_path(&shared, "sub1"), "/home?x=%2F1#h");
    }

    #[test]
    fn test_apps_do_not_interfere() {
        let m = mux();
        let shared = UrlParts::new("/home", "", "");
        let a = m.write_app_path(&shared, "a", &UrlParts::new("/a", "?q=1", ""));
        let shared = parts_of(&a.full_path);
        let b = m.write_app_path(&shared, "b", &UrlParts::new("/b", "", "#x"));
        let shared = parts_of(&b.full_path);
        let after = parts_of(&m.remove_app_path(&shared, "a"));

        assert_eq!(after.search, "?app-b=%2Fb%23x");
        assert_eq!(m.read_app_path(&after, "b").as_deref(), Some("/b#x"));
        assert_eq!(m.read_app_path(&after, "a"), None);
    }

    fn parts_of(path: &str) -> UrlParts {
        let url = url::Url::parse("http://host").unwrap().join(path).unwrap();
        UrlParts::from_url(&url)
    }
}
