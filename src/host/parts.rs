//! Browser-style decomposition of a URL into pathname, search and hash.

use serde::Serialize;
use url::Url;

/// The `pathname`, `search` and `hash` of a URL as a location object reports
/// them: `search` and `hash` are empty strings when absent or empty, and keep
/// their `?`/`#` prefix otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrlParts {
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl UrlParts {
    pub fn new(
        pathname: impl Into<String>,
        search: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.into(),
            hash: hash.into(),
        }
    }

    pub fn from_url(url: &Url) -> Self {
        Self {
            pathname: url.path().to_string(),
            search: prefixed('?', url.query()),
            hash: prefixed('#', url.fragment()),
        }
    }

    /// `pathname + search + hash`.
    pub fn full_path(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

impl From<&Url> for UrlParts {
    fn from(url: &Url) -> Self {
        Self::from_url(url)
    }
}

fn prefixed(prefix: char, part: Option<&str>) -> String {
    match part {
        Some(value) if !value.is_empty() => format!("{prefix}{value}"),
        _ => String::new(),
    }
}
