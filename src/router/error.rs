//! Router error types.

use thiserror::Error;

/// Errors raised while building or driving an app's router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The app's own base URL is not an absolute URL.
    #[error("invalid base URL '{url}' for app {app}: {source}")]
    InvalidBaseUrl {
        app: String,
        url: String,
        source: url::ParseError,
    },

    /// A navigation target could not be resolved against the app's base URL.
    #[error("app {app} cannot resolve '{target}': {source}")]
    UrlResolution {
        app: String,
        target: String,
        source: url::ParseError,
    },
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;
