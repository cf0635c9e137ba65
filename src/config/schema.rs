//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! multiplexer. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MuxConfig {
    /// Keys used inside the shared URL and shared state.
    pub naming: NamingConfig,

    /// Reload decisions for location writes.
    pub navigation: NavigationConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Names of the multiplexed entries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Prefix of each app's query key (`<prefix><app>`).
    pub query_prefix: String,

    /// Top-level history-state field holding app partitions.
    pub state_key: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            query_prefix: "app-".to_string(),
            state_key: "microAppState".to_string(),
        }
    }
}

/// What a hash-only `href` write does once the shared URL is updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashReloadPolicy {
    /// Reload when the new hash is empty, otherwise emit a navigation event.
    #[default]
    ReloadWhenEmpty,
    /// Always emit a navigation event.
    NeverReload,
}

/// Navigation behaviour settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub hash_reload_policy: HashReloadPolicy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty output for terminals, JSON for log collectors.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MuxConfig::default();
        assert_eq!(config.naming.query_prefix, "app-");
        assert_eq!(config.naming.state_key, "microAppState");
        assert_eq!(config.navigation.hash_reload_policy, HashReloadPolicy::ReloadWhenEmpty);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_toml() {
        let config: MuxConfig = toml::from_str(
            r#"
            [navigation]
            hash_reload_policy = "never_reload"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.navigation.hash_reload_policy, HashReloadPolicy::NeverReload);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.naming.query_prefix, "app-");
    }
}
