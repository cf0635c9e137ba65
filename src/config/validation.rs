//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject names that would collide with query or hash delimiters
//! - Validate the log level
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MuxConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::MuxConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const RESERVED: [char; 4] = ['&', '=', '?', '#'];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("naming.query_prefix must not be empty")]
    EmptyQueryPrefix,

    #[error("naming.query_prefix contains reserved character '{0}'")]
    ReservedCharacter(char),

    #[error("naming.state_key must not be empty")]
    EmptyStateKey,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

/// Check a parsed configuration.
pub fn validate_config(config: &MuxConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let prefix = &config.naming.query_prefix;
    if prefix.is_empty() {
        errors.push(ValidationError::EmptyQueryPrefix);
    }
    if let Some(c) = prefix.chars().find(|c| RESERVED.contains(c)) {
        errors.push(ValidationError::ReservedCharacter(c));
    }

    if config.naming.state_key.is_empty() {
        errors.push(ValidationError::EmptyStateKey);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
