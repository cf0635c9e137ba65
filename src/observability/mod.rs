//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, `app` field on every app-scoped line)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → whatever metrics recorder the embedder installs
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
