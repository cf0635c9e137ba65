//! Query multiplexing subsystem.
//!
//! # Data Flow
//! ```text
//! shared URL snapshot (pathname, search, hash)
//!     → parse.rs (search / hash-query → ordered pairs, nothing decoded)
//!     → multiplexer.rs (set / read / drop "<prefix><app>" entry)
//!     → parse.rs (entries → query string)
//!     → rewritten pathname + search + hash
//! ```
//!
//! # Design Decisions
//! - Callers pass a fresh snapshot for every write; nothing is cached
//! - Only the matched app's value passes through the path codec

pub mod multiplexer;
pub mod parse;

pub use multiplexer::{MultiplexedPath, QueryMultiplexer, SharedQuery};
pub use parse::{parse_query, stringify_query, QueryEntries, QueryMap, QueryValue};
