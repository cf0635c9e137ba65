//! Shared history-state partitioning.
//!
//! # Data Flow
//! ```text
//! shared state { ...host fields, "<state_key>": { app: state, ... } }
//!     → partition.rs set / get / delete one app's value
//!     → new shared state (input left untouched)
//! ```
//!
//! # Design Decisions
//! - Every write returns a fresh value so callers can detect no-op pushes
//! - Unrelated top-level fields and other apps' partitions are carried over verbatim
//! - A non-object shared state is treated as an empty object

pub mod partition;

pub use partition::StatePartitions;
