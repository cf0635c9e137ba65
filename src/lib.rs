//! Virtual navigation multiplexer for micro-frontends.
//!
//! Several independently routed child apps share one real URL and one
//! history stack. Each app gets its own virtual location and history; their
//! paths are stored as `app-<name>=<encoded path>` entries in the shared
//! URL, and their history states live in one reserved field of the shared
//! history state.

pub mod codec;
pub mod config;
pub mod host;
pub mod observability;
pub mod query;
pub mod registry;
pub mod router;
pub mod scenario;
pub mod state;

pub use config::MuxConfig;
pub use host::{MemoryHost, NavigationHost, SharedNavigationState};
pub use registry::{AppRecord, AppRegistry, MemoryRegistry};
pub use router::{MicroRouter, Router, RouterError, VirtualHistory, VirtualLocation};
