//! Per-app virtual routing.
//!
//! # Data Flow
//! ```text
//! Router::create ──▶ MicroRouter { VirtualLocation, VirtualHistory }
//!                          │ setters / push_state
//!                          ▼
//!              QueryMultiplexer + StatePartitions
//!                          │ one rewritten host write
//!                          ▼
//!                    NavigationHost ──notification──▶ Broadcaster
//!                                                        │
//!                       update_from_path ◀───────────────┘
//!                       navigation-changed:<app> / hash-changed:<app>
//! ```
//!
//! # Responsibilities
//! - `location`: shadow URL of one app and the reload/event decision rules
//! - `history`: state partitioning and URL rewriting for history writes
//! - `events`: the single host subscription and app-scoped re-emission
//! - `facade`: creation, sync on start, teardown

pub mod error;
pub mod events;
pub mod facade;
pub mod history;
pub mod location;

pub use error::{RouterError, RouterResult};
pub use events::Broadcaster;
pub use facade::{MicroRouter, RouteTable, Router};
pub use history::VirtualHistory;
pub use location::VirtualLocation;
