//! Scripted navigation scenarios.
//!
//! # Data Flow
//! ```text
//! scenario.toml → load_scenario → Scenario
//!     → run_scenario (MemoryHost + MemoryRegistry + Router)
//!     → ScenarioReport (final URL, state, journal, events, locations)
//! ```
//!
//! Used by the `simulate` command and by integration tests to replay
//! multi-app interactions without a browser.

pub mod runner;
pub mod schema;

pub use runner::{load_scenario, run_scenario, ScenarioError, ScenarioReport};
pub use schema::{Action, Scenario, ScenarioApp, Step};
