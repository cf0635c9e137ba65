//! Scenario file schema.
//!
//! ```toml
//! initial_url = "http://localhost:3000/home"
//!
//! [[apps]]
//! name = "sub1"
//! base_url = "http://localhost:3001/"
//! active = true
//!
//! [[steps]]
//! app = "sub1"
//! action = "set_pathname"
//! value = "/detail"
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A scripted run against an in-memory host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    /// Address bar contents before the first step.
    pub initial_url: String,

    #[serde(default)]
    pub apps: Vec<ScenarioApp>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// An app known to the registry for the whole run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioApp {
    pub name: String,
    pub base_url: String,

    /// Starts active (mounted and visible).
    #[serde(default)]
    pub active: bool,
}

/// One operation of the run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Step {
    /// Target app. Only `navigate` may omit it.
    #[serde(default)]
    pub app: Option<String>,

    pub action: Action,

    /// URL or field value, depending on the action.
    #[serde(default)]
    pub value: Option<String>,

    /// History state for `push_state` / `replace_state`.
    #[serde(default)]
    pub state: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Init,
    Clear,
    SetHref,
    SetPathname,
    SetSearch,
    SetHash,
    PushState,
    ReplaceState,
    Back,
    Forward,
    Activate,
    Deactivate,
    /// Host-level push followed by a navigation notification.
    Navigate,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Init => "init",
            Action::Clear => "clear",
            Action::SetHref => "set_href",
            Action::SetPathname => "set_pathname",
            Action::SetSearch => "set_search",
            Action::SetHash => "set_hash",
            Action::PushState => "push_state",
            Action::ReplaceState => "replace_state",
            Action::Back => "back",
            Action::Forward => "forward",
            Action::Activate => "activate",
            Action::Deactivate => "deactivate",
            Action::Navigate => "navigate",
        }
    }

    /// Whether the step must carry a `value`.
    pub fn needs_value(&self) -> bool {
        matches!(
            self,
            Action::SetHref
                | Action::SetPathname
                | Action::SetSearch
                | Action::SetHash
                | Action::Navigate
        )
    }
}
