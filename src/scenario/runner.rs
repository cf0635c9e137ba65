//! Scenario execution on `MemoryHost` + `MemoryRegistry`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::MuxConfig;
use crate::host::{AppEvent, HostOp, MemoryHost, NavigationEvent, NavigationHost, SharedNavigationState};
use crate::registry::{AppRecord, MemoryRegistry};
use crate::router::{MicroRouter, Router, RouterError};
use crate::scenario::schema::{Action, Scenario, Step};

/// Error type for scenario loading and execution.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("step {step}: unknown app '{app}'")]
    UnknownApp { step: usize, app: String },

    #[error("step {step}: action '{action}' requires an app")]
    MissingApp { step: usize, action: &'static str },

    #[error("step {step}: action '{action}' requires a value")]
    MissingValue { step: usize, action: &'static str },

    #[error("step {step}: app '{app}' has no router, add a create step first")]
    NotCreated { step: usize, app: String },

    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Everything observable after the last step.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub final_url: String,
    pub final_state: Value,
    pub history_length: usize,
    pub reloads: usize,
    pub journal: Vec<HostOp>,
    pub events: Vec<AppEvent>,
    /// Shadow `href` of every app that still has a router.
    pub locations: BTreeMap<String, String>,
}

/// Read a scenario from a TOML file.
pub fn load_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let content = fs::read_to_string(path)?;
    let scenario = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), "Scenario loaded");
    Ok(scenario)
}

/// Run every step in order and report the final host state.
pub fn run_scenario(scenario: &Scenario, config: &MuxConfig) -> Result<ScenarioReport, ScenarioError> {
    let host = Arc::new(
        MemoryHost::new(&scenario.initial_url).map_err(|source| ScenarioError::InvalidUrl {
            url: scenario.initial_url.clone(),
            source,
        })?,
    );

    let registry = MemoryRegistry::new();
    for app in &scenario.apps {
        let base_url = Url::parse(&app.base_url).map_err(|source| ScenarioError::InvalidUrl {
            url: app.base_url.clone(),
            source,
        })?;
        registry.register(AppRecord::new(app.name.clone(), base_url));
        registry.set_active(&app.name, app.active);
    }

    let shared = SharedNavigationState::new(host.clone(), config);
    let router = Router::new(shared, Arc::new(registry.clone()));

    for (index, step) in scenario.steps.iter().enumerate() {
        let step_no = index + 1;
        tracing::debug!(step = step_no, action = step.action.as_str(), app = ?step.app, "Running step");
        run_step(scenario, &host, &registry, &router, step_no, step)?;
    }

    let locations = router
        .apps()
        .into_iter()
        .filter_map(|app| router.route(&app).map(|r| (app, r.location.href())))
        .collect();

    Ok(ScenarioReport {
        final_url: host.url(),
        final_state: host.state(),
        history_length: host.length(),
        reloads: host.reload_count(),
        journal: host.journal(),
        events: host.app_events(),
        locations,
    })
}

fn run_step(
    scenario: &Scenario,
    host: &MemoryHost,
    registry: &MemoryRegistry,
    router: &Router,
    step_no: usize,
    step: &Step,
) -> Result<(), ScenarioError> {
    let action = step.action.as_str();
    let value = match (&step.value, step.action.needs_value()) {
        (None, true) => {
            return Err(ScenarioError::MissingValue {
                step: step_no,
                action,
            })
        }
        (value, _) => value.as_deref(),
    };

    if step.action == Action::Navigate {
        host.push_state(host.state(), None, value);
        host.dispatch_navigation(NavigationEvent::new(host.state()));
        return Ok(());
    }

    let app = step.app.as_deref().ok_or(ScenarioError::MissingApp {
        step: step_no,
        action,
    })?;
    let Some(declared) = scenario.apps.iter().find(|a| a.name == app) else {
        return Err(ScenarioError::UnknownApp {
            step: step_no,
            app: app.to_string(),
        });
    };

    match step.action {
        Action::Create => {
            router.create(app, &declared.base_url)?;
            return Ok(());
        }
        Action::Activate => {
            registry.set_active(app, true);
            return Ok(());
        }
        Action::Deactivate => {
            registry.set_active(app, false);
            return Ok(());
        }
        _ => {}
    }

    let MicroRouter { location, history } =
        router.route(app).ok_or_else(|| ScenarioError::NotCreated {
            step: step_no,
            app: app.to_string(),
        })?;
    let value = value.unwrap_or_default();
    let state = step.state.clone().unwrap_or(Value::Null);
    let url = step.value.as_deref();

    match step.action {
        Action::Init => router.init_with_shared_url(&location),
        Action::Clear => router.clear(&location),
        Action::SetHref => location.set_href(value),
        Action::SetPathname => location.set_pathname(value),
        Action::SetSearch => location.set_search(value),
        Action::SetHash => location.set_hash(value),
        Action::PushState => history.push_state(state, None, url),
        Action::ReplaceState => history.replace_state(state, None, url),
        Action::Back => history.back(),
        Action::Forward => history.forward(),
        Action::Create | Action::Activate | Action::Deactivate | Action::Navigate => {}
    }
    Ok(())
}
