//! Metrics collection.
//!
//! # Metrics
//! - `navmux_url_writes_total` (counter): multiplexed URL writes by mode (query, hash)
//! - `navmux_reloads_total` (counter): reloads forced by location writes, by app
//! - `navmux_synthetic_navigations_total` (counter): synthesized navigation notifications, by app
//! - `navmux_events_dispatched_total` (counter): app-scoped events by kind
//! - `navmux_resolution_failures_total` (counter): target URLs that failed to resolve, by app
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels are low-cardinality (mode, kind, app name)

pub fn record_url_write(mode: &'static str) {
    metrics::counter!("navmux_url_writes_total", "mode" => mode).increment(1);
}

pub fn record_reload(app: &str) {
    metrics::counter!("navmux_reloads_total", "app" => app.to_string()).increment(1);
}

pub fn record_synthetic_navigation(app: &str) {
    metrics::counter!("navmux_synthetic_navigations_total", "app" => app.to_string()).increment(1);
}

pub fn record_event(kind: &'static str) {
    metrics::counter!("navmux_events_dispatched_total", "kind" => kind).increment(1);
}

pub fn record_resolution_failure(app: &str) {
    metrics::counter!("navmux_resolution_failures_total", "app" => app.to_string()).increment(1);
}
