//! Introspection pages under `/debug`.

use std::time::UNIX_EPOCH;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use filstat_core::measure::LATENCY_BUCKETS_MS;

use crate::app_state::AppState;
use crate::registry::ViewData;

const INDEX: &str = "\
filstat debug pages
  /debug/statz  aggregated view snapshots (json)
  /debug/viewz  registered views and reporting state (json)
";

pub async fn index() -> impl IntoResponse {
    INDEX
}

pub async fn statz(State(state): State<AppState>) -> Json<Vec<ViewData>> {
    Json(state.registry().snapshot())
}

#[derive(Serialize)]
pub struct ViewzPage {
    namespace: String,
    reporting_period_ms: u64,
    reports: u64,
    last_report_unix_ms: Option<u64>,
    views: Vec<ViewDef>,
}

#[derive(Serialize)]
struct ViewDef {
    name: String,
    metric_name: String,
    description: String,
    unit: String,
    buckets: Vec<f64>,
}

pub async fn viewz(State(state): State<AppState>) -> Json<ViewzPage> {
    let registry = state.registry();
    let exporter = state.exporter();

    let views = registry
        .names()
        .into_iter()
        .filter_map(|name| registry.get(&name))
        .map(|m| ViewDef {
            name: m.name().to_string(),
            metric_name: m.metric_name().to_string(),
            description: m.def().description().to_string(),
            unit: m.def().unit().to_string(),
            buckets: LATENCY_BUCKETS_MS.to_vec(),
        })
        .collect();

    let last_report_unix_ms = exporter
        .last_report()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64);

    Json(ViewzPage {
        namespace: registry.namespace().to_string(),
        reporting_period_ms: state.reporting_period().as_millis() as u64,
        reports: exporter.reports(),
        last_report_unix_ms,
        views,
    })
}
