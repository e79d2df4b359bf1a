//! Axum router for the metrics endpoint.
//!
//! - `/metrics`      : Prometheus text format
//! - `/healthz`      : liveness
//! - `/debug`        : index of introspection pages
//! - `/debug/statz`  : JSON snapshot of every view
//! - `/debug/viewz`  : registered view definitions and reporting state

pub mod debug;
pub mod ops;

use axum::{routing::get, Router};

use crate::app_state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .route("/debug", get(debug::index))
        .route("/debug/statz", get(debug::statz))
        .route("/debug/viewz", get(debug::viewz))
        .with_state(state)
}
