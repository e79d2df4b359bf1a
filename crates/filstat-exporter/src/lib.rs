//! filstat exporter library entry.
//!
//! This crate wires the measurement registry, the Prometheus exporter and
//! reporting loop, and the HTTP server into a metrics endpoint a host process
//! starts once at boot. It is consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod exporter;
pub mod registry;
pub mod server;
pub mod timer;

pub use bootstrap::{setup_metrics, MetricsServer};
pub use registry::{Measurement, MetricsRegistry, ViewData, DEFAULT_NAMESPACE};
pub use timer::Timer;
