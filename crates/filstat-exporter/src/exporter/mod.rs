//! View exporters and the periodic reporting loop.
//!
//! - `PrometheusExporter`: pull-based; scrapes read the registry directly.
//! - `LogExporter`: emits one debug event per view on every report.
//! - `Reporter`: ticks every reporting period and hands view snapshots to
//!   each exporter.

pub mod log;
pub mod prometheus;
pub mod reporter;

pub use self::log::LogExporter;
pub use self::prometheus::PrometheusExporter;
pub use reporter::Reporter;

use crate::registry::ViewData;

/// Sink for periodic view snapshots.
pub trait ViewExporter: Send + Sync {
    fn name(&self) -> &'static str;
    fn export(&self, views: &[ViewData]);
}
