//! Shared state for the metrics HTTP server.

use std::sync::Arc;
use std::time::Duration;

use crate::exporter::PrometheusExporter;
use crate::registry::MetricsRegistry;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: Arc<MetricsRegistry>,
    exporter: Arc<PrometheusExporter>,
    reporting_period: Duration,
}

impl AppState {
    pub fn new(
        registry: Arc<MetricsRegistry>,
        exporter: Arc<PrometheusExporter>,
        reporting_period: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                registry,
                exporter,
                reporting_period,
            }),
        }
    }

    pub fn registry(&self) -> &MetricsRegistry {
        &self.inner.registry
    }

    pub fn exporter(&self) -> &PrometheusExporter {
        &self.inner.exporter
    }

    pub fn reporting_period(&self) -> Duration {
        self.inner.reporting_period
    }
}
