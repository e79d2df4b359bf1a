//! Prometheus exporter bound to a [`MetricsRegistry`].
//!
//! Scrapes are served straight from the registry, so reported samples are
//! visible immediately. As a reporting sink it only stamps when the last
//! report happened, which the debug pages show.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use filstat_core::error::Result;

use crate::registry::{MetricsRegistry, ViewData};

use super::ViewExporter;

pub struct PrometheusExporter {
    registry: Arc<MetricsRegistry>,
    reports: AtomicU64,
    last_report_ms: AtomicU64,
}

impl PrometheusExporter {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self {
            registry,
            reports: AtomicU64::new(0),
            last_report_ms: AtomicU64::new(0),
        }
    }

    pub fn namespace(&self) -> &str {
        self.registry.namespace()
    }

    /// Current values in the text exposition format.
    pub fn render(&self) -> Result<String> {
        self.registry.gather_text()
    }

    /// Number of reporting periods seen.
    pub fn reports(&self) -> u64 {
        self.reports.load(Ordering::Relaxed)
    }

    /// Wall-clock time of the last report, if any.
    pub fn last_report(&self) -> Option<SystemTime> {
        match self.last_report_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(UNIX_EPOCH + Duration::from_millis(ms)),
        }
    }
}

impl ViewExporter for PrometheusExporter {
    fn name(&self) -> &'static str {
        "prometheus"
    }

    fn export(&self, _views: &[ViewData]) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.last_report_ms.store(now_ms, Ordering::Relaxed);
        self.reports.fetch_add(1, Ordering::Relaxed);
    }
}
