//! Name-keyed registry of latency measurements.
//!
//! Each distinct measure name maps to one [`Measurement`]: the immutable
//! definition plus its histogram view, registered with the backing
//! Prometheus registry exactly once. Creation happens under the DashMap entry
//! guard, so concurrent first-time callers for the same name all get the same
//! entry and the backend never sees a duplicate registration.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use prometheus::core::Metric as _;
use prometheus::{Encoder, Histogram, HistogramOpts, Registry, TextEncoder};
use serde::Serialize;

use filstat_core::error::{FilstatError, Result};
use filstat_core::measure::{MeasureDef, LATENCY_BUCKETS_MS};

use crate::timer::Timer;

/// Namespace prepended to every exported series.
pub const DEFAULT_NAMESPACE: &str = "filecoin";

/// One registered measure and its aggregation view.
pub struct Measurement {
    def: MeasureDef,
    metric_name: String,
    view: Histogram,
}

impl Measurement {
    fn register(backend: &Registry, def: MeasureDef) -> Result<Self> {
        def.validate()?;

        let metric_name = def.metric_name();
        // Backend rejects empty help text.
        let help = if def.description().is_empty() {
            def.name().to_string()
        } else {
            def.description().to_string()
        };

        let view = Histogram::with_opts(
            HistogramOpts::new(metric_name.clone(), help).buckets(LATENCY_BUCKETS_MS.to_vec()),
        )
        .map_err(|e| FilstatError::Registration(format!("{}: {e}", def.name())))?;
        backend
            .register(Box::new(view.clone()))
            .map_err(|e| FilstatError::Registration(format!("{}: {e}", def.name())))?;

        Ok(Self {
            def,
            metric_name,
            view,
        })
    }

    pub fn def(&self) -> &MeasureDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        self.def.name()
    }

    /// Exported metric name, without namespace.
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// Report one sample, in milliseconds.
    pub fn observe_ms(&self, value: f64) {
        self.view.observe(value);
    }

    /// Start a timer that reports against this measurement.
    pub fn start_timer(self: &Arc<Self>) -> Timer {
        Timer::start(Arc::clone(self))
    }

    /// Number of samples reported so far.
    pub fn sample_count(&self) -> u64 {
        self.view.get_sample_count()
    }

    /// Sum of all reported samples.
    pub fn sample_sum(&self) -> f64 {
        self.view.get_sample_sum()
    }

    /// Point-in-time copy of the aggregated view.
    pub fn snapshot(&self) -> ViewData {
        let metric = self.view.metric();
        let buckets = metric
            .get_histogram()
            .get_bucket()
            .iter()
            .map(|b| BucketCount {
                le: b.get_upper_bound(),
                count: b.get_cumulative_count(),
            })
            .collect();

        ViewData {
            name: self.def.name().to_string(),
            metric_name: self.metric_name.clone(),
            description: self.def.description().to_string(),
            unit: self.def.unit().to_string(),
            buckets,
            count: self.view.get_sample_count(),
            sum: self.view.get_sample_sum(),
        }
    }
}

/// Cumulative count for one bucket upper bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub le: f64,
    pub count: u64,
}

/// Snapshot of one view, handed to exporters and the debug pages.
#[derive(Debug, Clone, Serialize)]
pub struct ViewData {
    pub name: String,
    pub metric_name: String,
    pub description: String,
    pub unit: String,
    pub buckets: Vec<BucketCount>,
    pub count: u64,
    pub sum: f64,
}

impl ViewData {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Registry of measurements, backed by a namespaced Prometheus registry.
///
/// Construct once at startup and share as `Arc<MetricsRegistry>`.
pub struct MetricsRegistry {
    namespace: String,
    backend: Registry,
    measures: DashMap<String, Arc<Measurement>>,
}

impl MetricsRegistry {
    /// Registry under the default `filecoin` namespace.
    pub fn new() -> Result<Self> {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(namespace: &str) -> Result<Self> {
        let backend = Registry::new_custom(Some(namespace.to_string()), None)
            .map_err(|e| FilstatError::Registration(format!("namespace {namespace:?}: {e}")))?;
        Ok(Self {
            namespace: namespace.to_string(),
            backend,
            measures: DashMap::new(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Return a timer for `name`, creating and registering the measure on
    /// first use.
    ///
    /// For a name that already exists, `description` and `unit` are ignored:
    /// the first definition wins.
    pub fn new_timer(&self, name: &str, description: &str, unit: &str) -> Result<Timer> {
        if let Some(existing) = self.measures.get(name) {
            let def = existing.def();
            if def.description() != description || def.unit() != unit {
                tracing::debug!(
                    measure = %name,
                    kept_unit = %def.unit(),
                    ignored_unit = %unit,
                    "measure already defined; ignoring new description/unit"
                );
            }
            return Ok(existing.value().start_timer());
        }

        let m = self.register(&MeasureDef::new(name, description, unit))?;
        Ok(m.start_timer())
    }

    /// Ensure a measurement exists for `def`, registering it at most once.
    pub fn register(&self, def: &MeasureDef) -> Result<Arc<Measurement>> {
        match self.measures.entry(def.name().to_string()) {
            Entry::Occupied(e) => Ok(Arc::clone(e.get())),
            Entry::Vacant(e) => {
                let m = Arc::new(Measurement::register(&self.backend, def.clone())?);
                tracing::debug!(
                    measure = %def.name(),
                    metric = %m.metric_name(),
                    unit = %def.unit(),
                    "registered measure view"
                );
                Ok(Arc::clone(e.insert(m).value()))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Measurement>> {
        self.measures.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Registered measure names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.measures.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// Snapshot every view, sorted by measure name.
    pub fn snapshot(&self) -> Vec<ViewData> {
        let mut views: Vec<ViewData> = self.measures.iter().map(|e| e.value().snapshot()).collect();
        views.sort_by(|a, b| a.name.cmp(&b.name));
        views
    }

    /// Encode all views in the Prometheus text exposition format.
    pub fn gather_text(&self) -> Result<String> {
        let families = self.backend.gather();
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buf)
            .map_err(|e| FilstatError::Internal(format!("encode metrics: {e}")))?;
        String::from_utf8(buf).map_err(|e| FilstatError::Internal(format!("encode metrics: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filstat_core::error::ErrorCode;
    use filstat_core::measure::APPLY_MESSAGE;
    use std::time::Duration;

    #[test]
    fn distinct_names_report_independently() {
        let registry = MetricsRegistry::new().unwrap();
        let a = registry.new_timer("chain/a", "first", "ms").unwrap();
        let _b = registry.new_timer("chain/b", "second", "ms").unwrap();

        a.record();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("chain/a").unwrap().sample_count(), 1);
        assert_eq!(registry.get("chain/b").unwrap().sample_count(), 0);
        assert!(!Arc::ptr_eq(
            &registry.get("chain/a").unwrap(),
            &registry.get("chain/b").unwrap()
        ));
    }

    #[test]
    fn same_name_shares_one_view() {
        let registry = MetricsRegistry::new().unwrap();
        let t1 = registry.new_timer("chain/shared", "original", "ms").unwrap();
        let t2 = registry.new_timer("chain/shared", "ignored", "By").unwrap();

        assert!(Arc::ptr_eq(t1.measurement(), t2.measurement()));

        t1.record();
        t2.record();

        let m = registry.get("chain/shared").unwrap();
        assert_eq!(m.sample_count(), 2);
        assert_eq!(m.def().description(), "original");
        assert_eq!(m.def().unit(), "ms");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_first_use_registers_once() {
        let registry = MetricsRegistry::new().unwrap();

        let timers: Vec<Timer> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| s.spawn(|| registry.new_timer("race/first_use", "d", "ms").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(registry.len(), 1);
        let first = timers[0].measurement();
        assert!(timers.iter().all(|t| Arc::ptr_eq(first, t.measurement())));
    }

    #[test]
    fn sanitized_name_collision_is_a_registration_error() {
        let registry = MetricsRegistry::new().unwrap();
        registry.new_timer("sync/head", "d", "ms").unwrap();

        let err = registry.new_timer("sync_head", "d", "ms").err().unwrap();
        assert_eq!(err.code(), ErrorCode::Registration);
        assert!(registry.get("sync_head").is_none());
    }

    #[test]
    fn invalid_name_is_a_registration_error() {
        let registry = MetricsRegistry::new().unwrap();
        let err = registry.new_timer("", "d", "ms").err().unwrap();
        assert_eq!(err.code(), ErrorCode::Registration);
        assert!(registry.is_empty());
    }

    #[test]
    fn register_predefined_is_idempotent() {
        let registry = MetricsRegistry::new().unwrap();
        let a = registry.register(&APPLY_MESSAGE).unwrap();
        let b = registry.register(&APPLY_MESSAGE).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let t = registry
            .new_timer(APPLY_MESSAGE.name(), APPLY_MESSAGE.description(), "ms")
            .unwrap();
        assert!(Arc::ptr_eq(&a, t.measurement()));
    }

    #[test]
    fn snapshot_has_cumulative_buckets() {
        let registry = MetricsRegistry::new().unwrap();
        let m = registry.register(&APPLY_MESSAGE).unwrap();
        m.observe_ms(30.0);
        m.observe_ms(900.0);

        let view = m.snapshot();
        assert_eq!(view.buckets.len(), LATENCY_BUCKETS_MS.len());
        assert_eq!(view.count, 2);
        assert_eq!(view.sum, 930.0);
        assert_eq!(view.mean(), 465.0);

        let le = |bound: f64| view.buckets.iter().find(|b| b.le == bound).unwrap().count;
        assert_eq!(le(25.0), 0);
        assert_eq!(le(50.0), 1);
        assert_eq!(le(800.0), 1);
        assert_eq!(le(1000.0), 2);
        assert_eq!(le(8000.0), 2);
    }

    #[test]
    fn gather_text_uses_namespace() {
        let registry = MetricsRegistry::new().unwrap();
        registry.register(&APPLY_MESSAGE).unwrap();
        let text = registry.gather_text().unwrap();
        assert!(text.contains("filecoin_consensus_apply_message_count 0"));
        assert!(text.contains("filecoin_consensus_apply_message_bucket{le=\"25\"} 0"));
    }

    #[tokio::test(start_paused = true)]
    async fn record_reports_rounded_millis_since_creation() {
        let registry = MetricsRegistry::new().unwrap();
        let timer = registry.new_timer("chain/apply", "d", "ms").unwrap();

        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(timer.record(), 1500.0);

        // Measured from creation, not from the previous record.
        tokio::time::advance(Duration::from_micros(500_600)).await;
        assert_eq!(timer.record(), 2001.0);

        let m = registry.get("chain/apply").unwrap();
        assert_eq!(m.sample_count(), 2);
        assert_eq!(m.sample_sum(), 3501.0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_new_timer_gets_fresh_start() {
        let registry = MetricsRegistry::new().unwrap();
        let early = registry.new_timer("chain/fresh", "d", "ms").unwrap();
        tokio::time::advance(Duration::from_millis(300)).await;
        let late = registry.new_timer("chain/fresh", "d", "ms").unwrap();
        tokio::time::advance(Duration::from_millis(200)).await;

        assert_eq!(late.record(), 200.0);
        assert_eq!(early.record(), 500.0);
    }
}
