use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::registry::MetricsRegistry;

use super::ViewExporter;

/// Periodically snapshots every view and hands it to the registered exporters.
pub struct Reporter {
    registry: Arc<MetricsRegistry>,
    period: Duration,
    exporters: Vec<Arc<dyn ViewExporter>>,
}

impl Reporter {
    pub fn new(registry: Arc<MetricsRegistry>, period: Duration) -> Self {
        Self {
            registry,
            period,
            exporters: Vec::new(),
        }
    }

    pub fn register_exporter(&mut self, exporter: Arc<dyn ViewExporter>) {
        tracing::debug!(exporter = exporter.name(), "registered view exporter");
        self.exporters.push(exporter);
    }

    pub fn exporter_names(&self) -> Vec<&'static str> {
        self.exporters.iter().map(|e| e.name()).collect()
    }

    /// Run one reporting pass. Returns the number of views reported.
    pub fn report_once(&self) -> usize {
        let views = self.registry.snapshot();
        for e in &self.exporters {
            e.export(&views);
        }
        views.len()
    }

    /// Tick until `shutdown` resolves.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let n = self.report_once();
                    tracing::trace!(views = n, "reporting period elapsed");
                }
                _ = &mut shutdown => break,
            }
        }
        tracing::debug!("reporter stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::PrometheusExporter;
    use crate::registry::ViewData;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct Capture {
        batches: Mutex<Vec<Vec<String>>>,
    }

    impl ViewExporter for Capture {
        fn name(&self) -> &'static str {
            "capture"
        }

        fn export(&self, views: &[ViewData]) {
            let names = views.iter().map(|v| v.name.clone()).collect();
            self.batches.lock().unwrap().push(names);
        }
    }

    #[test]
    fn report_once_reaches_every_exporter() {
        let registry = Arc::new(MetricsRegistry::new().unwrap());
        registry.new_timer("b/second", "d", "ms").unwrap();
        registry.new_timer("a/first", "d", "ms").unwrap();

        let capture = Arc::new(Capture::default());
        let prom = Arc::new(PrometheusExporter::new(Arc::clone(&registry)));
        let mut reporter = Reporter::new(Arc::clone(&registry), Duration::from_secs(5));
        reporter.register_exporter(capture.clone());
        reporter.register_exporter(prom.clone());

        assert_eq!(reporter.report_once(), 2);
        assert_eq!(reporter.exporter_names(), vec!["capture", "prometheus"]);
        assert_eq!(prom.reports(), 1);
        let batches = capture.batches.lock().unwrap();
        assert_eq!(batches.as_slice(), &[vec!["a/first".to_string(), "b/second".to_string()]]);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_each_period_until_shutdown() {
        let registry = Arc::new(MetricsRegistry::new().unwrap());
        let capture = Arc::new(Capture::default());
        let mut reporter = Reporter::new(Arc::clone(&registry), Duration::from_secs(5));
        reporter.register_exporter(capture.clone());

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(reporter.run(async move {
            let _ = rx.await;
        }));

        tokio::time::sleep(Duration::from_millis(12_500)).await;
        tx.send(()).unwrap();
        task.await.unwrap();

        assert_eq!(capture.batches.lock().unwrap().len(), 2);
    }
}
