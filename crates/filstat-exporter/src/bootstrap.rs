//! Metrics server bootstrap.
//!
//! `setup_metrics` validates the metrics config, wires a Prometheus exporter
//! and the reporting loop to the registry, registers the predefined measures,
//! and starts the HTTP server in the background. Configuration errors are
//! returned synchronously; bind/serve failures are logged by the server task
//! and surfaced through the returned [`MetricsServer`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinError, JoinHandle};

use filstat_core::endpoint::{parse_endpoint, Endpoint};
use filstat_core::error::{FilstatError, Result};
use filstat_core::interval::parse_interval;
use filstat_core::measure::APPLY_MESSAGE;

use crate::app_state::AppState;
use crate::config::MetricsConfig;
use crate::exporter::{LogExporter, PrometheusExporter, Reporter};
use crate::registry::MetricsRegistry;
use crate::server::build_router;

type BindResult = std::result::Result<SocketAddr, String>;

/// Handle to the running metrics server and reporting loop.
///
/// Dropping the handle detaches both tasks, which then run for the rest of
/// the process; only [`MetricsServer::shutdown`] stops them.
#[must_use = "dropping the handle detaches the server; keep it to observe failures or shut down"]
pub struct MetricsServer {
    endpoint: Endpoint,
    bound: Option<BindResult>,
    ready: Option<oneshot::Receiver<BindResult>>,
    shutdown: watch::Sender<bool>,
    server: Option<JoinHandle<Result<()>>>,
    reporter: JoinHandle<()>,
}

impl MetricsServer {
    /// Configured endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Address the server bound to, or the bind error.
    pub async fn local_addr(&mut self) -> Result<SocketAddr> {
        if let Some(rx) = self.ready.take() {
            let bound = rx
                .await
                .unwrap_or_else(|_| Err("server task exited before binding".to_string()));
            self.bound = Some(bound);
        }
        match &self.bound {
            Some(Ok(addr)) => Ok(*addr),
            Some(Err(msg)) => Err(FilstatError::Server(msg.clone())),
            None => Err(FilstatError::Internal("bind result missing".into())),
        }
    }

    /// Resolve when the server task terminates, returning its outcome.
    pub async fn wait(&mut self) -> Result<()> {
        let Some(handle) = self.server.as_mut() else {
            return Ok(());
        };
        let res = join_result(handle.await);
        self.server = None;
        res
    }

    /// Stop the server and the reporting loop and wait for both.
    pub async fn shutdown(mut self) -> Result<()> {
        let _ = self.shutdown.send(true);
        let res = match self.server.take() {
            Some(handle) => join_result(handle.await),
            None => Ok(()),
        };
        if let Err(e) = (&mut self.reporter).await {
            tracing::warn!(error = %e, "reporter task failed");
        }
        res
    }
}

/// Resolves once `true` has been sent. A dropped sender never resolves, so
/// detached tasks keep running.
async fn stop_requested(mut rx: watch::Receiver<bool>) {
    loop {
        let stop = *rx.borrow_and_update();
        if stop {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn join_result(res: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    res.map_err(|e| FilstatError::Internal(format!("metrics server task: {e}")))?
}

/// Start exporting metrics per `cfg`.
///
/// Returns `Ok(None)` when exporting is disabled. Must be called from within a
/// Tokio runtime.
pub fn setup_metrics(
    cfg: &MetricsConfig,
    registry: Arc<MetricsRegistry>,
) -> Result<Option<MetricsServer>> {
    if !cfg.prometheus_enabled {
        tracing::debug!("prometheus exporter disabled");
        return Ok(None);
    }

    let interval = parse_interval(&cfg.report_interval).map_err(|e| {
        tracing::error!(error = %e, "invalid metrics interval");
        e
    })?;
    let endpoint = parse_endpoint(&cfg.prometheus_endpoint).map_err(|e| {
        tracing::error!(error = %e, "invalid metrics endpoint");
        e
    })?;

    let exporter = Arc::new(PrometheusExporter::new(Arc::clone(&registry)));

    let mut reporter = Reporter::new(Arc::clone(&registry), interval);
    reporter.register_exporter(exporter.clone());
    if cfg.log_views {
        reporter.register_exporter(Arc::new(LogExporter));
    }

    registry.register(&APPLY_MESSAGE)?;

    let app = build_router(AppState::new(registry, exporter, interval));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (ready_tx, ready_rx) = oneshot::channel();

    let server = tokio::spawn(serve(endpoint.clone(), app, ready_tx, shutdown_rx.clone()));
    let reporter = tokio::spawn(reporter.run(stop_requested(shutdown_rx)));

    tracing::info!(
        %endpoint,
        interval_ms = interval.as_millis() as u64,
        log_views = cfg.log_views,
        "metrics exporter starting"
    );

    Ok(Some(MetricsServer {
        endpoint,
        bound: None,
        ready: Some(ready_rx),
        shutdown: shutdown_tx,
        server: Some(server),
        reporter,
    }))
}

async fn serve(
    endpoint: Endpoint,
    app: Router,
    ready: oneshot::Sender<BindResult>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let listener = match TcpListener::bind(endpoint.dial_addr()).await {
        Ok(l) => l,
        Err(e) => {
            let msg = format!("failed to bind {endpoint}: {e}");
            tracing::error!(%endpoint, error = %e, "failed to serve /metrics endpoint");
            let _ = ready.send(Err(msg.clone()));
            return Err(FilstatError::Server(msg));
        }
    };
    let addr = match listener.local_addr() {
        Ok(a) => a,
        Err(e) => {
            let msg = format!("local address of {endpoint}: {e}");
            tracing::error!(%endpoint, error = %e, "failed to serve /metrics endpoint");
            let _ = ready.send(Err(msg.clone()));
            return Err(FilstatError::Server(msg));
        }
    };
    let _ = ready.send(Ok(addr));
    tracing::info!(%addr, "serving /metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(stop_requested(shutdown))
        .await
        .map_err(|e| {
            tracing::error!(%addr, error = %e, "metrics server failed");
            FilstatError::Server(e.to_string())
        })?;

    tracing::info!(%addr, "metrics server stopped");
    Ok(())
}
