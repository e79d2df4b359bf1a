//! filstat-exporter
//!
//! Loads the YAML config (first argument, default `filstat.yaml`), starts the
//! metrics endpoint, and runs until Ctrl+C/SIGTERM or until the server fails.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use filstat_core::error::Result;
use filstat_exporter::{config, setup_metrics, MetricsRegistry};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.code().as_str(), "filstat-exporter failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;

    let registry = Arc::new(MetricsRegistry::new()?);
    let Some(mut server) = setup_metrics(&cfg.metrics, registry)? else {
        tracing::warn!(config = %path, "prometheus exporter disabled; nothing to serve");
        return Ok(());
    };

    let addr = server.local_addr().await?;
    tracing::info!(%addr, "filstat-exporter ready");

    let stopped = tokio::select! {
        res = server.wait() => Some(res),
        _ = shutdown_signal() => None,
    };
    match stopped {
        Some(res) => res,
        None => server.shutdown().await,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
