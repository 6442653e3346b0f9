//! readsieve
//!
//! Runs the selective-sequencing decision loop against a simulated instrument.
//! Two tasks run side by side: the instrument streams signal into per-channel
//! reads, and the decision loop classifies the freshest chunks and tells the
//! instrument which reads to eject.

use anyhow::Result;
use clap::Parser;
use readsieve_classifiers::{ClassifierGateway, SimulatedLoader};
use readsieve_engine::DecisionLoop;
use readsieve_telemetry::MetricsCollector;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

mod cli;
mod config;
mod mock;

use cli::Cli;
use config::RunConfig;
use mock::SimulatedInstrument;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting readsieve");
    if cli.verbose {
        warn!("Verbose logging records every read and can slow down a live run");
    }

    // Load configuration
    let config = RunConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Reference: {}", config.classifier.reference_path.display());
    info!("Channels: {}", config.instrument.channels);

    if let Some(port) = cli.metrics_port {
        init_metrics(port)?;
    }

    // Classifier construction failure ends the run before streaming starts
    let gateway = ClassifierGateway::new(&config.classifier, &SimulatedLoader)?;

    let instrument = Arc::new(SimulatedInstrument::new(config.instrument.clone()));
    let decision_loop = DecisionLoop::new(
        instrument.clone(),
        gateway,
        config.engine.clone(),
        MetricsCollector::new(),
    )?;

    let streaming = tokio::spawn(instrument.clone().stream());
    let analysis = tokio::spawn(decision_loop.run());

    let stopper = instrument.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping instrument...");
        stopper.stop();
    });

    let ((), summary) = tokio::try_join!(join(streaming), join(analysis))?;

    info!(
        positive = summary.classifier.positive,
        negative = summary.classifier.negative(),
        chunked = summary.classifier.chunked,
        total = summary.classifier.total,
        "Run complete"
    );
    Ok(())
}

/// Wait for a task and flatten its panic and error paths into one error
async fn join<T>(handle: JoinHandle<readsieve_core::Result<T>>) -> Result<T> {
    match handle.await {
        Ok(result) => Ok(result?),
        Err(e) => Err(anyhow::anyhow!("task failed: {}", e)),
    }
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("readsieve=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("readsieve=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Install the Prometheus exporter on `port`
fn init_metrics(port: u16) -> Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    readsieve_telemetry::describe_metrics();
    info!("Metrics exporter listening on http://{}", addr);
    Ok(())
}
