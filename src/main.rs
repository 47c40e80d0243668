// src/main.rs
use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use diabetes_prediction_service::{
    config::{default_config, load_config, Config},
    metrics::{start_metrics_server, MetricsRegistry},
    prediction::PredictionService,
    server::{shutdown_signal, AppState, RequestHandler, ServerBuilder},
};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("diabetes_prediction_service=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    let config = load(std::env::args().nth(1)).await?;

    // Load the classifier exactly once; failure leaves the service up without it.
    info!("Loading classifier artifact from: {}", config.model.path.display());
    let service = PredictionService::from_artifact(&config.model.path);
    let mut state = AppState::new(service, &config);

    if config.metrics.enabled {
        let metrics_registry = Arc::new(MetricsRegistry::new()?);
        state = state.with_metrics(metrics_registry.collector());

        let metrics_addr: SocketAddr = (config.server.host, config.metrics.port).into();
        start_metrics_server(metrics_addr, metrics_registry, config.metrics.path.clone()).await?;
    }

    if let Some(files) = &state.frontend {
        info!("Serving frontend from {}", files.root().display());
    }

    let handler = RequestHandler::new(Arc::new(state)).with_cors();

    let addr = config.server.addr();
    info!("Starting diabetes prediction service on {}", addr);
    info!("   POST /diabetes_prediction  - classify a patient record");
    info!("   GET  /health               - liveness");
    info!("   GET  /api/model-info       - loaded model details");

    ServerBuilder::new(addr)
        .with_handler(handler)
        .with_shutdown(shutdown_signal())
        .serve()
        .await?;

    info!("Diabetes prediction service stopped");
    Ok(())
}

/// An explicit path must exist; the default path is optional.
async fn load(arg: Option<String>) -> Result<Config> {
    match arg {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            load_config(&path).await
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            info!("Loading configuration from: {}", DEFAULT_CONFIG_PATH);
            load_config(DEFAULT_CONFIG_PATH).await
        }
        None => {
            info!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
            default_config()
        }
    }
}
