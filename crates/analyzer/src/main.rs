//! Multiverse Analyzer - log analysis service for multi-agent systems
//!
//! Serves the health, info, analysis and metrics endpoints over HTTP.

use analyzer_lib::{api, observability::StructuredLogger, AppState};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use crate::config::{AnalyzerConfig, LogFormat};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Resolves on SIGINT, or SIGTERM on unix
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT received",
        _ = terminate => "SIGTERM received",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AnalyzerConfig::load()?;
    init_tracing(config.log_format);

    info!(service = %config.service_name, "Starting multiverse-analyzer");

    let logger = StructuredLogger::new(&config.service_name);
    let state = Arc::new(
        AppState::placeholder(logger.clone()).with_body_limit(config.max_body_bytes),
    );
    let app = api::create_router(state.clone());

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    logger.log_startup(api::SERVICE_VERSION, &addr.to_string());

    state.readiness.set_ready().await;

    let drain = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let reason = shutdown_signal().await;
            drain.readiness.set_draining().await;
            drain.logger.log_shutdown(reason);
        })
        .await?;

    info!("Shutdown complete");
    Ok(())
}
