mod config;
mod delivery;
mod domain;
mod telemetry;
mod usecase;

use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::usecase::images::ImageProxy;

pub struct AppState {
    pub image_proxy: ImageProxy,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env().context("failed to load configuration")?;
    let telemetry = telemetry::init(&config).context("failed to initialize telemetry")?;

    tracing::info!("starting the hotel web service");

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    tracing::info!(
        backend_url = %config.backend_url,
        static_dir = %config.static_dir,
        telemetry_enabled = config.telemetry_enabled,
        "config loaded"
    );

    let image_proxy = ImageProxy::new(&config.backend_url, config.upstream_timeout())
        .context("failed to build image proxy client")?;

    let shared_state = Arc::new(AppState {
        image_proxy,
        metrics_handle,
    });

    let router = delivery::http::router(shared_state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(listen_addr = %config.listen_addr, "hotel web service running");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("hotel web service stopped");
    telemetry.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
