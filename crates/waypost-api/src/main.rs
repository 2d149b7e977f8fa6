//! # waypost-api: Binary Entry Point
//!
//! Reads [`AppConfig`] from the environment, installs the tracing
//! subscriber and the Prometheus recorder, and serves the Axum app.

use std::time::Duration;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;

use waypost_api::state::{AppConfig, AppState};

const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install the Prometheus recorder")?;
    let upkeep = prometheus.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(METRICS_UPKEEP_INTERVAL);
        loop {
            ticker.tick().await;
            upkeep.run_upkeep();
        }
    });

    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN is not set; every request runs as admin");
    }
    tracing::info!(?config, "configuration loaded");

    let port = config.port;
    let app = waypost_api::app(AppState::with_config(config, Some(prometheus)));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Waypost API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
