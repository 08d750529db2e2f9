use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    crimecast_obs::init("crimecastd");

    // Config
    let cfg = crimecast_config::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid configuration, using defaults");
        crimecast_config::AppConfig::default()
    });
    let http_bind = cfg.bind();

    // Encoders, weather sources and the city model are loaded once here
    let pipeline = crimecast_server::Pipeline::from_config(&cfg)?;
    if !pipeline.has_model() {
        tracing::warn!(city = %pipeline.city(), "serving features without a model");
    }

    let (app, state) = crimecast_server::build_app(pipeline)?;

    let addr: SocketAddr = http_bind
        .parse()
        .with_context(|| format!("invalid HTTP bind address '{}'", http_bind))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    // Mark ready just before serving
    crimecast_server::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
