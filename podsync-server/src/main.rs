use anyhow::{Context, Result};
use clap::Parser;
use podsync_server::{RoomReaper, RoomStore, ServerConfig, SignalingService, router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::parse();
    let reaper_config = config.reaper().context("invalid reaper configuration")?;
    let cors_origin = config
        .cors_origin_header()
        .context("invalid CORS configuration")?;

    let store = RoomStore::new();
    let service = SignalingService::new(store.clone(), config.strict_signaling);

    let shutdown = CancellationToken::new();
    let reaper = RoomReaper::new(store, reaper_config).spawn(shutdown.clone());

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("PodSync server listening on http://{}", addr);

    axum::serve(listener, router(service, cors_origin))
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("server error")?;

    shutdown.cancel();
    reaper.await.context("reaper task failed")?;
    info!("PodSync server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        }
        _ = shutdown.cancelled() => {}
    }
    info!("Shutdown requested");
}
