//! FastDog gateway
//!
//! - `GET  /v1/models/:name/binary` : scene as an envelope (cached, range aware)
//! - `POST /v1/decode`              : decode an uploaded envelope
//! - Config from `$FASTDOG_CONFIG` (default `fastdog.yaml`)
//! - Ctrl-C flips readiness to draining, then shuts down gracefully

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use fastdog_gateway::error::{GatewayError, Result};
use fastdog_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("FASTDOG_CONFIG").unwrap_or_else(|_| "fastdog.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| GatewayError::Config(format!("gateway.listen must be a valid SocketAddr: {e}")))?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "fastdog-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    tracing::info!("fastdog-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: app_state::AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler failed");
    }
    state.set_draining();
    tracing::info!("draining");
}
