//! `cloak-svc`: user API whose exchange log never shows tagged fields in clear.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured logging.
//! 3. Install the process-wide log key.
//! 4. Build the Axum router and start the HTTP server.

mod config;
mod error;
mod model;
mod server;
mod store;
mod telemetry;

use anyhow::{Context, Result};
use tracing::{info, warn};

use config::Config;
use server::state::AppState;
use store::UserStore;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Logging is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        service_name = %cfg.service_name,
        listen_port = cfg.listen_port,
        reveal_enabled = cfg.enable_reveal,
        "cloak-svc starting"
    );

    // -----------------------------------------------------------------------
    // 3. Log key
    // -----------------------------------------------------------------------
    match cfg.log_key() {
        Some(key) => {
            fieldcloak::set_log_key(key);
            info!("log key installed; request and response bodies will be logged obscured");
        }
        None => warn!("LOG_ENCRYPTION_KEY not set; request and response bodies will not be logged"),
    }

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(
        UserStore::new(),
        cfg.service_name.clone(),
        fieldcloak::log_key().cloned(),
        cfg.enable_reveal,
    );
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("cloak-svc stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
