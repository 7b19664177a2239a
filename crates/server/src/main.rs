mod api;
mod bootstrap;
mod error;
mod health;
mod notify;

use std::time::Duration;

use anyhow::Result;
use puente_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use puente_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let state =
        api::AppState::new(app.db_pool.clone(), app.config.accounting.utc_offset_minutes);
    let router = api::router(state).merge(health::router(app.db_pool.clone()));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "server_started",
        bind_address = %address,
        "puente-server listening"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    wait_for_shutdown().await?;
    tracing::info!(event_name = "server_stopping", "shutdown signal received");
    let _ = shutdown_tx.send(());

    let drain = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(drain, server).await {
        Ok(joined) => joined??,
        Err(_) => {
            tracing::warn!(
                event_name = "server_drain_timeout",
                "open connections did not drain in time, exiting anyway"
            );
        }
    }

    app.db_pool.close().await;
    tracing::info!(event_name = "server_stopped", "puente-server stopped");
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
