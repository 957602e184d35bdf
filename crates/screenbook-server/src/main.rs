//! Screenbook server — application entry point.

use std::time::Duration;

use anyhow::Context;
use screenbook_db::DbManager;
use screenbook_server::sms::SmsGateway;
use screenbook_server::{AppState, ServerConfig, build_router};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How often expired OTP codes are purged.
const OTP_CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("screenbook=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }
    info!("Starting Screenbook server...");

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let db = DbManager::connect(&config.db)
        .await
        .context("failed to connect to SurrealDB")?;
    screenbook_db::run_migrations(db.client())
        .await
        .context("failed to run migrations")?;

    let sms = SmsGateway::from_config(&config.sms);
    if sms.console().is_some() {
        warn!("SMS_PROVIDER is console; messages are logged, not delivered");
    }
    let state = AppState::new(db, &config, sms);

    let otp = state.otp.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(OTP_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = otp.cleanup_expired().await {
                warn!(error = %e, "OTP cleanup failed");
            }
        }
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Screenbook server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
