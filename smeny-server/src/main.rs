//! smeny-server: shift planning, invoicing and workflow backend
//!
//! - Companies plan shifts at their workplaces; workers swap them
//! - Invoices, customers and documents per account
//! - Workflow manager (employees, attendance, payroll, approvals) under `/api/wf`

mod api;
mod auth;
mod common;
mod config;
mod db;
mod error;
mod middleware;
mod services;
mod state;
mod util;

use std::net::SocketAddr;
use std::time::Duration;

use config::Config;
use error::BoxError;
use state::AppState;

/// Rate limiter windows are swept this often
const RATE_LIMIT_CLEANUP_SECS: u64 = 300;
/// Expired and revoked sessions are purged this often
const SESSION_PURGE_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    common::logger::init_logger_with_file(
        &config.log_level,
        config.is_production(),
        config.log_dir.as_deref(),
    )?;
    api::health::mark_started();

    tracing::info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting smeny-server"
    );

    let state = AppState::new(config).await?;
    spawn_maintenance(&state);

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP listening on {addr}");

    let app = api::build_app(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Periodic rate limiter sweep and session purge
fn spawn_maintenance(state: &AppState) {
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(RATE_LIMIT_CLEANUP_SECS));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let pool = state.pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_PURGE_SECS));
        loop {
            interval.tick().await;
            match db::sessions::purge_expired(&pool, shared::util::now_millis()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(purged = n, "Expired sessions purged"),
                Err(e) => tracing::warn!(error = %e, "Session purge failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
