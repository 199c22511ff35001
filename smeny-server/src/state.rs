//! Application state shared by all handlers

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::{RateLimiter, SessionService};
use crate::config::Config;
use crate::services::{AresClient, AresService, DocumentStorage};

#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Session token issuing and validation
    pub sessions: SessionService,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
    /// ARES lookup with its 24 h cache
    pub ares: AresService,
    /// Uploaded document files
    pub storage: DocumentStorage,
}

impl AppState {
    /// Connect to the database, run migrations and build the services
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&config.database_url)
            .await?;
        tracing::info!("Database connected");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let state = Self::with_pool(pool, config)?;
        state.storage.ensure_root().await?;
        Ok(state)
    }

    /// Build the state around an existing pool
    pub fn with_pool(pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let ares = AresService::new(Arc::new(AresClient::new(&config.ares_base_url)?));
        Ok(Self {
            pool,
            sessions: SessionService::new(&config.session_secret, config.session_ttl_hours),
            rate_limiter: RateLimiter::new(),
            ares,
            storage: DocumentStorage::new(&config.documents_dir),
            config: Arc::new(config),
        })
    }
}
