use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds and checks the connection pool.
///
/// The pool is created once at startup and handed to handlers through the
/// application state; each request checks a connection out and returns it
/// when the query or transaction guard is dropped.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect eagerly so a bad DATABASE_URL fails at startup.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = Self::pool_options(config).connect(&config.url).await?;
        info!("Created database pool ({} max connections)", config.max_connections);
        Ok(pool)
    }

    /// Build a pool that opens connections on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        Self::pool_options(config)
            .connect_lazy(&config.url)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
