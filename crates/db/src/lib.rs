//! PostgreSQL persistence for CCM instructions.
//!
//! Repositories are zero-sized structs whose async methods take `&PgPool`.
//! [`PgCcmStore`] and [`PgLeaseHierarchy`] adapt them to the `ccm_core`
//! collaborator traits.

use sqlx::postgres::PgPoolOptions;

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod repositories;
pub mod store;

pub use config::DbConfig;
pub use hierarchy::PgLeaseHierarchy;
pub use store::PgCcmStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL with default settings.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config::DEFAULT_MAX_CONNECTIONS)
        .connect(database_url)
        .await
}

/// Create a connection pool from loaded configuration.
pub async fn create_pool_with(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
