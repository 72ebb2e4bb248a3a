//! PostgreSQL storage adapter implementation
//!
//! Locations live in one table per category with a PostGIS `coord` column
//! and a pgvector `embedding` column. Routes, prompts and votes live in plain
//! relational tables.

pub mod config;
pub mod geo_index;
pub mod migrations;
pub mod prompts;
pub mod routes;
pub mod vector;
pub mod votes;

pub use config::{ConfigError, MigrationConfig, PoolConfig, PostgresConfig};
pub use migrations::{MigrationError, MigrationManager, MigrationStatus};

use sqlx::{postgres::PgPoolOptions, PgPool};
use wayfarer_core::error::{Result, WayfarerError};

/// Wrap a database error with what was being attempted
pub(crate) fn storage_error(action: &str, err: impl std::fmt::Display) -> WayfarerError {
    WayfarerError::Storage(format!("Failed to {}: {}", action, err))
}

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given configuration
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        config.validate().map_err(|e| WayfarerError::ConfigInvalid {
            key: "database_url".to_string(),
            reason: e.to_string(),
        })?;

        let pool = PgPoolOptions::new()
            .min_connections(config.pool.min_connections)
            .max_connections(config.pool.max_connections)
            .acquire_timeout(config.pool.acquire_timeout)
            .idle_timeout(config.pool.idle_timeout)
            .max_lifetime(config.pool.max_lifetime)
            .connect(&config.database_url)
            .await
            .map_err(|e| storage_error("connect to database", e))?;

        let store = Self { pool, config };
        store.health_check().await?;

        tracing::info!(
            max_connections = store.config.pool.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(store)
    }

    /// Create a new PostgreSQL store and run migrations if configured
    pub async fn connect(config: PostgresConfig) -> Result<Self> {
        let auto_run = config.migrations.auto_run;
        let store = Self::new(config).await?;
        if auto_run {
            store.run_migrations().await?;
        }
        Ok(store)
    }

    /// Run all pending migrations
    pub async fn run_migrations(&self) -> Result<()> {
        MigrationManager::new(self.pool.clone())
            .run_migrations()
            .await
            .map_err(|e| storage_error("run migrations", e))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Check migration status
    pub async fn migration_status(&self) -> Result<Vec<MigrationStatus>> {
        MigrationManager::new(self.pool.clone())
            .check_status()
            .await
            .map_err(|e| storage_error("check migration status", e))
    }

    /// Get the current schema version
    pub async fn current_version(&self) -> Result<Option<i64>> {
        MigrationManager::new(self.pool.clone())
            .current_version()
            .await
            .map_err(|e| storage_error("get current version", e))
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Perform a health check on the database connection
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("pass health check", e))?;
        Ok(())
    }
}
