use crate::cli::{DbArgs, DbCommand};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use serde::Serialize;
use tabled::Tabled;
use wayfarer_store::postgres::PostgresStore;

use super::connect_postgres;

#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    version: i64,
    description: String,
    applied: bool,
}

/// Execute database management commands
pub async fn execute(args: DbArgs, output: &OutputWriter) -> Result<()> {
    let store = connect_postgres().await?;

    match args.command {
        DbCommand::Migrate => execute_migrate(&store, output).await,
        DbCommand::Status => execute_status(&store, output).await,
    }
}

async fn execute_migrate(store: &PostgresStore, output: &OutputWriter) -> Result<()> {
    output.info("Applying migrations...");
    store.run_migrations().await.context("Failed to run migrations")?;

    match store.current_version().await.context("Failed to read schema version")? {
        Some(version) => output.success(format!("Schema is at version {}", version)),
        None => output.success("No migrations to apply"),
    }
    Ok(())
}

async fn execute_status(store: &PostgresStore, output: &OutputWriter) -> Result<()> {
    let status = store.migration_status().await.context("Failed to read migration status")?;

    let pending = status.iter().filter(|m| !m.applied).count();
    let rows: Vec<MigrationRow> = status
        .into_iter()
        .map(|m| MigrationRow { version: m.version, description: m.description, applied: m.applied })
        .collect();
    output.table(rows)?;

    if pending > 0 {
        output.warning(format!("{} pending migration(s); run `wayfarer db migrate`", pending));
    }
    Ok(())
}
