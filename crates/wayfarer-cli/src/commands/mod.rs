//! Command implementations

mod db;
mod feed;
mod inspect;
mod locations;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use crate::settings::load_config;
use anyhow::{Context, Result};
use std::sync::Arc;
use wayfarer_store::postgres::{PostgresConfig, PostgresStore};

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Db(args) => db::execute(args, &output).await,
        Commands::Locations(args) => locations::execute(args, &config, &output).await,
        Commands::Feed(args) => feed::execute(args, &config, &output).await,
        Commands::Config => inspect::execute(&config, &output),
    }
}

/// Connect to the database named by DATABASE_URL
async fn connect_postgres() -> Result<Arc<PostgresStore>> {
    let config = PostgresConfig::from_env()
        .context("Failed to load database configuration. Ensure DATABASE_URL is set.")?;
    let store = PostgresStore::new(config).await.context("Failed to connect to database")?;
    Ok(Arc::new(store))
}
