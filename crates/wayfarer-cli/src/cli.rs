use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wayfarer - Semantic point-of-interest routes
#[derive(Parser, Debug)]
#[command(name = "wayfarer")]
#[command(about = "Operate the Wayfarer route search and feed backend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// TOML configuration file layered under the environment (default: $WAYFARER_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the embedding model
    #[arg(long, global = true)]
    pub embedder_model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage database schema
    Db(DbArgs),

    /// Manage location reference data
    Locations(LocationsArgs),

    /// Maintain the published route feed
    Feed(FeedArgs),

    /// Show the effective configuration
    Config,
}

#[derive(Parser, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Apply pending migrations
    Migrate,

    /// List migrations and whether they are applied
    Status,
}

#[derive(Parser, Debug)]
pub struct LocationsArgs {
    #[command(subcommand)]
    pub command: LocationsCommand,
}

#[derive(Subcommand, Debug)]
pub enum LocationsCommand {
    /// Import locations from a JSON file into a category
    Import(ImportArgs),
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// JSON array of {id, name, latitude, longitude, embedding?, description?}
    pub file: PathBuf,

    /// Location category (landmark, restaurant, grocery, pharmacy)
    #[arg(long)]
    pub category: String,

    /// Validate and embed without writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct FeedArgs {
    #[command(subcommand)]
    pub command: FeedCommand,
}

#[derive(Subcommand, Debug)]
pub enum FeedCommand {
    /// Evict routes whose publication has expired
    Cleanup,

    /// Print the top of the feed
    Top(TopArgs),
}

#[derive(Parser, Debug)]
pub struct TopArgs {
    /// Feed order (num_votes or created_at)
    #[arg(long, default_value = "num_votes")]
    pub order_by: String,

    #[arg(long, default_value = "0")]
    pub offset: usize,

    #[arg(long, default_value = "10")]
    pub limit: usize,

    /// Annotate votes as seen by this user
    #[arg(long, default_value = "0")]
    pub as_user: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_top() {
        let cli = Cli::parse_from(["wayfarer", "feed", "top", "--order-by", "created_at", "--limit", "5"]);
        match cli.command {
            Commands::Feed(FeedArgs { command: FeedCommand::Top(args) }) => {
                assert_eq!(args.order_by, "created_at");
                assert_eq!(args.limit, 5);
                assert_eq!(args.offset, 0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_import_with_global_flags() {
        let cli = Cli::parse_from([
            "wayfarer",
            "locations",
            "import",
            "pharmacies.json",
            "--category",
            "pharmacy",
            "--embedder-model",
            "nomic-embed-text",
            "--json",
        ]);
        assert!(cli.json);
        assert_eq!(cli.embedder_model.as_deref(), Some("nomic-embed-text"));
        match cli.command {
            Commands::Locations(LocationsArgs { command: LocationsCommand::Import(args) }) => {
                assert_eq!(args.file, PathBuf::from("pharmacies.json"));
                assert_eq!(args.category, "pharmacy");
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
