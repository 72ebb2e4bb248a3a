use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use wayfarer_core::config::{CliConfigOverrides, LayeredConfig};

use crate::cli::Cli;

/// Defaults, then the config file, then the environment, then CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let path = cli
        .config
        .clone()
        .or_else(|| env::var("WAYFARER_CONFIG").ok().filter(|p| !p.is_empty()).map(PathBuf::from));

    let config = match path {
        Some(path) => LayeredConfig::with_defaults()
            .load_from_file(&path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => LayeredConfig::with_defaults(),
    };

    let mut config = config.load_from_env();
    config.update_from_cli(CliConfigOverrides {
        embedder_model: cli.embedder_model.clone(),
        ..Default::default()
    });
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

/// Ollama base URL, shared with the API server
pub fn ollama_url() -> String {
    env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wayfarer_core::config::ConfigSource;

    #[test]
    #[serial]
    fn test_cli_flag_beats_file() {
        env::remove_var("WAYFARER_CONFIG");
        env::remove_var("WAYFARER_EMBEDDER_MODEL");

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[embedder]\nmodel = \"from-file\"\n\n[feed]\npage_limit = 20").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::parse_from([
            "wayfarer",
            "--config",
            path.as_str(),
            "--embedder-model",
            "from-cli",
            "config",
        ]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.embedder_model.value, "from-cli");
        assert_eq!(config.embedder_model.source, ConfigSource::Cli);
        assert_eq!(config.feed_page_limit.value, 20);
        assert_eq!(config.feed_page_limit.source, ConfigSource::File);
    }

    #[test]
    #[serial]
    fn test_missing_file_is_an_error() {
        env::remove_var("WAYFARER_CONFIG");
        let cli = Cli::parse_from(["wayfarer", "--config", "/nonexistent/wayfarer.toml", "config"]);
        assert!(load_config(&cli).is_err());
    }
}
