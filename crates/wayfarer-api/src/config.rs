use std::env;
use std::path::PathBuf;
use wayfarer_core::config::LayeredConfig;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub ollama_url: String,
    pub mapbox_token: Option<String>,
    /// Optional TOML file layered under the environment
    pub config_path: Option<PathBuf>,
}

/// Embedder configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedderConfig {
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("WAYFARER_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3001);

        let cors_origin = env::var("WAYFARER_CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let ollama_url =
            env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());

        Self {
            port,
            cors_origin,
            database_url: non_empty_var("DATABASE_URL"),
            redis_url: non_empty_var("REDIS_URL"),
            ollama_url,
            mapbox_token: non_empty_var("MAPBOX_ACCESS_TOKEN"),
            config_path: non_empty_var("WAYFARER_CONFIG").map(PathBuf::from),
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Check if PostgreSQL storage is configured
    pub fn uses_postgres(&self) -> bool {
        self.database_url.is_some()
    }

    pub fn uses_redis(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Embedder settings: URL from here, model and dimensions from the layered config
    pub fn embedder(&self, layered: &LayeredConfig) -> EmbedderConfig {
        EmbedderConfig {
            base_url: self.ollama_url.clone(),
            model: layered.embedder_model.value.clone(),
            dimensions: layered.embedder_dimensions.value,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 7] = [
        "WAYFARER_PORT",
        "WAYFARER_CORS_ORIGIN",
        "DATABASE_URL",
        "REDIS_URL",
        "OLLAMA_URL",
        "MAPBOX_ACCESS_TOKEN",
        "WAYFARER_CONFIG",
    ];

    fn clear() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear();
        let config = ApiConfig::from_env();

        assert_eq!(config.port, 3001);
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.cors_origin, "http://localhost:3000");
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert!(!config.uses_postgres());
        assert!(!config.uses_redis());
        assert!(config.mapbox_token.is_none());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear();
        env::set_var("WAYFARER_PORT", "8080");
        env::set_var("REDIS_URL", "redis://127.0.0.1:6379");
        env::set_var("MAPBOX_ACCESS_TOKEN", "");
        env::set_var("WAYFARER_CONFIG", "/etc/wayfarer.toml");

        let config = ApiConfig::from_env();
        clear();

        assert_eq!(config.port, 8080);
        assert!(config.uses_redis());
        // Blank values count as unset
        assert!(config.mapbox_token.is_none());
        assert_eq!(config.config_path, Some(PathBuf::from("/etc/wayfarer.toml")));
    }

    #[test]
    #[serial]
    fn test_embedder_combines_both_sources() {
        clear();
        let config = ApiConfig::from_env();
        let embedder = config.embedder(&LayeredConfig::with_defaults());

        assert_eq!(embedder.base_url, "http://localhost:11434");
        assert_eq!(embedder.model, "all-minilm");
        assert_eq!(embedder.dimensions, 384);
    }
}
