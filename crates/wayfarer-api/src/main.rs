use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfarer_core::config::LayeredConfig;
use wayfarer_providers::{
    DirectionsProvider, MapboxDirections, OllamaEmbedder, StraightLineDirections,
};
use wayfarer_store::postgres::{PostgresConfig, PostgresStore};
use wayfarer_store::{KeyValueStore, MemoryKeyValueStore, RedisKeyValueStore};

use wayfarer_api::auth::USER_ID_HEADER;
use wayfarer_api::{create_router, ApiConfig, AppState, Backends};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfarer_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();
    let layered = load_layered_config(&config);
    let embedder_config = config.embedder(&layered);

    tracing::info!(
        port = config.port,
        embedder_model = %embedder_config.model,
        embedder_dim = embedder_config.dimensions,
        "Starting Wayfarer API server"
    );

    let embedder = Arc::new(OllamaEmbedder::new(
        embedder_config.base_url,
        embedder_config.model,
        embedder_config.dimensions,
    ));

    let directions: Arc<dyn DirectionsProvider> = match &config.mapbox_token {
        Some(token) => Arc::new(MapboxDirections::new(token.clone())),
        None => {
            tracing::warn!(
                "MAPBOX_ACCESS_TOKEN not set, using straight-line directions"
            );
            Arc::new(StraightLineDirections::new())
        }
    };

    let mut backends = Backends::in_memory(embedder, directions);

    // Initialize storage backend based on DATABASE_URL environment variable
    if config.uses_postgres() {
        tracing::info!("DATABASE_URL found, connecting to PostgreSQL...");
        match init_postgres_storage().await {
            Ok(store) => {
                backends.geo_index = store.clone();
                backends.prompts = store.clone();
                backends.routes = store.clone();
                backends.votes = store;
            }
            Err(e) => {
                tracing::error!("Failed to connect to PostgreSQL: {}", e);
                tracing::error!(
                    "Remediation:\n\
                    1. Ensure PostgreSQL is running with the vector and postgis extensions\n\
                    2. Verify DATABASE_URL is correct\n\
                    3. Run `wayfarer db migrate` or set WAYFARER_AUTO_MIGRATE=true"
                );
                std::process::exit(1);
            }
        }
    } else {
        tracing::info!("Using in-memory storage (set DATABASE_URL for PostgreSQL)");
    }

    backends.kv = match &config.redis_url {
        Some(url) => match RedisKeyValueStore::connect(url).await {
            Ok(store) => Arc::new(store) as Arc<dyn KeyValueStore>,
            Err(e) => {
                tracing::error!("Failed to connect to Redis: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("Using in-memory key-value store (set REDIS_URL for Redis)");
            Arc::new(MemoryKeyValueStore::new())
        }
    };

    let state = Arc::new(AppState::new(backends, &layered));

    let origin = match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => origin,
        Err(e) => {
            tracing::error!(origin = %config.cors_origin, "Invalid CORS origin: {}", e);
            std::process::exit(1);
        }
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)]);

    let app = create_router(state).layer(cors);

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.cors_origin);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Defaults, then the optional config file, then the environment
fn load_layered_config(config: &ApiConfig) -> LayeredConfig {
    let layered = match &config.config_path {
        Some(path) => match LayeredConfig::with_defaults().load_from_file(path) {
            Ok(layered) => layered,
            Err(e) => {
                tracing::error!(path = %path.display(), "Failed to load config file: {}", e);
                std::process::exit(1);
            }
        },
        None => LayeredConfig::with_defaults(),
    };

    let layered = layered.load_from_env();
    if let Err(e) = layered.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    layered
}

/// Initialize PostgreSQL storage from the environment
async fn init_postgres_storage() -> Result<Arc<PostgresStore>, String> {
    let config =
        PostgresConfig::from_env().map_err(|e| format!("Invalid database configuration: {}", e))?;

    PostgresStore::connect(config)
        .await
        .map(Arc::new)
        .map_err(|e| format!("Connection failed: {}", e))
}
