use crate::error::{Result, WayfarerError};
use crate::models::TravelProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Defaults applied to search requests that omit thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDefaults {
    pub distance_threshold: f64,
    pub similarity_threshold: f64,
    pub negative_similarity_threshold: f64,
    pub candidate_limit: usize,
    pub travel_profile: TravelProfile,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            distance_threshold: 500.0,
            similarity_threshold: 0.0,
            negative_similarity_threshold: 1.0,
            candidate_limit: 10,
            travel_profile: TravelProfile::Walking,
        }
    }
}

/// TTLs for the two cache families
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub detail_ttl: Duration,
    pub vote_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { detail_ttl: Duration::from_secs(60 * 60), vote_ttl: Duration::from_secs(60) }
    }
}

/// Feed publication and paging settings
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    /// Lifetime of a publication's expiry marker
    pub expiry: Duration,
    /// Largest page a single top-N read may request
    pub max_page_limit: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self { expiry: Duration::from_secs(24 * 3600), max_page_limit: 50 }
    }
}

/// Layered configuration for Wayfarer
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub distance_threshold: ConfigValue<f64>,
    pub similarity_threshold: ConfigValue<f64>,
    pub negative_similarity_threshold: ConfigValue<f64>,
    pub candidate_limit: ConfigValue<usize>,
    pub travel_profile: ConfigValue<TravelProfile>,
    pub detail_cache_ttl_secs: ConfigValue<u64>,
    pub vote_cache_ttl_secs: ConfigValue<u64>,
    pub feed_expiry_secs: ConfigValue<u64>,
    pub feed_page_limit: ConfigValue<usize>,
    pub embedder_model: ConfigValue<String>,
    pub embedder_dimensions: ConfigValue<usize>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let search = SearchDefaults::default();
        let cache = CacheSettings::default();
        let feed = FeedSettings::default();

        Self {
            distance_threshold: ConfigValue::new(search.distance_threshold, ConfigSource::Default),
            similarity_threshold: ConfigValue::new(
                search.similarity_threshold,
                ConfigSource::Default,
            ),
            negative_similarity_threshold: ConfigValue::new(
                search.negative_similarity_threshold,
                ConfigSource::Default,
            ),
            candidate_limit: ConfigValue::new(search.candidate_limit, ConfigSource::Default),
            travel_profile: ConfigValue::new(search.travel_profile, ConfigSource::Default),
            detail_cache_ttl_secs: ConfigValue::new(
                cache.detail_ttl.as_secs(),
                ConfigSource::Default,
            ),
            vote_cache_ttl_secs: ConfigValue::new(cache.vote_ttl.as_secs(), ConfigSource::Default),
            feed_expiry_secs: ConfigValue::new(feed.expiry.as_secs(), ConfigSource::Default),
            feed_page_limit: ConfigValue::new(feed.max_page_limit, ConfigSource::Default),
            embedder_model: ConfigValue::new("all-minilm".to_string(), ConfigSource::Default),
            embedder_dimensions: ConfigValue::new(384, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| WayfarerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| WayfarerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(search) = file_config.search {
            if let Some(v) = search.distance_threshold {
                self.distance_threshold.update(v, ConfigSource::File);
            }
            if let Some(v) = search.similarity_threshold {
                self.similarity_threshold.update(v, ConfigSource::File);
            }
            if let Some(v) = search.negative_similarity_threshold {
                self.negative_similarity_threshold.update(v, ConfigSource::File);
            }
            if let Some(v) = search.candidate_limit {
                self.candidate_limit.update(v, ConfigSource::File);
            }
            if let Some(v) = search.travel_profile {
                self.travel_profile.update(v, ConfigSource::File);
            }
        }

        if let Some(cache) = file_config.cache {
            if let Some(v) = cache.detail_ttl_secs {
                self.detail_cache_ttl_secs.update(v, ConfigSource::File);
            }
            if let Some(v) = cache.vote_ttl_secs {
                self.vote_cache_ttl_secs.update(v, ConfigSource::File);
            }
        }

        if let Some(feed) = file_config.feed {
            if let Some(v) = feed.expiry_secs {
                self.feed_expiry_secs.update(v, ConfigSource::File);
            }
            if let Some(v) = feed.page_limit {
                self.feed_page_limit.update(v, ConfigSource::File);
            }
        }

        if let Some(embedder) = file_config.embedder {
            if let Some(v) = embedder.model {
                self.embedder_model.update(v, ConfigSource::File);
            }
            if let Some(v) = embedder.dimensions {
                self.embedder_dimensions.update(v, ConfigSource::File);
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Some(v) = env_value("WAYFARER_DISTANCE_THRESHOLD") {
            self.distance_threshold.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_value("WAYFARER_SIMILARITY_THRESHOLD") {
            self.similarity_threshold.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_value("WAYFARER_NEGATIVE_SIMILARITY_THRESHOLD") {
            self.negative_similarity_threshold.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_value("WAYFARER_CANDIDATE_LIMIT") {
            self.candidate_limit.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_value("WAYFARER_TRAVEL_PROFILE") {
            self.travel_profile.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_value("WAYFARER_DETAIL_CACHE_TTL") {
            self.detail_cache_ttl_secs.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_value("WAYFARER_VOTE_CACHE_TTL") {
            self.vote_cache_ttl_secs.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_value("WAYFARER_FEED_EXPIRY") {
            self.feed_expiry_secs.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_value("WAYFARER_FEED_PAGE_LIMIT") {
            self.feed_page_limit.update(v, ConfigSource::Environment);
        }
        if let Ok(model) = env::var("WAYFARER_EMBEDDER_MODEL") {
            self.embedder_model.update(model, ConfigSource::Environment);
        }
        if let Some(v) = env_value("WAYFARER_EMBEDDER_DIM") {
            self.embedder_dimensions.update(v, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(v) = overrides.travel_profile {
            self.travel_profile.update(v, ConfigSource::Cli);
        }
        if let Some(v) = overrides.embedder_model {
            self.embedder_model.update(v, ConfigSource::Cli);
        }
        if let Some(v) = overrides.feed_page_limit {
            self.feed_page_limit.update(v, ConfigSource::Cli);
        }
    }

    /// Reject values that would make the engines misbehave
    pub fn validate(&self) -> Result<()> {
        if !self.distance_threshold.value.is_finite() || self.distance_threshold.value <= 0.0 {
            return Err(WayfarerError::ConfigInvalid {
                key: "search.distance_threshold".to_string(),
                reason: "must be a positive number of meters".to_string(),
            });
        }
        if self.candidate_limit.value == 0 {
            return Err(WayfarerError::ConfigInvalid {
                key: "search.candidate_limit".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.feed_page_limit.value == 0 {
            return Err(WayfarerError::ConfigInvalid {
                key: "feed.page_limit".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.feed_expiry_secs.value == 0 {
            return Err(WayfarerError::ConfigInvalid {
                key: "feed.expiry_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn search_defaults(&self) -> SearchDefaults {
        SearchDefaults {
            distance_threshold: self.distance_threshold.value,
            similarity_threshold: self.similarity_threshold.value,
            negative_similarity_threshold: self.negative_similarity_threshold.value,
            candidate_limit: self.candidate_limit.value,
            travel_profile: self.travel_profile.value,
        }
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            detail_ttl: Duration::from_secs(self.detail_cache_ttl_secs.value),
            vote_ttl: Duration::from_secs(self.vote_cache_ttl_secs.value),
        }
    }

    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            expiry: Duration::from_secs(self.feed_expiry_secs.value),
            max_page_limit: self.feed_page_limit.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        let mut put = |key: &str, value: String, source: ConfigSource| {
            map.insert(key.to_string(), (value, source));
        };

        put(
            "search.distance_threshold",
            format!("{}m", self.distance_threshold.value),
            self.distance_threshold.source,
        );
        put(
            "search.similarity_threshold",
            self.similarity_threshold.value.to_string(),
            self.similarity_threshold.source,
        );
        put(
            "search.negative_similarity_threshold",
            self.negative_similarity_threshold.value.to_string(),
            self.negative_similarity_threshold.source,
        );
        put(
            "search.candidate_limit",
            self.candidate_limit.value.to_string(),
            self.candidate_limit.source,
        );
        put(
            "search.travel_profile",
            self.travel_profile.value.to_string(),
            self.travel_profile.source,
        );
        put(
            "cache.detail_ttl_secs",
            self.detail_cache_ttl_secs.value.to_string(),
            self.detail_cache_ttl_secs.source,
        );
        put(
            "cache.vote_ttl_secs",
            self.vote_cache_ttl_secs.value.to_string(),
            self.vote_cache_ttl_secs.source,
        );
        put(
            "feed.expiry_secs",
            self.feed_expiry_secs.value.to_string(),
            self.feed_expiry_secs.source,
        );
        put(
            "feed.page_limit",
            self.feed_page_limit.value.to_string(),
            self.feed_page_limit.source,
        );
        put("embedder.model", self.embedder_model.value.clone(), self.embedder_model.source);
        put(
            "embedder.dimensions",
            self.embedder_dimensions.value.to_string(),
            self.embedder_dimensions.source,
        );

        map
    }
}

/// Read and parse an environment variable, warning on malformed values
fn env_value<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Invalid {} value '{}': {}", key, raw, e);
            None
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    search: Option<SearchSection>,
    cache: Option<CacheSection>,
    feed: Option<FeedSection>,
    embedder: Option<EmbedderSection>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SearchSection {
    distance_threshold: Option<f64>,
    similarity_threshold: Option<f64>,
    negative_similarity_threshold: Option<f64>,
    candidate_limit: Option<usize>,
    travel_profile: Option<TravelProfile>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct CacheSection {
    detail_ttl_secs: Option<u64>,
    vote_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct FeedSection {
    expiry_secs: Option<u64>,
    page_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct EmbedderSection {
    model: Option<String>,
    dimensions: Option<usize>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub travel_profile: Option<TravelProfile>,
    pub embedder_model: Option<String>,
    pub feed_page_limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.distance_threshold.value, 500.0);
        assert_eq!(config.distance_threshold.source, ConfigSource::Default);
        assert_eq!(config.candidate_limit.value, 10);
        assert_eq!(config.detail_cache_ttl_secs.value, 3600);
        assert_eq!(config.vote_cache_ttl_secs.value, 60);
        assert_eq!(config.feed_expiry_secs.value, 86_400);
        assert_eq!(config.embedder_model.value, "all-minilm");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[search]
distance_threshold = 750.0
travel_profile = "cycling"

[cache]
vote_ttl_secs = 30

[feed]
page_limit = 20
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.distance_threshold.value, 750.0);
        assert_eq!(config.distance_threshold.source, ConfigSource::File);
        assert_eq!(config.travel_profile.value, TravelProfile::Cycling);
        assert_eq!(config.vote_cache_ttl_secs.value, 30);
        assert_eq!(config.feed_page_limit.value, 20);
        assert_eq!(config.detail_cache_ttl_secs.source, ConfigSource::Default);
    }

    #[test]
    fn test_load_from_file_rejects_zero_limit() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[search]\ncandidate_limit = 0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(WayfarerError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            travel_profile: Some(TravelProfile::Driving),
            embedder_model: None,
            feed_page_limit: Some(5),
        });

        assert_eq!(config.travel_profile.value, TravelProfile::Driving);
        assert_eq!(config.travel_profile.source, ConfigSource::Cli);
        assert_eq!(config.feed_settings().max_page_limit, 5);
        assert_eq!(config.embedder_model.source, ConfigSource::Default);
    }

    #[test]
    fn test_derived_settings() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.search_defaults(), SearchDefaults::default());
        assert_eq!(config.cache_settings(), CacheSettings::default());
        assert_eq!(config.feed_settings(), FeedSettings::default());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 11);
        let (distance, source) = &map["search.distance_threshold"];
        assert_eq!(distance, "500m");
        assert_eq!(*source, ConfigSource::Default);
    }
}
