use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::limits::MAX_POPULAR_LIMIT;
use crate::constants::search::{DEFAULT_RADIUS, RADIUS_OPTIONS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub geocoding: GeocodingConfig,

    pub places: PlacesConfig,

    pub search: SearchConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/destinations.db".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 5000,
            cors_allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,

    /// Overridden by the `GEOCODING_API_KEY` environment variable.
    pub api_key: String,

    pub request_timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.opencagedata.com/geocode/v1/json".to_string(),
            api_key: String::new(),
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub base_url: String,

    /// Overridden by the `PLACES_API_KEY` environment variable.
    pub api_key: String,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.foursquare.com/v3/places/search".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub min_query_length: usize,

    pub min_keyword_length: usize,

    /// Radius in metres used when a request does not pick one
    pub default_radius: u32,

    pub radius_options: Vec<u32>,

    pub popular_limit: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            min_keyword_length: 2,
            default_radius: DEFAULT_RADIUS,
            radius_options: RADIUS_OPTIONS.to_vec(),
            popular_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    pub min_username_length: usize,

    pub min_password_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            min_username_length: 3,
            min_password_length: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            geocoding: GeocodingConfig::default(),
            places: PlacesConfig::default(),
            search: SearchConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env is fine; keys may come from the real environment.
        let _ = dotenvy::dotenv();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides();

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GEOCODING_API_KEY")
            && !key.is_empty()
        {
            self.geocoding.api_key = key;
        }

        if let Ok(key) = std::env::var("PLACES_API_KEY")
            && !key.is_empty()
        {
            self.places.api_key = key;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("destination-finder").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".destination-finder").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.min_query_length == 0 {
            anyhow::bail!("search.min_query_length must be at least 1");
        }

        if self.search.min_keyword_length == 0 {
            anyhow::bail!("search.min_keyword_length must be at least 1");
        }

        if self.search.radius_options.is_empty() {
            anyhow::bail!("search.radius_options cannot be empty");
        }

        if !self
            .search
            .radius_options
            .contains(&self.search.default_radius)
        {
            anyhow::bail!(
                "search.default_radius ({}) must be one of search.radius_options",
                self.search.default_radius
            );
        }

        if self.search.popular_limit == 0 || self.search.popular_limit > MAX_POPULAR_LIMIT {
            anyhow::bail!("search.popular_limit must be between 1 and {MAX_POPULAR_LIMIT}");
        }

        if self.geocoding.base_url.is_empty() || self.places.base_url.is_empty() {
            anyhow::bail!("Geocoding and places base URLs cannot be empty");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }
}
