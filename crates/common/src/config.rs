//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Uploaded image storage.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Page cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this site.
    pub url: String,
    /// Whether the session cookie is marked `Secure`.
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Local storage settings for uploaded post images.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory uploaded files are written to.
    #[serde(default = "default_storage_path")]
    pub base_path: PathBuf,
    /// URL prefix the files are served under.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
    /// Largest accepted upload.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
            base_url: default_storage_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Page cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long the rendered index page stays cached.
    #[serde(default = "default_index_ttl")]
    pub index_ttl_secs: u64,
    /// Redis URL. When absent the in-process cache is used.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Key prefix for Redis entries.
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            index_ttl_secs: default_index_ttl(),
            redis_url: None,
            prefix: default_cache_prefix(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./media")
}

fn default_storage_url() -> String {
    "/media".to_string()
}

const fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

const fn default_index_ttl() -> u64 {
    20
}

fn default_cache_prefix() -> String {
    "yatube".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `YATUBE_ENV`)
    /// 3. Environment variables with `YATUBE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("YATUBE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("YATUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("YATUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
