//! Configuration for the gateway.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Connection settings for the diffusion sidecar.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_sidecar_url")]
    pub base_url: String,
    #[serde(default = "default_image_dim")]
    pub width: u32,
    #[serde(default = "default_image_dim")]
    pub height: u32,
    #[serde(default = "default_steps")]
    pub steps: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: default_sidecar_url(),
            width: default_image_dim(),
            height: default_image_dim(),
            steps: default_steps(),
        }
    }
}

/// Where generated images land. The directory is served publicly at /static.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_root")]
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Bounds on generation execution.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Number of generation tasks allowed in flight at once.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// How long a request waits for its generation, queueing included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Hold a shared lock across the actual pipeline call. Set this when the
    /// underlying model is not safe for concurrent invocation.
    #[serde(default)]
    pub serialize_invocations: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
            serialize_invocations: false,
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_sidecar_url() -> String {
    "http://127.0.0.1:7860".to_string()
}
fn default_image_dim() -> u32 {
    512
}
fn default_steps() -> u32 {
    30
}
fn default_storage_root() -> String {
    "./static".to_string()
}
fn default_database_url() -> String {
    "sqlite:./data/prompts.db".to_string()
}
fn default_workers() -> usize {
    4
}
fn default_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (GATEWAY__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
