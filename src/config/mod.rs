// src/config/mod.rs
//! Configuration management module
//!
//! Settings come from built-in defaults, then a TOML file, then environment
//! variables, and are validated before the server or CLI touches any store.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::resources;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub hosted: HostedConfig,
    pub proxy: ProxyConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// `development` or `production`; production hides error details
    pub environment: String,
}

/// Where each collection lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON collection files
    pub data_dir: PathBuf,
    /// Backend for collections without an entry in `backends`
    pub default_backend: Backend,
    /// Per-collection overrides keyed by API path, e.g. `islahimajalis = "hosted"`
    pub backends: BTreeMap<String, Backend>,
}

/// Hosted table service (PostgREST / Supabase)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Audio proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub user_agent: String,
    /// Only the connect phase is bounded; bodies stream for as long as the client listens.
    pub connect_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub log_requests: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Hosted,
    Memory,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Backend::File),
            "hosted" => Ok(Backend::Hosted),
            "memory" => Ok(Backend::Memory),
            other => Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::File => "file",
            Backend::Hosted => "hosted",
            Backend::Memory => "memory",
        };
        f.write_str(name)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            default_backend: Backend::File,
            backends: BTreeMap::new(),
        }
    }
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("daruleman-audio-proxy/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_requests: true,
        }
    }
}

impl Config {
    /// Load configuration from `explicit`, or the first config file found,
    /// then apply environment variables and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit.map(Path::to_path_buf).or_else(Self::locate) {
            Some(path) => Self::load_from_file(&path)?,
            None => Config::default(),
        };

        config.load_from_env()?;
        config.validate()?;

        Ok(config)
    }

    /// `./config.toml`, then `<config dir>/daruleman/config.toml`
    fn locate() -> Option<PathBuf> {
        let mut candidates = vec![PathBuf::from("config.toml")];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("daruleman").join("config.toml"));
        }
        candidates.into_iter().find(|path| path.is_file())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port.parse().context("Invalid SERVER_PORT")?;
        }
        if let Some(environment) = lookup("APP_ENV") {
            self.server.environment = environment;
        }

        if let Some(data_dir) = lookup("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            self.storage.default_backend = backend.parse().context("Invalid STORAGE_BACKEND")?;
        }

        if let Some(url) = lookup("HOSTED_URL") {
            self.hosted.url = url;
        }
        if let Some(api_key) = lookup("HOSTED_API_KEY") {
            self.hosted.api_key = api_key;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        match self.server.environment.as_str() {
            "development" | "production" => {}
            other => return Err(anyhow::anyhow!("Invalid environment: {}", other)),
        }

        for name in self.storage.backends.keys() {
            if !resources::PATHS.contains(&name.as_str()) {
                return Err(anyhow::anyhow!(
                    "Unknown collection in storage.backends: {}. Known collections: {}",
                    name,
                    resources::PATHS.join(", ")
                ));
            }
        }

        let backends: Vec<Backend> = resources::PATHS
            .iter()
            .map(|path| self.storage.backend_for(path))
            .collect();

        if backends.contains(&Backend::Hosted) {
            if !(self.hosted.url.starts_with("http://") || self.hosted.url.starts_with("https://")) {
                return Err(anyhow::anyhow!(
                    "hosted.url must be an http(s) URL when a collection uses the hosted backend"
                ));
            }
            if self.hosted.api_key.is_empty() {
                return Err(anyhow::anyhow!(
                    "hosted.api_key is required when a collection uses the hosted backend"
                ));
            }
        }

        if backends.contains(&Backend::File) && !self.storage.data_dir.exists() {
            std::fs::create_dir_all(&self.storage.data_dir)
                .context("Failed to create data directory")?;
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(anyhow::anyhow!("Invalid log level: {}", self.logging.level)),
        }

        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether error responses may carry the underlying failure message
    pub fn expose_error_details(&self) -> bool {
        self.server.environment != "production"
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Copy safe to print: the hosted API key is masked.
    pub fn redacted(&self) -> Config {
        let mut config = self.clone();
        if !config.hosted.api_key.is_empty() {
            config.hosted.api_key = REDACTED.to_string();
        }
        config
    }
}

const REDACTED: &str = "********";

impl StorageConfig {
    pub fn backend_for(&self, path: &str) -> Backend {
        self.backends
            .get(path)
            .copied()
            .unwrap_or(self.default_backend)
    }
}
