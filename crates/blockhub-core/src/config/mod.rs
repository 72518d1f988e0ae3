//! Configuration management

use crate::error::Result;
use crate::search::{SuggestionConfig, DEFAULT_EXCERPT_LENGTH, MAX_QUERY_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the SQLite database location
pub const DATABASE_ENV: &str = "BLOCKHUB_DB";

/// Environment variable for the platform API base URL
pub const API_URL_ENV: &str = "BLOCKHUB_API_URL";

/// Environment variable for the platform API token
pub const API_KEY_ENV: &str = "BLOCKHUB_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Search pipeline settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Word lists for corrections and popular searches
    #[serde(default)]
    pub suggestions: SuggestionConfig,

    /// Platform REST API used by `--remote`
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// How the page budget is spread over the queried modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaginationStrategy {
    /// Every module returns `offset + limit` items from the top
    #[default]
    OverFetch,
    /// Every module returns `ceil(limit / n)` items from `floor(offset / n)`
    Divided,
}

impl PaginationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OverFetch => "over-fetch",
            Self::Divided => "divided",
        }
    }

    /// Per-module `(limit, offset)` for a request page over `modules` modules
    pub fn window(&self, limit: usize, offset: usize, modules: usize) -> (usize, usize) {
        let modules = modules.max(1);
        match self {
            Self::OverFetch => (offset.saturating_add(limit), 0),
            Self::Divided => (limit.div_ceil(modules), offset / modules),
        }
    }
}

/// Search pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub pagination: PaginationStrategy,

    /// Character budget for excerpts derived from content
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,

    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

fn default_excerpt_length() -> usize {
    DEFAULT_EXCERPT_LENGTH
}

fn default_max_query_length() -> usize {
    MAX_QUERY_LENGTH
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationStrategy::default(),
            excerpt_length: default_excerpt_length(),
            max_query_length: default_max_query_length(),
        }
    }
}

/// Platform REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the platform, e.g. `https://community.example.net`
    #[serde(default)]
    pub url: Option<String>,

    /// Bearer token (optional)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: std::env::var(API_URL_ENV).ok(),
            api_key: std::env::var(API_KEY_ENV).ok(),
            timeout_secs: default_timeout(),
        }
    }
}

impl RemoteConfig {
    /// Apply environment overrides on top of file values
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.url = Some(url);
        }
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.api_key = Some(key);
        }
    }
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a path, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            Config::default()
        };
        config.remote.apply_env();
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// SQLite store location, `BLOCKHUB_DB` taking precedence
    pub fn database_path() -> PathBuf {
        if let Ok(path) = std::env::var(DATABASE_ENV) {
            return PathBuf::from(path);
        }
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("content.sqlite")
    }
}
