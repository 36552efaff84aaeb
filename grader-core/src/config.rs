//! Configuration management for Grader
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GRADER_*)
//! 3. Config file (~/.config/grader/config.toml)
//! 4. Default values
//!
//! Credentials are not part of the configuration; see [`crate::Secrets`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the GitHub REST API
    pub api_base: String,

    /// Timeout applied to every request against the API and raw downloads
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Rules deciding which repository files end up in the prompt
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// File name suffixes worth reviewing. An empty list admits every file.
    pub reviewable_suffixes: Vec<String>,

    /// Exact file names that are never reviewed
    pub excluded_files: Vec<String>,

    /// Exact directory names that are never descended into
    pub excluded_dirs: Vec<String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        let suffixes = [
            ".py", ".rs", ".go", ".js", ".jsx", ".ts", ".tsx", ".java", ".kt", ".rb", ".php",
            ".cs", ".c", ".h", ".cpp", ".hpp", ".swift", ".scala", ".sql", ".md",
        ];
        let dirs = [
            ".git", ".github", "node_modules", "venv", ".venv", "__pycache__", "target", "dist",
            "build",
        ];

        Self {
            reviewable_suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
            excluded_files: Vec::new(),
            excluded_dirs: dirs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Backoff settings for the model call
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Shortest wait between attempts
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,

    /// Longest wait between attempts
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Language model configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier sent with every completion request
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    pub api_base: String,

    /// Timeout for a single completion request
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Retry policy for transient failures
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
            retry: RetryConfig::default(),
        }
    }
}

/// Review cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection URL
    pub redis_url: String,

    /// Time-to-live of a cached review, in seconds
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// Time-to-live as a duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            ttl_secs: 3600,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the review endpoint listens on
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration
    pub github: GitHubConfig,

    /// File selection rules
    pub review: ReviewConfig,

    /// Language model configuration
    pub llm: LlmConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Server configuration
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/grader/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("grader").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GRADER_GITHUB_API: GitHub API base URL
    /// - GRADER_REVIEWABLE_SUFFIXES: comma-separated file suffixes
    /// - GRADER_EXCLUDED_FILES: comma-separated file names
    /// - GRADER_EXCLUDED_DIRS: comma-separated directory names
    /// - GRADER_MODEL: model identifier
    /// - GRADER_LLM_API: model API base URL
    /// - GRADER_CACHE_TTL: cache time-to-live in seconds
    /// - GRADER_REDIS_URL: Redis connection URL
    /// - GRADER_BIND: server listen address
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api) = lookup("GRADER_GITHUB_API") {
            self.github.api_base = api;
        }

        if let Some(suffixes) = lookup("GRADER_REVIEWABLE_SUFFIXES") {
            self.review.reviewable_suffixes = split_list(&suffixes);
        }

        if let Some(files) = lookup("GRADER_EXCLUDED_FILES") {
            self.review.excluded_files = split_list(&files);
        }

        if let Some(dirs) = lookup("GRADER_EXCLUDED_DIRS") {
            self.review.excluded_dirs = split_list(&dirs);
        }

        if let Some(model) = lookup("GRADER_MODEL") {
            self.llm.model = model;
        }

        if let Some(api) = lookup("GRADER_LLM_API") {
            self.llm.api_base = api;
        }

        if let Some(ttl) = lookup("GRADER_CACHE_TTL") {
            self.cache.ttl_secs = ttl.trim().parse().map_err(|e| {
                Error::Config(format!("GRADER_CACHE_TTL must be a number of seconds: {}", e))
            })?;
        }

        if let Some(url) = lookup("GRADER_REDIS_URL") {
            self.cache.redis_url = url;
        }

        if let Some(bind) = lookup("GRADER_BIND") {
            self.server.bind = bind
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("GRADER_BIND is not a socket address: {}", e)))?;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, model: Option<String>, bind: Option<SocketAddr>) -> Self {
        if let Some(m) = model {
            self.llm.model = m;
        }

        if let Some(addr) = bind {
            self.server.bind = addr;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(model: Option<String>, bind: Option<SocketAddr>) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(model, bind);
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(Error::Config("Model identifier must not be empty".to_string()));
        }

        if self.cache.ttl_secs == 0 {
            return Err(Error::Config("Cache TTL must be at least one second".to_string()));
        }

        if self.llm.retry.max_attempts == 0 {
            return Err(Error::Config("Retry policy needs at least one attempt".to_string()));
        }

        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
