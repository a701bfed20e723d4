//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Longest accepted cache lifetime (one year).
pub const MAX_TTL_SECS: u64 = 60 * 60 * 24 * 365;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Origin site layout
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP and fan-out behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Cache backend and expiry
    #[serde(default)]
    pub cache: CacheConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.base_url)
            .map_err(|e| AppError::validation(format!("source.base_url is invalid: {e}")))?;
        if !self.source.schedule_prefix.starts_with('/') {
            return Err(AppError::validation(
                "source.schedule_prefix must start with '/'",
            ));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        if self.cache.ttl_secs > MAX_TTL_SECS {
            return Err(AppError::validation(format!(
                "cache.ttl_secs must be <= {MAX_TTL_SECS}"
            )));
        }
        Ok(())
    }
}

/// Where the timetable lives on the origin site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Scheme and host of the origin site
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the group index page
    #[serde(default = "defaults::index_path")]
    pub index_path: String,

    /// Path prefix shared by every group schedule page
    #[serde(default = "defaults::schedule_prefix")]
    pub schedule_prefix: String,
}

impl SourceConfig {
    /// Absolute URL of the group index page.
    pub fn index_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.index_path
        )
    }

    /// Normalize a group reference (absolute URL, prefixed path or bare slug)
    /// into an absolute schedule URL.
    pub fn schedule_url(&self, reference: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let raw = if reference.starts_with("http") {
            reference.to_string()
        } else if reference.starts_with(&self.schedule_prefix) {
            format!("{base}{reference}")
        } else {
            format!("{base}{}{reference}", self.schedule_prefix)
        };

        url::Url::parse(&raw)
            .map(|u| u.to_string())
            .unwrap_or(raw)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            index_path: defaults::index_path(),
            schedule_prefix: defaults::schedule_prefix(),
        }
    }
}

/// HTTP client and fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between group fetches in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Maximum concurrent group fetches during fan-out
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: 0,
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Which cache store to put in front of the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Always fetch from the network
    None,
    /// In-process map, lost on exit; for long-lived embedders
    Memory,
    /// JSON files under `cache.dir`, shared between runs
    #[default]
    File,
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    /// Directory for the file backend
    #[serde(default = "defaults::cache_dir")]
    pub dir: String,

    /// Lifetime of every cache entry in seconds
    #[serde(default = "defaults::ttl")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            dir: defaults::cache_dir(),
            ttl_secs: defaults::ttl(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn base_url() -> String {
        "https://omsk-osma.ru".into()
    }
    pub fn index_path() -> String {
        "/shedule_kolledzh".into()
    }
    pub fn schedule_prefix() -> String {
        "/shedule_kolledzh/".into()
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; schedule-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        5
    }

    // Cache defaults
    pub fn cache_dir() -> String {
        "cache".into()
    }
    pub fn ttl() -> u64 {
        60 * 60 * 24 * 7
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
