//! Configuration infrastructure
//!
//! Site endpoints, HTTP client behaviour and logging settings. Values are
//! layered from built-in defaults, an optional config file and
//! `COMPANY_SCOUT_*` environment variables. Only the binary loads them; the
//! extraction pipeline receives plain values.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Registry site endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin used to resolve relative detail links
    pub base_url: String,
    /// Segmentation listing endpoint (without query string)
    pub listing_url: String,
    /// Free-text search endpoint prefix
    pub free_text_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: allabolag::BASE_URL.to_string(),
            listing_url: allabolag::SEGMENTATION_PAGE.to_string(),
            free_text_url: allabolag::FREE_TEXT_PAGE.to_string(),
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output (stderr, so stdout stays clean for results)
    pub console_output: bool,

    /// Directory for an optional log file; no file is written when unset
    pub file_directory: Option<String>,

    /// Log file name inside `file_directory`
    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: true,
            file_directory: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl AppConfig {
    /// Environment prefix for overrides, e.g. `COMPANY_SCOUT_HTTP__TIMEOUT_SECONDS=10`
    pub const ENV_PREFIX: &'static str = "COMPANY_SCOUT";

    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder().add_source(
            config::Config::try_from(&Self::default()).context("Failed to serialize default configuration")?,
        );

        if let Some(path) = path {
            info!("Loading configuration from {}", path);
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.site.base_url)
            .with_context(|| format!("Invalid site base_url: {}", self.site.base_url))?;
        url::Url::parse(&self.site.listing_url)
            .with_context(|| format!("Invalid site listing_url: {}", self.site.listing_url))?;
        if self.http.timeout_seconds == 0 {
            anyhow::bail!("http.timeout_seconds must be greater than 0");
        }
        Ok(())
    }
}

/// allabolag.se endpoints
pub mod allabolag {
    /// Site origin
    pub const BASE_URL: &str = "https://www.allabolag.se";

    /// Segmentation listing page; filters are appended as a query string
    pub const SEGMENTATION_PAGE: &str = "https://www.allabolag.se/segmentering";

    /// Free-text search; the encoded query is appended as a path segment
    pub const FREE_TEXT_PAGE: &str = "https://www.allabolag.se/what";
}

/// Default configuration values
pub mod defaults {
    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON log format
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default log file name
    pub const LOG_FILE_NAME: &str = "company-scout.log";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.site.listing_url, "https://www.allabolag.se/segmentering");
        assert_eq!(config.http.timeout_seconds, 30);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.site.base_url, allabolag::BASE_URL);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = AppConfig::default();
        config.http.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
