//! Logging system configuration and initialization
//!
//! Sets up a `tracing` subscriber with:
//! - `RUST_LOG` override, otherwise the configured level plus quieter dependency filters
//! - Console output on stderr (plain or JSON)
//! - Optional non-rotating log file via `tracing-appender`
//!
//! The extraction pipeline itself never writes files; it reports through
//! `tracing` macros and the injected search event sink.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use chrono::Local;
use once_cell::sync::Lazy;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

// Keeps the non-blocking file writer alive for the life of the process
static LOG_GUARDS: Lazy<Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

/// Local time with millisecond precision
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Build the env filter: `RUST_LOG` wins, otherwise config level and module filters
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    // Dependency noise only shows up when tracing everything
    if !config.level.eq_ignore_ascii_case("trace") {
        for (module, level) in &config.module_filters {
            let directive = format!("{module}={level}")
                .parse()
                .map_err(|e| anyhow!("Invalid log filter '{}={}': {}", module, level, e))?;
            filter = filter.add_directive(directive);
        }
    }

    Ok(filter)
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(config)?;

    let console_layer = config.console_output.then(|| {
        let layer = fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_timer(LocalTimeFormatter)
            .with_target(false);
        if config.json_format {
            layer.json().boxed()
        } else {
            layer.boxed()
        }
    });

    let file_layer = match &config.file_directory {
        Some(directory) => {
            let log_dir = PathBuf::from(directory);
            std::fs::create_dir_all(&log_dir)
                .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

            let file_appender = rolling::never(&log_dir, &config.file_name);
            let (file_writer, file_guard) = non_blocking(file_appender);
            LOG_GUARDS
                .lock()
                .map_err(|_| anyhow!("Log guard registry poisoned"))?
                .push(file_guard);

            let layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(LocalTimeFormatter)
                .with_ansi(false);
            Some(if config.json_format {
                layer.json().with_target(true).with_file(true).with_line_number(true).boxed()
            } else {
                layer.with_target(false).boxed()
            })
        }
        None => None,
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Logging initialized at level {}", config.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_env_filter_accepts_default_config() {
        assert!(build_env_filter(&LoggingConfig::default()).is_ok());
    }

    #[test]
    fn test_build_env_filter_rejects_bad_module_filter() {
        // RUST_LOG would bypass the config path entirely
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let mut config = LoggingConfig::default();
        config
            .module_filters
            .insert("reqwest".to_string(), "not a level!".to_string());
        assert!(build_env_filter(&config).is_err());
    }
}
