//! Logging initialisation
//!
//! The engine itself only emits `tracing` events. Binaries that drive the
//! runner can install a subscriber with [`init_logging`].

use std::io;

use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::BoxError;

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug")
    pub level: String,
    /// Directive string such as "arcanox=debug"; overrides `level`
    pub env_filter: Option<String>,
    pub format: LogFormat,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            env_filter: None,
            format: LogFormat::Compact,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            env_filter: Some("arcanox=debug".to_string()),
            format: LogFormat::Pretty,
            include_location: true,
        }
    }

    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            env_filter: Some("arcanox=info".to_string()),
            format: LogFormat::Json,
            include_location: false,
        }
    }

    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Directive used when `RUST_LOG` is not set
    pub fn directive(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(&self.level)
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the config.
pub fn init_logging(config: LoggingConfig) -> Result<(), BoxError> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(config.directive()))?;

    let layer = Layer::new()
        .with_writer(io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty())
            .try_init()?,
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()?,
    }

    tracing::debug!(
        target: "arcanox::logging",
        level = %config.level,
        format = ?config.format,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_prefers_env_filter() {
        let config = LoggingConfig::default();
        assert_eq!(config.directive(), "info");

        let config = config.with_env_filter("arcanox=trace");
        assert_eq!(config.directive(), "arcanox=trace");
    }

    #[test]
    fn test_presets() {
        assert_eq!(LoggingConfig::production().format, LogFormat::Json);
        assert!(LoggingConfig::development().include_location);
    }

    #[test]
    fn test_second_init_fails_without_panicking() {
        let _ = init_logging(LoggingConfig::default());
        assert!(init_logging(LoggingConfig::default()).is_err());
    }
}
