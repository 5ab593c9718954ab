//! Migration engine configuration
//!
//! [`MigrationConfig`] can be built in code or loaded from `ARCANOX_*`
//! environment variables. Call [`MigrationConfig::validate`] before handing it
//! to a runner.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ArcanoxError, ArcanoxResult};

pub const DEFAULT_MIGRATIONS_TABLE: &str = "arcanox_migrations";
pub const DEFAULT_MIGRATIONS_PATH: &str = "database/migrations";
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by the resolver, repository and runner
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationConfig {
    /// Directories scanned for migration files, in priority order
    pub migration_paths: Vec<PathBuf>,
    /// Name of the tracking table
    pub table: String,
    /// Recognised migration file extensions, without the dot
    pub extensions: Vec<String>,
    pub seeders_path: Option<PathBuf>,
    /// Per-migration wall-clock timeout
    pub timeout: Option<Duration>,
    pub use_advisory_lock: bool,
    pub lock_timeout: Duration,
    /// Suppress the human-readable status lines
    pub quiet: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migration_paths: vec![PathBuf::from(DEFAULT_MIGRATIONS_PATH)],
            table: DEFAULT_MIGRATIONS_TABLE.to_string(),
            extensions: vec!["rs".to_string(), "sql".to_string()],
            seeders_path: None,
            timeout: None,
            use_advisory_lock: false,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            quiet: false,
        }
    }
}

impl MigrationConfig {
    pub fn new<P: Into<PathBuf>>(migrations_path: P) -> Self {
        Self {
            migration_paths: vec![migrations_path.into()],
            ..Self::default()
        }
    }

    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> ArcanoxResult<Self> {
        let mut config = Self::default();

        if let Ok(paths) = env::var("ARCANOX_MIGRATIONS_PATH") {
            let parsed: Vec<PathBuf> = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if parsed.is_empty() {
                return Err(invalid_env(
                    "ARCANOX_MIGRATIONS_PATH",
                    &paths,
                    "at least one directory",
                ));
            }
            config.migration_paths = parsed;
        }

        config.table = get_env_or_default("ARCANOX_MIGRATIONS_TABLE", DEFAULT_MIGRATIONS_TABLE);

        if let Ok(path) = env::var("ARCANOX_SEEDERS_PATH") {
            config.seeders_path = Some(PathBuf::from(path));
        }

        if let Ok(raw) = env::var("ARCANOX_MIGRATION_TIMEOUT_MS") {
            let millis: u64 = parse_env("ARCANOX_MIGRATION_TIMEOUT_MS", &raw, "milliseconds")?;
            config.timeout = Some(Duration::from_millis(millis));
        }

        if let Ok(raw) = env::var("ARCANOX_ADVISORY_LOCK") {
            config.use_advisory_lock = parse_bool("ARCANOX_ADVISORY_LOCK", &raw)?;
        }

        if let Ok(raw) = env::var("ARCANOX_QUIET") {
            config.quiet = parse_bool("ARCANOX_QUIET", &raw)?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> ArcanoxResult<()> {
        if self.table.trim().is_empty() {
            return Err(ArcanoxError::configuration(
                "Migrations table name cannot be empty",
            ));
        }

        if self.migration_paths.is_empty() {
            return Err(ArcanoxError::configuration(
                "At least one migrations path must be configured",
            ));
        }

        if self.extensions.is_empty() {
            return Err(ArcanoxError::configuration(
                "At least one migration file extension must be configured",
            ));
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(ArcanoxError::configuration(
                "Migration timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.migration_paths.push(path.into());
        self
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_seeders_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.seeders_path = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_advisory_lock(mut self, lock_timeout: Duration) -> Self {
        self.use_advisory_lock = true;
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn invalid_env(key: &str, value: &str, expected: &str) -> ArcanoxError {
    ArcanoxError::configuration(format!(
        "Invalid value for {}: '{}', expected {}",
        key, value, expected
    ))
}

fn parse_env<T: FromStr>(key: &str, value: &str, expected: &str) -> ArcanoxResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid_env(key, value, expected))
}

fn parse_bool(key: &str, value: &str) -> ArcanoxResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid_env(key, value, "a boolean (true/false)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "ARCANOX_MIGRATIONS_PATH",
        "ARCANOX_MIGRATIONS_TABLE",
        "ARCANOX_SEEDERS_PATH",
        "ARCANOX_MIGRATION_TIMEOUT_MS",
        "ARCANOX_ADVISORY_LOCK",
        "ARCANOX_QUIET",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = MigrationConfig::from_env().unwrap();

        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.table, "arcanox_migrations");
        assert_eq!(config.extensions, vec!["rs", "sql"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        let joined = env::join_paths(["db/core", "db/plugins"]).unwrap();
        env::set_var("ARCANOX_MIGRATIONS_PATH", &joined);
        env::set_var("ARCANOX_MIGRATIONS_TABLE", "schema_history");
        env::set_var("ARCANOX_MIGRATION_TIMEOUT_MS", "2500");
        env::set_var("ARCANOX_ADVISORY_LOCK", "true");
        env::set_var("ARCANOX_QUIET", "1");

        let config = MigrationConfig::from_env().unwrap();
        assert_eq!(
            config.migration_paths,
            vec![PathBuf::from("db/core"), PathBuf::from("db/plugins")]
        );
        assert_eq!(config.table, "schema_history");
        assert_eq!(config.timeout, Some(Duration::from_millis(2500)));
        assert!(config.use_advisory_lock);
        assert!(config.quiet);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_value_names_variable() {
        clear_env();
        env::set_var("ARCANOX_MIGRATION_TIMEOUT_MS", "soon");

        match MigrationConfig::from_env() {
            Err(ArcanoxError::Configuration(msg)) => {
                assert!(msg.contains("ARCANOX_MIGRATION_TIMEOUT_MS"))
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }

        clear_env();
    }

    #[test]
    fn test_validation_rules() {
        assert!(MigrationConfig::default().with_table(" ").validate().is_err());
        assert!(MigrationConfig::default()
            .with_extensions(&[])
            .validate()
            .is_err());
        assert!(MigrationConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());

        let mut no_paths = MigrationConfig::default();
        no_paths.migration_paths.clear();
        assert!(no_paths.validate().is_err());
    }
}
