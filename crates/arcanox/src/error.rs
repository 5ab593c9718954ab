//! Error types for the migration engine
//!
//! Fatal conditions are reported through [`ArcanoxError`]. Integrity problems
//! that should be collected rather than thrown (orphaned tracking records,
//! edited migration files) are modelled separately as [`IntegrityWarning`].

use std::path::PathBuf;
use std::time::Duration;

/// Boxed error produced by a database adapter or a migration body
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for all fallible engine operations
pub type ArcanoxResult<T> = Result<T, ArcanoxError>;

/// Error taxonomy of the migration engine
#[derive(Debug, thiserror::Error)]
pub enum ArcanoxError {
    /// Adapter not set, seeders path missing, unsupported backend requested
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Migration source missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// A migration's `up()`/`down()` failed; `source` is the native error
    #[error("Migration '{migration}' failed: {source}")]
    Execution {
        migration: String,
        #[source]
        source: BoxError,
    },

    /// The per-migration wall-clock timeout elapsed
    #[error("Migration '{migration}' timed out after {timeout_ms}ms")]
    Timeout { migration: String, timeout_ms: u128 },

    /// Native adapter failure outside of a migration body
    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Advisory lock could not be obtained
    #[error("Migration lock unavailable: {0}")]
    LockUnavailable(String),
}

impl ArcanoxError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn adapter(message: impl Into<String>) -> Self {
        Self::Adapter(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap any error raised while a migration body was executing.
    ///
    /// Errors that are already execution or timeout failures are passed
    /// through untouched so the migration name is not repeated.
    pub fn execution(migration: &str, error: ArcanoxError) -> Self {
        match error {
            err @ (ArcanoxError::Execution { .. } | ArcanoxError::Timeout { .. }) => err,
            other => ArcanoxError::Execution {
                migration: migration.to_string(),
                source: Box::new(other),
            },
        }
    }

    pub fn timeout(migration: &str, timeout: Duration) -> Self {
        Self::Timeout {
            migration: migration.to_string(),
            timeout_ms: timeout.as_millis(),
        }
    }

    /// True for failures raised before any schema mutation could happen
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            ArcanoxError::Configuration(_) | ArcanoxError::Validation(_)
        )
    }
}

impl From<serde_json::Error> for ArcanoxError {
    fn from(err: serde_json::Error) -> Self {
        ArcanoxError::Adapter(format!("Serialization failed: {}", err))
    }
}

/// Non-fatal integrity finding, accumulated instead of thrown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityWarning {
    /// A tracking record exists but its migration file is gone
    MissingFile { migration: String },
    /// The migration file changed after it was applied
    ChecksumMismatch {
        migration: String,
        expected: String,
        actual: String,
    },
}

impl IntegrityWarning {
    pub fn migration(&self) -> &str {
        match self {
            IntegrityWarning::MissingFile { migration } => migration,
            IntegrityWarning::ChecksumMismatch { migration, .. } => migration,
        }
    }
}

impl std::fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityWarning::MissingFile { migration } => {
                write!(f, "Migration file not found for applied migration: {}", migration)
            }
            IntegrityWarning::ChecksumMismatch {
                migration,
                expected,
                actual,
            } => write!(
                f,
                "Migration '{}' has been modified after being applied (stored checksum {}, current {})",
                migration, expected, actual
            ),
        }
    }
}
