//! # arcanox: Schema Migrations for elif.rs
//!
//! Database-agnostic schema definitions and a migration engine with
//! batching, rollback, checksums and lifecycle events.
//!
//! Everything talks to the database through the [`DatabaseAdapter`] trait.
//! The adapter is shared by the [`Schema`] facade, the migration repository
//! and the [`MigrationRunner`]; only the caller that created it disconnects it.

pub mod adapter;
pub mod config;
pub mod error;
pub mod logging;
pub mod migrations;
pub mod schema;

pub use adapter::{
    AdvisoryLockAdapter, ConnectionConfig, ConnectionInfo, DatabaseAdapter, DatabaseBackendType,
    DatabaseValue, InMemoryAdapter, Row, SelectOptions, SqlDialect, TransactionalAdapter,
};
pub use config::MigrationConfig;
pub use error::{ArcanoxError, ArcanoxResult, BoxError, IntegrityWarning};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use migrations::{
    Migration, MigrationEvent, MigrationListener, MigrationRegistry, MigrationRunResult,
    MigrationRunner, MigrationStatus, RollbackOptions, RollbackResult, RunOptions, Seeder,
    SeederRegistry, SquashOutput, VerifyReport,
};
pub use schema::{Blueprint, ColumnType, Schema, SqlGrammar};

/// Common imports for writing migrations and seeders
pub mod prelude {
    pub use crate::adapter::{DatabaseAdapter, DatabaseValue, Row, SelectOptions};
    pub use crate::error::{ArcanoxError, ArcanoxResult};
    pub use crate::migrations::{Migration, Seeder};
    pub use crate::schema::{Blueprint, ColumnType, ForeignKeyAction, IndexType, Schema};
    pub use async_trait::async_trait;
}
