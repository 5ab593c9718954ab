//! Migration System
//!
//! Discovery, tracking and execution of schema migrations.

pub mod checksum;
pub mod definitions;
pub mod events;
pub mod repository;
pub mod resolver;
pub mod rollback;
pub mod runner;
pub mod seeder;
pub mod state;

pub use checksum::MigrationChecksumCalculator;
pub use definitions::{
    Migration, MigrationDirection, MigrationRecord, MigrationRunResult, MigrationState,
    MigrationStatus, RollbackOptions, RollbackResult, RunOptions, SquashOutput, VerifyReport,
};
pub use events::{EventDispatcher, MigrationEvent, MigrationListener};
pub use repository::MigrationRepository;
pub use resolver::{
    split_sql_statements, MigrationFactory, MigrationFileResolver, MigrationRegistry,
    SqlFileMigration,
};
pub use runner::MigrationRunner;
pub use seeder::{Seeder, SeederFactory, SeederRegistry, DEFAULT_SEEDER};
pub use state::{ExecutionState, MigrationOutcome, MigrationStateMachine};
