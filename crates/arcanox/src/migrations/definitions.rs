//! Migration Definitions - Core types and structures for migrations
//!
//! Defines the [`Migration`] trait implemented by every migration, the
//! persisted [`MigrationRecord`], the derived [`MigrationStatus`], and the
//! option and result types exchanged with the runner.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ArcanoxResult, IntegrityWarning};
use crate::schema::Schema;

/// A single reversible schema change
#[async_trait]
pub trait Migration: Send + Sync {
    async fn up(&self, schema: &Schema) -> ArcanoxResult<()>;

    async fn down(&self, schema: &Schema) -> ArcanoxResult<()>;

    /// Named connection this migration targets, if not the default one
    fn connection(&self) -> Option<&str> {
        None
    }

    /// Run `up()`/`down()` inside a transaction when the adapter supports it
    fn within_transaction(&self) -> bool {
        true
    }

    fn description(&self) -> Option<&str> {
        None
    }

    /// Declared prerequisites. Informational only: execution order is by name.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Migration direction for execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    /// Apply the migration
    Up,
    /// Revert the migration
    Down,
}

/// One row of the tracking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub id: Option<i64>,
    /// Canonical migration name (file name without extension)
    pub migration: String,
    /// Batch number, always >= 1
    pub batch: i64,
    pub execution_time_ms: Option<i64>,
    /// SHA-256 of the migration file at the time it ran
    pub checksum: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Whether a migration has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    Ran,
    Pending,
}

impl std::fmt::Display for MigrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationState::Ran => write!(f, "ran"),
            MigrationState::Pending => write!(f, "pending"),
        }
    }
}

/// Derived status of one migration, as reported by `status()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationStatus {
    pub migration: String,
    pub state: MigrationState,
    pub batch: Option<i64>,
    pub ran_at: Option<DateTime<Utc>>,
    /// Location on disk, `None` for recorded migrations whose file is gone
    pub path: Option<PathBuf>,
}

impl MigrationStatus {
    pub fn is_ran(&self) -> bool {
        self.state == MigrationState::Ran
    }
}

/// Options for `MigrationRunner::run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Report intended work without executing or recording anything
    pub pretend: bool,
    /// Run only the first pending migration
    pub step: bool,
    /// Restrict the pending set to these names
    pub only: Option<Vec<String>>,
    /// Run the default seeder afterwards
    pub seed: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretend(mut self) -> Self {
        self.pretend = true;
        self
    }

    pub fn step(mut self) -> Self {
        self.step = true;
        self
    }

    pub fn only(mut self, migrations: &[&str]) -> Self {
        self.only = Some(migrations.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn seed(mut self) -> Self {
        self.seed = true;
        self
    }
}

/// Options for `MigrationRunner::rollback`.
///
/// Target selection priority is `target`, then `batch`, then `steps`.
#[derive(Debug, Clone, Default)]
pub struct RollbackOptions {
    /// Number of most recent batches to revert (default 1)
    pub steps: Option<usize>,
    /// Revert every batch greater than or equal to this one
    pub batch: Option<i64>,
    /// Revert exactly this migration
    pub target: Option<String>,
    pub pretend: bool,
}

impl RollbackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn batch(mut self, batch: i64) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn target(mut self, migration: &str) -> Self {
        self.target = Some(migration.to_string());
        self
    }

    pub fn pretend(mut self) -> Self {
        self.pretend = true;
        self
    }
}

/// Result of running migrations
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationRunResult {
    /// Batch assigned to this run, `None` when nothing was pending
    pub batch: Option<i64>,
    /// Names of migrations applied (or that would be, in pretend mode)
    pub migrated: Vec<String>,
    pub pretend: bool,
    pub execution_time_ms: u128,
}

impl MigrationRunResult {
    pub fn nothing_to_migrate(pretend: bool) -> Self {
        Self {
            batch: None,
            migrated: Vec::new(),
            pretend,
            execution_time_ms: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.migrated.is_empty()
    }
}

/// Result of rolling back migrations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollbackResult {
    /// Names reverted, in execution (descending) order
    pub rolled_back: Vec<String>,
    /// Recorded migrations skipped because their file is missing
    pub skipped_missing: Vec<String>,
    pub pretend: bool,
    pub execution_time_ms: u128,
}

impl RollbackResult {
    pub fn is_empty(&self) -> bool {
        self.rolled_back.is_empty() && self.skipped_missing.is_empty()
    }
}

/// Outcome of `verify()`: every problem found, not just the first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifyReport {
    /// Number of tracking records inspected
    pub checked: usize,
    pub issues: Vec<IntegrityWarning>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Scaffolded migration source produced by `squash()`
#[derive(Debug, Clone, PartialEq)]
pub struct SquashOutput {
    /// Migration name (timestamped)
    pub name: String,
    pub contents: String,
    /// Tables summarised, tracking table excluded
    pub tables: Vec<String>,
    /// Where the file was written, if it was
    pub path: Option<PathBuf>,
}
