//! Migration Rollback - Handles rolling back applied migrations
//!
//! Extends [`MigrationRunner`] with `rollback`, `reset`, `fresh` and
//! `refresh`. Migrations are reverted in descending name order. A recorded
//! migration whose file is gone is skipped with a warning.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{info, warn};

use super::definitions::{
    MigrationDirection, MigrationRecord, MigrationRunResult, RollbackOptions, RollbackResult,
    RunOptions,
};
use super::events::MigrationEvent;
use super::runner::MigrationRunner;
use crate::error::{ArcanoxError, ArcanoxResult};

impl MigrationRunner {
    /// Roll back by target, batch floor or number of batches (default 1)
    pub async fn rollback(&mut self, options: RollbackOptions) -> ArcanoxResult<RollbackResult> {
        let locked = self.acquire_lock().await?;
        let result = self.rollback_records(&options).await;
        self.release_lock(locked).await;
        result
    }

    async fn rollback_targets(&self, options: &RollbackOptions) -> ArcanoxResult<Vec<MigrationRecord>> {
        let mut records = if let Some(target) = &options.target {
            let record = self.repository.find(target).await?.ok_or_else(|| {
                ArcanoxError::validation(format!("Migration '{}' has not been run", target))
            })?;
            vec![record]
        } else if let Some(batch) = options.batch {
            self.repository.get_migrations_from_batch(batch).await?
        } else {
            let steps = options.steps.unwrap_or(1).max(1);
            self.repository.get_last_batches(steps).await?
        };

        records.sort_by(|a, b| b.migration.cmp(&a.migration));
        Ok(records)
    }

    async fn rollback_records(&mut self, options: &RollbackOptions) -> ArcanoxResult<RollbackResult> {
        let start_time = Instant::now();
        let pretend = options.pretend;

        if !self.repository.repository_exists().await? {
            info!("Migrations table not found, nothing to roll back");
            self.status_line("Nothing to rollback.");
            return Ok(RollbackResult {
                pretend,
                ..RollbackResult::default()
            });
        }

        let records = self.rollback_targets(options).await?;
        if records.is_empty() {
            info!("Nothing to roll back");
            self.status_line("Nothing to rollback.");
            return Ok(RollbackResult {
                pretend,
                ..RollbackResult::default()
            });
        }

        let files = self.resolver.get_migration_files().await?;
        self.events
            .emit(MigrationEvent::RollbackStarted {
                migrations: records.iter().map(|r| r.migration.clone()).collect(),
                pretend,
            })
            .await;

        let mut result = RollbackResult {
            pretend,
            ..RollbackResult::default()
        };

        for record in &records {
            let Some(path) = files.get(&record.migration) else {
                warn!(migration = %record.migration, "Migration file not found, skipping rollback");
                self.status_line(&format!("Migration not found: {}", record.migration));
                result.skipped_missing.push(record.migration.clone());
                continue;
            };

            self.execute(
                &record.migration,
                path,
                record.batch,
                MigrationDirection::Down,
                pretend,
            )
            .await?;
            result.rolled_back.push(record.migration.clone());
        }

        self.events
            .emit(MigrationEvent::RollbackCompleted {
                rolled_back: result.rolled_back.clone(),
                pretend,
            })
            .await;

        result.execution_time_ms = start_time.elapsed().as_millis();
        Ok(result)
    }

    /// Roll back every batch
    pub async fn reset(&mut self, pretend: bool) -> ArcanoxResult<RollbackResult> {
        let locked = self.acquire_lock().await?;
        let result = self.reset_records(pretend).await;
        self.release_lock(locked).await;
        result
    }

    async fn reset_records(&mut self, pretend: bool) -> ArcanoxResult<RollbackResult> {
        let last_batch = if self.repository.repository_exists().await? {
            self.repository.get_last_batch_number().await?
        } else {
            0
        };

        if last_batch == 0 {
            self.status_line("Nothing to rollback.");
            return Ok(RollbackResult {
                pretend,
                ..RollbackResult::default()
            });
        }

        let mut options = RollbackOptions::new().steps(last_batch as usize);
        options.pretend = pretend;
        self.rollback_records(&options).await
    }

    /// Drop every table, then run all migrations from scratch.
    ///
    /// The lock is held for the whole operation.
    pub async fn fresh(&mut self, options: RunOptions) -> ArcanoxResult<MigrationRunResult> {
        let locked = self.acquire_lock().await?;
        let result = self.fresh_locked(&options).await;
        self.release_lock(locked).await;
        result
    }

    async fn fresh_locked(&mut self, options: &RunOptions) -> ArcanoxResult<MigrationRunResult> {
        let tables = self.adapter.list_tables().await?;

        let reverted: HashSet<String> = if options.pretend {
            info!(tables = ?tables, "Pretend: tables would be dropped");
            if self.repository.repository_exists().await? {
                self.repository.get_ran().await?.into_iter().collect()
            } else {
                HashSet::new()
            }
        } else {
            self.drop_all_tables(&tables).await?;
            self.status_line("Dropped all tables successfully.");
            HashSet::new()
        };

        self.run_pending(options, &reverted).await
    }

    async fn drop_all_tables(&self, tables: &[String]) -> ArcanoxResult<()> {
        for table in tables {
            warn!(table = %table, "Dropping table");
            self.schema.drop_if_exists(table).await?;
        }
        Ok(())
    }

    /// Reset, then run everything again under a single lock
    pub async fn refresh(&mut self, options: RunOptions) -> ArcanoxResult<MigrationRunResult> {
        let locked = self.acquire_lock().await?;
        let result = self.refresh_locked(&options).await;
        self.release_lock(locked).await;
        result
    }

    async fn refresh_locked(&mut self, options: &RunOptions) -> ArcanoxResult<MigrationRunResult> {
        let reset = self.reset_records(options.pretend).await?;

        // A pretend reset deletes nothing, so hand the run what it would have removed
        let reverted: HashSet<String> = if options.pretend {
            reset.rolled_back.into_iter().collect()
        } else {
            HashSet::new()
        };

        self.run_pending(options, &reverted).await
    }
}
