//! Migration Runner - Executes migrations against the database
//!
//! The runner ties together the resolver, the repository, checksums, the
//! state machine and event listeners. Migrations run strictly one after the
//! other; a failure aborts the rest of the batch while everything committed
//! before it stays recorded.
//!
//! Rollback-side operations live in [`rollback`](super::rollback).

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::checksum::MigrationChecksumCalculator;
use super::definitions::{
    Migration, MigrationDirection, MigrationRecord, MigrationRunResult, MigrationState,
    MigrationStatus, RunOptions, SquashOutput, VerifyReport,
};
use super::events::{EventDispatcher, MigrationEvent, MigrationListener};
use super::repository::MigrationRepository;
use super::resolver::{to_snake_case, MigrationFileResolver, MigrationRegistry};
use super::seeder::{locate_seeder, SeederRegistry, DEFAULT_SEEDER};
use super::state::MigrationStateMachine;
use crate::adapter::DatabaseAdapter;
use crate::config::MigrationConfig;
use crate::error::{ArcanoxError, ArcanoxResult, IntegrityWarning};
use crate::schema::Schema;

/// Migration runner that executes migrations against a database
pub struct MigrationRunner {
    pub(super) adapter: Arc<dyn DatabaseAdapter>,
    pub(super) schema: Schema,
    pub(super) config: MigrationConfig,
    pub(super) resolver: MigrationFileResolver,
    pub(super) repository: MigrationRepository,
    pub(super) checksums: MigrationChecksumCalculator,
    pub(super) state: MigrationStateMachine,
    pub(super) events: EventDispatcher,
    pub(super) seeders: SeederRegistry,
}

impl MigrationRunner {
    /// Create a runner over a shared adapter. The adapter is never
    /// disconnected by the runner.
    pub fn new(
        adapter: Arc<dyn DatabaseAdapter>,
        config: MigrationConfig,
        registry: MigrationRegistry,
    ) -> ArcanoxResult<Self> {
        config.validate()?;

        Ok(Self {
            schema: Schema::new(adapter.clone()),
            resolver: MigrationFileResolver::new(&config, registry),
            repository: MigrationRepository::new(adapter.clone(), &config.table),
            checksums: MigrationChecksumCalculator::new(),
            state: MigrationStateMachine::new(),
            events: EventDispatcher::new(),
            seeders: SeederRegistry::new(),
            adapter,
            config,
        })
    }

    pub fn with_seeders(mut self, seeders: SeederRegistry) -> Self {
        self.seeders = seeders;
        self
    }

    /// Register a listener for lifecycle events
    pub fn listen(&mut self, listener: Arc<dyn MigrationListener>) {
        self.events.listen(listener);
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn repository(&self) -> &MigrationRepository {
        &self.repository
    }

    pub fn resolver(&self) -> &MigrationFileResolver {
        &self.resolver
    }

    pub fn state(&self) -> &MigrationStateMachine {
        &self.state
    }

    /// Run all pending migrations as one new batch
    pub async fn run(&mut self, options: RunOptions) -> ArcanoxResult<MigrationRunResult> {
        let locked = self.acquire_lock().await?;
        let result = self.run_pending(&options, &HashSet::new()).await;
        self.release_lock(locked).await;
        result
    }

    /// Run pending migrations without taking the lock.
    ///
    /// `reverted` names records a pretend run must treat as already gone,
    /// so a pretend refresh or fresh reports what it would re-apply.
    pub(super) async fn run_pending(
        &mut self,
        options: &RunOptions,
        reverted: &HashSet<String>,
    ) -> ArcanoxResult<MigrationRunResult> {
        let start_time = Instant::now();
        let pretend = options.pretend;

        if let Some(only) = &options.only {
            let known = self.resolver.get_migration_files().await?;
            if let Some(unknown) = only.iter().find(|name| !known.contains_key(*name)) {
                return Err(ArcanoxError::validation(format!(
                    "Unknown migration '{}'",
                    unknown
                )));
            }
        }

        // Pretend mode must not create the tracking table either
        let tracked = if pretend {
            self.repository.repository_exists().await?
        } else {
            self.repository.ensure_table().await?;
            true
        };

        let records: Vec<MigrationRecord> = if tracked {
            self.repository
                .get_records()
                .await?
                .into_iter()
                .filter(|record| !reverted.contains(&record.migration))
                .collect()
        } else {
            Vec::new()
        };

        let mut pending = self.pending_from(&records).await?;
        if let Some(only) = &options.only {
            pending.retain(|(name, _)| only.contains(name));
        }

        if pending.is_empty() {
            info!("Nothing to migrate");
            self.status_line("Nothing to migrate.");
            return Ok(MigrationRunResult::nothing_to_migrate(pretend));
        }

        if options.step {
            pending.truncate(1);
        }

        let batch = records.iter().map(|record| record.batch).max().unwrap_or(0) + 1;

        let names: Vec<String> = pending.iter().map(|(name, _)| name.clone()).collect();
        info!(batch, count = names.len(), pretend, "Running migrations");
        self.events
            .emit(MigrationEvent::BatchStarted {
                batch,
                migrations: names,
                pretend,
            })
            .await;

        let mut migrated = Vec::new();
        for (name, path) in &pending {
            self.execute(name, path, batch, MigrationDirection::Up, pretend)
                .await?;
            migrated.push(name.clone());
        }

        self.events
            .emit(MigrationEvent::BatchCompleted {
                batch,
                migrated: migrated.clone(),
                pretend,
            })
            .await;

        if options.seed && !pretend {
            if self.config.seeders_path.is_some() {
                self.seed(None).await?;
            } else {
                warn!("Seeding requested but no seeders path is configured");
            }
        }

        Ok(MigrationRunResult {
            batch: Some(batch),
            migrated,
            pretend,
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Names of migrations found on disk but not yet recorded
    pub async fn get_pending(&self) -> ArcanoxResult<Vec<String>> {
        let records = if self.repository.repository_exists().await? {
            self.repository.get_records().await?
        } else {
            Vec::new()
        };
        Ok(self
            .pending_from(&records)
            .await?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    async fn pending_from(
        &self,
        records: &[MigrationRecord],
    ) -> ArcanoxResult<Vec<(String, PathBuf)>> {
        let files = self.resolver.get_migration_files().await?;
        let ran: HashSet<&str> = records.iter().map(|r| r.migration.as_str()).collect();

        Ok(files
            .into_iter()
            .filter(|(name, _)| !ran.contains(name.as_str()))
            .collect())
    }

    /// Applied and pending migrations merged by name
    pub async fn status(&self) -> ArcanoxResult<Vec<MigrationStatus>> {
        let files = self.resolver.get_migration_files().await?;
        let records = if self.repository.repository_exists().await? {
            self.repository.get_records().await?
        } else {
            Vec::new()
        };

        let mut merged: BTreeMap<String, MigrationStatus> = BTreeMap::new();
        for record in records {
            merged.insert(
                record.migration.clone(),
                MigrationStatus {
                    path: files.get(&record.migration).cloned(),
                    migration: record.migration,
                    state: MigrationState::Ran,
                    batch: Some(record.batch),
                    ran_at: record.created_at,
                },
            );
        }
        for (name, path) in files {
            merged.entry(name.clone()).or_insert(MigrationStatus {
                migration: name,
                state: MigrationState::Pending,
                batch: None,
                ran_at: None,
                path: Some(path),
            });
        }

        Ok(merged.into_values().collect())
    }

    /// Check every applied migration against the files on disk
    pub async fn verify(&self) -> ArcanoxResult<VerifyReport> {
        let mut report = VerifyReport::default();
        if !self.repository.repository_exists().await? {
            return Ok(report);
        }

        let files = self.resolver.get_migration_files().await?;
        for record in self.repository.get_records().await? {
            report.checked += 1;

            let Some(path) = files.get(&record.migration) else {
                report.issues.push(IntegrityWarning::MissingFile {
                    migration: record.migration,
                });
                continue;
            };

            let Some(expected) = record.checksum else {
                continue;
            };

            match self.checksums.calculate_checksum(path).await {
                Ok(actual) if actual == expected => {}
                Ok(actual) => report.issues.push(IntegrityWarning::ChecksumMismatch {
                    migration: record.migration,
                    expected,
                    actual,
                }),
                Err(e) => {
                    warn!(migration = %record.migration, error = %e, "Could not read migration file");
                    report.issues.push(IntegrityWarning::MissingFile {
                        migration: record.migration,
                    });
                }
            }
        }

        for issue in &report.issues {
            warn!(migration = %issue.migration(), "{}", issue);
        }
        Ok(report)
    }

    /// Run a seeder by class name, or `DatabaseSeeder` when none is given
    pub async fn seed(&self, class: Option<&str>) -> ArcanoxResult<()> {
        let dir = self.config.seeders_path.as_ref().ok_or_else(|| {
            ArcanoxError::configuration("Seeders path is not configured")
        })?;
        let name = class.unwrap_or(DEFAULT_SEEDER);

        let path = locate_seeder(dir, name, &self.config.extensions).await?;
        let seeder = self.seeders.instantiate(name).ok_or_else(|| {
            ArcanoxError::validation(format!(
                "Seeder '{}' ({}) is not registered",
                name,
                path.display()
            ))
        })?;

        let started = Instant::now();
        self.status_line(&format!("Seeding: {}", name));
        seeder.run(&self.schema).await?;
        self.status_line(&format!(
            "Seeded:  {} ({}ms)",
            name,
            started.elapsed().as_millis()
        ));
        Ok(())
    }

    /// Scaffold a single migration summarising the current tables.
    ///
    /// Columns are not reconstructed: each table gets an empty blueprint.
    /// With `write` set, the source is saved to the first migrations path.
    pub async fn squash(&self, name: Option<&str>, write: bool) -> ArcanoxResult<SquashOutput> {
        let mut tables: Vec<String> = self
            .adapter
            .list_tables()
            .await?
            .into_iter()
            .filter(|table| table != &self.config.table)
            .collect();
        tables.sort();

        let description = to_snake_case(name.unwrap_or("squashed_schema"));
        let migration = format!("{}_{}", Utc::now().format("%Y%m%d%H%M%S"), description);
        let contents = squash_source(&description, &tables);

        let path = if write {
            let dir = self.config.migration_paths.first().ok_or_else(|| {
                ArcanoxError::configuration("No migrations directory configured")
            })?;
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ArcanoxError::io(dir, e))?;
            let path = dir.join(format!("{}.rs", migration));
            tokio::fs::write(&path, &contents)
                .await
                .map_err(|e| ArcanoxError::io(&path, e))?;
            Some(path)
        } else {
            None
        };

        info!(migration = %migration, tables = tables.len(), "Squashed schema");
        Ok(SquashOutput {
            name: migration,
            contents,
            tables,
            path,
        })
    }

    /// Execute one migration in one direction with transaction, timeout,
    /// event and bookkeeping discipline. Returns the elapsed milliseconds.
    pub(super) async fn execute(
        &mut self,
        name: &str,
        path: &Path,
        batch: i64,
        direction: MigrationDirection,
        pretend: bool,
    ) -> ArcanoxResult<u128> {
        self.state.start(name);
        let (event, line) = match direction {
            MigrationDirection::Up => (
                MigrationEvent::Migrating {
                    migration: name.to_string(),
                    batch,
                    pretend,
                },
                "Migrating:",
            ),
            MigrationDirection::Down => (
                MigrationEvent::RollingBack {
                    migration: name.to_string(),
                    batch,
                    pretend,
                },
                "Rolling back:",
            ),
        };
        self.events.emit(event).await;
        self.status_line(&format!("{} {}", line, name));

        let migration = match self.resolver.load_migration(path).await {
            Ok(migration) => migration,
            Err(e) => return Err(self.fail(name, direction, pretend, e).await),
        };

        let started = Instant::now();
        if pretend {
            info!(migration = %name, ?direction, "Pretend: migration would run");
        } else {
            if let Err(e) = self.invoke(migration.as_ref(), name, direction).await {
                return Err(self.fail(name, direction, pretend, e).await);
            }
            if let Err(e) = self.record(name, path, batch, direction, started).await {
                return Err(self.fail(name, direction, pretend, e).await);
            }
        }
        let elapsed = started.elapsed().as_millis();

        self.state.complete(true, None);
        let (event, line) = match direction {
            MigrationDirection::Up => (
                MigrationEvent::Migrated {
                    migration: name.to_string(),
                    batch,
                    execution_time_ms: elapsed,
                    pretend,
                },
                "Migrated:",
            ),
            MigrationDirection::Down => (
                MigrationEvent::RolledBack {
                    migration: name.to_string(),
                    batch,
                    execution_time_ms: elapsed,
                    pretend,
                },
                "Rolled back:",
            ),
        };
        self.events.emit(event).await;
        self.status_line(&format!("{} {} ({}ms)", line, name, elapsed));

        Ok(elapsed)
    }

    /// Run `up()`/`down()`, inside a transaction when both sides allow it
    async fn invoke(
        &self,
        migration: &dyn Migration,
        name: &str,
        direction: MigrationDirection,
    ) -> ArcanoxResult<()> {
        let transaction = if migration.within_transaction() {
            self.adapter.transactions()
        } else {
            None
        };

        if let Some(tx) = transaction {
            tx.begin_transaction()
                .await
                .map_err(|e| ArcanoxError::execution(name, e))?;
        } else {
            debug!(migration = %name, "Running without a transaction");
        }

        let body = async {
            match direction {
                MigrationDirection::Up => migration.up(&self.schema).await,
                MigrationDirection::Down => migration.down(&self.schema).await,
            }
        };

        let result = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, body).await {
                Ok(outcome) => outcome.map_err(|e| ArcanoxError::execution(name, e)),
                Err(_) => Err(ArcanoxError::timeout(name, limit)),
            },
            None => body.await.map_err(|e| ArcanoxError::execution(name, e)),
        };

        if let Some(tx) = transaction {
            match &result {
                Ok(()) => tx
                    .commit()
                    .await
                    .map_err(|e| ArcanoxError::execution(name, e))?,
                Err(_) => {
                    if let Err(e) = tx.rollback().await {
                        warn!(migration = %name, error = %e, "Transaction rollback failed");
                    }
                }
            }
        }

        result
    }

    /// Persist the outcome of a successful migration
    async fn record(
        &self,
        name: &str,
        path: &Path,
        batch: i64,
        direction: MigrationDirection,
        started: Instant,
    ) -> ArcanoxResult<()> {
        match direction {
            MigrationDirection::Up => {
                let checksum = match self.checksums.calculate_checksum(path).await {
                    Ok(checksum) => Some(checksum),
                    Err(e) => {
                        warn!(migration = %name, error = %e, "Could not compute checksum");
                        None
                    }
                };
                let elapsed = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
                self.repository
                    .log(name, batch, Some(elapsed), checksum)
                    .await?;
            }
            MigrationDirection::Down => {
                self.repository.delete(name).await?;
            }
        }
        Ok(())
    }

    async fn fail(
        &mut self,
        name: &str,
        direction: MigrationDirection,
        pretend: bool,
        error: ArcanoxError,
    ) -> ArcanoxError {
        let message = error.to_string();
        error!(migration = %name, ?direction, error = %message, "Migration failed");

        self.state.complete(false, Some(message.clone()));
        self.events
            .emit(MigrationEvent::Error {
                migration: name.to_string(),
                direction,
                message: message.clone(),
                pretend,
            })
            .await;
        self.status_line(&format!("Failed: {}: {}", name, message));

        error
    }

    pub(super) fn status_line(&self, line: &str) {
        if !self.config.quiet {
            println!("{}", line);
        }
    }

    fn lock_name(&self) -> String {
        format!("{}_lock", self.config.table)
    }

    /// Take the advisory lock when configured; returns whether it is held
    pub(super) async fn acquire_lock(&self) -> ArcanoxResult<bool> {
        if !self.config.use_advisory_lock {
            return Ok(false);
        }

        let Some(lock) = self.adapter.advisory_lock() else {
            warn!(
                backend = %self.adapter.backend_type(),
                "Advisory locking requested but not supported by the adapter; continuing without a lock"
            );
            return Ok(false);
        };

        let name = self.lock_name();
        if lock.acquire_lock(&name, self.config.lock_timeout).await? {
            debug!(lock = %name, "Acquired migration lock");
            Ok(true)
        } else {
            Err(ArcanoxError::LockUnavailable(format!(
                "'{}' is held by another process (waited {}ms)",
                name,
                self.config.lock_timeout.as_millis()
            )))
        }
    }

    pub(super) async fn release_lock(&self, held: bool) {
        if !held {
            return;
        }
        if let Some(lock) = self.adapter.advisory_lock() {
            let name = self.lock_name();
            if let Err(e) = lock.release_lock(&name).await {
                warn!(lock = %name, error = %e, "Failed to release migration lock");
            }
        }
    }
}

fn to_type_name(snake: &str) -> String {
    let name: String = snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    // Identifiers cannot start with a digit
    match name.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => name,
        _ => format!("Migration{}", name),
    }
}

fn squash_source(description: &str, tables: &[String]) -> String {
    let type_name = to_type_name(description);
    let mut up = String::new();
    for table in tables {
        up.push_str(&format!(
            "        schema\n            .create(\"{}\", |table| {{\n                // Columns are not reconstructed; fill them in.\n                let _ = table;\n            }})\n            .await?;\n",
            table
        ));
    }
    let mut down = String::new();
    for table in tables.iter().rev() {
        down.push_str(&format!(
            "        schema.drop_if_exists(\"{}\").await?;\n",
            table
        ));
    }

    format!(
        "//! Squashed schema: {count} table(s)\n\n\
         use arcanox::prelude::*;\n\n\
         #[derive(Default)]\n\
         pub struct {type_name};\n\n\
         #[async_trait]\n\
         impl Migration for {type_name} {{\n    \
             async fn up(&self, schema: &Schema) -> ArcanoxResult<()> {{\n\
         {up}        Ok(())\n    \
             }}\n\n    \
             async fn down(&self, schema: &Schema) -> ArcanoxResult<()> {{\n\
         {down}        Ok(())\n    \
             }}\n\
         }}\n",
        count = tables.len(),
        type_name = type_name,
        up = up,
        down = down,
    )
}
