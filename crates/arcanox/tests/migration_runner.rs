use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arcanox::migrations::{MigrationState, RollbackOptions, RunOptions};
use arcanox::prelude::*;
use arcanox::{
    AdvisoryLockAdapter, InMemoryAdapter, IntegrityWarning, MigrationConfig, MigrationEvent,
    MigrationListener, MigrationRegistry, MigrationRunner, SeederRegistry,
};
use tempfile::TempDir;

const USERS: &str = "20240101000000_create_users";
const POSTS: &str = "20240102000000_create_posts";
const COMMENTS: &str = "20240103000000_create_comments";

struct CreateTable {
    table: &'static str,
}

#[async_trait]
impl Migration for CreateTable {
    async fn up(&self, schema: &Schema) -> ArcanoxResult<()> {
        schema
            .create(self.table, |table| {
                table.id();
                table.string("name", None);
                table.timestamps();
            })
            .await
    }

    async fn down(&self, schema: &Schema) -> ArcanoxResult<()> {
        schema.drop_if_exists(self.table).await
    }
}

/// Creates a table, then fails
struct HalfApplied {
    transactional: bool,
}

#[async_trait]
impl Migration for HalfApplied {
    async fn up(&self, schema: &Schema) -> ArcanoxResult<()> {
        schema.create("half_applied", |table| {
            table.id();
        })
        .await?;
        Err(ArcanoxError::adapter("syntax error at or near \"TABEL\""))
    }

    async fn down(&self, _schema: &Schema) -> ArcanoxResult<()> {
        Ok(())
    }

    fn within_transaction(&self) -> bool {
        self.transactional
    }
}

struct Slow;

#[async_trait]
impl Migration for Slow {
    async fn up(&self, _schema: &Schema) -> ArcanoxResult<()> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }

    async fn down(&self, _schema: &Schema) -> ArcanoxResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<MigrationEvent>>,
}

impl Recorder {
    fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

#[async_trait]
impl MigrationListener for Recorder {
    async fn handle(&self, event: &MigrationEvent) -> ArcanoxResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn registry() -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();
    registry
        .register(USERS, || CreateTable { table: "users" })
        .register(POSTS, || CreateTable { table: "posts" })
        .register(COMMENTS, || CreateTable { table: "comments" })
        .register("20240102000000_broken", || HalfApplied {
            transactional: true,
        })
        .register("20240102000000_broken_outside_tx", || HalfApplied {
            transactional: false,
        })
        .register("20240102000000_slow", || Slow);
    registry
}

fn write_migration(dir: &Path, name: &str) {
    std::fs::write(dir.join(format!("{}.rs", name)), format!("// {}\n", name)).unwrap();
}

fn config(dir: &TempDir) -> MigrationConfig {
    MigrationConfig::new(dir.path()).quiet()
}

fn runner_with(
    dir: &TempDir,
    config: MigrationConfig,
    names: &[&str],
) -> (Arc<InMemoryAdapter>, MigrationRunner) {
    for name in names {
        write_migration(dir.path(), name);
    }
    let adapter = Arc::new(InMemoryAdapter::new());
    let runner = MigrationRunner::new(adapter.clone(), config, registry()).unwrap();
    (adapter, runner)
}

fn runner(dir: &TempDir, names: &[&str]) -> (Arc<InMemoryAdapter>, MigrationRunner) {
    runner_with(dir, config(dir), names)
}

#[tokio::test]
async fn run_assigns_one_batch_in_name_order() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[POSTS, USERS]);

    let result = runner.run(RunOptions::new()).await.unwrap();
    assert_eq!(result.batch, Some(1));
    assert_eq!(result.migrated, vec![USERS, POSTS]);
    assert!(adapter.has_table("users").await.unwrap());
    assert!(adapter.has_table("posts").await.unwrap());

    let status = runner.status().await.unwrap();
    assert_eq!(status.len(), 2);
    assert!(status
        .iter()
        .all(|s| s.state == MigrationState::Ran && s.batch == Some(1)));
    assert!(runner.get_pending().await.unwrap().is_empty());

    let records = runner.repository().get_records().await.unwrap();
    assert!(records.iter().all(|r| r.checksum.as_ref().map(|c| c.len()) == Some(64)));
}

#[tokio::test]
async fn run_without_pending_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[USERS, POSTS]);
    runner.run(RunOptions::new()).await.unwrap();
    let mutations = adapter.mutation_count();

    let result = runner.run(RunOptions::new()).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.batch, None);
    assert_eq!(adapter.mutation_count(), mutations);
    assert_eq!(runner.repository().get_last_batch_number().await.unwrap(), 1);
}

#[tokio::test]
async fn batches_increase_and_rollback_reverts_only_the_latest() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[USERS, POSTS]);
    runner.run(RunOptions::new()).await.unwrap();

    write_migration(dir.path(), COMMENTS);
    let second = runner.run(RunOptions::new()).await.unwrap();
    assert_eq!(second.batch, Some(2));
    assert_eq!(second.migrated, vec![COMMENTS]);

    let rolled_back = runner
        .rollback(RollbackOptions::new().steps(1))
        .await
        .unwrap();
    assert_eq!(rolled_back.rolled_back, vec![COMMENTS]);
    assert!(!adapter.has_table("comments").await.unwrap());
    assert!(adapter.has_table("users").await.unwrap());

    let status = runner.status().await.unwrap();
    let comments = status.iter().find(|s| s.migration == COMMENTS).unwrap();
    assert_eq!(comments.state, MigrationState::Pending);
    assert_eq!(
        status.iter().filter(|s| s.is_ran()).count(),
        2,
        "batch 1 must stay applied"
    );
}

#[tokio::test]
async fn rollback_runs_in_descending_name_order() {
    let dir = TempDir::new().unwrap();
    let (_, mut runner) = runner(&dir, &[USERS, POSTS, COMMENTS]);
    let recorder = Arc::new(Recorder::default());
    runner.run(RunOptions::new()).await.unwrap();
    runner.listen(recorder.clone());

    let result = runner.rollback(RollbackOptions::new()).await.unwrap();
    assert_eq!(result.rolled_back, vec![COMMENTS, POSTS, USERS]);
    assert_eq!(
        recorder.names(),
        vec![
            "rollback_started",
            "rolling_back",
            "rolled_back",
            "rolling_back",
            "rolled_back",
            "rolling_back",
            "rolled_back",
            "rollback_completed",
        ]
    );
}

#[tokio::test]
async fn rollback_target_takes_priority() {
    let dir = TempDir::new().unwrap();
    let (_, mut runner) = runner(&dir, &[USERS, POSTS]);
    runner.run(RunOptions::new()).await.unwrap();

    let result = runner
        .rollback(RollbackOptions::new().target(USERS).steps(5))
        .await
        .unwrap();
    assert_eq!(result.rolled_back, vec![USERS]);
    assert_eq!(runner.get_pending().await.unwrap(), vec![USERS]);

    let err = runner
        .rollback(RollbackOptions::new().target("20990101000000_unknown"))
        .await
        .unwrap_err();
    assert!(matches!(err, ArcanoxError::Validation(_)));
}

#[tokio::test]
async fn failure_aborts_batch_and_keeps_committed_migrations() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[USERS, "20240102000000_broken", COMMENTS]);
    let recorder = Arc::new(Recorder::default());
    runner.listen(recorder.clone());

    let err = runner.run(RunOptions::new()).await.unwrap_err();
    match &err {
        ArcanoxError::Execution { migration, source } => {
            assert_eq!(migration, "20240102000000_broken");
            assert!(source.to_string().contains("TABEL"));
        }
        other => panic!("Expected execution error, got {:?}", other),
    }

    assert_eq!(runner.repository().get_ran().await.unwrap(), vec![USERS]);
    assert_eq!(
        runner.get_pending().await.unwrap(),
        vec!["20240102000000_broken", COMMENTS]
    );
    assert!(
        !adapter.has_table("half_applied").await.unwrap(),
        "transaction must be rolled back"
    );
    assert!(!adapter.has_table("comments").await.unwrap());
    assert!(recorder.names().contains(&"error"));
    assert!(!recorder.names().contains(&"batch_completed"));

    let outcome = runner.state().result("20240102000000_broken").unwrap();
    assert!(!outcome.success);
}

#[tokio::test]
async fn non_transactional_failure_leaves_partial_changes() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &["20240102000000_broken_outside_tx"]);

    assert!(runner.run(RunOptions::new()).await.is_err());
    assert!(adapter.has_table("half_applied").await.unwrap());
    assert!(runner.repository().get_ran().await.unwrap().is_empty());
}

#[tokio::test]
async fn pretend_mode_mutates_nothing_but_emits_the_same_events() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[USERS, POSTS]);
    let recorder = Arc::new(Recorder::default());
    runner.listen(recorder.clone());

    let result = runner.run(RunOptions::new().pretend()).await.unwrap();
    assert!(result.pretend);
    assert_eq!(result.migrated, vec![USERS, POSTS]);
    assert_eq!(adapter.mutation_count(), 0);
    assert!(adapter.list_tables().await.unwrap().is_empty());

    let pretend_events = recorder.names();
    assert!(recorder.events.lock().unwrap().iter().all(|e| e.pretend()));
    recorder.events.lock().unwrap().clear();

    runner.run(RunOptions::new()).await.unwrap();
    assert_eq!(recorder.names(), pretend_events);
}

#[tokio::test]
async fn pretend_rollback_keeps_records() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[USERS]);
    runner.run(RunOptions::new()).await.unwrap();
    let mutations = adapter.mutation_count();

    let result = runner
        .rollback(RollbackOptions::new().pretend())
        .await
        .unwrap();
    assert_eq!(result.rolled_back, vec![USERS]);
    assert_eq!(adapter.mutation_count(), mutations);
    assert_eq!(runner.repository().get_ran().await.unwrap(), vec![USERS]);
}

#[tokio::test]
async fn timeout_is_reported_as_failure() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_timeout(Duration::from_millis(50));
    let (_, mut runner) = runner_with(&dir, config, &["20240102000000_slow"]);

    let err = runner.run(RunOptions::new()).await.unwrap_err();
    assert!(matches!(err, ArcanoxError::Timeout { timeout_ms: 50, .. }));
    assert!(err.to_string().contains("timed out"));
    assert_eq!(
        runner.get_pending().await.unwrap(),
        vec!["20240102000000_slow"]
    );
}

#[tokio::test]
async fn step_runs_a_single_migration() {
    let dir = TempDir::new().unwrap();
    let (_, mut runner) = runner(&dir, &[USERS, POSTS]);

    let first = runner.run(RunOptions::new().step()).await.unwrap();
    assert_eq!(first.migrated, vec![USERS]);
    let second = runner.run(RunOptions::new().step()).await.unwrap();
    assert_eq!(second.migrated, vec![POSTS]);
    assert_eq!(second.batch, Some(2));
}

#[tokio::test]
async fn rollback_skips_missing_files() {
    let dir = TempDir::new().unwrap();
    let (_, mut runner) = runner(&dir, &[USERS, POSTS]);
    runner.run(RunOptions::new()).await.unwrap();
    std::fs::remove_file(dir.path().join(format!("{}.rs", POSTS))).unwrap();

    let result = runner.rollback(RollbackOptions::new()).await.unwrap();
    assert_eq!(result.rolled_back, vec![USERS]);
    assert_eq!(result.skipped_missing, vec![POSTS]);
    assert_eq!(runner.repository().get_ran().await.unwrap(), vec![POSTS]);
}

#[tokio::test]
async fn verify_collects_every_issue() {
    let dir = TempDir::new().unwrap();
    let (_, mut runner) = runner(&dir, &[USERS, POSTS, COMMENTS]);
    runner.run(RunOptions::new()).await.unwrap();
    assert!(runner.verify().await.unwrap().is_clean());

    std::fs::write(dir.path().join(format!("{}.rs", USERS)), "// edited\n").unwrap();
    std::fs::remove_file(dir.path().join(format!("{}.rs", POSTS))).unwrap();

    let report = runner.verify().await.unwrap();
    assert_eq!(report.checked, 3);
    assert_eq!(report.issues.len(), 2);
    assert!(report.issues.iter().any(|issue| matches!(
        issue,
        IntegrityWarning::ChecksumMismatch { migration, .. } if migration == USERS
    )));
    assert!(report
        .issues
        .contains(&IntegrityWarning::MissingFile {
            migration: POSTS.to_string()
        }));
}

#[tokio::test]
async fn reset_refresh_and_fresh() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[USERS, POSTS]);
    runner.run(RunOptions::new().step()).await.unwrap();
    runner.run(RunOptions::new()).await.unwrap();

    let reset = runner.reset(false).await.unwrap();
    assert_eq!(reset.rolled_back, vec![POSTS, USERS]);
    assert_eq!(runner.get_pending().await.unwrap(), vec![USERS, POSTS]);

    let refreshed = runner.refresh(RunOptions::new()).await.unwrap();
    assert_eq!(refreshed.migrated, vec![USERS, POSTS]);

    Schema::new(adapter.clone())
        .create("legacy", |table| {
            table.id();
        })
        .await
        .unwrap();
    let fresh = runner.fresh(RunOptions::new()).await.unwrap();
    assert_eq!(fresh.batch, Some(1));
    assert!(!adapter.has_table("legacy").await.unwrap());
    assert!(adapter.has_table("users").await.unwrap());
}

#[tokio::test]
async fn advisory_lock_held_elsewhere_blocks_run() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_advisory_lock(Duration::from_millis(30));
    let (adapter, mut runner) = runner_with(&dir, config, &[USERS]);

    let lock: &dyn AdvisoryLockAdapter = adapter.advisory_lock().unwrap();
    assert!(lock
        .acquire_lock("arcanox_migrations_lock", Duration::from_millis(10))
        .await
        .unwrap());

    let err = runner.run(RunOptions::new()).await.unwrap_err();
    assert!(matches!(err, ArcanoxError::LockUnavailable(_)));
    assert_eq!(adapter.mutation_count(), 0);

    lock.release_lock("arcanox_migrations_lock").await.unwrap();
    runner.run(RunOptions::new()).await.unwrap();
    assert!(!adapter.is_locked("arcanox_migrations_lock"));
}

#[tokio::test]
async fn missing_lock_capability_does_not_block() {
    let dir = TempDir::new().unwrap();
    write_migration(dir.path(), USERS);
    let adapter = Arc::new(InMemoryAdapter::new().without_advisory_lock());
    let config = config(&dir).with_advisory_lock(Duration::from_millis(30));
    let mut runner = MigrationRunner::new(adapter.clone(), config, registry()).unwrap();

    let result = runner.run(RunOptions::new()).await.unwrap();
    assert_eq!(result.migrated, vec![USERS]);
}

#[tokio::test]
async fn sql_file_migrations_run_through_raw() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("20240105000000_add_index.sql"),
        "-- Up migration\nCREATE INDEX users_name ON users (name);\n\n-- Down migration\nDROP INDEX users_name;\n",
    )
    .unwrap();
    let (adapter, mut runner) = runner(&dir, &[]);

    runner.run(RunOptions::new()).await.unwrap();
    runner.rollback(RollbackOptions::new()).await.unwrap();

    let statements = adapter.executed_statements();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("CREATE INDEX users_name"));
    assert!(statements[1].starts_with("DROP INDEX users_name"));
}

#[tokio::test]
async fn unregistered_migration_is_a_validation_error() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &["20240109000000_not_registered"]);

    let err = runner.run(RunOptions::new()).await.unwrap_err();
    assert!(matches!(err, ArcanoxError::Validation(_)));
    assert!(runner.repository().get_ran().await.unwrap().is_empty());
    assert!(!adapter.has_table("not_registered").await.unwrap());
}

struct UserSeeder;

#[async_trait]
impl Seeder for UserSeeder {
    async fn run(&self, schema: &Schema) -> ArcanoxResult<()> {
        let mut row = Row::new();
        row.insert("name".to_string(), "ada".into());
        schema.adapter()?.insert("users", row).await?;
        Ok(())
    }
}

#[tokio::test]
async fn seed_runs_registered_seeder_after_migrating() {
    let dir = TempDir::new().unwrap();
    let seeders = TempDir::new().unwrap();
    std::fs::write(seeders.path().join("DatabaseSeeder.rs"), "").unwrap();

    let mut registry = SeederRegistry::new();
    registry.register("DatabaseSeeder", || UserSeeder);

    let config = config(&dir).with_seeders_path(seeders.path());
    let (adapter, runner) = runner_with(&dir, config, &[USERS]);
    let mut runner = runner.with_seeders(registry);

    runner.run(RunOptions::new().seed()).await.unwrap();
    assert_eq!(adapter.rows("users").len(), 1);

    let err = runner.seed(Some("MissingSeeder")).await.unwrap_err();
    assert!(matches!(err, ArcanoxError::Validation(_)));
}

#[tokio::test]
async fn seed_without_path_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let (_, runner) = runner(&dir, &[]);

    let err = runner.seed(None).await.unwrap_err();
    assert!(matches!(err, ArcanoxError::Configuration(_)));
}

#[tokio::test]
async fn squash_summarises_applied_tables() {
    let dir = TempDir::new().unwrap();
    let (_, mut runner) = runner(&dir, &[USERS, POSTS]);
    runner.run(RunOptions::new()).await.unwrap();

    let output = runner.squash(None, true).await.unwrap();
    assert_eq!(output.tables, vec!["posts", "users"]);
    assert!(output.name.ends_with("_squashed_schema"));
    assert!(output.contents.contains("impl Migration for SquashedSchema"));

    let path = output.path.unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), output.contents);
}

#[tokio::test]
async fn invalid_config_is_rejected_up_front() {
    let adapter = Arc::new(InMemoryAdapter::new());
    let config = MigrationConfig::default().with_table("");

    let err = MigrationRunner::new(adapter, config, MigrationRegistry::new())
        .err()
        .unwrap();
    assert!(matches!(err, ArcanoxError::Configuration(_)));
}

#[tokio::test]
async fn pretend_refresh_and_fresh_report_what_they_would_reapply() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[USERS, POSTS]);
    runner.run(RunOptions::new()).await.unwrap();
    let mutations = adapter.mutation_count();

    let refreshed = runner.refresh(RunOptions::new().pretend()).await.unwrap();
    assert!(refreshed.pretend);
    assert_eq!(refreshed.batch, Some(1));
    assert_eq!(refreshed.migrated, vec![USERS, POSTS]);

    let fresh = runner.fresh(RunOptions::new().pretend()).await.unwrap();
    assert_eq!(fresh.batch, Some(1));
    assert_eq!(fresh.migrated, vec![USERS, POSTS]);

    assert_eq!(adapter.mutation_count(), mutations);
    assert_eq!(runner.repository().get_ran().await.unwrap(), vec![USERS, POSTS]);
    assert!(adapter.has_table("users").await.unwrap());
}

struct LockObserver {
    adapter: Arc<InMemoryAdapter>,
    held: Mutex<Vec<bool>>,
}

#[async_trait]
impl MigrationListener for LockObserver {
    async fn handle(&self, _event: &MigrationEvent) -> ArcanoxResult<()> {
        let held = self.adapter.is_locked("arcanox_migrations_lock");
        self.held.lock().unwrap().push(held);
        Ok(())
    }
}

#[tokio::test]
async fn composite_operations_take_the_lock_once() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_advisory_lock(Duration::from_millis(30));
    let (adapter, mut runner) = runner_with(&dir, config, &[USERS, POSTS]);
    let observer = Arc::new(LockObserver {
        adapter: adapter.clone(),
        held: Mutex::new(Vec::new()),
    });
    runner.listen(observer.clone());

    runner.run(RunOptions::new()).await.unwrap();
    assert_eq!(adapter.lock_acquisitions(), 1);

    let refreshed = runner.refresh(RunOptions::new()).await.unwrap();
    assert_eq!(refreshed.migrated, vec![USERS, POSTS]);
    assert_eq!(adapter.lock_acquisitions(), 2);

    let fresh = runner.fresh(RunOptions::new()).await.unwrap();
    assert_eq!(fresh.migrated, vec![USERS, POSTS]);
    assert_eq!(adapter.lock_acquisitions(), 3);

    runner.reset(false).await.unwrap();
    assert_eq!(adapter.lock_acquisitions(), 4);

    assert!(!adapter.is_locked("arcanox_migrations_lock"));
    let held = observer.held.lock().unwrap();
    assert!(!held.is_empty());
    assert!(held.iter().all(|locked| *locked));
}

#[tokio::test]
async fn lock_is_released_after_a_failed_migration() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_advisory_lock(Duration::from_millis(30));
    let (adapter, mut runner) = runner_with(&dir, config, &[USERS, "20240102000000_broken"]);

    assert!(runner.run(RunOptions::new()).await.is_err());
    assert!(!adapter.is_locked("arcanox_migrations_lock"));
    assert_eq!(adapter.lock_acquisitions(), 1);

    // a second invocation is not blocked by a stale lock
    let err = runner.run(RunOptions::new()).await.unwrap_err();
    assert!(matches!(err, ArcanoxError::Execution { .. }));
    assert_eq!(adapter.lock_acquisitions(), 2);
}

#[tokio::test]
async fn only_runs_the_named_subset() {
    let dir = TempDir::new().unwrap();
    let (_, mut runner) = runner(&dir, &[USERS, POSTS]);

    let result = runner.run(RunOptions::new().only(&[POSTS])).await.unwrap();
    assert_eq!(result.migrated, vec![POSTS]);
    assert_eq!(result.batch, Some(1));
    assert_eq!(runner.get_pending().await.unwrap(), vec![USERS]);

    let rest = runner.run(RunOptions::new()).await.unwrap();
    assert_eq!(rest.migrated, vec![USERS]);
    assert_eq!(rest.batch, Some(2));
}

#[tokio::test]
async fn unknown_only_name_fails_before_any_mutation() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[USERS]);

    let err = runner
        .run(RunOptions::new().only(&["20990101000000_missing"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ArcanoxError::Validation(_)));
    assert_eq!(adapter.mutation_count(), 0);
    assert!(adapter.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn rollback_batch_floor_outranks_steps() {
    let dir = TempDir::new().unwrap();
    let (adapter, mut runner) = runner(&dir, &[USERS, POSTS, COMMENTS]);
    for _ in 0..3 {
        runner.run(RunOptions::new().step()).await.unwrap();
    }
    assert_eq!(runner.repository().get_last_batch_number().await.unwrap(), 3);

    let result = runner
        .rollback(RollbackOptions::new().batch(2).steps(1))
        .await
        .unwrap();
    assert_eq!(result.rolled_back, vec![COMMENTS, POSTS]);
    assert_eq!(runner.repository().get_ran().await.unwrap(), vec![USERS]);
    assert!(adapter.has_table("users").await.unwrap());
    assert!(!adapter.has_table("posts").await.unwrap());
}
