//! In-memory adapter
//!
//! A complete [`DatabaseAdapter`] backed by process memory. It supports
//! snapshot transactions and advisory locks, and records every mutating call
//! so callers can assert that an operation (pretend mode, for instance) left
//! the store untouched.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, trace};

use super::{
    AdvisoryLockAdapter, ConnectionConfig, ConnectionInfo, DatabaseAdapter, DatabaseBackendType,
    DatabaseValue, Row, SelectOptions, SortDirection, TransactionalAdapter,
};
use crate::error::{ArcanoxError, ArcanoxResult};
use crate::schema::ColumnDefinition;

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    columns: Vec<ColumnDefinition>,
    rows: Vec<Row>,
    next_id: i64,
}

impl MemoryTable {
    fn id_column(&self) -> &str {
        self.columns
            .iter()
            .find(|c| c.auto_increment)
            .map(|c| c.name.as_str())
            .unwrap_or("id")
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    connected: Option<ConnectionInfo>,
    tables: BTreeMap<String, MemoryTable>,
    snapshot: Option<BTreeMap<String, MemoryTable>>,
    locks: BTreeSet<String>,
    statements: Vec<String>,
    fail_on: Vec<String>,
}

/// Process-local database used for tests and dry runs
#[derive(Debug)]
pub struct InMemoryAdapter {
    state: Mutex<MemoryState>,
    mutations: AtomicUsize,
    lock_acquisitions: AtomicUsize,
    supports_transactions: bool,
    supports_locks: bool,
}

impl Default for InMemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAdapter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            mutations: AtomicUsize::new(0),
            lock_acquisitions: AtomicUsize::new(0),
            supports_transactions: true,
            supports_locks: true,
        }
    }

    /// Behave like a backend without transaction support
    pub fn without_transactions(mut self) -> Self {
        self.supports_transactions = false;
        self
    }

    /// Behave like a backend without advisory locks
    pub fn without_advisory_lock(mut self) -> Self {
        self.supports_locks = false;
        self
    }

    /// Make any `raw` statement containing `needle` fail
    pub fn fail_raw_containing(&self, needle: &str) {
        self.state().fail_on.push(needle.to_string());
    }

    /// Number of mutating calls served so far (rolled back ones included)
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(AtomicOrdering::SeqCst)
    }

    /// Number of successful advisory lock acquisitions
    pub fn lock_acquisitions(&self) -> usize {
        self.lock_acquisitions.load(AtomicOrdering::SeqCst)
    }

    /// Raw statements executed so far, in order
    pub fn executed_statements(&self) -> Vec<String> {
        self.state().statements.clone()
    }

    pub fn table_columns(&self, table: &str) -> Option<Vec<ColumnDefinition>> {
        self.state().tables.get(table).map(|t| t.columns.clone())
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn in_transaction(&self) -> bool {
        self.state().snapshot.is_some()
    }

    pub fn is_locked(&self, name: &str) -> bool {
        self.state().locks.contains(name)
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_mutation(&self) {
        self.mutations.fetch_add(1, AtomicOrdering::SeqCst);
    }

    fn missing_table(table: &str) -> ArcanoxError {
        ArcanoxError::adapter(format!("no such table: {}", table))
    }
}

fn matches_filters(row: &Row, options: &SelectOptions) -> bool {
    options.filters.iter().all(|filter| {
        let value = row.get(&filter.column).unwrap_or(&DatabaseValue::Null);
        value
            .compare(&filter.value)
            .map(|ordering| filter.operator.accepts(ordering))
            .unwrap_or(false)
    })
}

fn compare_rows(a: &Row, b: &Row, options: &SelectOptions) -> Ordering {
    for order in &options.order_by {
        let left = a.get(&order.column).unwrap_or(&DatabaseValue::Null);
        let right = b.get(&order.column).unwrap_or(&DatabaseValue::Null);
        let ordering = left.compare(right).unwrap_or(Ordering::Equal);
        let ordering = match order.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn same_id(row: &Row, id_column: &str, id: &DatabaseValue) -> bool {
    row.get(id_column)
        .and_then(|value| value.compare(id))
        .map(|ordering| ordering == Ordering::Equal)
        .unwrap_or(false)
}

#[async_trait]
impl DatabaseAdapter for InMemoryAdapter {
    async fn connect(&self, config: &ConnectionConfig) -> ArcanoxResult<ConnectionInfo> {
        let info = ConnectionInfo {
            backend: DatabaseBackendType::Memory,
            database: config.database.clone(),
        };
        self.state().connected = Some(info.clone());
        debug!("Connected in-memory adapter");
        Ok(info)
    }

    async fn disconnect(&self) -> ArcanoxResult<()> {
        self.state().connected = None;
        Ok(())
    }

    fn backend_type(&self) -> DatabaseBackendType {
        DatabaseBackendType::Memory
    }

    async fn create_table(&self, table: &str, columns: &[ColumnDefinition]) -> ArcanoxResult<()> {
        let mut state = self.state();
        if state.tables.contains_key(table) {
            return Err(ArcanoxError::adapter(format!(
                "table {} already exists",
                table
            )));
        }
        state.tables.insert(
            table.to_string(),
            MemoryTable {
                columns: columns.to_vec(),
                rows: Vec::new(),
                next_id: 1,
            },
        );
        drop(state);
        self.record_mutation();
        trace!(table = %table, columns = columns.len(), "Created table");
        Ok(())
    }

    async fn drop_table(&self, table: &str) -> ArcanoxResult<()> {
        let removed = self.state().tables.remove(table);
        match removed {
            Some(_) => {
                self.record_mutation();
                trace!(table = %table, "Dropped table");
                Ok(())
            }
            None => Err(Self::missing_table(table)),
        }
    }

    async fn has_table(&self, table: &str) -> ArcanoxResult<bool> {
        Ok(self.state().tables.contains_key(table))
    }

    async fn has_column(&self, table: &str, column: &str) -> ArcanoxResult<bool> {
        Ok(self
            .state()
            .tables
            .get(table)
            .map(|t| t.columns.iter().any(|c| c.name == column))
            .unwrap_or(false))
    }

    async fn list_tables(&self) -> ArcanoxResult<Vec<String>> {
        Ok(self.state().tables.keys().cloned().collect())
    }

    async fn select(&self, table: &str, options: &SelectOptions) -> ArcanoxResult<Vec<Row>> {
        let state = self.state();
        let stored = state
            .tables
            .get(table)
            .ok_or_else(|| Self::missing_table(table))?;

        let mut rows: Vec<Row> = stored
            .rows
            .iter()
            .filter(|row| matches_filters(row, options))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_rows(a, b, options));

        let rows = rows
            .into_iter()
            .skip(options.offset.unwrap_or(0))
            .take(options.limit.unwrap_or(usize::MAX))
            .map(|row| {
                if options.columns.is_empty() {
                    row
                } else {
                    row.into_iter()
                        .filter(|(key, _)| options.columns.contains(key))
                        .collect()
                }
            })
            .collect();
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut data: Row) -> ArcanoxResult<Row> {
        let mut state = self.state();
        let stored = state
            .tables
            .get_mut(table)
            .ok_or_else(|| Self::missing_table(table))?;

        let id_column = stored.id_column().to_string();
        match data.get(&id_column).and_then(|v| v.as_i64()) {
            Some(explicit) => stored.next_id = stored.next_id.max(explicit + 1),
            None => {
                data.insert(id_column, DatabaseValue::Int64(stored.next_id));
                stored.next_id += 1;
            }
        }
        stored.rows.push(data.clone());
        drop(state);

        self.record_mutation();
        Ok(data)
    }

    async fn update(&self, table: &str, id: &DatabaseValue, data: Row) -> ArcanoxResult<Row> {
        let mut state = self.state();
        let stored = state
            .tables
            .get_mut(table)
            .ok_or_else(|| Self::missing_table(table))?;

        let id_column = stored.id_column().to_string();
        let row = stored
            .rows
            .iter_mut()
            .find(|row| same_id(row, &id_column, id))
            .ok_or_else(|| {
                ArcanoxError::adapter(format!("no row in {} with {} = {:?}", table, id_column, id))
            })?;
        row.extend(data);
        let updated = row.clone();
        drop(state);

        self.record_mutation();
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &DatabaseValue) -> ArcanoxResult<bool> {
        let mut state = self.state();
        let stored = state
            .tables
            .get_mut(table)
            .ok_or_else(|| Self::missing_table(table))?;

        let id_column = stored.id_column().to_string();
        let before = stored.rows.len();
        stored.rows.retain(|row| !same_id(row, &id_column, id));
        let deleted = stored.rows.len() != before;
        drop(state);

        if deleted {
            self.record_mutation();
        }
        Ok(deleted)
    }

    async fn raw(&self, query: &str, params: &[DatabaseValue]) -> ArcanoxResult<JsonValue> {
        let mut state = self.state();
        if let Some(needle) = state.fail_on.iter().find(|n| query.contains(n.as_str())) {
            return Err(ArcanoxError::adapter(format!(
                "statement rejected ({}): {}",
                needle, query
            )));
        }
        state.statements.push(query.to_string());
        drop(state);

        self.record_mutation();
        trace!(query = %query, params = params.len(), "Executed raw statement");
        Ok(json!({ "affected_rows": 0 }))
    }

    fn transactions(&self) -> Option<&dyn TransactionalAdapter> {
        if self.supports_transactions {
            Some(self)
        } else {
            None
        }
    }

    fn advisory_lock(&self) -> Option<&dyn AdvisoryLockAdapter> {
        if self.supports_locks {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl TransactionalAdapter for InMemoryAdapter {
    async fn begin_transaction(&self) -> ArcanoxResult<()> {
        let mut state = self.state();
        if state.snapshot.is_some() {
            return Err(ArcanoxError::adapter("transaction already active"));
        }
        state.snapshot = Some(state.tables.clone());
        Ok(())
    }

    async fn commit(&self) -> ArcanoxResult<()> {
        let mut state = self.state();
        match state.snapshot.take() {
            Some(_) => Ok(()),
            None => Err(ArcanoxError::adapter("no active transaction to commit")),
        }
    }

    async fn rollback(&self) -> ArcanoxResult<()> {
        let mut state = self.state();
        match state.snapshot.take() {
            Some(snapshot) => {
                state.tables = snapshot;
                Ok(())
            }
            None => Err(ArcanoxError::adapter("no active transaction to roll back")),
        }
    }
}

#[async_trait]
impl AdvisoryLockAdapter for InMemoryAdapter {
    async fn acquire_lock(&self, name: &str, timeout: Duration) -> ArcanoxResult<bool> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.state().locks.insert(name.to_string()) {
                self.lock_acquisitions.fetch_add(1, AtomicOrdering::SeqCst);
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(LOCK_POLL_INTERVAL).await;
        }
    }

    async fn release_lock(&self, name: &str) -> ArcanoxResult<()> {
        self.state().locks.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::FilterOperator;
    use crate::schema::{ColumnType, Schema};
    use std::sync::Arc;

    fn row(pairs: &[(&str, DatabaseValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    async fn adapter_with_users() -> InMemoryAdapter {
        let adapter = InMemoryAdapter::new();
        let mut id = ColumnDefinition::new("id", ColumnType::BigInteger);
        id.auto_increment = true;
        adapter
            .create_table(
                "users",
                &[id, ColumnDefinition::new("name", ColumnType::String { length: 255 })],
            )
            .await
            .unwrap();
        adapter
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_select_filters() {
        let adapter = adapter_with_users().await;
        for name in ["ada", "grace", "linus"] {
            adapter
                .insert("users", row(&[("name", name.into())]))
                .await
                .unwrap();
        }

        let rows = adapter
            .select(
                "users",
                &SelectOptions::new()
                    .filter("id", FilterOperator::Gte, 2)
                    .order_by("id", SortDirection::Desc)
                    .columns(&["name"]),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some(&DatabaseValue::from("linus")));
        assert!(rows[0].get("id").is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_by_id() {
        let adapter = adapter_with_users().await;
        let inserted = adapter
            .insert("users", row(&[("name", "ada".into())]))
            .await
            .unwrap();
        let id = inserted.get("id").cloned().unwrap();

        let updated = adapter
            .update("users", &id, row(&[("name", "ada l.".into())]))
            .await
            .unwrap();
        assert_eq!(updated.get("name"), Some(&DatabaseValue::from("ada l.")));

        assert!(adapter.delete("users", &id).await.unwrap());
        assert!(!adapter.delete("users", &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_rollback_restores_snapshot() {
        let adapter = adapter_with_users().await;
        let tx = adapter.transactions().unwrap();

        tx.begin_transaction().await.unwrap();
        adapter
            .insert("users", row(&[("name", "temp".into())]))
            .await
            .unwrap();
        adapter.drop_table("users").await.unwrap();
        tx.rollback().await.unwrap();

        assert!(adapter.has_table("users").await.unwrap());
        assert!(adapter.rows("users").is_empty());
        assert!(!adapter.in_transaction());
    }

    #[tokio::test]
    async fn test_nested_transactions_are_rejected() {
        let adapter = InMemoryAdapter::new();
        let tx = adapter.transactions().unwrap();
        tx.begin_transaction().await.unwrap();
        assert!(tx.begin_transaction().await.is_err());
        tx.commit().await.unwrap();
        assert!(tx.commit().await.is_err());
    }

    #[tokio::test]
    async fn test_advisory_lock_times_out_while_held() {
        let adapter = Arc::new(InMemoryAdapter::new());
        let lock = adapter.advisory_lock().unwrap();

        assert!(lock
            .acquire_lock("arcanox", Duration::from_millis(10))
            .await
            .unwrap());
        assert!(!lock
            .acquire_lock("arcanox", Duration::from_millis(30))
            .await
            .unwrap());

        lock.release_lock("arcanox").await.unwrap();
        assert!(!adapter.is_locked("arcanox"));
        assert_eq!(adapter.lock_acquisitions(), 1);
    }

    #[tokio::test]
    async fn test_capabilities_can_be_disabled() {
        let adapter = InMemoryAdapter::new()
            .without_transactions()
            .without_advisory_lock();
        assert!(adapter.transactions().is_none());
        assert!(adapter.advisory_lock().is_none());
    }

    #[tokio::test]
    async fn test_raw_failure_injection() {
        let adapter = InMemoryAdapter::new();
        adapter.fail_raw_containing("DROP");

        adapter.raw("CREATE TABLE t (id INT)", &[]).await.unwrap();
        assert!(adapter.raw("DROP TABLE t", &[]).await.is_err());
        assert_eq!(adapter.executed_statements(), vec!["CREATE TABLE t (id INT)"]);
    }

    #[tokio::test]
    async fn test_schema_facade_round_trip() {
        let adapter = Arc::new(InMemoryAdapter::new());
        let schema = Schema::new(adapter.clone());

        schema
            .create("flights", |table| {
                table.id();
                table.string("name", None);
                table.timestamps();
            })
            .await
            .unwrap();

        assert_eq!(adapter.list_tables().await.unwrap(), vec!["flights"]);
        assert!(schema.has_column("flights", "created_at").await.unwrap());
    }
}
