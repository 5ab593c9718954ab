//! Database Adapter Contract
//!
//! This module defines the narrow interface through which the migration engine
//! and the schema facade talk to a concrete database backend. Relational (SQL)
//! and document backends implement the same trait; optional capabilities such
//! as transactions and advisory locking are exposed as explicit accessors
//! rather than being probed at runtime.

pub mod memory;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{ArcanoxError, ArcanoxResult};
use crate::schema::ColumnDefinition;

pub use memory::InMemoryAdapter;

/// Database backend type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseBackendType {
    PostgreSQL,
    MySQL,
    SQLite,
    MongoDB,
    /// Process-local backend used for tests and dry environments
    Memory,
}

impl DatabaseBackendType {
    /// SQL dialect for relational backends, `None` for document stores
    pub fn sql_dialect(&self) -> Option<SqlDialect> {
        match self {
            DatabaseBackendType::PostgreSQL => Some(SqlDialect::PostgreSQL),
            DatabaseBackendType::MySQL => Some(SqlDialect::MySQL),
            DatabaseBackendType::SQLite => Some(SqlDialect::SQLite),
            DatabaseBackendType::MongoDB | DatabaseBackendType::Memory => None,
        }
    }

    /// Whether the backend stores schemaless documents
    pub fn is_document_store(&self) -> bool {
        matches!(self, DatabaseBackendType::MongoDB)
    }
}

impl std::fmt::Display for DatabaseBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseBackendType::PostgreSQL => write!(f, "postgresql"),
            DatabaseBackendType::MySQL => write!(f, "mysql"),
            DatabaseBackendType::SQLite => write!(f, "sqlite"),
            DatabaseBackendType::MongoDB => write!(f, "mongodb"),
            DatabaseBackendType::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for DatabaseBackendType {
    type Err = ArcanoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(DatabaseBackendType::PostgreSQL),
            "mysql" | "mariadb" => Ok(DatabaseBackendType::MySQL),
            "sqlite" => Ok(DatabaseBackendType::SQLite),
            "mongodb" | "mongo" => Ok(DatabaseBackendType::MongoDB),
            "memory" => Ok(DatabaseBackendType::Memory),
            _ => Err(ArcanoxError::configuration(format!(
                "Unsupported database type: {}",
                s
            ))),
        }
    }
}

/// SQL dialect enumeration for generating database-specific SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    PostgreSQL,
    MySQL,
    SQLite,
}

impl SqlDialect {
    /// Get the parameter placeholder style for this dialect
    pub fn parameter_placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::PostgreSQL => format!("${}", index + 1),
            SqlDialect::MySQL | SqlDialect::SQLite => "?".to_string(),
        }
    }

    /// Get the quote character for identifiers in this dialect
    pub fn identifier_quote(&self) -> char {
        match self {
            SqlDialect::PostgreSQL | SqlDialect::SQLite => '"',
            SqlDialect::MySQL => '`',
        }
    }

    /// Quote an identifier, doubling any embedded quote characters
    pub fn quote_identifier(&self, identifier: &str) -> String {
        let quote = self.identifier_quote();
        let escaped = identifier.replace(quote, &format!("{}{}", quote, quote));
        format!("{}{}{}", quote, escaped, quote)
    }

    /// Get the current timestamp function for this dialect
    pub fn current_timestamp(&self) -> &'static str {
        match self {
            SqlDialect::PostgreSQL | SqlDialect::MySQL => "CURRENT_TIMESTAMP",
            SqlDialect::SQLite => "(datetime('now'))",
        }
    }

    /// MySQL commits implicitly around DDL, so wrapping migrations in a
    /// transaction does not make them atomic there.
    pub fn supports_transactional_ddl(&self) -> bool {
        match self {
            SqlDialect::PostgreSQL | SqlDialect::SQLite => true,
            SqlDialect::MySQL => false,
        }
    }
}

/// Database value enumeration for type-safe parameter binding
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    DateTime(chrono::DateTime<chrono::Utc>),
    Json(JsonValue),
    Array(Vec<DatabaseValue>),
}

impl DatabaseValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DatabaseValue::Int32(i) => Some(*i as i64),
            DatabaseValue::Int64(i) => Some(*i),
            DatabaseValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DatabaseValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        match self {
            DatabaseValue::DateTime(dt) => Some(*dt),
            DatabaseValue::String(s) => chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&chrono::Utc)),
            _ => None,
        }
    }

    /// Ordering between comparable values; numbers compare across widths
    pub fn compare(&self, other: &DatabaseValue) -> Option<Ordering> {
        use DatabaseValue::*;
        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Null, _) => Some(Ordering::Less),
            (_, Null) => Some(Ordering::Greater),
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            (String(a), String(b)) => a.partial_cmp(b),
            (Uuid(a), Uuid(b)) => a.partial_cmp(b),
            (DateTime(a), DateTime(b)) => a.partial_cmp(b),
            (Float64(a), Float64(b)) => a.partial_cmp(b),
            (Float64(a), b) => b.as_i64().and_then(|b| a.partial_cmp(&(b as f64))),
            (a, Float64(b)) => a.as_i64().and_then(|a| (a as f64).partial_cmp(b)),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int32(i) => JsonValue::from(*i),
            DatabaseValue::Int64(i) => JsonValue::from(*i),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Bytes(b) => JsonValue::String(hex::encode(b)),
            DatabaseValue::Uuid(u) => JsonValue::String(u.to_string()),
            DatabaseValue::DateTime(dt) => JsonValue::String(dt.to_rfc3339()),
            DatabaseValue::Json(j) => j.clone(),
            DatabaseValue::Array(arr) => JsonValue::Array(arr.iter().map(|v| v.to_json()).collect()),
        }
    }

    /// Render as a SQL literal, used for column defaults in DDL
    pub fn to_sql_literal(&self) -> String {
        match self {
            DatabaseValue::Null => "NULL".to_string(),
            DatabaseValue::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            DatabaseValue::Int32(i) => i.to_string(),
            DatabaseValue::Int64(i) => i.to_string(),
            DatabaseValue::Float64(f) => f.to_string(),
            DatabaseValue::Bytes(b) => format!("X'{}'", hex::encode(b)),
            DatabaseValue::Array(_) | DatabaseValue::Json(_) => {
                format!("'{}'", self.to_json().to_string().replace('\'', "''"))
            }
            DatabaseValue::String(s) => format!("'{}'", s.replace('\'', "''")),
            DatabaseValue::Uuid(u) => format!("'{}'", u),
            DatabaseValue::DateTime(dt) => format!("'{}'", dt.to_rfc3339()),
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i32> for DatabaseValue {
    fn from(value: i32) -> Self {
        DatabaseValue::Int32(value)
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int64(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float64(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<uuid::Uuid> for DatabaseValue {
    fn from(value: uuid::Uuid) -> Self {
        DatabaseValue::Uuid(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DatabaseValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        DatabaseValue::DateTime(value)
    }
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::Json(value)
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// One record as returned by an adapter, keyed by column/field name
pub type Row = BTreeMap<String, DatabaseValue>;

/// Comparison operators understood by every adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl FilterOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::NotEq => "<>",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
        }
    }

    /// Evaluate the operator against an already computed ordering
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            FilterOperator::Eq => ordering == Ordering::Equal,
            FilterOperator::NotEq => ordering != Ordering::Equal,
            FilterOperator::Lt => ordering == Ordering::Less,
            FilterOperator::Lte => ordering != Ordering::Greater,
            FilterOperator::Gt => ordering == Ordering::Greater,
            FilterOperator::Gte => ordering != Ordering::Less,
        }
    }
}

/// A single `column <op> value` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    pub value: DatabaseValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

/// Options for [`DatabaseAdapter::select`]; all filters are AND-ed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    /// Projected columns, empty selects everything
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn filter(
        mut self,
        column: &str,
        operator: FilterOperator,
        value: impl Into<DatabaseValue>,
    ) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            operator,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, column: &str, value: impl Into<DatabaseValue>) -> Self {
        self.filter(column, FilterOperator::Eq, value)
    }

    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Connection parameters handed to [`DatabaseAdapter::connect`]
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfig {
    pub url: String,
    pub database: Option<String>,
    pub options: BTreeMap<String, String>,
}

/// Description of an established connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub backend: DatabaseBackendType,
    pub database: Option<String>,
}

/// The narrow contract every backend implements.
///
/// The adapter is shared (never owned) by the schema facade, the migration
/// repository and the runner; only the top-level caller disconnects it.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> ArcanoxResult<ConnectionInfo>;

    async fn disconnect(&self) -> ArcanoxResult<()>;

    fn backend_type(&self) -> DatabaseBackendType;

    async fn create_table(&self, table: &str, columns: &[ColumnDefinition]) -> ArcanoxResult<()>;

    async fn drop_table(&self, table: &str) -> ArcanoxResult<()>;

    async fn has_table(&self, table: &str) -> ArcanoxResult<bool>;

    async fn has_column(&self, table: &str, column: &str) -> ArcanoxResult<bool>;

    /// Names of every user table/collection known to the backend
    async fn list_tables(&self) -> ArcanoxResult<Vec<String>>;

    async fn select(&self, table: &str, options: &SelectOptions) -> ArcanoxResult<Vec<Row>>;

    /// Insert one record and return it as stored (including generated ids)
    async fn insert(&self, table: &str, data: Row) -> ArcanoxResult<Row>;

    async fn update(&self, table: &str, id: &DatabaseValue, data: Row) -> ArcanoxResult<Row>;

    async fn delete(&self, table: &str, id: &DatabaseValue) -> ArcanoxResult<bool>;

    /// Execute a backend-native statement (SQL text, pipeline JSON, ...)
    async fn raw(&self, query: &str, params: &[DatabaseValue]) -> ArcanoxResult<JsonValue>;

    /// Transaction primitives, when the backend supports them
    fn transactions(&self) -> Option<&dyn TransactionalAdapter> {
        None
    }

    /// Cross-process advisory locking, when the backend supports it
    fn advisory_lock(&self) -> Option<&dyn AdvisoryLockAdapter> {
        None
    }
}

/// Optional transaction capability
#[async_trait]
pub trait TransactionalAdapter: Send + Sync {
    async fn begin_transaction(&self) -> ArcanoxResult<()>;

    async fn commit(&self) -> ArcanoxResult<()>;

    async fn rollback(&self) -> ArcanoxResult<()>;
}

/// Optional advisory lock capability guarding the tracking table
#[async_trait]
pub trait AdvisoryLockAdapter: Send + Sync {
    /// Try to take the named lock, waiting at most `timeout`.
    /// Returns `false` when the lock is still held elsewhere.
    async fn acquire_lock(&self, name: &str, timeout: Duration) -> ArcanoxResult<bool>;

    async fn release_lock(&self, name: &str) -> ArcanoxResult<()>;
}
