//! Migration sources - discovering, loading and creating migration files
//!
//! [`MigrationFileResolver`] scans the configured directories for migration
//! files. Loading a file resolves a factory from the [`MigrationRegistry`] by
//! the file's canonical name; plain `.sql` files without a registered factory
//! are executed as [`SqlFileMigration`]s.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use tracing::{debug, warn};

use super::definitions::Migration;
use crate::config::MigrationConfig;
use crate::error::{ArcanoxError, ArcanoxResult};
use crate::schema::Schema;

static MIGRATION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{14}_[a-z0-9_]+$").expect("valid migration name pattern"));

/// Builds a fresh migration instance
pub type MigrationFactory = Arc<dyn Fn() -> Box<dyn Migration> + Send + Sync>;

/// Name to factory mapping for compiled migrations
#[derive(Clone, Default)]
pub struct MigrationRegistry {
    factories: BTreeMap<String, MigrationFactory>,
}

impl std::fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("migrations", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under the migration's canonical name
    pub fn register<F, M>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: Migration + 'static,
    {
        self.factories.insert(
            name.to_string(),
            Arc::new(move || Box::new(factory()) as Box<dyn Migration>),
        );
        self
    }

    pub fn register_default<M>(&mut self, name: &str) -> &mut Self
    where
        M: Migration + Default + 'static,
    {
        self.register(name, M::default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Migration>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

/// A migration whose body is plain SQL read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFileMigration {
    name: String,
    up_sql: String,
    down_sql: String,
}

impl SqlFileMigration {
    pub fn new(name: &str, up_sql: &str, down_sql: &str) -> Self {
        Self {
            name: name.to_string(),
            up_sql: up_sql.to_string(),
            down_sql: down_sql.to_string(),
        }
    }

    /// Parse `-- Up migration` / `-- Down migration` sections
    pub fn parse(name: &str, content: &str) -> ArcanoxResult<Self> {
        let mut up_sql = Vec::new();
        let mut down_sql = Vec::new();
        let mut section = None;
        let mut saw_up = false;

        for line in content.lines() {
            let trimmed = line.trim();
            let lowered = trimmed.to_lowercase();

            match lowered.strip_prefix("--").map(str::trim) {
                Some(marker) if is_section_marker(marker, "up") => {
                    section = Some(true);
                    saw_up = true;
                    continue;
                }
                Some(marker) if is_section_marker(marker, "down") => {
                    section = Some(false);
                    continue;
                }
                _ => {}
            }

            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }

            match section {
                Some(true) => up_sql.push(line),
                Some(false) => down_sql.push(line),
                None => {}
            }
        }

        if !saw_up {
            return Err(ArcanoxError::validation(format!(
                "Migration '{}' has no '-- Up migration' section",
                name
            )));
        }

        Ok(Self::new(
            name,
            up_sql.join("\n").trim(),
            down_sql.join("\n").trim(),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn up_sql(&self) -> &str {
        &self.up_sql
    }

    pub fn down_sql(&self) -> &str {
        &self.down_sql
    }

    async fn execute(&self, schema: &Schema, sql: &str) -> ArcanoxResult<()> {
        if sql.is_empty() {
            debug!(migration = %self.name, "No SQL to execute");
            return Ok(());
        }

        let adapter = schema.adapter()?;
        for statement in split_sql_statements(sql) {
            adapter.raw(&statement, &[]).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Migration for SqlFileMigration {
    async fn up(&self, schema: &Schema) -> ArcanoxResult<()> {
        self.execute(schema, &self.up_sql).await
    }

    async fn down(&self, schema: &Schema) -> ArcanoxResult<()> {
        self.execute(schema, &self.down_sql).await
    }
}

fn is_section_marker(marker: &str, direction: &str) -> bool {
    marker
        .strip_prefix(direction)
        .map(|rest| {
            rest.is_empty() || rest.starts_with(':') || rest.trim_start().starts_with("migration")
        })
        .unwrap_or(false)
}

/// Split SQL into statements using a real parser, falling back to
/// semicolon splitting for syntax the generic dialect does not know.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let dialect = GenericDialect {};

    match Parser::parse_sql(&dialect, sql) {
        Ok(statements) => statements
            .into_iter()
            .map(|statement| format!("{};", statement))
            .collect(),
        Err(e) => {
            warn!("SQL parsing failed, using naive semicolon splitting: {}", e);
            sql.split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| format!("{};", s))
                .collect()
        }
    }
}

/// Canonical migration name: the file name without its extension
pub fn migration_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// Whether a name follows `{14-digit timestamp}_{snake_case}`
pub fn follows_naming_convention(name: &str) -> bool {
    MIGRATION_NAME.is_match(name)
}

/// Convert free text to a snake_case file name fragment
pub fn to_snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len());
    let mut previous_lower = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if ch.is_ascii_uppercase() && previous_lower {
                snake.push('_');
            }
            previous_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            snake.push(ch.to_ascii_lowercase());
        } else {
            if !snake.ends_with('_') && !snake.is_empty() {
                snake.push('_');
            }
            previous_lower = false;
        }
    }

    snake.trim_end_matches('_').to_string()
}

pub struct MigrationFileResolver {
    paths: Vec<PathBuf>,
    extensions: Vec<String>,
    registry: MigrationRegistry,
}

impl MigrationFileResolver {
    pub fn new(config: &MigrationConfig, registry: MigrationRegistry) -> Self {
        Self {
            paths: config.migration_paths.clone(),
            extensions: config.extensions.clone(),
            registry,
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    fn is_migration_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|allowed| allowed == ext))
            .unwrap_or(false)
    }

    /// Discover migration files, first directory wins on duplicate names.
    ///
    /// Missing directories are skipped. The result is sorted by name, which
    /// is execution order.
    pub async fn get_migration_files(&self) -> ArcanoxResult<BTreeMap<String, PathBuf>> {
        let mut files = BTreeMap::new();

        for dir in &self.paths {
            if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
                debug!(path = %dir.display(), "Skipping missing migrations directory");
                continue;
            }

            let mut entries = tokio::fs::read_dir(dir)
                .await
                .map_err(|e| ArcanoxError::io(dir, e))?;
            let mut found = Vec::new();
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| ArcanoxError::io(dir, e))?
            {
                let path = entry.path();
                let is_file = entry
                    .file_type()
                    .await
                    .map(|kind| kind.is_file())
                    .unwrap_or(false);
                if is_file && self.is_migration_file(&path) {
                    found.push(path);
                }
            }
            found.sort();

            for path in found {
                let Some(name) = migration_name(&path) else {
                    continue;
                };
                if files.contains_key(&name) {
                    debug!(migration = %name, path = %path.display(), "Ignoring shadowed migration file");
                    continue;
                }
                if !follows_naming_convention(&name) {
                    warn!(migration = %name, "Migration name does not follow the timestamp_name convention");
                }
                files.insert(name, path);
            }
        }

        Ok(files)
    }

    /// Instantiate the migration stored at `path`
    pub async fn load_migration(&self, path: &Path) -> ArcanoxResult<Box<dyn Migration>> {
        let name = migration_name(path).ok_or_else(|| {
            ArcanoxError::validation(format!("Invalid migration file name: {}", path.display()))
        })?;

        if let Some(migration) = self.registry.instantiate(&name) {
            return Ok(migration);
        }

        if path.extension().and_then(|ext| ext.to_str()) == Some("sql") {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ArcanoxError::io(path, e))?;
            return Ok(Box::new(SqlFileMigration::parse(&name, &content)?));
        }

        Err(ArcanoxError::validation(format!(
            "No migration registered for '{}' ({}); register a factory in the MigrationRegistry",
            name,
            path.display()
        )))
    }

    /// Scaffold a timestamped `.sql` migration in the first directory
    pub async fn create_migration(&self, name: &str) -> ArcanoxResult<PathBuf> {
        let snake = to_snake_case(name);
        if snake.is_empty() {
            return Err(ArcanoxError::validation(format!(
                "Migration name '{}' contains no usable characters",
                name
            )));
        }

        let dir = self.paths.first().ok_or_else(|| {
            ArcanoxError::configuration("No migrations directory configured")
        })?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ArcanoxError::io(dir, e))?;

        let migration = format!("{}_{}", Utc::now().format("%Y%m%d%H%M%S"), snake);
        let path = dir.join(format!("{}.sql", migration));
        tokio::fs::write(&path, migration_template(name, &migration))
            .await
            .map_err(|e| ArcanoxError::io(&path, e))?;

        debug!(migration = %migration, path = %path.display(), "Created migration");
        Ok(path)
    }
}

fn migration_template(name: &str, migration: &str) -> String {
    format!(
        "-- Migration: {}\n\
         -- Name: {}\n\
         -- Created: {}\n\n\
         -- Up migration\n\n\n\
         -- Down migration\n\n",
        name,
        migration,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}
