//! Schema facade
//!
//! [`Schema`] turns blueprint callbacks into adapter calls. The adapter is
//! injected explicitly; a process-wide default can be registered with
//! [`set_default_adapter`] for hosts that load several independent copies of
//! the migration engine and need them to share one connection.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use super::blueprint::Blueprint;
use crate::adapter::DatabaseAdapter;
use crate::error::{ArcanoxError, ArcanoxResult};

static DEFAULT_ADAPTER: Lazy<RwLock<Option<Arc<dyn DatabaseAdapter>>>> =
    Lazy::new(|| RwLock::new(None));

/// Register the process-wide fallback adapter
pub fn set_default_adapter(adapter: Arc<dyn DatabaseAdapter>) {
    let mut slot = DEFAULT_ADAPTER
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = Some(adapter);
}

pub fn clear_default_adapter() {
    let mut slot = DEFAULT_ADAPTER
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = None;
}

pub fn default_adapter() -> Option<Arc<dyn DatabaseAdapter>> {
    DEFAULT_ADAPTER
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Entry point for schema changes inside migrations
#[derive(Clone, Default)]
pub struct Schema {
    adapter: Option<Arc<dyn DatabaseAdapter>>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field(
                "adapter",
                &self.adapter.as_ref().map(|a| a.backend_type().to_string()),
            )
            .finish()
    }
}

impl Schema {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self {
            adapter: Some(adapter),
        }
    }

    /// A facade that resolves its adapter from the registered default
    pub fn unconfigured() -> Self {
        Self { adapter: None }
    }

    pub fn set_adapter(&mut self, adapter: Arc<dyn DatabaseAdapter>) {
        self.adapter = Some(adapter);
    }

    /// The injected adapter, else the process-wide default
    pub fn adapter(&self) -> ArcanoxResult<Arc<dyn DatabaseAdapter>> {
        self.adapter
            .clone()
            .or_else(default_adapter)
            .ok_or_else(|| {
                ArcanoxError::configuration(
                    "No database adapter configured for Schema; call set_adapter() or register a default adapter",
                )
            })
    }

    /// Build a blueprint without touching the database
    pub fn blueprint<F>(table: &str, callback: F) -> Blueprint
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = Blueprint::new(table);
        callback(&mut blueprint);
        blueprint
    }

    /// Create a table from a blueprint callback.
    ///
    /// Only the blueprint's columns are forwarded to the adapter. Indexes,
    /// foreign keys and check constraints declared here are not applied.
    pub async fn create<F>(&self, table: &str, callback: F) -> ArcanoxResult<()>
    where
        F: FnOnce(&mut Blueprint) + Send,
    {
        let adapter = self.adapter()?;
        let blueprint = Self::blueprint(table, callback);

        if blueprint.has_constraints() {
            debug!(
                table = %table,
                indexes = blueprint.indexes().len(),
                foreign_keys = blueprint.foreign_keys().len(),
                checks = blueprint.checks().len(),
                "Schema::create forwards columns only; declared constraints are not applied"
            );
        }

        adapter.create_table(table, blueprint.columns()).await
    }

    /// Alter an existing table.
    ///
    /// Not supported yet: the callback runs so the blueprint can be inspected,
    /// but nothing is sent to the adapter.
    pub async fn table<F>(&self, table: &str, callback: F) -> ArcanoxResult<()>
    where
        F: FnOnce(&mut Blueprint) + Send,
    {
        self.adapter()?;
        let blueprint = Self::blueprint(table, callback);
        warn!(
            table = %table,
            added_columns = blueprint.columns().len(),
            "Schema::table is not implemented; no changes were applied"
        );
        Ok(())
    }

    pub async fn drop(&self, table: &str) -> ArcanoxResult<()> {
        self.adapter()?.drop_table(table).await
    }

    pub async fn drop_if_exists(&self, table: &str) -> ArcanoxResult<()> {
        let adapter = self.adapter()?;
        if adapter.has_table(table).await? {
            adapter.drop_table(table).await?;
        }
        Ok(())
    }

    pub async fn has_table(&self, table: &str) -> ArcanoxResult<bool> {
        self.adapter()?.has_table(table).await
    }

    pub async fn has_column(&self, table: &str, column: &str) -> ArcanoxResult<bool> {
        self.adapter()?.has_column(table, column).await
    }
}
