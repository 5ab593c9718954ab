//! Migration Repository - persistence of applied migrations
//!
//! Reads and writes the tracking table through the shared adapter and owns
//! batch numbering. Batch 0 means "nothing has ever run" and is never
//! assigned to a record.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::definitions::MigrationRecord;
use crate::adapter::{
    DatabaseAdapter, DatabaseValue, FilterOperator, Row, SelectOptions, SortDirection,
};
use crate::error::{ArcanoxError, ArcanoxResult};
use crate::schema::Schema;

pub struct MigrationRepository {
    adapter: Arc<dyn DatabaseAdapter>,
    table: String,
}

impl MigrationRepository {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>, table: &str) -> Self {
        Self {
            adapter,
            table: table.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn repository_exists(&self) -> ArcanoxResult<bool> {
        self.adapter.has_table(&self.table).await
    }

    /// Create the tracking table if it does not exist yet
    pub async fn ensure_table(&self) -> ArcanoxResult<()> {
        if self.repository_exists().await? {
            return Ok(());
        }

        info!(table = %self.table, "Creating migrations tracking table");
        Schema::new(self.adapter.clone())
            .create(&self.table, |table| {
                table.id();
                table.string("migration", None).index();
                table.integer("batch").index();
                table.big_integer("execution_time_ms").nullable();
                table.string("checksum", Some(64)).nullable();
                table.timestamp("created_at", None).nullable();
            })
            .await
    }

    /// Every record, ordered by batch then name
    pub async fn get_records(&self) -> ArcanoxResult<Vec<MigrationRecord>> {
        let options = SelectOptions::new()
            .order_by("batch", SortDirection::Asc)
            .order_by("migration", SortDirection::Asc);
        self.select_records(&options).await
    }

    /// Names of applied migrations, ordered by batch then name
    pub async fn get_ran(&self) -> ArcanoxResult<Vec<String>> {
        Ok(self
            .get_records()
            .await?
            .into_iter()
            .map(|record| record.migration)
            .collect())
    }

    pub async fn get_last_batch_number(&self) -> ArcanoxResult<i64> {
        let options = SelectOptions::new()
            .columns(&["batch"])
            .order_by("batch", SortDirection::Desc)
            .limit(1);
        let rows = self.adapter.select(&self.table, &options).await?;

        Ok(rows
            .first()
            .and_then(|row| row.get("batch"))
            .and_then(|batch| batch.as_i64())
            .unwrap_or(0))
    }

    pub async fn get_next_batch_number(&self) -> ArcanoxResult<i64> {
        Ok(self.get_last_batch_number().await? + 1)
    }

    pub async fn get_migrations_by_batch(&self, batch: i64) -> ArcanoxResult<Vec<MigrationRecord>> {
        let options = SelectOptions::new()
            .where_eq("batch", batch)
            .order_by("migration", SortDirection::Asc);
        self.select_records(&options).await
    }

    /// Records belonging to the `steps` most recent batches
    pub async fn get_last_batches(&self, steps: usize) -> ArcanoxResult<Vec<MigrationRecord>> {
        let records = self.get_records().await?;
        let batches: BTreeSet<i64> = records.iter().map(|r| r.batch).collect();
        let selected: BTreeSet<i64> = batches.into_iter().rev().take(steps).collect();

        Ok(records
            .into_iter()
            .filter(|record| selected.contains(&record.batch))
            .collect())
    }

    /// Records whose batch is greater than or equal to `batch`
    pub async fn get_migrations_from_batch(&self, batch: i64) -> ArcanoxResult<Vec<MigrationRecord>> {
        let options = SelectOptions::new()
            .filter("batch", FilterOperator::Gte, batch)
            .order_by("batch", SortDirection::Asc)
            .order_by("migration", SortDirection::Asc);
        self.select_records(&options).await
    }

    pub async fn find(&self, migration: &str) -> ArcanoxResult<Option<MigrationRecord>> {
        let options = SelectOptions::new().where_eq("migration", migration).limit(1);
        Ok(self.select_records(&options).await?.into_iter().next())
    }

    /// Record a successfully applied migration
    pub async fn log(
        &self,
        migration: &str,
        batch: i64,
        execution_time_ms: Option<i64>,
        checksum: Option<String>,
    ) -> ArcanoxResult<MigrationRecord> {
        if batch < 1 {
            return Err(ArcanoxError::validation(format!(
                "Refusing to log migration '{}' with reserved batch number {}",
                migration, batch
            )));
        }

        let mut row = Row::new();
        row.insert("migration".to_string(), migration.into());
        row.insert("batch".to_string(), DatabaseValue::Int64(batch));
        row.insert("execution_time_ms".to_string(), execution_time_ms.into());
        row.insert("checksum".to_string(), checksum.into());
        row.insert("created_at".to_string(), Utc::now().into());

        let stored = self.adapter.insert(&self.table, row).await?;
        debug!(migration = %migration, batch, "Logged migration");
        Ok(record_from_row(&stored))
    }

    /// Remove every record with this name; returns how many were removed
    pub async fn delete(&self, migration: &str) -> ArcanoxResult<usize> {
        let options = SelectOptions::new()
            .columns(&["id"])
            .where_eq("migration", migration);
        let rows = self.adapter.select(&self.table, &options).await?;

        let mut removed = 0;
        for id in rows.iter().filter_map(|row| row.get("id")) {
            if self.adapter.delete(&self.table, id).await? {
                removed += 1;
            }
        }
        debug!(migration = %migration, removed, "Deleted migration record");
        Ok(removed)
    }

    pub async fn delete_all(&self) -> ArcanoxResult<usize> {
        let rows = self
            .adapter
            .select(&self.table, &SelectOptions::new().columns(&["id"]))
            .await?;

        let mut removed = 0;
        for id in rows.iter().filter_map(|row| row.get("id")) {
            if self.adapter.delete(&self.table, id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn select_records(&self, options: &SelectOptions) -> ArcanoxResult<Vec<MigrationRecord>> {
        let rows = self.adapter.select(&self.table, options).await?;
        Ok(rows.iter().map(record_from_row).collect())
    }
}

fn record_from_row(row: &Row) -> MigrationRecord {
    MigrationRecord {
        id: row.get("id").and_then(|v| v.as_i64()),
        migration: row
            .get("migration")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        batch: row.get("batch").and_then(|v| v.as_i64()).unwrap_or(0),
        execution_time_ms: row.get("execution_time_ms").and_then(|v| v.as_i64()),
        checksum: row
            .get("checksum")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        created_at: row.get("created_at").and_then(|v| v.as_datetime()),
    }
}
