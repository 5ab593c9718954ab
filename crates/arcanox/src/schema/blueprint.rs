//! Blueprint - fluent table specification
//!
//! A [`Blueprint`] accumulates the columns, indexes and constraints of a
//! single table inside a user callback. It never touches the database; the
//! [`Schema`](super::Schema) facade reads it once and discards it.

use super::column::{ColumnBuilder, ColumnDefinition, ColumnType, SpatialSubtype};
use crate::adapter::SqlDialect;
use crate::error::{ArcanoxError, ArcanoxResult};

/// Backend-specific index method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    BTree,
    Hash,
    Gin,
    Gist,
    SpGist,
    Brin,
    FullText,
    Spatial,
}

impl IndexType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IndexType::BTree => "btree",
            IndexType::Hash => "hash",
            IndexType::Gin => "gin",
            IndexType::Gist => "gist",
            IndexType::SpGist => "spgist",
            IndexType::Brin => "brin",
            IndexType::FullText => "fulltext",
            IndexType::Spatial => "spatial",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub columns: Vec<String>,
    pub unique: bool,
    pub name: Option<String>,
    pub index_type: Option<IndexType>,
    /// Partial-index predicate
    pub where_clause: Option<String>,
    /// Covering columns (`INCLUDE (...)`)
    pub include: Vec<String>,
}

impl IndexDefinition {
    /// Explicit name, or `{table}_{columns}_{index|unique}`
    pub fn name_for(&self, table: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let suffix = match (self.unique, self.index_type) {
                    (true, _) => "unique",
                    (false, Some(IndexType::FullText)) => "fulltext",
                    (false, Some(IndexType::Spatial)) => "spatial",
                    _ => "index",
                };
                default_constraint_name(table, &self.columns, suffix)
            }
        }
    }
}

pub struct IndexBuilder<'a> {
    index: &'a mut IndexDefinition,
}

impl<'a> IndexBuilder<'a> {
    pub fn name(self, name: &str) -> Self {
        self.index.name = Some(name.to_string());
        self
    }

    pub fn using(self, index_type: IndexType) -> Self {
        self.index.index_type = Some(index_type);
        self
    }

    pub fn where_clause(self, predicate: &str) -> Self {
        self.index.where_clause = Some(predicate.to_string());
        self
    }

    pub fn include(self, columns: &[&str]) -> Self {
        self.index.include = to_strings(columns);
        self
    }
}

/// Referential action for ON DELETE / ON UPDATE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    Cascade,
    Restrict,
    SetNull,
    SetDefault,
    NoAction,
}

impl ForeignKeyAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyAction::Cascade => "CASCADE",
            ForeignKeyAction::Restrict => "RESTRICT",
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
            ForeignKeyAction::NoAction => "NO ACTION",
        }
    }
}

/// Raw foreign key data; rendered only when [`to_sql`](Self::to_sql) is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDefinition {
    pub table: String,
    pub columns: Vec<String>,
    pub references: Vec<String>,
    pub on: Option<String>,
    pub on_delete: Option<ForeignKeyAction>,
    pub on_update: Option<ForeignKeyAction>,
    pub name: Option<String>,
    pub deferrable: bool,
}

impl ForeignKeyDefinition {
    pub fn constraint_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| default_constraint_name(&self.table, &self.columns, "foreign"))
    }

    /// `CONSTRAINT ... FOREIGN KEY (...) REFERENCES ...` fragment
    pub fn to_sql(&self, dialect: SqlDialect) -> ArcanoxResult<String> {
        let on = self.on.as_deref().ok_or_else(|| {
            ArcanoxError::validation(format!(
                "Foreign key on {}({}) has no referenced table",
                self.table,
                self.columns.join(", ")
            ))
        })?;
        let references = if self.references.is_empty() {
            vec!["id".to_string()]
        } else {
            self.references.clone()
        };

        let mut sql = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            dialect.quote_identifier(&self.constraint_name()),
            quote_list(dialect, &self.columns),
            dialect.quote_identifier(on),
            quote_list(dialect, &references)
        );
        if let Some(action) = self.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action.as_sql()));
        }
        if let Some(action) = self.on_update {
            sql.push_str(&format!(" ON UPDATE {}", action.as_sql()));
        }
        if self.deferrable && dialect != SqlDialect::MySQL {
            sql.push_str(" DEFERRABLE INITIALLY DEFERRED");
        }
        Ok(sql)
    }
}

pub struct ForeignKeyBuilder<'a> {
    foreign: &'a mut ForeignKeyDefinition,
}

impl<'a> ForeignKeyBuilder<'a> {
    pub fn references(self, columns: &[&str]) -> Self {
        self.foreign.references = to_strings(columns);
        self
    }

    pub fn on(self, table: &str) -> Self {
        self.foreign.on = Some(table.to_string());
        self
    }

    pub fn on_delete(self, action: ForeignKeyAction) -> Self {
        self.foreign.on_delete = Some(action);
        self
    }

    pub fn on_update(self, action: ForeignKeyAction) -> Self {
        self.foreign.on_update = Some(action);
        self
    }

    pub fn cascade_on_delete(self) -> Self {
        self.on_delete(ForeignKeyAction::Cascade)
    }

    pub fn null_on_delete(self) -> Self {
        self.on_delete(ForeignKeyAction::SetNull)
    }

    pub fn name(self, name: &str) -> Self {
        self.foreign.name = Some(name.to_string());
        self
    }

    pub fn deferrable(self) -> Self {
        self.foreign.deferrable = true;
        self
    }
}

/// Raw CHECK constraint data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraintDefinition {
    pub table: String,
    pub expression: String,
    pub name: Option<String>,
}

impl CheckConstraintDefinition {
    /// `CHECK (...)` without a constraint name
    pub fn definition(&self) -> String {
        format!("CHECK ({})", self.expression)
    }

    pub fn to_sql(&self, dialect: SqlDialect) -> String {
        match &self.name {
            Some(name) => format!(
                "CONSTRAINT {} {}",
                dialect.quote_identifier(name),
                self.definition()
            ),
            None => self.definition(),
        }
    }
}

pub struct CheckConstraintBuilder<'a> {
    check: &'a mut CheckConstraintDefinition,
}

impl<'a> CheckConstraintBuilder<'a> {
    pub fn name(self, name: &str) -> Self {
        self.check.name = Some(name.to_string());
        self
    }
}

/// Table-scoped, single-use schema accumulator
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    table: String,
    columns: Vec<ColumnDefinition>,
    indexes: Vec<IndexDefinition>,
    foreign_keys: Vec<ForeignKeyDefinition>,
    checks: Vec<CheckConstraintDefinition>,
    primary_key: Vec<String>,
    drop_columns: Vec<String>,
    rename_columns: Vec<(String, String)>,
    drop_indexes: Vec<String>,
    drop_foreign_keys: Vec<String>,
    drop_primary: bool,
    comment: Option<String>,
    temporary: bool,
}

impl Blueprint {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            primary_key: Vec::new(),
            drop_columns: Vec::new(),
            rename_columns: Vec::new(),
            drop_indexes: Vec::new(),
            drop_foreign_keys: Vec::new(),
            drop_primary: false,
            comment: None,
            temporary: false,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn indexes(&self) -> &[IndexDefinition] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyDefinition] {
        &self.foreign_keys
    }

    pub fn checks(&self) -> &[CheckConstraintDefinition] {
        &self.checks
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn dropped_columns(&self) -> &[String] {
        &self.drop_columns
    }

    pub fn renamed_columns(&self) -> &[(String, String)] {
        &self.rename_columns
    }

    pub fn dropped_indexes(&self) -> &[String] {
        &self.drop_indexes
    }

    pub fn dropped_foreign_keys(&self) -> &[String] {
        &self.drop_foreign_keys
    }

    pub fn drops_primary(&self) -> bool {
        self.drop_primary
    }

    pub fn table_comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Whether anything beyond columns was declared
    pub fn has_constraints(&self) -> bool {
        !self.indexes.is_empty()
            || !self.foreign_keys.is_empty()
            || !self.checks.is_empty()
            || !self.primary_key.is_empty()
    }

    /// Whether the blueprint carries ALTER-only operations
    pub fn has_alterations(&self) -> bool {
        !self.drop_columns.is_empty()
            || !self.rename_columns.is_empty()
            || !self.drop_indexes.is_empty()
            || !self.drop_foreign_keys.is_empty()
            || self.drop_primary
    }

    pub fn comment(&mut self, comment: &str) -> &mut Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn temporary(&mut self) -> &mut Self {
        self.temporary = true;
        self
    }

    /// Append a column of any type
    pub fn add_column(&mut self, name: &str, column_type: ColumnType) -> ColumnBuilder<'_> {
        self.columns.push(ColumnDefinition::new(name, column_type));
        let index = self.columns.len() - 1;
        ColumnBuilder::new(&mut self.columns[index])
    }

    // Auto-increment keys

    pub fn id(&mut self) -> ColumnBuilder<'_> {
        self.big_increments("id")
    }

    pub fn increments(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Integer)
            .unsigned()
            .auto_increment()
            .primary()
    }

    pub fn small_increments(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::SmallInteger)
            .unsigned()
            .auto_increment()
            .primary()
    }

    pub fn big_increments(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::BigInteger)
            .unsigned()
            .auto_increment()
            .primary()
    }

    // Integers and numerics

    pub fn tiny_integer(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::TinyInteger)
    }

    pub fn small_integer(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::SmallInteger)
    }

    pub fn medium_integer(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::MediumInteger)
    }

    pub fn integer(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Integer)
    }

    pub fn big_integer(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::BigInteger)
    }

    pub fn unsigned_integer(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.integer(name).unsigned()
    }

    pub fn unsigned_big_integer(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.big_integer(name).unsigned()
    }

    pub fn decimal(&mut self, name: &str, precision: u8, scale: u8) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Decimal { precision, scale })
    }

    pub fn float(&mut self, name: &str, precision: Option<u8>) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Float { precision })
    }

    pub fn double(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Double)
    }

    pub fn money(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Money)
    }

    pub fn boolean(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Boolean)
    }

    // Strings

    pub fn char(&mut self, name: &str, length: u32) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Char { length })
    }

    /// VARCHAR column; `None` uses the conventional 255
    pub fn string(&mut self, name: &str, length: Option<u32>) -> ColumnBuilder<'_> {
        self.add_column(
            name,
            ColumnType::String {
                length: length.unwrap_or(255),
            },
        )
    }

    pub fn tiny_text(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::TinyText)
    }

    pub fn text(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Text)
    }

    pub fn medium_text(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::MediumText)
    }

    pub fn long_text(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::LongText)
    }

    pub fn citext(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Citext)
    }

    // Binary

    pub fn binary(&mut self, name: &str, length: Option<u32>) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Binary { length })
    }

    pub fn tiny_blob(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::TinyBlob)
    }

    pub fn blob(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Blob)
    }

    pub fn medium_blob(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::MediumBlob)
    }

    pub fn long_blob(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::LongBlob)
    }

    pub fn bit(&mut self, name: &str, length: u32) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Bit { length })
    }

    // Temporal

    pub fn date(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Date)
    }

    pub fn time(&mut self, name: &str, precision: Option<u8>) -> ColumnBuilder<'_> {
        self.add_column(
            name,
            ColumnType::Time {
                precision,
                with_timezone: false,
            },
        )
    }

    pub fn time_tz(&mut self, name: &str, precision: Option<u8>) -> ColumnBuilder<'_> {
        self.add_column(
            name,
            ColumnType::Time {
                precision,
                with_timezone: true,
            },
        )
    }

    pub fn date_time(&mut self, name: &str, precision: Option<u8>) -> ColumnBuilder<'_> {
        self.add_column(
            name,
            ColumnType::DateTime {
                precision,
                with_timezone: false,
            },
        )
    }

    pub fn date_time_tz(&mut self, name: &str, precision: Option<u8>) -> ColumnBuilder<'_> {
        self.add_column(
            name,
            ColumnType::DateTime {
                precision,
                with_timezone: true,
            },
        )
    }

    pub fn timestamp(&mut self, name: &str, precision: Option<u8>) -> ColumnBuilder<'_> {
        self.add_column(
            name,
            ColumnType::Timestamp {
                precision,
                with_timezone: false,
            },
        )
    }

    pub fn timestamp_tz(&mut self, name: &str, precision: Option<u8>) -> ColumnBuilder<'_> {
        self.add_column(
            name,
            ColumnType::Timestamp {
                precision,
                with_timezone: true,
            },
        )
    }

    pub fn year(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Year)
    }

    pub fn interval(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Interval)
    }

    /// Nullable `created_at` and `updated_at` timestamps
    pub fn timestamps(&mut self) {
        self.timestamp("created_at", None).nullable();
        self.timestamp("updated_at", None).nullable();
    }

    pub fn timestamps_tz(&mut self) {
        self.timestamp_tz("created_at", None).nullable();
        self.timestamp_tz("updated_at", None).nullable();
    }

    /// Non-null timestamps maintained by the database itself
    pub fn current_timestamps(&mut self) {
        self.timestamp("created_at", None).use_current();
        self.timestamp("updated_at", None)
            .use_current()
            .use_current_on_update();
    }

    pub fn soft_deletes(&mut self) -> ColumnBuilder<'_> {
        self.timestamp("deleted_at", None).nullable()
    }

    pub fn soft_deletes_tz(&mut self) -> ColumnBuilder<'_> {
        self.timestamp_tz("deleted_at", None).nullable()
    }

    pub fn remember_token(&mut self) -> ColumnBuilder<'_> {
        self.string("remember_token", Some(100)).nullable()
    }

    // Structured

    pub fn json(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Json)
    }

    pub fn jsonb(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Jsonb)
    }

    pub fn xml(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Xml)
    }

    pub fn hstore(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Hstore)
    }

    pub fn array(&mut self, name: &str, element: ColumnType) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Array(Box::new(element)))
    }

    // Identifiers

    pub fn uuid(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Uuid)
    }

    pub fn ulid(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Ulid)
    }

    pub fn object_id(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::ObjectId)
    }

    /// Unsigned big integer intended to reference another table's `id`
    pub fn foreign_id(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.unsigned_big_integer(name)
    }

    pub fn foreign_uuid(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.uuid(name)
    }

    /// `{name}_id` + `{name}_type` pair with a composite index
    pub fn morphs(&mut self, name: &str) {
        let id_column = format!("{}_id", name);
        let type_column = format!("{}_type", name);
        self.unsigned_big_integer(&id_column);
        self.string(&type_column, None);
        self.index(&[type_column.as_str(), id_column.as_str()]);
    }

    pub fn nullable_morphs(&mut self, name: &str) {
        let id_column = format!("{}_id", name);
        let type_column = format!("{}_type", name);
        self.unsigned_big_integer(&id_column).nullable();
        self.string(&type_column, None).nullable();
        self.index(&[type_column.as_str(), id_column.as_str()]);
    }

    pub fn uuid_morphs(&mut self, name: &str) {
        let id_column = format!("{}_id", name);
        let type_column = format!("{}_type", name);
        self.uuid(&id_column);
        self.string(&type_column, None);
        self.index(&[type_column.as_str(), id_column.as_str()]);
    }

    // Spatial

    pub fn geometry(
        &mut self,
        name: &str,
        subtype: SpatialSubtype,
        srid: Option<u32>,
    ) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Geometry { subtype, srid })
    }

    pub fn geography(
        &mut self,
        name: &str,
        subtype: SpatialSubtype,
        srid: Option<u32>,
    ) -> ColumnBuilder<'_> {
        self.add_column(
            name,
            ColumnType::Geography {
                subtype,
                srid: srid.or(Some(4326)),
            },
        )
    }

    pub fn point(&mut self, name: &str, srid: Option<u32>) -> ColumnBuilder<'_> {
        self.geometry(name, SpatialSubtype::Point, srid)
    }

    pub fn line_string(&mut self, name: &str, srid: Option<u32>) -> ColumnBuilder<'_> {
        self.geometry(name, SpatialSubtype::LineString, srid)
    }

    pub fn polygon(&mut self, name: &str, srid: Option<u32>) -> ColumnBuilder<'_> {
        self.geometry(name, SpatialSubtype::Polygon, srid)
    }

    pub fn multi_point(&mut self, name: &str, srid: Option<u32>) -> ColumnBuilder<'_> {
        self.geometry(name, SpatialSubtype::MultiPoint, srid)
    }

    pub fn multi_line_string(&mut self, name: &str, srid: Option<u32>) -> ColumnBuilder<'_> {
        self.geometry(name, SpatialSubtype::MultiLineString, srid)
    }

    pub fn multi_polygon(&mut self, name: &str, srid: Option<u32>) -> ColumnBuilder<'_> {
        self.geometry(name, SpatialSubtype::MultiPolygon, srid)
    }

    pub fn geometry_collection(&mut self, name: &str, srid: Option<u32>) -> ColumnBuilder<'_> {
        self.geometry(name, SpatialSubtype::GeometryCollection, srid)
    }

    // PostgreSQL ranges, network and full-text types

    pub fn int4_range(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Int4Range)
    }

    pub fn int8_range(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Int8Range)
    }

    pub fn num_range(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::NumRange)
    }

    pub fn ts_range(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::TsRange)
    }

    pub fn tstz_range(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::TsTzRange)
    }

    pub fn date_range(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::DateRange)
    }

    pub fn ip_address(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Inet)
    }

    pub fn cidr(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Cidr)
    }

    pub fn mac_address(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::MacAddress)
    }

    pub fn mac_address8(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::MacAddress8)
    }

    pub fn ts_vector(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::TsVector)
    }

    pub fn ts_query(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::TsQuery)
    }

    // Value lists and generated columns

    pub fn enumeration(&mut self, name: &str, values: &[&str]) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Enum(to_strings(values)))
    }

    pub fn set(&mut self, name: &str, values: &[&str]) -> ColumnBuilder<'_> {
        self.add_column(name, ColumnType::Set(to_strings(values)))
    }

    pub fn computed(&mut self, name: &str, expression: &str) -> ColumnBuilder<'_> {
        self.add_column(
            name,
            ColumnType::Computed {
                expression: expression.to_string(),
            },
        )
    }

    // Indexes and constraints

    fn push_index(
        &mut self,
        columns: &[&str],
        unique: bool,
        index_type: Option<IndexType>,
    ) -> IndexBuilder<'_> {
        self.indexes.push(IndexDefinition {
            columns: to_strings(columns),
            unique,
            name: None,
            index_type,
            where_clause: None,
            include: Vec::new(),
        });
        let index = self.indexes.len() - 1;
        IndexBuilder {
            index: &mut self.indexes[index],
        }
    }

    pub fn index(&mut self, columns: &[&str]) -> IndexBuilder<'_> {
        self.push_index(columns, false, None)
    }

    pub fn unique(&mut self, columns: &[&str]) -> IndexBuilder<'_> {
        self.push_index(columns, true, None)
    }

    pub fn full_text(&mut self, columns: &[&str]) -> IndexBuilder<'_> {
        self.push_index(columns, false, Some(IndexType::FullText))
    }

    pub fn spatial_index(&mut self, columns: &[&str]) -> IndexBuilder<'_> {
        self.push_index(columns, false, Some(IndexType::Spatial))
    }

    /// Composite (or single) primary key declared at table level
    pub fn primary(&mut self, columns: &[&str]) -> &mut Self {
        self.primary_key = to_strings(columns);
        self
    }

    pub fn foreign(&mut self, columns: &[&str]) -> ForeignKeyBuilder<'_> {
        self.foreign_keys.push(ForeignKeyDefinition {
            table: self.table.clone(),
            columns: to_strings(columns),
            references: Vec::new(),
            on: None,
            on_delete: None,
            on_update: None,
            name: None,
            deferrable: false,
        });
        let index = self.foreign_keys.len() - 1;
        ForeignKeyBuilder {
            foreign: &mut self.foreign_keys[index],
        }
    }

    pub fn check(&mut self, expression: &str) -> CheckConstraintBuilder<'_> {
        self.checks.push(CheckConstraintDefinition {
            table: self.table.clone(),
            expression: expression.to_string(),
            name: None,
        });
        let index = self.checks.len() - 1;
        CheckConstraintBuilder {
            check: &mut self.checks[index],
        }
    }

    // ALTER operations

    pub fn drop_column(&mut self, name: &str) -> &mut Self {
        self.drop_columns.push(name.to_string());
        self
    }

    pub fn drop_columns(&mut self, names: &[&str]) -> &mut Self {
        self.drop_columns.extend(to_strings(names));
        self
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> &mut Self {
        self.rename_columns.push((from.to_string(), to.to_string()));
        self
    }

    pub fn drop_index(&mut self, name: &str) -> &mut Self {
        self.drop_indexes.push(name.to_string());
        self
    }

    /// Drop the unique index over `columns` using the default naming
    pub fn drop_unique(&mut self, columns: &[&str]) -> &mut Self {
        let name = default_constraint_name(&self.table, &to_strings(columns), "unique");
        self.drop_index(&name)
    }

    pub fn drop_foreign(&mut self, name: &str) -> &mut Self {
        self.drop_foreign_keys.push(name.to_string());
        self
    }

    pub fn drop_primary(&mut self) -> &mut Self {
        self.drop_primary = true;
        self
    }

    pub fn drop_timestamps(&mut self) -> &mut Self {
        self.drop_columns(&["created_at", "updated_at"])
    }

    pub fn drop_soft_deletes(&mut self) -> &mut Self {
        self.drop_column("deleted_at")
    }

    pub fn drop_morphs(&mut self, name: &str) -> &mut Self {
        let id_column = format!("{}_id", name);
        let type_column = format!("{}_type", name);
        let index = default_constraint_name(
            &self.table,
            &[type_column.clone(), id_column.clone()],
            "index",
        );
        self.drop_index(&index);
        self.drop_columns(&[id_column.as_str(), type_column.as_str()])
    }
}

/// `{table}_{col1}_{col2}_{suffix}`, lower-cased with separators normalised
pub fn default_constraint_name(table: &str, columns: &[String], suffix: &str) -> String {
    let mut parts = vec![table.to_string()];
    parts.extend(columns.iter().cloned());
    parts.push(suffix.to_string());
    parts
        .join("_")
        .to_lowercase()
        .replace(['-', '.'], "_")
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn quote_list(dialect: SqlDialect, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| dialect.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}
