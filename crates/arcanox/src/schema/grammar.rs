//! SQL Grammar - renders blueprints to dialect-specific DDL
//!
//! Relational adapters can implement `create_table` by delegating to
//! [`SqlGrammar`]. Document stores have no grammar; they interpret
//! [`ColumnDefinition`]s directly (e.g. as validators).

use super::blueprint::{Blueprint, IndexDefinition, IndexType};
use super::column::{ColumnDefault, ColumnDefinition, ColumnType, Generated, Placement};
use crate::adapter::SqlDialect;
use crate::error::ArcanoxResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlGrammar {
    dialect: SqlDialect,
}

impl SqlGrammar {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    fn quote(&self, identifier: &str) -> String {
        self.dialect.quote_identifier(identifier)
    }

    fn quote_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quote(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `CREATE TABLE` for a bare column list, the shape adapters receive
    pub fn compile_create_columns(&self, table: &str, columns: &[ColumnDefinition]) -> String {
        let body: Vec<String> = columns.iter().map(|c| self.compile_column(c)).collect();
        format!(
            "CREATE TABLE {} (\n    {}\n)",
            self.quote(table),
            body.join(",\n    ")
        )
    }

    /// Full DDL for a blueprint: the table, then its indexes and comments
    pub fn compile_create(&self, blueprint: &Blueprint) -> ArcanoxResult<Vec<String>> {
        let mut body: Vec<String> = blueprint
            .columns()
            .iter()
            .map(|c| self.compile_column(c))
            .collect();

        if !blueprint.primary_key().is_empty() {
            body.push(format!(
                "PRIMARY KEY ({})",
                self.quote_list(blueprint.primary_key())
            ));
        }
        for foreign in blueprint.foreign_keys() {
            body.push(foreign.to_sql(self.dialect)?);
        }
        for check in blueprint.checks() {
            body.push(check.to_sql(self.dialect));
        }

        let create = if blueprint.is_temporary() {
            "CREATE TEMPORARY TABLE"
        } else {
            "CREATE TABLE"
        };
        let mut table_sql = format!(
            "{} {} (\n    {}\n)",
            create,
            self.quote(blueprint.table()),
            body.join(",\n    ")
        );
        if let (SqlDialect::MySQL, Some(comment)) = (self.dialect, blueprint.table_comment()) {
            table_sql.push_str(&format!(" COMMENT = {}", quote_string(comment)));
        }

        let mut statements = vec![table_sql];
        statements.extend(self.column_index_statements(blueprint.table(), blueprint.columns()));
        for index in blueprint.indexes() {
            statements.push(self.compile_index(blueprint.table(), index));
        }
        if self.dialect == SqlDialect::PostgreSQL {
            statements.extend(self.postgres_comments(blueprint));
        }
        Ok(statements)
    }

    /// ALTER statements for columns added to and removed from an existing table
    pub fn compile_alter(&self, blueprint: &Blueprint) -> ArcanoxResult<Vec<String>> {
        let table = self.quote(blueprint.table());
        let mut statements = Vec::new();

        for column in blueprint.columns() {
            let mut sql = format!("ALTER TABLE {} ADD COLUMN {}", table, self.compile_column(column));
            if self.dialect == SqlDialect::MySQL {
                match &column.placement {
                    Some(Placement::First) => sql.push_str(" FIRST"),
                    Some(Placement::After(after)) => {
                        sql.push_str(&format!(" AFTER {}", self.quote(after)))
                    }
                    None => {}
                }
            }
            statements.push(sql);
        }
        statements.extend(self.column_index_statements(blueprint.table(), blueprint.columns()));

        for (from, to) in blueprint.renamed_columns() {
            statements.push(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                table,
                self.quote(from),
                self.quote(to)
            ));
        }
        for column in blueprint.dropped_columns() {
            statements.push(format!("ALTER TABLE {} DROP COLUMN {}", table, self.quote(column)));
        }
        for foreign in blueprint.dropped_foreign_keys() {
            let keyword = match self.dialect {
                SqlDialect::MySQL => "FOREIGN KEY",
                _ => "CONSTRAINT",
            };
            statements.push(format!(
                "ALTER TABLE {} DROP {} {}",
                table,
                keyword,
                self.quote(foreign)
            ));
        }
        for index in blueprint.dropped_indexes() {
            statements.push(match self.dialect {
                SqlDialect::MySQL => format!("DROP INDEX {} ON {}", self.quote(index), table),
                _ => format!("DROP INDEX IF EXISTS {}", self.quote(index)),
            });
        }
        if blueprint.drops_primary() {
            statements.push(match self.dialect {
                SqlDialect::MySQL => format!("ALTER TABLE {} DROP PRIMARY KEY", table),
                _ => format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    table,
                    self.quote(&format!("{}_pkey", blueprint.table()))
                ),
            });
        }
        for foreign in blueprint.foreign_keys() {
            statements.push(format!(
                "ALTER TABLE {} ADD {}",
                table,
                foreign.to_sql(self.dialect)?
            ));
        }
        for check in blueprint.checks() {
            statements.push(format!("ALTER TABLE {} ADD {}", table, check.to_sql(self.dialect)));
        }
        for index in blueprint.indexes() {
            statements.push(self.compile_index(blueprint.table(), index));
        }
        Ok(statements)
    }

    pub fn compile_drop(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.quote(table))
    }

    pub fn compile_drop_if_exists(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote(table))
    }

    pub fn compile_index(&self, table: &str, index: &IndexDefinition) -> String {
        let name = self.quote(&index.name_for(table));
        let columns = self.quote_list(&index.columns);
        let table = self.quote(table);

        match self.dialect {
            SqlDialect::MySQL => {
                let kind = match (index.unique, index.index_type) {
                    (true, _) => "UNIQUE INDEX",
                    (false, Some(IndexType::FullText)) => "FULLTEXT INDEX",
                    (false, Some(IndexType::Spatial)) => "SPATIAL INDEX",
                    _ => "INDEX",
                };
                let mut sql = format!("CREATE {} {} ON {} ({})", kind, name, table, columns);
                if let Some(method @ (IndexType::BTree | IndexType::Hash)) = index.index_type {
                    sql.push_str(&format!(" USING {}", method.as_sql().to_uppercase()));
                }
                sql
            }
            SqlDialect::PostgreSQL => {
                let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
                let method = match index.index_type {
                    Some(IndexType::FullText) => Some("gin"),
                    Some(IndexType::Spatial) => Some("gist"),
                    Some(other) => Some(other.as_sql()),
                    None => None,
                };
                let mut sql = format!("CREATE {} {} ON {}", kind, name, table);
                if let Some(method) = method {
                    sql.push_str(&format!(" USING {}", method));
                }
                if index.index_type == Some(IndexType::FullText) {
                    let expressions: Vec<String> = index
                        .columns
                        .iter()
                        .map(|c| format!("to_tsvector('english', {})", self.quote(c)))
                        .collect();
                    sql.push_str(&format!(" (({}))", expressions.join(" || ")));
                } else {
                    sql.push_str(&format!(" ({})", columns));
                }
                if !index.include.is_empty() {
                    sql.push_str(&format!(" INCLUDE ({})", self.quote_list(&index.include)));
                }
                if let Some(predicate) = &index.where_clause {
                    sql.push_str(&format!(" WHERE {}", predicate));
                }
                sql
            }
            SqlDialect::SQLite => {
                let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
                let mut sql = format!("CREATE {} {} ON {} ({})", kind, name, table, columns);
                if let Some(predicate) = &index.where_clause {
                    sql.push_str(&format!(" WHERE {}", predicate));
                }
                sql
            }
        }
    }

    /// Render one column definition (name, type and modifiers)
    pub fn compile_column(&self, column: &ColumnDefinition) -> String {
        let mut sql = format!("{} {}", self.quote(&column.name), self.type_sql(column));

        if let Some(generated) = &column.generated {
            sql.push_str(&self.generated_sql(generated));
        } else if let ColumnType::Computed { expression } = &column.column_type {
            sql.push_str(&self.generated_sql(&Generated::Stored(expression.clone())));
        }

        if let (SqlDialect::MySQL, Some(charset)) = (self.dialect, &column.charset) {
            sql.push_str(&format!(" CHARACTER SET {}", charset));
        }
        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" COLLATE {}", collation));
        }

        let serial_primary = self.dialect == SqlDialect::PostgreSQL && column.auto_increment;
        if !column.nullable || column.primary || serial_primary {
            sql.push_str(" NOT NULL");
        } else {
            sql.push_str(" NULL");
        }

        if let Some(default) = &column.default {
            sql.push_str(&format!(" DEFAULT {}", self.default_sql(default)));
        }
        if column.use_current_on_update && self.dialect == SqlDialect::MySQL {
            sql.push_str(" ON UPDATE CURRENT_TIMESTAMP");
        }

        if column.primary {
            sql.push_str(" PRIMARY KEY");
        }
        if column.auto_increment {
            match self.dialect {
                SqlDialect::MySQL => sql.push_str(" AUTO_INCREMENT"),
                SqlDialect::SQLite if column.primary => sql.push_str(" AUTOINCREMENT"),
                _ => {}
            }
        }
        if column.unique {
            sql.push_str(" UNIQUE");
        }
        if column.invisible && self.dialect == SqlDialect::MySQL {
            sql.push_str(" INVISIBLE");
        }
        if let (SqlDialect::MySQL, Some(comment)) = (self.dialect, &column.comment) {
            sql.push_str(&format!(" COMMENT {}", quote_string(comment)));
        }
        sql
    }

    fn generated_sql(&self, generated: &Generated) -> String {
        match (self.dialect, generated) {
            (SqlDialect::PostgreSQL, Generated::Stored(expr))
            | (SqlDialect::PostgreSQL, Generated::Virtual(expr)) => {
                // PostgreSQL only knows STORED generated columns
                format!(" GENERATED ALWAYS AS ({}) STORED", expr)
            }
            (_, Generated::Stored(expr)) => format!(" GENERATED ALWAYS AS ({}) STORED", expr),
            (_, Generated::Virtual(expr)) => format!(" GENERATED ALWAYS AS ({}) VIRTUAL", expr),
        }
    }

    fn default_sql(&self, default: &ColumnDefault) -> String {
        match default {
            ColumnDefault::Value(value) => match (self.dialect, value) {
                (SqlDialect::SQLite, crate::adapter::DatabaseValue::Bool(b)) => {
                    (if *b { "1" } else { "0" }).to_string()
                }
                _ => value.to_sql_literal(),
            },
            ColumnDefault::Expression(expression) => expression.clone(),
            ColumnDefault::CurrentTimestamp => self.dialect.current_timestamp().to_string(),
        }
    }

    fn column_index_statements(&self, table: &str, columns: &[ColumnDefinition]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| c.index)
            .map(|c| {
                let index = IndexDefinition {
                    columns: vec![c.name.clone()],
                    unique: false,
                    name: None,
                    index_type: None,
                    where_clause: None,
                    include: Vec::new(),
                };
                self.compile_index(table, &index)
            })
            .collect()
    }

    fn postgres_comments(&self, blueprint: &Blueprint) -> Vec<String> {
        let table = self.quote(blueprint.table());
        let mut statements = Vec::new();
        if let Some(comment) = blueprint.table_comment() {
            statements.push(format!("COMMENT ON TABLE {} IS {}", table, quote_string(comment)));
        }
        for column in blueprint.columns() {
            if let Some(comment) = &column.comment {
                statements.push(format!(
                    "COMMENT ON COLUMN {}.{} IS {}",
                    table,
                    self.quote(&column.name),
                    quote_string(comment)
                ));
            }
        }
        statements
    }

    /// Dialect type name for a column, including auto-increment forms
    pub fn type_sql(&self, column: &ColumnDefinition) -> String {
        match self.dialect {
            SqlDialect::PostgreSQL => self.postgres_type(column),
            SqlDialect::MySQL => self.mysql_type(column),
            SqlDialect::SQLite => sqlite_type(&column.column_type),
        }
    }

    fn postgres_type(&self, column: &ColumnDefinition) -> String {
        use ColumnType::*;
        if column.auto_increment {
            match column.column_type {
                SmallInteger | TinyInteger => return "SMALLSERIAL".to_string(),
                BigInteger => return "BIGSERIAL".to_string(),
                Integer | MediumInteger => return "SERIAL".to_string(),
                _ => {}
            }
        }
        match &column.column_type {
            TinyInteger | SmallInteger => "SMALLINT".to_string(),
            MediumInteger | Integer => "INTEGER".to_string(),
            BigInteger => "BIGINT".to_string(),
            Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            Float { precision: Some(p) } => format!("FLOAT({})", p),
            Float { precision: None } => "REAL".to_string(),
            Double => "DOUBLE PRECISION".to_string(),
            Money => "MONEY".to_string(),
            Boolean => "BOOLEAN".to_string(),
            Char { length } => format!("CHAR({})", length),
            String { length } => format!("VARCHAR({})", length),
            TinyText | Text | MediumText | LongText => "TEXT".to_string(),
            Citext => "CITEXT".to_string(),
            Binary { .. } | TinyBlob | Blob | MediumBlob | LongBlob => "BYTEA".to_string(),
            Bit { length } => format!("BIT({})", length),
            Date => "DATE".to_string(),
            Time { precision, with_timezone } => {
                format!("TIME{}{}", precision_sql(*precision), tz_suffix(*with_timezone))
            }
            DateTime { precision, with_timezone } | Timestamp { precision, with_timezone } => {
                format!("TIMESTAMP{}{}", precision_sql(*precision), tz_suffix(*with_timezone))
            }
            Year => "INTEGER".to_string(),
            Interval => "INTERVAL".to_string(),
            Json => "JSON".to_string(),
            Jsonb => "JSONB".to_string(),
            Xml => "XML".to_string(),
            Hstore => "HSTORE".to_string(),
            Array(element) => {
                let inner = ColumnDefinition::new(&column.name, (**element).clone());
                format!("{}[]", self.postgres_type(&inner))
            }
            Uuid => "UUID".to_string(),
            Ulid => "CHAR(26)".to_string(),
            ObjectId => "CHAR(24)".to_string(),
            Geometry { subtype, srid } => spatial_sql("GEOMETRY", subtype.as_sql(), *srid),
            Geography { subtype, srid } => spatial_sql("GEOGRAPHY", subtype.as_sql(), *srid),
            Int4Range => "INT4RANGE".to_string(),
            Int8Range => "INT8RANGE".to_string(),
            NumRange => "NUMRANGE".to_string(),
            TsRange => "TSRANGE".to_string(),
            TsTzRange => "TSTZRANGE".to_string(),
            DateRange => "DATERANGE".to_string(),
            Inet => "INET".to_string(),
            Cidr => "CIDR".to_string(),
            MacAddress => "MACADDR".to_string(),
            MacAddress8 => "MACADDR8".to_string(),
            TsVector => "TSVECTOR".to_string(),
            TsQuery => "TSQUERY".to_string(),
            Enum(values) => format!(
                "VARCHAR(255) CHECK ({} IN ({}))",
                self.quote(&column.name),
                quote_values(values)
            ),
            Set(_) => "TEXT[]".to_string(),
            Computed { .. } => "TEXT".to_string(),
        }
    }

    fn mysql_type(&self, column: &ColumnDefinition) -> String {
        use ColumnType::*;
        let base = match &column.column_type {
            TinyInteger => "TINYINT".to_string(),
            SmallInteger => "SMALLINT".to_string(),
            MediumInteger => "MEDIUMINT".to_string(),
            Integer => "INT".to_string(),
            BigInteger => "BIGINT".to_string(),
            Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            Float { precision: Some(p) } => format!("FLOAT({})", p),
            Float { precision: None } => "FLOAT".to_string(),
            Double => "DOUBLE".to_string(),
            Money => "DECIMAL(19, 4)".to_string(),
            Boolean => "TINYINT(1)".to_string(),
            Char { length } => format!("CHAR({})", length),
            String { length } => format!("VARCHAR({})", length),
            TinyText => "TINYTEXT".to_string(),
            Text | Citext => "TEXT".to_string(),
            MediumText => "MEDIUMTEXT".to_string(),
            LongText => "LONGTEXT".to_string(),
            Binary { length: Some(l) } => format!("VARBINARY({})", l),
            Binary { length: None } | Blob => "BLOB".to_string(),
            TinyBlob => "TINYBLOB".to_string(),
            MediumBlob => "MEDIUMBLOB".to_string(),
            LongBlob => "LONGBLOB".to_string(),
            Bit { length } => format!("BIT({})", length),
            Date => "DATE".to_string(),
            Time { precision, .. } => format!("TIME{}", precision_sql(*precision)),
            DateTime { precision, .. } => format!("DATETIME{}", precision_sql(*precision)),
            Timestamp { precision, .. } => format!("TIMESTAMP{}", precision_sql(*precision)),
            Year => "YEAR".to_string(),
            Interval => "VARCHAR(64)".to_string(),
            Json | Jsonb | Hstore | Array(_) => "JSON".to_string(),
            Xml => "LONGTEXT".to_string(),
            Uuid => "CHAR(36)".to_string(),
            Ulid => "CHAR(26)".to_string(),
            ObjectId => "CHAR(24)".to_string(),
            Geometry { subtype, srid } | Geography { subtype, srid } => match srid {
                Some(srid) => format!("{} SRID {}", subtype.as_sql(), srid),
                None => subtype.as_sql().to_string(),
            },
            Int4Range | Int8Range | NumRange | TsRange | TsTzRange | DateRange => {
                "VARCHAR(255)".to_string()
            }
            Inet => "VARCHAR(45)".to_string(),
            Cidr => "VARCHAR(49)".to_string(),
            MacAddress => "VARCHAR(17)".to_string(),
            MacAddress8 => "VARCHAR(23)".to_string(),
            TsVector | TsQuery | Computed { .. } => "TEXT".to_string(),
            Enum(values) => format!("ENUM({})", quote_values(values)),
            Set(values) => format!("SET({})", quote_values(values)),
        };
        if column.unsigned && column.column_type.is_integer() {
            format!("{} UNSIGNED", base)
        } else {
            base
        }
    }
}

fn sqlite_type(column_type: &ColumnType) -> String {
    use ColumnType::*;
    match column_type {
        TinyInteger | SmallInteger | MediumInteger | Integer | BigInteger | Boolean | Year => {
            "INTEGER".to_string()
        }
        Decimal { .. } | Money => "NUMERIC".to_string(),
        Float { .. } | Double => "REAL".to_string(),
        Binary { .. } | TinyBlob | Blob | MediumBlob | LongBlob => "BLOB".to_string(),
        Char { length } | String { length } => format!("VARCHAR({})", length),
        Date => "DATE".to_string(),
        Time { .. } => "TIME".to_string(),
        DateTime { .. } | Timestamp { .. } => "DATETIME".to_string(),
        _ => "TEXT".to_string(),
    }
}

fn precision_sql(precision: Option<u8>) -> String {
    precision.map(|p| format!("({})", p)).unwrap_or_default()
}

fn tz_suffix(with_timezone: bool) -> &'static str {
    if with_timezone {
        " WITH TIME ZONE"
    } else {
        " WITHOUT TIME ZONE"
    }
}

fn spatial_sql(kind: &str, subtype: &str, srid: Option<u32>) -> String {
    match srid {
        Some(srid) => format!("{}({}, {})", kind, subtype, srid),
        None => format!("{}({})", kind, subtype),
    }
}

fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn quote_values(values: &[String]) -> String {
    values
        .iter()
        .map(|v| quote_string(v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::blueprint::ForeignKeyAction;

    fn users_blueprint() -> Blueprint {
        let mut table = Blueprint::new("users");
        table.id();
        table.string("email", None).unique();
        table.boolean("active").default(true);
        table.timestamps();
        table
    }

    #[test]
    fn test_postgres_create_table() {
        let grammar = SqlGrammar::new(SqlDialect::PostgreSQL);
        let statements = grammar.compile_create(&users_blueprint()).unwrap();

        assert_eq!(statements.len(), 1);
        let sql = &statements[0];
        assert!(sql.starts_with("CREATE TABLE \"users\""));
        assert!(sql.contains("\"id\" BIGSERIAL NOT NULL PRIMARY KEY"));
        assert!(sql.contains("\"email\" VARCHAR(255) NOT NULL UNIQUE"));
        assert!(sql.contains("\"active\" BOOLEAN NOT NULL DEFAULT TRUE"));
        assert!(sql.contains("\"created_at\" TIMESTAMP WITHOUT TIME ZONE NULL"));
    }

    #[test]
    fn test_mysql_create_table() {
        let grammar = SqlGrammar::new(SqlDialect::MySQL);
        let statements = grammar.compile_create(&users_blueprint()).unwrap();

        let sql = &statements[0];
        assert!(sql.contains("`id` BIGINT UNSIGNED NOT NULL PRIMARY KEY AUTO_INCREMENT"));
        assert!(sql.contains("`active` TINYINT(1) NOT NULL DEFAULT TRUE"));
    }

    #[test]
    fn test_sqlite_boolean_default() {
        let grammar = SqlGrammar::new(SqlDialect::SQLite);
        let statements = grammar.compile_create(&users_blueprint()).unwrap();

        assert!(statements[0].contains("\"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT"));
        assert!(statements[0].contains("\"active\" INTEGER NOT NULL DEFAULT 1"));
    }

    #[test]
    fn test_constraints_and_indexes_rendered() {
        let mut table = Blueprint::new("posts");
        table.id();
        table.foreign_id("user_id").index();
        table.jsonb("meta").nullable();
        table
            .foreign(&["user_id"])
            .on("users")
            .on_delete(ForeignKeyAction::Cascade);
        table.check("char_length(title) > 0");
        table
            .index(&["meta"])
            .using(IndexType::Gin)
            .where_clause("meta IS NOT NULL");

        let grammar = SqlGrammar::new(SqlDialect::PostgreSQL);
        let statements = grammar.compile_create(&table).unwrap();

        assert_eq!(statements.len(), 3);
        assert!(statements[0].contains("FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\") ON DELETE CASCADE"));
        assert!(statements[0].contains("CHECK (char_length(title) > 0)"));
        assert_eq!(
            statements[1],
            "CREATE INDEX \"posts_user_id_index\" ON \"posts\" (\"user_id\")"
        );
        assert_eq!(
            statements[2],
            "CREATE INDEX \"posts_meta_index\" ON \"posts\" USING gin (\"meta\") WHERE meta IS NOT NULL"
        );
    }

    #[test]
    fn test_enum_column_per_dialect() {
        let mut table = Blueprint::new("orders");
        table.enumeration("status", &["open", "closed"]);
        let column = &table.columns()[0];

        assert_eq!(
            SqlGrammar::new(SqlDialect::MySQL).type_sql(column),
            "ENUM('open', 'closed')"
        );
        assert_eq!(
            SqlGrammar::new(SqlDialect::PostgreSQL).type_sql(column),
            "VARCHAR(255) CHECK (\"status\" IN ('open', 'closed'))"
        );
    }

    #[test]
    fn test_alter_statements() {
        let mut table = Blueprint::new("users");
        table.string("nickname", Some(50)).nullable().after("email");
        table.rename_column("name", "full_name");
        table.drop_column("legacy");

        let grammar = SqlGrammar::new(SqlDialect::MySQL);
        let statements = grammar.compile_alter(&table).unwrap();

        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `users` ADD COLUMN `nickname` VARCHAR(50) NULL AFTER `email`".to_string(),
                "ALTER TABLE `users` RENAME COLUMN `name` TO `full_name`".to_string(),
                "ALTER TABLE `users` DROP COLUMN `legacy`".to_string(),
            ]
        );
    }

    #[test]
    fn test_spatial_types() {
        let mut table = Blueprint::new("places");
        table.point("location", Some(4326));

        let column = &table.columns()[0];
        assert_eq!(
            SqlGrammar::new(SqlDialect::PostgreSQL).type_sql(column),
            "GEOMETRY(POINT, 4326)"
        );
        assert_eq!(
            SqlGrammar::new(SqlDialect::MySQL).type_sql(column),
            "POINT SRID 4326"
        );
    }
}
