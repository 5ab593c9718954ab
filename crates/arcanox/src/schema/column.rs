//! Column definitions
//!
//! A [`ColumnDefinition`] is the backend-neutral description of one column:
//! its semantic [`ColumnType`] plus modifiers. Definitions are produced by
//! [`Blueprint`](super::Blueprint) and refined through [`ColumnBuilder`].

use crate::adapter::DatabaseValue;

/// Geometry subtypes for spatial columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialSubtype {
    Geometry,
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl SpatialSubtype {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SpatialSubtype::Geometry => "GEOMETRY",
            SpatialSubtype::Point => "POINT",
            SpatialSubtype::LineString => "LINESTRING",
            SpatialSubtype::Polygon => "POLYGON",
            SpatialSubtype::MultiPoint => "MULTIPOINT",
            SpatialSubtype::MultiLineString => "MULTILINESTRING",
            SpatialSubtype::MultiPolygon => "MULTIPOLYGON",
            SpatialSubtype::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }
}

/// Semantic column type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    // Integers
    TinyInteger,
    SmallInteger,
    MediumInteger,
    Integer,
    BigInteger,

    // Numerics
    Decimal { precision: u8, scale: u8 },
    Float { precision: Option<u8> },
    Double,
    Money,
    Boolean,

    // Strings
    Char { length: u32 },
    String { length: u32 },
    TinyText,
    Text,
    MediumText,
    LongText,
    Citext,

    // Binary
    Binary { length: Option<u32> },
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Bit { length: u32 },

    // Temporal
    Date,
    Time { precision: Option<u8>, with_timezone: bool },
    DateTime { precision: Option<u8>, with_timezone: bool },
    Timestamp { precision: Option<u8>, with_timezone: bool },
    Year,
    Interval,

    // Structured
    Json,
    Jsonb,
    Xml,
    Hstore,
    Array(Box<ColumnType>),

    // Identifiers
    Uuid,
    Ulid,
    ObjectId,

    // Spatial
    Geometry { subtype: SpatialSubtype, srid: Option<u32> },
    Geography { subtype: SpatialSubtype, srid: Option<u32> },

    // PostgreSQL ranges
    Int4Range,
    Int8Range,
    NumRange,
    TsRange,
    TsTzRange,
    DateRange,

    // Network
    Inet,
    Cidr,
    MacAddress,
    MacAddress8,

    // Full-text
    TsVector,
    TsQuery,

    // Value lists
    Enum(Vec<String>),
    Set(Vec<String>),

    /// Column whose value is always derived from `expression`
    Computed { expression: String },
}

impl ColumnType {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::TinyInteger
                | ColumnType::SmallInteger
                | ColumnType::MediumInteger
                | ColumnType::Integer
                | ColumnType::BigInteger
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnType::Date
                | ColumnType::Time { .. }
                | ColumnType::DateTime { .. }
                | ColumnType::Timestamp { .. }
                | ColumnType::Year
                | ColumnType::Interval
        )
    }

    pub fn is_spatial(&self) -> bool {
        matches!(self, ColumnType::Geometry { .. } | ColumnType::Geography { .. })
    }
}

/// Column default value
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    /// A literal value, quoted by the grammar
    Value(DatabaseValue),
    /// A raw backend expression, emitted verbatim
    Expression(String),
    CurrentTimestamp,
}

/// Generated column storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Stored(String),
    Virtual(String),
}

/// Column placement hint for ALTER TABLE ... ADD COLUMN
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    First,
    After(String),
}

/// Full description of a column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
    pub unique: bool,
    pub primary: bool,
    pub auto_increment: bool,
    pub unsigned: bool,
    pub index: bool,
    pub comment: Option<String>,
    pub placement: Option<Placement>,
    pub generated: Option<Generated>,
    pub invisible: bool,
    pub use_current: bool,
    pub use_current_on_update: bool,
    pub charset: Option<String>,
    pub collation: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            nullable: false,
            default: None,
            unique: false,
            primary: false,
            auto_increment: false,
            unsigned: false,
            index: false,
            comment: None,
            placement: None,
            generated: None,
            invisible: false,
            use_current: false,
            use_current_on_update: false,
            charset: None,
            collation: None,
        }
    }
}

/// Chained modifier for the column most recently added to a blueprint.
///
/// No validation happens here; contradictory modifiers are left for the
/// backend to reject.
pub struct ColumnBuilder<'a> {
    column: &'a mut ColumnDefinition,
}

impl<'a> ColumnBuilder<'a> {
    pub(crate) fn new(column: &'a mut ColumnDefinition) -> Self {
        Self { column }
    }

    pub fn nullable(self) -> Self {
        self.column.nullable = true;
        self
    }

    pub fn not_null(self) -> Self {
        self.column.nullable = false;
        self
    }

    pub fn default(self, value: impl Into<DatabaseValue>) -> Self {
        self.column.default = Some(ColumnDefault::Value(value.into()));
        self
    }

    pub fn default_raw(self, expression: &str) -> Self {
        self.column.default = Some(ColumnDefault::Expression(expression.to_string()));
        self
    }

    pub fn unique(self) -> Self {
        self.column.unique = true;
        self
    }

    pub fn primary(self) -> Self {
        self.column.primary = true;
        self
    }

    pub fn auto_increment(self) -> Self {
        self.column.auto_increment = true;
        self
    }

    pub fn unsigned(self) -> Self {
        self.column.unsigned = true;
        self
    }

    pub fn index(self) -> Self {
        self.column.index = true;
        self
    }

    pub fn comment(self, comment: &str) -> Self {
        self.column.comment = Some(comment.to_string());
        self
    }

    pub fn after(self, column: &str) -> Self {
        self.column.placement = Some(Placement::After(column.to_string()));
        self
    }

    pub fn first(self) -> Self {
        self.column.placement = Some(Placement::First);
        self
    }

    pub fn stored_as(self, expression: &str) -> Self {
        self.column.generated = Some(Generated::Stored(expression.to_string()));
        self
    }

    pub fn virtual_as(self, expression: &str) -> Self {
        self.column.generated = Some(Generated::Virtual(expression.to_string()));
        self
    }

    pub fn invisible(self) -> Self {
        self.column.invisible = true;
        self
    }

    /// Default to the current timestamp on insert
    pub fn use_current(self) -> Self {
        self.column.use_current = true;
        self.column.default = Some(ColumnDefault::CurrentTimestamp);
        self
    }

    /// Refresh to the current timestamp on every update
    pub fn use_current_on_update(self) -> Self {
        self.column.use_current_on_update = true;
        self
    }

    pub fn charset(self, charset: &str) -> Self {
        self.column.charset = Some(charset.to_string());
        self
    }

    pub fn collation(self, collation: &str) -> Self {
        self.column.collation = Some(collation.to_string());
        self
    }

    /// Read back the definition built so far
    pub fn definition(&self) -> &ColumnDefinition {
        self.column
    }
}
