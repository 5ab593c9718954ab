//! Schema definition DSL
//!
//! [`Blueprint`] collects a table specification, [`Schema`] hands it to the
//! active [`DatabaseAdapter`](crate::adapter::DatabaseAdapter), and
//! [`SqlGrammar`] renders it for relational backends.

pub mod blueprint;
pub mod column;
pub mod facade;
pub mod grammar;

pub use blueprint::{
    Blueprint, CheckConstraintBuilder, CheckConstraintDefinition, ForeignKeyAction,
    ForeignKeyBuilder, ForeignKeyDefinition, IndexBuilder, IndexDefinition, IndexType,
};
pub use column::{
    ColumnBuilder, ColumnDefault, ColumnDefinition, ColumnType, Generated, Placement,
    SpatialSubtype,
};
pub use facade::{clear_default_adapter, default_adapter, set_default_adapter, Schema};
pub use grammar::SqlGrammar;
