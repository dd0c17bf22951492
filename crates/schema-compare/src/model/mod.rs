//! Logical (ORM side) and physical (database side) views of a schema.
//!
//! Both sides are plain serde structs: an ORM exporter or a database
//! scraper can produce them as JSON, and tests build them with the
//! `with_*` helpers.

mod logical;
mod physical;


pub use logical::{
    EntityForeignKey, EntityIndex, EntityKey, EntityMapping, EntityProperty, EntityType,
    LogicalModel, Target, TargetKind,
};
pub use physical::{
    DatabaseColumn, DatabaseForeignKey, DatabaseIndex, DatabaseModel, DatabasePrimaryKey,
    DatabaseTable, RelationKind,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// When a column value is produced by the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueGenerated {
    #[default]
    Never,
    OnAdd,
    OnUpdate,
    OnAddOrUpdate,
}

impl fmt::Display for ValueGenerated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueGenerated::Never => "Never",
            ValueGenerated::OnAdd => "OnAdd",
            ValueGenerated::OnUpdate => "OnUpdate",
            ValueGenerated::OnAddOrUpdate => "OnAddOrUpdate",
        })
    }
}

/// What the ORM does to dependents when a principal is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteBehavior {
    #[default]
    ClientSetNull,
    Restrict,
    SetNull,
    Cascade,
    ClientCascade,
    NoAction,
    ClientNoAction,
}

impl fmt::Display for DeleteBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeleteBehavior::ClientSetNull => "ClientSetNull",
            DeleteBehavior::Restrict => "Restrict",
            DeleteBehavior::SetNull => "SetNull",
            DeleteBehavior::Cascade => "Cascade",
            DeleteBehavior::ClientCascade => "ClientCascade",
            DeleteBehavior::NoAction => "NoAction",
            DeleteBehavior::ClientNoAction => "ClientNoAction",
        })
    }
}

/// The `ON DELETE` action of a database foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReferentialAction::NoAction => "NoAction",
            ReferentialAction::Restrict => "Restrict",
            ReferentialAction::Cascade => "Cascade",
            ReferentialAction::SetNull => "SetNull",
            ReferentialAction::SetDefault => "SetDefault",
        })
    }
}

/// The application-side type of a property, as far as comparison cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClrType {
    Bool,
    Byte,
    Int16,
    Int32,
    Int64,
    Decimal,
    Double,
    String,
    Guid,
    DateTime,
    #[default]
    Other,
}

impl ClrType {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ClrType::Byte | ClrType::Int16 | ClrType::Int32 | ClrType::Int64
        )
    }
}

/// A default value declared on the application side rather than as raw SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Decimal literal kept as written, e.g. `"12.50"`.
    Decimal(String),
    Text(String),
    /// ISO-8601 timestamp.
    DateTime(String),
    Guid(String),
}
