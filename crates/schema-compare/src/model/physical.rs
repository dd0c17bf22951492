use super::{ReferentialAction, ValueGenerated};
use crate::error::{CompareError, CompareResult};
use crate::normalize::schema_table;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Table,
    PartitionedTable,
    View,
    MaterializedView,
    ForeignTable,
    Other,
}

impl RelationKind {
    pub fn is_view(self) -> bool {
        matches!(self, Self::View | Self::MaterializedView)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseColumn {
    pub name: String,
    pub store_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub computed_sql: Option<String>,
    #[serde(default)]
    pub is_stored: Option<bool>,
    #[serde(default)]
    pub default_sql: Option<String>,
    /// Raw flag reported by the scraper (identity, rowversion, ...).
    #[serde(default)]
    pub value_generated: Option<ValueGenerated>,
}

impl DatabaseColumn {
    pub fn new(name: impl Into<String>, store_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store_type: store_type.into(),
            nullable: false,
            computed_sql: None,
            is_stored: None,
            default_sql: None,
            value_generated: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn computed(mut self, sql: impl Into<String>, stored: Option<bool>) -> Self {
        self.computed_sql = Some(sql.into());
        self.is_stored = stored;
        self
    }

    pub fn default_sql(mut self, sql: impl Into<String>) -> Self {
        self.default_sql = Some(sql.into());
        self
    }

    pub fn generated(mut self, value_generated: ValueGenerated) -> Self {
        self.value_generated = Some(value_generated);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabasePrimaryKey {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub principal_table: String,
    #[serde(default)]
    pub on_delete: Option<ReferentialAction>,
}

impl DatabaseForeignKey {
    pub fn new(name: impl Into<String>, columns: &[&str], principal_table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            principal_table: principal_table.into(),
            on_delete: None,
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseIndex {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl DatabaseIndex {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseTable {
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
    pub kind: RelationKind,
    #[serde(default)]
    pub columns: Vec<DatabaseColumn>,
    #[serde(default)]
    pub primary_key: Option<DatabasePrimaryKey>,
    #[serde(default)]
    pub foreign_keys: Vec<DatabaseForeignKey>,
    #[serde(default)]
    pub indexes: Vec<DatabaseIndex>,
    #[serde(default)]
    pub unique_constraints: Vec<DatabaseIndex>,
}

impl DatabaseTable {
    fn with_kind(schema: Option<&str>, name: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.into(),
            kind,
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            unique_constraints: Vec::new(),
        }
    }

    pub fn table(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self::with_kind(schema, name, RelationKind::Table)
    }

    pub fn view(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self::with_kind(schema, name, RelationKind::View)
    }

    pub fn with_column(mut self, column: DatabaseColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_primary_key(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.primary_key = Some(DatabasePrimaryKey {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn with_foreign_key(mut self, fk: DatabaseForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    pub fn with_index(mut self, index: DatabaseIndex) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_unique_constraint(mut self, constraint: DatabaseIndex) -> Self {
        self.unique_constraints.push(constraint);
        self
    }

    /// `schema.name`, or just `name` when the schema is the database default.
    pub fn schema_table(&self, default_schema: Option<&str>) -> String {
        let schema = self.schema.as_deref().filter(|s| Some(*s) != default_schema);
        schema_table(schema, &self.name)
    }
}

/// Structural snapshot of a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseModel {
    pub database_name: String,
    #[serde(default)]
    pub default_schema: Option<String>,
    #[serde(default)]
    pub tables: Vec<DatabaseTable>,
}

impl DatabaseModel {
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            default_schema: None,
            tables: Vec::new(),
        }
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    pub fn with_table(mut self, table: DatabaseTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn find_table(&self, schema: Option<&str>, table: &str) -> Option<&DatabaseTable> {
        self.tables
            .iter()
            .find(|t| t.schema.as_deref() == schema && t.name == table)
    }

    pub fn find_table_mut(&mut self, schema: Option<&str>, table: &str) -> Option<&mut DatabaseTable> {
        self.tables
            .iter_mut()
            .find(|t| t.schema.as_deref() == schema && t.name == table)
    }

    pub fn from_json(json: &str) -> CompareResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CompareError::Serialization(format!("Failed to parse database model: {e}")))
    }
}
