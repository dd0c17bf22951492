use super::{ClrType, DefaultValue, DeleteBehavior, ValueGenerated};
use crate::error::{CompareError, CompareResult};
use crate::provider::DatabaseEngine;
use serde::{Deserialize, Serialize};

/// The ORM's description of one context: its entities and how they map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalModel {
    /// Context name, used as the name of the root record.
    pub name: String,
    pub engine: DatabaseEngine,
    /// Schema applied to entities that do not name one.
    #[serde(default)]
    pub default_schema: Option<String>,
    #[serde(default)]
    pub entities: Vec<EntityType>,
}

impl LogicalModel {
    pub fn new(name: impl Into<String>, engine: DatabaseEngine) -> Self {
        Self {
            name: name.into(),
            engine,
            default_schema: None,
            entities: Vec::new(),
        }
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Read a model exported as JSON.
    pub fn from_json(json: &str) -> CompareResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CompareError::Serialization(format!("Failed to parse logical model: {e}")))
    }
}

/// Whether an entity is read from a table or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Table,
    View,
}

/// Where an entity's rows live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityMapping {
    /// In-memory only, or owned without a table of its own.
    #[default]
    NotMapped,
    Table {
        #[serde(default)]
        schema: Option<String>,
        name: String,
    },
    View {
        #[serde(default)]
        schema: Option<String>,
        name: String,
    },
    /// Serialized into a JSON column of its owner's table.
    JsonColumn { column: String },
}

/// A resolved table or view target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub kind: TargetKind,
    pub schema: Option<&'a str>,
    pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    #[serde(default)]
    pub mapping: EntityMapping,
    /// Base entity in a hierarchy.
    #[serde(default)]
    pub base_type: Option<String>,
    /// All properties, inherited ones included.
    #[serde(default)]
    pub properties: Vec<EntityProperty>,
    #[serde(default)]
    pub primary_key: Option<EntityKey>,
    #[serde(default)]
    pub foreign_keys: Vec<EntityForeignKey>,
    #[serde(default)]
    pub indexes: Vec<EntityIndex>,
}

impl EntityType {
    fn with_mapping(name: impl Into<String>, mapping: EntityMapping) -> Self {
        Self {
            name: name.into(),
            mapping,
            base_type: None,
            properties: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn table(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self::with_mapping(
            name,
            EntityMapping::Table {
                schema: None,
                name: table.into(),
            },
        )
    }

    pub fn view(name: impl Into<String>, view: impl Into<String>) -> Self {
        Self::with_mapping(
            name,
            EntityMapping::View {
                schema: None,
                name: view.into(),
            },
        )
    }

    pub fn not_mapped(name: impl Into<String>) -> Self {
        Self::with_mapping(name, EntityMapping::NotMapped)
    }

    pub fn json_column(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::with_mapping(
            name,
            EntityMapping::JsonColumn {
                column: column.into(),
            },
        )
    }

    /// Set the schema of a table or view mapping.
    pub fn with_schema(mut self, new_schema: impl Into<String>) -> Self {
        if let EntityMapping::Table { schema, .. } | EntityMapping::View { schema, .. } =
            &mut self.mapping
        {
            *schema = Some(new_schema.into());
        }
        self
    }

    pub fn with_base_type(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(base.into());
        self
    }

    pub fn with_property(mut self, property: EntityProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_key(mut self, name: impl Into<String>, properties: &[&str]) -> Self {
        self.primary_key = Some(EntityKey {
            name: name.into(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn with_foreign_key(mut self, fk: EntityForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    pub fn with_index(mut self, index: EntityIndex) -> Self {
        self.indexes.push(index);
        self
    }

    /// The table or view this entity reads from, with the schema falling
    /// back to `default_schema`.
    pub fn target<'a>(&'a self, default_schema: Option<&'a str>) -> Option<Target<'a>> {
        match &self.mapping {
            EntityMapping::Table { schema, name } => Some(Target {
                kind: TargetKind::Table,
                schema: schema.as_deref().or(default_schema),
                name,
            }),
            EntityMapping::View { schema, name } => Some(Target {
                kind: TargetKind::View,
                schema: schema.as_deref().or(default_schema),
                name,
            }),
            EntityMapping::NotMapped | EntityMapping::JsonColumn { .. } => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&EntityProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_key(&self, property: &str) -> bool {
        self.primary_key
            .as_ref()
            .is_some_and(|k| k.properties.iter().any(|p| p == property))
    }

    /// Column of `property` in a target of `kind`.
    ///
    /// Keys, foreign keys and indexes must only reference mapped properties,
    /// so anything else is an invariant violation.
    pub fn column_of(&self, property: &str, kind: TargetKind) -> CompareResult<&str> {
        let prop = self.property(property).ok_or_else(|| {
            CompareError::invariant(format!(
                "entity '{}' references unknown property '{property}'",
                self.name
            ))
        })?;
        prop.column_name_for(kind).ok_or_else(|| {
            CompareError::invariant(format!(
                "property '{}.{property}' has no column",
                self.name
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProperty {
    pub name: String,
    /// Column in a table target; `None` when the property has no column there.
    #[serde(default)]
    pub column_name: Option<String>,
    /// Column in a view target, when it differs from `column_name`.
    #[serde(default)]
    pub view_column_name: Option<String>,
    pub store_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub clr_type: ClrType,
    #[serde(default)]
    pub computed_sql: Option<String>,
    #[serde(default)]
    pub is_stored: Option<bool>,
    #[serde(default)]
    pub default_value: Option<DefaultValue>,
    #[serde(default)]
    pub default_sql: Option<String>,
    #[serde(default)]
    pub value_generated: ValueGenerated,
}

impl EntityProperty {
    /// A non-nullable property stored in a column of the same name.
    pub fn new(name: impl Into<String>, store_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            column_name: Some(name.clone()),
            name,
            view_column_name: None,
            store_type: store_type.into(),
            nullable: false,
            clr_type: ClrType::Other,
            computed_sql: None,
            is_stored: None,
            default_value: None,
            default_sql: None,
            value_generated: ValueGenerated::Never,
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column_name = Some(column.into());
        self
    }

    pub fn view_column(mut self, column: impl Into<String>) -> Self {
        self.view_column_name = Some(column.into());
        self
    }

    pub fn without_table_column(mut self) -> Self {
        self.column_name = None;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn clr(mut self, clr_type: ClrType) -> Self {
        self.clr_type = clr_type;
        self
    }

    pub fn computed(mut self, sql: impl Into<String>, stored: Option<bool>) -> Self {
        self.computed_sql = Some(sql.into());
        self.is_stored = stored;
        self.value_generated = ValueGenerated::OnAddOrUpdate;
        self
    }

    pub fn default_sql(mut self, sql: impl Into<String>) -> Self {
        self.default_sql = Some(sql.into());
        self.value_generated = ValueGenerated::OnAdd;
        self
    }

    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default_value = Some(value);
        self.value_generated = ValueGenerated::OnAdd;
        self
    }

    pub fn generated(mut self, value_generated: ValueGenerated) -> Self {
        self.value_generated = value_generated;
        self
    }

    pub fn column_name_for(&self, kind: TargetKind) -> Option<&str> {
        match kind {
            TargetKind::Table => self.column_name.as_deref(),
            TargetKind::View => self
                .view_column_name
                .as_deref()
                .or(self.column_name.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityKey {
    /// Constraint name the ORM would create.
    pub name: String,
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityForeignKey {
    /// `None` when the constraint name cannot be resolved (some view-backed relationships).
    #[serde(default)]
    pub constraint_name: Option<String>,
    pub properties: Vec<String>,
    pub principal_entity: String,
    pub principal_key: Vec<String>,
    #[serde(default)]
    pub delete_behavior: DeleteBehavior,
    /// The dependent must exist for every principal row.
    #[serde(default)]
    pub required_dependent: bool,
}

impl EntityForeignKey {
    pub fn new(
        constraint_name: impl Into<String>,
        properties: &[&str],
        principal_entity: impl Into<String>,
        principal_key: &[&str],
    ) -> Self {
        Self {
            constraint_name: Some(constraint_name.into()),
            properties: properties.iter().map(|p| p.to_string()).collect(),
            principal_entity: principal_entity.into(),
            principal_key: principal_key.iter().map(|p| p.to_string()).collect(),
            delete_behavior: DeleteBehavior::default(),
            required_dependent: false,
        }
    }

    pub fn unnamed(mut self) -> Self {
        self.constraint_name = None;
        self
    }

    pub fn on_delete(mut self, behavior: DeleteBehavior) -> Self {
        self.delete_behavior = behavior;
        self
    }

    pub fn required_dependent(mut self) -> Self {
        self.required_dependent = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIndex {
    pub database_name: String,
    pub properties: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl EntityIndex {
    pub fn new(database_name: impl Into<String>, properties: &[&str]) -> Self {
        Self {
            database_name: database_name.into(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}
