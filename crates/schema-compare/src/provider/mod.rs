//! Obtaining the physical model.
//!
//! Scrapers are looked up in a [`ProviderRegistry`] keyed by
//! [`DatabaseEngine`]. The crate ships [`SnapshotFactory`], which reads a
//! JSON snapshot written earlier by a scraper.

mod snapshot;

pub use snapshot::{SchemaSnapshot, SnapshotFactory};

use crate::error::{CompareError, CompareResult};
use crate::model::{DatabaseModel, DatabaseTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseEngine {
    SqlServer,
    Postgres,
    Sqlite,
}

impl DatabaseEngine {
    /// Resolve an engine identifier such as `"postgres"` or `"sqlserver"`.
    pub fn from_name(name: &str) -> CompareResult<Self> {
        match name.trim().to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "sqlserver" | "mssql" => Ok(Self::SqlServer),
            "postgres" | "postgresql" | "npgsql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(CompareError::UnsupportedEngine(name.to_string())),
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SqlServer => "sqlserver",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        })
    }
}

/// Which schemas and tables a factory should return. Empty lists mean everything.
#[derive(Debug, Clone, Default)]
pub struct FactoryOptions {
    pub schemas: Vec<String>,
    /// `table` or `schema.table` names.
    pub tables: Vec<String>,
}

impl FactoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schemas(mut self, schemas: &[&str]) -> Self {
        self.schemas = schemas.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn tables(mut self, tables: &[&str]) -> Self {
        self.tables = tables.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Whether `table` passes the filter. Names compare case-insensitively.
    pub fn includes(&self, table: &DatabaseTable, default_schema: Option<&str>) -> bool {
        let schema = table.schema.as_deref().or(default_schema).unwrap_or("");
        let schema_ok = self.schemas.is_empty()
            || self.schemas.iter().any(|s| s.eq_ignore_ascii_case(schema));
        let table_ok = self.tables.is_empty()
            || self.tables.iter().any(|t| match t.split_once('.') {
                Some((s, n)) => s.eq_ignore_ascii_case(schema) && n.eq_ignore_ascii_case(&table.name),
                None => t.eq_ignore_ascii_case(&table.name),
            });
        schema_ok && table_ok
    }

    /// Drop the tables of `model` that the filter excludes.
    pub fn apply(&self, mut model: DatabaseModel) -> DatabaseModel {
        let default_schema = model.default_schema.clone();
        model
            .tables
            .retain(|t| self.includes(t, default_schema.as_deref()));
        model
    }
}

/// Produces a physical model for one database engine.
pub trait DatabaseModelFactory: Send + Sync {
    /// Read the structure of the database at `connection`.
    ///
    /// Connection and scraping failures are returned as they are; the
    /// comparer neither retries nor wraps them.
    fn create(&self, connection: &str, options: &FactoryOptions) -> CompareResult<DatabaseModel>;
}

/// Factories keyed by engine, supplied by the caller.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<DatabaseEngine, Box<dyn DatabaseModelFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, engine: DatabaseEngine, factory: impl DatabaseModelFactory + 'static) {
        self.factories.insert(engine, Box::new(factory));
    }

    pub fn with(mut self, engine: DatabaseEngine, factory: impl DatabaseModelFactory + 'static) -> Self {
        self.register(engine, factory);
        self
    }

    pub fn get(&self, engine: DatabaseEngine) -> CompareResult<&dyn DatabaseModelFactory> {
        self.factories
            .get(&engine)
            .map(|f| f.as_ref())
            .ok_or_else(|| CompareError::UnsupportedEngine(engine.to_string()))
    }

    pub fn create_model(
        &self,
        engine: DatabaseEngine,
        connection: &str,
        options: &FactoryOptions,
    ) -> CompareResult<DatabaseModel> {
        let factory = self.get(engine)?;
        tracing::debug!(target: "schema_compare.provider", %engine, "reading physical model");
        factory.create(connection, options)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("engines", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests;
