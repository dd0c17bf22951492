use super::{DatabaseEngine, DatabaseModelFactory, FactoryOptions};
use crate::error::{CompareError, CompareResult};
use crate::model::DatabaseModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A physical model saved to disk, so comparisons can run without a live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub version: u32,
    pub engine: DatabaseEngine,
    pub retrieved_at: DateTime<Utc>,
    pub model: DatabaseModel,
}

impl SchemaSnapshot {
    pub const VERSION: u32 = 1;

    pub fn new(engine: DatabaseEngine, model: DatabaseModel) -> Self {
        Self {
            version: Self::VERSION,
            engine,
            retrieved_at: Utc::now(),
            model,
        }
    }

    pub fn read(path: &Path) -> CompareResult<Self> {
        let data = std::fs::read(path).map_err(|e| {
            CompareError::Other(format!("Failed to read snapshot {}: {e}", path.display()))
        })?;

        serde_json::from_slice::<SchemaSnapshot>(&data)
            .map_err(|e| CompareError::Serialization(format!("Failed to parse snapshot: {e}")))
    }

    /// Write through a temporary file so readers never see a partial snapshot.
    pub fn write(&self, path: &Path) -> CompareResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CompareError::Other(e.to_string()))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| CompareError::Serialization(format!("Failed to serialize snapshot: {e}")))?;

        std::fs::write(&tmp_path, data).map_err(|e| CompareError::Other(e.to_string()))?;
        std::fs::rename(&tmp_path, path).map_err(|e| CompareError::Other(e.to_string()))?;
        tracing::debug!(target: "schema_compare.provider", path = %path.display(), "snapshot written");
        Ok(())
    }
}

/// Factory whose "connection string" is the path of a [`SchemaSnapshot`] file.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotFactory {
    engine: DatabaseEngine,
}

impl SnapshotFactory {
    pub fn new(engine: DatabaseEngine) -> Self {
        Self { engine }
    }
}

impl DatabaseModelFactory for SnapshotFactory {
    fn create(&self, connection: &str, options: &FactoryOptions) -> CompareResult<DatabaseModel> {
        let snapshot = SchemaSnapshot::read(Path::new(connection))?;
        if snapshot.version != SchemaSnapshot::VERSION {
            return Err(CompareError::Provider(format!(
                "snapshot {connection} has version {}, expected {}",
                snapshot.version,
                SchemaSnapshot::VERSION
            )));
        }
        if snapshot.engine != self.engine {
            return Err(CompareError::Provider(format!(
                "snapshot {connection} was taken from {}, not {}",
                snapshot.engine, self.engine
            )));
        }
        tracing::debug!(
            target: "schema_compare.provider",
            path = connection,
            retrieved_at = %snapshot.retrieved_at,
            tables = snapshot.model.tables.len(),
            "snapshot loaded"
        );
        Ok(options.apply(snapshot.model))
    }
}
