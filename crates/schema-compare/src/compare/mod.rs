//! The two comparison stages and the [`SchemaComparer`] that runs them.

mod recorder;
mod stage1;
mod stage2;


pub use stage1::{Stage1Comparer, Stage1Output};
pub use stage2::{Stage2Comparer, Stage2Output};

use crate::config::{CompareConfig, TableFilter};
use crate::error::{CompareError, CompareResult};
use crate::log::{self, CompareLog};
use crate::model::{DatabaseModel, DatabaseTable, LogicalModel};
use crate::provider::{DatabaseEngine, FactoryOptions, ProviderRegistry};
use std::collections::HashSet;

/// Where a [`SchemaComparer`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparePhase {
    Init,
    Stage1Run,
    /// Stage 1 found errors and Stage 2 was not forced.
    Stage2Skipped,
    Stage2Run,
}

/// Compares one or more logical models against one database.
///
/// # Example
///
/// ```ignore
/// use schema_compare::{CompareConfig, SchemaComparer};
///
/// let mut comparer = SchemaComparer::new(CompareConfig::new().tables_to_ignore(Some("")));
/// let has_errors = comparer.compare(&[&model], &database)?;
/// assert!(!has_errors, "{}", comparer.errors_text());
/// ```
#[derive(Debug)]
pub struct SchemaComparer {
    config: CompareConfig,
    phase: ComparePhase,
    logs: Vec<CompareLog>,
}

impl SchemaComparer {
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config,
            phase: ComparePhase::Init,
            logs: Vec::new(),
        }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn phase(&self) -> ComparePhase {
        self.phase
    }

    /// Run the comparison against an already fetched physical model.
    ///
    /// Returns `true` when any stage that ran reported a difference that was
    /// not ignored.
    pub fn compare(
        &mut self,
        models: &[&LogicalModel],
        database: &DatabaseModel,
    ) -> CompareResult<bool> {
        self.phase = ComparePhase::Init;
        self.logs.clear();
        if models.is_empty() {
            return Err(CompareError::Config(
                "at least one logical model is required".to_string(),
            ));
        }

        let database = self.filter_tables(models, database)?;

        let mut stage1_errors = false;
        let mut logs = Vec::with_capacity(models.len() + 3);
        for model in models {
            let output = Stage1Comparer::new(model, &database, &self.config).compare()?;
            stage1_errors |= output.has_errors;
            logs.push(output.log);
        }
        self.logs = logs;
        self.phase = ComparePhase::Stage1Run;
        tracing::info!(target: "schema_compare", models = models.len(), has_errors = stage1_errors, "stage 1 finished");

        if stage1_errors && !self.config.always_run_stage2 {
            self.phase = ComparePhase::Stage2Skipped;
            tracing::info!(target: "schema_compare", "stage 2 skipped");
            return Ok(true);
        }

        let output = Stage2Comparer::new(&database, &self.config).compare(&self.logs);
        self.logs.extend(output.logs);
        self.phase = ComparePhase::Stage2Run;
        tracing::info!(target: "schema_compare", has_errors = output.has_errors, "stage 2 finished");

        Ok(stage1_errors || output.has_errors)
    }

    /// Fetch the physical model through the factory registered for the
    /// models' engine, then compare.
    pub fn compare_with_provider(
        &mut self,
        models: &[&LogicalModel],
        registry: &ProviderRegistry,
        connection: &str,
        options: &FactoryOptions,
    ) -> CompareResult<bool> {
        let engines: HashSet<DatabaseEngine> = models.iter().map(|m| m.engine).collect();
        let engine = match engines.len() {
            1 => models[0].engine,
            0 => {
                return Err(CompareError::Config(
                    "at least one logical model is required".to_string(),
                ));
            }
            _ => {
                return Err(CompareError::Config(
                    "all logical models must target the same database engine".to_string(),
                ));
            }
        };
        let database = registry.create_model(engine, connection, options)?;
        self.compare(models, &database)
    }

    /// Apply the table filter, returning the tables that take part.
    fn filter_tables(
        &self,
        models: &[&LogicalModel],
        database: &DatabaseModel,
    ) -> CompareResult<DatabaseModel> {
        let mut filtered = database.clone();
        let default_schema = database.default_schema.as_deref();

        match &self.config.tables {
            TableFilter::CheckAll => {}
            TableFilter::MappedOnly => {
                let mapped: HashSet<String> = models
                    .iter()
                    .flat_map(|model| {
                        model.entities.iter().filter_map(move |entity| {
                            stage1::entity_table_name(entity, model, database, self.config.name_match)
                        })
                    })
                    .map(|name| name.to_lowercase())
                    .collect();
                filtered
                    .tables
                    .retain(|t| mapped.contains(&t.schema_table(default_schema).to_lowercase()));
            }
            TableFilter::Ignore(names) => {
                let mut ignored: Vec<(Option<&str>, &str)> = Vec::with_capacity(names.len());
                for name in names {
                    let (schema, table) = match name.split_once('.') {
                        Some((schema, table)) => (Some(schema), table),
                        None => (default_schema, name.as_str()),
                    };
                    let exists = database
                        .tables
                        .iter()
                        .any(|t| table_matches(t, default_schema, schema, table));
                    if !exists {
                        return Err(CompareError::Config(format!(
                            "TablesToIgnore contains a table name of '{name}', which was not found in the database"
                        )));
                    }
                    ignored.push((schema, table));
                }
                filtered.tables.retain(|t| {
                    !ignored
                        .iter()
                        .any(|(schema, table)| table_matches(t, default_schema, *schema, table))
                });
            }
        }

        tracing::debug!(
            target: "schema_compare",
            tables = filtered.tables.len(),
            removed = database.tables.len() - filtered.tables.len(),
            "tables selected for comparison"
        );
        Ok(filtered)
    }

    /// Every record from the last run, `Ok` and nested ones included.
    pub fn logs(&self) -> &[CompareLog] {
        &self.logs
    }

    /// One line per difference.
    pub fn all_errors(&self) -> Vec<String> {
        log::all_errors(&self.logs)
    }

    /// The full result tree, indented by depth.
    pub fn all_results_indented(&self) -> Vec<String> {
        log::all_results_indented(&self.logs)
    }

    /// All differences, newline separated, ready to paste into an ignore list.
    pub fn errors_text(&self) -> String {
        self.all_errors().join("\n")
    }
}

fn table_matches(
    table: &DatabaseTable,
    default_schema: Option<&str>,
    schema: Option<&str>,
    name: &str,
) -> bool {
    eq_ignore_case(table.schema.as_deref().or(default_schema), schema)
        && table.name.eq_ignore_ascii_case(name)
}

fn eq_ignore_case(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        (None, None) => true,
        _ => false,
    }
}
