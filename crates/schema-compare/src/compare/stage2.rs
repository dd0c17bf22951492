//! Stage 2: report database objects that no Stage 1 `Ok` record accounts for.

use super::recorder::Recorder;
use crate::config::CompareConfig;
use crate::log::{CompareAttribute, CompareLog, CompareType};
use crate::model::DatabaseModel;
use std::collections::{HashMap, HashSet};

/// Records produced by Stage 2.
#[derive(Debug, Clone)]
pub struct Stage2Output {
    /// The `Database` root (unused tables below it) followed by root-level
    /// records for unused columns and indexes.
    pub logs: Vec<CompareLog>,
    pub has_errors: bool,
}

/// What the `Ok` entity records of Stage 1 claim for one table.
#[derive(Debug, Default)]
struct TableClaims {
    columns: HashSet<String>,
    indexes: HashSet<String>,
}

pub struct Stage2Comparer<'a> {
    database: &'a DatabaseModel,
    config: &'a CompareConfig,
}

impl<'a> Stage2Comparer<'a> {
    pub fn new(database: &'a DatabaseModel, config: &'a CompareConfig) -> Self {
        Self { database, config }
    }

    /// Collect claims per table, merging every entity mapped to the same table.
    fn claims(&self, stage1_logs: &[CompareLog]) -> HashMap<String, TableClaims> {
        let names = self.config.name_match;
        let mut claims: HashMap<String, TableClaims> = HashMap::new();

        let entities = stage1_logs
            .iter()
            .flat_map(|root| root.sub_logs())
            .filter(|log| log.is_ok() && log.kind() == CompareType::Entity);
        for entity in entities {
            let Some(table) = entity.expected() else {
                continue;
            };
            let claim = claims.entry(names.key(table).into_owned()).or_default();
            for child in entity.sub_logs().iter().filter(|l| l.is_ok()) {
                let Some(expected) = child.expected() else {
                    continue;
                };
                match child.kind() {
                    CompareType::Property => {
                        claim.columns.insert(names.key(expected).into_owned());
                    }
                    CompareType::Index => {
                        claim.indexes.insert(names.key(expected).into_owned());
                    }
                    _ => {}
                }
            }
        }
        claims
    }

    pub fn compare(&self, stage1_logs: &[CompareLog]) -> Stage2Output {
        let names = self.config.name_match;
        let default_schema = self.database.default_schema.as_deref();
        let claims = self.claims(stage1_logs);

        let mut root = Recorder::new(self.config.ignore_list(), names);

        let mut tables = root.child();
        for table in &self.database.tables {
            let name = table.schema_table(default_schema);
            if !claims.contains_key(names.key(&name).as_ref()) {
                tables.extra_in_database(CompareType::Table, &name, CompareAttribute::NotSet, None);
            }
        }
        root.push_node(
            CompareLog::ok(CompareType::Database, &self.database.database_name, None),
            tables,
        );

        for table in &self.database.tables {
            let name = table.schema_table(default_schema);
            let Some(claim) = claims.get(names.key(&name).as_ref()) else {
                continue;
            };
            for column in &table.columns {
                if !claim.columns.contains(names.key(&column.name).as_ref()) {
                    root.extra_in_database(
                        CompareType::Column,
                        &name,
                        CompareAttribute::ColumnName,
                        Some(&column.name),
                    );
                }
            }
        }

        for table in &self.database.tables {
            let name = table.schema_table(default_schema);
            let Some(claim) = claims.get(names.key(&name).as_ref()) else {
                continue;
            };
            for index in &table.indexes {
                if !claim.indexes.contains(names.key(&index.name).as_ref()) {
                    root.extra_in_database(
                        CompareType::Index,
                        &name,
                        CompareAttribute::IndexConstraintName,
                        Some(&index.name),
                    );
                }
            }
        }

        let (logs, has_errors) = root.finish();
        tracing::debug!(
            target: "schema_compare.stage2",
            records = logs.len(),
            has_errors,
            "stage 2 finished"
        );
        Stage2Output { logs, has_errors }
    }
}
