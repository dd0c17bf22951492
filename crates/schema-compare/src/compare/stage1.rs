//! Stage 1: walk the logical model and look for each piece in the database.

use super::recorder::Recorder;
use crate::config::CompareConfig;
use crate::error::{CompareError, CompareResult};
use crate::literal::sql_literal;
use crate::log::{CompareAttribute, CompareLog, CompareType};
use crate::model::{
    DatabaseColumn, DatabaseForeignKey, DatabaseIndex, DatabaseModel, DatabaseTable,
    EntityForeignKey, EntityMapping, EntityProperty, EntityType, LogicalModel, Target, TargetKind,
    ValueGenerated,
};
use crate::normalize::{
    NO_PRIMARY_KEY, NameMatch, delete_behavior_from_action, infer_value_generated,
    normalize_sql, nullable_as_str, schema_table,
};
use std::collections::{HashMap, HashSet};

/// Result of comparing one logical model.
#[derive(Debug, Clone)]
pub struct Stage1Output {
    /// `DbContext` root record holding one subtree per entity.
    pub log: CompareLog,
    pub has_errors: bool,
}

/// Name an entity's target is listed under in the database, if it has one.
///
/// The schema is left out when it is the database default schema.
pub(crate) fn entity_table_name(
    entity: &EntityType,
    model: &LogicalModel,
    database: &DatabaseModel,
    names: NameMatch,
) -> Option<String> {
    let target = entity.target(model.default_schema.as_deref())?;
    Some(target_table_name(target, database, names))
}

fn target_table_name(target: Target<'_>, database: &DatabaseModel, names: NameMatch) -> String {
    let db_default = database.default_schema.as_deref();
    let schema = target
        .schema
        .filter(|s| db_default.is_none_or(|d| !names.eq(s, d)));
    schema_table(schema, target.name)
}

/// How an entity shares its row with other entities.
#[derive(Debug, Default)]
struct RowSharing {
    /// Columns exempt from forced nullability. `None` when nothing is forced.
    exempt: Option<HashSet<String>>,
    /// The entity's key columns belong to the principal sharing the row.
    skip_key_properties: bool,
}

pub struct Stage1Comparer<'a> {
    model: &'a LogicalModel,
    database: &'a DatabaseModel,
    config: &'a CompareConfig,
    tables: HashMap<String, &'a DatabaseTable>,
}

impl<'a> Stage1Comparer<'a> {
    pub fn new(
        model: &'a LogicalModel,
        database: &'a DatabaseModel,
        config: &'a CompareConfig,
    ) -> Self {
        let names = config.name_match;
        let default_schema = database.default_schema.as_deref();
        let tables = database
            .tables
            .iter()
            .map(|t| (names.key(&t.schema_table(default_schema)).into_owned(), t))
            .collect();
        Self {
            model,
            database,
            config,
            tables,
        }
    }

    fn names(&self) -> NameMatch {
        self.config.name_match
    }

    fn find_table(&self, name: &str) -> Option<&'a DatabaseTable> {
        self.tables.get(self.names().key(name).as_ref()).copied()
    }

    pub fn compare(&self) -> CompareResult<Stage1Output> {
        let mut root = Recorder::new(self.config.ignore_list(), self.names());
        for entity in &self.model.entities {
            self.compare_entity(entity, &mut root)?;
        }
        let (logs, has_errors) = root.finish();
        let log = CompareLog::ok(
            CompareType::DbContext,
            &self.model.name,
            Some(self.model.name.clone()),
        )
        .with_sub_logs(logs);
        Ok(Stage1Output { log, has_errors })
    }

    fn compare_entity(&self, entity: &EntityType, parent: &mut Recorder<'a>) -> CompareResult<()> {
        if let EntityMapping::JsonColumn { column } = &entity.mapping {
            tracing::debug!(
                target: "schema_compare.stage1",
                entity = %entity.name,
                column = %column,
                "stored in owner's JSON column, skipped"
            );
            return Ok(());
        }

        let Some(target) = entity.target(self.model.default_schema.as_deref()) else {
            tracing::warn!(target: "schema_compare.stage1", entity = %entity.name, "entity is not mapped to a table or view");
            parent.not_checked(
                CompareType::Entity,
                &entity.name,
                CompareAttribute::NotMappedToDatabase,
            );
            return Ok(());
        };

        let table_name = target_table_name(target, self.database, self.names());
        let Some(table) = self.find_table(&table_name) else {
            parent.not_in_database(
                CompareType::Entity,
                &entity.name,
                CompareAttribute::TableName,
                &table_name,
            );
            return Ok(());
        };

        let sharing = self.row_sharing(entity, target.kind, &table_name)?;
        let mut children = parent.child();
        self.compare_columns(entity, target.kind, table, &sharing, &mut children)?;
        self.compare_foreign_keys(entity, target.kind, &table_name, table, &mut children)?;
        self.compare_indexes(entity, target.kind, table, &mut children)?;

        tracing::debug!(
            target: "schema_compare.stage1",
            entity = %entity.name,
            table = %table_name,
            "entity compared"
        );
        parent.push_node(
            CompareLog::ok(CompareType::Entity, &entity.name, Some(table_name)),
            children,
        );
        Ok(())
    }

    fn principal(&self, entity: &EntityType, name: &str) -> CompareResult<&'a EntityType> {
        self.model.entity(name).ok_or_else(|| {
            CompareError::invariant(format!(
                "entity '{}' refers to unknown entity '{name}'",
                entity.name
            ))
        })
    }

    /// Columns of `fk` when it links `entity` to a principal stored in the
    /// same row: same table and the foreign key columns are the principal
    /// key columns, in order.
    fn same_row_link(
        &self,
        entity: &EntityType,
        kind: TargetKind,
        table_name: &str,
        fk: &EntityForeignKey,
    ) -> CompareResult<Option<Vec<&'a str>>> {
        let principal = self.principal(entity, &fk.principal_entity)?;
        let Some(principal_target) = principal.target(self.model.default_schema.as_deref()) else {
            return Ok(None);
        };
        let principal_table = target_table_name(principal_target, self.database, self.names());
        if !self.names().eq(&principal_table, table_name) {
            return Ok(None);
        }

        let fk_columns = fk
            .properties
            .iter()
            .map(|p| entity.column_of(p, kind))
            .collect::<CompareResult<Vec<_>>>()?;
        let key_columns = fk
            .principal_key
            .iter()
            .map(|p| principal.column_of(p, principal_target.kind))
            .collect::<CompareResult<Vec<_>>>()?;

        let same = fk_columns.len() == key_columns.len()
            && fk_columns
                .iter()
                .zip(&key_columns)
                .all(|(a, b)| self.names().eq(a, b));
        Ok(same.then_some(key_columns))
    }

    fn row_sharing(
        &self,
        entity: &EntityType,
        kind: TargetKind,
        table_name: &str,
    ) -> CompareResult<RowSharing> {
        let names = self.names();

        if let Some(base_name) = &entity.base_type {
            let mut exempt = HashSet::new();
            let mut base = Some(self.principal(entity, base_name)?);
            let mut seen = HashSet::new();
            let mut shares_table = false;
            while let Some(b) = base {
                if !seen.insert(b.name.as_str()) {
                    break;
                }
                if let Some(name) = entity_table_name(b, self.model, self.database, names) {
                    shares_table |= names.eq(&name, table_name);
                }
                for prop in &b.properties {
                    if let Some(col) = prop.column_name_for(kind) {
                        exempt.insert(names.key(col).into_owned());
                    }
                }
                base = match &b.base_type {
                    Some(next) => Some(self.principal(b, next)?),
                    None => None,
                };
            }
            if shares_table {
                return Ok(RowSharing {
                    exempt: Some(exempt),
                    skip_key_properties: false,
                });
            }
        }

        for fk in &entity.foreign_keys {
            if let Some(columns) = self.same_row_link(entity, kind, table_name, fk)? {
                let exempt = (!fk.required_dependent)
                    .then(|| columns.iter().map(|c| names.key(c).into_owned()).collect());
                return Ok(RowSharing {
                    exempt,
                    skip_key_properties: true,
                });
            }
        }

        Ok(RowSharing::default())
    }

    fn compare_columns(
        &self,
        entity: &EntityType,
        kind: TargetKind,
        table: &DatabaseTable,
        sharing: &RowSharing,
        rec: &mut Recorder<'a>,
    ) -> CompareResult<()> {
        let names = self.names();
        let columns: HashMap<String, &DatabaseColumn> = table
            .columns
            .iter()
            .map(|c| (names.key(&c.name).into_owned(), c))
            .collect();

        let key = entity
            .primary_key
            .as_ref()
            .filter(|_| kind == TargetKind::Table && !table.kind.is_view());
        let physical_key = table.primary_key.as_ref();
        let mut key_error = false;

        if let Some(key) = key {
            let found = physical_key.map_or(NO_PRIMARY_KEY, |pk| pk.name.as_str());
            key_error |= rec.check_different(
                CompareType::PrimaryKey,
                &key.name,
                CompareAttribute::ConstraintName,
                Some(&key.name),
                Some(found),
            );
        }

        for prop in &entity.properties {
            let Some(column_name) = prop.column_name_for(kind) else {
                continue;
            };
            let is_key = entity.is_key(&prop.name);
            if is_key && sharing.skip_key_properties {
                continue;
            }
            let Some(column) = columns.get(names.key(column_name).as_ref()) else {
                rec.not_in_database(
                    CompareType::Property,
                    &prop.name,
                    CompareAttribute::ColumnName,
                    column_name,
                );
                continue;
            };

            let forced_nullable = sharing
                .exempt
                .as_ref()
                .is_some_and(|exempt| !exempt.contains(names.key(column_name).as_ref()));
            let mut error = self.compare_property(prop, is_key, forced_nullable, column, rec);

            if let Some(key) = key {
                let in_physical_key = physical_key
                    .is_some_and(|pk| pk.columns.iter().any(|c| names.eq(c, column_name)));
                if is_key && !in_physical_key {
                    if rec.not_in_database(
                        CompareType::PrimaryKey,
                        &key.name,
                        CompareAttribute::ColumnName,
                        column_name,
                    ) {
                        key_error = true;
                        error = true;
                    }
                } else if !is_key && in_physical_key {
                    let pk_name = physical_key.map_or(NO_PRIMARY_KEY, |pk| pk.name.as_str());
                    key_error |= rec.extra_in_database(
                        CompareType::PrimaryKey,
                        pk_name,
                        CompareAttribute::ColumnName,
                        Some(column_name),
                    );
                }
            }

            if !error {
                rec.ok(CompareType::Property, &prop.name, Some(column_name));
            }
        }

        if let Some(key) = key
            && !key_error
        {
            rec.ok(CompareType::PrimaryKey, &key.name, Some(&key.name));
        }
        Ok(())
    }

    /// Compare every dimension of one property, one record per mismatch.
    fn compare_property(
        &self,
        prop: &EntityProperty,
        is_key: bool,
        forced_nullable: bool,
        column: &DatabaseColumn,
        rec: &mut Recorder<'a>,
    ) -> bool {
        let name = prop.name.as_str();
        let kind = CompareType::Property;

        let mut error = rec.check_different(
            kind,
            name,
            CompareAttribute::ColumnType,
            Some(&prop.store_type),
            Some(&column.store_type),
        );
        error |= rec.check_different(
            kind,
            name,
            CompareAttribute::Nullability,
            Some(nullable_as_str(prop.nullable || forced_nullable)),
            Some(nullable_as_str(column.nullable)),
        );
        error |= rec.check_different(
            kind,
            name,
            CompareAttribute::ComputedColumnSql,
            normalize_sql(prop.computed_sql.as_deref()),
            normalize_sql(column.computed_sql.as_deref()),
        );
        if prop.computed_sql.is_some() {
            error |= rec.check_different(
                kind,
                name,
                CompareAttribute::PersistentComputedColumn,
                Some(&prop.is_stored.unwrap_or(false).to_string()),
                Some(&column.is_stored.unwrap_or(false).to_string()),
            );
        }

        let literal = prop
            .default_value
            .as_ref()
            .map(|v| sql_literal(self.model.engine, v));
        let expected_default = normalize_sql(literal.as_deref().or(prop.default_sql.as_deref()));
        error |= rec.check_different(
            kind,
            name,
            CompareAttribute::DefaultValueSql,
            expected_default,
            normalize_sql(column.default_sql.as_deref()),
        );

        let found_generated = infer_value_generated(
            column.value_generated,
            column.computed_sql.as_deref(),
            column.default_sql.as_deref(),
        );
        // Client-generated keys (GUIDs and the like) are OnAdd in the model but plain columns.
        let client_generated_key = found_generated == ValueGenerated::Never
            && prop.value_generated == ValueGenerated::OnAdd
            && is_key
            && !prop.clr_type.is_integer();
        if !client_generated_key {
            error |= rec.check_different(
                kind,
                name,
                CompareAttribute::ValueGenerated,
                Some(&prop.value_generated.to_string()),
                Some(&found_generated.to_string()),
            );
        }
        error
    }

    fn compare_foreign_keys(
        &self,
        entity: &EntityType,
        kind: TargetKind,
        table_name: &str,
        table: &DatabaseTable,
        rec: &mut Recorder<'a>,
    ) -> CompareResult<()> {
        let names = self.names();
        let by_name: HashMap<String, &DatabaseForeignKey> = table
            .foreign_keys
            .iter()
            .map(|fk| (names.key(&fk.name).into_owned(), fk))
            .collect();

        for fk in &entity.foreign_keys {
            let Some(constraint) = fk.constraint_name.as_deref() else {
                continue;
            };
            if self.same_row_link(entity, kind, table_name, fk)?.is_some() {
                continue;
            }
            let Some(db_fk) = by_name.get(names.key(constraint).as_ref()) else {
                rec.not_in_database(
                    CompareType::ForeignKey,
                    constraint,
                    CompareAttribute::ConstraintName,
                    constraint,
                );
                continue;
            };

            let mut error = false;
            for prop in &fk.properties {
                let column = entity.column_of(prop, kind)?;
                if !db_fk.columns.iter().any(|c| names.eq(c, column)) {
                    error |= rec.not_in_database(
                        CompareType::ForeignKey,
                        constraint,
                        CompareAttribute::NotSet,
                        column,
                    );
                }
            }
            error |= rec.check_different(
                CompareType::ForeignKey,
                constraint,
                CompareAttribute::DeleteBehavior,
                Some(&fk.delete_behavior.to_string()),
                Some(&delete_behavior_from_action(db_fk.on_delete, fk.delete_behavior)),
            );
            if !error {
                rec.ok(CompareType::ForeignKey, constraint, Some(constraint));
            }
        }
        Ok(())
    }

    fn compare_indexes(
        &self,
        entity: &EntityType,
        kind: TargetKind,
        table: &DatabaseTable,
        rec: &mut Recorder<'a>,
    ) -> CompareResult<()> {
        let names = self.names();
        let by_name: HashMap<String, &DatabaseIndex> = table
            .indexes
            .iter()
            .chain(&table.unique_constraints)
            .map(|ix| (names.key(&ix.name).into_owned(), ix))
            .collect();

        for index in &entity.indexes {
            let columns = index
                .properties
                .iter()
                .map(|p| entity.column_of(p, kind))
                .collect::<CompareResult<Vec<_>>>()?;
            let record_name = columns.join(",");

            let Some(db_index) = by_name.get(names.key(&index.database_name).as_ref()) else {
                rec.not_in_database(
                    CompareType::Index,
                    &record_name,
                    CompareAttribute::IndexConstraintName,
                    &index.database_name,
                );
                continue;
            };

            let mut error = false;
            for column in &columns {
                if !db_index.columns.iter().any(|c| names.eq(c, column)) {
                    error |= rec.not_in_database(
                        CompareType::Index,
                        &record_name,
                        CompareAttribute::NotSet,
                        column,
                    );
                }
            }
            error |= rec.check_different(
                CompareType::Index,
                &record_name,
                CompareAttribute::Unique,
                Some(&index.unique.to_string()),
                Some(&db_index.unique.to_string()),
            );
            if !error {
                rec.ok(CompareType::Index, &record_name, Some(&index.database_name));
            }
        }
        Ok(())
    }
}
