//! Comparison settings.

use crate::error::{CompareError, CompareResult};
use crate::ignore::{IgnoreList, IgnoreRule};
use crate::normalize::NameMatch;
use serde::Deserialize;
use std::path::Path;

/// Which physical tables take part in a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TableFilter {
    /// Only tables some entity maps to. Unmapped tables are dropped before comparing.
    #[default]
    MappedOnly,
    /// Every table, so Stage 2 can report tables no entity uses.
    CheckAll,
    /// Every table except these `table` / `schema.table` names.
    Ignore(Vec<String>),
}

impl TableFilter {
    /// Interpret a comma-separated setting: `None` is mapped-only, an empty
    /// string checks all tables, anything else lists tables to ignore.
    pub fn from_comma_delimited(value: Option<&str>) -> Self {
        match value {
            None => TableFilter::MappedOnly,
            Some(v) if v.trim().is_empty() => TableFilter::CheckAll,
            Some(v) => TableFilter::Ignore(
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}

/// Configuration for [`SchemaComparer`](crate::SchemaComparer).
#[derive(Debug, Clone, Default)]
pub struct CompareConfig {
    /// Run Stage 2 even when Stage 1 found errors.
    pub always_run_stage2: bool,
    pub tables: TableFilter,
    pub name_match: NameMatch,
    ignore: IgnoreList,
}

impl CompareConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn always_run_stage2(mut self, always: bool) -> Self {
        self.always_run_stage2 = always;
        self
    }

    /// Set the table filter from its comma-delimited form (see [`TableFilter::from_comma_delimited`]).
    pub fn tables_to_ignore(mut self, value: Option<&str>) -> Self {
        self.tables = TableFilter::from_comma_delimited(value);
        self
    }

    pub fn table_filter(mut self, filter: TableFilter) -> Self {
        self.tables = filter;
        self
    }

    pub fn name_match(mut self, name_match: NameMatch) -> Self {
        self.name_match = name_match;
        self
    }

    pub fn ignore_rule(mut self, rule: IgnoreRule) -> Self {
        self.ignore.push(rule);
        self
    }

    pub fn add_ignore_rule(&mut self, rule: IgnoreRule) {
        self.ignore.push(rule);
    }

    /// Suppress every difference listed in `text`, one report line per line.
    pub fn ignore_these_errors(&mut self, text: &str) -> CompareResult<()> {
        self.ignore.extend_from_lines(text)
    }

    pub fn ignore_list(&self) -> &IgnoreList {
        &self.ignore
    }

    /// Parse a TOML configuration.
    pub fn from_toml_str(raw: &str) -> CompareResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| CompareError::Config(format!("failed to parse config: {e}")))?;
        file.into_config()
    }

    /// Read a TOML configuration file.
    pub fn load(path: &Path) -> CompareResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CompareError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }
}

/// On-disk form of [`CompareConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    always_run_stage2: bool,
    tables_to_ignore: Option<String>,
    #[serde(default)]
    case_insensitive: bool,
    #[serde(default)]
    ignore_errors: Vec<String>,
}

impl ConfigFile {
    fn into_config(self) -> CompareResult<CompareConfig> {
        let mut config = CompareConfig::new()
            .always_run_stage2(self.always_run_stage2)
            .tables_to_ignore(self.tables_to_ignore.as_deref())
            .name_match(if self.case_insensitive {
                NameMatch::IgnoreCase
            } else {
                NameMatch::Exact
            });
        for line in &self.ignore_errors {
            config.ignore_these_errors(line)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{CompareLog, CompareState, CompareType};

    #[test]
    fn test_table_filter_from_comma_delimited() {
        assert_eq!(TableFilter::from_comma_delimited(None), TableFilter::MappedOnly);
        assert_eq!(TableFilter::from_comma_delimited(Some("")), TableFilter::CheckAll);
        assert_eq!(
            TableFilter::from_comma_delimited(Some("Audit, sales.Orders,")),
            TableFilter::Ignore(vec!["Audit".into(), "sales.Orders".into()])
        );
    }

    #[test]
    fn test_from_toml_str() {
        let config = CompareConfig::from_toml_str(
            r#"
always_run_stage2 = true
tables_to_ignore = ""
case_insensitive = true
ignore_errors = [
  "NOT IN DATABASE: Entity 'Book', table name. Expected = Books",
]
"#,
        )
        .unwrap();

        assert!(config.always_run_stage2);
        assert_eq!(config.tables, TableFilter::CheckAll);
        assert_eq!(config.name_match, NameMatch::IgnoreCase);
        assert_eq!(config.ignore_list().len(), 1);

        let log = CompareLog::parse("NOT IN DATABASE: Entity 'Book', table name. Expected = Books")
            .unwrap();
        assert_eq!(log.kind(), CompareType::Entity);
        assert_eq!(log.state(), CompareState::NotInDatabase);
        assert!(config.ignore_list().should_ignore(&log));
    }

    #[test]
    fn test_from_toml_str_defaults() {
        let config = CompareConfig::from_toml_str("").unwrap();
        assert!(!config.always_run_stage2);
        assert_eq!(config.tables, TableFilter::MappedOnly);
        assert!(config.ignore_list().is_empty());
    }

    #[test]
    fn test_from_toml_str_rejects_ok_rule() {
        let err = CompareConfig::from_toml_str(r#"ignore_errors = ["OK: Entity 'Book'"]"#)
            .unwrap_err();
        assert!(matches!(err, CompareError::Config(_)));
    }
}
