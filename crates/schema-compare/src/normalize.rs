//! Turn engine-specific encodings into strings that compare directly.

use crate::model::{DeleteBehavior, ReferentialAction, ValueGenerated};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Shown as the found primary-key name when a table has none.
pub const NO_PRIMARY_KEY: &str = "- no primary key -";

/// How names (and compared values) are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    /// Ordinal, case-sensitive.
    #[default]
    Exact,
    IgnoreCase,
}

impl NameMatch {
    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            NameMatch::Exact => a == b,
            NameMatch::IgnoreCase => a == b || a.to_lowercase() == b.to_lowercase(),
        }
    }

    /// Lookup key for maps indexed under this policy.
    pub fn key<'a>(self, name: &'a str) -> Cow<'a, str> {
        match self {
            NameMatch::Exact => Cow::Borrowed(name),
            NameMatch::IgnoreCase => Cow::Owned(name.to_lowercase()),
        }
    }

    /// Compare two optional values, also accepting a match once all spaces are removed.
    pub fn values_match(self, expected: Option<&str>, found: Option<&str>) -> bool {
        match (expected, found) {
            (None, None) => true,
            (Some(e), Some(f)) => self.eq(e, f) || self.eq(&remove_spaces(e), &remove_spaces(f)),
            _ => false,
        }
    }
}

fn remove_spaces(value: &str) -> String {
    value.chars().filter(|c| *c != ' ').collect()
}

/// `schema.table`, or just `table` without a schema.
pub fn schema_table(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) if !schema.is_empty() => format!("{schema}.{table}"),
        _ => table.to_string(),
    }
}

pub fn nullable_as_str(nullable: bool) -> &'static str {
    if nullable { "NULL" } else { "NOT NULL" }
}

/// Strip redundant outer brackets: `((1))` becomes `1`.
///
/// Only brackets wrapping the whole text are removed, so `(a) + (b)` is kept.
pub fn remove_unnecessary_brackets(sql: &str) -> &str {
    let mut sql = sql;
    while sql.len() > 1 && sql.starts_with('(') && sql.ends_with(')') && wraps_whole(sql) {
        sql = &sql[1..sql.len() - 1];
    }
    sql
}

fn wraps_whole(sql: &str) -> bool {
    let mut depth = 0usize;
    for (i, c) in sql.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != sql.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

/// Normalize an optional SQL fragment for comparison. Nothing left means no SQL.
pub fn normalize_sql(sql: Option<&str>) -> Option<&str> {
    sql.map(remove_unnecessary_brackets).filter(|s| !s.trim().is_empty())
}

/// Infer how a physical column is generated.
///
/// A default wins over a computed expression, which wins over the raw flag.
pub fn infer_value_generated(
    raw: Option<ValueGenerated>,
    computed_sql: Option<&str>,
    default_sql: Option<&str>,
) -> ValueGenerated {
    if default_sql.is_some() {
        ValueGenerated::OnAdd
    } else if computed_sql.is_some() {
        ValueGenerated::OnAddOrUpdate
    } else {
        raw.unwrap_or_default()
    }
}

/// Express a database `ON DELETE` action as the delete behavior it stands for.
///
/// `NO ACTION` in the database is what both `ClientSetNull` and `Restrict`
/// produce, so it reads as whichever of those the model declares.
pub fn delete_behavior_from_action(
    action: Option<ReferentialAction>,
    declared: DeleteBehavior,
) -> String {
    let no_action = matches!(action, None | Some(ReferentialAction::NoAction));
    if no_action && matches!(declared, DeleteBehavior::ClientSetNull | DeleteBehavior::Restrict) {
        return declared.to_string();
    }
    action.unwrap_or(ReferentialAction::NoAction).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_table() {
        assert_eq!(schema_table(None, "Books"), "Books");
        assert_eq!(schema_table(Some(""), "Books"), "Books");
        assert_eq!(schema_table(Some("sales"), "Books"), "sales.Books");
    }

    #[test]
    fn test_remove_unnecessary_brackets() {
        assert_eq!(remove_unnecessary_brackets("((1))"), "1");
        assert_eq!(remove_unnecessary_brackets("(N'Hello!')"), "N'Hello!'");
        assert_eq!(remove_unnecessary_brackets("getdate()"), "getdate()");
        assert_eq!(remove_unnecessary_brackets("(a) + (b)"), "(a) + (b)");
        assert_eq!(remove_unnecessary_brackets("(([A]+[B]))"), "[A]+[B]");
        assert_eq!(remove_unnecessary_brackets("()"), "");
    }

    #[test]
    fn test_normalize_sql() {
        assert_eq!(normalize_sql(Some("((0))")), Some("0"));
        assert_eq!(normalize_sql(Some("")), None);
        assert_eq!(normalize_sql(Some("(())")), None);
        assert_eq!(normalize_sql(None), None);
    }

    #[test]
    fn test_nullable_as_str() {
        assert_eq!(nullable_as_str(true), "NULL");
        assert_eq!(nullable_as_str(false), "NOT NULL");
    }

    #[test]
    fn test_infer_value_generated_priority() {
        use ValueGenerated::*;
        assert_eq!(infer_value_generated(None, None, None), Never);
        assert_eq!(infer_value_generated(Some(OnAdd), None, None), OnAdd);
        assert_eq!(infer_value_generated(None, Some("[A]+1"), None), OnAddOrUpdate);
        assert_eq!(infer_value_generated(Some(Never), Some("[A]+1"), Some("1")), OnAdd);
        assert_eq!(infer_value_generated(Some(OnAdd), Some("[A]+1"), None), OnAddOrUpdate);
    }

    #[test]
    fn test_delete_behavior_from_action() {
        use ReferentialAction as RA;
        assert_eq!(
            delete_behavior_from_action(Some(RA::NoAction), DeleteBehavior::ClientSetNull),
            "ClientSetNull"
        );
        assert_eq!(
            delete_behavior_from_action(Some(RA::NoAction), DeleteBehavior::Restrict),
            "Restrict"
        );
        assert_eq!(
            delete_behavior_from_action(Some(RA::NoAction), DeleteBehavior::Cascade),
            "NoAction"
        );
        assert_eq!(
            delete_behavior_from_action(Some(RA::Cascade), DeleteBehavior::Cascade),
            "Cascade"
        );
        assert_eq!(
            delete_behavior_from_action(None, DeleteBehavior::NoAction),
            "NoAction"
        );
    }

    #[test]
    fn test_values_match() {
        let exact = NameMatch::Exact;
        assert!(exact.values_match(None, None));
        assert!(!exact.values_match(Some(""), None));
        assert!(exact.values_match(Some("decimal(9, 2)"), Some("decimal(9,2)")));
        assert!(!exact.values_match(Some("nvarchar(MAX)"), Some("nvarchar(max)")));
        assert!(NameMatch::IgnoreCase.values_match(Some("nvarchar(MAX)"), Some("nvarchar(max)")));
    }
}
