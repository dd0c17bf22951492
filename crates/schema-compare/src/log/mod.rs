//! Comparison records and their canonical text rendering.
//!
//! A [`CompareLog`] is one node of the result tree: what was compared, the
//! verdict and, for differences, the expected and found values. Its
//! `Display` output is a stable single-line format that [`CompareLog::parse`]
//! reads back, which is how users paste report lines into an ignore list.

mod text;


pub use text::NULL_TEXT;
pub(crate) use text::{Segment, decode_line};

use heck::ToTitleCase;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

macro_rules! log_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The variant name, e.g. `NotInDatabase`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            /// Match rendered text back to a variant, ignoring case and spaces.
            pub fn from_words(text: &str) -> Option<Self> {
                let wanted: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(&wanted))
            }
        }
    };
}

log_enum! {
    /// What is being compared.
    CompareType {
        NoSet,
        MatchAnything,
        DbContext,
        Entity,
        Property,
        Database,
        Table,
        Column,
        PrimaryKey,
        ForeignKey,
        Index,
    }
}

log_enum! {
    /// Verdict of a comparison. Ordered: anything `<= Ok` cannot be suppressed.
    CompareState {
        Debug,
        Ok,
        NotChecked,
        Different,
        NotInDatabase,
        ExtraInDatabase,
    }
}

log_enum! {
    /// The dimension of the compared item that a record talks about.
    CompareAttribute {
        NotSet,
        MatchAnything,
        ColumnName,
        ColumnType,
        Nullability,
        DefaultValueSql,
        ComputedColumnSql,
        PersistentComputedColumn,
        ValueGenerated,
        TableName,
        PrimaryKey,
        ConstraintName,
        IndexConstraintName,
        Unique,
        DeleteBehavior,
        NotMappedToDatabase,
    }
}

impl fmt::Display for CompareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CompareState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_title_case().to_uppercase())
    }
}

impl fmt::Display for CompareAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_title_case().to_lowercase())
    }
}

/// One comparison outcome, possibly with child comparisons.
///
/// Records are built once by the comparers and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareLog {
    kind: CompareType,
    state: CompareState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    attribute: CompareAttribute,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    found: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_logs: Vec<CompareLog>,
}

impl CompareLog {
    pub fn new(
        kind: CompareType,
        state: CompareState,
        name: Option<String>,
        attribute: CompareAttribute,
        expected: Option<String>,
        found: Option<String>,
    ) -> Self {
        Self {
            kind,
            state,
            name,
            attribute,
            expected: present(expected),
            found: present(found),
            sub_logs: Vec::new(),
        }
    }

    /// An `Ok` record with no attribute.
    pub fn ok(kind: CompareType, name: impl Into<String>, expected: Option<String>) -> Self {
        Self::new(
            kind,
            CompareState::Ok,
            Some(name.into()),
            CompareAttribute::NotSet,
            expected,
            None,
        )
    }

    /// Attach the child records of this node.
    pub fn with_sub_logs(mut self, sub_logs: Vec<CompareLog>) -> Self {
        self.sub_logs = sub_logs;
        self
    }

    pub fn kind(&self) -> CompareType {
        self.kind
    }

    pub fn state(&self) -> CompareState {
        self.state
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn attribute(&self) -> CompareAttribute {
        self.attribute
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn found(&self) -> Option<&str> {
        self.found.as_deref()
    }

    pub fn sub_logs(&self) -> &[CompareLog] {
        &self.sub_logs
    }

    pub fn is_ok(&self) -> bool {
        self.state == CompareState::Ok
    }

    /// Render with `prefix` inserted between the verdict and the kind.
    ///
    /// The prefix is the ancestor chain used by [`all_errors`], e.g. `"Book->"`.
    pub fn render_with_prefix(&self, prefix: &str) -> String {
        let mut out = format!(
            "{}: {}{} '{}'",
            self.state,
            prefix,
            self.kind,
            self.name.as_deref().unwrap_or("")
        );
        if self.attribute != CompareAttribute::NotSet {
            out.push_str(", ");
            out.push_str(&self.attribute.to_string());
        }
        if self.state == CompareState::Ok {
            return out;
        }

        let mut sep = ". F";
        if self.state != CompareState::ExtraInDatabase {
            out.push_str(". Expected = ");
            out.push_str(self.expected.as_deref().unwrap_or(NULL_TEXT));
            sep = ", f";
        }
        if self.found.is_some() || self.state == CompareState::Different {
            out.push_str(sep);
            out.push_str("ound = ");
            out.push_str(self.found.as_deref().unwrap_or(NULL_TEXT));
        }
        out
    }
}

/// Empty text and the null token render the same as no value, so they are
/// stored as no value.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != NULL_TEXT)
}

impl fmt::Display for CompareLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with_prefix(""))
    }
}

/// Flatten a log forest into one line per non-`Ok` record.
///
/// Lines are prefixed with the names of their ancestors joined by `->`. The
/// root names only take part when the roots have more than one distinct
/// kind, so a report for a single model starts at the entity name.
pub fn all_errors(logs: &[CompareLog]) -> Vec<String> {
    let root_kinds: HashSet<CompareType> = logs.iter().map(|l| l.kind).collect();
    let mut out = Vec::new();
    let mut parents = Vec::new();
    collect_errors(logs, root_kinds.len() > 1, &mut parents, &mut out);
    out
}

fn collect_errors<'a>(
    logs: &'a [CompareLog],
    push_names: bool,
    parents: &mut Vec<&'a str>,
    out: &mut Vec<String>,
) {
    for log in logs {
        if !log.is_ok() {
            let prefix = if parents.is_empty() {
                String::new()
            } else {
                format!("{}->", parents.join("->"))
            };
            out.push(log.render_with_prefix(&prefix));
        }
        if log.sub_logs.is_empty() {
            continue;
        }
        if push_names {
            parents.push(log.name.as_deref().unwrap_or(""));
        }
        collect_errors(&log.sub_logs, true, parents, out);
        if push_names {
            parents.pop();
        }
    }
}

/// Every record of the forest, `Ok` ones included, indented three spaces per level.
pub fn all_results_indented(logs: &[CompareLog]) -> Vec<String> {
    let mut out = Vec::new();
    collect_indented(logs, "", &mut out);
    out
}

fn collect_indented(logs: &[CompareLog], indent: &str, out: &mut Vec<String>) {
    for log in logs {
        out.push(format!("{indent}{log}"));
        if !log.sub_logs.is_empty() {
            collect_indented(&log.sub_logs, &format!("{indent}   "), out);
        }
    }
}
