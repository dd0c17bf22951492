//! SQL literals for application-side default values, written the way each
//! engine's migrations write them into the column default.

use crate::model::DefaultValue;
use crate::provider::DatabaseEngine;

/// Render `value` as the literal `engine` stores as a column default.
pub fn sql_literal(engine: DatabaseEngine, value: &DefaultValue) -> String {
    match engine {
        DatabaseEngine::SqlServer => sql_server_literal(value),
        DatabaseEngine::Postgres => postgres_literal(value),
        DatabaseEngine::Sqlite => sqlite_literal(value),
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn sql_server_literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Bool(b) => format!("CAST({} AS bit)", u8::from(*b)),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => format!("{f}E0"),
        DefaultValue::Decimal(d) => d.clone(),
        DefaultValue::Text(s) => format!("N{}", quote(s)),
        DefaultValue::DateTime(s) | DefaultValue::Guid(s) => quote(s),
    }
}

fn postgres_literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Bool(true) => "TRUE".to_string(),
        DefaultValue::Bool(false) => "FALSE".to_string(),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => format!("{f:?}"),
        DefaultValue::Decimal(d) => d.clone(),
        DefaultValue::Text(s) => quote(s),
        DefaultValue::DateTime(s) => format!("TIMESTAMP {}", quote(s)),
        DefaultValue::Guid(s) => format!("{}::uuid", quote(s)),
    }
}

fn sqlite_literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Bool(b) => u8::from(*b).to_string(),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => format!("{f:?}"),
        DefaultValue::Decimal(d) => quote(d),
        DefaultValue::Text(s) | DefaultValue::DateTime(s) | DefaultValue::Guid(s) => quote(s),
    }
}
