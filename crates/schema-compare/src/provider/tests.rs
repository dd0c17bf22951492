use super::*;
use std::path::PathBuf;

fn books_db() -> DatabaseModel {
    DatabaseModel::new("BookDb")
        .with_default_schema("dbo")
        .with_table(DatabaseTable::table(Some("dbo"), "Books"))
        .with_table(DatabaseTable::table(Some("dbo"), "Authors"))
        .with_table(DatabaseTable::table(Some("audit"), "Changes"))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("schema-compare-{}", std::process::id()))
        .join(name)
}

struct FixedFactory(DatabaseModel);

impl DatabaseModelFactory for FixedFactory {
    fn create(&self, _connection: &str, options: &FactoryOptions) -> CompareResult<DatabaseModel> {
        Ok(options.apply(self.0.clone()))
    }
}

#[test]
fn test_engine_from_name() {
    assert_eq!(DatabaseEngine::from_name("sqlserver").unwrap(), DatabaseEngine::SqlServer);
    assert_eq!(DatabaseEngine::from_name("SQL_Server").unwrap(), DatabaseEngine::SqlServer);
    assert_eq!(DatabaseEngine::from_name("PostgreSQL").unwrap(), DatabaseEngine::Postgres);
    assert_eq!(DatabaseEngine::from_name(" sqlite ").unwrap(), DatabaseEngine::Sqlite);
    assert!(matches!(
        DatabaseEngine::from_name("oracle"),
        Err(CompareError::UnsupportedEngine(name)) if name == "oracle"
    ));
    assert_eq!(DatabaseEngine::Postgres.to_string(), "postgres");
}

#[test]
fn test_factory_options_filter() {
    let db = books_db();

    let all = FactoryOptions::new().apply(db.clone());
    assert_eq!(all.tables.len(), 3);

    let audit = FactoryOptions::new().schemas(&["AUDIT"]).apply(db.clone());
    assert_eq!(audit.tables.len(), 1);
    assert_eq!(audit.tables[0].name, "Changes");

    let named = FactoryOptions::new()
        .tables(&["books", "audit.Changes"])
        .apply(db.clone());
    let names: Vec<_> = named.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Books", "Changes"]);

    let none = FactoryOptions::new()
        .schemas(&["dbo"])
        .tables(&["Changes"])
        .apply(db);
    assert!(none.tables.is_empty());
}

#[test]
fn test_factory_options_default_schema() {
    let table = DatabaseTable::table(None, "Books");
    let options = FactoryOptions::new().schemas(&["dbo"]);
    assert!(options.includes(&table, Some("dbo")));
    assert!(!options.includes(&table, None));
}

#[test]
fn test_registry_lookup() {
    let registry = ProviderRegistry::new().with(DatabaseEngine::SqlServer, FixedFactory(books_db()));

    let model = registry
        .create_model(DatabaseEngine::SqlServer, "ignored", &FactoryOptions::new().schemas(&["dbo"]))
        .unwrap();
    assert_eq!(model.tables.len(), 2);

    let err = registry
        .create_model(DatabaseEngine::Postgres, "ignored", &FactoryOptions::new())
        .unwrap_err();
    assert!(matches!(err, CompareError::UnsupportedEngine(name) if name == "postgres"));
    assert!(format!("{registry:?}").contains("SqlServer"));
}

#[test]
fn test_snapshot_write_read() {
    let path = temp_path("roundtrip/schema.json");
    let snapshot = SchemaSnapshot::new(DatabaseEngine::SqlServer, books_db());
    snapshot.write(&path).unwrap();

    let read = SchemaSnapshot::read(&path).unwrap();
    assert_eq!(read.version, SchemaSnapshot::VERSION);
    assert_eq!(read.engine, DatabaseEngine::SqlServer);
    assert_eq!(read.model, books_db());
    assert!(!path.with_extension("json.tmp").exists());

    let factory = SnapshotFactory::new(DatabaseEngine::SqlServer);
    let model = factory
        .create(path.to_str().unwrap(), &FactoryOptions::new().tables(&["Authors"]))
        .unwrap();
    assert_eq!(model.tables.len(), 1);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_snapshot_engine_mismatch() {
    let path = temp_path("mismatch/schema.json");
    SchemaSnapshot::new(DatabaseEngine::Postgres, books_db())
        .write(&path)
        .unwrap();

    let err = SnapshotFactory::new(DatabaseEngine::SqlServer)
        .create(path.to_str().unwrap(), &FactoryOptions::new())
        .unwrap_err();
    assert!(matches!(err, CompareError::Provider(_)));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_snapshot_version_mismatch() {
    let path = temp_path("version/schema.json");
    let mut snapshot = SchemaSnapshot::new(DatabaseEngine::Sqlite, books_db());
    snapshot.version = SchemaSnapshot::VERSION + 1;
    snapshot.write(&path).unwrap();

    let err = SnapshotFactory::new(DatabaseEngine::Sqlite)
        .create(path.to_str().unwrap(), &FactoryOptions::new())
        .unwrap_err();
    assert!(matches!(err, CompareError::Provider(msg) if msg.contains("version")));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_snapshot_missing_file() {
    let err = SchemaSnapshot::read(&temp_path("does-not-exist.json")).unwrap_err();
    assert!(matches!(err, CompareError::Other(_)));
}
