use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use schema_compare::{
    ClrType, CompareConfig, CompareLog, DatabaseColumn, DatabaseEngine, DatabaseIndex,
    DatabaseModel, DatabaseTable, EntityIndex, EntityProperty, EntityType, IgnoreList,
    LogicalModel, SchemaComparer, ValueGenerated,
};

const COLUMNS: usize = 12;

fn make_model(tables: usize) -> LogicalModel {
    (0..tables).fold(
        LogicalModel::new("BenchContext", DatabaseEngine::SqlServer).with_default_schema("dbo"),
        |model, t| {
            let entity = (0..COLUMNS).fold(
                EntityType::table(format!("Entity{t}"), format!("Table{t}"))
                    .with_property(
                        EntityProperty::new("Id", "int")
                            .clr(ClrType::Int32)
                            .generated(ValueGenerated::OnAdd),
                    )
                    .with_key(format!("PK_Table{t}"), &["Id"])
                    .with_index(EntityIndex::new(format!("IX_Table{t}_Col0"), &["Col0"])),
                |entity, c| entity.with_property(EntityProperty::new(format!("Col{c}"), "nvarchar(100)").nullable()),
            );
            model.with_entity(entity)
        },
    )
}

fn make_database(tables: usize) -> DatabaseModel {
    (0..tables).fold(
        DatabaseModel::new("BenchDb").with_default_schema("dbo"),
        |db, t| {
            let table = (0..COLUMNS).fold(
                DatabaseTable::table(Some("dbo"), format!("Table{t}"))
                    .with_column(DatabaseColumn::new("Id", "int").generated(ValueGenerated::OnAdd))
                    .with_primary_key(format!("PK_Table{t}"), &["Id"])
                    .with_index(DatabaseIndex::new(format!("IX_Table{t}_Col0"), &["Col0"])),
                |table, c| {
                    // every third column drifts so both clean and error paths run
                    let store_type = if c % 3 == 0 { "nvarchar(50)" } else { "nvarchar(100)" };
                    table.with_column(DatabaseColumn::new(format!("Col{c}"), store_type).nullable())
                },
            );
            db.with_table(table)
        },
    )
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare/full");

    for tables in [10, 100, 500] {
        let model = make_model(tables);
        let database = make_database(tables);
        group.bench_with_input(BenchmarkId::from_parameter(tables), &tables, |b, _| {
            b.iter(|| {
                let mut comparer =
                    SchemaComparer::new(CompareConfig::new().always_run_stage2(true));
                black_box(comparer.compare(&[&model], &database).ok());
            });
        });
    }

    group.finish();
}

fn bench_compare_with_ignores(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare/ignored");

    for tables in [10, 100] {
        let model = make_model(tables);
        let database = make_database(tables);

        let mut first = SchemaComparer::new(CompareConfig::new());
        let _ = first.compare(&[&model], &database);
        let ignore_text = first.errors_text();

        group.bench_with_input(BenchmarkId::from_parameter(tables), &tables, |b, _| {
            b.iter(|| {
                let mut config = CompareConfig::new();
                let _ = config.ignore_these_errors(&ignore_text);
                let mut comparer = SchemaComparer::new(config);
                black_box(comparer.compare(&[&model], &database).ok());
            });
        });
    }

    group.finish();
}

fn bench_parse_lines(c: &mut Criterion) {
    let lines: Vec<String> = (0..200)
        .map(|i| {
            format!(
                "DIFFERENT: Entity{i}->Property 'Col{i}', column type. Expected = nvarchar(100), found = nvarchar(50)"
            )
        })
        .collect();
    let text = lines.join("\n");

    c.bench_function("log/parse_line", |b| {
        b.iter(|| black_box(CompareLog::parse(&lines[0]).ok()));
    });
    c.bench_function("ignore/parse_200_lines", |b| {
        b.iter(|| black_box(IgnoreList::parse_lines(&text).ok()));
    });
}

criterion_group!(benches, bench_compare, bench_compare_with_ignores, bench_parse_lines);
criterion_main!(benches);
