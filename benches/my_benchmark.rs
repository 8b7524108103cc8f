use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flatdb::{
    ColumnDef, CompareOp, Condition, DataType, ExecutionEngine, Row, SchemaManager, StorageEngine,
    Value,
};
use std::hint::black_box;
use tempfile::TempDir;

fn setup_populated_engine(n: usize) -> (TempDir, ExecutionEngine) {
    let dir = TempDir::new().unwrap();
    let storage = StorageEngine::new(dir.path()).unwrap();
    let schema = SchemaManager::new(dir.path().join("master_schema.json")).unwrap();
    let mut engine = ExecutionEngine::new(storage, schema);

    engine
        .create_table(
            "users",
            vec![
                ColumnDef::new("id", DataType::Int),
                ColumnDef::new("name", DataType::String),
                ColumnDef::new("age", DataType::Int),
                ColumnDef::new("active", DataType::Bool),
            ],
            Some("id".into()),
        )
        .unwrap();

    for i in 0..n {
        let row = Row::from([
            ("id".to_string(), Value::Int(i as i64)),
            ("name".to_string(), Value::String(format!("user{i}"))),
            ("age".to_string(), Value::Int((i % 100) as i64)),
            ("active".to_string(), Value::Bool(i % 2 == 0)),
        ]);
        engine.insert_row("users", row).unwrap();
    }
    (dir, engine)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Insert_Pipeline");
    group.bench_function("insert_single_row", |b| {
        let (_dir, mut engine) = setup_populated_engine(0);
        let mut next_id = 0i64;
        b.iter(|| {
            let row = Row::from([
                ("id".to_string(), Value::Int(next_id)),
                ("name".to_string(), Value::String("fresh".into())),
                ("age".to_string(), Value::Int(42)),
                ("active".to_string(), Value::Bool(true)),
            ]);
            engine.insert_row("users", black_box(row)).unwrap();
            next_id += 1;
        });
    });
    group.finish();
}

fn bench_select_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Select_Where_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let (_dir, engine) = setup_populated_engine(n);
            let cond = Condition::new("age", CompareOp::Eq, Value::Int(42));
            b.iter(|| {
                let rows = engine.select_rows("users", Some(&cond), None).unwrap();
                black_box(rows);
            });
        });
    }
    group.finish();
}

fn bench_indexed_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("Primary_Key_Lookup");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let (_dir, engine) = setup_populated_engine(n);
            let key = Value::Int((n / 2) as i64);
            b.iter(|| {
                let row = engine.select_by_primary_key("users", black_box(&key));
                black_box(row);
            });
        });
    }
    group.finish();
}

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("Nested_Loop_Join");

    group.bench_function("join_100x100", |b| {
        let (_dir, mut engine) = setup_populated_engine(100);
        engine
            .create_table(
                "orders",
                vec![
                    ColumnDef::new("id", DataType::Int),
                    ColumnDef::new("amount", DataType::Float),
                ],
                None,
            )
            .unwrap();
        for i in 0..100 {
            let row = Row::from([
                ("id".to_string(), Value::Int(i)),
                ("amount".to_string(), Value::Float(i as f64 * 1.5)),
            ]);
            engine.insert_row("orders", row).unwrap();
        }
        b.iter(|| {
            let rows = engine.nested_loop_join("users", "orders", "id").unwrap();
            black_box(rows);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_select_scaling,
    bench_indexed_lookup,
    bench_join
);
criterion_main!(benches);
