//! Criterion benchmarks for rust_database_helper

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_database_helper::core::{Cardinality, SelectBuilder, UpdateBuilder};
use rust_database_helper::prelude::*;

// ============================================================================
// DatabaseValue Creation Benchmarks
// ============================================================================

fn bench_value_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("int", |b| {
        b.iter(|| {
            let value = DatabaseValue::from(black_box(123456789i64));
            black_box(value)
        });
    });

    group.bench_function("u64_id", |b| {
        b.iter(|| {
            let value = DatabaseValue::from(black_box(42u64));
            black_box(value)
        });
    });

    group.bench_function("text", |b| {
        b.iter(|| {
            let value = DatabaseValue::from(black_box("Hello, World!"));
            black_box(value)
        });
    });

    group.bench_function("bytes", |b| {
        let data = vec![1u8, 2, 3, 4, 5];
        b.iter(|| {
            let value = DatabaseValue::from(black_box(data.clone()));
            black_box(value)
        });
    });

    group.finish();
}

// ============================================================================
// Row Lookup Benchmarks
// ============================================================================

fn build_row(size: usize) -> DatabaseRow {
    (0..size)
        .map(|i| (format!("column_{}", i), DatabaseValue::from(i as i64)))
        .collect()
}

fn bench_row_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_operations");

    for size in [4usize, 16, 64].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("build", size), size, |b, &size| {
            b.iter(|| black_box(build_row(size)));
        });
    }

    let row = build_row(16);

    group.bench_function("get_first", |b| {
        b.iter(|| black_box(row.get(black_box("column_0"))));
    });

    group.bench_function("get_last", |b| {
        b.iter(|| black_box(row.get(black_box("column_15"))));
    });

    group.bench_function("get_as_i64", |b| {
        b.iter(|| black_box(row.get_as::<i64>(black_box("column_8"))));
    });

    group.finish();
}

// ============================================================================
// Statement Building Benchmarks
// ============================================================================

fn bench_statement_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_building");

    group.bench_function("select_one_criterion", |b| {
        b.iter(|| {
            let built = SelectBuilder::new("users")
                .where_eq("id", black_box(42i64))
                .build();
            black_box(built)
        });
    });

    group.bench_function("update_three_columns", |b| {
        b.iter(|| {
            let built = UpdateBuilder::new("users")
                .set("name", "Alice")
                .set("email", "alice@example.com")
                .set("active", true)
                .where_eq("id", black_box(42i64))
                .build();
            black_box(built)
        });
    });

    group.bench_function("named_params", |b| {
        b.iter(|| black_box(Params::named([(":id", 1i64), (":age", 30)])));
    });

    group.bench_function("classify_rows", |b| {
        let rows = vec![build_row(4), build_row(4)];
        b.iter(|| black_box(Cardinality::of(black_box(rows.clone()))));
    });

    group.finish();
}

// ============================================================================
// JSON Serialization Benchmarks
// ============================================================================

fn bench_json_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_serialization");

    for size in [4usize, 16, 64].iter() {
        let row = build_row(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("row", size), &row, |b, row| {
            b.iter(|| black_box(serde_json::to_string(row)));
        });
    }

    let params = Params::named([("name", "Alice"), ("email", "alice@example.com")]);
    group.bench_function("params_log_string", |b| {
        b.iter(|| black_box(params.to_log_string()));
    });

    group.finish();
}

// ============================================================================
// SQLite Benchmarks
// ============================================================================

#[cfg(feature = "sqlite")]
fn bench_sqlite(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqlite");

    let mut db = Connection::connect_sqlite(":memory:").expect("Failed to connect");
    db.execute(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, email TEXT)",
        (),
    )
    .expect("Failed to create table");
    for i in 0..1000 {
        db.insert(
            "users",
            [("name", format!("user{}", i)), ("email", format!("user{}@example.com", i))],
        )
        .expect("Failed to insert");
    }

    group.bench_function("get_one", |b| {
        b.iter(|| {
            let row = db
                .get_one("SELECT * FROM users WHERE id = :id", [("id", black_box(500i64))])
                .expect("Failed to fetch");
            black_box(row)
        });
    });

    group.bench_function("get_optional_one_missing", |b| {
        b.iter(|| {
            let row = db
                .get_optional_one("SELECT * FROM users WHERE id = :id", [("id", black_box(-1i64))])
                .expect("Failed to fetch");
            black_box(row)
        });
    });

    group.bench_function("insert", |b| {
        b.iter(|| {
            let id = db
                .insert("users", [("name", "bench"), ("email", "bench@example.com")])
                .expect("Failed to insert");
            black_box(id)
        });
    });

    group.bench_function("transaction_insert", |b| {
        b.iter(|| {
            let id: Result<u64> = db.transaction(|tx| tx.insert("users", [("name", "tx")]));
            black_box(id.expect("Transaction failed"))
        });
    });

    group.finish();
}

#[cfg(not(feature = "sqlite"))]
fn bench_sqlite(_c: &mut Criterion) {}

criterion_group!(
    benches,
    bench_value_creation,
    bench_row_operations,
    bench_statement_building,
    bench_json_serialization,
    bench_sqlite
);
criterion_main!(benches);
