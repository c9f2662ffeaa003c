//! Criterion benchmark for SQL text generation and placeholder counting, the work done on
//! every ad-hoc statement and every statement registration.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sql_shim::encoder::encode_value;
use sql_shim::placeholders::count_placeholders;
use sql_shim::{ColumnMap, SqlBuilder, ValueMode};
use std::hint::black_box;

fn wide_row(columns: usize) -> ColumnMap {
    (0..columns)
        .map(|i| {
            let value = match i % 3 {
                0 => i.to_string(),
                1 => format!("name {i} with O'Brien"),
                _ => "null".to_string(),
            };
            (format!("col_{i:03}"), value)
        })
        .collect()
}

fn bench_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder");
    for columns in [4_usize, 32, 128] {
        let row = wide_row(columns);
        let qualifiers = ColumnMap::from([("id", "42"), ("tenant", "acme")]);
        group.throughput(Throughput::Elements(columns as u64));

        group.bench_with_input(BenchmarkId::new("insert", columns), &row, |b, row| {
            b.iter(|| SqlBuilder::new("orders").insert(black_box(row)));
        });
        group.bench_with_input(BenchmarkId::new("update", columns), &row, |b, row| {
            b.iter(|| SqlBuilder::new("orders").update(black_box(row), black_box(&qualifiers)));
        });
        group.bench_with_input(
            BenchmarkId::new("insert_pre_encoded", columns),
            &row,
            |b, row| {
                b.iter(|| {
                    SqlBuilder::new("orders")
                        .mode(ValueMode::PreEncoded)
                        .insert(black_box(row))
                });
            },
        );
    }
    group.finish();
}

fn bench_encoder(c: &mut Criterion) {
    let inputs = ["12345", "-2.5E-3", "plain text", "it's O'Brien's", "null", "?"];
    c.bench_function("encode_value", |b| {
        b.iter(|| {
            for input in inputs {
                black_box(encode_value(black_box(input)));
            }
        });
    });
}

fn bench_placeholders(c: &mut Criterion) {
    let sql = "INSERT INTO t (a,b,c,d,e) VALUES (?,'what?',?,'it''s ?',?)";
    c.bench_function("count_placeholders", |b| {
        b.iter(|| count_placeholders(black_box(sql)));
    });
}

criterion_group!(benches, bench_builder, bench_encoder, bench_placeholders);
criterion_main!(benches);
