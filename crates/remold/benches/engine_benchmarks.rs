//! Engine and operation performance benchmarks.
//!
//! Measures full-table transformation across table sizes, plus the
//! per-value cost of the heavier operations.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use remold::plan::FormatKind;
use remold::registry::{clear_value, format_value};
use remold::{CsvReader, PipelinePlan, Table, TransformEngine};

const PLAN: &str = r#"{
    "clientes": {
        "destiny": "Clientes",
        "fields": {
            "nome": {"field_destiny": "Nome", "transform": {"trim": true, "clear": true, "upper": true}},
            "cpf": {"field_destiny": "CPF", "transform": {"format": "CPF"}},
            "situacao": {"field_destiny": "Situacao", "transform": {
                "switch": {"str_from": ["A", "I"], "str_to": ["Ativo", "Inativo"]}
            }},
            "telefone": {"field_destiny": "Telefone", "transform": {"split": "DDD1"}},
            "ativo": {"field_destiny": "Ativo", "transform": {"select": "1"}}
        },
        "remove": {"1": "Ativo", "2": "Telefone"}
    }
}"#;

/// Generate synthetic customer rows as CSV.
fn generate_csv_data(rows: usize) -> String {
    let mut data = String::from("nome,cpf,situacao,telefone,ativo,extra\n");
    for row in 0..rows {
        data.push_str(&format!(
            "  José da Silva {}!,{:011},{},11{:09},{},ignored\n",
            row,
            row,
            if row % 3 == 0 { "A" } else { "I" },
            row,
            row % 2
        ));
    }
    data
}

fn generate_table(rows: usize) -> Table {
    CsvReader::new()
        .read_bytes(generate_csv_data(rows).as_bytes())
        .expect("synthetic data parses")
}

/// Benchmark the four-stage transformation across table sizes.
fn bench_transform_table(c: &mut Criterion) {
    let plan = PipelinePlan::from_json_str(PLAN).expect("plan parses");
    let table_plan = plan.table("clientes").expect("dataset present");
    let engine = TransformEngine::default();

    let mut group = c.benchmark_group("transform_table");
    for rows in [100, 1_000, 10_000].iter() {
        let table = generate_table(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            b.iter_with_setup(
                || table.clone(),
                |raw| black_box(engine.transform_table(table_plan, raw).expect("transform")),
            );
        });
    }
    group.finish();
}

/// Benchmark reading raw CSV into a table.
fn bench_read_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_csv");
    for rows in [1_000, 10_000].iter() {
        let data = generate_csv_data(*rows);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            let reader = CsvReader::new();
            b.iter(|| black_box(reader.read_bytes(data.as_bytes()).expect("parse")));
        });
    }
    group.finish();
}

/// Benchmark single-value operations.
fn bench_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("values");
    group.bench_function("clear", |b| {
        b.iter(|| black_box(clear_value(black_box("Atenção: São João d'El-Rei, nº 42!"))))
    });
    group.bench_function("format_cpf", |b| {
        b.iter(|| black_box(format_value(FormatKind::Cpf, black_box("12345678901"))))
    });
    group.bench_function("format_datetime", |b| {
        b.iter(|| black_box(format_value(FormatKind::Datetime, black_box("2023/12/25"))))
    });
    group.finish();
}

criterion_group!(benches, bench_transform_table, bench_read_csv, bench_values);
criterion_main!(benches);
