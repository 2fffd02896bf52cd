use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlweave::{Eq, PlaceholderFormat, SelectBuilder, Sqlizer, Value, args, select};

/// SELECT col0, col1, ... FROM t WHERE col0 = ? AND col1 = ? ...
fn build_select(n: usize) -> SelectBuilder {
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut q = select(&columns).from("t");
    for i in 0..n {
        q = q.where_sql(format!("col{i} = ?"), args![i as i64]);
    }
    q.placeholder_format(PlaceholderFormat::Dollar)
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/to_sql");

    for n in [1, 5, 10, 50, 100] {
        let q = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.to_sql()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build_and_render");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).to_sql()));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let q = select(&["*"])
                    .from("t")
                    .where_clause(Eq::new().set("id", Value::list(values.iter().copied())))
                    .placeholder_format(PlaceholderFormat::Dollar);
                black_box(q.to_sql())
            });
        });
    }

    group.finish();
}

fn bench_template_clone(c: &mut Criterion) {
    let base = build_select(50);
    c.bench_function("sql_builder/template_clone_and_extend", |b| {
        b.iter(|| black_box(base.clone().limit(10).to_sql()));
    });
}

criterion_group!(
    benches,
    bench_to_sql,
    bench_build_and_render,
    bench_in_list,
    bench_template_clone
);
criterion_main!(benches);
