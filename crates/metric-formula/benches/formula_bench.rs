use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metric_formula::{evaluate, parse, parse_with_variables};

const FORMULA: &str = "(revenue - cost) / revenue * 100 - (refunds + chargebacks) / orders + 5%";

fn variables() -> HashMap<String, f64> {
    [
        ("revenue", 125_000.0),
        ("cost", 80_250.5),
        ("refunds", 1_200.0),
        ("chargebacks", 310.0),
        ("orders", 4_800.0),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", |b| b.iter(|| parse(black_box(FORMULA))));

    let nested = format!("{}x{}", "(".repeat(200), ")".repeat(200));
    c.bench_function("parse nested 200", |b| b.iter(|| parse(black_box(&nested))));
}

fn bench_evaluate(c: &mut Criterion) {
    let formula = parse(FORMULA).unwrap();
    let vars = variables();
    c.bench_function("evaluate", |b| {
        b.iter(|| evaluate(black_box(&formula), black_box(&vars)))
    });
}

fn bench_parse_with_variables(c: &mut Criterion) {
    c.bench_function("parse_with_variables", |b| {
        b.iter_batched(
            variables,
            |mut vars| parse_with_variables(black_box(FORMULA), &mut vars),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_evaluate,
    bench_parse_with_variables
);
criterion_main!(benches);
