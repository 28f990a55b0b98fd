#![allow(clippy::unwrap_used)]

use accessexpr::{AccessEvaluator, AccessExpression, Authorizations};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

// Access expressions of varying complexity
const SIMPLE: &str = "admin";
const FLAT_OR: &str = "a|b|c|d|e|f|g|h";
const NESTED: &str = "(a|b)&(c|(d&e))&f";
const QUOTED: &str = r#""eu/west 1"&("team \"blue\""|"c:\\tmp")"#;
const SHORT_CIRCUIT: &str = "admin|(a&b&c&d&e&f&g&h&i&j&k&l&m&n&o&p)";

const ALL: &[(&str, &str)] = &[
    ("Simple", SIMPLE),
    ("Flat Or", FLAT_OR),
    ("Nested", NESTED),
    ("Quoted", QUOTED),
    ("Short Circuit", SHORT_CIRCUIT),
];

fn wide_expression(terms: usize) -> String {
    (0..terms)
        .map(|i| format!("(auth{i}|\"group {i}\")"))
        .collect::<Vec<_>>()
        .join("&")
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Validation");

    for (name, input) in ALL {
        group.bench_function(*name, |b| b.iter(|| accessexpr::validate(black_box(input))));
    }

    let wide = wide_expression(200);
    group.bench_function("Wide (200 terms)", |b| {
        b.iter(|| accessexpr::validate(black_box(&wide)))
    });

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Evaluation");

    let auths =
        Authorizations::of(["admin", "a", "c", "d", "e", "f", "eu/west 1", "c:\\tmp"]).unwrap();
    let evaluator = AccessEvaluator::new(&auths);

    for (name, input) in ALL {
        group.bench_function(*name, |b| b.iter(|| evaluator.can_access(black_box(input))));
    }

    let other = Authorizations::of(["a", "f", "x"]).unwrap();
    let multi = AccessEvaluator::for_all([&auths, &other]);
    group.bench_function("Nested (two sets)", |b| {
        b.iter(|| multi.can_access(black_box(NESTED)))
    });

    let cached = AccessExpression::of(NESTED).unwrap();
    cached.parse().unwrap();
    group.bench_function("Nested (cached tree)", |b| {
        b.iter(|| evaluator.can_access_expression(black_box(&cached)))
    });

    group.finish();
}

fn bench_parse_and_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parse and Normalize");

    for (name, input) in ALL {
        group.bench_function(*name, |b| b.iter(|| accessexpr::parse(black_box(input))));
    }

    let wide = wide_expression(200);
    let tree = accessexpr::parse(&wide).unwrap();
    group.bench_function("Normalize wide (200 terms)", |b| {
        b.iter(|| black_box(&tree).normalize())
    });

    group.finish();
}

criterion_group!(benches, bench_validation, bench_evaluation, bench_parse_and_normalize);
criterion_main!(benches);
