#![allow(clippy::unwrap_used)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lispy::{evaluator, parser, reader};

const SIMPLE: &str = "(+ 1 2)";
const NESTED: &str = "(if (> (* 5 2) 8) {join {10 5} (list 20)} {0})";
const CURRY: &str = "((\\ {a b c} {+ a b c}) 1 2 3)";

// Recursive factorial through a global definition
const FACTORIAL_DEF: &str = "def {fact} (\\ {n} {if (<= n 1) {1} {* n (fact (- n 1))}})";
const FACTORIAL_CALL: &str = "fact 15";

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parsing");

    group.bench_function("Parse Simple", |b| {
        b.iter(|| parser::parse(black_box(SIMPLE)))
    });

    group.bench_function("Parse Factorial", |b| {
        b.iter(|| parser::parse(black_box(FACTORIAL_DEF)))
    });

    let tree = parser::parse(FACTORIAL_DEF).unwrap();
    group.bench_function("Read Factorial", |b| {
        b.iter(|| reader::read(black_box(&tree)))
    });

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Evaluation");

    let env = evaluator::create_global_env();
    let simple = reader::read(&parser::parse(SIMPLE).unwrap());
    let nested = reader::read(&parser::parse(NESTED).unwrap());
    let curry = reader::read(&parser::parse(CURRY).unwrap());
    let partial = reader::read(&parser::parse("(\\ {a b c} {+ a b c}) 1").unwrap());

    evaluator::eval(&env, reader::read(&parser::parse(FACTORIAL_DEF).unwrap()));
    let factorial = reader::read(&parser::parse(FACTORIAL_CALL).unwrap());

    group.bench_function("Eval Simple", |b| {
        b.iter(|| evaluator::eval(&env, black_box(simple.clone())))
    });

    group.bench_function("Eval Nested", |b| {
        b.iter(|| evaluator::eval(&env, black_box(nested.clone())))
    });

    group.bench_function("Eval Full Application", |b| {
        b.iter(|| evaluator::eval(&env, black_box(curry.clone())))
    });

    group.bench_function("Eval Partial Application", |b| {
        b.iter(|| evaluator::eval(&env, black_box(partial.clone())))
    });

    group.bench_function("Eval Factorial", |b| {
        b.iter(|| evaluator::eval(&env, black_box(factorial.clone())))
    });

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_evaluation);
criterion_main!(benches);
