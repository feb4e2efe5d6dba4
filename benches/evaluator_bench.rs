use std::fmt::Write;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use circa::graph::BranchId;
use circa::runtime::migration::migrate_stateful_values;
use circa::runtime::vm::run_branch;
use circa::script::{load_script, parse_script};
use circa::world::World;

const FACTORIAL: &str = r#"{ "statements": [
    { "def": "f", "inputs": [["n", "int"]], "output": "int", "body": [
        { "if": [{ "condition": { "call": "less_than", "args": [{ "ref": "n" }, 2] },
                   "body": [{ "return": 1 }] }],
          "else": [{ "return": { "call": "mult", "args": [
              { "ref": "n" },
              { "call": "f", "args": [{ "call": "sub", "args": [{ "ref": "n" }, 1] }] }
          ] } }] }
    ] },
    { "let": "result", "value": { "call": "f", "args": [12] } }
] }"#;

fn load(world: &mut World, text: &str) -> BranchId {
    let branch = world.create_branch(None);
    let script = parse_script(text).unwrap_or_else(|err| panic!("{}", err));
    load_script(world, branch, &script, None).unwrap_or_else(|err| panic!("{}", err));
    branch
}

/// `count` independent counters, each a state and an assign.
fn counters_source(count: usize) -> String {
    let mut statements = Vec::with_capacity(count * 2);
    for i in 0..count {
        let mut pair = String::new();
        write!(
            pair,
            r#"{{ "state": "c{i}", "type": "int", "initial": 0 }},
               {{ "assign": "c{i}", "value": {{ "call": "add", "args": [{{ "ref": "c{i}" }}, 1] }} }}"#
        )
        .unwrap();
        statements.push(pair);
    }
    format!(r#"{{ "statements": [{}] }}"#, statements.join(", "))
}

fn bench_recursion(c: &mut Criterion) {
    let mut world = World::new().unwrap();
    let branch = load(&mut world, FACTORIAL);

    let mut group = c.benchmark_group("evaluator/recursion");
    group.bench_function("factorial_12", |b| {
        b.iter(|| {
            let stack = run_branch(&mut world, black_box(branch)).unwrap();
            black_box(stack.failure().is_none());
        });
    });
    group.finish();
}

fn bench_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator/state");
    for count in [10usize, 100, 1000] {
        let source = counters_source(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("run", count), &source, |b, src| {
            let mut world = World::new().unwrap();
            let branch = load(&mut world, src);
            b.iter(|| black_box(run_branch(&mut world, branch).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("load_and_migrate", count), &source, |b, src| {
            let mut world = World::new().unwrap();
            let mut current = load(&mut world, src);
            run_branch(&mut world, current).unwrap();
            b.iter(|| {
                let next = load(&mut world, black_box(src));
                let trash = migrate_stateful_values(&mut world, current, next).unwrap();
                world.delete_branch(current).unwrap();
                current = next;
                black_box(trash);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_recursion, bench_state);
criterion_main!(benches);
