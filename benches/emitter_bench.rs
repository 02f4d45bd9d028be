//! Emitter Benchmark
//!
//! Measures end-to-end compile throughput (nodes/sec) for both targets.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use csz::{CompileOptions, NodeArena, NodeIndex, Target, TreeBuilder, compile_to_js, compile_to_tree};

// =============================================================================
// Tree Generators
// =============================================================================

/// A program of `functions` function definitions, each with a body mixing
/// the constructs that desugar heavily: soaks, destructuring, loops used as
/// values, and an existential assignment.
fn generate_program(functions: usize, statements_per_fn: usize) -> (NodeArena, NodeIndex) {
    let b = TreeBuilder::new();
    let mut top = Vec::with_capacity(functions + 1);
    top.push(b.assign(b.id("config"), b.obj(vec![b.prop("depth", b.num("3"))])));
    for f in 0..functions {
        let mut body = Vec::with_capacity(statements_per_fn * 3);
        for s in 0..statements_per_fn {
            let pattern = b.arr(vec![b.id("head"), b.splat(b.id("tail"))]);
            body.push(b.assign(pattern, b.call(b.id("items"), vec![b.num(&s.to_string())])));
            let depth = b.soak_dot(b.dot(b.id("config"), "nested"), "depth");
            body.push(b.assign(b.id(&format!("d{s}")), depth));
            let doubled = b.op("*", b.id("x"), b.num("2"));
            let looped = b.for_in(b.id("x"), b.id("tail"), vec![doubled]);
            body.push(b.assign(b.id(&format!("r{s}")), looped));
        }
        body.push(b.compound("?=", b.id("head"), b.num("0")));
        let function = b.code(vec![b.param("items")], body);
        top.push(b.assign(b.id(&format!("fn{f}")), function));
    }
    let root = b.root(top);
    (b.finish(), root)
}

fn generate_class(methods: usize) -> (NodeArena, NodeIndex) {
    let b = TreeBuilder::new();
    let mut members = Vec::with_capacity(methods + 1);
    let constructor = b.code(vec![b.this_param("name")], vec![b.super_call(Vec::new())]);
    members.push(b.prop("constructor", constructor));
    for m in 0..methods {
        let greeting = b.op("+", b.str("hi "), b.this_prop("name"));
        members.push(b.prop(&format!("greet{m}"), b.code(Vec::new(), vec![greeting])));
    }
    let class = b.class(Some("Greeter"), Some(b.id("Base")), vec![b.obj(members)]);
    let root = b.root(vec![class]);
    (b.finish(), root)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_compile_class(c: &mut Criterion) {
    let (arena, root) = generate_class(20);
    let options = CompileOptions::default();
    c.bench_function("compile_class", |b| {
        b.iter(|| black_box(compile_to_js(&arena, root, &options)))
    });
}

/// Benchmark: compile throughput for various program sizes
fn bench_compile_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_throughput");
    let text = CompileOptions::default();
    let tree = CompileOptions::default().with_target(Target::Ast);

    for (functions, statements) in [(10, 5), (20, 10), (50, 5), (100, 5)] {
        let (arena, root) = generate_program(functions, statements);
        let label = format!("{functions}fn_{statements}stmt");

        group.throughput(Throughput::Elements(arena.len() as u64));
        group.bench_with_input(BenchmarkId::new("js", &label), &arena, |b, arena| {
            b.iter(|| black_box(compile_to_js(arena, root, &text)))
        });
        group.bench_with_input(BenchmarkId::new("ast", &label), &arena, |b, arena| {
            b.iter(|| black_box(compile_to_tree(arena, root, &tree)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile_class, bench_compile_throughput);
criterion_main!(benches);
