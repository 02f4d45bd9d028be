//! Compiling the same tree twice gives the same output.

use csz_ast::TreeBuilder;
use csz_emitter::{CompileOptions, Target, compile, compile_to_js, compile_to_tree};

fn sample() -> (csz_ast::NodeArena, csz_ast::NodeIndex) {
    let b = TreeBuilder::new();
    let pattern = b.arr(vec![b.id("a"), b.splat(b.id("rest"))]);
    let destructure = b.assign(pattern, b.call(b.id("f"), Vec::new()));
    let soak = b.assign(b.id("x"), b.soak_dot(b.id("a"), "b"));
    let looped = b.for_in(b.id("y"), b.id("rest"), vec![b.call(b.id("g"), vec![b.id("y")])]);
    let root = b.root(vec![destructure, soak, looped]);
    (b.finish(), root)
}

#[test]
fn text_output_is_stable_across_compiles() {
    let (arena, root) = sample();
    let options = CompileOptions::default();
    let first = compile_to_js(&arena, root, &options).expect("first");
    let second = compile_to_js(&arena, root, &options).expect("second");
    assert_eq!(first, second);
}

#[test]
fn tree_output_is_stable_across_compiles() {
    let (arena, root) = sample();
    let options = CompileOptions::bare();
    let first = compile_to_tree(&arena, root, &options).expect("first");
    let second = compile_to_tree(&arena, root, &options).expect("second");
    assert_eq!(first, second);
}

#[test]
fn entry_points_agree() {
    let (arena, root) = sample();
    let options = CompileOptions::bare();
    let text = compile_to_js(&arena, root, &options).expect("text");
    let output = compile(&arena, root, &options).expect("fragments");
    assert_eq!(output.to_text(), text);

    let tree = compile_to_tree(&arena, root, &options).expect("tree");
    let output = compile(&arena, root, &options.with_target(Target::Ast)).expect("ast");
    assert_eq!(output.to_text(), serde_json::to_string_pretty(&tree).expect("json"));
}

#[test]
fn trace_logging_does_not_change_the_output() {
    let (arena, root) = sample();
    let options = CompileOptions::bare();
    let quiet = compile_to_js(&arena, root, &options).expect("quiet");

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("csz_emitter=trace"))
        .with_test_writer()
        .finish();
    let traced = tracing::subscriber::with_default(subscriber, || {
        compile_to_js(&arena, root, &options).expect("traced")
    });
    assert_eq!(quiet, traced);
}
