//! Integration tests for array and object pattern assignment.

use csz_ast::{NodeIndex, TreeBuilder};
use csz_common::diagnostics::messages;
use csz_emitter::{CompileOptions, compile_to_js};

fn compile(build: impl FnOnce(&TreeBuilder) -> Vec<NodeIndex>) -> Result<String, u32> {
    let b = TreeBuilder::new();
    let statements = build(&b);
    let root = b.root(statements);
    let arena = b.finish();
    compile_to_js(&arena, root, &CompileOptions::bare()).map_err(|err| err.code)
}

#[test]
fn array_pattern_caches_a_complex_source() {
    let output = compile(|b| {
        let pattern = b.arr(vec![b.id("a"), b.id("b")]);
        vec![b.assign(pattern, b.call(b.id("f"), Vec::new()))]
    })
    .expect("compiles");
    assert_eq!(output, "var a, b, ref;\n\nref = f(), a = ref[0], b = ref[1];\n");
}

#[test]
fn trailing_splat_slices_the_rest() {
    let output = compile(|b| {
        let pattern = b.arr(vec![b.id("a"), b.splat(b.id("rest"))]);
        vec![b.assign(pattern, b.id("arr"))]
    })
    .expect("compiles");
    assert_eq!(
        output,
        "var a, rest, slice = [].slice;\n\na = arr[0], rest = 2 <= arr.length ? slice.call(arr, 1) : [];\n"
    );
}

#[test]
fn middle_splat_counts_the_suffix_from_the_end() {
    let output = compile(|b| {
        let pattern = b.arr(vec![b.id("a"), b.splat(b.id("rest")), b.id("b")]);
        vec![b.assign(pattern, b.id("source"))]
    })
    .expect("compiles");
    assert!(output.starts_with("var a, b, i, rest, slice = [].slice;\n\n"), "{output}");
    assert!(output.contains("a = source[0], rest = 3 <= source.length"), "{output}");
    assert!(
        output.contains("slice.call(source, 1, i = source.length - 1)"),
        "{output}"
    );
    assert!(output.ends_with("b = source[i++];\n"), "{output}");
}

#[test]
fn nested_object_pattern_reads_each_path() {
    let output = compile(|b| {
        let inner = b.arr(vec![b.id("z")]);
        let pattern = b.obj(vec![b.id("x"), b.prop("y", inner)]);
        vec![b.assign(pattern, b.id("o"))]
    })
    .expect("compiles");
    assert!(output.starts_with("var x, z;\n\n"), "{output}");
    assert!(output.contains("x = o.x, z = o.y[0]"), "{output}");
}

#[test]
fn pattern_default_applies_only_to_undefined() {
    let output = compile(|b| {
        let pattern = b.arr(vec![b.assign(b.id("a"), b.num("1"))]);
        vec![b.assign(pattern, b.id("arr"))]
    })
    .expect("compiles");
    assert!(
        output.contains("a = (ref = arr[0]) !== void 0 ? ref : 1"),
        "{output}"
    );
}

#[test]
fn two_splats_in_one_pattern_are_rejected() {
    let code = compile(|b| {
        let pattern = b.arr(vec![b.splat(b.id("a")), b.splat(b.id("b"))]);
        vec![b.assign(pattern, b.id("arr"))]
    })
    .expect_err("two splats");
    assert_eq!(code, messages::MULTIPLE_SPLATS_IN_PATTERN.code);
}

#[test]
fn object_rest_in_pattern_is_rejected() {
    let code = compile(|b| {
        let pattern = b.obj(vec![b.id("a"), b.splat(b.id("rest"))]);
        vec![b.assign(pattern, b.id("o"))]
    })
    .expect_err("object rest");
    assert_eq!(code, messages::OBJECT_PATTERN_REST.code);
}

#[test]
fn literal_cannot_be_assigned() {
    let code = compile(|b| vec![b.assign(b.num("1"), b.id("a"))]).expect_err("literal target");
    assert_eq!(code, messages::CANT_BE_ASSIGNED.code);
}

#[test]
fn pattern_used_as_a_value_yields_the_source() {
    let output = compile(|b| {
        let pattern = b.arr(vec![b.id("a"), b.splat(b.id("rest")), b.id("c")]);
        let assign = b.assign(pattern, b.id("src"));
        vec![b.assign(b.id("r"), b.parens(assign))]
    })
    .expect("compiles");
    assert!(output.contains("r = (a = src[0]"), "{output}");
    assert!(output.ends_with(", src);\n"), "{output}");
}

#[test]
fn cached_source_is_the_value_of_the_pattern() {
    let output = compile(|b| {
        let pattern = b.arr(vec![b.id("a")]);
        let assign = b.assign(pattern, b.call(b.id("f"), Vec::new()));
        vec![b.assign(b.id("r"), b.parens(assign))]
    })
    .expect("compiles");
    assert!(
        output.ends_with("r = (ref = f(), a = ref[0], ref);\n"),
        "{output}"
    );
}
