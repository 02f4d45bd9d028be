//! Integration tests for function literals and their parameters.

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
fn last_expression_is_returned() {
    let output = compile(|b| {
        let body = b.op("+", b.id("a"), b.num("1"));
        vec![b.assign(b.id("f"), b.code(vec![b.param("a")], vec![body]))]
    })
    .expect("compiles");
    assert_eq!(output, "var f;\n\nf = function(a) {\n  return a + 1;\n};\n");
}

#[test]
fn this_parameter_assigns_the_property() {
    let output = compile(|b| {
        vec![b.assign(b.id("f"), b.code(vec![b.this_param("name")], Vec::new()))]
    })
    .expect("compiles");
    assert!(
        output.contains("f = function(name) {\n  this.name = name;\n};"),
        "{output}"
    );
}

#[test]
fn default_parameter_is_kept_in_the_signature() {
    let output = compile(|b| {
        let param = b.param_default("a", b.num("1"));
        vec![b.assign(b.id("f"), b.code(vec![param], Vec::new()))]
    })
    .expect("compiles");
    assert!(output.contains("f = function(a = 1) {};"), "{output}");
}

#[test]
fn splat_parameter_becomes_rest() {
    let output = compile(|b| {
        vec![b.assign(b.id("f"), b.code(vec![b.splat_param("rest")], Vec::new()))]
    })
    .expect("compiles");
    assert!(output.contains("function(...rest) {}"), "{output}");
}

#[test]
fn duplicate_parameter_is_rejected() {
    let code = compile(|b| {
        vec![b.assign(
            b.id("f"),
            b.code(vec![b.param("a"), b.param("a")], Vec::new()),
        )]
    })
    .expect_err("duplicate");
    assert_eq!(code, messages::DUPLICATE_PARAMETER.code);
}

#[test]
fn two_splat_parameters_are_rejected() {
    let code = compile(|b| {
        vec![b.assign(
            b.id("f"),
            b.code(vec![b.splat_param("a"), b.splat_param("b")], Vec::new()),
        )]
    })
    .expect_err("two splats");
    assert_eq!(code, messages::MULTIPLE_SPLAT_PARAMS.code);
}

#[test]
fn super_outside_a_method_is_rejected() {
    let code = compile(|b| vec![b.super_call(Vec::new())]).expect_err("stray super");
    assert_eq!(code, messages::SUPER_OUTSIDE_METHOD.code);
}

#[test]
fn parameter_after_a_splat_does_not_redeclare_the_rest() {
    let output = compile(|b| {
        let params = vec![b.splat_param("rest"), b.param("last")];
        vec![b.assign(b.id("f"), b.code(params, vec![b.id("rest")]))]
    })
    .expect("compiles");
    assert!(output.contains("f = function(...rest) {"), "{output}");
    let declaration = output
        .lines()
        .find(|line| line.starts_with("  var "))
        .expect("function declares its locals");
    assert!(declaration.contains("last"), "{output}");
    assert!(
        !declaration
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word == "rest"),
        "{output}"
    );
}
