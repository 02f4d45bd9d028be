//! Integration tests for soaked (`?.`) accesses and calls.

use csz_ast::TreeBuilder;
use csz_emitter::{CompileOptions, compile_to_js};

fn bare(build: impl FnOnce(&TreeBuilder) -> Vec<csz_ast::NodeIndex>) -> String {
    let b = TreeBuilder::new();
    let statements = build(&b);
    let root = b.root(statements);
    let arena = b.finish();
    compile_to_js(&arena, root, &CompileOptions::bare()).expect("compiles")
}

#[test]
fn soaked_access_statement_becomes_an_if() {
    let output = bare(|b| vec![b.soak_dot(b.id("a"), "b")]);
    assert_eq!(
        output,
        "if (typeof a !== \"undefined\" && a !== null) {\n  a.b;\n}\n"
    );
}

#[test]
fn soaked_access_value_becomes_a_conditional() {
    let output = bare(|b| vec![b.assign(b.id("x"), b.soak_dot(b.id("a"), "b"))]);
    assert_eq!(
        output,
        "var x;\n\nx = typeof a !== \"undefined\" && a !== null ? a.b : void 0;\n"
    );
}

#[test]
fn declared_name_skips_the_typeof_guard() {
    let output = bare(|b| {
        vec![
            b.assign(b.id("a"), b.obj(Vec::new())),
            b.assign(b.id("x"), b.soak_dot(b.id("a"), "b")),
        ]
    });
    assert!(output.contains("a != null ? a.b : void 0"), "{output}");
    assert!(!output.contains("typeof"), "{output}");
}

#[test]
fn soaked_call_result_is_cached() {
    let output = bare(|b| {
        let call = b.call(b.id("f"), Vec::new());
        vec![b.assign(b.id("x"), b.soak_dot(call, "b"))]
    });
    assert!(output.contains("ref = f()"), "{output}");
    assert!(output.contains("ref.b"), "{output}");
    assert!(output.starts_with("var ref, x;"), "{output}");
}

#[test]
fn consecutive_soaks_nest_their_conditionals() {
    let output = bare(|b| {
        let inner = b.soak_dot(b.id("a"), "b");
        vec![b.assign(b.id("x"), b.soak_dot(inner, "c"))]
    });
    assert!(output.starts_with("var ref, x;\n\n"), "{output}");
    assert!(
        output.contains("x = typeof a !== \"undefined\" && a !== null ? (ref = a.b) != null ? ref.c : void 0 : void 0;"),
        "{output}"
    );
}

#[test]
fn later_soak_caches_the_whole_prefix() {
    let output = bare(|b| {
        let head = b.dot(b.soak_dot(b.id("a"), "b"), "c");
        vec![b.assign(b.id("x"), b.soak_dot(head, "d"))]
    });
    assert!(
        output.contains("(ref = a.b.c) != null ? ref.d : void 0"),
        "{output}"
    );
}

#[test]
fn soaked_method_call_checks_for_a_function() {
    let output = bare(|b| {
        let method = b.dot(b.id("a"), "f");
        vec![b.soak_call(method, Vec::new())]
    });
    assert_eq!(
        output,
        "if (typeof a.f === \"function\") {\n  a.f();\n}\n"
    );
}

#[test]
fn soaked_index_caches_its_base() {
    let output = bare(|b| {
        let base = b.call(b.id("f"), Vec::new());
        let index = b.soak_index(b.call(b.id("g"), Vec::new()));
        vec![b.chain(base, index)]
    });
    assert_eq!(
        output,
        "var ref;\n\nif ((ref = f()) != null) {\n  ref[g()];\n}\n"
    );
}
