//! Integration tests for class lowering.

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

fn members(b: &TreeBuilder, items: Vec<(&str, NodeIndex)>) -> NodeIndex {
    let properties = items
        .into_iter()
        .map(|(key, value)| b.prop(key, value))
        .collect();
    b.obj(properties)
}

#[test]
fn methods_stay_in_the_class_body() {
    let output = compile(|b| {
        let greet = b.code(Vec::new(), vec![b.str("hi")]);
        let body = members(b, vec![("greet", greet)]);
        vec![b.class(Some("A"), None, vec![body])]
    })
    .expect("compiles");
    assert_eq!(
        output,
        "var A;\n\nA = class A {\n  greet() {\n    return \"hi\";\n  }\n\n};\n"
    );
}

#[test]
fn prototype_properties_make_the_body_executable() {
    let output = compile(|b| {
        let body = members(b, vec![("x", b.num("1"))]);
        vec![b.class(Some("A"), None, vec![body])]
    })
    .expect("compiles");
    assert_eq!(
        output,
        "var A;\n\nA = (function() {\n  class A {}\n\n  A.prototype.x = 1;\n\n  return A;\n\n})();\n"
    );
}

#[test]
fn derived_constructor_assigns_parameters_after_super() {
    let output = compile(|b| {
        let constructor = b.code(vec![b.this_param("x")], vec![b.super_call(Vec::new())]);
        let body = members(b, vec![("constructor", constructor)]);
        vec![b.class(Some("B"), Some(b.id("A")), vec![body])]
    })
    .expect("compiles");
    assert!(output.contains("class B extends A {"), "{output}");
    assert!(
        output.contains("constructor(x) {\n    super();\n    this.x = x;\n  }"),
        "{output}"
    );
}

#[test]
fn this_before_super_is_rejected() {
    let code = compile(|b| {
        let early = b.assign(b.this_prop("y"), b.num("1"));
        let constructor = b.code(Vec::new(), vec![early, b.super_call(Vec::new())]);
        let body = members(b, vec![("constructor", constructor)]);
        vec![b.class(Some("B"), Some(b.id("A")), vec![body])]
    })
    .expect_err("this before super");
    assert_eq!(code, messages::THIS_BEFORE_SUPER.code);
}

#[test]
fn second_constructor_is_rejected() {
    let code = compile(|b| {
        let first = b.code(Vec::new(), Vec::new());
        let second = b.code(Vec::new(), Vec::new());
        let body = members(b, vec![("constructor", first), ("constructor", second)]);
        vec![b.class(Some("A"), None, vec![body])]
    })
    .expect_err("two constructors");
    assert_eq!(code, messages::MULTIPLE_CONSTRUCTORS.code);
}

#[test]
fn executable_conditional_runs_inside_the_class_closure() {
    let output = compile(|b| {
        let first = b.code(Vec::new(), vec![b.num("1")]);
        let second = b.code(Vec::new(), vec![b.num("2")]);
        let methods = members(b, vec![("one", first), ("two", second)]);
        let conditional = b.if_(b.id("flag"), vec![b.call(b.id("setup"), Vec::new())], None);
        vec![b.class(Some("A"), None, vec![methods, conditional])]
    })
    .expect("compiles");
    assert!(output.starts_with("var A;\n\nA = (function() {\n  class A {\n"), "{output}");
    assert!(output.contains("    one() {\n      return 1;\n    }"), "{output}");
    assert!(output.contains("    two() {\n      return 2;\n    }"), "{output}");
    assert!(output.contains("  if (flag) {\n    setup();\n  }"), "{output}");
    assert!(output.ends_with("  return A;\n\n})();\n"), "{output}");
}

#[test]
fn bound_methods_get_a_binding_constructor() {
    let output = compile(|b| {
        let method = b.bound_code(Vec::new(), vec![b.num("1")]);
        let body = members(b, vec![("m", method)]);
        vec![b.class(Some("A"), None, vec![body])]
    })
    .expect("compiles");
    assert!(
        output.contains("  constructor() {\n    this.m = this.m.bind(this);\n  }"),
        "{output}"
    );
    assert!(output.contains("  m() {\n    return 1;\n  }"), "{output}");
}

#[test]
fn derived_binding_constructor_calls_super_first() {
    let output = compile(|b| {
        let method = b.bound_code(Vec::new(), vec![b.num("1")]);
        let body = members(b, vec![("m", method)]);
        vec![b.class(Some("B"), Some(b.id("A")), vec![body])]
    })
    .expect("compiles");
    assert!(
        output.contains(
            "  constructor() {\n    super(...arguments);\n    this.m = this.m.bind(this);\n  }"
        ),
        "{output}"
    );
    assert!(
        output.contains("boundMethodCheck(this, B);\n    return 1;"),
        "{output}"
    );
}
