//! Integration tests for conditionals, switches, try blocks and loops,
//! including statements that must be wrapped when used as values.

use csz_ast::{NodeIndex, TreeBuilder};
use csz_common::diagnostics::messages;
use csz_emitter::{CompileOptions, compile_to_js};

fn compile(build: impl FnOnce(&TreeBuilder) -> Vec<NodeIndex>) -> Result<String, (u32, String)> {
    compile_with(&CompileOptions::bare(), build)
}

fn compile_with(
    options: &CompileOptions,
    build: impl FnOnce(&TreeBuilder) -> Vec<NodeIndex>,
) -> Result<String, (u32, String)> {
    let b = TreeBuilder::new();
    let statements = build(&b);
    let root = b.root(statements);
    let arena = b.finish();
    compile_to_js(&arena, root, options).map_err(|err| (err.code, err.message))
}

#[test]
fn switch_cases_end_with_break() {
    let output = compile(|b| {
        vec![b.switch(
            Some(b.id("a")),
            vec![(vec![b.num("1")], vec![b.id("x")])],
            Some(vec![b.id("y")]),
        )]
    })
    .expect("compiles");
    assert_eq!(
        output,
        "switch (a) {\n  case 1:\n    x;\n    break;\n  default:\n    y;\n}\n"
    );
}

#[test]
fn try_without_catch_gets_an_empty_one() {
    let output = compile(|b| vec![b.try_(vec![b.call(b.id("f"), Vec::new())], None, None)])
        .expect("compiles");
    assert_eq!(output, "try {\n  f();\n} catch (error) {}\n");
}

#[test]
fn catch_variable_is_assigned_from_the_error() {
    let output = compile(|b| {
        let recovery = vec![b.call(b.id("g"), Vec::new())];
        vec![b.try_(
            vec![b.call(b.id("f"), Vec::new())],
            Some((Some(b.id("e")), recovery)),
            None,
        )]
    })
    .expect("compiles");
    assert_eq!(
        output,
        "var e;\n\ntry {\n  f();\n} catch (error) {\n  e = error;\n  g();\n}\n"
    );
}

#[test]
fn try_used_as_a_value_is_wrapped_in_a_closure() {
    let output = compile(|b| {
        let attempt = b.try_(vec![b.call(b.id("f"), Vec::new())], None, None);
        vec![b.assign(b.id("x"), attempt)]
    })
    .expect("compiles");
    assert_eq!(
        output,
        "var x;\n\nx = (function() {\n  try {\n    return f();\n  } catch (error) {}\n})();\n"
    );
}

#[test]
fn wrapped_statement_using_this_is_called_with_it() {
    let output = compile(|b| {
        let attempt = b.try_(vec![b.this_prop("a")], None, None);
        vec![b.assign(b.id("x"), attempt)]
    })
    .expect("compiles");
    assert!(output.ends_with("}).call(this);\n"), "{output}");
}

#[test]
fn loop_used_as_a_value_collects_results() {
    let output = compile(|b| {
        let body = b.op("*", b.id("y"), b.num("2"));
        let looped = b.for_in(b.id("y"), b.id("arr"), vec![body]);
        vec![b.assign(b.id("x"), looped)]
    })
    .expect("compiles");
    assert!(output.starts_with("var x, y;\n\n"), "{output}");
    assert!(
        output.contains(
            "  var i, len, results;\n  results = [];\n  for (i = 0, len = arr.length; i < len; i++) {\n    y = arr[i];\n    results.push(y * 2);\n  }\n  return results;\n})();"
        ),
        "{output}"
    );
}

#[test]
fn array_loop_counts_up_the_source() {
    let output = compile(|b| {
        let body = b.call(b.id("f"), vec![b.id("x")]);
        vec![b.for_in(b.id("x"), b.id("arr"), vec![body])]
    })
    .expect("compiles");
    assert_eq!(
        output,
        "var i, len, x;\n\nfor (i = 0, len = arr.length; i < len; i++) {\n  x = arr[i];\n  f(x);\n}\n"
    );
}

#[test]
fn range_loop_steps_a_counter() {
    let output = compile(|b| {
        let range = b.range(b.num("1"), b.num("3"), false);
        let body = b.call(b.id("f"), vec![b.id("x")]);
        vec![b.for_in(b.id("x"), range, vec![body])]
    })
    .expect("compiles");
    assert!(output.starts_with("var i, x;\n\n"), "{output}");
    assert!(
        output.contains("for (x = i = 1; i <= 3; x = ++i) {"),
        "{output}"
    );
}

#[test]
fn object_loop_reads_each_value() {
    let output = compile(|b| {
        let body = b.call(b.id("f"), vec![b.id("k"), b.id("v")]);
        vec![b.for_of(b.id("k"), Some(b.id("v")), b.id("obj"), vec![body])]
    })
    .expect("compiles");
    assert!(
        output.contains("for (k in obj) {\n  v = obj[k];\n  f(k, v);\n}"),
        "{output}"
    );
}

#[test]
fn small_literal_range_is_unrolled() {
    let output = compile(|b| {
        let range = b.range(b.num("1"), b.num("3"), false);
        vec![b.assign(b.id("x"), range)]
    })
    .expect("compiles");
    assert_eq!(output, "var x;\n\nx = [1, 2, 3];\n");
}

#[test]
fn continue_outside_a_loop_is_rejected() {
    let (code, message) = compile(|b| vec![b.cont()]).expect_err("stray continue");
    assert_eq!(code, messages::JUMP_OUTSIDE_LOOP.code);
    assert_eq!(message, "continue statement outside of a loop");
}

#[test]
fn wrapping_a_statement_with_an_escaping_break_is_rejected() {
    let (code, _) = compile(|b| {
        let attempt = b.try_(vec![b.brk()], None, None);
        let body = vec![b.assign(b.id("x"), attempt)];
        vec![b.while_(b.id("a"), body)]
    })
    .expect_err("escaping break");
    assert_eq!(code, messages::PURE_STATEMENT_IN_EXPRESSION.code);
}

fn range_value(options: &CompileOptions, from: &str, to: &str) -> String {
    compile_with(options, |b| {
        let range = b.range(b.num(from), b.num(to), false);
        vec![b.assign(b.id("x"), range)]
    })
    .expect("compiles")
}

#[test]
fn range_unrolls_up_to_the_default_limit() {
    let options = CompileOptions::bare();
    let elements: Vec<String> = (1..=21).map(|n| n.to_string()).collect();
    assert_eq!(
        range_value(&options, "1", "21"),
        format!("var x;\n\nx = [{}];\n", elements.join(", "))
    );

    let looped = range_value(&options, "1", "22");
    assert!(!looped.contains("x = ["), "{looped}");
    assert!(looped.contains("i <= 22; i++)"), "{looped}");
    assert!(looped.contains("results.push(i);"), "{looped}");
}

#[test]
fn range_unroll_limit_is_configurable() {
    let options = CompileOptions {
        range_unroll_limit: 2,
        ..CompileOptions::bare()
    };
    assert_eq!(range_value(&options, "1", "3"), "var x;\n\nx = [1, 2, 3];\n");
    let looped = range_value(&options, "1", "5");
    assert!(looped.contains("i <= 5; i++)"), "{looped}");
}

#[test]
fn fractional_literal_range_has_a_fixed_direction() {
    let value = range_value(&CompileOptions::bare(), "1.5", "3");
    assert!(value.contains("i = 1.5; i <= 3; i++)"), "{value}");
    assert!(!value.contains("1.5 <= 3"), "{value}");

    let looped = compile(|b| {
        let range = b.range(b.num("1.5"), b.num("3"), false);
        vec![b.for_in(b.id("x"), range, vec![b.call(b.id("f"), vec![b.id("x")])])]
    })
    .expect("compiles");
    assert!(
        looped.contains("for (x = i = 1.5; i <= 3; x = ++i) {"),
        "{looped}"
    );
}
