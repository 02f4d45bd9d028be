//! Integration tests for comment placement in the output.

use csz_ast::TreeBuilder;
use csz_emitter::{CompileOptions, compile_to_js};

#[test]
fn line_comment_precedes_its_statement() {
    let b = TreeBuilder::new();
    let statement = b.assign(b.id("a"), b.num("1"));
    let comment = b.line_comment(" note");
    b.attach_comment(statement, comment);
    let root = b.root(vec![statement]);
    let arena = b.finish();

    let output = compile_to_js(&arena, root, &CompileOptions::bare()).expect("compiles");
    assert_eq!(output, "var a;\n\n// note\na = 1;\n");
}

#[test]
fn block_comment_keeps_its_content() {
    let b = TreeBuilder::new();
    let statement = b.call(b.id("f"), Vec::new());
    let comment = b.block_comment(" note ");
    b.attach_comment(statement, comment);
    let root = b.root(vec![statement]);
    let arena = b.finish();

    let output = compile_to_js(&arena, root, &CompileOptions::bare()).expect("compiles");
    assert!(output.contains("/* note */"), "{output}");
    assert!(output.ends_with("f();\n"), "{output}");
}

#[test]
fn comment_reached_twice_is_printed_once() {
    let b = TreeBuilder::new();
    let value = b.num("1");
    let statement = b.assign(b.id("a"), value);
    let comment = b.line_comment(" once");
    b.attach_comment(statement, comment.clone());
    b.attach_comment(value, comment);
    let root = b.root(vec![statement]);
    let arena = b.finish();

    let output = compile_to_js(&arena, root, &CompileOptions::bare()).expect("compiles");
    assert_eq!(output.matches("// once").count(), 1, "{output}");
}

#[test]
fn header_option_adds_a_banner() {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.call(b.id("f"), Vec::new())]);
    let arena = b.finish();
    let options = CompileOptions {
        header: Some("Generated by csz".to_string()),
        ..CompileOptions::bare()
    };

    let output = compile_to_js(&arena, root, &options).expect("compiles");
    assert!(output.starts_with("// Generated by csz\n"), "{output}");
    assert!(output.ends_with("f();\n"), "{output}");
}
