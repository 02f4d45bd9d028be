use super::*;
use serde_json::json;

fn request(options: serde_json::Value) -> String {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.assign(b.id("a"), b.num("1"))]);
    let arena = b.finish();
    json!({
        "tree": arena,
        "root": root,
        "options": options,
    })
    .to_string()
}

#[test]
fn request_compiles_to_text() {
    let output = compile_request(&request(json!({ "bare": true }))).expect("compiles");
    assert_eq!(output, "var a;\n\na = 1;\n");
}

#[test]
fn omitted_options_use_defaults() {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.id("a")]);
    let text = json!({ "tree": b.finish(), "root": root }).to_string();
    let output = compile_request(&text).expect("compiles");
    assert_eq!(output, "(function() {\n  a;\n\n}).call(this);\n");
}

#[test]
fn ast_target_returns_the_tree() {
    let output = compile_request(&request(json!({ "bare": true, "target": "ast" })))
        .expect("compiles");
    let tree: serde_json::Value = serde_json::from_str(&output).expect("json");
    assert_eq!(tree["type"], "File");
}

#[test]
fn malformed_request_is_reported() {
    let err = compile_request("{").expect_err("malformed");
    assert!(err.to_string().contains("malformed compile request"));
}

#[test]
fn compile_errors_keep_their_cause() {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.brk()]);
    let text = json!({ "tree": b.finish(), "root": root }).to_string();
    let err = compile_request(&text).expect_err("stray break");
    let cause = err.downcast_ref::<CompileError>().expect("compile error");
    assert_eq!(cause.code, common::diagnostics::messages::JUMP_OUTSIDE_LOOP.code);
}

#[test]
fn log_format_defaults_to_text() {
    assert_eq!(tracing_config::LogFormat::parse("JSON"), tracing_config::LogFormat::Json);
    assert_eq!(tracing_config::LogFormat::parse(""), tracing_config::LogFormat::Text);
}
