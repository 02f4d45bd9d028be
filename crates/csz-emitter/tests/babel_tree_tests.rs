//! Integration tests for the syntax tree target.

use csz_ast::{NodeIndex, TreeBuilder};
use csz_emitter::{CompileOptions, CompileOutput, Target, compile, compile_to_js, compile_to_tree};
use serde_json::Value;

#[test]
fn wrapped_program_tree_is_a_call() {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.assign(b.id("a"), b.num("1"))]);
    let arena = b.finish();

    let tree = compile_to_tree(&arena, root, &CompileOptions::default()).expect("compiles");
    assert_eq!(tree["type"], "File");
    assert_eq!(tree["program"]["type"], "Program");
    assert_eq!(tree["program"]["sourceType"], "script");
    assert_eq!(
        tree["program"]["body"][0]["expression"]["type"],
        "CallExpression"
    );
}

#[test]
fn bare_program_tree_lists_statements() {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.assign(b.id("a"), b.num("1"))]);
    let arena = b.finish();

    let tree = compile_to_tree(&arena, root, &CompileOptions::bare()).expect("compiles");
    let body = &tree["program"]["body"];
    assert_eq!(body[0]["type"], "VariableDeclaration");
    assert_eq!(body[1]["type"], "ExpressionStatement");
    assert_eq!(body[1]["expression"]["type"], "AssignmentExpression");
    assert_eq!(body[1]["expression"]["right"]["value"], 1);
}

#[test]
fn module_tree_has_module_source_type() {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.import_default("a", "m")]);
    let arena = b.finish();

    let tree = compile_to_tree(&arena, root, &CompileOptions::default()).expect("compiles");
    assert_eq!(tree["program"]["sourceType"], "module");
    assert_eq!(tree["program"]["body"][0]["type"], "ImportDeclaration");
}

#[test]
fn tree_collects_attached_comments() {
    let b = TreeBuilder::new();
    let statement = b.call(b.id("f"), Vec::new());
    let comment = b.line_comment(" note");
    b.attach_comment(statement, comment);
    let root = b.root(vec![statement]);
    let arena = b.finish();

    let tree = compile_to_tree(&arena, root, &CompileOptions::bare()).expect("compiles");
    assert_eq!(tree["comments"].as_array().map(Vec::len), Some(1));
    assert_eq!(tree["comments"][0]["value"], " note");
}

#[test]
fn ast_target_selects_the_tree_output() {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.id("a")]);
    let arena = b.finish();
    let options = CompileOptions::bare().with_target(Target::Ast);

    let output = compile(&arena, root, &options).expect("compiles");
    let CompileOutput::Ast(tree) = output else {
        panic!("expected a tree");
    };
    assert_eq!(tree["program"]["body"][0]["expression"]["name"], "a");
}

type Program = fn(&TreeBuilder) -> Vec<NodeIndex>;

fn corpus() -> [(&'static str, Program); 9] {
    [
        ("soak", |b| vec![b.assign(b.id("x"), b.soak_dot(b.id("a"), "b"))]),
        ("pattern", |b| {
            let pattern = b.arr(vec![b.id("first"), b.splat(b.id("rest")), b.id("last")]);
            vec![b.assign(pattern, b.id("src"))]
        }),
        ("class", |b| {
            let greet = b.code(Vec::new(), vec![b.str("hi")]);
            let body = b.obj(vec![b.prop("greet", greet), b.prop("size", b.num("2"))]);
            vec![b.class(Some("Greeter"), None, vec![body])]
        }),
        ("range loop", |b| {
            let range = b.range(b.num("1"), b.num("3"), false);
            let body = b.call(b.id("f"), vec![b.id("n")]);
            vec![b.for_in(b.id("n"), range, vec![body])]
        }),
        ("try value", |b| {
            let attempt = b.try_(vec![b.call(b.id("risky"), Vec::new())], None, None);
            vec![b.assign(b.id("outcome"), attempt)]
        }),
        ("collected loop", |b| {
            let looped = b.while_(b.id("more"), vec![b.call(b.id("next"), Vec::new())]);
            vec![b.assign(b.id("items"), looped)]
        }),
        ("parameters", |b| {
            let params = vec![b.param_default("start", b.num("0")), b.splat_param("values")];
            let body = b.op("+", b.id("start"), b.id("values"));
            vec![b.assign(b.id("sum"), b.code(params, vec![body]))]
        }),
        ("comment", |b| {
            let call = b.call(b.id("f"), Vec::new());
            let comment = b.line_comment(" explained");
            b.attach_comment(call, comment);
            vec![call]
        }),
        ("stray break", |b| vec![b.brk()]),
    ]
}

fn collect_tree_text(tree: &Value, out: &mut Vec<String>) {
    match tree {
        Value::Object(map) => {
            match map.get("type").and_then(Value::as_str) {
                Some("Identifier") => {
                    if let Some(name) = map.get("name").and_then(Value::as_str) {
                        out.push(name.to_string());
                    }
                }
                Some("NumericLiteral") => {
                    let raw = map.get("extra").and_then(|extra| extra.get("raw"));
                    if let Some(raw) = raw.and_then(Value::as_str) {
                        out.push(raw.to_string());
                    }
                }
                Some("CommentLine" | "CommentBlock") => {
                    if let Some(value) = map.get("value").and_then(Value::as_str) {
                        out.push(value.to_string());
                    }
                }
                _ => {}
            }
            for value in map.values() {
                collect_tree_text(value, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_tree_text(item, out);
            }
        }
        _ => {}
    }
}

#[test]
fn text_and_tree_outputs_agree_over_a_corpus() {
    for options in [CompileOptions::bare(), CompileOptions::default()] {
        for (label, build) in corpus() {
            let b = TreeBuilder::new();
            let statements = build(&b);
            let root = b.root(statements);
            let arena = b.finish();

            let text = compile_to_js(&arena, root, &options);
            let tree = compile_to_tree(&arena, root, &options);
            let (text, tree) = match (text, tree) {
                (Ok(text), Ok(tree)) => (text, tree),
                (Err(text_err), Err(tree_err)) => {
                    assert_eq!(text_err, tree_err, "{label}");
                    continue;
                }
                (text, tree) => panic!("{label}: outputs disagree: {text:?} / {tree:?}"),
            };
            assert_eq!(tree["type"], "File", "{label}");
            let mut pieces = Vec::new();
            collect_tree_text(&tree, &mut pieces);
            assert!(!pieces.is_empty(), "{label}");
            for piece in pieces {
                assert!(
                    text.contains(&piece),
                    "{label}: `{piece}` is in the tree but not in:\n{text}"
                );
            }
        }
    }
}
