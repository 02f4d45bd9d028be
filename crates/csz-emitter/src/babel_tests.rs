use super::*;
use csz_common::{Position, Span};

fn loc(start: u32, end: u32) -> SourceLocation {
    SourceLocation::new(Position::new(0, start), Position::new(0, end), Span::new(start, end))
}

#[test]
fn located_node_carries_location_fields() {
    let node = JsNode::at(JsKind::Identifier("a".into()), Some(loc(4, 5)));
    let tree = node_to_tree(&node);
    assert_eq!(tree["type"], "Identifier");
    assert_eq!(tree["name"], "a");
    assert_eq!(tree["start"], 4);
    assert_eq!(tree["end"], 5);
    assert_eq!(tree["range"], json!([4, 5]));
    assert_eq!(tree["loc"]["start"]["line"], 1);
    assert_eq!(tree["loc"]["end"]["column"], 5);
}

#[test]
fn synthetic_children_inherit_parent_location() {
    let call = JsNode::call(JsNode::id("f"), vec![JsNode::number("1")]).located(Some(loc(0, 4)));
    let tree = node_to_tree(&call);
    assert_eq!(tree["type"], "CallExpression");
    assert_eq!(tree["callee"]["start"], 0);
    assert_eq!(tree["arguments"][0]["type"], "NumericLiteral");
    assert_eq!(tree["arguments"][0]["value"], 1);
    assert_eq!(tree["arguments"][0]["extra"]["raw"], "1");
    assert_eq!(tree["arguments"][0]["end"], 4);
}

#[test]
fn logical_and_update_operators_get_their_own_types() {
    let logical = JsNode::binary(JsNode::id("a"), "&&", JsNode::id("b"));
    assert_eq!(node_to_tree(&logical)["type"], "LogicalExpression");
    let binary = JsNode::binary(JsNode::id("a"), "+", JsNode::id("b"));
    assert_eq!(node_to_tree(&binary)["type"], "BinaryExpression");
    let update = JsNode::unary("++", JsNode::id("a"));
    assert_eq!(node_to_tree(&update)["type"], "UpdateExpression");
    let void = node_to_tree(&JsNode::undefined());
    assert_eq!(void["operator"], "void");
    assert_eq!(void["argument"]["value"], 0);
}

#[test]
fn negative_number_is_a_negation() {
    let tree = node_to_tree(&JsNode::number("-1"));
    assert_eq!(tree["type"], "UnaryExpression");
    assert_eq!(tree["operator"], "-");
    assert_eq!(tree["argument"]["value"], 1);
}

#[test]
fn numeric_values_follow_radix_prefixes() {
    assert_eq!(numeric_value("0x1F"), json!(31));
    assert_eq!(numeric_value("0b101"), json!(5));
    assert_eq!(numeric_value("1_000"), json!(1000));
    assert_eq!(numeric_value("2.5"), json!(2.5));
    assert_eq!(numeric_value("1e400"), Value::Null);
}

#[test]
fn bare_statement_list_has_no_type() {
    let node = JsNode::statements(vec![JsNode::expr_stmt(JsNode::id("a"))]);
    let tree = node_to_tree(&node);
    assert!(tree.get("type").is_none());
    assert_eq!(tree["body"][0]["type"], "ExpressionStatement");
}

#[test]
fn paren_marks_the_inner_node() {
    let node = JsNode::binary(JsNode::id("a"), "+", JsNode::id("b")).paren();
    let tree = node_to_tree(&node);
    assert_eq!(tree["type"], "BinaryExpression");
    assert_eq!(tree["extra"]["parenthesized"], true);
}

#[test]
fn comments_are_flagged_and_collected() {
    let comment = Comment::line(" note", loc(0, 7));
    let statement = JsNode::expr_stmt(JsNode::id("a")).with_comments(vec![comment]);
    let program = JsProgram {
        body: vec![statement],
        ..JsProgram::default()
    };
    let tree = program_to_tree(&program);
    let first = &tree["program"]["body"][0];
    assert_eq!(first["comments"][0]["type"], "CommentLine");
    assert_eq!(first["comments"][0]["value"], " note");
    assert_eq!(first["comments"][0]["leading"], true);
    assert_eq!(first["comments"][0]["trailing"], false);
    assert_eq!(tree["comments"].as_array().map(Vec::len), Some(1));
}

#[test]
fn wrapped_program_is_a_call_with_this() {
    let program = JsProgram {
        body: vec![JsNode::expr_stmt(JsNode::id("a"))],
        wrapped: true,
        ..JsProgram::default()
    };
    let tree = program_to_tree(&program);
    assert_eq!(tree["type"], "File");
    assert_eq!(tree["program"]["sourceType"], "script");
    let expression = &tree["program"]["body"][0]["expression"];
    assert_eq!(expression["type"], "CallExpression");
    assert_eq!(expression["callee"]["property"]["name"], "call");
    assert_eq!(expression["arguments"][0]["type"], "ThisExpression");
    let inner = &expression["callee"]["object"]["body"]["body"][0];
    assert_eq!(inner["expression"]["name"], "a");
}

#[test]
fn directives_are_split_from_the_body() {
    let program = JsProgram {
        body: vec![
            JsNode::expr_stmt(JsNode::string("use strict")),
            JsNode::expr_stmt(JsNode::id("a")),
        ],
        ..JsProgram::default()
    };
    let tree = program_to_tree(&program);
    assert_eq!(tree["program"]["directives"][0]["value"]["value"], "use strict");
    assert_eq!(tree["program"]["body"].as_array().map(Vec::len), Some(1));
}

#[test]
fn module_program_has_module_source_type() {
    let program = JsProgram {
        body: vec![JsNode::new(JsKind::ExportAll {
            source: "m".into(),
        })],
        ..JsProgram::default()
    };
    let tree = program_to_tree(&program);
    assert_eq!(tree["program"]["sourceType"], "module");
    assert_eq!(tree["program"]["body"][0]["type"], "ExportAllDeclaration");
    assert_eq!(tree["program"]["body"][0]["source"]["value"], "m");
}

#[test]
fn function_params_map_to_patterns() {
    let params = vec![
        JsParam::new("a").with_default(JsNode::number("1")),
        JsParam::rest("rest"),
    ];
    let tree = node_to_tree(&JsNode::function(params, Vec::new()));
    assert_eq!(tree["type"], "FunctionExpression");
    assert_eq!(tree["params"][0]["type"], "AssignmentPattern");
    assert_eq!(tree["params"][0]["left"]["name"], "a");
    assert_eq!(tree["params"][1]["type"], "RestElement");
    assert_eq!(tree["body"]["type"], "BlockStatement");
}
