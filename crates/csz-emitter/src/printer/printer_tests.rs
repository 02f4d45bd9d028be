use super::*;
use crate::ir::{JsCase, JsClass};
use csz_common::{Comment, Span};

fn top(node: &JsNode) -> String {
    print_to_string(node, Level::Top, "  ")
}

fn expr(node: &JsNode, level: Level) -> String {
    print_to_string(node, level, "  ")
}

fn id(name: &str) -> JsNode {
    JsNode::id(name)
}

#[test]
fn groups_lower_precedence_operands() {
    let sum = JsNode::binary(id("a"), "+", id("b"));
    let product = JsNode::binary(sum, "*", id("c"));
    assert_eq!(expr(&product, Level::Paren), "(a + b) * c");

    let inner = JsNode::binary(id("b"), "-", id("c"));
    let outer = JsNode::binary(id("a"), "-", inner);
    assert_eq!(expr(&outer, Level::Paren), "a - (b - c)");

    let left = JsNode::binary(JsNode::binary(id("a"), "-", id("b")), "-", id("c"));
    assert_eq!(expr(&left, Level::Paren), "a - b - c");
}

#[test]
fn exponent_groups_to_the_right() {
    let right = JsNode::binary(id("a"), "**", JsNode::binary(id("b"), "**", id("c")));
    assert_eq!(expr(&right, Level::Paren), "a ** b ** c");
    let negated = JsNode::binary(JsNode::unary("-", id("a")), "**", id("b"));
    assert_eq!(expr(&negated, Level::Paren), "(-a) ** b");
}

#[test]
fn caller_level_decides_grouping() {
    let cond = JsNode::conditional(id("a"), id("b"), id("c"));
    assert_eq!(expr(&cond, Level::List), "a ? b : c");
    assert_eq!(expr(&cond, Level::Op), "(a ? b : c)");
    let sum = JsNode::binary(cond, "+", JsNode::number("1"));
    assert_eq!(expr(&sum, Level::Paren), "(a ? b : c) + 1");
}

#[test]
fn sequence_is_grouped_as_an_argument() {
    let seq = JsNode::sequence(vec![id("a"), id("b")]);
    let call = JsNode::call(id("f"), vec![seq, id("c")]);
    assert_eq!(expr(&call, Level::Paren), "f((a, b), c)");
}

#[test]
fn function_callee_and_statement_start_are_grouped() {
    let func = JsNode::function(Vec::new(), Vec::new());
    let call = JsNode::method_call(func, "call", vec![JsNode::this()]);
    assert_eq!(top(&JsNode::expr_stmt(call)), "(function() {}).call(this);");

    let object = JsNode::new(JsKind::Object(Vec::new()));
    assert_eq!(top(&JsNode::expr_stmt(object)), "({});");
}

#[test]
fn integer_literal_is_grouped_before_a_property() {
    let call = JsNode::method_call(JsNode::number("5"), "toString", Vec::new());
    assert_eq!(expr(&call, Level::Paren), "(5).toString()");
    let call = JsNode::method_call(JsNode::number("5.5"), "toFixed", Vec::new());
    assert_eq!(expr(&call, Level::Paren), "5.5.toFixed()");
}

#[test]
fn repeated_signs_are_separated() {
    let node = JsNode::unary("-", JsNode::unary("-", id("a")));
    assert_eq!(expr(&node, Level::Paren), "- -a");
    let node = JsNode::not(JsNode::not(id("a")));
    assert_eq!(expr(&node, Level::Paren), "!!a");
    let node = JsNode::unary("typeof", id("a"));
    assert_eq!(expr(&node, Level::Paren), "typeof a");
}

#[test]
fn prints_if_else_chain() {
    let inner = JsNode::if_stmt(id("b"), vec![JsNode::expr_stmt(id("y"))], None);
    let node = JsNode::new(JsKind::If {
        test: Box::new(id("a")),
        consequent: vec![JsNode::expr_stmt(id("x"))],
        alternate: Some(Box::new(inner)),
    });
    assert_eq!(top(&node), "if (a) {\n  x;\n} else if (b) {\n  y;\n}");
}

#[test]
fn prints_switch_with_default() {
    let node = JsNode::new(JsKind::Switch {
        discriminant: Box::new(id("a")),
        cases: vec![
            JsCase {
                test: Some(JsNode::number("1")),
                body: vec![JsNode::expr_stmt(id("x")), JsNode::new(JsKind::Break(None))],
            },
            JsCase {
                test: None,
                body: vec![JsNode::expr_stmt(id("y"))],
            },
        ],
    });
    assert_eq!(
        top(&node),
        "switch (a) {\n  case 1:\n    x;\n    break;\n  default:\n    y;\n}"
    );
}

#[test]
fn named_class_statement_is_a_declaration() {
    let class = JsNode::new(JsKind::Class(Box::new(JsClass {
        name: Some("A".to_string()),
        superclass: Some(id("B")),
        members: Vec::new(),
    })));
    assert_eq!(top(&JsNode::expr_stmt(class)), "class A extends B {}");
}

#[test]
fn program_wrapper_spaces_top_level_statements() {
    let program = JsProgram {
        body: vec![
            JsNode::var_decl("a", None),
            JsNode::expr_stmt(JsNode::assign(id("a"), JsNode::number("1"))),
        ],
        comments: Vec::new(),
        loc: None,
        wrapped: true,
    };
    let text = fragments_to_text(&print_program(&program, "  "));
    assert_eq!(text, "(function() {\n  var a;\n\n  a = 1;\n\n}).call(this);\n");

    let bare = JsProgram {
        wrapped: false,
        ..program
    };
    let text = fragments_to_text(&print_program(&bare, "  "));
    assert_eq!(text, "var a;\n\na = 1;\n");
}

#[test]
fn empty_wrapped_program() {
    let program = JsProgram {
        wrapped: true,
        ..JsProgram::default()
    };
    let text = fragments_to_text(&print_program(&program, "  "));
    assert_eq!(text, "(function() {}).call(this);\n");
}

#[test]
fn leading_comment_is_placed_above_its_statement() {
    let location = SourceLocation::on_line(0, 0, 6, Span::new(0, 6));
    let commented = JsNode::expr_stmt(id("b")).with_comments(vec![Comment::line(" hi", location)]);
    let block = JsNode::new(JsKind::Block(vec![JsNode::expr_stmt(id("a")), commented]));
    assert_eq!(top(&block), "{\n  a;\n  // hi\n  b;\n}");
}

#[test]
fn quotes_strings() {
    assert_eq!(quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    assert_eq!(quote("\u{1}"), "\"\\x01\"");
}

#[test]
fn prints_import_and_export_lists() {
    let import = JsNode::new(JsKind::Import {
        default: Some("a".to_string()),
        namespace: None,
        specifiers: Some(vec![
            JsImportSpecifier {
                imported: "b".to_string(),
                local: "b".to_string(),
            },
            JsImportSpecifier {
                imported: "c".to_string(),
                local: "d".to_string(),
            },
        ]),
        source: "m".to_string(),
    });
    assert_eq!(top(&import), "import a, {b, c as d} from \"m\";");

    let export = JsNode::new(JsKind::ExportAll {
        source: "m".to_string(),
    });
    assert_eq!(top(&export), "export * from \"m\";");
}
