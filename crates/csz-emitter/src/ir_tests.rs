use super::*;

#[test]
fn sequence_of_one_is_the_item() {
    let node = JsNode::sequence(vec![JsNode::id("a")]);
    assert_eq!(node.as_identifier(), Some("a"));
    let node = JsNode::sequence(vec![JsNode::id("a"), JsNode::id("b")]);
    assert!(matches!(node.kind, JsKind::Sequence(ref items) if items.len() == 2));
}

#[test]
fn flatten_unwraps_nested_statement_lists() {
    let inner = JsNode::statements(vec![
        JsNode::expr_stmt(JsNode::id("b")),
        JsNode::statements(vec![JsNode::expr_stmt(JsNode::id("c"))]),
    ]);
    let flat = flatten_statements(vec![JsNode::expr_stmt(JsNode::id("a")), inner]);
    assert_eq!(flat.len(), 3);
    assert!(flat.iter().all(|n| matches!(n.kind, JsKind::ExprStmt(_))));
}

#[test]
fn jump_detection_looks_at_last_statement() {
    let block = JsNode::new(JsKind::Block(vec![
        JsNode::expr_stmt(JsNode::id("a")),
        JsNode::new(JsKind::Break(None)),
    ]));
    assert!(block.is_jump());
    assert!(!JsNode::expr_stmt(JsNode::id("a")).is_jump());
}

#[test]
fn simple_nodes_need_no_cache() {
    assert!(JsNode::id("a").is_simple());
    assert!(JsNode::this().is_simple());
    assert!(!JsNode::call(JsNode::id("f"), vec![]).is_simple());
    assert!(!JsNode::prop(JsNode::id("a"), "b").is_simple());
}
