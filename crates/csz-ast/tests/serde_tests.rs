//! Trees cross process boundaries as JSON.

use csz_ast::{AssignContext, NodeAccess, NodeArena, NodeKind, TreeBuilder};
use serde_json::json;

#[test]
fn node_kind_uses_type_tag() {
    let kind = NodeKind::Identifier {
        name: "a".to_string(),
    };
    let value = serde_json::to_value(&kind).unwrap();
    assert_eq!(value, json!({ "type": "Identifier", "name": "a" }));
}

#[test]
fn compound_context_carries_operator() {
    let value = serde_json::to_value(AssignContext::Compound("+=".to_string())).unwrap();
    assert_eq!(value, json!({ "kind": "compound", "operator": "+=" }));
    let plain: AssignContext = serde_json::from_value(json!({ "kind": "plain" })).unwrap();
    assert_eq!(plain, AssignContext::Plain);
}

#[test]
fn arena_survives_json() {
    let b = TreeBuilder::new();
    let f = b.id("f");
    let call = b.soak_call(f, vec![]);
    let comment = b.block_comment(" c ");
    b.attach_comment(call, comment);
    let root = b.root(vec![call]);
    let arena = b.finish();

    let text = serde_json::to_string(&arena).unwrap();
    let back: NodeArena = serde_json::from_str(&text).unwrap();
    assert_eq!(back, arena);
    assert!(matches!(back.kind(root), Some(NodeKind::Root { .. })));
}

#[test]
fn defaults_fill_omitted_flags() {
    let node: csz_ast::Node = serde_json::from_value(json!({
        "type": "Op",
        "operator": "!",
        "first": 0,
        "second": null
    }))
    .unwrap();
    assert!(matches!(node.kind, NodeKind::Op { flip: false, .. }));
    assert!(node.location.is_none());
    assert!(node.comments.is_empty());
}
