//! Tests for arena storage, tree walks and location handling.

use csz_ast::{NodeAccess, NodeArena, NodeIndex, NodeKind, TreeBuilder};
use csz_common::{Position, SourceLocation, Span};

fn loc(start: u32, end: u32) -> SourceLocation {
    SourceLocation::on_line(0, start, end, Span::new(start, end))
}

#[test]
fn add_and_get_round_trip() {
    let mut arena = NodeArena::new();
    assert!(arena.is_empty());
    let idx = arena.add_kind(NodeKind::Identifier {
        name: "a".to_string(),
    });
    assert_eq!(arena.len(), 1);
    assert_eq!(arena.identifier_text(idx), Some("a"));
    assert!(arena.exists(idx));
    assert!(!arena.exists(NodeIndex(7)));
}

#[test]
fn location_is_immutable_unless_forced() {
    let mut arena = NodeArena::new();
    let idx = arena.add_kind(NodeKind::NullLiteral);
    assert!(arena.set_location(idx, loc(4, 8), false));
    assert!(!arena.set_location(idx, loc(0, 8), false));
    assert_eq!(arena.location(idx), Some(loc(4, 8)));

    // A prefix operator discovered to the left widens the node.
    assert!(arena.set_location(idx, loc(0, 8), true));
    assert_eq!(arena.location(idx).map(|l| l.start), Some(Position::new(0, 0)));
}

#[test]
fn update_location_fills_only_missing_descendants() {
    let mut arena = NodeArena::new();
    let a = arena.add_kind(NodeKind::Identifier {
        name: "a".to_string(),
    });
    let b = arena.add_kind(NodeKind::Identifier {
        name: "b".to_string(),
    });
    arena.set_location(b, loc(10, 11), false);
    let op = arena.add_kind(NodeKind::Op {
        operator: "+".to_string(),
        first: a,
        second: Some(b),
        flip: false,
    });
    arena.update_location_if_missing(op, loc(0, 20));
    assert_eq!(arena.location(op), Some(loc(0, 20)));
    assert_eq!(arena.location(a), Some(loc(0, 20)));
    assert_eq!(arena.location(b), Some(loc(10, 11)));
}

#[test]
fn children_follow_declared_order() {
    let b = TreeBuilder::new();
    let cond = b.id("x");
    let then = b.num("1");
    let other = b.num("2");
    let node = b.if_(cond, vec![then], Some(vec![other]));
    let arena = b.finish();
    let children = arena.get_children(node);
    assert_eq!(children.len(), 3);
    assert_eq!(children[0], cond);
    assert!(matches!(
        arena.kind(children[1]),
        Some(NodeKind::Block { expressions }) if expressions == &vec![then]
    ));
}

#[test]
fn contains_stops_at_function_boundaries() {
    let b = TreeBuilder::new();
    let inner_this = b.this();
    let func = b.code(vec![], vec![inner_this]);
    let block = b.block(vec![func]);
    let arena = b.finish();

    let mut is_this = |_: NodeIndex, kind: &NodeKind| matches!(kind, NodeKind::ThisLiteral);
    assert!(!arena.contains(block, false, &mut is_this));
    assert!(arena.contains(block, true, &mut is_this));

    // The function node itself is still offered to the predicate.
    let mut is_code = |_: NodeIndex, kind: &NodeKind| matches!(kind, NodeKind::Code { .. });
    assert_eq!(arena.find_descendant(block, false, &mut is_code), Some(func));
}

#[test]
fn chain_extends_existing_values() {
    let b = TreeBuilder::new();
    let a = b.id("a");
    let ab = b.dot(a, "b");
    let abc = b.soak_dot(ab, "c");
    let arena = b.finish();
    let Some(NodeKind::Value { base, properties }) = arena.kind(abc) else {
        panic!("expected a value chain");
    };
    assert_eq!(*base, a);
    assert_eq!(properties.len(), 2);
    assert!(matches!(
        arena.kind(properties[1]),
        Some(NodeKind::Access { soak: true, .. })
    ));
}

#[test]
fn builder_locations_are_distinct() {
    let b = TreeBuilder::new();
    let x = b.id("x");
    let y = b.id("y");
    let c = b.line_comment(" note");
    b.attach_comment(y, c.clone());
    let arena = b.finish();
    assert_ne!(arena.location(x), arena.location(y));
    assert_ne!(Some(c.location), arena.location(y));
    assert_eq!(arena.get(y).map(|n| n.comments.len()), Some(1));
}
