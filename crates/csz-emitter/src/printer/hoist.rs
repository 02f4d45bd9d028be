//! Hoist-target substitution.
//!
//! Lowering reserves a slot and leaves a `Hoisted(slot)` placeholder where
//! the content must appear; the content is produced later, against the state
//! of its own lexical position. Before printing, every placeholder is
//! replaced with its slot's content, recursively, since hoisted content may
//! itself hold placeholders.

use crate::ir::{JsKind, JsNode};

pub fn substitute(mut node: JsNode, slots: &[Option<JsNode>]) -> JsNode {
    substitute_in_place(&mut node, slots, 0);
    node
}

fn substitute_in_place(node: &mut JsNode, slots: &[Option<JsNode>], depth: usize) {
    if let JsKind::Hoisted(slot) = node.kind {
        // A slot can only be filled with content lowered after it was
        // reserved, so nesting is bounded by the number of slots.
        let content = match slots.get(slot) {
            Some(Some(content)) if depth <= slots.len() => content.clone(),
            _ => JsNode::statements(Vec::new()),
        };
        let comments = std::mem::take(&mut node.comments);
        *node = content.with_comments(comments);
        substitute_in_place(node, slots, depth + 1);
        return;
    }
    crate::ensure_stack(|| {
        for_each_child(node, &mut |child| substitute_in_place(child, slots, depth));
    });
}

fn each(items: &mut [JsNode], f: &mut dyn FnMut(&mut JsNode)) {
    for item in items {
        f(item);
    }
}

/// Apply `f` to every direct child of `node`.
pub(crate) fn for_each_child(node: &mut JsNode, f: &mut dyn FnMut(&mut JsNode)) {
    match &mut node.kind {
        JsKind::Template { expressions, .. } => each(expressions, f),
        JsKind::Member { object, .. } => f(object),
        JsKind::Index { object, index } => {
            f(object);
            f(index);
        }
        JsKind::Call { callee, args } | JsKind::New { callee, args } => {
            f(callee);
            each(args, f);
        }
        JsKind::Unary { operand, .. } => f(operand),
        JsKind::Binary { left, right, .. } => {
            f(left);
            f(right);
        }
        JsKind::Assign { target, value, .. } => {
            f(target);
            f(value);
        }
        JsKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            f(test);
            f(consequent);
            f(alternate);
        }
        JsKind::Sequence(items)
        | JsKind::Object(items)
        | JsKind::Block(items)
        | JsKind::Statements(items) => each(items, f),
        JsKind::Array(items) => items.iter_mut().flatten().for_each(&mut *f),
        JsKind::Property { key, value, .. } => {
            f(key);
            f(value);
        }
        JsKind::Spread(inner)
        | JsKind::Await(inner)
        | JsKind::Paren(inner)
        | JsKind::ExprStmt(inner)
        | JsKind::Throw(inner)
        | JsKind::ExportDefault(inner)
        | JsKind::ExportDeclaration(inner) => f(inner),
        JsKind::Function(func) => {
            for param in &mut func.params {
                f(&mut param.target);
                if let Some(default) = &mut param.default_value {
                    f(default);
                }
            }
            each(&mut func.body, f);
        }
        JsKind::Class(class) => {
            if let Some(superclass) = &mut class.superclass {
                f(superclass);
            }
            each(&mut class.members, f);
        }
        JsKind::Method { key, func, .. } => {
            f(key);
            each(&mut func.body, f);
        }
        JsKind::Yield { argument, .. } | JsKind::Return(argument) => {
            if let Some(argument) = argument {
                f(argument);
            }
        }
        JsKind::VarDecl(declarators) => {
            declarators
                .iter_mut()
                .filter_map(|(_, init)| init.as_mut())
                .for_each(&mut *f);
        }
        JsKind::If {
            test,
            consequent,
            alternate,
        } => {
            f(test);
            each(consequent, f);
            if let Some(alternate) = alternate {
                f(alternate);
            }
        }
        JsKind::While { test, body } => {
            f(test);
            each(body, f);
        }
        JsKind::For {
            init,
            test,
            update,
            body,
        } => {
            for part in [init, test, update].into_iter().flatten() {
                f(part);
            }
            each(body, f);
        }
        JsKind::ForIn { left, right, body } | JsKind::ForOf { left, right, body } => {
            f(left);
            f(right);
            each(body, f);
        }
        JsKind::Switch {
            discriminant,
            cases,
        } => {
            f(discriminant);
            for case in cases {
                if let Some(test) = &mut case.test {
                    f(test);
                }
                each(&mut case.body, f);
            }
        }
        JsKind::Try {
            block,
            param,
            handler,
            finalizer,
        } => {
            each(block, f);
            if let Some(param) = param {
                f(param);
            }
            if let Some(handler) = handler {
                each(handler, f);
            }
            if let Some(finalizer) = finalizer {
                each(finalizer, f);
            }
        }
        JsKind::Number(_)
        | JsKind::Str(_)
        | JsKind::Bool(_)
        | JsKind::Null
        | JsKind::Undefined
        | JsKind::Regex { .. }
        | JsKind::Raw(_)
        | JsKind::Identifier(_)
        | JsKind::This
        | JsKind::Super
        | JsKind::Break(_)
        | JsKind::Continue(_)
        | JsKind::Debugger
        | JsKind::Import { .. }
        | JsKind::ExportNamed { .. }
        | JsKind::ExportAll { .. }
        | JsKind::Hoisted(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_replaced_recursively() {
        let slots = vec![
            Some(JsNode::statements(vec![JsNode::new(JsKind::Hoisted(1))])),
            Some(JsNode::expr_stmt(JsNode::id("inner"))),
        ];
        let body = JsNode::new(JsKind::Block(vec![JsNode::new(JsKind::Hoisted(0))]));
        let JsKind::Block(items) = substitute(body, &slots).kind else {
            panic!("expected a block");
        };
        let JsKind::Statements(inner) = &items[0].kind else {
            panic!("expected the hoisted statements");
        };
        assert!(matches!(&inner[0].kind, JsKind::ExprStmt(e) if e.as_identifier() == Some("inner")));
    }

    #[test]
    fn empty_slot_prints_nothing() {
        let node = substitute(JsNode::new(JsKind::Hoisted(0)), &[None]);
        assert!(matches!(node.kind, JsKind::Statements(ref items) if items.is_empty()));
    }
}
