//! Literals, property chains, `this`, templates and grouping.

use super::{Compiler, CtorKind, FnKind};
use crate::ir::{JsKind, JsNode};
use csz_ast::{NodeAccess, NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

impl Compiler<'_> {
    /// `base.a[b]...`
    pub(crate) fn lower_value(
        &mut self,
        base: NodeIndex,
        properties: &[NodeIndex],
    ) -> CompileResult<JsNode> {
        let mut node = self.lower_expr(base)?;
        for &prop in properties {
            node = self.apply_property(node, prop)?;
        }
        Ok(node)
    }

    /// Apply one access, index or slice to an already-lowered object.
    pub(crate) fn apply_property(&mut self, object: JsNode, prop: NodeIndex) -> CompileResult<JsNode> {
        let loc = self.loc(prop);
        let node = match self.kind(prop)? {
            NodeKind::Access { name, .. } => {
                let Some(text) = self.tree.identifier_text(name) else {
                    return Err(self.error(messages::UNEXPECTED_NODE, &["property name"], name));
                };
                JsNode::prop(object, text)
            }
            NodeKind::Index { index, .. } => {
                let index = self.lower_expr(index)?;
                JsNode::elem(object, index)
            }
            NodeKind::Slice { range } => self.lower_slice(object, range)?,
            other => return Err(self.error(messages::UNEXPECTED_NODE, &[other.name()], prop)),
        };
        Ok(node.located(loc))
    }

    /// `this`, which names the class inside an executable class body.
    pub(crate) fn lower_this(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let owner = &self.fns[self.this_ctx_index()];
        match &owner.kind {
            FnKind::ClassBody { name } => Ok(JsNode::id(name.clone())),
            FnKind::Method(info)
                if info.ctor == Some(CtorKind::Derived) && !owner.super_called =>
            {
                Err(self.error(messages::THIS_BEFORE_SUPER, &[], idx))
            }
            _ => Ok(JsNode::this()),
        }
    }

    /// Interpolated string: literal parts become quasis, the rest expressions.
    pub(crate) fn lower_template(&mut self, parts: &[NodeIndex]) -> CompileResult<JsNode> {
        let mut quasis = vec![String::new()];
        let mut expressions = Vec::new();
        for &part in parts {
            if let Some(NodeKind::StringLiteral { value }) = self.tree.kind(part) {
                if let Some(last) = quasis.last_mut() {
                    last.push_str(value);
                }
                continue;
            }
            expressions.push(self.lower_expr(part)?);
            quasis.push(String::new());
        }
        Ok(JsNode::new(JsKind::Template {
            quasis,
            expressions,
        }))
    }

    /// Explicit grouping. A body of several expressions becomes a sequence.
    pub(crate) fn lower_parens(&mut self, body: NodeIndex) -> CompileResult<JsNode> {
        let inner = self.unwrap_block(body);
        let node = self.lower_expr(inner)?;
        Ok(node.paren())
    }

    /// A block whose value is used: its expressions joined by commas.
    pub(crate) fn lower_block_expr(&mut self, expressions: &[NodeIndex]) -> CompileResult<JsNode> {
        if expressions.is_empty() {
            return Ok(JsNode::undefined());
        }
        let mut items = Vec::with_capacity(expressions.len());
        for &expression in expressions {
            items.push(self.lower_expr(expression)?);
        }
        Ok(JsNode::sequence(items))
    }

    /// Object key: `(key, computed)`.
    pub(crate) fn lower_property_key(&mut self, idx: NodeIndex) -> CompileResult<(JsNode, bool)> {
        let target = self.unwrap(idx);
        let loc = self.loc(target);
        let key = match self.kind(target)? {
            NodeKind::Identifier { name } | NodeKind::PropertyName { name } => JsNode::id(name),
            NodeKind::StringLiteral { value } => JsNode::string(value),
            NodeKind::NumberLiteral { value } => JsNode::number(value),
            NodeKind::ComputedPropertyName { expression } => {
                return Ok((self.lower_expr(expression)?.located(loc), true));
            }
            NodeKind::Template { .. } => return Ok((self.lower_expr(target)?, true)),
            other => return Err(self.error(messages::UNEXPECTED_NODE, &[other.name()], target)),
        };
        Ok((key.located(loc), false))
    }
}
