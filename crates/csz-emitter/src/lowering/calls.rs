//! Calls, `new`, and references to `super`.

use super::{Compiler, CtorKind, FnKind};
use crate::ir::{JsKind, JsNode};
use csz_ast::{NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

impl Compiler<'_> {
    pub(crate) fn lower_call(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::Call {
            callee,
            args,
            is_new,
            ..
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["call"], idx));
        };
        let callee = self.lower_expr(callee)?;
        let args = self.lower_arguments(&args)?;
        let kind = if is_new {
            JsKind::New {
                callee: Box::new(callee),
                args,
            }
        } else {
            JsKind::Call {
                callee: Box::new(callee),
                args,
            }
        };
        Ok(JsNode::new(kind))
    }

    /// Argument list; splats spread natively.
    pub(crate) fn lower_arguments(&mut self, args: &[NodeIndex]) -> CompileResult<Vec<JsNode>> {
        let mut out = Vec::with_capacity(args.len());
        for &arg in args {
            let node = match self.kind(arg)? {
                NodeKind::Splat { name } => {
                    let loc = self.loc(arg);
                    JsNode::at(JsKind::Spread(Box::new(self.lower_expr(name)?)), loc)
                }
                _ => self.lower_expr(arg)?,
            };
            out.push(node);
        }
        Ok(out)
    }

    /// `super(...)`: the parent constructor inside a constructor, the
    /// same-named parent method elsewhere.
    ///
    /// In a derived constructor the call releases the pending `this`
    /// assignments (`@param`s, bound method bindings), which follow it.
    pub(crate) fn lower_super_call(
        &mut self,
        idx: NodeIndex,
        args: &[NodeIndex],
        top: bool,
    ) -> CompileResult<JsNode> {
        let owner = self.this_ctx_index();
        let FnKind::Method(info) = self.fns[owner].kind.clone() else {
            return Err(self.error(messages::SUPER_OUTSIDE_METHOD, &[], idx));
        };
        let args = self.lower_arguments(args)?;
        let loc = self.loc(idx);

        if info.ctor.is_none() {
            let Some(key) = info.key else {
                return Err(self.error(messages::UNSUPPORTED_SUPER_REFERENCE, &[], idx));
            };
            let method = JsNode::prop(JsNode::new(JsKind::Super), key);
            return Ok(JsNode::at(
                JsKind::Call {
                    callee: Box::new(method),
                    args,
                },
                loc,
            ));
        }

        let call = JsNode::at(
            JsKind::Call {
                callee: Box::new(JsNode::new(JsKind::Super)),
                args,
            },
            loc,
        );
        self.fns[owner].super_called = true;
        let pending = std::mem::take(&mut self.fns[owner].pending_this);
        if pending.is_empty() || info.ctor != Some(CtorKind::Derived) {
            return Ok(call);
        }
        if top {
            let mut statements = vec![JsNode::expr_stmt(call)];
            statements.extend(pending.into_iter().map(JsNode::expr_stmt));
            return Ok(JsNode::statements(statements));
        }
        let temp = self.free_variable("ref", false);
        let mut items = vec![JsNode::assign(JsNode::id(temp.clone()), call)];
        items.extend(pending);
        items.push(JsNode::id(temp));
        Ok(JsNode::sequence(items).paren())
    }

    /// `super.name` / `super[expr]` inside a method.
    pub(crate) fn lower_super(
        &mut self,
        idx: NodeIndex,
        accessor: Option<NodeIndex>,
    ) -> CompileResult<JsNode> {
        let owner = self.this_ctx_index();
        if !matches!(self.fns[owner].kind, FnKind::Method(_)) {
            return Err(self.error(messages::SUPER_OUTSIDE_METHOD, &[], idx));
        }
        let Some(accessor) = accessor else {
            return Err(self.error(messages::UNSUPPORTED_SUPER_REFERENCE, &[], idx));
        };
        self.apply_property(JsNode::new(JsKind::Super), accessor)
    }
}
