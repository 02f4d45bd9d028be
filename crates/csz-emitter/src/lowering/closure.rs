//! Closure wrapping of statements used as expressions.
//!
//! A statement whose value is needed (`x = for ...`, `f(try a catch e then b)`)
//! is moved into an immediately-invoked function whose body returns its
//! value. The wrapper shares its parent's scope so variables assigned inside
//! stay visible outside.

use super::{Compiler, FnCtx, FnKind};
use crate::ir::{JsFunction, JsKind, JsNode};
use csz_ast::{NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

impl Compiler<'_> {
    /// Wrap a statement so it can be used as an expression.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn compile_closure(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        if let Some(jump) = self.jumps(idx) {
            return Err(self.error(messages::PURE_STATEMENT_IN_EXPRESSION, &[], jump));
        }
        let mut has_super = |_: NodeIndex, kind: &NodeKind| {
            matches!(kind, NodeKind::SuperCall { .. } | NodeKind::Super { .. })
        };
        let bound = self.subtree_has(idx, &mut has_super);
        let uses_arguments = !bound && self.uses_arguments(idx);
        let uses_this = !bound && !uses_arguments && self.uses_this(idx);
        let generator = self.contains_operator(idx, &["yield", "yield*", "yieldfrom", "yield from"]);
        let is_async = self.contains_operator(idx, &["await"]);

        let parent = self.scope();
        let scope = self.scopes.push(parent, true);
        let body = self.with_fn(FnCtx::new(FnKind::Closure, scope), |compiler| {
            let returned = compiler.make_return(idx, None)?;
            let lowered = compiler.lower_stmt(returned)?;
            let mut statements = compiler.scope_declarations(scope);
            statements.extend(crate::ir::flatten_statements(vec![lowered]));
            Ok(statements)
        })?;

        let func = JsNode::new(JsKind::Function(Box::new(JsFunction {
            name: None,
            params: Vec::new(),
            body,
            arrow: bound,
            generator,
            is_async,
            spaced: false,
        })));
        let call = if uses_arguments {
            JsNode::method_call(func, "apply", vec![JsNode::this(), JsNode::id("arguments")])
        } else if uses_this {
            JsNode::method_call(func, "call", vec![JsNode::this()])
        } else {
            JsNode::call(func, Vec::new())
        };
        Ok(if generator {
            JsNode::new(JsKind::Yield {
                argument: Some(Box::new(call)),
                delegate: true,
            })
        } else if is_async {
            JsNode::new(JsKind::Await(Box::new(call)))
        } else {
            call
        })
    }
}
