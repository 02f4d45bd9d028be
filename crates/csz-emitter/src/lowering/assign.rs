//! Assignment: plain, compound, conditional and splice forms.
//!
//! Destructuring targets are handed to `destructure`; everything else ends
//! up as one `Assign` node, after the target has been validated and its
//! identifier declared in the current scope.

use super::Compiler;
use super::analysis::STRICT_PROSCRIBED;
use crate::ir::{JsKind, JsNode};
use crate::scope::VarKind;
use csz_ast::{AssignContext, NodeAccess, NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

impl Compiler<'_> {
    pub(crate) fn lower_assign(&mut self, idx: NodeIndex, top: bool) -> CompileResult<JsNode> {
        let NodeKind::Assign {
            variable,
            value,
            context,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["assignment"], idx));
        };
        match context {
            AssignContext::Object => {
                return Err(self.error(messages::UNEXPECTED_NODE, &["object property"], idx));
            }
            AssignContext::Compound(operator) => {
                return self.lower_compound_assign(idx, variable, value, &operator, top);
            }
            AssignContext::Plain => {}
        }

        let pattern = self.unwrap(variable);
        if matches!(
            self.tree.kind(pattern),
            Some(NodeKind::Arr { .. } | NodeKind::Obj { .. })
        ) {
            return self.lower_destructuring(pattern, value, top, false);
        }
        if self.is_splice(variable) {
            return self.lower_splice(variable, value, top);
        }

        self.check_assignable(variable)?;
        if let Some(name) = self.identifier_name(variable) {
            self.declare_assigned(variable, &name)?;
        }
        let target = self.lower_expr(variable)?;
        let class_name = self.assigned_name(variable);
        let value = self.lower_assigned_value(value, class_name)?;
        Ok(JsNode::assign(target, value))
    }

    /// Lower the right-hand side; an anonymous class takes the target's name.
    pub(crate) fn lower_assigned_value(
        &mut self,
        value: NodeIndex,
        name: Option<String>,
    ) -> CompileResult<JsNode> {
        let inner = self.unwrap(value);
        if let Some(NodeKind::Class { variable: None, .. }) = self.tree.kind(inner) {
            let loc = self.loc(value);
            let comments = self.take_comments(value);
            return Ok(self
                .lower_class_named(inner, name)?
                .located(loc)
                .with_comments(comments));
        }
        self.lower_expr(value)
    }

    /// Name a value assigned to `a` or `x.a` would take.
    fn assigned_name(&self, variable: NodeIndex) -> Option<String> {
        if let Some(name) = self.identifier_name(variable) {
            return Some(name);
        }
        let Some(NodeKind::Value { properties, .. }) = self.tree.kind(variable) else {
            return None;
        };
        match properties.last().and_then(|&p| self.tree.kind(p)) {
            Some(NodeKind::Access { name, .. }) => {
                self.tree.identifier_text(*name).map(str::to_string)
            }
            _ => None,
        }
    }

    /// Fail unless `variable` can be assigned to.
    pub(crate) fn check_assignable(&mut self, variable: NodeIndex) -> CompileResult<()> {
        if let Some(name) = self.identifier_name(variable)
            && STRICT_PROSCRIBED.contains(&name.as_str())
        {
            return Err(self.error(messages::RESERVED_WORD_ASSIGNMENT, &[&name], variable));
        }
        if self.is_assignable(variable) {
            return Ok(());
        }
        let text = self.provisional_text(variable);
        Err(self.error(messages::CANT_BE_ASSIGNED, &[&text], variable))
    }

    /// Declare an assigned identifier, refusing to overwrite an import.
    pub(crate) fn declare_assigned(&mut self, at: NodeIndex, name: &str) -> CompileResult<()> {
        let scope = self.scope();
        if matches!(self.scopes.kind_of(scope, name), Some(VarKind::Import)) {
            return Err(self.error(messages::IMPORT_READ_ONLY, &[name], at));
        }
        self.scopes.find(scope, name);
        Ok(())
    }

    fn lower_compound_assign(
        &mut self,
        idx: NodeIndex,
        variable: NodeIndex,
        value: NodeIndex,
        operator: &str,
        top: bool,
    ) -> CompileResult<JsNode> {
        if operator == "=" {
            let plain = self.synth(
                NodeKind::Assign {
                    variable,
                    value,
                    context: AssignContext::Plain,
                },
                idx,
            );
            return self.lower_assign(plain, top);
        }
        if !self.is_assignable(variable) {
            let text = self.provisional_text(variable);
            return Err(self.error(messages::CANT_BE_ASSIGNED, &[&text], variable));
        }
        if let Some(name) = self.identifier_name(variable) {
            let scope = self.scope();
            if matches!(self.scopes.kind_of(scope, &name), Some(VarKind::Import)) {
                return Err(self.error(messages::IMPORT_READ_ONLY, &[&name], variable));
            }
        }
        match operator {
            "?=" | "||=" | "&&=" => self.lower_conditional_assign(variable, value, operator, top),
            "//=" | "%%=" => {
                let (left, right) = self.cache_reference(variable)?;
                let target = self.lower_expr(left)?;
                let read = self.lower_expr(right)?;
                let value = self.lower_expr(value)?;
                let math = self.special_math(&operator[..operator.len() - 1], read, value);
                Ok(JsNode::assign(target, math))
            }
            _ => {
                let target = self.lower_expr(variable)?;
                let value = self.lower_expr(value)?;
                Ok(JsNode::assign_op(operator, target, value))
            }
        }
    }

    /// `a ?= b`, `a ||= b`, `a &&= b`.
    fn lower_conditional_assign(
        &mut self,
        variable: NodeIndex,
        value: NodeIndex,
        operator: &str,
        top: bool,
    ) -> CompileResult<JsNode> {
        let (left, right) = self.cache_reference(variable)?;
        if let Some(name) = self.identifier_name(left)
            && !self.scopes.check(self.scope(), &name)
        {
            return Err(self.error(
                messages::CONDITIONAL_ASSIGN_UNDECLARED,
                &[&name, operator],
                variable,
            ));
        }
        let read = self.lower_expr(left)?;
        let target = self.lower_expr(right)?;
        let value = self.lower_expr(value)?;
        let assign = JsNode::assign(target.clone(), value);
        if operator == "?=" {
            if top {
                let missing = self.existence_check(left, read, false, true);
                return Ok(JsNode::if_stmt(missing, vec![JsNode::expr_stmt(assign)], None));
            }
            let present = self.existence_check(left, read, false, false);
            return Ok(JsNode::conditional(present, target, assign));
        }
        let logical = if operator == "||=" { "||" } else { "&&" };
        Ok(JsNode::binary(read, logical, assign))
    }

    fn is_splice(&self, variable: NodeIndex) -> bool {
        let Some(NodeKind::Value { properties, .. }) = self.tree.kind(variable) else {
            return false;
        };
        matches!(
            properties.last().and_then(|&p| self.tree.kind(p)),
            Some(NodeKind::Slice { .. })
        )
    }

    /// `a[i..j] = v`  =>  `splice.apply(a, [i, j - i + 1].concat(v)), v`
    fn lower_splice(
        &mut self,
        variable: NodeIndex,
        value: NodeIndex,
        top: bool,
    ) -> CompileResult<JsNode> {
        let NodeKind::Value { base, properties } = self.kind(variable)? else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["splice"], variable));
        };
        let Some((&slice, head)) = properties.split_last() else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["splice"], variable));
        };
        let NodeKind::Slice { range } = self.kind(slice)? else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["splice"], slice));
        };
        let NodeKind::Range {
            from,
            to,
            exclusive,
        } = self.kind(range)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["slice"], range));
        };
        let object = self.lower_value(base, head)?;

        let (from_decl, from_ref) = match from {
            Some(from) => {
                let (decl, read) = self.cache_value(from, "ref", false);
                (self.lower_expr(decl)?, self.lower_expr(read)?)
            }
            None => (JsNode::number("0"), JsNode::number("0")),
        };
        let count = match to {
            None => JsNode::number("9e9"),
            Some(to) => {
                let literal = from
                    .map_or(Some(0), |f| self.integer_literal(f))
                    .zip(self.integer_literal(to));
                match literal {
                    Some((start, end)) => {
                        let count = end - start + i64::from(!exclusive);
                        JsNode::number(count.to_string())
                    }
                    None => {
                        let end = self.lower_expr(to)?;
                        let span = JsNode::binary(end, "-", from_ref);
                        if exclusive {
                            span
                        } else {
                            JsNode::binary(span, "+", JsNode::number("1"))
                        }
                    }
                }
            }
        };

        let (value_decl, value_ref) = self.cache_value(value, "ref", false);
        let value_decl = self.lower_expr(value_decl)?;
        let value_ref = self.lower_expr(value_ref)?;
        let splice = self.utility("splice");
        let bounds = JsNode::new(JsKind::Array(vec![Some(from_decl), Some(count)]));
        let call = JsNode::method_call(
            splice,
            "apply",
            vec![object, JsNode::method_call(bounds, "concat", vec![value_decl])],
        );
        let sequence = JsNode::sequence(vec![call, value_ref]);
        Ok(if top { sequence } else { sequence.paren() })
    }
}
