//! Object and array literals, ranges and slices.

use super::{Compiler, FnCtx, FnKind};
use crate::ir::{JsFunction, JsKind, JsNode};
use csz_ast::{AssignContext, NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

impl Compiler<'_> {
    // =========================================================================
    // Objects and arrays
    // =========================================================================

    pub(crate) fn lower_obj(&mut self, properties: &[NodeIndex]) -> CompileResult<JsNode> {
        let mut out = Vec::with_capacity(properties.len());
        for &property in properties {
            let comments = self.take_comments(property);
            let loc = self.loc(property);
            out.push(
                self.lower_object_property(property)?
                    .located(loc)
                    .with_comments(comments),
            );
        }
        Ok(JsNode::new(JsKind::Object(out)))
    }

    fn lower_object_property(&mut self, property: NodeIndex) -> CompileResult<JsNode> {
        if let Some(name) = self.this_property(property) {
            let value = self.lower_expr(property)?;
            return Ok(object_property(JsNode::id(name), value, false, false));
        }
        match self.kind(property)? {
            NodeKind::Identifier { name } => Ok(object_property(
                JsNode::id(name.clone()),
                JsNode::id(name),
                false,
                true,
            )),
            NodeKind::Value { base, properties } if properties.is_empty() => {
                self.lower_object_property(base)
            }
            NodeKind::Splat { name } => {
                let argument = self.lower_expr(name)?;
                Ok(JsNode::new(JsKind::Spread(Box::new(argument))))
            }
            NodeKind::Assign {
                variable,
                value,
                context: AssignContext::Object,
            } => {
                let (key, computed) = self.lower_property_key(variable)?;
                let key_name = key.as_identifier().map(str::to_string);
                let value = self.lower_assigned_value(value, key_name)?;
                Ok(object_property(key, value, computed, false))
            }
            other => Err(self.error(messages::UNEXPECTED_NODE, &[other.name()], property)),
        }
    }

    pub(crate) fn lower_arr(&mut self, objects: &[NodeIndex]) -> CompileResult<JsNode> {
        let mut elements = Vec::with_capacity(objects.len());
        for &object in objects {
            let element = match self.kind(object)? {
                NodeKind::Elision => None,
                NodeKind::Splat { name } => {
                    let argument = self.lower_expr(name)?;
                    Some(JsNode::new(JsKind::Spread(Box::new(argument))).located(self.loc(object)))
                }
                NodeKind::Expansion => {
                    return Err(self.error(messages::UNEXPECTED_NODE, &["..."], object));
                }
                _ => Some(self.lower_expr(object)?),
            };
            elements.push(element);
        }
        Ok(JsNode::new(JsKind::Array(elements)))
    }

    // =========================================================================
    // Ranges
    // =========================================================================

    /// A range used as a value: a literal array when both bounds are
    /// integers within the unroll limit, otherwise a function that fills
    /// the array at runtime.
    pub(crate) fn lower_range_array(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::Range {
            from: Some(from),
            to: Some(to),
            exclusive,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["range"], idx));
        };
        if let (Some(start), Some(end)) = (self.integer_literal(from), self.integer_literal(to))
            && start.abs_diff(end) <= u64::from(self.options.range_unroll_limit)
        {
            return Ok(JsNode::new(JsKind::Array(
                unrolled(start, end, exclusive)
                    .into_iter()
                    .map(|n| Some(JsNode::number(n.to_string())))
                    .collect(),
            )));
        }
        tracing::debug!(?from, ?to, "range compiled to a filling loop");

        let uses_arguments = self.uses_arguments(idx);
        let uses_this = !uses_arguments && self.uses_this(idx);
        let parent = self.scope();
        let scope = self.scopes.push(parent, false);
        let body = self.with_fn(FnCtx::new(FnKind::Closure, scope), |compiler| {
            compiler.range_filling_body(from, to, exclusive)
        })?;
        let mut statements = self.scope_declarations(scope);
        statements.extend(body);
        let func = JsNode::new(JsKind::Function(Box::new(JsFunction {
            name: None,
            params: Vec::new(),
            body: statements,
            arrow: false,
            generator: false,
            is_async: false,
            spaced: false,
        })));
        Ok(if uses_arguments {
            JsNode::method_call(func, "apply", vec![JsNode::this(), JsNode::id("arguments")])
        } else if uses_this {
            JsNode::method_call(func, "call", vec![JsNode::this()])
        } else {
            JsNode::call(func, Vec::new())
        })
    }

    fn range_filling_body(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        exclusive: bool,
    ) -> CompileResult<Vec<JsNode>> {
        let known = match (self.numeric_literal(from), self.numeric_literal(to)) {
            (Some(start), Some(end)) => Some(start <= end),
            _ => None,
        };
        let mut start = self.lower_expr(from)?;
        let mut end = self.lower_expr(to)?;
        let results = self.free_variable("results", false);
        let i = self.free_variable("i", true);
        let mut init = Vec::new();
        if known.is_none() {
            if !start.is_simple() {
                let temp = self.free_variable("ref", false);
                init.push(JsNode::assign(JsNode::id(temp.clone()), start));
                start = JsNode::id(temp);
            }
            if !end.is_simple() {
                let temp = self.free_variable("ref", false);
                init.push(JsNode::assign(JsNode::id(temp.clone()), end));
                end = JsNode::id(temp);
            }
        }
        init.insert(0, JsNode::assign(JsNode::id(i.clone()), start.clone()));

        let (up, down) = if exclusive { ("<", ">") } else { ("<=", ">=") };
        let counter = || JsNode::id(i.clone());
        let step = |op: &str| {
            JsNode::new(JsKind::Unary {
                operator: op.to_string(),
                operand: Box::new(counter()),
                prefix: false,
            })
        };
        let (test, update) = match known {
            Some(true) => (JsNode::binary(counter(), up, end), step("++")),
            Some(false) => (JsNode::binary(counter(), down, end), step("--")),
            None => {
                let ascending = || JsNode::binary(start.clone(), "<=", end.clone());
                (
                    JsNode::conditional(
                        ascending(),
                        JsNode::binary(counter(), up, end.clone()),
                        JsNode::binary(counter(), down, end.clone()),
                    ),
                    JsNode::conditional(ascending(), step("++"), step("--")),
                )
            }
        };
        let push = JsNode::method_call(JsNode::id(results.clone()), "push", vec![counter()]);
        Ok(vec![
            JsNode::expr_stmt(JsNode::assign(
                JsNode::id(results.clone()),
                JsNode::new(JsKind::Array(Vec::new())),
            )),
            JsNode::new(JsKind::For {
                init: Some(Box::new(JsNode::sequence(init))),
                test: Some(Box::new(test)),
                update: Some(Box::new(update)),
                body: vec![JsNode::expr_stmt(push)],
            }),
            JsNode::ret(Some(JsNode::id(results))),
        ])
    }

    /// `object[from..to]` as `object.slice(from, to + 1)`.
    pub(crate) fn lower_slice(&mut self, object: JsNode, range: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::Range {
            from,
            to,
            exclusive,
        } = self.kind(range)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["slice"], range));
        };
        let start = match from {
            Some(from) => self.lower_expr(from)?,
            None => JsNode::number("0"),
        };
        let mut args = vec![start];
        if let Some(to) = to {
            if exclusive {
                args.push(self.lower_expr(to)?);
            } else if let Some(end) = self.integer_literal(to) {
                // `-1` is the last element: slice to the end.
                if end != -1 {
                    args.push(JsNode::number((end + 1).to_string()));
                }
            } else {
                let end = self.lower_expr(to)?;
                let bumped = JsNode::binary(JsNode::unary("+", end), "+", JsNode::number("1"));
                args.push(JsNode::binary(bumped, "||", JsNode::number("9e9")));
            }
        }
        Ok(JsNode::method_call(object, "slice", args))
    }
}

fn object_property(key: JsNode, value: JsNode, computed: bool, shorthand: bool) -> JsNode {
    JsNode::new(JsKind::Property {
        key: Box::new(key),
        value: Box::new(value),
        computed,
        shorthand,
    })
}

/// The integers of a literal range, in iteration order.
pub(crate) fn unrolled(start: i64, end: i64, exclusive: bool) -> Vec<i64> {
    if start <= end {
        let end = if exclusive { end - 1 } else { end };
        (start..=end).collect()
    } else {
        let end = if exclusive { end + 1 } else { end };
        (end..=start).rev().collect()
    }
}
