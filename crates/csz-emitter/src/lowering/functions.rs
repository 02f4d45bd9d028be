//! Function literals: parameters, prologue, implicit return and `var` hoisting.
//!
//! Simple parameters and defaults stay native. `@name` parameters become a
//! free name plus a `this.name = name` prologue assignment; pattern
//! parameters become an `arg` temporary destructured in the prologue. A splat
//! in the last position is a native rest parameter, a splat or expansion
//! anywhere else collects the tail into a rest parameter that is then
//! destructured.

use super::destructure::PatternMode;
use super::{Compiler, CtorKind, FnCtx, FnKind, MethodInfo};
use crate::ir::{JsFunction, JsKind, JsNode, JsParam};
use crate::scope::{ScopeId, VarKind};
use csz_ast::{NodeAccess, NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;
use rustc_hash::FxHashSet;

const YIELD_OPERATORS: &[&str] = &["yield", "yield*", "yieldfrom", "yield from"];
const AWAIT_OPERATORS: &[&str] = &["await"];

/// One source parameter, normalized.
struct ParamParts {
    node: NodeIndex,
    name: NodeIndex,
    value: Option<NodeIndex>,
    splat: bool,
    expansion: bool,
}

impl Compiler<'_> {
    pub(crate) fn lower_code(
        &mut self,
        idx: NodeIndex,
        method: Option<MethodInfo>,
    ) -> CompileResult<JsNode> {
        let func = self.lower_function(idx, method, Vec::new())?;
        Ok(JsNode::new(JsKind::Function(Box::new(func))))
    }

    /// Lower a function literal. `bindings` are `this` assignments a class
    /// constructor must run first (after `super()` when derived).
    #[tracing::instrument(level = "trace", skip(self, method, bindings))]
    pub(crate) fn lower_function(
        &mut self,
        idx: NodeIndex,
        method: Option<MethodInfo>,
        bindings: Vec<JsNode>,
    ) -> CompileResult<JsFunction> {
        let NodeKind::Code {
            params,
            body,
            bound,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["function"], idx));
        };
        let generator = self.contains_operator(body, YIELD_OPERATORS);
        let is_async = self.contains_operator(body, AWAIT_OPERATORS);
        let ctor = method.as_ref().and_then(|m| m.ctor);
        if ctor.is_some() {
            if bound {
                return Err(self.error(messages::BOUND_CONSTRUCTOR, &[], idx));
            }
            if generator {
                return Err(self.error(messages::GENERATOR_CONSTRUCTOR, &[], idx));
            }
        }
        let kind = match method {
            Some(info) => FnKind::Method(info),
            None if bound => FnKind::Bound,
            None => FnKind::Plain,
        };
        let arrow = matches!(kind, FnKind::Bound);
        let parent = self.scope();
        let scope = self.scopes.push(parent, false);

        self.with_fn(FnCtx::new(kind, scope), |compiler| {
            let parts = compiler.param_parts(&params)?;
            compiler.check_parameters(&parts)?;

            let (js_params, prologue, this_params) = compiler.lower_parameters(idx, &parts, scope)?;
            let mut statements = Vec::new();
            if ctor == Some(CtorKind::Derived) {
                let ctx = compiler.ctx_mut();
                ctx.pending_this.extend(bindings);
                ctx.pending_this.extend(this_params.iter().cloned());
            } else {
                statements.extend(bindings.into_iter().map(JsNode::expr_stmt));
                statements.extend(this_params.iter().cloned().map(JsNode::expr_stmt));
            }
            statements.extend(prologue);

            let body = if ctor.is_some() {
                body
            } else {
                compiler.make_return(body, None)?
            };
            statements.extend(compiler.lower_function_body(body)?);

            if ctor == Some(CtorKind::Derived) && !this_params.is_empty() && !compiler.ctx().super_called
            {
                return Err(compiler.error(messages::THIS_PARAMS_WITHOUT_SUPER, &[], idx));
            }

            let mut full = compiler.scope_declarations(scope);
            full.extend(statements);
            Ok(JsFunction {
                name: None,
                params: js_params,
                body: full,
                arrow,
                generator,
                is_async,
                spaced: false,
            })
        })
    }

    /// Statements of a function body block.
    pub(crate) fn lower_function_body(&mut self, body: NodeIndex) -> CompileResult<Vec<JsNode>> {
        match self.kind(body)? {
            NodeKind::Block { expressions } => self.lower_statements(&expressions),
            _ => {
                let node = self.lower_stmt(body)?;
                Ok(crate::ir::flatten_statements(vec![node]))
            }
        }
    }

    /// `var` statement for the names a scope declares, if any.
    pub(crate) fn scope_declarations(&self, scope: ScopeId) -> Vec<JsNode> {
        if !self.scopes.has_declarations(scope) {
            return Vec::new();
        }
        let mut declarators: Vec<(String, Option<JsNode>)> = self
            .scopes
            .declared_variables(scope)
            .into_iter()
            .map(|name| (name, None))
            .collect();
        declarators.extend(
            self.scopes
                .assigned_variables(scope)
                .into_iter()
                .map(|(name, value)| (name, Some(value))),
        );
        vec![JsNode::new(JsKind::VarDecl(declarators))]
    }

    fn param_parts(&self, params: &[NodeIndex]) -> CompileResult<Vec<ParamParts>> {
        params
            .iter()
            .map(|&node| match self.kind(node)? {
                NodeKind::Param { name, value, splat } => Ok(ParamParts {
                    node,
                    name,
                    value,
                    splat,
                    expansion: false,
                }),
                NodeKind::Expansion => Ok(ParamParts {
                    node,
                    name: node,
                    value: None,
                    splat: false,
                    expansion: true,
                }),
                NodeKind::Splat { name } => Ok(ParamParts {
                    node,
                    name,
                    value: None,
                    splat: true,
                    expansion: false,
                }),
                _ => Ok(ParamParts {
                    node,
                    name: node,
                    value: None,
                    splat: false,
                    expansion: false,
                }),
            })
            .collect()
    }

    fn check_parameters(&self, parts: &[ParamParts]) -> CompileResult<()> {
        let mut rest = parts.iter().filter(|p| p.splat || p.expansion);
        if rest.next().is_some()
            && let Some(second) = rest.next()
        {
            return Err(self.error(messages::MULTIPLE_SPLAT_PARAMS, &[], second.node));
        }
        let mut seen = FxHashSet::default();
        for part in parts.iter().filter(|p| !p.expansion) {
            let mut names = Vec::new();
            self.each_name(part.name, &mut names);
            for name in names {
                if !seen.insert(name.clone()) {
                    return Err(self.error(messages::DUPLICATE_PARAMETER, &[&name], part.node));
                }
            }
        }
        Ok(())
    }

    /// Lower parameters into native parameters, prologue statements and
    /// `this.x = x` assignments.
    fn lower_parameters(
        &mut self,
        idx: NodeIndex,
        parts: &[ParamParts],
        scope: ScopeId,
    ) -> CompileResult<(Vec<JsParam>, Vec<JsNode>, Vec<JsNode>)> {
        let mut params = Vec::with_capacity(parts.len());
        let mut prologue = Vec::new();
        let mut this_params = Vec::new();
        let rest_at = parts.iter().position(|p| p.splat || p.expansion);
        let tail_start = rest_at.map_or(parts.len(), |i| i + 1);

        for part in &parts[..rest_at.unwrap_or(parts.len())] {
            let param = self.lower_parameter(part, scope, &mut prologue, &mut this_params)?;
            params.push(param);
        }
        let Some(rest_at) = rest_at else {
            return Ok((params, prologue, this_params));
        };

        let rest = &parts[rest_at];
        let tail = &parts[tail_start..];
        let rest_name = if rest.expansion {
            let name = self.free_name("args", false);
            self.scopes.parameter(scope, &name);
            name
        } else if let Some(name) = self.identifier_name(rest.name) {
            self.scopes.parameter(scope, &name);
            name
        } else {
            let name = self.free_name("arg", false);
            self.scopes.parameter(scope, &name);
            if tail.is_empty() {
                prologue.push(self.parameter_pattern(rest.name, &name)?);
            }
            name
        };
        params.push(JsParam::rest(rest_name.clone()));
        if tail.is_empty() {
            return Ok((params, prologue, this_params));
        }

        // Elements after the rest parameter are read back from its tail.
        let mut elements = Vec::with_capacity(tail.len() + 1);
        elements.push(if rest.expansion {
            self.synth(NodeKind::Expansion, rest.node)
        } else if self.identifier_name(rest.name).is_some() {
            let id = self.synth(
                NodeKind::Identifier {
                    name: rest_name.clone(),
                },
                rest.node,
            );
            self.synth(NodeKind::Splat { name: id }, rest.node)
        } else {
            self.synth(NodeKind::Splat { name: rest.name }, rest.node)
        });
        let mut defaults = Vec::new();
        for part in tail {
            let mut names = Vec::new();
            self.each_name(part.name, &mut names);
            for name in &names {
                self.scopes.add(scope, name, VarKind::Var, true);
            }
            elements.push(part.name);
            if let Some(value) = part.value {
                let target = self.lower_expr(part.name)?;
                let missing = JsNode::binary(target.clone(), "===", JsNode::undefined());
                let value = self.lower_expr(value)?;
                defaults.push(JsNode::if_stmt(
                    missing,
                    vec![JsNode::expr_stmt(JsNode::assign(target, value))],
                    None,
                ));
            }
        }
        let pattern = self.synth(NodeKind::Arr { objects: elements }, idx);
        let mode = PatternMode {
            top: true,
            subpattern: false,
            always_declare: true,
        };
        let destructured =
            self.destructure(pattern, JsNode::id(rest_name.clone()), Some(rest_name), mode)?;
        prologue.insert(0, JsNode::expr_stmt(destructured));
        prologue.extend(defaults);
        Ok((params, prologue, this_params))
    }

    fn lower_parameter(
        &mut self,
        part: &ParamParts,
        scope: ScopeId,
        prologue: &mut Vec<JsNode>,
        this_params: &mut Vec<JsNode>,
    ) -> CompileResult<JsParam> {
        let default = match part.value {
            Some(value) => Some(self.lower_expr(value)?),
            None => None,
        };
        let name = if let Some(name) = self.identifier_name(part.name) {
            self.scopes.parameter(scope, &name);
            name
        } else if let Some(property) = self.this_property(part.name) {
            let local = self.free_name(&property, false);
            self.scopes.parameter(scope, &local);
            this_params.push(JsNode::assign(
                JsNode::prop(JsNode::this(), property),
                JsNode::id(local.clone()),
            ));
            local
        } else if matches!(
            self.tree.kind(self.unwrap(part.name)),
            Some(NodeKind::Arr { .. } | NodeKind::Obj { .. })
        ) {
            let local = self.free_name("arg", false);
            self.scopes.parameter(scope, &local);
            prologue.push(self.parameter_pattern(part.name, &local)?);
            local
        } else {
            let text = self.provisional_text(part.name);
            return Err(self.error(messages::CANT_BE_ASSIGNED, &[&text], part.name));
        };
        let param = JsParam::new(name);
        Ok(match default {
            Some(default) => param.with_default(default),
            None => param,
        })
    }

    /// `pattern = arg` at the top of the body, declaring every bound name locally.
    fn parameter_pattern(&mut self, pattern: NodeIndex, arg: &str) -> CompileResult<JsNode> {
        let mode = PatternMode {
            top: true,
            subpattern: false,
            always_declare: true,
        };
        let target = self.unwrap(pattern);
        let node = self.destructure(target, JsNode::id(arg), Some(arg.to_string()), mode)?;
        Ok(JsNode::expr_stmt(node))
    }
}
