//! `while` and `for` loops, including comprehensions.
//!
//! A loop whose value is used collects each iteration's value into a
//! `results` array declared before the loop and returned after it. Loops are
//! marked as collecting by [`Compiler::make_return`].
//!
//! For loops come in four shapes:
//!
//! ```text
//! for x, i in arr    =>  for (i = 0, len = arr.length; i < len; i++) { x = arr[i]; ... }
//! for x in [a..b]    =>  for (x = i = a; i <= b; x = ++i) { ... }
//! for k, v of obj    =>  for (k in obj) { v = obj[k]; ... }
//! for x from gen     =>  for (x of gen) { ... }
//! ```

use super::destructure::PatternMode;
use super::operators::invert;
use super::Compiler;
use crate::ir::{JsKind, JsNode};
use csz_ast::{NodeAccess, NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

/// The parts of a `for` shared by every loop shape.
struct ForParts {
    body: NodeIndex,
    name: Option<NodeIndex>,
    index: Option<NodeIndex>,
    guard: Option<NodeIndex>,
    step: Option<NodeIndex>,
    own: bool,
    results: Option<String>,
}

/// Direction of a numeric loop: known at compile time or tested at runtime.
enum Direction {
    Up,
    Down,
    Test(JsNode),
}

impl Compiler<'_> {
    // =========================================================================
    // Shared loop machinery
    // =========================================================================

    /// Result variable for a loop whose iterations are collected.
    fn loop_results(&mut self, idx: NodeIndex) -> Option<String> {
        if !self.returning.contains(&idx) {
            return None;
        }
        let results = self.free_variable("results", false);
        tracing::debug!(results = %results, "collecting loop results");
        Some(results)
    }

    /// Lower a loop body: the collecting rewrite, the guard and a prologue.
    fn lower_loop_body(
        &mut self,
        body: NodeIndex,
        guard: Option<NodeIndex>,
        results: Option<&str>,
        prologue: Vec<JsNode>,
    ) -> CompileResult<Vec<JsNode>> {
        let body = match results {
            Some(results) => self.make_return(body, Some(results))?,
            None => body,
        };
        self.ctx_mut().loops += 1;
        let statements = self.lower_guarded(body, guard);
        self.ctx_mut().loops -= 1;
        let mut out = prologue;
        out.extend(statements?);
        Ok(out)
    }

    fn lower_guarded(
        &mut self,
        body: NodeIndex,
        guard: Option<NodeIndex>,
    ) -> CompileResult<Vec<JsNode>> {
        let mut statements = self.lower_body(body)?;
        let Some(guard) = guard else {
            return Ok(statements);
        };
        if statements.len() > 1 {
            let test = self.lower_inverted(guard)?;
            let skip = JsNode::if_stmt(test, vec![JsNode::new(JsKind::Continue(None))], None);
            statements.insert(0, skip);
        } else {
            let test = self.lower_expr(guard)?;
            statements = vec![JsNode::if_stmt(test, statements, None)];
        }
        Ok(statements)
    }

    /// Surround a lowered loop with its setup statements and result array.
    fn finish_loop(
        &mut self,
        idx: NodeIndex,
        before: Vec<JsNode>,
        lowered: JsNode,
        results: Option<String>,
    ) -> JsNode {
        let lowered = lowered.located(self.loc(idx));
        if before.is_empty() && results.is_none() {
            return lowered;
        }
        let mut out = Vec::with_capacity(before.len() + 3);
        if let Some(results) = &results {
            out.push(JsNode::expr_stmt(JsNode::assign(
                JsNode::id(results.clone()),
                JsNode::new(JsKind::Array(Vec::new())),
            )));
        }
        out.extend(before);
        out.push(lowered);
        if let Some(results) = results {
            out.push(JsNode::ret(Some(JsNode::id(results))));
        }
        JsNode::statements(out)
    }

    // =========================================================================
    // While
    // =========================================================================

    pub(crate) fn lower_while(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::While {
            condition,
            guard,
            body,
            negated,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["while"], idx));
        };
        let test = if negated {
            self.lower_inverted(condition)?
        } else {
            self.lower_expr(condition)?
        };
        let results = self.loop_results(idx);
        let body = self.lower_loop_body(body, guard, results.as_deref(), Vec::new())?;
        let lowered = JsNode::new(JsKind::While {
            test: Box::new(test),
            body,
        });
        Ok(self.finish_loop(idx, Vec::new(), lowered, results))
    }

    // =========================================================================
    // For
    // =========================================================================

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn lower_for(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::For {
            body,
            source,
            name,
            index,
            guard,
            step,
            own,
            object,
            from,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["for"], idx));
        };
        let parts = ForParts {
            body,
            name,
            index,
            guard,
            step,
            own,
            results: self.loop_results(idx),
        };
        let mut before = Vec::new();
        let range = match self.tree.kind(self.unwrap(source)) {
            Some(NodeKind::Range {
                from: Some(start),
                to: Some(end),
                exclusive,
            }) if !object && !from => Some((*start, *end, *exclusive)),
            _ => None,
        };
        let lowered = if from {
            self.lower_for_from(source, &parts)?
        } else if object {
            self.lower_for_in(source, &parts, &mut before)?
        } else if let Some((start, end, exclusive)) = range {
            self.lower_for_range(start, end, exclusive, &parts)?
        } else {
            self.lower_for_array(source, &parts, &mut before)?
        };
        Ok(self.finish_loop(idx, before, lowered, parts.results))
    }

    /// Declare a loop variable. `None` when it is a destructuring pattern.
    fn loop_variable(&mut self, idx: NodeIndex) -> CompileResult<Option<String>> {
        let target = self.unwrap(idx);
        if matches!(
            self.tree.kind(target),
            Some(NodeKind::Arr { .. } | NodeKind::Obj { .. })
        ) {
            return Ok(None);
        }
        self.check_assignable(target)?;
        let Some(name) = self.identifier_name(target) else {
            let text = self.provisional_text(target);
            return Err(self.error(messages::CANT_BE_ASSIGNED, &[&text], target));
        };
        self.declare_assigned(target, &name)?;
        Ok(Some(name))
    }

    /// The counter or key variable: the written index, or a temporary.
    fn index_variable(&mut self, index: Option<NodeIndex>, temp: &str) -> CompileResult<String> {
        let Some(index) = index else {
            return Ok(self.free_variable(temp, true));
        };
        match self.loop_variable(index)? {
            Some(name) => Ok(name),
            None => {
                let text = self.provisional_text(index);
                Err(self.error(messages::CANT_BE_ASSIGNED, &[&text], index))
            }
        }
    }

    /// `name = value` at the top of the body, destructuring patterns.
    fn bind_loop_value(&mut self, name: NodeIndex, value: JsNode) -> CompileResult<JsNode> {
        if let Some(variable) = self.loop_variable(name)? {
            return Ok(JsNode::expr_stmt(JsNode::assign(JsNode::id(variable), value)));
        }
        let pattern = self.unwrap(name);
        let value_name = value.as_identifier().map(str::to_string);
        let mode = PatternMode {
            top: true,
            subpattern: false,
            always_declare: false,
        };
        Ok(JsNode::expr_stmt(self.destructure(pattern, value, value_name, mode)?))
    }

    /// Read the source through an identifier, caching it first when complex.
    fn loop_source(&mut self, source: NodeIndex, before: &mut Vec<JsNode>) -> CompileResult<String> {
        let lowered = self.lower_expr(source)?;
        if let Some(name) = lowered.as_identifier() {
            return Ok(name.to_string());
        }
        let temp = self.free_variable("ref", false);
        before.push(JsNode::expr_stmt(JsNode::assign(JsNode::id(temp.clone()), lowered)));
        Ok(temp)
    }

    /// `for x, i in arr by step`
    fn lower_for_array(
        &mut self,
        source: NodeIndex,
        parts: &ForParts,
        before: &mut Vec<JsNode>,
    ) -> CompileResult<JsNode> {
        let svar = self.loop_source(source, before)?;
        let ivar = self.index_variable(parts.index, "i")?;
        let i = || JsNode::id(ivar.clone());
        let length = || JsNode::prop(JsNode::id(svar.clone()), "length");
        let last = || JsNode::binary(length(), "-", JsNode::number("1"));

        let (init, test, update) = match parts.step {
            None => {
                let len = self.free_variable("len", false);
                (
                    JsNode::sequence(vec![
                        JsNode::assign(i(), JsNode::number("0")),
                        JsNode::assign(JsNode::id(len.clone()), length()),
                    ]),
                    JsNode::binary(i(), "<", JsNode::id(len)),
                    postfix("++", i()),
                )
            }
            Some(step) => match self.integer_literal(step) {
                Some(n) if n < 0 => {
                    let step = self.lower_expr(step)?;
                    (
                        JsNode::assign(i(), last()),
                        JsNode::binary(i(), ">=", JsNode::number("0")),
                        JsNode::assign_op("+=", i(), step),
                    )
                }
                Some(n) => {
                    let len = self.free_variable("len", false);
                    let update = if n == 1 {
                        postfix("++", i())
                    } else {
                        let step = self.lower_expr(step)?;
                        JsNode::assign_op("+=", i(), step)
                    };
                    (
                        JsNode::sequence(vec![
                            JsNode::assign(i(), JsNode::number("0")),
                            JsNode::assign(JsNode::id(len.clone()), length()),
                        ]),
                        JsNode::binary(i(), "<", JsNode::id(len)),
                        update,
                    )
                }
                None => {
                    let lowered = self.lower_expr(step)?;
                    let stepvar = self.free_variable("step", false);
                    let len = self.free_variable("len", false);
                    let up = || JsNode::binary(JsNode::id(stepvar.clone()), ">", JsNode::number("0"));
                    (
                        JsNode::sequence(vec![
                            JsNode::assign(JsNode::id(stepvar.clone()), lowered),
                            JsNode::assign(JsNode::id(len.clone()), length()),
                            JsNode::assign(
                                i(),
                                JsNode::conditional(up(), JsNode::number("0"), last()),
                            ),
                        ]),
                        JsNode::conditional(
                            up(),
                            JsNode::binary(i(), "<", JsNode::id(len)),
                            JsNode::binary(i(), ">=", JsNode::number("0")),
                        ),
                        JsNode::assign_op("+=", i(), JsNode::id(stepvar.clone())),
                    )
                }
            },
        };

        let mut prologue = Vec::new();
        if let Some(name) = parts.name {
            let item = JsNode::elem(JsNode::id(svar.clone()), i());
            prologue.push(self.bind_loop_value(name, item)?);
        }
        let body = self.lower_loop_body(parts.body, parts.guard, parts.results.as_deref(), prologue)?;
        Ok(JsNode::new(JsKind::For {
            init: Some(Box::new(init)),
            test: Some(Box::new(test)),
            update: Some(Box::new(update)),
            body,
        }))
    }

    /// `for x in [from..to] by step`
    fn lower_for_range(
        &mut self,
        start: NodeIndex,
        end: NodeIndex,
        exclusive: bool,
        parts: &ForParts,
    ) -> CompileResult<JsNode> {
        let from_literal = self.numeric_literal(start);
        let to_literal = self.numeric_literal(end);
        let ivar = self.index_variable(parts.index, "i")?;
        let variable = match parts.name {
            Some(name) => match self.loop_variable(name)? {
                Some(variable) if variable != ivar => Some(variable),
                Some(_) => None,
                None => {
                    let text = self.provisional_text(name);
                    return Err(self.error(messages::CANT_BE_ASSIGNED, &[&text], name));
                }
            },
            None => None,
        };
        let i = || JsNode::id(ivar.clone());

        let mut init = Vec::new();
        let mut from = self.lower_expr(start)?;
        let mut to = self.lower_expr(end)?;
        if !to.is_simple() {
            let temp = self.free_variable("ref", false);
            init.push(JsNode::assign(JsNode::id(temp.clone()), to));
            to = JsNode::id(temp);
        }

        let mut step = None;
        let direction = match parts.step {
            Some(node) => match self.integer_literal(node) {
                Some(n) => {
                    if n != 1 && n != -1 {
                        step = Some(self.lower_expr(node)?);
                    }
                    if n < 0 { Direction::Down } else { Direction::Up }
                }
                None => {
                    let lowered = self.lower_expr(node)?;
                    let temp = self.free_variable("step", false);
                    init.push(JsNode::assign(JsNode::id(temp.clone()), lowered));
                    step = Some(JsNode::id(temp.clone()));
                    Direction::Test(JsNode::binary(JsNode::id(temp), ">", JsNode::number("0")))
                }
            },
            None => match (from_literal, to_literal) {
                (Some(a), Some(b)) if a <= b => Direction::Up,
                (Some(_), Some(_)) => Direction::Down,
                _ => {
                    if !from.is_simple() {
                        let temp = self.free_variable("ref", false);
                        init.insert(0, JsNode::assign(JsNode::id(temp.clone()), from));
                        from = JsNode::id(temp);
                    }
                    Direction::Test(JsNode::binary(from.clone(), "<=", to.clone()))
                }
            },
        };

        let start_value = JsNode::assign(i(), from);
        init.push(match &variable {
            Some(variable) => JsNode::assign(JsNode::id(variable.clone()), start_value),
            None => start_value,
        });

        let (up, down) = if exclusive { ("<", ">") } else { ("<=", ">=") };
        let compare_up = || JsNode::binary(i(), up, to.clone());
        let compare_down = || JsNode::binary(i(), down, to.clone());
        let test = match &direction {
            Direction::Up => compare_up(),
            Direction::Down => compare_down(),
            Direction::Test(cond) => JsNode::conditional(cond.clone(), compare_up(), compare_down()),
        };

        // The counter update yields the new value when it also feeds the loop variable.
        let counts_up = variable.is_some();
        let bump = |op: &str| {
            if counts_up {
                JsNode::unary(op, i())
            } else {
                postfix(op, i())
            }
        };
        let counter = match (step, &direction) {
            (Some(step), _) => JsNode::assign_op("+=", i(), step),
            (None, Direction::Up) => bump("++"),
            (None, Direction::Down) => bump("--"),
            (None, Direction::Test(cond)) => JsNode::conditional(cond.clone(), bump("++"), bump("--")),
        };
        let update = match variable {
            Some(variable) => JsNode::assign(JsNode::id(variable), counter),
            None => counter,
        };

        let body = self.lower_loop_body(parts.body, parts.guard, parts.results.as_deref(), Vec::new())?;
        Ok(JsNode::new(JsKind::For {
            init: Some(Box::new(JsNode::sequence(init))),
            test: Some(Box::new(test)),
            update: Some(Box::new(update)),
            body,
        }))
    }

    /// `for own k, v of obj`
    fn lower_for_in(
        &mut self,
        source: NodeIndex,
        parts: &ForParts,
        before: &mut Vec<JsNode>,
    ) -> CompileResult<JsNode> {
        let svar = self.loop_source(source, before)?;
        let key = self.index_variable(parts.index, "key")?;
        let mut prologue = Vec::new();
        if parts.own {
            let has_prop = self.utility("hasProp");
            let owned = JsNode::method_call(
                has_prop,
                "call",
                vec![JsNode::id(svar.clone()), JsNode::id(key.clone())],
            );
            prologue.push(JsNode::if_stmt(
                invert(owned),
                vec![JsNode::new(JsKind::Continue(None))],
                None,
            ));
        }
        if let Some(name) = parts.name {
            let value = JsNode::elem(JsNode::id(svar.clone()), JsNode::id(key.clone()));
            prologue.push(self.bind_loop_value(name, value)?);
        }
        let body = self.lower_loop_body(parts.body, parts.guard, parts.results.as_deref(), prologue)?;
        Ok(JsNode::new(JsKind::ForIn {
            left: Box::new(JsNode::id(key)),
            right: Box::new(JsNode::id(svar)),
            body,
        }))
    }

    /// `for x from iterable`
    fn lower_for_from(&mut self, source: NodeIndex, parts: &ForParts) -> CompileResult<JsNode> {
        let right = self.lower_expr(source)?;
        let mut prologue = Vec::new();
        let left = match parts.name {
            Some(name) => match self.loop_variable(name)? {
                Some(variable) => variable,
                None => {
                    let temp = self.free_variable("ref", false);
                    prologue.push(self.bind_loop_value(name, JsNode::id(temp.clone()))?);
                    temp
                }
            },
            None => self.free_variable("ref", false),
        };
        let body = self.lower_loop_body(parts.body, parts.guard, parts.results.as_deref(), prologue)?;
        Ok(JsNode::new(JsKind::ForOf {
            left: Box::new(JsNode::id(left)),
            right: Box::new(right),
            body,
        }))
    }
}

/// `i++` / `i--`
fn postfix(op: &str, operand: JsNode) -> JsNode {
    JsNode::new(JsKind::Unary {
        operator: op.to_string(),
        operand: Box::new(operand),
        prefix: false,
    })
}
