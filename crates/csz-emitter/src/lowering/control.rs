//! Conditionals, `switch`, `try`, jumps and implicit returns.

use super::Compiler;
use crate::ir::{JsCase, JsKind, JsNode};
use csz_ast::{AssignContext, JumpKeyword, NodeAccess, NodeIndex, NodeKind, SwitchCase};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

impl Compiler<'_> {
    // =========================================================================
    // Implicit returns
    // =========================================================================

    /// Rewrite a node so its value is returned (or pushed onto `res`).
    ///
    /// Compound statements push the rewrite into their branches; a loop
    /// without `res` is marked to collect its iterations instead. Returns the
    /// node to lower in place of `idx`, which may be `idx` itself.
    pub fn make_return(
        &mut self,
        idx: NodeIndex,
        res: Option<&str>,
    ) -> CompileResult<NodeIndex> {
        match self.kind(idx)? {
            NodeKind::Block { mut expressions } => {
                if let Some(last) = expressions.pop()
                    && !matches!(
                        self.tree.kind(last),
                        Some(NodeKind::Return { expression: None })
                    )
                {
                    expressions.push(self.make_return(last, res)?);
                }
                Ok(self.replacement(NodeKind::Block { expressions }, idx))
            }
            NodeKind::If {
                condition,
                body,
                else_body,
                negated,
            } => {
                let body = self.make_return(body, res)?;
                let else_body = match else_body {
                    Some(else_body) => Some(self.make_return(else_body, res)?),
                    None if res.is_some() => {
                        let missing = self.synth(NodeKind::UndefinedLiteral, idx);
                        Some(self.make_return(missing, res)?)
                    }
                    None => None,
                };
                Ok(self.replacement(
                    NodeKind::If {
                        condition,
                        body,
                        else_body,
                        negated,
                    },
                    idx,
                ))
            }
            NodeKind::While { .. } | NodeKind::For { .. } if res.is_none() => {
                if self.jumps(idx).is_none() {
                    self.returning.insert(idx);
                }
                Ok(idx)
            }
            NodeKind::Switch {
                subject,
                cases,
                otherwise,
            } => {
                let mut returning = Vec::with_capacity(cases.len());
                for case in cases {
                    returning.push(SwitchCase {
                        conditions: case.conditions,
                        body: self.make_return(case.body, res)?,
                    });
                }
                let otherwise = match otherwise {
                    Some(otherwise) => Some(self.make_return(otherwise, res)?),
                    None if res.is_some() => {
                        let missing = self.synth(NodeKind::UndefinedLiteral, idx);
                        Some(self.make_return(missing, res)?)
                    }
                    None => None,
                };
                Ok(self.replacement(
                    NodeKind::Switch {
                        subject,
                        cases: returning,
                        otherwise,
                    },
                    idx,
                ))
            }
            NodeKind::Try {
                attempt,
                error_variable,
                recovery,
                ensure,
            } => {
                let attempt = self.make_return(attempt, res)?;
                let recovery = match recovery {
                    Some(recovery) => Some(self.make_return(recovery, res)?),
                    None => None,
                };
                Ok(self.replacement(
                    NodeKind::Try {
                        attempt,
                        error_variable,
                        recovery,
                        ensure,
                    },
                    idx,
                ))
            }
            NodeKind::Return { .. }
            | NodeKind::Throw { .. }
            | NodeKind::StatementLiteral { .. }
            | NodeKind::ImportDeclaration { .. }
            | NodeKind::Export { .. } => Ok(idx),
            _ => {
                let value = self.unwrap_all(idx);
                let kind = match res {
                    Some(res) => {
                        let results = self.synth(
                            NodeKind::Identifier {
                                name: res.to_string(),
                            },
                            idx,
                        );
                        let push_name = self.synth(
                            NodeKind::PropertyName {
                                name: "push".to_string(),
                            },
                            idx,
                        );
                        let push = self.synth(
                            NodeKind::Access {
                                name: push_name,
                                soak: false,
                                shorthand: false,
                            },
                            idx,
                        );
                        let callee = self.synth(
                            NodeKind::Value {
                                base: results,
                                properties: vec![push],
                            },
                            idx,
                        );
                        NodeKind::Call {
                            callee,
                            args: vec![value],
                            soak: false,
                            is_new: false,
                        }
                    }
                    None => NodeKind::Return {
                        expression: Some(value),
                    },
                };
                Ok(self.replacement(kind, idx))
            }
        }
    }

    // =========================================================================
    // Conditionals
    // =========================================================================

    fn lower_condition(&mut self, condition: NodeIndex, negated: bool) -> CompileResult<JsNode> {
        if negated {
            self.lower_inverted(condition)
        } else {
            self.lower_expr(condition)
        }
    }

    /// `if` as a statement, with `else if` chains kept flat.
    pub(crate) fn lower_if_stmt(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::If {
            condition,
            body,
            else_body,
            negated,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["if"], idx));
        };
        let test = self.lower_condition(condition, negated)?;
        let consequent = self.lower_body(body)?;
        let alternate = match else_body {
            None => None,
            Some(else_body) => {
                let chained = self.unwrap_block(else_body);
                if matches!(self.tree.kind(chained), Some(NodeKind::If { .. })) {
                    let comments = self.take_comments(else_body);
                    let nested = self.lower_stmt(chained)?.with_comments(comments);
                    Some(Box::new(nested))
                } else {
                    let body = self.lower_body(else_body)?;
                    Some(Box::new(JsNode::new(JsKind::Block(body))))
                }
            }
        };
        Ok(JsNode::new(JsKind::If {
            test: Box::new(test),
            consequent,
            alternate,
        }))
    }

    /// `if` as an expression: a conditional, `void 0` when the else is missing.
    pub(crate) fn lower_if_expr(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::If {
            condition,
            body,
            else_body,
            negated,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["if"], idx));
        };
        let test = self.lower_condition(condition, negated)?;
        let consequent = self.lower_branch_value(body)?;
        let alternate = match else_body {
            Some(else_body) => self.lower_branch_value(else_body)?,
            None => JsNode::undefined(),
        };
        Ok(JsNode::conditional(test, consequent, alternate))
    }

    fn lower_branch_value(&mut self, body: NodeIndex) -> CompileResult<JsNode> {
        let comments = self.take_comments(body);
        let value = self.unwrap_block(body);
        Ok(self.lower_expr(value)?.with_comments(comments))
    }

    // =========================================================================
    // Switch and try
    // =========================================================================

    pub(crate) fn lower_switch(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::Switch {
            subject,
            cases,
            otherwise,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["switch"], idx));
        };
        let discriminant = match subject {
            Some(subject) => self.lower_expr(subject)?,
            None => JsNode::new(JsKind::Bool(false)),
        };

        self.ctx_mut().switches += 1;
        let result = self.lower_switch_cases(subject.is_some(), &cases, otherwise);
        self.ctx_mut().switches -= 1;
        let cases = result?;

        Ok(JsNode::new(JsKind::Switch {
            discriminant: Box::new(discriminant),
            cases,
        }))
    }

    fn lower_switch_cases(
        &mut self,
        has_subject: bool,
        cases: &[SwitchCase],
        otherwise: Option<NodeIndex>,
    ) -> CompileResult<Vec<JsCase>> {
        let mut out = Vec::new();
        let otherwise_body = match otherwise {
            Some(otherwise) => self.lower_body(otherwise)?,
            None => Vec::new(),
        };
        let has_default = !otherwise_body.is_empty();
        for (i, case) in cases.iter().enumerate() {
            let last = i + 1 == cases.len();
            for (j, &condition) in case.conditions.iter().enumerate() {
                let test = if has_subject {
                    self.lower_expr(condition)?
                } else {
                    self.lower_inverted(condition)?
                };
                let body = if j + 1 == case.conditions.len() {
                    let mut body = self.lower_body(case.body)?;
                    let ends_in_jump = body.last().is_some_and(|s| {
                        matches!(
                            s.kind,
                            JsKind::Return(_)
                                | JsKind::Throw(_)
                                | JsKind::Break(_)
                                | JsKind::Continue(_)
                        )
                    });
                    if !(last && !has_default) && !ends_in_jump {
                        body.push(JsNode::new(JsKind::Break(None)));
                    }
                    body
                } else {
                    Vec::new()
                };
                out.push(JsCase {
                    test: Some(test),
                    body,
                });
            }
        }
        if has_default {
            out.push(JsCase {
                test: None,
                body: otherwise_body,
            });
        }
        Ok(out)
    }

    pub(crate) fn lower_try(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::Try {
            attempt,
            error_variable,
            recovery,
            ensure,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["try"], idx));
        };
        let block = self.lower_body(attempt)?;
        let (param, handler) = match recovery {
            Some(recovery) => {
                let placeholder = self.free_name("error", false);
                let mut handler = Vec::new();
                if let Some(variable) = error_variable {
                    let value = self.synth(
                        NodeKind::Identifier {
                            name: placeholder.clone(),
                        },
                        variable,
                    );
                    let assign = self.synth(
                        NodeKind::Assign {
                            variable,
                            value,
                            context: AssignContext::Plain,
                        },
                        variable,
                    );
                    handler.push(self.lower_stmt(assign)?);
                }
                handler.extend(self.lower_body(recovery)?);
                (
                    Some(Box::new(JsNode::id(placeholder))),
                    Some(crate::ir::flatten_statements(handler)),
                )
            }
            None if ensure.is_none() => {
                let placeholder = self.free_name("error", false);
                (Some(Box::new(JsNode::id(placeholder))), Some(Vec::new()))
            }
            None => (None, None),
        };
        let finalizer = match ensure {
            Some(ensure) => Some(self.lower_body(ensure)?),
            None => None,
        };
        Ok(JsNode::new(JsKind::Try {
            block,
            param,
            handler,
            finalizer,
        }))
    }

    // =========================================================================
    // Jumps
    // =========================================================================

    pub(crate) fn lower_return(
        &mut self,
        _idx: NodeIndex,
        expression: Option<NodeIndex>,
    ) -> CompileResult<JsNode> {
        let value = match expression {
            Some(expression) => Some(self.lower_expr(expression)?),
            None => None,
        };
        Ok(JsNode::ret(value))
    }

    pub(crate) fn lower_statement_literal(
        &mut self,
        idx: NodeIndex,
        keyword: JumpKeyword,
        label: Option<String>,
    ) -> CompileResult<JsNode> {
        let ctx = self.ctx();
        let kind = match keyword {
            JumpKeyword::Debugger => JsKind::Debugger,
            JumpKeyword::Break => {
                if label.is_none() && ctx.loops == 0 && ctx.switches == 0 {
                    return Err(self.error(messages::JUMP_OUTSIDE_LOOP, &["break"], idx));
                }
                JsKind::Break(label)
            }
            JumpKeyword::Continue => {
                if label.is_none() && ctx.loops == 0 {
                    return Err(self.error(messages::JUMP_OUTSIDE_LOOP, &["continue"], idx));
                }
                JsKind::Continue(label)
            }
        };
        Ok(JsNode::new(kind))
    }
}
