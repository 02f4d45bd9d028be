//! Operators, existence checks and `in` tests.

use super::Compiler;
use crate::ir::{JsKind, JsNode};
use csz_ast::{NodeAccess, NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;
use csz_common::limits::IN_OPERATOR_OR_CHAIN_LIMIT;

/// Source operator spellings and their output equivalents.
const ALIASES: &[(&str, &str)] = &[
    ("==", "==="),
    ("!=", "!=="),
    ("is", "==="),
    ("isnt", "!=="),
    ("and", "&&"),
    ("or", "||"),
    ("not", "!"),
    ("of", "in"),
    ("yieldfrom", "yield*"),
    ("yield from", "yield*"),
];

const CHAINABLE: &[&str] = &["<", ">", ">=", "<=", "===", "!=="];

pub(crate) fn canonical_operator(operator: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == operator)
        .map_or(operator, |(_, canonical)| canonical)
}

impl Compiler<'_> {
    pub(crate) fn lower_op(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::Op {
            operator,
            first,
            second,
            flip,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["operator"], idx));
        };
        let operator = canonical_operator(&operator).to_string();
        match second {
            None => self.lower_unary(idx, &operator, first, flip),
            Some(second) => self.lower_binary(idx, &operator, first, second),
        }
    }

    fn lower_unary(
        &mut self,
        idx: NodeIndex,
        operator: &str,
        first: NodeIndex,
        flip: bool,
    ) -> CompileResult<JsNode> {
        match operator {
            "do" => return self.lower_do(first),
            "yield" | "yield*" => {
                let argument = match self.tree.kind(first) {
                    Some(NodeKind::Block { expressions }) if expressions.is_empty() => None,
                    _ => Some(Box::new(self.lower_expr(first)?)),
                };
                return Ok(JsNode::new(JsKind::Yield {
                    argument,
                    delegate: operator == "yield*",
                }));
            }
            "await" => {
                let argument = self.lower_expr(first)?;
                return Ok(JsNode::new(JsKind::Await(Box::new(argument))));
            }
            "delete" => {
                if let Some(name) = self.identifier_name(first)
                    && self.scopes.check(self.scope(), &name)
                {
                    return Err(self.error(messages::DELETE_VARIABLE, &[], idx));
                }
            }
            "++" | "--" => {
                if !self.is_assignable(first) {
                    let text = self.provisional_text(first);
                    return Err(self.error(messages::INCREMENT_NON_ASSIGNABLE, &[&text], idx));
                }
            }
            _ => {}
        }
        let operand = self.lower_expr(first)?;
        Ok(JsNode::new(JsKind::Unary {
            operator: operator.to_string(),
            operand: Box::new(operand),
            prefix: !flip,
        }))
    }

    fn lower_binary(
        &mut self,
        idx: NodeIndex,
        operator: &str,
        first: NodeIndex,
        second: NodeIndex,
    ) -> CompileResult<JsNode> {
        if CHAINABLE.contains(&operator) && let Some(chain) = self.chained_comparison(first) {
            return self.lower_chain(idx, operator, chain, second);
        }
        match operator {
            "?" => self.lower_binary_existence(first, second),
            "//" | "%%" => {
                let left = self.lower_expr(first)?;
                let right = self.lower_expr(second)?;
                Ok(self.special_math(operator, left, right))
            }
            _ => {
                let left = self.lower_expr(first)?;
                let right = self.lower_expr(second)?;
                Ok(JsNode::binary(left, operator, right))
            }
        }
    }

    /// `(op, a, b)` when `first` is itself a chainable comparison `a op b`.
    fn chained_comparison(&self, first: NodeIndex) -> Option<(String, NodeIndex, NodeIndex)> {
        match self.tree.kind(first) {
            Some(NodeKind::Op {
                operator,
                first,
                second: Some(second),
                ..
            }) => {
                let canonical = canonical_operator(operator);
                CHAINABLE
                    .contains(&canonical)
                    .then(|| (canonical.to_string(), *first, *second))
            }
            _ => None,
        }
    }

    /// `a < b < c`  =>  `a < (ref = b) && ref < c`
    fn lower_chain(
        &mut self,
        idx: NodeIndex,
        operator: &str,
        (inner_operator, inner_first, shared): (String, NodeIndex, NodeIndex),
        second: NodeIndex,
    ) -> CompileResult<JsNode> {
        let (cached, read) = self.cache_value(shared, "ref", false);
        let inner = self.synth(
            NodeKind::Op {
                operator: inner_operator,
                first: inner_first,
                second: Some(cached),
                flip: false,
            },
            idx,
        );
        let left = self.lower_expr(inner)?;
        let shared = self.lower_expr(read)?;
        let right = self.lower_expr(second)?;
        Ok(JsNode::binary(
            left,
            "&&",
            JsNode::binary(shared, operator, right),
        ))
    }

    /// `a ? b`  =>  `a != null ? a : b`
    fn lower_binary_existence(
        &mut self,
        first: NodeIndex,
        second: NodeIndex,
    ) -> CompileResult<JsNode> {
        let (checked, read) = self.cache_value(first, "ref", false);
        let checked_ir = self.lower_expr(checked)?;
        let test = self.existence_check(checked, checked_ir, false, false);
        let read = self.lower_expr(read)?;
        let fallback = self.lower_expr(second)?;
        Ok(JsNode::conditional(test, read, fallback))
    }

    /// `Math.floor(a / b)` and `modulo(a, b)`.
    pub(crate) fn special_math(&mut self, operator: &str, left: JsNode, right: JsNode) -> JsNode {
        if operator == "//" {
            JsNode::method_call(
                JsNode::id("Math"),
                "floor",
                vec![JsNode::binary(left, "/", right)],
            )
        } else {
            let modulo = self.utility("modulo");
            JsNode::call(modulo, vec![left, right])
        }
    }

    /// `do (a = 1, b) -> ...`  =>  `(function(a, b) {...})(1, b)`
    fn lower_do(&mut self, first: NodeIndex) -> CompileResult<JsNode> {
        let mut callee = self.unwrap_all(first);
        let mut function = callee;
        if let Some(NodeKind::Assign { value, .. }) = self.tree.kind(callee) {
            function = self.unwrap_all(*value);
        }
        let Some(NodeKind::Code {
            params,
            body,
            bound,
        }) = self.tree.kind(function).cloned()
        else {
            let callee = self.lower_expr(first)?;
            return Ok(JsNode::call(callee, Vec::new()));
        };

        let mut args = Vec::with_capacity(params.len());
        let mut stripped = Vec::with_capacity(params.len());
        for param in params {
            match self.kind(param)? {
                NodeKind::Param {
                    name,
                    value: Some(value),
                    splat,
                } => {
                    args.push(self.lower_expr(value)?);
                    stripped.push(self.synth(
                        NodeKind::Param {
                            name,
                            value: None,
                            splat,
                        },
                        param,
                    ));
                }
                NodeKind::Param { name, .. } => {
                    args.push(self.lower_expr(name)?);
                    stripped.push(param);
                }
                _ => stripped.push(param),
            }
        }
        let code = self.replacement(
            NodeKind::Code {
                params: stripped,
                body,
                bound,
            },
            function,
        );
        if function != callee
            && let Some(NodeKind::Assign {
                variable, context, ..
            }) = self.tree.kind(callee).cloned()
        {
            callee = self.replacement(
                NodeKind::Assign {
                    variable,
                    value: code,
                    context,
                },
                callee,
            );
        } else {
            callee = code;
        }
        let callee = self.lower_expr(callee)?;
        Ok(JsNode::call(callee.paren(), args))
    }

    /// `a?` as an expression.
    pub(crate) fn lower_existence(
        &mut self,
        expression: NodeIndex,
        only_not_undefined: bool,
        negated: bool,
    ) -> CompileResult<JsNode> {
        let lowered = self.lower_expr(expression)?;
        Ok(self.existence_check(expression, lowered, only_not_undefined, negated))
    }

    /// Existence test of an already-lowered expression.
    ///
    /// An identifier that is not declared anywhere may not exist at all, so
    /// it is checked with `typeof` first.
    pub(crate) fn existence_check(
        &self,
        expression: NodeIndex,
        lowered: JsNode,
        only_not_undefined: bool,
        negated: bool,
    ) -> JsNode {
        let undeclared = self
            .identifier_name(expression)
            .is_some_and(|name| !self.scopes.check(self.scope(), &name));
        let (strict, conjunction) = if negated { ("===", "||") } else { ("!==", "&&") };
        if undeclared {
            let typeof_check = JsNode::binary(
                JsNode::unary("typeof", lowered.clone()),
                strict,
                JsNode::string("undefined"),
            );
            if only_not_undefined {
                return typeof_check;
            }
            return JsNode::binary(
                typeof_check,
                conjunction,
                JsNode::binary(lowered, strict, JsNode::null()),
            );
        }
        if only_not_undefined {
            JsNode::binary(lowered, strict, JsNode::undefined())
        } else {
            let loose = if negated { "==" } else { "!=" };
            JsNode::binary(lowered, loose, JsNode::null())
        }
    }

    /// `a in [b, c]`: strict comparisons for short literal arrays, an
    /// `indexOf` search otherwise.
    pub(crate) fn lower_in(
        &mut self,
        object: NodeIndex,
        array: NodeIndex,
        negated: bool,
    ) -> CompileResult<JsNode> {
        let literal = match self.tree.kind(self.unwrap(array)) {
            Some(NodeKind::Arr { objects }) => Some(objects.clone()),
            _ => None,
        };
        if let Some(items) = literal
            && !items.is_empty()
            && items.len() <= IN_OPERATOR_OR_CHAIN_LIMIT
            && !items
                .iter()
                .any(|&i| matches!(self.tree.kind(i), Some(NodeKind::Splat { .. })))
        {
            let (cached, read) = self.cache_value(object, "ref", false);
            let (compare, conjunction) = if negated { ("!==", "&&") } else { ("===", "||") };
            let mut test: Option<JsNode> = None;
            for (i, item) in items.into_iter().enumerate() {
                let subject = self.lower_expr(if i == 0 { cached } else { read })?;
                let item = self.lower_expr(item)?;
                let comparison = JsNode::binary(subject, compare, item);
                test = Some(match test {
                    None => comparison,
                    Some(previous) => JsNode::binary(previous, conjunction, comparison),
                });
            }
            return Ok(test.unwrap_or_else(|| JsNode::new(JsKind::Bool(negated))));
        }

        let (cached, read) = self.cache_value(object, "ref", false);
        let index_of = self.utility("indexOf");
        let array = self.lower_expr(array)?;
        let subject = self.lower_expr(read)?;
        let (compare, bound) = if negated { ("<", "0") } else { (">=", "0") };
        let search = JsNode::binary(
            JsNode::method_call(index_of, "call", vec![array, subject]),
            compare,
            JsNode::number(bound),
        );
        if cached == read {
            return Ok(search);
        }
        let cached = self.lower_expr(cached)?;
        Ok(JsNode::sequence(vec![cached, search]))
    }

    /// Lower a condition with its truth value inverted.
    pub(crate) fn lower_inverted(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let target = self.unwrap(idx);
        match self.kind(target)? {
            NodeKind::Existence {
                expression,
                only_not_undefined,
                negated,
            } => {
                let loc = self.loc(idx);
                Ok(self
                    .lower_existence(expression, only_not_undefined, !negated)?
                    .located(loc))
            }
            NodeKind::In {
                object,
                array,
                negated,
            } => self.lower_in(object, array, !negated),
            _ => Ok(invert(self.lower_expr(idx)?)),
        }
    }
}

/// Invert a lowered condition.
pub(crate) fn invert(node: JsNode) -> JsNode {
    let JsNode {
        kind,
        loc,
        comments,
    } = node;
    let kind = match kind {
        JsKind::Binary {
            operator,
            left,
            right,
        } if matches!(operator.as_str(), "===" | "!==" | "==" | "!=") => {
            let inverted = match operator.as_str() {
                "===" => "!==",
                "!==" => "===",
                "==" => "!=",
                _ => "==",
            };
            JsKind::Binary {
                operator: inverted.to_string(),
                left,
                right,
            }
        }
        JsKind::Unary {
            operator,
            operand,
            prefix: true,
        } if operator == "!" => {
            return (*operand).with_comments(comments).located(loc);
        }
        JsKind::Paren(inner) => return invert(*inner).with_comments(comments).located(loc),
        other => {
            let original = JsNode {
                kind: other,
                loc,
                comments: Vec::new(),
            };
            return JsNode::not(original).with_comments(comments).located(loc);
        }
    };
    JsNode {
        kind,
        loc,
        comments,
    }
}
