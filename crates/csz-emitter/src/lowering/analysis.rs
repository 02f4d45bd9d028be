//! Read-only queries over source nodes.
//!
//! These answer the questions lowering asks before committing to an output
//! shape: does a node need a statement context, does evaluating it twice
//! cost anything, where does control escape from it, which names does a
//! pattern bind.

use super::Compiler;
use csz_ast::{AssignContext, JumpKeyword, NodeAccess, NodeIndex, NodeKind};

/// Names that may never be assigned to.
pub(crate) const STRICT_PROSCRIBED: &[&str] = &["arguments", "eval"];

/// Words that cannot name a variable in the output.
pub(crate) const RESERVED: &[&str] = &[
    "case", "default", "function", "var", "void", "with", "const", "let", "enum", "export",
    "import", "native", "implements", "interface", "package", "private", "protected", "public",
    "static", "yield", "await", "new", "delete", "typeof", "in", "instanceof", "return", "throw",
    "break", "continue", "debugger", "if", "else", "switch", "for", "while", "do", "try", "catch",
    "finally", "class", "extends", "super", "this", "null", "true", "false", "undefined",
];

impl Compiler<'_> {
    /// Whether the node can only be emitted as a statement.
    pub fn is_statement(&self, idx: NodeIndex) -> bool {
        crate::ensure_stack(|| self.is_statement_kind(idx))
    }

    fn is_statement_kind(&self, idx: NodeIndex) -> bool {
        let Some(kind) = self.tree.kind(idx) else {
            return false;
        };
        match kind {
            NodeKind::Return { .. }
            | NodeKind::Throw { .. }
            | NodeKind::While { .. }
            | NodeKind::For { .. }
            | NodeKind::Switch { .. }
            | NodeKind::Try { .. }
            | NodeKind::StatementLiteral { .. }
            | NodeKind::ImportDeclaration { .. }
            | NodeKind::Export { .. }
            | NodeKind::Root { .. } => true,
            NodeKind::Block { expressions } => expressions.iter().any(|&e| self.is_statement(e)),
            NodeKind::If {
                body, else_body, ..
            } => {
                !self.is_single_expression(*body)
                    || else_body.is_some_and(|e| !self.is_single_expression(e))
            }
            _ => false,
        }
    }

    /// A block (or bare node) holding exactly one expression.
    pub(crate) fn is_single_expression(&self, idx: NodeIndex) -> bool {
        match self.tree.kind(idx) {
            Some(NodeKind::Block { expressions }) => {
                expressions.len() == 1 && !self.is_statement(expressions[0])
            }
            Some(_) => !self.is_statement(idx),
            None => false,
        }
    }

    /// Whether evaluating the node twice could repeat side effects or work.
    pub fn should_cache(&self, idx: NodeIndex) -> bool {
        match self.tree.kind(idx) {
            Some(
                NodeKind::NumberLiteral { .. }
                | NodeKind::StringLiteral { .. }
                | NodeKind::BooleanLiteral { .. }
                | NodeKind::NullLiteral
                | NodeKind::UndefinedLiteral
                | NodeKind::InfinityLiteral
                | NodeKind::NaNLiteral
                | NodeKind::RegexLiteral { .. }
                | NodeKind::ThisLiteral
                | NodeKind::Identifier { .. }
                | NodeKind::PropertyName { .. },
            ) => false,
            Some(NodeKind::Value { base, properties }) => {
                !properties.is_empty() || self.should_cache(*base)
            }
            Some(NodeKind::Parens { body }) => self.should_cache(self.unwrap_block(*body)),
            _ => true,
        }
    }

    /// The node through which control escapes `idx`, if any.
    ///
    /// A `return` always escapes; `break` only outside loops and switches and
    /// `continue` only outside loops. Function boundaries are not crossed.
    pub fn jumps(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.jumps_in(idx, false, false)
    }

    fn jumps_in(&self, idx: NodeIndex, in_loop: bool, in_switch: bool) -> Option<NodeIndex> {
        crate::ensure_stack(|| self.jumps_from(idx, in_loop, in_switch))
    }

    fn jumps_from(&self, idx: NodeIndex, in_loop: bool, in_switch: bool) -> Option<NodeIndex> {
        let kind = self.tree.kind(idx)?;
        match kind {
            NodeKind::Return { .. } => Some(idx),
            NodeKind::StatementLiteral { keyword, .. } => match keyword {
                JumpKeyword::Break if !(in_loop || in_switch) => Some(idx),
                JumpKeyword::Continue if !in_loop => Some(idx),
                _ => None,
            },
            NodeKind::Code { .. } | NodeKind::Class { .. } => None,
            NodeKind::While { .. } | NodeKind::For { .. } => kind
                .children()
                .into_iter()
                .find_map(|child| self.jumps_in(child, true, in_switch)),
            NodeKind::Switch { .. } => kind
                .children()
                .into_iter()
                .find_map(|child| self.jumps_in(child, in_loop, true)),
            _ => kind
                .children()
                .into_iter()
                .find_map(|child| self.jumps_in(child, in_loop, in_switch)),
        }
    }

    /// Strip value wrappers without properties.
    pub(crate) fn unwrap(&self, mut idx: NodeIndex) -> NodeIndex {
        while let Some(NodeKind::Value { base, properties }) = self.tree.kind(idx)
            && properties.is_empty()
        {
            idx = *base;
        }
        idx
    }

    /// A block of one expression stands for that expression.
    pub(crate) fn unwrap_block(&self, idx: NodeIndex) -> NodeIndex {
        match self.tree.kind(idx) {
            Some(NodeKind::Block { expressions }) if expressions.len() == 1 => expressions[0],
            _ => idx,
        }
    }

    /// Strip value wrappers, single-expression blocks and parentheses.
    pub(crate) fn unwrap_all(&self, mut idx: NodeIndex) -> NodeIndex {
        loop {
            let next = match self.tree.kind(idx) {
                Some(NodeKind::Value { base, properties }) if properties.is_empty() => *base,
                Some(NodeKind::Parens { body }) => self.unwrap_block(*body),
                Some(NodeKind::Block { expressions }) if expressions.len() == 1 => expressions[0],
                _ => return idx,
            };
            idx = next;
        }
    }

    /// Identifier name of a node once wrappers are stripped.
    pub(crate) fn identifier_name(&self, idx: NodeIndex) -> Option<String> {
        match self.tree.kind(self.unwrap(idx)) {
            Some(NodeKind::Identifier { name }) => Some(name.clone()),
            _ => None,
        }
    }

    /// `this` literal, possibly wrapped.
    pub(crate) fn is_this(&self, idx: NodeIndex) -> bool {
        matches!(self.tree.kind(self.unwrap(idx)), Some(NodeKind::ThisLiteral))
    }

    /// `@name`: a value rooted at `this` with one plain property access.
    pub(crate) fn this_property(&self, idx: NodeIndex) -> Option<String> {
        let Some(NodeKind::Value { base, properties }) = self.tree.kind(idx) else {
            return None;
        };
        if properties.len() != 1 || !self.is_this(*base) {
            return None;
        }
        match self.tree.kind(properties[0]) {
            Some(NodeKind::Access {
                name, soak: false, ..
            }) => self.tree.identifier_text(*name).map(str::to_string),
            _ => None,
        }
    }

    /// Whether the node is a valid assignment target.
    pub(crate) fn is_assignable(&self, idx: NodeIndex) -> bool {
        let Some(kind) = self.tree.kind(idx) else {
            return false;
        };
        match kind {
            NodeKind::Identifier { name } => !RESERVED.contains(&name.as_str()),
            NodeKind::Value { base, properties } => {
                if properties.is_empty() {
                    return self.is_assignable(*base);
                }
                properties.iter().all(|&p| {
                    matches!(
                        self.tree.kind(p),
                        Some(NodeKind::Access { soak: false, .. }
                            | NodeKind::Index { soak: false, .. }
                            | NodeKind::Slice { .. })
                    )
                })
            }
            NodeKind::Arr { objects } => objects.iter().all(|&o| self.is_pattern_element(o)),
            NodeKind::Obj { properties, .. } => {
                properties.iter().all(|&p| self.is_object_pattern_property(p))
            }
            _ => false,
        }
    }

    fn is_pattern_element(&self, idx: NodeIndex) -> bool {
        match self.tree.kind(idx) {
            Some(NodeKind::Elision | NodeKind::Expansion) => true,
            Some(NodeKind::Splat { name }) => self.is_assignable(*name),
            Some(NodeKind::Assign {
                variable,
                context: AssignContext::Plain,
                ..
            }) => self.is_assignable(*variable),
            Some(_) => self.is_assignable(idx),
            None => false,
        }
    }

    fn is_object_pattern_property(&self, idx: NodeIndex) -> bool {
        match self.tree.kind(idx) {
            Some(NodeKind::Assign {
                value,
                context: AssignContext::Object,
                ..
            }) => self.is_pattern_element(*value),
            Some(NodeKind::Assign {
                variable,
                context: AssignContext::Plain,
                ..
            }) => self.is_assignable(*variable) || self.this_property(*variable).is_some(),
            Some(NodeKind::Splat { name }) => self.is_assignable(*name),
            Some(_) => self.is_assignable(idx) || self.this_property(idx).is_some(),
            None => false,
        }
    }

    /// Every identifier a pattern binds, in source order.
    pub fn each_name(&self, idx: NodeIndex, out: &mut Vec<String>) {
        crate::ensure_stack(|| self.each_name_in(idx, out));
    }

    fn each_name_in(&self, idx: NodeIndex, out: &mut Vec<String>) {
        let Some(kind) = self.tree.kind(idx) else {
            return;
        };
        match kind {
            NodeKind::Identifier { name } => out.push(name.clone()),
            NodeKind::Value { base, properties } if properties.is_empty() => {
                self.each_name(*base, out);
            }
            NodeKind::Arr { objects } => {
                for &object in objects {
                    self.each_name(object, out);
                }
            }
            NodeKind::Obj { properties, .. } => {
                for &property in properties {
                    self.each_name(property, out);
                }
            }
            NodeKind::Assign {
                variable,
                value,
                context,
            } => match context {
                AssignContext::Object => self.each_name(*value, out),
                _ => self.each_name(*variable, out),
            },
            NodeKind::Splat { name } => self.each_name(*name, out),
            NodeKind::Param { name, .. } => self.each_name(*name, out),
            _ => {}
        }
    }

    /// Whether the pattern binds `name`.
    pub(crate) fn assigns(&self, idx: NodeIndex, name: &str) -> bool {
        let mut names = Vec::new();
        self.each_name(idx, &mut names);
        names.iter().any(|n| n == name)
    }

    /// Whether the subtree (itself included) matches, without crossing functions.
    pub(crate) fn subtree_has(
        &self,
        idx: NodeIndex,
        predicate: &mut dyn FnMut(NodeIndex, &NodeKind) -> bool,
    ) -> bool {
        if let Some(kind) = self.tree.kind(idx)
            && predicate(idx, kind)
        {
            return true;
        }
        self.tree.contains(idx, false, predicate)
    }

    /// Whether the subtree applies one of `operators`, without entering functions.
    pub(crate) fn contains_operator(&self, idx: NodeIndex, operators: &[&str]) -> bool {
        let mut matches = |_: NodeIndex, kind: &NodeKind| {
            matches!(kind, NodeKind::Op { operator, .. } if operators.contains(&operator.as_str()))
        };
        self.subtree_has(idx, &mut matches)
    }

    /// Whether `this` is used directly or through an arrow function.
    pub(crate) fn uses_this(&self, idx: NodeIndex) -> bool {
        let mut found = false;
        self.visit_this_scope(idx, &mut |kind| {
            if matches!(
                kind,
                NodeKind::ThisLiteral | NodeKind::Super { .. } | NodeKind::SuperCall { .. }
            ) {
                found = true;
            }
        });
        found
    }

    /// Whether `arguments` is referenced without crossing plain functions.
    pub(crate) fn uses_arguments(&self, idx: NodeIndex) -> bool {
        let mut found = false;
        self.visit_this_scope(idx, &mut |kind| {
            if matches!(kind, NodeKind::Identifier { name } if name == "arguments") {
                found = true;
            }
        });
        found
    }

    /// Walk nodes sharing `this` with `idx`: bound functions are entered,
    /// plain functions and classes are not.
    fn visit_this_scope(&self, idx: NodeIndex, visit: &mut dyn FnMut(&NodeKind)) {
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            let Some(kind) = self.tree.kind(current) else {
                continue;
            };
            visit(kind);
            match kind {
                NodeKind::Code { bound: false, .. } | NodeKind::Class { .. } if current != idx => {}
                _ => stack.extend(kind.children().into_iter().rev()),
            }
        }
    }

    /// Integer value of a number literal, if it is a plain decimal integer.
    pub(crate) fn integer_literal(&self, idx: NodeIndex) -> Option<i64> {
        match self.tree.kind(self.unwrap(idx)) {
            Some(NodeKind::NumberLiteral { value }) => parse_integer(value),
            Some(NodeKind::Op {
                operator,
                first,
                second: None,
                ..
            }) if operator == "-" => self.integer_literal(*first).map(|n| -n),
            _ => None,
        }
    }

    /// Value of a number literal, fractional ones included.
    pub(crate) fn numeric_literal(&self, idx: NodeIndex) -> Option<f64> {
        if let Some(n) = self.integer_literal(idx) {
            return Some(n as f64);
        }
        match self.tree.kind(self.unwrap(idx)) {
            Some(NodeKind::NumberLiteral { value }) => {
                value.replace('_', "").parse::<f64>().ok().filter(|n| n.is_finite())
            }
            Some(NodeKind::Op {
                operator,
                first,
                second: None,
                ..
            }) if operator == "-" => self.numeric_literal(*first).map(|n| -n),
            _ => None,
        }
    }
}

/// Parse decimal, hex, octal and binary integer literals.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let text = text.replace('_', "");
    let lower = text.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        lower.parse().ok()
    }
}
