//! Fragment printer for lowered IR.
//!
//! Walks a [`JsNode`] tree and produces located output fragments. Every
//! desugaring decision was made during lowering; the printer only decides
//! layout and grouping:
//!
//! - parentheses are added where a node's precedence is lower than its
//!   position demands (see [`precedence`])
//! - function, class and object literals are grouped at the start of an
//!   expression statement, and functions are grouped as callees
//! - a named class in statement position prints as a declaration
//!
//! Comments attached to nodes are staged on the node's first and last
//! fragments and spliced in by [`comments::interleave`].

pub mod comments;
pub mod hoist;
pub mod precedence;

use crate::fragment::{Fragment, fragments_to_text};
use crate::ir::{
    JsClass, JsFunction, JsImportSpecifier, JsKind, JsNode, JsParam, JsProgram, MethodKind,
};
use crate::lowering::Level;
use csz_common::SourceLocation;
use precedence::{
    ASSIGN, CALL, LIST, LOGICAL_OR, MEMBER, POSTFIX, UNARY, binary_precedence, is_atomic,
    is_bare_integer, level_precedence,
};
use std::borrow::Cow;

/// Print one lowered node at the requested level.
pub fn print_node(node: &JsNode, level: Level, indent: &str) -> Vec<Fragment> {
    let mut printer = Printer::new(indent);
    if level == Level::Top {
        printer.emit_statement(node);
    } else {
        printer.emit_expr(node, level_precedence(level));
    }
    comments::interleave(printer.fragments, indent)
}

pub fn print_to_string(node: &JsNode, level: Level, indent: &str) -> String {
    fragments_to_text(&print_node(node, level, indent))
}

/// Print a whole program, with its top-level wrapper unless it is bare.
pub fn print_program(program: &JsProgram, indent: &str) -> Vec<Fragment> {
    let mut printer = Printer::new(indent);
    printer.location = program.loc;
    let body = flat_statements(&program.body);
    if program.wrapped {
        printer.write("(function() {");
        if !body.is_empty() {
            printer.write_line();
            printer.increase_indent();
            printer.emit_lines(&body, true);
            printer.write_line();
            printer.decrease_indent();
        }
        printer.write("}).call(this);");
        printer.write_line();
    } else {
        printer.emit_lines(&body, true);
    }

    let mut fragments = printer.fragments;
    if !program.comments.is_empty() {
        if fragments.is_empty() {
            fragments.push(Fragment::new("", program.loc));
        }
        let (leading, trailing): (Vec<_>, Vec<_>) =
            program.comments.iter().cloned().partition(|c| c.is_leading());
        fragments[0].preceding.extend(leading);
        if let Some(last) = fragments.last_mut() {
            last.following.extend(trailing);
        }
    }
    comments::interleave(fragments, indent)
}

/// Statement list with comment-free `Statements` wrappers flattened away.
/// A wrapper's own comments move to its first statement.
fn flat_statements(items: &[JsNode]) -> Vec<Cow<'_, JsNode>> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match &item.kind {
            JsKind::Statements(inner) if item.comments.is_empty() => {
                out.extend(flat_statements(inner));
            }
            JsKind::Statements(inner) => {
                let mut nested = flat_statements(inner);
                if nested.is_empty() {
                    out.push(Cow::Borrowed(item));
                    continue;
                }
                let first = nested.remove(0).into_owned();
                nested.insert(0, Cow::Owned(first.with_comments(item.comments.clone())));
                out.extend(nested);
            }
            JsKind::Hoisted(_) if item.comments.is_empty() => {}
            _ => out.push(Cow::Borrowed(item)),
        }
    }
    out
}

struct Printer<'a> {
    fragments: Vec<Fragment>,
    indent_str: &'a str,
    indent_level: usize,
    /// Location of the innermost located node being printed.
    location: Option<SourceLocation>,
    /// Nothing has been written yet for the current expression statement.
    statement_start: bool,
}

impl<'a> Printer<'a> {
    fn new(indent_str: &'a str) -> Self {
        Self {
            fragments: Vec::new(),
            indent_str,
            indent_level: 0,
            location: None,
            statement_start: false,
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    fn write(&mut self, text: &str) {
        self.fragments.push(Fragment::new(text, self.location));
        self.statement_start = false;
    }

    fn write_line(&mut self) {
        self.fragments.push(Fragment::new("\n", None));
    }

    fn write_indent(&mut self) {
        if self.indent_level > 0 {
            self.fragments
                .push(Fragment::new(self.indent_str.repeat(self.indent_level), None));
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Print `node` through `emit`, locating its fragments and staging its
    /// comments on the first and last of them.
    fn with_node(&mut self, node: &JsNode, emit: impl FnOnce(&mut Self)) {
        let saved = self.location;
        if node.loc.is_some() {
            self.location = node.loc;
        }
        let start = self.fragments.len();
        emit(self);
        self.location = saved;
        if node.comments.is_empty() {
            return;
        }
        if self.fragments.len() == start {
            self.fragments.push(Fragment::new("", node.loc));
        }
        for comment in &node.comments {
            if comment.is_leading() {
                self.fragments[start].preceding.push(comment.clone());
            } else if let Some(last) = self.fragments.last_mut() {
                last.following.push(comment.clone());
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// One statement per line; `spaced` separates them with blank lines.
    fn emit_lines(&mut self, items: &[Cow<'_, JsNode>], spaced: bool) {
        for (i, item) in items.iter().enumerate() {
            if spaced && i > 0 {
                self.write_line();
            }
            self.write_indent();
            self.emit_statement(item);
            self.write_line();
        }
    }

    /// `{ ... }` around a statement list, `{}` when it is empty.
    fn emit_block(&mut self, body: &[JsNode], spaced: bool) {
        let flat = flat_statements(body);
        if flat.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.write_line();
        self.increase_indent();
        self.emit_lines(&flat, spaced);
        if spaced {
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    fn emit_statement(&mut self, node: &JsNode) {
        crate::ensure_stack(|| self.with_node(node, |p| p.emit_statement_kind(node)));
    }

    fn emit_statement_kind(&mut self, node: &JsNode) {
        match &node.kind {
            JsKind::ExprStmt(expr) => self.emit_expression_statement(expr),
            JsKind::VarDecl(declarators) => {
                self.emit_var_decl(declarators);
                self.write(";");
            }
            JsKind::Return(argument) => {
                self.write("return");
                if let Some(argument) = argument {
                    self.write(" ");
                    self.emit_expr(argument, 0);
                }
                self.write(";");
            }
            JsKind::Throw(argument) => {
                self.write("throw ");
                self.emit_expr(argument, 0);
                self.write(";");
            }
            JsKind::Break(label) => self.emit_jump("break", label.as_deref()),
            JsKind::Continue(label) => self.emit_jump("continue", label.as_deref()),
            JsKind::Debugger => self.write("debugger;"),
            JsKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.write("if (");
                self.emit_expr(test, 0);
                self.write(") ");
                self.emit_block(consequent, false);
                if let Some(alternate) = alternate {
                    self.write(" else ");
                    match &alternate.kind {
                        JsKind::If { .. } => self.emit_statement(alternate),
                        JsKind::Block(body) => {
                            self.with_node(alternate, |p| p.emit_block(body, false));
                        }
                        _ => self.emit_block(std::slice::from_ref(&**alternate), false),
                    }
                }
            }
            JsKind::Block(body) => self.emit_block(body, false),
            JsKind::While { test, body } => {
                self.write("while (");
                self.emit_expr(test, 0);
                self.write(") ");
                self.emit_block(body, false);
            }
            JsKind::For {
                init,
                test,
                update,
                body,
            } => {
                self.write("for (");
                if let Some(init) = init {
                    self.emit_for_left(init);
                }
                self.write(";");
                if let Some(test) = test {
                    self.write(" ");
                    self.emit_expr(test, 0);
                }
                self.write(";");
                if let Some(update) = update {
                    self.write(" ");
                    self.emit_expr(update, 0);
                }
                self.write(") ");
                self.emit_block(body, false);
            }
            JsKind::ForIn { left, right, body } => {
                self.write("for (");
                self.emit_for_left(left);
                self.write(" in ");
                self.emit_expr(right, 0);
                self.write(") ");
                self.emit_block(body, false);
            }
            JsKind::ForOf { left, right, body } => {
                self.write("for (");
                self.emit_for_left(left);
                self.write(" of ");
                self.emit_expr(right, ASSIGN);
                self.write(") ");
                self.emit_block(body, false);
            }
            JsKind::Switch {
                discriminant,
                cases,
            } => {
                self.write("switch (");
                self.emit_expr(discriminant, 0);
                self.write(") {");
                self.write_line();
                self.increase_indent();
                for case in cases {
                    self.write_indent();
                    match &case.test {
                        Some(test) => {
                            self.write("case ");
                            self.emit_expr(test, 0);
                            self.write(":");
                        }
                        None => self.write("default:"),
                    }
                    self.write_line();
                    self.increase_indent();
                    let body = flat_statements(&case.body);
                    self.emit_lines(&body, false);
                    self.decrease_indent();
                }
                self.decrease_indent();
                self.write_indent();
                self.write("}");
            }
            JsKind::Try {
                block,
                param,
                handler,
                finalizer,
            } => {
                self.write("try ");
                self.emit_block(block, false);
                if let Some(handler) = handler {
                    self.write(" catch ");
                    if let Some(param) = param {
                        self.write("(");
                        self.emit_expr(param, 0);
                        self.write(") ");
                    }
                    self.emit_block(handler, false);
                }
                if let Some(finalizer) = finalizer {
                    self.write(" finally ");
                    self.emit_block(finalizer, false);
                }
            }
            JsKind::Import {
                default,
                namespace,
                specifiers,
                source,
            } => {
                self.write("import ");
                let mut clauses = Vec::new();
                if let Some(default) = default {
                    clauses.push(default.clone());
                }
                if let Some(namespace) = namespace {
                    clauses.push(format!("* as {namespace}"));
                }
                if let Some(specifiers) = specifiers {
                    clauses.push(specifier_list(specifiers));
                }
                if !clauses.is_empty() {
                    self.write(&clauses.join(", "));
                    self.write(" from ");
                }
                self.write(&quote(source));
                self.write(";");
            }
            JsKind::ExportNamed { specifiers, source } => {
                self.write("export ");
                self.write(&specifier_list(specifiers));
                if let Some(source) = source {
                    self.write(" from ");
                    self.write(&quote(source));
                }
                self.write(";");
            }
            JsKind::ExportDefault(value) => {
                self.write("export default ");
                self.emit_expr(value, ASSIGN);
                self.write(";");
            }
            JsKind::ExportAll { source } => {
                self.write("export * from ");
                self.write(&quote(source));
                self.write(";");
            }
            JsKind::ExportDeclaration(declaration) => {
                self.write("export ");
                match &declaration.kind {
                    JsKind::Class(class) => {
                        self.with_node(declaration, |p| p.emit_class(class));
                    }
                    _ => self.emit_statement(declaration),
                }
            }
            JsKind::Statements(items) => {
                let flat = flat_statements(items);
                for (i, item) in flat.iter().enumerate() {
                    if i > 0 {
                        self.write_line();
                        self.write_indent();
                    }
                    self.emit_statement(item);
                }
            }
            JsKind::Hoisted(_) => {}
            _ => self.emit_expression_statement(node),
        }
    }

    fn emit_expression_statement(&mut self, expr: &JsNode) {
        match &expr.kind {
            JsKind::Class(class) if class.name.is_some() => {
                self.with_node(expr, |p| p.emit_class(class));
            }
            JsKind::Assign { target, .. } if matches!(target.kind, JsKind::Object(_)) => {
                self.write("(");
                self.emit_expr(expr, 0);
                self.write(");");
            }
            _ => {
                self.statement_start = true;
                self.emit_expr(expr, 0);
                self.statement_start = false;
                self.write(";");
            }
        }
    }

    fn emit_jump(&mut self, keyword: &str, label: Option<&str>) {
        self.write(keyword);
        if let Some(label) = label {
            self.write(" ");
            self.write(label);
        }
        self.write(";");
    }

    fn emit_var_decl(&mut self, declarators: &[(String, Option<JsNode>)]) {
        self.write("var ");
        for (i, (name, init)) in declarators.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(name);
            if let Some(init) = init {
                self.write(" = ");
                self.emit_expr(init, ASSIGN);
            }
        }
    }

    /// The head of a `for` statement: a declaration or an expression.
    fn emit_for_left(&mut self, node: &JsNode) {
        match &node.kind {
            JsKind::VarDecl(declarators) => {
                self.with_node(node, |p| p.emit_var_decl(declarators));
            }
            _ => self.emit_expr(node, 0),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn emit_expr(&mut self, node: &JsNode, min: u8) {
        crate::ensure_stack(|| {
            self.with_node(node, |p| {
                if p.needs_parens(node, min) {
                    p.write("(");
                    p.emit_expr_kind(node, 0);
                    p.write(")");
                } else {
                    p.emit_expr_kind(node, min);
                }
            });
        });
    }

    fn needs_parens(&self, node: &JsNode, min: u8) -> bool {
        match &node.kind {
            JsKind::Function(func) if !func.arrow => self.statement_start || min >= CALL,
            JsKind::Class(_) => self.statement_start || min >= CALL,
            JsKind::Object(_) => self.statement_start,
            JsKind::Number(text) if min >= CALL => is_bare_integer(text),
            _ => precedence::precedence(node) < min,
        }
    }

    fn emit_expr_kind(&mut self, node: &JsNode, min: u8) {
        match &node.kind {
            JsKind::Number(text) => self.write(text),
            JsKind::Str(value) => self.write(&quote(value)),
            JsKind::Bool(value) => self.write(if *value { "true" } else { "false" }),
            JsKind::Null => self.write("null"),
            JsKind::Undefined => self.write("void 0"),
            JsKind::Regex { pattern, flags } => self.write(&format!("/{pattern}/{flags}")),
            JsKind::Template {
                quasis,
                expressions,
            } => {
                self.write("`");
                for (i, quasi) in quasis.iter().enumerate() {
                    self.write(&escape_template(quasi));
                    if let Some(expression) = expressions.get(i) {
                        self.write("${");
                        self.emit_expr(expression, 0);
                        self.write("}");
                    }
                }
                self.write("`");
            }
            JsKind::Raw(code) => self.write(code),
            JsKind::Identifier(name) => self.write(name),
            JsKind::This => self.write("this"),
            JsKind::Super => self.write("super"),
            JsKind::Member { object, property } => {
                self.emit_expr(object, CALL);
                self.write(".");
                self.write(property);
            }
            JsKind::Index { object, index } => {
                self.emit_expr(object, CALL);
                self.write("[");
                self.emit_expr(index, 0);
                self.write("]");
            }
            JsKind::Call { callee, args } => {
                self.emit_expr(callee, CALL);
                self.emit_args(args);
            }
            JsKind::New { callee, args } => {
                self.write("new ");
                self.emit_expr(callee, MEMBER);
                self.emit_args(args);
            }
            JsKind::Unary {
                operator,
                operand,
                prefix: true,
            } => {
                self.write(operator);
                if needs_space_after(operator, operand) {
                    self.write(" ");
                }
                self.emit_expr(operand, UNARY);
            }
            JsKind::Unary {
                operator, operand, ..
            } => {
                self.emit_expr(operand, POSTFIX);
                self.write(operator);
            }
            JsKind::Binary {
                operator,
                left,
                right,
            } => {
                let (own, right_assoc) = binary_precedence(operator);
                let (left_min, right_min) = if right_assoc {
                    (POSTFIX, own)
                } else {
                    (own, own + 1)
                };
                self.emit_expr(left, left_min);
                self.write(&format!(" {operator} "));
                self.emit_expr(right, right_min);
            }
            JsKind::Assign {
                operator,
                target,
                value,
            } => {
                self.emit_expr(target, CALL);
                self.write(&format!(" {operator} "));
                self.emit_expr(value, ASSIGN);
            }
            JsKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.emit_expr(test, LOGICAL_OR);
                self.write(" ? ");
                self.emit_expr(consequent, ASSIGN);
                self.write(" : ");
                self.emit_expr(alternate, ASSIGN);
            }
            JsKind::Sequence(items) => self.emit_list(items, LIST),
            JsKind::Array(elements) => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(element) = element {
                        self.emit_expr(element, LIST);
                    }
                }
                if matches!(elements.last(), Some(None)) {
                    self.write(",");
                }
                self.write("]");
            }
            JsKind::Object(properties) => {
                if properties.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{");
                self.emit_list(properties, LIST);
                self.write("}");
            }
            JsKind::Property {
                key,
                value,
                computed,
                shorthand,
            } => {
                self.emit_key(key, *computed);
                if !*shorthand {
                    self.write(": ");
                    self.emit_expr(value, LIST);
                }
            }
            JsKind::Spread(argument) => {
                self.write("...");
                self.emit_expr(argument, ASSIGN);
            }
            JsKind::Function(func) => self.emit_function(func),
            JsKind::Class(class) => self.emit_class(class),
            JsKind::Method {
                key,
                computed,
                is_static,
                kind,
                func,
            } => {
                if *is_static {
                    self.write("static ");
                }
                if func.is_async {
                    self.write("async ");
                }
                if func.generator {
                    self.write("*");
                }
                match kind {
                    MethodKind::Constructor => self.write("constructor"),
                    MethodKind::Method => self.emit_key(key, *computed),
                }
                self.emit_params(&func.params);
                self.write(" ");
                self.emit_block(&func.body, func.spaced);
            }
            JsKind::Yield { argument, delegate } => {
                self.write(if *delegate { "yield*" } else { "yield" });
                if let Some(argument) = argument {
                    self.write(" ");
                    self.emit_expr(argument, ASSIGN);
                }
            }
            JsKind::Await(argument) => {
                self.write("await ");
                self.emit_expr(argument, UNARY);
            }
            JsKind::Paren(inner) => {
                let transparent = is_atomic(inner)
                    || (min < LOGICAL_OR
                        && matches!(
                            inner.kind,
                            JsKind::Binary { .. }
                                | JsKind::Unary { .. }
                                | JsKind::Call { .. }
                                | JsKind::New { .. }
                                | JsKind::Member { .. }
                                | JsKind::Index { .. }
                        ));
                if transparent {
                    self.emit_expr(inner, min);
                } else {
                    self.write("(");
                    self.emit_expr(inner, 0);
                    self.write(")");
                }
            }
            JsKind::Hoisted(_) => {}
            _ => self.emit_statement_kind(node),
        }
    }

    fn emit_list(&mut self, items: &[JsNode], min: u8) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_expr(item, min);
        }
    }

    fn emit_args(&mut self, args: &[JsNode]) {
        self.write("(");
        self.emit_list(args, LIST);
        self.write(")");
    }

    /// Property or method key: names and literals as written, anything else
    /// in brackets.
    fn emit_key(&mut self, key: &JsNode, computed: bool) {
        match &key.kind {
            JsKind::Identifier(_) | JsKind::Str(_) | JsKind::Number(_) if !computed => {
                self.emit_expr(key, 0);
            }
            _ => {
                self.write("[");
                self.emit_expr(key, ASSIGN);
                self.write("]");
            }
        }
    }

    fn emit_params(&mut self, params: &[JsParam]) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if param.rest {
                self.write("...");
            }
            self.emit_expr(&param.target, LIST);
            if let Some(default) = &param.default_value {
                self.write(" = ");
                self.emit_expr(default, ASSIGN);
            }
        }
        self.write(")");
    }

    fn emit_function(&mut self, func: &JsFunction) {
        if func.is_async {
            self.write("async ");
        }
        if func.arrow {
            self.emit_params(&func.params);
            self.write(" => ");
        } else {
            self.write(if func.generator { "function*" } else { "function" });
            if let Some(name) = &func.name {
                self.write(" ");
                self.write(name);
            }
            self.emit_params(&func.params);
            self.write(" ");
        }
        self.emit_block(&func.body, func.spaced);
    }

    fn emit_class(&mut self, class: &JsClass) {
        self.write("class");
        if let Some(name) = &class.name {
            self.write(" ");
            self.write(name);
        }
        if let Some(superclass) = &class.superclass {
            self.write(" extends ");
            self.emit_expr(superclass, CALL);
        }
        let members = flat_statements(&class.members);
        if members.is_empty() {
            self.write(" {}");
            return;
        }
        self.write(" {");
        self.write_line();
        self.increase_indent();
        for member in &members {
            self.write_indent();
            self.emit_expr(member, 0);
            self.write_line();
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }
}

fn needs_space_after(operator: &str, operand: &JsNode) -> bool {
    if operator.chars().all(|c| c.is_ascii_alphabetic()) {
        return true;
    }
    let Some(sign) = operator.chars().last().filter(|c| matches!(c, '+' | '-')) else {
        return false;
    };
    match &operand.kind {
        JsKind::Unary {
            operator: inner,
            prefix: true,
            ..
        } => inner.starts_with(sign),
        JsKind::Number(text) => text.starts_with(sign),
        _ => false,
    }
}

fn specifier_list(specifiers: &[JsImportSpecifier]) -> String {
    let items: Vec<String> = specifiers
        .iter()
        .map(|s| {
            if s.imported == s.local {
                s.imported.clone()
            } else {
                format!("{} as {}", s.imported, s.local)
            }
        })
        .collect();
    format!("{{{}}}", items.join(", "))
}

/// A double-quoted JavaScript string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 || c == '\x7F' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn escape_template(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
