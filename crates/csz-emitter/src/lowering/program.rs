//! The program root.
//!
//! Directive prologue strings stay first, then the root scope's `var`
//! statement, then the body. Unless the compile is bare or the program is a
//! module, printers wrap the whole body in `(function() { ... }).call(this);`.

use super::Compiler;
use crate::ir::JsProgram;
use crate::scope::ROOT_SCOPE;
use csz_ast::{NodeAccess, NodeIndex, NodeKind};
use csz_common::diagnostics::messages;
use csz_common::{Comment, CompileResult, SourceLocation};

impl Compiler<'_> {
    /// Lower a whole program.
    #[tracing::instrument(level = "debug", skip(self))]
    pub(crate) fn lower_program(&mut self, root: NodeIndex) -> CompileResult<JsProgram> {
        let NodeKind::Root { body } = self.kind(root)? else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["program body"], root));
        };
        let mut comments = self.banner();
        comments.extend(self.take_comments(root));
        comments.extend(self.take_comments(body));

        let expressions = match self.kind(body)? {
            NodeKind::Block { expressions } => expressions,
            _ => vec![body],
        };
        let is_module = expressions.iter().any(|&e| {
            matches!(
                self.tree.kind(e),
                Some(NodeKind::ImportDeclaration { .. } | NodeKind::Export { .. })
            )
        });
        let directives = expressions
            .iter()
            .take_while(|&&e| self.is_directive(e))
            .count();

        let mut prologue = self.lower_statements(&expressions[..directives])?;
        let statements = self.lower_statements(&expressions[directives..])?;
        let mut body = self.scope_declarations(ROOT_SCOPE);
        body.extend(statements);
        let body = self.substitute_hoists(crate::ir::JsNode::statements(body));
        prologue.extend(crate::ir::flatten_statements(vec![body]));

        let wrapped = !self.options.bare && !is_module && !self.has_modules;
        tracing::debug!(wrapped, statements = prologue.len(), "program lowered");
        Ok(JsProgram {
            body: prologue,
            comments,
            loc: self.loc(root),
            wrapped,
        })
    }

    /// A leading string literal statement such as `'use strict'`.
    fn is_directive(&self, idx: NodeIndex) -> bool {
        match self.tree.kind(idx) {
            Some(NodeKind::StringLiteral { .. }) => true,
            Some(NodeKind::Value { base, properties }) if properties.is_empty() => {
                matches!(self.tree.kind(*base), Some(NodeKind::StringLiteral { .. }))
            }
            _ => false,
        }
    }

    fn banner(&self) -> Vec<Comment> {
        match &self.options.header {
            Some(header) => vec![Comment::line(format!(" {header}"), SourceLocation::default())],
            None => Vec::new(),
        }
    }
}
