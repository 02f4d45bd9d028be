//! Lowering of source nodes into JavaScript IR.
//!
//! The [`Compiler`] owns every piece of per-compile state: the synthetic node
//! overlay, the scope arena, the set of comments already attached to output,
//! hoist slots and the stack of enclosing function contexts. The parser's
//! arena is only read, so compiling the same tree twice from two fresh
//! `Compiler`s yields the same output.
//!
//! Each node family lives in its own submodule; they all extend `Compiler`
//! with `lower_*` methods. Two entry points drive them:
//!
//! - [`Compiler::lower_expr`] lowers a node whose value is used. Soaks are
//!   unfolded first and statements are closure-wrapped.
//! - [`Compiler::lower_stmt`] lowers a node in statement position.

mod analysis;
mod assign;
mod calls;
mod classes;
mod closure;
mod collections;
mod control;
mod destructure;
mod functions;
mod loops;
mod modules;
mod operators;
mod program;
mod soak;
mod utilities;
mod values;

use crate::babel;
use crate::fragment::Fragment;
use crate::ir::{JsKind, JsNode};
use crate::options::CompileOptions;
use crate::printer;
use crate::scope::{ROOT_SCOPE, ScopeId, Scopes};
use crate::tree::Tree;
use csz_ast::{Node, NodeAccess, NodeArena, NodeIndex, NodeKind};
use csz_common::diagnostics::{DiagnosticMessage, messages};
use csz_common::limits::MAX_LOWERING_DEPTH;
use csz_common::{Comment, CommentKey, CompileError, CompileResult, SourceLocation};
use rustc_hash::FxHashSet;

/// Precedence levels requested by a caller, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Statement position.
    Top,
    /// Inside explicit grouping.
    Paren,
    /// List element (argument, array item).
    List,
    /// Operand of a conditional.
    Cond,
    /// Operand of an operator.
    Op,
    /// Object of a property access.
    Access,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CtorKind {
    Base,
    Derived,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct MethodInfo {
    /// Method name, for bare `super(...)` calls inside the method.
    pub key: Option<String>,
    pub ctor: Option<CtorKind>,
}

/// What kind of function boundary a context belongs to.
#[derive(Clone, Debug)]
pub(crate) enum FnKind {
    Root,
    Plain,
    /// Fat-arrow function: `this` and `super` come from the enclosing context.
    Bound,
    /// Synthetic function of a closure wrapper; also transparent for `this`.
    Closure,
    Method(MethodInfo),
    /// Executable class body: `this` refers to the class under construction.
    ClassBody { name: String },
}

impl FnKind {
    /// Contexts that see `this` of their parent.
    pub(crate) fn inherits_this(&self) -> bool {
        matches!(self, FnKind::Bound | FnKind::Closure)
    }
}

pub(crate) struct FnCtx {
    pub kind: FnKind,
    pub scope: ScopeId,
    pub loops: u32,
    pub switches: u32,
    /// Nesting of statement bodies below the function body.
    pub nesting: u32,
    pub super_called: bool,
    /// `this.x = x` parameter assignments waiting for `super()` in a derived constructor.
    pub pending_this: Vec<JsNode>,
}

impl FnCtx {
    pub(crate) fn new(kind: FnKind, scope: ScopeId) -> Self {
        Self {
            kind,
            scope,
            loops: 0,
            switches: 0,
            nesting: 0,
            super_called: false,
            pending_this: Vec::new(),
        }
    }
}

/// Per-compile state and the node compilation contract.
pub struct Compiler<'a> {
    pub(crate) tree: Tree<'a>,
    pub(crate) options: &'a CompileOptions,
    pub(crate) scopes: Scopes,
    pub(crate) fns: Vec<FnCtx>,
    /// Comments already attached to lowered output.
    pub(crate) claimed: FxHashSet<CommentKey>,
    /// Hoist slots, filled after their placeholder was emitted.
    pub(crate) hoists: Vec<Option<JsNode>>,
    /// Loops whose iterations are collected into a result array.
    pub(crate) returning: FxHashSet<NodeIndex>,
    pub(crate) has_modules: bool,
    depth: u32,
    used: bool,
}

impl<'a> Compiler<'a> {
    pub fn new(arena: &'a NodeArena, options: &'a CompileOptions) -> Self {
        Self {
            tree: Tree::new(arena),
            options,
            scopes: Self::initial_scopes(arena, options),
            fns: vec![FnCtx::new(FnKind::Root, ROOT_SCOPE)],
            claimed: FxHashSet::default(),
            hoists: Vec::new(),
            returning: FxHashSet::default(),
            has_modules: false,
            depth: 0,
            used: false,
        }
    }

    fn initial_scopes(arena: &NodeArena, options: &CompileOptions) -> Scopes {
        let mut referenced: FxHashSet<String> = arena
            .iter()
            .filter_map(|(_, node)| match &node.kind {
                NodeKind::Identifier { name } => Some(name.clone()),
                _ => None,
            })
            .collect();
        referenced.extend(options.locals.iter().cloned());
        let mut scopes = Scopes::new(referenced);
        for local in &options.locals {
            scopes.parameter(ROOT_SCOPE, local);
        }
        scopes
    }

    /// Discard all per-compile state so the context can compile another program.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.scopes = Self::initial_scopes(self.tree.base(), self.options);
        self.fns = vec![FnCtx::new(FnKind::Root, ROOT_SCOPE)];
        self.claimed.clear();
        self.hoists.clear();
        self.returning.clear();
        self.has_modules = false;
        self.depth = 0;
        self.used = false;
    }

    fn mark_used(&mut self) -> CompileResult<()> {
        if self.used {
            return Err(CompileError::new(messages::CONTEXT_REUSED, &[], None));
        }
        self.used = true;
        Ok(())
    }

    // =========================================================================
    // Node compilation contract
    // =========================================================================

    /// Compile one node to output fragments at the requested level.
    ///
    /// A context serves a single call to `compile` or `to_tree`, root or not:
    /// the comments it claims would otherwise be missing from a later call.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn compile(&mut self, idx: NodeIndex, level: Level) -> CompileResult<Vec<Fragment>> {
        self.mark_used()?;
        if self.is_root(idx) {
            let program = self.lower_program(idx)?;
            return Ok(printer::print_program(&program, &self.options.indent));
        }
        let node = self.lower_at(idx, level)?;
        let node = self.substitute_hoists(node);
        Ok(printer::print_node(&node, level, &self.options.indent))
    }

    /// Compile one node to a Babel-compatible tree at the requested level.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn to_tree(&mut self, idx: NodeIndex, level: Level) -> CompileResult<serde_json::Value> {
        self.mark_used()?;
        if self.is_root(idx) {
            let program = self.lower_program(idx)?;
            return Ok(babel::program_to_tree(&program));
        }
        let node = self.lower_at(idx, level)?;
        let node = self.substitute_hoists(node);
        Ok(babel::node_to_tree(&node))
    }

    fn is_root(&self, idx: NodeIndex) -> bool {
        matches!(self.tree.kind(idx), Some(NodeKind::Root { .. }))
    }

    pub(crate) fn lower_at(&mut self, idx: NodeIndex, level: Level) -> CompileResult<JsNode> {
        if level == Level::Top {
            self.lower_stmt(idx)
        } else {
            self.lower_expr(idx)
        }
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Lower a node whose value is used.
    pub(crate) fn lower_expr(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        self.enter(idx)?;
        let result = crate::ensure_stack(|| self.lower_expr_inner(idx));
        self.depth -= 1;
        result
    }

    fn lower_expr_inner(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let comments = self.take_comments(idx);
        let loc = self.loc(idx);
        let target = self.unfold_soak(idx)?.unwrap_or(idx);
        let node = if self.is_statement(target) {
            self.compile_closure(target)?
        } else {
            self.lower_expression(target)?
        };
        Ok(node.located(loc).with_comments(comments))
    }

    /// Lower a node in statement position.
    pub(crate) fn lower_stmt(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        self.enter(idx)?;
        let result = crate::ensure_stack(|| self.lower_stmt_inner(idx));
        self.depth -= 1;
        result
    }

    fn lower_stmt_inner(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let comments = self.take_comments(idx);
        let loc = self.loc(idx);
        let target = self.unfold_soak(idx)?.unwrap_or(idx);
        let node = self.lower_statement(target)?;
        Ok(node.located(loc).with_comments(comments))
    }

    fn enter(&mut self, idx: NodeIndex) -> CompileResult<()> {
        if self.depth >= MAX_LOWERING_DEPTH {
            return Err(self.error(
                messages::NESTING_TOO_DEEP,
                &[&MAX_LOWERING_DEPTH.to_string()],
                idx,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn lower_statement(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let kind = self.kind(idx)?;
        let node = match kind {
            NodeKind::Block { expressions } => JsNode::statements(self.lower_statements(&expressions)?),
            NodeKind::If { .. } => self.lower_if_stmt(idx)?,
            NodeKind::While { .. } => self.lower_while(idx)?,
            NodeKind::For { .. } => self.lower_for(idx)?,
            NodeKind::Switch { .. } => self.lower_switch(idx)?,
            NodeKind::Try { .. } => self.lower_try(idx)?,
            NodeKind::Return { expression } => self.lower_return(idx, expression)?,
            NodeKind::Throw { expression } => {
                let value = self.lower_expr(expression)?;
                JsNode::new(JsKind::Throw(Box::new(value)))
            }
            NodeKind::StatementLiteral { keyword, label } => {
                self.lower_statement_literal(idx, keyword, label)?
            }
            NodeKind::ImportDeclaration { .. } => self.lower_import(idx)?,
            NodeKind::Export { .. } => self.lower_export(idx)?,
            NodeKind::Assign { .. } => stmt_of(self.lower_assign(idx, true)?),
            NodeKind::SuperCall { args } => stmt_of(self.lower_super_call(idx, &args, true)?),
            NodeKind::Root { .. } => {
                return Err(self.error(messages::UNEXPECTED_NODE, &["program root"], idx));
            }
            _ => stmt_of(self.lower_expression(idx)?),
        };
        Ok(node)
    }

    fn lower_expression(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let kind = self.kind(idx)?;
        let node = match kind {
            NodeKind::NumberLiteral { value } => JsNode::number(value),
            NodeKind::StringLiteral { value } => JsNode::string(value),
            NodeKind::BooleanLiteral { value } => JsNode::new(JsKind::Bool(value)),
            NodeKind::NullLiteral => JsNode::null(),
            NodeKind::UndefinedLiteral => JsNode::undefined(),
            NodeKind::RegexLiteral { pattern, flags } => {
                JsNode::new(JsKind::Regex { pattern, flags })
            }
            NodeKind::InfinityLiteral => JsNode::number("2e308"),
            NodeKind::NaNLiteral => JsNode::binary(JsNode::number("0"), "/", JsNode::number("0")),
            NodeKind::PassthroughLiteral { code } => JsNode::new(JsKind::Raw(code)),
            NodeKind::ThisLiteral => self.lower_this(idx)?,
            NodeKind::Identifier { name } => JsNode::id(name),
            NodeKind::PropertyName { name } => JsNode::id(name),
            NodeKind::Template { parts } => self.lower_template(&parts)?,
            NodeKind::Value { base, properties } => self.lower_value(base, &properties)?,
            NodeKind::Call { .. } => self.lower_call(idx)?,
            NodeKind::SuperCall { args } => self.lower_super_call(idx, &args, false)?,
            NodeKind::Super { accessor } => self.lower_super(idx, accessor)?,
            NodeKind::Assign { .. } => self.lower_assign(idx, false)?,
            NodeKind::Op { .. } => self.lower_op(idx)?,
            NodeKind::In {
                object,
                array,
                negated,
            } => self.lower_in(object, array, negated)?,
            NodeKind::Existence {
                expression,
                only_not_undefined,
                negated,
            } => self.lower_existence(expression, only_not_undefined, negated)?,
            NodeKind::Parens { body } => self.lower_parens(body)?,
            NodeKind::Code { .. } => self.lower_code(idx, None)?,
            NodeKind::Block { expressions } => self.lower_block_expr(&expressions)?,
            NodeKind::If { .. } => self.lower_if_expr(idx)?,
            NodeKind::Range { .. } => self.lower_range_array(idx)?,
            NodeKind::Obj { properties, .. } => self.lower_obj(&properties)?,
            NodeKind::Arr { objects } => self.lower_arr(&objects)?,
            NodeKind::Class { .. } => self.lower_class(idx)?,
            other => {
                return Err(self.error(messages::UNEXPECTED_NODE, &[other.name()], idx));
            }
        };
        Ok(node)
    }

    /// Lower a list of statements, flattening nested statement lists.
    pub(crate) fn lower_statements(&mut self, items: &[NodeIndex]) -> CompileResult<Vec<JsNode>> {
        let mut out = Vec::with_capacity(items.len());
        for &item in items {
            out.push(self.lower_stmt(item)?);
        }
        Ok(crate::ir::flatten_statements(out))
    }

    /// Lower a nested statement body (`if`, loop, `switch` or `try` block).
    pub(crate) fn lower_body(&mut self, idx: NodeIndex) -> CompileResult<Vec<JsNode>> {
        self.ctx_mut().nesting += 1;
        let result = match self.kind(idx) {
            Ok(NodeKind::Block { expressions }) => self.lower_statements(&expressions),
            Ok(_) => self.lower_stmt(idx).map(|node| crate::ir::flatten_statements(vec![node])),
            Err(err) => Err(err),
        };
        self.ctx_mut().nesting -= 1;
        result
    }

    // =========================================================================
    // Tree access
    // =========================================================================

    pub(crate) fn node(&self, idx: NodeIndex) -> CompileResult<&Node> {
        self.tree
            .node(idx)
            .ok_or_else(|| CompileError::new(messages::UNKNOWN_NODE, &[&idx.0.to_string()], None))
    }

    pub(crate) fn kind(&self, idx: NodeIndex) -> CompileResult<NodeKind> {
        self.node(idx).map(|n| n.kind.clone())
    }

    pub(crate) fn loc(&self, idx: NodeIndex) -> Option<SourceLocation> {
        self.tree.location(idx)
    }

    /// Add a synthetic node located at `like`.
    pub(crate) fn synth(&mut self, kind: NodeKind, like: NodeIndex) -> NodeIndex {
        let loc = self.loc(like);
        self.tree.add(kind, loc)
    }

    /// Add a synthetic node that stands in for `original`, keeping its comments.
    pub(crate) fn replacement(&mut self, kind: NodeKind, original: NodeIndex) -> NodeIndex {
        let (location, comments) = match self.tree.node(original) {
            Some(node) => (node.location, node.comments.clone()),
            None => (None, Vec::new()),
        };
        self.tree.add_node(Node {
            kind,
            location,
            comments,
        })
    }

    pub(crate) fn error(
        &self,
        message: DiagnosticMessage,
        args: &[&str],
        idx: NodeIndex,
    ) -> CompileError {
        CompileError::new(message, args, self.loc(idx))
    }

    // =========================================================================
    // Function contexts and scopes
    // =========================================================================

    pub(crate) fn ctx(&self) -> &FnCtx {
        // The root context is pushed at construction and never popped.
        &self.fns[self.fns.len() - 1]
    }

    pub(crate) fn ctx_mut(&mut self) -> &mut FnCtx {
        let last = self.fns.len() - 1;
        &mut self.fns[last]
    }

    pub(crate) fn scope(&self) -> ScopeId {
        self.ctx().scope
    }

    /// Run `f` inside a new function context, popping it even on error.
    pub(crate) fn with_fn<T>(
        &mut self,
        ctx: FnCtx,
        f: impl FnOnce(&mut Self) -> CompileResult<T>,
    ) -> CompileResult<T> {
        self.fns.push(ctx);
        let result = f(self);
        if self.fns.len() > 1 {
            self.fns.pop();
        }
        result
    }

    /// A reserved temporary in the current scope.
    pub(crate) fn free_variable(&mut self, name: &str, single: bool) -> String {
        let scope = self.scope();
        self.scopes.free_variable(scope, name, single, true)
    }

    /// An unreserved temporary name (declared by whoever assigns it).
    pub(crate) fn free_name(&mut self, name: &str, single: bool) -> String {
        let scope = self.scope();
        self.scopes.free_variable(scope, name, single, false)
    }

    /// Innermost context that owns `this`, skipping arrow functions and closures.
    pub(crate) fn this_ctx_index(&self) -> usize {
        let mut i = self.fns.len() - 1;
        while i > 0 && self.fns[i].kind.inherits_this() {
            i -= 1;
        }
        i
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Claim the comments of a node that have not been attached elsewhere yet.
    pub(crate) fn take_comments(&mut self, idx: NodeIndex) -> Vec<Comment> {
        let Some(node) = self.tree.node(idx) else {
            return Vec::new();
        };
        if node.comments.is_empty() {
            return Vec::new();
        }
        let comments = node.comments.clone();
        comments
            .into_iter()
            .filter(|c| self.claimed.insert(c.key()))
            .collect()
    }

    /// Lower a node only to read its text, leaving no trace in the compile
    /// state: claimed comments, scopes and synthetic nodes are restored.
    /// Comments are left out of the text.
    pub(crate) fn provisional_text(&mut self, idx: NodeIndex) -> String {
        let claimed = self.claimed.clone();
        let scopes = self.scopes.clone();
        let synthetic = self.tree.synthetic_len();
        let hoists = self.hoists.len();
        let text = match self.lower_expr(idx) {
            Ok(node) => {
                let mut node = self.substitute_hoists(node);
                strip_comments(&mut node);
                printer::print_to_string(&node, Level::List, &self.options.indent)
            }
            Err(_) => String::from("<expression>"),
        };
        self.claimed = claimed;
        self.scopes = scopes;
        self.tree.truncate(synthetic);
        self.hoists.truncate(hoists);
        text
    }

    // =========================================================================
    // Hoisting
    // =========================================================================

    /// Reserve a hoist slot; the returned placeholder is replaced by the
    /// slot's content before printing.
    pub(crate) fn hoist_target(&mut self) -> (usize, JsNode) {
        self.hoists.push(None);
        let slot = self.hoists.len() - 1;
        (slot, JsNode::new(JsKind::Hoisted(slot)))
    }

    pub(crate) fn fill_hoist(&mut self, slot: usize, content: JsNode) {
        if let Some(entry) = self.hoists.get_mut(slot) {
            *entry = Some(content);
        }
    }

    /// Replace every placeholder with its slot's content, recursively.
    pub(crate) fn substitute_hoists(&self, node: JsNode) -> JsNode {
        if self.hoists.is_empty() {
            return node;
        }
        crate::printer::hoist::substitute(node, &self.hoists)
    }
}

fn strip_comments(node: &mut JsNode) {
    node.comments.clear();
    crate::printer::hoist::for_each_child(node, &mut strip_comments);
}

/// Wrap an expression as a statement; statements pass through.
pub(crate) fn stmt_of(node: JsNode) -> JsNode {
    if node.is_statement() {
        node
    } else {
        JsNode::expr_stmt(node)
    }
}

#[cfg(test)]
#[path = "lowering_tests.rs"]
mod tests;
