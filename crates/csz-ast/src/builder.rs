//! Convenience constructors for node trees.
//!
//! External parsers and tests build trees through [`TreeBuilder`]. Every node
//! receives a distinct synthetic location unless one is supplied, so that
//! comments and diagnostics always have a range to point at.
//!
//! All constructors take `&self`, which keeps nested construction readable:
//!
//! ```
//! use csz_ast::TreeBuilder;
//!
//! let b = TreeBuilder::new();
//! let call = b.call(b.id("f"), vec![b.num("1")]);
//! let root = b.root(vec![call]);
//! let arena = b.finish();
//! assert!(arena.get(root).is_some());
//! ```

use crate::arena::NodeArena;
use crate::node::{
    AssignContext, ExportKind, JumpKeyword, Node, NodeIndex, NodeKind, SwitchCase,
};
use csz_common::{Comment, SourceLocation, Span};
use std::cell::{Cell, RefCell};

#[derive(Debug, Default)]
pub struct TreeBuilder {
    arena: RefCell<NodeArena>,
    offset: Cell<u32>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the builder and return the finished arena.
    #[must_use]
    pub fn finish(self) -> NodeArena {
        self.arena.into_inner()
    }

    fn next_location(&self) -> SourceLocation {
        let start = self.offset.get();
        self.offset.set(start + 1);
        SourceLocation::on_line(0, start, start + 1, Span::new(start, start + 1))
    }

    /// Add a node with a fresh synthetic location.
    pub fn add(&self, kind: NodeKind) -> NodeIndex {
        let location = self.next_location();
        self.arena
            .borrow_mut()
            .add(Node::with_location(kind, Some(location)))
    }

    /// Add a node with an explicit location.
    pub fn add_located(&self, kind: NodeKind, location: SourceLocation) -> NodeIndex {
        self.arena
            .borrow_mut()
            .add(Node::with_location(kind, Some(location)))
    }

    pub fn set_location(&self, index: NodeIndex, location: SourceLocation, force: bool) -> bool {
        self.arena
            .borrow_mut()
            .set_location(index, location, force)
    }

    /// Kind of an already-built node.
    pub fn kind_of(&self, index: NodeIndex) -> Option<NodeKind> {
        self.arena.borrow().get(index).map(|n| n.kind.clone())
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// A `//` comment on its own line, with a fresh location.
    pub fn line_comment(&self, content: &str) -> Comment {
        Comment::line(content, self.next_location())
    }

    /// A `/* */` comment on its own line, with a fresh location.
    pub fn block_comment(&self, content: &str) -> Comment {
        Comment::block(content, self.next_location())
    }

    pub fn attach_comment(&self, index: NodeIndex, comment: Comment) {
        if let Some(node) = self.arena.borrow_mut().get_mut(index) {
            node.comments.push(comment);
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    pub fn id(&self, name: &str) -> NodeIndex {
        self.add(NodeKind::Identifier {
            name: name.to_string(),
        })
    }

    pub fn name(&self, name: &str) -> NodeIndex {
        self.add(NodeKind::PropertyName {
            name: name.to_string(),
        })
    }

    pub fn num(&self, value: &str) -> NodeIndex {
        self.add(NodeKind::NumberLiteral {
            value: value.to_string(),
        })
    }

    pub fn str(&self, value: &str) -> NodeIndex {
        self.add(NodeKind::StringLiteral {
            value: value.to_string(),
        })
    }

    pub fn bool(&self, value: bool) -> NodeIndex {
        self.add(NodeKind::BooleanLiteral { value })
    }

    pub fn null(&self) -> NodeIndex {
        self.add(NodeKind::NullLiteral)
    }

    pub fn undefined(&self) -> NodeIndex {
        self.add(NodeKind::UndefinedLiteral)
    }

    pub fn this(&self) -> NodeIndex {
        self.add(NodeKind::ThisLiteral)
    }

    pub fn regex(&self, pattern: &str, flags: &str) -> NodeIndex {
        self.add(NodeKind::RegexLiteral {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
        })
    }

    pub fn js(&self, code: &str) -> NodeIndex {
        self.add(NodeKind::PassthroughLiteral {
            code: code.to_string(),
        })
    }

    pub fn template(&self, parts: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Template { parts })
    }

    pub fn brk(&self) -> NodeIndex {
        self.add(NodeKind::StatementLiteral {
            keyword: JumpKeyword::Break,
            label: None,
        })
    }

    pub fn cont(&self) -> NodeIndex {
        self.add(NodeKind::StatementLiteral {
            keyword: JumpKeyword::Continue,
            label: None,
        })
    }

    pub fn debugger(&self) -> NodeIndex {
        self.add(NodeKind::StatementLiteral {
            keyword: JumpKeyword::Debugger,
            label: None,
        })
    }

    // =========================================================================
    // Values
    // =========================================================================

    pub fn value(&self, base: NodeIndex, properties: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Value { base, properties })
    }

    /// A `.name` access segment.
    pub fn access(&self, name: &str) -> NodeIndex {
        let name = self.name(name);
        self.add(NodeKind::Access {
            name,
            soak: false,
            shorthand: false,
        })
    }

    /// A `?.name` access segment.
    pub fn soak_access(&self, name: &str) -> NodeIndex {
        let name = self.name(name);
        self.add(NodeKind::Access {
            name,
            soak: true,
            shorthand: false,
        })
    }

    /// A `::name` access segment.
    pub fn proto_access(&self, name: &str) -> NodeIndex {
        let name = self.name(name);
        self.add(NodeKind::Access {
            name,
            soak: false,
            shorthand: true,
        })
    }

    pub fn index(&self, index: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Index { index, soak: false })
    }

    pub fn soak_index(&self, index: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Index { index, soak: true })
    }

    pub fn slice(&self, range: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Slice { range })
    }

    /// Append a property segment, extending `object` when it is already a value chain.
    pub fn chain(&self, object: NodeIndex, segment: NodeIndex) -> NodeIndex {
        match self.kind_of(object) {
            Some(NodeKind::Value {
                base,
                mut properties,
            }) => {
                properties.push(segment);
                self.value(base, properties)
            }
            _ => self.value(object, vec![segment]),
        }
    }

    /// `object.name`
    pub fn dot(&self, object: NodeIndex, name: &str) -> NodeIndex {
        let segment = self.access(name);
        self.chain(object, segment)
    }

    /// `object?.name`
    pub fn soak_dot(&self, object: NodeIndex, name: &str) -> NodeIndex {
        let segment = self.soak_access(name);
        self.chain(object, segment)
    }

    /// `object[index]`
    pub fn at(&self, object: NodeIndex, index: NodeIndex) -> NodeIndex {
        let segment = self.index(index);
        self.chain(object, segment)
    }

    /// `@name`
    pub fn this_prop(&self, name: &str) -> NodeIndex {
        let this = self.this();
        self.dot(this, name)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    pub fn call(&self, callee: NodeIndex, args: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Call {
            callee,
            args,
            soak: false,
            is_new: false,
        })
    }

    /// `callee?(args)`
    pub fn soak_call(&self, callee: NodeIndex, args: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Call {
            callee,
            args,
            soak: true,
            is_new: false,
        })
    }

    pub fn new_call(&self, callee: NodeIndex, args: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Call {
            callee,
            args,
            soak: false,
            is_new: true,
        })
    }

    pub fn super_call(&self, args: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::SuperCall { args })
    }

    /// `super.name`
    pub fn super_access(&self, name: &str) -> NodeIndex {
        let accessor = self.access(name);
        self.add(NodeKind::Super {
            accessor: Some(accessor),
        })
    }

    // =========================================================================
    // Assignment and operators
    // =========================================================================

    pub fn assign(&self, variable: NodeIndex, value: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Assign {
            variable,
            value,
            context: AssignContext::Plain,
        })
    }

    /// `variable op= value`; `operator` includes the `=`.
    pub fn compound(&self, operator: &str, variable: NodeIndex, value: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Assign {
            variable,
            value,
            context: AssignContext::Compound(operator.to_string()),
        })
    }

    /// `key: value` inside an object, class body or object pattern.
    pub fn prop(&self, key: &str, value: NodeIndex) -> NodeIndex {
        let key = self.name(key);
        self.prop_key(key, value)
    }

    pub fn prop_key(&self, key: NodeIndex, value: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Assign {
            variable: key,
            value,
            context: AssignContext::Object,
        })
    }

    pub fn op(&self, operator: &str, first: NodeIndex, second: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Op {
            operator: operator.to_string(),
            first,
            second: Some(second),
            flip: false,
        })
    }

    pub fn unary(&self, operator: &str, operand: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Op {
            operator: operator.to_string(),
            first: operand,
            second: None,
            flip: false,
        })
    }

    /// Postfix `++`/`--`.
    pub fn postfix(&self, operator: &str, operand: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Op {
            operator: operator.to_string(),
            first: operand,
            second: None,
            flip: true,
        })
    }

    /// `expression?`
    pub fn exists(&self, expression: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Existence {
            expression,
            only_not_undefined: false,
            negated: false,
        })
    }

    /// `object in array`
    pub fn in_array(&self, object: NodeIndex, array: NodeIndex) -> NodeIndex {
        self.add(NodeKind::In {
            object,
            array,
            negated: false,
        })
    }

    pub fn parens(&self, body: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Parens { body })
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// `(params) -> body`
    pub fn code(&self, params: Vec<NodeIndex>, body: Vec<NodeIndex>) -> NodeIndex {
        let body = self.block(body);
        self.add(NodeKind::Code {
            params,
            body,
            bound: false,
        })
    }

    /// `(params) => body`
    pub fn bound_code(&self, params: Vec<NodeIndex>, body: Vec<NodeIndex>) -> NodeIndex {
        let body = self.block(body);
        self.add(NodeKind::Code {
            params,
            body,
            bound: true,
        })
    }

    pub fn param(&self, name: &str) -> NodeIndex {
        let name = self.id(name);
        self.param_node(name, None, false)
    }

    /// `name = default`
    pub fn param_default(&self, name: &str, default: NodeIndex) -> NodeIndex {
        let name = self.id(name);
        self.param_node(name, Some(default), false)
    }

    /// `name...`
    pub fn splat_param(&self, name: &str) -> NodeIndex {
        let name = self.id(name);
        self.param_node(name, None, true)
    }

    /// `@name`
    pub fn this_param(&self, name: &str) -> NodeIndex {
        let name = self.this_prop(name);
        self.param_node(name, None, false)
    }

    pub fn param_node(&self, name: NodeIndex, value: Option<NodeIndex>, splat: bool) -> NodeIndex {
        self.add(NodeKind::Param { name, value, splat })
    }

    pub fn splat(&self, name: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Splat { name })
    }

    pub fn expansion(&self) -> NodeIndex {
        self.add(NodeKind::Expansion)
    }

    pub fn elision(&self) -> NodeIndex {
        self.add(NodeKind::Elision)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn block(&self, expressions: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Block { expressions })
    }

    pub fn root(&self, expressions: Vec<NodeIndex>) -> NodeIndex {
        let body = self.block(expressions);
        self.add(NodeKind::Root { body })
    }

    pub fn ret(&self, expression: Option<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Return { expression })
    }

    pub fn throw(&self, expression: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Throw { expression })
    }

    pub fn if_(
        &self,
        condition: NodeIndex,
        body: Vec<NodeIndex>,
        else_body: Option<Vec<NodeIndex>>,
    ) -> NodeIndex {
        let body = self.block(body);
        let else_body = else_body.map(|stmts| self.block(stmts));
        self.add(NodeKind::If {
            condition,
            body,
            else_body,
            negated: false,
        })
    }

    /// `if` whose else branch is another node (typically an `if`, forming a chain).
    pub fn if_else_node(
        &self,
        condition: NodeIndex,
        body: Vec<NodeIndex>,
        else_body: NodeIndex,
    ) -> NodeIndex {
        let body = self.block(body);
        self.add(NodeKind::If {
            condition,
            body,
            else_body: Some(else_body),
            negated: false,
        })
    }

    pub fn unless(&self, condition: NodeIndex, body: Vec<NodeIndex>) -> NodeIndex {
        let body = self.block(body);
        self.add(NodeKind::If {
            condition,
            body,
            else_body: None,
            negated: true,
        })
    }

    pub fn while_(&self, condition: NodeIndex, body: Vec<NodeIndex>) -> NodeIndex {
        let body = self.block(body);
        self.add(NodeKind::While {
            condition,
            guard: None,
            body,
            negated: false,
        })
    }

    pub fn until(&self, condition: NodeIndex, body: Vec<NodeIndex>) -> NodeIndex {
        let body = self.block(body);
        self.add(NodeKind::While {
            condition,
            guard: None,
            body,
            negated: true,
        })
    }

    /// `loop`: a `while true`.
    pub fn loop_(&self, body: Vec<NodeIndex>) -> NodeIndex {
        let condition = self.bool(true);
        self.while_(condition, body)
    }

    /// `for name in source`
    pub fn for_in(&self, name: NodeIndex, source: NodeIndex, body: Vec<NodeIndex>) -> NodeIndex {
        self.for_node(body, source, Some(name), None, false, false)
    }

    /// `for name, index in source`
    pub fn for_in_indexed(
        &self,
        name: NodeIndex,
        index: NodeIndex,
        source: NodeIndex,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.for_node(body, source, Some(name), Some(index), false, false)
    }

    /// `for key, value of source`
    pub fn for_of(
        &self,
        key: NodeIndex,
        value: Option<NodeIndex>,
        source: NodeIndex,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.for_node(body, source, value, Some(key), true, false)
    }

    /// `for name from source`
    pub fn for_from(&self, name: NodeIndex, source: NodeIndex, body: Vec<NodeIndex>) -> NodeIndex {
        self.for_node(body, source, Some(name), None, false, true)
    }

    fn for_node(
        &self,
        body: Vec<NodeIndex>,
        source: NodeIndex,
        name: Option<NodeIndex>,
        index: Option<NodeIndex>,
        object: bool,
        from: bool,
    ) -> NodeIndex {
        let body = self.block(body);
        self.add(NodeKind::For {
            body,
            source,
            name,
            index,
            guard: None,
            step: None,
            own: false,
            object,
            from,
        })
    }

    pub fn switch(
        &self,
        subject: Option<NodeIndex>,
        cases: Vec<(Vec<NodeIndex>, Vec<NodeIndex>)>,
        otherwise: Option<Vec<NodeIndex>>,
    ) -> NodeIndex {
        let cases = cases
            .into_iter()
            .map(|(conditions, body)| SwitchCase {
                conditions,
                body: self.block(body),
            })
            .collect();
        let otherwise = otherwise.map(|stmts| self.block(stmts));
        self.add(NodeKind::Switch {
            subject,
            cases,
            otherwise,
        })
    }

    pub fn try_(
        &self,
        attempt: Vec<NodeIndex>,
        catch: Option<(Option<NodeIndex>, Vec<NodeIndex>)>,
        ensure: Option<Vec<NodeIndex>>,
    ) -> NodeIndex {
        let attempt = self.block(attempt);
        let (error_variable, recovery) = match catch {
            Some((variable, body)) => (variable, Some(self.block(body))),
            None => (None, None),
        };
        let ensure = ensure.map(|stmts| self.block(stmts));
        self.add(NodeKind::Try {
            attempt,
            error_variable,
            recovery,
            ensure,
        })
    }

    // =========================================================================
    // Collections
    // =========================================================================

    pub fn range(&self, from: NodeIndex, to: NodeIndex, exclusive: bool) -> NodeIndex {
        self.add(NodeKind::Range {
            from: Some(from),
            to: Some(to),
            exclusive,
        })
    }

    pub fn obj(&self, properties: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Obj {
            properties,
            generated: false,
        })
    }

    pub fn arr(&self, objects: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Arr { objects })
    }

    // =========================================================================
    // Classes and modules
    // =========================================================================

    pub fn class(
        &self,
        name: Option<&str>,
        parent: Option<NodeIndex>,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        let variable = name.map(|name| self.id(name));
        let body = self.block(body);
        self.add(NodeKind::Class {
            variable,
            parent,
            body,
        })
    }

    pub fn specifier(&self, original: &str, alias: Option<&str>) -> NodeIndex {
        let original = self.id(original);
        let alias = alias.map(|alias| self.id(alias));
        self.add(NodeKind::ModuleSpecifier { original, alias })
    }

    /// `import name from 'source'`
    pub fn import_default(&self, name: &str, source: &str) -> NodeIndex {
        let default_binding = Some(self.id(name));
        let source = self.str(source);
        self.add(NodeKind::ImportDeclaration {
            default_binding,
            namespace: None,
            specifiers: None,
            source,
        })
    }

    /// `import { a, b as c } from 'source'`
    pub fn import_named(&self, specifiers: &[(&str, Option<&str>)], source: &str) -> NodeIndex {
        let specifiers = specifiers
            .iter()
            .map(|(original, alias)| self.specifier(original, *alias))
            .collect();
        let source = self.str(source);
        self.add(NodeKind::ImportDeclaration {
            default_binding: None,
            namespace: None,
            specifiers: Some(specifiers),
            source,
        })
    }

    /// `import * as name from 'source'`
    pub fn import_namespace(&self, name: &str, source: &str) -> NodeIndex {
        let namespace = Some(self.id(name));
        let source = self.str(source);
        self.add(NodeKind::ImportDeclaration {
            default_binding: None,
            namespace,
            specifiers: None,
            source,
        })
    }

    /// `export { a, b as c }`
    pub fn export_named(&self, specifiers: &[(&str, Option<&str>)]) -> NodeIndex {
        let specifiers = specifiers
            .iter()
            .map(|(original, alias)| self.specifier(original, *alias))
            .collect();
        self.add(NodeKind::Export {
            kind: ExportKind::Named,
            specifiers,
            declaration: None,
            source: None,
        })
    }

    pub fn export_default(&self, declaration: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Export {
            kind: ExportKind::Default,
            specifiers: Vec::new(),
            declaration: Some(declaration),
            source: None,
        })
    }

    /// `export * from 'source'`
    pub fn export_all(&self, source: &str) -> NodeIndex {
        let source = self.str(source);
        self.add(NodeKind::Export {
            kind: ExportKind::All,
            specifiers: Vec::new(),
            declaration: None,
            source: Some(source),
        })
    }

    /// `export name = value` or `export class Name`
    pub fn export_declaration(&self, declaration: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Export {
            kind: ExportKind::Declaration,
            specifiers: Vec::new(),
            declaration: Some(declaration),
            source: None,
        })
    }
}
