//! Lowered IR (Intermediate Representation) for JavaScript output
//!
//! Lowering turns source nodes into a tree of `JsNode`s that only contains
//! primitive JavaScript constructs: every desugaring decision (soaks,
//! destructuring, closure wrapping, class bodies) is made once, here. Both
//! printers walk this IR, which keeps fragment output and Babel-tree output
//! semantically identical.
//!
//! # IR Structure
//!
//! `JsNode` pairs a `JsKind` with the source location of the node it was
//! lowered from and the comments that node carried. Synthetic nodes have no
//! location and inherit their parent's when printed as a Babel tree.

use csz_common::{Comment, SourceLocation};

/// A lowered JavaScript node.
#[derive(Clone, Debug, PartialEq)]
pub struct JsNode {
    pub kind: JsKind,
    pub loc: Option<SourceLocation>,
    pub comments: Vec<Comment>,
}

/// A function expression, arrow function or method body.
#[derive(Clone, Debug, PartialEq)]
pub struct JsFunction {
    pub name: Option<String>,
    pub params: Vec<JsParam>,
    pub body: Vec<JsNode>,
    pub arrow: bool,
    pub generator: bool,
    pub is_async: bool,
    /// Body statements are separated by blank lines.
    pub spaced: bool,
}

/// A function parameter: a binding target with optional default or rest marker.
#[derive(Clone, Debug, PartialEq)]
pub struct JsParam {
    pub target: JsNode,
    pub default_value: Option<JsNode>,
    pub rest: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Method,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JsClass {
    pub name: Option<String>,
    pub superclass: Option<JsNode>,
    /// `Method` nodes, or `Hoisted` slots that resolve to methods.
    pub members: Vec<JsNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JsCase {
    /// `None` for `default:`.
    pub test: Option<JsNode>,
    pub body: Vec<JsNode>,
}

/// `imported as local`. In an export list `imported` is the local binding
/// and `local` the exported name.
#[derive(Clone, Debug, PartialEq)]
pub struct JsImportSpecifier {
    pub imported: String,
    pub local: String,
}

/// A whole lowered program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsProgram {
    pub body: Vec<JsNode>,
    /// Banner comments printed before the first statement.
    pub comments: Vec<Comment>,
    pub loc: Option<SourceLocation>,
    /// `body` runs inside `(function() { ... }).call(this);`.
    pub wrapped: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum JsKind {
    // =========================================================================
    // Literals
    // =========================================================================
    /// Numeric literal, as written.
    Number(String),
    /// String literal holding the cooked value; quoted at print time.
    Str(String),
    Bool(bool),
    Null,
    /// `void 0`
    Undefined,
    Regex {
        pattern: String,
        flags: String,
    },
    /// Template literal: `quasis.len() == expressions.len() + 1`.
    Template {
        quasis: Vec<String>,
        expressions: Vec<JsNode>,
    },
    /// Embedded JavaScript, printed verbatim.
    Raw(String),

    // =========================================================================
    // Identifiers
    // =========================================================================
    Identifier(String),
    This,
    Super,

    // =========================================================================
    // Expressions
    // =========================================================================
    /// `object.property`
    Member {
        object: Box<JsNode>,
        property: String,
    },
    /// `object[index]`
    Index {
        object: Box<JsNode>,
        index: Box<JsNode>,
    },
    Call {
        callee: Box<JsNode>,
        args: Vec<JsNode>,
    },
    New {
        callee: Box<JsNode>,
        args: Vec<JsNode>,
    },
    Unary {
        operator: String,
        operand: Box<JsNode>,
        prefix: bool,
    },
    Binary {
        operator: String,
        left: Box<JsNode>,
        right: Box<JsNode>,
    },
    Assign {
        operator: String,
        target: Box<JsNode>,
        value: Box<JsNode>,
    },
    Conditional {
        test: Box<JsNode>,
        consequent: Box<JsNode>,
        alternate: Box<JsNode>,
    },
    /// Comma expression.
    Sequence(Vec<JsNode>),
    /// Array literal; `None` entries are elisions.
    Array(Vec<Option<JsNode>>),
    /// Object literal of `Property` and `Spread` nodes.
    Object(Vec<JsNode>),
    Property {
        key: Box<JsNode>,
        value: Box<JsNode>,
        computed: bool,
        shorthand: bool,
    },
    /// `...argument`
    Spread(Box<JsNode>),
    Function(Box<JsFunction>),
    Class(Box<JsClass>),
    Method {
        key: Box<JsNode>,
        computed: bool,
        is_static: bool,
        kind: MethodKind,
        func: Box<JsFunction>,
    },
    Yield {
        argument: Option<Box<JsNode>>,
        delegate: bool,
    },
    Await(Box<JsNode>),
    /// Grouping written in the source.
    Paren(Box<JsNode>),

    // =========================================================================
    // Statements
    // =========================================================================
    ExprStmt(Box<JsNode>),
    /// `var a, b = init;`
    VarDecl(Vec<(String, Option<JsNode>)>),
    Return(Option<Box<JsNode>>),
    Throw(Box<JsNode>),
    Break(Option<String>),
    Continue(Option<String>),
    Debugger,
    If {
        test: Box<JsNode>,
        consequent: Vec<JsNode>,
        /// Either a nested `If` (an `else if` chain) or a `Block`.
        alternate: Option<Box<JsNode>>,
    },
    Block(Vec<JsNode>),
    While {
        test: Box<JsNode>,
        body: Vec<JsNode>,
    },
    For {
        init: Option<Box<JsNode>>,
        test: Option<Box<JsNode>>,
        update: Option<Box<JsNode>>,
        body: Vec<JsNode>,
    },
    ForIn {
        left: Box<JsNode>,
        right: Box<JsNode>,
        body: Vec<JsNode>,
    },
    ForOf {
        left: Box<JsNode>,
        right: Box<JsNode>,
        body: Vec<JsNode>,
    },
    Switch {
        discriminant: Box<JsNode>,
        cases: Vec<JsCase>,
    },
    Try {
        block: Vec<JsNode>,
        param: Option<Box<JsNode>>,
        handler: Option<Vec<JsNode>>,
        finalizer: Option<Vec<JsNode>>,
    },
    Import {
        default: Option<String>,
        namespace: Option<String>,
        /// `None` when no brace list was written; `Some(vec![])` for `{}`.
        specifiers: Option<Vec<JsImportSpecifier>>,
        source: String,
    },
    ExportNamed {
        specifiers: Vec<JsImportSpecifier>,
        source: Option<String>,
    },
    ExportDefault(Box<JsNode>),
    ExportAll {
        source: String,
    },
    /// `export` in front of a declaration (`var`, class assignment).
    ExportDeclaration(Box<JsNode>),

    // =========================================================================
    // Structure
    // =========================================================================
    /// Statements with no node of their own: flattened into the enclosing body.
    Statements(Vec<JsNode>),
    /// Placeholder replaced by a hoist slot's content before printing.
    Hoisted(usize),
}

impl JsNode {
    pub fn new(kind: JsKind) -> Self {
        Self {
            kind,
            loc: None,
            comments: Vec::new(),
        }
    }

    pub fn at(kind: JsKind, loc: Option<SourceLocation>) -> Self {
        Self {
            kind,
            loc,
            comments: Vec::new(),
        }
    }

    /// Set the location if none is set yet.
    #[must_use]
    pub fn located(mut self, loc: Option<SourceLocation>) -> Self {
        if self.loc.is_none() {
            self.loc = loc;
        }
        self
    }

    #[must_use]
    pub fn with_comments(mut self, mut comments: Vec<Comment>) -> Self {
        if !comments.is_empty() {
            comments.append(&mut self.comments);
            self.comments = comments;
        }
        self
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn id(name: impl Into<String>) -> Self {
        Self::new(JsKind::Identifier(name.into()))
    }

    pub fn number(n: impl Into<String>) -> Self {
        Self::new(JsKind::Number(n.into()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(JsKind::Str(s.into()))
    }

    pub fn this() -> Self {
        Self::new(JsKind::This)
    }

    pub fn undefined() -> Self {
        Self::new(JsKind::Undefined)
    }

    pub fn null() -> Self {
        Self::new(JsKind::Null)
    }

    /// `object.property`
    pub fn prop(object: Self, property: impl Into<String>) -> Self {
        Self::new(JsKind::Member {
            object: Box::new(object),
            property: property.into(),
        })
    }

    /// `object[index]`
    pub fn elem(object: Self, index: Self) -> Self {
        Self::new(JsKind::Index {
            object: Box::new(object),
            index: Box::new(index),
        })
    }

    pub fn call(callee: Self, args: Vec<Self>) -> Self {
        Self::new(JsKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    /// `object.method(args)`
    pub fn method_call(object: Self, method: &str, args: Vec<Self>) -> Self {
        Self::call(Self::prop(object, method), args)
    }

    pub fn binary(left: Self, op: impl Into<String>, right: Self) -> Self {
        Self::new(JsKind::Binary {
            operator: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(op: impl Into<String>, operand: Self) -> Self {
        Self::new(JsKind::Unary {
            operator: op.into(),
            operand: Box::new(operand),
            prefix: true,
        })
    }

    pub fn not(operand: Self) -> Self {
        Self::unary("!", operand)
    }

    pub fn assign(target: Self, value: Self) -> Self {
        Self::assign_op("=", target, value)
    }

    pub fn assign_op(op: impl Into<String>, target: Self, value: Self) -> Self {
        Self::new(JsKind::Assign {
            operator: op.into(),
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn conditional(test: Self, consequent: Self, alternate: Self) -> Self {
        Self::new(JsKind::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    /// A comma expression; a single element is returned as is.
    pub fn sequence(mut items: Vec<Self>) -> Self {
        if items.len() == 1
            && let Some(only) = items.pop()
        {
            return only;
        }
        Self::new(JsKind::Sequence(items))
    }

    pub fn paren(self) -> Self {
        let loc = self.loc;
        Self::at(JsKind::Paren(Box::new(self)), loc)
    }

    pub fn expr_stmt(expr: Self) -> Self {
        let loc = expr.loc;
        Self::at(JsKind::ExprStmt(Box::new(expr)), loc)
    }

    pub fn ret(expr: Option<Self>) -> Self {
        let loc = expr.as_ref().and_then(|e| e.loc);
        Self::at(JsKind::Return(expr.map(Box::new)), loc)
    }

    pub fn var_decl(name: impl Into<String>, init: Option<Self>) -> Self {
        Self::new(JsKind::VarDecl(vec![(name.into(), init)]))
    }

    pub fn function(params: Vec<JsParam>, body: Vec<Self>) -> Self {
        Self::new(JsKind::Function(Box::new(JsFunction {
            name: None,
            params,
            body,
            arrow: false,
            generator: false,
            is_async: false,
            spaced: false,
        })))
    }

    pub fn if_stmt(test: Self, consequent: Vec<Self>, alternate: Option<Vec<Self>>) -> Self {
        Self::new(JsKind::If {
            test: Box::new(test),
            consequent,
            alternate: alternate.map(|body| Box::new(Self::new(JsKind::Block(body)))),
        })
    }

    pub fn statements(items: Vec<Self>) -> Self {
        Self::new(JsKind::Statements(items))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether this node is a statement (as opposed to an expression).
    pub fn is_statement(&self) -> bool {
        matches!(
            self.kind,
            JsKind::ExprStmt(_)
                | JsKind::VarDecl(_)
                | JsKind::Return(_)
                | JsKind::Throw(_)
                | JsKind::Break(_)
                | JsKind::Continue(_)
                | JsKind::Debugger
                | JsKind::If { .. }
                | JsKind::Block(_)
                | JsKind::While { .. }
                | JsKind::For { .. }
                | JsKind::ForIn { .. }
                | JsKind::ForOf { .. }
                | JsKind::Switch { .. }
                | JsKind::Try { .. }
                | JsKind::Import { .. }
                | JsKind::ExportNamed { .. }
                | JsKind::ExportDefault(_)
                | JsKind::ExportAll { .. }
                | JsKind::ExportDeclaration(_)
                | JsKind::Statements(_)
        )
    }

    /// Identifier name, if this is a bare identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            JsKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Whether evaluating this node twice is free of side effects and cheap.
    pub fn is_simple(&self) -> bool {
        match &self.kind {
            JsKind::Number(_)
            | JsKind::Str(_)
            | JsKind::Bool(_)
            | JsKind::Null
            | JsKind::Undefined
            | JsKind::Identifier(_)
            | JsKind::This => true,
            JsKind::Paren(inner) => inner.is_simple(),
            _ => false,
        }
    }

    /// Whether the statement unconditionally transfers control.
    pub fn is_jump(&self) -> bool {
        match &self.kind {
            JsKind::Return(_) | JsKind::Throw(_) | JsKind::Break(_) | JsKind::Continue(_) => true,
            JsKind::Statements(items) | JsKind::Block(items) => {
                items.last().is_some_and(JsNode::is_jump)
            }
            _ => false,
        }
    }
}

impl JsParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            target: JsNode::id(name),
            default_value: None,
            rest: false,
        }
    }

    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            target: JsNode::id(name),
            default_value: None,
            rest: true,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: JsNode) -> Self {
        self.default_value = Some(default);
        self
    }
}

/// Flatten nested `Statements` wrappers into one statement list.
pub fn flatten_statements(items: Vec<JsNode>) -> Vec<JsNode> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item.kind {
            JsKind::Statements(inner) if item.comments.is_empty() => {
                out.extend(flatten_statements(inner));
            }
            _ => out.push(item),
        }
    }
    out
}

#[cfg(test)]
#[path = "ir_tests.rs"]
mod tests;
