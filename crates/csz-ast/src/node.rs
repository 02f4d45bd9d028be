//! Node definitions.
//!
//! `NodeKind` is a closed tagged union over every node family the code
//! generator understands. Child references are `NodeIndex` values into the
//! owning arena; optional children are `Option<NodeIndex>`.

use csz_common::{Comment, SourceLocation};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of a node in its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The keyword of a pure-statement literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JumpKeyword {
    Break,
    Continue,
    Debugger,
}

impl JumpKeyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            JumpKeyword::Break => "break",
            JumpKeyword::Continue => "continue",
            JumpKeyword::Debugger => "debugger",
        }
    }
}

/// How an `Assign` node binds its value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "operator")]
pub enum AssignContext {
    /// `a = b`
    #[default]
    Plain,
    /// `key: value` inside an object literal, class body or object pattern.
    Object,
    /// `a += b`, `a ||= b`, `a ?= b`, `a //= b`, ...; holds the operator with `=`.
    Compound(String),
}

/// One `when` clause of a `switch`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub conditions: Vec<NodeIndex>,
    pub body: NodeIndex,
}

/// The export flavours of a module declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportKind {
    Named,
    Default,
    All,
    Declaration,
}

/// Every node family of the tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    // =========================================================================
    // Literals
    // =========================================================================
    /// Numeric literal, kept as written: `42`, `0x1F`, `1e3`.
    NumberLiteral { value: String },
    /// String literal holding the cooked (unescaped) value.
    StringLiteral { value: String },
    BooleanLiteral { value: bool },
    NullLiteral,
    UndefinedLiteral,
    RegexLiteral { pattern: String, flags: String },
    ThisLiteral,
    InfinityLiteral,
    NaNLiteral,
    /// Embedded raw JavaScript, emitted verbatim.
    PassthroughLiteral { code: String },
    /// `break`, `continue` (optionally labelled) and `debugger`.
    StatementLiteral {
        keyword: JumpKeyword,
        label: Option<String>,
    },
    Identifier { name: String },
    /// Property name after a dot or as an object key.
    PropertyName { name: String },
    /// `[expr]` object key.
    ComputedPropertyName { expression: NodeIndex },
    /// Interpolated string: string literal parts and expressions in source order.
    Template { parts: Vec<NodeIndex> },

    // =========================================================================
    // Values and property access
    // =========================================================================
    /// A base with a chain of accesses, indexes, slices and calls.
    Value {
        base: NodeIndex,
        properties: Vec<NodeIndex>,
    },
    /// `.name`, `?.name`, `::name` (prototype shorthand).
    Access {
        name: NodeIndex,
        soak: bool,
        shorthand: bool,
    },
    /// `[index]`, `?[index]`.
    Index { index: NodeIndex, soak: bool },
    /// `[from..to]` inside a property chain.
    Slice { range: NodeIndex },

    // =========================================================================
    // Calls
    // =========================================================================
    Call {
        callee: NodeIndex,
        args: Vec<NodeIndex>,
        soak: bool,
        is_new: bool,
    },
    /// `super(...)` in a constructor, or a bare `super` call in a method.
    SuperCall { args: Vec<NodeIndex> },
    /// `super.name` / `super[expr]`.
    Super { accessor: Option<NodeIndex> },

    // =========================================================================
    // Assignment and operators
    // =========================================================================
    Assign {
        variable: NodeIndex,
        value: NodeIndex,
        #[serde(default)]
        context: AssignContext,
    },
    /// Unary (`second` absent) or binary operator. `flip` marks postfix `++`/`--`.
    Op {
        operator: String,
        first: NodeIndex,
        second: Option<NodeIndex>,
        #[serde(default)]
        flip: bool,
    },
    /// `a in b` array membership; `negated` for `not in`.
    In {
        object: NodeIndex,
        array: NodeIndex,
        #[serde(default)]
        negated: bool,
    },
    /// `a?`; `only_not_undefined` selects the default-value comparison.
    Existence {
        expression: NodeIndex,
        #[serde(default)]
        only_not_undefined: bool,
        #[serde(default)]
        negated: bool,
    },
    Parens { body: NodeIndex },

    // =========================================================================
    // Functions
    // =========================================================================
    /// `(params) -> body` or bound `(params) => body`.
    Code {
        params: Vec<NodeIndex>,
        body: NodeIndex,
        #[serde(default)]
        bound: bool,
    },
    /// A parameter: identifier, `@name`, or an array/object pattern.
    Param {
        name: NodeIndex,
        value: Option<NodeIndex>,
        #[serde(default)]
        splat: bool,
    },
    Splat { name: NodeIndex },
    /// Bare `...` in a pattern or parameter list.
    Expansion,
    /// Skipped slot in an array literal or pattern.
    Elision,

    // =========================================================================
    // Statements
    // =========================================================================
    Block { expressions: Vec<NodeIndex> },
    Root { body: NodeIndex },
    Return { expression: Option<NodeIndex> },
    Throw { expression: NodeIndex },
    If {
        condition: NodeIndex,
        body: NodeIndex,
        else_body: Option<NodeIndex>,
        /// `unless`
        #[serde(default)]
        negated: bool,
    },
    While {
        condition: NodeIndex,
        guard: Option<NodeIndex>,
        body: NodeIndex,
        /// `until`
        #[serde(default)]
        negated: bool,
    },
    For {
        body: NodeIndex,
        source: NodeIndex,
        name: Option<NodeIndex>,
        index: Option<NodeIndex>,
        guard: Option<NodeIndex>,
        step: Option<NodeIndex>,
        #[serde(default)]
        own: bool,
        /// `for k, v of obj`; `index` holds the key and `name` the value.
        #[serde(default)]
        object: bool,
        /// `for x from iterable`
        #[serde(default)]
        from: bool,
    },
    Switch {
        subject: Option<NodeIndex>,
        cases: Vec<SwitchCase>,
        otherwise: Option<NodeIndex>,
    },
    Try {
        attempt: NodeIndex,
        error_variable: Option<NodeIndex>,
        recovery: Option<NodeIndex>,
        ensure: Option<NodeIndex>,
    },

    // =========================================================================
    // Collections
    // =========================================================================
    Range {
        from: Option<NodeIndex>,
        to: Option<NodeIndex>,
        #[serde(default)]
        exclusive: bool,
    },
    Obj {
        properties: Vec<NodeIndex>,
        #[serde(default)]
        generated: bool,
    },
    Arr { objects: Vec<NodeIndex> },

    // =========================================================================
    // Classes
    // =========================================================================
    Class {
        variable: Option<NodeIndex>,
        parent: Option<NodeIndex>,
        body: NodeIndex,
    },

    // =========================================================================
    // Modules
    // =========================================================================
    ImportDeclaration {
        default_binding: Option<NodeIndex>,
        namespace: Option<NodeIndex>,
        specifiers: Option<Vec<NodeIndex>>,
        source: NodeIndex,
    },
    /// `name` or `name as alias` inside an import/export list.
    ModuleSpecifier {
        original: NodeIndex,
        alias: Option<NodeIndex>,
    },
    Export {
        kind: ExportKind,
        /// Specifiers for `Named`; unused otherwise.
        #[serde(default)]
        specifiers: Vec<NodeIndex>,
        /// The exported expression/declaration for `Default` and `Declaration`.
        declaration: Option<NodeIndex>,
        source: Option<NodeIndex>,
    },
}

impl NodeKind {
    /// Declared children, in evaluation order, for generic tree walks.
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out = SmallVec::new();
        let opt = |out: &mut SmallVec<[NodeIndex; 4]>, idx: &Option<NodeIndex>| {
            if let Some(idx) = idx {
                out.push(*idx);
            }
        };
        match self {
            NodeKind::NumberLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::UndefinedLiteral
            | NodeKind::RegexLiteral { .. }
            | NodeKind::ThisLiteral
            | NodeKind::InfinityLiteral
            | NodeKind::NaNLiteral
            | NodeKind::PassthroughLiteral { .. }
            | NodeKind::StatementLiteral { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::PropertyName { .. }
            | NodeKind::Expansion
            | NodeKind::Elision => {}
            NodeKind::ComputedPropertyName { expression } => out.push(*expression),
            NodeKind::Template { parts } => out.extend(parts.iter().copied()),
            NodeKind::Value { base, properties } => {
                out.push(*base);
                out.extend(properties.iter().copied());
            }
            NodeKind::Access { name, .. } => out.push(*name),
            NodeKind::Index { index, .. } => out.push(*index),
            NodeKind::Slice { range } => out.push(*range),
            NodeKind::Call { callee, args, .. } => {
                out.push(*callee);
                out.extend(args.iter().copied());
            }
            NodeKind::SuperCall { args } => out.extend(args.iter().copied()),
            NodeKind::Super { accessor } => opt(&mut out, accessor),
            NodeKind::Assign {
                variable, value, ..
            } => {
                out.push(*variable);
                out.push(*value);
            }
            NodeKind::Op { first, second, .. } => {
                out.push(*first);
                opt(&mut out, second);
            }
            NodeKind::In { object, array, .. } => {
                out.push(*object);
                out.push(*array);
            }
            NodeKind::Existence { expression, .. } => out.push(*expression),
            NodeKind::Parens { body } => out.push(*body),
            NodeKind::Code { params, body, .. } => {
                out.extend(params.iter().copied());
                out.push(*body);
            }
            NodeKind::Param { name, value, .. } => {
                out.push(*name);
                opt(&mut out, value);
            }
            NodeKind::Splat { name } => out.push(*name),
            NodeKind::Block { expressions } => out.extend(expressions.iter().copied()),
            NodeKind::Root { body } => out.push(*body),
            NodeKind::Return { expression } => opt(&mut out, expression),
            NodeKind::Throw { expression } => out.push(*expression),
            NodeKind::If {
                condition,
                body,
                else_body,
                ..
            } => {
                out.push(*condition);
                out.push(*body);
                opt(&mut out, else_body);
            }
            NodeKind::While {
                condition,
                guard,
                body,
                ..
            } => {
                out.push(*condition);
                opt(&mut out, guard);
                out.push(*body);
            }
            NodeKind::For {
                body,
                source,
                name,
                index,
                guard,
                step,
                ..
            } => {
                out.push(*body);
                out.push(*source);
                opt(&mut out, name);
                opt(&mut out, index);
                opt(&mut out, guard);
                opt(&mut out, step);
            }
            NodeKind::Switch {
                subject,
                cases,
                otherwise,
            } => {
                opt(&mut out, subject);
                for case in cases {
                    out.extend(case.conditions.iter().copied());
                    out.push(case.body);
                }
                opt(&mut out, otherwise);
            }
            NodeKind::Try {
                attempt,
                error_variable,
                recovery,
                ensure,
            } => {
                out.push(*attempt);
                opt(&mut out, error_variable);
                opt(&mut out, recovery);
                opt(&mut out, ensure);
            }
            NodeKind::Range { from, to, .. } => {
                opt(&mut out, from);
                opt(&mut out, to);
            }
            NodeKind::Obj { properties, .. } => out.extend(properties.iter().copied()),
            NodeKind::Arr { objects } => out.extend(objects.iter().copied()),
            NodeKind::Class {
                variable,
                parent,
                body,
            } => {
                opt(&mut out, variable);
                opt(&mut out, parent);
                out.push(*body);
            }
            NodeKind::ImportDeclaration {
                default_binding,
                namespace,
                specifiers,
                source,
            } => {
                opt(&mut out, default_binding);
                opt(&mut out, namespace);
                if let Some(specifiers) = specifiers {
                    out.extend(specifiers.iter().copied());
                }
                out.push(*source);
            }
            NodeKind::ModuleSpecifier { original, alias } => {
                out.push(*original);
                opt(&mut out, alias);
            }
            NodeKind::Export {
                specifiers,
                declaration,
                source,
                ..
            } => {
                out.extend(specifiers.iter().copied());
                opt(&mut out, declaration);
                opt(&mut out, source);
            }
        }
        out
    }

    /// Short, stable name of the variant (used in traces and errors).
    pub const fn name(&self) -> &'static str {
        match self {
            NodeKind::NumberLiteral { .. } => "NumberLiteral",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::BooleanLiteral { .. } => "BooleanLiteral",
            NodeKind::NullLiteral => "NullLiteral",
            NodeKind::UndefinedLiteral => "UndefinedLiteral",
            NodeKind::RegexLiteral { .. } => "RegexLiteral",
            NodeKind::ThisLiteral => "ThisLiteral",
            NodeKind::InfinityLiteral => "InfinityLiteral",
            NodeKind::NaNLiteral => "NaNLiteral",
            NodeKind::PassthroughLiteral { .. } => "PassthroughLiteral",
            NodeKind::StatementLiteral { .. } => "StatementLiteral",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::PropertyName { .. } => "PropertyName",
            NodeKind::ComputedPropertyName { .. } => "ComputedPropertyName",
            NodeKind::Template { .. } => "Template",
            NodeKind::Value { .. } => "Value",
            NodeKind::Access { .. } => "Access",
            NodeKind::Index { .. } => "Index",
            NodeKind::Slice { .. } => "Slice",
            NodeKind::Call { .. } => "Call",
            NodeKind::SuperCall { .. } => "SuperCall",
            NodeKind::Super { .. } => "Super",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::Op { .. } => "Op",
            NodeKind::In { .. } => "In",
            NodeKind::Existence { .. } => "Existence",
            NodeKind::Parens { .. } => "Parens",
            NodeKind::Code { .. } => "Code",
            NodeKind::Param { .. } => "Param",
            NodeKind::Splat { .. } => "Splat",
            NodeKind::Expansion => "Expansion",
            NodeKind::Elision => "Elision",
            NodeKind::Block { .. } => "Block",
            NodeKind::Root { .. } => "Root",
            NodeKind::Return { .. } => "Return",
            NodeKind::Throw { .. } => "Throw",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::For { .. } => "For",
            NodeKind::Switch { .. } => "Switch",
            NodeKind::Try { .. } => "Try",
            NodeKind::Range { .. } => "Range",
            NodeKind::Obj { .. } => "Obj",
            NodeKind::Arr { .. } => "Arr",
            NodeKind::Class { .. } => "Class",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::ModuleSpecifier { .. } => "ModuleSpecifier",
            NodeKind::Export { .. } => "Export",
        }
    }

    /// Whether this node starts a new function scope.
    pub const fn is_function_boundary(&self) -> bool {
        matches!(self, NodeKind::Code { .. })
    }
}

/// A node: its kind, location and attached comments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            location: None,
            comments: Vec::new(),
        }
    }

    pub fn with_location(kind: NodeKind, location: Option<SourceLocation>) -> Self {
        Self {
            kind,
            location,
            comments: Vec::new(),
        }
    }
}
