//! Babel-compatible syntax tree output.
//!
//! Converts lowered IR into the JSON shape external formatters consume:
//! every node carries `type`, `start`/`end`, `range` and `loc` (one-based
//! lines), and nodes with comments carry a `comments` list whose entries are
//! flagged `leading` or `trailing`. The `File` root also lists every comment
//! once. Synthetic nodes take the location of their nearest located
//! ancestor.
//!
//! Field names and presence rules are a wire contract. A bare statement list
//! (lowered statements that have no node of their own) is the one shape
//! without a `type`: `{ "body": [...] }`.

use crate::ir::{
    JsClass, JsFunction, JsImportSpecifier, JsKind, JsNode, JsParam, JsProgram, MethodKind,
};
use crate::printer::precedence::is_logical;
use crate::printer::quote;
use csz_common::{Comment, SourceLocation};
use serde_json::{Map, Value, json};

/// Convert one lowered node.
pub fn node_to_tree(node: &JsNode) -> Value {
    BabelTree::default().node(node, None)
}

/// Convert a whole program into a `File` node.
pub fn program_to_tree(program: &JsProgram) -> Value {
    let mut tree = BabelTree::default();
    let loc = program.loc;
    let (body, directives) = if program.wrapped {
        (vec![tree.wrapper(&program.body, loc)], Vec::new())
    } else {
        tree.body_with_directives(&program.body, loc)
    };
    let is_module = program.body.iter().any(|s| {
        matches!(
            s.kind,
            JsKind::Import { .. }
                | JsKind::ExportNamed { .. }
                | JsKind::ExportDefault(_)
                | JsKind::ExportAll { .. }
                | JsKind::ExportDeclaration(_)
        )
    });

    let mut program_node = typed("Program", loc);
    program_node.insert(
        "sourceType".into(),
        json!(if is_module { "module" } else { "script" }),
    );
    program_node.insert("interpreter".into(), Value::Null);
    program_node.insert("body".into(), Value::Array(body));
    program_node.insert("directives".into(), Value::Array(directives));
    tree.attach_comments(&mut program_node, &program.comments, loc);

    let mut file = typed("File", loc);
    file.insert("program".into(), Value::Object(program_node));
    file.insert("comments".into(), Value::Array(tree.comments));
    Value::Object(file)
}

#[derive(Default)]
struct BabelTree {
    /// Every comment seen, in output order, for the `File` node.
    comments: Vec<Value>,
}

impl BabelTree {
    fn node(&mut self, node: &JsNode, inherited: Option<SourceLocation>) -> Value {
        let loc = node.loc.or(inherited);
        let mut map = crate::ensure_stack(|| self.node_kind(node, loc));
        if let Value::Object(object) = &mut map {
            self.attach_comments(object, &node.comments, loc);
        }
        map
    }

    fn opt(&mut self, node: Option<&JsNode>, loc: Option<SourceLocation>) -> Value {
        node.map_or(Value::Null, |n| self.node(n, loc))
    }

    fn list(&mut self, nodes: &[JsNode], loc: Option<SourceLocation>) -> Value {
        Value::Array(nodes.iter().map(|n| self.node(n, loc)).collect())
    }

    fn attach_comments(
        &mut self,
        object: &mut Map<String, Value>,
        comments: &[Comment],
        loc: Option<SourceLocation>,
    ) {
        if comments.is_empty() {
            return;
        }
        let values: Vec<Value> = comments.iter().map(|c| comment_value(c, loc)).collect();
        self.comments.extend(values.iter().cloned());
        object.insert("comments".into(), Value::Array(values));
    }

    // =========================================================================
    // Statement lists
    // =========================================================================

    /// Statement values with `Statements` wrappers flattened away.
    fn statements(&mut self, items: &[JsNode], loc: Option<SourceLocation>) -> Vec<Value> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match &item.kind {
                JsKind::Statements(inner) if !inner.is_empty() => {
                    let item_loc = item.loc.or(loc);
                    let mut nested = self.statements(inner, item_loc);
                    if let Some(Value::Object(first)) = nested.first_mut() {
                        let mut comments = first
                            .remove("comments")
                            .and_then(|v| match v {
                                Value::Array(items) => Some(items),
                                _ => None,
                            })
                            .unwrap_or_default();
                        if !item.comments.is_empty() {
                            let own: Vec<Value> =
                                item.comments.iter().map(|c| comment_value(c, item_loc)).collect();
                            self.comments.extend(own.iter().cloned());
                            comments.splice(0..0, own);
                        }
                        if !comments.is_empty() {
                            first.insert("comments".into(), Value::Array(comments));
                        }
                    }
                    out.extend(nested);
                }
                JsKind::Statements(_) | JsKind::Hoisted(_) if item.comments.is_empty() => {}
                _ => out.push(self.node(item, loc)),
            }
        }
        out
    }

    /// Statements of a body, with a leading directive prologue split off.
    fn body_with_directives(
        &mut self,
        items: &[JsNode],
        loc: Option<SourceLocation>,
    ) -> (Vec<Value>, Vec<Value>) {
        let split = items
            .iter()
            .take_while(|s| directive_text(s).is_some())
            .count();
        let directives = items[..split]
            .iter()
            .filter_map(|s| {
                let value = directive_text(s)?;
                let at = s.loc.or(loc);
                let mut literal = typed("DirectiveLiteral", at);
                literal.insert("value".into(), json!(value));
                literal.insert("extra".into(), json!({ "raw": quote(value), "rawValue": value }));
                let mut directive = typed("Directive", at);
                directive.insert("value".into(), Value::Object(literal));
                Some(Value::Object(directive))
            })
            .collect();
        (self.statements(&items[split..], loc), directives)
    }

    fn block(&mut self, items: &[JsNode], loc: Option<SourceLocation>) -> Value {
        let (body, directives) = self.body_with_directives(items, loc);
        let mut map = typed("BlockStatement", loc);
        map.insert("body".into(), Value::Array(body));
        map.insert("directives".into(), Value::Array(directives));
        Value::Object(map)
    }

    /// `(function() { ... }).call(this);`
    fn wrapper(&mut self, body: &[JsNode], loc: Option<SourceLocation>) -> Value {
        let mut func = typed("FunctionExpression", loc);
        func.insert("id".into(), Value::Null);
        func.insert("generator".into(), json!(false));
        func.insert("async".into(), json!(false));
        func.insert("params".into(), json!([]));
        func.insert("body".into(), self.block(body, loc));
        func.insert("extra".into(), json!({ "parenthesized": true }));

        let mut member = typed("MemberExpression", loc);
        member.insert("object".into(), Value::Object(func));
        member.insert("property".into(), identifier("call", loc));
        member.insert("computed".into(), json!(false));
        member.insert("optional".into(), json!(false));

        let mut call = typed("CallExpression", loc);
        call.insert("callee".into(), Value::Object(member));
        call.insert(
            "arguments".into(),
            json!([Value::Object(typed("ThisExpression", loc))]),
        );
        call.insert("optional".into(), json!(false));

        let mut statement = typed("ExpressionStatement", loc);
        statement.insert("expression".into(), Value::Object(call));
        Value::Object(statement)
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    fn node_kind(&mut self, node: &JsNode, loc: Option<SourceLocation>) -> Value {
        let (ty, fields): (&str, Vec<(&str, Value)>) = match &node.kind {
            JsKind::Number(raw) => return number_literal(raw, loc),
            JsKind::Str(value) => (
                "StringLiteral",
                vec![
                    ("value", json!(value)),
                    ("extra", json!({ "raw": quote(value), "rawValue": value })),
                ],
            ),
            JsKind::Bool(value) => ("BooleanLiteral", vec![("value", json!(value))]),
            JsKind::Null => ("NullLiteral", Vec::new()),
            JsKind::Undefined => (
                "UnaryExpression",
                vec![
                    ("operator", json!("void")),
                    ("prefix", json!(true)),
                    ("argument", number_literal("0", loc)),
                ],
            ),
            JsKind::Regex { pattern, flags } => (
                "RegExpLiteral",
                vec![("pattern", json!(pattern)), ("flags", json!(flags))],
            ),
            JsKind::Template {
                quasis,
                expressions,
            } => {
                let last = quasis.len().saturating_sub(1);
                let quasis: Vec<Value> = quasis
                    .iter()
                    .enumerate()
                    .map(|(i, text)| {
                        let mut element = typed("TemplateElement", loc);
                        element.insert("value".into(), json!({ "raw": text, "cooked": text }));
                        element.insert("tail".into(), json!(i == last));
                        Value::Object(element)
                    })
                    .collect();
                (
                    "TemplateLiteral",
                    vec![
                        ("quasis", Value::Array(quasis)),
                        ("expressions", self.list(expressions, loc)),
                    ],
                )
            }
            JsKind::Raw(code) => ("PassthroughLiteral", vec![("value", json!(code))]),
            JsKind::Identifier(name) => return identifier(name, loc),
            JsKind::This => ("ThisExpression", Vec::new()),
            JsKind::Super => ("Super", Vec::new()),
            JsKind::Member { object, property } => (
                "MemberExpression",
                vec![
                    ("object", self.node(object, loc)),
                    ("property", identifier(property, loc)),
                    ("computed", json!(false)),
                    ("optional", json!(false)),
                ],
            ),
            JsKind::Index { object, index } => (
                "MemberExpression",
                vec![
                    ("object", self.node(object, loc)),
                    ("property", self.node(index, loc)),
                    ("computed", json!(true)),
                    ("optional", json!(false)),
                ],
            ),
            JsKind::Call { callee, args } => (
                "CallExpression",
                vec![
                    ("callee", self.node(callee, loc)),
                    ("arguments", self.list(args, loc)),
                    ("optional", json!(false)),
                ],
            ),
            JsKind::New { callee, args } => (
                "NewExpression",
                vec![
                    ("callee", self.node(callee, loc)),
                    ("arguments", self.list(args, loc)),
                ],
            ),
            JsKind::Unary {
                operator,
                operand,
                prefix,
            } => (
                if operator == "++" || operator == "--" {
                    "UpdateExpression"
                } else {
                    "UnaryExpression"
                },
                vec![
                    ("operator", json!(operator)),
                    ("prefix", json!(prefix)),
                    ("argument", self.node(operand, loc)),
                ],
            ),
            JsKind::Binary {
                operator,
                left,
                right,
            } => (
                if is_logical(operator) {
                    "LogicalExpression"
                } else {
                    "BinaryExpression"
                },
                vec![
                    ("operator", json!(operator)),
                    ("left", self.node(left, loc)),
                    ("right", self.node(right, loc)),
                ],
            ),
            JsKind::Assign {
                operator,
                target,
                value,
            } => (
                "AssignmentExpression",
                vec![
                    ("operator", json!(operator)),
                    ("left", self.node(target, loc)),
                    ("right", self.node(value, loc)),
                ],
            ),
            JsKind::Conditional {
                test,
                consequent,
                alternate,
            } => (
                "ConditionalExpression",
                vec![
                    ("test", self.node(test, loc)),
                    ("consequent", self.node(consequent, loc)),
                    ("alternate", self.node(alternate, loc)),
                ],
            ),
            JsKind::Sequence(items) => (
                "SequenceExpression",
                vec![("expressions", self.list(items, loc))],
            ),
            JsKind::Array(elements) => {
                let elements: Vec<Value> = elements
                    .iter()
                    .map(|e| self.opt(e.as_ref(), loc))
                    .collect();
                ("ArrayExpression", vec![("elements", Value::Array(elements))])
            }
            JsKind::Object(properties) => (
                "ObjectExpression",
                vec![("properties", self.list(properties, loc))],
            ),
            JsKind::Property {
                key,
                value,
                computed,
                shorthand,
            } => (
                "ObjectProperty",
                vec![
                    ("key", self.node(key, loc)),
                    ("value", self.node(value, loc)),
                    ("computed", json!(computed)),
                    ("shorthand", json!(shorthand)),
                    ("method", json!(false)),
                ],
            ),
            JsKind::Spread(argument) => {
                ("SpreadElement", vec![("argument", self.node(argument, loc))])
            }
            JsKind::Function(func) => return self.function(func, loc),
            JsKind::Class(class) => return self.class("ClassExpression", class, loc),
            JsKind::Method {
                key,
                computed,
                is_static,
                kind,
                func,
            } => {
                let kind = match kind {
                    MethodKind::Constructor => "constructor",
                    MethodKind::Method => "method",
                };
                (
                    "ClassMethod",
                    vec![
                        ("static", json!(is_static)),
                        ("key", self.node(key, loc)),
                        ("computed", json!(computed)),
                        ("kind", json!(kind)),
                        ("id", Value::Null),
                        ("generator", json!(func.generator)),
                        ("async", json!(func.is_async)),
                        ("params", self.params(&func.params, loc)),
                        ("body", self.block(&func.body, loc)),
                    ],
                )
            }
            JsKind::Yield { argument, delegate } => (
                "YieldExpression",
                vec![
                    ("delegate", json!(delegate)),
                    ("argument", self.opt(argument.as_deref(), loc)),
                ],
            ),
            JsKind::Await(argument) => {
                ("AwaitExpression", vec![("argument", self.node(argument, loc))])
            }
            JsKind::Paren(inner) => {
                let mut value = self.node(inner, loc);
                if let Value::Object(map) = &mut value {
                    let extra = map
                        .entry("extra")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(extra) = extra {
                        extra.insert("parenthesized".into(), json!(true));
                    }
                }
                return value;
            }

            // Statements
            JsKind::ExprStmt(expr) => match &expr.kind {
                JsKind::Class(class) if class.name.is_some() => {
                    let mut value = self.class("ClassDeclaration", class, expr.loc.or(loc));
                    if let Value::Object(map) = &mut value {
                        self.attach_comments(map, &expr.comments, expr.loc.or(loc));
                    }
                    return value;
                }
                _ => (
                    "ExpressionStatement",
                    vec![("expression", self.node(expr, loc))],
                ),
            },
            JsKind::VarDecl(declarators) => return self.var_decl(declarators, loc),
            JsKind::Return(argument) => (
                "ReturnStatement",
                vec![("argument", self.opt(argument.as_deref(), loc))],
            ),
            JsKind::Throw(argument) => {
                ("ThrowStatement", vec![("argument", self.node(argument, loc))])
            }
            JsKind::Break(label) => ("BreakStatement", vec![("label", label_value(label, loc))]),
            JsKind::Continue(label) => {
                ("ContinueStatement", vec![("label", label_value(label, loc))])
            }
            JsKind::Debugger => ("DebuggerStatement", Vec::new()),
            JsKind::If {
                test,
                consequent,
                alternate,
            } => (
                "IfStatement",
                vec![
                    ("test", self.node(test, loc)),
                    ("consequent", self.block(consequent, loc)),
                    ("alternate", self.opt(alternate.as_deref(), loc)),
                ],
            ),
            JsKind::Block(body) => return self.block(body, loc),
            JsKind::While { test, body } => (
                "WhileStatement",
                vec![
                    ("test", self.node(test, loc)),
                    ("body", self.block(body, loc)),
                ],
            ),
            JsKind::For {
                init,
                test,
                update,
                body,
            } => (
                "ForStatement",
                vec![
                    ("init", self.opt(init.as_deref(), loc)),
                    ("test", self.opt(test.as_deref(), loc)),
                    ("update", self.opt(update.as_deref(), loc)),
                    ("body", self.block(body, loc)),
                ],
            ),
            JsKind::ForIn { left, right, body } => (
                "ForInStatement",
                vec![
                    ("left", self.node(left, loc)),
                    ("right", self.node(right, loc)),
                    ("body", self.block(body, loc)),
                ],
            ),
            JsKind::ForOf { left, right, body } => (
                "ForOfStatement",
                vec![
                    ("await", json!(false)),
                    ("left", self.node(left, loc)),
                    ("right", self.node(right, loc)),
                    ("body", self.block(body, loc)),
                ],
            ),
            JsKind::Switch {
                discriminant,
                cases,
            } => {
                let cases: Vec<Value> = cases
                    .iter()
                    .map(|case| {
                        let mut map = typed("SwitchCase", loc);
                        map.insert("test".into(), self.opt(case.test.as_ref(), loc));
                        map.insert(
                            "consequent".into(),
                            Value::Array(self.statements(&case.body, loc)),
                        );
                        Value::Object(map)
                    })
                    .collect();
                (
                    "SwitchStatement",
                    vec![
                        ("discriminant", self.node(discriminant, loc)),
                        ("cases", Value::Array(cases)),
                    ],
                )
            }
            JsKind::Try {
                block,
                param,
                handler,
                finalizer,
            } => {
                let handler = match handler {
                    Some(body) => {
                        let mut clause = typed("CatchClause", loc);
                        clause.insert("param".into(), self.opt(param.as_deref(), loc));
                        clause.insert("body".into(), self.block(body, loc));
                        Value::Object(clause)
                    }
                    None => Value::Null,
                };
                let finalizer = match finalizer {
                    Some(body) => self.block(body, loc),
                    None => Value::Null,
                };
                (
                    "TryStatement",
                    vec![
                        ("block", self.block(block, loc)),
                        ("handler", handler),
                        ("finalizer", finalizer),
                    ],
                )
            }
            JsKind::Import {
                default,
                namespace,
                specifiers,
                source,
            } => {
                let mut list = Vec::new();
                if let Some(name) = default {
                    let mut spec = typed("ImportDefaultSpecifier", loc);
                    spec.insert("local".into(), identifier(name, loc));
                    list.push(Value::Object(spec));
                }
                if let Some(name) = namespace {
                    let mut spec = typed("ImportNamespaceSpecifier", loc);
                    spec.insert("local".into(), identifier(name, loc));
                    list.push(Value::Object(spec));
                }
                for specifier in specifiers.iter().flatten() {
                    let mut spec = typed("ImportSpecifier", loc);
                    spec.insert("imported".into(), identifier(&specifier.imported, loc));
                    spec.insert("local".into(), identifier(&specifier.local, loc));
                    list.push(Value::Object(spec));
                }
                (
                    "ImportDeclaration",
                    vec![
                        ("specifiers", Value::Array(list)),
                        ("source", string_literal(source, loc)),
                    ],
                )
            }
            JsKind::ExportNamed { specifiers, source } => (
                "ExportNamedDeclaration",
                vec![
                    ("declaration", Value::Null),
                    ("specifiers", export_specifiers(specifiers, loc)),
                    (
                        "source",
                        source
                            .as_ref()
                            .map_or(Value::Null, |s| string_literal(s, loc)),
                    ),
                ],
            ),
            JsKind::ExportDefault(declaration) => (
                "ExportDefaultDeclaration",
                vec![("declaration", self.node(declaration, loc))],
            ),
            JsKind::ExportAll { source } => (
                "ExportAllDeclaration",
                vec![("source", string_literal(source, loc))],
            ),
            JsKind::ExportDeclaration(declaration) => {
                let declaration_loc = declaration.loc.or(loc);
                let mut value = match &declaration.kind {
                    JsKind::Class(class) => {
                        self.class("ClassDeclaration", class, declaration_loc)
                    }
                    _ => self.node(declaration, loc),
                };
                if let (JsKind::Class(_), Value::Object(map)) = (&declaration.kind, &mut value) {
                    self.attach_comments(map, &declaration.comments, declaration_loc);
                }
                (
                    "ExportNamedDeclaration",
                    vec![
                        ("declaration", value),
                        ("specifiers", json!([])),
                        ("source", Value::Null),
                    ],
                )
            }
            JsKind::Statements(items) => {
                let body = self.statements(items, loc);
                return json!({ "body": body });
            }
            JsKind::Hoisted(_) => return Value::Null,
        };
        let mut map = typed(ty, loc);
        for (key, value) in fields {
            map.insert(key.to_string(), value);
        }
        Value::Object(map)
    }

    fn function(&mut self, func: &JsFunction, loc: Option<SourceLocation>) -> Value {
        let ty = if func.arrow {
            "ArrowFunctionExpression"
        } else {
            "FunctionExpression"
        };
        let mut map = typed(ty, loc);
        map.insert(
            "id".into(),
            func.name
                .as_ref()
                .map_or(Value::Null, |name| identifier(name, loc)),
        );
        map.insert("generator".into(), json!(func.generator));
        map.insert("async".into(), json!(func.is_async));
        map.insert("params".into(), self.params(&func.params, loc));
        map.insert("body".into(), self.block(&func.body, loc));
        if func.arrow {
            map.insert("expression".into(), json!(false));
        }
        Value::Object(map)
    }

    fn params(&mut self, params: &[JsParam], loc: Option<SourceLocation>) -> Value {
        let params = params
            .iter()
            .map(|param| {
                let target = self.node(&param.target, loc);
                if param.rest {
                    let mut rest = typed("RestElement", loc);
                    rest.insert("argument".into(), target);
                    return Value::Object(rest);
                }
                match &param.default_value {
                    Some(default) => {
                        let mut pattern = typed("AssignmentPattern", loc);
                        pattern.insert("left".into(), target);
                        pattern.insert("right".into(), self.node(default, loc));
                        Value::Object(pattern)
                    }
                    None => target,
                }
            })
            .collect();
        Value::Array(params)
    }

    fn class(&mut self, ty: &str, class: &JsClass, loc: Option<SourceLocation>) -> Value {
        let members = self.statements(&class.members, loc);
        let mut body = typed("ClassBody", loc);
        body.insert("body".into(), Value::Array(members));

        let mut map = typed(ty, loc);
        map.insert(
            "id".into(),
            class
                .name
                .as_ref()
                .map_or(Value::Null, |name| identifier(name, loc)),
        );
        map.insert("superClass".into(), self.opt(class.superclass.as_ref(), loc));
        map.insert("body".into(), Value::Object(body));
        Value::Object(map)
    }

    fn var_decl(
        &mut self,
        declarators: &[(String, Option<JsNode>)],
        loc: Option<SourceLocation>,
    ) -> Value {
        let declarations: Vec<Value> = declarators
            .iter()
            .map(|(name, init)| {
                let mut declarator = typed("VariableDeclarator", loc);
                declarator.insert("id".into(), identifier(name, loc));
                declarator.insert("init".into(), self.opt(init.as_ref(), loc));
                Value::Object(declarator)
            })
            .collect();
        let mut map = typed("VariableDeclaration", loc);
        map.insert("declarations".into(), Value::Array(declarations));
        map.insert("kind".into(), json!("var"));
        Value::Object(map)
    }
}

// =============================================================================
// Leaf values
// =============================================================================

/// A node object holding `type` and the location fields.
fn typed(ty: &str, loc: Option<SourceLocation>) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), json!(ty));
    if let Some(loc) = loc {
        insert_location(&mut map, loc);
    }
    map
}

fn insert_location(map: &mut Map<String, Value>, loc: SourceLocation) {
    map.insert("start".into(), json!(loc.range.start));
    map.insert("end".into(), json!(loc.range.end));
    map.insert("range".into(), json!([loc.range.start, loc.range.end]));
    map.insert(
        "loc".into(),
        json!({
            "start": { "line": loc.start.line + 1, "column": loc.start.column },
            "end": { "line": loc.end.line + 1, "column": loc.end.column },
        }),
    );
}

fn identifier(name: &str, loc: Option<SourceLocation>) -> Value {
    let mut map = typed("Identifier", loc);
    map.insert("name".into(), json!(name));
    Value::Object(map)
}

fn string_literal(value: &str, loc: Option<SourceLocation>) -> Value {
    let mut map = typed("StringLiteral", loc);
    map.insert("value".into(), json!(value));
    map.insert("extra".into(), json!({ "raw": quote(value), "rawValue": value }));
    Value::Object(map)
}

fn label_value(label: &Option<String>, loc: Option<SourceLocation>) -> Value {
    label
        .as_deref()
        .map_or(Value::Null, |label| identifier(label, loc))
}

fn export_specifiers(specifiers: &[JsImportSpecifier], loc: Option<SourceLocation>) -> Value {
    let list = specifiers
        .iter()
        .map(|specifier| {
            let mut spec = typed("ExportSpecifier", loc);
            spec.insert("local".into(), identifier(&specifier.imported, loc));
            spec.insert("exported".into(), identifier(&specifier.local, loc));
            Value::Object(spec)
        })
        .collect();
    Value::Array(list)
}

/// `NumericLiteral`, or a negation of one for a negative literal.
fn number_literal(raw: &str, loc: Option<SourceLocation>) -> Value {
    if let Some(positive) = raw.strip_prefix('-') {
        let mut map = typed("UnaryExpression", loc);
        map.insert("operator".into(), json!("-"));
        map.insert("prefix".into(), json!(true));
        map.insert("argument".into(), number_literal(positive, loc));
        return Value::Object(map);
    }
    let value = numeric_value(raw);
    let mut map = typed("NumericLiteral", loc);
    map.insert("value".into(), value.clone());
    map.insert("extra".into(), json!({ "raw": raw, "rawValue": value }));
    Value::Object(map)
}

/// Numeric value of a literal as written; `null` when not finite.
fn numeric_value(raw: &str) -> Value {
    let text = raw.replace('_', "");
    let parse = |digits: &str, radix: u32| i64::from_str_radix(digits, radix).ok().map(|n| n as f64);
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        parse(hex, 16)
    } else if let Some(oct) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
        parse(oct, 8)
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        parse(bin, 2)
    } else {
        text.parse::<f64>().ok()
    };
    match parsed {
        Some(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
            json!(n as i64)
        }
        Some(n) => serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number),
        None => Value::Null,
    }
}

fn directive_text(statement: &JsNode) -> Option<&str> {
    match &statement.kind {
        JsKind::ExprStmt(expr) if statement.comments.is_empty() => match &expr.kind {
            JsKind::Str(value) => Some(value),
            _ => None,
        },
        _ => None,
    }
}

fn comment_value(comment: &Comment, fallback: Option<SourceLocation>) -> Value {
    let ty = if comment.block {
        "CommentBlock"
    } else {
        "CommentLine"
    };
    let mut map = Map::new();
    map.insert("type".into(), json!(ty));
    map.insert("value".into(), json!(comment.content));
    map.insert("leading".into(), json!(comment.is_leading()));
    map.insert("trailing".into(), json!(!comment.is_leading()));
    let has_location = comment.location.range.end > comment.location.range.start;
    if let Some(loc) = if has_location {
        Some(comment.location)
    } else {
        fallback
    } {
        insert_location(&mut map, loc);
    }
    Value::Object(map)
}

#[cfg(test)]
#[path = "babel_tests.rs"]
mod tests;
