//! Classes.
//!
//! A class body is split into members (methods and the constructor) and
//! everything else. Without executable statements the class lowers to a
//! class expression. Otherwise it becomes an immediately-invoked function:
//!
//! ```text
//! A = (function(superClass) {
//!   class A extends superClass { ... }
//!   <statements, with `this` naming A>
//!   return A;
//! })(Parent);
//! ```
//!
//! Member positions are reserved as hoist slots when the class node is
//! built and filled as the body is lowered in source order, so methods and
//! statements allocate temporaries in the order they were written.

use super::analysis::RESERVED;
use super::{Compiler, CtorKind, FnCtx, FnKind, MethodInfo};
use crate::ir::{JsClass, JsFunction, JsKind, JsNode, JsParam, MethodKind};
use csz_ast::{AssignContext, NodeAccess, NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

/// One item of a class body.
enum ClassItem {
    /// `constructor: ->`, or `constructor: expr` for an external constructor.
    Constructor { item: NodeIndex, value: NodeIndex },
    Method {
        item: NodeIndex,
        key: NodeIndex,
        value: NodeIndex,
        is_static: bool,
    },
    /// A non-function `key: value`; assigned onto the class or its prototype.
    Property {
        item: NodeIndex,
        key: NodeIndex,
        value: NodeIndex,
        is_static: bool,
    },
    Statement(NodeIndex),
}

/// What the whole class needs, decided before lowering.
struct ClassPlan {
    name: Option<String>,
    derived: bool,
    items: Vec<ClassItem>,
    /// Instance methods bound in the constructor.
    bound: Vec<String>,
    executable: bool,
}

impl Compiler<'_> {
    pub(crate) fn lower_class(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        self.lower_class_named(idx, None)
    }

    /// Lower a class; `hint` names an anonymous class after its assignment target.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn lower_class_named(
        &mut self,
        idx: NodeIndex,
        hint: Option<String>,
    ) -> CompileResult<JsNode> {
        let NodeKind::Class {
            variable,
            parent,
            body,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["class"], idx));
        };
        let plan = self.plan_class(variable, parent, body, hint)?;

        let target = match variable {
            Some(variable) => {
                self.check_assignable(variable)?;
                if let Some(name) = self.identifier_name(variable) {
                    self.declare_assigned(variable, &name)?;
                }
                Some(self.lower_expr(variable)?)
            }
            None => None,
        };
        let value = self.lower_planned_class(plan, parent)?;
        Ok(match target {
            Some(target) => JsNode::assign(target, value),
            None => value,
        })
    }

    /// A class in declaration position (`export class A`): `class A {}`.
    pub(crate) fn lower_class_declaration(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::Class {
            variable,
            parent,
            body,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["class"], idx));
        };
        let plan = self.plan_class(variable, parent, body, None)?;
        let Some(name) = plan.name.clone().filter(|_| !plan.executable) else {
            return self.lower_class(idx);
        };
        let scope = self.scope();
        self.scopes.add(scope, &name, crate::scope::VarKind::Export, true);
        self.lower_planned_class(plan, parent)
    }

    fn lower_planned_class(
        &mut self,
        plan: ClassPlan,
        parent: Option<NodeIndex>,
    ) -> CompileResult<JsNode> {
        let superclass = match parent {
            Some(parent) => Some(self.lower_expr(parent)?),
            None => None,
        };
        if plan.executable {
            return self.lower_executable_class(plan, superclass);
        }
        let (class, statements) = self.lower_class_members(&plan, superclass)?;
        debug_assert!(statements.is_empty());
        Ok(JsNode::new(JsKind::Class(Box::new(class))))
    }

    // =========================================================================
    // Planning
    // =========================================================================

    fn plan_class(
        &mut self,
        variable: Option<NodeIndex>,
        parent: Option<NodeIndex>,
        body: NodeIndex,
        hint: Option<String>,
    ) -> CompileResult<ClassPlan> {
        let items = self.class_items(body)?;
        let mut executable = false;
        let mut bound = Vec::new();
        let mut constructors = 0;
        for item in &items {
            match item {
                ClassItem::Constructor { item, value } => {
                    constructors += 1;
                    if constructors > 1 {
                        return Err(self.error(messages::MULTIPLE_CONSTRUCTORS, &[], *item));
                    }
                    if !matches!(self.tree.kind(self.unwrap(*value)), Some(NodeKind::Code { .. }))
                        && self.should_cache(*value)
                    {
                        executable = true;
                    }
                }
                ClassItem::Method {
                    key,
                    value,
                    is_static: false,
                    ..
                } => {
                    if matches!(
                        self.tree.kind(self.unwrap(*value)),
                        Some(NodeKind::Code { bound: true, .. })
                    ) && let Some(name) = self.tree.identifier_text(*key)
                    {
                        bound.push(name.to_string());
                    }
                }
                ClassItem::Method { .. } => {}
                ClassItem::Property { .. } => executable = true,
                ClassItem::Statement(statement) => {
                    self.check_class_statement(*statement)?;
                    executable = true;
                }
            }
        }

        let derived = parent.is_some();
        let written = variable.and_then(|v| self.class_variable_name(v));
        let name = match written.or(hint) {
            Some(name) if RESERVED.contains(&name.as_str()) => Some(format!("_{name}")),
            Some(name) => Some(name),
            None if executable || (derived && !bound.is_empty()) => {
                Some(self.free_name("Class", false))
            }
            None => None,
        };
        if executable {
            tracing::debug!(name = ?name, "class with executable body");
        }
        Ok(ClassPlan {
            name,
            derived,
            items,
            bound,
            executable,
        })
    }

    /// Name a class takes from `A` or `a.b.A`.
    fn class_variable_name(&self, variable: NodeIndex) -> Option<String> {
        if let Some(name) = self.identifier_name(variable) {
            return Some(name);
        }
        let Some(NodeKind::Value { properties, .. }) = self.tree.kind(variable) else {
            return None;
        };
        match properties.last().and_then(|&p| self.tree.kind(p)) {
            Some(NodeKind::Access { name, .. }) => {
                self.tree.identifier_text(*name).map(str::to_string)
            }
            _ => None,
        }
    }

    /// Classify the body items, flattening object groups of members.
    fn class_items(&self, body: NodeIndex) -> CompileResult<Vec<ClassItem>> {
        let expressions = match self.tree.kind(body) {
            Some(NodeKind::Block { expressions }) => expressions.clone(),
            Some(_) => vec![body],
            None => Vec::new(),
        };
        let mut flat = Vec::with_capacity(expressions.len());
        for expression in expressions {
            match self.tree.kind(self.unwrap(expression)) {
                Some(NodeKind::Obj { properties, .. })
                    if properties.iter().all(|&p| self.is_member_assign(p)) =>
                {
                    flat.extend(properties.iter().copied());
                }
                _ => flat.push(expression),
            }
        }

        let mut items = Vec::with_capacity(flat.len());
        for item in flat {
            let Some(NodeKind::Assign {
                variable,
                value,
                context: AssignContext::Object,
            }) = self.tree.kind(item)
            else {
                items.push(ClassItem::Statement(item));
                continue;
            };
            let (variable, value) = (*variable, *value);
            let is_code = matches!(self.tree.kind(self.unwrap(value)), Some(NodeKind::Code { .. }));
            let (key, is_static) = match self.static_key(variable) {
                Some(key) => (key, true),
                None => (variable, false),
            };
            if !is_static && self.is_constructor_key(key) {
                items.push(ClassItem::Constructor { item, value });
            } else if is_code {
                items.push(ClassItem::Method {
                    item,
                    key,
                    value,
                    is_static,
                });
            } else {
                items.push(ClassItem::Property {
                    item,
                    key,
                    value,
                    is_static,
                });
            }
        }
        Ok(items)
    }

    fn is_member_assign(&self, idx: NodeIndex) -> bool {
        matches!(
            self.tree.kind(idx),
            Some(NodeKind::Assign {
                context: AssignContext::Object,
                ..
            })
        )
    }

    /// The name node of `@name` keys.
    fn static_key(&self, variable: NodeIndex) -> Option<NodeIndex> {
        let Some(NodeKind::Value { base, properties }) = self.tree.kind(variable) else {
            return None;
        };
        if properties.len() != 1 || !self.is_this(*base) {
            return None;
        }
        match self.tree.kind(properties[0]) {
            Some(NodeKind::Access { name, .. }) => Some(*name),
            _ => None,
        }
    }

    fn is_constructor_key(&self, key: NodeIndex) -> bool {
        match self.tree.kind(self.unwrap(key)) {
            Some(NodeKind::PropertyName { name } | NodeKind::Identifier { name }) => {
                name == "constructor"
            }
            Some(NodeKind::StringLiteral { value }) => value == "constructor",
            _ => false,
        }
    }

    /// Executable class-body statements may not jump, use `arguments` or
    /// hide a constructor.
    fn check_class_statement(&self, statement: NodeIndex) -> CompileResult<()> {
        if let Some(jump) = self.jumps(statement) {
            return Err(self.error(messages::CLASS_BODY_PURE_STATEMENT, &[], jump));
        }
        if self.uses_arguments(statement) {
            return Err(self.error(messages::CLASS_BODY_ARGUMENTS, &[], statement));
        }
        let mut nested = None;
        let mut is_constructor = |idx: NodeIndex, kind: &NodeKind| {
            let NodeKind::Assign {
                variable,
                value,
                context: AssignContext::Object,
            } = kind
            else {
                return false;
            };
            let hit = self.is_constructor_key(*variable)
                && matches!(self.tree.kind(*value), Some(NodeKind::Code { .. }));
            if hit {
                nested = Some(idx);
            }
            hit
        };
        if self.subtree_has(statement, &mut is_constructor)
            && let Some(at) = nested
        {
            return Err(self.error(messages::NESTED_CONSTRUCTOR, &[], at));
        }
        Ok(())
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Lower the class node and, in executable mode, the body statements.
    fn lower_class_members(
        &mut self,
        plan: &ClassPlan,
        superclass: Option<JsNode>,
    ) -> CompileResult<(JsClass, Vec<JsNode>)> {
        let name = plan.name.clone();
        let has_constructor = plan
            .items
            .iter()
            .any(|item| matches!(item, ClassItem::Constructor { .. }));
        let synthesize = !has_constructor && !plan.bound.is_empty();

        // Reserve every member position before lowering anything.
        let mut members = Vec::new();
        let ctor_slot = if has_constructor || synthesize {
            let (slot, placeholder) = self.hoist_target();
            members.push(placeholder);
            Some(slot)
        } else {
            None
        };
        let mut method_slots = Vec::new();
        for item in &plan.items {
            if matches!(item, ClassItem::Method { .. }) {
                let (slot, placeholder) = self.hoist_target();
                members.push(placeholder);
                method_slots.push(slot);
            }
        }

        let ctor_kind = if plan.derived {
            CtorKind::Derived
        } else {
            CtorKind::Base
        };
        let mut statements = Vec::new();
        let mut slots = method_slots.into_iter();
        for item in &plan.items {
            match *item {
                ClassItem::Constructor { item, value } => {
                    let comments = self.take_comments(item);
                    let ctor = self
                        .lower_constructor(value, ctor_kind, plan, &mut statements)?
                        .located(self.loc(item))
                        .with_comments(comments);
                    if let Some(slot) = ctor_slot {
                        self.fill_hoist(slot, ctor);
                    }
                }
                ClassItem::Method {
                    item,
                    key,
                    value,
                    is_static,
                } => {
                    let comments = self.take_comments(item);
                    let method = self
                        .lower_method(key, value, is_static, plan)?
                        .located(self.loc(item))
                        .with_comments(comments);
                    if let Some(slot) = slots.next() {
                        self.fill_hoist(slot, method);
                    }
                }
                ClassItem::Property {
                    item,
                    key,
                    value,
                    is_static,
                } => {
                    let assignment = self.lower_class_property(key, value, is_static, plan)?;
                    let comments = self.take_comments(item);
                    statements.push(
                        JsNode::expr_stmt(assignment.located(self.loc(item))).with_comments(comments),
                    );
                }
                ClassItem::Statement(statement) => {
                    statements.push(self.lower_stmt(statement)?);
                }
            }
        }
        if synthesize && let Some(slot) = ctor_slot {
            let ctor = self.default_constructor(ctor_kind, plan);
            self.fill_hoist(slot, ctor);
        }

        Ok((
            JsClass {
                name,
                superclass,
                members,
            },
            crate::ir::flatten_statements(statements),
        ))
    }

    /// `this.m = this.m.bind(this)` for each bound instance method.
    fn bound_method_bindings(plan: &ClassPlan) -> Vec<JsNode> {
        plan.bound
            .iter()
            .map(|name| {
                let method = JsNode::prop(JsNode::this(), name.clone());
                let bound = JsNode::method_call(method.clone(), "bind", vec![JsNode::this()]);
                JsNode::assign(method, bound)
            })
            .collect()
    }

    fn lower_constructor(
        &mut self,
        value: NodeIndex,
        kind: CtorKind,
        plan: &ClassPlan,
        statements: &mut Vec<JsNode>,
    ) -> CompileResult<JsNode> {
        let info = MethodInfo {
            key: Some("constructor".to_string()),
            ctor: Some(kind),
        };
        let code = self.unwrap(value);
        let func = if matches!(self.tree.kind(code), Some(NodeKind::Code { .. })) {
            self.lower_function(code, Some(info), Self::bound_method_bindings(plan))?
        } else {
            // External constructor: delegate to the given function.
            let mut external = self.lower_expr(value)?;
            if plan.executable && !external.is_simple() {
                let temp = self.free_variable("ctor", false);
                statements.push(JsNode::expr_stmt(JsNode::assign(JsNode::id(temp.clone()), external)));
                external = JsNode::id(temp);
            }
            let delegated = JsNode::method_call(
                external,
                "apply",
                vec![JsNode::this(), JsNode::id("arguments")],
            );
            let mut body: Vec<JsNode> = Self::bound_method_bindings(plan)
                .into_iter()
                .map(JsNode::expr_stmt)
                .collect();
            body.push(JsNode::ret(Some(delegated)));
            plain_function(Vec::new(), body)
        };
        Ok(method_node(JsNode::id("constructor"), false, false, MethodKind::Constructor, func))
    }

    /// Constructor synthesized to bind methods: calls through to the parent
    /// first when derived.
    fn default_constructor(&self, kind: CtorKind, plan: &ClassPlan) -> JsNode {
        let mut body = Vec::new();
        if kind == CtorKind::Derived {
            let spread = JsNode::new(JsKind::Spread(Box::new(JsNode::id("arguments"))));
            body.push(JsNode::expr_stmt(JsNode::call(
                JsNode::new(JsKind::Super),
                vec![spread],
            )));
        }
        body.extend(
            Self::bound_method_bindings(plan)
                .into_iter()
                .map(JsNode::expr_stmt),
        );
        method_node(
            JsNode::id("constructor"),
            false,
            false,
            MethodKind::Constructor,
            plain_function(Vec::new(), body),
        )
    }

    fn lower_method(
        &mut self,
        key: NodeIndex,
        value: NodeIndex,
        is_static: bool,
        plan: &ClassPlan,
    ) -> CompileResult<JsNode> {
        let (key_node, computed) = self.lower_property_key(key)?;
        let info = MethodInfo {
            key: if computed {
                None
            } else {
                key_node.as_identifier().map(str::to_string)
            },
            ctor: None,
        };
        let code = self.unwrap(value);
        let is_bound = !is_static
            && matches!(self.tree.kind(code), Some(NodeKind::Code { bound: true, .. }));
        let mut bindings = Vec::new();
        if is_bound
            && plan.derived
            && let Some(name) = &plan.name
        {
            let check = self.utility("boundMethodCheck");
            bindings.push(JsNode::call(check, vec![JsNode::this(), JsNode::id(name.clone())]));
        }
        let func = self.lower_function(code, Some(info), bindings)?;
        Ok(method_node(key_node, computed, is_static, MethodKind::Method, func))
    }

    /// `A.prototype.key = value` or `A.key = value`.
    fn lower_class_property(
        &mut self,
        key: NodeIndex,
        value: NodeIndex,
        is_static: bool,
        plan: &ClassPlan,
    ) -> CompileResult<JsNode> {
        let owner = JsNode::id(plan.name.clone().unwrap_or_default());
        let object = if is_static {
            owner
        } else {
            JsNode::prop(owner, "prototype")
        };
        let (key_node, computed) = self.lower_property_key(key)?;
        let target = match (&key_node.kind, computed) {
            (JsKind::Identifier(name), false) => JsNode::prop(object, name.clone()),
            _ => JsNode::elem(object, key_node),
        };
        let name = target_name(&target);
        let value = self.lower_assigned_value(value, name)?;
        Ok(JsNode::assign(target, value))
    }

    // =========================================================================
    // Executable bodies
    // =========================================================================

    fn lower_executable_class(
        &mut self,
        plan: ClassPlan,
        superclass: Option<JsNode>,
    ) -> CompileResult<JsNode> {
        let name = plan.name.clone().unwrap_or_default();
        let parent_scope = self.scope();
        let scope = self.scopes.push(parent_scope, false);
        let ctx = FnCtx::new(FnKind::ClassBody { name: name.clone() }, scope);
        let (params, body) = self.with_fn(ctx, |compiler| {
            compiler.scopes.add(scope, &name, crate::scope::VarKind::Param, true);
            let (param, inner_superclass) = if superclass.is_some() {
                let param = compiler.free_name("superClass", false);
                compiler.scopes.parameter(scope, &param);
                (Some(param.clone()), Some(JsNode::id(param)))
            } else {
                (None, None)
            };
            let (class, statements) = compiler.lower_class_members(&plan, inner_superclass)?;
            let mut body = compiler.scope_declarations(scope);
            body.push(JsNode::expr_stmt(JsNode::new(JsKind::Class(Box::new(class)))));
            body.extend(statements);
            body.push(JsNode::ret(Some(JsNode::id(name.clone()))));
            let params: Vec<JsParam> = param.into_iter().map(JsParam::new).collect();
            Ok((params, body))
        })?;
        let mut function = plain_function(params, body);
        function.spaced = true;
        let func = JsNode::new(JsKind::Function(Box::new(function)));
        Ok(JsNode::call(func, superclass.into_iter().collect()))
    }
}

fn plain_function(params: Vec<JsParam>, body: Vec<JsNode>) -> JsFunction {
    JsFunction {
        name: None,
        params,
        body,
        arrow: false,
        generator: false,
        is_async: false,
        spaced: false,
    }
}

fn method_node(
    key: JsNode,
    computed: bool,
    is_static: bool,
    kind: MethodKind,
    func: JsFunction,
) -> JsNode {
    JsNode::new(JsKind::Method {
        key: Box::new(key),
        computed,
        is_static,
        kind,
        func: Box::new(func),
    })
}

/// Property name of an assignment target, for naming anonymous classes.
fn target_name(target: &JsNode) -> Option<String> {
    match &target.kind {
        JsKind::Member { property, .. } => Some(property.clone()),
        _ => None,
    }
}
