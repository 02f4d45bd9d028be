//! Destructuring assignment.
//!
//! Patterns are lowered to a comma-separated list of plain assignments read
//! from one cached reference:
//!
//! ```text
//! [a, b...] = f()  =>  ref = f(), a = ref[0], b = 2 <= ref.length ? slice.call(ref, 1) : []
//! {x, y: [z]} = o  =>  x = o.x, z = o.y[0]
//! ```
//!
//! Nested patterns recurse with the element access as their value. The
//! whole expression evaluates to the assigned value unless it is used as a
//! statement or is itself a subpattern.

use super::Compiler;
use crate::ir::{JsKind, JsNode};
use crate::scope::VarKind;
use csz_ast::{AssignContext, NodeAccess, NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

/// Index expression for elements after a splat or expansion.
enum Expanded {
    /// `ivar++`
    Counter(String),
    /// `ref.length - 1`
    Last,
}

/// One pattern element split into its parts.
struct Element {
    target: NodeIndex,
    key: Key,
    default: Option<NodeIndex>,
}

enum Key {
    Position(usize),
    Name(String),
    Expression(NodeIndex),
}

/// Flags shared by one destructuring and its subpatterns.
#[derive(Clone, Copy)]
pub(crate) struct PatternMode {
    pub top: bool,
    pub subpattern: bool,
    /// Declare every bound name in the current scope, even when an outer
    /// scope already has it (function parameters).
    pub always_declare: bool,
}

impl Compiler<'_> {
    /// `pattern = value` where the pattern is an array or object literal.
    pub(crate) fn lower_destructuring(
        &mut self,
        pattern: NodeIndex,
        value: NodeIndex,
        top: bool,
        always_declare: bool,
    ) -> CompileResult<JsNode> {
        let value_name = self.identifier_name(value);
        let value_ir = self.lower_expr(value)?;
        let mode = PatternMode {
            top,
            subpattern: false,
            always_declare,
        };
        self.destructure(pattern, value_ir, value_name, mode)
    }

    pub(crate) fn destructure(
        &mut self,
        pattern: NodeIndex,
        value: JsNode,
        value_name: Option<String>,
        mode: PatternMode,
    ) -> CompileResult<JsNode> {
        let (objects, is_object) = match self.kind(pattern)? {
            NodeKind::Arr { objects } => (objects, false),
            NodeKind::Obj { properties, .. } => (properties, true),
            other => return Err(self.error(messages::UNEXPECTED_NODE, &[other.name()], pattern)),
        };
        if objects.is_empty() {
            return Ok(value);
        }
        if objects.len() == 1
            && matches!(self.tree.kind(objects[0]), Some(NodeKind::Expansion))
        {
            return Err(self.error(messages::DESTRUCTURING_NO_TARGET, &[], objects[0]));
        }
        if objects.len() == 1
            && (mode.top || mode.subpattern)
            && !matches!(
                self.tree.kind(objects[0]),
                Some(NodeKind::Splat { .. } | NodeKind::Elision)
            )
        {
            let element = self.pattern_element(objects[0], 0, is_object)?;
            let read = self.element_access(value, &element.key, None)?;
            return self.assign_element(&element, read, mode);
        }

        let mut assigns = Vec::new();
        let (reference, reference_name) = match value_name.filter(|n| !self.assigns(pattern, n)) {
            Some(name) => (value, name),
            None => {
                let temp = self.free_variable("ref", false);
                assigns.push(JsNode::assign(JsNode::id(temp.clone()), value));
                (JsNode::id(temp.clone()), temp)
            }
        };
        let read_ref = || JsNode::id(reference_name.clone());
        let length = || JsNode::prop(JsNode::id(reference_name.clone()), "length");

        let count = objects.len();
        let mut expanded: Option<Expanded> = None;
        for (i, &object) in objects.iter().enumerate() {
            let rest = count - i - 1;
            match self.kind(object)? {
                NodeKind::Splat { .. } | NodeKind::Expansion if expanded.is_some() => {
                    return Err(self.error(messages::MULTIPLE_SPLATS_IN_PATTERN, &[], object));
                }
                NodeKind::Splat { .. } if is_object => {
                    return Err(self.error(messages::OBJECT_PATTERN_REST, &[], object));
                }
                NodeKind::Splat { name } => {
                    let slice = self.utility("slice");
                    let test = JsNode::binary(JsNode::number(count.to_string()), "<=", length());
                    let mut args = vec![read_ref(), JsNode::number(i.to_string())];
                    let alternate = if rest == 0 {
                        JsNode::new(JsKind::Array(Vec::new()))
                    } else {
                        let ivar = self.free_variable("i", true);
                        args.push(JsNode::assign(
                            JsNode::id(ivar.clone()),
                            JsNode::binary(length(), "-", JsNode::number(rest.to_string())),
                        ));
                        let fallback = JsNode::sequence(vec![
                            JsNode::assign(JsNode::id(ivar.clone()), JsNode::number(i.to_string())),
                            JsNode::new(JsKind::Array(Vec::new())),
                        ]);
                        expanded = Some(Expanded::Counter(ivar));
                        fallback
                    };
                    let sliced = JsNode::conditional(
                        test,
                        JsNode::method_call(slice, "call", args),
                        alternate,
                    );
                    let element = Element {
                        target: name,
                        key: Key::Position(i),
                        default: None,
                    };
                    self.push_assignment(&mut assigns, &element, sliced, mode)?;
                }
                NodeKind::Expansion => {
                    if is_object {
                        return Err(self.error(messages::OBJECT_PATTERN_REST, &[], object));
                    }
                    match rest {
                        0 | 1 => expanded = Some(Expanded::Last),
                        _ => {
                            let ivar = self.free_variable("i", true);
                            assigns.push(JsNode::assign(
                                JsNode::id(ivar.clone()),
                                JsNode::binary(length(), "-", JsNode::number(rest.to_string())),
                            ));
                            expanded = Some(Expanded::Counter(ivar));
                        }
                    }
                }
                NodeKind::Elision => {}
                _ => {
                    let element = self.pattern_element(object, i, is_object)?;
                    let read = self.element_access(reference.clone(), &element.key, expanded.as_ref())?;
                    self.push_assignment(&mut assigns, &element, read, mode)?;
                }
            }
        }
        if !(mode.top || mode.subpattern) {
            assigns.push(read_ref());
        }
        Ok(JsNode::sequence(assigns))
    }

    fn push_assignment(
        &mut self,
        assigns: &mut Vec<JsNode>,
        element: &Element,
        read: JsNode,
        mode: PatternMode,
    ) -> CompileResult<()> {
        let node = self.assign_element(element, read, mode)?;
        match node.kind {
            JsKind::Sequence(items) => assigns.extend(items),
            _ => assigns.push(node),
        }
        Ok(())
    }

    /// Split a pattern element into target, key and default value.
    fn pattern_element(
        &mut self,
        object: NodeIndex,
        position: usize,
        is_object: bool,
    ) -> CompileResult<Element> {
        let kind = self.kind(object)?;
        if let NodeKind::Assign {
            variable,
            value,
            context: AssignContext::Object,
        } = kind
        {
            let key = self.object_key(variable)?;
            let (target, default) = self.split_default(value);
            return Ok(Element {
                target,
                key,
                default,
            });
        }
        let (target, default) = self.split_default(object);
        let key = if !is_object {
            Key::Position(position)
        } else if let Some(name) = self.this_property(target) {
            Key::Name(name)
        } else if let Some(name) = self.identifier_name(target) {
            Key::Name(name)
        } else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["object pattern entry"], object));
        };
        Ok(Element {
            target,
            key,
            default,
        })
    }

    fn split_default(&self, object: NodeIndex) -> (NodeIndex, Option<NodeIndex>) {
        match self.tree.kind(object) {
            Some(NodeKind::Assign {
                variable,
                value,
                context: AssignContext::Plain,
            }) => (*variable, Some(*value)),
            _ => (object, None),
        }
    }

    fn object_key(&self, key: NodeIndex) -> CompileResult<Key> {
        let target = self.unwrap(key);
        Ok(match self.kind(target)? {
            NodeKind::Identifier { name } | NodeKind::PropertyName { name } => Key::Name(name),
            NodeKind::ComputedPropertyName { expression } => Key::Expression(expression),
            _ => Key::Expression(target),
        })
    }

    /// `ref.name`, `ref[i]`, `ref[expr]`, honoring a preceding splat.
    fn element_access(
        &mut self,
        reference: JsNode,
        key: &Key,
        expanded: Option<&Expanded>,
    ) -> CompileResult<JsNode> {
        Ok(match key {
            Key::Name(name) => JsNode::prop(reference, name.clone()),
            Key::Expression(expression) => {
                let index = self.lower_expr(*expression)?;
                JsNode::elem(reference, index)
            }
            Key::Position(position) => {
                let index = match expanded {
                    None => JsNode::number(position.to_string()),
                    Some(Expanded::Counter(ivar)) => JsNode::new(JsKind::Unary {
                        operator: "++".to_string(),
                        operand: Box::new(JsNode::id(ivar.clone())),
                        prefix: false,
                    }),
                    Some(Expanded::Last) => JsNode::binary(
                        JsNode::prop(reference.clone(), "length"),
                        "-",
                        JsNode::number("1"),
                    ),
                };
                JsNode::elem(reference, index)
            }
        })
    }

    /// Assign `read` (or its default) to the element target.
    fn assign_element(
        &mut self,
        element: &Element,
        read: JsNode,
        mode: PatternMode,
    ) -> CompileResult<JsNode> {
        let read = match element.default {
            Some(default) => {
                let temp = self.free_variable("ref", false);
                let cached = JsNode::assign(JsNode::id(temp.clone()), read);
                let present = JsNode::binary(cached, "!==", JsNode::undefined());
                let fallback = self.lower_expr(default)?;
                JsNode::conditional(present, JsNode::id(temp), fallback)
            }
            None => read,
        };

        let target = self.unwrap(element.target);
        if matches!(
            self.tree.kind(target),
            Some(NodeKind::Arr { .. } | NodeKind::Obj { .. })
        ) {
            let nested = PatternMode {
                top: false,
                subpattern: true,
                always_declare: mode.always_declare,
            };
            return self.destructure(target, read, None, nested);
        }

        self.check_assignable(element.target)?;
        if let Some(name) = self.identifier_name(element.target) {
            if mode.always_declare {
                let scope = self.scope();
                self.scopes.add(scope, &name, VarKind::Var, false);
            } else {
                self.declare_assigned(element.target, &name)?;
            }
        }
        let lowered = self.lower_expr(element.target)?;
        Ok(JsNode::assign(lowered, read))
    }
}
