//! Soak unfolding.
//!
//! A soaked access (`a?.b`), soaked call (`f?()`) or a node containing one
//! is rewritten into a conditional whose body is the unsoaked remainder:
//!
//! ```text
//! a?.b.c     =>  if (a?) then a.b.c
//! f()?.x     =>  if ((ref = f())?) then ref.x
//! g?(1)      =>  if (typeof g === "function") then g(1)
//! ```
//!
//! The conditional is an ordinary synthetic `If` without else branch, so it
//! lowers to a statement at top level and to `cond ? body : void 0`
//! elsewhere. Nested soaks unfold again when the body is lowered.

use super::Compiler;
use csz_ast::{AssignContext, NodeAccess, NodeIndex, NodeKind};
use csz_common::CompileResult;

impl Compiler<'_> {
    /// Rewrite a node containing a soak into a conditional, if it has one.
    pub fn unfold_soak(&mut self, idx: NodeIndex) -> CompileResult<Option<NodeIndex>> {
        crate::ensure_stack(|| self.unfold_soak_at(idx))
    }

    fn unfold_soak_at(&mut self, idx: NodeIndex) -> CompileResult<Option<NodeIndex>> {
        match self.kind(idx)? {
            NodeKind::Value { base, properties } => self.unfold_value_soak(idx, base, &properties),
            NodeKind::Call {
                callee,
                args,
                soak,
                is_new,
            } => self.unfold_call_soak(idx, callee, args, soak, is_new),
            NodeKind::Assign {
                variable,
                value,
                context,
            } if context != AssignContext::Object => {
                self.unfold_child(idx, variable, move |variable| NodeKind::Assign {
                    variable,
                    value,
                    context,
                })
            }
            NodeKind::Op {
                operator,
                first,
                second,
                flip,
            } if matches!(operator.as_str(), "++" | "--" | "delete") => {
                self.unfold_child(idx, first, move |first| NodeKind::Op {
                    operator,
                    first,
                    second,
                    flip,
                })
            }
            _ => Ok(None),
        }
    }

    /// Unfold a soak inside `child` and move the rebuilt parent into the
    /// conditional's body.
    fn unfold_child(
        &mut self,
        parent: NodeIndex,
        child: NodeIndex,
        rebuild: impl FnOnce(NodeIndex) -> NodeKind,
    ) -> CompileResult<Option<NodeIndex>> {
        let Some(conditional) = self.unfold_soak(child)? else {
            return Ok(None);
        };
        let NodeKind::If {
            condition, body, ..
        } = self.kind(conditional)?
        else {
            return Ok(None);
        };
        let rebuilt = self.synth(rebuild(body), parent);
        let wrapped = self.synth(
            NodeKind::Value {
                base: rebuilt,
                properties: Vec::new(),
            },
            parent,
        );
        Ok(Some(self.soak_conditional(condition, wrapped, parent)))
    }

    fn soak_conditional(
        &mut self,
        condition: NodeIndex,
        body: NodeIndex,
        like: NodeIndex,
    ) -> NodeIndex {
        self.synth(
            NodeKind::If {
                condition,
                body,
                else_body: None,
                negated: false,
            },
            like,
        )
    }

    fn unfold_value_soak(
        &mut self,
        idx: NodeIndex,
        base: NodeIndex,
        properties: &[NodeIndex],
    ) -> CompileResult<Option<NodeIndex>> {
        if let Some(conditional) = self.unfold_soak(base)? {
            let NodeKind::If {
                condition, body, ..
            } = self.kind(conditional)?
            else {
                return Ok(None);
            };
            let (inner_base, mut inner_props) = match self.kind(body)? {
                NodeKind::Value { base, properties } => (base, properties),
                _ => (body, Vec::new()),
            };
            inner_props.extend_from_slice(properties);
            let extended = self.synth(
                NodeKind::Value {
                    base: inner_base,
                    properties: inner_props,
                },
                idx,
            );
            return Ok(Some(self.soak_conditional(condition, extended, idx)));
        }

        let Some(position) = properties.iter().position(|&p| self.is_soak(p)) else {
            return Ok(None);
        };
        let head = self.synth(
            NodeKind::Value {
                base,
                properties: properties[..position].to_vec(),
            },
            idx,
        );
        let mut rest = vec![self.desoak(properties[position])?];
        rest.extend_from_slice(&properties[position + 1..]);

        let (checked, rest_base) = if self.should_cache(head) {
            let name = self.free_variable("ref", false);
            let target = self.synth(NodeKind::Identifier { name: name.clone() }, idx);
            let assign = self.synth(
                NodeKind::Assign {
                    variable: target,
                    value: head,
                    context: AssignContext::Plain,
                },
                idx,
            );
            let parens = self.synth(NodeKind::Parens { body: assign }, idx);
            (parens, self.synth(NodeKind::Identifier { name }, idx))
        } else {
            (head, base)
        };
        let body = self.synth(
            NodeKind::Value {
                base: rest_base,
                properties: rest,
            },
            idx,
        );
        let condition = self.synth(
            NodeKind::Existence {
                expression: checked,
                only_not_undefined: false,
                negated: false,
            },
            idx,
        );
        Ok(Some(self.soak_conditional(condition, body, idx)))
    }

    fn unfold_call_soak(
        &mut self,
        idx: NodeIndex,
        callee: NodeIndex,
        args: Vec<NodeIndex>,
        soak: bool,
        is_new: bool,
    ) -> CompileResult<Option<NodeIndex>> {
        let rebuild_args = args.clone();
        if let Some(conditional) = self.unfold_child(idx, callee, move |callee| NodeKind::Call {
            callee,
            args: rebuild_args,
            soak,
            is_new,
        })? {
            return Ok(Some(conditional));
        }
        if !soak {
            return Ok(None);
        }
        let (checked, called) = self.cache_reference(callee)?;
        let call = self.synth(
            NodeKind::Call {
                callee: called,
                args,
                soak: false,
                is_new,
            },
            idx,
        );
        let body = self.synth(
            NodeKind::Value {
                base: call,
                properties: Vec::new(),
            },
            idx,
        );
        let type_of = self.synth(
            NodeKind::Op {
                operator: "typeof".to_string(),
                first: checked,
                second: None,
                flip: false,
            },
            idx,
        );
        let function = self.synth(
            NodeKind::StringLiteral {
                value: "function".to_string(),
            },
            idx,
        );
        let condition = self.synth(
            NodeKind::Op {
                operator: "===".to_string(),
                first: type_of,
                second: Some(function),
                flip: false,
            },
            idx,
        );
        Ok(Some(self.soak_conditional(condition, body, idx)))
    }

    fn is_soak(&self, prop: NodeIndex) -> bool {
        matches!(
            self.tree.node(prop).map(|n| &n.kind),
            Some(NodeKind::Access { soak: true, .. } | NodeKind::Index { soak: true, .. })
        )
    }

    fn desoak(&mut self, prop: NodeIndex) -> CompileResult<NodeIndex> {
        let kind = match self.kind(prop)? {
            NodeKind::Access {
                name, shorthand, ..
            } => NodeKind::Access {
                name,
                soak: false,
                shorthand,
            },
            NodeKind::Index { index, .. } => NodeKind::Index { index, soak: false },
            _ => return Ok(prop),
        };
        Ok(self.synth(kind, prop))
    }

    /// Whether reading this property twice repeats work.
    pub(crate) fn property_should_cache(&self, prop: NodeIndex) -> bool {
        match self.tree.node(prop).map(|n| &n.kind) {
            Some(NodeKind::Access { .. }) => false,
            Some(NodeKind::Index { index, .. }) => self.should_cache(*index),
            _ => true,
        }
    }

    /// Split a reference into a first use that caches the complex parts and a
    /// second use that reads the caches.
    ///
    /// `a` gives `(a, a)`; `a().b` gives `((base = a()).b, base.b)`;
    /// `a[f()]` gives `(a[name = f()], a[name])`.
    pub(crate) fn cache_reference(
        &mut self,
        idx: NodeIndex,
    ) -> CompileResult<(NodeIndex, NodeIndex)> {
        let (base, properties) = match self.kind(idx)? {
            NodeKind::Value { base, properties } => (base, properties),
            _ => (idx, Vec::new()),
        };
        let name = properties.last().copied();
        let name_caches = name.is_some_and(|n| self.property_should_cache(n));
        if properties.len() < 2 && !self.should_cache(base) && !name_caches {
            return Ok((idx, idx));
        }

        let head_props = properties[..properties.len().saturating_sub(1)].to_vec();
        let mut head = self.synth(
            NodeKind::Value {
                base,
                properties: head_props,
            },
            idx,
        );
        let mut base_ref = None;
        if self.should_cache(head) {
            let temp = self.free_variable("base", false);
            let target = self.synth(NodeKind::Identifier { name: temp.clone() }, idx);
            let assign = self.synth(
                NodeKind::Assign {
                    variable: target,
                    value: head,
                    context: AssignContext::Plain,
                },
                idx,
            );
            let parens = self.synth(NodeKind::Parens { body: assign }, idx);
            head = self.synth(
                NodeKind::Value {
                    base: parens,
                    properties: Vec::new(),
                },
                idx,
            );
            base_ref = Some(self.synth(NodeKind::Identifier { name: temp }, idx));
        }
        let Some(name) = name else {
            return Ok((head, base_ref.unwrap_or(head)));
        };

        let (first_name, second_name) = if name_caches {
            let NodeKind::Index { index, .. } = self.kind(name)? else {
                return Ok((idx, idx));
            };
            let temp = self.free_variable("name", false);
            let target = self.synth(NodeKind::Identifier { name: temp.clone() }, name);
            let assign = self.synth(
                NodeKind::Assign {
                    variable: target,
                    value: index,
                    context: AssignContext::Plain,
                },
                name,
            );
            let cached = self.synth(
                NodeKind::Index {
                    index: assign,
                    soak: false,
                },
                name,
            );
            let read = self.synth(NodeKind::Identifier { name: temp }, name);
            let reread = self.synth(
                NodeKind::Index {
                    index: read,
                    soak: false,
                },
                name,
            );
            (cached, reread)
        } else {
            (name, name)
        };

        let (head_base, mut head_props) = match self.kind(head)? {
            NodeKind::Value { base, properties } => (base, properties),
            _ => (head, Vec::new()),
        };
        head_props.push(first_name);
        let first = self.synth(
            NodeKind::Value {
                base: head_base,
                properties: head_props,
            },
            idx,
        );
        let second = self.synth(
            NodeKind::Value {
                base: base_ref.unwrap_or(base),
                properties: vec![second_name],
            },
            idx,
        );
        Ok((first, second))
    }

    /// Cache a whole expression in a temporary when it is complex.
    ///
    /// Returns `(first, second)` where `first` assigns the temporary (or is the
    /// node itself) and `second` reads it.
    pub(crate) fn cache_value(
        &mut self,
        idx: NodeIndex,
        name: &str,
        force: bool,
    ) -> (NodeIndex, NodeIndex) {
        if !force && !self.should_cache(idx) {
            return (idx, idx);
        }
        let temp = self.free_variable(name, false);
        let target = self.synth(NodeKind::Identifier { name: temp.clone() }, idx);
        let assign = self.synth(
            NodeKind::Assign {
                variable: target,
                value: idx,
                context: AssignContext::Plain,
            },
            idx,
        );
        let read = self.synth(NodeKind::Identifier { name: temp }, idx);
        (assign, read)
    }
}
