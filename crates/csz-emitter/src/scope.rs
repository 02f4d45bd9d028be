//! Scope analysis: declared names, temporaries and helper utilities.
//!
//! A scope is created at the program root and at every function boundary.
//! Scopes live in an arena owned by one compile and refer to their parent by
//! [`ScopeId`]. A *shared* scope (the synthetic function of a closure wrapper)
//! forwards declarations to its parent so that variables assigned inside the
//! wrapper stay visible around it.

use crate::ir::JsNode;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

pub type ScopeId = usize;

/// How a name is bound in a scope.
#[derive(Clone, Debug, PartialEq)]
pub enum VarKind {
    /// Declared with the combined `var` statement at the top of the body.
    Var,
    /// Function parameter or externally bound name; never declared.
    Param,
    /// Module import binding; read-only.
    Import,
    /// Declared by an `export` statement itself.
    Export,
    /// Declared with an initializer (helper utilities).
    Assigned(JsNode),
}

#[derive(Clone, Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub shared: bool,
    variables: IndexMap<String, VarKind>,
}

/// All scopes of one compile, plus the root-level registries.
#[derive(Clone, Debug, Default)]
pub struct Scopes {
    scopes: Vec<Scope>,
    /// Every name written anywhere in the program; temporaries avoid them.
    referenced: FxHashSet<String>,
    /// Helper name -> reserved variable name, created once on the root scope.
    utilities: FxHashMap<String, String>,
}

pub const ROOT_SCOPE: ScopeId = 0;

impl Scopes {
    pub fn new(referenced: FxHashSet<String>) -> Self {
        Self {
            scopes: vec![Scope::default()],
            referenced,
            utilities: FxHashMap::default(),
        }
    }

    /// Create a scope nested in `parent`.
    pub fn push(&mut self, parent: ScopeId, shared: bool) -> ScopeId {
        self.scopes.push(Scope {
            parent: Some(parent),
            shared,
            variables: IndexMap::new(),
        });
        self.scopes.len() - 1
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes.get(id).and_then(|s| s.parent)
    }

    pub fn is_shared(&self, id: ScopeId) -> bool {
        self.scopes.get(id).is_some_and(|s| s.shared)
    }

    /// Add a name to the scope. Shared scopes forward to their parent unless
    /// `immediate` is set.
    pub fn add(&mut self, id: ScopeId, name: &str, kind: VarKind, immediate: bool) {
        if self.is_shared(id)
            && !immediate
            && let Some(parent) = self.parent(id)
        {
            self.add(parent, name, kind, immediate);
            return;
        }
        let Some(scope) = self.scopes.get_mut(id) else {
            return;
        };
        // Parameters and imports stay bound as such when a pattern assigns them.
        if matches!(kind, VarKind::Var)
            && matches!(
                scope.variables.get(name),
                Some(VarKind::Param | VarKind::Import)
            )
        {
            return;
        }
        scope.variables.insert(name.to_string(), kind);
    }

    /// Look up a name through the scope chain; declare it here when missing.
    /// Returns whether it was already known.
    pub fn find(&mut self, id: ScopeId, name: &str) -> bool {
        if self.check(id, name) {
            return true;
        }
        self.add(id, name, VarKind::Var, false);
        false
    }

    /// Register a function parameter.
    pub fn parameter(&mut self, id: ScopeId, name: &str) {
        if self.is_shared(id)
            && let Some(parent) = self.parent(id)
            && self.check(parent, name)
        {
            return;
        }
        self.add(id, name, VarKind::Param, true);
    }

    /// Whether a name is visible from this scope.
    pub fn check(&self, id: ScopeId, name: &str) -> bool {
        self.kind_of(id, name).is_some()
    }

    /// Binding kind of a visible name.
    pub fn kind_of(&self, id: ScopeId, name: &str) -> Option<&VarKind> {
        let mut current = Some(id);
        while let Some(sid) = current {
            let scope = self.scopes.get(sid)?;
            if let Some(kind) = scope.variables.get(name) {
                return Some(kind);
            }
            current = scope.parent;
        }
        None
    }

    /// Candidate temporary name for attempt `index`.
    ///
    /// Single-letter names walk the alphabet from the base letter (`i`, `j`,
    /// `k`, ... then `i1`); other names get a numeric suffix (`ref`, `ref1`).
    pub fn temporary(name: &str, index: usize, single: bool) -> String {
        if single {
            let start = name.bytes().next().unwrap_or(b'i');
            let span = usize::from(b'z'.saturating_sub(start)) + 1;
            let letter = char::from(start + (index % span) as u8);
            let num = index / span;
            if num == 0 {
                letter.to_string()
            } else {
                format!("{letter}{num}")
            }
        } else if index == 0 {
            name.to_string()
        } else {
            format!("{name}{index}")
        }
    }

    /// Allocate a name that collides with nothing visible or referenced.
    /// With `reserve`, the name is declared in this scope.
    pub fn free_variable(&mut self, id: ScopeId, name: &str, single: bool, reserve: bool) -> String {
        let mut index = 0;
        let temp = loop {
            let temp = Self::temporary(name, index, single);
            if !(self.check(id, &temp) || self.referenced.contains(&temp)) {
                break temp;
            }
            index += 1;
        };
        if reserve {
            self.add(id, &temp, VarKind::Var, true);
        }
        tracing::trace!(scope = id, name = %temp, "allocated temporary");
        temp
    }

    /// Declare `name` with an initializer in this exact scope.
    pub fn assign(&mut self, id: ScopeId, name: &str, value: JsNode) {
        self.add(id, name, VarKind::Assigned(value), true);
    }

    /// Reserved variable of a helper utility, if already created.
    pub fn utility(&self, helper: &str) -> Option<&str> {
        self.utilities.get(helper).map(String::as_str)
    }

    /// Create the root variable of a helper utility.
    pub fn add_utility(&mut self, helper: &str, value: JsNode) -> String {
        if let Some(existing) = self.utilities.get(helper) {
            return existing.clone();
        }
        let name = self.free_variable(ROOT_SCOPE, helper, false, false);
        self.assign(ROOT_SCOPE, &name, value);
        self.utilities.insert(helper.to_string(), name.clone());
        name
    }

    /// Names declared without initializer, sorted.
    pub fn declared_variables(&self, id: ScopeId) -> Vec<String> {
        let Some(scope) = self.scopes.get(id) else {
            return Vec::new();
        };
        let mut names: Vec<String> = scope
            .variables
            .iter()
            .filter(|(_, kind)| matches!(kind, VarKind::Var))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Names declared with an initializer, in declaration order.
    pub fn assigned_variables(&self, id: ScopeId) -> Vec<(String, JsNode)> {
        let Some(scope) = self.scopes.get(id) else {
            return Vec::new();
        };
        scope
            .variables
            .iter()
            .filter_map(|(name, kind)| match kind {
                VarKind::Assigned(value) => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Whether the scope declares anything at its top.
    pub fn has_declarations(&self, id: ScopeId) -> bool {
        self.scopes.get(id).is_some_and(|scope| {
            scope
                .variables
                .values()
                .any(|kind| matches!(kind, VarKind::Var | VarKind::Assigned(_)))
        })
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
