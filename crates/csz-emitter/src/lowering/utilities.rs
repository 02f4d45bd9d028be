//! Helper utilities shared by the whole program.
//!
//! A utility is declared once, on the root scope, the first time lowering
//! needs it; later requests reuse the same variable.

use super::Compiler;
use crate::ir::{JsKind, JsNode, JsParam};

impl Compiler<'_> {
    /// Reference to a helper utility, declaring it on first use.
    pub(crate) fn utility(&mut self, helper: &str) -> JsNode {
        if let Some(name) = self.scopes.utility(helper) {
            return JsNode::id(name);
        }
        let value = utility_definition(helper);
        let name = self.scopes.add_utility(helper, value);
        tracing::debug!(helper, name = %name, "declared utility");
        JsNode::id(name)
    }
}

fn empty_array() -> JsNode {
    JsNode::new(JsKind::Array(Vec::new()))
}

fn utility_definition(helper: &str) -> JsNode {
    match helper {
        "slice" | "splice" | "indexOf" => JsNode::prop(empty_array(), helper),
        "hasProp" => JsNode::prop(JsNode::new(JsKind::Object(Vec::new())), "hasOwnProperty"),
        "modulo" => modulo(),
        "boundMethodCheck" => bound_method_check(),
        other => JsNode::id(other),
    }
}

/// `function(a, b) { return (+a % (b = +b) + b) % b; }`
fn modulo() -> JsNode {
    let a = JsNode::unary("+", JsNode::id("a"));
    let b = JsNode::assign(JsNode::id("b"), JsNode::unary("+", JsNode::id("b")));
    let remainder = JsNode::binary(a, "%", b);
    let shifted = JsNode::binary(remainder, "+", JsNode::id("b"));
    let body = JsNode::binary(shifted, "%", JsNode::id("b"));
    JsNode::function(
        vec![JsParam::new("a"), JsParam::new("b")],
        vec![JsNode::ret(Some(body))],
    )
}

/// Throws when a bound method runs before the constructor bound it.
fn bound_method_check() -> JsNode {
    let test = JsNode::not(JsNode::binary(
        JsNode::id("instance"),
        "instanceof",
        JsNode::id("Constructor"),
    ));
    let error = JsNode::new(JsKind::New {
        callee: Box::new(JsNode::id("Error")),
        args: vec![JsNode::string("Bound instance method accessed before binding")],
    });
    let throw = JsNode::new(JsKind::Throw(Box::new(error)));
    JsNode::function(
        vec![JsParam::new("instance"), JsParam::new("Constructor")],
        vec![JsNode::if_stmt(test, vec![throw], None)],
    )
}
