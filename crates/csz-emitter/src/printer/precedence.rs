//! Operator precedence of lowered nodes.
//!
//! Higher numbers bind tighter. A node is wrapped in parentheses when its own
//! precedence is lower than the one its position demands.

use crate::ir::{JsKind, JsNode};
use crate::lowering::Level;

pub const SEQUENCE: u8 = 1;
pub const LIST: u8 = 2;
pub const ASSIGN: u8 = 3;
pub const CONDITIONAL: u8 = 4;
pub const LOGICAL_OR: u8 = 5;
pub const UNARY: u8 = 16;
pub const POSTFIX: u8 = 17;
pub const CALL: u8 = 18;
pub const MEMBER: u8 = 19;
pub const PRIMARY: u8 = 20;

/// Minimum precedence a caller's level demands.
pub fn level_precedence(level: Level) -> u8 {
    match level {
        Level::Top | Level::Paren => 0,
        Level::List => LIST,
        Level::Cond => CONDITIONAL,
        Level::Op => UNARY,
        Level::Access => CALL,
    }
}

/// Precedence of a binary operator and whether it groups to the right.
pub fn binary_precedence(operator: &str) -> (u8, bool) {
    match operator {
        "||" | "??" => (LOGICAL_OR, false),
        "&&" => (6, false),
        "|" => (7, false),
        "^" => (8, false),
        "&" => (9, false),
        "==" | "!=" | "===" | "!==" => (10, false),
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" => (11, false),
        "<<" | ">>" | ">>>" => (12, false),
        "+" | "-" => (13, false),
        "*" | "/" | "%" => (14, false),
        "**" => (15, true),
        _ => (LOGICAL_OR, false),
    }
}

pub fn is_logical(operator: &str) -> bool {
    matches!(operator, "||" | "&&" | "??")
}

pub fn precedence(node: &JsNode) -> u8 {
    match &node.kind {
        JsKind::Sequence(items) if items.len() > 1 => SEQUENCE,
        JsKind::Sequence(_) => PRIMARY,
        JsKind::Yield { .. } | JsKind::Spread(_) => LIST,
        JsKind::Assign { .. } => ASSIGN,
        JsKind::Function(func) if func.arrow => ASSIGN,
        JsKind::Conditional { .. } => CONDITIONAL,
        JsKind::Binary { operator, .. } => binary_precedence(operator).0,
        JsKind::Unary { prefix: true, .. } | JsKind::Await(_) | JsKind::Undefined => UNARY,
        JsKind::Unary { prefix: false, .. } => POSTFIX,
        JsKind::Call { .. } => CALL,
        JsKind::New { .. } | JsKind::Member { .. } | JsKind::Index { .. } => MEMBER,
        JsKind::Number(text) if text.starts_with('-') => UNARY,
        _ => PRIMARY,
    }
}

/// Nodes printed as a single token or bracketed unit, never needing grouping.
pub fn is_atomic(node: &JsNode) -> bool {
    matches!(
        node.kind,
        JsKind::Number(_)
            | JsKind::Str(_)
            | JsKind::Bool(_)
            | JsKind::Null
            | JsKind::Regex { .. }
            | JsKind::Template { .. }
            | JsKind::Identifier(_)
            | JsKind::This
            | JsKind::Array(_)
            | JsKind::Paren(_)
    )
}

/// Whether a number literal needs grouping before `.property`.
pub fn is_bare_integer(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
