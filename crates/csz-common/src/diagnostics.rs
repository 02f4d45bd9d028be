//! Compile errors and diagnostics.
//!
//! Every failure in the code generator is fatal and carries the location of the
//! offending node. Formatting an error for a human (file name, source line,
//! caret marker) is left to the caller, which receives the message text and
//! the location through [`CompileError`] or its [`Diagnostic`] projection.

use crate::position::SourceLocation;
use serde::Serialize;
use std::fmt;

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
}

/// A diagnostic message definition with code and message template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub message: &'static str,
}

/// Message templates. `{0}`, `{1}` placeholders are filled by [`format_message`].
pub mod messages {
    use super::DiagnosticMessage;

    const fn msg(code: u32, message: &'static str) -> DiagnosticMessage {
        DiagnosticMessage { code, message }
    }

    // Assignment and patterns
    pub const CANT_BE_ASSIGNED: DiagnosticMessage = msg(1001, "'{0}' can't be assigned");
    pub const RESERVED_WORD_ASSIGNMENT: DiagnosticMessage =
        msg(1002, "'{0}' can't be assigned");
    pub const CONDITIONAL_ASSIGN_UNDECLARED: DiagnosticMessage = msg(
        1003,
        "the variable \"{0}\" can't be assigned with {1} because it has not been declared before",
    );
    pub const MULTIPLE_SPLATS_IN_PATTERN: DiagnosticMessage =
        msg(1004, "multiple splats/expansions are disallowed in an assignment");
    pub const DESTRUCTURING_NO_TARGET: DiagnosticMessage =
        msg(1005, "Destructuring assignment has no target");
    pub const MULTIPLE_SPLAT_PARAMS: DiagnosticMessage = msg(
        1006,
        "only one splat or expansion parameter is allowed per function definition",
    );
    pub const DUPLICATE_PARAMETER: DiagnosticMessage =
        msg(1007, "multiple parameters named '{0}'");

    // Operators
    pub const INCREMENT_NON_ASSIGNABLE: DiagnosticMessage =
        msg(1101, "cannot increment/decrement \"{0}\"");
    pub const DELETE_VARIABLE: DiagnosticMessage =
        msg(1102, "delete operand may not be argument or var");

    // Control flow
    pub const PURE_STATEMENT_IN_EXPRESSION: DiagnosticMessage =
        msg(1201, "cannot use a pure statement in an expression");
    pub const JUMP_OUTSIDE_LOOP: DiagnosticMessage = msg(1202, "{0} statement outside of a loop");

    // Functions and classes
    pub const SUPER_OUTSIDE_METHOD: DiagnosticMessage =
        msg(1301, "cannot use super outside of an instance method");
    pub const MULTIPLE_CONSTRUCTORS: DiagnosticMessage =
        msg(1302, "Cannot define more than one constructor in a class");
    pub const NESTED_CONSTRUCTOR: DiagnosticMessage =
        msg(1303, "constructors must be defined at the top level of a class body");
    pub const BOUND_CONSTRUCTOR: DiagnosticMessage =
        msg(1304, "Class constructor may not be bound");
    pub const GENERATOR_CONSTRUCTOR: DiagnosticMessage =
        msg(1305, "Class constructor may not be a generator");
    pub const CLASS_BODY_ARGUMENTS: DiagnosticMessage =
        msg(1306, "Class bodies shouldn't reference arguments");
    pub const CLASS_BODY_PURE_STATEMENT: DiagnosticMessage =
        msg(1307, "Class bodies cannot contain pure statements");
    pub const THIS_BEFORE_SUPER: DiagnosticMessage = msg(
        1308,
        "Can't reference 'this' before calling super in derived class constructors",
    );
    pub const THIS_PARAMS_WITHOUT_SUPER: DiagnosticMessage = msg(
        1309,
        "Can't use @params in derived class constructors without calling super",
    );
    pub const UNSUPPORTED_SUPER_REFERENCE: DiagnosticMessage =
        msg(1310, "Unsupported reference to 'super'");

    // Modules and scope
    pub const IMPORT_REDECLARED: DiagnosticMessage = msg(1401, "'{0}' has already been declared");
    pub const IMPORT_READ_ONLY: DiagnosticMessage = msg(1402, "'{0}' is read-only");
    pub const MODULE_NOT_TOP_LEVEL: DiagnosticMessage =
        msg(1403, "{0} statements must be at top-level scope");

    // Internal limits
    pub const NESTING_TOO_DEEP: DiagnosticMessage =
        msg(1501, "expression nesting exceeds the maximum depth of {0}");
    pub const UNKNOWN_NODE: DiagnosticMessage = msg(1502, "node {0} does not exist in the tree");
    pub const UNEXPECTED_NODE: DiagnosticMessage = msg(1503, "unexpected {0} in this position");
    pub const CONTEXT_REUSED: DiagnosticMessage = msg(
        1504,
        "a compiler context compiles one program; call reset() before compiling another",
    );
    pub const OBJECT_PATTERN_REST: DiagnosticMessage =
        msg(1505, "rest elements are not supported in object patterns");
    pub const ANONYMOUS_CLASS_EXPORT: DiagnosticMessage =
        msg(1404, "anonymous classes cannot be exported");
}

/// A fatal compile error carrying the location of the offending node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub code: u32,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl CompileError {
    /// Create an error from a message template and its arguments.
    pub fn new(message: DiagnosticMessage, args: &[&str], location: Option<SourceLocation>) -> Self {
        Self {
            code: message.code,
            message: format_message(message.message, args),
            location,
        }
    }

    /// Project this error into a file-level diagnostic.
    #[must_use]
    pub fn to_diagnostic(&self, file: impl Into<String>) -> Diagnostic {
        let (start, length) = self
            .location
            .map(|loc| (loc.range.start, loc.range.len()))
            .unwrap_or((0, 0));
        Diagnostic {
            file: file.into(),
            start,
            length,
            message_text: self.message.clone(),
            category: DiagnosticCategory::Error,
            code: self.code,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{}:{}: error: {}",
                loc.start.line + 1,
                loc.start.column + 1,
                self.message
            ),
            None => write!(f, "error: {}", self.message),
        }
    }
}

impl std::error::Error for CompileError {}

/// A diagnostic record consumed by external error reporters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Position, Span};

    #[test]
    fn formats_placeholders() {
        let err = CompileError::new(messages::CANT_BE_ASSIGNED, &["a.b()"], None);
        assert_eq!(err.message, "'a.b()' can't be assigned");
        assert_eq!(err.code, 1001);
        assert_eq!(err.to_string(), "error: 'a.b()' can't be assigned");
    }

    #[test]
    fn display_and_diagnostic_use_location() {
        let loc = SourceLocation::new(Position::new(2, 4), Position::new(2, 9), Span::new(30, 35));
        let err = CompileError::new(messages::SUPER_OUTSIDE_METHOD, &[], Some(loc));
        assert_eq!(
            err.to_string(),
            "3:5: error: cannot use super outside of an instance method"
        );
        let diag = err.to_diagnostic("a.coffee");
        assert_eq!(diag.start, 30);
        assert_eq!(diag.length, 5);
        assert_eq!(diag.category, DiagnosticCategory::Error);
    }
}
