//! Compile options recognized at entry.

use csz_common::limits::RANGE_UNROLL_LIMIT;
use serde::{Deserialize, Serialize};

/// Which output representation the compile produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Target {
    /// Output-text fragments.
    #[default]
    Js,
    /// A Babel-compatible syntax tree.
    Ast,
}

/// Options for one top-level compile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub target: Target,
    /// Indent unit used for every nesting level.
    pub indent: String,
    /// Suppress the top-level `(function() { ... }).call(this);` wrapper.
    pub bare: bool,
    /// Names bound outside the program; never declared and never reused as temporaries.
    pub locals: Vec<String>,
    /// Largest literal range span unrolled into an array literal.
    pub range_unroll_limit: u32,
    /// Banner line emitted as a leading comment.
    pub header: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            target: Target::Js,
            indent: "  ".to_string(),
            bare: false,
            locals: Vec::new(),
            range_unroll_limit: RANGE_UNROLL_LIMIT,
            header: None,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn bare() -> Self {
        Self {
            bare: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }
}
