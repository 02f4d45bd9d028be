//! Code generation for csz.
//!
//! Lowers a parsed node tree into JavaScript, either as output fragments
//! (text with source locations, comments already interleaved) or as a
//! Babel-compatible syntax tree.
//!
//! # Architecture
//!
//! ```text
//! NodeArena ──► Compiler (lowering) ──► JsNode IR ──┬──► printer ──► Vec<Fragment>
//!                    │                               │
//!                    └─ scopes, hoist slots          └──► babel   ──► serde_json::Value
//! ```
//!
//! All desugaring (soaks, destructuring, closure wrapping, class bodies)
//! happens once during lowering; both printers are straight walks over the
//! IR. A [`Compiler`] carries every piece of per-compile state, so the input
//! arena is never modified and compiling it twice gives the same output.

pub mod babel;
pub mod fragment;
pub mod ir;
mod lowering;
pub mod options;
pub mod printer;
pub mod scope;
pub mod tree;

pub use fragment::{Fragment, fragments_to_text};
pub use lowering::{Compiler, Level};
pub use options::{CompileOptions, Target};

use csz_ast::{NodeArena, NodeIndex};
use csz_common::CompileResult;
use csz_common::limits::{STACK_RED_ZONE, STACK_SEGMENT_SIZE};

/// Run one level of a recursive walk, continuing on a heap-allocated stack
/// segment when the current one is nearly exhausted.
#[inline]
pub(crate) fn ensure_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, f)
}

/// Result of a top-level compile, shaped by [`CompileOptions::target`].
#[derive(Clone, Debug, PartialEq)]
pub enum CompileOutput {
    Js(Vec<Fragment>),
    Ast(serde_json::Value),
}

impl CompileOutput {
    /// Output text for `Js`; the pretty-printed tree for `Ast`.
    pub fn to_text(&self) -> String {
        match self {
            CompileOutput::Js(fragments) => fragments_to_text(fragments),
            CompileOutput::Ast(tree) => {
                serde_json::to_string_pretty(tree).unwrap_or_else(|_| tree.to_string())
            }
        }
    }
}

/// Compile a whole program rooted at `root`.
#[tracing::instrument(level = "debug", skip(arena, options), fields(target = ?options.target))]
pub fn compile(
    arena: &NodeArena,
    root: NodeIndex,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    let mut compiler = Compiler::new(arena, options);
    match options.target {
        Target::Js => compiler.compile(root, Level::Top).map(CompileOutput::Js),
        Target::Ast => compiler.to_tree(root, Level::Top).map(CompileOutput::Ast),
    }
}

/// Compile a whole program to JavaScript text.
pub fn compile_to_js(
    arena: &NodeArena,
    root: NodeIndex,
    options: &CompileOptions,
) -> CompileResult<String> {
    let mut compiler = Compiler::new(arena, options);
    let fragments = compiler.compile(root, Level::Top)?;
    Ok(fragments_to_text(&fragments))
}

/// Compile a whole program to a Babel-compatible `File` tree.
pub fn compile_to_tree(
    arena: &NodeArena,
    root: NodeIndex,
    options: &CompileOptions,
) -> CompileResult<serde_json::Value> {
    Compiler::new(arena, options).to_tree(root, Level::Top)
}
