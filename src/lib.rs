//! csz: the code-generation backend of a CoffeeScript-style compiler.
//!
//! The workspace crates do the work; this crate re-exports them under one
//! name and adds the entry point an out-of-process parser talks to: a JSON
//! [`CompileRequest`] carrying the node tree, its root and the options.

pub use csz_ast as ast;
pub use csz_common as common;
pub use csz_emitter as emitter;

pub use csz_ast::{NodeArena, NodeIndex, TreeBuilder};
pub use csz_common::{CompileError, CompileResult};
pub use csz_emitter::{
    CompileOptions, CompileOutput, Target, compile, compile_to_js, compile_to_tree,
};

pub mod tracing_config;
pub use tracing_config::init_tracing;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One compile handed over as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub tree: NodeArena,
    pub root: NodeIndex,
    #[serde(default)]
    pub options: CompileOptions,
}

impl CompileRequest {
    pub fn compile(&self) -> CompileResult<CompileOutput> {
        compile(&self.tree, self.root, &self.options)
    }
}

/// Parse a [`CompileRequest`] and compile it, returning the output text
/// (JavaScript, or the pretty-printed tree for the `ast` target).
pub fn compile_request(json: &str) -> anyhow::Result<String> {
    let request: CompileRequest =
        serde_json::from_str(json).context("malformed compile request")?;
    tracing::debug!(
        nodes = request.tree.len(),
        target = ?request.options.target,
        "compile request"
    );
    let output = request
        .compile()
        .with_context(|| format!("compiling node {}", request.root.0))?;
    Ok(output.to_text())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
