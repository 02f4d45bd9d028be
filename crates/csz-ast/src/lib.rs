//! Node tree for the csz code generator.
//!
//! The external parser builds a [`NodeArena`] of [`Node`]s; every node owns a
//! location, its attached comments, and child references expressed through
//! [`NodeKind::children`]. The tree is read-only during compilation: all
//! per-compile state lives in the emitter's side tables.

pub mod node;
pub use node::{
    AssignContext, ExportKind, JumpKeyword, Node, NodeIndex, NodeKind, SwitchCase,
};

pub mod arena;
pub use arena::{NodeAccess, NodeArena};

pub mod builder;
pub use builder::TreeBuilder;
