//! Read-only view of the parser's arena with per-compile synthetic nodes.
//!
//! Desugaring sometimes needs new nodes (the conditional produced by soak
//! unfolding, the returning copy of a block). They are appended to an
//! overlay owned by the compile, indexed after the arena's last node, so the
//! parser's tree is never written to.

use csz_ast::{Node, NodeAccess, NodeArena, NodeIndex, NodeKind};
use csz_common::SourceLocation;

pub struct Tree<'a> {
    base: &'a NodeArena,
    synthetic: Vec<Node>,
}

impl<'a> Tree<'a> {
    pub fn new(base: &'a NodeArena) -> Self {
        Self {
            base,
            synthetic: Vec::new(),
        }
    }

    pub fn base(&self) -> &'a NodeArena {
        self.base
    }

    /// Add a synthetic node.
    pub fn add(&mut self, kind: NodeKind, location: Option<SourceLocation>) -> NodeIndex {
        let idx = NodeIndex((self.base.len() + self.synthetic.len()) as u32);
        self.synthetic.push(Node::with_location(kind, location));
        idx
    }

    /// Add a synthetic node carrying comments.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex((self.base.len() + self.synthetic.len()) as u32);
        self.synthetic.push(node);
        idx
    }

    pub fn is_synthetic(&self, index: NodeIndex) -> bool {
        index.index() >= self.base.len()
    }

    pub fn synthetic_len(&self) -> usize {
        self.synthetic.len()
    }

    /// Drop synthetic nodes added after `len` (used to undo provisional work).
    pub fn truncate(&mut self, len: usize) {
        self.synthetic.truncate(len);
    }

    pub fn clear(&mut self) {
        self.synthetic.clear();
    }
}

impl NodeAccess for Tree<'_> {
    fn node(&self, index: NodeIndex) -> Option<&Node> {
        let i = index.index();
        if i < self.base.len() {
            self.base.get(index)
        } else {
            self.synthetic.get(i - self.base.len())
        }
    }
}
