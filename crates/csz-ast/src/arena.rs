//! NodeArena storage and the NodeAccess trait.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeIndex`]. The
//! [`NodeAccess`] trait abstracts over "something that can resolve an index to
//! a node" so the emitter can layer per-compile synthetic nodes on top of the
//! parser's arena without copying or mutating it.

use crate::node::{Node, NodeIndex, NodeKind};
use csz_common::SourceLocation;
use serde::{Deserialize, Serialize};

/// Arena holding every node of one parsed program.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Append a node and return its index.
    pub fn add(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        idx
    }

    /// Append a node of `kind` without location or comments.
    pub fn add_kind(&mut self, kind: NodeKind) -> NodeIndex {
        self.add(Node::new(kind))
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.index())
    }

    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(index.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over `(index, node)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i as u32), node))
    }

    /// Set the location of a node.
    ///
    /// A location, once set, is kept unless `force` is given; this lets the
    /// parser widen a node after discovering a prefix operator to its left.
    /// Returns whether the location changed.
    pub fn set_location(
        &mut self,
        index: NodeIndex,
        location: SourceLocation,
        force: bool,
    ) -> bool {
        let Some(node) = self.get_mut(index) else {
            return false;
        };
        if node.location.is_some() && !force {
            return false;
        }
        node.location = Some(location);
        true
    }

    /// Give `location` to `index` and every descendant that has none yet.
    pub fn update_location_if_missing(&mut self, index: NodeIndex, location: SourceLocation) {
        let mut stack = vec![index];
        while let Some(idx) = stack.pop() {
            let Some(node) = self.get_mut(idx) else {
                continue;
            };
            if node.location.is_none() {
                node.location = Some(location);
            }
            stack.extend(node.kind.children());
        }
    }

    /// Drop every node. Indexes handed out earlier become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// Unified read access to nodes, for the parser's arena and for overlays
/// that add synthetic nodes on top of it.
pub trait NodeAccess {
    /// Resolve an index.
    fn node(&self, index: NodeIndex) -> Option<&Node>;

    /// Kind of a node.
    fn kind(&self, index: NodeIndex) -> Option<&NodeKind> {
        self.node(index).map(|n| &n.kind)
    }

    /// Location of a node, if the parser gave it one.
    fn location(&self, index: NodeIndex) -> Option<SourceLocation> {
        self.node(index).and_then(|n| n.location)
    }

    /// Check if a node exists.
    fn exists(&self, index: NodeIndex) -> bool {
        self.node(index).is_some()
    }

    /// Name carried by an `Identifier` or `PropertyName` node.
    fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        match self.kind(index)? {
            NodeKind::Identifier { name } | NodeKind::PropertyName { name } => Some(name),
            _ => None,
        }
    }

    /// Declared children of a node (for traversal).
    fn get_children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.kind(index)
            .map(|kind| kind.children().into_vec())
            .unwrap_or_default()
    }

    /// First descendant of `index` (pre-order, `index` itself excluded) that
    /// satisfies `pred`.
    ///
    /// Function bodies are entered only when `cross_scope` is set; the
    /// function node itself is still offered to `pred`.
    fn find_descendant(
        &self,
        index: NodeIndex,
        cross_scope: bool,
        pred: &mut dyn FnMut(NodeIndex, &NodeKind) -> bool,
    ) -> Option<NodeIndex> {
        let mut stack: Vec<NodeIndex> = self.get_children(index);
        stack.reverse();
        while let Some(idx) = stack.pop() {
            let Some(kind) = self.kind(idx) else {
                continue;
            };
            if pred(idx, kind) {
                return Some(idx);
            }
            if kind.is_function_boundary() && !cross_scope {
                continue;
            }
            let mut children = kind.children();
            children.reverse();
            stack.extend(children);
        }
        None
    }

    /// Whether any descendant satisfies `pred`.
    fn contains(
        &self,
        index: NodeIndex,
        cross_scope: bool,
        pred: &mut dyn FnMut(NodeIndex, &NodeKind) -> bool,
    ) -> bool {
        self.find_descendant(index, cross_scope, pred).is_some()
    }
}

impl NodeAccess for NodeArena {
    #[inline]
    fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.get(index)
    }
}
