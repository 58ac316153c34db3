//! Quad-tree node structure.
//!
//! Nodes are either leaves (holding entries) or internal (holding four
//! children plus the entries that straddle their split lines).

use serde::{Deserialize, Serialize};

use crate::Aabb;

/// A stored item together with the box it occupies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    /// Broad-phase footprint
    pub aabb: Aabb,
    /// Caller payload (usually an index or handle)
    pub item: T,
}

impl<T> Entry<T> {
    /// Create a new entry.
    #[must_use]
    pub fn new(item: T, aabb: Aabb) -> Self {
        Self { aabb, item }
    }
}

/// State of a quad-tree node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeState<T> {
    /// Leaf node holding entries directly
    Leaf {
        /// Entries stored in this leaf
        entries: Vec<Entry<T>>,
    },
    /// Internal node with four children
    Internal {
        /// Children indexed by [`Aabb::quadrant_index`]
        children: Box<[QuadNode<T>; 4]>,
        /// Entries whose box crosses a split line of this node
        straddlers: Vec<Entry<T>>,
    },
}

impl<T> Default for NodeState<T> {
    fn default() -> Self {
        Self::Leaf {
            entries: Vec::new(),
        }
    }
}

/// A node in the quad-tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadNode<T> {
    /// Spatial bounds of this node
    pub bounds: Aabb,
    /// Depth in the tree (0 = root)
    pub depth: u8,
    /// Node state (leaf or internal)
    pub state: NodeState<T>,
}

impl<T> QuadNode<T> {
    /// Create a new empty leaf.
    #[must_use]
    pub fn new(bounds: Aabb, depth: u8) -> Self {
        Self {
            bounds,
            depth,
            state: NodeState::default(),
        }
    }

    /// Check if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.state, NodeState::Leaf { .. })
    }

    /// Check if this node is internal (has children).
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self.state, NodeState::Internal { .. })
    }

    /// Entries held by this node itself (leaf entries or straddlers).
    #[must_use]
    pub fn entries(&self) -> &[Entry<T>] {
        match &self.state {
            NodeState::Leaf { entries } => entries,
            NodeState::Internal { straddlers, .. } => straddlers,
        }
    }

    /// Mutable access to the entries held by this node itself.
    pub fn entries_mut(&mut self) -> &mut Vec<Entry<T>> {
        match &mut self.state {
            NodeState::Leaf { entries } => entries,
            NodeState::Internal { straddlers, .. } => straddlers,
        }
    }

    /// Get children if this is an internal node.
    #[must_use]
    pub fn children(&self) -> Option<&[QuadNode<T>; 4]> {
        match &self.state {
            NodeState::Internal { children, .. } => Some(children),
            NodeState::Leaf { .. } => None,
        }
    }

    /// Get mutable children if this is an internal node.
    pub fn children_mut(&mut self) -> Option<&mut [QuadNode<T>; 4]> {
        match &mut self.state {
            NodeState::Internal { children, .. } => Some(children),
            NodeState::Leaf { .. } => None,
        }
    }

    /// Convert this leaf into an internal node with four empty children.
    ///
    /// Returns the entries the leaf was holding; the caller re-inserts them
    /// so that each one lands in a child or among the straddlers.
    /// Splitting an internal node is a no-op returning an empty vector.
    pub fn split(&mut self) -> Vec<Entry<T>> {
        let entries = match &mut self.state {
            NodeState::Leaf { entries } => std::mem::take(entries),
            NodeState::Internal { .. } => return Vec::new(), // Already internal
        };

        let children: [QuadNode<T>; 4] = std::array::from_fn(|i| {
            QuadNode::new(self.bounds.child_bounds(i), self.depth + 1)
        });

        self.state = NodeState::Internal {
            children: Box::new(children),
            straddlers: Vec::new(),
        };
        entries
    }

    /// Total number of entries in this subtree.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        let own = self.entries().len();
        own + self
            .children()
            .map_or(0, |children| children.iter().map(QuadNode::entry_count).sum())
    }

    /// Get the side length of this node (shorter side for non-square worlds).
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.bounds.min_side()
    }
}
