//! Rebuildable quad-tree.
//!
//! The tree is meant to be cleared and refilled every frame. Entries never
//! move between nodes after insertion except when a leaf splits.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::node::{Entry, NodeState, QuadNode};
use crate::query::QueryResult;
use crate::Aabb;

/// Configuration for the quad-tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadTreeConfig {
    /// World bounds (root region)
    pub bounds: Aabb,
    /// Entries a leaf may hold before it tries to split
    pub capacity: usize,
    /// Leaves whose shorter side is at or below this never split
    pub min_size: f32,
    /// Maximum tree depth
    pub max_depth: u8,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            bounds: Aabb::default(),
            capacity: 8,
            min_size: 8.0,
            max_depth: 8,
        }
    }
}

impl QuadTreeConfig {
    /// Create a config with the given world bounds and default thresholds.
    #[must_use]
    pub fn with_bounds(bounds: Aabb) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    /// Return a copy with degenerate values clamped to something usable.
    ///
    /// Every clamp is logged at warn level.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        if !(config.min_size.is_finite() && config.min_size > 0.0) {
            warn!(min_size = config.min_size, "quad-tree min_size must be positive; using 1.0");
            config.min_size = 1.0;
        }
        if config.capacity == 0 {
            warn!("quad-tree capacity of zero; using 1");
            config.capacity = 1;
        }
        if config.bounds.is_degenerate() {
            let clamped = config.bounds.expanded_to(config.min_size);
            warn!(bounds = ?config.bounds, ?clamped, "degenerate quad-tree region; clamping");
            config.bounds = clamped;
        }
        config
    }
}

/// Where an inserted entry ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Stored in a leaf
    Leaf,
    /// Stored at an internal node because it crosses a split line
    Hoisted,
    /// Outside the world (or malformed); stored at the root
    OutsideBounds,
}

/// Statistics about the quad-tree structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Total number of nodes
    pub node_count: usize,
    /// Number of leaf nodes
    pub leaf_count: usize,
    /// Number of stored entries
    pub entry_count: usize,
    /// Entries held by internal nodes
    pub hoisted_count: usize,
    /// Entries that fell outside the world bounds
    pub outside_count: usize,
    /// Deepest node depth
    pub max_depth: u8,
}

/// Quad-tree over caller-provided items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadTree<T> {
    /// Root node
    root: QuadNode<T>,
    /// Configuration (already sanitized)
    config: QuadTreeConfig,
    /// Number of stored entries
    len: usize,
    /// Entries stored at the root because they were outside the world
    outside: usize,
}

impl<T> QuadTree<T> {
    /// Create an empty quad-tree.
    #[must_use]
    pub fn new(config: QuadTreeConfig) -> Self {
        let config = config.sanitized();
        Self {
            root: QuadNode::new(config.bounds, 0),
            config,
            len: 0,
            outside: 0,
        }
    }

    /// Create a quad-tree with default thresholds.
    #[must_use]
    pub fn with_bounds(bounds: Aabb) -> Self {
        Self::new(QuadTreeConfig::with_bounds(bounds))
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Get the root node.
    #[must_use]
    pub fn root(&self) -> &QuadNode<T> {
        &self.root
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reset to a single empty root leaf covering the world.
    pub fn clear(&mut self) {
        self.root = QuadNode::new(self.config.bounds, 0);
        self.len = 0;
        self.outside = 0;
    }

    /// Reset and change the world bounds.
    pub fn reset_bounds(&mut self, bounds: Aabb) {
        self.config = QuadTreeConfig {
            bounds,
            ..self.config.clone()
        }
        .sanitized();
        self.clear();
    }

    /// Insert an item occupying `aabb`.
    ///
    /// Boxes that are not fully inside the world, or are malformed, are kept
    /// at the root so that they are still found by queries.
    pub fn insert(&mut self, item: T, aabb: Aabb) -> Placement {
        self.len += 1;
        let entry = Entry::new(item, aabb);

        if !aabb.is_valid() || !self.root.bounds.contains(&aabb) {
            warn!(?aabb, world = ?self.root.bounds, "entry outside quad-tree bounds; storing at root");
            self.outside += 1;
            self.root.entries_mut().push(entry);
            return Placement::OutsideBounds;
        }

        Self::insert_recursive(&mut self.root, entry, &self.config)
    }

    fn insert_recursive(node: &mut QuadNode<T>, entry: Entry<T>, config: &QuadTreeConfig) -> Placement {
        if let NodeState::Internal { children, straddlers } = &mut node.state {
            return match node.bounds.fitting_quadrant(&entry.aabb) {
                Some(quadrant) => Self::insert_recursive(&mut children[quadrant], entry, config),
                None => {
                    straddlers.push(entry);
                    Placement::Hoisted
                }
            };
        }

        let splittable =
            node.depth < config.max_depth && node.cell_size() > config.min_size;
        if node.entries().len() < config.capacity || !splittable {
            node.entries_mut().push(entry);
            return Placement::Leaf;
        }

        // Over capacity: split and redistribute what the leaf was holding.
        for existing in node.split() {
            Self::insert_recursive(node, existing, config);
        }
        Self::insert_recursive(node, entry, config)
    }

    /// Collect every item whose box intersects `region`.
    #[must_use]
    pub fn query(&self, region: &Aabb) -> Vec<&T> {
        self.query_detailed(region).items
    }

    /// Like [`query`](Self::query) but also reports traversal counters.
    #[must_use]
    pub fn query_detailed(&self, region: &Aabb) -> QueryResult<'_, T> {
        let mut result = QueryResult::default();
        Self::query_recursive(&self.root, region, true, &mut result);
        result
    }

    fn query_recursive<'a>(
        node: &'a QuadNode<T>,
        region: &Aabb,
        is_root: bool,
        result: &mut QueryResult<'a, T>,
    ) {
        // The root may hold out-of-bounds entries, so it is always visited.
        if !is_root && !node.bounds.intersects(region) {
            return;
        }
        result.nodes_visited += 1;

        for entry in node.entries() {
            result.entries_tested += 1;
            if entry.aabb.intersects(region) {
                result.items.push(&entry.item);
            }
        }

        if let Some(children) = node.children() {
            for child in children.iter() {
                Self::query_recursive(child, region, false, result);
            }
        }
    }

    /// Visit every entry whose box intersects `region` without allocating.
    pub fn for_each_in<'a, F>(&'a self, region: &Aabb, mut visitor: F)
    where
        F: FnMut(&'a Entry<T>),
    {
        Self::visit_recursive(&self.root, region, true, &mut visitor);
    }

    fn visit_recursive<'a, F>(node: &'a QuadNode<T>, region: &Aabb, is_root: bool, visitor: &mut F)
    where
        F: FnMut(&'a Entry<T>),
    {
        if !is_root && !node.bounds.intersects(region) {
            return;
        }
        for entry in node.entries() {
            if entry.aabb.intersects(region) {
                visitor(entry);
            }
        }
        if let Some(children) = node.children() {
            for child in children.iter() {
                Self::visit_recursive(child, region, false, visitor);
            }
        }
    }

    /// Get statistics.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            outside_count: self.outside,
            ..TreeStats::default()
        };
        Self::stats_recursive(&self.root, &mut stats);
        stats
    }

    fn stats_recursive(node: &QuadNode<T>, stats: &mut TreeStats) {
        stats.node_count += 1;
        stats.entry_count += node.entries().len();
        stats.max_depth = stats.max_depth.max(node.depth);
        match node.children() {
            Some(children) => {
                stats.hoisted_count += node.entries().len();
                for child in children.iter() {
                    Self::stats_recursive(child, stats);
                }
            }
            None => stats.leaf_count += 1,
        }
    }
}

impl<T> Default for QuadTree<T> {
    fn default() -> Self {
        Self::new(QuadTreeConfig::default())
    }
}
