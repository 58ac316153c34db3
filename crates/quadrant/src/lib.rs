//! # Quadrant
//!
//! Rebuildable 2D quad-tree substrate for broad-phase collision narrowing.
//!
//! Quadrant stores axis-aligned boxes in a hierarchical partition of a
//! rectangular world and answers "which stored boxes can overlap this
//! region" queries without scanning every entry. It is designed to be thrown
//! away and rebuilt every frame:
//!
//! - **Cheap rebuild**: `clear()` keeps the root allocation, inserts are O(log N)
//! - **No duplication**: an entry lives in exactly one node; boxes that cross a
//!   split line stay at the parent ("hoisted") instead of being copied
//! - **Forgiving input**: degenerate configuration is clamped and boxes outside
//!   the world are kept at the root, both with a warning
//!
//! ## Quick Start
//!
//! ```
//! use glam::Vec2;
//! use quadrant::{Aabb, QuadTree, QuadTreeConfig};
//!
//! let mut tree = QuadTree::new(QuadTreeConfig::with_bounds(Aabb::new(0.0, 0.0, 400.0, 400.0)));
//!
//! tree.insert(1_u32, Aabb::from_circle(Vec2::new(50.0, 50.0), 5.0));
//! tree.insert(2_u32, Aabb::from_circle(Vec2::new(300.0, 300.0), 5.0));
//!
//! let hits = tree.query(&Aabb::new(40.0, 40.0, 20.0, 20.0));
//! assert_eq!(hits, vec![&1]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod node;
pub mod query;
pub mod tree;

// Re-exports for convenience
pub use node::{Entry, NodeState, QuadNode};
pub use query::QueryResult;
pub use tree::{Placement, QuadTree, QuadTreeConfig, TreeStats};

use glam::Vec2;

/// Axis-aligned bounding box.
///
/// Edges are inclusive: two boxes that share an edge intersect.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    /// Minimum corner (top-left in screen coordinates)
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Aabb {
    /// Create a box from its top-left corner and size.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Create bounds from min/max corners.
    #[must_use]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest box containing the circle (`center`, `radius`).
    #[must_use]
    pub fn from_circle(center: Vec2, radius: f32) -> Self {
        let r = Vec2::splat(radius.abs());
        Self {
            min: center - r,
            max: center + r,
        }
    }

    /// Left edge.
    #[must_use]
    pub fn x(&self) -> f32 {
        self.min.x
    }

    /// Top edge.
    #[must_use]
    pub fn y(&self) -> f32 {
        self.min.y
    }

    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Get the center of the bounds.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the bounds.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Length of the shorter side.
    #[must_use]
    pub fn min_side(&self) -> f32 {
        self.size().min_element()
    }

    /// True if every coordinate is finite and `min <= max` on both axes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    /// True if the box has no area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !self.is_valid() || self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Check if a point is inside the bounds.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Check if `other` lies entirely inside this box.
    #[must_use]
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Check if the two boxes overlap (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Check if this box contains the whole circle (`center`, `radius`).
    #[must_use]
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        self.contains(&Self::from_circle(center, radius))
    }

    /// Get the quadrant index for a point (0-3).
    ///
    /// Bit 0 is set for the right half, bit 1 for the bottom half.
    #[must_use]
    pub fn quadrant_index(&self, point: Vec2) -> usize {
        let center = self.center();
        let mut index = 0;
        if point.x >= center.x {
            index |= 1;
        }
        if point.y >= center.y {
            index |= 2;
        }
        index
    }

    /// Get the bounds of a child quadrant.
    #[must_use]
    pub fn child_bounds(&self, quadrant: usize) -> Self {
        let center = self.center();
        let min = Vec2::new(
            if quadrant & 1 == 0 { self.min.x } else { center.x },
            if quadrant & 2 == 0 { self.min.y } else { center.y },
        );
        let max = Vec2::new(
            if quadrant & 1 == 0 { center.x } else { self.max.x },
            if quadrant & 2 == 0 { center.y } else { self.max.y },
        );
        Self { min, max }
    }

    /// The single child quadrant that fully contains `other`, if any.
    ///
    /// Returns `None` when `other` crosses one of the split lines or is not
    /// inside this box at all; such boxes are kept by the parent node.
    #[must_use]
    pub fn fitting_quadrant(&self, other: &Aabb) -> Option<usize> {
        if !self.contains(other) {
            return None;
        }
        let center = self.center();
        let column = if other.max.x <= center.x {
            0
        } else if other.min.x >= center.x {
            1
        } else {
            return None;
        };
        let row = if other.max.y <= center.y {
            0
        } else if other.min.y >= center.y {
            2
        } else {
            return None;
        };
        Some(column | row)
    }

    /// Grow the box by `margin` on every side.
    ///
    /// Negative or non-finite margins leave the box unchanged.
    #[must_use]
    pub fn expanded_by(&self, margin: f32) -> Self {
        if !(margin.is_finite() && margin > 0.0) {
            return *self;
        }
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    /// Grow the box around its center so that neither side is below `min_side`.
    #[must_use]
    pub fn expanded_to(&self, min_side: f32) -> Self {
        let center = if self.center().is_finite() {
            self.center()
        } else {
            Vec2::ZERO
        };
        let half = Vec2::new(
            self.width().max(min_side),
            self.height().max(min_side),
        ) * 0.5;
        let half = if half.is_finite() {
            half
        } else {
            Vec2::splat(min_side * 0.5)
        };
        Self {
            min: center - half,
            max: center + half,
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1024.0, 1024.0)
    }
}
