//! Collider records and pair keys.

use std::fmt;

use glam::Vec2;
use quadrant::Aabb;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Collider type tag used to pick a reaction for a contact.
///
/// The declaration order is the canonical order: a pair key always lists
/// the lower variant first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColliderType {
    /// Organism body
    Organism,
    /// Food pellet
    Food,
}

impl ColliderType {
    /// Every collider type in canonical order.
    pub const ALL: [ColliderType; 2] = [Self::Organism, Self::Food];
}

impl fmt::Display for ColliderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organism => write!(f, "Organism"),
            Self::Food => write!(f, "Food"),
        }
    }
}

/// Per-frame snapshot of an entity's physical footprint.
///
/// After [`refresh`](Self::refresh), `aabb` always contains the circle
/// (`center`, `radius`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderRecord {
    /// Bounding box fed to the quad-tree
    pub aabb: Aabb,
    /// Circle center used by the narrow phase
    pub center: Vec2,
    /// Circle radius used by the narrow phase
    pub radius: f32,
    /// Collider type
    pub kind: ColliderType,
    /// Owning entity
    pub owner: EntityId,
}

impl ColliderRecord {
    /// Creates a zero-sized record at the origin.
    #[must_use]
    pub fn new(owner: EntityId, kind: ColliderType) -> Self {
        Self {
            aabb: Aabb::from_circle(Vec2::ZERO, 0.0),
            center: Vec2::ZERO,
            radius: 0.0,
            kind,
            owner,
        }
    }

    /// Moves the circle and recomputes the bounding box around it.
    ///
    /// Negative radii are treated as their magnitude.
    pub fn refresh(&mut self, center: Vec2, radius: f32) {
        self.center = center;
        self.radius = radius.abs();
        self.aabb = Aabb::from_circle(center, self.radius);
    }

    /// Circle-circle test; touching circles overlap.
    #[must_use]
    pub fn overlaps(&self, other: &ColliderRecord) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    /// Sort key placing records in canonical reaction order.
    #[must_use]
    pub fn canonical_key(&self) -> (ColliderType, EntityId) {
        (self.kind, self.owner)
    }
}

/// Unordered pair of collider types.
///
/// `CollisionPairKey::new(a, b) == CollisionPairKey::new(b, a)` for all
/// `a`, `b`; the lower type is always stored first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollisionPairKey {
    first: ColliderType,
    second: ColliderType,
}

impl CollisionPairKey {
    /// Builds the canonical key for the two types.
    #[must_use]
    pub fn new(a: ColliderType, b: ColliderType) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The lower type.
    #[must_use]
    pub const fn first(&self) -> ColliderType {
        self.first
    }

    /// The higher type.
    #[must_use]
    pub const fn second(&self) -> ColliderType {
        self.second
    }

    /// True for a self-pair such as `{Organism, Organism}`.
    #[must_use]
    pub fn is_homogeneous(&self) -> bool {
        self.first == self.second
    }

    /// True if either side is `kind`.
    #[must_use]
    pub fn involves(&self, kind: ColliderType) -> bool {
        self.first == kind || self.second == kind
    }
}

impl fmt::Display for CollisionPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.first, self.second)
    }
}
