//! Arena module: the entity list and its lifecycle.
//!
//! The Arena owns every entity in the sandbox. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - The spawn boundary (population limits and lifecycle hooks)
//! - Deferred destruction: entities are flagged during the frame and removed
//!   in one pass afterwards
//!
//! # Lifecycle
//!
//! ```text
//! Alive ──mark_for_destruction──▶ MarkedForDestruction ──remove_destroyed──▶ Destroyed
//! ```
//!
//! Nothing removes an entity without passing through the marked state, and
//! [`remove_destroyed`](Arena::remove_destroyed) is the only place entities
//! leave the arena. This keeps entity references stable for the whole frame,
//! including while collision reactions run.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use vivarium_core::arena::Arena;
//! use vivarium_core::config::SimConfig;
//! use vivarium_core::entity::{ActorState, FoodState, Transform};
//!
//! let mut arena = Arena::new(&SimConfig::default());
//! let food = arena
//!     .spawn_with_collider(ActorState::Food(FoodState::default()), Transform::new(Vec2::new(5.0, 5.0), 0.0), 3.0)
//!     .unwrap();
//!
//! arena.mark_for_destruction(food);
//! assert!(arena.get(food).is_some());
//!
//! assert_eq!(arena.remove_destroyed(), vec![food]);
//! assert!(arena.get(food).is_none());
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use quadrant::Aabb;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collision::ColliderRecord;
use crate::config::SimConfig;
use crate::entity::{ActorKind, ActorState, Entity, EntityId, Transform};
use crate::error::SpawnError;
use crate::spawn::{Census, SpawnContext};

/// Container for all sandbox entities.
///
/// # Determinism
///
/// Entity ids are assigned monotonically and never reused, and storage is a
/// `BTreeMap`, so iterating the arena always visits entities in spawn order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Region entities live in.
    bounds: Aabb,
    /// Population limits and census.
    spawn: SpawnContext,
    /// Current simulation frame.
    frame: u64,
}

impl Arena {
    /// Creates an empty arena with the config's bounds and population limits.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        Self {
            next_id: 0,
            entities: BTreeMap::new(),
            bounds: config.bounds,
            spawn: SpawnContext::new(config.limits),
            frame: 0,
        }
    }

    /// Spawns an entity.
    ///
    /// `assemble` receives the new entity (id already assigned) to attach its
    /// components before it is stored. The id is only consumed on success.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Refused`] if the population limit for the
    /// state's kind is reached; the arena is unchanged.
    pub fn spawn<F>(&mut self, state: ActorState, transform: Transform, assemble: F) -> Result<EntityId, SpawnError>
    where
        F: FnOnce(&mut Entity),
    {
        if !state.can_spawn(&self.spawn) {
            debug!(kind = %state.kind(), "spawn refused by population limit");
            return Err(SpawnError::Refused { kind: state.kind() });
        }

        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let mut entity = Entity::new(id, state, transform);
        assemble(&mut entity);
        entity.state().on_spawn(&mut self.spawn);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Spawns an entity whose only component is a collider.
    ///
    /// # Errors
    ///
    /// As [`spawn`](Self::spawn).
    pub fn spawn_with_collider(
        &mut self,
        state: ActorState,
        transform: Transform,
        base_radius: f32,
    ) -> Result<EntityId, SpawnError> {
        self.spawn(state, transform, |entity| entity.attach_collider(base_radius))
    }

    /// Flags an entity for removal at the end of the frame.
    ///
    /// Returns `true` if the flag was newly set, `false` if the entity is
    /// unknown or already flagged.
    pub fn mark_for_destruction(&mut self, id: EntityId) -> bool {
        self.entities
            .get_mut(&id)
            .is_some_and(Entity::mark_for_destruction)
    }

    /// Removes every flagged entity.
    ///
    /// Each removed entity gets its `on_destruction` hook and has its
    /// components purged. Returns the removed ids in ascending order.
    pub fn remove_destroyed(&mut self) -> Vec<EntityId> {
        let mut removed = Vec::new();
        let spawn = &mut self.spawn;
        self.entities.retain(|&id, entity| {
            if !entity.is_pending_destruction() {
                return true;
            }
            entity.state().on_destruction(spawn);
            entity.purge_components();
            removed.push(id);
            false
        });
        if !removed.is_empty() {
            debug!(count = removed.len(), frame = self.frame, "removed destroyed entities");
        }
        removed
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns mutable references to two distinct entities, in argument order.
    ///
    /// `None` if the ids are equal or either is unknown.
    #[must_use]
    pub fn get_pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        if a == b {
            return None;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let mut range = self.entities.range_mut(low..=high);
        let (&first_id, first) = range.next()?;
        let (&last_id, last) = range.next_back()?;
        if first_id != low || last_id != high {
            return None;
        }
        if a < b {
            Some((first, last))
        } else {
            Some((last, first))
        }
    }

    /// True if the arena holds `id`.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns an iterator over entity IDs in deterministic (sorted) order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in deterministic (sorted by ID) order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over mutable entities in deterministic order.
    pub fn entities_sorted_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the number of entities of `kind`.
    #[must_use]
    pub fn count_of(&self, kind: ActorKind) -> usize {
        self.entities.values().filter(|e| e.kind() == kind).count()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // -------------------------------------------------------------------------
    // Per-frame passes
    // -------------------------------------------------------------------------

    /// Recomputes every collider record from its owner's transform and size.
    ///
    /// Returns the number of colliders refreshed.
    pub fn refresh_colliders(&mut self) -> usize {
        self.entities
            .values_mut()
            .map(Entity::refresh_collider)
            .filter(|&refreshed| refreshed)
            .count()
    }

    /// Collider records of entities not flagged for removal, in id order.
    pub fn live_colliders(&self) -> impl Iterator<Item = &ColliderRecord> + '_ {
        self.entities
            .values()
            .filter(|e| !e.is_pending_destruction())
            .filter_map(Entity::collider)
    }

    /// Wraps positions that left the arena to the opposite edge.
    ///
    /// Returns the number of entities moved.
    pub fn wrap_positions(&mut self) -> usize {
        let bounds = self.bounds;
        if bounds.is_degenerate() {
            return 0;
        }
        let mut wrapped = 0;
        for entity in self.entities.values_mut() {
            let position = entity.position();
            let inside = wrap_point(position, &bounds);
            if inside != position {
                entity.set_position(inside);
                wrapped += 1;
            }
        }
        wrapped
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Region entities live in.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Current population counts.
    #[must_use]
    pub const fn census(&self) -> &Census {
        &self.spawn.census
    }

    /// Limits and census together.
    #[must_use]
    pub const fn spawn_context(&self) -> &SpawnContext {
        &self.spawn
    }

    /// Returns the current simulation frame.
    #[must_use]
    pub const fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Advances the frame counter.
    pub fn advance_frame(&mut self) {
        self.frame += 1;
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(&SimConfig::default())
    }
}

fn wrap_axis(value: f32, min: f32, max: f32) -> f32 {
    if value >= min && value < max {
        return value;
    }
    let span = max - min;
    let wrapped = min + (value - min).rem_euclid(span);
    // rem_euclid may round up to the span itself
    if wrapped >= max {
        min
    } else {
        wrapped
    }
}

fn wrap_point(point: Vec2, bounds: &Aabb) -> Vec2 {
    if !point.is_finite() {
        return bounds.center();
    }
    Vec2::new(
        wrap_axis(point.x, bounds.min.x, bounds.max.x),
        wrap_axis(point.y, bounds.min.y, bounds.max.y),
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FoodState, OrganismState};

    fn food() -> ActorState {
        ActorState::Food(FoodState::default())
    }

    fn organism() -> ActorState {
        ActorState::Organism(OrganismState::new("o"))
    }

    fn at(x: f32, y: f32) -> Transform {
        Transform::new(Vec2::new(x, y), 0.0)
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn ids_are_monotonic() {
            let mut arena = Arena::default();
            let a = arena.spawn(food(), at(0.0, 0.0), |_| {}).expect("fits");
            let b = arena.spawn(food(), at(0.0, 0.0), |_| {}).expect("fits");
            assert!(a < b);
            assert_eq!(arena.entity_ids_sorted().collect::<Vec<_>>(), vec![a, b]);
        }

        #[test]
        fn refused_spawn_does_not_consume_id() {
            let mut config = SimConfig::default();
            config.limits.max_organisms = 1;
            let mut arena = Arena::new(&config);

            let first = arena.spawn(organism(), at(0.0, 0.0), |_| {}).expect("fits");
            let refused = arena.spawn(organism(), at(0.0, 0.0), |_| {});
            assert_eq!(refused, Err(SpawnError::Refused { kind: ActorKind::Organism }));

            let next = arena.spawn(food(), at(0.0, 0.0), |_| {}).expect("food still fits");
            assert_eq!(next.as_u64(), first.as_u64() + 1);
        }

        #[test]
        fn census_tracks_spawns() {
            let mut arena = Arena::default();
            arena.spawn(organism(), at(0.0, 0.0), |_| {}).expect("fits");
            arena.spawn(food(), at(0.0, 0.0), |_| {}).expect("fits");
            assert_eq!(arena.census().organisms, 1);
            assert_eq!(arena.census().food, 1);
            assert_eq!(arena.count_of(ActorKind::Food), 1);
        }
    }

    mod destruction_tests {
        use super::*;

        #[test]
        fn marked_entities_stay_until_cleanup() {
            let mut arena = Arena::default();
            let id = arena.spawn_with_collider(food(), at(1.0, 1.0), 2.0).expect("fits");

            assert!(arena.mark_for_destruction(id));
            assert!(!arena.mark_for_destruction(id));
            assert!(arena.contains(id));
            assert_eq!(arena.live_colliders().count(), 0);

            assert_eq!(arena.remove_destroyed(), vec![id]);
            assert!(!arena.contains(id));
            assert!(arena.remove_destroyed().is_empty());
        }

        #[test]
        fn on_destruction_runs_once() {
            let mut arena = Arena::default();
            let id = arena.spawn(organism(), at(0.0, 0.0), |_| {}).expect("fits");
            arena.mark_for_destruction(id);
            arena.remove_destroyed();
            arena.remove_destroyed();

            assert_eq!(arena.census().organisms, 0);
            assert_eq!(arena.census().organisms_destroyed, 1);
        }

        #[test]
        fn mark_unknown_is_false() {
            let mut arena = Arena::default();
            assert!(!arena.mark_for_destruction(EntityId::new(404)));
        }
    }

    mod access_tests {
        use super::*;

        #[test]
        fn pair_mut_returns_argument_order() {
            let mut arena = Arena::default();
            let a = arena.spawn(food(), at(1.0, 0.0), |_| {}).expect("fits");
            let _middle = arena.spawn(food(), at(2.0, 0.0), |_| {}).expect("fits");
            let c = arena.spawn(food(), at(3.0, 0.0), |_| {}).expect("fits");

            let (x, y) = arena.get_pair_mut(c, a).expect("both exist");
            assert_eq!((x.id(), y.id()), (c, a));
            let (x, y) = arena.get_pair_mut(a, c).expect("both exist");
            assert_eq!((x.id(), y.id()), (a, c));
        }

        #[test]
        fn pair_mut_rejects_same_or_unknown() {
            let mut arena = Arena::default();
            let a = arena.spawn(food(), at(1.0, 0.0), |_| {}).expect("fits");
            assert!(arena.get_pair_mut(a, a).is_none());
            assert!(arena.get_pair_mut(a, EntityId::new(77)).is_none());
        }

        #[test]
        fn refresh_counts_colliders() {
            let mut arena = Arena::default();
            arena.spawn_with_collider(food(), at(1.0, 0.0), 2.0).expect("fits");
            arena.spawn(food(), at(1.0, 0.0), |_| {}).expect("fits");
            assert_eq!(arena.refresh_colliders(), 1);
        }
    }

    mod wrap_tests {
        use super::*;

        #[test]
        fn positions_wrap_to_opposite_edge() {
            let mut arena = Arena::default();
            let id = arena.spawn(food(), at(405.0, -10.0), |_| {}).expect("fits");
            assert_eq!(arena.wrap_positions(), 1);
            let p = arena.get(id).map(Entity::position).expect("exists");
            assert!((p - Vec2::new(5.0, 390.0)).length() < 1e-3);
        }

        #[test]
        fn inside_positions_are_untouched() {
            let mut arena = Arena::default();
            arena.spawn(food(), at(0.0, 399.0), |_| {}).expect("fits");
            assert_eq!(arena.wrap_positions(), 0);
        }

        #[test]
        fn non_finite_position_recenters() {
            let bounds = Aabb::new(0.0, 0.0, 10.0, 10.0);
            assert_eq!(wrap_point(Vec2::new(f32::NAN, 1.0), &bounds), Vec2::new(5.0, 5.0));
        }
    }
}
