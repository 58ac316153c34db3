//! Reaction registry keyed by unordered collider-type pairs.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use tracing::trace;

use crate::entity::Entity;

use super::collider::{ColliderType, CollisionPairKey};

/// Per-frame data handed to every reaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionContext {
    /// Frame duration in seconds
    pub dt: f32,
    /// Frame counter, starting at 0
    pub frame: u64,
}

/// Response to a confirmed contact between two entities.
///
/// `first` and `second` arrive in canonical order: the entity whose collider
/// type is lower comes first, and ties go to the lower entity id. A reaction
/// registered for `{Organism, Food}` therefore always sees the organism as
/// `first`, whichever order the types were registered in.
///
/// Reactions must not destroy entities directly. They flag them with
/// [`Entity::mark_for_destruction`]; removal happens after dispatch.
pub trait Reaction {
    /// Applies the reaction.
    fn react(&self, first: &mut Entity, second: &mut Entity, ctx: &ReactionContext);
}

impl<F> Reaction for F
where
    F: Fn(&mut Entity, &mut Entity, &ReactionContext),
{
    fn react(&self, first: &mut Entity, second: &mut Entity, ctx: &ReactionContext) {
        self(first, second, ctx);
    }
}

/// Maps collider-type pairs to reactions.
///
/// At most one reaction per unordered pair; registering again replaces it.
/// Pairs without a reaction are ignored by the dispatcher.
#[derive(Default)]
pub struct ReactionRegistry {
    reactions: HashMap<CollisionPairKey, Box<dyn Reaction>>,
}

impl ReactionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in sandbox reactions:
    /// organisms eat food and push each other apart.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ColliderType::Organism, ColliderType::Food, consume_food);
        registry.register(ColliderType::Organism, ColliderType::Organism, separate_organisms);
        registry
    }

    /// Registers `reaction` for the unordered pair `{a, b}`.
    ///
    /// Returns the reaction it replaced, if any.
    pub fn register<R>(&mut self, a: ColliderType, b: ColliderType, reaction: R) -> Option<Box<dyn Reaction>>
    where
        R: Reaction + 'static,
    {
        self.reactions.insert(CollisionPairKey::new(a, b), Box::new(reaction))
    }

    /// Removes the reaction for `{a, b}`.
    pub fn unregister(&mut self, a: ColliderType, b: ColliderType) -> Option<Box<dyn Reaction>> {
        self.reactions.remove(&CollisionPairKey::new(a, b))
    }

    /// Looks up the reaction for a key.
    #[must_use]
    pub fn get(&self, key: CollisionPairKey) -> Option<&dyn Reaction> {
        self.reactions
            .get(&key)
            .map(|reaction| &**reaction as &dyn Reaction)
    }

    /// True if `{a, b}` has a reaction.
    #[must_use]
    pub fn contains(&self, a: ColliderType, b: ColliderType) -> bool {
        self.reactions.contains_key(&CollisionPairKey::new(a, b))
    }

    /// Registered keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<CollisionPairKey> {
        let mut keys: Vec<_> = self.reactions.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }
}

impl fmt::Debug for ReactionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

/// `{Organism, Food}`: a living organism absorbs the food's energy and the
/// food is flagged for removal.
pub fn consume_food(organism: &mut Entity, food: &mut Entity, _ctx: &ReactionContext) {
    if !organism.is_alive() || food.is_pending_destruction() {
        return;
    }
    let Some(energy) = food.as_food().map(|f| f.energy) else {
        return;
    };
    let Some(state) = organism.as_organism_mut() else {
        return;
    };
    state.energy += energy;
    food.mark_for_destruction();
    trace!(organism = %organism.id(), food = %food.id(), energy, "food eaten");
}

/// `{Organism, Organism}`: overlapping bodies are pushed apart along the line
/// between their centers, each by half the overlap.
pub fn separate_organisms(a: &mut Entity, b: &mut Entity, _ctx: &ReactionContext) {
    let (Some((ca, ra)), Some((cb, rb))) = (a.collider_circle(), b.collider_circle()) else {
        return;
    };
    let offset = cb - ca;
    let distance = offset.length();
    let overlap = ra + rb - distance;
    if overlap <= 0.0 {
        return;
    }
    // Coincident centers have no direction; push along x
    let direction = if distance > f32::EPSILON {
        offset / distance
    } else {
        Vec2::X
    };
    let push = direction * (overlap * 0.5);
    a.translate(-push);
    b.translate(push);
}
