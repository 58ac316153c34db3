//! Test setup utilities.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::arena::Arena;
use crate::collision::{ColliderType, CollisionDispatcher, ReactionContext, ReactionRegistry};
use crate::config::SimConfig;
use crate::entity::{ActorState, Entity, EntityId, FoodState, OrganismState, Transform};
use crate::resources::ResourceCatalog;
use crate::simulation::Simulation;

// =============================================================================
// Configs
// =============================================================================

/// Config with no initial population, no food drops, and roomy caps.
pub fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.initial_organisms = 0;
    config.initial_food = 0;
    config.food.spawn_interval = 1.0e6;
    config.limits.max_organisms = 1_000;
    config.limits.max_food = 1_000;
    config
}

/// Config whose organisms stand still and never age, starve, or breed.
pub fn frozen_config() -> SimConfig {
    let mut config = quiet_config();
    config.organism.movement_speed = 0.0;
    config.organism.metabolism = 0.0;
    config.organism.lifespan = 1.0e6;
    config.organism.reproduction_threshold = 1.0e6;
    config.food.duration = 1.0e6;
    config
}

// =============================================================================
// Simulation setup
// =============================================================================

/// Simulation with the default reactions and resources.
pub fn simulation(config: SimConfig) -> Simulation {
    Simulation::new(
        config,
        ReactionRegistry::with_defaults(),
        Box::new(ResourceCatalog::with_defaults()),
    )
    .expect("valid config")
}

/// Simulation with a custom registry.
pub fn simulation_with(config: SimConfig, registry: ReactionRegistry) -> Simulation {
    Simulation::new(config, registry, Box::new(ResourceCatalog::with_defaults())).expect("valid config")
}

// =============================================================================
// Bare arena setup
// =============================================================================

/// Arena built from [`quiet_config`].
pub fn bare_arena() -> Arena {
    Arena::new(&quiet_config())
}

/// Organism with only a collider of `radius`.
pub fn organism_body(arena: &mut Arena, position: Vec2, radius: f32) -> EntityId {
    arena
        .spawn_with_collider(
            ActorState::Organism(OrganismState::new("body")),
            Transform::new(position, 0.0),
            radius,
        )
        .expect("below cap")
}

/// Food item with only a collider of `radius`.
pub fn food_body(arena: &mut Arena, position: Vec2, radius: f32) -> EntityId {
    arena
        .spawn_with_collider(ActorState::Food(FoodState::default()), Transform::new(position, 0.0), radius)
        .expect("below cap")
}

/// Refreshes colliders, rebuilds the index, and dispatches one frame.
pub fn collide(arena: &mut Arena, dispatcher: &mut CollisionDispatcher, registry: &ReactionRegistry) {
    arena.refresh_colliders();
    dispatcher.rebuild(arena);
    let ctx = ReactionContext {
        dt: 1.0 / 60.0,
        frame: arena.current_frame(),
    };
    dispatcher.dispatch(arena, registry, &ctx);
}

// =============================================================================
// Reaction recording
// =============================================================================

/// Shared log of `(first, second)` pairs a reaction was invoked with.
pub type CallLog = Rc<RefCell<Vec<(EntityId, EntityId)>>>;

/// Registry whose reaction for `{a, b}` only records its arguments.
pub fn recording_registry(a: ColliderType, b: ColliderType) -> (ReactionRegistry, CallLog) {
    let log: CallLog = Rc::default();
    let sink = Rc::clone(&log);
    let mut registry = ReactionRegistry::new();
    registry.register(a, b, move |first: &mut Entity, second: &mut Entity, _: &ReactionContext| {
        sink.borrow_mut().push((first.id(), second.id()));
    });
    (registry, log)
}

// =============================================================================
// Snapshots
// =============================================================================

/// Observable state of one entity, for comparing runs.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    /// Entity id
    pub id: EntityId,
    /// Position
    pub position: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Actor state
    pub state: ActorState,
    /// Whether the organism is dead
    pub dead: bool,
}

/// Snapshot of every entity in id order.
pub fn snapshot(arena: &Arena) -> Vec<EntitySnapshot> {
    arena
        .entities_sorted()
        .map(|e| EntitySnapshot {
            id: e.id(),
            position: e.position(),
            rotation: e.rotation(),
            state: e.state().clone(),
            dead: e.is_dead(),
        })
        .collect()
}

/// Owners of the records in the dispatcher's current snapshot.
pub fn indexed_owners(dispatcher: &CollisionDispatcher) -> Vec<EntityId> {
    dispatcher.records().iter().map(|r| r.owner).collect()
}
