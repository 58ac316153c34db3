//! Frame loop.
//!
//! `Simulation` owns the arena, the collision dispatcher and the reaction
//! registry, and advances them through one fixed sequence per frame:
//!
//! 1. **UPDATE**: built-in actor behavior, then each injected [`Controller`]
//! 2. **WRAP**: positions that left the arena reappear on the opposite edge
//! 3. **SPAWN**: queued offspring and due food drops go through the factory
//! 4. **REFRESH**: colliders follow their owners' transforms
//! 5. **INDEX**: the quad-tree is rebuilt from the live colliders
//! 6. **DISPATCH**: overlapping pairs run their registered reaction
//! 7. **CLEANUP**: entities flagged for destruction leave the arena
//!
//! Rendering is on demand through [`Simulation::render`].
//!
//! # Determinism
//!
//! Entities are visited in id order everywhere and every random choice comes
//! from generators seeded by [`SimConfig::seed`], so two simulations built
//! from the same config and fed the same controllers evolve identically.
//!
//! # Example
//!
//! ```
//! use vivarium_core::config::SimConfig;
//! use vivarium_core::collision::ReactionRegistry;
//! use vivarium_core::resources::ResourceCatalog;
//! use vivarium_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(
//!     SimConfig::default(),
//!     ReactionRegistry::with_defaults(),
//!     Box::new(ResourceCatalog::with_defaults()),
//! )
//! .unwrap();
//! sim.populate();
//!
//! for _ in 0..10 {
//!     sim.step();
//! }
//!
//! assert_eq!(sim.frame(), 10);
//! ```

use std::fmt;

use glam::Vec2;
use quadrant::TreeStats;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::arena::Arena;
use crate::collision::{CollisionDispatcher, DispatchReport, ReactionContext, ReactionRegistry};
use crate::config::SimConfig;
use crate::entity::{Entity, EntityId, Offspring, Transform};
use crate::error::{ConfigError, SpawnError};
use crate::render::{render_arena, Renderer};
use crate::resources::ResourceProvider;
use crate::spawn::{random_point, ActorFactory, FoodSpawner};

/// Stream offset separating the food spawner from the placement generator.
const FOOD_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

// =============================================================================
// Controller
// =============================================================================

/// Externally supplied behavior run on every living entity after its
/// built-in update and before collider refresh.
pub trait Controller {
    /// Adjusts `entity` for a frame of length `dt`.
    fn update(&mut self, entity: &mut Entity, dt: f32);
}

impl<F> Controller for F
where
    F: FnMut(&mut Entity, f32),
{
    fn update(&mut self, entity: &mut Entity, dt: f32) {
        self(entity, dt);
    }
}

// =============================================================================
// FrameReport
// =============================================================================

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number the report describes
    pub frame: u64,
    /// Offspring spawned
    pub births: usize,
    /// Food items dropped
    pub food_spawned: usize,
    /// Spawns refused by a population cap or a missing resource
    pub refused: usize,
    /// Entities wrapped across an arena edge
    pub wrapped: usize,
    /// Entities removed during cleanup, in id order
    pub destroyed: Vec<EntityId>,
    /// Collision counters
    pub dispatch: DispatchReport,
    /// Shape of the rebuilt index
    pub index: TreeStats,
}

// =============================================================================
// Simulation
// =============================================================================

/// The frame loop.
pub struct Simulation {
    config: SimConfig,
    arena: Arena,
    dispatcher: CollisionDispatcher,
    registry: ReactionRegistry,
    resources: Box<dyn ResourceProvider>,
    factory: ActorFactory,
    food_spawner: FoodSpawner,
    controllers: Vec<Box<dyn Controller>>,
    rng: ChaCha8Rng,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("frame", &self.arena.current_frame())
            .field("arena", &self.arena)
            .field("registry", &self.registry)
            .field("controllers", &format!("[{} controllers]", self.controllers.len()))
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates an empty simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation.
    pub fn new(
        config: SimConfig,
        registry: ReactionRegistry,
        resources: Box<dyn ResourceProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            arena: Arena::new(&config),
            dispatcher: CollisionDispatcher::new(config.quadtree_config()),
            registry,
            resources,
            factory: ActorFactory::new(&config),
            food_spawner: FoodSpawner::new(config.food.spawn_interval, config.seed ^ FOOD_STREAM)
                .with_max_drops(config.limits.max_food),
            controllers: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        })
    }

    /// Adds a controller; controllers run in insertion order.
    pub fn add_controller<C: Controller + 'static>(&mut self, controller: C) {
        self.controllers.push(Box::new(controller));
    }

    /// Places the configured initial organisms and food at seeded random
    /// positions.
    ///
    /// Returns the ids spawned. Spawns refused by a cap or a missing
    /// resource are logged and skipped.
    pub fn populate(&mut self) -> Vec<EntityId> {
        let bounds = *self.arena.bounds();
        let mut spawned = Vec::with_capacity(self.config.initial_organisms + self.config.initial_food);

        for n in 1..=self.config.initial_organisms {
            let position = random_point(&mut self.rng, &bounds);
            let rotation = self.rng.gen_range(0.0..360.0);
            let name = format!("Organism {n}");
            let result = self.factory.spawn_default_organism(
                &mut self.arena,
                self.resources.as_ref(),
                &name,
                Transform::new(position, rotation),
            );
            if let Some(id) = log_spawn(result) {
                spawned.push(id);
            }
        }
        for _ in 0..self.config.initial_food {
            let position = random_point(&mut self.rng, &bounds);
            let result = self.factory.spawn_food(&mut self.arena, self.resources.as_ref(), position);
            if let Some(id) = log_spawn(result) {
                spawned.push(id);
            }
        }

        debug!(count = spawned.len(), "arena populated");
        spawned
    }

    /// Spawns a default organism at `position`.
    ///
    /// # Errors
    ///
    /// See [`ActorFactory::spawn_organism`].
    pub fn spawn_organism(&mut self, name: &str, position: Vec2, rotation: f32) -> Result<EntityId, SpawnError> {
        self.factory.spawn_default_organism(
            &mut self.arena,
            self.resources.as_ref(),
            name,
            Transform::new(position, rotation),
        )
    }

    /// Spawns a food item at `position`.
    ///
    /// # Errors
    ///
    /// See [`ActorFactory::spawn_food`].
    pub fn spawn_food(&mut self, position: Vec2) -> Result<EntityId, SpawnError> {
        self.factory.spawn_food(&mut self.arena, self.resources.as_ref(), position)
    }

    /// Advances one frame of [`SimConfig::fixed_dt`] seconds.
    pub fn step(&mut self) -> FrameReport {
        self.advance(self.config.fixed_dt)
    }

    /// Advances one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> FrameReport {
        let frame = self.arena.current_frame();
        let mut report = FrameReport {
            frame,
            ..FrameReport::default()
        };

        // UPDATE
        let offspring = self.update_entities(dt);

        // WRAP
        report.wrapped = self.arena.wrap_positions();

        // SPAWN
        for child in offspring {
            let result = self.factory.spawn_offspring(&mut self.arena, self.resources.as_ref(), child);
            match log_spawn(result) {
                Some(_) => report.births += 1,
                None => report.refused += 1,
            }
        }
        let bounds = *self.arena.bounds();
        for position in self.food_spawner.tick(dt, &bounds) {
            let result = self.factory.spawn_food(&mut self.arena, self.resources.as_ref(), position);
            match log_spawn(result) {
                Some(_) => report.food_spawned += 1,
                None => report.refused += 1,
            }
        }

        // REFRESH + INDEX
        self.arena.refresh_colliders();
        report.index = self.dispatcher.rebuild(&self.arena);

        // DISPATCH
        let ctx = ReactionContext { dt, frame };
        report.dispatch = self.dispatcher.dispatch(&mut self.arena, &self.registry, &ctx);

        // CLEANUP
        report.destroyed = self.arena.remove_destroyed();
        self.arena.advance_frame();

        debug!(
            frame,
            entities = self.arena.entity_count(),
            births = report.births,
            food = report.food_spawned,
            destroyed = report.destroyed.len(),
            "frame complete"
        );
        report
    }

    fn update_entities(&mut self, dt: f32) -> Vec<Offspring> {
        let mut offspring = Vec::new();
        for entity in self.arena.entities_sorted_mut() {
            if let Some(child) = entity.update(dt) {
                offspring.push(child);
            }
            if entity.is_pending_destruction() || entity.is_dead() {
                continue;
            }
            for controller in &mut self.controllers {
                controller.update(entity, dt);
            }
        }
        offspring
    }

    /// Hands every visible drawable to `renderer`; returns the number issued.
    pub fn render(&self, renderer: &mut dyn Renderer) -> usize {
        render_arena(&self.arena, renderer)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The entity list.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable entity list, for scripted setups.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Dispatcher state from the last frame.
    #[must_use]
    pub fn dispatcher(&self) -> &CollisionDispatcher {
        &self.dispatcher
    }

    /// Reactions in use.
    #[must_use]
    pub fn registry(&self) -> &ReactionRegistry {
        &self.registry
    }

    /// Configuration the simulation was built from.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Frames completed so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.arena.current_frame()
    }
}

fn log_spawn(result: Result<EntityId, SpawnError>) -> Option<EntityId> {
    match result {
        Ok(id) => Some(id),
        Err(err @ SpawnError::Refused { .. }) => {
            debug!(%err, "spawn refused");
            None
        }
        Err(err) => {
            warn!(%err, "spawn failed");
            None
        }
    }
}
