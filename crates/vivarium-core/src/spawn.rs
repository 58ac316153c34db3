//! Spawn boundary: population limits, lifecycle hooks, and actor assembly.
//!
//! Every entity enters the arena through [`Arena::spawn`], which asks
//! [`ActorState::can_spawn`] first and calls [`ActorState::on_spawn`] once it
//! is stored. [`Arena::remove_destroyed`] calls
//! [`ActorState::on_destruction`] exactly once on the way out. The
//! [`Census`] those hooks maintain is what the limits are checked against.

use glam::Vec2;
use quadrant::Aabb;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::Arena;
use crate::config::{FoodDefaults, OrganismDefaults, SimConfig, SpawnLimits};
use crate::entity::{ActorKind, ActorState, Color, EntityId, Offspring, OrganismState, Sprite, TextLabel, Transform};
use crate::error::SpawnError;
use crate::resources::{ResourceKind, ResourceProvider};

/// Running population counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    /// Organisms currently in the arena (dead ones included until removal)
    pub organisms: usize,
    /// Food items currently in the arena
    pub food: usize,
    /// Organisms ever spawned
    pub organisms_spawned: u64,
    /// Organisms ever removed
    pub organisms_destroyed: u64,
    /// Food items ever spawned
    pub food_spawned: u64,
    /// Food items ever removed
    pub food_destroyed: u64,
}

impl Census {
    /// Current population of `kind`.
    #[must_use]
    pub const fn population(&self, kind: ActorKind) -> usize {
        match kind {
            ActorKind::Organism => self.organisms,
            ActorKind::Food => self.food,
        }
    }
}

/// What the spawn hooks read and write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnContext {
    /// Population caps
    pub limits: SpawnLimits,
    /// Current counts
    pub census: Census,
}

impl SpawnContext {
    /// Creates a context with an empty census.
    #[must_use]
    pub fn new(limits: SpawnLimits) -> Self {
        Self {
            limits,
            census: Census::default(),
        }
    }
}

impl ActorState {
    /// True if another actor of this kind fits under the population cap.
    #[must_use]
    pub fn can_spawn(&self, ctx: &SpawnContext) -> bool {
        match self {
            Self::Organism(_) => ctx.census.organisms < ctx.limits.max_organisms,
            Self::Food(_) => ctx.census.food < ctx.limits.max_food,
        }
    }

    /// Records the arrival of an actor of this kind.
    pub fn on_spawn(&self, ctx: &mut SpawnContext) {
        let census = &mut ctx.census;
        match self {
            Self::Organism(_) => {
                census.organisms += 1;
                census.organisms_spawned += 1;
            }
            Self::Food(_) => {
                census.food += 1;
                census.food_spawned += 1;
            }
        }
    }

    /// Records the removal of an actor of this kind.
    pub fn on_destruction(&self, ctx: &mut SpawnContext) {
        let census = &mut ctx.census;
        match self {
            Self::Organism(_) => {
                census.organisms = census.organisms.saturating_sub(1);
                census.organisms_destroyed += 1;
            }
            Self::Food(_) => {
                census.food = census.food.saturating_sub(1);
                census.food_destroyed += 1;
            }
        }
    }
}

/// Builds fully assembled organisms and food.
///
/// Resources are resolved before anything touches the arena, so a missing
/// texture or font leaves the arena unchanged.
#[derive(Debug, Clone)]
pub struct ActorFactory {
    organism: OrganismDefaults,
    food: FoodDefaults,
    label_font: String,
}

impl ActorFactory {
    /// Tint applied to organism sprites.
    pub const ORGANISM_TINT: Color = Color::rgb(80, 200, 120);
    /// Gap between an organism's collider and its name label.
    pub const LABEL_GAP: f32 = 6.0;

    /// Creates a factory from the config's actor defaults.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        Self {
            organism: config.organism.clone(),
            food: config.food.clone(),
            label_font: config.label_font.clone(),
        }
    }

    /// Organism defaults used by this factory.
    #[must_use]
    pub fn organism_defaults(&self) -> &OrganismDefaults {
        &self.organism
    }

    /// Food defaults used by this factory.
    #[must_use]
    pub fn food_defaults(&self) -> &FoodDefaults {
        &self.food
    }

    /// Spawns an organism with the default traits.
    ///
    /// # Errors
    ///
    /// See [`spawn_organism`](Self::spawn_organism).
    pub fn spawn_default_organism(
        &self,
        arena: &mut Arena,
        resources: &dyn ResourceProvider,
        name: &str,
        transform: Transform,
    ) -> Result<EntityId, SpawnError> {
        self.spawn_organism(arena, resources, self.organism.state(name), transform)
    }

    /// Spawns an organism with sprite, name label, and collider.
    ///
    /// # Errors
    ///
    /// [`SpawnError::MissingResource`] if the texture or font is unknown,
    /// [`SpawnError::Refused`] if the organism cap is reached.
    pub fn spawn_organism(
        &self,
        arena: &mut Arena,
        resources: &dyn ResourceProvider,
        state: OrganismState,
        transform: Transform,
    ) -> Result<EntityId, SpawnError> {
        let texture = resources.require(ResourceKind::Texture, &self.organism.texture)?;
        let font = resources.require(ResourceKind::Font, &self.label_font)?;
        let base_radius = self.organism.base_radius;
        let label_rise = base_radius * state.size + Self::LABEL_GAP;
        let name = state.name.clone();

        arena.spawn(ActorState::Organism(state), transform, |entity| {
            let mut sprite = Sprite::new(texture);
            sprite.color = Self::ORGANISM_TINT;
            let mut label = TextLabel::new(font, name);
            label.offset = Vec2::new(0.0, -label_rise);

            entity.force_insert_component(sprite);
            entity.force_insert_component(label);
            entity.attach_collider(base_radius);
        })
    }

    /// Spawns a child organism from a reproduction request.
    ///
    /// # Errors
    ///
    /// See [`spawn_organism`](Self::spawn_organism).
    pub fn spawn_offspring(
        &self,
        arena: &mut Arena,
        resources: &dyn ResourceProvider,
        offspring: Offspring,
    ) -> Result<EntityId, SpawnError> {
        let parent = offspring.parent;
        let id = self.spawn_organism(arena, resources, offspring.state, offspring.transform)?;
        debug!(%parent, child = %id, "offspring born");
        Ok(id)
    }

    /// Spawns a food item with sprite and collider.
    ///
    /// # Errors
    ///
    /// [`SpawnError::MissingResource`] if the texture is unknown,
    /// [`SpawnError::Refused`] if the food cap is reached.
    pub fn spawn_food(
        &self,
        arena: &mut Arena,
        resources: &dyn ResourceProvider,
        position: Vec2,
    ) -> Result<EntityId, SpawnError> {
        let texture = resources.require(ResourceKind::Texture, &self.food.texture)?;
        let base_radius = self.food.base_radius;

        arena.spawn(ActorState::Food(self.food.state()), Transform::new(position, 0.0), |entity| {
            entity.force_insert_component(Sprite::new(texture));
            entity.attach_collider(base_radius);
        })
    }
}

/// Seeded periodic food drop.
///
/// Accumulates elapsed time and, every `interval` seconds, yields a uniformly
/// random point inside the arena. Same seed, same points.
#[derive(Debug, Clone)]
pub struct FoodSpawner {
    interval: f32,
    elapsed: f32,
    max_drops: usize,
    rng: ChaCha8Rng,
}

impl FoodSpawner {
    /// Drop cap per tick unless overridden.
    pub const DEFAULT_MAX_DROPS: usize = 256;

    /// Creates a spawner firing every `interval` seconds.
    #[must_use]
    pub fn new(interval: f32, seed: u64) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            max_drops: Self::DEFAULT_MAX_DROPS,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Caps the drops a single [`tick`](Self::tick) may yield.
    #[must_use]
    pub fn with_max_drops(mut self, max_drops: usize) -> Self {
        self.max_drops = max_drops;
        self
    }

    /// Seconds between drops.
    #[must_use]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Advances the timer by `dt` and returns the drop points that came due.
    ///
    /// At most `max_drops` points are returned; intervals beyond the cap
    /// are dropped rather than carried over.
    pub fn tick(&mut self, dt: f32, bounds: &Aabb) -> Vec<Vec2> {
        if !(self.interval.is_finite() && self.interval > 0.0) || !(dt.is_finite() && dt > 0.0) {
            return Vec::new();
        }
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return Vec::new();
        }

        let due = (self.elapsed / self.interval).floor();
        self.elapsed = self.elapsed.rem_euclid(self.interval);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = if due.is_finite() {
            (due as usize).min(self.max_drops)
        } else {
            self.max_drops
        };
        (0..count).map(|_| self.random_point(bounds)).collect()
    }

    /// Uniformly random point inside `bounds`.
    pub fn random_point(&mut self, bounds: &Aabb) -> Vec2 {
        random_point(&mut self.rng, bounds)
    }
}

/// Uniformly random point inside `bounds`; degenerate bounds yield their min corner.
pub fn random_point<R: Rng>(rng: &mut R, bounds: &Aabb) -> Vec2 {
    let size = bounds.size().max(Vec2::ZERO);
    bounds.min + Vec2::new(rng.gen::<f32>() * size.x, rng.gen::<f32>() * size.y)
}
