//! Organism and food state plus their per-frame behavior.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Entity, EntityId, StatusFlags, Transform};

/// Appended to an organism's name when it dies.
pub const DEAD_SUFFIX: &str = " (dead)";

/// Organism vitals, heritable traits, and lifecycle timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismState {
    /// Display name
    pub name: String,
    /// 0 for seeded organisms, parent + 1 for offspring
    pub generation: u32,
    /// Seconds lived
    pub age: f32,
    /// Age at which the organism dies
    pub lifespan: f32,
    /// Size multiplier, scales the collider and energy burn
    pub size: f32,
    /// Stored energy; the organism starves at zero
    pub energy: f32,
    /// Energy burned per second per unit of size
    pub metabolism: f32,
    /// Energy at which the organism splits off an offspring
    pub reproduction_threshold: f32,
    /// Forward speed in units per second
    pub movement_speed: f32,
    /// Turn rate in degrees per second, used by controllers
    pub turning_speed: f32,
    /// Seconds a dead organism stays visible before removal
    pub destruction_delay: f32,
}

impl OrganismState {
    /// Creates a newborn organism with default traits.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generation: 0,
            age: 0.0,
            lifespan: 60.0,
            size: 1.0,
            energy: 50.0,
            metabolism: 1.0,
            reproduction_threshold: 100.0,
            movement_speed: 30.0,
            turning_speed: 90.0,
            destruction_delay: 10.0,
        }
    }
}

/// Food payload and shelf life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodState {
    /// Energy transferred to the organism that eats it
    pub energy: f32,
    /// Seconds since spawn
    pub age: f32,
    /// Age at which uneaten food expires
    pub duration: f32,
}

impl Default for FoodState {
    fn default() -> Self {
        Self {
            energy: 20.0,
            age: 0.0,
            duration: 30.0,
        }
    }
}

/// Why an organism died.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Reached its lifespan
    OldAge,
    /// Ran out of energy
    Starvation,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OldAge => write!(f, "old age"),
            Self::Starvation => write!(f, "starvation"),
        }
    }
}

/// Birth request produced by an organism's update.
///
/// The arena turns it into a real entity during the spawn phase, subject to
/// the population limits.
#[derive(Debug, Clone, PartialEq)]
pub struct Offspring {
    /// Parent organism
    pub parent: EntityId,
    /// Where the child appears
    pub transform: Transform,
    /// Child state, carrying the energy the parent gave up
    pub state: OrganismState,
}

impl Entity {
    /// Runs this entity's built-in per-frame behavior.
    ///
    /// Organisms age, burn energy, walk forward, and may return an
    /// [`Offspring`] request; dead organisms count down to removal. Food ages
    /// and expires. Entities already flagged for removal do nothing.
    pub fn update(&mut self, dt: f32) -> Option<Offspring> {
        if self.is_pending_destruction() {
            return None;
        }
        if self.as_food().is_some() {
            self.update_food(dt);
            return None;
        }
        self.update_organism(dt)
    }

    /// Kills an organism.
    ///
    /// Sets the dead flag and marks the name (and its label) as dead.
    /// Returns `false` for food or an organism that is already dead.
    pub fn die(&mut self, cause: DeathCause) -> bool {
        if self.is_dead() {
            return false;
        }
        let id = self.id;
        let Some(organism) = self.state.as_organism_mut() else {
            return false;
        };
        organism.name.push_str(DEAD_SUFFIX);
        let name = organism.name.clone();
        self.flags.insert(StatusFlags::DEAD);
        if let Some(label) = self.components.text_mut() {
            label.text.clone_from(&name);
        }
        debug!(entity = %id, %name, %cause, "organism died");
        true
    }

    fn update_food(&mut self, dt: f32) {
        let expired = match self.state.as_food_mut() {
            Some(food) => {
                food.age += dt;
                food.age >= food.duration
            }
            None => false,
        };
        if expired {
            self.mark_for_destruction();
        }
    }

    fn update_organism(&mut self, dt: f32) -> Option<Offspring> {
        if self.is_dead() {
            self.count_down_corpse(dt);
            return None;
        }

        let organism = self.state.as_organism_mut()?;
        organism.age += dt;
        organism.energy -= organism.metabolism * organism.size * dt;
        let cause = if organism.age >= organism.lifespan {
            Some(DeathCause::OldAge)
        } else if organism.energy <= 0.0 {
            Some(DeathCause::Starvation)
        } else {
            None
        };
        let step = organism.movement_speed * dt;

        if let Some(cause) = cause {
            self.die(cause);
            return None;
        }

        let heading = self.transform.heading();
        self.translate(heading * step);
        self.try_reproduce()
    }

    fn count_down_corpse(&mut self, dt: f32) {
        let expired = match self.state.as_organism_mut() {
            Some(organism) => {
                organism.destruction_delay -= dt;
                organism.destruction_delay <= 0.0
            }
            None => false,
        };
        if expired {
            self.mark_for_destruction();
        }
    }

    fn try_reproduce(&mut self) -> Option<Offspring> {
        let parent = self.id;
        let transform = Transform::new(self.transform.position, self.transform.rotation + 180.0);
        let organism = self.state.as_organism_mut()?;
        if organism.energy < organism.reproduction_threshold {
            return None;
        }

        organism.energy *= 0.5;
        let mut child = organism.clone();
        child.generation += 1;
        child.age = 0.0;

        Some(Offspring {
            parent,
            transform,
            state: child,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ActorState, TextLabel};
    use crate::resources::{ResourceHandle, ResourceKind};
    use glam::Vec2;

    fn organism_with(state: OrganismState) -> Entity {
        Entity::new(
            EntityId::new(1),
            ActorState::Organism(state),
            Transform::new(Vec2::new(100.0, 100.0), 0.0),
        )
    }

    fn food_with(duration: f32) -> Entity {
        Entity::new(
            EntityId::new(2),
            ActorState::Food(FoodState {
                duration,
                ..FoodState::default()
            }),
            Transform::default(),
        )
    }

    mod organism_tests {
        use super::*;

        #[test]
        fn organism_walks_along_heading() {
            let mut entity = organism_with(OrganismState::new("walker"));
            entity.update(1.0);
            assert!((entity.position() - Vec2::new(130.0, 100.0)).length() < 1e-4);
        }

        #[test]
        fn organism_dies_of_old_age_and_renames() {
            let mut state = OrganismState::new("Ada");
            state.lifespan = 2.0;
            let mut entity = organism_with(state);
            let font = ResourceHandle::new(ResourceKind::Font, "mono", 0);
            entity.insert_component(TextLabel::new(font, "Ada")).expect("empty");

            entity.update(1.0);
            assert!(!entity.is_dead());
            entity.update(1.0);

            assert!(entity.is_dead());
            assert!(!entity.is_pending_destruction());
            assert_eq!(entity.as_organism().map(|o| o.name.as_str()), Some("Ada (dead)"));
            assert_eq!(entity.components().text().map(|l| l.text.as_str()), Some("Ada (dead)"));
        }

        #[test]
        fn dead_organism_is_removed_after_delay() {
            let mut state = OrganismState::new("Bo");
            state.destruction_delay = 3.0;
            let mut entity = organism_with(state);
            assert!(entity.die(DeathCause::Starvation));
            let still = entity.position();

            entity.update(1.0);
            entity.update(1.0);
            assert!(!entity.is_pending_destruction());
            entity.update(1.0);
            assert!(entity.is_pending_destruction());
            assert_eq!(entity.position(), still);
        }

        #[test]
        fn die_is_once_only() {
            let mut entity = organism_with(OrganismState::new("Cy"));
            assert!(entity.die(DeathCause::OldAge));
            assert!(!entity.die(DeathCause::OldAge));
            assert_eq!(entity.as_organism().map(|o| o.name.as_str()), Some("Cy (dead)"));
        }

        #[test]
        fn organism_starves() {
            let mut state = OrganismState::new("Di");
            state.energy = 0.5;
            let mut entity = organism_with(state);
            entity.update(1.0);
            assert!(entity.is_dead());
        }

        #[test]
        fn reproduction_splits_energy() {
            let mut state = OrganismState::new("Ed");
            state.energy = 201.0;
            state.metabolism = 1.0;
            let mut entity = organism_with(state);

            let child = entity.update(1.0).expect("above threshold");

            assert_eq!(child.parent, EntityId::new(1));
            assert_eq!(child.state.generation, 1);
            assert!((child.state.energy - 100.0).abs() < 1e-4);
            assert!((entity.as_organism().map_or(0.0, |o| o.energy) - 100.0).abs() < 1e-4);
            assert!(child.state.age.abs() < f32::EPSILON);
        }

        #[test]
        fn below_threshold_no_offspring() {
            let mut entity = organism_with(OrganismState::new("Flo"));
            assert!(entity.update(0.1).is_none());
        }
    }

    mod food_tests {
        use super::*;

        #[test]
        fn food_expires_at_duration() {
            let mut entity = food_with(2.0);
            entity.update(1.0);
            assert!(!entity.is_pending_destruction());
            entity.update(1.0);
            assert!(entity.is_pending_destruction());
        }

        #[test]
        fn zero_duration_food_expires_on_first_update() {
            let mut entity = food_with(0.0);
            entity.update(0.0);
            assert!(entity.is_pending_destruction());
        }

        #[test]
        fn food_cannot_die() {
            let mut entity = food_with(5.0);
            assert!(!entity.die(DeathCause::OldAge));
            assert!(!entity.is_dead());
        }
    }
}
