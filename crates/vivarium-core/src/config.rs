//! Simulation configuration.
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only
//! needs the fields it changes:
//!
//! ```
//! use vivarium_core::config::SimConfig;
//!
//! let config = SimConfig::from_json_str(r#"{ "seed": 7, "limits": { "max_food": 10 } }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.limits.max_food, 10);
//! assert_eq!(config.limits.max_organisms, SimConfig::default().limits.max_organisms);
//! ```

use std::path::Path;

use glam::Vec2;
use quadrant::{Aabb, QuadTreeConfig};
use serde::{Deserialize, Serialize};

use crate::entity::{FoodState, OrganismState};
use crate::error::ConfigError;
use crate::resources::ResourceCatalog;

/// Quad-tree tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Entries a leaf holds before it splits
    pub capacity: usize,
    /// Leaves at or below this side length never split
    pub min_size: f32,
    /// Maximum subdivision depth
    pub max_depth: u8,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            capacity: 8,
            min_size: 8.0,
            max_depth: 8,
        }
    }
}

/// Traits given to seeded organisms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganismDefaults {
    /// Sprite texture name
    pub texture: String,
    /// Collider radius at size 1
    pub base_radius: f32,
    /// Seconds until death by old age
    pub lifespan: f32,
    /// Size multiplier
    pub size: f32,
    /// Starting energy
    pub energy: f32,
    /// Energy burned per second per unit of size
    pub metabolism: f32,
    /// Energy needed to reproduce
    pub reproduction_threshold: f32,
    /// Forward speed in units per second
    pub movement_speed: f32,
    /// Turn rate in degrees per second
    pub turning_speed: f32,
    /// Seconds a corpse stays before removal
    pub destruction_delay: f32,
}

impl Default for OrganismDefaults {
    fn default() -> Self {
        Self {
            texture: ResourceCatalog::ORGANISM_TEXTURE.to_string(),
            base_radius: 8.0,
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

impl OrganismDefaults {
    /// Newborn state with these traits.
    #[must_use]
    pub fn state(&self, name: impl Into<String>) -> OrganismState {
        OrganismState {
            lifespan: self.lifespan,
            size: self.size,
            energy: self.energy,
            metabolism: self.metabolism,
            reproduction_threshold: self.reproduction_threshold,
            movement_speed: self.movement_speed,
            turning_speed: self.turning_speed,
            destruction_delay: self.destruction_delay,
            ..OrganismState::new(name)
        }
    }
}

/// Food payload and spawn cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodDefaults {
    /// Sprite texture name
    pub texture: String,
    /// Collider radius
    pub base_radius: f32,
    /// Energy given to the organism that eats it
    pub energy: f32,
    /// Seconds before uneaten food expires
    pub duration: f32,
    /// Seconds between periodic food drops
    pub spawn_interval: f32,
}

impl Default for FoodDefaults {
    fn default() -> Self {
        Self {
            texture: ResourceCatalog::FOOD_TEXTURE.to_string(),
            base_radius: 3.0,
            energy: 20.0,
            duration: 30.0,
            spawn_interval: 1.0,
        }
    }
}

impl FoodDefaults {
    /// Fresh food state.
    #[must_use]
    pub fn state(&self) -> FoodState {
        FoodState {
            energy: self.energy,
            age: 0.0,
            duration: self.duration,
        }
    }
}

/// Population caps checked before every spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnLimits {
    /// Maximum live organisms
    pub max_organisms: usize,
    /// Maximum live food items
    pub max_food: usize,
}

impl Default for SpawnLimits {
    fn default() -> Self {
        Self {
            max_organisms: 50,
            max_food: 100,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Arena region; also the quad-tree root
    pub bounds: Aabb,
    /// Quad-tree tuning
    pub index: IndexConfig,
    /// Seeded organism traits
    pub organism: OrganismDefaults,
    /// Food traits
    pub food: FoodDefaults,
    /// Population caps
    pub limits: SpawnLimits,
    /// Font for name labels
    pub label_font: String,
    /// Seconds per fixed step
    pub fixed_dt: f32,
    /// Seed for every random choice the simulation makes
    pub seed: u64,
    /// Organisms placed by `populate`
    pub initial_organisms: usize,
    /// Food items placed by `populate`
    pub initial_food: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bounds: Aabb::new(0.0, 0.0, 400.0, 400.0),
            index: IndexConfig::default(),
            organism: OrganismDefaults::default(),
            food: FoodDefaults::default(),
            limits: SpawnLimits::default(),
            label_font: ResourceCatalog::LABEL_FONT.to_string(),
            fixed_dt: 1.0 / 60.0,
            seed: 42,
            initial_organisms: 10,
            initial_food: 20,
        }
    }
}

impl SimConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for values that fail [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the simulation can run with these values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bounds.is_degenerate() {
            return Err(invalid("bounds", "must be finite with positive width and height"));
        }
        positive("fixed_dt", self.fixed_dt)?;
        if self.index.capacity == 0 {
            return Err(invalid("index.capacity", "must be at least 1"));
        }
        positive("index.min_size", self.index.min_size)?;

        let organism = &self.organism;
        named("organism.texture", &organism.texture)?;
        non_negative("organism.base_radius", organism.base_radius)?;
        positive("organism.lifespan", organism.lifespan)?;
        positive("organism.size", organism.size)?;
        non_negative("organism.energy", organism.energy)?;
        non_negative("organism.metabolism", organism.metabolism)?;
        positive("organism.reproduction_threshold", organism.reproduction_threshold)?;
        non_negative("organism.movement_speed", organism.movement_speed)?;
        non_negative("organism.turning_speed", organism.turning_speed)?;
        non_negative("organism.destruction_delay", organism.destruction_delay)?;

        let food = &self.food;
        named("food.texture", &food.texture)?;
        non_negative("food.base_radius", food.base_radius)?;
        non_negative("food.energy", food.energy)?;
        non_negative("food.duration", food.duration)?;
        positive("food.spawn_interval", food.spawn_interval)?;

        named("label_font", &self.label_font)?;
        Ok(())
    }

    /// Largest collider radius the configured actors can have.
    #[must_use]
    pub fn max_collider_radius(&self) -> f32 {
        (self.organism.base_radius * self.organism.size).max(self.food.base_radius)
    }

    /// Quad-tree configuration covering the arena.
    ///
    /// The root is the arena grown by [`max_collider_radius`](Self::max_collider_radius),
    /// so a body whose center is inside the arena always fits.
    #[must_use]
    pub fn quadtree_config(&self) -> QuadTreeConfig {
        QuadTreeConfig {
            bounds: self.bounds.expanded_by(self.max_collider_radius()),
            capacity: self.index.capacity,
            min_size: self.index.min_size,
            max_depth: self.index.max_depth,
        }
    }

    /// Arena size.
    #[must_use]
    pub fn arena_size(&self) -> Vec2 {
        self.bounds.size()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be zero or positive, got {value}")))
    }
}

fn named(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(invalid(field, "must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(result: Result<SimConfig, ConfigError>) -> &'static str {
        match result {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected invalid field, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config = SimConfig::from_json_str("{}").expect("valid");
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn json_roundtrip_preserves_values() {
        let mut config = SimConfig::default();
        config.seed = 99;
        config.bounds = Aabb::new(0.0, 0.0, 800.0, 600.0);
        config.organism.size = 1.5;

        let json = config.to_json_string().expect("serializes");
        let back = SimConfig::from_json_str(&json).expect("parses");
        assert_eq!(back, config);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = SimConfig::from_json_str("{ seed: }");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_degenerate_bounds() {
        let json = r#"{ "bounds": { "min": [0.0, 0.0], "max": [0.0, 100.0] } }"#;
        assert_eq!(invalid_field(SimConfig::from_json_str(json)), "bounds");
    }

    #[test]
    fn rejects_zero_step_and_capacity() {
        assert_eq!(invalid_field(SimConfig::from_json_str(r#"{ "fixed_dt": 0.0 }"#)), "fixed_dt");
        assert_eq!(
            invalid_field(SimConfig::from_json_str(r#"{ "index": { "capacity": 0 } }"#)),
            "index.capacity"
        );
    }

    #[test]
    fn rejects_blank_texture() {
        let json = r#"{ "food": { "texture": "  " } }"#;
        assert_eq!(invalid_field(SimConfig::from_json_str(json)), "food.texture");
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("vivarium-config-that-does-not-exist.json");
        assert!(matches!(SimConfig::load(path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join(format!("vivarium-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "initial_food": 3 }"#).expect("temp dir writable");
        let config = SimConfig::load(&path).expect("valid file");
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.initial_food, 3);
    }

    #[test]
    fn organism_defaults_build_state() {
        let defaults = OrganismDefaults {
            lifespan: 5.0,
            ..OrganismDefaults::default()
        };
        let state = defaults.state("Zed");
        assert_eq!(state.name, "Zed");
        assert!((state.lifespan - 5.0).abs() < f32::EPSILON);
        assert_eq!(state.generation, 0);
    }

    #[test]
    fn quadtree_config_matches_index() {
        let config = SimConfig::default();
        let tree = config.quadtree_config();
        assert_eq!(tree.bounds, config.bounds.expanded_by(8.0));
        assert_eq!(tree.capacity, 8);
    }

    #[test]
    fn index_root_covers_bodies_on_the_edge() {
        let mut config = SimConfig::default();
        config.organism.size = 2.0;
        assert!((config.max_collider_radius() - 16.0).abs() < f32::EPSILON);

        let root = config.quadtree_config().bounds;
        let corner = Aabb::from_circle(config.bounds.min, config.max_collider_radius());
        assert!(root.contains(&corner));
    }
}
