//! # Vivarium Core
//!
//! Entity and collision core for the Vivarium artificial-life sandbox.
//!
//! Organisms and food items live in a single [`Arena`]. Each entity owns a
//! [`ComponentTable`](entity::ComponentTable) holding at most one sprite, text
//! label and collider, plus a paint order over its drawables. Every frame the
//! [`Simulation`] updates the actors, refreshes their colliders, rebuilds a
//! [`quadrant`] quad-tree, and dispatches each overlapping pair exactly once to
//! the reaction registered for its collider types.
//!
//! ## Architecture
//!
//! - **Entities**: organisms and food, one [`entity::ActorState`] variant each
//! - **Components**: sprite, text label, collider, keyed by a closed tag
//! - **Collision**: broad phase over the quad-tree, radius-sum narrow phase,
//!   [`ReactionRegistry`] lookup by unordered type pair
//! - **Lifecycle**: destruction is deferred; reactions flag, cleanup removes
//!
//! ## Usage
//!
//! ```
//! use vivarium_core::{ReactionRegistry, ResourceCatalog, SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(
//!     SimConfig::default(),
//!     ReactionRegistry::with_defaults(),
//!     Box::new(ResourceCatalog::with_defaults()),
//! )?;
//! sim.populate();
//! let report = sim.step();
//! assert_eq!(report.frame, 0);
//! # Ok::<(), vivarium_core::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export quadrant for spatial queries
pub use quadrant;

pub mod arena;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod render;
pub mod resources;
pub mod simulation;
pub mod spawn;

pub use arena::Arena;
pub use collision::{
    ColliderRecord, ColliderType, CollisionDispatcher, CollisionPairKey, DispatchReport, Reaction, ReactionContext,
    ReactionRegistry,
};
pub use config::SimConfig;
pub use entity::{ActorKind, Component, ComponentTag, Entity, EntityId, Transform};
pub use error::{ComponentError, ConfigError, SlotOccupied, SpawnError};
pub use render::{DrawCommand, Renderer};
pub use resources::{ResourceCatalog, ResourceHandle, ResourceKind, ResourceProvider};
pub use simulation::{Controller, FrameReport, Simulation};

#[cfg(test)]
mod tests;
