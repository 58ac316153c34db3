//! Collision pipeline: collider records, reaction registry, and dispatcher.
//!
//! Every frame the simulation refreshes each entity's [`ColliderRecord`],
//! hands the live ones to the [`CollisionDispatcher`], and lets it
//!
//! 1. rebuild a quad-tree over the records' bounding boxes (broad phase),
//! 2. confirm candidate pairs with a circle test (narrow phase),
//! 3. look up each confirmed pair's [`Reaction`] in the [`ReactionRegistry`]
//!    by its unordered [`CollisionPairKey`] and invoke it.
//!
//! # Invariants
//!
//! - Each unordered pair of entities reaches a reaction at most once per frame
//! - Reactions run in `(lower id, higher id)` order, independent of index layout
//! - Reactions flag entities for removal; nothing is removed during dispatch

mod collider;
mod dispatcher;
mod registry;

pub use collider::{ColliderRecord, ColliderType, CollisionPairKey};
pub use dispatcher::{CollisionDispatcher, Contact, DispatchReport};
pub use registry::{consume_food, separate_organisms, Reaction, ReactionContext, ReactionRegistry};
