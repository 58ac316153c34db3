//! Entity module for the sandbox's actors.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Unique identifier for entities
//! - [`ActorKind`]: Closed set of actor variants (organism, food)
//! - [`ActorState`]: Type-safe storage for variant-specific state
//! - [`ComponentTable`]: Per-entity capability slots with paint order
//! - [`Entity`]: The complete entity container
//!
//! # Architecture
//!
//! Every entity carries the common shell (transform, status flags, component
//! table) plus one [`ActorState`] variant. The variant decides which
//! per-frame behavior runs and which lifecycle hooks apply; the component
//! table decides what the entity looks like and whether it collides.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use vivarium_core::entity::{ActorKind, ActorState, Entity, EntityId, FoodState, Transform};
//!
//! let food = Entity::new(
//!     EntityId::new(42),
//!     ActorState::Food(FoodState::default()),
//!     Transform::new(Vec2::new(10.0, 20.0), 0.0),
//! );
//!
//! assert_eq!(food.id().as_u64(), 42);
//! assert_eq!(food.kind(), ActorKind::Food);
//! ```

mod actors;
pub mod components;
mod table;

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::{ColliderRecord, ColliderType};
use crate::error::{ComponentError, SlotOccupied};

pub use actors::{DeathCause, FoodState, Offspring, OrganismState, DEAD_SUFFIX};
pub use components::{Collider, Color, Component, ComponentTag, Sprite, TextLabel, TextureRect};
pub use table::{ComponentTable, DrawOrder, SwapSide};

/// Unique identifier for an entity.
///
/// Identifiers are handed out by the arena in strictly increasing order and
/// never reused, so ordering by id is ordering by spawn time.
///
/// # Example
///
/// ```
/// use vivarium_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Actor variant tag.
///
/// `ActorKind` selects the per-frame behavior and the spawn limits that apply
/// to an entity. It is always derived from the entity's [`ActorState`], so the
/// two can never disagree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Living, moving, eating actor
    Organism,
    /// Stationary energy pellet
    Food,
}

impl ActorKind {
    /// Both actor kinds.
    pub const ALL: [ActorKind; 2] = [Self::Organism, Self::Food];

    /// Collider type attached to actors of this kind.
    #[must_use]
    pub const fn collider_type(self) -> ColliderType {
        match self {
            Self::Organism => ColliderType::Organism,
            Self::Food => ColliderType::Food,
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organism => write!(f, "Organism"),
            Self::Food => write!(f, "Food"),
        }
    }
}

/// Variant-specific actor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorState {
    /// Organism state (vitals, traits, lifecycle timers)
    Organism(OrganismState),
    /// Food state (energy payload, shelf life)
    Food(FoodState),
}

impl ActorState {
    /// Returns the actor kind for this state.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        match self {
            Self::Organism(_) => ActorKind::Organism,
            Self::Food(_) => ActorKind::Food,
        }
    }

    /// Scale applied to collider radii.
    #[must_use]
    pub fn scale(&self) -> f32 {
        match self {
            Self::Organism(organism) => organism.size,
            Self::Food(_) => 1.0,
        }
    }

    /// Returns a reference to the organism state, if this is an organism.
    #[must_use]
    pub const fn as_organism(&self) -> Option<&OrganismState> {
        match self {
            Self::Organism(state) => Some(state),
            Self::Food(_) => None,
        }
    }

    /// Returns a mutable reference to the organism state, if this is an organism.
    #[must_use]
    pub fn as_organism_mut(&mut self) -> Option<&mut OrganismState> {
        match self {
            Self::Organism(state) => Some(state),
            Self::Food(_) => None,
        }
    }

    /// Returns a reference to the food state, if this is food.
    #[must_use]
    pub const fn as_food(&self) -> Option<&FoodState> {
        match self {
            Self::Food(state) => Some(state),
            Self::Organism(_) => None,
        }
    }

    /// Returns a mutable reference to the food state, if this is food.
    #[must_use]
    pub fn as_food_mut(&mut self) -> Option<&mut FoodState> {
        match self {
            Self::Food(state) => Some(state),
            Self::Organism(_) => None,
        }
    }
}

bitflags! {
    /// Lifecycle flags.
    ///
    /// `DEAD` is organism-only and means "stopped living, still on screen".
    /// `PENDING_DESTRUCTION` means "gone at the end of this frame" and is
    /// never cleared once set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// Removed during the late-update phase of the current frame
        const PENDING_DESTRUCTION = 1 << 0;
        /// Organism has died and is counting down to removal
        const DEAD = 1 << 1;
    }
}

/// Normalizes an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

/// Position and heading.
///
/// Rotation is in degrees, clockwise in screen coordinates (y grows down),
/// and is kept in `[0, 360)` by every mutator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World position
    pub position: Vec2,
    /// Heading in degrees
    pub rotation: f32,
}

impl Transform {
    /// Creates a transform, normalizing `rotation`.
    #[must_use]
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation: normalize_degrees(rotation),
        }
    }

    /// Unit vector the transform is facing.
    #[must_use]
    pub fn heading(&self) -> Vec2 {
        let radians = self.rotation.to_radians();
        Vec2::new(radians.cos(), radians.sin())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}

/// A simulation entity.
///
/// Fields are private so the invariants hold structurally: the kind is
/// derived from the state, a collider always names its owner, and the
/// pending-destruction flag can be set but never cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    transform: Transform,
    flags: StatusFlags,
    components: ComponentTable,
    state: ActorState,
}

impl Entity {
    /// Creates an entity with an empty component table.
    #[must_use]
    pub fn new(id: EntityId, state: ActorState, transform: Transform) -> Self {
        Self {
            id,
            transform,
            flags: StatusFlags::empty(),
            components: ComponentTable::new(),
            state,
        }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's actor kind.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.state.kind()
    }

    /// Returns the variant state.
    #[must_use]
    pub const fn state(&self) -> &ActorState {
        &self.state
    }

    /// Returns the variant state mutably.
    #[must_use]
    pub fn state_mut(&mut self) -> &mut ActorState {
        &mut self.state
    }

    /// Returns the organism state, if this is an organism.
    #[must_use]
    pub const fn as_organism(&self) -> Option<&OrganismState> {
        self.state.as_organism()
    }

    /// Returns the organism state mutably, if this is an organism.
    #[must_use]
    pub fn as_organism_mut(&mut self) -> Option<&mut OrganismState> {
        self.state.as_organism_mut()
    }

    /// Returns the food state, if this is food.
    #[must_use]
    pub const fn as_food(&self) -> Option<&FoodState> {
        self.state.as_food()
    }

    /// Returns the food state mutably, if this is food.
    #[must_use]
    pub fn as_food_mut(&mut self) -> Option<&mut FoodState> {
        self.state.as_food_mut()
    }

    // -------------------------------------------------------------------------
    // Transform
    // -------------------------------------------------------------------------

    /// Returns the transform.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Returns the position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.transform.position
    }

    /// Returns the rotation in degrees, always in `[0, 360)`.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    /// Moves the entity to `position`.
    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    /// Moves the entity by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.transform.position += delta;
    }

    /// Sets the rotation, normalized into `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.transform.rotation = normalize_degrees(degrees);
    }

    /// Rotates by `degrees`, keeping the result in `[0, 360)`.
    pub fn rotate(&mut self, degrees: f32) {
        self.set_rotation(self.transform.rotation + degrees);
    }

    // -------------------------------------------------------------------------
    // Lifecycle flags
    // -------------------------------------------------------------------------

    /// Returns the status flags.
    #[must_use]
    pub const fn flags(&self) -> StatusFlags {
        self.flags
    }

    /// Returns `true` once the entity is flagged for removal.
    #[must_use]
    pub const fn is_pending_destruction(&self) -> bool {
        self.flags.contains(StatusFlags::PENDING_DESTRUCTION)
    }

    /// Returns `true` if the organism has died.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.flags.contains(StatusFlags::DEAD)
    }

    /// Returns `true` if the entity is neither dead nor flagged for removal.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.is_dead() && !self.is_pending_destruction()
    }

    /// Flags the entity for removal at the end of the current frame.
    ///
    /// Idempotent. Returns `true` if the flag was newly set.
    pub fn mark_for_destruction(&mut self) -> bool {
        let newly = !self.is_pending_destruction();
        self.flags.insert(StatusFlags::PENDING_DESTRUCTION);
        newly
    }

    // -------------------------------------------------------------------------
    // Components
    // -------------------------------------------------------------------------

    /// Returns the component table.
    #[must_use]
    pub const fn components(&self) -> &ComponentTable {
        &self.components
    }

    /// Inserts a component into its slot if the slot is empty.
    ///
    /// A collider is re-pointed at this entity, and retyped to its kind,
    /// before it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`SlotOccupied`] carrying the rejected component if the slot
    /// already holds one; the table is unchanged.
    pub fn insert_component(&mut self, component: impl Into<Component>) -> Result<(), SlotOccupied> {
        let component = self.adopt(component.into());
        self.components.insert(component)
    }

    /// Inserts a component, returning whatever previously held the slot.
    pub fn force_insert_component(&mut self, component: impl Into<Component>) -> Option<Component> {
        let component = self.adopt(component.into());
        self.components.force_insert(component)
    }

    /// Destroys the component in `tag`'s slot. Returns `false` if it was empty.
    pub fn remove_component(&mut self, tag: ComponentTag) -> bool {
        self.components.remove(tag)
    }

    /// Takes the component out of `tag`'s slot, transferring ownership.
    pub fn extract_component(&mut self, tag: ComponentTag) -> Option<Component> {
        self.components.extract(tag)
    }

    /// Returns `true` if `tag`'s slot is occupied.
    #[must_use]
    pub fn has_component(&self, tag: ComponentTag) -> bool {
        self.components.has(tag)
    }

    /// Returns the component in `tag`'s slot.
    #[must_use]
    pub fn component(&self, tag: ComponentTag) -> Option<&Component> {
        self.components.see(tag)
    }

    /// Returns the sprite mutably.
    #[must_use]
    pub fn sprite_mut(&mut self) -> Option<&mut Sprite> {
        self.components.sprite_mut()
    }

    /// Returns the text label mutably.
    #[must_use]
    pub fn text_mut(&mut self) -> Option<&mut TextLabel> {
        self.components.text_mut()
    }

    /// Exchanges the `tag` components of two entities.
    ///
    /// Colliders are re-pointed at their new owners and take on the
    /// collider type of the owner's kind.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Missing`] if either side lacks the
    /// component; neither entity is changed.
    pub fn swap_component(tag: ComponentTag, a: &mut Entity, b: &mut Entity) -> Result<(), ComponentError> {
        ComponentTable::swap_component(tag, &mut a.components, &mut b.components)?;
        if tag == ComponentTag::Collider {
            a.repoint_collider();
            b.repoint_collider();
        }
        Ok(())
    }

    /// Moves a drawable to the front of the paint order.
    pub fn send_to_front(&mut self, tag: ComponentTag) -> bool {
        self.components.send_to_front(tag)
    }

    /// Moves a drawable to the back of the paint order.
    pub fn send_to_back(&mut self, tag: ComponentTag) -> bool {
        self.components.send_to_back(tag)
    }

    /// Removes every component and clears the paint order.
    pub fn purge_components(&mut self) {
        self.components.purge();
    }

    // -------------------------------------------------------------------------
    // Collider
    // -------------------------------------------------------------------------

    /// Attaches a collider of this entity's type, replacing any existing one.
    pub fn attach_collider(&mut self, base_radius: f32) {
        let collider = Collider::new(self.id, self.kind().collider_type(), base_radius);
        self.components.force_insert(collider.into());
        self.refresh_collider();
    }

    /// Returns the collider record, if the entity has a collider.
    #[must_use]
    pub fn collider(&self) -> Option<&ColliderRecord> {
        self.components.collider().map(|collider| &collider.record)
    }

    /// Recomputes the collider record from the current transform and size.
    ///
    /// Returns `false` if the entity has no collider.
    pub fn refresh_collider(&mut self) -> bool {
        let scale = self.state.scale();
        match self.components.collider_mut() {
            Some(collider) => {
                collider.refresh(&self.transform, scale);
                true
            }
            None => false,
        }
    }

    /// Current collider circle `(center, radius)` computed from the live
    /// transform rather than the last refresh.
    #[must_use]
    pub fn collider_circle(&self) -> Option<(Vec2, f32)> {
        self.components.collider().map(|collider| {
            (
                self.transform.position + collider.offset,
                collider.base_radius * self.state.scale(),
            )
        })
    }

    fn adopt(&self, component: Component) -> Component {
        match component {
            Component::Collider(mut collider) => {
                collider.record.owner = self.id;
                collider.record.kind = self.kind().collider_type();
                Component::Collider(collider)
            }
            other => other,
        }
    }

    fn repoint_collider(&mut self) {
        let id = self.id;
        let kind = self.kind().collider_type();
        if let Some(collider) = self.components.collider_mut() {
            collider.record.owner = id;
            collider.record.kind = kind;
        }
    }
}
