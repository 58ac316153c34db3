//! Capability components an entity can own.
//!
//! Each component kind has exactly one [`ComponentTag`]; the tag is derived
//! from the component value, so a table slot can never hold the wrong kind.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::{ColliderRecord, ColliderType};
use crate::resources::ResourceHandle;

use super::{EntityId, Transform};

/// Capability tag naming a component slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentTag {
    /// Textured sprite
    Sprite,
    /// Floating text label
    Text,
    /// Physical footprint for collision detection
    Collider,
}

impl ComponentTag {
    /// Number of capability tags.
    pub const COUNT: usize = 3;

    /// All tags in slot order.
    pub const ALL: [ComponentTag; Self::COUNT] = [Self::Sprite, Self::Text, Self::Collider];

    /// Slot index of this tag.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Sprite => 0,
            Self::Text => 1,
            Self::Collider => 2,
        }
    }

    /// Returns `true` if components with this tag take part in paint order.
    #[must_use]
    pub const fn is_drawable(self) -> bool {
        matches!(self, Self::Sprite | Self::Text)
    }
}

impl fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sprite => write!(f, "Sprite"),
            Self::Text => write!(f, "Text"),
            Self::Collider => write!(f, "Collider"),
        }
    }
}

/// Sub-rectangle of a texture, in texels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width (0 = whole texture)
    pub width: u32,
    /// Height (0 = whole texture)
    pub height: u32,
}

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Label fill used for actor names.
    pub const INK: Self = Self::rgb(25, 25, 25);

    /// Opaque color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Textured sprite drawn at the owner's transform plus a fixed offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Texture resolved at construction time
    pub texture: ResourceHandle,
    /// Region of the texture to draw
    pub rect: TextureRect,
    /// Offset from the owner's position
    pub offset: Vec2,
    /// Rotation offset from the owner's rotation, in degrees
    pub angular_offset: f32,
    /// Tint
    pub color: Color,
    /// Hidden sprites are skipped by the renderer
    pub visible: bool,
}

impl Sprite {
    /// Creates a visible, untinted sprite showing the whole texture.
    #[must_use]
    pub fn new(texture: ResourceHandle) -> Self {
        Self {
            texture,
            rect: TextureRect::default(),
            offset: Vec2::ZERO,
            angular_offset: 0.0,
            color: Color::WHITE,
            visible: true,
        }
    }
}

/// Text label, typically an actor's name floating above its sprite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    /// Font resolved at construction time
    pub font: ResourceHandle,
    /// Displayed string
    pub text: String,
    /// Offset from the owner's position
    pub offset: Vec2,
    /// Fill color
    pub color: Color,
    /// Hidden labels are skipped by the renderer
    pub visible: bool,
}

impl TextLabel {
    /// Creates a visible label.
    #[must_use]
    pub fn new(font: ResourceHandle, text: impl Into<String>) -> Self {
        Self {
            font,
            text: text.into(),
            offset: Vec2::ZERO,
            color: Color::INK,
            visible: true,
        }
    }
}

/// Collider component: the entity's [`ColliderRecord`] plus how to derive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Fixed offset from the owner's position to the circle center
    pub offset: Vec2,
    /// Radius before the owner's size scale is applied
    pub base_radius: f32,
    /// Footprint consumed by the collision pipeline
    pub record: ColliderRecord,
}

impl Collider {
    /// Creates a collider for `owner`; call [`refresh`](Self::refresh) before use.
    #[must_use]
    pub fn new(owner: EntityId, kind: ColliderType, base_radius: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            base_radius,
            record: ColliderRecord::new(owner, kind),
        }
    }

    /// Sets the local offset.
    #[must_use]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Recomputes the record from the owner's current transform and scale.
    pub fn refresh(&mut self, transform: &Transform, scale: f32) {
        let center = transform.position + self.offset;
        self.record.refresh(center, self.base_radius * scale);
    }
}

/// A capability instance stored in a [`ComponentTable`](super::ComponentTable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    /// Sprite
    Sprite(Sprite),
    /// Text label
    Text(TextLabel),
    /// Collider
    Collider(Collider),
}

impl Component {
    /// Slot this component occupies.
    #[must_use]
    pub const fn tag(&self) -> ComponentTag {
        match self {
            Self::Sprite(_) => ComponentTag::Sprite,
            Self::Text(_) => ComponentTag::Text,
            Self::Collider(_) => ComponentTag::Collider,
        }
    }

    /// Returns `true` if this component takes part in paint order.
    #[must_use]
    pub const fn is_drawable(&self) -> bool {
        self.tag().is_drawable()
    }

    /// Returns `true` if a drawable component is currently visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        match self {
            Self::Sprite(sprite) => sprite.visible,
            Self::Text(label) => label.visible,
            Self::Collider(_) => false,
        }
    }

    /// World transform of this component given its owner's transform.
    #[must_use]
    pub fn world_transform(&self, owner: &Transform) -> Transform {
        match self {
            Self::Sprite(sprite) => Transform::new(
                owner.position + sprite.offset,
                owner.rotation + sprite.angular_offset,
            ),
            Self::Text(label) => Transform::new(owner.position + label.offset, 0.0),
            Self::Collider(collider) => Transform::new(owner.position + collider.offset, owner.rotation),
        }
    }

    /// Returns the sprite, if this is one.
    #[must_use]
    pub const fn as_sprite(&self) -> Option<&Sprite> {
        match self {
            Self::Sprite(sprite) => Some(sprite),
            _ => None,
        }
    }

    /// Returns the text label, if this is one.
    #[must_use]
    pub const fn as_text(&self) -> Option<&TextLabel> {
        match self {
            Self::Text(label) => Some(label),
            _ => None,
        }
    }

    /// Returns the collider, if this is one.
    #[must_use]
    pub const fn as_collider(&self) -> Option<&Collider> {
        match self {
            Self::Collider(collider) => Some(collider),
            _ => None,
        }
    }
}

impl From<Sprite> for Component {
    fn from(sprite: Sprite) -> Self {
        Self::Sprite(sprite)
    }
}

impl From<TextLabel> for Component {
    fn from(label: TextLabel) -> Self {
        Self::Text(label)
    }
}

impl From<Collider> for Component {
    fn from(collider: Collider) -> Self {
        Self::Collider(collider)
    }
}
