//! Render hand-off.
//!
//! The core does not draw. After the late update it walks the arena in id
//! order and, for each entity, hands its visible drawables to a [`Renderer`]
//! front to back. Layer 0 is the frontmost drawable of that entity.

use crate::arena::Arena;
use crate::entity::{Component, ComponentTag, EntityId, Transform};

/// One drawable ready for a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand<'a> {
    /// Owning entity
    pub entity: EntityId,
    /// World transform of the drawable
    pub transform: Transform,
    /// The sprite or text label
    pub component: &'a Component,
    /// Position in the entity's paint order, 0 = front
    pub layer: usize,
}

/// Drawing backend.
pub trait Renderer {
    /// Draws one component.
    fn draw(&mut self, command: &DrawCommand<'_>);
}

/// Sends every visible drawable in the arena to `renderer`.
///
/// Returns the number of draw commands issued.
pub fn render_arena(arena: &Arena, renderer: &mut dyn Renderer) -> usize {
    let mut issued = 0;
    for entity in arena.entities_sorted() {
        for (layer, component) in entity.components().drawables().enumerate() {
            if !component.is_visible() {
                continue;
            }
            let command = DrawCommand {
                entity: entity.id(),
                transform: component.world_transform(entity.transform()),
                component,
                layer,
            };
            renderer.draw(&command);
            issued += 1;
        }
    }
    issued
}

/// Owned summary of a [`DrawCommand`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    /// Owning entity
    pub entity: EntityId,
    /// Which drawable
    pub tag: ComponentTag,
    /// World transform
    pub transform: Transform,
    /// Paint-order layer
    pub layer: usize,
}

/// Renderer that records what it was asked to draw.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    calls: Vec<DrawCall>,
}

impl DrawList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls in issue order.
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Forgets recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Renderer for DrawList {
    fn draw(&mut self, command: &DrawCommand<'_>) {
        self.calls.push(DrawCall {
            entity: command.entity,
            tag: command.component.tag(),
            transform: command.transform,
            layer: command.layer,
        });
    }
}
