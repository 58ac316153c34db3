//! Error types.

use thiserror::Error;

use crate::entity::{ActorKind, Component, ComponentTag, SwapSide};
use crate::resources::ResourceKind;

/// Failure to construct an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// A named texture or font is not available.
    ///
    /// This is a configuration error: the spawn is abandoned and nothing is
    /// added to the arena.
    #[error("missing {kind} resource `{name}`")]
    MissingResource {
        /// Kind of resource requested
        kind: ResourceKind,
        /// Name that failed to resolve
        name: String,
    },

    /// The population limit for this kind has been reached.
    #[error("{kind} spawn refused: population limit reached")]
    Refused {
        /// Kind that was refused
        kind: ActorKind,
    },
}

/// Failure to load or validate a [`SimConfig`](crate::config::SimConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config text is not valid JSON for the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Component operation that could not be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// One side of a swap has no component with this tag.
    #[error("cannot swap {tag} component: missing on the {side} entity")]
    Missing {
        /// Tag being swapped
        tag: ComponentTag,
        /// Side that lacked it
        side: SwapSide,
    },
}

/// Insert into a slot that already holds a component.
///
/// Carries the rejected component back to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{tag} slot is already occupied")]
pub struct SlotOccupied {
    /// Slot that was occupied
    pub tag: ComponentTag,
    /// The component that was not inserted
    pub component: Component,
}
