//! Texture and font lookup at entity-construction time.
//!
//! The core never loads assets itself. A [`ResourceProvider`] maps names to
//! opaque [`ResourceHandle`]s that are stored in sprites and labels and
//! handed back to the renderer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SpawnError;

/// Kind of named resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Image used by sprites
    Texture,
    /// Typeface used by text labels
    Font,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Texture => write!(f, "texture"),
            Self::Font => write!(f, "font"),
        }
    }
}

/// Opaque reference to a loaded resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// Resource kind
    pub kind: ResourceKind,
    /// Name it was looked up by
    pub name: String,
    /// Provider-assigned id
    pub id: u32,
}

impl ResourceHandle {
    /// Creates a handle.
    #[must_use]
    pub fn new(kind: ResourceKind, name: impl Into<String>, id: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            id,
        }
    }
}

/// Source of named resources.
pub trait ResourceProvider {
    /// Looks up `name`; `None` if the provider does not have it.
    fn lookup(&self, kind: ResourceKind, name: &str) -> Option<ResourceHandle>;

    /// Looks up `name`, turning absence into a construction error.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::MissingResource`] if the lookup fails.
    fn require(&self, kind: ResourceKind, name: &str) -> Result<ResourceHandle, SpawnError> {
        self.lookup(kind, name).ok_or_else(|| SpawnError::MissingResource {
            kind,
            name: name.to_string(),
        })
    }
}

/// In-memory resource table.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    entries: BTreeMap<(ResourceKind, String), u32>,
    next_id: u32,
}

impl ResourceCatalog {
    /// Texture drawn for organisms.
    pub const ORGANISM_TEXTURE: &'static str = "Texture_organism";
    /// Texture drawn for food.
    pub const FOOD_TEXTURE: &'static str = "Texture_food";
    /// Font used for name labels.
    pub const LABEL_FONT: &'static str = "Font_consola";

    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the stock sandbox assets.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.register(ResourceKind::Texture, Self::ORGANISM_TEXTURE);
        catalog.register(ResourceKind::Texture, Self::FOOD_TEXTURE);
        catalog.register(ResourceKind::Font, Self::LABEL_FONT);
        catalog
    }

    /// Registers `name`, returning its handle. Registering twice returns the
    /// existing handle.
    pub fn register(&mut self, kind: ResourceKind, name: &str) -> ResourceHandle {
        let key = (kind, name.to_string());
        let id = match self.entries.get(&key) {
            Some(&id) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                self.entries.insert(key, id);
                id
            }
        };
        ResourceHandle::new(kind, name, id)
    }

    /// Number of registered resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceProvider for ResourceCatalog {
    fn lookup(&self, kind: ResourceKind, name: &str) -> Option<ResourceHandle> {
        self.entries
            .get(&(kind, name.to_string()))
            .map(|&id| ResourceHandle::new(kind, name, id))
    }
}
