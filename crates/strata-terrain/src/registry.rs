//! Block type registry: maps compact [`BlockTypeId`] values to named
//! [`BlockDef`] metadata.
//!
//! The registry is built once when world metadata arrives from the server.
//! Air is always ID 0 so that zero-initialized storage represents empty space.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::BlockProperties;

/// Compact identifier stored per block position (2 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockTypeId(pub u16);

impl BlockTypeId {
    /// The air/empty block type.
    pub const AIR: BlockTypeId = BlockTypeId(0);
}

/// Full descriptor for a block type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockDef {
    /// Human-readable name (e.g. "stone", "water", "conveyor_east").
    pub name: String,
    /// Physics-relevant properties.
    pub properties: BlockProperties,
}

/// Errors that can occur during block type registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with the same name has already been registered.
    #[error("duplicate block type name: {0}")]
    DuplicateName(String),
    /// All 65 535 user-defined slots have been consumed.
    #[error("block type registry is full (max 65536 types)")]
    RegistryFull,
}

/// Maps [`BlockTypeId`] → [`BlockDef`] with O(1) lookup by index and
/// O(1) reverse lookup by name.
pub struct BlockRegistry {
    /// Dense array where `index == BlockTypeId.0`.
    types: Vec<BlockDef>,
    /// Reverse lookup: name → ID.
    name_to_id: FxHashMap<String, BlockTypeId>,
}

impl BlockRegistry {
    /// Creates a new registry with Air pre-registered as ID 0.
    pub fn new() -> Self {
        let air = BlockDef {
            name: "air".to_string(),
            properties: BlockProperties::AIR,
        };

        let mut name_to_id = FxHashMap::default();
        name_to_id.insert("air".to_string(), BlockTypeId::AIR);

        Self {
            types: vec![air],
            name_to_id,
        }
    }

    /// Registers a new block type and returns its assigned ID.
    ///
    /// IDs are assigned sequentially starting from 1 (0 is Air).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if a type with the same name
    /// already exists, or [`RegistryError::RegistryFull`] if all 65 536 slots
    /// are consumed.
    pub fn register(&mut self, def: BlockDef) -> Result<BlockTypeId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.types.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockTypeId(self.types.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.types.push(def);
        Ok(id)
    }

    /// Returns the definition for the given ID, if registered.
    pub fn get(&self, id: BlockTypeId) -> Option<&BlockDef> {
        self.types.get(id.0 as usize)
    }

    /// Returns the properties for the given ID, falling back to air for
    /// unknown IDs.
    pub fn properties(&self, id: BlockTypeId) -> &BlockProperties {
        self.types
            .get(id.0 as usize)
            .map(|def| &def.properties)
            .unwrap_or(&BlockProperties::AIR)
    }

    /// Reverse lookup: name → ID.
    pub fn id_by_name(&self, name: &str) -> Option<BlockTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Number of registered block types (including air).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always `false`: air is pre-registered.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
