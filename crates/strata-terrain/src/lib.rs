//! Terrain query facade for the strata physics core.
//!
//! Provides the block property model (per-face passability, sloped corner
//! heights, block-driven movement effects), the block type registry, the
//! read-only [`TerrainQuery`] contract, and an in-memory chunk store used by
//! the client glue and by tests.

pub mod block;
pub mod query;
pub mod registry;
pub mod store;
pub mod surface;

pub use block::{BlockProperties, Face, PassableFaces};
pub use query::TerrainQuery;
pub use registry::{BlockDef, BlockRegistry, BlockTypeId, RegistryError};
pub use store::{ChunkPos, ChunkStore};
pub use surface::{corner_gradient, sample_corner_heights, support_height};
