//! The read-only terrain contract the physics core simulates against.

use glam::IVec3;

use crate::block::BlockProperties;

/// Read-only interface over the external chunk store.
///
/// All lookups are synchronous and must return a safe "no collision /
/// no block" default when the backing chunk is absent — the physics core
/// never blocks or awaits on terrain data.
pub trait TerrainQuery {
    /// Properties of the block at the given block position.
    ///
    /// Returns [`BlockProperties::AIR`] for air and for unloaded terrain.
    fn block_properties(&self, block: IVec3) -> BlockProperties;

    /// Whether the block at the given position is solid.
    fn is_solid(&self, block: IVec3) -> bool {
        self.block_properties(block).solid
    }

    /// Whether the chunk containing the given world-space (x, z) is loaded.
    fn is_chunk_loaded(&self, world_x: f32, world_z: f32) -> bool;

    /// Interpolated ground height at the given world-space (x, z), or
    /// `None` if no ground is available (unloaded chunk or bottomless
    /// column).
    fn ground_height(&self, x: f32, z: f32) -> Option<f32>;
}
