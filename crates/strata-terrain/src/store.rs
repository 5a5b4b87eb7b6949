//! In-memory chunk store implementing [`TerrainQuery`].
//!
//! The [`ChunkStore`] is the single authority for which chunks are streamed
//! in. It is keyed by [`ChunkPos`] using an
//! [`FxHashMap`](rustc_hash::FxHashMap)-family map for fast hashing of small
//! fixed-size keys. Block contents are stored sparsely; anything unset is
//! air.

use glam::IVec3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::block::BlockProperties;
use crate::query::TerrainQuery;
use crate::registry::{BlockRegistry, BlockTypeId};
use crate::surface::support_height;

/// Identifies a vertical chunk column in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a new chunk position.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing the given world-space (x, z).
    pub fn from_world(world_x: f32, world_z: f32, chunk_size: i32) -> Self {
        Self {
            x: (world_x.floor() as i32).div_euclid(chunk_size),
            z: (world_z.floor() as i32).div_euclid(chunk_size),
        }
    }
}

/// Sparse, chunk-aware block storage.
///
/// Chunks must be marked loaded before their contents answer queries;
/// everything else degrades to the air default.
pub struct ChunkStore {
    registry: BlockRegistry,
    chunk_size: i32,
    /// Vertical range scanned by [`ground_height`](TerrainQuery::ground_height).
    y_range: (i32, i32),
    loaded: FxHashSet<ChunkPos>,
    /// When set, every chunk reports as loaded (local/offline worlds).
    all_loaded: bool,
    blocks: FxHashMap<IVec3, BlockTypeId>,
}

impl ChunkStore {
    /// Creates an empty store over the given registry.
    pub fn new(registry: BlockRegistry, chunk_size: u32) -> Self {
        Self {
            registry,
            chunk_size: chunk_size.max(1) as i32,
            y_range: (0, 256),
            loaded: FxHashSet::default(),
            all_loaded: false,
            blocks: FxHashMap::default(),
        }
    }

    /// Sets the vertical range scanned for ground height.
    pub fn set_y_range(&mut self, min_y: i32, max_y: i32) {
        self.y_range = (min_y.min(max_y), max_y.max(min_y));
    }

    /// Marks every chunk as loaded (local/offline worlds have no streaming).
    pub fn set_all_loaded(&mut self, all_loaded: bool) {
        self.all_loaded = all_loaded;
    }

    /// Marks a chunk as streamed in. Idempotent.
    pub fn load_chunk(&mut self, pos: ChunkPos) {
        if self.loaded.insert(pos) {
            tracing::debug!(chunk_x = pos.x, chunk_z = pos.z, "chunk loaded");
        }
    }

    /// Marks a chunk as streamed out and drops its block contents.
    pub fn unload_chunk(&mut self, pos: ChunkPos) {
        if self.loaded.remove(&pos) {
            self.blocks.retain(|block, _| {
                ChunkPos::from_world(block.x as f32, block.z as f32, self.chunk_size) != pos
            });
            tracing::debug!(chunk_x = pos.x, chunk_z = pos.z, "chunk unloaded");
        }
    }

    /// Number of loaded chunks.
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Sets the block at the given position, marking its chunk loaded.
    pub fn set_block(&mut self, block: IVec3, id: BlockTypeId) {
        self.load_chunk(ChunkPos::from_world(
            block.x as f32,
            block.z as f32,
            self.chunk_size,
        ));
        if id == BlockTypeId::AIR {
            self.blocks.remove(&block);
        } else {
            self.blocks.insert(block, id);
        }
    }

    /// Fills the inclusive block region `[min, max]` with the given type.
    pub fn fill(&mut self, min: IVec3, max: IVec3, id: BlockTypeId) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.set_block(IVec3::new(x, y, z), id);
                }
            }
        }
    }

    /// The block type at the given position (air when unset or unloaded).
    pub fn block_at(&self, block: IVec3) -> BlockTypeId {
        if !self.is_chunk_loaded(block.x as f32, block.z as f32) {
            return BlockTypeId::AIR;
        }
        self.blocks.get(&block).copied().unwrap_or(BlockTypeId::AIR)
    }

    /// The registry backing this store.
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Mutable access to the registry, for registering block types after
    /// construction.
    pub fn registry_mut(&mut self) -> &mut BlockRegistry {
        &mut self.registry
    }
}

impl TerrainQuery for ChunkStore {
    fn block_properties(&self, block: IVec3) -> BlockProperties {
        *self.registry.properties(self.block_at(block))
    }

    fn is_chunk_loaded(&self, world_x: f32, world_z: f32) -> bool {
        self.all_loaded
            || self
                .loaded
                .contains(&ChunkPos::from_world(world_x, world_z, self.chunk_size))
    }

    fn ground_height(&self, x: f32, z: f32) -> Option<f32> {
        if !self.is_chunk_loaded(x, z) {
            return None;
        }

        let bx = x.floor() as i32;
        let bz = z.floor() as i32;
        let fx = x - x.floor();
        let fz = z - z.floor();

        // Top-down scan for the highest supporting surface in the column.
        let (min_y, max_y) = self.y_range;
        for y in (min_y..=max_y).rev() {
            let props = self.registry.properties(self.block_at(IVec3::new(bx, y, bz)));
            if let Some(h) = support_height(props, fx, fz) {
                return Some(y as f32 + h);
            }
        }
        None
    }
}
