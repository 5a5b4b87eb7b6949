//! Block property model consumed by the physics core.
//!
//! A block is described by [`BlockProperties`]: solidity, per-face
//! passability, an optional sloped top surface (four corner heights), and the
//! block-driven movement effects (auto-move, auto-orientation, auto-jump).

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One of the six axis-aligned block faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// The face toward negative X.
    NegX,
    /// The face toward positive X.
    PosX,
    /// The face toward negative Y (bottom).
    NegY,
    /// The face toward positive Y (top).
    PosY,
    /// The face toward negative Z.
    NegZ,
    /// The face toward positive Z.
    PosZ,
}

impl Face {
    /// Returns the opposite face.
    pub fn opposite(self) -> Face {
        match self {
            Face::NegX => Face::PosX,
            Face::PosX => Face::NegX,
            Face::NegY => Face::PosY,
            Face::PosY => Face::NegY,
            Face::NegZ => Face::PosZ,
            Face::PosZ => Face::NegZ,
        }
    }

    /// The bit representing this face in a [`PassableFaces`] mask.
    pub const fn bit(self) -> u8 {
        match self {
            Face::NegX => 1 << 0,
            Face::PosX => 1 << 1,
            Face::NegY => 1 << 2,
            Face::PosY => 1 << 3,
            Face::NegZ => 1 << 4,
            Face::PosZ => 1 << 5,
        }
    }

    /// The face of a block crossed when entering it while moving in the
    /// positive (`positive = true`) or negative direction along `axis`
    /// (0 = X, 1 = Y, 2 = Z).
    ///
    /// Moving in +X enters a block through its `NegX` face.
    pub fn entry_face(axis: usize, positive: bool) -> Face {
        match (axis, positive) {
            (0, true) => Face::NegX,
            (0, false) => Face::PosX,
            (1, true) => Face::NegY,
            (1, false) => Face::PosY,
            (2, true) => Face::NegZ,
            (2, false) => Face::PosZ,
            _ => unreachable!("axis out of range"),
        }
    }
}

/// Bitmask of block faces that permit entry/exit independent of solidity.
///
/// An **empty** mask means the block declares no passability at all: plain
/// block semantics apply (solidity alone decides collision). A non-empty mask
/// turns the block into a directional gate: entry and exit are permitted only
/// through the listed faces, and automatic push-up is suppressed for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassableFaces(pub u8);

impl PassableFaces {
    /// No declared passability (plain block semantics).
    pub const NONE: PassableFaces = PassableFaces(0);
    /// All six faces passable.
    pub const ALL: PassableFaces = PassableFaces(0x3F);

    /// Builds a mask from a list of faces.
    pub fn from_faces(faces: &[Face]) -> Self {
        let mut mask = 0u8;
        for face in faces {
            mask |= face.bit();
        }
        PassableFaces(mask)
    }

    /// Returns `true` if the given face is in the mask.
    pub fn contains(self, face: Face) -> bool {
        self.0 & face.bit() != 0
    }

    /// Adds a face to the mask.
    pub fn insert(&mut self, face: Face) {
        self.0 |= face.bit();
    }

    /// Returns `true` if no face is marked passable (no declared passability).
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Physics-relevant description of one block position.
///
/// Returned by [`TerrainQuery::block_properties`](crate::TerrainQuery::block_properties);
/// the default value ([`BlockProperties::AIR`]) is the safe "no collision, no
/// effect" answer used for air and for unloaded terrain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockProperties {
    /// Whether entities collide with this block.
    pub solid: bool,
    /// Directional passability; empty = not declared.
    pub passable_from: PassableFaces,
    /// Optional sloped top surface: heights in `[0, 1]` at the four
    /// horizontal corners, ordered `[(-x,-z), (+x,-z), (-x,+z), (+x,+z)]`.
    /// `None` means a flat full-height top.
    pub corner_heights: Option<[f32; 4]>,
    /// Slide resistance on sloped surfaces: 1 fully suppresses sliding,
    /// 0 lets the full slope-implied velocity apply.
    pub resistance: f32,
    /// Whether the block can be climbed like a ladder.
    pub climbable: bool,
    /// Whether auto-climb may step onto this block regardless of the
    /// configured maximum climb height.
    pub auto_climbable: bool,
    /// Continuous velocity bias applied to entities standing on or in the
    /// block (conveyor/current effect).
    pub auto_move: Option<Vec3>,
    /// Target yaw (radians) the entity is smoothly rotated toward while on
    /// the block.
    pub auto_orientation_y: Option<f32>,
    /// Whether standing on or in the block triggers an automatic jump.
    pub auto_jump: bool,
    /// Whether the block is a liquid (feeds water detection).
    pub liquid: bool,
}

impl BlockProperties {
    /// The empty-space default: no collision, no effects.
    pub const AIR: BlockProperties = BlockProperties {
        solid: false,
        passable_from: PassableFaces::NONE,
        corner_heights: None,
        resistance: 1.0,
        climbable: false,
        auto_climbable: false,
        auto_move: None,
        auto_orientation_y: None,
        auto_jump: false,
        liquid: false,
    };

    /// A plain full solid block.
    pub fn solid() -> BlockProperties {
        BlockProperties {
            solid: true,
            ..BlockProperties::AIR
        }
    }

    /// A liquid block.
    pub fn liquid() -> BlockProperties {
        BlockProperties {
            liquid: true,
            ..BlockProperties::AIR
        }
    }

    /// A solid block with a sloped top surface.
    pub fn sloped(corner_heights: [f32; 4], resistance: f32) -> BlockProperties {
        BlockProperties {
            solid: true,
            corner_heights: Some(corner_heights),
            resistance,
            ..BlockProperties::AIR
        }
    }
}

impl Default for BlockProperties {
    fn default() -> Self {
        BlockProperties::AIR
    }
}
