//! Kinematic character physics over voxel terrain: per-axis collision,
//! movement modes, auto-climb, block-driven effects and the world update loop.

pub mod entity;
pub mod error;
pub mod events;
pub mod flags;
pub mod world;

mod collision;
mod free_fly;
mod resolver;
mod walk;

pub use entity::{
    ClimbState, EffectiveParams, Entity, EntityId, MotionState, MovementMode, Rotation,
};
pub use error::PhysicsError;
pub use events::{PhysicsEvent, PhysicsEventBuffer};
pub use flags::{
    FALL_PRIORITY, FlagStack, JUMP_PRIORITY, MovementFlag, PriorityFlagStack, SWIM_PRIORITY,
};
pub use world::PhysicsWorld;
