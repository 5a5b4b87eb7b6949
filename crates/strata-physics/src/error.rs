//! Physics error types.

use glam::Vec3;
use thiserror::Error;

use crate::entity::{EntityId, MovementMode};

/// Errors produced by the physics core.
///
/// Per-entity step failures are aggregated and logged by the orchestrator;
/// a single faulty entity never aborts the frame loop. Invalid entity ids on
/// the movement APIs are logged no-ops and never surface as errors.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// The referenced entity is not registered.
    #[error("entity {0:?} is not registered")]
    UnknownEntity(EntityId),

    /// The requested movement mode is not available in this build.
    #[error("movement mode {0:?} is not available in this build")]
    ModeUnavailable(MovementMode),

    /// A step produced a non-finite position or velocity.
    #[error("entity {entity:?} produced a non-finite {quantity} at {position} in mode {mode:?}")]
    NonFinite {
        /// The entity whose step failed.
        entity: EntityId,
        /// Which quantity became non-finite ("position" or "velocity").
        quantity: &'static str,
        /// The entity's position when the failure was detected.
        position: Vec3,
        /// The entity's movement mode when the failure was detected.
        mode: MovementMode,
    },
}
