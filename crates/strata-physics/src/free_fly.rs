//! The free-fly controller: direct velocity control with no gravity and no
//! terrain collision.
//!
//! Used by the editor's free camera and by entities in teleport transit.
//! Velocity equals the wish direction scaled by the mode's speed, so motion
//! stops the instant input does.

use crate::entity::Entity;
use crate::error::PhysicsError;

/// Advances one non-colliding entity by `dt` seconds.
pub(crate) fn free_fly_step(entity: &mut Entity, dt: f32) -> Result<(), PhysicsError> {
    let mut wish = entity.wish_move;
    if wish.length_squared() > 1.0 {
        wish = wish.normalize();
    }
    entity.velocity = wish * entity.params.move_speed;
    entity.position += entity.velocity * dt;

    if !entity.position.is_finite() {
        return Err(PhysicsError::NonFinite {
            entity: entity.id,
            quantity: "position",
            position: entity.position,
            mode: entity.mode,
        });
    }
    Ok(())
}
