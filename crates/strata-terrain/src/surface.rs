//! Sloped-surface math: bilinear corner-height interpolation and gradients.
//!
//! A block may define four corner heights (one per horizontal corner); the
//! supporting surface inside the block is the bilinear interpolation of those
//! corners. The gradient of that surface drives slope sliding.

use glam::Vec2;

use crate::block::BlockProperties;

/// Bilinearly interpolates the four corner heights at the fractional
/// in-block position `(fx, fz)`, each in `[0, 1]`.
///
/// Corner order: `[(-x,-z), (+x,-z), (-x,+z), (+x,+z)]`.
pub fn sample_corner_heights(corners: [f32; 4], fx: f32, fz: f32) -> f32 {
    let fx = fx.clamp(0.0, 1.0);
    let fz = fz.clamp(0.0, 1.0);
    let near = corners[0] + (corners[1] - corners[0]) * fx;
    let far = corners[2] + (corners[3] - corners[2]) * fx;
    near + (far - near) * fz
}

/// Gradient `(dh/dx, dh/dz)` of the bilinear surface at `(fx, fz)`.
///
/// The downhill direction is the negation of the returned vector.
pub fn corner_gradient(corners: [f32; 4], fx: f32, fz: f32) -> Vec2 {
    let fx = fx.clamp(0.0, 1.0);
    let fz = fz.clamp(0.0, 1.0);
    let dx = (corners[1] - corners[0]) * (1.0 - fz) + (corners[3] - corners[2]) * fz;
    let dz = (corners[2] - corners[0]) * (1.0 - fx) + (corners[3] - corners[1]) * fx;
    Vec2::new(dx, dz)
}

/// Height of the supporting surface a block offers at the fractional
/// in-block position `(fx, fz)`, relative to the block's own base.
///
/// A flat solid block supports at its full height 1; a sloped block supports
/// at the interpolated corner height. Non-solid blocks support nothing and
/// return `None`.
pub fn support_height(props: &BlockProperties, fx: f32, fz: f32) -> Option<f32> {
    if !props.solid {
        return None;
    }
    match props.corner_heights {
        Some(corners) => Some(sample_corner_heights(corners, fx, fz)),
        None => Some(1.0),
    }
}
