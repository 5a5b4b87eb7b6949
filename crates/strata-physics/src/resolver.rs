//! The movement resolver: one fixed-timestep kinematic update for a single
//! entity against the terrain.
//!
//! Each step applies, in order: climb interpolation (when in flight), water
//! detection, block-driven effects, friction, input acceleration, jump,
//! gravity, slope slide, per-axis collision integration, push-up correction
//! and motion-state bookkeeping. Transient biases (slope slide, auto-move)
//! affect only the current step's integration and are never persisted into
//! the entity's velocity.

use glam::{IVec3, Vec2, Vec3};
use strata_config::PhysicsTuning;
use strata_terrain::{TerrainQuery, corner_gradient};

use crate::collision::{
    self, EPS, HorizontalHit, SNAP_UP, block_span, has_clearance, push_up_feet, resolve_vertical,
    sweep_horizontal,
};
use crate::entity::{ClimbState, Entity, MotionState};
use crate::error::PhysicsError;

/// Facts observed during one resolver step, consumed by the walk-mode
/// controller for event emission.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct StepFacts {
    /// Total fall distance, set when the entity landed this step.
    pub landed: Option<f32>,
    /// The new supporting block, set when the entity crossed a block
    /// boundary this step.
    pub crossed_block: Option<IVec3>,
    /// Whether a smooth auto-climb was initiated this step.
    pub climb_started: bool,
}

/// Block-driven effects gathered from the terrain under the entity.
#[derive(Clone, Copy, Debug, Default)]
struct BlockEffects {
    /// Component-wise maximum of the auto-move vectors in range.
    auto_move: Option<Vec3>,
    /// Target yaw of an auto-orientation block, radians.
    orientation: Option<f32>,
    /// Whether an auto-jump block is in range.
    auto_jump: bool,
}

/// Advances one entity by `dt` seconds against the terrain.
pub(crate) fn resolve_step(
    entity: &mut Entity,
    terrain: &dyn TerrainQuery,
    tuning: &PhysicsTuning,
    dt: f32,
) -> Result<StepFacts, PhysicsError> {
    let mut facts = StepFacts::default();

    // An in-flight climb owns the position exclusively.
    if let MotionState::Climbing(mut climb) = entity.motion {
        climb.progress = (climb.progress + dt / climb.duration.max(1e-3)).min(1.0);
        entity.position = climb.start.lerp(climb.target, climb.progress);
        if climb.progress >= 1.0 {
            entity.motion = MotionState::Grounded;
            entity.coyote_timer = tuning.coyote_time;
            update_block_pos(entity, &mut facts);
        } else {
            entity.motion = MotionState::Climbing(climb);
        }
        entity.in_water = detect_water(terrain, entity);
        return check_finite(entity, facts);
    }

    entity.in_water = detect_water(terrain, entity);
    let on_climbable = detect_climbable(terrain, entity);

    let effects = scan_block_effects(terrain, entity);
    if effects.auto_jump {
        entity.auto_jump += 1;
    }
    if let Some(target_yaw) = effects.orientation {
        steer_yaw(entity, target_yaw, tuning.auto_orientation_rate * dt);
    }

    // Intention, normalized so diagonals are not faster.
    let mut wish_h = Vec3::new(entity.wish_move.x, 0.0, entity.wish_move.z);
    if wish_h.length_squared() > 1.0 {
        wish_h = wish_h.normalize();
    }
    let wish_v = entity.wish_move.y.clamp(-1.0, 1.0);

    let grounded = entity.grounded();
    if grounded && entity.velocity.y < 0.0 {
        entity.velocity.y = 0.0;
    }

    let (accel, friction) = if grounded {
        (tuning.ground_acceleration, tuning.ground_friction)
    } else {
        (tuning.air_acceleration, tuning.air_friction)
    };

    // Exponential friction, frame-rate independent.
    let decay = (-friction * dt).exp();
    entity.velocity.x *= decay;
    entity.velocity.z *= decay;

    entity.velocity.x += wish_h.x * accel * dt;
    entity.velocity.z += wish_h.z * accel * dt;
    clamp_horizontal(&mut entity.velocity, entity.params.move_speed);

    // Ladder-like blocks grant vertical control to gravity-bound modes.
    if entity.mode.vertical_input() || on_climbable {
        entity.velocity.y *= decay;
        entity.velocity.y += wish_v * accel * dt;
        let cap = entity.params.move_speed;
        entity.velocity.y = entity.velocity.y.clamp(-cap, cap);
    }

    // Jump, consumed exactly once per request; coyote time lets a jump
    // pressed just after leaving a ledge still fire.
    if entity.jump_requested || entity.auto_jump > 0 {
        if entity.grounded() || entity.coyote_timer > 0.0 {
            entity.velocity.y = entity.params.jump_speed;
            entity.motion = MotionState::Airborne;
            entity.jump_active = true;
            entity.coyote_timer = 0.0;
        }
        entity.jump_requested = false;
        entity.auto_jump = 0;
    }

    if entity.mode.has_gravity() && !entity.grounded() && !on_climbable {
        let g = if entity.in_water {
            tuning.underwater_gravity
        } else {
            tuning.gravity
        };
        entity.velocity.y += g * dt;
    }
    if on_climbable {
        entity.fall_distance = 0.0;
    }

    // Transient biases: slope slide and auto-move affect this step's
    // integration only.
    let mut bias = Vec3::ZERO;
    entity.on_slope = false;
    if entity.grounded()
        && let Some((gradient, resistance)) = supporting_slope(terrain, entity)
    {
        entity.on_slope = true;
        let slide = slope_slide(gradient, resistance, tuning.slope_slide_speed);
        bias.x += slide.x;
        bias.z += slide.y;
    }
    if let Some(auto) = effects.auto_move {
        bias += auto;
    }

    let step_velocity = entity.velocity + bias;

    // Horizontal axes, X then Z.
    for axis in [0usize, 2] {
        let delta = axis_component(step_velocity, axis) * dt;
        if delta == 0.0 {
            continue;
        }
        let hit = sweep_horizontal(
            terrain,
            entity.position,
            entity.params.half_width,
            entity.params.height,
            axis,
            delta,
        );
        match hit {
            HorizontalHit::Free => {
                *axis_component_mut(&mut entity.position, axis) += delta;
            }
            HorizontalHit::Obstructed {
                obstacle,
                obstacle_top,
            } => {
                if try_start_climb(entity, terrain, tuning, obstacle, obstacle_top) {
                    facts.climb_started = true;
                    entity.in_water = detect_water(terrain, entity);
                    return check_finite(entity, facts);
                }
                *axis_component_mut(&mut entity.velocity, axis) = 0.0;
            }
            HorizontalHit::Blocked => {
                *axis_component_mut(&mut entity.velocity, axis) = 0.0;
            }
        }
    }

    // Vertical axis.
    let was_airborne = !entity.grounded();
    let vy = step_velocity.y;
    let target_feet = entity.position.y + vy * dt;
    let old_feet = entity.position.y;
    let vert = resolve_vertical(
        terrain,
        entity.position,
        entity.params.half_width,
        entity.params.height,
        target_feet,
        entity.grounded(),
    );
    entity.position.y = vert.new_feet;
    if vert.hit_ceiling {
        entity.velocity.y = 0.0;
    }
    if vy > 0.0 && !vert.hit_ceiling && entity.mode.has_gravity() {
        entity.motion = MotionState::Airborne;
    }
    if vert.supported_by.is_some() {
        if entity.velocity.y <= 0.0 {
            entity.velocity.y = 0.0;
        }
        if entity.mode.has_gravity() {
            if was_airborne {
                facts.landed = Some(entity.fall_distance + (old_feet - vert.new_feet).max(0.0));
                entity.fall_distance = 0.0;
                entity.jump_active = false;
            }
            entity.motion = MotionState::Grounded;
        }
    } else if vy <= 0.0 && entity.mode.has_gravity() {
        entity.motion = MotionState::Airborne;
    }

    if !entity.grounded() && !on_climbable {
        entity.fall_distance += (old_feet - entity.position.y).max(0.0);
    }

    // Minimal upward correction out of intersecting solid blocks.
    if let Some(feet) = push_up_feet(
        terrain,
        entity.position,
        entity.params.half_width,
        entity.params.height,
    ) {
        entity.position.y = feet;
        entity.velocity.y = entity.velocity.y.max(0.0);
    }

    if entity.grounded() {
        entity.coyote_timer = tuning.coyote_time;
    } else {
        entity.coyote_timer = (entity.coyote_timer - dt).max(0.0);
    }

    update_block_pos(entity, &mut facts);
    check_finite(entity, facts)
}

fn check_finite(entity: &Entity, facts: StepFacts) -> Result<StepFacts, PhysicsError> {
    if !entity.position.is_finite() {
        return Err(PhysicsError::NonFinite {
            entity: entity.id,
            quantity: "position",
            position: entity.position,
            mode: entity.mode,
        });
    }
    if !entity.velocity.is_finite() {
        return Err(PhysicsError::NonFinite {
            entity: entity.id,
            quantity: "velocity",
            position: entity.position,
            mode: entity.mode,
        });
    }
    Ok(facts)
}

fn axis_component(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

fn axis_component_mut(v: &mut Vec3, axis: usize) -> &mut f32 {
    match axis {
        0 => &mut v.x,
        1 => &mut v.y,
        _ => &mut v.z,
    }
}

fn clamp_horizontal(velocity: &mut Vec3, max_speed: f32) {
    let h = Vec2::new(velocity.x, velocity.z);
    let speed = h.length();
    if speed > max_speed && speed > 0.0 {
        let scale = max_speed / speed;
        velocity.x *= scale;
        velocity.z *= scale;
    }
}

/// Whether any block in the entity's vertical center column is liquid.
fn detect_water(terrain: &dyn TerrainQuery, entity: &Entity) -> bool {
    column_any(terrain, entity, |props| props.liquid)
}

/// Whether any block in the entity's vertical center column is climbable.
fn detect_climbable(terrain: &dyn TerrainQuery, entity: &Entity) -> bool {
    column_any(terrain, entity, |props| props.climbable)
}

fn column_any(
    terrain: &dyn TerrainQuery,
    entity: &Entity,
    pred: impl Fn(&strata_terrain::BlockProperties) -> bool,
) -> bool {
    let x = entity.position.x.floor() as i32;
    let z = entity.position.z.floor() as i32;
    let feet = entity.position.y;
    for y in block_span(feet + EPS, feet + entity.params.height) {
        if pred(&terrain.block_properties(IVec3::new(x, y, z))) {
            return true;
        }
    }
    false
}

/// Gathers auto-move, auto-orientation and auto-jump effects from the block
/// at the entity's feet and the block one unit below.
fn scan_block_effects(terrain: &dyn TerrainQuery, entity: &Entity) -> BlockEffects {
    let feet_block = IVec3::new(
        entity.position.x.floor() as i32,
        (entity.position.y + EPS).floor() as i32,
        entity.position.z.floor() as i32,
    );
    let mut effects = BlockEffects::default();
    for block in [feet_block, feet_block - IVec3::Y] {
        let props = terrain.block_properties(block);
        if let Some(auto) = props.auto_move {
            effects.auto_move = Some(match effects.auto_move {
                // Overlapping effects combine by per-axis maximum, never
                // by summing.
                Some(prev) => prev.max(auto),
                None => auto,
            });
        }
        if effects.orientation.is_none() {
            effects.orientation = props.auto_orientation_y;
        }
        effects.auto_jump |= props.auto_jump;
    }
    effects
}

/// Gradient and resistance of the sloped block supporting the entity, if it
/// stands on one.
fn supporting_slope(terrain: &dyn TerrainQuery, entity: &Entity) -> Option<(Vec2, f32)> {
    let block = IVec3::new(
        entity.position.x.floor() as i32,
        (entity.position.y - EPS).floor() as i32,
        entity.position.z.floor() as i32,
    );
    let props = terrain.block_properties(block);
    let corners = props.corner_heights?;
    let fx = (entity.position.x - block.x as f32).clamp(0.0, 1.0);
    let fz = (entity.position.z - block.z as f32).clamp(0.0, 1.0);
    Some((corner_gradient(corners, fx, fz), props.resistance))
}

/// Downhill slide velocity for a sloped surface: along the negative
/// gradient, scaled down by the block's resistance. Resistance 1 pins the
/// entity in place.
pub(crate) fn slope_slide(gradient: Vec2, resistance: f32, slide_speed: f32) -> Vec2 {
    -gradient * slide_speed * (1.0 - resistance.clamp(0.0, 1.0))
}

/// Rotates the entity's yaw toward `target` along the shortest arc by at
/// most `max_step` radians.
fn steer_yaw(entity: &mut Entity, target: f32, max_step: f32) {
    let diff = wrap_angle(target - entity.rotation.yaw);
    let step = diff.clamp(-max_step, max_step);
    entity.rotation.yaw = wrap_angle(entity.rotation.yaw + step);
}

fn wrap_angle(a: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (a + PI).rem_euclid(TAU) - PI
}

/// Initiates a smooth auto-climb onto `obstacle` when the step is low
/// enough (or the block opts in regardless of height), the entity is
/// grounded and moving, and the stepped-up position has clearance.
fn try_start_climb(
    entity: &mut Entity,
    terrain: &dyn TerrainQuery,
    tuning: &PhysicsTuning,
    obstacle: IVec3,
    obstacle_top: f32,
) -> bool {
    if !entity.grounded() || entity.climb_initiated {
        return false;
    }
    let rise = obstacle_top - entity.position.y;
    let props = terrain.block_properties(obstacle);
    if rise > tuning.max_climb_height && !props.auto_climbable {
        return false;
    }
    // Small rises are resolved by the grounded snap instead.
    if rise <= collision::STEP_EPS || rise > 1.0 + SNAP_UP {
        return false;
    }

    let target = Vec3::new(
        obstacle.x as f32 + 0.5,
        obstacle_top,
        obstacle.z as f32 + 0.5,
    );
    if !has_clearance(
        terrain,
        target.x,
        target.z,
        entity.params.half_width,
        obstacle_top,
        entity.params.height,
        obstacle,
    ) {
        return false;
    }

    let distance = (target - entity.position).length();
    let speed = entity.params.move_speed.max(0.1);
    entity.motion = MotionState::Climbing(ClimbState {
        start: entity.position,
        target,
        progress: 0.0,
        duration: (distance / speed).max(1e-3),
    });
    entity.velocity.y = 0.0;
    entity.climb_initiated = true;
    true
}

fn update_block_pos(entity: &mut Entity, facts: &mut StepFacts) {
    let block = IVec3::new(
        entity.position.x.floor() as i32,
        (entity.position.y - 1e-3).floor() as i32,
        entity.position.z.floor() as i32,
    );
    if block != entity.last_block_pos {
        entity.last_block_pos = block;
        facts.crossed_block = Some(block);
    }
}
