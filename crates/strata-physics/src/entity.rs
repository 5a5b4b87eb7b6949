//! The entity record: plain data describing one physically simulated actor.

use glam::{IVec3, Vec3};
use strata_config::{MovementModesConfig, MovementStateParams};

/// Stable identifier, unique among registered entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Movement mode of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementMode {
    /// Normal grounded movement.
    Walk,
    /// Faster grounded movement.
    Sprint,
    /// Slow movement with a reduced collision box.
    Crouch,
    /// Movement in water.
    Swim,
    /// Movement on climbable blocks.
    Climb,
    /// Gravity disabled, terrain collision still enforced.
    Fly,
    /// No collision, no gravity; editor builds only.
    FreeFly,
    /// No collision, no gravity; teleport transit.
    Teleport,
}

impl MovementMode {
    /// Whether gravity applies in this mode.
    pub fn has_gravity(self) -> bool {
        matches!(
            self,
            MovementMode::Walk | MovementMode::Sprint | MovementMode::Crouch | MovementMode::Swim
        )
    }

    /// Whether terrain collision is enforced in this mode.
    pub fn has_collision(self) -> bool {
        !matches!(self, MovementMode::FreeFly | MovementMode::Teleport)
    }

    /// Whether the vertical wish-move component drives vertical velocity.
    pub fn vertical_input(self) -> bool {
        matches!(
            self,
            MovementMode::Swim
                | MovementMode::Climb
                | MovementMode::Fly
                | MovementMode::FreeFly
                | MovementMode::Teleport
        )
    }

    /// Whether the JUMP/FALL state flags may be inferred automatically.
    ///
    /// Manually chosen modes suppress automatic inference so player-chosen
    /// intent is not overridden.
    pub fn infers_state_flags(self) -> bool {
        matches!(self, MovementMode::Walk | MovementMode::Swim)
    }
}

/// Yaw/pitch/roll in radians; set externally, read-only to physics except
/// for auto-orientation blocks which steer the yaw.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    /// Rotation around the vertical axis. Yaw 0 faces -Z.
    pub yaw: f32,
    /// Rotation around the horizontal right axis.
    pub pitch: f32,
    /// Rotation around the view axis.
    pub roll: f32,
}

/// An in-flight smooth auto-climb interpolation.
///
/// While present it fully owns the entity's position until it completes or
/// is cancelled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimbState {
    /// Position when the climb started.
    pub start: Vec3,
    /// Stepped-up target position.
    pub target: Vec3,
    /// Normalized progress in `[0, 1]`.
    pub progress: f32,
    /// Total duration in seconds (`distance / move_speed`).
    pub duration: f32,
}

/// Kinematic state of an entity: whether it stands, falls, or climbs.
///
/// "A climb is in progress" is a type-level fact, not a null check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionState {
    /// Standing on a supporting surface.
    Grounded,
    /// No supporting surface under the feet.
    Airborne,
    /// A smooth auto-climb interpolation is in flight.
    Climbing(ClimbState),
}

/// Cached per-mode values, recomputed on mode/configuration change so
/// hot-path code never re-resolves the configuration table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectiveParams {
    /// Horizontal movement speed, blocks/s.
    pub move_speed: f32,
    /// Upward velocity applied on jump, blocks/s.
    pub jump_speed: f32,
    /// Turn speed, radians/s.
    pub turn_speed: f32,
    /// Eye height above the feet, blocks.
    pub eye_height: f32,
    /// Maximum block-selection distance, blocks.
    pub selection_radius: f32,
    /// Half of the collision box width, blocks.
    pub half_width: f32,
    /// Collision box height, blocks.
    pub height: f32,
}

impl EffectiveParams {
    /// Resolves the cached values for a mode from the configuration table.
    pub fn for_mode(mode: MovementMode, modes: &MovementModesConfig) -> Self {
        let params: &MovementStateParams = match mode {
            MovementMode::Walk => &modes.walk,
            MovementMode::Sprint => &modes.sprint,
            MovementMode::Crouch => &modes.crouch,
            MovementMode::Swim => &modes.swim,
            MovementMode::Climb => &modes.climb,
            MovementMode::Fly => &modes.fly,
            MovementMode::FreeFly => &modes.free_fly,
            MovementMode::Teleport => &modes.teleport,
        };
        Self {
            move_speed: params.move_speed,
            jump_speed: params.jump_speed,
            turn_speed: params.turn_speed,
            eye_height: params.eye_height,
            selection_radius: params.selection_radius,
            half_width: params.width * 0.5,
            height: params.height,
        }
    }
}

/// One physically simulated actor.
///
/// Created and registered once, unregistered on disposal; the physics core
/// only mutates the kinematic fields.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Stable identifier.
    pub id: EntityId,
    /// Feet position in world (block) units; mutated in place by controllers.
    pub position: Vec3,
    /// Velocity in blocks/s.
    pub velocity: Vec3,
    /// Yaw/pitch/roll for direction-relative input mapping.
    pub rotation: Rotation,
    /// Current movement mode.
    pub mode: MovementMode,
    /// Accumulated movement intention for the current frame; consumed and
    /// reset to zero every simulation step.
    pub wish_move: Vec3,
    /// Grounded / airborne / climbing.
    pub motion: MotionState,
    /// Whether the entity stands on a sloped (corner-height) surface.
    pub on_slope: bool,
    /// Whether the entity's vertical span intersects liquid.
    pub in_water: bool,
    /// One-shot jump request, consumed within the same frame's step.
    pub jump_requested: bool,
    /// True from jump takeoff until the next grounding; drives the JUMP flag.
    pub jump_active: bool,
    /// Remaining coyote-time window, seconds.
    pub coyote_timer: f32,
    /// Distance fallen since leaving the ground; reset on landing.
    pub fall_distance: f32,
    /// Pending block-driven automatic jump triggers.
    pub auto_jump: u32,
    /// Cached supporting block position, used to detect block-boundary
    /// crossings without redundant terrain lookups.
    pub last_block_pos: IVec3,
    /// Set when a climb was initiated this frame; cleared by the
    /// orchestrator after the entity loop to suppress duplicate resolver
    /// work.
    pub climb_initiated: bool,
    /// Time since the last step-sound event, seconds.
    pub step_sound_timer: f32,
    /// Cached per-mode values.
    pub params: EffectiveParams,
}

impl Entity {
    /// Creates an entity at the given position in walk mode, with cached
    /// parameters resolved from the configuration table.
    pub fn new(id: EntityId, position: Vec3, modes: &MovementModesConfig) -> Self {
        let mode = MovementMode::Walk;
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            rotation: Rotation::default(),
            mode,
            wish_move: Vec3::ZERO,
            motion: MotionState::Airborne,
            on_slope: false,
            in_water: false,
            jump_requested: false,
            jump_active: false,
            coyote_timer: 0.0,
            fall_distance: 0.0,
            auto_jump: 0,
            last_block_pos: position.floor().as_ivec3(),
            climb_initiated: false,
            step_sound_timer: 0.0,
            params: EffectiveParams::for_mode(mode, modes),
        }
    }

    /// Whether the entity currently stands on a supporting surface.
    pub fn grounded(&self) -> bool {
        matches!(self.motion, MotionState::Grounded)
    }

    /// Whether a smooth climb interpolation is in flight.
    pub fn climbing(&self) -> bool {
        matches!(self.motion, MotionState::Climbing(_))
    }

    /// Whether the accumulated fall distance counts as a real fall.
    pub fn was_falling(&self, threshold: f32) -> bool {
        !self.grounded() && self.fall_distance >= threshold
    }

    /// Switches the movement mode, refreshing the cached per-mode values.
    ///
    /// Velocity is reset on every switch so momentum never carries across
    /// modes; gravity-free modes never report grounded.
    pub fn set_mode(&mut self, mode: MovementMode, modes: &MovementModesConfig) {
        self.mode = mode;
        self.velocity = Vec3::ZERO;
        self.params = EffectiveParams::for_mode(mode, modes);
        self.jump_active = false;
        if !mode.has_gravity() {
            self.motion = MotionState::Airborne;
        }
    }

    /// World-forward direction of the entity's yaw (yaw 0 faces -Z).
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.rotation.yaw.sin(), 0.0, -self.rotation.yaw.cos())
    }

    /// World-right direction of the entity's yaw.
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.rotation.yaw.cos(), 0.0, -self.rotation.yaw.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> Entity {
        Entity::new(
            EntityId(1),
            Vec3::new(0.5, 10.0, 0.5),
            &MovementModesConfig::default(),
        )
    }

    #[test]
    fn test_new_entity_defaults() {
        let e = entity();
        assert_eq!(e.mode, MovementMode::Walk);
        assert_eq!(e.velocity, Vec3::ZERO);
        assert_eq!(e.wish_move, Vec3::ZERO);
        assert!(!e.grounded());
        assert!(!e.climbing());
        assert_eq!(e.last_block_pos, glam::IVec3::new(0, 10, 0));
    }

    #[test]
    fn test_mode_predicates() {
        assert!(MovementMode::Walk.has_gravity());
        assert!(MovementMode::Swim.has_gravity());
        assert!(!MovementMode::Fly.has_gravity());
        assert!(MovementMode::Fly.has_collision());
        assert!(!MovementMode::FreeFly.has_collision());
        assert!(!MovementMode::Teleport.has_collision());
        assert!(MovementMode::Walk.infers_state_flags());
        assert!(MovementMode::Swim.infers_state_flags());
        assert!(!MovementMode::Sprint.infers_state_flags());
        assert!(!MovementMode::Fly.infers_state_flags());
    }

    #[test]
    fn test_set_mode_resets_velocity_and_caches_params() {
        let modes = MovementModesConfig::default();
        let mut e = entity();
        e.velocity = Vec3::new(3.0, -2.0, 1.0);
        e.motion = MotionState::Grounded;

        e.set_mode(MovementMode::Fly, &modes);
        assert_eq!(e.velocity, Vec3::ZERO);
        assert!(!e.grounded(), "fly must not stay grounded");
        assert_eq!(e.params.move_speed, modes.fly.move_speed);

        e.set_mode(MovementMode::Walk, &modes);
        assert_eq!(e.velocity, Vec3::ZERO);
        assert_eq!(e.params.move_speed, modes.walk.move_speed);
    }

    #[test]
    fn test_forward_right_follow_yaw() {
        let mut e = entity();
        // Yaw 0 faces -Z.
        assert!((e.forward() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
        assert!((e.right() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);

        // Quarter turn left: forward becomes -X.
        e.rotation.yaw = std::f32::consts::FRAC_PI_2;
        assert!((e.forward() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((e.right() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_effective_params_half_width() {
        let modes = MovementModesConfig::default();
        let p = EffectiveParams::for_mode(MovementMode::Walk, &modes);
        assert!((p.half_width - modes.walk.width * 0.5).abs() < 1e-6);
        assert_eq!(p.height, modes.walk.height);
    }

    #[test]
    fn test_was_falling_threshold() {
        let mut e = entity();
        e.fall_distance = 1.0;
        assert!(!e.was_falling(1.5));
        e.fall_distance = 2.0;
        assert!(e.was_falling(1.5));
        e.motion = MotionState::Grounded;
        assert!(!e.was_falling(1.5), "grounded entities are not falling");
    }
}
