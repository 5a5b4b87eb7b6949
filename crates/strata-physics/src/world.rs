//! The physics orchestrator: entity registry, movement intention APIs,
//! teleport lifecycle, world bounds and the per-frame update loop.
//!
//! Single-threaded by design: [`PhysicsWorld::update`] runs once per fixed
//! tick on the simulation thread; terrain is read-only during the step.
//! Intention setters (`move_forward`, `jump`, ...) accumulate into the
//! entity's wish-move between ticks and are consumed by the step.

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;
use strata_config::{Config, MovementModesConfig, PhysicsTuning};
use strata_terrain::TerrainQuery;

use crate::entity::{Entity, EntityId, MotionState, MovementMode, Rotation};
use crate::error::PhysicsError;
use crate::events::{PhysicsEvent, PhysicsEventBuffer};
use crate::flags::{FlagStack, MovementFlag, PriorityFlagStack};
use crate::free_fly::free_fly_step;
use crate::walk::walk_step;

/// A pending teleport waiting for its destination chunk.
struct TeleportTask {
    /// Destination block position.
    target: IVec3,
    /// Time since the last chunk poll, seconds.
    elapsed: f32,
}

/// Owns every simulated entity and drives the fixed-timestep update.
pub struct PhysicsWorld {
    tuning: PhysicsTuning,
    modes: MovementModesConfig,
    bounds_min: Vec3,
    bounds_max: Vec3,
    /// Global gate; starts disabled until the surrounding session has its
    /// initial terrain, and is suspended during teleports.
    enabled: bool,
    /// The gate state to restore once the last pending teleport resolves.
    resume_after_teleport: bool,
    entities: FxHashMap<EntityId, Entity>,
    next_id: u32,
    teleports: FxHashMap<EntityId, TeleportTask>,
    flags: FxHashMap<EntityId, PriorityFlagStack>,
    events: PhysicsEventBuffer,
}

impl PhysicsWorld {
    /// Creates an empty world from the loaded configuration. Physics starts
    /// disabled; call [`set_physics_enabled`](Self::set_physics_enabled)
    /// once initial terrain is available.
    pub fn new(config: &Config) -> Self {
        let start = Vec3::from_array(config.world.bounds_start);
        let stop = Vec3::from_array(config.world.bounds_stop);
        Self {
            tuning: config.physics.clone(),
            modes: config.movement.clone(),
            bounds_min: start.min(stop),
            bounds_max: start.max(stop),
            enabled: false,
            resume_after_teleport: false,
            entities: FxHashMap::default(),
            next_id: 0,
            teleports: FxHashMap::default(),
            flags: FxHashMap::default(),
            events: PhysicsEventBuffer::new(),
        }
    }

    /// Registers a new entity at the given feet position, in walk mode.
    pub fn register_entity(&mut self, position: Vec3) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity::new(id, position, &self.modes));
        self.flags.insert(id, PriorityFlagStack::with_physics_sources());
        tracing::debug!(entity = id.0, ?position, "entity registered");
        id
    }

    /// Removes an entity, cancelling any pending teleport for it.
    pub fn unregister_entity(&mut self, id: EntityId) {
        self.entities.remove(&id);
        self.flags.remove(&id);
        if self.teleports.remove(&id).is_some() && self.teleports.is_empty() {
            // Nothing left waiting on terrain.
            self.enabled = self.resume_after_teleport;
        }
        tracing::debug!(entity = id.0, "entity unregistered");
    }

    /// Read access to a registered entity.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Write access to a registered entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Globally enables or disables simulation. While a teleport is pending
    /// the request is remembered and applied once the teleport resolves.
    pub fn set_physics_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::info!(enabled, "physics toggled");
        }
        self.resume_after_teleport = enabled;
        self.enabled = enabled && self.teleports.is_empty();
    }

    /// Whether simulation currently runs.
    pub fn is_physics_enabled(&self) -> bool {
        self.enabled
    }

    /// Accumulates forward/backward movement intention (positive = forward
    /// along the entity's yaw).
    pub fn move_forward(&mut self, id: EntityId, amount: f32) {
        let Some(entity) = self.entities.get_mut(&id) else {
            tracing::warn!(entity = id.0, "move_forward on unknown entity");
            return;
        };
        let dir = entity.forward();
        entity.wish_move += dir * amount;
    }

    /// Accumulates strafe movement intention (positive = right).
    pub fn move_right(&mut self, id: EntityId, amount: f32) {
        let Some(entity) = self.entities.get_mut(&id) else {
            tracing::warn!(entity = id.0, "move_right on unknown entity");
            return;
        };
        let dir = entity.right();
        entity.wish_move += dir * amount;
    }

    /// Accumulates vertical movement intention; only modes with vertical
    /// input respond to it.
    pub fn move_up(&mut self, id: EntityId, amount: f32) {
        let Some(entity) = self.entities.get_mut(&id) else {
            tracing::warn!(entity = id.0, "move_up on unknown entity");
            return;
        };
        entity.wish_move.y += amount;
    }

    /// Requests a jump; consumed by the next step, subject to grounding or
    /// coyote time.
    pub fn jump(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(&id) else {
            tracing::warn!(entity = id.0, "jump on unknown entity");
            return;
        };
        entity.jump_requested = true;
    }

    /// Sets an entity's view rotation (external input; auto-orientation
    /// blocks also steer the yaw during steps).
    pub fn set_rotation(&mut self, id: EntityId, rotation: Rotation) {
        let Some(entity) = self.entities.get_mut(&id) else {
            tracing::warn!(entity = id.0, "set_rotation on unknown entity");
            return;
        };
        entity.rotation = rotation;
    }

    /// Switches an entity's movement mode. Switching to the current mode is
    /// a no-op and never resets velocity.
    pub fn set_movement_mode(
        &mut self,
        id: EntityId,
        mode: MovementMode,
    ) -> Result<(), PhysicsError> {
        #[cfg(not(feature = "editor"))]
        if mode == MovementMode::FreeFly {
            return Err(PhysicsError::ModeUnavailable(mode));
        }
        let Some(entity) = self.entities.get_mut(&id) else {
            tracing::warn!(entity = id.0, ?mode, "set_movement_mode on unknown entity");
            return Err(PhysicsError::UnknownEntity(id));
        };
        if entity.mode != mode {
            tracing::debug!(entity = id.0, from = ?entity.mode, to = ?mode, "mode switch");
            entity.set_mode(mode, &self.modes);
        }
        Ok(())
    }

    /// Toggles between the given mode and walk.
    pub fn toggle_movement_mode(
        &mut self,
        id: EntityId,
        mode: MovementMode,
    ) -> Result<(), PhysicsError> {
        let current = self
            .entities
            .get(&id)
            .ok_or(PhysicsError::UnknownEntity(id))?
            .mode;
        let next = if current == mode { MovementMode::Walk } else { mode };
        self.set_movement_mode(id, next)
    }

    /// The entity's effective horizontal speed, blocks/s.
    pub fn move_speed(&self, id: EntityId) -> Option<f32> {
        self.entities.get(&id).map(|e| e.params.move_speed)
    }

    /// The entity's resolved movement-state flag, if any is active.
    pub fn movement_flag(&self, id: EntityId) -> Option<MovementFlag> {
        self.flags.get(&id).and_then(|stack| stack.resolved())
    }

    /// Starts a teleport to the given block position.
    ///
    /// The entity is seated horizontally centered on the target block with
    /// its feet at the block's base; simulation is suspended until the
    /// destination chunk reports loaded, polled at the configured interval.
    /// The first poll happens on the next update.
    pub fn teleport(&mut self, id: EntityId, target: IVec3, rotation: Option<Rotation>) {
        let Some(entity) = self.entities.get_mut(&id) else {
            tracing::warn!(entity = id.0, "teleport on unknown entity");
            return;
        };
        entity.position = Vec3::new(
            target.x as f32 + 0.5,
            target.y as f32,
            target.z as f32 + 0.5,
        );
        entity.velocity = Vec3::ZERO;
        entity.fall_distance = 0.0;
        // An in-flight climb owns the position; cancel it so it cannot
        // lerp the entity back to the pre-teleport spot.
        entity.motion = MotionState::Airborne;
        entity.wish_move = Vec3::ZERO;
        entity.jump_requested = false;
        if let Some(rotation) = rotation {
            entity.rotation = rotation;
        }
        if self.teleports.is_empty() {
            self.resume_after_teleport = self.enabled;
        }
        self.enabled = false;
        self.teleports.insert(
            id,
            TeleportTask {
                target,
                // Seed one full interval so the next update polls at once.
                elapsed: self.tuning.teleport_poll_interval,
            },
        );
        tracing::info!(entity = id.0, ?target, "teleport started");
    }

    /// Events emitted during the last two frames.
    pub fn events(&self) -> &PhysicsEventBuffer {
        &self.events
    }

    /// Rotates the event buffers; call once per frame after consumers read.
    pub fn swap_events(&mut self) {
        self.events.swap();
    }

    /// Advances the whole world by `dt` seconds.
    ///
    /// Pending teleports are polled even while simulation is suspended; a
    /// failing entity step is logged, the entity reverted, and the loop
    /// continues with the remaining entities.
    pub fn update(&mut self, dt: f32, terrain: &dyn TerrainQuery) {
        self.poll_teleports(dt, terrain);
        if !self.enabled {
            return;
        }

        let bounds_min = self.bounds_min;
        let bounds_max = self.bounds_max;
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            if self.teleports.contains_key(&id) {
                continue;
            }
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            let prev_position = entity.position;
            let prev_velocity = entity.velocity;

            let result = match entity.mode {
                MovementMode::FreeFly | MovementMode::Teleport => free_fly_step(entity, dt),
                _ => walk_step(entity, terrain, &self.tuning, &mut self.events, dt),
            };
            entity.wish_move = Vec3::ZERO;
            entity.climb_initiated = false;

            if let Err(error) = result {
                entity.position = prev_position;
                entity.velocity = prev_velocity;
                tracing::error!(entity = id.0, %error, "entity step failed, state reverted");
                continue;
            }

            clamp_axis(&mut entity.position.x, &mut entity.velocity.x, bounds_min.x, bounds_max.x);
            clamp_axis(&mut entity.position.y, &mut entity.velocity.y, bounds_min.y, bounds_max.y);
            clamp_axis(&mut entity.position.z, &mut entity.velocity.z, bounds_min.z, bounds_max.z);

            // Never walk into terrain that does not exist yet.
            if entity.mode.has_collision()
                && !terrain.is_chunk_loaded(entity.position.x, entity.position.z)
            {
                entity.position.x = prev_position.x;
                entity.position.z = prev_position.z;
                entity.velocity.x = 0.0;
                entity.velocity.z = 0.0;
            }

            if let Some(stack) = self.flags.get_mut(&id) {
                let infer = entity.mode.infers_state_flags();
                stack.set_enabled(MovementFlag::Swim, entity.in_water);
                stack.set_enabled(MovementFlag::Jump, infer && entity.jump_active);
                stack.set_enabled(
                    MovementFlag::Fall,
                    infer && entity.was_falling(self.tuning.fall_flag_threshold),
                );
            }
        }
    }

    fn poll_teleports(&mut self, dt: f32, terrain: &dyn TerrainQuery) {
        if self.teleports.is_empty() {
            return;
        }
        let interval = self.tuning.teleport_poll_interval;
        let mut resolved: Vec<(EntityId, Option<f32>)> = Vec::new();
        for (id, task) in self.teleports.iter_mut() {
            task.elapsed += dt;
            if task.elapsed < interval {
                continue;
            }
            task.elapsed = 0.0;
            let x = task.target.x as f32 + 0.5;
            let z = task.target.z as f32 + 0.5;
            if !terrain.is_chunk_loaded(x, z) {
                continue;
            }
            resolved.push((*id, terrain.ground_height(x, z)));
        }
        for (id, ground) in resolved {
            self.teleports.remove(&id);
            if self.teleports.is_empty() {
                self.enabled = self.resume_after_teleport;
            }
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            if let Some(height) = ground {
                entity.position.y = height;
            }
            entity.velocity = Vec3::ZERO;
            self.events.send(PhysicsEvent::TeleportResolved {
                entity: id,
                position: entity.position,
            });
            tracing::info!(entity = id.0, position = ?entity.position, "teleport resolved");
        }
    }
}

fn clamp_axis(position: &mut f32, velocity: &mut f32, min: f32, max: f32) {
    if *position < min {
        *position = min;
        *velocity = 0.0;
    } else if *position > max {
        *position = max;
        *velocity = 0.0;
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
