//! The walk-mode controller: wraps the movement resolver for every
//! terrain-colliding mode and turns step facts into physics events.
//!
//! Despite the name this controller also drives sprint, crouch, swim, climb
//! and fly; the per-mode differences live in the entity's cached parameters
//! and the mode predicates, not in separate control flow.

use strata_config::PhysicsTuning;
use strata_terrain::TerrainQuery;

use crate::entity::Entity;
use crate::error::PhysicsError;
use crate::events::{PhysicsEvent, PhysicsEventBuffer};
use crate::resolver::resolve_step;

/// Advances one terrain-colliding entity by `dt` seconds and emits
/// step-over and landing events.
pub(crate) fn walk_step(
    entity: &mut Entity,
    terrain: &dyn TerrainQuery,
    tuning: &PhysicsTuning,
    events: &mut PhysicsEventBuffer,
    dt: f32,
) -> Result<(), PhysicsError> {
    entity.step_sound_timer += dt;
    let facts = resolve_step(entity, terrain, tuning, dt)?;

    if let Some(fall_distance) = facts.landed
        && fall_distance >= tuning.fall_flag_threshold
    {
        events.send(PhysicsEvent::Landed {
            entity: entity.id,
            fall_distance,
        });
    }

    // Step-over fires when the entity walks onto a new supporting block,
    // throttled per entity so footstep consumers are not flooded.
    if let Some(block) = facts.crossed_block {
        let moving = entity.velocity.x.abs() + entity.velocity.z.abs() > 0.01
            || facts.climb_started
            || entity.climbing();
        if entity.grounded() && moving && entity.step_sound_timer >= tuning.step_sound_interval {
            events.send(PhysicsEvent::StepOver {
                entity: entity.id,
                block,
                mode: entity.mode,
            });
            entity.step_sound_timer = 0.0;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, MotionState};
    use glam::{IVec3, Vec3};
    use strata_config::MovementModesConfig;
    use strata_terrain::{BlockDef, BlockProperties, BlockRegistry, ChunkStore};

    fn flat_world() -> ChunkStore {
        let mut reg = BlockRegistry::new();
        let stone = reg
            .register(BlockDef {
                name: "stone".to_string(),
                properties: BlockProperties::solid(),
            })
            .unwrap();
        let mut store = ChunkStore::new(reg, 16);
        store.set_all_loaded(true);
        store.fill(IVec3::new(-16, 0, -16), IVec3::new(16, 0, 16), stone);
        store
    }

    fn walker(x: f32, z: f32) -> Entity {
        let mut e = Entity::new(
            EntityId(1),
            Vec3::new(x, 1.0, z),
            &MovementModesConfig::default(),
        );
        e.motion = MotionState::Grounded;
        e
    }

    #[test]
    fn test_landed_event_respects_threshold() {
        let store = flat_world();
        let tuning = PhysicsTuning::default();
        let mut events = PhysicsEventBuffer::new();

        // A short hop stays below the threshold.
        let mut e = walker(0.5, 0.5);
        e.motion = MotionState::Airborne;
        e.position.y = 1.5;
        e.velocity.y = -6.0;
        walk_step(&mut e, &store, &tuning, &mut events, 0.1).unwrap();
        assert!(e.grounded());
        assert!(events.is_empty(), "short drops emit no landing event");

        // A long fall emits one.
        let mut e = walker(0.5, 0.5);
        e.motion = MotionState::Airborne;
        e.position.y = 1.5;
        e.velocity.y = -6.0;
        e.fall_distance = 3.0;
        walk_step(&mut e, &store, &tuning, &mut events, 0.1).unwrap();
        let landed: Vec<_> = events
            .read()
            .filter(|ev| matches!(ev, PhysicsEvent::Landed { .. }))
            .collect();
        assert_eq!(landed.len(), 1);
        match landed[0] {
            PhysicsEvent::Landed { fall_distance, .. } => {
                assert!(*fall_distance >= 3.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_step_over_events_are_throttled() {
        let store = flat_world();
        let tuning = PhysicsTuning::default();
        let mut events = PhysicsEventBuffer::new();

        let mut e = walker(0.5, 0.5);
        // Walk +X across several block boundaries.
        let dt = 0.05;
        let steps = (4.0 / (e.params.move_speed * dt)).ceil() as usize;
        for _ in 0..steps {
            e.wish_move = Vec3::new(1.0, 0.0, 0.0);
            walk_step(&mut e, &store, &tuning, &mut events, dt).unwrap();
        }
        let step_overs = events
            .read()
            .filter(|ev| matches!(ev, PhysicsEvent::StepOver { .. }))
            .count();
        assert!(step_overs >= 1, "crossing blocks must emit step-overs");

        // At most one event per configured interval.
        let elapsed = steps as f32 * dt;
        let max_allowed = (elapsed / tuning.step_sound_interval).ceil() as usize + 1;
        assert!(
            step_overs <= max_allowed,
            "{step_overs} events in {elapsed}s exceeds the throttle"
        );
    }

    #[test]
    fn test_stationary_entity_emits_no_step_over() {
        let store = flat_world();
        let tuning = PhysicsTuning::default();
        let mut events = PhysicsEventBuffer::new();

        let mut e = walker(0.5, 0.5);
        for _ in 0..40 {
            walk_step(&mut e, &store, &tuning, &mut events, 0.05).unwrap();
        }
        assert!(events.is_empty());
    }
}
