//! Physics event system.
//!
//! A closed set of tagged variant messages, each carrying a strongly-typed
//! payload, dispatched through a double-buffered [`PhysicsEventBuffer`]:
//! events written in the current frame are readable in the current and next
//! frame, then dropped. Call [`swap`](PhysicsEventBuffer::swap) once per
//! frame.

use glam::{IVec3, Vec3};

use crate::entity::{EntityId, MovementMode};

/// Events emitted by the physics core for downstream collaborators
/// (animation, audio, notifications, network sync).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhysicsEvent {
    /// The entity stepped onto a new supporting block while moving.
    /// Throttled to at most once per configured interval per entity.
    StepOver {
        /// The entity that stepped.
        entity: EntityId,
        /// The new supporting block.
        block: IVec3,
        /// The movement mode at the time of the step.
        mode: MovementMode,
    },
    /// The entity landed after a fall exceeding the fall-flag threshold.
    Landed {
        /// The entity that landed.
        entity: EntityId,
        /// Total distance fallen, blocks.
        fall_distance: f32,
    },
    /// A pending teleport resolved and physics was re-enabled.
    TeleportResolved {
        /// The teleported entity.
        entity: EntityId,
        /// The entity's final position.
        position: Vec3,
    },
}

/// Double-buffered event storage.
#[derive(Default)]
pub struct PhysicsEventBuffer {
    /// Events from the previous frame (readable).
    prev: Vec<PhysicsEvent>,
    /// Events from the current frame (being written).
    current: Vec<PhysicsEvent>,
}

impl PhysicsEventBuffer {
    /// Creates a new empty event buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends an event.
    pub fn send(&mut self, event: PhysicsEvent) {
        self.current.push(event);
    }

    /// Returns all readable events (previous + current frame).
    pub fn read(&self) -> impl Iterator<Item = &PhysicsEvent> {
        self.prev.iter().chain(self.current.iter())
    }

    /// Returns the number of readable events.
    pub fn len(&self) -> usize {
        self.prev.len() + self.current.len()
    }

    /// Returns `true` if there are no readable events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rotates the buffers; call once per frame. Events survive exactly one
    /// swap.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.prev, &mut self.current);
        self.current.clear();
    }
}
