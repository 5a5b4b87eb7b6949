//! Movement-state flag publication.
//!
//! The physics core publishes derived movement-state flags (JUMP/FALL/SWIM)
//! through an external priority-based value-override mechanism. This module
//! states the contract the core requires of that mechanism ([`FlagStack`])
//! and provides the reference implementation used per registered entity
//! ([`PriorityFlagStack`]).

/// A named movement-state flag consumed by animation/pose logic, distinct
/// from the authoritative movement mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementFlag {
    /// A jump is in effect.
    Jump,
    /// A fall beyond the threshold is in progress.
    Fall,
    /// The entity is in water.
    Swim,
}

/// Priority of the JUMP source (highest of the three).
pub const JUMP_PRIORITY: u8 = 30;
/// Priority of the FALL source.
pub const FALL_PRIORITY: u8 = 20;
/// Priority of the SWIM source (lowest of the three).
pub const SWIM_PRIORITY: u8 = 10;

/// Contract of the external priority-value mechanism.
///
/// Sources are registered once with a priority and an implicit creation
/// order; they are enabled/disabled every frame; the resolved value is the
/// enabled source with the highest priority (creation order breaks ties —
/// not relied upon here, the three priorities are distinct).
pub trait FlagStack {
    /// Registers a typed value source at the given priority.
    fn register(&mut self, flag: MovementFlag, priority: u8);

    /// Enables or disables a previously registered source.
    fn set_enabled(&mut self, flag: MovementFlag, enabled: bool);

    /// Whether the given source is currently enabled.
    fn is_enabled(&self, flag: MovementFlag) -> bool;

    /// The currently resolved value, if any source is enabled.
    fn resolved(&self) -> Option<MovementFlag>;
}

struct FlagSource {
    flag: MovementFlag,
    priority: u8,
    order: u32,
    enabled: bool,
}

/// Reference implementation of [`FlagStack`].
#[derive(Default)]
pub struct PriorityFlagStack {
    sources: Vec<FlagSource>,
    next_order: u32,
}

impl PriorityFlagStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stack with the three physics sources pre-registered in
    /// creation order: JUMP, FALL, SWIM.
    pub fn with_physics_sources() -> Self {
        let mut stack = Self::new();
        stack.register(MovementFlag::Jump, JUMP_PRIORITY);
        stack.register(MovementFlag::Fall, FALL_PRIORITY);
        stack.register(MovementFlag::Swim, SWIM_PRIORITY);
        stack
    }
}

impl FlagStack for PriorityFlagStack {
    fn register(&mut self, flag: MovementFlag, priority: u8) {
        let order = self.next_order;
        self.next_order += 1;
        self.sources.push(FlagSource {
            flag,
            priority,
            order,
            enabled: false,
        });
    }

    fn set_enabled(&mut self, flag: MovementFlag, enabled: bool) {
        for source in &mut self.sources {
            if source.flag == flag {
                source.enabled = enabled;
            }
        }
    }

    fn is_enabled(&self, flag: MovementFlag) -> bool {
        self.sources
            .iter()
            .any(|source| source.flag == flag && source.enabled)
    }

    fn resolved(&self) -> Option<MovementFlag> {
        self.sources
            .iter()
            .filter(|source| source.enabled)
            .max_by_key(|source| (source.priority, source.order))
            .map(|source| source.flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack_resolves_none() {
        let stack = PriorityFlagStack::with_physics_sources();
        assert_eq!(stack.resolved(), None);
    }

    #[test]
    fn test_highest_priority_wins() {
        let mut stack = PriorityFlagStack::with_physics_sources();
        stack.set_enabled(MovementFlag::Swim, true);
        assert_eq!(stack.resolved(), Some(MovementFlag::Swim));

        stack.set_enabled(MovementFlag::Fall, true);
        assert_eq!(stack.resolved(), Some(MovementFlag::Fall));

        stack.set_enabled(MovementFlag::Jump, true);
        assert_eq!(stack.resolved(), Some(MovementFlag::Jump));

        stack.set_enabled(MovementFlag::Jump, false);
        assert_eq!(stack.resolved(), Some(MovementFlag::Fall));
    }

    #[test]
    fn test_creation_order_breaks_priority_ties() {
        let mut stack = PriorityFlagStack::new();
        stack.register(MovementFlag::Jump, 5);
        stack.register(MovementFlag::Fall, 5);
        stack.set_enabled(MovementFlag::Jump, true);
        stack.set_enabled(MovementFlag::Fall, true);
        assert_eq!(stack.resolved(), Some(MovementFlag::Fall));
    }

    #[test]
    fn test_disable_is_idempotent() {
        let mut stack = PriorityFlagStack::with_physics_sources();
        stack.set_enabled(MovementFlag::Swim, false);
        stack.set_enabled(MovementFlag::Swim, false);
        assert!(!stack.is_enabled(MovementFlag::Swim));
        assert_eq!(stack.resolved(), None);
    }
}
