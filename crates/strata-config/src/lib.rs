//! Configuration system for the strata client physics core.
//!
//! Provides runtime-configurable settings that persist to disk as RON files:
//! shared kinematic constants, the per-movement-state parameter table, and
//! world metadata. Supports hot-reload detection and forward/backward
//! compatible serialization.

mod config;
mod error;

pub use config::{
    Config, DebugConfig, MovementModesConfig, MovementStateParams, PhysicsTuning, WorldConfig,
};
pub use error::ConfigError;
