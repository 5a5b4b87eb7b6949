//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level client physics configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Shared kinematic integration constants.
    pub physics: PhysicsTuning,
    /// Per-movement-state parameter table.
    pub movement: MovementModesConfig,
    /// World metadata (bounds, chunk size).
    pub world: WorldConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Shared integration constants for all gravity-affected movement modes.
///
/// Per-mode values (speed, jump speed, turn speed) live in
/// [`MovementModesConfig`]; only the constants common to every mode are here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration in blocks/s² (negative = down).
    pub gravity: f32,
    /// Gravity applied while the entity is in water (slow sinking).
    pub underwater_gravity: f32,
    /// Horizontal acceleration while grounded, blocks/s².
    pub ground_acceleration: f32,
    /// Horizontal acceleration while airborne, blocks/s².
    pub air_acceleration: f32,
    /// Exponential friction coefficient while grounded (1/s).
    pub ground_friction: f32,
    /// Exponential friction coefficient while airborne (1/s).
    pub air_friction: f32,
    /// Grace window after leaving the ground during which a jump still fires.
    pub coyote_time: f32,
    /// Maximum footing height difference auto-climb will step over.
    pub max_climb_height: f32,
    /// Downhill speed induced by a unit slope gradient at zero resistance.
    pub slope_slide_speed: f32,
    /// Accumulated fall distance above which the FALL state flag enables.
    pub fall_flag_threshold: f32,
    /// Minimum interval between step-sound events per entity, seconds.
    pub step_sound_interval: f32,
    /// Yaw rotation rate for auto-orientation blocks, radians/s.
    pub auto_orientation_rate: f32,
    /// Interval between teleport chunk-readiness polls, seconds.
    pub teleport_poll_interval: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: -20.0,
            underwater_gravity: -0.5,
            ground_acceleration: 40.0,
            air_acceleration: 8.0,
            ground_friction: 10.0,
            air_friction: 1.0,
            coyote_time: 0.1,
            max_climb_height: 0.6,
            slope_slide_speed: 3.0,
            fall_flag_threshold: 1.5,
            step_sound_interval: 0.35,
            auto_orientation_rate: 3.0,
            teleport_poll_interval: 1.0,
        }
    }
}

/// Cached per-movement-state parameters.
///
/// One instance per movement mode; resolved onto the entity when its mode or
/// configuration changes so hot-path code never re-reads the table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovementStateParams {
    /// Horizontal movement speed in blocks/s.
    pub move_speed: f32,
    /// Upward velocity applied on jump, blocks/s.
    pub jump_speed: f32,
    /// Turn speed in radians/s.
    pub turn_speed: f32,
    /// Eye height above the feet, blocks.
    pub eye_height: f32,
    /// Maximum block-selection distance, blocks.
    pub selection_radius: f32,
    /// Collision box width, blocks.
    pub width: f32,
    /// Collision box height, blocks.
    pub height: f32,
}

impl Default for MovementStateParams {
    fn default() -> Self {
        Self {
            move_speed: 4.5,
            jump_speed: 8.0,
            turn_speed: 2.5,
            eye_height: 1.62,
            selection_radius: 4.0,
            width: 0.6,
            height: 1.8,
        }
    }
}

/// Per-movement-state parameter table, one entry per mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovementModesConfig {
    /// Normal grounded movement.
    pub walk: MovementStateParams,
    /// Faster grounded movement.
    pub sprint: MovementStateParams,
    /// Slow movement with a reduced collision box and eye height.
    pub crouch: MovementStateParams,
    /// Movement in water.
    pub swim: MovementStateParams,
    /// Movement on climbable blocks.
    pub climb: MovementStateParams,
    /// Gravity-free movement with terrain collision.
    pub fly: MovementStateParams,
    /// Collision-free editor movement.
    pub free_fly: MovementStateParams,
    /// Collision-free teleport transit.
    pub teleport: MovementStateParams,
}

impl Default for MovementModesConfig {
    fn default() -> Self {
        let base = MovementStateParams::default();
        Self {
            walk: base,
            sprint: MovementStateParams {
                move_speed: 6.5,
                ..base
            },
            crouch: MovementStateParams {
                move_speed: 2.0,
                eye_height: 1.4,
                height: 1.5,
                ..base
            },
            swim: MovementStateParams {
                move_speed: 3.0,
                jump_speed: 4.0,
                ..base
            },
            climb: MovementStateParams {
                move_speed: 2.5,
                jump_speed: 5.0,
                ..base
            },
            fly: MovementStateParams {
                move_speed: 10.0,
                jump_speed: 0.0,
                ..base
            },
            free_fly: MovementStateParams {
                move_speed: 20.0,
                jump_speed: 0.0,
                ..base
            },
            teleport: MovementStateParams {
                move_speed: 0.0,
                jump_speed: 0.0,
                ..base
            },
        }
    }
}

/// World metadata consumed by the physics core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Lower corner of the world bounds, blocks.
    pub bounds_start: [f32; 3],
    /// Upper corner of the world bounds, blocks.
    pub bounds_stop: [f32; 3],
    /// Horizontal chunk edge length, blocks.
    pub chunk_size: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds_start: [-512.0, 0.0, -512.0],
            bounds_stop: [512.0, 256.0, 512.0],
            chunk_size: 16,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Show entity collision boxes.
    pub show_collision_boxes: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_collision_boxes: false,
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::ReadError {
                    path: config_path.clone(),
                    source,
                })?;
            let config: Config =
                ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
                    path: config_path.clone(),
                    source,
                })?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::WriteError {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::WriteError {
            path: config_path,
            source,
        })?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents =
            std::fs::read_to_string(&config_path).map_err(|source| ConfigError::ReadError {
                path: config_path.clone(),
                source,
            })?;
        let new_config: Config =
            ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
                path: config_path,
                source,
            })?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
