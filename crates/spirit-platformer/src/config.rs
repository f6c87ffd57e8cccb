use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV_VAR: &str = "SPIRIT_PLATFORMER_CONFIG";
/// Config file read when the environment variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/platformer.toml";

/// Player movement and integration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (units/s^2, +y is down).
    pub gravity: f32,
    /// Terminal fall speed (units/s).
    pub max_fall_speed: f32,
    /// Horizontal speed while a direction is held (units/s).
    pub move_speed: f32,
    /// Vertical velocity at the start of a jump (negative is up).
    pub jump_launch_velocity: f32,
    /// How long holding jump keeps extending it (seconds).
    pub max_jump_time: f32,
    /// Exponent shaping the jump falloff curve.
    pub jump_control_power: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Largest integration step (seconds); longer ticks are substepped.
    pub max_step_secs: f32,
    /// Upper bound on substeps per tick.
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 3400.0,
            max_fall_speed: 550.0,
            move_speed: 160.0,
            jump_launch_velocity: -3500.0,
            max_jump_time: 0.35,
            jump_control_power: 0.14,
            player_width: 24.0,
            player_height: 40.0,
            max_step_secs: 1.0 / 60.0,
            max_substeps: 8,
        }
    }
}

/// Patrol parameters shared by every monster type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Patrol speed (units/s).
    pub move_speed: f32,
    /// Pause at a wall or ledge before turning around (seconds).
    pub max_wait_secs: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            move_speed: 64.0,
            max_wait_secs: 0.5,
            width: 26.0,
            height: 30.0,
        }
    }
}

/// Tag bounce and value parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// Bounce angular rate (radians/s).
    pub bounce_rate: f32,
    /// Phase offset per unit of x, so neighbouring tags bob out of step.
    pub bounce_sync: f32,
    /// Bounce amplitude as a fraction of the tile height.
    pub bounce_height: f32,
    /// Score multiplier applied to the tier value.
    pub point_multiplier: u32,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            bounce_rate: 3.0,
            bounce_sync: -0.75,
            bounce_height: 0.18,
            point_multiplier: 1,
        }
    }
}

/// Level-wide rules: timer, completion bonus and hazards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelRules {
    /// Countdown length (seconds).
    pub time_limit_secs: f32,
    /// Bonus points for each second left on the clock at the exit.
    pub points_per_second: u32,
    /// Clock seconds converted to bonus per real second.
    pub bonus_drain_rate: f32,
    /// Touching a patrolling enemy kills a player that is not possessing.
    pub enemy_contact_kills: bool,
}

impl Default for LevelRules {
    fn default() -> Self {
        Self {
            time_limit_secs: 120.0,
            points_per_second: 5,
            bonus_drain_rate: 100.0,
            enemy_contact_kills: true,
        }
    }
}

/// Possession range and release policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionConfig {
    /// Maximum player-to-enemy distance for possession (units).
    pub radius: f32,
    /// Released hosts become inert bodies. When false they resume patrol.
    pub release_kills_host: bool,
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self {
            radius: 80.0,
            release_kills_host: true,
        }
    }
}

/// Procedural level layout parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of chunks between the start and exit chunks.
    pub chunks: u32,
    /// Chunk width in tiles.
    pub chunk_width: u32,
    /// Level height in tiles.
    pub height: u32,
    pub tile_width: f32,
    pub tile_height: f32,
    /// Levels in a generated campaign.
    pub campaign_length: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chunks: 8,
            chunk_width: 12,
            height: 15,
            tile_width: 40.0,
            tile_height: 32.0,
            campaign_length: 3,
        }
    }
}

/// Top-level platformer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub physics: PhysicsConfig,
    pub enemy: EnemyConfig,
    pub tags: TagConfig,
    pub rules: LevelRules,
    pub possession: PossessionConfig,
    pub generation: GenerationConfig,
}

/// Failure reading or parsing a config file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config: {e}"),
            Self::Parse(e) => write!(f, "failed to parse config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}

impl PlatformerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load config from the file named by `SPIRIT_PLATFORMER_CONFIG`, or
    /// `config/platformer.toml`. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path =
            std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::load_from(&path) {
            Ok(cfg) => cfg,
            Err(ConfigError::Io(_)) => PlatformerConfig::default(),
            Err(e) => {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                PlatformerConfig::default()
            },
        }
    }
}
