//! Configuration structs with sensible defaults and RON persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Player locomotion tuning.
    pub player: PlayerConfig,
    /// Terrain generation and streaming.
    pub terrain: TerrainConfig,
    /// Third-person camera settings.
    pub camera: CameraConfig,
    /// Input settings.
    pub input: InputConfig,
    /// Simulation clock settings.
    pub simulation: SimulationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Player locomotion tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walking speed in world units per second.
    pub walk_speed: f32,
    /// Speed while the boost key is held, in world units per second.
    pub boost_speed: f32,
    /// Vertical acceleration while airborne (negative = down).
    pub gravity: f32,
    /// Initial upward velocity of a jump.
    pub jump_strength: f32,
    /// Below this distance to the terrain the player snaps instead of easing.
    pub ground_snap_epsilon: f32,
    /// Fraction of the remaining terrain gap closed per grounded tick.
    pub ground_smoothing_factor: f32,
    /// Spawn position `[x, y, z]`.
    pub spawn_position: [f32; 3],
}

/// Terrain generation and streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// World seed for deterministic generation.
    pub seed: u64,
    /// Edge length of a terrain chunk in world units.
    pub chunk_size: f32,
    /// Height samples per chunk edge (including both borders).
    pub chunk_resolution: u32,
    /// Number of fBm octaves.
    pub octaves: u32,
    /// Amplitude of the first octave in world units.
    pub amplitude: f64,
    /// Frequency of the first octave.
    pub base_frequency: f64,
    /// Chunks kept resident around the player, in chunks (Chebyshev radius).
    pub stream_radius: u32,
    /// Worker threads generating chunks (0 = pick from CPU count).
    pub worker_threads: usize,
}

/// Third-person camera settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance from the player in world units.
    pub distance: f32,
    /// Elevation above the horizon in degrees.
    pub pitch_degrees: f32,
    /// Look-at offset above the player origin.
    pub height_offset: f32,
    /// Interpolation factor for smooth follow (0..=1).
    pub follow_speed: f32,
    /// Start in fly mode (player movement keys disabled).
    pub start_in_fly_mode: bool,
}

/// Input configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Keybinding overrides (action name -> key name).
    pub keybindings: HashMap<String, String>,
}

/// Simulation clock settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed simulation timestep in seconds.
    pub fixed_dt: f64,
    /// Maximum fixed steps run for a single frame.
    pub max_steps_per_frame: u32,
    /// Ticks the headless runner simulates before exiting.
    pub ticks: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Emit a player state line every this many ticks (0 = never).
    pub report_every_ticks: u64,
}

// --- Default implementations ---

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 10.0,
            boost_speed: 30.0,
            gravity: -9.8,
            jump_strength: 5.0,
            ground_snap_epsilon: 0.01,
            ground_smoothing_factor: 0.1,
            spawn_position: [10.0, 0.0, 1.0],
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            chunk_size: 32.0,
            chunk_resolution: 33,
            octaves: 4,
            amplitude: 8.0,
            base_frequency: 0.01,
            stream_radius: 2,
            worker_threads: 0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 15.0,
            pitch_degrees: 20.0,
            height_offset: 1.5,
            follow_speed: 0.1,
            start_in_fly_mode: false,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 10,
            ticks: 600,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            report_every_ticks: 60,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for Wayfarer (`<config_dir>/wayfarer`).
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("wayfarer"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
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
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("walk_speed: 10.0"));
        assert!(ron_str.contains("boost_speed: 30.0"));
    }

    #[test]
    fn test_player_defaults_match_reference_tuning() {
        let player = PlayerConfig::default();
        assert_eq!(player.gravity, -9.8);
        assert_eq!(player.jump_strength, 5.0);
        assert_eq!(player.ground_snap_epsilon, 0.01);
        assert_eq!(player.ground_smoothing_factor, 0.1);
        assert_eq!(player.spawn_position, [10.0, 0.0, 1.0]);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.terrain.seed = 99;
        config
            .input
            .keybindings
            .insert("Jump".to_string(), "KeyJ".to_string());
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(player: (walk_speed: 4.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.player.walk_speed, 4.0);
        assert_eq!(config.player.boost_speed, 30.0);
        assert_eq!(config.terrain, TerrainConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.player.walk_speed = 12.5;
        config.camera.start_in_fly_mode = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.player.gravity = -20.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().player.gravity, -20.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_ron_comments_accepted() {
        let ron_str = "// player tuning\n(\n  // nothing overridden\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
