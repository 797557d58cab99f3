//! Simulation host errors.

use wayfarer_config::ConfigError;
use wayfarer_input::BindingError;
use wayfarer_player::LocomotionError;
use wayfarer_terrain::TerrainError;

/// Anything that stops the simulation from being built or advanced.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A tick was rejected. The player state is unchanged.
    #[error("locomotion tick rejected: {0}")]
    Locomotion(#[from] LocomotionError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error("invalid keybinding: {0}")]
    Binding(#[from] BindingError),

    #[error("failed to read input script: {0}")]
    ScriptRead(#[source] std::io::Error),

    #[error("failed to parse input script: {0}")]
    ScriptParse(#[from] ron::error::SpannedError),
}
