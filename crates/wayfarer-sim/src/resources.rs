//! ECS resources shared by the fixed-step systems.
//!
//! Everything the tick needs lives in the world as a resource; nothing is
//! global.

use bevy_ecs::prelude::*;
use wayfarer_input::{InputMap, InputSnapshot, KeyboardState};
use wayfarer_player::{
    LocomotionController, LocomotionError, PlayerState, ThirdPersonCamera, TickReport,
};
use wayfarer_terrain::{ChunkedElevation, ElevationProvider, ElevationStreamer};

#[derive(Resource, Debug, Clone)]
pub struct PlayerRes(pub PlayerState);

#[derive(Resource, Debug, Clone)]
pub struct ControllerRes(pub LocomotionController);

#[derive(Resource, Debug, Clone)]
pub struct CameraRes(pub ThirdPersonCamera);

/// Keyboard state for the current frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct KeyboardRes(pub KeyboardState);

#[derive(Resource, Debug, Clone)]
pub struct BindingsRes(pub InputMap);

/// Snapshot captured at the start of the current fixed step.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SnapshotRes(pub InputSnapshot);

/// Fixed-step clock.
#[derive(Resource, Debug, Clone, Copy)]
pub struct FixedTime {
    /// Seconds per fixed step.
    pub delta: f32,
    /// Fixed steps completed.
    pub ticks: u64,
}

/// Report from the most recent accepted tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct LastTick(pub TickReport);

/// Set by the locomotion system when a tick is rejected. The host takes it
/// after each step and turns it into an error.
#[derive(Resource, Debug, Default)]
pub struct TickFault(pub Option<LocomotionError>);

/// Where terrain heights come from.
#[derive(Resource)]
pub enum Ground {
    /// Chunks generated in the background around the player.
    Streamed {
        store: ChunkedElevation,
        streamer: ElevationStreamer,
        /// Chebyshev radius, in chunks, kept resident around the player.
        radius: u32,
    },
    /// A fixed provider; nothing is streamed.
    Fixed(Box<dyn ElevationProvider + Send + Sync>),
}

impl Ground {
    /// Resident chunk count; 0 for a fixed provider.
    pub fn resident_chunks(&self) -> usize {
        match self {
            Ground::Streamed { store, .. } => store.len(),
            Ground::Fixed(_) => 0,
        }
    }
}

impl ElevationProvider for Ground {
    fn elevation_at(&self, x: f32, z: f32) -> Option<f32> {
        match self {
            Ground::Streamed { store, .. } => store.elevation_at(x, z),
            Ground::Fixed(provider) => provider.elevation_at(x, z),
        }
    }
}
