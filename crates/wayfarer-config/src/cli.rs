//! Command-line argument parsing for Wayfarer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Wayfarer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "wayfarer", about = "Wayfarer headless locomotion simulation")]
pub struct CliArgs {
    /// Number of fixed ticks to simulate.
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Terrain seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Walking speed in world units per second.
    #[arg(long)]
    pub walk_speed: Option<f32>,

    /// Boosted speed in world units per second.
    #[arg(long)]
    pub boost_speed: Option<f32>,

    /// Start with the camera in fly mode.
    #[arg(long)]
    pub fly: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ticks) = args.ticks {
            self.simulation.ticks = ticks;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(speed) = args.walk_speed {
            self.player.walk_speed = speed;
        }
        if let Some(speed) = args.boost_speed {
            self.player.boost_speed = speed;
        }
        if let Some(fly) = args.fly {
            self.camera.start_in_fly_mode = fly;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
