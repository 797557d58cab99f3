//! Headless Wayfarer runner.
//!
//! Loads `config.ron`, applies CLI overrides, then replays an input script
//! through the fixed-step simulation over streamed terrain, logging the
//! player's position as it goes. Edits to the player section of
//! `config.ron` are picked up at each report.
//!
//! Run with: `cargo run -p wayfarer-sim -- --ticks 900`

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use wayfarer_config::{CliArgs, Config};
use wayfarer_sim::{InputScript, ScriptPlayer, SimError, Simulation};

#[derive(Parser, Debug)]
#[command(name = "wayfarer", about = "Wayfarer headless locomotion simulation")]
struct RunArgs {
    #[command(flatten)]
    common: CliArgs,

    /// RON input script to replay instead of the built-in tour.
    #[arg(long)]
    script: Option<PathBuf>,

    /// How long to wait for terrain under the spawn point, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    ground_wait_ms: u64,
}

fn main() -> ExitCode {
    let args = RunArgs::parse();

    let config_dir = args.common.config.clone().or_else(|| Config::default_dir().ok());
    let (on_disk, load_error) = match config_dir.as_deref() {
        Some(dir) => match Config::load_or_create(dir) {
            Ok(config) => (Some(config), None),
            Err(err) => (None, Some(err)),
        },
        None => (None, None),
    };
    let mut config = on_disk.clone().unwrap_or_default();
    config.apply_cli_overrides(&args.common);

    let log_dir = config_dir.as_ref().map(|dir| dir.join("logs"));
    wayfarer_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Some(err) = load_error {
        warn!(%err, "using default configuration");
    }

    let watch = config_dir.as_deref().zip(on_disk);
    match run(&config, &args, watch) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "simulation stopped");
            ExitCode::FAILURE
        }
    }
}

/// Re-read `config.ron` and retune the player when it changed. `on_disk` is
/// the file as last read, before CLI overrides.
fn poll_config(sim: &mut Simulation, dir: &Path, on_disk: &mut Config, args: &CliArgs) {
    let reloaded = match on_disk.reload(dir) {
        Ok(Some(reloaded)) => reloaded,
        Ok(None) => return,
        Err(err) => {
            warn!(%err, "config reload failed, keeping current settings");
            return;
        }
    };
    *on_disk = reloaded;
    let mut effective = on_disk.clone();
    effective.apply_cli_overrides(args);
    if let Err(err) = sim.retune(&effective.player) {
        warn!(%err, "ignoring reloaded player settings");
    }
}

fn run(config: &Config, args: &RunArgs, mut watch: Option<(&Path, Config)>) -> Result<(), SimError> {
    let script = match &args.script {
        Some(path) => InputScript::load(path)?,
        None => InputScript::tour(),
    };
    info!(
        frames = script.total_frames(),
        ticks = config.simulation.ticks,
        seed = config.terrain.seed,
        "starting run"
    );

    let mut sim = Simulation::new(config)?;
    if !sim.wait_for_ground(Duration::from_millis(args.ground_wait_ms)) {
        warn!("starting before terrain under the spawn point is ready");
    }

    let mut player = ScriptPlayer::new(script);
    let dt = sim.fixed_dt();
    let report_every = config.debug.report_every_ticks;

    while sim.ticks() < config.simulation.ticks {
        let frame = player.next_frame();
        sim.steer_camera(frame.orbit, frame.zoom);
        let outcome = sim.step(dt, frame.keyboard)?;
        if outcome.steps == 0 {
            continue;
        }
        if report_every > 0 && sim.ticks() % report_every == 0 {
            if let Some((dir, on_disk)) = watch.as_mut() {
                poll_config(&mut sim, *dir, on_disk, &args.common);
            }
            let view = sim.player().view();
            info!(
                tick = sim.ticks(),
                x = view.position.x,
                y = view.position.y,
                z = view.position.z,
                heading = view.rotation.to_degrees(),
                speed = view.speed,
                airborne = sim.player().motion().is_airborne(),
                camera = ?outcome.camera_mode,
                chunks = sim.resident_chunks(),
                "player"
            );
        }
    }

    let view = sim.player().view();
    info!(
        ticks = sim.ticks(),
        sim_time = sim.game_loop().total_sim_time(),
        final_position = ?view.position,
        "run complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_terrain::FlatGround;

    #[test]
    fn test_poll_config_retunes_from_disk_and_keeps_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let mut on_disk = Config::load_or_create(dir.path()).unwrap();
        let args = CliArgs {
            boost_speed: Some(50.0),
            ..Default::default()
        };
        let mut sim = Simulation::with_provider(&on_disk, FlatGround::new(0.0)).unwrap();

        poll_config(&mut sim, dir.path(), &mut on_disk, &args);
        assert_eq!(sim.tuning().walk_speed, 10.0);

        let mut edited = on_disk.clone();
        edited.player.walk_speed = 3.0;
        edited.player.boost_speed = 5.0;
        edited.save(dir.path()).unwrap();

        poll_config(&mut sim, dir.path(), &mut on_disk, &args);
        assert_eq!(on_disk.player.walk_speed, 3.0);
        assert_eq!(sim.tuning().walk_speed, 3.0);
        assert_eq!(sim.tuning().boost_speed, 50.0);
    }

    #[test]
    fn test_poll_config_ignores_invalid_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut on_disk = Config::load_or_create(dir.path()).unwrap();
        let mut sim = Simulation::with_provider(&on_disk, FlatGround::new(0.0)).unwrap();

        let mut edited = on_disk.clone();
        edited.player.gravity = 1.0;
        edited.save(dir.path()).unwrap();

        poll_config(&mut sim, dir.path(), &mut on_disk, &CliArgs::default());
        assert_eq!(sim.tuning().gravity, -9.8);
    }
}
