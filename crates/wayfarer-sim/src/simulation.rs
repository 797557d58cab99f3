//! The simulation host: an ECS world, the fixed-step schedule, and the
//! accumulator that drives it.

use std::time::{Duration, Instant};

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, ScheduleLabel};
use glam::Vec3;
use tracing::{debug, info};
use wayfarer_config::{Config, PlayerConfig};
use wayfarer_input::{Action, InputMap, KeyboardState};
use wayfarer_player::{
    CameraMode, LocomotionController, LocomotionTuning, PlayerState, ThirdPersonCamera, TickReport,
};
use wayfarer_terrain::{
    ChunkedElevation, ElevationProvider, ElevationStreamer, HeightmapParams, StreamerSettings,
};

use crate::error::SimError;
use crate::game_loop::GameLoop;
use crate::resources::{
    BindingsRes, CameraRes, ControllerRes, FixedTime, Ground, KeyboardRes, LastTick, PlayerRes,
    SnapshotRes, TickFault,
};
use crate::systems::{camera_follow, capture_input, locomotion, stream_terrain};

/// Label of the schedule run once per fixed step.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedStep;

/// Result of one [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Fixed steps run this frame.
    pub steps: u32,
    /// Camera mode after the frame's input.
    pub camera_mode: CameraMode,
}

pub struct Simulation {
    world: World,
    schedule: Schedule,
    game_loop: GameLoop,
}

impl Simulation {
    /// Build a simulation with procedurally streamed terrain.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        let terrain = &config.terrain;
        let params = HeightmapParams {
            seed: terrain.seed,
            octaves: terrain.octaves,
            amplitude: terrain.amplitude,
            base_frequency: terrain.base_frequency,
            ..Default::default()
        };
        let settings = StreamerSettings {
            chunk_size: terrain.chunk_size,
            resolution: terrain.chunk_resolution,
            worker_threads: terrain.worker_threads,
            ..Default::default()
        };
        let ground = Ground::Streamed {
            store: ChunkedElevation::new(terrain.chunk_size)?,
            streamer: ElevationStreamer::new(params, settings)?,
            radius: terrain.stream_radius,
        };
        Self::build(config, ground)
    }

    /// Build a simulation over a fixed elevation provider.
    pub fn with_provider<E>(config: &Config, provider: E) -> Result<Self, SimError>
    where
        E: ElevationProvider + Send + Sync + 'static,
    {
        Self::build(config, Ground::Fixed(Box::new(provider)))
    }

    fn build(config: &Config, ground: Ground) -> Result<Self, SimError> {
        let controller = LocomotionController::new(LocomotionTuning::from(&config.player))?;
        let player = PlayerState::spawn(Vec3::from_array(config.player.spawn_position))?;

        let mut camera = ThirdPersonCamera::from_config(&config.camera);
        camera.position = camera.desired_position(player.current());
        camera.look_at = player.current() + Vec3::Y * camera.height_offset;

        let mut bindings = InputMap::default_explorer();
        bindings.apply_overrides(&config.input.keybindings)?;

        let game_loop = GameLoop::new(
            config.simulation.fixed_dt,
            config.simulation.max_steps_per_frame,
        );

        let mut world = World::new();
        world.insert_resource(PlayerRes(player));
        world.insert_resource(ControllerRes(controller));
        world.insert_resource(CameraRes(camera));
        world.insert_resource(KeyboardRes::default());
        world.insert_resource(BindingsRes(bindings));
        world.insert_resource(SnapshotRes::default());
        world.insert_resource(FixedTime {
            delta: game_loop.fixed_dt() as f32,
            ticks: 0,
        });
        world.insert_resource(LastTick::default());
        world.insert_resource(TickFault::default());
        world.insert_resource(ground);

        let mut schedule = Schedule::new(FixedStep);
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems((capture_input, stream_terrain, locomotion, camera_follow).chain());

        info!(
            spawn = ?player.current(),
            fixed_dt = game_loop.fixed_dt(),
            "simulation ready"
        );

        Ok(Self {
            world,
            schedule,
            game_loop,
        })
    }

    /// Advance by `frame_dt` seconds of wall time with `keyboard` as this
    /// frame's input.
    ///
    /// Toggles the camera mode on a fresh press of the toggle action, then
    /// runs as many fixed steps as the accumulator allows. The first
    /// rejected tick ends the frame with [`SimError::Locomotion`]; the player
    /// keeps its last good state.
    pub fn step(&mut self, frame_dt: f64, keyboard: &KeyboardState) -> Result<StepOutcome, SimError> {
        let toggle = self
            .world
            .resource::<BindingsRes>()
            .0
            .just_activated(Action::ToggleCameraMode, keyboard);
        self.world.resource_mut::<KeyboardRes>().0 = keyboard.clone();
        if toggle {
            self.world.resource_mut::<CameraRes>().0.toggle_mode();
        }

        let world = &mut self.world;
        let schedule = &mut self.schedule;
        let steps = self.game_loop.advance(frame_dt, |_, _| {
            schedule.run(world);
            match world.resource_mut::<TickFault>().0.take() {
                Some(err) => Err(SimError::Locomotion(err)),
                None => Ok(()),
            }
        })?;

        Ok(StepOutcome {
            steps,
            camera_mode: self.camera().mode,
        })
    }

    /// Block until the chunk under the player is resident or `timeout`
    /// passes. Returns whether terrain is available there. Always `true`
    /// for a fixed provider.
    pub fn wait_for_ground(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let position = self.player().current();
        loop {
            if self.elevation_at(position.x, position.z).is_some() {
                return true;
            }
            if Instant::now() >= deadline {
                debug!("terrain under the player still loading");
                return false;
            }
            let mut ground = self.world.resource_mut::<Ground>();
            match &mut *ground {
                Ground::Streamed {
                    store,
                    streamer,
                    radius,
                } => {
                    streamer.drain_into(store);
                    streamer.request_around(position.x, position.z, *radius, store);
                }
                Ground::Fixed(_) => return true,
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    pub fn player(&self) -> &PlayerState {
        &self.world.resource::<PlayerRes>().0
    }

    pub fn camera(&self) -> &ThirdPersonCamera {
        &self.world.resource::<CameraRes>().0
    }

    pub fn camera_mut(&mut self) -> &mut ThirdPersonCamera {
        &mut self.world.resource_mut::<CameraRes>().into_inner().0
    }

    /// Apply one frame of pointer input to the camera: an orbit drag of
    /// `orbit` pixels and a `zoom` scroll.
    pub fn steer_camera(&mut self, orbit: [f32; 2], zoom: f32) {
        let camera = self.camera_mut();
        camera.orbit(orbit[0], orbit[1]);
        camera.zoom(zoom);
    }

    /// Swap in tuning built from `player`. Invalid tuning is rejected and
    /// the current controller stays in place.
    pub fn retune(&mut self, player: &PlayerConfig) -> Result<(), SimError> {
        let controller = LocomotionController::new(LocomotionTuning::from(player))?;
        info!(tuning = ?controller.tuning(), "locomotion retuned");
        self.world.resource_mut::<ControllerRes>().0 = controller;
        Ok(())
    }

    pub fn tuning(&self) -> &LocomotionTuning {
        self.world.resource::<ControllerRes>().0.tuning()
    }

    pub fn last_tick(&self) -> TickReport {
        self.world.resource::<LastTick>().0
    }

    /// Fixed steps completed.
    pub fn ticks(&self) -> u64 {
        self.world.resource::<FixedTime>().ticks
    }

    pub fn fixed_dt(&self) -> f64 {
        self.game_loop.fixed_dt()
    }

    pub fn game_loop(&self) -> &GameLoop {
        &self.game_loop
    }

    /// Terrain height under `(x, z)` as the controller sees it.
    pub fn elevation_at(&self, x: f32, z: f32) -> Option<f32> {
        self.world.resource::<Ground>().elevation_at(x, z)
    }

    pub fn resident_chunks(&self) -> usize {
        self.world.resource::<Ground>().resident_chunks()
    }
}
