//! The locomotion controller: horizontal movement, jumping, gravity,
//! landing, and smoothed terrain following.
//!
//! One call to [`LocomotionController::tick`] advances a [`PlayerState`] by
//! one simulation step:
//!
//! 1. If the reference frame yields a heading, move horizontally along it.
//! 2. Resolve height. Grounded players ease toward the terrain (and may
//!    launch a jump); airborne players integrate velocity and gravity and
//!    land once they reach the terrain, or sea level where no terrain is
//!    known.
//! 3. Recompute `delta`, `previous` and `speed`.
//!
//! The tick is computed on a copy and committed only if every component
//! stays finite, so a rejected tick leaves the state untouched.

use glam::Vec3;
use tracing::{debug, trace, warn};
use wayfarer_config::PlayerConfig;
use wayfarer_input::InputSnapshot;
use wayfarer_terrain::ElevationProvider;

use crate::error::LocomotionError;
use crate::orientation::{DirectionKeys, ReferenceFrame};
use crate::state::{MotionMode, PlayerState};

/// Height the player lands on where no terrain is known.
pub const SEA_LEVEL: f32 = 0.0;

/// Locomotion constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionTuning {
    /// World units per second without boost.
    pub walk_speed: f32,
    /// World units per second with boost held.
    pub boost_speed: f32,
    /// Vertical acceleration while airborne. Must be negative.
    pub gravity: f32,
    /// Upward velocity at the start of a jump. Must be positive.
    pub jump_strength: f32,
    /// Terrain gaps at or below this snap exactly.
    pub ground_snap_epsilon: f32,
    /// Fraction of the terrain gap closed per grounded tick, in `(0, 1]`.
    pub ground_smoothing_factor: f32,
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self::from(&PlayerConfig::default())
    }
}

impl From<&PlayerConfig> for LocomotionTuning {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            walk_speed: config.walk_speed,
            boost_speed: config.boost_speed,
            gravity: config.gravity,
            jump_strength: config.jump_strength,
            ground_snap_epsilon: config.ground_snap_epsilon,
            ground_smoothing_factor: config.ground_smoothing_factor,
        }
    }
}

impl LocomotionTuning {
    /// Checks every constant against its valid range.
    pub fn validate(&self) -> Result<(), LocomotionError> {
        let checks: [(&'static str, f32, fn(f32) -> bool); 6] = [
            ("walk_speed", self.walk_speed, |v| v >= 0.0),
            ("boost_speed", self.boost_speed, |v| v >= 0.0),
            ("gravity", self.gravity, |v| v < 0.0),
            ("jump_strength", self.jump_strength, |v| v > 0.0),
            ("ground_snap_epsilon", self.ground_snap_epsilon, |v| v >= 0.0),
            ("ground_smoothing_factor", self.ground_smoothing_factor, |v| {
                v > 0.0 && v <= 1.0
            }),
        ];
        for (field, value, in_range) in checks {
            if !value.is_finite() || !in_range(value) {
                return Err(LocomotionError::InvalidTuning { field, value });
            }
        }
        Ok(())
    }
}

/// A change of [`MotionMode`] during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionTransition {
    /// Grounded → Airborne.
    Jumped,
    /// Airborne → Grounded. `terrain` is `false` when the floor was sea level
    /// because no elevation was known.
    Landed { floor: f32, terrain: bool },
}

/// What happened during one tick, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// Movement heading applied this tick.
    pub heading: Option<f32>,
    /// Terrain elevation read this tick.
    pub elevation: Option<f32>,
    pub transition: Option<MotionTransition>,
}

/// Advances [`PlayerState`] one tick at a time.
#[derive(Debug, Clone)]
pub struct LocomotionController {
    tuning: LocomotionTuning,
}

impl LocomotionController {
    pub fn new(tuning: LocomotionTuning) -> Result<Self, LocomotionError> {
        tuning.validate()?;
        Ok(Self { tuning })
    }

    pub fn tuning(&self) -> &LocomotionTuning {
        &self.tuning
    }

    /// Advance `state` by `input.delta_time` seconds.
    ///
    /// `frame` supplies the reference yaw; while it is not ground-relative
    /// the direction keys are ignored. `terrain` is queried once.
    pub fn tick<E>(
        &self,
        state: &mut PlayerState,
        input: &InputSnapshot,
        frame: ReferenceFrame,
        terrain: &E,
    ) -> Result<TickReport, LocomotionError>
    where
        E: ElevationProvider + ?Sized,
    {
        let dt = input.delta_time;
        if !dt.is_finite() || dt < 0.0 {
            return Err(LocomotionError::InvalidDeltaTime(dt));
        }
        if !state.position.current.is_finite() {
            return Err(LocomotionError::position(state.position.current));
        }

        let heading = frame.heading(DirectionKeys::from(input));
        if heading.is_some_and(|h| !h.is_finite()) {
            return Err(LocomotionError::NonFiniteYaw(frame.yaw));
        }

        let mut next = *state;
        let mut report = TickReport {
            heading,
            ..Default::default()
        };

        if let Some(heading) = heading {
            self.move_horizontally(&mut next, heading, input.boost, dt);
        }

        let (x, z) = (next.position.current.x, next.position.current.z);
        match next.motion {
            MotionMode::Grounded => {
                report.elevation = sample(terrain, x, z);
                self.follow_terrain(&mut next, report.elevation);
                if input.jump && !next.jump_held {
                    next.motion = MotionMode::Airborne {
                        vertical_velocity: self.tuning.jump_strength,
                    };
                    report.transition = Some(MotionTransition::Jumped);
                }
            }
            MotionMode::Airborne { vertical_velocity } => {
                next.position.current.y += vertical_velocity * dt;
                let vertical_velocity = vertical_velocity + self.tuning.gravity * dt;
                report.elevation = sample(terrain, x, z);
                report.transition = land_or_fall(&mut next, vertical_velocity, report.elevation);
            }
        }
        next.jump_held = input.jump;

        let delta = next.position.current - next.position.previous;
        next.position.delta = delta;
        next.position.previous = next.position.current;
        next.speed = delta.length();

        if !next.position.current.is_finite() || !next.speed.is_finite() {
            return Err(LocomotionError::position(next.position.current));
        }

        match report.transition {
            Some(MotionTransition::Jumped) => {
                debug!(y = next.position.current.y, "player jumped");
            }
            Some(MotionTransition::Landed { floor, terrain }) => {
                debug!(floor, terrain, "player landed");
            }
            None => {}
        }
        trace!(
            x = next.position.current.x,
            y = next.position.current.y,
            z = next.position.current.z,
            speed = next.speed,
            "locomotion tick"
        );

        *state = next;
        Ok(report)
    }

    fn move_horizontally(&self, state: &mut PlayerState, heading: f32, boost: bool, dt: f32) {
        let speed = if boost {
            self.tuning.boost_speed
        } else {
            self.tuning.walk_speed
        };
        let step = Vec3::new(heading.sin(), 0.0, heading.cos()) * speed * dt;
        state.position.current -= step;
        state.rotation = heading;
    }

    /// Ease toward the terrain, snapping once within the epsilon. Absent
    /// terrain leaves the height alone: there is no sea-level fallback on
    /// the ground, so a player is not dropped to 0 before terrain loads.
    fn follow_terrain(&self, state: &mut PlayerState, elevation: Option<f32>) {
        let Some(elevation) = elevation else {
            return;
        };
        let y = &mut state.position.current.y;
        let diff = elevation - *y;
        if diff.abs() > self.tuning.ground_snap_epsilon {
            *y += diff * self.tuning.ground_smoothing_factor;
        } else {
            *y = elevation;
        }
    }
}

/// Land if at or below the floor (terrain, or sea level when unknown),
/// otherwise keep falling with the updated velocity.
fn land_or_fall(
    state: &mut PlayerState,
    vertical_velocity: f32,
    elevation: Option<f32>,
) -> Option<MotionTransition> {
    let (floor, terrain) = match elevation {
        Some(elevation) => (elevation, true),
        None => (SEA_LEVEL, false),
    };
    if state.position.current.y <= floor {
        state.position.current.y = floor;
        state.motion = MotionMode::Grounded;
        Some(MotionTransition::Landed { floor, terrain })
    } else {
        state.motion = MotionMode::Airborne { vertical_velocity };
        None
    }
}

/// Query the terrain, treating non-finite answers as unknown.
fn sample<E>(terrain: &E, x: f32, z: f32) -> Option<f32>
where
    E: ElevationProvider + ?Sized,
{
    match terrain.elevation_at(x, z) {
        Some(h) if h.is_finite() => Some(h),
        Some(h) => {
            warn!(x, z, h, "ignoring non-finite elevation");
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_terrain::{FlatGround, Unloaded};

    const EPSILON: f32 = 1e-5;

    fn controller() -> LocomotionController {
        LocomotionController::new(LocomotionTuning::default()).unwrap()
    }

    fn spawn(x: f32, y: f32, z: f32) -> PlayerState {
        PlayerState::spawn(Vec3::new(x, y, z)).unwrap()
    }

    fn airborne(x: f32, y: f32, z: f32, vertical_velocity: f32) -> PlayerState {
        let mut state = spawn(x, y, z);
        state.motion = MotionMode::Airborne { vertical_velocity };
        state
    }

    fn forward(dt: f32) -> InputSnapshot {
        InputSnapshot {
            forward: true,
            ..InputSnapshot::idle(dt)
        }
    }

    fn jump(dt: f32) -> InputSnapshot {
        InputSnapshot {
            jump: true,
            ..InputSnapshot::idle(dt)
        }
    }

    #[test]
    fn test_forward_at_zero_heading_decreases_z() {
        let ctrl = controller();
        let mut state = spawn(10.0, 0.0, 1.0);
        ctrl.tick(&mut state, &forward(0.1), ReferenceFrame::ground(0.0), &Unloaded)
            .unwrap();
        let p = state.current();
        assert!((p.z - 0.0).abs() < EPSILON, "z = {}", p.z);
        assert!((p.x - 10.0).abs() < EPSILON);
        assert_eq!(state.rotation(), 0.0);
    }

    #[test]
    fn test_forward_left_moves_along_quarter_pi() {
        let ctrl = controller();
        let mut state = spawn(0.0, 0.0, 0.0);
        let input = InputSnapshot {
            forward: true,
            strafe_left: true,
            ..InputSnapshot::idle(0.1)
        };
        let report = ctrl
            .tick(&mut state, &input, ReferenceFrame::ground(0.0), &Unloaded)
            .unwrap();
        let heading = report.heading.unwrap();
        assert!((heading - std::f32::consts::FRAC_PI_4).abs() < EPSILON);
        let expected = -(1.0_f32 / 2.0_f32.sqrt());
        assert!((state.current().x - expected).abs() < EPSILON);
        assert!((state.current().z - expected).abs() < EPSILON);
        assert!((state.rotation() - heading).abs() < EPSILON);
    }

    #[test]
    fn test_boost_uses_boost_speed() {
        let ctrl = controller();
        let mut state = spawn(0.0, 0.0, 0.0);
        let input = InputSnapshot {
            boost: true,
            ..forward(0.1)
        };
        ctrl.tick(&mut state, &input, ReferenceFrame::ground(0.0), &Unloaded)
            .unwrap();
        assert!((state.current().z + 3.0).abs() < EPSILON);
        assert!((state.speed() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_no_input_keeps_horizontal_position_and_rotation() {
        let ctrl = controller();
        let mut state = spawn(3.0, 1.0, -2.0);
        state.rotation = 0.7;
        ctrl.tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(1.0), &FlatGround::new(5.0))
            .unwrap();
        assert_eq!(state.current().x, 3.0);
        assert_eq!(state.current().z, -2.0);
        assert_eq!(state.rotation(), 0.7);
        // Vertical motion still applies.
        assert!(state.current().y > 1.0);
    }

    #[test]
    fn test_fly_mode_ignores_direction_keys() {
        let ctrl = controller();
        let mut state = spawn(0.0, 0.0, 0.0);
        let report = ctrl
            .tick(&mut state, &forward(0.1), ReferenceFrame::flying(0.0), &Unloaded)
            .unwrap();
        assert_eq!(report.heading, None);
        assert_eq!(state.current(), Vec3::ZERO);
    }

    #[test]
    fn test_jump_sets_airborne_with_jump_strength() {
        let ctrl = controller();
        let mut state = spawn(0.0, 0.0, 0.0);
        let report = ctrl
            .tick(&mut state, &jump(0.1), ReferenceFrame::ground(0.0), &Unloaded)
            .unwrap();
        assert_eq!(report.transition, Some(MotionTransition::Jumped));
        assert_eq!(
            state.motion(),
            MotionMode::Airborne {
                vertical_velocity: 5.0
            }
        );

        // Next tick rises by velocity * dt before gravity changes velocity.
        let y_before = state.current().y;
        ctrl.tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(0.0), &Unloaded)
            .unwrap();
        assert!((state.current().y - (y_before + 0.5)).abs() < EPSILON);
        assert!((state.motion().vertical_velocity() - (5.0 - 0.98)).abs() < EPSILON);
    }

    #[test]
    fn test_holding_jump_triggers_once() {
        let ctrl = controller();
        let mut state = spawn(0.0, 0.0, 0.0);
        let mut jumps = 0;
        for _ in 0..200 {
            let report = ctrl
                .tick(&mut state, &jump(0.05), ReferenceFrame::ground(0.0), &Unloaded)
                .unwrap();
            if report.transition == Some(MotionTransition::Jumped) {
                jumps += 1;
            }
        }
        assert_eq!(jumps, 1);
        assert!(state.motion().is_grounded());
    }

    #[test]
    fn test_jump_again_after_release_and_landing() {
        let ctrl = controller();
        let mut state = spawn(0.0, 0.0, 0.0);
        let frame = ReferenceFrame::ground(0.0);
        ctrl.tick(&mut state, &jump(0.05), frame, &Unloaded).unwrap();
        while state.motion().is_airborne() {
            ctrl.tick(&mut state, &InputSnapshot::idle(0.05), frame, &Unloaded)
                .unwrap();
        }
        let report = ctrl.tick(&mut state, &jump(0.05), frame, &Unloaded).unwrap();
        assert_eq!(report.transition, Some(MotionTransition::Jumped));
    }

    #[test]
    fn test_jump_while_airborne_is_ignored() {
        let ctrl = controller();
        let mut state = airborne(0.0, 3.0, 0.0, 1.0);
        let report = ctrl
            .tick(&mut state, &jump(0.1), ReferenceFrame::ground(0.0), &Unloaded)
            .unwrap();
        assert_eq!(report.transition, None);
        assert!((state.motion().vertical_velocity() - (1.0 - 0.98)).abs() < EPSILON);
    }

    #[test]
    fn test_lands_on_sea_level_without_terrain() {
        let ctrl = controller();
        let mut state = airborne(0.0, 0.05, 0.0, -1.0);
        let report = ctrl
            .tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(0.0), &Unloaded)
            .unwrap();
        assert_eq!(
            report.transition,
            Some(MotionTransition::Landed {
                floor: 0.0,
                terrain: false
            })
        );
        assert_eq!(state.current().y, 0.0);
        assert_eq!(state.motion(), MotionMode::Grounded);
        assert_eq!(state.motion().vertical_velocity(), 0.0);
    }

    #[test]
    fn test_lands_exactly_at_sea_level() {
        let ctrl = controller();
        // y + v * dt == 0 exactly.
        let mut state = airborne(0.0, 0.5, 0.0, -5.0);
        ctrl.tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(0.0), &Unloaded)
            .unwrap();
        assert_eq!(state.current().y, 0.0);
        assert!(state.motion().is_grounded());
    }

    #[test]
    fn test_lands_on_terrain_and_snaps() {
        let ctrl = controller();
        let mut state = airborne(0.0, 2.1, 0.0, -3.0);
        let report = ctrl
            .tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(0.0), &FlatGround::new(2.0))
            .unwrap();
        assert_eq!(
            report.transition,
            Some(MotionTransition::Landed {
                floor: 2.0,
                terrain: true
            })
        );
        assert_eq!(state.current().y, 2.0);
    }

    #[test]
    fn test_airborne_above_floor_keeps_falling() {
        let ctrl = controller();
        let mut state = airborne(0.0, 10.0, 0.0, 0.0);
        ctrl.tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(0.0), &FlatGround::new(-1.0))
            .unwrap();
        assert!(state.motion().is_airborne());
        assert!((state.motion().vertical_velocity() + 0.98).abs() < EPSILON);
    }

    #[test]
    fn test_grounded_smooths_toward_terrain() {
        let ctrl = controller();
        let mut state = spawn(0.0, 1.9, 0.0);
        ctrl.tick(&mut state, &InputSnapshot::idle(0.016), ReferenceFrame::ground(0.0), &FlatGround::new(2.0))
            .unwrap();
        assert!((state.current().y - 1.91).abs() < EPSILON, "y = {}", state.current().y);
    }

    #[test]
    fn test_grounded_snaps_within_epsilon() {
        let ctrl = controller();
        let mut state = spawn(0.0, 1.995, 0.0);
        ctrl.tick(&mut state, &InputSnapshot::idle(0.016), ReferenceFrame::ground(0.0), &FlatGround::new(2.0))
            .unwrap();
        assert_eq!(state.current().y, 2.0);
    }

    #[test]
    fn test_grounded_without_terrain_holds_height() {
        let ctrl = controller();
        let mut state = spawn(0.0, 7.5, 0.0);
        for _ in 0..10 {
            ctrl.tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(0.0), &Unloaded)
                .unwrap();
        }
        // No sea-level fallback while grounded.
        assert_eq!(state.current().y, 7.5);
        assert!(state.motion().is_grounded());
    }

    #[test]
    fn test_smoothing_never_overshoots() {
        let ctrl = controller();
        for (start, ground) in [(0.0_f32, 5.0_f32), (5.0, -3.0), (1.0, 1.02), (2.0, 1.999)] {
            let mut state = spawn(0.0, start, 0.0);
            for _ in 0..50 {
                let before = (state.current().y - ground).abs();
                ctrl.tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(0.0), &FlatGround::new(ground))
                    .unwrap();
                let after = (state.current().y - ground).abs();
                assert!(after <= before, "{start} -> {ground}: {after} > {before}");
            }
        }
    }

    #[test]
    fn test_delta_and_speed_bookkeeping() {
        let ctrl = controller();
        let mut state = spawn(10.0, 0.0, 1.0);
        let terrain = |x: f32, _z: f32| Some(x * 0.1);
        for _ in 0..5 {
            let before = state.current();
            let input = InputSnapshot {
                strafe_right: true,
                ..InputSnapshot::idle(0.1)
            };
            ctrl.tick(&mut state, &input, ReferenceFrame::ground(0.4), &terrain)
                .unwrap();
            let track = state.position();
            assert_eq!(track.delta, track.current - before);
            assert_eq!(track.previous, track.current);
            assert_eq!(state.speed(), track.delta.length());
        }
    }

    #[test]
    fn test_tick_is_deterministic() {
        let ctrl = controller();
        let terrain = |x: f32, z: f32| Some((x * 0.3).sin() + (z * 0.2).cos());
        let script = [forward(0.05), jump(0.05), InputSnapshot::idle(0.05), forward(0.05)];
        let run = || {
            let mut state = spawn(1.0, 0.0, 1.0);
            for input in script.iter().cycle().take(80) {
                ctrl.tick(&mut state, input, ReferenceFrame::ground(0.2), &terrain)
                    .unwrap();
            }
            state
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_invalid_delta_time_rejected_without_mutation() {
        let ctrl = controller();
        let mut state = spawn(1.0, 2.0, 3.0);
        let before = state;
        for dt in [f32::NAN, f32::INFINITY, -0.1] {
            let err = ctrl
                .tick(&mut state, &forward(dt), ReferenceFrame::ground(0.0), &Unloaded)
                .unwrap_err();
            assert!(matches!(err, LocomotionError::InvalidDeltaTime(_)));
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_non_finite_yaw_rejected_only_when_moving() {
        let ctrl = controller();
        let mut state = spawn(0.0, 0.0, 0.0);
        let err = ctrl
            .tick(&mut state, &forward(0.1), ReferenceFrame::ground(f32::NAN), &Unloaded)
            .unwrap_err();
        assert!(matches!(err, LocomotionError::NonFiniteYaw(_)));
        assert!(
            ctrl.tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(f32::NAN), &Unloaded)
                .is_ok()
        );
    }

    #[test]
    fn test_non_finite_elevation_is_treated_as_absent() {
        let ctrl = controller();
        let mut state = spawn(0.0, 4.0, 0.0);
        let broken = |_x: f32, _z: f32| Some(f32::NAN);
        let report = ctrl
            .tick(&mut state, &InputSnapshot::idle(0.1), ReferenceFrame::ground(0.0), &broken)
            .unwrap();
        assert_eq!(report.elevation, None);
        assert_eq!(state.current().y, 4.0);
    }

    #[test]
    fn test_overflowing_tick_is_rejected() {
        let ctrl = controller();
        let mut state = spawn(0.0, 0.0, f32::MAX);
        let before = state;
        let input = InputSnapshot {
            backward: true,
            ..InputSnapshot::idle(f32::MAX)
        };
        let result = ctrl.tick(&mut state, &input, ReferenceFrame::ground(0.0), &Unloaded);
        assert!(result.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_tuning_validation() {
        assert!(LocomotionTuning::default().validate().is_ok());
        let bad = [
            LocomotionTuning {
                gravity: 9.8,
                ..Default::default()
            },
            LocomotionTuning {
                jump_strength: 0.0,
                ..Default::default()
            },
            LocomotionTuning {
                ground_smoothing_factor: 1.5,
                ..Default::default()
            },
            LocomotionTuning {
                walk_speed: f32::NAN,
                ..Default::default()
            },
        ];
        for tuning in bad {
            assert!(matches!(
                LocomotionController::new(tuning),
                Err(LocomotionError::InvalidTuning { .. })
            ));
        }
    }
}
