//! Player state owned by the simulation and mutated only by the
//! [`LocomotionController`](crate::LocomotionController).

use glam::Vec3;

use crate::error::LocomotionError;

/// Position this tick, last tick, and the difference between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionTrack {
    pub current: Vec3,
    pub previous: Vec3,
    pub delta: Vec3,
}

impl PositionTrack {
    fn at(position: Vec3) -> Self {
        Self {
            current: position,
            previous: position,
            delta: Vec3::ZERO,
        }
    }
}

/// Vertical motion state. Vertical velocity only exists while airborne.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionMode {
    /// Height tracks the terrain.
    Grounded,
    /// Height integrates velocity and gravity until landing.
    Airborne { vertical_velocity: f32 },
}

impl MotionMode {
    pub fn is_grounded(self) -> bool {
        matches!(self, MotionMode::Grounded)
    }

    pub fn is_airborne(self) -> bool {
        !self.is_grounded()
    }

    /// Vertical velocity; `0.0` while grounded.
    pub fn vertical_velocity(self) -> f32 {
        match self {
            MotionMode::Grounded => 0.0,
            MotionMode::Airborne { vertical_velocity } => vertical_velocity,
        }
    }
}

/// The player's locomotion state.
///
/// Fields are only writable inside this crate; everything else reads
/// through accessors or a [`PlayerView`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub(crate) position: PositionTrack,
    pub(crate) rotation: f32,
    pub(crate) speed: f32,
    pub(crate) motion: MotionMode,
    /// Jump key state seen by the previous tick, for edge detection.
    pub(crate) jump_held: bool,
}

impl PlayerState {
    /// A grounded, motionless player at `position`.
    pub fn spawn(position: Vec3) -> Result<Self, LocomotionError> {
        if !position.is_finite() {
            return Err(LocomotionError::position(position));
        }
        Ok(Self {
            position: PositionTrack::at(position),
            rotation: 0.0,
            speed: 0.0,
            motion: MotionMode::Grounded,
            jump_held: false,
        })
    }

    pub fn position(&self) -> &PositionTrack {
        &self.position
    }

    pub fn current(&self) -> Vec3 {
        self.position.current
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn motion(&self) -> MotionMode {
        self.motion
    }

    /// Read-only snapshot for the view layer and the camera.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            position: self.position.current,
            rotation: self.rotation,
            speed: self.speed,
        }
    }
}

/// What the view layer and camera read after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec3,
    pub rotation: f32,
    pub speed: f32,
}
