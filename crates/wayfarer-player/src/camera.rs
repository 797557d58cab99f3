//! Third-person camera: orbit, zoom, smooth follow, and the fly toggle.
//!
//! The camera is the source of the reference yaw that movement headings are
//! measured against. It reads the player through [`PlayerView`] only.

use glam::Vec3;
use tracing::debug;
use wayfarer_config::CameraConfig;
use wayfarer_input::InputSnapshot;

use crate::orientation::{DirectionKeys, ReferenceFrame};
use crate::state::PlayerView;

/// Whether direction keys move the player or the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Orbit the player; direction keys move the player.
    #[default]
    ThirdPerson,
    /// Free flight; direction keys move the camera.
    Fly,
}

#[derive(Clone, Debug)]
pub struct ThirdPersonCamera {
    pub mode: CameraMode,
    /// Horizontal orbit angle in radians. 0 puts the camera behind the
    /// player at +Z, looking toward -Z.
    pub orbit_yaw: f32,
    /// Elevation above the horizon in radians.
    pub orbit_pitch: f32,
    pub distance: f32,
    pub distance_min: f32,
    pub distance_max: f32,
    /// Raises the look-at point above the player origin.
    pub height_offset: f32,
    pub orbit_sensitivity: f32,
    pub zoom_sensitivity: f32,
    /// Fraction of the remaining gap closed per follow (0 = frozen, 1 = snap).
    pub follow_speed: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
    /// Fly-mode speed in world units per second.
    pub fly_speed: f32,
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for ThirdPersonCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl ThirdPersonCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        let distance_min = 1.0;
        let distance_max = 100.0;
        Self {
            mode: if config.start_in_fly_mode {
                CameraMode::Fly
            } else {
                CameraMode::ThirdPerson
            },
            orbit_yaw: 0.0,
            orbit_pitch: config.pitch_degrees.to_radians(),
            distance: config.distance.clamp(distance_min, distance_max),
            distance_min,
            distance_max,
            height_offset: config.height_offset,
            orbit_sensitivity: 0.005,
            zoom_sensitivity: 1.0,
            follow_speed: config.follow_speed.clamp(0.0, 1.0),
            pitch_min: -10.0_f32.to_radians(),
            pitch_max: 80.0_f32.to_radians(),
            fly_speed: 20.0,
            position: Vec3::ZERO,
            look_at: Vec3::ZERO,
        }
    }

    /// Yaw that player headings are measured against.
    pub fn reference_frame(&self) -> ReferenceFrame {
        match self.mode {
            CameraMode::ThirdPerson => ReferenceFrame::ground(self.orbit_yaw),
            CameraMode::Fly => ReferenceFrame::flying(self.orbit_yaw),
        }
    }

    pub fn toggle_mode(&mut self) -> CameraMode {
        self.mode = match self.mode {
            CameraMode::ThirdPerson => CameraMode::Fly,
            CameraMode::Fly => CameraMode::ThirdPerson,
        };
        debug!(mode = ?self.mode, "camera mode toggled");
        self.mode
    }

    /// Orbit by a pointer drag of `(dx, dy)`. Pitch is clamped.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.orbit_yaw -= dx * self.orbit_sensitivity;
        self.orbit_pitch =
            (self.orbit_pitch - dy * self.orbit_sensitivity).clamp(self.pitch_min, self.pitch_max);
    }

    /// Scroll-up (positive) zooms in.
    pub fn zoom(&mut self, scroll: f32) {
        if scroll.abs() < 1e-6 {
            return;
        }
        self.distance =
            (self.distance - scroll * self.zoom_sensitivity).clamp(self.distance_min, self.distance_max);
    }

    /// Point the camera is drawn toward when following `target`.
    pub fn desired_position(&self, target: Vec3) -> Vec3 {
        let look_at = target + Vec3::Y * self.height_offset;
        let (sin_pitch, cos_pitch) = self.orbit_pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.orbit_yaw.sin_cos();
        look_at
            + Vec3::new(
                self.distance * cos_pitch * sin_yaw,
                self.distance * sin_pitch,
                self.distance * cos_pitch * cos_yaw,
            )
    }

    /// Ease toward the orbit position behind the player. Does nothing in
    /// fly mode.
    pub fn follow(&mut self, player: &PlayerView) {
        if self.mode == CameraMode::Fly {
            return;
        }
        let desired = self.desired_position(player.position);
        self.position = self.position.lerp(desired, self.follow_speed);
        self.look_at = player.position + Vec3::Y * self.height_offset;
    }

    /// Move the camera with the direction keys while in fly mode.
    pub fn fly(&mut self, input: &InputSnapshot) {
        if self.mode != CameraMode::Fly {
            return;
        }
        let Some(heading) = ReferenceFrame::ground(self.orbit_yaw).heading(DirectionKeys::from(input))
        else {
            return;
        };
        let step = Vec3::new(heading.sin(), 0.0, heading.cos()) * self.fly_speed * input.delta_time;
        self.position -= step;
        self.look_at -= step;
    }

    /// Unit vector from the camera toward its look-at point, or zero when
    /// they coincide.
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or_zero()
    }
}
