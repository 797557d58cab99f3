//! Player locomotion: movement heading from camera yaw and direction keys,
//! the grounded/airborne state machine, terrain following, and the
//! third-person camera that supplies the reference yaw.

pub mod camera;
pub mod error;
pub mod locomotion;
pub mod orientation;
pub mod state;

pub use camera::{CameraMode, ThirdPersonCamera};
pub use error::LocomotionError;
pub use locomotion::{LocomotionController, LocomotionTuning, MotionTransition, TickReport};
pub use orientation::{DirectionKeys, ReferenceFrame, derive_heading, heading_bias};
pub use state::{MotionMode, PlayerState, PlayerView, PositionTrack};
