//! Locomotion error types.

/// Precondition violations that reject a tick before any state changes.
///
/// A rejected tick leaves [`PlayerState`](crate::PlayerState) exactly as it
/// was; NaN never reaches the stored state.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LocomotionError {
    /// Delta time was NaN, infinite, or negative.
    #[error("invalid delta time {0}")]
    InvalidDeltaTime(f32),

    /// The player position (before or after integration) is not finite.
    #[error("non-finite player position ({x}, {y}, {z})")]
    NonFinitePosition {
        /// X component.
        x: f32,
        /// Y component.
        y: f32,
        /// Z component.
        z: f32,
    },

    /// The reference yaw was not finite while a direction key was held.
    #[error("non-finite reference yaw {0}")]
    NonFiniteYaw(f32),

    /// A tuning constant is outside its valid range.
    #[error("invalid tuning: {field} = {value}")]
    InvalidTuning {
        /// Name of the offending constant.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
}

impl LocomotionError {
    pub(crate) fn position(p: glam::Vec3) -> Self {
        Self::NonFinitePosition {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}
