//! Movement heading from the camera's yaw and the held direction keys.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use wayfarer_input::InputSnapshot;

/// The four directional keys of an input snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionKeys {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
}

impl DirectionKeys {
    pub fn any(self) -> bool {
        self.forward || self.backward || self.strafe_left || self.strafe_right
    }
}

impl From<&InputSnapshot> for DirectionKeys {
    fn from(input: &InputSnapshot) -> Self {
        Self {
            forward: input.forward,
            backward: input.backward,
            strafe_left: input.strafe_left,
            strafe_right: input.strafe_right,
        }
    }
}

/// Angle added to the reference yaw for a key combination.
///
/// First match wins, so forward beats backward and left beats right:
///
/// | keys | bias |
/// |---|---|
/// | forward + left | +45° |
/// | forward + right | −45° |
/// | forward | 0° |
/// | backward + left | +135° |
/// | backward + right | −135° |
/// | backward | 180° |
/// | left | +90° |
/// | right | −90° |
///
/// Returns `None` when no directional key is held.
pub fn heading_bias(keys: DirectionKeys) -> Option<f32> {
    let bias = if keys.forward {
        if keys.strafe_left {
            FRAC_PI_4
        } else if keys.strafe_right {
            -FRAC_PI_4
        } else {
            0.0
        }
    } else if keys.backward {
        if keys.strafe_left {
            3.0 * FRAC_PI_4
        } else if keys.strafe_right {
            -3.0 * FRAC_PI_4
        } else {
            PI
        }
    } else if keys.strafe_left {
        FRAC_PI_2
    } else if keys.strafe_right {
        -FRAC_PI_2
    } else {
        return None;
    };
    Some(bias)
}

/// Movement heading for this tick, or `None` when no direction key is held.
pub fn derive_heading(reference_yaw: f32, keys: DirectionKeys) -> Option<f32> {
    heading_bias(keys).map(|bias| reference_yaw + bias)
}

/// The camera-supplied frame that headings are measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    /// Horizontal facing of the camera in radians.
    pub yaw: f32,
    /// `false` while the camera flies freely; direction keys then steer the
    /// camera, not the player.
    pub ground_relative: bool,
}

impl ReferenceFrame {
    pub fn ground(yaw: f32) -> Self {
        Self {
            yaw,
            ground_relative: true,
        }
    }

    pub fn flying(yaw: f32) -> Self {
        Self {
            yaw,
            ground_relative: false,
        }
    }

    /// Heading for `keys` in this frame; always `None` while flying.
    pub fn heading(&self, keys: DirectionKeys) -> Option<f32> {
        if !self.ground_relative {
            return None;
        }
        derive_heading(self.yaw, keys)
    }
}
