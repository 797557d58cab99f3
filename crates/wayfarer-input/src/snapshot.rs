//! Per-tick input snapshot consumed by the locomotion controller.

use crate::action_map::{Action, InputMap};
use crate::keyboard::KeyboardState;

/// Held state of every locomotion action plus the tick's delta time.
///
/// Refreshed once before each simulation tick. Plain data so tests and
/// scripted runs can build one directly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub boost: bool,
    pub jump: bool,
    /// Seconds covered by this tick.
    pub delta_time: f32,
}

impl InputSnapshot {
    /// Reads the held state of each action from the keyboard.
    #[must_use]
    pub fn capture(keyboard: &KeyboardState, map: &InputMap, delta_time: f32) -> Self {
        Self {
            forward: map.is_active(Action::MoveForward, keyboard),
            backward: map.is_active(Action::MoveBack, keyboard),
            strafe_left: map.is_active(Action::StrafeLeft, keyboard),
            strafe_right: map.is_active(Action::StrafeRight, keyboard),
            boost: map.is_active(Action::Boost, keyboard),
            jump: map.is_active(Action::Jump, keyboard),
            delta_time,
        }
    }

    /// An idle snapshot (no keys held) covering `delta_time` seconds.
    #[must_use]
    pub fn idle(delta_time: f32) -> Self {
        Self {
            delta_time,
            ..Default::default()
        }
    }

    /// Returns `true` if any of the four directional keys is held.
    #[must_use]
    pub fn any_direction(&self) -> bool {
        self.forward || self.backward || self.strafe_left || self.strafe_right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::RawKeyEvent;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_capture_reads_bound_actions() {
        let map = InputMap::default();
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::press(KeyCode::KeyW));
        kb.process_raw(RawKeyEvent::press(KeyCode::KeyA));
        kb.process_raw(RawKeyEvent::press(KeyCode::ShiftLeft));

        let snap = InputSnapshot::capture(&kb, &map, 0.016);
        assert!(snap.forward && snap.strafe_left && snap.boost);
        assert!(!snap.backward && !snap.strafe_right && !snap.jump);
        assert_eq!(snap.delta_time, 0.016);
        assert!(snap.any_direction());
    }

    #[test]
    fn test_jump_reports_held_state() {
        let map = InputMap::default();
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::press(KeyCode::Space));
        kb.clear_transients();
        assert!(InputSnapshot::capture(&kb, &map, 0.1).jump);
    }

    #[test]
    fn test_idle_has_no_direction() {
        let snap = InputSnapshot::idle(0.5);
        assert!(!snap.any_direction());
        assert!(!snap.jump);
        assert_eq!(snap.delta_time, 0.5);
    }
}
