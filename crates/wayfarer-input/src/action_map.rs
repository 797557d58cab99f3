//! Action mapping: maps locomotion actions to physical keys.
//!
//! [`InputMap`] defines which keys trigger which [`Action`]s. It serializes
//! to RON and accepts by-name overrides from the configuration file
//! (`"Jump" -> "KeyJ"`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::keyboard::KeyboardState;

/// Serde helper module for [`KeyCode`] which doesn't implement serde natively.
mod keycode_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use winit::keyboard::KeyCode;

    /// Serialize a [`KeyCode`] as its debug string (e.g., `"KeyW"`).
    pub fn serialize<S: Serializer>(code: &KeyCode, s: S) -> Result<S::Ok, S::Error> {
        format!("{code:?}").serialize(s)
    }

    /// Deserialize a [`KeyCode`] from its debug string.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<KeyCode, D::Error> {
        let name = String::deserialize(d)?;
        string_to_keycode(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
    }

    pub(crate) fn string_to_keycode(s: &str) -> Option<KeyCode> {
        // Match the Debug output of KeyCode variants
        Some(match s {
            "KeyA" => KeyCode::KeyA,
            "KeyB" => KeyCode::KeyB,
            "KeyC" => KeyCode::KeyC,
            "KeyD" => KeyCode::KeyD,
            "KeyE" => KeyCode::KeyE,
            "KeyF" => KeyCode::KeyF,
            "KeyG" => KeyCode::KeyG,
            "KeyH" => KeyCode::KeyH,
            "KeyI" => KeyCode::KeyI,
            "KeyJ" => KeyCode::KeyJ,
            "KeyK" => KeyCode::KeyK,
            "KeyL" => KeyCode::KeyL,
            "KeyM" => KeyCode::KeyM,
            "KeyN" => KeyCode::KeyN,
            "KeyO" => KeyCode::KeyO,
            "KeyP" => KeyCode::KeyP,
            "KeyQ" => KeyCode::KeyQ,
            "KeyR" => KeyCode::KeyR,
            "KeyS" => KeyCode::KeyS,
            "KeyT" => KeyCode::KeyT,
            "KeyU" => KeyCode::KeyU,
            "KeyV" => KeyCode::KeyV,
            "KeyW" => KeyCode::KeyW,
            "KeyX" => KeyCode::KeyX,
            "KeyY" => KeyCode::KeyY,
            "KeyZ" => KeyCode::KeyZ,
            "Space" => KeyCode::Space,
            "Enter" => KeyCode::Enter,
            "Tab" => KeyCode::Tab,
            "ShiftLeft" => KeyCode::ShiftLeft,
            "ShiftRight" => KeyCode::ShiftRight,
            "ControlLeft" => KeyCode::ControlLeft,
            "ControlRight" => KeyCode::ControlRight,
            "AltLeft" => KeyCode::AltLeft,
            "AltRight" => KeyCode::AltRight,
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            _ => return None,
        })
    }
}

/// Locomotion actions that can be bound to keys.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Move away from the camera.
    MoveForward,
    /// Move toward the camera.
    MoveBack,
    /// Strafe left.
    StrafeLeft,
    /// Strafe right.
    StrafeRight,
    /// Hold to move at boost speed.
    Boost,
    /// Jump.
    Jump,
    /// Switch the camera between third-person and fly mode.
    ToggleCameraMode,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 7] = [
        Action::MoveForward,
        Action::MoveBack,
        Action::StrafeLeft,
        Action::StrafeRight,
        Action::Boost,
        Action::Jump,
        Action::ToggleCameraMode,
    ];

    /// Parses the variant name used in config files.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| format!("{action:?}") == name)
    }
}

/// A keyboard key (physical scan code) bound to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBinding(#[serde(with = "keycode_serde")] pub KeyCode);

/// Errors raised while applying by-name binding overrides.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BindingError {
    /// The action name does not match any [`Action`] variant.
    #[error("unknown action: {0}")]
    UnknownAction(String),
    /// The key name is not a supported [`KeyCode`].
    #[error("unknown key {key} for action {action}")]
    UnknownKey {
        /// Action the key was meant for.
        action: String,
        /// The rejected key name.
        key: String,
    },
}

/// Maps [`Action`]s to lists of keys. Multiple keys per action use OR logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMap {
    /// The binding table.
    pub bindings: HashMap<Action, Vec<KeyBinding>>,
}

impl Default for InputMap {
    fn default() -> Self {
        Self::default_explorer()
    }
}

impl InputMap {
    /// Create an empty input map with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// WASD + arrows movement, Shift boost, Space jump, F camera mode.
    #[must_use]
    pub fn default_explorer() -> Self {
        let mut map = Self::new();
        map.set_keys(Action::MoveForward, &[KeyCode::KeyW, KeyCode::ArrowUp]);
        map.set_keys(Action::MoveBack, &[KeyCode::KeyS, KeyCode::ArrowDown]);
        map.set_keys(Action::StrafeLeft, &[KeyCode::KeyA, KeyCode::ArrowLeft]);
        map.set_keys(Action::StrafeRight, &[KeyCode::KeyD, KeyCode::ArrowRight]);
        map.set_keys(Action::Boost, &[KeyCode::ShiftLeft, KeyCode::ShiftRight]);
        map.set_keys(Action::Jump, &[KeyCode::Space]);
        map.set_keys(Action::ToggleCameraMode, &[KeyCode::KeyF]);
        map
    }

    /// Set the keys for an action, replacing any existing ones.
    pub fn set_keys(&mut self, action: Action, keys: &[KeyCode]) {
        self.bindings
            .insert(action, keys.iter().copied().map(KeyBinding).collect());
    }

    /// Get the bindings for an action.
    #[must_use]
    pub fn get_bindings(&self, action: &Action) -> &[KeyBinding] {
        self.bindings.get(action).map_or(&[], |v| v.as_slice())
    }

    /// Returns `true` if any key bound to `action` is held.
    #[must_use]
    pub fn is_active(&self, action: Action, keyboard: &KeyboardState) -> bool {
        self.get_bindings(&action)
            .iter()
            .any(|binding| keyboard.is_code_pressed(binding.0))
    }

    /// Returns `true` if a key bound to `action` went down this frame.
    #[must_use]
    pub fn just_activated(&self, action: Action, keyboard: &KeyboardState) -> bool {
        self.get_bindings(&action)
            .iter()
            .any(|binding| keyboard.just_pressed(PhysicalKey::Code(binding.0)))
    }

    /// Replace bindings from a config table of action name -> key name.
    ///
    /// Each named action is rebound to exactly the given key. Stops at the
    /// first unknown name; earlier overrides stay applied.
    pub fn apply_overrides(
        &mut self,
        overrides: &HashMap<String, String>,
    ) -> Result<(), BindingError> {
        let mut names: Vec<_> = overrides.iter().collect();
        names.sort();
        for (action_name, key_name) in names {
            let action = Action::from_name(action_name)
                .ok_or_else(|| BindingError::UnknownAction(action_name.clone()))?;
            let key = keycode_serde::string_to_keycode(key_name).ok_or_else(|| {
                BindingError::UnknownKey {
                    action: action_name.clone(),
                    key: key_name.clone(),
                }
            })?;
            tracing::debug!(?action, ?key, "keybinding override");
            self.set_keys(action, &[key]);
        }
        Ok(())
    }
}
