//! Input abstraction: keyboard state mapped through configurable action bindings
//! into the per-tick [`InputSnapshot`] consumed by the locomotion controller.

pub mod action_map;
pub mod keyboard;
pub mod snapshot;

pub use action_map::{Action, BindingError, InputMap, KeyBinding};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use snapshot::InputSnapshot;
