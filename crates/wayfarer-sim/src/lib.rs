//! Simulation host for Wayfarer: a fixed-timestep loop driving an ECS
//! schedule of input capture, terrain streaming, locomotion, and camera
//! follow.

pub mod error;
pub mod game_loop;
pub mod resources;
pub mod script;
pub mod simulation;
pub mod systems;

pub use error::SimError;
pub use game_loop::{FIXED_DT, GameLoop, MAX_FRAME_TIME};
pub use script::{InputScript, ScriptFrame, ScriptPlayer, ScriptSegment};
pub use simulation::{FixedStep, Simulation, StepOutcome};
