//! Scripted keyboard input for headless runs.
//!
//! A script is a list of segments, each holding a set of keys and a camera
//! drag for a number of frames. [`ScriptPlayer`] turns it into a
//! frame-by-frame [`KeyboardState`] with proper press and release edges.

use std::path::Path;

use serde::{Deserialize, Serialize};
use wayfarer_input::{KeyBinding, KeyboardState, RawKeyEvent};
use winit::keyboard::KeyCode;

use crate::error::SimError;

/// Keys held for a run of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSegment {
    pub frames: u64,
    #[serde(default)]
    pub keys: Vec<KeyBinding>,
    /// Pointer drag applied to the camera orbit on each frame, in pixels.
    #[serde(default)]
    pub orbit: [f32; 2],
    /// Scroll applied to the camera on each frame.
    #[serde(default)]
    pub zoom: f32,
}

impl ScriptSegment {
    pub fn new(frames: u64, keys: &[KeyCode]) -> Self {
        Self {
            frames,
            keys: keys.iter().copied().map(KeyBinding).collect(),
            orbit: [0.0, 0.0],
            zoom: 0.0,
        }
    }

    pub fn idle(frames: u64) -> Self {
        Self::new(frames, &[])
    }

    pub fn with_orbit(mut self, dx: f32, dy: f32) -> Self {
        self.orbit = [dx, dy];
        self
    }

    pub fn with_zoom(mut self, scroll: f32) -> Self {
        self.zoom = scroll;
        self
    }
}

/// One frame of scripted input.
#[derive(Debug, Clone, Copy)]
pub struct ScriptFrame<'a> {
    pub keyboard: &'a KeyboardState,
    pub orbit: [f32; 2],
    pub zoom: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputScript {
    pub segments: Vec<ScriptSegment>,
}

impl InputScript {
    /// A short walk around the spawn point: forward, a boosted diagonal, a
    /// jump, a backpedal, a walk while swinging the camera round, and a look
    /// around in fly mode.
    pub fn tour() -> Self {
        use KeyCode::*;
        Self {
            segments: vec![
                ScriptSegment::new(120, &[KeyW]),
                ScriptSegment::new(60, &[KeyW, KeyA, ShiftLeft]),
                ScriptSegment::new(1, &[Space]),
                ScriptSegment::idle(90),
                ScriptSegment::new(60, &[KeyS]),
                ScriptSegment::new(90, &[KeyW]).with_orbit(-4.0, 0.5).with_zoom(0.05),
                ScriptSegment::new(1, &[KeyF]),
                ScriptSegment::new(60, &[KeyD]),
                ScriptSegment::new(1, &[KeyF]),
                ScriptSegment::new(60, &[KeyD, KeyW]),
            ],
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.segments.iter().map(|s| s.frames).sum()
    }

    /// The segment playing on `frame`, or `None` past the end.
    pub fn segment_at(&self, frame: u64) -> Option<&ScriptSegment> {
        let mut start = 0;
        for segment in &self.segments {
            if frame < start + segment.frames {
                return Some(segment);
            }
            start += segment.frames;
        }
        None
    }

    /// Keys held on `frame`, or nothing past the end.
    pub fn keys_at(&self, frame: u64) -> &[KeyBinding] {
        match self.segment_at(frame) {
            Some(segment) => &segment.keys,
            None => &[],
        }
    }

    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path).map_err(SimError::ScriptRead)?;
        Ok(Self::from_ron(&text)?)
    }
}

/// Replays an [`InputScript`] into a [`KeyboardState`].
#[derive(Debug, Clone)]
pub struct ScriptPlayer {
    script: InputScript,
    frame: u64,
    keyboard: KeyboardState,
}

impl ScriptPlayer {
    pub fn new(script: InputScript) -> Self {
        Self {
            script,
            frame: 0,
            keyboard: KeyboardState::new(),
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Input for the next frame. Keys that changed since the previous frame
    /// show up as just pressed or just released.
    pub fn next_frame(&mut self) -> ScriptFrame<'_> {
        self.keyboard.clear_transients();
        let wanted: Vec<KeyCode> = self
            .script
            .keys_at(self.frame)
            .iter()
            .map(|binding| binding.0)
            .collect();

        let previous = match self.frame.checked_sub(1) {
            Some(frame) => self.script.keys_at(frame),
            None => &[],
        };
        for binding in previous {
            if !wanted.contains(&binding.0) && self.keyboard.is_code_pressed(binding.0) {
                self.keyboard.process_raw(RawKeyEvent::release(binding.0));
            }
        }
        for code in &wanted {
            if !self.keyboard.is_code_pressed(*code) {
                self.keyboard.process_raw(RawKeyEvent::press(*code));
            }
        }

        let (orbit, zoom) = self
            .script
            .segment_at(self.frame)
            .map_or(([0.0, 0.0], 0.0), |segment| (segment.orbit, segment.zoom));
        self.frame += 1;
        ScriptFrame {
            keyboard: &self.keyboard,
            orbit,
            zoom,
        }
    }
}
