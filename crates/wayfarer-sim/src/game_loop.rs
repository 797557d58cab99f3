//! Fixed-timestep accumulator ("Fix Your Timestep").
//!
//! Frame time is fed in explicitly, which keeps headless runs and tests
//! deterministic. Locomotion runs at the fixed rate regardless of how
//! irregular the frames are.

use tracing::warn;

/// Default fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Frames longer than this are clamped and the simulation slows down instead
/// of trying to catch up.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Fixed-timestep loop state.
#[derive(Debug, Clone)]
pub struct GameLoop {
    fixed_dt: f64,
    max_steps_per_frame: u32,
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    /// `fixed_dt` must be positive and finite; anything else falls back to
    /// [`FIXED_DT`]. A step cap of 0 is treated as 1.
    pub fn new(fixed_dt: f64, max_steps_per_frame: u32) -> Self {
        let fixed_dt = if fixed_dt.is_finite() && fixed_dt > 0.0 {
            fixed_dt
        } else {
            warn!(fixed_dt, "invalid fixed timestep, using 1/60 s");
            FIXED_DT
        };
        Self {
            fixed_dt,
            max_steps_per_frame: max_steps_per_frame.max(1),
            accumulator: 0.0,
            total_sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Adds `frame_time` seconds and runs `update(fixed_dt, total_sim_time)`
    /// for each whole step that fits, up to the per-frame cap.
    ///
    /// Returns the number of steps run. If `update` fails, the failing step
    /// is not consumed and the error is returned immediately.
    pub fn advance<E>(
        &mut self,
        frame_time: f64,
        mut update: impl FnMut(f64, f64) -> Result<(), E>,
    ) -> Result<u32, E> {
        let frame_time = if !frame_time.is_finite() || frame_time < 0.0 {
            warn!(frame_time, "ignoring invalid frame time");
            0.0
        } else if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time
        };

        self.accumulator += frame_time;
        self.frame_count += 1;

        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_steps_per_frame {
            update(self.fixed_dt, self.total_sim_time)?;
            self.total_sim_time += self.fixed_dt;
            self.accumulator -= self.fixed_dt;
            self.update_count += 1;
            steps += 1;
        }

        // Whatever the cap left behind is dropped, not carried into the next
        // frame.
        if self.accumulator >= self.fixed_dt {
            warn!(
                dropped = self.accumulator,
                "simulation fell behind, dropping time"
            );
            self.accumulator %= self.fixed_dt;
        }

        Ok(steps)
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(FIXED_DT, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(loop_: &mut GameLoop, frame_time: f64) -> u32 {
        loop_
            .advance(frame_time, |_, _| Ok::<(), ()>(()))
            .unwrap()
    }

    #[test]
    fn test_accumulator_single_step() {
        let mut loop_ = GameLoop::default();
        assert_eq!(run(&mut loop_, FIXED_DT), 1);
        assert!(loop_.accumulator.abs() < 1e-9);
    }

    #[test]
    fn test_accumulator_multiple_steps() {
        let mut loop_ = GameLoop::default();
        let mut times = Vec::new();
        loop_
            .advance(3.0 * FIXED_DT, |_, t| {
                times.push(t);
                Ok::<(), ()>(())
            })
            .unwrap();
        assert_eq!(times.len(), 3);
        assert!((times[2] - 2.0 * FIXED_DT).abs() < 1e-12);
        assert!((loop_.total_sim_time() - 3.0 * FIXED_DT).abs() < 1e-12);
    }

    #[test]
    fn test_partial_frame_carries_over() {
        let mut loop_ = GameLoop::default();
        assert_eq!(run(&mut loop_, 0.5 * FIXED_DT), 0);
        assert!((loop_.accumulator / loop_.fixed_dt - 0.5).abs() < 1e-9);
        assert_eq!(run(&mut loop_, 0.5 * FIXED_DT), 1);
    }

    #[test]
    fn test_step_cap_drops_backlog() {
        let mut loop_ = GameLoop::new(0.01, 3);
        assert_eq!(run(&mut loop_, 0.2), 3);
        assert!(loop_.accumulator < loop_.fixed_dt);
        assert_eq!(run(&mut loop_, 0.0), 0);
    }

    #[test]
    fn test_max_frame_time_clamp() {
        let mut loop_ = GameLoop::new(FIXED_DT, 1000);
        let steps = run(&mut loop_, 10.0);
        let max_steps = (MAX_FRAME_TIME / FIXED_DT).ceil() as u32;
        assert!(steps > 0 && steps <= max_steps, "{steps}");
    }

    #[test]
    fn test_invalid_frame_time_runs_nothing() {
        let mut loop_ = GameLoop::default();
        assert_eq!(run(&mut loop_, f64::NAN), 0);
        assert_eq!(run(&mut loop_, -1.0), 0);
        assert_eq!(loop_.frame_count(), 2);
    }

    #[test]
    fn test_failed_step_is_not_consumed() {
        let mut loop_ = GameLoop::default();
        let mut calls = 0;
        let result = loop_.advance(3.0 * FIXED_DT, |_, _| {
            calls += 1;
            if calls == 2 { Err("boom") } else { Ok(()) }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(loop_.update_count(), 1);
        assert!((loop_.accumulator / loop_.fixed_dt - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_fixed_dt_falls_back() {
        let loop_ = GameLoop::new(0.0, 0);
        assert_eq!(loop_.fixed_dt(), FIXED_DT);
    }

    #[test]
    fn test_deterministic_sequence() {
        let frame_times = [0.017, 0.015, 0.020, 0.016, 0.033, 0.008, 0.018];
        let mut a = GameLoop::default();
        let mut b = GameLoop::default();
        for &ft in &frame_times {
            assert_eq!(run(&mut a, ft), run(&mut b, ft));
            assert_eq!(a.accumulator, b.accumulator);
        }
        assert_eq!(a.update_count(), b.update_count());
    }
}
