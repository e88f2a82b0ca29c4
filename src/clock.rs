use std::f32::consts::TAU;
use std::time::{Duration, Instant};

/// Redraws per second the editor aims for
pub const FRAME_RATE: u32 = 30;

pub const FRAME_BUDGET: Duration = Duration::from_nanos(1_000_000_000 / FRAME_RATE as u64);

const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Paces redraws and counts how many actually happened in the last second
pub struct FrameClock {
    started: Instant,
    previous_draw: Instant,
    window_start: Instant,
    draws_in_window: u32,
    measured_fps: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            previous_draw: now,
            window_start: now,
            draws_in_window: 0,
            measured_fps: FRAME_RATE,
        }
    }

    pub fn should_render(&self) -> bool {
        self.time_until_next_frame().is_zero()
    }

    /// Record a finished draw and roll the FPS window when it is full
    pub fn frame_rendered(&mut self) {
        let now = Instant::now();
        self.previous_draw = now;
        self.draws_in_window += 1;

        if now.duration_since(self.window_start) >= FPS_WINDOW {
            self.measured_fps = std::mem::take(&mut self.draws_in_window);
            self.window_start = now;
        }
    }

    pub fn fps(&self) -> u32 {
        self.measured_fps
    }

    /// Seconds since the clock started
    pub fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    pub fn time_until_next_frame(&self) -> Duration {
        FRAME_BUDGET.saturating_sub(self.previous_draw.elapsed())
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Smooth 0..1 oscillation at `hz`, used for the staged placement's glow
pub fn pulse(time: f32, hz: f32) -> f32 {
    0.5 + 0.5 * (time * hz * TAU).sin()
}
