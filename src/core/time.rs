//! Frame timing

use std::time::{Duration, Instant};

/// Tracks frame delta and total elapsed time
#[derive(Debug, Clone)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    delta: Duration,
}

impl Time {
    /// Start the clock now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta: Duration::ZERO,
        }
    }

    /// Advance to the current frame
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
    }

    /// Time between the last two frames
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time between the last two frames in seconds
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Seconds since the clock started
    pub fn elapsed_seconds(&self) -> f32 {
        (self.last_frame - self.start).as_secs_f32()
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
