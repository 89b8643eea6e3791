//! Frame timing and delta time.
//!
//! [`Time`] lives in the [`Context`](crate::context::Context) and is advanced
//! once per frame by the editor. Systems read it to timestamp selections and
//! pace hot-reload polling.

use std::time::{Duration, Instant};

/// Frame timing, updated by the editor at the start of each frame.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// When the current frame started.
    frame_start: Instant,
    /// Duration of the previous frame.
    delta: Duration,
    /// Total time since startup.
    elapsed: Duration,
    /// Frame counter.
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance by the wall-clock time since the previous frame.
    pub(crate) fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.frame_start;
        self.frame_start = now;
        self.advance(delta);
    }

    /// Advance by a fixed step. Headless drivers and tests use this.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Duration of the previous frame.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total elapsed time since startup.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total elapsed time in seconds (f32).
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
