//! Frame timing for the demo host.
//!
//! Tracks elapsed time, per-frame delta and a periodically refreshed FPS
//! figure. A loop period can be set so elapsed time wraps back to exactly
//! zero, which is how the host drives the pipeline's reset event.

use std::time::{Duration, Instant};

/// Time tracking for the render loop.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    loop_period: Option<f32>,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            loop_period: None,
        }
    }

    /// Wrap elapsed time back to exactly zero every `period` seconds.
    pub fn with_loop_period(mut self, period: f32) -> Self {
        self.loop_period = Some(period);
        self
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        if let Some(period) = self.loop_period {
            if self.elapsed_secs >= period {
                // Snap to zero so downstream reset triggers see an exact
                // boundary crossing.
                self.start = now;
                self.elapsed_secs = 0.0;
            }
        }

        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Elapsed time in seconds since start (or since the last loop wrap).
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_loop_wraps_to_exact_zero() {
        let mut time = Time::new().with_loop_period(0.005);
        thread::sleep(Duration::from_millis(10));
        let (elapsed, _) = time.update();
        assert_eq!(elapsed, 0.0);

        // The next frame starts counting from the wrap.
        thread::sleep(Duration::from_millis(2));
        let (elapsed, _) = time.update();
        assert!(elapsed > 0.0);
        assert!(elapsed < 0.005);
    }
}
