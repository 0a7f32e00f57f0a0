//! Emission-rate feedback control.
//!
//! A deliberately simple bang-bang controller, not a PID loop: once the
//! measured emission rate leaves the hysteresis band around the target
//! flow, the sampling threshold takes a large multiplicative step (halving
//! to emit more, a 10.1× jump to emit less). It converges into the band but
//! may oscillate rather than settle smoothly.

/// Frame durations below this are clamped when computing the rate.
const MIN_DT: f32 = 1e-5;

/// Holds the current emission threshold and adjusts it from measured
/// throughput once per frame.
#[derive(Clone, Debug)]
pub struct RateController {
    threshold: u32,
    initial_threshold: u32,
    threshold_max: u32,
    target_flow: f32,
    margin: f32,
}

impl RateController {
    /// Create a controller. `initial_threshold` is clamped into
    /// `[1, threshold_max]` and restored by [`reset`](Self::reset).
    pub fn new(initial_threshold: u32, threshold_max: u32, target_flow: f32, margin: f32) -> Self {
        let initial_threshold = initial_threshold.clamp(1, threshold_max);
        Self {
            threshold: initial_threshold,
            initial_threshold,
            threshold_max,
            target_flow,
            margin,
        }
    }

    /// The sampling stride the emission stage should use this frame.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Feed back the frame's emission count and duration, updating the
    /// threshold for subsequent use. Returns the new threshold.
    ///
    /// Halving uses integer floor division; growth is `ceil(threshold × 10.1)`
    /// computed exactly in integers as `(threshold × 101 + 9) / 10`.
    pub fn update(&mut self, emitted: usize, dt: f32) -> u32 {
        let rate = emitted as f32 / dt.max(MIN_DT);
        if rate < self.target_flow - self.margin {
            self.threshold = (self.threshold / 2).max(1);
        } else if rate > self.target_flow + self.margin {
            let grown = (u64::from(self.threshold) * 101 + 9) / 10;
            self.threshold = grown.min(u64::from(self.threshold_max)) as u32;
        }
        self.threshold
    }

    /// Restore the initial threshold, as part of the pipeline reset event.
    pub fn reset(&mut self) {
        self.threshold = self.initial_threshold;
    }
}
