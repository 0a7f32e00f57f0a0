//! Pipeline configuration.
//!
//! All tunables are fixed at pipeline start. Defaults: a 64³ sample grid,
//! 4000 particles/second of target flow, and a 20000-particle pool per
//! slot.

use crate::error::PipelineError;

/// Configuration for a [`Pipeline`](crate::Pipeline), set once at start.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Target emission flow in particles per second.
    pub target_flow: f32,
    /// Hysteresis margin around the target flow, in particles per second.
    /// Within `[target_flow - margin, target_flow + margin]` the emission
    /// threshold is left alone.
    pub flow_margin: f32,
    /// Initial emission threshold (sampling stride). Restored on reset.
    pub initial_threshold: u32,
    /// Upper saturation bound for the emission threshold.
    pub threshold_max: u32,
    /// Initial triangle buffer capacity, in vertices. Grows on demand.
    pub triangle_capacity: usize,
    /// Fixed capacity of each particle slot. Never reallocated.
    pub particle_capacity: usize,
    /// Number of field samples along each axis. Every axis must be >= 4.
    pub grid: [u32; 3],
    /// Downward gravity acceleration applied to particles.
    pub gravity: f32,
    /// Seconds a particle lives before dying of old age.
    pub death_age: f32,
    /// Iso level at which the surface is extracted and collisions tested.
    pub iso_level: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_flow: 4000.0,
            flow_margin: 100.0,
            initial_threshold: 500,
            threshold_max: 100_000,
            triangle_capacity: 3 * 1000,
            particle_capacity: 20_000,
            grid: [64, 64, 64],
            gravity: 1.5,
            death_age: 3.0,
            iso_level: 0.001,
        }
    }
}

impl PipelineConfig {
    /// Use the same sample count along every axis.
    pub fn with_cubic_grid(mut self, size: u32) -> Self {
        self.grid = [size, size, size];
        self
    }

    /// Validate start-up constraints. A grid axis below 4 samples is fatal.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (axis, &size) in ['x', 'y', 'z'].into_iter().zip(self.grid.iter()) {
            if size < 4 {
                return Err(PipelineError::GridTooSmall { axis, size });
            }
        }
        Ok(())
    }

    /// Number of cells in the extraction grid, `(nx-1)(ny-1)(nz-1)`.
    pub fn cell_count(&self) -> u64 {
        self.grid.iter().map(|&n| (n - 1) as u64).product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_small_axis_rejected() {
        let config = PipelineConfig {
            grid: [64, 3, 64],
            ..Default::default()
        };
        match config.validate() {
            Err(PipelineError::GridTooSmall { axis, size }) => {
                assert_eq!(axis, 'y');
                assert_eq!(size, 3);
            }
            other => panic!("expected GridTooSmall, got {:?}", other),
        }
    }

    #[test]
    fn test_minimum_axis_accepted() {
        let config = PipelineConfig::default().with_cubic_grid(4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cell_count() {
        let config = PipelineConfig {
            grid: [4, 5, 6],
            ..Default::default()
        };
        assert_eq!(config.cell_count(), 3 * 4 * 5);
    }
}
