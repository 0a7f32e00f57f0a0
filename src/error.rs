//! Error types for the particle pipeline.
//!
//! Steady-state operation of the pipeline has no recoverable-error path:
//! stage counts are well-defined non-negative integers bounded by their
//! buffer capacities. The errors here cover start-up validation and
//! collaborator failures, both of which are fatal for the demo binary.

use std::fmt;

/// Errors raised by pipeline construction or by a frame step.
#[derive(Debug)]
pub enum PipelineError {
    /// A grid axis is below the minimum of 4 samples.
    GridTooSmall {
        /// Axis name: 'x', 'y' or 'z'.
        axis: char,
        /// The offending sample count.
        size: u32,
    },
    /// The surface extractor collaborator failed. Not retried.
    Extractor(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::GridTooSmall { axis, size } => {
                write!(f, "Volume size {} < 4 (got {})", axis, size)
            }
            PipelineError::Extractor(msg) => {
                write!(f, "Surface extraction failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// Errors raised while acquiring the GPU for the render stage.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}
