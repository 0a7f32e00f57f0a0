//! # Morphfall — adaptive streaming particle pipeline
//!
//! A particle system driven by the isosurface of a time-morphing algebraic
//! shape. Every frame the surface is re-triangulated over a sampling grid,
//! new particles are seeded on a stride-sampled subset of the triangles,
//! and last frame's population is aged, integrated under gravity and
//! bounced off the moving surface. A feedback controller steers the
//! sampling stride so emission tracks a target particle flow no matter how
//! large the triangulation gets.
//!
//! ## Quick start
//!
//! ```ignore
//! use morphfall::prelude::*;
//!
//! let config = PipelineConfig::default().with_cubic_grid(64);
//! let mut extractor = GridExtractor::new(config.grid);
//! let mut pipeline = Pipeline::new(config)?;
//!
//! // Per frame:
//! let report = pipeline.step(&mut extractor, FrameInput { t, dt })?;
//! draw_surface(pipeline.triangle_vertices());
//! draw_particles(pipeline.particles());
//! ```
//!
//! ## Structure
//!
//! - [`shape`] — the morphing algebraic field and its shape catalogue,
//! - [`extract`] — marching-tetrahedra triangulation of the iso level,
//! - [`emit`] / [`integrate`] — the two data-parallel particle stages,
//! - [`rate`] — the multiplicative-increase / halving flow controller,
//! - [`store`] — the double-buffered particle store,
//! - [`pipeline`] — per-frame orchestration of all of the above,
//! - [`render`] — wgpu surface and billboard passes for the demo host.
//!
//! All simulation state is CPU-side and deterministic from the reset seed;
//! the GPU only ever sees the finished frame.

pub mod config;
pub mod emit;
pub mod error;
pub mod extract;
pub mod integrate;
mod kernel;
pub mod mesh;
pub mod particle;
pub mod pipeline;
pub mod rate;
pub mod render;
pub mod shape;
pub mod store;
pub mod time;

pub use config::PipelineConfig;
pub use error::{GpuError, PipelineError};
pub use extract::{GridExtractor, SurfaceExtractor};
pub use glam::Vec3;
pub use mesh::{TriangleBuffer, TriangleVertex};
pub use particle::{Particle, ParticleGpu, ParticleInfo};
pub use pipeline::{FrameInput, FrameReport, Pipeline};
pub use rate::RateController;
pub use shape::{ShapeField, ShapeLibrary, SHAPE_PERIOD};
pub use store::ParticleStore;
pub use time::Time;

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{GpuError, PipelineError};
    pub use crate::extract::{GridExtractor, SurfaceExtractor};
    pub use crate::pipeline::{FrameInput, FrameReport, Pipeline};
    pub use crate::shape::{ShapeField, ShapeLibrary};
    pub use crate::time::Time;
    pub use glam::Vec3;
}
