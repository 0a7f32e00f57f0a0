//! Surface extraction collaborator.
//!
//! The pipeline treats iso-surface extraction as a black box behind
//! [`SurfaceExtractor`]: build the triangulation for a field, ask for the
//! exact vertex count (the blocking readback), then pull the vertices into
//! the frame's sink. [`GridExtractor`] is the bundled implementation, a
//! marching-tetrahedra walk over the sample lattice parallelized per
//! z-slab. Any other extractor can be substituted through the trait.

use glam::Vec3;
use rayon::prelude::*;

use crate::error::PipelineError;
use crate::mesh::TriangleVertex;
use crate::shape::ShapeField;

/// Contract between the pipeline and the extraction collaborator.
///
/// `build` must be invoked before anything else each frame; the count and
/// the vertices refer to the most recent `build`. A failing `build` is
/// fatal to the pipeline, never retried.
pub trait SurfaceExtractor {
    /// Triangulate the iso-surface of `field` at `iso_level`.
    fn build(&mut self, field: &ShapeField, iso_level: f32) -> Result<(), PipelineError>;

    /// Exact number of triangle vertices the last `build` produced.
    ///
    /// This models the blocking count readback: for a device-side extractor
    /// the call stalls the orchestrating thread until extraction finishes.
    fn vertex_count(&self) -> usize;

    /// Copy the triangulation into `sink`, which holds exactly
    /// [`vertex_count`](Self::vertex_count) elements.
    fn read_into(&self, sink: &mut [TriangleVertex]);
}

/// Corner offsets of a lattice cell, bit i of the index selecting the axis.
const CORNERS: [(u32, u32, u32); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (1, 1, 0),
    (0, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (1, 1, 1),
    (0, 1, 1),
];

/// Decomposition of a cell into six tetrahedra sharing the 0-6 diagonal.
const TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 5, 1, 6],
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
];

/// CPU marching-tetrahedra extractor over a fixed sample lattice spanning
/// `[-1, 1]³`.
pub struct GridExtractor {
    grid: [u32; 3],
    mesh: Vec<TriangleVertex>,
}

impl GridExtractor {
    /// Create an extractor for the given per-axis sample counts.
    pub fn new(grid: [u32; 3]) -> Self {
        Self {
            grid,
            mesh: Vec::new(),
        }
    }

    /// World position of lattice point `(i, j, k)`.
    fn lattice_point(&self, i: u32, j: u32, k: u32) -> Vec3 {
        let scale = |v: u32, n: u32| 2.0 * v as f32 / (n - 1) as f32 - 1.0;
        Vec3::new(
            scale(i, self.grid[0]),
            scale(j, self.grid[1]),
            scale(k, self.grid[2]),
        )
    }

    /// Triangulate every cell of one z-slab.
    fn march_slab(
        &self,
        field: &ShapeField,
        iso_level: f32,
        k: u32,
        out: &mut Vec<TriangleVertex>,
    ) {
        let [nx, ny, _] = self.grid;
        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                let mut positions = [Vec3::ZERO; 8];
                let mut values = [0.0f32; 8];
                for (c, &(di, dj, dk)) in CORNERS.iter().enumerate() {
                    let p = self.lattice_point(i + di, j + dj, k + dk);
                    positions[c] = p;
                    values[c] = field.eval(p) - iso_level;
                }
                for tet in &TETRAHEDRA {
                    march_tetrahedron(field, &positions, &values, tet, out);
                }
            }
        }
    }
}

/// Emit the crossing triangles of one tetrahedron.
fn march_tetrahedron(
    field: &ShapeField,
    positions: &[Vec3; 8],
    values: &[f32; 8],
    tet: &[usize; 4],
    out: &mut Vec<TriangleVertex>,
) {
    let mut mask = 0usize;
    for (bit, &corner) in tet.iter().enumerate() {
        if values[corner] < 0.0 {
            mask |= 1 << bit;
        }
    }
    // A case and its complement cross the same edges.
    let case = if mask >= 8 { 15 - mask } else { mask };
    if case == 0 {
        return;
    }

    let edge = |a: usize, b: usize| -> TriangleVertex {
        let (ca, cb) = (tet[a], tet[b]);
        let t = values[ca] / (values[ca] - values[cb]);
        let p = positions[ca].lerp(positions[cb], t);
        let n = field.normal(p).unwrap_or(Vec3::Y);
        TriangleVertex::new(p, n)
    };

    match case {
        1 => out.extend([edge(0, 1), edge(0, 2), edge(0, 3)]),
        2 => out.extend([edge(1, 0), edge(1, 2), edge(1, 3)]),
        3 => {
            let (a, b, c, d) = (edge(0, 2), edge(0, 3), edge(1, 2), edge(1, 3));
            out.extend([a, b, c]);
            out.extend([c, b, d]);
        }
        4 => out.extend([edge(2, 0), edge(2, 1), edge(2, 3)]),
        5 => {
            let (a, b, c, d) = (edge(0, 1), edge(0, 3), edge(2, 1), edge(2, 3));
            out.extend([a, b, c]);
            out.extend([c, b, d]);
        }
        6 => {
            let (a, b, c, d) = (edge(1, 0), edge(1, 3), edge(2, 0), edge(2, 3));
            out.extend([a, b, c]);
            out.extend([c, b, d]);
        }
        _ => out.extend([edge(0, 3), edge(1, 3), edge(2, 3)]),
    }
}

impl SurfaceExtractor for GridExtractor {
    fn build(&mut self, field: &ShapeField, iso_level: f32) -> Result<(), PipelineError> {
        let nz = self.grid[2];
        // Independent per-slab kernels; the ordered collect is the join.
        let slabs: Vec<Vec<TriangleVertex>> = (0..nz - 1)
            .into_par_iter()
            .map(|k| {
                let mut out = Vec::new();
                self.march_slab(field, iso_level, k, &mut out);
                out
            })
            .collect();

        self.mesh.clear();
        for slab in slabs {
            self.mesh.extend(slab);
        }
        Ok(())
    }

    fn vertex_count(&self) -> usize {
        self.mesh.len()
    }

    fn read_into(&self, sink: &mut [TriangleVertex]) {
        sink.copy_from_slice(&self.mesh);
    }
}
