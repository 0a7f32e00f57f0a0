//! The per-frame surface triangulation and its growable sink.
//!
//! Every frame the surface extractor regenerates the full triangulation, so
//! the buffer's contents carry no cross-frame identity. Capacity only ever
//! grows, by a geometric factor, and old contents are discarded on growth
//! rather than migrated.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use log::info;

use crate::error::PipelineError;
use crate::extract::SurfaceExtractor;
use crate::shape::ShapeField;

/// One vertex of the extracted triangulation. Vertices come in groups of
/// three, one triangle each, interleaved normal-then-position.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TriangleVertex {
    /// Surface normal at the vertex.
    pub normal: Vec3,
    /// Vertex position in field space.
    pub position: Vec3,
}

impl TriangleVertex {
    /// Build a vertex from position and (not necessarily unit) normal.
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { normal, position }
    }
}

/// Growable sink holding this frame's extracted triangulation.
pub struct TriangleBuffer {
    storage: Vec<TriangleVertex>,
    len: usize,
}

impl TriangleBuffer {
    /// Allocate with an initial vertex capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![TriangleVertex::zeroed(); capacity],
            len: 0,
        }
    }

    /// Current vertex capacity.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Vertex occupancy of the current frame's triangulation.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the current frame produced no surface.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The current frame's vertices.
    pub fn vertices(&self) -> &[TriangleVertex] {
        &self.storage[..self.len]
    }

    /// Grow storage to `ceil(1.1 × required)` vertices if `required` exceeds
    /// the current capacity. Contents are regenerated in full every frame,
    /// so growth discards them instead of migrating.
    pub fn ensure_capacity(&mut self, required: usize) {
        if required > self.storage.len() {
            let grown = required + (required + 9) / 10;
            info!("resizing triangle buffer to hold {} vertices", grown);
            self.storage = vec![TriangleVertex::zeroed(); grown];
        }
    }

    /// Run the extractor for the given field and iso level, then perform the
    /// blocking count readback and pull the triangulation into this sink.
    ///
    /// This is the first of the pipeline's three per-frame synchronization
    /// stalls: nothing downstream can size its writes until the exact vertex
    /// count is known. Extractor failure is a fatal collaborator error.
    pub fn extract<E: SurfaceExtractor + ?Sized>(
        &mut self,
        extractor: &mut E,
        field: &ShapeField,
        iso_level: f32,
    ) -> Result<usize, PipelineError> {
        extractor.build(field, iso_level)?;
        let count = extractor.vertex_count();
        self.ensure_capacity(count);
        extractor.read_into(&mut self.storage[..count]);
        self.len = count;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_factor_is_exact() {
        let mut buffer = TriangleBuffer::new(3000);
        buffer.ensure_capacity(3500);
        assert_eq!(buffer.capacity(), 3850);
    }

    #[test]
    fn test_capacity_never_shrinks() {
        let mut buffer = TriangleBuffer::new(3000);
        buffer.ensure_capacity(4000);
        let grown = buffer.capacity();
        buffer.ensure_capacity(10);
        assert_eq!(buffer.capacity(), grown);
    }

    #[test]
    fn test_exact_fit_does_not_grow() {
        let mut buffer = TriangleBuffer::new(3000);
        buffer.ensure_capacity(3000);
        assert_eq!(buffer.capacity(), 3000);
    }

    #[test]
    fn test_extract_overwrites_fully() {
        use crate::extract::testing::FixedExtractor;

        let mut buffer = TriangleBuffer::new(16);
        let field = ShapeField::new([0.0; 12]);

        let mut big = FixedExtractor::with_triangles(8);
        let n = buffer.extract(&mut big, &field, 0.0).unwrap();
        assert_eq!(n, 24);
        assert_eq!(buffer.len(), 24);

        let mut small = FixedExtractor::with_triangles(2);
        let n = buffer.extract(&mut small, &field, 0.0).unwrap();
        assert_eq!(n, 6);
        assert_eq!(buffer.len(), 6);
        // Capacity kept from the larger frame.
        assert!(buffer.capacity() >= 24);
    }
}
