//! The emission stage: seed new particles over the extracted surface.
//!
//! Rather than an independent per-triangle probability, emission uses
//! deterministic stride sampling: with threshold `T` and a per-frame random
//! offset `o ∈ [0, T)`, triangle `i` emits iff `(i + o) mod T == 0`. The
//! offset is re-drawn every frame so no fixed sampling phase biases which
//! triangles get picked. The rate controller steers `T` toward the target
//! flow.

use glam::Vec3;
use log::warn;

use crate::kernel;
use crate::mesh::TriangleVertex;
use crate::particle::Particle;

/// Initial outward speed given to a freshly emitted particle.
const EMIT_SPEED: f32 = 0.1;

/// Stride-sample the frame's triangulation, writing new particles from
/// position 0 of `slot` (the inactive particle slot, cleared by the
/// caller). Returns the exact emitted count, known only after the kernel
/// joins; this is the second per-frame synchronization stall.
///
/// Emission is clamped to the slot's spare capacity, deterministically:
/// two runs seeing the same surface clamp at the same index.
pub fn run(
    vertices: &[TriangleVertex],
    threshold: u32,
    offset: u32,
    slot: &mut Vec<Particle>,
    capacity: usize,
) -> usize {
    debug_assert!(threshold >= 1);
    debug_assert!(offset < threshold);
    debug_assert!(slot.is_empty());

    let threshold = threshold as usize;
    let offset = offset as usize;
    let mut emitted = kernel::filter_map_chunks(vertices, 3, |i, triangle| {
        if (i + offset) % threshold != 0 {
            return None;
        }
        Some(spawn_on_triangle(triangle))
    });

    if emitted.len() > capacity {
        warn!(
            "emission overflow: {} emitted into slot of {}, clamping",
            emitted.len(),
            capacity
        );
        emitted.truncate(capacity);
    }
    *slot = emitted;
    slot.len()
}

/// New particle at the triangle's centroid, pushed gently along its
/// averaged normal.
fn spawn_on_triangle(triangle: &[TriangleVertex]) -> Particle {
    let centroid = (triangle[0].position + triangle[1].position + triangle[2].position) / 3.0;
    let normal = (triangle[0].normal + triangle[1].normal + triangle[2].normal)
        .try_normalize()
        .unwrap_or(Vec3::Y);
    Particle::emitted(centroid, normal * EMIT_SPEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangles(count: usize) -> Vec<TriangleVertex> {
        (0..count * 3)
            .map(|i| {
                TriangleVertex::new(
                    Vec3::new((i / 3) as f32, 0.0, 0.0),
                    Vec3::new(0.0, 1.0, 0.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_stride_sampling_count() {
        let vertices = triangles(100);
        let mut slot = Vec::new();
        // Threshold 10, offset 0: triangles 0, 10, ..., 90.
        let emitted = run(&vertices, 10, 0, &mut slot, 1000);
        assert_eq!(emitted, 10);
        assert_eq!(slot.len(), 10);
    }

    #[test]
    fn test_offset_shifts_sampling_phase() {
        let vertices = triangles(100);
        let mut a = Vec::new();
        let mut b = Vec::new();
        run(&vertices, 10, 0, &mut a, 1000);
        run(&vertices, 10, 3, &mut b, 1000);
        assert_eq!(a.len(), b.len());
        // Offset 3 picks triangles 7, 17, ...: different surface points.
        assert_ne!(a[0].position, b[0].position);
    }

    #[test]
    fn test_threshold_one_emits_every_triangle() {
        let vertices = triangles(37);
        let mut slot = Vec::new();
        assert_eq!(run(&vertices, 1, 0, &mut slot, 1000), 37);
    }

    #[test]
    fn test_emission_clamped_to_capacity() {
        let vertices = triangles(50);
        let mut slot = Vec::new();
        let emitted = run(&vertices, 1, 0, &mut slot, 8);
        assert_eq!(emitted, 8);
        assert_eq!(slot.len(), 8);
    }

    #[test]
    fn test_spawn_uses_centroid_and_fresh_life() {
        let vertices = triangles(1);
        let mut slot = Vec::new();
        run(&vertices, 1, 0, &mut slot, 8);
        let p = &slot[0];
        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.info.life, 1.0);
        assert_eq!(p.info.bounce, 0.0);
        // Pushed along the averaged normal.
        assert!(p.velocity.y > 0.0);
    }

    #[test]
    fn test_empty_surface_emits_nothing() {
        let mut slot = Vec::new();
        assert_eq!(run(&[], 5, 2, &mut slot, 1000), 0);
    }
}
