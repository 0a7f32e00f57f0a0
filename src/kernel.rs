//! Data-parallel kernel primitives for the pipeline stages.
//!
//! Each stage is a kernel over independent elements: no element reads
//! another element's state, so the work parallelizes freely. The output
//! size of an emit/cull kernel is data-dependent and only known once every
//! element has been processed; the ordered collect below is that join, and
//! the caller reading `len()` afterwards is the blocking count readback.
//! On a GPU target the same contract is an append counter plus a counter
//! readback; here it is a thread-pool map job.

use rayon::prelude::*;

/// Parallel filter-map over `input` preserving element order.
///
/// `f` receives the element index and a reference; returning `None` drops
/// the element from the output stream. The result length is the kernel's
/// produced count.
pub(crate) fn filter_map_ordered<T, U, F>(input: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(usize, &T) -> Option<U> + Sync,
{
    input
        .par_iter()
        .enumerate()
        .filter_map(|(i, t)| f(i, t))
        .collect()
}

/// Parallel filter-map over consecutive non-overlapping chunks of `input`,
/// preserving chunk order. Used for streams whose logical elements span
/// several array entries, like triangles over a vertex stream.
pub(crate) fn filter_map_chunks<T, U, F>(input: &[T], chunk: usize, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(usize, &[T]) -> Option<U> + Sync,
{
    input
        .par_chunks_exact(chunk)
        .enumerate()
        .filter_map(|(i, c)| f(i, c))
        .collect()
}
