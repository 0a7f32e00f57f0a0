//! Double-buffered particle storage.
//!
//! Two fixed-capacity slots alternate roles every frame: the slot written
//! in frame *k* becomes the slot read in frame *k+1*. Within a frame one
//! slot is the sole reader and the other the sole writer; single-threaded
//! orchestration of the swap makes locking unnecessary. Slots are allocated
//! once and never reallocated for the lifetime of the pipeline.

use crate::particle::Particle;

/// Ping-pong arena of two particle slots plus the active (readable) index.
pub struct ParticleStore {
    slots: [Vec<Particle>; 2],
    capacity: usize,
    active: usize,
}

impl ParticleStore {
    /// Allocate both slots with the given fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: [Vec::with_capacity(capacity), Vec::with_capacity(capacity)],
            capacity,
            active: 0,
        }
    }

    /// Fixed capacity shared by both slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index of the currently active (readable) slot.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Live occupancy of the active slot.
    pub fn len(&self) -> usize {
        self.slots[self.active].len()
    }

    /// Whether the active slot holds no particles.
    pub fn is_empty(&self) -> bool {
        self.slots[self.active].is_empty()
    }

    /// The active slot's particles.
    pub fn active_slot(&self) -> &[Particle] {
        &self.slots[self.active]
    }

    /// Split-borrow the store for one frame: the active slot read-only, the
    /// inactive slot writable and cleared. The disjoint borrows make
    /// read/write aliasing of a single slot impossible to express.
    pub fn split(&mut self) -> (&[Particle], &mut Vec<Particle>) {
        let (lo, hi) = self.slots.split_at_mut(1);
        let (read, write) = if self.active == 0 {
            (&lo[0], &mut hi[0])
        } else {
            (&hi[0], &mut lo[0])
        };
        write.clear();
        (read.as_slice(), write)
    }

    /// Promote the slot written this frame to active for the next frame.
    pub fn commit(&mut self) {
        debug_assert!(self.slots[1 - self.active].len() <= self.capacity);
        self.active = 1 - self.active;
    }

    /// Drop all particles and return to the initial slot assignment.
    pub fn reset(&mut self) {
        self.slots[0].clear();
        self.slots[1].clear();
        self.active = 0;
    }
}
