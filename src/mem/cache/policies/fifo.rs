//! First-In First-Out (FIFO) Replacement Policy.
//!
//! Evicts ways in the order they were filled, ignoring access recency.
//! Each set keeps a rotating pointer to the next victim; hits do not move
//! it.

use super::ReplacementPolicy;

/// FIFO policy state.
pub struct FifoPolicy {
    next_victim: Vec<usize>,
    ways: usize,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_victim: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    /// Hits do not affect FIFO ordering.
    fn update(&mut self, _set: usize, _way: usize) {}

    /// Advances the victim pointer past the freshly filled way.
    fn fill(&mut self, set: usize, way: usize) {
        if way == self.next_victim[set] {
            self.next_victim[set] = (way + 1) % self.ways;
        }
    }

    /// Returns the oldest-filled way.
    fn get_victim(&mut self, set: usize) -> usize {
        self.next_victim[set]
    }
}
