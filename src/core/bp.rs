//! Branch direction predictor.
//!
//! A table of 2-bit saturating counters indexed by the branch pc. Counters
//! start weakly not-taken and move toward the observed direction at
//! resolve time.

/// Two-bit saturating counter predictor.
pub struct BranchPredictor {
    counters: Vec<u8>,
    mask: u64,
}

impl BranchPredictor {
    /// Creates a predictor with at least `table_size` counters (rounded up
    /// to a power of two).
    pub fn new(table_size: usize) -> Self {
        let size = table_size.max(2).next_power_of_two();
        Self {
            counters: vec![1; size],
            mask: (size - 1) as u64,
        }
    }

    fn index(&self, pc: u64) -> usize {
        ((pc >> 2) & self.mask) as usize
    }

    /// Predicts the direction of the branch at `pc`.
    pub fn predict(&self, pc: u64) -> bool {
        self.counters[self.index(pc)] >= 2
    }

    /// Trains the counter with the resolved direction.
    pub fn update(&mut self, pc: u64, taken: bool) {
        let idx = self.index(pc);
        let counter = &mut self.counters[idx];
        if taken {
            *counter = (*counter + 1).min(3);
        } else {
            *counter = counter.saturating_sub(1);
        }
    }
}
