//! Page-table walker.
//!
//! Tracks the walks the hardware walker has in flight. Walk slots are
//! claimed when a TLB miss starts a walk and released when the requesting
//! micro-op writes back. After a pipeline squash, dead walks are not freed
//! instantly: the walker reclaims at most `num_squash_per_cycle` of them
//! per cycle, so a large squash keeps walk slots occupied for several
//! cycles.

struct Walk {
    seq: u64,
    squashed: bool,
}

/// Hardware page-table walker state.
pub struct PageTableWalker {
    levels: usize,
    num_squash_per_cycle: usize,
    slots: usize,
    walks: Vec<Walk>,
}

impl PageTableWalker {
    /// Creates a walker for a `levels`-deep page table.
    pub fn new(levels: usize, slots: usize, num_squash_per_cycle: usize) -> Self {
        Self {
            levels: levels.max(1),
            num_squash_per_cycle: num_squash_per_cycle.max(1),
            slots: slots.max(1),
            walks: Vec::new(),
        }
    }

    /// Number of page-table levels a walk traverses.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Number of walks currently occupying slots (including dead ones not
    /// yet reclaimed).
    pub fn in_flight(&self) -> usize {
        self.walks.len()
    }

    /// Every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.walks.len() >= self.slots
    }

    /// Claims a walk slot for the micro-op `seq`.
    ///
    /// Returns `false` when all slots are occupied; the requester must
    /// retry on a later cycle.
    pub fn try_start(&mut self, seq: u64) -> bool {
        if self.is_full() {
            return false;
        }
        self.walks.push(Walk {
            seq,
            squashed: false,
        });
        true
    }

    /// Releases the slot held by `seq` after its op writes back.
    pub fn complete(&mut self, seq: u64) {
        if let Some(pos) = self
            .walks
            .iter()
            .position(|w| w.seq == seq && !w.squashed)
        {
            self.walks.remove(pos);
        }
    }

    /// Marks every walk younger than `seq` dead.
    ///
    /// Returns how many walks were newly marked.
    pub fn squash_after(&mut self, seq: u64) -> u64 {
        let mut marked = 0;
        for walk in &mut self.walks {
            if walk.seq > seq && !walk.squashed {
                walk.squashed = true;
                marked += 1;
            }
        }
        marked
    }

    /// Advances one cycle, reclaiming up to `num_squash_per_cycle` dead
    /// walks.
    pub fn tick(&mut self) {
        let mut reclaimed = 0;
        self.walks.retain(|w| {
            if w.squashed && reclaimed < self.num_squash_per_cycle {
                reclaimed += 1;
                false
            } else {
                true
            }
        });
    }
}
