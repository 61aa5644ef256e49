//! Register alias table.
//!
//! Maps each architectural register to the sequence number of its
//! youngest in-flight producer. A register with no mapping reads its
//! architectural value and is always ready.

use std::collections::HashMap;

/// Rename-stage alias table.
#[derive(Default)]
pub struct RegisterAliasTable {
    table: HashMap<u8, u64>,
}

impl RegisterAliasTable {
    /// Creates an empty alias table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the producing sequence number for `reg`, if any producer is
    /// still in flight.
    pub fn get(&self, reg: u8) -> Option<u64> {
        self.table.get(&reg).copied()
    }

    /// Records `seq` as the youngest producer of `reg`.
    pub fn set(&mut self, reg: u8, seq: u64) {
        self.table.insert(reg, seq);
    }

    /// Drops the mapping for `reg` if `seq` is still its producer.
    ///
    /// Called at commit: the value becomes architectural.
    pub fn release(&mut self, reg: u8, seq: u64) {
        if self.table.get(&reg) == Some(&seq) {
            self.table.remove(&reg);
        }
    }

    /// Removes every mapping younger than `seq` after a squash.
    pub fn squash_after(&mut self, seq: u64) {
        self.table.retain(|_, producer| *producer <= seq);
    }
}
