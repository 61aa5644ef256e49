//! Issue queue and load/store queue.
//!
//! Renamed micro-ops wait in the issue queue until their source producers
//! broadcast results; memory ops additionally occupy a load/store queue
//! slot from dispatch to commit, bounding the number of memory ops in
//! flight.

use std::collections::VecDeque;

use crate::core::uop::Uop;

/// One waiting micro-op.
#[derive(Clone, Copy, Debug)]
pub struct IqEntry {
    pub seq: u64,
    pub uop: Uop,
    /// Direction predicted at fetch (branches only).
    pub pred_taken: bool,
    /// Producer sequence number the first source still waits on.
    pub wait1: Option<u64>,
    /// Producer sequence number the second source still waits on.
    pub wait2: Option<u64>,
}

impl IqEntry {
    /// Both sources have their values.
    pub fn ready(&self) -> bool {
        self.wait1.is_none() && self.wait2.is_none()
    }
}

/// Out-of-order scheduling window.
///
/// Entries are kept in insertion (program) order; selection walks them
/// oldest-first, so among ready ops the oldest issue first.
pub struct IssueQueue {
    entries: Vec<IqEntry>,
    capacity: usize,
}

impl IssueQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a renamed micro-op. The caller must check `is_full`.
    pub fn insert(&mut self, entry: IqEntry) {
        self.entries.push(entry);
    }

    /// Broadcasts a completed producer, clearing matching waits.
    pub fn wakeup(&mut self, seq: u64) {
        for entry in &mut self.entries {
            if entry.wait1 == Some(seq) {
                entry.wait1 = None;
            }
            if entry.wait2 == Some(seq) {
                entry.wait2 = None;
            }
        }
    }

    /// Sequence numbers of all ready entries, oldest first.
    pub fn ready_seqs(&self) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|e| e.ready())
            .map(|e| e.seq)
            .collect()
    }

    /// Looks at the entry for `seq`.
    pub fn get(&self, seq: u64) -> Option<&IqEntry> {
        self.entries.iter().find(|e| e.seq == seq)
    }

    /// Removes and returns the entry for `seq`.
    pub fn remove(&mut self, seq: u64) -> Option<IqEntry> {
        let pos = self.entries.iter().position(|e| e.seq == seq)?;
        Some(self.entries.remove(pos))
    }

    /// Drops every entry younger than `seq`. Returns how many were removed.
    pub fn squash_after(&mut self, seq: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.seq <= seq);
        before - self.entries.len()
    }
}

/// Occupancy tracker for in-flight memory micro-ops.
///
/// A slot is taken at dispatch and released when the op commits (or is
/// squashed).
pub struct LoadStoreQueue {
    seqs: VecDeque<u64>,
    capacity: usize,
}

impl LoadStoreQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            seqs: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn is_full(&self) -> bool {
        self.seqs.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    /// Claims a slot for `seq`. The caller must check `is_full`.
    pub fn push(&mut self, seq: u64) {
        self.seqs.push_back(seq);
    }

    /// Releases the slot held by `seq`, if any.
    pub fn release(&mut self, seq: u64) {
        if let Some(pos) = self.seqs.iter().position(|&s| s == seq) {
            self.seqs.remove(pos);
        }
    }

    /// Drops every slot younger than `seq`.
    pub fn squash_after(&mut self, seq: u64) {
        self.seqs.retain(|&s| s <= seq);
    }
}
