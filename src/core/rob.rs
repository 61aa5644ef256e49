//! Reorder buffer.
//!
//! Holds every renamed micro-op in program order until it commits.
//! Entries are keyed by sequence number; since allocation is in order and
//! squashes only remove a suffix, the entry for a sequence number sits at
//! a fixed offset from the head.

use std::collections::VecDeque;

use crate::core::uop::Uop;

/// One reorder-buffer entry.
#[derive(Clone, Debug)]
pub struct RobEntry {
    pub seq: u64,
    /// Index into the workload stream, used to rewind fetch on a squash.
    pub stream_index: usize,
    pub uop: Uop,
    /// Direction predicted at fetch (branches only).
    pub pred_taken: bool,
    /// Execution has finished and the result is visible.
    pub completed: bool,
}

/// Circular in-order buffer of in-flight micro-ops.
pub struct ReorderBuffer {
    entries: VecDeque<RobEntry>,
    capacity: usize,
}

impl ReorderBuffer {
    /// Creates a reorder buffer with room for `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Allocates an entry at the tail. The caller must check `is_full`.
    pub fn push(&mut self, entry: RobEntry) {
        self.entries.push_back(entry);
    }

    /// Looks up the entry for `seq`.
    pub fn get_mut(&mut self, seq: u64) -> Option<&mut RobEntry> {
        let front_seq = self.entries.front()?.seq;
        if seq < front_seq {
            return None;
        }
        let idx = (seq - front_seq) as usize;
        self.entries.get_mut(idx).filter(|e| e.seq == seq)
    }

    /// Returns whether the producer `seq` already has its result.
    ///
    /// A sequence number no longer in the buffer has retired, so its value
    /// is architectural.
    pub fn is_ready(&self, seq: u64) -> bool {
        let Some(front) = self.entries.front() else {
            return true;
        };
        if seq < front.seq {
            return true;
        }
        let idx = (seq - front.seq) as usize;
        match self.entries.get(idx) {
            Some(entry) if entry.seq == seq => entry.completed,
            _ => true,
        }
    }

    /// Retires up to `max` completed entries from the head, in order.
    pub fn retire(&mut self, max: usize) -> Vec<RobEntry> {
        let mut retired = Vec::new();
        for _ in 0..max {
            match self.entries.front() {
                Some(entry) if entry.completed => {
                    if let Some(entry) = self.entries.pop_front() {
                        retired.push(entry);
                    }
                }
                _ => break,
            }
        }
        retired
    }

    /// Removes and returns every entry younger than `seq`.
    pub fn squash_after(&mut self, seq: u64) -> Vec<RobEntry> {
        let mut removed = Vec::new();
        while let Some(back) = self.entries.back() {
            if back.seq <= seq {
                break;
            }
            if let Some(back) = self.entries.pop_back() {
                removed.push(back);
            }
        }
        removed
    }
}
