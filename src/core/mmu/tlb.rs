//! Translation Lookaside Buffer.
//!
//! A set-associative cache of virtual-to-physical page translations with
//! per-set LRU replacement. Only page numbers are stored; timing is
//! charged by the MMU.

use crate::mem::cache::policies::{LruPolicy, ReplacementPolicy};

struct TlbEntry {
    tag: u64,
    ppn: u64,
}

/// Set-associative TLB.
pub struct Tlb {
    sets: usize,
    entries: Vec<Vec<Option<TlbEntry>>>,
    policy: LruPolicy,
}

impl Tlb {
    /// Creates a TLB with `size` entries and `assoc` ways per set.
    ///
    /// An associativity larger than the entry count degenerates to fully
    /// associative.
    pub fn new(size: usize, assoc: usize) -> Self {
        let size = size.max(1);
        let ways = assoc.clamp(1, size);
        let sets = (size / ways).max(1);

        let mut entries = Vec::with_capacity(sets);
        for _ in 0..sets {
            let mut set = Vec::with_capacity(ways);
            set.resize_with(ways, || None);
            entries.push(set);
        }

        Self {
            sets,
            entries,
            policy: LruPolicy::new(sets, ways),
        }
    }

    fn index_of(&self, vpn: u64) -> (usize, u64) {
        let set = (vpn % self.sets as u64) as usize;
        let tag = vpn / self.sets as u64;
        (set, tag)
    }

    /// Probes the TLB for `vpn`, updating recency on a hit.
    pub fn lookup(&mut self, vpn: u64) -> Option<u64> {
        let (set, tag) = self.index_of(vpn);
        let way = self.entries[set]
            .iter()
            .position(|e| e.as_ref().is_some_and(|e| e.tag == tag))?;
        self.policy.update(set, way);
        self.entries[set][way].as_ref().map(|e| e.ppn)
    }

    /// Installs a translation, evicting the set's LRU entry if needed.
    pub fn fill(&mut self, vpn: u64, ppn: u64) {
        let (set, tag) = self.index_of(vpn);

        if let Some(way) = self.entries[set]
            .iter()
            .position(|e| e.as_ref().is_some_and(|e| e.tag == tag))
        {
            self.entries[set][way] = Some(TlbEntry { tag, ppn });
            self.policy.update(set, way);
            return;
        }

        let victim = self.policy.get_victim(set);
        self.entries[set][victim] = Some(TlbEntry { tag, ppn });
        self.policy.fill(set, victim);
    }

    /// Checks for `vpn` without touching replacement state.
    pub fn contains(&self, vpn: u64) -> bool {
        let (set, tag) = self.index_of(vpn);
        self.entries[set]
            .iter()
            .any(|e| e.as_ref().is_some_and(|e| e.tag == tag))
    }

    /// Invalidates every entry.
    pub fn flush(&mut self) {
        for set in &mut self.entries {
            for entry in set.iter_mut() {
                *entry = None;
            }
        }
    }
}
