//! Set-associative timing cache.
//!
//! `CacheSim` models tags and timing only; no data is stored. An access
//! reports whether it hit and the penalty beyond the cache's own latency:
//! a miss pays the fill cost and, when the victim line is dirty, the
//! write-back cost as well.

pub mod policies;

use crate::config::CacheConfig;
use policies::{build_policy, ReplacementPolicy};

struct Line {
    tag: u64,
    dirty: bool,
}

/// A single level of set-associative cache.
pub struct CacheSim {
    /// Whether this level exists in the hierarchy.
    pub enabled: bool,
    /// Hit latency in cycles, charged by the memory system per probe.
    pub latency: u64,
    line_bytes: u64,
    sets: usize,
    lines: Vec<Vec<Option<Line>>>,
    policy: Box<dyn ReplacementPolicy>,
}

impl CacheSim {
    /// Builds a cache from its configuration section.
    ///
    /// A disabled configuration produces a zero-cost pass-through.
    pub fn new(config: &CacheConfig) -> Self {
        let line_bytes = config.line_bytes.max(1);
        let ways = config.ways.max(1);
        let sets = (config.size_bytes / line_bytes / ways).max(1);

        let mut lines = Vec::with_capacity(sets);
        for _ in 0..sets {
            let mut set = Vec::with_capacity(ways);
            set.resize_with(ways, || None);
            lines.push(set);
        }

        Self {
            enabled: config.enabled,
            latency: config.latency,
            line_bytes: line_bytes as u64,
            sets,
            lines,
            policy: build_policy(config.policy, sets, ways),
        }
    }

    fn index_of(&self, addr: u64) -> (usize, u64) {
        let block = addr / self.line_bytes;
        let set = (block % self.sets as u64) as usize;
        let tag = block / self.sets as u64;
        (set, tag)
    }

    /// Simulates an access.
    ///
    /// # Arguments
    ///
    /// * `addr` - Physical address of the access.
    /// * `is_write` - Whether the access dirties the line.
    /// * `fill_latency` - Cost of fetching (or writing back) a line at the
    ///   next level, charged on misses.
    ///
    /// # Returns
    ///
    /// `(hit, penalty)` where `penalty` excludes this cache's hit latency.
    pub fn access(&mut self, addr: u64, is_write: bool, fill_latency: u64) -> (bool, u64) {
        if !self.enabled {
            return (false, 0);
        }

        let (set, tag) = self.index_of(addr);

        if let Some(way) = self.lines[set]
            .iter()
            .position(|l| l.as_ref().is_some_and(|l| l.tag == tag))
        {
            if is_write {
                if let Some(line) = self.lines[set][way].as_mut() {
                    line.dirty = true;
                }
            }
            self.policy.update(set, way);
            return (true, 0);
        }

        let victim = self.policy.get_victim(set);
        let mut penalty = fill_latency;
        if let Some(old) = self.lines[set][victim].take() {
            if old.dirty {
                penalty += fill_latency;
            }
        }
        self.lines[set][victim] = Some(Line {
            tag,
            dirty: is_write,
        });
        self.policy.fill(set, victim);

        (false, penalty)
    }

    /// Checks whether the line holding `addr` is present, without touching
    /// replacement state.
    pub fn contains(&self, addr: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let (set, tag) = self.index_of(addr);
        self.lines[set]
            .iter()
            .any(|l| l.as_ref().is_some_and(|l| l.tag == tag))
    }

    /// Invalidates every line.
    pub fn flush(&mut self) {
        for set in &mut self.lines {
            for line in set.iter_mut() {
                *line = None;
            }
        }
    }
}
