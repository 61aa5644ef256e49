//! Cache replacement policies.
//!
//! A policy tracks per-set access history and names the victim way when a
//! set is full. Policies only see set/way indices; tag management stays in
//! the cache.

mod fifo;
mod lru;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;

use crate::config::ReplacementPolicyKind;

/// Interface implemented by all replacement policies.
pub trait ReplacementPolicy {
    /// Records an access to `way` in `set`.
    fn update(&mut self, set: usize, way: usize);

    /// Records a line fill into `way` in `set`.
    ///
    /// Policies that only care about insertion order (FIFO) override this;
    /// recency-based policies treat a fill like any other access.
    fn fill(&mut self, set: usize, way: usize) {
        self.update(set, way);
    }

    /// Returns the way to evict from `set`.
    fn get_victim(&mut self, set: usize) -> usize;
}

/// Constructs the policy selected in the configuration.
pub fn build_policy(
    kind: ReplacementPolicyKind,
    sets: usize,
    ways: usize,
) -> Box<dyn ReplacementPolicy> {
    match kind {
        ReplacementPolicyKind::Lru => Box::new(LruPolicy::new(sets, ways)),
        ReplacementPolicyKind::Fifo => Box::new(FifoPolicy::new(sets, ways)),
    }
}
