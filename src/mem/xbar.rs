//! Crossbar interconnect timing.
//!
//! A crossbar routes requests between CPU-side and memory-side ports. Only
//! its timing matters here: every transfer pays the base latency plus one
//! cycle per bus-width beat.

/// Crossbar timing element.
pub struct XBar {
    /// Transfer width in bytes per cycle.
    pub width_bytes: u64,
    /// Base latency in cycles per transaction.
    pub latency_cycles: u64,
}

impl XBar {
    /// Creates a crossbar with the given width and base latency.
    pub fn new(width_bytes: u64, latency_cycles: u64) -> Self {
        Self {
            width_bytes: width_bytes.max(1),
            latency_cycles,
        }
    }

    /// Calculates the transit time for a transfer of `bytes` bytes.
    pub fn transit_time(&self, bytes: u64) -> u64 {
        let beats = bytes.div_ceil(self.width_bytes);
        self.latency_cycles + beats
    }
}
