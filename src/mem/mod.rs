//! Memory hierarchy wiring and timing.
//!
//! `MemorySystem` owns the whole data path below the core: the L1
//! instruction and data caches, the optional unified L2 behind its
//! crossbar, the system crossbar, and the memory controller. It is built
//! from the configuration the same way the hierarchy is wired object by
//! object: L1s in front, the L2 crossbar feeding the L2 (when present),
//! and the system crossbar feeding the controller.

pub mod cache;
pub mod controller;
pub mod xbar;

use crate::common::{AccessType, Fault, PhysAddr};
use crate::config::{Config, ControllerKind};
use crate::stats::SimStats;
use cache::CacheSim;
use controller::{Ddr3Controller, MemoryController, SimpleController};
use xbar::XBar;

/// Request-beat size for a line fill crossing the system crossbar.
const REQUEST_BYTES: u64 = 8;

/// The simulated physical address range.
///
/// Accesses outside it are fatal faults, mirroring a system with a single
/// memory range and no other responders.
#[derive(Clone, Copy, Debug)]
pub struct AddrRange {
    /// First valid address.
    pub start: u64,
    /// Size of the range in bytes.
    pub size: u64,
}

impl AddrRange {
    /// Creates a range starting at zero.
    pub fn new(size: u64) -> Self {
        Self { start: 0, size }
    }

    /// Checks whether `addr` falls inside the range.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.start + self.size
    }
}

/// The complete memory hierarchy below the core.
pub struct MemorySystem {
    pub l1_i: CacheSim,
    pub l1_d: CacheSim,
    pub l2: Option<CacheSim>,
    pub l2_bus: XBar,
    pub mem_bus: XBar,
    pub controller: Box<dyn MemoryController>,
    pub range: AddrRange,
    line_bytes: u64,
}

impl MemorySystem {
    /// Wires the hierarchy described by the configuration.
    pub fn new(config: &Config) -> Result<Self, Fault> {
        let range = AddrRange::new(config.system.mem_range_val()?);

        let l2 = if config.cache.l2.enabled {
            Some(CacheSim::new(&config.cache.l2))
        } else {
            None
        };

        let controller: Box<dyn MemoryController> = match config.memory.controller {
            ControllerKind::Ddr3 => Box::new(Ddr3Controller::new(&config.memory)),
            ControllerKind::Simple => Box::new(SimpleController::new(config.memory.latency)),
        };

        Ok(Self {
            l1_i: CacheSim::new(&config.cache.l1_i),
            l1_d: CacheSim::new(&config.cache.l1_d),
            l2,
            l2_bus: XBar::new(config.system.l2bus_width, config.system.l2bus_latency),
            mem_bus: XBar::new(config.system.membus_width, config.system.membus_latency),
            controller,
            range,
            line_bytes: config.cache.l1_d.line_bytes.max(1) as u64,
        })
    }

    /// Hit latency of the L1 serving `access`, used by the front end to
    /// separate pipelined hit time from miss stalls.
    pub fn l1_latency(&self, access: AccessType) -> u64 {
        let l1 = if access.is_fetch() {
            &self.l1_i
        } else {
            &self.l1_d
        };
        if l1.enabled {
            l1.latency
        } else {
            0
        }
    }

    /// Simulates one access through the hierarchy.
    ///
    /// # Returns
    ///
    /// The total latency in cycles, or a fault for addresses outside the
    /// memory range.
    pub fn access(
        &mut self,
        paddr: PhysAddr,
        access: AccessType,
        stats: &mut SimStats,
    ) -> Result<u64, Fault> {
        let addr = paddr.val();
        if !self.range.contains(addr) {
            return Err(Fault::OutOfRange(addr));
        }

        let ram_latency = self.controller.access_latency(addr);
        let is_fetch = access.is_fetch();
        let is_write = access.is_write();

        // Fill cost of each level is the cost of fetching a line from the
        // level below it, assuming that level hits; a miss there adds its
        // own fill cost in turn.
        let mem_fill = self.mem_bus.transit_time(REQUEST_BYTES)
            + ram_latency
            + self.mem_bus.transit_time(self.line_bytes);
        let l2_fill = self
            .l2
            .as_ref()
            .map(|l2| self.l2_bus.transit_time(self.line_bytes) + l2.latency);
        let l1_fill = l2_fill.unwrap_or(mem_fill);

        let mut total = 0;

        let l1 = if is_fetch { &mut self.l1_i } else { &mut self.l1_d };
        let l1_enabled = l1.enabled;
        if l1_enabled {
            total += l1.latency;
            let (hit, penalty) = l1.access(addr, is_write, l1_fill);
            total += penalty;
            if is_fetch {
                if hit {
                    stats.icache_hits += 1;
                    return Ok(total);
                }
                stats.icache_misses += 1;
            } else {
                if hit {
                    stats.dcache_hits += 1;
                    return Ok(total);
                }
                stats.dcache_misses += 1;
            }
        }

        if let Some(l2) = self.l2.as_mut() {
            if !l1_enabled {
                total += l1_fill;
            }
            let (hit, penalty) = l2.access(addr, is_write, mem_fill);
            total += penalty;
            if hit {
                stats.l2_hits += 1;
            } else {
                stats.l2_misses += 1;
            }
            return Ok(total);
        }

        if !l1_enabled {
            total += mem_fill;
        }

        Ok(total)
    }
}
