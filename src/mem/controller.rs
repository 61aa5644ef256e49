//! Memory Timing Controller.
//!
//! This module defines the `MemoryController` trait and implementations
//! for simulating memory access latencies. It supports both simple
//! fixed-latency models and a DDR3-style timing model that accounts for
//! row-buffer locality.

use crate::config::MemoryConfig;

/// Trait for memory controller implementations.
pub trait MemoryController {
    /// Calculates the latency for a memory access at a specific address.
    ///
    /// # Arguments
    ///
    /// * `addr` - The physical address being accessed.
    ///
    /// # Returns
    ///
    /// The latency in CPU cycles.
    fn access_latency(&mut self, addr: u64) -> u64;
}

/// A simple memory controller with fixed latency.
///
/// Models an ideal memory system where every access takes a constant
/// amount of time, ignoring row-buffer locality or refresh cycles.
pub struct SimpleController {
    latency: u64,
}

impl SimpleController {
    /// Creates a new SimpleController with the given fixed latency.
    pub fn new(latency: u64) -> Self {
        Self { latency }
    }
}

impl MemoryController for SimpleController {
    /// Returns the fixed latency regardless of the address.
    fn access_latency(&mut self, _addr: u64) -> u64 {
        self.latency
    }
}

/// A DDR3-style memory controller.
///
/// Simulates basic DRAM timing parameters including Row Access Strobe
/// (RAS), Column Access Strobe (CAS), and Precharge (PRE). It tracks the
/// currently open row to simulate row-buffer hits (lower latency) and
/// misses (higher latency).
pub struct Ddr3Controller {
    /// The currently open row, if any.
    last_row: Option<u64>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
    /// Mask extracting the row index from a physical address.
    row_mask: u64,
}

impl Ddr3Controller {
    /// Creates a new Ddr3Controller from the memory configuration.
    pub fn new(config: &MemoryConfig) -> Self {
        let row_bytes = config.row_bytes.max(1).next_power_of_two();
        Self {
            last_row: None,
            t_cas: config.t_cas,
            t_ras: config.t_ras,
            t_pre: config.t_pre,
            row_mask: !(row_bytes - 1),
        }
    }
}

impl MemoryController for Ddr3Controller {
    /// Calculates latency based on row-buffer state.
    ///
    /// * **Row Hit:** the requested row is open, latency is just `t_cas`.
    /// * **Row Conflict:** a different row is open and must be precharged
    ///   first: `t_pre + t_ras + t_cas`.
    /// * **Closed Bank:** no row is open, the row must be activated:
    ///   `t_ras + t_cas`.
    fn access_latency(&mut self, addr: u64) -> u64 {
        let row = addr & self.row_mask;

        match self.last_row {
            Some(open_row) if open_row == row => self.t_cas,
            Some(_) => {
                self.last_row = Some(row);
                self.t_pre + self.t_ras + self.t_cas
            }
            None => {
                self.last_row = Some(row);
                self.t_ras + self.t_cas
            }
        }
    }
}
