//! Fault types and translation results.
//!
//! A `Fault` is any condition that ends the simulation abnormally:
//! configuration errors, workload errors, or accesses outside the simulated
//! physical range. Faults propagate with `?` up to the simulation harness.

use std::error::Error;
use std::fmt;

use crate::common::PhysAddr;

/// A fatal simulation fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Physical access outside the configured memory range.
    OutOfRange(u64),
    /// The demand pager ran out of physical frames.
    OutOfFrames,
    /// A size string (e.g. `"4KiB"`) could not be parsed.
    BadSize(String),
    /// A frequency string (e.g. `"1GHz"`) could not be parsed.
    BadFrequency(String),
    /// Configuration file could not be read or parsed.
    Config(String),
    /// Workload could not be resolved or parsed.
    Workload(String),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::OutOfRange(addr) => {
                write!(f, "physical access at {:#x} outside memory range", addr)
            }
            Fault::OutOfFrames => write!(f, "no free physical frames left"),
            Fault::BadSize(s) => {
                write!(f, "invalid size '{}': use '4KiB', '2MiB', '1GiB'", s)
            }
            Fault::BadFrequency(s) => {
                write!(f, "invalid frequency '{}': use '1GHz', '500MHz'", s)
            }
            Fault::Config(msg) => write!(f, "configuration error: {}", msg),
            Fault::Workload(msg) => write!(f, "workload error: {}", msg),
        }
    }
}

impl Error for Fault {}

/// The outcome of a completed address translation.
///
/// Carries the physical address and the number of cycles the translation
/// cost (TLB probes, second-level latency, walk time).
#[derive(Clone, Copy, Debug)]
pub struct TranslationResult {
    /// The translated physical address.
    pub paddr: PhysAddr,
    /// Cycles consumed by the translation.
    pub cycles: u64,
}

impl TranslationResult {
    /// Builds a result for a translation that took `cycles` cycles.
    pub fn new(paddr: PhysAddr, cycles: u64) -> Self {
        Self { paddr, cycles }
    }
}
