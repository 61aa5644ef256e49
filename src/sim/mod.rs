//! Simulation harness.
//!
//! Global time is measured in ticks, with one simulated second equal to
//! 10^12 ticks; the core advances one cycle per clock period. The main
//! loop runs the core until the workload drains or the tick limit is hit
//! and reports why it stopped.

pub mod workload;

use crate::common::{parse_frequency, Fault};
use crate::core::Cpu;

/// Ticks per simulated second.
pub const TICKS_PER_SECOND: u64 = 1_000_000_000_000;

/// Exit cause when the workload ran to completion.
pub const EXIT_LAST_THREAD: &str = "exiting with last active thread context";

/// Exit cause when the configured tick limit was reached.
pub const EXIT_TICK_LIMIT: &str = "simulate() limit reached";

/// A clock domain defined by a frequency string such as `"1GHz"`.
pub struct ClockDomain {
    freq_hz: u64,
    period_ticks: u64,
}

impl ClockDomain {
    /// Parses a frequency string into a clock domain.
    ///
    /// At 1GHz the period is 1000 ticks.
    pub fn new(freq: &str) -> Result<Self, Fault> {
        let freq_hz = parse_frequency(freq)?;
        if freq_hz == 0 || freq_hz > TICKS_PER_SECOND {
            return Err(Fault::BadFrequency(freq.to_string()));
        }
        Ok(Self {
            freq_hz,
            period_ticks: TICKS_PER_SECOND / freq_hz,
        })
    }

    pub fn freq_hz(&self) -> u64 {
        self.freq_hz
    }

    /// Ticks per clock cycle.
    pub fn period_ticks(&self) -> u64 {
        self.period_ticks
    }
}

/// Why and when the simulation stopped.
pub struct ExitEvent {
    pub cause: &'static str,
    pub tick: u64,
}

/// Runs the core until the workload drains or `max_ticks` elapse
/// (0 = unlimited).
pub fn simulate(cpu: &mut Cpu, clock: &ClockDomain, max_ticks: u64) -> Result<ExitEvent, Fault> {
    loop {
        if cpu.done() {
            return Ok(ExitEvent {
                cause: EXIT_LAST_THREAD,
                tick: cpu.cycles() * clock.period_ticks(),
            });
        }
        let next_tick = (cpu.cycles() + 1) * clock.period_ticks();
        if max_ticks > 0 && next_tick > max_ticks {
            return Ok(ExitEvent {
                cause: EXIT_TICK_LIMIT,
                tick: cpu.cycles() * clock.period_ticks(),
            });
        }
        cpu.tick()?;
    }
}
