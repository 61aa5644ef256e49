//! Tests for the memory hierarchy: crossbars, controllers, and the wired
//! system.

use o3sim::common::{AccessType, Fault, PhysAddr};
use o3sim::config::{Config, MemoryConfig};
use o3sim::mem::controller::{Ddr3Controller, MemoryController, SimpleController};
use o3sim::mem::xbar::XBar;
use o3sim::mem::MemorySystem;
use o3sim::stats::SimStats;

/// Transit time is the base latency plus one cycle per width beat.
#[test]
fn xbar_transit_time() {
    let bus = XBar::new(16, 2);
    assert_eq!(bus.transit_time(64), 2 + 4);
    assert_eq!(bus.transit_time(8), 2 + 1);
    assert_eq!(bus.transit_time(17), 2 + 2);
}

/// The simple controller ignores the address.
#[test]
fn simple_controller_is_flat() {
    let mut ctrl = SimpleController::new(100);
    assert_eq!(ctrl.access_latency(0), 100);
    assert_eq!(ctrl.access_latency(0xdead_b000), 100);
}

/// DDR3 timing: closed bank, row hit, then row conflict.
#[test]
fn ddr3_row_buffer_timing() {
    let config = MemoryConfig::default();
    let mut ctrl = Ddr3Controller::new(&config);

    // Closed bank: activate + read.
    assert_eq!(ctrl.access_latency(0), config.t_ras + config.t_cas);
    // Same row: read only.
    assert_eq!(ctrl.access_latency(64), config.t_cas);
    // Different row: precharge + activate + read.
    assert_eq!(
        ctrl.access_latency(0x10_0000),
        config.t_pre + config.t_ras + config.t_cas
    );
}

/// An access outside the configured range faults.
#[test]
fn access_outside_range_faults() {
    let config = Config::default();
    let mut mem = MemorySystem::new(&config).expect("mem");
    let mut stats = SimStats::default();

    let addr = 5u64 << 32; // beyond 4GiB
    let err = mem
        .access(PhysAddr::new(addr), AccessType::Read, &mut stats)
        .unwrap_err();
    assert_eq!(err, Fault::OutOfRange(addr));
}

/// A warm line costs exactly the L1 hit latency.
#[test]
fn warm_access_costs_l1_latency() {
    let config = Config::default();
    let mut mem = MemorySystem::new(&config).expect("mem");
    let mut stats = SimStats::default();
    let addr = PhysAddr::new(0x4000);

    let cold = mem.access(addr, AccessType::Read, &mut stats).expect("access");
    let warm = mem.access(addr, AccessType::Read, &mut stats).expect("access");

    assert!(cold > warm);
    assert_eq!(warm, config.cache.l1_d.latency);
    assert_eq!(stats.dcache_misses, 1);
    assert_eq!(stats.dcache_hits, 1);
}

/// Fetches go through the instruction side and are counted there.
#[test]
fn fetch_uses_the_instruction_cache() {
    let config = Config::default();
    let mut mem = MemorySystem::new(&config).expect("mem");
    let mut stats = SimStats::default();
    let addr = PhysAddr::new(0x4000);

    mem.access(addr, AccessType::Fetch, &mut stats).expect("access");
    mem.access(addr, AccessType::Fetch, &mut stats).expect("access");

    assert_eq!(stats.icache_hits, 1);
    assert_eq!(stats.icache_misses, 1);
    assert_eq!(stats.dcache_misses, 0);
}

/// A cold L1 miss that hits in L2 is cheaper than one that goes to DRAM.
#[test]
fn l2_hit_is_cheaper_than_dram() {
    let config = Config::default();
    let mut mem = MemorySystem::new(&config).expect("mem");
    let mut stats = SimStats::default();
    let addr = PhysAddr::new(0x8000);

    let from_dram = mem.access(addr, AccessType::Read, &mut stats).expect("access");

    // Evict the line from the tiny L1 while keeping it in L2.
    for i in 1..=4u64 {
        let conflict = 0x8000 + i * config.cache.l1_d.size_bytes as u64;
        mem.access(PhysAddr::new(conflict), AccessType::Read, &mut stats)
            .expect("access");
    }
    assert!(!mem.l1_d.contains(0x8000));
    assert!(mem.l2.as_ref().is_some_and(|l2| l2.contains(0x8000)));

    let from_l2 = mem.access(addr, AccessType::Read, &mut stats).expect("access");
    assert!(from_l2 < from_dram);
    assert!(stats.l2_hits >= 1);
}

/// Without an L2 the hierarchy still works, misses going straight to
/// memory.
#[test]
fn hierarchy_without_l2() {
    let mut config = Config::default();
    config.cache.l2.enabled = false;
    let mut mem = MemorySystem::new(&config).expect("mem");
    let mut stats = SimStats::default();
    let addr = PhysAddr::new(0x4000);

    let cold = mem.access(addr, AccessType::Read, &mut stats).expect("access");
    let warm = mem.access(addr, AccessType::Read, &mut stats).expect("access");

    assert!(cold > warm);
    assert_eq!(stats.l2_hits + stats.l2_misses, 0);
}
