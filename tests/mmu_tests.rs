//! Tests for address translation: the MMU front end and the page-table
//! walker.

use o3sim::common::{AccessType, Fault, TranslationResult, VirtAddr};
use o3sim::config::Config;
use o3sim::core::mmu::walker::PageTableWalker;
use o3sim::core::mmu::{walk_levels, Mmu, Translation};
use o3sim::mem::MemorySystem;
use o3sim::stats::SimStats;

fn setup(config: &Config) -> (Mmu, MemorySystem, SimStats) {
    let mmu = Mmu::new(config).expect("mmu");
    let mem = MemorySystem::new(config).expect("mem");
    (mmu, mem, SimStats::default())
}

fn translate(
    mmu: &mut Mmu,
    mem: &mut MemorySystem,
    stats: &mut SimStats,
    vaddr: u64,
    access: AccessType,
    seq: u64,
) -> TranslationResult {
    match mmu
        .translate(VirtAddr::new(vaddr), access, seq, mem, stats)
        .expect("translate")
    {
        Translation::Done(res) => res,
        Translation::Retry => panic!("unexpected retry"),
    }
}

/// Page-table depth follows the page size.
#[test]
fn walk_depth_from_page_size() {
    assert_eq!(walk_levels(12), 3); // 4KiB
    assert_eq!(walk_levels(21), 2); // 2MiB
    assert_eq!(walk_levels(30), 1); // 1GiB
}

/// The default assembly has a second-level TLB but no walker.
#[test]
fn default_assembly() {
    let config = Config::default();
    let (mmu, _, _) = setup(&config);
    assert!(mmu.has_l2tlb());
    assert!(!mmu.has_walker());
    assert_eq!(mmu.page_shift(), 12);
}

/// Disabling the second level and enabling the walker is reflected in the
/// assembly.
#[test]
fn optional_parts_follow_config() {
    let mut config = Config::default();
    config.tlb.l2tlb_enabled = false;
    config.tlb.walker_enabled = true;
    let (mmu, _, _) = setup(&config);
    assert!(!mmu.has_l2tlb());
    assert!(mmu.has_walker());
}

/// The same virtual page always maps to the same frame, and the second
/// translation hits the first-level TLB for free.
#[test]
fn translation_is_stable_and_cached() {
    let config = Config::default();
    let (mut mmu, mut mem, mut stats) = setup(&config);

    let first = translate(&mut mmu, &mut mem, &mut stats, 0x1000_0040, AccessType::Read, 1);
    let second = translate(&mut mmu, &mut mem, &mut stats, 0x1000_0040, AccessType::Read, 2);

    assert_eq!(first.paddr, second.paddr);
    assert_eq!(second.cycles, 0);
    assert_eq!(stats.dtlb_misses, 1);
    assert_eq!(stats.dtlb_hits, 1);
}

/// Without a walker a cold miss costs the second-level probe plus the
/// functional fill penalty.
#[test]
fn cold_miss_cost_without_walker() {
    let config = Config::default();
    let (mut mmu, mut mem, mut stats) = setup(&config);

    let res = translate(&mut mmu, &mut mem, &mut stats, 0x1000_0000, AccessType::Read, 1);
    assert_eq!(
        res.cycles,
        config.tlb.l2tlb_latency + config.tlb.miss_penalty
    );
}

/// The page offset survives translation.
#[test]
fn offset_is_preserved() {
    let config = Config::default();
    let (mut mmu, mut mem, mut stats) = setup(&config);

    let res = translate(&mut mmu, &mut mem, &mut stats, 0x1000_0123, AccessType::Read, 1);
    assert_eq!(res.paddr.val() & 0xfff, 0x123);
}

/// Distinct pages get distinct frames.
#[test]
fn pages_get_distinct_frames() {
    let config = Config::default();
    let (mut mmu, mut mem, mut stats) = setup(&config);

    let a = translate(&mut mmu, &mut mem, &mut stats, 0x1000_0000, AccessType::Read, 1);
    let b = translate(&mut mmu, &mut mem, &mut stats, 0x1000_1000, AccessType::Read, 2);
    assert_ne!(a.paddr.val() >> 12, b.paddr.val() >> 12);
}

/// A data-side fill lands in the unified second level, so the instruction
/// side refills from it at the second-level latency.
#[test]
fn l2tlb_serves_the_other_l1() {
    let config = Config::default();
    let (mut mmu, mut mem, mut stats) = setup(&config);

    translate(&mut mmu, &mut mem, &mut stats, 0x1000_0000, AccessType::Read, 1);
    let res = translate(&mut mmu, &mut mem, &mut stats, 0x1000_0000, AccessType::Fetch, 2);

    assert_eq!(res.cycles, config.tlb.l2tlb_latency);
    assert_eq!(stats.itlb_misses, 1);
    assert_eq!(stats.l2tlb_hits, 1);
}

/// When every walker slot is busy, a translation reports `Retry` and
/// succeeds once a slot frees up.
#[test]
fn walker_full_forces_retry() {
    let mut config = Config::default();
    config.tlb.walker_enabled = true;
    config.tlb.walker_slots = 1;
    let (mut mmu, mut mem, mut stats) = setup(&config);

    translate(&mut mmu, &mut mem, &mut stats, 0x1000_0000, AccessType::Read, 1);

    let attempt = mmu
        .translate(
            VirtAddr::new(0x1000_1000),
            AccessType::Read,
            2,
            &mut mem,
            &mut stats,
        )
        .expect("translate");
    assert!(matches!(attempt, Translation::Retry));

    mmu.complete_walk(1);
    translate(&mut mmu, &mut mem, &mut stats, 0x1000_1000, AccessType::Read, 2);
    assert_eq!(stats.walks_started, 2);
}

/// Retry cycles do not re-count the same TLB miss; each miss is reported
/// once, when the translation actually proceeds.
#[test]
fn retries_do_not_inflate_miss_counters() {
    let mut config = Config::default();
    config.tlb.walker_enabled = true;
    config.tlb.walker_slots = 1;
    let (mut mmu, mut mem, mut stats) = setup(&config);

    translate(&mut mmu, &mut mem, &mut stats, 0x1000_0000, AccessType::Read, 1);
    assert_eq!(stats.dtlb_misses, 1);
    assert_eq!(stats.l2tlb_misses, 1);

    for _ in 0..3 {
        let attempt = mmu
            .translate(
                VirtAddr::new(0x1000_1000),
                AccessType::Read,
                2,
                &mut mem,
                &mut stats,
            )
            .expect("translate");
        assert!(matches!(attempt, Translation::Retry));
    }
    assert_eq!(stats.dtlb_misses, 1);
    assert_eq!(stats.l2tlb_misses, 1);

    mmu.complete_walk(1);
    translate(&mut mmu, &mut mem, &mut stats, 0x1000_1000, AccessType::Read, 2);
    assert_eq!(stats.dtlb_misses, 2);
    assert_eq!(stats.l2tlb_misses, 2);
}

/// A walk charges per-level latency and memory time for its entry reads.
#[test]
fn walk_cost_includes_memory_reads() {
    let mut config = Config::default();
    config.tlb.walker_enabled = true;
    let (mut mmu, mut mem, mut stats) = setup(&config);

    let res = translate(&mut mmu, &mut mem, &mut stats, 0x1000_0000, AccessType::Read, 1);
    mmu.complete_walk(1);

    // Three levels at 4KiB pages, each at least the per-level cost.
    assert!(res.cycles >= 3 * config.tlb.walk_latency_per_level);
    assert_eq!(stats.walk_cycles, res.cycles - config.tlb.l2tlb_latency);
}

/// Squashed walks are reclaimed at the configured rate, not instantly.
#[test]
fn squash_reclaim_is_rate_limited() {
    let mut walker = PageTableWalker::new(3, 8, 2);
    for seq in 1..=6 {
        assert!(walker.try_start(seq));
    }

    assert_eq!(walker.squash_after(0), 6);
    assert_eq!(walker.in_flight(), 6);

    walker.tick();
    assert_eq!(walker.in_flight(), 4);
    walker.tick();
    assert_eq!(walker.in_flight(), 2);
    walker.tick();
    assert_eq!(walker.in_flight(), 0);
}

/// A full walker rejects new walks until slots are reclaimed.
#[test]
fn walker_slots_are_bounded() {
    let mut walker = PageTableWalker::new(3, 2, 4);
    assert!(walker.try_start(1));
    assert!(walker.try_start(2));
    assert!(!walker.try_start(3));

    walker.complete(1);
    assert!(walker.try_start(3));
}

/// Completing a squashed walk does not free its slot; only reclaim does.
#[test]
fn squashed_walks_ignore_completion() {
    let mut walker = PageTableWalker::new(3, 4, 4);
    walker.try_start(5);
    walker.squash_after(0);

    walker.complete(5);
    assert_eq!(walker.in_flight(), 1);

    walker.tick();
    assert_eq!(walker.in_flight(), 0);
}

/// Squashing through the MMU counts the killed walks.
#[test]
fn mmu_squash_counts_walks() {
    let mut config = Config::default();
    config.tlb.walker_enabled = true;
    let (mut mmu, mut mem, mut stats) = setup(&config);

    for seq in 1..=3 {
        let vaddr = 0x1000_0000 + seq * 0x1000;
        translate(&mut mmu, &mut mem, &mut stats, vaddr, AccessType::Read, seq);
    }

    mmu.squash_after(0, &mut stats);
    assert_eq!(stats.walks_squashed, 3);

    mmu.tick();
    translate(&mut mmu, &mut mem, &mut stats, 0x2000_0000, AccessType::Read, 10);
}

/// The demand pager faults once physical frames run out.
#[test]
fn out_of_frames_is_fatal() {
    let mut config = Config::default();
    config.system.mem_range = "64KiB".to_string();
    let (mut mmu, mut mem, mut stats) = setup(&config);

    // 48KiB of usable memory leaves twelve 4KiB frames.
    for vpn in 0..12u64 {
        translate(&mut mmu, &mut mem, &mut stats, vpn << 12, AccessType::Read, vpn);
    }

    let err = mmu
        .translate(
            VirtAddr::new(12 << 12),
            AccessType::Read,
            12,
            &mut mem,
            &mut stats,
        )
        .unwrap_err();
    assert_eq!(err, Fault::OutOfFrames);
}
