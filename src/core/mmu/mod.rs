//! Address translation.
//!
//! The MMU owns the split first-level TLBs, the optional unified second
//! level, and the optional hardware page-table walker. Translations that
//! miss every TLB either walk the in-memory page table (walker attached,
//! page-table-entry reads going through the data-side cache hierarchy) or
//! are filled functionally at a fixed penalty.
//!
//! Physical frames are handed out on demand by a flat page table, so the
//! mapping for a virtual page is stable across the whole run.

pub mod tlb;
pub mod walker;

use std::collections::HashMap;

use crate::common::{AccessType, Fault, PhysAddr, TranslationResult, VirtAddr};
use crate::config::Config;
use crate::mem::MemorySystem;
use crate::stats::SimStats;
use tlb::Tlb;
use walker::PageTableWalker;

/// Bytes reserved at the top of the memory range for page tables.
const WALK_REGION_BYTES: u64 = 16 * 1024 * 1024;

/// Size of one page-table entry.
const PTE_BYTES: u64 = 8;

/// Outcome of a translation attempt.
#[derive(Debug)]
pub enum Translation {
    /// The translation finished; `cycles` is the cost beyond the L1 TLB
    /// probe, which is hidden under the cache access.
    Done(TranslationResult),
    /// Every walker slot is busy; retry on a later cycle.
    Retry,
}

/// Demand pager mapping virtual pages to physical frames.
///
/// Frames are allocated sequentially on first touch and never reclaimed,
/// so repeated translations of a page always agree.
struct PageTable {
    map: HashMap<u64, u64>,
    next_frame: u64,
    max_frames: u64,
}

impl PageTable {
    fn new(max_frames: u64) -> Self {
        Self {
            map: HashMap::new(),
            next_frame: 0,
            max_frames,
        }
    }

    fn translate(&mut self, vpn: u64) -> Result<u64, Fault> {
        if let Some(&ppn) = self.map.get(&vpn) {
            return Ok(ppn);
        }
        if self.next_frame >= self.max_frames {
            return Err(Fault::OutOfFrames);
        }
        let ppn = self.next_frame;
        self.next_frame += 1;
        self.map.insert(vpn, ppn);
        Ok(ppn)
    }
}

/// The translation machinery between the core and the memory system.
pub struct Mmu {
    itlb: Tlb,
    dtlb: Tlb,
    l2tlb: Option<Tlb>,
    walker: Option<PageTableWalker>,
    page_table: PageTable,
    page_shift: u32,
    l2tlb_latency: u64,
    miss_penalty: u64,
    walk_latency_per_level: u64,
    /// Base of the page-table region at the top of the memory range.
    walk_base: u64,
    walk_region: u64,
}

impl Mmu {
    /// Builds the MMU described by the configuration.
    pub fn new(config: &Config) -> Result<Self, Fault> {
        let page_size = config.tlb.page_size_val()?;
        let page_shift = config.tlb.page_shift()?;
        let mem_size = config.system.mem_range_val()?;

        let walk_region = WALK_REGION_BYTES.min(mem_size / 4);
        let walk_base = mem_size - walk_region;
        let max_frames = walk_base / page_size;

        let l2tlb = if config.tlb.l2tlb_enabled {
            Some(Tlb::new(config.tlb.l2tlb_size, config.tlb.l2tlb_assoc))
        } else {
            None
        };

        let walker = if config.tlb.walker_enabled {
            Some(PageTableWalker::new(
                walk_levels(page_shift),
                config.tlb.walker_slots,
                config.tlb.num_squash_per_cycle,
            ))
        } else {
            None
        };

        Ok(Self {
            itlb: Tlb::new(config.tlb.itlb_size, config.tlb.itlb_assoc),
            dtlb: Tlb::new(config.tlb.dtlb_size, config.tlb.dtlb_assoc),
            l2tlb,
            walker,
            page_table: PageTable::new(max_frames),
            page_shift,
            l2tlb_latency: config.tlb.l2tlb_latency,
            miss_penalty: config.tlb.miss_penalty,
            walk_latency_per_level: config.tlb.walk_latency_per_level,
            walk_base,
            walk_region,
        })
    }

    pub fn has_l2tlb(&self) -> bool {
        self.l2tlb.is_some()
    }

    pub fn has_walker(&self) -> bool {
        self.walker.is_some()
    }

    pub fn page_shift(&self) -> u32 {
        self.page_shift
    }

    /// Walks younger translations off the walker after a pipeline squash.
    pub fn squash_after(&mut self, seq: u64, stats: &mut SimStats) {
        if let Some(walker) = self.walker.as_mut() {
            stats.walks_squashed += walker.squash_after(seq);
        }
    }

    /// Releases the walk slot held by `seq` once its op writes back.
    pub fn complete_walk(&mut self, seq: u64) {
        if let Some(walker) = self.walker.as_mut() {
            walker.complete(seq);
        }
    }

    /// Advances the walker one cycle, reclaiming squashed walks.
    pub fn tick(&mut self) {
        if let Some(walker) = self.walker.as_mut() {
            walker.tick();
        }
    }

    /// Translates `vaddr` for `access`, charging TLB and walk latency.
    ///
    /// `seq` identifies the requesting micro-op so a walk can be squashed
    /// or completed later. Returns `Retry` when the walker has no free
    /// slot.
    pub fn translate(
        &mut self,
        vaddr: VirtAddr,
        access: AccessType,
        seq: u64,
        mem: &mut MemorySystem,
        stats: &mut SimStats,
    ) -> Result<Translation, Fault> {
        let vpn = vaddr.page_number(self.page_shift);

        let l1 = if access.is_fetch() {
            &mut self.itlb
        } else {
            &mut self.dtlb
        };

        if let Some(ppn) = l1.lookup(vpn) {
            if access.is_fetch() {
                stats.itlb_hits += 1;
            } else {
                stats.dtlb_hits += 1;
            }
            return Ok(Translation::Done(TranslationResult::new(
                self.frame_addr(ppn, vaddr),
                0,
            )));
        }

        let l2_ppn = self.l2tlb.as_mut().and_then(|l2tlb| l2tlb.lookup(vpn));

        // A request that will need a walk bails before touching any
        // counter, so retry cycles do not re-count the same miss.
        if l2_ppn.is_none() {
            if let Some(walker) = self.walker.as_ref() {
                if walker.is_full() {
                    return Ok(Translation::Retry);
                }
            }
        }

        if access.is_fetch() {
            stats.itlb_misses += 1;
        } else {
            stats.dtlb_misses += 1;
        }

        let mut cycles = 0;

        if self.l2tlb.is_some() {
            cycles += self.l2tlb_latency;
            if let Some(ppn) = l2_ppn {
                stats.l2tlb_hits += 1;
                self.l1_fill(access, vpn, ppn);
                return Ok(Translation::Done(TranslationResult::new(
                    self.frame_addr(ppn, vaddr),
                    cycles,
                )));
            }
            stats.l2tlb_misses += 1;
        }

        if let Some(walker) = self.walker.as_mut() {
            if !walker.try_start(seq) {
                return Ok(Translation::Retry);
            }
            let levels = walker.levels();
            stats.walks_started += 1;

            let mut walk_cycles = 0;
            for level in 0..levels {
                let pte = self.pte_addr(vpn, level as u64);
                walk_cycles += self.walk_latency_per_level;
                walk_cycles += mem.access(PhysAddr::new(pte), AccessType::Read, stats)?;
            }
            stats.walk_cycles += walk_cycles;
            cycles += walk_cycles;
        } else {
            cycles += self.miss_penalty;
        }

        let ppn = self.page_table.translate(vpn)?;
        self.l1_fill(access, vpn, ppn);
        if let Some(l2tlb) = self.l2tlb.as_mut() {
            l2tlb.fill(vpn, ppn);
        }

        Ok(Translation::Done(TranslationResult::new(
            self.frame_addr(ppn, vaddr),
            cycles,
        )))
    }

    fn l1_fill(&mut self, access: AccessType, vpn: u64, ppn: u64) {
        if access.is_fetch() {
            self.itlb.fill(vpn, ppn);
        } else {
            self.dtlb.fill(vpn, ppn);
        }
    }

    fn frame_addr(&self, ppn: u64, vaddr: VirtAddr) -> PhysAddr {
        PhysAddr::new((ppn << self.page_shift) | vaddr.page_offset(self.page_shift))
    }

    /// Address of the page-table entry read at `level` of a walk.
    ///
    /// Entries live in the reserved region at the top of memory; the
    /// spread keeps walks for different pages from aliasing onto one line.
    fn pte_addr(&self, vpn: u64, level: u64) -> u64 {
        let slots = self.walk_region / PTE_BYTES;
        let slot = vpn
            .wrapping_mul(self.levels() as u64)
            .wrapping_add(level)
            % slots;
        self.walk_base + slot * PTE_BYTES
    }

    fn levels(&self) -> usize {
        self.walker
            .as_ref()
            .map(|w| w.levels())
            .unwrap_or_else(|| walk_levels(self.page_shift))
    }
}

/// Page-table depth implied by the page size: 4KiB pages walk three
/// levels, 2MiB two, 1GiB one.
pub fn walk_levels(page_shift: u32) -> usize {
    let shift = page_shift.min(39) as usize;
    ((39 - shift) + 8) / 9
}
