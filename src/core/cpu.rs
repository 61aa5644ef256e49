//! The out-of-order core.
//!
//! `Cpu::tick` evaluates the seven pipeline stages once per cycle, back to
//! front: commit, writeback, issue, dispatch, rename, decode, fetch.
//! Evaluating in reverse order lets each stage see the state its
//! downstream neighbour left at the end of the previous cycle, so a
//! micro-op moves at most one stage per tick.
//!
//! Branches resolve at writeback. A mispredicted branch squashes every
//! younger micro-op from the queues, the reorder buffer, and the walker,
//! rewinds the workload stream to the op after the branch, and charges the
//! front end a refill bubble.

use std::collections::VecDeque;

use crate::common::{AccessType, Fault, VirtAddr};
use crate::config::{Config, PipelineConfig};
use crate::core::bp::BranchPredictor;
use crate::core::issue::{IqEntry, IssueQueue, LoadStoreQueue};
use crate::core::mmu::{Mmu, Translation};
use crate::core::rename::RegisterAliasTable;
use crate::core::rob::{ReorderBuffer, RobEntry};
use crate::core::uop::{SeqUop, UopKind};
use crate::mem::MemorySystem;
use crate::sim::workload::UopStream;
use crate::stats::SimStats;

/// A micro-op executing on a functional unit.
struct InFlight {
    seq: u64,
    done_at: u64,
}

/// The simulated core and everything it owns.
pub struct Cpu {
    widths: PipelineConfig,
    pub mem: MemorySystem,
    pub mmu: Mmu,
    pub stats: SimStats,
    bp: BranchPredictor,
    stream: UopStream,

    fetch_q: VecDeque<SeqUop>,
    decode_q: VecDeque<SeqUop>,
    /// Renamed micro-ops waiting for a dispatch slot.
    dispatch_q: VecDeque<IqEntry>,

    rob: ReorderBuffer,
    iq: IssueQueue,
    lsq: LoadStoreQueue,
    inflight: Vec<InFlight>,
    rat: RegisterAliasTable,

    cycle: u64,
    next_seq: u64,
    /// Remaining front-end bubble cycles (mispredict refill or I-side miss).
    fetch_stall: u64,
    trace: bool,
}

impl Cpu {
    /// Builds a core with its memory system and MMU from the configuration.
    pub fn new(config: &Config, stream: UopStream) -> Result<Self, Fault> {
        Ok(Self {
            widths: config.pipeline.clone(),
            mem: MemorySystem::new(config)?,
            mmu: Mmu::new(config)?,
            stats: SimStats::default(),
            bp: BranchPredictor::new(config.pipeline.bp_table_size),
            stream,
            fetch_q: VecDeque::new(),
            decode_q: VecDeque::new(),
            dispatch_q: VecDeque::new(),
            rob: ReorderBuffer::new(config.pipeline.rob_size),
            iq: IssueQueue::new(config.pipeline.iq_size),
            lsq: LoadStoreQueue::new(config.pipeline.lsq_size),
            inflight: Vec::new(),
            rat: RegisterAliasTable::new(),
            cycle: 0,
            next_seq: 0,
            fetch_stall: 0,
            trace: config.general.trace,
        })
    }

    /// Cycles elapsed so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// The workload has drained and every micro-op has committed.
    pub fn done(&self) -> bool {
        self.stream.exhausted()
            && self.fetch_q.is_empty()
            && self.decode_q.is_empty()
            && self.dispatch_q.is_empty()
            && self.rob.is_empty()
    }

    /// Evaluates one clock cycle.
    pub fn tick(&mut self) -> Result<(), Fault> {
        self.cycle += 1;
        self.stats.cycles += 1;
        self.mmu.tick();

        self.commit();
        self.writeback();
        self.issue()?;
        self.dispatch();
        self.rename();
        self.decode();
        self.fetch()?;

        if self.trace {
            eprintln!(
                "[Cpu] cycle {:>8}: rob {:>3} iq {:>3} lsq {:>3} committed {}",
                self.cycle,
                self.rob.len(),
                self.iq.len(),
                self.lsq.len(),
                self.stats.uops_committed,
            );
        }

        Ok(())
    }

    /// Retires completed micro-ops in program order.
    fn commit(&mut self) {
        for entry in self.rob.retire(self.widths.commit_width) {
            self.stats.uops_committed += 1;
            match entry.uop.kind {
                UopKind::IntAlu => self.stats.op_alu += 1,
                UopKind::Load => self.stats.op_load += 1,
                UopKind::Store => self.stats.op_store += 1,
                UopKind::Branch => self.stats.op_branch += 1,
            }
            if entry.uop.is_mem() {
                self.lsq.release(entry.seq);
            }
            if let Some(dest) = entry.uop.dest {
                self.rat.release(dest, entry.seq);
            }
        }
    }

    /// Publishes finished results, resolves branches, triggers squashes.
    fn writeback(&mut self) {
        let mut finished: Vec<u64> = self
            .inflight
            .iter()
            .filter(|f| f.done_at <= self.cycle)
            .map(|f| f.seq)
            .collect();
        finished.sort_unstable();
        finished.truncate(self.widths.writeback_width);

        for seq in finished {
            self.inflight.retain(|f| f.seq != seq);
            self.mmu.complete_walk(seq);
            self.iq.wakeup(seq);

            let Some(entry) = self.rob.get_mut(seq) else {
                continue;
            };
            entry.completed = true;
            let uop = entry.uop;
            let pred_taken = entry.pred_taken;
            let stream_index = entry.stream_index;

            if uop.kind == UopKind::Branch {
                self.stats.branch_predictions += 1;
                self.bp.update(uop.pc, uop.taken);
                if pred_taken != uop.taken {
                    self.stats.branch_mispredictions += 1;
                    self.squash(seq, stream_index);
                    // Younger finished ops died with the squash.
                    break;
                }
            }
        }
    }

    /// Discards every micro-op younger than the branch at `seq` and
    /// restarts fetch at the op after it.
    fn squash(&mut self, seq: u64, stream_index: usize) {
        self.stats.squashes += 1;

        let mut squashed = self.fetch_q.len() + self.decode_q.len();
        self.fetch_q.clear();
        self.decode_q.clear();

        let before = self.dispatch_q.len();
        self.dispatch_q.retain(|e| e.seq <= seq);
        squashed += before - self.dispatch_q.len();

        squashed += self.rob.squash_after(seq).len();
        self.iq.squash_after(seq);
        self.lsq.squash_after(seq);
        self.inflight.retain(|f| f.seq <= seq);
        self.rat.squash_after(seq);
        self.mmu.squash_after(seq, &mut self.stats);

        self.stats.uops_squashed += squashed as u64;

        self.stream.rewind_to(stream_index + 1);
        self.next_seq = seq + 1;
        self.fetch_stall = self.widths.mispredict_penalty;
    }

    /// Selects ready micro-ops, translates memory ops, and starts them on
    /// their functional units.
    fn issue(&mut self) -> Result<(), Fault> {
        let mut issued = 0;
        for seq in self.iq.ready_seqs() {
            if issued >= self.widths.issue_width {
                break;
            }
            let Some(entry) = self.iq.get(seq).copied() else {
                continue;
            };

            let latency = match entry.uop.kind {
                UopKind::IntAlu | UopKind::Branch => 1,
                UopKind::Load | UopKind::Store => {
                    let Some(vaddr) = entry.uop.addr else {
                        continue;
                    };
                    let access = if entry.uop.kind == UopKind::Store {
                        AccessType::Write
                    } else {
                        AccessType::Read
                    };
                    match self
                        .mmu
                        .translate(vaddr, access, seq, &mut self.mem, &mut self.stats)?
                    {
                        Translation::Retry => continue,
                        Translation::Done(res) => {
                            let mem_cycles =
                                self.mem.access(res.paddr, access, &mut self.stats)?;
                            1 + res.cycles + mem_cycles
                        }
                    }
                }
            };

            self.iq.remove(seq);
            self.inflight.push(InFlight {
                seq,
                done_at: self.cycle + latency,
            });
            issued += 1;
        }
        Ok(())
    }

    /// Moves renamed micro-ops into the issue and load/store queues.
    fn dispatch(&mut self) {
        for _ in 0..self.widths.dispatch_width {
            let Some(entry) = self.dispatch_q.front().copied() else {
                break;
            };
            if self.iq.is_full() {
                self.stats.stalls_iq_full += 1;
                break;
            }
            if entry.uop.is_mem() && self.lsq.is_full() {
                self.stats.stalls_lsq_full += 1;
                break;
            }
            self.dispatch_q.pop_front();

            // A producer may have finished while this op sat waiting.
            let mut entry = entry;
            if entry.wait1.is_some_and(|s| self.rob.is_ready(s)) {
                entry.wait1 = None;
            }
            if entry.wait2.is_some_and(|s| self.rob.is_ready(s)) {
                entry.wait2 = None;
            }

            if entry.uop.is_mem() {
                self.lsq.push(entry.seq);
            }
            self.iq.insert(entry);
        }
    }

    /// Allocates reorder-buffer entries and renames source registers.
    fn rename(&mut self) {
        for _ in 0..self.widths.rename_width {
            let Some(suop) = self.decode_q.front().copied() else {
                break;
            };
            if self.rob.is_full() {
                self.stats.stalls_rob_full += 1;
                break;
            }
            self.decode_q.pop_front();

            let wait_for = |rat: &RegisterAliasTable, rob: &ReorderBuffer, reg: Option<u8>| {
                reg.and_then(|r| rat.get(r)).filter(|&s| !rob.is_ready(s))
            };
            let wait1 = wait_for(&self.rat, &self.rob, suop.uop.src1);
            let wait2 = wait_for(&self.rat, &self.rob, suop.uop.src2);

            self.rob.push(RobEntry {
                seq: suop.seq,
                stream_index: suop.stream_index,
                uop: suop.uop,
                pred_taken: suop.pred_taken,
                completed: false,
            });
            if let Some(dest) = suop.uop.dest {
                self.rat.set(dest, suop.seq);
            }

            self.dispatch_q.push_back(IqEntry {
                seq: suop.seq,
                uop: suop.uop,
                pred_taken: suop.pred_taken,
                wait1,
                wait2,
            });
        }
    }

    /// Moves fetched micro-ops toward rename.
    fn decode(&mut self) {
        for _ in 0..self.widths.decode_width {
            let Some(suop) = self.fetch_q.pop_front() else {
                break;
            };
            self.decode_q.push_back(suop);
        }
    }

    /// Fetches a group of micro-ops through the ITLB and L1-I.
    ///
    /// One translation and instruction-cache access is charged per fetch
    /// group; hits are hidden by pipelining, so only miss cycles become
    /// front-end stall cycles. A predicted-taken branch ends the group.
    fn fetch(&mut self) -> Result<(), Fault> {
        if self.fetch_stall > 0 {
            self.fetch_stall -= 1;
            self.stats.stalls_fetch += 1;
            return Ok(());
        }
        if self.fetch_q.len() >= self.widths.fetch_buffer_size {
            return Ok(());
        }

        let Some((_, first)) = self.stream.peek() else {
            return Ok(());
        };

        let seq = self.next_seq;
        let res = match self.mmu.translate(
            VirtAddr::new(first.pc),
            AccessType::Fetch,
            seq,
            &mut self.mem,
            &mut self.stats,
        )? {
            Translation::Done(res) => res,
            Translation::Retry => {
                self.stats.stalls_fetch += 1;
                return Ok(());
            }
        };
        // Fetch-side walks are not tracked past this cycle.
        self.mmu.complete_walk(seq);

        let icache = self.mem.access(res.paddr, AccessType::Fetch, &mut self.stats)?;
        let hit_latency = self.mem.l1_latency(AccessType::Fetch);
        self.fetch_stall += res.cycles + icache.saturating_sub(hit_latency);

        for _ in 0..self.widths.fetch_width {
            if self.fetch_q.len() >= self.widths.fetch_buffer_size {
                break;
            }
            let Some((stream_index, uop)) = self.stream.peek() else {
                break;
            };
            self.stream.advance();

            let pred_taken = uop.kind == UopKind::Branch && self.bp.predict(uop.pc);
            self.fetch_q.push_back(SeqUop {
                seq: self.next_seq,
                stream_index,
                pred_taken,
                uop,
            });
            self.next_seq += 1;

            // Redirecting to the predicted target ends the group.
            if pred_taken {
                break;
            }
        }

        Ok(())
    }
}
