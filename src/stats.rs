//! Simulation statistics collection and reporting.
//!
//! Tracks performance metrics including committed micro-ops, cache and TLB
//! behavior, page-table walker activity, stalls, and execution time.

use serde::Serialize;
use std::time::Instant;

/// Simulation statistics structure tracking all performance metrics.
///
/// Collects detailed statistics about pipeline throughput, memory
/// hierarchy behavior, address translation, and execution time.
#[derive(Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    pub cycles: u64,
    pub uops_committed: u64,

    pub op_alu: u64,
    pub op_load: u64,
    pub op_store: u64,
    pub op_branch: u64,

    pub branch_predictions: u64,
    pub branch_mispredictions: u64,
    pub squashes: u64,
    pub uops_squashed: u64,

    pub stalls_fetch: u64,
    pub stalls_rob_full: u64,
    pub stalls_iq_full: u64,
    pub stalls_lsq_full: u64,

    pub icache_hits: u64,
    pub icache_misses: u64,
    pub dcache_hits: u64,
    pub dcache_misses: u64,
    pub l2_hits: u64,
    pub l2_misses: u64,

    pub itlb_hits: u64,
    pub itlb_misses: u64,
    pub dtlb_hits: u64,
    pub dtlb_misses: u64,
    pub l2tlb_hits: u64,
    pub l2tlb_misses: u64,

    pub walks_started: u64,
    pub walks_squashed: u64,
    pub walk_cycles: u64,
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            uops_committed: 0,
            op_alu: 0,
            op_load: 0,
            op_store: 0,
            op_branch: 0,
            branch_predictions: 0,
            branch_mispredictions: 0,
            squashes: 0,
            uops_squashed: 0,
            stalls_fetch: 0,
            stalls_rob_full: 0,
            stalls_iq_full: 0,
            stalls_lsq_full: 0,
            icache_hits: 0,
            icache_misses: 0,
            dcache_hits: 0,
            dcache_misses: 0,
            l2_hits: 0,
            l2_misses: 0,
            itlb_hits: 0,
            itlb_misses: 0,
            dtlb_hits: 0,
            dtlb_misses: 0,
            l2tlb_hits: 0,
            l2tlb_misses: 0,
            walks_started: 0,
            walks_squashed: 0,
            walk_cycles: 0,
        }
    }
}

impl SimStats {
    /// Prints a formatted summary of all simulation statistics.
    ///
    /// Displays micro-op counts, cache and TLB hit/miss rates, branch
    /// prediction accuracy, and IPC/CPI metrics in a human-readable format.
    pub fn print(&self) {
        let duration = self.start_time.elapsed();
        let seconds = duration.as_secs_f64();

        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let committed = if self.uops_committed == 0 {
            1
        } else {
            self.uops_committed
        };

        let ipc = self.uops_committed as f64 / cyc as f64;
        let cpi = cyc as f64 / committed as f64;
        let khz = (self.cycles as f64 / seconds) / 1000.0;

        println!("\n==========================================================");
        println!("SYSTEM SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_freq                 {:.2} kHz", khz);
        println!("sim_uops                 {}", self.uops_committed);
        println!("sim_ipc                  {:.4}", ipc);
        println!("sim_cpi                  {:.4}", cpi);
        println!("----------------------------------------------------------");
        println!("UOP MIX");
        let total = committed as f64;
        println!(
            "  op.alu                 {} ({:.2}%)",
            self.op_alu,
            (self.op_alu as f64 / total) * 100.0
        );
        println!(
            "  op.load                {} ({:.2}%)",
            self.op_load,
            (self.op_load as f64 / total) * 100.0
        );
        println!(
            "  op.store               {} ({:.2}%)",
            self.op_store,
            (self.op_store as f64 / total) * 100.0
        );
        println!(
            "  op.branch              {} ({:.2}%)",
            self.op_branch,
            (self.op_branch as f64 / total) * 100.0
        );
        println!("----------------------------------------------------------");
        println!("PIPELINE");
        println!(
            "  stalls.fetch           {} ({:.2}%)",
            self.stalls_fetch,
            (self.stalls_fetch as f64 / cyc as f64) * 100.0
        );
        println!("  stalls.rob_full        {}", self.stalls_rob_full);
        println!("  stalls.iq_full         {}", self.stalls_iq_full);
        println!("  stalls.lsq_full        {}", self.stalls_lsq_full);
        println!("  squashes               {}", self.squashes);
        println!("  uops.squashed          {}", self.uops_squashed);
        println!("----------------------------------------------------------");
        println!("BRANCH PREDICTION");
        let bp_total = self.branch_predictions;
        let bp_miss = self.branch_mispredictions;
        let bp_acc = if bp_total > 0 {
            100.0 * (1.0 - (bp_miss as f64 / bp_total as f64))
        } else {
            0.0
        };
        println!("  bp.lookups             {}", bp_total);
        println!("  bp.mispredicts         {}", bp_miss);
        println!("  bp.accuracy            {:.2}%", bp_acc);
        println!("----------------------------------------------------------");
        println!("MEMORY HIERARCHY");

        let print_level = |name: &str, hits: u64, misses: u64| {
            let total = hits + misses;
            let rate = if total > 0 {
                (hits as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            println!(
                "  {:<6} accesses: {:<10} | hits: {:<10} | miss_rate: {:.2}%",
                name,
                total,
                hits,
                100.0 - rate
            );
        };

        print_level("L1-I", self.icache_hits, self.icache_misses);
        print_level("L1-D", self.dcache_hits, self.dcache_misses);
        print_level("L2", self.l2_hits, self.l2_misses);
        println!("----------------------------------------------------------");
        println!("ADDRESS TRANSLATION");
        print_level("ITLB", self.itlb_hits, self.itlb_misses);
        print_level("DTLB", self.dtlb_hits, self.dtlb_misses);
        print_level("L2TLB", self.l2tlb_hits, self.l2tlb_misses);
        println!("  walks.started          {}", self.walks_started);
        println!("  walks.squashed         {}", self.walks_squashed);
        println!("  walk.cycles            {}", self.walk_cycles);
        println!("==========================================================");
    }

    /// Serializes the statistics to a pretty-printed JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
