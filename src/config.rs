//! Configuration loading and parsing.
//!
//! The simulator is configured from a TOML file; every field carries a
//! default so partial files (or no file at all) describe a complete system.
//! Command-line flags override the translation-related fields after the
//! file is loaded.

use serde::Deserialize;
use std::fs;

use crate::common::{parse_size, Fault};

const DEFAULT_CLOCK: &str = "1GHz";
const DEFAULT_MEM_RANGE: &str = "4GiB";
const DEFAULT_PAGE_SIZE: &str = "4KiB";

const DEFAULT_WIDTH: usize = 4;
const DEFAULT_ROB_SIZE: usize = 192;
const DEFAULT_IQ_SIZE: usize = 64;
const DEFAULT_LSQ_SIZE: usize = 32;
const DEFAULT_FETCH_BUFFER: usize = 16;
const DEFAULT_BP_TABLE: usize = 4096;
const DEFAULT_MISPREDICT_PENALTY: u64 = 8;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub tlb: TlbConfig,
}

impl Config {
    /// Loads a configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, Fault> {
        let content = fs::read_to_string(path)
            .map_err(|e| Fault::Config(format!("failed to read '{}': {}", path, e)))?;
        toml::from_str(&content)
            .map_err(|e| Fault::Config(format!("failed to parse '{}': {}", path, e)))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Emit per-cycle trace lines on stderr.
    #[serde(default)]
    pub trace: bool,

    /// Core clock frequency, e.g. `"1GHz"`.
    #[serde(default = "default_clock")]
    pub clock: String,

    /// Stop the simulation after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            clock: DEFAULT_CLOCK.to_string(),
            max_ticks: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    /// Simulated physical memory range, e.g. `"4GiB"`.
    #[serde(default = "default_mem_range")]
    pub mem_range: String,

    #[serde(default = "default_l2bus_width")]
    pub l2bus_width: u64,

    #[serde(default = "default_l2bus_latency")]
    pub l2bus_latency: u64,

    #[serde(default = "default_membus_width")]
    pub membus_width: u64,

    #[serde(default = "default_membus_latency")]
    pub membus_latency: u64,
}

impl SystemConfig {
    /// Returns the memory range size in bytes.
    pub fn mem_range_val(&self) -> Result<u64, Fault> {
        parse_size(&self.mem_range)
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            mem_range: DEFAULT_MEM_RANGE.to_string(),
            l2bus_width: default_l2bus_width(),
            l2bus_latency: default_l2bus_latency(),
            membus_width: default_membus_width(),
            membus_latency: default_membus_latency(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_width")]
    pub fetch_width: usize,

    #[serde(default = "default_width")]
    pub decode_width: usize,

    #[serde(default = "default_width")]
    pub rename_width: usize,

    #[serde(default = "default_width")]
    pub dispatch_width: usize,

    #[serde(default = "default_width")]
    pub issue_width: usize,

    #[serde(default = "default_width")]
    pub writeback_width: usize,

    #[serde(default = "default_width")]
    pub commit_width: usize,

    #[serde(default = "default_rob_size")]
    pub rob_size: usize,

    #[serde(default = "default_iq_size")]
    pub iq_size: usize,

    #[serde(default = "default_lsq_size")]
    pub lsq_size: usize,

    #[serde(default = "default_fetch_buffer")]
    pub fetch_buffer_size: usize,

    #[serde(default = "default_bp_table")]
    pub bp_table_size: usize,

    /// Front-end refill bubble after a mispredicted branch, in cycles.
    #[serde(default = "default_mispredict_penalty")]
    pub mispredict_penalty: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_width: DEFAULT_WIDTH,
            decode_width: DEFAULT_WIDTH,
            rename_width: DEFAULT_WIDTH,
            dispatch_width: DEFAULT_WIDTH,
            issue_width: DEFAULT_WIDTH,
            writeback_width: DEFAULT_WIDTH,
            commit_width: DEFAULT_WIDTH,
            rob_size: DEFAULT_ROB_SIZE,
            iq_size: DEFAULT_IQ_SIZE,
            lsq_size: DEFAULT_LSQ_SIZE,
            fetch_buffer_size: DEFAULT_FETCH_BUFFER,
            bp_table_size: DEFAULT_BP_TABLE,
            mispredict_penalty: DEFAULT_MISPREDICT_PENALTY,
        }
    }
}

/// Cache replacement policy selection.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementPolicyKind {
    #[default]
    Lru,
    Fifo,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheHierarchyConfig {
    #[serde(default = "default_l1i")]
    pub l1_i: CacheConfig,

    #[serde(default = "default_l1d")]
    pub l1_d: CacheConfig,

    #[serde(default = "default_l2")]
    pub l2: CacheConfig,
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            l1_i: default_l1i(),
            l1_d: default_l1d(),
            l2: default_l2(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "d_c_size")]
    pub size_bytes: usize,

    #[serde(default = "d_c_line")]
    pub line_bytes: usize,

    #[serde(default = "d_c_ways")]
    pub ways: usize,

    #[serde(default = "d_c_lat")]
    pub latency: u64,

    #[serde(default)]
    pub policy: ReplacementPolicyKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size_bytes: d_c_size(),
            line_bytes: d_c_line(),
            ways: d_c_ways(),
            latency: d_c_lat(),
            policy: ReplacementPolicyKind::Lru,
        }
    }
}

fn default_l1i() -> CacheConfig {
    CacheConfig {
        enabled: true,
        size_bytes: 16 * 1024,
        line_bytes: 64,
        ways: 2,
        latency: 2,
        policy: ReplacementPolicyKind::Lru,
    }
}

fn default_l1d() -> CacheConfig {
    CacheConfig {
        enabled: true,
        size_bytes: 64 * 1024,
        line_bytes: 64,
        ways: 2,
        latency: 2,
        policy: ReplacementPolicyKind::Lru,
    }
}

fn default_l2() -> CacheConfig {
    CacheConfig {
        enabled: true,
        size_bytes: 256 * 1024,
        line_bytes: 64,
        ways: 8,
        latency: 20,
        policy: ReplacementPolicyKind::Lru,
    }
}

/// Memory controller timing model selection.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerKind {
    Simple,
    #[default]
    Ddr3,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    #[serde(default)]
    pub controller: ControllerKind,

    /// Fixed access latency for the `Simple` controller.
    #[serde(default = "default_mem_latency")]
    pub latency: u64,

    #[serde(default = "default_t_cas")]
    pub t_cas: u64,

    #[serde(default = "default_t_ras")]
    pub t_ras: u64,

    #[serde(default = "default_t_pre")]
    pub t_pre: u64,

    /// DRAM row-buffer size; addresses in the same row hit the open row.
    #[serde(default = "default_row_bytes")]
    pub row_bytes: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            controller: ControllerKind::Ddr3,
            latency: default_mem_latency(),
            t_cas: default_t_cas(),
            t_ras: default_t_ras(),
            t_pre: default_t_pre(),
            row_bytes: default_row_bytes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TlbConfig {
    /// Simulated page size, e.g. `"4KiB"`, `"2MiB"`, `"1GiB"`.
    #[serde(default = "default_page_size")]
    pub page_size: String,

    #[serde(default = "default_itlb_size")]
    pub itlb_size: usize,

    #[serde(default = "default_itlb_assoc")]
    pub itlb_assoc: usize,

    #[serde(default = "default_dtlb_size")]
    pub dtlb_size: usize,

    #[serde(default = "default_dtlb_assoc")]
    pub dtlb_assoc: usize,

    /// Attach a unified second-level TLB.
    #[serde(default = "default_true")]
    pub l2tlb_enabled: bool,

    #[serde(default = "default_l2tlb_size")]
    pub l2tlb_size: usize,

    #[serde(default = "default_l2tlb_assoc")]
    pub l2tlb_assoc: usize,

    #[serde(default = "default_l2tlb_latency")]
    pub l2tlb_latency: u64,

    /// Attach a page-table walker; without one, TLB misses are filled
    /// functionally at `miss_penalty` cycles.
    #[serde(default)]
    pub walker_enabled: bool,

    /// In-flight walks the walker can cancel per cycle after a squash.
    #[serde(default = "default_num_squash")]
    pub num_squash_per_cycle: usize,

    /// Concurrent walks the walker can track.
    #[serde(default = "default_walker_slots")]
    pub walker_slots: usize,

    /// Fixed cycles charged per page-table level, on top of the memory
    /// accesses the walk performs.
    #[serde(default = "default_walk_latency")]
    pub walk_latency_per_level: u64,

    /// TLB miss fill cost when no walker is attached.
    #[serde(default = "default_miss_penalty")]
    pub miss_penalty: u64,
}

impl TlbConfig {
    /// Returns the page size in bytes.
    pub fn page_size_val(&self) -> Result<u64, Fault> {
        let size = parse_size(&self.page_size)?;
        if !size.is_power_of_two() || size < 4096 {
            return Err(Fault::BadSize(self.page_size.clone()));
        }
        Ok(size)
    }

    /// Returns the page shift (log2 of the page size).
    pub fn page_shift(&self) -> Result<u32, Fault> {
        Ok(self.page_size_val()?.trailing_zeros())
    }
}

impl Default for TlbConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE.to_string(),
            itlb_size: default_itlb_size(),
            itlb_assoc: default_itlb_assoc(),
            dtlb_size: default_dtlb_size(),
            dtlb_assoc: default_dtlb_assoc(),
            l2tlb_enabled: true,
            l2tlb_size: default_l2tlb_size(),
            l2tlb_assoc: default_l2tlb_assoc(),
            l2tlb_latency: default_l2tlb_latency(),
            walker_enabled: false,
            num_squash_per_cycle: default_num_squash(),
            walker_slots: default_walker_slots(),
            walk_latency_per_level: default_walk_latency(),
            miss_penalty: default_miss_penalty(),
        }
    }
}

fn default_clock() -> String {
    DEFAULT_CLOCK.to_string()
}

fn default_mem_range() -> String {
    DEFAULT_MEM_RANGE.to_string()
}

fn default_page_size() -> String {
    DEFAULT_PAGE_SIZE.to_string()
}

fn default_width() -> usize {
    DEFAULT_WIDTH
}

fn default_rob_size() -> usize {
    DEFAULT_ROB_SIZE
}

fn default_iq_size() -> usize {
    DEFAULT_IQ_SIZE
}

fn default_lsq_size() -> usize {
    DEFAULT_LSQ_SIZE
}

fn default_fetch_buffer() -> usize {
    DEFAULT_FETCH_BUFFER
}

fn default_bp_table() -> usize {
    DEFAULT_BP_TABLE
}

fn default_mispredict_penalty() -> u64 {
    DEFAULT_MISPREDICT_PENALTY
}

fn default_l2bus_width() -> u64 {
    32
}

fn default_l2bus_latency() -> u64 {
    1
}

fn default_membus_width() -> u64 {
    16
}

fn default_membus_latency() -> u64 {
    2
}

fn d_c_size() -> usize {
    4096
}

fn d_c_line() -> usize {
    64
}

fn d_c_ways() -> usize {
    1
}

fn d_c_lat() -> u64 {
    1
}

fn default_mem_latency() -> u64 {
    100
}

fn default_t_cas() -> u64 {
    14
}

fn default_t_ras() -> u64 {
    14
}

fn default_t_pre() -> u64 {
    14
}

fn default_row_bytes() -> u64 {
    2048
}

fn default_itlb_size() -> usize {
    64
}

fn default_itlb_assoc() -> usize {
    4
}

fn default_dtlb_size() -> usize {
    64
}

fn default_dtlb_assoc() -> usize {
    4
}

fn default_l2tlb_size() -> usize {
    1024
}

fn default_l2tlb_assoc() -> usize {
    8
}

fn default_l2tlb_latency() -> u64 {
    6
}

fn default_num_squash() -> usize {
    4
}

fn default_walker_slots() -> usize {
    8
}

fn default_walk_latency() -> u64 {
    2
}

fn default_miss_penalty() -> u64 {
    20
}

fn default_true() -> bool {
    true
}
