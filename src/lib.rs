//! Out-of-Order CPU and Virtual Memory System Simulator Library.
//!
//! This crate implements a cycle-level timing simulator for a superscalar
//! out-of-order core in front of a multi-level memory hierarchy with full
//! address translation (TLBs and an optional page-table walker).
//!
//! # Architecture
//!
//! * **Core**: 7-stage out-of-order pipeline (Fetch, Decode, Rename,
//!   Dispatch, Issue, Writeback, Commit), each stage with a configurable
//!   width in micro-ops per cycle.
//! * **Translation**: split L1 instruction/data TLBs, an optional unified
//!   second-level TLB, and an optional page-table walker with bounded
//!   squash bandwidth.
//! * **Memory**: L1 instruction/data caches, an optional unified L2 behind
//!   a coherent crossbar, a system crossbar, and a timing memory controller.
//! * **Workload**: syscall-emulation style processes; micro-op streams come
//!   from the built-in `stress_tlb` generator or from trace files.
//!
//! # Modules
//!
//! * `common`: Shared types, faults, and unit parsing.
//! * `config`: Configuration loading and parsing.
//! * `core`: Out-of-order core and MMU implementation.
//! * `mem`: Memory hierarchy (caches, crossbars, memory controller).
//! * `sim`: Simulation harness, clocking, and workload loading.
//! * `stats`: Performance statistics collection.

/// Shared types, fault definitions, and unit-string parsing.
///
/// Provides the address newtypes, access classification, translation
/// results, and the crate-wide fault type used by every subsystem.
pub mod common;

/// Configuration system for pipeline, cache, memory, and TLB settings.
///
/// Loads and parses TOML configuration files to customize simulator
/// behavior for different hardware configurations.
pub mod config;

/// Out-of-order core implementation including all pipeline structures.
///
/// Implements the 7-stage pipeline (Fetch, Decode, Rename, Dispatch,
/// Issue, Writeback, Commit), the reorder buffer, issue queue, register
/// alias table, branch predictor, and the MMU.
pub mod core;

/// Memory hierarchy components.
///
/// Implements the set-associative timing caches, the crossbar
/// interconnects, the address range map, and the memory controllers.
pub mod mem;

/// Simulation harness, clock domain, and workload loading.
///
/// Handles micro-op stream construction (built-in benchmark or trace
/// file), tick accounting, and the blocking simulation loop.
pub mod sim;

/// Performance statistics collection and reporting.
///
/// Tracks cycle counts, committed micro-ops, cache and TLB statistics,
/// and other performance metrics during simulation execution.
pub mod stats;
