//! Out-of-order core implementation.
//!
//! The core is a timing model over abstract micro-ops: seven stages
//! (fetch, decode, rename, dispatch, issue, writeback, commit), a reorder
//! buffer, an issue queue, a load/store queue, a register alias table, a
//! branch predictor, and the MMU for address translation.

/// Branch direction predictor.
pub mod bp;

/// The CPU structure and per-cycle stage evaluation.
pub mod cpu;

/// Issue queue and load/store queue.
pub mod issue;

/// Memory management unit: TLBs and the page-table walker.
pub mod mmu;

/// Register alias table for rename.
pub mod rename;

/// Reorder buffer.
pub mod rob;

/// Micro-op definitions.
pub mod uop;

pub use cpu::Cpu;
