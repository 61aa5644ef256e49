//! Micro-op definitions.
//!
//! The core executes abstract micro-ops rather than a concrete ISA: the
//! workload layer produces streams of ALU operations, loads, stores, and
//! branches with register dependencies, which is all the timing model
//! needs.

use crate::common::VirtAddr;

/// Operation class of a micro-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UopKind {
    /// Single-cycle integer operation.
    IntAlu,
    /// Data load through the DTLB and L1-D.
    Load,
    /// Data store through the DTLB and L1-D.
    Store,
    /// Conditional branch with a known direction.
    Branch,
}

/// One micro-op as produced by the workload layer.
#[derive(Clone, Copy, Debug)]
pub struct Uop {
    /// Synthetic program counter; loops in the workload reuse the same pc
    /// so predictors and the instruction side see realistic locality.
    pub pc: u64,
    pub kind: UopKind,
    /// Destination register, if the op produces a value.
    pub dest: Option<u8>,
    /// First source register.
    pub src1: Option<u8>,
    /// Second source register.
    pub src2: Option<u8>,
    /// Effective virtual address for loads and stores.
    pub addr: Option<VirtAddr>,
    /// Actual direction for branches.
    pub taken: bool,
}

impl Uop {
    /// Builds an integer ALU op.
    pub fn alu(pc: u64, dest: u8, src1: Option<u8>, src2: Option<u8>) -> Self {
        Self {
            pc,
            kind: UopKind::IntAlu,
            dest: Some(dest),
            src1,
            src2,
            addr: None,
            taken: false,
        }
    }

    /// Builds a load into `dest` from `addr`.
    pub fn load(pc: u64, dest: u8, src1: Option<u8>, addr: VirtAddr) -> Self {
        Self {
            pc,
            kind: UopKind::Load,
            dest: Some(dest),
            src1,
            src2: None,
            addr: Some(addr),
            taken: false,
        }
    }

    /// Builds a store of `src1` to `addr`.
    pub fn store(pc: u64, src1: Option<u8>, addr: VirtAddr) -> Self {
        Self {
            pc,
            kind: UopKind::Store,
            dest: None,
            src1,
            src2: None,
            addr: Some(addr),
            taken: false,
        }
    }

    /// Builds a branch with its actual direction.
    pub fn branch(pc: u64, src1: Option<u8>, taken: bool) -> Self {
        Self {
            pc,
            kind: UopKind::Branch,
            dest: None,
            src1,
            src2: None,
            addr: None,
            taken,
        }
    }

    /// Returns `true` for loads and stores.
    pub fn is_mem(&self) -> bool {
        matches!(self.kind, UopKind::Load | UopKind::Store)
    }
}

/// A fetched micro-op stamped with its dynamic identity.
#[derive(Clone, Copy, Debug)]
pub struct SeqUop {
    /// Global program-order sequence number.
    pub seq: u64,
    /// Index into the workload stream, used to rewind after a squash.
    pub stream_index: usize,
    /// Direction the predictor chose at fetch (branches only).
    pub pred_taken: bool,
    pub uop: Uop,
}
