//! Memory access classification.

/// The kind of memory access being performed.
///
/// Determines which TLB and which L1 cache an access is routed through,
/// and which fault is raised when it goes wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch (ITLB, L1-I).
    Fetch,
    /// Data load (DTLB, L1-D).
    Read,
    /// Data store (DTLB, L1-D).
    Write,
}

impl AccessType {
    /// Returns `true` for instruction-side accesses.
    pub fn is_fetch(&self) -> bool {
        matches!(self, AccessType::Fetch)
    }

    /// Returns `true` for stores.
    pub fn is_write(&self) -> bool {
        matches!(self, AccessType::Write)
    }
}
