//! Address newtypes.
//!
//! Virtual and physical addresses are kept as distinct types so that a
//! value cannot cross the translation boundary without going through the
//! MMU.

/// A virtual address as seen by the running workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct VirtAddr(u64);

impl VirtAddr {
    /// Wraps a raw virtual address.
    pub fn new(val: u64) -> Self {
        Self(val)
    }

    /// Returns the raw address value.
    pub fn val(&self) -> u64 {
        self.0
    }

    /// Returns the virtual page number for the given page shift.
    pub fn page_number(&self, page_shift: u32) -> u64 {
        self.0 >> page_shift
    }

    /// Returns the offset within the page for the given page shift.
    pub fn page_offset(&self, page_shift: u32) -> u64 {
        self.0 & ((1 << page_shift) - 1)
    }
}

/// A physical address within the simulated memory range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhysAddr(u64);

impl PhysAddr {
    /// Wraps a raw physical address.
    pub fn new(val: u64) -> Self {
        Self(val)
    }

    /// Returns the raw address value.
    pub fn val(&self) -> u64 {
        self.0
    }
}
