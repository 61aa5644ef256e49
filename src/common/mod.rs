//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental types for addresses, memory access
//! classification, fault handling, and unit-string parsing that are shared
//! across different components of the simulator.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Memory access type definitions.
pub mod data;

/// Fault types and translation results.
pub mod error;

/// Parsing of human-readable size and frequency strings.
pub mod units;

pub use addr::{PhysAddr, VirtAddr};
pub use data::AccessType;
pub use error::{Fault, TranslationResult};
pub use units::{parse_frequency, parse_size};
