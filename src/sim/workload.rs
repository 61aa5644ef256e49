//! Workloads.
//!
//! A `Process` names the program the simulated core runs, syscall-free and
//! self-contained: either the built-in TLB stress generator or a plain-text
//! micro-op trace on disk. The workload layer turns it into a `UopStream`
//! the fetch stage pulls from.

use std::fs;
use std::path::Path;

use crate::common::{Fault, VirtAddr};
use crate::core::uop::Uop;

/// Base of the synthetic text segment pcs come from.
const TEXT_BASE: u64 = 0x0040_0000;

/// Base virtual address of the workload's data buffer.
const DATA_BASE: u64 = 0x1000_0000;

/// Size of the stress workload's buffer.
const BUFFER_BYTES: u64 = 8 * 1024 * 1024;

/// Registers the generated workloads use.
const REG_ADDR: u8 = 1;
const REG_TMP: u8 = 2;
const REG_ACC1: u8 = 3;
const REG_ACC2: u8 = 4;
const REG_LOAD: u8 = 5;

/// A process the simulated core runs, described by its command line.
pub struct Process {
    /// Binary name followed by its arguments.
    pub cmd: Vec<String>,
}

impl Process {
    /// Describes a process running `binary` with the given page-size
    /// argument.
    pub fn new(binary: &str, page_size: &str) -> Self {
        Self {
            cmd: vec![binary.to_string(), format!("--page-size={}", page_size)],
        }
    }

    /// Parses the page size the process was given.
    ///
    /// Accepts a decimal number with a `KiB`, `MiB`, or `GiB` suffix; a
    /// bare number or any other suffix is rejected.
    pub fn page_size(&self) -> Result<u64, Fault> {
        let arg = self
            .cmd
            .iter()
            .skip(1)
            .find_map(|a| a.strip_prefix("--page-size="))
            .unwrap_or("4KiB");

        let digits: String = arg.chars().take_while(|c| c.is_ascii_digit()).collect();
        let suffix = &arg[digits.len()..];
        let value: u64 = digits
            .parse()
            .map_err(|_| Fault::BadSize(arg.to_string()))?;

        let scale = match suffix {
            "KiB" => 1024,
            "MiB" => 1024 * 1024,
            "GiB" => 1024 * 1024 * 1024,
            _ => return Err(Fault::BadSize(arg.to_string())),
        };
        value
            .checked_mul(scale)
            .ok_or_else(|| Fault::BadSize(arg.to_string()))
    }

    /// The binary name without any leading path.
    fn binary_name(&self) -> &str {
        let full = self.cmd.first().map(String::as_str).unwrap_or("");
        full.rsplit('/').next().unwrap_or(full)
    }
}

/// A rewindable stream of micro-ops feeding the fetch stage.
pub struct UopStream {
    uops: Vec<Uop>,
    cursor: usize,
}

impl UopStream {
    pub fn new(uops: Vec<Uop>) -> Self {
        Self { uops, cursor: 0 }
    }

    /// The micro-op fetch would take next, with its stream index.
    pub fn peek(&self) -> Option<(usize, Uop)> {
        self.uops.get(self.cursor).map(|&u| (self.cursor, u))
    }

    /// Consumes the op `peek` returned.
    pub fn advance(&mut self) {
        if self.cursor < self.uops.len() {
            self.cursor += 1;
        }
    }

    /// Restarts fetch at `index`, used after a squash.
    pub fn rewind_to(&mut self, index: usize) {
        self.cursor = index.min(self.uops.len());
    }

    pub fn exhausted(&self) -> bool {
        self.cursor >= self.uops.len()
    }

    pub fn len(&self) -> usize {
        self.uops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uops.is_empty()
    }
}

/// Resolves a process to its micro-op stream.
///
/// An existing file is read as a trace; the name `stress_tlb` selects the
/// built-in generator.
pub fn load(process: &Process) -> Result<UopStream, Fault> {
    let binary = process.cmd.first().map(String::as_str).unwrap_or("");
    if Path::new(binary).is_file() {
        return Ok(UopStream::new(parse_trace(binary)?));
    }
    if process.binary_name() == "stress_tlb" {
        return Ok(UopStream::new(stress_tlb(process.page_size()?)));
    }
    Err(Fault::Workload(format!(
        "'{}' is neither a trace file nor a built-in workload",
        binary
    )))
}

/// Generates the TLB stress workload.
///
/// Four phases over an 8MiB buffer: a scattered page walk (stride 300
/// pages, five rounds), a four-page-stride store sweep, three sequential
/// sweeps over the first thousand pages, and a page-stride load phase
/// feeding two accumulators.
///
/// Every static op in a loop body keeps one pc across iterations, so the
/// branch predictor and the instruction side see a real loop.
pub fn stress_tlb(page_size: u64) -> Vec<Uop> {
    let page_size = page_size.max(1);
    let pages = (BUFFER_BYTES / page_size).max(1);
    let mut uops = Vec::new();

    // Phase 1: scattered stores, five rounds.
    let pc = TEXT_BASE;
    let iters = 5 * pages;
    for i in 0..iters {
        let page_num = (i * 300) % pages;
        let addr = VirtAddr::new(DATA_BASE + page_num * page_size);
        uops.push(Uop::alu(pc, REG_ADDR, None, None));
        uops.push(Uop::store(pc + 4, Some(REG_ADDR), addr));
        uops.push(Uop::branch(pc + 8, None, i + 1 < iters));
    }

    // Phase 2: store sweep at a four-page stride.
    let pc = TEXT_BASE + 0x100;
    let stride = 4 * page_size;
    let iters = BUFFER_BYTES / stride;
    for i in 0..iters {
        let addr = VirtAddr::new(DATA_BASE + i * stride);
        uops.push(Uop::alu(pc, REG_ADDR, None, None));
        uops.push(Uop::store(pc + 4, Some(REG_ADDR), addr));
        uops.push(Uop::branch(pc + 8, None, i + 1 < iters));
    }

    // Phase 3: three sequential sweeps over the first thousand pages.
    let pc = TEXT_BASE + 0x200;
    let span = pages.min(1000);
    let iters = 3 * span;
    for i in 0..iters {
        let addr = VirtAddr::new(DATA_BASE + (i % span) * page_size);
        uops.push(Uop::alu(pc, REG_ADDR, None, None));
        uops.push(Uop::store(pc + 4, Some(REG_ADDR), addr));
        uops.push(Uop::branch(pc + 8, None, i + 1 < iters));
    }

    // Phase 4: page-stride loads into two accumulators.
    let pc = TEXT_BASE + 0x300;
    for i in 0..pages {
        let addr = VirtAddr::new(DATA_BASE + i * page_size);
        uops.push(Uop::load(pc, REG_LOAD, None, addr));
        uops.push(Uop::alu(pc + 4, REG_ACC1, Some(REG_ACC1), Some(REG_LOAD)));
        uops.push(Uop::alu(pc + 8, REG_ACC2, Some(REG_ACC2), Some(REG_LOAD)));
        uops.push(Uop::branch(pc + 12, None, i + 1 < pages));
    }

    uops
}

/// Parses a plain-text micro-op trace.
///
/// One op per line: `alu`, `load <hex-addr>`, `store <hex-addr>`, or
/// `branch t|n`. Blank lines and lines starting with `#` are skipped.
pub fn parse_trace(path: &str) -> Result<Vec<Uop>, Fault> {
    let content = fs::read_to_string(path)
        .map_err(|e| Fault::Workload(format!("failed to read '{}': {}", path, e)))?;

    let mut uops = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let op = parts.next().unwrap_or("");
        let arg = parts.next();
        let pc = TEXT_BASE + uops.len() as u64 * 4;

        let bad = |msg: &str| {
            Fault::Workload(format!("{}:{}: {} '{}'", path, lineno + 1, msg, line))
        };

        match op {
            "alu" => uops.push(Uop::alu(pc, REG_TMP, None, None)),
            "load" => {
                let addr = parse_hex(arg.ok_or_else(|| bad("missing address in"))?)
                    .ok_or_else(|| bad("bad address in"))?;
                uops.push(Uop::load(pc, REG_LOAD, None, VirtAddr::new(addr)));
            }
            "store" => {
                let addr = parse_hex(arg.ok_or_else(|| bad("missing address in"))?)
                    .ok_or_else(|| bad("bad address in"))?;
                uops.push(Uop::store(pc, None, VirtAddr::new(addr)));
            }
            "branch" => {
                let taken = match arg {
                    Some("t") => true,
                    Some("n") => false,
                    _ => return Err(bad("bad direction in")),
                };
                uops.push(Uop::branch(pc, None, taken));
            }
            _ => return Err(bad("unknown op in")),
        }
    }
    Ok(uops)
}

fn parse_hex(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16).ok()
}
