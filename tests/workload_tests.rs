//! Tests for processes, the stress workload generator, and trace parsing.

use o3sim::common::Fault;
use o3sim::core::uop::{Uop, UopKind};
use o3sim::sim::workload::{load, parse_trace, stress_tlb, Process, UopStream};

const DATA_BASE: u64 = 0x1000_0000;
const BUFFER_BYTES: u64 = 8 * 1024 * 1024;

/// The page size travels on the command line as a literal argument.
#[test]
fn process_command_line() {
    let process = Process::new("stress_tlb", "4KiB");
    assert_eq!(process.cmd, vec!["stress_tlb", "--page-size=4KiB"]);
}

/// Valid page-size arguments parse to bytes.
#[test]
fn page_size_parses_suffixed_values() {
    assert_eq!(Process::new("x", "4KiB").page_size().unwrap(), 4096);
    assert_eq!(Process::new("x", "2MiB").page_size().unwrap(), 2 << 20);
    assert_eq!(Process::new("x", "1GiB").page_size().unwrap(), 1 << 30);
}

/// A bare number or an unknown suffix is rejected.
#[test]
fn page_size_requires_a_binary_suffix() {
    assert!(Process::new("x", "4096").page_size().is_err());
    assert!(Process::new("x", "4KB").page_size().is_err());
    assert!(Process::new("x", "KiB").page_size().is_err());
}

/// An unknown binary that is not a file on disk is a workload fault.
#[test]
fn unknown_binary_is_rejected() {
    let process = Process::new("no_such_program", "4KiB");
    match load(&process) {
        Err(Fault::Workload(_)) => {}
        _ => panic!("expected a workload fault"),
    }
}

/// Every generated data address stays inside the workload buffer.
#[test]
fn stress_addresses_stay_in_the_buffer() {
    let uops = stress_tlb(4096);
    assert!(!uops.is_empty());

    for uop in &uops {
        if let Some(addr) = uop.addr {
            assert!(addr.val() >= DATA_BASE);
            assert!(addr.val() < DATA_BASE + BUFFER_BYTES);
        }
    }
}

/// The load phase touches every page of the buffer once.
#[test]
fn stress_load_phase_covers_the_buffer() {
    let page_size = 4096;
    let pages = BUFFER_BYTES / page_size;

    let uops = stress_tlb(page_size);
    let loads = uops.iter().filter(|u| u.kind == UopKind::Load).count();
    assert_eq!(loads as u64, pages);
}

/// Loop bodies reuse their pcs, so the static footprint stays small.
#[test]
fn stress_pcs_form_loops() {
    let uops = stress_tlb(4096);
    let mut pcs: Vec<u64> = uops.iter().map(|u| u.pc).collect();
    pcs.sort_unstable();
    pcs.dedup();
    assert!(pcs.len() < 32);
}

/// The stream ends on a fall-through branch.
#[test]
fn stress_ends_not_taken() {
    let uops = stress_tlb(2 << 20);
    let last = uops.last().expect("non-empty");
    assert_eq!(last.kind, UopKind::Branch);
    assert!(!last.taken);
}

/// Large pages shrink the working set but keep the phase structure.
#[test]
fn stress_scales_with_page_size() {
    let small = stress_tlb(4096);
    let large = stress_tlb(2 << 20);
    assert!(large.len() < small.len());
}

/// Trace files parse into the expected micro-ops.
#[test]
fn trace_parsing() {
    let path = std::env::temp_dir().join("o3sim_trace_ok.txt");
    std::fs::write(
        &path,
        "# a comment\n\nalu\nload 0x1000\nstore 2000\nbranch t\nbranch n\n",
    )
    .expect("write trace");

    let uops = parse_trace(path.to_str().expect("path")).expect("parse");
    assert_eq!(uops.len(), 5);
    assert_eq!(uops[0].kind, UopKind::IntAlu);
    assert_eq!(uops[1].kind, UopKind::Load);
    assert_eq!(uops[1].addr.map(|a| a.val()), Some(0x1000));
    assert_eq!(uops[2].kind, UopKind::Store);
    assert_eq!(uops[2].addr.map(|a| a.val()), Some(0x2000));
    assert!(uops[3].taken);
    assert!(!uops[4].taken);

    let _ = std::fs::remove_file(&path);
}

/// A malformed trace line reports its location.
#[test]
fn trace_rejects_bad_lines() {
    let path = std::env::temp_dir().join("o3sim_trace_bad.txt");
    std::fs::write(&path, "alu\nfrobnicate\n").expect("write trace");

    match parse_trace(path.to_str().expect("path")) {
        Err(Fault::Workload(msg)) => assert!(msg.contains(":2:")),
        _ => panic!("expected a workload fault"),
    }

    let _ = std::fs::remove_file(&path);
}

/// The stream cursor supports peeking, advancing, and rewinding.
#[test]
fn stream_cursor_semantics() {
    let uops = vec![
        Uop::alu(0, 1, None, None),
        Uop::alu(4, 2, None, None),
        Uop::alu(8, 3, None, None),
    ];
    let mut stream = UopStream::new(uops);
    assert_eq!(stream.len(), 3);

    let (idx, _) = stream.peek().expect("peek");
    assert_eq!(idx, 0);
    stream.advance();
    stream.advance();
    let (idx, _) = stream.peek().expect("peek");
    assert_eq!(idx, 2);

    stream.rewind_to(1);
    let (idx, uop) = stream.peek().expect("peek");
    assert_eq!(idx, 1);
    assert_eq!(uop.pc, 4);

    stream.advance();
    stream.advance();
    assert!(stream.exhausted());
    assert!(stream.peek().is_none());
}
