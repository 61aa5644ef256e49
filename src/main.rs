//! Command-line entry point.

use std::fs;
use std::process;

use clap::Parser;

use o3sim::config::Config;
use o3sim::core::Cpu;
use o3sim::sim::workload::{self, Process};
use o3sim::sim::{self, ClockDomain};

/// Out-of-order core timing simulator with two-level TLBs and an optional
/// page-table walker.
#[derive(Parser, Debug)]
#[command(name = "o3sim", version, about)]
struct Args {
    /// Workload to run: a trace file, or `stress_tlb` for the built-in
    /// generator.
    #[arg(default_value = "stress_tlb")]
    binary: String,

    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Page size, e.g. `4KiB`, `2MiB`, `1GiB`.
    #[arg(long)]
    page_size: Option<String>,

    /// ITLB entries.
    #[arg(long)]
    itlb_size: Option<usize>,

    /// ITLB associativity.
    #[arg(long)]
    itlb_assoc: Option<usize>,

    /// DTLB entries.
    #[arg(long)]
    dtlb_size: Option<usize>,

    /// DTLB associativity.
    #[arg(long)]
    dtlb_assoc: Option<usize>,

    /// Unified L2 TLB entries (0 disables it).
    #[arg(long)]
    l2tlb_size: Option<usize>,

    /// Unified L2 TLB associativity.
    #[arg(long)]
    l2tlb_assoc: Option<usize>,

    /// Attach the hardware page-table walker.
    #[arg(long)]
    enable_page_table_walker: bool,

    /// Stop after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Emit per-cycle trace lines on stderr.
    #[arg(long)]
    trace: bool,

    /// Write the statistics as JSON to this file.
    #[arg(long)]
    stats_json: Option<String>,
}

fn apply_args(config: &mut Config, args: &Args) {
    if let Some(ps) = &args.page_size {
        config.tlb.page_size = ps.clone();
    }
    if let Some(n) = args.itlb_size {
        config.tlb.itlb_size = n;
    }
    if let Some(n) = args.itlb_assoc {
        config.tlb.itlb_assoc = n;
    }
    if let Some(n) = args.dtlb_size {
        config.tlb.dtlb_size = n;
    }
    if let Some(n) = args.dtlb_assoc {
        config.tlb.dtlb_assoc = n;
    }
    if let Some(n) = args.l2tlb_size {
        config.tlb.l2tlb_enabled = n > 0;
        if n > 0 {
            config.tlb.l2tlb_size = n;
        }
    }
    if let Some(n) = args.l2tlb_assoc {
        config.tlb.l2tlb_assoc = n;
    }
    if args.enable_page_table_walker {
        config.tlb.walker_enabled = true;
    }
    if let Some(n) = args.max_ticks {
        config.general.max_ticks = n;
    }
    if args.trace {
        config.general.trace = true;
    }
}

fn print_summary(config: &Config, process: &Process, clock: &ClockDomain) {
    println!("=== Virtual Memory Configuration ===");
    println!("Page size: {}", config.tlb.page_size);
    println!(
        "ITLB: {} entries, {}-way",
        config.tlb.itlb_size, config.tlb.itlb_assoc
    );
    println!(
        "DTLB: {} entries, {}-way",
        config.tlb.dtlb_size, config.tlb.dtlb_assoc
    );
    if config.tlb.l2tlb_enabled {
        println!(
            "L2 TLB: {} entries, {}-way",
            config.tlb.l2tlb_size, config.tlb.l2tlb_assoc
        );
    } else {
        println!("L2 TLB: disabled");
    }
    println!(
        "Page table walker: {}",
        if config.tlb.walker_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("====================================");
    println!("Workload: {}", process.cmd.join(" "));
    println!(
        "Clock: {} ({} ticks/cycle)",
        config.general.clock,
        clock.period_ticks()
    );
    println!("Memory range: {}", config.system.mem_range);
    println!(
        "Pipeline: fetch/decode/rename/dispatch/issue/writeback/commit = \
         {}/{}/{}/{}/{}/{}/{}",
        config.pipeline.fetch_width,
        config.pipeline.decode_width,
        config.pipeline.rename_width,
        config.pipeline.dispatch_width,
        config.pipeline.issue_width,
        config.pipeline.writeback_width,
        config.pipeline.commit_width,
    );
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    apply_args(&mut config, &args);

    let process = Process::new(&args.binary, &config.tlb.page_size);
    let stream = workload::load(&process)?;
    let clock = ClockDomain::new(&config.general.clock)?;
    let mut cpu = Cpu::new(&config, stream)?;

    print_summary(&config, &process, &clock);
    println!("Beginning simulation!");

    let exit = sim::simulate(&mut cpu, &clock, config.general.max_ticks)?;
    println!("Exiting @ tick {} because {}", exit.tick, exit.cause);

    cpu.stats.print();
    if let Some(path) = &args.stats_json {
        fs::write(path, cpu.stats.to_json())?;
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
