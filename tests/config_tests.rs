//! Tests for configuration defaults, file loading, and unit parsing.

use o3sim::common::{parse_frequency, parse_size};
use o3sim::config::{Config, ControllerKind, ReplacementPolicyKind};

/// The default configuration matches the documented machine.
#[test]
fn defaults_describe_the_reference_machine() {
    let config = Config::default();

    assert_eq!(config.pipeline.fetch_width, 4);
    assert_eq!(config.pipeline.decode_width, 4);
    assert_eq!(config.pipeline.rename_width, 4);
    assert_eq!(config.pipeline.dispatch_width, 4);
    assert_eq!(config.pipeline.issue_width, 4);
    assert_eq!(config.pipeline.writeback_width, 4);
    assert_eq!(config.pipeline.commit_width, 4);
    assert_eq!(config.pipeline.rob_size, 192);

    assert_eq!(config.tlb.page_size, "4KiB");
    assert_eq!(config.tlb.itlb_size, 64);
    assert_eq!(config.tlb.itlb_assoc, 4);
    assert_eq!(config.tlb.dtlb_size, 64);
    assert_eq!(config.tlb.dtlb_assoc, 4);
    assert!(config.tlb.l2tlb_enabled);
    assert_eq!(config.tlb.l2tlb_size, 1024);
    assert_eq!(config.tlb.l2tlb_assoc, 8);
    assert!(!config.tlb.walker_enabled);
    assert_eq!(config.tlb.num_squash_per_cycle, 4);

    assert_eq!(config.general.clock, "1GHz");
    assert_eq!(config.system.mem_range, "4GiB");
    assert_eq!(config.memory.controller, ControllerKind::Ddr3);
    assert_eq!(config.cache.l1_d.policy, ReplacementPolicyKind::Lru);
}

/// The file-less defaults describe the same caches as a file that omits
/// (or merely opens) the `[cache]` table.
#[test]
fn cache_defaults_match_with_and_without_a_file() {
    let built_in = Config::default();
    assert_eq!(built_in.cache.l1_i.size_bytes, 16 * 1024);
    assert_eq!(built_in.cache.l1_d.size_bytes, 64 * 1024);
    assert_eq!(built_in.cache.l2.size_bytes, 256 * 1024);
    assert_eq!(built_in.cache.l1_i.latency, 2);
    assert_eq!(built_in.cache.l1_d.ways, 2);
    assert_eq!(built_in.cache.l2.ways, 8);
    assert_eq!(built_in.cache.l2.latency, 20);

    for content in ["", "[cache]\n"] {
        let path = std::env::temp_dir().join("o3sim_config_caches.toml");
        std::fs::write(&path, content).expect("write config");
        let loaded = Config::from_file(path.to_str().expect("path")).expect("load");

        assert_eq!(loaded.cache.l1_i.size_bytes, built_in.cache.l1_i.size_bytes);
        assert_eq!(loaded.cache.l1_d.size_bytes, built_in.cache.l1_d.size_bytes);
        assert_eq!(loaded.cache.l2.size_bytes, built_in.cache.l2.size_bytes);
        assert_eq!(loaded.cache.l2.latency, built_in.cache.l2.latency);

        let _ = std::fs::remove_file(&path);
    }
}

/// A cache sub-table naming only some fields fills the rest, including
/// the enable flag.
#[test]
fn partial_cache_table_fills_every_field() {
    let path = std::env::temp_dir().join("o3sim_config_cache_partial.toml");
    std::fs::write(&path, "[cache.l1_d]\nsize_bytes = 32768\n").expect("write config");

    let config = Config::from_file(path.to_str().expect("path")).expect("load");
    assert!(config.cache.l1_d.enabled);
    assert_eq!(config.cache.l1_d.size_bytes, 32768);
    assert_eq!(config.cache.l1_d.line_bytes, 64);
    // Sibling tables keep the full defaults.
    assert_eq!(config.cache.l1_i.size_bytes, 16 * 1024);

    let _ = std::fs::remove_file(&path);
}

/// A partial file overrides only the fields it names.
#[test]
fn partial_file_keeps_defaults() {
    let path = std::env::temp_dir().join("o3sim_config_partial.toml");
    std::fs::write(
        &path,
        "[tlb]\npage_size = \"2MiB\"\nwalker_enabled = true\n\n[memory]\ncontroller = \"Simple\"\n",
    )
    .expect("write config");

    let config = Config::from_file(path.to_str().expect("path")).expect("load");
    assert_eq!(config.tlb.page_size, "2MiB");
    assert!(config.tlb.walker_enabled);
    assert_eq!(config.memory.controller, ControllerKind::Simple);
    // Untouched sections keep their defaults.
    assert_eq!(config.tlb.itlb_size, 64);
    assert_eq!(config.pipeline.fetch_width, 4);

    let _ = std::fs::remove_file(&path);
}

/// Unreadable or malformed files are configuration faults.
#[test]
fn bad_files_are_rejected() {
    assert!(Config::from_file("/no/such/file.toml").is_err());

    let path = std::env::temp_dir().join("o3sim_config_bad.toml");
    std::fs::write(&path, "this is not toml = = =").expect("write config");
    assert!(Config::from_file(path.to_str().expect("path")).is_err());
    let _ = std::fs::remove_file(&path);
}

/// The page size must be a power of two of at least 4KiB.
#[test]
fn page_size_validation() {
    let mut config = Config::default();
    assert_eq!(config.tlb.page_size_val().unwrap(), 4096);
    assert_eq!(config.tlb.page_shift().unwrap(), 12);

    config.tlb.page_size = "2MiB".to_string();
    assert_eq!(config.tlb.page_shift().unwrap(), 21);

    config.tlb.page_size = "3KiB".to_string();
    assert!(config.tlb.page_size_val().is_err());

    config.tlb.page_size = "2KiB".to_string();
    assert!(config.tlb.page_size_val().is_err());
}

/// Size strings parse with binary suffixes.
#[test]
fn size_parsing() {
    assert_eq!(parse_size("4KiB").unwrap(), 4096);
    assert_eq!(parse_size("512MiB").unwrap(), 512 << 20);
    assert_eq!(parse_size("4GiB").unwrap(), 4 << 30);
    assert_eq!(parse_size("64").unwrap(), 64);
    assert_eq!(parse_size("64B").unwrap(), 64);
    assert!(parse_size("4KB").is_err());
    assert!(parse_size("fast").is_err());
}

/// Frequency strings parse to Hertz.
#[test]
fn frequency_parsing() {
    assert_eq!(parse_frequency("1GHz").unwrap(), 1_000_000_000);
    assert_eq!(parse_frequency("500MHz").unwrap(), 500_000_000);
    assert_eq!(parse_frequency("32kHz").unwrap(), 32_000);
    assert_eq!(parse_frequency("60Hz").unwrap(), 60);
    assert!(parse_frequency("1Ghz").is_err());
    assert!(parse_frequency("fast").is_err());
}

/// The memory range parses to bytes.
#[test]
fn mem_range_parses() {
    let config = Config::default();
    assert_eq!(config.system.mem_range_val().unwrap(), 4 << 30);
}
