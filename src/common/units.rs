//! Parsing of human-readable unit strings.
//!
//! Sizes follow the workload convention: a decimal value immediately
//! followed by `KiB`, `MiB`, or `GiB` (a bare number is taken as bytes).
//! Frequencies accept `GHz`, `MHz`, `kHz`, or `Hz`.

use crate::common::Fault;

/// Parses a size string such as `"4KiB"` or `"512MiB"` into bytes.
pub fn parse_size(s: &str) -> Result<u64, Fault> {
    let trimmed = s.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (value, suffix) = trimmed.split_at(digits_end);

    let value: u64 = value
        .parse()
        .map_err(|_| Fault::BadSize(s.to_string()))?;

    let scale = match suffix {
        "" | "B" => 1,
        "KiB" => 1 << 10,
        "MiB" => 1 << 20,
        "GiB" => 1 << 30,
        _ => return Err(Fault::BadSize(s.to_string())),
    };

    value
        .checked_mul(scale)
        .ok_or_else(|| Fault::BadSize(s.to_string()))
}

/// Parses a frequency string such as `"1GHz"` into Hertz.
pub fn parse_frequency(s: &str) -> Result<u64, Fault> {
    let trimmed = s.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (value, suffix) = trimmed.split_at(digits_end);

    let value: u64 = value
        .parse()
        .map_err(|_| Fault::BadFrequency(s.to_string()))?;

    let scale = match suffix {
        "Hz" => 1,
        "kHz" => 1_000,
        "MHz" => 1_000_000,
        "GHz" => 1_000_000_000,
        _ => return Err(Fault::BadFrequency(s.to_string())),
    };

    value
        .checked_mul(scale)
        .ok_or_else(|| Fault::BadFrequency(s.to_string()))
}
