//! Human-readable size-string parsing.
//!
//! Budgets arrive from configuration as strings like `"50GB"` or `"2TiB"`.
//! Both decimal (KB/MB/GB/TB, powers of 1000) and binary (KiB/MiB/GiB/TiB,
//! powers of 1024) suffixes are accepted, case-insensitively.
//!
//! # Example
//!
//! ```
//! use index_warden::units::parse_size;
//!
//! assert_eq!(parse_size("1GB").unwrap(), 1_000_000_000);
//! assert_eq!(parse_size("1GiB").unwrap(), 1_073_741_824);
//! assert_eq!(parse_size("0.5 TB").unwrap(), 500_000_000_000);
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeParseError {
    #[error("invalid size unit in '{0}'")]
    InvalidUnit(String),
    #[error("invalid number format in '{0}'")]
    InvalidNumber(String),
}

/// Recognized unit suffixes and their byte multipliers.
///
/// Binary units come first so `"KIB"` is matched as a whole; no token in
/// this table is a suffix of another, so match order is otherwise free.
const UNITS: [(&str, i64); 8] = [
    ("KIB", 1 << 10),
    ("MIB", 1 << 20),
    ("GIB", 1 << 30),
    ("TIB", 1i64 << 40),
    ("KB", 1_000),
    ("MB", 1_000_000),
    ("GB", 1_000_000_000),
    ("TB", 1_000_000_000_000),
];

/// Convert a size string to an exact byte count.
///
/// Whitespace is stripped and the string is case-normalized before the
/// suffix match. The numeric prefix may be fractional; the result is
/// truncated toward zero.
pub fn parse_size(input: &str) -> Result<i64, SizeParseError> {
    let normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    let (number_str, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            normalized
                .strip_suffix(suffix)
                .map(|prefix| (prefix, *multiplier))
        })
        .ok_or_else(|| SizeParseError::InvalidUnit(input.to_string()))?;

    let number: f64 = number_str
        .parse()
        .map_err(|_| SizeParseError::InvalidNumber(input.to_string()))?;

    Ok((number * multiplier as f64) as i64)
}
