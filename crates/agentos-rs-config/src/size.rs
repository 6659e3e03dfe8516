//! Human readable size strings ("50MB") to byte counts.

use thiserror::Error;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Errors returned by [`parse_size`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeParseError {
    /// Input was empty or whitespace.
    #[error("size string is empty")]
    Empty,
    /// Numeric part was not a non-negative integer.
    #[error("invalid size '{0}'")]
    Invalid(String),
    /// Value does not fit in 64 bits.
    #[error("size '{0}' is too large")]
    Overflow(String),
}

/// Parse a size string into bytes.
///
/// Accepts a plain integer byte count or an integer followed by `KB`, `MB`
/// or `GB` (binary multiples, case-insensitive). Whitespace around the number
/// is ignored.
pub fn parse_size(input: &str) -> Result<u64, SizeParseError> {
    let normalized = input.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(SizeParseError::Empty);
    }
    let (digits, multiplier) = if let Some(rest) = normalized.strip_suffix("KB") {
        (rest, KIB)
    } else if let Some(rest) = normalized.strip_suffix("MB") {
        (rest, MIB)
    } else if let Some(rest) = normalized.strip_suffix("GB") {
        (rest, GIB)
    } else {
        (normalized.as_str(), 1)
    };
    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| SizeParseError::Invalid(input.trim().to_string()))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| SizeParseError::Overflow(input.trim().to_string()))
}
