//! Parsing of wei quantities as they arrive from dapps and local history.
//!
//! Quantities are hex (`0x`-prefixed) or decimal strings. Anything that does
//! not parse as a non-negative integer is treated as zero, never as an error.

use alloy_primitives::U256;

/// Parse a hex or decimal quantity.
pub fn parse_quantity(raw: &str) -> Option<U256> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some("") => Some(U256::ZERO),
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_str_radix(trimmed, 10).ok(),
    }
}

/// Parse a quantity, mapping missing or malformed input to zero.
pub fn quantity_or_zero(raw: Option<&str>) -> U256 {
    raw.and_then(parse_quantity).unwrap_or(U256::ZERO)
}

/// Parse a quantity that must fit `u64` (gas figures, nonces).
pub fn parse_u64_quantity(raw: &str) -> Option<u64> {
    parse_quantity(raw).and_then(|v| u64::try_from(v).ok())
}
