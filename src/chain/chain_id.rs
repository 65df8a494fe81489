//! Chain-identifier predicates.
//!
//! Wallet providers report the chain id either as a hex string (`"0x2105"`)
//! or as a decimal string/number (`"8453"`). Both forms must compare equal
//! when they denote the same chain.

/// Parse a chain identifier in hex (`0x…`) or decimal form.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        trimmed.parse::<u64>().ok()
    }
}

/// True when `raw` denotes exactly the `required` chain. Unparseable or
/// empty identifiers never match.
pub fn is_required_chain(raw: &str, required: u64) -> bool {
    parse_chain_id(raw) == Some(required)
}
