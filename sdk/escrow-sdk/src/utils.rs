use crate::core::constants::{ETHER_DECIMALS, WEI_PER_ETHER};
use crate::error::{EscrowSdkError, Result};

//=============================================================================
// Address Validation
//=============================================================================

/// Syntactic address check: 40 hex digits with an optional `0x` prefix.
/// Checksum casing and on-chain existence are not verified.
pub fn validate_address(s: &str) -> bool {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validate an address field, naming the field in the error
pub fn check_address(field: &'static str, value: &str) -> Result<()> {
    if validate_address(value) {
        Ok(())
    } else {
        Err(EscrowSdkError::InvalidAddress {
            field,
            value: value.to_string(),
        })
    }
}

//=============================================================================
// Ether <-> Wei Conversion
//=============================================================================

/// Parse decimal ether text into wei.
///
/// Accepts `"1"`, `"1.5"`, `"1."` and `".5"`. Fractional digits beyond
/// 18 are accepted only when they are zeros.
pub fn parse_ether(text: &str) -> Result<u128> {
    let invalid = || EscrowSdkError::InvalidAmount(text.to_string());

    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > ETHER_DECIMALS as usize {
        return Err(EscrowSdkError::InvalidAmount(format!(
            "{text}: fractional component exceeds {ETHER_DECIMALS} decimals"
        )));
    }

    let whole_wei = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .ok()
            .and_then(|w| w.checked_mul(WEI_PER_ETHER))
            .ok_or_else(invalid)?
    };

    let fraction_wei = if fraction.is_empty() {
        0
    } else {
        let scale = 10u128.pow(ETHER_DECIMALS - fraction.len() as u32);
        // at most 18 digits, always fits
        fraction.parse::<u128>().map_err(|_| invalid())? * scale
    };

    whole_wei.checked_add(fraction_wei).ok_or_else(invalid)
}

/// Format wei as ether text, keeping at least one fractional digit
/// (`0` -> `"0.0"`, `10^15` -> `"0.001"`).
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fraction = wei % WEI_PER_ETHER;
    let fraction = format!("{:0width$}", fraction, width = ETHER_DECIMALS as usize);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}
