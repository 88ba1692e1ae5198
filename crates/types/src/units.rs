use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::U256;

pub const WEI_PER_GWEI: u128 = 1_000_000_000;
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Fallback when no head has been observed yet.
pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 30_000_000;

/// Display conversion only. Fee arithmetic stays in wei.
pub fn wei_to_gwei(wei: u128) -> f64 {
    wei as f64 / WEI_PER_GWEI as f64
}

/// Seconds since the unix epoch, for persisted timestamps.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Formats a raw token amount as a decimal string scaled by `decimals`,
/// trimming trailing fractional zeros. `1500000` at 6 decimals -> "1.5".
pub fn format_units(raw: U256, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string()
    }

    let scale = U256::from(10u8).pow(U256::from(decimals));
    let whole = raw / scale;
    let frac = raw % scale;

    if frac.is_zero() {
        return whole.to_string()
    }

    let frac = format!("{frac:0>width$}", width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    format!("{whole}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gwei_conversion() {
        assert_eq!(wei_to_gwei(3_000_000_000), 3.0);
        assert_eq!(wei_to_gwei(100_000_000), 0.1);
    }

    #[test]
    fn formats_whole_amounts() {
        assert_eq!(format_units(U256::from(5_000_000u64), 6), "5");
    }

    #[test]
    fn formats_fractional_amounts() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(1u64), 18), "0.000000000000000001");
    }

    #[test]
    fn zero_decimals_passes_through() {
        assert_eq!(format_units(U256::from(42u64), 0), "42");
    }
}
