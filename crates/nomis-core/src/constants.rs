//! Engine-wide constants. USD amounts are `Decimal`, raw chain amounts are integers.

use rust_decimal::Decimal;

/// The zero address. Transfers sent from it are mint events.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Method-name prefix of token approvals, never counted as counterparty activity.
pub const APPROVE_METHOD_PREFIX: &str = "approve";

/// Decimals of the native token on EVM chains (wei per ether).
pub const NATIVE_DECIMALS: u32 = 18;

/// Confidence assigned to prices resolved from the static stablecoin table.
pub const FLAT_TABLE_CONFIDENCE: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// Confidence of a price source that does not declare its own.
pub const DEFAULT_SOURCE_CONFIDENCE: Decimal = Decimal::ONE;

/// Default minimum distance (USD) between two kept historical median samples.
pub const DEFAULT_MEDIAN_PRECISION: Decimal = Decimal::ONE;

/// Default look-back window for historical snapshots, in days.
pub const DEFAULT_MEDIAN_LOOKBACK_DAYS: i64 = 365;

/// Default price search width passed to price lookups, in hours.
pub const DEFAULT_PRICE_SEARCH_WIDTH_HOURS: u32 = 24;

/// Default time-to-live of cached wallet statistics, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

/// Number of monthly turnover windows that make up a year.
pub const MONTHS_PER_YEAR: usize = 12;

/// Maximum score a single category can reach before weighting.
pub const MAX_CATEGORY_SCORE: Decimal = Decimal::ONE_HUNDRED;

/// Sum every scoring profile's category weights must reach (percent).
pub const TOTAL_WEIGHT_PERCENT: Decimal = Decimal::ONE_HUNDRED;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn flat_table_confidence_is_point_nine() {
        assert_eq!(FLAT_TABLE_CONFIDENCE, dec!(0.9));
    }

    #[test]
    fn zero_address_is_forty_hex_digits() {
        let digits = ZERO_ADDRESS.trim_start_matches("0x");
        assert_eq!(digits.len(), 40);
        assert!(digits.chars().all(|c| c == '0'));
    }
}
