//! Unit and calendar conversions shared by the statistics pipeline.
//!
//! Raw chain amounts are arbitrary-precision integers; every conversion into
//! `Decimal` goes through [`to_units`] so that oversized values saturate
//! instead of panicking. USD products and sums built on top of those values
//! use `Decimal::saturating_*` or [`saturating_sum`] for the same reason.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;

/// Significant decimal digits that always fit a `Decimal` mantissa.
const MAX_SIGNIFICANT_DIGITS: usize = 28;

const SECONDS_PER_HOUR: i64 = 3600;

/// Convert a raw integer amount into token units: `raw / 10^decimals`.
///
/// Fractional digits beyond `Decimal` precision are truncated. Integer parts
/// wider than 28 digits saturate to `Decimal::MAX`.
pub fn to_units(raw: &BigUint, decimals: u32) -> Decimal {
    if raw.is_zero() {
        return Decimal::ZERO;
    }

    let digits = raw.to_str_radix(10);
    let decimals = decimals as usize;
    let (int_part, frac_part) = if digits.len() > decimals {
        let (i, f) = digits.split_at(digits.len() - decimals);
        (i.to_string(), f.to_string())
    } else {
        let padding = "0".repeat(decimals - digits.len());
        ("0".to_string(), format!("{padding}{digits}"))
    };

    let int_significant = if int_part == "0" { 0 } else { int_part.len() };
    if int_significant > MAX_SIGNIFICANT_DIGITS {
        return Decimal::MAX;
    }

    let keep = (MAX_SIGNIFICANT_DIGITS - int_significant).min(frac_part.len());
    let frac = frac_part[..keep].trim_end_matches('0');
    let text = if frac.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac}")
    };

    Decimal::from_str(&text).unwrap_or(Decimal::MAX)
}

/// Sum of `values`, saturating at `Decimal::MAX` / `Decimal::MIN`.
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Whole calendar months elapsed from `start` to `end`. Zero if `end <= start`.
pub fn whole_months_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    if end <= start {
        return 0;
    }

    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if (end.day(), end.time()) < (start.day(), start.time()) {
        months -= 1;
    }
    months.max(0) as u32
}

/// `start` shifted forward by `n` calendar months, clamped to month end.
pub fn add_months(start: DateTime<Utc>, n: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(n))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// `start` shifted back by `n` calendar months, clamped to month end.
pub fn sub_months(start: DateTime<Utc>, n: u32) -> DateTime<Utc> {
    start
        .checked_sub_months(Months::new(n))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Elapsed hours between two instants as a `Decimal` (negative if `end < start`).
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
    Decimal::from((end - start).num_seconds()) / Decimal::from(SECONDS_PER_HOUR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    // --- to_units ---

    #[test]
    fn to_units_zero() {
        assert_eq!(to_units(&BigUint::from(0u32), 18), Decimal::ZERO);
    }

    #[test]
    fn to_units_one_ether() {
        let wei = BigUint::from(10u64.pow(18));
        assert_eq!(to_units(&wei, 18), Decimal::ONE);
    }

    #[test]
    fn to_units_fractional() {
        let raw = BigUint::from(1_500_000u64);
        assert_eq!(to_units(&raw, 6), dec!(1.5));
    }

    #[test]
    fn to_units_smaller_than_one_unit() {
        let raw = BigUint::from(25u32);
        assert_eq!(to_units(&raw, 4), dec!(0.0025));
    }

    #[test]
    fn to_units_without_decimals() {
        assert_eq!(to_units(&BigUint::from(42u32), 0), dec!(42));
    }

    #[test]
    fn to_units_truncates_excess_fraction() {
        // 1 wei at 40 decimals is below Decimal resolution
        let raw = BigUint::from(1u32);
        assert_eq!(to_units(&raw, 40), Decimal::ZERO);
    }

    #[test]
    fn to_units_saturates_huge_values() {
        let raw = BigUint::from(10u32).pow(40);
        assert_eq!(to_units(&raw, 0), Decimal::MAX);
    }

    #[test]
    fn to_units_large_wei_balance() {
        // 123_456_789.123456789012345678 ETH
        let raw = BigUint::parse_bytes(b"123456789123456789012345678", 10).unwrap();
        assert_eq!(to_units(&raw, 18), dec!(123456789.123456789012345678));
    }

    // --- saturating_sum ---

    #[test]
    fn saturating_sum_adds_normally() {
        assert_eq!(saturating_sum([dec!(1.5), dec!(2), dec!(-0.5)]), dec!(3));
        assert_eq!(saturating_sum(Vec::<Decimal>::new()), Decimal::ZERO);
    }

    #[test]
    fn saturating_sum_clamps_at_max() {
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::MAX, dec!(1)]), Decimal::MAX);
    }

    // --- calendar ---

    #[test]
    fn months_between_same_day() {
        assert_eq!(whole_months_between(at(2023, 1, 15), at(2023, 4, 15)), 3);
    }

    #[test]
    fn months_between_partial_month_rounds_down() {
        assert_eq!(whole_months_between(at(2023, 1, 15), at(2023, 4, 14)), 2);
    }

    #[test]
    fn months_between_reversed_is_zero() {
        assert_eq!(whole_months_between(at(2024, 1, 1), at(2023, 1, 1)), 0);
    }

    #[test]
    fn months_between_across_years() {
        assert_eq!(whole_months_between(at(2021, 11, 1), at(2023, 2, 1)), 15);
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let jan31 = at(2023, 1, 31);
        assert_eq!(add_months(jan31, 1), at(2023, 2, 28));
    }

    #[test]
    fn sub_months_crosses_year() {
        assert_eq!(sub_months(at(2024, 1, 15), 2), at(2023, 11, 15));
    }

    #[test]
    fn hours_between_one_day() {
        assert_eq!(hours_between(at(2023, 1, 1), at(2023, 1, 2)), dec!(24));
    }

    proptest! {
        #[test]
        fn to_units_scales_exactly(raw in 0u64..=u64::MAX, decimals in 0u32..=18) {
            let value = to_units(&BigUint::from(raw), decimals);
            let expected = Decimal::from(raw) / Decimal::from(10u64.pow(decimals));
            prop_assert_eq!(value, expected);
        }
    }
}
