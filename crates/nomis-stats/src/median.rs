//! Historical median of the USD balance.
//!
//! Past snapshots are reduced to their USD balance, near-duplicates are
//! collapsed by a streaming precision filter, and the median of what remains
//! is used in place of the current balance when scoring.

use nomis_core::WalletStats;
use rust_decimal::Decimal;

/// Median of a sorted slice. Empty input yields zero.
pub fn median(sorted: &[Decimal]) -> Decimal {
    let n = sorted.len();
    match n {
        0 => Decimal::ZERO,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => midpoint(sorted[n / 2 - 1], sorted[n / 2]),
    }
}

/// Midpoint of `lo <= hi`. Falls back to stepping from `lo` when the sum
/// would leave the `Decimal` range.
fn midpoint(lo: Decimal, hi: Decimal) -> Decimal {
    match lo.checked_add(hi) {
        Some(sum) => sum / Decimal::TWO,
        None => lo.saturating_add((hi - lo) / Decimal::TWO),
    }
}

/// Keep a value only if it is the first one or at least `precision` above the
/// last kept value. Input must be sorted ascending.
pub fn collapse_near_duplicates(sorted: &[Decimal], precision: Decimal) -> Vec<Decimal> {
    let mut kept: Vec<Decimal> = Vec::with_capacity(sorted.len());
    for &value in sorted {
        match kept.last() {
            Some(&last) if value - last < precision => {}
            _ => kept.push(value),
        }
    }
    kept
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalMedianCalculator;

impl HistoricalMedianCalculator {
    /// Median USD balance over `snapshots` (newest first) plus `current`.
    ///
    /// Only the first `take_count` snapshots are used when set. When the
    /// precision filter leaves fewer than two values the unfiltered median is
    /// returned instead.
    pub fn median_balance(
        snapshots: &[WalletStats],
        take_count: Option<usize>,
        precision: Decimal,
        current: Option<Decimal>,
    ) -> Decimal {
        let take = take_count.unwrap_or(snapshots.len());
        let mut values: Vec<Decimal> = snapshots
            .iter()
            .take(take)
            .map(WalletStats::balance_usd)
            .chain(current)
            .collect();

        values.sort();
        values.dedup();

        let filtered = collapse_near_duplicates(&values, precision);
        if filtered.len() < 2 {
            median(&values)
        } else {
            median(&filtered)
        }
    }
}
