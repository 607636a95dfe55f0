//! Monthly turnover intervals.
//!
//! Buckets native value flow into contiguous one-month windows starting at
//! the wallet's first transaction. The last window is the one containing
//! `now`.

use chrono::{DateTime, Utc};
use nomis_core::types::{Transaction, TurnoverIntervalData, same_address};
use nomis_core::units::{add_months, saturating_sum, whole_months_between};
use rust_decimal::Decimal;

/// Builds [`TurnoverIntervalData`] windows for one wallet.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnoverIntervalBuilder;

impl TurnoverIntervalBuilder {
    /// Bucket `transactions` into monthly windows from `first_transaction_date` to `now`.
    ///
    /// Values are converted with the chain's `native_decimals`. Every
    /// transaction counts toward `amount_sum_value`. Value sent by
    /// `wallet` is outgoing, everything else incoming. Transactions outside
    /// the range land in the nearest window. Returns an empty list when there
    /// are no transactions.
    pub fn build(
        transactions: &[Transaction],
        token_usd_price: Decimal,
        native_decimals: u32,
        wallet: &str,
        first_transaction_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<TurnoverIntervalData> {
        if transactions.is_empty() {
            return Vec::new();
        }

        let windows = whole_months_between(first_transaction_date, now) + 1;
        let mut intervals: Vec<TurnoverIntervalData> = (0..windows)
            .map(|k| TurnoverIntervalData {
                start_date: add_months(first_transaction_date, k),
                end_date: add_months(first_transaction_date, k + 1),
                amount_sum_value: Decimal::ZERO,
                amount_out_sum_value: Decimal::ZERO,
                amount_in_sum_value: Decimal::ZERO,
                token_usd_price,
                count: 0,
            })
            .collect();

        for tx in transactions {
            let idx = intervals
                .partition_point(|w| w.start_date <= tx.timestamp)
                .saturating_sub(1);
            let window = &mut intervals[idx];
            let value = tx.native_value(native_decimals);

            window.amount_sum_value = window.amount_sum_value.saturating_add(value);
            if same_address(&tx.from, wallet) {
                window.amount_out_sum_value = window.amount_out_sum_value.saturating_add(value);
            } else {
                window.amount_in_sum_value = window.amount_in_sum_value.saturating_add(value);
            }
            window.count += 1;
        }

        intervals
    }

    /// Total value moved across every window, in native units.
    pub fn turnover(intervals: &[TurnoverIntervalData]) -> Decimal {
        saturating_sum(intervals.iter().map(|w| w.amount_sum_value))
    }

    /// Net inflow over the trailing `windows` intervals, in native units.
    pub fn balance_change(intervals: &[TurnoverIntervalData], windows: usize) -> Decimal {
        let skip = intervals.len().saturating_sub(windows);
        saturating_sum(intervals[skip..].iter().map(TurnoverIntervalData::net_value))
    }
}
