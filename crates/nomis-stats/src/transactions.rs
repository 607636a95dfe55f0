//! Transaction-derived statistics: counts, intervals, recency and age.

use chrono::{DateTime, Utc};
use nomis_core::types::{Transaction, same_address};
use nomis_core::units::{hours_between, sub_months, whole_months_between};
use rust_decimal::Decimal;

/// Statistics computed from a wallet's transaction list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionStats {
    pub first_transaction_at: Option<DateTime<Utc>>,
    pub last_transaction_at: Option<DateTime<Utc>>,
    pub wallet_age_months: u32,
    pub total_transactions: u32,
    pub total_rejected_transactions: u32,
    pub min_transaction_interval_hours: Decimal,
    pub max_transaction_interval_hours: Decimal,
    pub average_transaction_interval_hours: Decimal,
    pub last_month_transactions: u32,
    pub last_year_transactions: u32,
    pub time_from_last_transaction_months: u32,
    pub deployed_contracts: u32,
}

impl TransactionStats {
    /// Compute statistics for `wallet` as of `now`.
    ///
    /// Intervals are measured between consecutive transactions in time order.
    /// With fewer than two transactions all interval fields stay zero.
    pub fn compute(transactions: &[Transaction], wallet: &str, now: DateTime<Utc>) -> Self {
        if transactions.is_empty() {
            return Self::default();
        }

        let mut times: Vec<DateTime<Utc>> = transactions.iter().map(|t| t.timestamp).collect();
        times.sort();
        let first = times[0];
        let last = times[times.len() - 1];

        let gaps: Vec<Decimal> = times.windows(2).map(|w| hours_between(w[0], w[1])).collect();
        let (min_gap, max_gap, avg_gap) = if gaps.is_empty() {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        } else {
            let sum: Decimal = gaps.iter().sum();
            (
                gaps.iter().copied().min().unwrap_or_default(),
                gaps.iter().copied().max().unwrap_or_default(),
                sum / Decimal::from(gaps.len()),
            )
        };

        let month_ago = sub_months(now, 1);
        let year_ago = sub_months(now, 12);

        Self {
            first_transaction_at: Some(first),
            last_transaction_at: Some(last),
            wallet_age_months: whole_months_between(first, now),
            total_transactions: transactions.len() as u32,
            total_rejected_transactions: transactions.iter().filter(|t| t.is_error).count() as u32,
            min_transaction_interval_hours: min_gap,
            max_transaction_interval_hours: max_gap,
            average_transaction_interval_hours: avg_gap,
            last_month_transactions: times.iter().filter(|t| **t >= month_ago).count() as u32,
            last_year_transactions: times.iter().filter(|t| **t >= year_ago).count() as u32,
            time_from_last_transaction_months: whole_months_between(last, now),
            deployed_contracts: deployed_contracts(transactions, wallet),
        }
    }
}

/// Successful wallet-sent transactions that created a contract.
pub fn deployed_contracts(transactions: &[Transaction], wallet: &str) -> u32 {
    transactions
        .iter()
        .filter(|t| !t.is_error && same_address(&t.from, wallet))
        .filter(|t| t.contract_address.as_deref().is_some_and(|c| !c.is_empty()))
        .count() as u32
}
