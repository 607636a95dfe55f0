//! Wallet statistics assembly.
//!
//! [`StatsAssembler::assemble`] is the single entry point of the pipeline:
//! it validates the request, runs counterparty reconciliation, token
//! enrichment, transaction and turnover statistics, NFT statistics and the
//! historical median, and returns one immutable [`WalletStats`].

use chrono::{DateTime, Utc};
use nomis_core::WalletStats;
use nomis_core::constants::MONTHS_PER_YEAR;
use nomis_core::error::InputError;
use nomis_core::types::{CounterpartyConfig, TokenBalance, WalletActivity};
use nomis_core::units::saturating_sum;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::StatsConfig;
use crate::counterparty::{CounterpartyInput, CounterpartyReconciler, Reconciliation};
use crate::enricher::{TokenBalanceEnricher, finalize_balances};
use crate::median::HistoricalMedianCalculator;
use crate::nft::NftStats;
use crate::transactions::TransactionStats;
use crate::turnover::TurnoverIntervalBuilder;

/// Reject empty or obviously malformed addresses.
///
/// Only the shape is checked; address checksum schemes are left to callers.
pub fn validate_address(address: &str) -> Result<(), InputError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyAddress);
    }
    if trimmed.chars().any(char::is_whitespace) || trimmed.len() != address.len() {
        return Err(InputError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

/// Everything needed to build stats for one wallet.
#[derive(Debug, Clone, Copy)]
pub struct StatsRequest<'a> {
    pub activity: &'a WalletActivity,
    pub counterparties: &'a [CounterpartyConfig],
    /// Past snapshots for the historical median, newest first.
    pub snapshots: &'a [WalletStats],
    pub now: DateTime<Utc>,
}

impl<'a> StatsRequest<'a> {
    pub fn new(activity: &'a WalletActivity, now: DateTime<Utc>) -> Self {
        Self {
            activity,
            counterparties: &[],
            snapshots: &[],
            now,
        }
    }

    pub fn with_counterparties(mut self, counterparties: &'a [CounterpartyConfig]) -> Self {
        self.counterparties = counterparties;
        self
    }

    pub fn with_snapshots(mut self, snapshots: &'a [WalletStats]) -> Self {
        self.snapshots = snapshots;
        self
    }
}

pub struct StatsAssembler {
    enricher: TokenBalanceEnricher,
    config: StatsConfig,
}

impl StatsAssembler {
    pub fn new(enricher: TokenBalanceEnricher, config: StatsConfig) -> Self {
        Self { enricher, config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn enricher(&self) -> &TokenBalanceEnricher {
        &self.enricher
    }

    /// Build the complete statistics record for one wallet.
    ///
    /// A wallet without transactions yields [`WalletStats::no_data`]. Only
    /// malformed input is an error.
    pub fn assemble(&self, request: &StatsRequest<'_>) -> Result<WalletStats, InputError> {
        let activity = request.activity;
        validate_address(&activity.address)?;
        if let Some(b) = activity.token_balances.iter().find(|b| b.chain_id != activity.chain_id) {
            return Err(InputError::ChainMismatch {
                expected: activity.chain_id,
                got: b.chain_id,
            });
        }

        if activity.transactions.is_empty() {
            debug!(wallet = %activity.address, chain = activity.chain_id, "stats: no transactions");
            return Ok(WalletStats::no_data(&activity.address, activity.chain_id));
        }

        let reconciliation = self.reconcile(request);
        let only = self.config.counterparty.only_counterparties && reconciliation.is_some();
        let (transactions, nft_transfers) = match &reconciliation {
            Some(r) if only => (r.transactions.as_slice(), r.nft_transfers.as_slice()),
            _ => (activity.transactions.as_slice(), activity.nft_transfers.as_slice()),
        };
        if transactions.is_empty() {
            debug!(wallet = %activity.address, "stats: no counterparty transactions");
            return Ok(WalletStats::no_data(&activity.address, activity.chain_id));
        }

        let price = activity.native_usd_price;
        let decimals = activity.native_decimals;
        let native_balance = activity.native_balance();

        let token_balances = finalize_balances(self.enricher.enrich(activity.token_balances.clone()));
        let hold_tokens_balance_usd = saturating_sum(token_balances.iter().map(TokenBalance::total_amount_price));

        let tx = TransactionStats::compute(transactions, &activity.address, request.now);

        let intervals = match tx.first_transaction_at {
            Some(first) => TurnoverIntervalBuilder::build(
                transactions,
                price,
                decimals,
                &activity.address,
                first,
                request.now,
            ),
            None => Vec::new(),
        };
        let turnover = TurnoverIntervalBuilder::turnover(&intervals);

        let nft = NftStats::compute(nft_transfers, transactions, &activity.address, decimals, price);

        let (counterparties, counterparties_turnover_usd) = match reconciliation {
            Some(r) => {
                let total = r.turnover_usd();
                (r.counterparties, total)
            }
            None => (Vec::new(), Decimal::ZERO),
        };

        let mut stats = WalletStats {
            address: activity.address.clone(),
            chain_id: activity.chain_id,
            native_balance,
            native_balance_usd: native_balance.saturating_mul(price),
            historical_median_balance_usd: None,
            hold_tokens_balance_usd,
            turnover,
            turnover_usd: (price > Decimal::ZERO).then(|| turnover.saturating_mul(price)),
            balance_change_in_last_month: TurnoverIntervalBuilder::balance_change(&intervals, 1),
            balance_change_in_last_year: TurnoverIntervalBuilder::balance_change(&intervals, MONTHS_PER_YEAR),
            turnover_intervals: intervals,
            wallet_age_months: tx.wallet_age_months,
            first_transaction_at: tx.first_transaction_at,
            last_transaction_at: tx.last_transaction_at,
            total_transactions: tx.total_transactions,
            total_rejected_transactions: tx.total_rejected_transactions,
            min_transaction_interval_hours: tx.min_transaction_interval_hours,
            max_transaction_interval_hours: tx.max_transaction_interval_hours,
            average_transaction_interval_hours: tx.average_transaction_interval_hours,
            last_month_transactions: tx.last_month_transactions,
            last_year_transactions: tx.last_year_transactions,
            time_from_last_transaction_months: tx.time_from_last_transaction_months,
            tokens_holding: token_balances.len() as u32,
            token_balances,
            deployed_contracts: tx.deployed_contracts,
            nft_holding: nft.holding,
            nft_trades: nft.trades,
            nft_trading_volume_usd: nft.trading_volume_usd,
            nft_worth_usd: nft.worth_usd,
            counterparties,
            counterparties_turnover_usd,
            no_data: false,
        };

        stats.historical_median_balance_usd = self.historical_median(&stats, request.snapshots);

        debug!(
            wallet = %stats.address,
            chain = stats.chain_id,
            transactions = stats.total_transactions,
            tokens = stats.tokens_holding,
            balance_usd = %stats.balance_usd(),
            "stats: assembled"
        );
        Ok(stats)
    }

    /// Historical median USD balance of `stats` over `snapshots` (newest first).
    ///
    /// `None` when smoothing is disabled, the stats carry no data, or there
    /// are no snapshots.
    pub fn historical_median(&self, stats: &WalletStats, snapshots: &[WalletStats]) -> Option<Decimal> {
        let historical = &self.config.historical;
        if !historical.enabled || stats.no_data || snapshots.is_empty() {
            return None;
        }
        Some(HistoricalMedianCalculator::median_balance(
            snapshots,
            historical.take_count,
            historical.precision,
            Some(stats.balance_usd()),
        ))
    }

    fn reconcile(&self, request: &StatsRequest<'_>) -> Option<Reconciliation> {
        let options = &self.config.counterparty;
        if request.counterparties.is_empty() && !options.use_all_counterparties {
            return None;
        }

        let activity = request.activity;
        let input = CounterpartyInput {
            wallet: &activity.address,
            chain_id: activity.chain_id,
            transactions: &activity.transactions,
            internal_transactions: &activity.internal_transactions,
            erc20_transfers: &activity.erc20_transfers,
            nft_transfers: &activity.nft_transfers,
            native_decimals: activity.native_decimals,
            native_usd_price: activity.native_usd_price,
        };
        Some(CounterpartyReconciler::new(&self.enricher, options.clone()).reconcile(request.counterparties, &input))
    }
}
