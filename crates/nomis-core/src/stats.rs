//! The wallet statistics record handed to the scoring engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::{ExtendedCounterpartyData, TokenBalance, TurnoverIntervalData};

/// All derived facts about one wallet on one chain.
///
/// Built once per request by the stats assembler and not mutated afterwards.
/// A record with `no_data == true` has every numeric field at its default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WalletStats {
    pub address: String,
    pub chain_id: u64,

    // --- balance ---
    pub native_balance: Decimal,
    pub native_balance_usd: Decimal,
    pub historical_median_balance_usd: Option<Decimal>,
    pub hold_tokens_balance_usd: Decimal,
    pub turnover: Decimal,
    pub turnover_usd: Option<Decimal>,
    pub balance_change_in_last_month: Decimal,
    pub balance_change_in_last_year: Decimal,
    pub turnover_intervals: Vec<TurnoverIntervalData>,

    // --- transactions ---
    pub wallet_age_months: u32,
    pub first_transaction_at: Option<DateTime<Utc>>,
    pub last_transaction_at: Option<DateTime<Utc>>,
    pub total_transactions: u32,
    pub total_rejected_transactions: u32,
    pub min_transaction_interval_hours: Decimal,
    pub max_transaction_interval_hours: Decimal,
    pub average_transaction_interval_hours: Decimal,
    pub last_month_transactions: u32,
    pub last_year_transactions: u32,
    pub time_from_last_transaction_months: u32,

    // --- tokens ---
    pub tokens_holding: u32,
    pub token_balances: Vec<TokenBalance>,

    // --- contracts ---
    pub deployed_contracts: u32,

    // --- nft ---
    pub nft_holding: u32,
    pub nft_trades: u32,
    pub nft_trading_volume_usd: Decimal,
    pub nft_worth_usd: Decimal,

    // --- counterparties ---
    pub counterparties: Vec<ExtendedCounterpartyData>,
    pub counterparties_turnover_usd: Decimal,

    pub no_data: bool,
}

impl WalletStats {
    /// The "nothing to score" record for a wallet without transactions.
    pub fn no_data(address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            address: address.into(),
            chain_id,
            no_data: true,
            ..Self::default()
        }
    }

    /// Current USD balance: native plus held tokens.
    pub fn balance_usd(&self) -> Decimal {
        self.native_balance_usd.saturating_add(self.hold_tokens_balance_usd)
    }

    /// Balance used for scoring: the historical median when one is known, else the current balance.
    pub fn scoring_balance_usd(&self) -> Decimal {
        match self.historical_median_balance_usd {
            Some(median) if median > Decimal::ZERO => median,
            _ => self.balance_usd(),
        }
    }

    /// Serialize as a snapshot blob for the historical store.
    pub fn to_snapshot_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode a snapshot blob produced by [`to_snapshot_json`](Self::to_snapshot_json).
    pub fn from_snapshot_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
