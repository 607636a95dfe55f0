//! NFT holding and trading statistics.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use nomis_core::types::{NftTransfer, Transaction, same_address};
use nomis_core::units::saturating_sum;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NftStats {
    /// Tokens whose latest transfer moved them into the wallet.
    pub holding: u32,
    /// Non-mint transfers touching the wallet.
    pub trades: u32,
    /// USD native value of the distinct transactions carrying those trades.
    pub trading_volume_usd: Decimal,
    /// USD native value paid for the tokens still held.
    pub worth_usd: Decimal,
}

impl NftStats {
    pub fn compute(
        transfers: &[NftTransfer],
        transactions: &[Transaction],
        wallet: &str,
        native_decimals: u32,
        native_usd_price: Decimal,
    ) -> Self {
        if transfers.is_empty() {
            return Self::default();
        }

        let tx_value: HashMap<String, Decimal> = transactions
            .iter()
            .map(|t| {
                let usd = t.native_value(native_decimals).saturating_mul(native_usd_price);
                (t.hash.to_ascii_lowercase(), usd)
            })
            .collect();
        let usd_of = |hashes: &BTreeSet<String>| -> Decimal {
            saturating_sum(hashes.iter().filter_map(|h| tx_value.get(h)).copied())
        };

        // latest transfer per token, stable for equal timestamps
        let mut ordered: Vec<&NftTransfer> = transfers.iter().collect();
        ordered.sort_by_key(|t| t.timestamp);
        let mut latest: BTreeMap<(String, String), &NftTransfer> = BTreeMap::new();
        for t in &ordered {
            latest.insert((t.contract_address.to_ascii_lowercase(), t.token_id.clone()), t);
        }

        let held: Vec<&NftTransfer> = latest
            .values()
            .copied()
            .filter(|t| same_address(&t.to, wallet))
            .collect();
        let held_hashes: BTreeSet<String> = held
            .iter()
            .filter(|t| !t.is_mint())
            .map(|t| t.hash.to_ascii_lowercase())
            .collect();

        let trades: Vec<&NftTransfer> = transfers.iter().filter(|t| !t.is_mint()).collect();
        let trade_hashes: BTreeSet<String> = trades.iter().map(|t| t.hash.to_ascii_lowercase()).collect();

        Self {
            holding: held.len() as u32,
            trades: trades.len() as u32,
            trading_volume_usd: usd_of(&trade_hashes),
            worth_usd: usd_of(&held_hashes),
        }
    }
}
