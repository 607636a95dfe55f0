//! Shared builders and mock collaborators for integration tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use nomis_core::error::SourceError;
use nomis_core::traits::PriceSource;
use nomis_core::types::{
    Erc20Transfer, NftTransfer, PriceQuote, PriceSourceTag, TokenBalance, Transaction, WalletActivity,
};
use num_bigint::BigUint;
use rust_decimal::Decimal;

pub const WALLET: &str = "0xabcdef1111111111111111111111111111111111";
pub const DEX: &str = "0x2222222222222222222222222222222222222222";
pub const BRIDGE: &str = "0x3333333333333333333333333333333333333333";
pub const USDC: &str = "0x4444444444444444444444444444444444444444";
pub const PUNKS: &str = "0x5555555555555555555555555555555555555555";

/// Midnight UTC on the given date.
pub fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// `n` whole native tokens in wei.
pub fn eth(n: u64) -> BigUint {
    BigUint::from(n) * BigUint::from(10u64.pow(18))
}

/// A successful transaction from `from` to `to`.
pub fn tx(hash: &str, from: &str, to: &str, value: BigUint, when: DateTime<Utc>) -> Transaction {
    Transaction {
        hash: hash.into(),
        from: from.into(),
        to: Some(to.into()),
        contract_address: None,
        value,
        timestamp: when,
        is_error: false,
        method_name: None,
    }
}

/// Like [`tx`] with a method name.
pub fn call(hash: &str, to: &str, method: &str, value: BigUint, when: DateTime<Utc>) -> Transaction {
    Transaction {
        method_name: Some(method.into()),
        ..tx(hash, WALLET, to, value, when)
    }
}

/// A 6-decimal ERC-20 transfer of `units` whole tokens.
pub fn erc20(hash: &str, from: &str, to: &str, contract: &str, symbol: &str, units: u64, when: DateTime<Utc>) -> Erc20Transfer {
    Erc20Transfer {
        hash: hash.into(),
        from: from.into(),
        to: to.into(),
        contract_address: contract.into(),
        value: BigUint::from(units) * BigUint::from(1_000_000u64),
        token_decimals: Some(6),
        token_symbol: Some(symbol.into()),
        token_name: None,
        timestamp: when,
    }
}

pub fn nft(hash: &str, from: &str, to: &str, token_id: &str, when: DateTime<Utc>) -> NftTransfer {
    NftTransfer {
        hash: hash.into(),
        from: from.into(),
        to: to.into(),
        contract_address: PUNKS.into(),
        token_id: token_id.into(),
        token_symbol: Some("PUNK".into()),
        timestamp: when,
    }
}

/// An unpriced token balance of `units` whole tokens.
pub fn token(contract: &str, symbol: Option<&str>, units: u64, decimals: u32) -> TokenBalance {
    TokenBalance {
        decimals: Some(decimals),
        symbol: symbol.map(str::to_string),
        ..TokenBalance::new(contract, 1, BigUint::from(units) * BigUint::from(10u64).pow(decimals))
    }
}

/// A moderately active mainnet wallet with a DEX, a bridge, tokens and an NFT.
pub fn sample_activity() -> WalletActivity {
    let mut a = WalletActivity::empty(WALLET, 1);
    a.native_balance_raw = eth(2);
    a.native_usd_price = Decimal::from(2000);
    a.transactions = vec![
        tx("0xa1", BRIDGE, WALLET, eth(5), ts(2022, 3, 1)),
        call("0xa2", DEX, "swapExactETHForTokens", eth(1), ts(2022, 9, 15)),
        call("0xa3", "0x9999999999999999999999999999999999999999", "multicall", eth(0), ts(2023, 4, 2)),
        call("0xa4", DEX, "approve", eth(0), ts(2023, 4, 3)),
        call("0xa5", BRIDGE, "bridge", eth(1), ts(2024, 5, 10)),
        call("0xa6", "0x8888888888888888888888888888888888888888", "buy", eth(1), ts(2024, 5, 20)),
    ];
    a.erc20_transfers = vec![
        erc20("0xa2", DEX, WALLET, USDC, "USDC", 1800, ts(2022, 9, 15)),
        // router call that moves tokens into the DEX
        erc20("0xa3", WALLET, DEX, USDC, "USDC", 500, ts(2023, 4, 2)),
    ];
    a.nft_transfers = vec![nft("0xa6", "0x7777777777777777777777777777777777777777", WALLET, "42", ts(2024, 5, 20))];
    a.token_balances = vec![
        token(USDC, Some("USDC"), 1300, 6),
        token("0x6666666666666666666666666666666666666666", Some("PEPE"), 1_000_000, 18),
    ];
    a
}

/// Price source answering from a fixed table and counting calls.
pub struct MockPriceSource {
    tag: PriceSourceTag,
    confidence: Decimal,
    quotes: HashMap<String, PriceQuote>,
    calls: Arc<AtomicUsize>,
}

impl MockPriceSource {
    pub fn new(tag: PriceSourceTag, confidence: Decimal) -> Self {
        Self {
            tag,
            confidence,
            quotes: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_quote(mut self, contract: &str, quote: PriceQuote) -> Self {
        self.quotes.insert(contract.to_ascii_lowercase(), quote);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl PriceSource for MockPriceSource {
    fn tag(&self) -> PriceSourceTag {
        self.tag
    }

    fn confidence(&self) -> Decimal {
        self.confidence
    }

    fn lookup(&self, ids: &[String], _search_width_hours: u32) -> Result<HashMap<String, PriceQuote>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids
            .iter()
            .filter_map(|id| self.quotes.get(&id.to_ascii_lowercase()).map(|q| (id.clone(), q.clone())))
            .collect())
    }
}

/// Price source that always fails.
pub struct FailingPriceSource(pub PriceSourceTag);

impl PriceSource for FailingPriceSource {
    fn tag(&self) -> PriceSourceTag {
        self.0
    }

    fn lookup(&self, _ids: &[String], _search_width_hours: u32) -> Result<HashMap<String, PriceQuote>, SourceError> {
        Err(SourceError::Unavailable("connection refused".into()))
    }
}
