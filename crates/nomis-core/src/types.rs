//! Plain data types consumed and produced by the statistics pipeline.
//!
//! Raw chain lists (`Transaction`, `Erc20Transfer`, ...) arrive already
//! fetched and paginated. Addresses and hashes compare case-insensitively.

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{APPROVE_METHOD_PREFIX, NATIVE_DECIMALS, ZERO_ADDRESS};
use crate::units::to_units;

/// Case-insensitive address (or hash) equality.
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Whether an optional address equals `b`.
pub fn opt_same_address(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| same_address(a, b))
}

/// Whether `address` is the zero address.
pub fn is_zero_address(address: &str) -> bool {
    same_address(address, ZERO_ADDRESS)
}

/// Whether `method` starts with `prefix`, ignoring ASCII case.
pub fn method_has_prefix(method: &str, prefix: &str) -> bool {
    method.len() >= prefix.len()
        && method.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Serde adapter that writes `BigUint` as a base-10 string.
pub mod biguint_string {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &BigUint, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(d)?;
        BigUint::parse_bytes(text.trim().as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("invalid unsigned integer: {text}")))
    }
}

// ---------------------------------------------------------------------------
// Token balances
// ---------------------------------------------------------------------------

/// Where a token price came from, in fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum PriceSourceTag {
    Explorer,
    PriceOracleA,
    PriceOracleB,
    TokenList,
    #[default]
    Unknown,
}

impl PriceSourceTag {
    /// Position in the enrichment fallback chain (lower is consulted first).
    pub fn priority(&self) -> u8 {
        match self {
            Self::Explorer => 0,
            Self::PriceOracleA => 1,
            Self::PriceOracleB => 2,
            Self::TokenList => 3,
            Self::Unknown => 4,
        }
    }
}

/// A token holding with its (possibly unresolved) price.
///
/// `price == 0` means "unresolved".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub contract_id: String,
    pub chain_id: u64,
    #[serde(with = "biguint_string")]
    pub balance_raw: BigUint,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub confidence: Decimal,
    #[serde(default)]
    pub last_price_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_tag: PriceSourceTag,
}

impl TokenBalance {
    /// An unpriced balance with no metadata.
    pub fn new(contract_id: impl Into<String>, chain_id: u64, balance_raw: BigUint) -> Self {
        Self {
            contract_id: contract_id.into(),
            chain_id,
            balance_raw,
            decimals: None,
            symbol: None,
            name: None,
            logo_uri: None,
            price: Decimal::ZERO,
            confidence: Decimal::ZERO,
            last_price_timestamp: None,
            source_tag: PriceSourceTag::Unknown,
        }
    }

    /// Balance in token units (`balance_raw / 10^decimals`).
    pub fn amount(&self) -> Decimal {
        to_units(&self.balance_raw, self.decimals.unwrap_or(0))
    }

    /// USD value of the holding, saturating at `Decimal::MAX`.
    ///
    /// A balance whose decimals are unknown has no USD value: its raw integer
    /// cannot be scaled into units, so pricing it would overstate it.
    pub fn total_amount_price(&self) -> Decimal {
        if self.decimals.is_none() {
            return Decimal::ZERO;
        }
        self.amount().saturating_mul(self.price)
    }

    /// Whether a nonzero price has been resolved.
    pub fn is_priced(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

/// A token balance attributed to a single transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferTokenBalance {
    #[serde(flatten)]
    pub balance: TokenBalance,
    pub transaction_hash: String,
    pub is_outgoing: bool,
    #[serde(default)]
    pub invocation_method: Option<String>,
}

/// Partial price data returned by one source for one token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Option<Decimal>,
    pub confidence: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
    pub decimals: Option<u32>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub logo_uri: Option<String>,
}

impl PriceQuote {
    /// A quote carrying only a price.
    pub fn priced(price: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Raw chain activity
// ---------------------------------------------------------------------------

/// A normal (top-level) transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    /// Address of the contract this transaction deployed, if any.
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(with = "biguint_string")]
    pub value: BigUint,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub method_name: Option<String>,
}

impl Transaction {
    /// Whether the wallet sent this transaction.
    pub fn is_outgoing(&self, wallet: &str) -> bool {
        same_address(&self.from, wallet)
    }

    /// Whether the called method is an `approve*` call.
    pub fn is_approval(&self) -> bool {
        self.method_name
            .as_deref()
            .is_some_and(|m| method_has_prefix(m, APPROVE_METHOD_PREFIX))
    }

    /// Native value in whole tokens of a chain with `native_decimals`.
    pub fn native_value(&self, native_decimals: u32) -> Decimal {
        to_units(&self.value, native_decimals)
    }
}

/// A contract-internal value transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalTransaction {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(with = "biguint_string")]
    pub value: BigUint,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
}

/// An ERC-20 token transfer log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20Transfer {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub contract_address: String,
    #[serde(with = "biguint_string")]
    pub value: BigUint,
    #[serde(default)]
    pub token_decimals: Option<u32>,
    #[serde(default)]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub token_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Erc20Transfer {
    /// Whether this transfer minted tokens.
    pub fn is_mint(&self) -> bool {
        is_zero_address(&self.from)
    }
}

/// An NFT (ERC-721/1155) transfer log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransfer {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub contract_address: String,
    pub token_id: String,
    #[serde(default)]
    pub token_symbol: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NftTransfer {
    pub fn is_mint(&self) -> bool {
        is_zero_address(&self.from)
    }
}

/// Everything fetched for one wallet on one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletActivity {
    pub address: String,
    pub chain_id: u64,
    #[serde(with = "biguint_string")]
    pub native_balance_raw: BigUint,
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u32,
    /// USD price of the native token (zero when unknown).
    #[serde(default)]
    pub native_usd_price: Decimal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub internal_transactions: Vec<InternalTransaction>,
    #[serde(default)]
    pub erc20_transfers: Vec<Erc20Transfer>,
    #[serde(default)]
    pub nft_transfers: Vec<NftTransfer>,
    /// Token balances as reported by the explorer, prices possibly unresolved.
    #[serde(default)]
    pub token_balances: Vec<TokenBalance>,
}

fn default_native_decimals() -> u32 {
    NATIVE_DECIMALS
}

impl WalletActivity {
    /// An activity bundle with no history.
    pub fn empty(address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            address: address.into(),
            chain_id,
            native_balance_raw: BigUint::default(),
            native_decimals: NATIVE_DECIMALS,
            native_usd_price: Decimal::ZERO,
            transactions: Vec::new(),
            internal_transactions: Vec::new(),
            erc20_transfers: Vec::new(),
            nft_transfers: Vec::new(),
            token_balances: Vec::new(),
        }
    }

    /// Native balance in whole tokens.
    pub fn native_balance(&self) -> Decimal {
        to_units(&self.native_balance_raw, self.native_decimals)
    }
}

// ---------------------------------------------------------------------------
// Counterparties
// ---------------------------------------------------------------------------

/// Per-counterparty switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyFlags {
    /// Attribute internal transactions that share a matched hash.
    pub count_internal_transactions: bool,
    /// Reconcile NFT transfers against this counterparty.
    pub count_nft_transfers: bool,
}

impl Default for CounterpartyFlags {
    fn default() -> Self {
        Self {
            count_internal_transactions: true,
            count_nft_transfers: true,
        }
    }
}

/// A tracked protocol/dApp contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterpartyConfig {
    pub name: String,
    /// Entries without a contract address are skipped.
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Method-name prefixes that count; empty means "all methods".
    #[serde(default)]
    pub allowed_method_prefixes: Vec<String>,
    #[serde(default)]
    pub flags: CounterpartyFlags,
}

impl CounterpartyConfig {
    pub fn new(name: impl Into<String>, contract_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contract_address: Some(contract_address.into()),
            ..Self::default()
        }
    }
}

/// A counterparty config plus what was matched against it for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedCounterpartyData {
    pub config: CounterpartyConfig,
    pub transaction_count: Option<u32>,
    pub internal_transaction_count: Option<u32>,
    pub transfer_count: Option<u32>,
    pub nft_transfer_count: Option<u32>,
    pub transaction_hashes: Option<Vec<String>>,
    pub turnover_usd: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Turnover intervals
// ---------------------------------------------------------------------------

/// Native value flow through the wallet during one calendar month.
///
/// USD figures are derived from `token_usd_price` and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverIntervalData {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount_sum_value: Decimal,
    pub amount_out_sum_value: Decimal,
    pub amount_in_sum_value: Decimal,
    pub token_usd_price: Decimal,
    pub count: u32,
}

impl TurnoverIntervalData {
    pub fn amount_sum_usd(&self) -> Decimal {
        self.amount_sum_value.saturating_mul(self.token_usd_price)
    }

    pub fn amount_out_sum_usd(&self) -> Decimal {
        self.amount_out_sum_value.saturating_mul(self.token_usd_price)
    }

    pub fn amount_in_sum_usd(&self) -> Decimal {
        self.amount_in_sum_value.saturating_mul(self.token_usd_price)
    }

    /// Net inflow (`in - out`) in native units.
    pub fn net_value(&self) -> Decimal {
        self.amount_in_sum_value.saturating_sub(self.amount_out_sum_value)
    }
}
