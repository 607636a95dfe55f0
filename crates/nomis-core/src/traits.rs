//! Trait interfaces between the engine and its collaborators.
//!
//! - [`PriceSource`]: one link of the token price fallback chain
//! - [`SnapshotStore`]: historical stats snapshots (median smoothing)
//! - [`StatsCache`]: short-lived cache of assembled stats
//! - [`ScoreCalculator`]: stats-to-score reduction (nomis-scoring implements)
//!
//! All traits are synchronous: the engine works on data that has already
//! been fetched.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SOURCE_CONFIDENCE;
use crate::error::{SourceError, StoreError};
use crate::model::ScoringCalculationModel;
use crate::stats::WalletStats;
use crate::types::{PriceQuote, PriceSourceTag};

/// One price/metadata provider in the enrichment fallback chain.
pub trait PriceSource: Send + Sync {
    /// Which slot of the fallback chain this source occupies.
    fn tag(&self) -> PriceSourceTag;

    /// Confidence applied to quotes that do not carry their own.
    fn confidence(&self) -> Decimal {
        DEFAULT_SOURCE_CONFIDENCE
    }

    /// Look up prices for token contract ids. Ids without data are simply absent.
    ///
    /// Keys of the returned map compare case-insensitively with `ids`.
    fn lookup(
        &self,
        ids: &[String],
        search_width_hours: u32,
    ) -> Result<HashMap<String, PriceQuote>, SourceError>;
}

/// Store of past stats snapshots, serialized as JSON blobs.
pub trait SnapshotStore: Send + Sync {
    /// Snapshots created at or after `since`, newest first.
    fn fetch(
        &self,
        wallet: &str,
        chain_id: u64,
        model: ScoringCalculationModel,
        since: DateTime<Utc>,
    ) -> Result<Vec<String>, StoreError>;

    /// Persist one snapshot.
    fn save(
        &self,
        wallet: &str,
        chain_id: u64,
        model: ScoringCalculationModel,
        stats_json: String,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Cache key: wallet address (lowercased) and chain id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub wallet: String,
    pub chain_id: u64,
}

impl CacheKey {
    pub fn new(wallet: &str, chain_id: u64) -> Self {
        Self {
            wallet: wallet.to_ascii_lowercase(),
            chain_id,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.wallet, self.chain_id)
    }
}

/// Short-lived cache of assembled stats.
pub trait StatsCache: Send + Sync {
    /// Cached stats, if present and not expired.
    fn get(&self, key: &CacheKey) -> Option<WalletStats>;

    /// Store stats for `ttl`.
    fn set(&self, key: CacheKey, stats: WalletStats, ttl: Duration);
}

/// Reduction of a stats record to a single score in `[0, 1]`.
pub trait ScoreCalculator: Send + Sync {
    /// Score `stats` under `model`. Never fails.
    fn score(&self, stats: &WalletStats, model: ScoringCalculationModel) -> Decimal;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock::FixedSource;

    mod mock {
        use super::*;

        pub struct FixedSource {
            pub prices: HashMap<String, PriceQuote>,
        }

        impl PriceSource for FixedSource {
            fn tag(&self) -> PriceSourceTag {
                PriceSourceTag::TokenList
            }
            fn lookup(
                &self,
                ids: &[String],
                _search_width_hours: u32,
            ) -> Result<HashMap<String, PriceQuote>, SourceError> {
                Ok(ids
                    .iter()
                    .filter_map(|id| self.prices.get(id).map(|q| (id.clone(), q.clone())))
                    .collect())
            }
        }
    }

    struct ZeroCalculator;

    impl ScoreCalculator for ZeroCalculator {
        fn score(&self, _: &WalletStats, _: ScoringCalculationModel) -> Decimal {
            Decimal::ZERO
        }
    }

    #[test]
    fn cache_key_lowercases_wallet() {
        let k = CacheKey::new("0xABCdef", 10);
        assert_eq!(k.wallet, "0xabcdef");
        assert_eq!(k.to_string(), "0xabcdef@10");
        assert_eq!(k, CacheKey::new("0xabcdef", 10));
    }

    #[test]
    fn price_source_is_object_safe() {
        let mut prices = HashMap::new();
        prices.insert("0xt".to_string(), PriceQuote::priced(Decimal::TWO));
        let src = FixedSource { prices };
        let dyn_src: &dyn PriceSource = &src;
        let got = dyn_src.lookup(&["0xt".into(), "0xu".into()], 24).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["0xt"].price, Some(Decimal::TWO));
    }

    #[test]
    fn undeclared_source_confidence_defaults() {
        let src = FixedSource { prices: HashMap::new() };
        assert_eq!(src.confidence(), DEFAULT_SOURCE_CONFIDENCE);
    }

    #[test]
    fn score_calculator_is_object_safe() {
        let calc: &dyn ScoreCalculator = &ZeroCalculator;
        let s = WalletStats::default();
        assert_eq!(calc.score(&s, ScoringCalculationModel::default()), Decimal::ZERO);
    }
}
