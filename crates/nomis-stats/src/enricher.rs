//! Token price and metadata enrichment.
//!
//! Unpriced balances are resolved through an ordered chain of
//! [`PriceSource`]s (explorer, aggregated oracle, portfolio oracle, token
//! list) followed by the static stablecoin table. The first nonzero price
//! wins; later sources only fill metadata that is still missing. A failing
//! source is logged and skipped.

use std::collections::{HashMap, HashSet};

use nomis_core::constants::{DEFAULT_PRICE_SEARCH_WIDTH_HOURS, FLAT_TABLE_CONFIDENCE};
use nomis_core::traits::PriceSource;
use nomis_core::types::{PriceQuote, PriceSourceTag, TokenBalance, TransferTokenBalance};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::stablecoins::StablecoinTable;

/// Merge a candidate observation into an existing balance.
///
/// The candidate's price, confidence, timestamp and source tag are taken only
/// if `existing` is still unpriced and the candidate carries a nonzero price.
/// Metadata fields are null-coalesced: a field already set is never replaced.
pub fn merge(existing: TokenBalance, candidate: &TokenBalance) -> TokenBalance {
    let mut merged = existing;

    if !merged.is_priced() && candidate.is_priced() {
        merged.price = candidate.price;
        merged.confidence = candidate.confidence.clamp(Decimal::ZERO, Decimal::ONE);
        merged.last_price_timestamp = candidate.last_price_timestamp;
        merged.source_tag = candidate.source_tag;
    }

    merged.decimals = merged.decimals.or(candidate.decimals);
    merged.symbol = merged.symbol.or_else(|| candidate.symbol.clone());
    merged.name = merged.name.or_else(|| candidate.name.clone());
    merged.logo_uri = merged.logo_uri.or_else(|| candidate.logo_uri.clone());
    merged
}

/// Build a candidate balance for `base` out of one source quote.
fn candidate_from_quote(
    base: &TokenBalance,
    quote: &PriceQuote,
    tag: PriceSourceTag,
    default_confidence: Decimal,
) -> TokenBalance {
    TokenBalance {
        contract_id: base.contract_id.clone(),
        chain_id: base.chain_id,
        balance_raw: base.balance_raw.clone(),
        decimals: quote.decimals,
        symbol: quote.symbol.clone(),
        name: quote.name.clone(),
        logo_uri: quote.logo_uri.clone(),
        price: quote.price.filter(|p| *p > Decimal::ZERO).unwrap_or(Decimal::ZERO),
        confidence: quote.confidence.unwrap_or(default_confidence),
        last_price_timestamp: quote.timestamp,
        source_tag: tag,
    }
}

fn needs_metadata(b: &TokenBalance) -> bool {
    b.decimals.is_none() || b.symbol.is_none() || b.name.is_none() || b.logo_uri.is_none()
}

/// Resolves token prices through the fallback chain.
pub struct TokenBalanceEnricher {
    sources: Vec<Box<dyn PriceSource>>,
    stablecoins: StablecoinTable,
    search_width_hours: u32,
}

impl TokenBalanceEnricher {
    /// Create an enricher. Sources are consulted in [`PriceSourceTag::priority`]
    /// order regardless of the order given; ties keep their given order.
    pub fn new(mut sources: Vec<Box<dyn PriceSource>>) -> Self {
        sources.sort_by_key(|s| s.tag().priority());
        Self {
            sources,
            stablecoins: StablecoinTable::new(),
            search_width_hours: DEFAULT_PRICE_SEARCH_WIDTH_HOURS,
        }
    }

    /// An enricher with only the stablecoin table.
    pub fn offline() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_search_width_hours(mut self, hours: u32) -> Self {
        self.search_width_hours = hours;
        self
    }

    /// Resolve prices and metadata for every unpriced balance.
    ///
    /// Balances that arrive priced are returned untouched. Order and length
    /// are preserved.
    pub fn enrich(&self, balances: Vec<TokenBalance>) -> Vec<TokenBalance> {
        let mut balances = balances;
        let pending: Vec<usize> = balances
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.is_priced())
            .map(|(i, _)| i)
            .collect();

        if pending.is_empty() {
            return balances;
        }

        for source in &self.sources {
            let wanted: Vec<usize> = pending
                .iter()
                .copied()
                .filter(|&i| !balances[i].is_priced() || needs_metadata(&balances[i]))
                .collect();
            if wanted.is_empty() {
                break;
            }

            let mut ids: Vec<String> = Vec::with_capacity(wanted.len());
            let mut seen = HashSet::new();
            for &i in &wanted {
                let id = balances[i].contract_id.to_ascii_lowercase();
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }

            let quotes = match source.lookup(&ids, self.search_width_hours) {
                Ok(q) => q,
                Err(e) => {
                    warn!(source = ?source.tag(), error = %e, "enrich: price source failed, skipping");
                    continue;
                }
            };
            let quotes: HashMap<String, PriceQuote> = quotes
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect();

            let mut resolved = 0usize;
            for &i in &wanted {
                let key = balances[i].contract_id.to_ascii_lowercase();
                let Some(quote) = quotes.get(&key) else {
                    continue;
                };
                let was_priced = balances[i].is_priced();
                let candidate =
                    candidate_from_quote(&balances[i], quote, source.tag(), source.confidence());
                balances[i] = merge(balances[i].clone(), &candidate);
                if !was_priced && balances[i].is_priced() {
                    resolved += 1;
                }
            }
            debug!(source = ?source.tag(), queried = ids.len(), resolved, "enrich: source consulted");
        }

        for &i in &pending {
            if balances[i].is_priced() {
                continue;
            }
            let Some(price) = balances[i].symbol.as_deref().and_then(|s| self.stablecoins.price_for(s))
            else {
                continue;
            };
            let candidate = TokenBalance {
                price,
                confidence: FLAT_TABLE_CONFIDENCE,
                source_tag: PriceSourceTag::Unknown,
                ..TokenBalance::new(balances[i].contract_id.clone(), balances[i].chain_id, Default::default())
            };
            balances[i] = merge(balances[i].clone(), &candidate);
        }

        balances
    }

    /// Resolve prices for per-transfer balances. Order and length are preserved.
    pub fn enrich_transfers(&self, transfers: Vec<TransferTokenBalance>) -> Vec<TransferTokenBalance> {
        let (meta, balances): (Vec<_>, Vec<_>) = transfers
            .into_iter()
            .map(|t| ((t.transaction_hash, t.is_outgoing, t.invocation_method), t.balance))
            .unzip();

        self.enrich(balances)
            .into_iter()
            .zip(meta)
            .map(|(balance, (transaction_hash, is_outgoing, invocation_method))| {
                TransferTokenBalance {
                    balance,
                    transaction_hash,
                    is_outgoing,
                    invocation_method,
                }
            })
            .collect()
    }
}

/// Canonical ordering: value desc, raw balance desc, contract asc, symbol asc.
fn balance_order(a: &TokenBalance, b: &TokenBalance) -> std::cmp::Ordering {
    b.total_amount_price()
        .cmp(&a.total_amount_price())
        .then_with(|| b.balance_raw.cmp(&a.balance_raw))
        .then_with(|| a.contract_id.cmp(&b.contract_id))
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// Drop worthless balances, sort, and deduplicate by (symbol, price, amount).
pub fn finalize_balances(balances: Vec<TokenBalance>) -> Vec<TokenBalance> {
    let mut kept: Vec<TokenBalance> = balances
        .into_iter()
        .filter(|b| b.total_amount_price() > Decimal::ZERO)
        .collect();
    kept.sort_by(balance_order);

    let mut seen = HashSet::new();
    kept.retain(|b| seen.insert((b.symbol.clone(), b.price.normalize(), b.amount().normalize())));
    kept
}

/// Sort and deduplicate transfer balances by transaction hash.
///
/// Unpriced entries are dropped unless `keep_unpriced` is set.
pub fn finalize_transfer_balances(
    transfers: Vec<TransferTokenBalance>,
    keep_unpriced: bool,
) -> Vec<TransferTokenBalance> {
    let mut kept: Vec<TransferTokenBalance> = transfers
        .into_iter()
        .filter(|t| keep_unpriced || t.balance.total_amount_price() > Decimal::ZERO)
        .collect();
    kept.sort_by(|a, b| balance_order(&a.balance, &b.balance));

    let mut seen = HashSet::new();
    kept.retain(|t| seen.insert(t.transaction_hash.to_ascii_lowercase()));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomis_core::error::SourceError;
    use num_bigint::BigUint;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // ------------------------------------------------------------------
    // Mock sources
    // ------------------------------------------------------------------

    struct MockSource {
        tag: PriceSourceTag,
        quotes: HashMap<String, PriceQuote>,
        calls: Arc<AtomicUsize>,
    }

    impl MockSource {
        fn new(tag: PriceSourceTag) -> Self {
            Self {
                tag,
                quotes: HashMap::new(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn quote(mut self, id: &str, quote: PriceQuote) -> Self {
            self.quotes.insert(id.to_string(), quote);
            self
        }
    }

    impl PriceSource for MockSource {
        fn tag(&self) -> PriceSourceTag {
            self.tag
        }
        fn confidence(&self) -> Decimal {
            dec!(0.8)
        }
        fn lookup(
            &self,
            ids: &[String],
            _search_width_hours: u32,
        ) -> Result<HashMap<String, PriceQuote>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ids
                .iter()
                .filter_map(|id| self.quotes.get(id).map(|q| (id.clone(), q.clone())))
                .collect())
        }
    }

    struct FailingSource(PriceSourceTag);

    impl PriceSource for FailingSource {
        fn tag(&self) -> PriceSourceTag {
            self.0
        }
        fn lookup(&self, _: &[String], _: u32) -> Result<HashMap<String, PriceQuote>, SourceError> {
            Err(SourceError::Unavailable("connection refused".into()))
        }
    }

    fn balance(id: &str, raw: u64) -> TokenBalance {
        TokenBalance::new(id, 1, BigUint::from(raw))
    }

    fn priced(symbol: &str, price: Decimal, amount: u64) -> TokenBalance {
        let mut b = TokenBalance::new(format!("0x{symbol}"), 1, BigUint::from(amount));
        b.decimals = Some(0);
        b.symbol = Some(symbol.to_string());
        b.price = price;
        b
    }

    // --- merge ---

    #[test]
    fn merge_takes_price_when_unresolved() {
        let mut cand = balance("0xt", 1);
        cand.price = dec!(3);
        cand.confidence = dec!(0.7);
        cand.source_tag = PriceSourceTag::PriceOracleB;
        let merged = merge(balance("0xt", 1), &cand);
        assert_eq!(merged.price, dec!(3));
        assert_eq!(merged.confidence, dec!(0.7));
        assert_eq!(merged.source_tag, PriceSourceTag::PriceOracleB);
    }

    #[test]
    fn merge_never_replaces_resolved_price() {
        let mut existing = balance("0xt", 1);
        existing.price = dec!(5);
        existing.source_tag = PriceSourceTag::Explorer;
        let mut cand = balance("0xt", 1);
        cand.price = dec!(8);
        cand.source_tag = PriceSourceTag::TokenList;
        let merged = merge(existing, &cand);
        assert_eq!(merged.price, dec!(5));
        assert_eq!(merged.source_tag, PriceSourceTag::Explorer);
    }

    #[test]
    fn merge_fills_only_missing_metadata() {
        let mut existing = balance("0xt", 1);
        existing.symbol = Some("AAA".into());
        let mut cand = balance("0xt", 1);
        cand.symbol = Some("BBB".into());
        cand.name = Some("Token".into());
        cand.decimals = Some(6);
        let merged = merge(existing, &cand);
        assert_eq!(merged.symbol.as_deref(), Some("AAA"));
        assert_eq!(merged.name.as_deref(), Some("Token"));
        assert_eq!(merged.decimals, Some(6));
    }

    #[test]
    fn merge_clamps_confidence() {
        let mut cand = balance("0xt", 1);
        cand.price = dec!(1);
        cand.confidence = dec!(1.5);
        assert_eq!(merge(balance("0xt", 1), &cand).confidence, Decimal::ONE);
    }

    // --- enrich ---

    #[test]
    fn first_nonzero_price_wins_and_metadata_fills_from_later_source() {
        let a = MockSource::new(PriceSourceTag::PriceOracleA).quote(
            "0xt",
            PriceQuote { price: Some(dec!(5)), ..PriceQuote::default() },
        );
        let b = MockSource::new(PriceSourceTag::PriceOracleB).quote(
            "0xt",
            PriceQuote {
                price: Some(dec!(8)),
                symbol: Some("TKN".into()),
                ..PriceQuote::default()
            },
        );
        // Given out of order on purpose.
        let enricher = TokenBalanceEnricher::new(vec![Box::new(b), Box::new(a)]);
        let out = enricher.enrich(vec![balance("0xt", 10)]);
        assert_eq!(out[0].price, dec!(5));
        assert_eq!(out[0].source_tag, PriceSourceTag::PriceOracleA);
        assert_eq!(out[0].confidence, dec!(0.8));
        assert_eq!(out[0].symbol.as_deref(), Some("TKN"));
    }

    #[test]
    fn zero_price_from_source_does_not_resolve() {
        let a = MockSource::new(PriceSourceTag::Explorer)
            .quote("0xt", PriceQuote::priced(Decimal::ZERO));
        let b = MockSource::new(PriceSourceTag::TokenList).quote("0xt", PriceQuote::priced(dec!(2)));
        let out = TokenBalanceEnricher::new(vec![Box::new(a), Box::new(b)]).enrich(vec![balance("0xt", 1)]);
        assert_eq!(out[0].price, dec!(2));
        assert_eq!(out[0].source_tag, PriceSourceTag::TokenList);
    }

    #[test]
    fn failing_source_is_skipped() {
        let good = MockSource::new(PriceSourceTag::PriceOracleB).quote("0xt", PriceQuote::priced(dec!(4)));
        let enricher = TokenBalanceEnricher::new(vec![
            Box::new(FailingSource(PriceSourceTag::Explorer)),
            Box::new(FailingSource(PriceSourceTag::PriceOracleA)),
            Box::new(good),
        ]);
        let out = enricher.enrich(vec![balance("0xt", 1)]);
        assert_eq!(out[0].price, dec!(4));
    }

    #[test]
    fn all_sources_failing_leaves_price_zero() {
        let enricher = TokenBalanceEnricher::new(vec![Box::new(FailingSource(PriceSourceTag::Explorer))]);
        let out = enricher.enrich(vec![balance("0xt", 1)]);
        assert_eq!(out[0].price, Decimal::ZERO);
        assert!(finalize_balances(out).is_empty());
    }

    #[test]
    fn priced_balances_are_not_queried() {
        let src = MockSource::new(PriceSourceTag::Explorer);
        let calls = src.calls.clone();
        let enricher = TokenBalanceEnricher::new(vec![Box::new(src)]);
        let mut b = balance("0xt", 1);
        b.price = dec!(1);
        enricher.enrich(vec![b]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn lookup_ids_match_case_insensitively() {
        let src = MockSource::new(PriceSourceTag::Explorer).quote("0xabc", PriceQuote::priced(dec!(7)));
        let out = TokenBalanceEnricher::new(vec![Box::new(src)]).enrich(vec![balance("0xABC", 1)]);
        assert_eq!(out[0].price, dec!(7));
    }

    #[test]
    fn stablecoin_table_is_last_resort() {
        let mut b = balance("0xusdt", 1_000_000);
        b.decimals = Some(6);
        b.symbol = Some("USDT".into());
        let out = TokenBalanceEnricher::offline().enrich(vec![b]);
        assert_eq!(out[0].price, Decimal::ONE);
        assert_eq!(out[0].confidence, FLAT_TABLE_CONFIDENCE);
        assert_eq!(out[0].source_tag, PriceSourceTag::Unknown);
        assert_eq!(out[0].total_amount_price(), Decimal::ONE);
    }

    #[test]
    fn symbol_from_source_enables_stablecoin_fallback() {
        let src = MockSource::new(PriceSourceTag::TokenList).quote(
            "0xd",
            PriceQuote { symbol: Some("DAI".into()), decimals: Some(18), ..PriceQuote::default() },
        );
        let out = TokenBalanceEnricher::new(vec![Box::new(src)]).enrich(vec![balance("0xd", 1)]);
        assert_eq!(out[0].price, Decimal::ONE);
    }

    #[test]
    fn enrich_transfers_preserves_transfer_fields() {
        let src = MockSource::new(PriceSourceTag::Explorer).quote("0xt", PriceQuote::priced(dec!(2)));
        let t = TransferTokenBalance {
            balance: balance("0xt", 3),
            transaction_hash: "0xh".into(),
            is_outgoing: true,
            invocation_method: Some("swap".into()),
        };
        let out = TokenBalanceEnricher::new(vec![Box::new(src)]).enrich_transfers(vec![t]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].balance.price, dec!(2));
        assert_eq!(out[0].transaction_hash, "0xh");
        assert!(out[0].is_outgoing);
        assert_eq!(out[0].invocation_method.as_deref(), Some("swap"));
    }

    // --- finalize ---

    #[test]
    fn finalize_sorts_by_value_and_dedups() {
        let out = finalize_balances(vec![
            priced("A", dec!(1), 10),
            priced("A", dec!(1), 10),
            priced("B", dec!(5), 1),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out.iter().filter(|b| b.symbol.as_deref() == Some("A")).count(), 1);
        assert_eq!(out[0].total_amount_price(), dec!(10));
        assert_eq!(out[1].symbol.as_deref(), Some("B"));
        assert_eq!(out[1].total_amount_price(), dec!(5));
    }

    #[test]
    fn finalize_drops_worthless() {
        let out = finalize_balances(vec![priced("A", Decimal::ZERO, 10), priced("B", dec!(1), 0)]);
        assert!(out.is_empty());
    }

    #[test]
    fn finalize_drops_priced_balance_without_decimals() {
        let mut unknown = priced("X", dec!(1), 5_000_000);
        unknown.decimals = None;
        let out = finalize_balances(vec![unknown, priced("Y", dec!(1), 2)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol.as_deref(), Some("Y"));
    }

    #[test]
    fn finalize_orders_saturated_values_without_panicking() {
        let mut a = TokenBalance::new("0xa", 1, BigUint::from(10u32).pow(27));
        a.decimals = Some(0);
        a.price = dec!(100);
        let mut b = TokenBalance::new("0xb", 1, BigUint::from(10u32).pow(30));
        b.decimals = Some(0);
        b.price = dec!(100);
        let out = finalize_balances(vec![a, b]);
        // both saturate to the same value; the raw balance breaks the tie
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].contract_id, "0xb");
        assert_eq!(out[0].total_amount_price(), Decimal::MAX);
    }

    #[test]
    fn finalize_tie_breaks_on_raw_balance_then_contract() {
        let mut x = priced("X", dec!(2), 5);
        x.contract_id = "0xb".into();
        let mut y = priced("Y", dec!(1), 10);
        y.contract_id = "0xa".into();
        let out = finalize_balances(vec![x, y]);
        // Equal value 10: larger raw balance first.
        assert_eq!(out[0].symbol.as_deref(), Some("Y"));
    }

    #[test]
    fn finalize_transfers_dedups_by_hash() {
        let mk = |hash: &str, price: Decimal| TransferTokenBalance {
            balance: priced("T", price, 1),
            transaction_hash: hash.into(),
            is_outgoing: false,
            invocation_method: None,
        };
        let out = finalize_transfer_balances(
            vec![mk("0x1", dec!(3)), mk("0X1", dec!(2)), mk("0x2", dec!(1)), mk("0x3", Decimal::ZERO)],
            false,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].balance.price, dec!(3));

        let with_zero = finalize_transfer_balances(vec![mk("0x3", Decimal::ZERO)], true);
        assert_eq!(with_zero.len(), 1);
    }
}
