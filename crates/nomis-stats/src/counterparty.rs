//! Counterparty reconciliation.
//!
//! Attributes a wallet's transactions and transfers to tracked protocol
//! contracts. Per counterparty:
//!
//! 1. select successful, non-`approve*` transactions sent to (or deploying)
//!    the contract, filtered by the method allow-list;
//! 2. match ERC-20 transfers by contract or by a shared transaction hash.
//!    Mints are ignored. A transfer whose parent transaction fails the
//!    filters is dropped together with its hash; a transfer whose parent
//!    qualifies pulls that parent into the transaction set;
//! 3. match NFT transfers the same way against the hash set left by step 2.
//!
//! Step 3 sees hashes added by step 2 but not the reverse. That ordering is
//! part of the contract and must be kept.

use std::collections::{BTreeSet, HashMap, HashSet};

use nomis_core::types::{
    CounterpartyConfig, Erc20Transfer, ExtendedCounterpartyData, InternalTransaction, NftTransfer,
    TokenBalance, Transaction, TransferTokenBalance, is_zero_address, method_has_prefix,
    opt_same_address, same_address,
};
use nomis_core::units::saturating_sum;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::CounterpartyOptions;
use crate::enricher::TokenBalanceEnricher;

/// Raw lists for one wallet, borrowed for the duration of a reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct CounterpartyInput<'a> {
    pub wallet: &'a str,
    pub chain_id: u64,
    pub transactions: &'a [Transaction],
    pub internal_transactions: &'a [InternalTransaction],
    pub erc20_transfers: &'a [Erc20Transfer],
    pub nft_transfers: &'a [NftTransfer],
    pub native_decimals: u32,
    pub native_usd_price: Decimal,
}

/// Result of a reconciliation: per-counterparty data plus the union of
/// everything matched, in original list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub counterparties: Vec<ExtendedCounterpartyData>,
    pub transactions: Vec<Transaction>,
    pub internal_transactions: Vec<InternalTransaction>,
    pub erc20_transfers: Vec<Erc20Transfer>,
    pub nft_transfers: Vec<NftTransfer>,
}

impl Reconciliation {
    /// Total USD turnover across all counterparties.
    pub fn turnover_usd(&self) -> Decimal {
        saturating_sum(self.counterparties.iter().filter_map(|c| c.turnover_usd))
    }
}

/// Indices matched for one counterparty.
#[derive(Debug, Default)]
struct Matched {
    transactions: BTreeSet<usize>,
    internal: BTreeSet<usize>,
    erc20: BTreeSet<usize>,
    nft: BTreeSet<usize>,
    hashes: BTreeSet<String>,
}

/// Matches wallet activity against counterparty contracts.
pub struct CounterpartyReconciler<'e> {
    enricher: &'e TokenBalanceEnricher,
    options: CounterpartyOptions,
}

impl<'e> CounterpartyReconciler<'e> {
    pub fn new(enricher: &'e TokenBalanceEnricher, options: CounterpartyOptions) -> Self {
        Self { enricher, options }
    }

    /// Reconcile `input` against `configs` (or against every destination when
    /// `use_all_counterparties` is set).
    pub fn reconcile(&self, configs: &[CounterpartyConfig], input: &CounterpartyInput<'_>) -> Reconciliation {
        let configs = if self.options.use_all_counterparties {
            synthesize_counterparties(input.wallet, input.transactions)
        } else {
            configs.to_vec()
        };

        let parents = parent_index(input.transactions);
        let mut per_counterparty: Vec<(CounterpartyConfig, Matched)> = Vec::with_capacity(configs.len());

        for config in configs {
            let Some(contract) = config
                .contract_address
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
            else {
                debug!(counterparty = %config.name, "counterparty: no contract address, skipping");
                continue;
            };

            let allow: &[String] = if config.allowed_method_prefixes.is_empty() {
                &self.options.method_allow_list
            } else {
                &config.allowed_method_prefixes
            };

            let matched = match_counterparty(&config, &contract, allow, input, &parents);
            debug!(
                counterparty = %config.name,
                transactions = matched.transactions.len(),
                erc20 = matched.erc20.len(),
                nft = matched.nft.len(),
                "counterparty: matched"
            );
            per_counterparty.push((config, matched));
        }

        let transfer_usd = self.price_outgoing_transfers(&per_counterparty, input, &parents);

        let mut union = Matched::default();
        let mut counterparties = Vec::with_capacity(per_counterparty.len());
        for (config, matched) in per_counterparty {
            let native_usd = saturating_sum(matched.transactions.iter().map(|&i| {
                input.transactions[i]
                    .native_value(input.native_decimals)
                    .saturating_mul(input.native_usd_price)
            }));
            let erc20_usd = saturating_sum(matched.erc20.iter().filter_map(|i| transfer_usd.get(i)).copied());

            counterparties.push(ExtendedCounterpartyData {
                transaction_count: Some(matched.transactions.len() as u32),
                internal_transaction_count: Some(matched.internal.len() as u32),
                transfer_count: Some(matched.erc20.len() as u32),
                nft_transfer_count: Some(matched.nft.len() as u32),
                transaction_hashes: Some(matched.hashes.iter().cloned().collect()),
                turnover_usd: Some(native_usd.saturating_add(erc20_usd)),
                config,
            });

            union.transactions.extend(matched.transactions);
            union.internal.extend(matched.internal);
            union.erc20.extend(matched.erc20);
            union.nft.extend(matched.nft);
        }

        Reconciliation {
            counterparties,
            transactions: pick(input.transactions, &union.transactions),
            internal_transactions: pick(input.internal_transactions, &union.internal),
            erc20_transfers: pick(input.erc20_transfers, &union.erc20),
            nft_transfers: pick(input.nft_transfers, &union.nft),
        }
    }

    /// USD value of every matched outgoing ERC-20 transfer, keyed by list index.
    ///
    /// Prices go through the same fallback chain as wallet balances.
    fn price_outgoing_transfers(
        &self,
        per_counterparty: &[(CounterpartyConfig, Matched)],
        input: &CounterpartyInput<'_>,
        parents: &HashMap<String, usize>,
    ) -> HashMap<usize, Decimal> {
        let outgoing: BTreeSet<usize> = per_counterparty
            .iter()
            .flat_map(|(_, m)| m.erc20.iter().copied())
            .filter(|&i| same_address(&input.erc20_transfers[i].from, input.wallet))
            .collect();
        if outgoing.is_empty() {
            return HashMap::new();
        }

        let indices: Vec<usize> = outgoing.into_iter().collect();
        let balances: Vec<TransferTokenBalance> = indices
            .iter()
            .map(|&i| {
                let t = &input.erc20_transfers[i];
                TransferTokenBalance {
                    balance: TokenBalance {
                        decimals: t.token_decimals,
                        symbol: t.token_symbol.clone(),
                        name: t.token_name.clone(),
                        ..TokenBalance::new(t.contract_address.clone(), input.chain_id, t.value.clone())
                    },
                    transaction_hash: t.hash.clone(),
                    is_outgoing: true,
                    invocation_method: parents
                        .get(&t.hash.to_ascii_lowercase())
                        .and_then(|&p| input.transactions[p].method_name.clone()),
                }
            })
            .collect();

        self.enricher
            .enrich_transfers(balances)
            .into_iter()
            .zip(indices)
            .filter(|(t, _)| t.balance.is_priced())
            .map(|(t, i)| (i, t.balance.total_amount_price()))
            .collect()
    }
}

/// One synthesized counterparty per distinct destination or deployed contract.
pub fn synthesize_counterparties(wallet: &str, transactions: &[Transaction]) -> Vec<CounterpartyConfig> {
    let mut seen = HashSet::new();
    let mut configs = Vec::new();
    for tx in transactions {
        for address in [tx.to.as_deref(), tx.contract_address.as_deref()].into_iter().flatten() {
            let key = address.to_ascii_lowercase();
            if key.is_empty() || same_address(&key, wallet) || !seen.insert(key.clone()) {
                continue;
            }
            configs.push(CounterpartyConfig::new(key.clone(), key));
        }
    }
    configs
}

/// First index of each transaction hash (lowercased).
fn parent_index(transactions: &[Transaction]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(transactions.len());
    for (i, tx) in transactions.iter().enumerate() {
        index.entry(tx.hash.to_ascii_lowercase()).or_insert(i);
    }
    index
}

fn method_allowed(method: Option<&str>, allow: &[String]) -> bool {
    match method {
        None => true,
        Some(_) if allow.is_empty() => true,
        Some(m) => allow.iter().any(|p| method_has_prefix(m, p)),
    }
}

fn qualifies(tx: &Transaction, allow: &[String]) -> bool {
    !tx.is_error && !tx.is_approval() && method_allowed(tx.method_name.as_deref(), allow)
}

/// A matched transfer, viewed uniformly for ERC-20 and NFT lists.
trait TransferLike {
    fn hash(&self) -> &str;
    fn from(&self) -> &str;
    fn to(&self) -> &str;
    fn contract(&self) -> &str;
}

impl TransferLike for Erc20Transfer {
    fn hash(&self) -> &str {
        &self.hash
    }
    fn from(&self) -> &str {
        &self.from
    }
    fn to(&self) -> &str {
        &self.to
    }
    fn contract(&self) -> &str {
        &self.contract_address
    }
}

impl TransferLike for NftTransfer {
    fn hash(&self) -> &str {
        &self.hash
    }
    fn from(&self) -> &str {
        &self.from
    }
    fn to(&self) -> &str {
        &self.to
    }
    fn contract(&self) -> &str {
        &self.contract_address
    }
}

/// Match one transfer list against `contract`, updating the hash and
/// transaction sets in place. Returns the matched transfer indices.
fn match_transfers<T: TransferLike>(
    transfers: &[T],
    contract: &str,
    allow: &[String],
    transactions: &[Transaction],
    parents: &HashMap<String, usize>,
    matched: &mut Matched,
) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    for (i, t) in transfers.iter().enumerate() {
        if is_zero_address(t.from()) {
            continue;
        }

        let hash = t.hash().to_ascii_lowercase();
        let direct = same_address(t.contract(), contract)
            || same_address(t.to(), contract)
            || same_address(t.from(), contract);
        if !direct && !matched.hashes.contains(&hash) {
            continue;
        }

        if let Some(&parent) = parents.get(&hash) {
            if !qualifies(&transactions[parent], allow) {
                matched.hashes.remove(&hash);
                continue;
            }
            if matched.transactions.insert(parent) {
                debug!(hash = %hash, "counterparty: parent transaction promoted by transfer");
            }
        }

        matched.hashes.insert(hash);
        out.insert(i);
    }
    out
}

fn match_counterparty(
    config: &CounterpartyConfig,
    contract: &str,
    allow: &[String],
    input: &CounterpartyInput<'_>,
    parents: &HashMap<String, usize>,
) -> Matched {
    let mut matched = Matched::default();

    for (i, tx) in input.transactions.iter().enumerate() {
        let targets = opt_same_address(tx.to.as_deref(), contract)
            || opt_same_address(tx.contract_address.as_deref(), contract);
        if targets && qualifies(tx, allow) {
            matched.transactions.insert(i);
            matched.hashes.insert(tx.hash.to_ascii_lowercase());
        }
    }

    matched.erc20 = match_transfers(
        input.erc20_transfers,
        contract,
        allow,
        input.transactions,
        parents,
        &mut matched,
    );

    if config.flags.count_nft_transfers {
        matched.nft = match_transfers(
            input.nft_transfers,
            contract,
            allow,
            input.transactions,
            parents,
            &mut matched,
        );
    }

    if config.flags.count_internal_transactions {
        for (i, itx) in input.internal_transactions.iter().enumerate() {
            if itx.is_error {
                continue;
            }
            if matched.hashes.contains(&itx.hash.to_ascii_lowercase())
                || opt_same_address(itx.to.as_deref(), contract)
                || same_address(&itx.from, contract)
            {
                matched.internal.insert(i);
            }
        }
    }

    matched
}

fn pick<T: Clone>(items: &[T], indices: &BTreeSet<usize>) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}
