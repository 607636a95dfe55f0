//! Per-model scoring profiles.
//!
//! Every [`ScoringCalculationModel`] maps to a [`Profile`]: a weight and a
//! step table per category, an optional USD turnover table, and the NFT
//! composite. Profiles are plain data built once on first use.
//!
//! Weights are percentages. Across the eight top-level categories they sum
//! to 100 for every profile, and the three NFT component weights sum to 100
//! within the composite.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use nomis_core::ScoringCalculationModel;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::categories::{Category, NftComponent};
use crate::step::{Step, StepTable};

// ---------------------------------------------------------------------------
// Step tables
// ---------------------------------------------------------------------------

/// USD balance, general purpose.
pub const BALANCE_USD: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(10), dec!(5)),
    Step::new(dec!(100), dec!(15)),
    Step::new(dec!(500), dec!(30)),
    Step::new(dec!(1000), dec!(45)),
    Step::new(dec!(5000), dec!(60)),
    Step::new(dec!(10000), dec!(75)),
    Step::new(dec!(50000), dec!(90)),
]);

/// USD balance for rollups, where wallets are typically smaller.
pub const BALANCE_USD_L2: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(5), dec!(10)),
    Step::new(dec!(50), dec!(25)),
    Step::new(dec!(100), dec!(40)),
    Step::new(dec!(500), dec!(55)),
    Step::new(dec!(1000), dec!(70)),
    Step::new(dec!(5000), dec!(85)),
]);

pub const TURNOVER_USD: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(100), dec!(10)),
    Step::new(dec!(1000), dec!(25)),
    Step::new(dec!(10000), dec!(45)),
    Step::new(dec!(50000), dec!(65)),
    Step::new(dec!(100000), dec!(80)),
    Step::new(dec!(500000), dec!(90)),
]);

pub const TURNOVER_USD_L2: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(50), dec!(10)),
    Step::new(dec!(500), dec!(30)),
    Step::new(dec!(2500), dec!(50)),
    Step::new(dec!(10000), dec!(70)),
    Step::new(dec!(50000), dec!(85)),
]);

/// Turnover in native units of an ETH-priced chain.
pub const TURNOVER_NATIVE: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(0.1), dec!(10)),
    Step::new(dec!(1), dec!(25)),
    Step::new(dec!(10), dec!(45)),
    Step::new(dec!(50), dec!(65)),
    Step::new(dec!(100), dec!(80)),
    Step::new(dec!(500), dec!(90)),
]);

/// Turnover in native units of a low-priced native token (HBAR, MATIC).
pub const TURNOVER_NATIVE_LOW_PRICE: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(10), dec!(10)),
    Step::new(dec!(100), dec!(25)),
    Step::new(dec!(1000), dec!(45)),
    Step::new(dec!(10000), dec!(65)),
    Step::new(dec!(50000), dec!(80)),
    Step::new(dec!(100000), dec!(90)),
]);

/// Wallet age in months.
pub const WALLET_AGE: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(1), dec!(10)),
    Step::new(dec!(3), dec!(20)),
    Step::new(dec!(6), dec!(35)),
    Step::new(dec!(12), dec!(55)),
    Step::new(dec!(24), dec!(75)),
    Step::new(dec!(36), dec!(90)),
]);

/// Wallet age in months for chains launched recently.
pub const WALLET_AGE_YOUNG_CHAIN: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(1), dec!(20)),
    Step::new(dec!(3), dec!(45)),
    Step::new(dec!(6), dec!(65)),
    Step::new(dec!(9), dec!(80)),
    Step::new(dec!(12), dec!(90)),
]);

pub const TRANSACTIONS: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(5), dec!(10)),
    Step::new(dec!(20), dec!(25)),
    Step::new(dec!(50), dec!(40)),
    Step::new(dec!(100), dec!(55)),
    Step::new(dec!(250), dec!(70)),
    Step::new(dec!(500), dec!(85)),
]);

/// Transactions in the last month.
pub const RECENT_ACTIVITY: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(1), dec!(30)),
    Step::new(dec!(3), dec!(50)),
    Step::new(dec!(5), dec!(65)),
    Step::new(dec!(10), dec!(80)),
    Step::new(dec!(20), dec!(90)),
]);

pub const DEPLOYED_CONTRACTS: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(1), dec!(50)),
    Step::new(dec!(3), dec!(70)),
    Step::new(dec!(5), dec!(85)),
    Step::new(dec!(10), dec!(95)),
]);

pub const TOKENS_HOLDING: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(1), dec!(20)),
    Step::new(dec!(3), dec!(40)),
    Step::new(dec!(5), dec!(60)),
    Step::new(dec!(10), dec!(80)),
    Step::new(dec!(20), dec!(90)),
]);

pub const NFT_HOLDING: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(1), dec!(30)),
    Step::new(dec!(3), dec!(50)),
    Step::new(dec!(5), dec!(65)),
    Step::new(dec!(10), dec!(80)),
    Step::new(dec!(25), dec!(90)),
]);

pub const NFT_TRADING: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(1), dec!(25)),
    Step::new(dec!(5), dec!(45)),
    Step::new(dec!(10), dec!(60)),
    Step::new(dec!(25), dec!(75)),
    Step::new(dec!(50), dec!(90)),
]);

/// USD paid for currently held NFTs.
pub const NFT_WORTH_USD: StepTable = StepTable(&[
    Step::new(dec!(0), dec!(0)),
    Step::new(dec!(50), dec!(20)),
    Step::new(dec!(250), dec!(40)),
    Step::new(dec!(1000), dec!(60)),
    Step::new(dec!(5000), dec!(80)),
    Step::new(dec!(20000), dec!(90)),
]);

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A weight (percent) and the table it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub weight: Decimal,
    pub table: StepTable,
}

impl Rule {
    pub const fn new(weight: Decimal, table: StepTable) -> Self {
        Self { weight, table }
    }
}

/// Scoring data for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub model: ScoringCalculationModel,
    /// Tabular categories. Every entry of [`Category::TABULAR`] is present.
    rules: BTreeMap<Category, Rule>,
    /// Used for `Turnover` when the stats carry a USD turnover.
    turnover_usd: Option<StepTable>,
    /// Overall weight of the NFT composite.
    nft_weight: Decimal,
    /// Component weights sum to 100 within the composite.
    nft: BTreeMap<NftComponent, Rule>,
}

impl Profile {
    /// A profile with the general-purpose tables and every weight at zero.
    fn base(model: ScoringCalculationModel) -> Self {
        let rules = BTreeMap::from([
            (Category::Balance, Rule::new(Decimal::ZERO, BALANCE_USD)),
            (Category::Turnover, Rule::new(Decimal::ZERO, TURNOVER_NATIVE)),
            (Category::WalletAge, Rule::new(Decimal::ZERO, WALLET_AGE)),
            (Category::Transactions, Rule::new(Decimal::ZERO, TRANSACTIONS)),
            (Category::RecentActivity, Rule::new(Decimal::ZERO, RECENT_ACTIVITY)),
            (Category::DeployedContracts, Rule::new(Decimal::ZERO, DEPLOYED_CONTRACTS)),
            (Category::TokensHolding, Rule::new(Decimal::ZERO, TOKENS_HOLDING)),
        ]);
        let nft = BTreeMap::from([
            (NftComponent::Holding, Rule::new(dec!(40), NFT_HOLDING)),
            (NftComponent::Trading, Rule::new(dec!(30), NFT_TRADING)),
            (NftComponent::Worth, Rule::new(dec!(30), NFT_WORTH_USD)),
        ]);
        Self {
            model,
            rules,
            turnover_usd: Some(TURNOVER_USD),
            nft_weight: Decimal::ZERO,
            nft,
        }
    }

    /// Weights in [`Category::ALL`] order: balance, turnover, wallet age,
    /// transactions, recent activity, deployed contracts, tokens, nft.
    fn weights(mut self, weights: [u32; 8]) -> Self {
        for (category, weight) in Category::ALL.into_iter().zip(weights) {
            let weight = Decimal::from(weight);
            match self.rules.get_mut(&category) {
                Some(rule) => rule.weight = weight,
                None => self.nft_weight = weight,
            }
        }
        self
    }

    fn table(mut self, category: Category, table: StepTable) -> Self {
        if let Some(rule) = self.rules.get_mut(&category) {
            rule.table = table;
        }
        self
    }

    fn turnover_usd_table(mut self, table: Option<StepTable>) -> Self {
        self.turnover_usd = table;
        self
    }

    /// NFT component weights: holding, trading, worth.
    fn nft_split(mut self, weights: [u32; 3]) -> Self {
        for (component, weight) in NftComponent::ALL.into_iter().zip(weights) {
            if let Some(rule) = self.nft.get_mut(&component) {
                rule.weight = Decimal::from(weight);
            }
        }
        self
    }

    /// Rule of a tabular category; `None` for [`Category::Nft`].
    pub fn rule(&self, category: Category) -> Option<&Rule> {
        self.rules.get(&category)
    }

    pub fn nft_rule(&self, component: NftComponent) -> Option<&Rule> {
        self.nft.get(&component)
    }

    pub fn turnover_usd(&self) -> Option<StepTable> {
        self.turnover_usd
    }

    /// Weight (percent) of a top-level category.
    pub fn weight(&self, category: Category) -> Decimal {
        match category {
            Category::Nft => self.nft_weight,
            other => self.rules.get(&other).map_or(Decimal::ZERO, |r| r.weight),
        }
    }

    pub fn total_weight(&self) -> Decimal {
        Category::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    pub fn nft_total_weight(&self) -> Decimal {
        self.nft.values().map(|r| r.weight).sum()
    }

    /// Every step table the profile can evaluate.
    pub fn tables(&self) -> Vec<StepTable> {
        self.rules
            .values()
            .map(|r| r.table)
            .chain(self.turnover_usd)
            .chain(self.nft.values().map(|r| r.table))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

fn build(model: ScoringCalculationModel) -> Profile {
    use ScoringCalculationModel as M;

    let p = Profile::base(model);
    match model {
        M::CommonV1 => p.weights([20, 20, 15, 15, 10, 5, 10, 5]),
        M::CommonV2 => p.weights([25, 20, 15, 10, 10, 5, 10, 5]),
        M::CommonV3 => p.weights([25, 25, 15, 10, 10, 5, 5, 5]),
        M::Symbiosis => p.weights([20, 30, 10, 15, 15, 0, 10, 0]),
        M::Xdefi => p.weights([25, 20, 15, 15, 10, 0, 15, 0]),
        M::Halo => p.weights([20, 20, 20, 15, 10, 5, 10, 0]),
        M::Rubic => p.weights([20, 35, 10, 15, 10, 0, 10, 0]),
        M::Hedera => p
            .weights([30, 25, 20, 15, 10, 0, 0, 0])
            .table(Category::Turnover, TURNOVER_NATIVE_LOW_PRICE)
            .turnover_usd_table(None),
        M::CyberConnect => p.weights([15, 15, 20, 15, 15, 0, 5, 15]).nft_split([50, 25, 25]),
        M::Hyperlane => p.weights([20, 25, 15, 15, 15, 5, 5, 0]),
        M::ZkSync => p
            .weights([20, 20, 15, 15, 15, 5, 5, 5])
            .table(Category::Balance, BALANCE_USD_L2)
            .turnover_usd_table(Some(TURNOVER_USD_L2)),
        M::Scroll => p
            .weights([15, 20, 15, 20, 15, 5, 5, 5])
            .table(Category::Balance, BALANCE_USD_L2)
            .table(Category::WalletAge, WALLET_AGE_YOUNG_CHAIN)
            .turnover_usd_table(Some(TURNOVER_USD_L2)),
        M::Linea => p
            .weights([20, 20, 10, 20, 15, 5, 5, 5])
            .table(Category::Balance, BALANCE_USD_L2)
            .table(Category::WalletAge, WALLET_AGE_YOUNG_CHAIN)
            .turnover_usd_table(Some(TURNOVER_USD_L2)),
        M::Mode => p
            .weights([20, 25, 10, 15, 15, 5, 5, 5])
            .table(Category::Balance, BALANCE_USD_L2)
            .table(Category::WalletAge, WALLET_AGE_YOUNG_CHAIN)
            .turnover_usd_table(Some(TURNOVER_USD_L2)),
        M::Zora => p
            .weights([10, 10, 15, 10, 10, 5, 5, 35])
            .table(Category::Balance, BALANCE_USD_L2)
            .table(Category::WalletAge, WALLET_AGE_YOUNG_CHAIN)
            .nft_split([30, 40, 30]),
        M::Kroma => p
            .weights([20, 20, 15, 15, 15, 10, 5, 0])
            .table(Category::Balance, BALANCE_USD_L2)
            .table(Category::WalletAge, WALLET_AGE_YOUNG_CHAIN)
            .turnover_usd_table(Some(TURNOVER_USD_L2)),
        M::ZetaChain => p
            .weights([20, 25, 15, 15, 15, 0, 10, 0])
            .table(Category::WalletAge, WALLET_AGE_YOUNG_CHAIN),
        M::Taiko => p
            .weights([15, 20, 15, 20, 15, 10, 5, 0])
            .table(Category::Balance, BALANCE_USD_L2)
            .table(Category::WalletAge, WALLET_AGE_YOUNG_CHAIN)
            .turnover_usd_table(Some(TURNOVER_USD_L2)),
        M::Polygon => p
            .weights([20, 20, 15, 15, 10, 5, 10, 5])
            .table(Category::Turnover, TURNOVER_NATIVE_LOW_PRICE),
        M::Base => p
            .weights([20, 20, 10, 15, 15, 5, 5, 10])
            .table(Category::Balance, BALANCE_USD_L2)
            .turnover_usd_table(Some(TURNOVER_USD_L2)),
    }
}

static PROFILES: LazyLock<HashMap<ScoringCalculationModel, Profile>> = LazyLock::new(|| {
    ScoringCalculationModel::ALL
        .into_iter()
        .map(|m| (m, build(m)))
        .collect()
});

static DEFAULT_PROFILE: LazyLock<Profile> = LazyLock::new(|| build(ScoringCalculationModel::default()));

/// Profile of `model`, falling back to the default model's profile.
pub fn profile(model: ScoringCalculationModel) -> &'static Profile {
    PROFILES.get(&model).unwrap_or(&DEFAULT_PROFILE)
}

/// Every profile, in model id order.
pub fn all_profiles() -> Vec<&'static Profile> {
    ScoringCalculationModel::ALL.iter().map(|m| profile(*m)).collect()
}
