//! Scoring categories and the stats metric that drives each one.

use std::fmt;

use nomis_core::WalletStats;
use rust_decimal::Decimal;
use serde::Serialize;

/// A top-level stat category with its own weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Balance,
    Turnover,
    WalletAge,
    Transactions,
    RecentActivity,
    DeployedContracts,
    TokensHolding,
    /// Composite of [`NftComponent`]s.
    Nft,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::Balance,
        Self::Turnover,
        Self::WalletAge,
        Self::Transactions,
        Self::RecentActivity,
        Self::DeployedContracts,
        Self::TokensHolding,
        Self::Nft,
    ];

    /// Categories evaluated with a single step table.
    pub const TABULAR: [Category; 7] = [
        Self::Balance,
        Self::Turnover,
        Self::WalletAge,
        Self::Transactions,
        Self::RecentActivity,
        Self::DeployedContracts,
        Self::TokensHolding,
    ];

    /// The stats value a tabular category is evaluated on.
    ///
    /// `Turnover` yields the native-unit turnover; the USD variant is chosen
    /// by the engine. `Nft` has no single metric and yields zero.
    pub fn metric(&self, stats: &WalletStats) -> Decimal {
        match self {
            Self::Balance => stats.scoring_balance_usd(),
            Self::Turnover => stats.turnover,
            Self::WalletAge => Decimal::from(stats.wallet_age_months),
            Self::Transactions => Decimal::from(stats.total_transactions),
            Self::RecentActivity => Decimal::from(stats.last_month_transactions),
            Self::DeployedContracts => Decimal::from(stats.deployed_contracts),
            Self::TokensHolding => Decimal::from(stats.tokens_holding),
            Self::Nft => Decimal::ZERO,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Turnover => "turnover",
            Self::WalletAge => "wallet-age",
            Self::Transactions => "transactions",
            Self::RecentActivity => "recent-activity",
            Self::DeployedContracts => "deployed-contracts",
            Self::TokensHolding => "tokens-holding",
            Self::Nft => "nft",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A part of the NFT composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NftComponent {
    Holding,
    Trading,
    Worth,
}

impl NftComponent {
    pub const ALL: [NftComponent; 3] = [Self::Holding, Self::Trading, Self::Worth];

    pub fn metric(&self, stats: &WalletStats) -> Decimal {
        match self {
            Self::Holding => Decimal::from(stats.nft_holding),
            Self::Trading => Decimal::from(stats.nft_trades),
            Self::Worth => stats.nft_worth_usd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn balance_prefers_positive_median() {
        let mut stats = WalletStats {
            native_balance_usd: dec!(100),
            hold_tokens_balance_usd: dec!(50),
            ..WalletStats::default()
        };
        assert_eq!(Category::Balance.metric(&stats), dec!(150));

        stats.historical_median_balance_usd = Some(dec!(80));
        assert_eq!(Category::Balance.metric(&stats), dec!(80));

        stats.historical_median_balance_usd = Some(Decimal::ZERO);
        assert_eq!(Category::Balance.metric(&stats), dec!(150));
    }

    #[test]
    fn counts_map_to_metrics() {
        let stats = WalletStats {
            wallet_age_months: 7,
            total_transactions: 40,
            last_month_transactions: 3,
            deployed_contracts: 2,
            tokens_holding: 9,
            nft_holding: 4,
            nft_trades: 6,
            nft_worth_usd: dec!(12.5),
            ..WalletStats::default()
        };
        assert_eq!(Category::WalletAge.metric(&stats), dec!(7));
        assert_eq!(Category::Transactions.metric(&stats), dec!(40));
        assert_eq!(Category::RecentActivity.metric(&stats), dec!(3));
        assert_eq!(Category::DeployedContracts.metric(&stats), dec!(2));
        assert_eq!(Category::TokensHolding.metric(&stats), dec!(9));
        assert_eq!(NftComponent::Holding.metric(&stats), dec!(4));
        assert_eq!(NftComponent::Trading.metric(&stats), dec!(6));
        assert_eq!(NftComponent::Worth.metric(&stats), dec!(12.5));
    }

    #[test]
    fn tabular_excludes_nft() {
        assert!(!Category::TABULAR.contains(&Category::Nft));
        assert_eq!(Category::ALL.len(), Category::TABULAR.len() + 1);
    }

    #[test]
    fn display_is_kebab_case() {
        assert_eq!(Category::WalletAge.to_string(), "wallet-age");
        assert_eq!(serde_json::to_string(&Category::DeployedContracts).unwrap(), "\"deployed-contracts\"");
    }
}
