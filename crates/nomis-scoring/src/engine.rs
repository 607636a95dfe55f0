//! Scoring engine implementing the [`ScoreCalculator`] trait.
//!
//! Every category is evaluated independently against its profile table,
//! including zero-weight ones, and the results are combined as
//! `Σ raw / 100 × weight / 100`. The NFT composite is the weighted mix of its
//! components, scaled by the NFT category weight.

use nomis_core::constants::{MAX_CATEGORY_SCORE, TOTAL_WEIGHT_PERCENT};
use nomis_core::traits::ScoreCalculator;
use nomis_core::{ScoringCalculationModel, WalletStats};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::categories::{Category, NftComponent};
use crate::profiles::{Profile, profile};

/// One line of a score breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    /// Step-table score in `[0, 100]`.
    pub raw: Decimal,
    /// Category weight in percent.
    pub weight: Decimal,
    /// Contribution to the final score, in `[0, 1]`.
    pub weighted: Decimal,
}

/// The production score calculator backed by the profile tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Raw score of one category under `model`, in `[0, 100]`.
    pub fn raw_score(&self, stats: &WalletStats, model: ScoringCalculationModel, category: Category) -> Decimal {
        let profile = profile(model);
        match category {
            Category::Nft => nft_composite(profile, stats),
            Category::Turnover => turnover_score(profile, stats),
            other => profile
                .rule(other)
                .map_or(Decimal::ZERO, |r| r.table.evaluate(other.metric(stats))),
        }
    }

    /// Raw score of one NFT component, before the composite weighting.
    pub fn nft_component_score(&self, stats: &WalletStats, model: ScoringCalculationModel, component: NftComponent) -> Decimal {
        profile(model)
            .nft_rule(component)
            .map_or(Decimal::ZERO, |r| r.table.evaluate(component.metric(stats)))
    }

    /// Per-category breakdown. Weighted values sum to [`score`](ScoreCalculator::score)
    /// for stats that carry data.
    pub fn category_scores(&self, stats: &WalletStats, model: ScoringCalculationModel) -> Vec<CategoryScore> {
        let profile = profile(model);
        Category::ALL
            .iter()
            .map(|&category| {
                let raw = self.raw_score(stats, model, category);
                let weight = profile.weight(category);
                CategoryScore {
                    category,
                    raw,
                    weight,
                    weighted: raw / MAX_CATEGORY_SCORE * weight / TOTAL_WEIGHT_PERCENT,
                }
            })
            .collect()
    }
}

fn turnover_score(profile: &Profile, stats: &WalletStats) -> Decimal {
    match (profile.turnover_usd(), stats.turnover_usd) {
        (Some(table), Some(usd)) => table.evaluate(usd),
        _ => profile
            .rule(Category::Turnover)
            .map_or(Decimal::ZERO, |r| r.table.evaluate(stats.turnover)),
    }
}

fn nft_composite(profile: &Profile, stats: &WalletStats) -> Decimal {
    NftComponent::ALL
        .iter()
        .filter_map(|&c| {
            profile
                .nft_rule(c)
                .map(|r| r.table.evaluate(c.metric(stats)) * r.weight / TOTAL_WEIGHT_PERCENT)
        })
        .sum()
}

impl ScoreCalculator for ScoringEngine {
    fn score(&self, stats: &WalletStats, model: ScoringCalculationModel) -> Decimal {
        if stats.no_data {
            return Decimal::ZERO;
        }

        let total: Decimal = self
            .category_scores(stats, model)
            .iter()
            .map(|c| c.weighted)
            .sum();
        let score = total.clamp(Decimal::ZERO, Decimal::ONE);

        debug!(wallet = %stats.address, model = %model, score = %score, "score: computed");
        score
    }
}
