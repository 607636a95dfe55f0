//! Request orchestration.
//!
//! [`ScoringService::score_wallet`] validates the request, consults the stats
//! cache, loads historical snapshots, assembles and caches the stats, scores
//! them, and records a new snapshot. Cached stats are shared by every model;
//! their historical median is recomputed per model on each cache hit.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use nomis_core::error::NomisError;
use nomis_core::traits::{CacheKey, ScoreCalculator, SnapshotStore, StatsCache};
use nomis_core::types::WalletActivity;
use nomis_core::{ScoringCalculationModel, WalletStats};
use nomis_scoring::{CategoryScore, ScoringEngine};
use nomis_stats::{StatsAssembler, StatsRequest, TokenBalanceEnricher, validate_address};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;

/// Per-request switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Neither read nor write the stats cache.
    pub disable_cache: bool,
}

/// Outcome of one scoring request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredWallet {
    pub stats: WalletStats,
    pub score: Decimal,
    pub model: ScoringCalculationModel,
    pub breakdown: Vec<CategoryScore>,
    /// Stats came from the cache.
    pub cached: bool,
}

pub struct ScoringService {
    assembler: StatsAssembler,
    engine: ScoringEngine,
    cache: Arc<dyn StatsCache>,
    store: Arc<dyn SnapshotStore>,
    config: ServiceConfig,
}

impl ScoringService {
    pub fn new(
        config: ServiceConfig,
        enricher: TokenBalanceEnricher,
        cache: Arc<dyn StatsCache>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        let enricher = enricher.with_search_width_hours(config.stats.price_search_width_hours);
        Self {
            assembler: StatsAssembler::new(enricher, config.stats.clone()),
            engine: ScoringEngine::new(),
            cache,
            store,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Score one wallet. `model` defaults to the configured model.
    pub fn score_wallet(
        &self,
        activity: &WalletActivity,
        model: Option<ScoringCalculationModel>,
        now: DateTime<Utc>,
        options: RequestOptions,
    ) -> Result<ScoredWallet, NomisError> {
        validate_address(&activity.address)?;
        let model = model.unwrap_or(self.config.default_model);
        let use_cache = !(self.config.disable_cache || options.disable_cache);
        let key = CacheKey::new(&activity.address, activity.chain_id);

        if use_cache {
            if let Some(mut stats) = self.cache.get(&key) {
                // The cache is keyed without the model but snapshots are not,
                // so the median is always taken from this model's history.
                let snapshots = self.load_snapshots(activity, model, now);
                stats.historical_median_balance_usd = self.assembler.historical_median(&stats, &snapshots);
                let scored = self.finish(stats, model, true);
                info!(key = %key, model = %model, score = %scored.score, "service: scored from cache");
                return Ok(scored);
            }
        }

        let snapshots = self.load_snapshots(activity, model, now);
        let request = StatsRequest::new(activity, now)
            .with_counterparties(&self.config.counterparties)
            .with_snapshots(&snapshots);
        let stats = self.assembler.assemble(&request)?;

        if use_cache {
            self.cache.set(key.clone(), stats.clone(), self.config.cache_ttl());
        }

        let scored = self.finish(stats, model, false);
        if !scored.stats.no_data {
            self.save_snapshot(&scored.stats, model, now);
        }

        info!(
            key = %key,
            model = %model,
            score = %scored.score,
            no_data = scored.stats.no_data,
            snapshots = snapshots.len(),
            "service: wallet scored"
        );
        Ok(scored)
    }

    fn finish(&self, stats: WalletStats, model: ScoringCalculationModel, cached: bool) -> ScoredWallet {
        let score = self.engine.score(&stats, model);
        let breakdown = self.engine.category_scores(&stats, model);
        ScoredWallet {
            stats,
            score,
            model,
            breakdown,
            cached,
        }
    }

    /// Decoded past snapshots, newest first. Store failures and undecodable
    /// blobs degrade to fewer snapshots.
    fn load_snapshots(
        &self,
        activity: &WalletActivity,
        model: ScoringCalculationModel,
        now: DateTime<Utc>,
    ) -> Vec<WalletStats> {
        let historical = &self.config.stats.historical;
        if !historical.enabled {
            return Vec::new();
        }

        let since = TimeDelta::try_days(historical.lookback_days)
            .and_then(|d| now.checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let blobs = match self.store.fetch(&activity.address, activity.chain_id, model, since) {
            Ok(blobs) => blobs,
            Err(e) => {
                warn!(wallet = %activity.address, error = %e, "service: snapshot fetch failed");
                return Vec::new();
            }
        };

        let fetched = blobs.len();
        let snapshots: Vec<WalletStats> = blobs
            .iter()
            .filter_map(|json| match WalletStats::from_snapshot_json(json) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!(wallet = %activity.address, error = %e, "service: dropping undecodable snapshot");
                    None
                }
            })
            .collect();
        debug!(wallet = %activity.address, fetched, decoded = snapshots.len(), "service: snapshots loaded");
        snapshots
    }

    fn save_snapshot(&self, stats: &WalletStats, model: ScoringCalculationModel, now: DateTime<Utc>) {
        let result = stats
            .to_snapshot_json()
            .and_then(|json| self.store.save(&stats.address, stats.chain_id, model, json, now));
        if let Err(e) = result {
            warn!(wallet = %stats.address, error = %e, "service: snapshot save failed");
        }
    }
}
