//! Pipeline configuration.
//!
//! Provides [`StatsConfig`] with defaults for counterparty reconciliation,
//! historical median smoothing and price lookups. Deserializable so the
//! service layer can load it from a config file.

use nomis_core::constants::{
    DEFAULT_MEDIAN_LOOKBACK_DAYS, DEFAULT_MEDIAN_PRECISION, DEFAULT_PRICE_SEARCH_WIDTH_HOURS,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Counterparty reconciliation switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterpartyOptions {
    /// Synthesize one counterparty per distinct destination instead of using the configured list.
    pub use_all_counterparties: bool,
    /// Replace the wallet's lists with the matched subset for every downstream statistic.
    pub only_counterparties: bool,
    /// Method-name prefixes applied to counterparties that carry none of their own.
    pub method_allow_list: Vec<String>,
}

/// Historical median smoothing of the USD balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalMedianOptions {
    pub enabled: bool,
    /// Number of most recent snapshots to use; all when `None`.
    pub take_count: Option<usize>,
    /// Minimum USD distance between two kept samples.
    pub precision: Decimal,
    /// How far back snapshots are fetched.
    pub lookback_days: i64,
}

impl Default for HistoricalMedianOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            take_count: None,
            precision: DEFAULT_MEDIAN_PRECISION,
            lookback_days: DEFAULT_MEDIAN_LOOKBACK_DAYS,
        }
    }
}

/// Configuration for one stats assembler instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub counterparty: CounterpartyOptions,
    pub historical: HistoricalMedianOptions,
    /// Width of the price search window handed to price sources.
    pub price_search_width_hours: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            counterparty: CounterpartyOptions::default(),
            historical: HistoricalMedianOptions::default(),
            price_search_width_hours: DEFAULT_PRICE_SEARCH_WIDTH_HOURS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_median_with_unit_precision() {
        let cfg = StatsConfig::default();
        assert!(cfg.historical.enabled);
        assert_eq!(cfg.historical.precision, Decimal::ONE);
        assert_eq!(cfg.historical.take_count, None);
    }

    #[test]
    fn default_counterparty_mode_is_configured_list() {
        let cfg = StatsConfig::default();
        assert!(!cfg.counterparty.use_all_counterparties);
        assert!(!cfg.counterparty.only_counterparties);
        assert!(cfg.counterparty.method_allow_list.is_empty());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: StatsConfig =
            serde_json::from_str(r#"{"historical":{"take_count":5}}"#).unwrap();
        assert_eq!(cfg.historical.take_count, Some(5));
        assert!(cfg.historical.enabled);
        assert_eq!(cfg.price_search_width_hours, DEFAULT_PRICE_SEARCH_WIDTH_HOURS);
    }
}
