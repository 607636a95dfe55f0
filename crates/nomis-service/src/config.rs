//! Service configuration.
//!
//! [`ServiceConfig`] has usable defaults and can be layered from an optional
//! TOML file and `NOMIS_*` environment variables. Nested keys use a double
//! underscore, e.g. `NOMIS_STATS__HISTORICAL__TAKE_COUNT=10`.

use std::path::Path;
use std::time::Duration;

use nomis_core::ScoringCalculationModel;
use nomis_core::constants::DEFAULT_CACHE_TTL_SECS;
use nomis_core::error::ConfigError;
use nomis_core::types::CounterpartyConfig;
use nomis_stats::StatsConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "NOMIS";

/// Configuration for a scoring service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Lifetime of cached wallet stats, in seconds.
    pub cache_ttl_secs: u64,
    /// Skip the stats cache for every request.
    pub disable_cache: bool,
    /// Model used when a request names none.
    pub default_model: ScoringCalculationModel,
    /// Tracked counterparty contracts.
    pub counterparties: Vec<CounterpartyConfig>,
    pub stats: StatsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            disable_cache: false,
            default_model: ScoringCalculationModel::default(),
            counterparties: Vec::new(),
            stats: StatsConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load defaults, then `path` (if given), then `NOMIS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let cfg: Self = settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 && !self.disable_cache {
            return Err(ConfigError::InvalidValue {
                key: "cache_ttl_secs".into(),
                reason: "must be positive while the cache is enabled".into(),
            });
        }
        let historical = &self.stats.historical;
        if historical.precision < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                key: "stats.historical.precision".into(),
                reason: "must not be negative".into(),
            });
        }
        if historical.take_count == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "stats.historical.take_count".into(),
                reason: "must be at least 1 when set".into(),
            });
        }
        if historical.lookback_days <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "stats.historical.lookback_days".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
