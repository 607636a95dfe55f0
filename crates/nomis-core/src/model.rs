//! Scoring calculation models.
//!
//! A model names a weighting/threshold profile. The profile data itself lives
//! in `nomis-scoring`; this crate only defines the closed set of names so that
//! stores and caches can key on it.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named scoring profile.
///
/// Unknown ids and names resolve to [`ScoringCalculationModel::CommonV1`].
///
/// # Examples
///
/// ```
/// use nomis_core::model::ScoringCalculationModel;
/// assert_eq!(ScoringCalculationModel::from_id(4), ScoringCalculationModel::CommonV2);
/// assert_eq!(ScoringCalculationModel::from_id(9_999), ScoringCalculationModel::CommonV1);
/// assert_eq!("zksync".parse::<ScoringCalculationModel>().unwrap(), ScoringCalculationModel::ZkSync);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringCalculationModel {
    #[default]
    CommonV1,
    Symbiosis,
    Xdefi,
    Halo,
    CommonV2,
    Rubic,
    CommonV3,
    Hedera,
    CyberConnect,
    Hyperlane,
    ZkSync,
    Scroll,
    Linea,
    Mode,
    Zora,
    Kroma,
    ZetaChain,
    Taiko,
    Polygon,
    Base,
}

impl ScoringCalculationModel {
    /// Every model, in id order.
    pub const ALL: [ScoringCalculationModel; 20] = [
        Self::CommonV1,
        Self::Symbiosis,
        Self::Xdefi,
        Self::Halo,
        Self::CommonV2,
        Self::Rubic,
        Self::CommonV3,
        Self::Hedera,
        Self::CyberConnect,
        Self::Hyperlane,
        Self::ZkSync,
        Self::Scroll,
        Self::Linea,
        Self::Mode,
        Self::Zora,
        Self::Kroma,
        Self::ZetaChain,
        Self::Taiko,
        Self::Polygon,
        Self::Base,
    ];

    /// Numeric id used by external callers.
    pub fn id(&self) -> u16 {
        Self::ALL
            .iter()
            .position(|m| m == self)
            .map(|i| i as u16)
            .unwrap_or(0)
    }

    /// Resolve a numeric id, falling back to the default model.
    pub fn from_id(id: u16) -> Self {
        Self::ALL.get(id as usize).copied().unwrap_or_default()
    }

    /// Stable lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CommonV1 => "common-v1",
            Self::Symbiosis => "symbiosis",
            Self::Xdefi => "xdefi",
            Self::Halo => "halo",
            Self::CommonV2 => "common-v2",
            Self::Rubic => "rubic",
            Self::CommonV3 => "common-v3",
            Self::Hedera => "hedera",
            Self::CyberConnect => "cyber-connect",
            Self::Hyperlane => "hyperlane",
            Self::ZkSync => "zk-sync",
            Self::Scroll => "scroll",
            Self::Linea => "linea",
            Self::Mode => "mode",
            Self::Zora => "zora",
            Self::Kroma => "kroma",
            Self::ZetaChain => "zeta-chain",
            Self::Taiko => "taiko",
            Self::Polygon => "polygon",
            Self::Base => "base",
        }
    }

    /// Resolve a name (case-insensitive, `-`/`_` ignored), falling back to the default model.
    pub fn from_name(name: &str) -> Self {
        let wanted = squash(name);
        Self::ALL
            .iter()
            .copied()
            .find(|m| squash(m.name()) == wanted)
            .unwrap_or_default()
    }
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for ScoringCalculationModel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for ScoringCalculationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
