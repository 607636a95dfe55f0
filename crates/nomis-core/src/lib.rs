//! # nomis-core
//! Foundation types and traits for the Nomis scoring engine.

pub mod constants;
pub mod error;
pub mod model;
pub mod stats;
pub mod traits;
pub mod types;
pub mod units;

pub use error::NomisError;
pub use model::ScoringCalculationModel;
pub use stats::WalletStats;
