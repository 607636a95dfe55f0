//! # nomis-scoring: breakpoint-table wallet scoring.
//!
//! Reduces a [`WalletStats`](nomis_core::WalletStats) record to a score in
//! `[0, 1]`:
//! - **Step tables**: each category maps its driving metric to a raw score in
//!   `[0, 100]` through an ordered list of thresholds.
//! - **Profiles**: every scoring model carries its own tables and percentage
//!   weights, stored as data rather than per-model code.
//! - **NFT composite**: holding, trading and worth are mixed by sub-weights
//!   and then weighted like any other category.

pub mod categories;
pub mod engine;
pub mod profiles;
pub mod step;

pub use categories::{Category, NftComponent};
pub use engine::{CategoryScore, ScoringEngine};
pub use profiles::{Profile, profile};
pub use step::{Step, StepTable};
