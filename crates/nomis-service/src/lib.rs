//! # nomis-service
//! Composition layer around the statistics pipeline and scoring engine:
//! configuration loading, the stats cache, the historical snapshot store and
//! the per-request [`ScoringService`].

pub mod cache;
pub mod config;
pub mod service;
pub mod store;

pub use cache::MemoryStatsCache;
pub use config::ServiceConfig;
pub use service::{RequestOptions, ScoredWallet, ScoringService};
pub use store::MemorySnapshotStore;
