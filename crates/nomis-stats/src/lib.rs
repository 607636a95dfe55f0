//! # nomis-stats
//! Wallet statistics pipeline.
//!
//! Turns a fetched [`WalletActivity`](nomis_core::types::WalletActivity) into
//! a [`WalletStats`](nomis_core::WalletStats) record:
//!
//! - [`enricher`] resolves token prices through an ordered source chain
//! - [`counterparty`] attributes activity to tracked contracts
//! - [`turnover`] buckets value flow into monthly windows
//! - [`median`] smooths the USD balance over past snapshots
//! - [`assembler`] runs all of the above for one request

pub mod assembler;
pub mod config;
pub mod counterparty;
pub mod enricher;
pub mod median;
pub mod nft;
pub mod stablecoins;
pub mod transactions;
pub mod turnover;

pub use assembler::{StatsAssembler, StatsRequest, validate_address};
pub use config::StatsConfig;
pub use enricher::TokenBalanceEnricher;
