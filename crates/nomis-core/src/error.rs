//! Error types for the Nomis scoring engine.
//!
//! Only malformed input reaches the caller. Price source failures are
//! recovered inside the enricher, and "no transactions" is a successful
//! result (`WalletStats::no_data`).
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("empty wallet address")] EmptyAddress,
    #[error("invalid wallet address: {0}")] InvalidAddress(String),
    #[error("chain mismatch: expected {expected}, got {got}")] ChainMismatch { expected: u64, got: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")] Unavailable(String),
    #[error("malformed source response: {0}")] Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("serialization: {0}")] Serialization(String),
    #[error("backend: {0}")] Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")] InvalidValue { key: String, reason: String },
    #[error("load: {0}")] Load(String),
}

#[derive(Error, Debug)]
pub enum NomisError {
    #[error(transparent)] Input(#[from] InputError),
    #[error(transparent)] Source(#[from] SourceError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error(transparent)] Config(#[from] ConfigError),
}
