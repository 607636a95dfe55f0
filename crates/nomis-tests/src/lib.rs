//! Integration test suite for the Nomis scoring engine.
//!
//! Exercises the pipeline across crate boundaries: raw activity in,
//! statistics and scores out, with the service layer's cache and snapshot
//! store in between.

pub mod helpers;
