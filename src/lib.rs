//! Odds comparator.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod error;
pub mod types;
pub mod market;
pub mod storage;
pub mod engine;
pub mod comparison;
pub mod dashboard;
pub mod seed;
