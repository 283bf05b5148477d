//! livecfg: Live Configuration Store
//!
//! A library for reading plain-text `key: value // comment` configuration
//! files into typed, caller-owned variables and writing changes back while
//! leaving every untouched line byte-for-byte intact.

pub mod cli;
pub mod filter;
pub mod keys;
pub mod store;

#[cfg(test)]
mod filter_tests;
