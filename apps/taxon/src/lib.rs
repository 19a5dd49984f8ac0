//! # taxon
//!
//! Command-line harness around `taxon-core`.
//!
//! Loads fixture documents from disk, replays them through a
//! `TaxonomyStore` and prints or verifies the resulting image statuses.

pub mod cli;
pub mod config;
pub mod logging;
