//! # Store Options
//!
//! Policies a caller picks when constructing a `TaxonomyStore`.
//! Both deserialize from the `[store]` table of the app's TOML config.

use serde::{Deserialize, Serialize};

/// What happens when an image that is already known is ingested again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReingestPolicy {
    /// Keep earlier registrations, add the new ones, recompute the status.
    #[default]
    Merge,
    /// Drop earlier registrations, then ingest as a new image.
    Replace,
    /// Fail the whole extract before touching anything.
    Reject,
}

/// How an insertion batch is ordered before it is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOrdering {
    /// Apply pairs exactly in caller order.
    #[default]
    AsGiven,
    /// Reorder so every parent precedes its children.
    Topological,
}

/// Store-wide policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub reingest: ReingestPolicy,
    pub ordering: BatchOrdering,
}
