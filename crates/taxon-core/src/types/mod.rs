//! # Core Type Definitions
//!
//! This module contains all core types for the Taxon store:
//! - Identifiers (`NodeName`, `ImageId`)
//! - Image staleness status (`ImageStatus`)
//! - Error types (`TaxonError`)
//!
//! ## Determinism Guarantees
//!
//! All identifiers implement `Ord` so they can key `BTreeMap`/`BTreeSet`
//! and every listing the store produces comes out in the same order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Name of a node (category / label) in the taxonomy.
/// Names are unique across the whole hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeName(pub String);

impl NodeName {
    /// Create a new node name from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for NodeName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of an annotated image.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    /// Create a new image identifier from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// IMAGE STATUS
// =============================================================================

/// Staleness status of an ingested image.
///
/// `Valid < GranularityStaged < CoverageStaged` is the escalation order.
/// `Invalid` sits outside that order: it is decided once at ingestion and
/// never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// Every reference was known and nothing relevant changed since.
    Valid,
    /// A tagged node gained a child (the annotation may be too coarse).
    GranularityStaged,
    /// A tagged node gained a sibling (the parent's partition changed).
    CoverageStaged,
    /// At least one reference was unknown at ingestion time.
    Invalid,
}

impl ImageStatus {
    /// All statuses, in display order.
    pub const ALL: [ImageStatus; 4] = [
        ImageStatus::Valid,
        ImageStatus::GranularityStaged,
        ImageStatus::CoverageStaged,
        ImageStatus::Invalid,
    ];

    /// Wire string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageStatus::Valid => "valid",
            ImageStatus::GranularityStaged => "granularity_staged",
            ImageStatus::CoverageStaged => "coverage_staged",
            ImageStatus::Invalid => "invalid",
        }
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ImageStatus {
    type Err = TaxonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TaxonError::Fixture(format!("Unknown status: {}", s)))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Taxon system.
///
/// - No silent failures
/// - Use `Result<T, TaxonError>` for fallible operations
/// - The store should never panic; all errors surface to the caller
#[derive(Debug, Error)]
pub enum TaxonError {
    /// A node was inserted under a parent that is not in the hierarchy.
    #[error("Unknown parent '{parent}' for node '{node}'")]
    UnknownParent { node: NodeName, parent: NodeName },

    /// A node with this name already exists.
    #[error("Node already exists: {0}")]
    DuplicateNode(NodeName),

    /// A batch could not be ordered because its entries only reference each other.
    #[error("Cyclic insertion batch: {0:?}")]
    CyclicBatch(Vec<NodeName>),

    /// The image was already ingested and the store rejects re-ingestion.
    #[error("Image already ingested: {0}")]
    ImageAlreadyIngested(ImageId),

    /// The hierarchy graph and the image index disagree.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A fixture document could not be decoded or replayed.
    #[error("Fixture error: {0}")]
    Fixture(String),

    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
