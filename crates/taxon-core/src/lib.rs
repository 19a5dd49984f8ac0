//! # taxon-core
//!
//! The deterministic Taxonomy Store for Taxon - THE LOGIC.
//!
//! This crate tracks a hierarchy of categories ("nodes"), the images tagged
//! with those categories, and a staleness status for every image that moves
//! forward whenever the hierarchy gains a node relevant to that image.
//!
//! ## Components
//!
//! - `hierarchy` - parent -> children tree rooted at one root node
//! - `index` - node -> directly tagged images
//! - `status` - per-image status and its transition rules
//! - `mutation` / `ingestor` - the two algorithms that change the store
//! - `store` - `TaxonomyStore`, the single owner of all of the above
//!
//! ## Architectural Constraints
//!
//! - Synchronous: propagation completes before a mutating call returns
//! - Deterministic: `BTreeMap`/`BTreeSet` only
//! - Has NO async, NO network, NO file I/O

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod hierarchy;
pub mod index;
pub mod ingestor;
pub mod mutation;
pub mod options;
pub mod primitives;
pub mod status;
pub mod store;
pub mod summary;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{ImageId, ImageStatus, NodeName, TaxonError};

// =============================================================================
// RE-EXPORTS: Store
// =============================================================================

pub use hierarchy::{HierarchyGraph, SerializableHierarchy};
pub use index::ImageIndex;
pub use ingestor::{Extract, IngestReport, Ingestor};
pub use mutation::{MutationEngine, NodeEntry};
pub use options::{BatchOrdering, ReingestPolicy, StoreOptions};
pub use status::StatusBook;
pub use store::TaxonomyStore;
pub use summary::StatusSummary;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{
    ExpectedStatuses, Fixture, NodeList, StatusMismatch, diff_statuses, parse_expected,
    parse_extract, parse_node_list,
};
