//! # Taxonomy Store
//!
//! The single owner of the hierarchy graph, the image index and the status
//! book. All mutations go through `&mut self`, so one store has exactly one
//! writer at a time; callers sharing a store across threads serialize access
//! themselves (e.g. a `Mutex<TaxonomyStore>`).
//!
//! Each store is an independent value. Nothing here is process-global.

use crate::hierarchy::HierarchyGraph;
use crate::index::ImageIndex;
use crate::ingestor::{Extract, IngestReport, Ingestor};
use crate::mutation::{MutationEngine, NodeEntry};
use crate::options::StoreOptions;
use crate::primitives::DEFAULT_ROOT_NAME;
use crate::status::StatusBook;
use crate::summary::StatusSummary;
use crate::{ImageId, ImageStatus, NodeName, TaxonError};
use std::collections::{BTreeMap, BTreeSet};

/// Hierarchy graph + image index + status book.
#[derive(Debug, Clone)]
pub struct TaxonomyStore {
    pub(crate) hierarchy: HierarchyGraph,
    pub(crate) index: ImageIndex,
    pub(crate) statuses: StatusBook,
    options: StoreOptions,
}

impl Default for TaxonomyStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAME)
    }
}

impl TaxonomyStore {
    /// Create a store holding only `root`, with default options.
    #[must_use]
    pub fn new(root: impl Into<NodeName>) -> Self {
        Self::with_options(root, StoreOptions::default())
    }

    /// Create a store holding only `root`.
    #[must_use]
    pub fn with_options(root: impl Into<NodeName>, options: StoreOptions) -> Self {
        let root = root.into();
        tracing::debug!(root = %root, ?options, "taxonomy store created");
        Self {
            hierarchy: HierarchyGraph::new(root.clone()),
            index: ImageIndex::new(root),
            statuses: StatusBook::new(),
            options,
        }
    }

    /// Policies this store was built with.
    #[must_use]
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Insert a batch of `(name, parent)` pairs. See [`MutationEngine::insert_nodes`].
    pub fn insert_nodes(&mut self, batch: &[NodeEntry]) -> Result<usize, TaxonError> {
        MutationEngine::insert_nodes(self, batch)
    }

    /// Ingest an extract. See [`Ingestor::ingest_extract`].
    pub fn ingest_extract(&mut self, extract: &Extract) -> Result<IngestReport, TaxonError> {
        Ingestor::ingest_extract(self, extract)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current status of every ingested image.
    #[must_use]
    pub fn statuses(&self) -> &BTreeMap<ImageId, ImageStatus> {
        self.statuses.as_map()
    }

    /// Current statuses rendered as wire strings.
    #[must_use]
    pub fn status_strings(&self) -> BTreeMap<String, String> {
        self.statuses()
            .iter()
            .map(|(image, status)| (image.0.clone(), status.as_str().to_string()))
            .collect()
    }

    /// Status of one image, `None` if it was never ingested.
    #[must_use]
    pub fn status_of(&self, image: &ImageId) -> Option<ImageStatus> {
        self.statuses.get(image)
    }

    /// Images directly tagged with `node`.
    #[must_use]
    pub fn images_of(&self, node: &NodeName) -> Option<&BTreeSet<ImageId>> {
        self.index.images_of(node)
    }

    /// Direct children of `node`.
    #[must_use]
    pub fn children_of(&self, node: &NodeName) -> Option<&BTreeSet<NodeName>> {
        self.hierarchy.children(node)
    }

    /// Check if `node` exists.
    #[must_use]
    pub fn contains_node(&self, node: &NodeName) -> bool {
        self.hierarchy.contains(node)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.hierarchy.node_count()
    }

    /// Number of ingested images.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.statuses.len()
    }

    /// Read-only view of the hierarchy.
    #[must_use]
    pub fn hierarchy(&self) -> &HierarchyGraph {
        &self.hierarchy
    }

    /// Read-only view of the image index.
    #[must_use]
    pub fn index(&self) -> &ImageIndex {
        &self.index
    }

    /// Per-status counts.
    #[must_use]
    pub fn summary(&self) -> StatusSummary {
        StatusSummary::from_store(self)
    }

    // -------------------------------------------------------------------------
    // Invariants
    // -------------------------------------------------------------------------

    /// Verify the structural invariants of the store.
    ///
    /// - The hierarchy and the index have the same key set
    /// - Every child listed in the hierarchy is itself a node
    /// - Every indexed image has a status
    pub fn check_invariants(&self) -> Result<(), TaxonError> {
        if let Some(node) = self.hierarchy.nodes().find(|n| !self.index.contains_node(n)) {
            return Err(TaxonError::InvariantViolation(format!(
                "node '{}' has no image index entry",
                node
            )));
        }
        if let Some(node) = self.index.nodes().find(|n| !self.hierarchy.contains(n)) {
            return Err(TaxonError::InvariantViolation(format!(
                "image index entry '{}' is not a node",
                node
            )));
        }

        for node in self.hierarchy.nodes() {
            let kids = self.hierarchy.children(node).into_iter().flatten();
            for child in kids {
                if !self.hierarchy.contains(child) {
                    return Err(TaxonError::InvariantViolation(format!(
                        "child '{}' of '{}' has no entry",
                        child, node
                    )));
                }
            }

            let images = self.index.images_of(node).into_iter().flatten();
            for image in images {
                if !self.statuses.contains(image) {
                    return Err(TaxonError::InvariantViolation(format!(
                        "image '{}' on '{}' has no status",
                        image, node
                    )));
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
