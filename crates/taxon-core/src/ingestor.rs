//! # Ingestor Module
//!
//! Extract ingestion for the Taxon store.
//!
//! - Register every known reference of an image in the image index
//! - Drop unknown references without registering them anywhere
//! - Decide the initial status once per image: `invalid` if any reference
//!   was unknown, `valid` otherwise
//! - Apply the store's re-ingestion policy to images seen before

use crate::hierarchy::HierarchyGraph;
use crate::options::ReingestPolicy;
use crate::store::TaxonomyStore;
use crate::{ImageId, ImageStatus, NodeName, TaxonError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// An extract: image -> nodes the image was directly tagged with.
pub type Extract = BTreeMap<ImageId, Vec<NodeName>>;

/// Outcome of one `ingest_extract` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Images processed.
    pub images: usize,
    /// Images that came out `invalid`.
    pub invalid: usize,
    /// `(image, reference)` pairs that named no known node.
    pub unknown_references: Vec<(ImageId, NodeName)>,
}

/// The Ingestor handles extract validation and registration.
pub struct Ingestor;

impl Ingestor {
    /// Initial status an image with these references would get.
    ///
    /// Pure check against the hierarchy, no registration. The result does not
    /// depend on reference order.
    #[must_use]
    pub fn initial_status(hierarchy: &HierarchyGraph, references: &[NodeName]) -> ImageStatus {
        if references.iter().all(|node| hierarchy.contains(node)) {
            ImageStatus::Valid
        } else {
            ImageStatus::Invalid
        }
    }

    /// Ingest every image of an extract.
    ///
    /// # Errors
    /// Returns `TaxonError::ImageAlreadyIngested` under `ReingestPolicy::Reject`
    /// if any image of the extract is already known. Nothing is ingested then.
    pub fn ingest_extract(
        store: &mut TaxonomyStore,
        extract: &Extract,
    ) -> Result<IngestReport, TaxonError> {
        let policy = store.options().reingest;

        if policy == ReingestPolicy::Reject {
            if let Some(image) = extract.keys().find(|image| store.statuses.contains(image)) {
                return Err(TaxonError::ImageAlreadyIngested(image.clone()));
            }
        }

        let mut report = IngestReport::default();
        for (image, references) in extract {
            if policy == ReingestPolicy::Replace && store.statuses.contains(image) {
                let dropped = store.index.unregister(image);
                tracing::debug!(image = %image, dropped, "replacing earlier registrations");
            }

            let status = Self::ingest_image(store, image, references, &mut report);
            if status == ImageStatus::Invalid {
                report.invalid = report.invalid.saturating_add(1);
            }
            report.images = report.images.saturating_add(1);
        }

        tracing::info!(
            images = report.images,
            invalid = report.invalid,
            unknown = report.unknown_references.len(),
            "extract ingested"
        );
        Ok(report)
    }

    /// Register one image and set its status.
    ///
    /// A node named more than once in `references` is registered and reported once.
    fn ingest_image(
        store: &mut TaxonomyStore,
        image: &ImageId,
        references: &[NodeName],
        report: &mut IngestReport,
    ) -> ImageStatus {
        let status = Self::initial_status(&store.hierarchy, references);

        let unique: BTreeSet<&NodeName> = references.iter().collect();
        for node in unique {
            if !store.index.register(node, image.clone()) {
                tracing::debug!(image = %image, node = %node, "unknown node reference");
                report.unknown_references.push((image.clone(), node.clone()));
            }
        }

        store.statuses.set(image.clone(), status);
        status
    }
}

// =============================================================================
// TESTS
// =============================================================================
