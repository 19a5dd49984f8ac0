//! # Fixture Format
//!
//! JSON documents describing one replay of the store:
//!
//! | Document | Shape |
//! |----------|-------|
//! | build    | `[[name, parent-or-null], ...]`, first entry is the root |
//! | edits    | same shape as build, applied after the extract |
//! | extract  | `{ "image": ["node", ...], ... }` |
//! | expected | `{ "image": "status", ... }` |
//!
//! This is a pure transformation - no file I/O. Reading the documents from
//! disk is the app layer's job.

use crate::ingestor::Extract;
use crate::mutation::NodeEntry;
use crate::options::StoreOptions;
use crate::store::TaxonomyStore;
use crate::{ImageId, ImageStatus, NodeName, TaxonError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// `(name, parent)` list as it appears in build and edits documents.
pub type NodeList = Vec<(NodeName, Option<NodeName>)>;

/// Expected image -> status mapping.
pub type ExpectedStatuses = BTreeMap<ImageId, ImageStatus>;

// =============================================================================
// DOCUMENT PARSING
// =============================================================================

fn decode<'de, T: Deserialize<'de>>(bytes: &'de [u8], document: &str) -> Result<T, TaxonError> {
    serde_json::from_slice(bytes)
        .map_err(|e| TaxonError::Fixture(format!("Failed to parse {} document: {}", document, e)))
}

/// Parse a build or edits document.
pub fn parse_node_list(bytes: &[u8]) -> Result<NodeList, TaxonError> {
    decode(bytes, "node list")
}

/// Parse an extract document.
pub fn parse_extract(bytes: &[u8]) -> Result<Extract, TaxonError> {
    decode(bytes, "extract")
}

/// Parse an expected-status document.
pub fn parse_expected(bytes: &[u8]) -> Result<ExpectedStatuses, TaxonError> {
    decode(bytes, "expected status")
}

// =============================================================================
// FIXTURE
// =============================================================================

/// A build list, an extract and an edit list, replayed in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub build: NodeList,
    #[serde(default)]
    pub extract: Extract,
    #[serde(default)]
    pub edits: NodeList,
}

impl Fixture {
    /// Decode the three input documents.
    pub fn from_documents(build: &[u8], extract: &[u8], edits: &[u8]) -> Result<Self, TaxonError> {
        Ok(Self {
            build: parse_node_list(build)?,
            extract: parse_extract(extract)?,
            edits: parse_node_list(edits)?,
        })
    }

    /// Construct the store from the build list only.
    ///
    /// Returns `Ok(None)` for an empty build list.
    pub fn build_store(&self, options: StoreOptions) -> Result<Option<TaxonomyStore>, TaxonError> {
        let Some(((root, root_parent), rest)) = self.build.split_first() else {
            return Ok(None);
        };
        if let Some(parent) = root_parent {
            return Err(TaxonError::Fixture(format!(
                "Root entry '{}' must have a null parent, found '{}'",
                root, parent
            )));
        }

        let mut store = TaxonomyStore::with_options(root.clone(), options);
        store.insert_nodes(&require_parents(rest, "build")?)?;
        Ok(Some(store))
    }

    /// Build, ingest the extract, apply the edits.
    ///
    /// Returns `Ok(None)` for an empty build list.
    pub fn replay(&self, options: StoreOptions) -> Result<Option<TaxonomyStore>, TaxonError> {
        let Some(mut store) = self.build_store(options)? else {
            return Ok(None);
        };
        store.ingest_extract(&self.extract)?;
        store.insert_nodes(&require_parents(&self.edits, "edits")?)?;
        Ok(Some(store))
    }

    /// Final statuses of a replay. Empty for an empty build list.
    pub fn replay_statuses(
        &self,
        options: StoreOptions,
    ) -> Result<BTreeMap<ImageId, ImageStatus>, TaxonError> {
        Ok(self
            .replay(options)?
            .map(|store| store.statuses().clone())
            .unwrap_or_default())
    }
}

/// Every non-root entry must name its parent.
fn require_parents(
    list: &[(NodeName, Option<NodeName>)],
    document: &str,
) -> Result<Vec<NodeEntry>, TaxonError> {
    list.iter()
        .map(|(name, parent)| match parent {
            Some(parent) => Ok((name.clone(), parent.clone())),
            None => Err(TaxonError::Fixture(format!(
                "Entry '{}' in {} has a null parent",
                name, document
            ))),
        })
        .collect()
}

// =============================================================================
// EXPECTED STATUS COMPARISON
// =============================================================================

/// One image whose actual status differs from the expected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMismatch {
    pub image: ImageId,
    pub expected: Option<ImageStatus>,
    pub actual: Option<ImageStatus>,
}

/// Compare expected and actual statuses, sorted by image.
///
/// An image present on only one side is a mismatch with `None` on the other.
#[must_use]
pub fn diff_statuses(
    expected: &BTreeMap<ImageId, ImageStatus>,
    actual: &BTreeMap<ImageId, ImageStatus>,
) -> Vec<StatusMismatch> {
    let images: BTreeSet<&ImageId> = expected.keys().chain(actual.keys()).collect();
    images
        .into_iter()
        .filter_map(|image| {
            let want = expected.get(image).copied();
            let got = actual.get(image).copied();
            (want != got).then(|| StatusMismatch {
                image: image.clone(),
                expected: want,
                actual: got,
            })
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
