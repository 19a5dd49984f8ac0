//! # Status Summary
//!
//! Aggregate counts over a store: how many images sit in each status and how
//! large the hierarchy is. Informational only; nothing in the store reads it.

use crate::store::TaxonomyStore;
use crate::ImageStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-status image counts plus hierarchy size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub node_count: usize,
    pub image_count: usize,
    pub valid: usize,
    pub granularity_staged: usize,
    pub coverage_staged: usize,
    pub invalid: usize,
}

impl StatusSummary {
    /// Compute the summary of a store.
    #[must_use]
    pub fn from_store(store: &TaxonomyStore) -> Self {
        let mut summary = Self {
            node_count: store.node_count(),
            ..Self::default()
        };
        for status in store.statuses().values() {
            summary.record(*status);
        }
        summary
    }

    /// Count for one status.
    #[must_use]
    pub fn count(&self, status: ImageStatus) -> usize {
        match status {
            ImageStatus::Valid => self.valid,
            ImageStatus::GranularityStaged => self.granularity_staged,
            ImageStatus::CoverageStaged => self.coverage_staged,
            ImageStatus::Invalid => self.invalid,
        }
    }

    /// Images whose status is staged for review (granularity or coverage).
    #[must_use]
    pub fn staged(&self) -> usize {
        self.granularity_staged.saturating_add(self.coverage_staged)
    }

    fn record(&mut self, status: ImageStatus) {
        let slot = match status {
            ImageStatus::Valid => &mut self.valid,
            ImageStatus::GranularityStaged => &mut self.granularity_staged,
            ImageStatus::CoverageStaged => &mut self.coverage_staged,
            ImageStatus::Invalid => &mut self.invalid,
        };
        *slot = slot.saturating_add(1);
        self.image_count = self.image_count.saturating_add(1);
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} images ({} valid, {} granularity_staged, {} coverage_staged, {} invalid)",
            self.node_count,
            self.image_count,
            self.valid,
            self.granularity_staged,
            self.coverage_staged,
            self.invalid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestor::Extract;
    use crate::{ImageId, NodeName};

    #[test]
    fn empty_store_summary() {
        let store = TaxonomyStore::new("core");
        let summary = StatusSummary::from_store(&store);

        assert_eq!(summary.node_count, 1);
        assert_eq!(summary.image_count, 0);
        assert_eq!(summary.staged(), 0);
    }

    #[test]
    fn counts_match_statuses() {
        let mut store = TaxonomyStore::new("core");
        store
            .insert_nodes(&[(NodeName::new("A"), NodeName::new("core"))])
            .expect("build");
        let extract: Extract = [
            (ImageId::new("ok"), vec![NodeName::new("A")]),
            (ImageId::new("bad"), vec![NodeName::new("Z")]),
        ]
        .into();
        store.ingest_extract(&extract).expect("ingest");
        store
            .insert_nodes(&[(NodeName::new("A1"), NodeName::new("A"))])
            .expect("edit");

        let summary = StatusSummary::from_store(&store);
        assert_eq!(summary.node_count, 3);
        assert_eq!(summary.image_count, 2);
        assert_eq!(summary.count(ImageStatus::GranularityStaged), 1);
        assert_eq!(summary.count(ImageStatus::Invalid), 1);
        assert_eq!(summary.count(ImageStatus::Valid), 0);
    }
}
