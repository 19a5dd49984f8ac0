//! # Status Engine
//!
//! Per-image staleness status and the transition rules applied when the
//! hierarchy is edited.
//!
//! State machine:
//!
//! ```text
//!   valid ──granularity──▶ granularity_staged
//!     │                          │
//!     └────coverage──▶ coverage_staged ◀──coverage──┘
//!
//!   invalid: terminal, set only at ingestion
//! ```
//!
//! Transitions only ever move up the precedence order, so applying the
//! same notification twice is a no-op.

use crate::{ImageId, ImageStatus};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// TRANSITION RULES
// =============================================================================

impl ImageStatus {
    /// Status after a node the image is tagged with gained a child.
    #[must_use]
    pub const fn after_granularity_change(self) -> Self {
        match self {
            ImageStatus::Valid => ImageStatus::GranularityStaged,
            other => other,
        }
    }

    /// Status after a node the image is tagged with gained a sibling.
    #[must_use]
    pub const fn after_coverage_change(self) -> Self {
        match self {
            ImageStatus::Valid | ImageStatus::GranularityStaged => ImageStatus::CoverageStaged,
            other => other,
        }
    }

    /// Position in the escalation order. `None` for `Invalid`.
    #[must_use]
    pub const fn precedence(self) -> Option<u8> {
        match self {
            ImageStatus::Valid => Some(0),
            ImageStatus::GranularityStaged => Some(1),
            ImageStatus::CoverageStaged => Some(2),
            ImageStatus::Invalid => None,
        }
    }

    /// Whether no further transition can leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, ImageStatus::CoverageStaged | ImageStatus::Invalid)
    }
}

// =============================================================================
// STATUS BOOK
// =============================================================================

/// Current status of every ingested image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBook {
    statuses: BTreeMap<ImageId, ImageStatus>,
}

impl StatusBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of one image.
    #[must_use]
    pub fn get(&self, image: &ImageId) -> Option<ImageStatus> {
        self.statuses.get(image).copied()
    }

    /// Check if the image has been ingested.
    #[must_use]
    pub fn contains(&self, image: &ImageId) -> bool {
        self.statuses.contains_key(image)
    }

    /// Full image -> status mapping.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<ImageId, ImageStatus> {
        &self.statuses
    }

    /// Number of ingested images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether no image has been ingested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Set the initial status of an image, overwriting any previous one.
    pub(crate) fn set(&mut self, image: ImageId, status: ImageStatus) {
        self.statuses.insert(image, status);
    }

    /// Escalate images whose node gained a child. Returns the number changed.
    pub(crate) fn notify_granularity(&mut self, images: &BTreeSet<ImageId>) -> usize {
        self.apply(images, ImageStatus::after_granularity_change)
    }

    /// Escalate images whose node gained a sibling. Returns the number changed.
    pub(crate) fn notify_coverage(&mut self, images: &BTreeSet<ImageId>) -> usize {
        self.apply(images, ImageStatus::after_coverage_change)
    }

    fn apply(&mut self, images: &BTreeSet<ImageId>, rule: fn(ImageStatus) -> ImageStatus) -> usize {
        let mut changed = 0usize;
        for image in images {
            let Some(status) = self.statuses.get_mut(image) else {
                continue;
            };
            let next = rule(*status);
            if next != *status {
                tracing::trace!(image = %image, from = %status, to = %next, "status escalated");
                *status = next;
                changed = changed.saturating_add(1);
            }
        }
        changed
    }
}

// =============================================================================
// TESTS
// =============================================================================
