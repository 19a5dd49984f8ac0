//! # Image Index
//!
//! Reverse mapping node -> images directly tagged with that node.
//!
//! The key set mirrors the hierarchy: every node gets an (initially empty)
//! entry when it is created, and entries are never removed.

use crate::{ImageId, NodeName};
use std::collections::{BTreeMap, BTreeSet};

/// Node -> set of directly tagged images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageIndex {
    entries: BTreeMap<NodeName, BTreeSet<ImageId>>,
}

impl ImageIndex {
    /// Create an index with a single empty entry for `root`.
    #[must_use]
    pub fn new(root: NodeName) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(root, BTreeSet::new());
        Self { entries }
    }

    /// Images directly tagged with `node`. `None` if the node has no entry.
    #[must_use]
    pub fn images_of(&self, node: &NodeName) -> Option<&BTreeSet<ImageId>> {
        self.entries.get(node)
    }

    /// Check if the index has an entry for `node`.
    #[must_use]
    pub fn contains_node(&self, node: &NodeName) -> bool {
        self.entries.contains_key(node)
    }

    /// Node names with an entry, in deterministic order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeName> {
        self.entries.keys()
    }

    /// Number of node entries.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    /// Nodes an image is registered against, in deterministic order.
    #[must_use]
    pub fn nodes_of(&self, image: &ImageId) -> Vec<NodeName> {
        self.entries
            .iter()
            .filter(|(_, images)| images.contains(image))
            .map(|(node, _)| node.clone())
            .collect()
    }

    /// Create an empty entry for a newly inserted node.
    pub(crate) fn add_node(&mut self, node: NodeName) {
        self.entries.entry(node).or_default();
    }

    /// Register `image` against an existing `node`.
    ///
    /// Returns `false` (and registers nothing) when the node has no entry.
    pub(crate) fn register(&mut self, node: &NodeName, image: ImageId) -> bool {
        match self.entries.get_mut(node) {
            Some(images) => {
                images.insert(image);
                true
            }
            None => false,
        }
    }

    /// Remove `image` from every entry. Returns how many entries held it.
    pub(crate) fn unregister(&mut self, image: &ImageId) -> usize {
        let mut removed = 0usize;
        for images in self.entries.values_mut() {
            if images.remove(image) {
                removed = removed.saturating_add(1);
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_on_known_node() {
        let mut index = ImageIndex::new(NodeName::new("core"));
        index.add_node(NodeName::new("A"));

        assert!(index.register(&NodeName::new("A"), ImageId::new("img001")));
        assert!(
            index
                .images_of(&NodeName::new("A"))
                .is_some_and(|set| set.contains(&ImageId::new("img001")))
        );
    }

    #[test]
    fn register_on_unknown_node_is_dropped() {
        let mut index = ImageIndex::new(NodeName::new("core"));

        assert!(!index.register(&NodeName::new("E"), ImageId::new("img003")));
        assert_eq!(index.node_count(), 1);
        assert!(!index.contains_node(&NodeName::new("E")));
    }

    #[test]
    fn add_node_keeps_existing_images() {
        let mut index = ImageIndex::new(NodeName::new("core"));
        index.register(&NodeName::new("core"), ImageId::new("img"));
        index.add_node(NodeName::new("core"));

        assert_eq!(index.images_of(&NodeName::new("core")).map(BTreeSet::len), Some(1));
    }

    #[test]
    fn unregister_clears_all_entries() {
        let mut index = ImageIndex::new(NodeName::new("core"));
        index.add_node(NodeName::new("A"));
        index.add_node(NodeName::new("B"));
        let image = ImageId::new("img");
        index.register(&NodeName::new("A"), image.clone());
        index.register(&NodeName::new("B"), image.clone());

        assert_eq!(index.nodes_of(&image), vec![NodeName::new("A"), NodeName::new("B")]);
        assert_eq!(index.unregister(&image), 2);
        assert!(index.nodes_of(&image).is_empty());
        assert_eq!(index.node_count(), 3);
    }
}
