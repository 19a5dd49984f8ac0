//! # Mutation Engine
//!
//! Node insertion for the Taxon store.
//!
//! Every insertion runs in three steps, in this order:
//! 1. Granularity notification on the images tagged with the parent
//! 2. Coverage notification on the images tagged with each existing sibling
//! 3. Attach the node to the hierarchy and create its index entry
//!
//! Steps 1 and 2 see the hierarchy as it was *before* the node is added.
//! Pairs of a batch are applied one after another, so a node inserted early
//! in a batch is a parent or sibling candidate for the pairs that follow.

use crate::hierarchy::HierarchyGraph;
use crate::options::BatchOrdering;
use crate::store::TaxonomyStore;
use crate::{NodeName, TaxonError};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// One `(name, parent)` pair of an insertion batch.
pub type NodeEntry = (NodeName, NodeName);

/// The MutationEngine applies hierarchy edits and their status side effects.
pub struct MutationEngine;

impl MutationEngine {
    /// Insert a batch of nodes. Returns the number of nodes inserted.
    ///
    /// Under `BatchOrdering::AsGiven` a failing pair stops the batch and the
    /// pairs before it stay committed. Under `BatchOrdering::Topological` an
    /// unorderable batch is rejected before anything is applied.
    pub fn insert_nodes(
        store: &mut TaxonomyStore,
        batch: &[NodeEntry],
    ) -> Result<usize, TaxonError> {
        let ordered: Vec<&NodeEntry> = match store.options().ordering {
            BatchOrdering::AsGiven => batch.iter().collect(),
            BatchOrdering::Topological => Self::order_batch(&store.hierarchy, batch)?,
        };

        let mut inserted = 0usize;
        for (name, parent) in ordered {
            Self::insert_node(store, name, parent)?;
            inserted = inserted.saturating_add(1);
        }

        tracing::info!(inserted, nodes = store.hierarchy.node_count(), "insertion batch applied");
        Ok(inserted)
    }

    /// Insert a single node under `parent`.
    ///
    /// # Errors
    /// - `TaxonError::UnknownParent` if `parent` is not in the hierarchy
    /// - `TaxonError::DuplicateNode` if `name` already is
    ///
    /// Both checks run before any status changes.
    pub fn insert_node(
        store: &mut TaxonomyStore,
        name: &NodeName,
        parent: &NodeName,
    ) -> Result<(), TaxonError> {
        if !store.hierarchy.contains(parent) {
            return Err(TaxonError::UnknownParent {
                node: name.clone(),
                parent: parent.clone(),
            });
        }
        if store.hierarchy.contains(name) {
            return Err(TaxonError::DuplicateNode(name.clone()));
        }

        // The parent's category was subdivided
        let granularity = store
            .index
            .images_of(parent)
            .map(|images| store.statuses.notify_granularity(images))
            .unwrap_or(0);

        // The parent's partition gained a member next to every existing child
        let mut coverage = 0usize;
        if let Some(siblings) = store.hierarchy.children(parent) {
            for sibling in siblings {
                if let Some(images) = store.index.images_of(sibling) {
                    coverage = coverage.saturating_add(store.statuses.notify_coverage(images));
                }
            }
        }

        store.hierarchy.attach(name.clone(), parent.clone());
        store.index.add_node(name.clone());

        tracing::debug!(
            node = %name,
            parent = %parent,
            granularity,
            coverage,
            "node inserted"
        );
        Ok(())
    }

    /// Reorder a batch so every parent precedes its children.
    ///
    /// The order is stable: a pair whose parent is already known is emitted in
    /// input position, and pairs waiting on a batch node are released right
    /// after that node, breadth-first.
    ///
    /// # Errors
    /// - `TaxonError::DuplicateNode` for the first name (in input order) that is
    ///   already in the hierarchy or repeated within the batch
    /// - `TaxonError::UnknownParent` for the first pair (in input order) whose
    ///   parent is neither in the hierarchy nor named in the batch
    /// - `TaxonError::CyclicBatch` with the names on a parent cycle
    pub fn order_batch<'a>(
        hierarchy: &HierarchyGraph,
        batch: &'a [NodeEntry],
    ) -> Result<Vec<&'a NodeEntry>, TaxonError> {
        let mut batch_names: BTreeSet<&NodeName> = BTreeSet::new();
        for (name, _) in batch {
            if hierarchy.contains(name) || !batch_names.insert(name) {
                return Err(TaxonError::DuplicateNode(name.clone()));
            }
        }

        let mut ordered = Vec::with_capacity(batch.len());
        let mut emitted: BTreeSet<&NodeName> = BTreeSet::new();
        let mut waiting: BTreeMap<&NodeName, Vec<&'a NodeEntry>> = BTreeMap::new();

        for entry in batch {
            let (name, parent) = entry;
            if !hierarchy.contains(parent) && !emitted.contains(parent) {
                waiting.entry(parent).or_default().push(entry);
                continue;
            }

            ordered.push(entry);
            emitted.insert(name);

            let mut released = VecDeque::from([name]);
            while let Some(ready) = released.pop_front() {
                for child in waiting.remove(ready).unwrap_or_default() {
                    ordered.push(child);
                    emitted.insert(&child.0);
                    released.push_back(&child.0);
                }
            }
        }

        if waiting.is_empty() {
            return Ok(ordered);
        }

        let stuck: Vec<&NodeEntry> = batch
            .iter()
            .filter(|(_, parent)| waiting.contains_key(parent))
            .collect();

        if let Some((name, parent)) = stuck.iter().find(|(_, p)| !batch_names.contains(p)) {
            return Err(TaxonError::UnknownParent {
                node: name.clone(),
                parent: parent.clone(),
            });
        }

        Err(TaxonError::CyclicBatch(Self::find_cycle(&stuck)))
    }

    /// Names on the parent cycle reached from the first stuck pair, sorted.
    ///
    /// Every stuck pair waits on another stuck batch name, so following
    /// parents from any of them ends in a cycle. Pairs that only hang off the
    /// cycle are left out.
    fn find_cycle(stuck: &[&NodeEntry]) -> Vec<NodeName> {
        let parents: BTreeMap<&NodeName, &NodeName> =
            stuck.iter().map(|(name, parent)| (name, parent)).collect();

        let mut path: Vec<&NodeName> = Vec::new();
        let mut current = stuck.first().map(|(name, _)| name);
        while let Some(node) = current {
            if let Some(start) = path.iter().position(|seen| *seen == node) {
                let mut cycle: Vec<NodeName> = path[start..].iter().map(|n| (*n).clone()).collect();
                cycle.sort();
                return cycle;
            }
            path.push(node);
            current = parents.get(node).copied();
        }

        // Unreachable for a batch whose names are unique
        let mut names: Vec<NodeName> = path.into_iter().cloned().collect();
        names.sort();
        names
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestor::Extract;
    use crate::options::StoreOptions;
    use crate::{ImageId, ImageStatus};

    fn entry(name: &str, parent: &str) -> NodeEntry {
        (NodeName::new(name), NodeName::new(parent))
    }

    fn names(entries: &[&NodeEntry]) -> Vec<String> {
        entries.iter().map(|(name, _)| name.0.clone()).collect()
    }

    fn tagged_store() -> TaxonomyStore {
        let mut store = TaxonomyStore::new("core");
        store
            .insert_nodes(&[entry("A", "core"), entry("B", "core")])
            .expect("build");
        let extract: Extract = [
            (ImageId::new("on_a"), vec![NodeName::new("A")]),
            (ImageId::new("on_b"), vec![NodeName::new("B")]),
            (ImageId::new("on_core"), vec![NodeName::new("core")]),
        ]
        .into();
        store.ingest_extract(&extract).expect("ingest");
        store
    }

    #[test]
    fn child_insertion_stages_parent_images_for_granularity() {
        let mut store = tagged_store();
        MutationEngine::insert_node(&mut store, &NodeName::new("A1"), &NodeName::new("A"))
            .expect("insert");

        assert_eq!(
            store.status_of(&ImageId::new("on_a")),
            Some(ImageStatus::GranularityStaged)
        );
        assert_eq!(store.status_of(&ImageId::new("on_b")), Some(ImageStatus::Valid));
    }

    #[test]
    fn sibling_insertion_stages_sibling_images_for_coverage() {
        let mut store = tagged_store();
        MutationEngine::insert_node(&mut store, &NodeName::new("D"), &NodeName::new("core"))
            .expect("insert");

        assert_eq!(
            store.status_of(&ImageId::new("on_a")),
            Some(ImageStatus::CoverageStaged)
        );
        assert_eq!(
            store.status_of(&ImageId::new("on_b")),
            Some(ImageStatus::CoverageStaged)
        );
        assert_eq!(
            store.status_of(&ImageId::new("on_core")),
            Some(ImageStatus::GranularityStaged)
        );
    }

    #[test]
    fn new_node_is_not_its_own_sibling() {
        let mut store = TaxonomyStore::new("core");
        store.insert_nodes(&[entry("A", "core")]).expect("build");
        let extract: Extract = [(ImageId::new("img"), vec![NodeName::new("A")])].into();
        store.ingest_extract(&extract).expect("ingest");

        // First child of A: only granularity applies to images on A
        store.insert_nodes(&[entry("A1", "A")]).expect("insert");
        assert_eq!(
            store.status_of(&ImageId::new("img")),
            Some(ImageStatus::GranularityStaged)
        );
    }

    #[test]
    fn earlier_batch_nodes_are_visible_to_later_pairs() {
        let mut store = TaxonomyStore::new("core");
        let inserted = store
            .insert_nodes(&[entry("A", "core"), entry("A1", "A"), entry("A11", "A1")])
            .expect("insert");

        assert_eq!(inserted, 3);
        assert_eq!(store.hierarchy().depth(&NodeName::new("A11")), Some(3));
    }

    #[test]
    fn unknown_parent_leaves_earlier_pairs_committed() {
        let mut store = TaxonomyStore::new("core");
        let result = store.insert_nodes(&[entry("A", "core"), entry("X", "Y"), entry("B", "core")]);

        assert!(matches!(
            result,
            Err(TaxonError::UnknownParent { ref parent, .. }) if parent.as_str() == "Y"
        ));
        assert!(store.contains_node(&NodeName::new("A")));
        assert!(!store.contains_node(&NodeName::new("X")));
        assert!(!store.contains_node(&NodeName::new("B")));
    }

    #[test]
    fn duplicate_node_rejected_without_side_effects() {
        let mut store = tagged_store();
        let result =
            MutationEngine::insert_node(&mut store, &NodeName::new("B"), &NodeName::new("A"));

        assert!(matches!(result, Err(TaxonError::DuplicateNode(_))));
        assert_eq!(store.status_of(&ImageId::new("on_a")), Some(ImageStatus::Valid));
        assert_eq!(
            store.hierarchy().parent_of(&NodeName::new("B")),
            Some(&NodeName::new("core"))
        );
    }

    #[test]
    fn order_batch_keeps_sorted_input() {
        let hierarchy = HierarchyGraph::new(NodeName::new("core"));
        let batch = vec![entry("A", "core"), entry("B", "core"), entry("A1", "A")];

        let ordered = MutationEngine::order_batch(&hierarchy, &batch).expect("order");
        assert_eq!(names(&ordered), vec!["A", "B", "A1"]);
    }

    #[test]
    fn order_batch_moves_children_after_parents() {
        let hierarchy = HierarchyGraph::new(NodeName::new("core"));
        let batch = vec![entry("A1", "A"), entry("A11", "A1"), entry("A", "core")];

        let ordered = MutationEngine::order_batch(&hierarchy, &batch).expect("order");
        assert_eq!(names(&ordered), vec!["A", "A1", "A11"]);
    }

    #[test]
    fn order_batch_reports_unknown_parent() {
        let hierarchy = HierarchyGraph::new(NodeName::new("core"));
        let batch = vec![entry("A", "core"), entry("X", "Y")];

        let result = MutationEngine::order_batch(&hierarchy, &batch);
        assert!(matches!(
            result,
            Err(TaxonError::UnknownParent { ref node, ref parent })
                if node.as_str() == "X" && parent.as_str() == "Y"
        ));
    }

    #[test]
    fn order_batch_reports_cycle() {
        let hierarchy = HierarchyGraph::new(NodeName::new("core"));
        let batch = vec![entry("P", "Q"), entry("Q", "P"), entry("A", "core")];

        let result = MutationEngine::order_batch(&hierarchy, &batch);
        assert!(matches!(
            result,
            Err(TaxonError::CyclicBatch(ref cycle))
                if *cycle == vec![NodeName::new("P"), NodeName::new("Q")]
        ));
    }

    #[test]
    fn order_batch_reports_only_cycle_members() {
        let hierarchy = HierarchyGraph::new(NodeName::new("core"));
        let batch = vec![entry("R", "P"), entry("P", "Q"), entry("Q", "P")];

        let result = MutationEngine::order_batch(&hierarchy, &batch);
        assert!(matches!(
            result,
            Err(TaxonError::CyclicBatch(ref cycle))
                if *cycle == vec![NodeName::new("P"), NodeName::new("Q")]
        ));
    }

    #[test]
    fn order_batch_rejects_existing_name() {
        let hierarchy = HierarchyGraph::new(NodeName::new("core"));
        let batch = vec![entry("A", "core"), entry("core", "A")];

        let result = MutationEngine::order_batch(&hierarchy, &batch);
        assert!(matches!(
            result,
            Err(TaxonError::DuplicateNode(ref name)) if name.as_str() == "core"
        ));
    }

    #[test]
    fn order_batch_rejects_repeated_name() {
        let hierarchy = HierarchyGraph::new(NodeName::new("core"));
        let batch = vec![entry("A", "core"), entry("B", "core"), entry("A", "B")];

        let result = MutationEngine::order_batch(&hierarchy, &batch);
        assert!(matches!(
            result,
            Err(TaxonError::DuplicateNode(ref name)) if name.as_str() == "A"
        ));
    }

    #[test]
    fn topological_duplicate_leaves_store_untouched() {
        let options = StoreOptions {
            ordering: BatchOrdering::Topological,
            ..StoreOptions::default()
        };
        let mut store = TaxonomyStore::with_options("core", options);
        store.insert_nodes(&[entry("A", "core")]).expect("build");
        let extract: Extract = [(ImageId::new("img"), vec![NodeName::new("A")])].into();
        store.ingest_extract(&extract).expect("ingest");

        let result = store.insert_nodes(&[entry("D", "core"), entry("A", "core")]);

        assert!(matches!(result, Err(TaxonError::DuplicateNode(_))));
        assert!(!store.contains_node(&NodeName::new("D")));
        assert_eq!(store.status_of(&ImageId::new("img")), Some(ImageStatus::Valid));
    }

    #[test]
    fn topological_store_rejects_before_mutating() {
        let options = StoreOptions {
            ordering: BatchOrdering::Topological,
            ..StoreOptions::default()
        };
        let mut store = TaxonomyStore::with_options("core", options);
        let result = store.insert_nodes(&[entry("A", "core"), entry("X", "Y")]);

        assert!(result.is_err());
        assert!(!store.contains_node(&NodeName::new("A")));
    }

    #[test]
    fn topological_store_accepts_unsorted_batch() {
        let options = StoreOptions {
            ordering: BatchOrdering::Topological,
            ..StoreOptions::default()
        };
        let mut store = TaxonomyStore::with_options("core", options);
        let inserted = store
            .insert_nodes(&[entry("A1", "A"), entry("A", "core")])
            .expect("insert");

        assert_eq!(inserted, 2);
        assert_eq!(
            store.hierarchy().parent_of(&NodeName::new("A1")),
            Some(&NodeName::new("A"))
        );
    }
}
