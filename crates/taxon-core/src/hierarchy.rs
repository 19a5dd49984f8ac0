//! # Hierarchy Graph
//!
//! Parent -> children adjacency over node names, rooted at one root node.
//!
//! All data structures use `BTreeMap` for deterministic ordering.
//! Nodes are only ever added: a node never changes parent and is never removed.

use crate::primitives::MAX_RENDER_DEPTH;
use crate::NodeName;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The taxonomy tree.
///
/// Every node, leaves included, has an entry in `children`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyGraph {
    /// The node with no parent.
    root: NodeName,

    /// Adjacency list: node -> direct children
    children: BTreeMap<NodeName, BTreeSet<NodeName>>,

    /// Reverse lookup: node -> parent (absent for the root)
    parents: BTreeMap<NodeName, NodeName>,
}

impl HierarchyGraph {
    /// Create a hierarchy holding only the root.
    #[must_use]
    pub fn new(root: NodeName) -> Self {
        let mut children = BTreeMap::new();
        children.insert(root.clone(), BTreeSet::new());
        Self {
            root,
            children,
            parents: BTreeMap::new(),
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &NodeName {
        &self.root
    }

    /// Check if the hierarchy contains a node.
    #[must_use]
    pub fn contains(&self, name: &NodeName) -> bool {
        self.children.contains_key(name)
    }

    /// Direct children of a node, `None` if the node is unknown.
    #[must_use]
    pub fn children(&self, name: &NodeName) -> Option<&BTreeSet<NodeName>> {
        self.children.get(name)
    }

    /// Parent of a node. `None` for the root and for unknown nodes.
    #[must_use]
    pub fn parent_of(&self, name: &NodeName) -> Option<&NodeName> {
        self.parents.get(name)
    }

    /// All node names in deterministic order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeName> {
        self.children.keys()
    }

    /// Total number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.children.len()
    }

    /// Ancestors of a node, nearest first, ending with the root.
    #[must_use]
    pub fn ancestors(&self, name: &NodeName) -> Vec<NodeName> {
        let mut chain = Vec::new();
        let mut current = name;
        while let Some(parent) = self.parents.get(current) {
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    /// Depth of a node (root = 0). `None` if the node is unknown.
    #[must_use]
    pub fn depth(&self, name: &NodeName) -> Option<usize> {
        self.contains(name).then(|| self.ancestors(name).len())
    }

    /// Depth-first listing of `(depth, name)` from `start`, children sorted.
    ///
    /// Bounded by `MAX_RENDER_DEPTH`; deeper nodes are skipped.
    #[must_use]
    pub fn walk(&self, start: &NodeName) -> Vec<(usize, NodeName)> {
        let mut out = Vec::new();
        if !self.contains(start) {
            return out;
        }

        let mut stack = vec![(0usize, start)];
        while let Some((depth, current)) = stack.pop() {
            out.push((depth, current.clone()));
            if depth >= MAX_RENDER_DEPTH {
                continue;
            }
            if let Some(kids) = self.children.get(current) {
                // Reverse so the smallest child is popped first
                for child in kids.iter().rev() {
                    stack.push((depth.saturating_add(1), child));
                }
            }
        }
        out
    }

    /// Link `name` under `parent` and create its (empty) child entry.
    ///
    /// Callers check that `parent` exists and `name` does not.
    pub(crate) fn attach(&mut self, name: NodeName, parent: NodeName) {
        self.children
            .entry(parent.clone())
            .or_default()
            .insert(name.clone());
        self.children.insert(name.clone(), BTreeSet::new());
        self.parents.insert(name, parent);
    }
}

// =============================================================================
// SERIALIZATION SUPPORT
// =============================================================================

/// Flat `(name, parent)` listing of a hierarchy, root first.
///
/// Parents always precede their children, so the listing can be fed
/// straight back into an insertion batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableHierarchy {
    pub root: NodeName,
    pub nodes: Vec<(NodeName, NodeName)>,
}

impl From<&HierarchyGraph> for SerializableHierarchy {
    fn from(graph: &HierarchyGraph) -> Self {
        let mut nodes = Vec::with_capacity(graph.node_count().saturating_sub(1));
        let mut frontier = vec![graph.root.clone()];
        while let Some(current) = frontier.pop() {
            if let Some(kids) = graph.children.get(&current) {
                for child in kids.iter().rev() {
                    nodes.push((child.clone(), current.clone()));
                    frontier.push(child.clone());
                }
            }
        }
        Self {
            root: graph.root.clone(),
            nodes,
        }
    }
}

impl SerializableHierarchy {
    /// Listing of the nodes `walk` reaches from the root.
    ///
    /// Same depth bound as `walk`, in preorder, so parents still precede
    /// their children.
    #[must_use]
    pub fn bounded(graph: &HierarchyGraph) -> Self {
        let nodes = graph
            .walk(&graph.root)
            .into_iter()
            .filter_map(|(_, name)| {
                let parent = graph.parents.get(&name)?.clone();
                Some((name, parent))
            })
            .collect();
        Self {
            root: graph.root.clone(),
            nodes,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> NodeName {
        NodeName::new(s)
    }

    fn chain(length: usize) -> HierarchyGraph {
        let mut graph = HierarchyGraph::new(n("core"));
        let mut parent = n("core");
        for i in 0..length {
            let name = NodeName::new(format!("d{}", i));
            graph.attach(name.clone(), parent);
            parent = name;
        }
        graph
    }

    fn sample() -> HierarchyGraph {
        let mut graph = HierarchyGraph::new(n("core"));
        graph.attach(n("A"), n("core"));
        graph.attach(n("B"), n("core"));
        graph.attach(n("C"), n("core"));
        graph.attach(n("C1"), n("C"));
        graph
    }

    #[test]
    fn new_graph_has_only_root() {
        let graph = HierarchyGraph::new(n("core"));
        assert_eq!(graph.node_count(), 1);
        assert!(graph.contains(&n("core")));
        assert!(graph.children(&n("core")).is_some_and(BTreeSet::is_empty));
        assert_eq!(graph.parent_of(&n("core")), None);
    }

    #[test]
    fn attach_creates_leaf_entry() {
        let graph = sample();
        assert_eq!(graph.node_count(), 5);
        assert!(graph.children(&n("C1")).is_some_and(BTreeSet::is_empty));
        assert_eq!(graph.parent_of(&n("C1")), Some(&n("C")));
    }

    #[test]
    fn children_in_deterministic_order() {
        let graph = sample();
        let kids: Vec<_> = graph
            .children(&n("core"))
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        assert_eq!(kids, vec![n("A"), n("B"), n("C")]);
    }

    #[test]
    fn ancestors_and_depth() {
        let graph = sample();
        assert_eq!(graph.ancestors(&n("C1")), vec![n("C"), n("core")]);
        assert_eq!(graph.depth(&n("C1")), Some(2));
        assert_eq!(graph.depth(&n("core")), Some(0));
        assert_eq!(graph.depth(&n("missing")), None);
    }

    #[test]
    fn walk_is_preorder() {
        let graph = sample();
        let names: Vec<_> = graph
            .walk(&n("core"))
            .into_iter()
            .map(|(d, name)| (d, name.0))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "core".to_string()),
                (1, "A".to_string()),
                (1, "B".to_string()),
                (1, "C".to_string()),
                (2, "C1".to_string()),
            ]
        );
    }

    #[test]
    fn walk_missing_node_is_empty() {
        let graph = sample();
        assert!(graph.walk(&n("nope")).is_empty());
    }

    #[test]
    fn serializable_listing_puts_parents_first() {
        let graph = sample();
        let listing = SerializableHierarchy::from(&graph);
        assert_eq!(listing.root, n("core"));
        assert_eq!(listing.nodes.len(), 4);

        let mut rebuilt = HierarchyGraph::new(listing.root.clone());
        for (name, parent) in listing.nodes {
            assert!(rebuilt.contains(&parent));
            rebuilt.attach(name, parent);
        }
        assert_eq!(rebuilt, graph);
    }

    #[test]
    fn walk_stops_at_render_depth() {
        let graph = chain(MAX_RENDER_DEPTH + 6);
        let walked = graph.walk(&n("core"));

        assert_eq!(walked.len(), MAX_RENDER_DEPTH + 1);
        assert_eq!(walked.last().map(|(depth, _)| *depth), Some(MAX_RENDER_DEPTH));
        assert!(!walked.iter().any(|(_, name)| name.as_str() == "d64"));
    }

    #[test]
    fn bounded_listing_matches_walk() {
        let graph = chain(MAX_RENDER_DEPTH + 6);

        let full = SerializableHierarchy::from(&graph);
        let bounded = SerializableHierarchy::bounded(&graph);

        assert_eq!(full.nodes.len(), MAX_RENDER_DEPTH + 6);
        assert_eq!(bounded.nodes.len(), MAX_RENDER_DEPTH);
        assert_eq!(bounded.nodes.first(), Some(&(n("d0"), n("core"))));
        assert!(bounded.nodes.iter().all(|(name, _)| graph.depth(name) <= Some(MAX_RENDER_DEPTH)));
    }

    #[test]
    fn bounded_listing_of_shallow_graph_is_complete() {
        let graph = sample();
        let bounded = SerializableHierarchy::bounded(&graph);
        assert_eq!(bounded.nodes.len(), 4);
        assert_eq!(bounded.nodes[0], (n("A"), n("core")));
    }
}
