//! Arena-backed cluster hierarchy.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::warn;

use super::dendrogram::{Dendrogram, MergeRow};
use super::node::Node;
use super::validate::validate_arena;
use crate::error::{Error, Result};

/// A rooted tree over cluster ids, stored as an arena of [`Node`]s.
///
/// Nodes refer to their children by arena index. Construction validates the
/// arena, so every value of this type is a proper tree: every node is reachable
/// from the root exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterTree {
    nodes: Vec<Node>,
    root: usize,
}

/// On-disk tree layout, decoded before structural validation.
///
/// ```text
/// {"root": 2, "nodes": [{"leaf": 0}, {"leaf": 1}, {"children": [0, 1]}]}
/// {"n_leaves": 2, "merges": [[0, 1]]}
/// ```
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TreeArtifact {
    Arena { root: usize, nodes: Vec<Node> },
    Linkage { n_leaves: usize, merges: Vec<MergeRow> },
}

impl TreeArtifact {
    /// Validate the decoded layout into a tree.
    pub(crate) fn into_tree(self) -> Result<ClusterTree> {
        match self {
            TreeArtifact::Arena { root, nodes } => ClusterTree::new(nodes, root),
            TreeArtifact::Linkage { n_leaves, merges } => {
                ClusterTree::from_dendrogram(&Dendrogram::from_rows(n_leaves, &merges)?)
            }
        }
    }
}

impl ClusterTree {
    /// Create a tree from an arena and its root index.
    ///
    /// Fails with [`Error::InvalidTree`] on dangling indices, cycles, shared
    /// children, orphans or childless internal nodes.
    pub fn new(nodes: Vec<Node>, root: usize) -> Result<Self> {
        let report = validate_arena(&nodes, root);
        if let Some(issue) = report.worst().filter(|_| !report.is_healthy()) {
            let reason = match &issue.context {
                Some(ctx) => format!("{} ({ctx})", issue.message),
                None => issue.message.clone(),
            };
            return Err(Error::invalid_tree(issue.node_id.unwrap_or(root), reason));
        }
        for issue in report.warnings() {
            warn!(%issue, "cluster tree");
        }
        Ok(Self { nodes, root })
    }

    /// Create from a merge sequence over `n_leaves` clusters.
    ///
    /// Leaf `i` is cluster `i`; merge `k` creates node `n_leaves + k` and may
    /// only refer to nodes created before it. The last merge is the root.
    pub fn from_merges(n_leaves: usize, merges: &[(usize, usize)]) -> Result<Self> {
        if n_leaves == 0 {
            return Err(Error::EmptyInput);
        }

        let mut nodes: Vec<Node> = (0..n_leaves).map(Node::leaf).collect();
        for &(a, b) in merges {
            let id = nodes.len();
            if a >= id || b >= id {
                return Err(Error::invalid_tree(
                    id,
                    format!("merge refers to ({a}, {b}) before they exist"),
                ));
            }
            nodes.push(Node::internal(vec![a, b]));
        }

        let root = nodes.len() - 1;
        Self::new(nodes, root)
    }

    /// Create from a dendrogram.
    pub fn from_dendrogram(dend: &Dendrogram) -> Result<Self> {
        let merges: Vec<(usize, usize)> = dend
            .merges()
            .map(|m| (m.cluster_a, m.cluster_b))
            .collect();
        Self::from_merges(dend.n_clusters(), &merges)
    }

    /// Arena index of the root.
    pub fn root(&self) -> usize {
        self.root
    }

    /// All nodes, in arena order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node at arena index `id`.
    pub fn get(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a constructed tree; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Enumerate every node lazily, pre-order from the root, children in
    /// stored order.
    ///
    /// The order depends only on the tree, so the `n`-th item is the same
    /// node on every call.
    pub fn iter_nodes(&self) -> PreOrder<'_> {
        PreOrder::new(self, self.root)
    }

    /// Enumerate the subtree rooted at `id` in pre-order.
    pub fn iter_subtree(&self, id: usize) -> PreOrder<'_> {
        PreOrder::new(self, id)
    }

    /// Leaf cluster ids beneath `id`, in enumeration order.
    pub fn subtree_clusters(&self, id: usize) -> Vec<usize> {
        self.iter_subtree(id)
            .filter_map(|n| self.nodes[n].cluster())
            .collect()
    }

    /// Document indices (ascending) whose cluster lies beneath `id`.
    ///
    /// `assignment[doc]` is the cluster of document `doc`. The subtree's
    /// document count is the length of the result.
    pub fn subtree_documents(&self, id: usize, assignment: &[usize]) -> Vec<usize> {
        let clusters: BTreeSet<usize> = self.subtree_clusters(id).into_iter().collect();
        assignment
            .iter()
            .enumerate()
            .filter(|(_, cluster)| clusters.contains(cluster))
            .map(|(doc, _)| doc)
            .collect()
    }
}

/// Pre-order iterator over arena indices. See [`ClusterTree::iter_nodes`].
#[derive(Debug, Clone)]
pub struct PreOrder<'a> {
    tree: &'a ClusterTree,
    stack: Vec<usize>,
}

impl<'a> PreOrder<'a> {
    fn new(tree: &'a ClusterTree, start: usize) -> Self {
        let stack = if start < tree.nodes.len() {
            vec![start]
        } else {
            Vec::new()
        };
        Self { tree, stack }
    }
}

impl Iterator for PreOrder<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id].children().iter().rev().copied());
        Some(id)
    }
}
