//! Cluster means and count-weighted branch means.
//!
//! Leaf clusters are summarized by the arithmetic mean of their documents'
//! weight vectors. An internal node's mean is the document-count-weighted
//! mean of its children's means:
//!
//! ```text
//! mean(node)  = Σ count(c) · mean(c) / Σ count(c)
//! count(node) = Σ count(c)
//! ```
//!
//! which equals the plain mean over every document beneath the node.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView2};
use tracing::debug;

use crate::error::{Error, Result};
use crate::hierarchy::{ClusterTree, Node};

/// Mean weight vector of a group of documents and the group's size.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanRow {
    /// Mean weight per term.
    pub mean: Array1<f64>,
    /// Number of documents averaged.
    pub count: usize,
}

/// Per-cluster mean rows, addressable by cluster id.
#[derive(Debug, Clone, Default)]
pub struct ClusterMeans {
    rows: BTreeMap<usize, MeanRow>,
    n_terms: usize,
}

impl ClusterMeans {
    /// Row for `cluster`, if any document was assigned to it.
    pub fn get(&self, cluster: usize) -> Option<&MeanRow> {
        self.rows.get(&cluster)
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when built from an empty assignment.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of every mean vector.
    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    /// Iterate `(cluster, row)` in ascending cluster order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &MeanRow)> {
        self.rows.iter().map(|(&c, row)| (c, row))
    }
}

/// Build the cluster mean table.
///
/// Document `i` belongs to cluster `assignment[i]`; only the first
/// `assignment.len()` rows of `weights` are read. An empty assignment gives
/// an empty table.
pub fn cluster_means(assignment: &[usize], weights: ArrayView2<'_, f64>) -> Result<ClusterMeans> {
    if assignment.len() > weights.nrows() {
        return Err(Error::shape(
            format!("at most {} assigned documents", weights.nrows()),
            format!("{} assigned documents", assignment.len()),
        ));
    }

    let n_terms = weights.ncols();
    let mut sums: BTreeMap<usize, MeanRow> = BTreeMap::new();
    for (doc, &cluster) in assignment.iter().enumerate() {
        let acc = sums.entry(cluster).or_insert_with(|| MeanRow {
            mean: Array1::zeros(n_terms),
            count: 0,
        });
        acc.mean += &weights.row(doc);
        acc.count += 1;
    }

    for row in sums.values_mut() {
        let n = row.count as f64;
        row.mean.mapv_inplace(|v| v / n);
    }

    debug!(clusters = sums.len(), terms = n_terms, "built cluster means");
    Ok(ClusterMeans {
        rows: sums,
        n_terms,
    })
}

/// Count-weighted mean of `node`'s subtree, computed recursively.
///
/// Leaves return their cluster's row unchanged. Fails with
/// [`Error::InvalidTree`] when a leaf's cluster has no documents or a
/// subtree's total count is zero.
pub fn branch_mean(tree: &ClusterTree, node: usize, means: &ClusterMeans) -> Result<MeanRow> {
    match tree.get(node) {
        None => Err(Error::invalid_tree(node, "node index outside tree")),
        Some(Node::Leaf(cluster)) => leaf_row(node, *cluster, means),
        Some(Node::Children(children)) => {
            let rows = children
                .iter()
                .map(|&c| branch_mean(tree, c, means))
                .collect::<Result<Vec<_>>>()?;
            combine(node, rows.iter(), means.n_terms())
        }
    }
}

/// Mean rows for every node, in [`ClusterTree::iter_nodes`] order.
///
/// Each subtree is computed once (children before parents); the results are
/// identical to calling [`branch_mean`] on every node.
pub fn node_rows(tree: &ClusterTree, means: &ClusterMeans) -> Result<Vec<MeanRow>> {
    let order: Vec<usize> = tree.iter_nodes().collect();
    let mut memo: Vec<Option<MeanRow>> = vec![None; tree.len()];

    // Reverse pre-order visits every child before its parent.
    for &id in order.iter().rev() {
        let row = match &tree.nodes()[id] {
            Node::Leaf(cluster) => leaf_row(id, *cluster, means)?,
            Node::Children(children) => {
                let rows = children
                    .iter()
                    .map(|&c| {
                        memo[c]
                            .as_ref()
                            .ok_or_else(|| Error::invalid_tree(c, "child not computed"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                combine(id, rows.into_iter(), means.n_terms())?
            }
        };
        memo[id] = Some(row);
    }

    let rows = order
        .iter()
        .map(|&id| {
            memo[id]
                .take()
                .ok_or_else(|| Error::invalid_tree(id, "node not computed"))
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(nodes = rows.len(), "aggregated branch means");
    Ok(rows)
}

fn leaf_row(node: usize, cluster: usize, means: &ClusterMeans) -> Result<MeanRow> {
    means.get(cluster).cloned().ok_or_else(|| {
        Error::invalid_tree(node, format!("leaf cluster {cluster} has no documents"))
    })
}

fn combine<'a>(
    node: usize,
    children: impl Iterator<Item = &'a MeanRow>,
    n_terms: usize,
) -> Result<MeanRow> {
    let mut acc = Array1::<f64>::zeros(n_terms);
    let mut count = 0usize;
    for child in children {
        acc.scaled_add(child.count as f64, &child.mean);
        count += child.count;
    }
    if count == 0 {
        return Err(Error::invalid_tree(node, "subtree has zero documents"));
    }
    let total = count as f64;
    acc.mapv_inplace(|v| v / total);
    Ok(MeanRow { mean: acc, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use proptest::prelude::*;

    fn assert_close(a: &Array1<f64>, b: &Array1<f64>) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-12, "{a} != {b}");
        }
    }

    #[test]
    fn test_cluster_means_basic() {
        let weights = array![[1.0, 0.0], [0.0, 1.0], [0.0, 4.0], [9.0, 9.0]];
        let means = cluster_means(&[0, 0, 1], weights.view()).unwrap();

        assert_eq!(means.len(), 2);
        assert_eq!(means.get(0).unwrap().mean, array![0.5, 0.5]);
        assert_eq!(means.get(0).unwrap().count, 2);
        assert_eq!(means.get(1).unwrap().mean, array![0.0, 4.0]);
        assert_eq!(means.get(1).unwrap().count, 1);
    }

    #[test]
    fn test_cluster_means_sparse_labels() {
        let weights = array![[2.0], [4.0]];
        let means = cluster_means(&[7, 3], weights.view()).unwrap();
        let ids: Vec<usize> = means.iter().map(|(c, _)| c).collect();
        assert_eq!(ids, vec![3, 7]);
        assert!(means.get(0).is_none());
    }

    #[test]
    fn test_empty_assignment_gives_empty_table() {
        let weights = Array2::<f64>::zeros((3, 4));
        let means = cluster_means(&[], weights.view()).unwrap();
        assert!(means.is_empty());
        assert_eq!(means.n_terms(), 4);
    }

    #[test]
    fn test_assignment_beyond_matrix() {
        let weights = Array2::<f64>::zeros((1, 2));
        assert!(matches!(
            cluster_means(&[0, 0], weights.view()),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_leaf_pass_through() {
        let weights = array![[0.2, 0.8], [0.6, 0.4], [1.0, 0.0]];
        let means = cluster_means(&[0, 1, 1], weights.view()).unwrap();
        let tree = ClusterTree::from_merges(2, &[(0, 1)]).unwrap();

        assert_eq!(&branch_mean(&tree, 0, &means).unwrap(), means.get(0).unwrap());
        assert_eq!(&branch_mean(&tree, 1, &means).unwrap(), means.get(1).unwrap());
    }

    #[test]
    fn test_two_leaf_weighted_mean() {
        // m1 = [0.2, 0.8] (c1 = 1), m2 = [0.8, 0.2] (c2 = 2)
        let weights = array![[0.2, 0.8], [0.6, 0.4], [1.0, 0.0]];
        let means = cluster_means(&[0, 1, 1], weights.view()).unwrap();
        let tree = ClusterTree::from_merges(2, &[(0, 1)]).unwrap();

        let root = branch_mean(&tree, 2, &means).unwrap();
        assert_eq!(root.count, 3);
        let expected = (array![0.2, 0.8] * 1.0 + array![0.8, 0.2] * 2.0) / 3.0;
        assert_close(&root.mean, &expected);
    }

    #[test]
    fn test_root_equals_mean_of_all_documents() {
        let weights = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.5, 0.5, 0.0]];
        let assignment = [0, 1, 2, 0];
        let means = cluster_means(&assignment, weights.view()).unwrap();
        let tree = ClusterTree::from_merges(3, &[(1, 2), (0, 3)]).unwrap();

        let root = branch_mean(&tree, tree.root(), &means).unwrap();
        assert_eq!(root.count, 4);
        assert_close(&root.mean, &array![0.375, 0.375, 0.25]);
    }

    #[test]
    fn test_missing_leaf_cluster_is_invalid_tree() {
        let weights = array![[1.0], [1.0]];
        let means = cluster_means(&[0, 0], weights.view()).unwrap();
        let tree = ClusterTree::from_merges(2, &[(0, 1)]).unwrap();

        assert!(matches!(
            branch_mean(&tree, 2, &means),
            Err(Error::InvalidTree { node: 1, .. })
        ));
        assert!(matches!(
            node_rows(&tree, &means),
            Err(Error::InvalidTree { node: 1, .. })
        ));
    }

    #[test]
    fn test_zero_count_subtree_is_invalid_tree() {
        let nodes = vec![Node::leaf(0), Node::leaf(1), Node::internal(vec![0, 1])];
        let tree = ClusterTree::new(nodes, 2).unwrap();
        let mut means = ClusterMeans {
            rows: BTreeMap::new(),
            n_terms: 1,
        };
        for c in 0..2 {
            means.rows.insert(
                c,
                MeanRow {
                    mean: array![0.0],
                    count: 0,
                },
            );
        }
        assert!(matches!(
            branch_mean(&tree, 2, &means),
            Err(Error::InvalidTree { node: 2, .. })
        ));
    }

    #[test]
    fn test_node_rows_follow_enumeration_order() {
        let weights = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 2.0]];
        let means = cluster_means(&[0, 1, 2, 3], weights.view()).unwrap();
        let tree = ClusterTree::from_merges(4, &[(0, 1), (2, 3), (4, 5)]).unwrap();

        let rows = node_rows(&tree, &means).unwrap();
        let counts: Vec<usize> = rows.iter().map(|r| r.count).collect();
        // Pre-order: 6, 4, 0, 1, 5, 2, 3
        assert_eq!(counts, vec![4, 2, 1, 1, 2, 1, 1]);
        assert_eq!(rows[2].mean, array![1.0, 0.0]);
        assert_close(&rows[4].mean, &array![0.5, 1.5]);
    }

    proptest! {
        #[test]
        fn memoized_rows_match_recursive(
            docs in proptest::collection::vec(proptest::collection::vec(0.0f64..1.0, 3), 1..30),
            n_clusters in 1usize..8,
        ) {
            let n = docs.len();
            let flat: Vec<f64> = docs.into_iter().flatten().collect();
            let weights = Array2::from_shape_vec((n, 3), flat).unwrap();
            // Every cluster gets its own document first, the rest round-robin.
            let k = n_clusters.min(n);
            let assignment: Vec<usize> = (0..n).map(|i| i % k).collect();
            let means = cluster_means(&assignment, weights.view()).unwrap();

            let mut merges = Vec::new();
            let mut last = 0;
            for leaf in 1..k {
                merges.push((leaf, last));
                last = k + merges.len() - 1;
            }
            let tree = ClusterTree::from_merges(k, &merges).unwrap();

            let rows = node_rows(&tree, &means).unwrap();
            for (row, id) in rows.iter().zip(tree.iter_nodes()) {
                let direct = branch_mean(&tree, id, &means).unwrap();
                prop_assert_eq!(row, &direct);
            }
            prop_assert_eq!(rows[0].count, n);
        }
    }
}
