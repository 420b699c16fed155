//! Merge history of an agglomerative clustering over clusters.
//!
//! A dendrogram here records how the leaf *clusters* were merged, using the
//! SciPy/MATLAB labelling convention:
//! - leaves: `0..n_clusters` (leaf `i` is cluster id `i`)
//! - merge `k` creates node `n_clusters + k`
//!
//! The last merge is the root. [`ClusterTree::from_dendrogram`](super::ClusterTree::from_dendrogram)
//! turns the history into an arena.

use serde::Deserialize;

use crate::error::{Error, Result};

/// A dendrogram over leaf clusters.
#[derive(Debug, Clone)]
pub struct Dendrogram {
    /// Merge history, in merge order.
    merges: Vec<Merge>,
    /// Number of leaf clusters.
    n_clusters: usize,
}

/// A single merge operation in the dendrogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    /// First node being merged (index).
    pub cluster_a: usize,
    /// Second node being merged (index).
    pub cluster_b: usize,
}

/// One row of a serialized merge history.
///
/// Either a bare pair `[a, b]` or a SciPy linkage row `[a, b, distance, size]`
/// (SciPy stores all four as floats). Only the two ids are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MergeRow {
    /// `[a, b]`
    Pair(usize, usize),
    /// `[a, b, distance, size]`
    Linkage(f64, f64, f64, f64),
}

impl Dendrogram {
    /// Create an empty dendrogram over `n_clusters` leaves.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            merges: Vec::with_capacity(n_clusters.saturating_sub(1)),
            n_clusters,
        }
    }

    /// Build a dendrogram from serialized merge rows.
    ///
    /// Linkage rows must carry non-negative integral node ids.
    pub fn from_rows(n_clusters: usize, rows: &[MergeRow]) -> Result<Self> {
        let mut dendro = Self::new(n_clusters);
        for (k, row) in rows.iter().enumerate() {
            match *row {
                MergeRow::Pair(a, b) => dendro.add_merge(a, b),
                MergeRow::Linkage(a, b, _, _) => {
                    let id = n_clusters + k;
                    let a = integral_id(a).ok_or_else(|| {
                        Error::invalid_tree(id, format!("linkage id {a} is not an index"))
                    })?;
                    let b = integral_id(b).ok_or_else(|| {
                        Error::invalid_tree(id, format!("linkage id {b} is not an index"))
                    })?;
                    dendro.add_merge(a, b);
                }
            }
        }
        Ok(dendro)
    }

    /// Record a merge operation.
    pub fn add_merge(&mut self, cluster_a: usize, cluster_b: usize) {
        self.merges.push(Merge {
            cluster_a,
            cluster_b,
        });
    }

    /// Number of leaf clusters.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Iterate over merges.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }
}

fn integral_id(v: f64) -> Option<usize> {
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0).then_some(v as usize)
}
