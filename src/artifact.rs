//! Input artifacts.
//!
//! Four externally produced inputs drive a run:
//!
//! | Artifact | JSON layout |
//! |---|---|
//! | weight matrix | `[[f64, ...], ...]` or CSR `{"shape", "indptr", "indices", "data"}` |
//! | vocabulary | `["term", ...]` |
//! | cluster assignment | `[cluster_id, ...]`, one per leading matrix row |
//! | hierarchy | `{"root", "nodes"}` arena or `{"n_leaves", "merges"}` linkage |
//!
//! All four are loaded fully before any processing, and their shapes are
//! cross-checked by [`Artifacts::new`] so that inconsistencies fail before
//! aggregation starts.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::hierarchy::tree::TreeArtifact;
use crate::hierarchy::ClusterTree;

/// Document-term weight matrix as stored on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WeightMatrix {
    /// Row-major dense rows.
    Dense(Vec<Vec<f64>>),
    /// Compressed sparse rows.
    Csr(CsrMatrix),
}

/// Compressed sparse row matrix (the layout TF-IDF vectorizers emit).
#[derive(Debug, Clone, Deserialize)]
pub struct CsrMatrix {
    /// `(rows, cols)`.
    pub shape: (usize, usize),
    /// Row start offsets into `indices`/`data`, length `rows + 1`.
    pub indptr: Vec<usize>,
    /// Column index of each stored value.
    pub indices: Vec<usize>,
    /// Stored values.
    pub data: Vec<f64>,
}

impl WeightMatrix {
    /// Densify into an `ndarray` matrix.
    ///
    /// Rejects ragged rows, inconsistent CSR buffers, and weights that are
    /// negative or not finite.
    pub fn into_dense(self) -> std::result::Result<Array2<f64>, String> {
        let dense = match self {
            WeightMatrix::Dense(rows) => {
                let n = rows.len();
                let d = rows.first().map_or(0, Vec::len);
                if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != d) {
                    return Err(format!("row {i} has {} columns, expected {d}", row.len()));
                }
                let flat: Vec<f64> = rows.into_iter().flatten().collect();
                Array2::from_shape_vec((n, d), flat).map_err(|e| e.to_string())?
            }
            WeightMatrix::Csr(csr) => csr.into_dense()?,
        };

        if let Some(bad) = dense.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(format!("weight {bad} is not a finite non-negative number"));
        }
        Ok(dense)
    }
}

impl CsrMatrix {
    fn into_dense(self) -> std::result::Result<Array2<f64>, String> {
        let (rows, cols) = self.shape;
        if self.indptr.len() != rows + 1 {
            return Err(format!(
                "indptr has {} entries, expected {}",
                self.indptr.len(),
                rows + 1
            ));
        }
        if self.indices.len() != self.data.len() {
            return Err(format!(
                "{} indices for {} values",
                self.indices.len(),
                self.data.len()
            ));
        }
        if self.indptr.first() != Some(&0) || self.indptr.last() != Some(&self.data.len()) {
            return Err("indptr does not span the stored values".to_string());
        }

        let mut dense = Array2::zeros((rows, cols));
        for (row, span) in self.indptr.windows(2).enumerate() {
            if span[0] > span[1] {
                return Err(format!("indptr decreases at row {row}"));
            }
            for k in span[0]..span[1] {
                let col = self.indices[k];
                if col >= cols {
                    return Err(format!("column {col} out of range for width {cols}"));
                }
                dense[(row, col)] += self.data[k];
            }
        }
        Ok(dense)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::missing(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::missing(path, e))
}

/// Load and densify the document weight matrix.
pub fn load_weights(path: &Path) -> Result<Array2<f64>> {
    read_json::<WeightMatrix>(path)?
        .into_dense()
        .map_err(|reason| Error::missing(path, reason))
}

/// Load the vocabulary (term list).
pub fn load_vocabulary(path: &Path) -> Result<Vec<String>> {
    read_json(path)
}

/// Load the cluster assignment.
pub fn load_assignment(path: &Path) -> Result<Vec<usize>> {
    read_json(path)
}

/// Load the cluster hierarchy.
///
/// Unreadable or undecodable JSON is [`Error::MissingArtifact`]; a decoded
/// layout that is not a tree is [`Error::InvalidTree`].
pub fn load_tree(path: &Path) -> Result<ClusterTree> {
    read_json::<TreeArtifact>(path)?.into_tree()
}

/// The four inputs of a run, shape-checked against each other.
#[derive(Debug, Clone)]
pub struct Artifacts {
    weights: Array2<f64>,
    vocabulary: Vec<String>,
    assignment: Vec<usize>,
    tree: ClusterTree,
}

impl Artifacts {
    /// Bundle already-loaded inputs, checking that they agree.
    ///
    /// - vocabulary length must equal the matrix width ([`Error::ShapeMismatch`])
    /// - the assignment may not cover more documents than the matrix has rows
    ///   ([`Error::ShapeMismatch`])
    /// - every leaf cluster of the tree must have at least one assigned
    ///   document ([`Error::InvalidTree`])
    pub fn new(
        weights: Array2<f64>,
        vocabulary: Vec<String>,
        assignment: Vec<usize>,
        tree: ClusterTree,
    ) -> Result<Self> {
        if vocabulary.len() != weights.ncols() {
            return Err(Error::shape(
                format!("{} terms (matrix width)", weights.ncols()),
                format!("{} vocabulary entries", vocabulary.len()),
            ));
        }
        if assignment.len() > weights.nrows() {
            return Err(Error::shape(
                format!("at most {} assigned documents", weights.nrows()),
                format!(
                    "assignment references document {}",
                    assignment.len() - 1
                ),
            ));
        }

        let present: BTreeSet<usize> = assignment.iter().copied().collect();
        for (id, node) in tree.nodes().iter().enumerate() {
            if let Some(cluster) = node.cluster() {
                if !present.contains(&cluster) {
                    return Err(Error::invalid_tree(
                        id,
                        format!("leaf cluster {cluster} has no assigned documents"),
                    ));
                }
            }
        }

        debug!(
            documents = weights.nrows(),
            terms = weights.ncols(),
            assigned = assignment.len(),
            clusters = present.len(),
            nodes = tree.len(),
            "artifacts consistent"
        );

        Ok(Self {
            weights,
            vocabulary,
            assignment,
            tree,
        })
    }

    /// Load all four artifacts from disk, then check them.
    pub fn load(
        weights_path: &Path,
        vocabulary_path: &Path,
        assignment_path: &Path,
        tree_path: &Path,
    ) -> Result<Self> {
        let weights = load_weights(weights_path)?;
        let vocabulary = load_vocabulary(vocabulary_path)?;
        let assignment = load_assignment(assignment_path)?;
        let tree = load_tree(tree_path)?;
        info!(
            documents = weights.nrows(),
            terms = vocabulary.len(),
            nodes = tree.len(),
            "loaded artifacts"
        );
        Self::new(weights, vocabulary, assignment, tree)
    }

    /// Document weight matrix.
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Vocabulary, aligned with matrix columns.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Cluster of each leading document.
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Cluster hierarchy.
    pub fn tree(&self) -> &ClusterTree {
        &self.tree
    }
}
