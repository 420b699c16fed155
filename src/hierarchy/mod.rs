//! Cluster hierarchies.
//!
//! A hierarchy here is the merge tree produced by an external agglomerative
//! clustering (typically Ward linkage) run over *clusters* of documents:
//!
//! ```text
//!         6
//!        / \
//!       4   5
//!      / \ / \
//!     0  1 2  3   (leaves = cluster ids)
//! ```
//!
//! Each leaf stands for one cluster id from the cluster assignment; each
//! internal node stands for the union of its children's documents.
//!
//! - [`ClusterTree`]: arena of [`Node`]s addressed by index, with stable
//!   pre-order enumeration and subtree membership queries
//! - [`Dendrogram`]: merge history in SciPy linkage convention, convertible
//!   into a [`ClusterTree`]
//! - [`validate_arena`]: structural checks run on construction

mod dendrogram;
mod node;
pub mod tree;
mod validate;

pub use dendrogram::{Dendrogram, Merge, MergeRow};
pub use node::Node;
pub use tree::{ClusterTree, PreOrder};
pub use validate::{validate_arena, Severity, ValidationIssue, ValidationReport};
