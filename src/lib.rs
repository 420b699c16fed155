//! # tiercloud
//!
//! Word clouds for every node of a document-cluster hierarchy.
//!
//! Given a document-term weight matrix (e.g. TF-IDF), its vocabulary, a flat
//! cluster assignment, and a merge tree over those clusters, `tiercloud`
//! computes a representative term distribution for each tree node and turns it
//! into a text blob suitable for a word-cloud renderer:
//!
//! ```text
//! assignment + weights ──► cluster means ──► branch means (per node)
//!                                               │
//!                  blob ◄── serialize ◄── quantize (×1e5, truncate, ÷gcd)
//!                   │
//!                   └──► Renderer ──► <prefix>cloud<N>.png
//! ```
//!
//! Clustering and term weighting happen upstream; this crate only aggregates
//! and renders.
//!
//! ```rust,ignore
//! use tiercloud::{run, CloudConfig};
//!
//! let report = run(&CloudConfig::new().with_prefix("clouds/"))?;
//! println!("{} images", report.written.len());
//! ```

pub mod artifact;
pub mod blob;
/// Error types used across `tiercloud`.
pub mod error;
pub mod hierarchy;
pub mod means;
pub mod pipeline;
pub mod quantize;
pub mod render;

pub use artifact::{Artifacts, WeightMatrix};
pub use error::{Error, Result};
pub use hierarchy::{ClusterTree, Dendrogram, Node};
pub use means::{branch_mean, cluster_means, node_rows, ClusterMeans, MeanRow};
pub use pipeline::{
    node_blobs, render_blobs, vec2cloud, vec2words, CloudConfig, EmptyBlobPolicy,
    RenderErrorPolicy, RunReport,
};
pub use quantize::{quantize, SCALE};
pub use render::{from_fn, Renderer};

#[cfg(feature = "png")]
pub use pipeline::run;
#[cfg(feature = "png")]
pub use render::{CanvasConfig, CanvasRenderer};
