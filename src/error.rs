use std::path::PathBuf;

use thiserror::Error;

/// Result alias for `tiercloud`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by artifact loading, aggregation and rendering.
#[derive(Debug, Error)]
pub enum Error {
    /// An input artifact is absent or could not be decoded.
    #[error("missing artifact {}: {reason}", path.display())]
    MissingArtifact {
        /// Path that was requested.
        path: PathBuf,
        /// Why it could not be used.
        reason: String,
    },

    /// Inputs disagree on shape (vocabulary width, assignment rows).
    #[error("shape mismatch: expected {expected}, actual {actual}")]
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// The cluster hierarchy cannot be aggregated.
    #[error("invalid tree at node {node}: {reason}")]
    InvalidTree {
        /// Arena index of the offending node.
        node: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// The renderer rejected a node's blob or failed to write the image.
    #[error("render failed for node {node}: {reason}")]
    RenderFailure {
        /// Enumeration index of the node.
        node: usize,
        /// Renderer message.
        reason: String,
    },

    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// Filesystem error outside artifact loading (e.g. creating the output directory).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn missing(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::MissingArtifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn invalid_tree(node: usize, reason: impl Into<String>) -> Self {
        Error::InvalidTree {
            node,
            reason: reason.into(),
        }
    }

    /// Enumeration index of the failing node, when the error is tied to one.
    pub fn node(&self) -> Option<usize> {
        match self {
            Error::InvalidTree { node, .. } | Error::RenderFailure { node, .. } => Some(*node),
            _ => None,
        }
    }
}
