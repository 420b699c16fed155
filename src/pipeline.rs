//! End-to-end run: artifacts → cluster means → branch means → integer
//! frequencies → text blobs → one image per hierarchy node.
//!
//! Every blob is computed before the first image is written, so input and
//! tree errors abort the run with no output on disk. Image `N` is written to
//! `<prefix>cloudN.png`, where `N` is the node's position in
//! [`ClusterTree::iter_nodes`](crate::hierarchy::ClusterTree::iter_nodes).

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::artifact::Artifacts;
use crate::blob::serialize;
use crate::error::{Error, Result};
use crate::means::{cluster_means, node_rows, MeanRow};
use crate::quantize::{quantize, SCALE};
#[cfg(feature = "png")]
use crate::render::{CanvasConfig, CanvasRenderer};
use crate::render::Renderer;

/// Default weight matrix path.
pub const DEFAULT_WEIGHTS: &str = "Tfidf_Matrix.json";
/// Default vocabulary path.
pub const DEFAULT_VOCABULARY: &str = "features_rev.json";
/// Default cluster assignment path.
pub const DEFAULT_ASSIGNMENT: &str = "c_labels.json";
/// Default hierarchy path.
pub const DEFAULT_TREE: &str = "ward_tree.json";

/// What to do with a node whose blob is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyBlobPolicy {
    /// Hand it to the renderer anyway.
    #[default]
    Render,
    /// Write nothing for the node.
    Skip,
    /// Treat it as a render failure.
    Fail,
}

/// What to do when rendering one node fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderErrorPolicy {
    /// Stop at the first failure.
    #[default]
    Abort,
    /// Log it, record it in the [`RunReport`], keep going.
    Continue,
}

/// Configuration for a run.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// Document weight matrix.
    pub weights_path: PathBuf,
    /// Vocabulary.
    pub vocabulary_path: PathBuf,
    /// Cluster assignment.
    pub assignment_path: PathBuf,
    /// Cluster hierarchy.
    pub tree_path: PathBuf,
    /// Prepended verbatim to every output file name; may contain directories.
    pub prefix: String,
    /// Empty blob handling.
    pub empty_blobs: EmptyBlobPolicy,
    /// Render failure handling.
    pub on_render_error: RenderErrorPolicy,
    /// Canvas used by [`run`].
    #[cfg(feature = "png")]
    pub canvas: CanvasConfig,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            weights_path: DEFAULT_WEIGHTS.into(),
            vocabulary_path: DEFAULT_VOCABULARY.into(),
            assignment_path: DEFAULT_ASSIGNMENT.into(),
            tree_path: DEFAULT_TREE.into(),
            prefix: String::new(),
            empty_blobs: EmptyBlobPolicy::default(),
            on_render_error: RenderErrorPolicy::default(),
            #[cfg(feature = "png")]
            canvas: CanvasConfig::default(),
        }
    }
}

impl CloudConfig {
    /// Create a configuration with default paths and settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the four input paths.
    pub fn with_inputs(
        mut self,
        weights: impl Into<PathBuf>,
        vocabulary: impl Into<PathBuf>,
        assignment: impl Into<PathBuf>,
        tree: impl Into<PathBuf>,
    ) -> Self {
        self.weights_path = weights.into();
        self.vocabulary_path = vocabulary.into();
        self.assignment_path = assignment.into();
        self.tree_path = tree.into();
        self
    }

    /// Set the output prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set empty blob handling.
    pub fn with_empty_blobs(mut self, policy: EmptyBlobPolicy) -> Self {
        self.empty_blobs = policy;
        self
    }

    /// Set render failure handling.
    pub fn with_render_errors(mut self, policy: RenderErrorPolicy) -> Self {
        self.on_render_error = policy;
        self
    }

    /// Set the canvas used by [`run`].
    #[cfg(feature = "png")]
    pub fn with_canvas(mut self, canvas: CanvasConfig) -> Self {
        self.canvas = canvas;
        self
    }

    /// Image path for the node at enumeration index `index`.
    pub fn output_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}cloud{}.png", self.prefix, index))
    }

    /// Load and cross-check the configured artifacts.
    pub fn load(&self) -> Result<Artifacts> {
        Artifacts::load(
            &self.weights_path,
            &self.vocabulary_path,
            &self.assignment_path,
            &self.tree_path,
        )
    }
}

/// Outcome of [`render_blobs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Images written, in node order.
    pub written: Vec<PathBuf>,
    /// Nodes skipped for having an empty blob.
    pub skipped: Vec<usize>,
    /// Nodes whose rendering failed, with the renderer's message.
    pub failed: Vec<(usize, String)>,
}

impl RunReport {
    /// True when no node failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Text blob for every hierarchy node, in enumeration order.
///
/// Means are quantized at the fixed [`SCALE`].
pub fn node_blobs(artifacts: &Artifacts) -> Result<Vec<String>> {
    let means = cluster_means(artifacts.assignment(), artifacts.weights().view())?;
    let rows = node_rows(artifacts.tree(), &means)?;
    let vocabulary = artifacts.vocabulary();

    #[cfg(feature = "parallel")]
    let blobs = rows
        .par_iter()
        .map(|row| encode_row(vocabulary, row))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let blobs = rows
        .iter()
        .map(|row| encode_row(vocabulary, row))
        .collect::<Result<Vec<_>>>()?;

    info!(
        nodes = blobs.len(),
        empty = blobs.iter().filter(|b| b.is_empty()).count(),
        "serialized node blobs"
    );
    Ok(blobs)
}

fn encode_row(vocabulary: &[String], row: &MeanRow) -> Result<String> {
    let counts = quantize(row.mean.view(), SCALE);
    serialize(vocabulary, &counts)
}

/// Load the configured artifacts and return every node's blob.
pub fn vec2words(config: &CloudConfig) -> Result<Vec<String>> {
    let artifacts = config.load()?;
    node_blobs(&artifacts)
}

/// Hand each blob to `renderer`, writing `<prefix>cloud<index>.png`.
pub fn render_blobs<R: Renderer>(
    config: &CloudConfig,
    blobs: &[String],
    renderer: &R,
) -> Result<RunReport> {
    let mut report = RunReport::default();
    if blobs.is_empty() {
        return Ok(report);
    }
    ensure_parent(&config.output_path(0))?;

    for (index, blob) in blobs.iter().enumerate() {
        let path = config.output_path(index);
        let outcome = if blob.is_empty() {
            match config.empty_blobs {
                EmptyBlobPolicy::Skip => {
                    debug!(node = index, "skipping empty blob");
                    report.skipped.push(index);
                    continue;
                }
                EmptyBlobPolicy::Fail => Err(Error::RenderFailure {
                    node: index,
                    reason: "empty blob".to_string(),
                }),
                EmptyBlobPolicy::Render => {
                    warn!(node = index, "rendering empty blob");
                    render_one(renderer, index, blob, &path)
                }
            }
        } else {
            render_one(renderer, index, blob, &path)
        };

        match outcome {
            Ok(()) => {
                debug!(node = index, path = %path.display(), "wrote image");
                report.written.push(path);
            }
            Err(e) => match config.on_render_error {
                RenderErrorPolicy::Abort => return Err(e),
                RenderErrorPolicy::Continue => {
                    warn!(node = index, error = %e, "render failed, continuing");
                    report.failed.push((index, e.to_string()));
                }
            },
        }
    }

    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "rendering finished"
    );
    Ok(report)
}

fn render_one<R: Renderer>(renderer: &R, index: usize, blob: &str, path: &Path) -> Result<()> {
    renderer
        .render(blob, path)
        .map_err(|e| Error::RenderFailure {
            node: index,
            reason: e.to_string(),
        })
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Full run with a caller-supplied renderer.
pub fn vec2cloud<R: Renderer>(config: &CloudConfig, renderer: &R) -> Result<RunReport> {
    let blobs = vec2words(config)?;
    render_blobs(config, &blobs, renderer)
}

/// Full run with the built-in PNG canvas.
#[cfg(feature = "png")]
pub fn run(config: &CloudConfig) -> Result<RunReport> {
    vec2cloud(config, &CanvasRenderer::new(config.canvas))
}
