//! Structural validation of a cluster-tree arena.
//!
//! Checks run before any aggregation so a corrupt hierarchy fails fast:
//! - root and child indices inside the arena
//! - every node reached exactly once from the root (no cycles, no shared children)
//! - no orphaned nodes
//! - internal nodes have at least one child
//!
//! A cluster id under several leaves is only a warning; the weighted mean
//! stays defined.

use std::collections::BTreeSet;

use super::node::Node;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Unusual but aggregatable.
    Warning,
    /// A problem that makes aggregation undefined.
    Error,
    /// The arena cannot even be walked safely.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A single validation issue.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity of the issue.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Arena index involved, if any.
    pub node_id: Option<usize>,
    /// Optional additional context.
    pub context: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            node_id: None,
            context: None,
        }
    }

    /// Attach the arena index involved.
    pub fn with_node(mut self, id: usize) -> Self {
        self.node_id = Some(id);
        self
    }

    /// Attach context.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context = Some(ctx.into());
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(id) = self.node_id {
            write!(f, " (node {})", id)?;
        }
        if let Some(ctx) = &self.context {
            write!(f, " - {}", ctx)?;
        }
        Ok(())
    }
}

/// Issues found by [`validate_arena`].
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// All issues found, in discovery order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// No errors or critical issues.
    pub fn is_healthy(&self) -> bool {
        !self.issues.iter().any(|i| i.severity >= Severity::Error)
    }

    /// Most severe issue, first reported wins on ties.
    pub fn worst(&self) -> Option<&ValidationIssue> {
        self.issues.iter().rev().max_by_key(|i| i.severity)
    }

    /// Warning-level issues.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }
}

/// Validate that `nodes` form a single tree rooted at `root`.
///
/// The walk never revisits a node, so it terminates on cyclic input.
pub fn validate_arena(nodes: &[Node], root: usize) -> ValidationReport {
    let mut report = ValidationReport::default();

    if nodes.is_empty() {
        report.add(ValidationIssue::new(Severity::Critical, "tree has no nodes"));
        return report;
    }
    if root >= nodes.len() {
        report.add(
            ValidationIssue::new(Severity::Critical, "root index outside arena")
                .with_node(root)
                .with_context(format!("arena has {} nodes", nodes.len())),
        );
        return report;
    }

    let mut reached = vec![false; nodes.len()];
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if reached[id] {
            report.add(
                ValidationIssue::new(Severity::Critical, "node reached more than once")
                    .with_node(id)
                    .with_context("cycle or shared child"),
            );
            continue;
        }
        reached[id] = true;

        if let Node::Children(children) = &nodes[id] {
            if children.is_empty() {
                report.add(
                    ValidationIssue::new(Severity::Error, "internal node has no children")
                        .with_node(id),
                );
            }
            for &child in children {
                if child >= nodes.len() {
                    report.add(
                        ValidationIssue::new(Severity::Critical, "child id does not exist")
                            .with_node(id)
                            .with_context(format!("missing child id {child}")),
                    );
                } else {
                    stack.push(child);
                }
            }
        }
    }

    let orphans: Vec<usize> = (0..nodes.len()).filter(|&id| !reached[id]).collect();
    if let Some(&first) = orphans.first() {
        report.add(
            ValidationIssue::new(
                Severity::Error,
                format!("{} orphaned nodes not reachable from root", orphans.len()),
            )
            .with_node(first)
            .with_context(format!("first few: {:?}", &orphans[..orphans.len().min(5)])),
        );
    }

    let mut seen_clusters = BTreeSet::new();
    for (id, node) in nodes.iter().enumerate() {
        if let Some(cluster) = node.cluster() {
            if !seen_clusters.insert(cluster) {
                report.add(
                    ValidationIssue::new(Severity::Warning, "cluster appears under several leaves")
                        .with_node(id)
                        .with_context(format!("cluster {cluster}")),
                );
            }
        }
    }

    report
}
