//! Arena node of a cluster hierarchy.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A node in a [`ClusterTree`](super::ClusterTree) arena.
///
/// Leaves stand for one cluster id from the cluster assignment (not one
/// document). Internal nodes merge their children and hold arena indices
/// rather than references.
///
/// Serialized externally tagged: `{"leaf": 3}` or `{"children": [0, 1]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Leaf node holding a cluster id.
    Leaf(usize),
    /// Internal node holding child arena indices.
    Children(Vec<usize>),
}

impl Node {
    /// Create a leaf for `cluster`.
    pub fn leaf(cluster: usize) -> Self {
        Node::Leaf(cluster)
    }

    /// Create an internal node merging `children`.
    pub fn internal(children: Vec<usize>) -> Self {
        Node::Children(children)
    }

    /// Check if this is a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Cluster id if this is a leaf.
    pub fn cluster(&self) -> Option<usize> {
        match self {
            Node::Leaf(cluster) => Some(*cluster),
            Node::Children(_) => None,
        }
    }

    /// Child indices (empty for leaves).
    pub fn children(&self) -> &[usize] {
        match self {
            Node::Leaf(_) => &[],
            Node::Children(children) => children,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(cluster) => write!(f, "Leaf[cluster {cluster}]"),
            Node::Children(children) => write!(f, "Merge{children:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_json_shape() {
        let leaf: Node = serde_json::from_str(r#"{"leaf": 4}"#).unwrap();
        assert_eq!(leaf, Node::leaf(4));
        assert_eq!(leaf.cluster(), Some(4));
        assert!(leaf.children().is_empty());

        let merge: Node = serde_json::from_str(r#"{"children": [0, 1]}"#).unwrap();
        assert!(!merge.is_leaf());
        assert_eq!(merge.children(), &[0, 1]);
        assert_eq!(serde_json::to_string(&merge).unwrap(), r#"{"children":[0,1]}"#);
    }

    #[test]
    fn test_node_display() {
        assert_eq!(Node::leaf(2).to_string(), "Leaf[cluster 2]");
        assert_eq!(Node::internal(vec![0, 1]).to_string(), "Merge[0, 1]");
    }
}
