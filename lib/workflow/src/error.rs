//! Error types for the workflow crate.
//!
//! Graph mutations that fail leave the store untouched; the error names the
//! offending id so the caller can report it.

use agentflow_core::{EdgeId, NodeId};
use std::fmt;

/// Errors from graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Node with the given ID was not found in the graph.
    NodeNotFound { node_id: NodeId },
    /// A node with the same ID is already in the graph.
    DuplicateNode { node_id: NodeId },
    /// An edge with the same ID is already in the graph.
    DuplicateEdge { edge_id: EdgeId },
    /// An edge references a node that is not in the graph.
    EdgeEndpointMissing { edge_id: EdgeId, node_id: NodeId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => {
                write!(f, "node not found: {node_id}")
            }
            Self::DuplicateNode { node_id } => {
                write!(f, "node already exists: {node_id}")
            }
            Self::DuplicateEdge { edge_id } => {
                write!(f, "edge already exists: {edge_id}")
            }
            Self::EdgeEndpointMissing { edge_id, node_id } => {
                write!(f, "edge {edge_id} references missing node {node_id}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_display() {
        let err = GraphError::NodeNotFound {
            node_id: NodeId::new("agent-1"),
        };
        assert_eq!(err.to_string(), "node not found: agent-1");
    }

    #[test]
    fn endpoint_missing_names_both_ids() {
        let err = GraphError::EdgeEndpointMissing {
            edge_id: EdgeId::new("e1"),
            node_id: NodeId::new("ghost"),
        };
        let message = err.to_string();
        assert!(message.contains("e1"));
        assert!(message.contains("ghost"));
    }
}
