//! Edge types for workflow graphs.
//!
//! Edges connect a handle on a source node to a handle on a target node.
//! Handles are optional; an edge without them attaches to the node's
//! default connection point.

use agentflow_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Rendering and routing kind of an edge.
///
/// Kinds other than `simple` and `conditional` come from older documents
/// and are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeKind {
    #[default]
    Simple,
    /// Edge whose target is a tool; the agent decides at run time whether
    /// to follow it.
    Conditional,
    Other(String),
}

impl EdgeKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Simple => "simple",
            Self::Conditional => "conditional",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for EdgeKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "simple" => Self::Simple,
            "conditional" => Self::Conditional,
            _ => Self::Other(kind),
        }
    }
}

impl From<EdgeKind> for String {
    fn from(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    #[serde(rename = "sourceHandle", default)]
    pub source_handle: Option<String>,
    pub target: NodeId,
    #[serde(rename = "targetHandle", default)]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
    /// Fields this model does not interpret, kept for the server.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Edge {
    /// Creates a simple edge attached to the default handles.
    #[must_use]
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            source_handle: None,
            target,
            target_handle: None,
            kind: EdgeKind::Simple,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_handles(
        mut self,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Self {
        self.source_handle = source_handle;
        self.target_handle = target_handle;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns true if either endpoint is `node_id`.
    #[must_use]
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_keeps_unknown_values() {
        let kind: EdgeKind = serde_json::from_value(json!("smoothstep")).expect("deserialize");
        assert_eq!(kind, EdgeKind::Other("smoothstep".to_string()));
        assert_eq!(serde_json::to_value(&kind).expect("serialize"), json!("smoothstep"));
    }

    #[test]
    fn edge_uses_wire_field_names() {
        let edge = Edge::new(EdgeId::new("e1"), NodeId::new("a"), NodeId::new("b"))
            .with_handles(Some("output".to_string()), None)
            .with_kind(EdgeKind::Conditional);
        let value = serde_json::to_value(&edge).expect("serialize");
        assert_eq!(
            value,
            json!({
                "id": "e1",
                "source": "a",
                "sourceHandle": "output",
                "target": "b",
                "targetHandle": null,
                "type": "conditional"
            })
        );
    }

    #[test]
    fn edge_without_type_is_simple() {
        let edge: Edge = serde_json::from_value(json!({
            "id": "e1",
            "source": "a",
            "target": "b",
            "animated": true
        }))
        .expect("deserialize");
        assert_eq!(edge.kind, EdgeKind::Simple);
        assert_eq!(edge.source_handle, None);
        assert_eq!(edge.extra.get("animated"), Some(&json!(true)));
    }

    #[test]
    fn touches_either_endpoint() {
        let edge = Edge::new(EdgeId::new("e"), NodeId::new("a"), NodeId::new("b"));
        assert!(edge.touches(&NodeId::new("a")));
        assert!(edge.touches(&NodeId::new("b")));
        assert!(!edge.touches(&NodeId::new("c")));
    }
}
