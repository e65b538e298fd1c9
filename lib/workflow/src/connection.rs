//! Turning a user connection gesture into edges.
//!
//! A plain connection becomes one `simple` edge. A connection touching a
//! tool becomes a pair: the forward edge as drawn plus a backward edge with
//! the handles swapped, so the tool can return its result to the caller.
//! Each edge of the pair is `conditional` exactly when its own target is a
//! tool.

use crate::edge::{Edge, EdgeKind};
use crate::error::GraphError;
use crate::graph::{GraphState, GraphStore};
use crate::handle::{DEFAULT_SOURCE_HANDLE, DEFAULT_TARGET_HANDLE};
use crate::node::{Node, NodeCategory};
use crate::registry::NodeRegistry;
use agentflow_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;

/// A connection drawn between two handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
    pub target: NodeId,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    /// Creates a connection between the default handles.
    #[must_use]
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            source_handle: None,
            target,
            target_handle: None,
        }
    }

    #[must_use]
    pub fn with_handles(
        mut self,
        source_handle: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        self.source_handle = Some(source_handle.into());
        self.target_handle = Some(target_handle.into());
        self
    }
}

/// Decides which edges a connection produces.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionPolicy<'r> {
    registry: &'r NodeRegistry,
}

impl ConnectionPolicy<'static> {
    /// Uses the process-wide registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(NodeRegistry::global())
    }
}

impl Default for ConnectionPolicy<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> ConnectionPolicy<'r> {
    #[must_use]
    pub const fn with_registry(registry: &'r NodeRegistry) -> Self {
        Self { registry }
    }

    /// A node's category: its `data.category` when that parses, else the
    /// registry category of its type.
    #[must_use]
    pub fn category_of(&self, node: &Node) -> Option<NodeCategory> {
        node.category().or_else(|| {
            self.registry
                .lookup(&node.node_type)
                .map(|descriptor| descriptor.category)
        })
    }

    /// Computes the edges for `connection` without touching the graph.
    /// `stamp` makes the edge ids unique.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if either endpoint is missing.
    pub fn plan(
        &self,
        state: &GraphState,
        connection: &Connection,
        stamp: impl Display,
    ) -> Result<Vec<Edge>, GraphError> {
        let source = self.resolve(state, &connection.source)?;
        let target = self.resolve(state, &connection.target)?;
        let source_is_tool = self.category_of(source) == Some(NodeCategory::Tools);
        let target_is_tool = self.category_of(target) == Some(NodeCategory::Tools);
        let source_handle = handle(connection.source_handle.as_deref());
        let target_handle = handle(connection.target_handle.as_deref());

        if !source_is_tool && !target_is_tool {
            let id = format!(
                "{}-{}-{}-{}-{stamp}",
                connection.source,
                source_handle.as_deref().unwrap_or(DEFAULT_SOURCE_HANDLE),
                connection.target,
                target_handle.as_deref().unwrap_or(DEFAULT_TARGET_HANDLE),
            );
            let edge = Edge::new(
                EdgeId::new(id),
                connection.source.clone(),
                connection.target.clone(),
            )
            .with_handles(source_handle, target_handle);
            return Ok(vec![edge]);
        }

        let forward = Edge::new(
            EdgeId::new(format!(
                "edge-{}-to-{}-forward-{stamp}",
                connection.source, connection.target
            )),
            connection.source.clone(),
            connection.target.clone(),
        )
        .with_handles(source_handle.clone(), target_handle.clone())
        .with_kind(kind_for_target(target_is_tool));

        let backward = Edge::new(
            EdgeId::new(format!(
                "edge-{}-to-{}-backward-{stamp}",
                connection.target, connection.source
            )),
            connection.target.clone(),
            connection.source.clone(),
        )
        .with_handles(target_handle, source_handle)
        .with_kind(kind_for_target(source_is_tool));

        Ok(vec![forward, backward])
    }

    /// Plans the edges for `connection` and appends them to the store.
    /// Returns the edges added.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if either endpoint is missing;
    /// the store is left untouched.
    pub fn connect(
        &self,
        store: &mut GraphStore,
        connection: &Connection,
    ) -> Result<Vec<Edge>, GraphError> {
        let stamp = store.next_stamp();
        let edges = self.plan(&store.snapshot(), connection, stamp)?;
        store.add_edges(edges.clone())?;
        debug!(
            source = %connection.source,
            target = %connection.target,
            edge_count = edges.len(),
            "connected nodes"
        );
        Ok(edges)
    }

    fn resolve<'s>(&self, state: &'s GraphState, node_id: &NodeId) -> Result<&'s Node, GraphError> {
        state.node(node_id).ok_or_else(|| {
            debug!(node_id = %node_id, "rejected connection to missing node");
            GraphError::NodeNotFound {
                node_id: node_id.clone(),
            }
        })
    }
}

/// An empty handle name means the default handle.
fn handle(name: Option<&str>) -> Option<String> {
    name.filter(|h| !h.is_empty()).map(str::to_owned)
}

const fn kind_for_target(target_is_tool: bool) -> EdgeKind {
    if target_is_tool {
        EdgeKind::Conditional
    } else {
        EdgeKind::Simple
    }
}
