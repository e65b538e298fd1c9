//! The editable workflow graph.
//!
//! [`GraphStore`] is the single owner of the nodes and edges being edited.
//! Every successful mutation publishes a new immutable [`GraphState`]
//! snapshot with a bumped revision on a watch channel, so a renderer can
//! hold an `Arc<GraphState>` while the editor keeps mutating.
//!
//! The store keeps one invariant: every edge's endpoints are nodes in the
//! store. Mutations that would break it are rejected with a [`GraphError`]
//! and leave both state and revision unchanged.

use crate::edge::Edge;
use crate::error::GraphError;
use crate::node::{Node, NodeData, Position};
use crate::registry::NodeKind;
use agentflow_core::{EdgeId, IdGenerator, NodeId};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};
use ulid::Ulid;

/// An immutable snapshot of the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphState {
    revision: u64,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphState {
    /// Monotonic counter bumped by every successful mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == node_id)
    }

    #[must_use]
    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == edge_id)
    }

    #[must_use]
    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.node(node_id).is_some()
    }

    /// Returns nodes that have no incoming edges (entry points).
    #[must_use]
    pub fn entry_nodes(&self) -> Vec<&Node> {
        self.nodes_without(Direction::Incoming)
    }

    /// Returns nodes that have no outgoing edges (terminal nodes).
    #[must_use]
    pub fn terminal_nodes(&self) -> Vec<&Node> {
        self.nodes_without(Direction::Outgoing)
    }

    /// Returns the successors (downstream nodes) of a given node.
    #[must_use]
    pub fn successors(&self, node_id: &NodeId) -> Vec<(&Node, &Edge)> {
        self.neighbors(node_id, Direction::Outgoing)
    }

    /// Returns the predecessors (upstream nodes) of a given node.
    #[must_use]
    pub fn predecessors(&self, node_id: &NodeId) -> Vec<(&Node, &Edge)> {
        self.neighbors(node_id, Direction::Incoming)
    }

    /// Builds a petgraph view whose weights index into `nodes` and `edges`.
    fn topology(&self) -> (DiGraph<usize, usize>, HashMap<&NodeId, NodeIndex>) {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index_map = HashMap::with_capacity(self.nodes.len());
        for (position, node) in self.nodes.iter().enumerate() {
            index_map.insert(&node.id, graph.add_node(position));
        }
        for (position, edge) in self.edges.iter().enumerate() {
            if let (Some(&source), Some(&target)) =
                (index_map.get(&edge.source), index_map.get(&edge.target))
            {
                graph.add_edge(source, target, position);
            }
        }
        (graph, index_map)
    }

    fn nodes_without(&self, direction: Direction) -> Vec<&Node> {
        let (graph, _) = self.topology();
        graph
            .node_indices()
            .filter(|&idx| graph.edges_directed(idx, direction).next().is_none())
            .filter_map(|idx| graph.node_weight(idx))
            .map(|&position| &self.nodes[position])
            .collect()
    }

    fn neighbors(&self, node_id: &NodeId, direction: Direction) -> Vec<(&Node, &Edge)> {
        let (graph, index_map) = self.topology();
        let Some(&index) = index_map.get(node_id) else {
            return Vec::new();
        };

        graph
            .edges_directed(index, direction)
            .filter_map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                let node = graph.node_weight(other)?;
                Some((&self.nodes[*node], &self.edges[*edge.weight()]))
            })
            .collect()
    }
}

/// Owner of the graph being edited.
#[derive(Debug)]
pub struct GraphStore {
    state: Arc<GraphState>,
    updates: watch::Sender<Arc<GraphState>>,
    ids: IdGenerator,
}

impl GraphStore {
    /// Creates an empty store at revision 0.
    #[must_use]
    pub fn new() -> Self {
        let state = Arc::new(GraphState::default());
        let (updates, _) = watch::channel(Arc::clone(&state));
        Self {
            state,
            updates,
            ids: IdGenerator::new(),
        }
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.revision
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        self.state.nodes()
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        self.state.edges()
    }

    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.state.node(node_id)
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<GraphState> {
        Arc::clone(&self.state)
    }

    /// Subscribes to snapshots published after each mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<GraphState>> {
        self.updates.subscribe()
    }

    /// Returns a fresh stamp for a locally minted id.
    pub fn next_stamp(&mut self) -> Ulid {
        self.ids.stamp()
    }

    /// Mints a node id for `node_type`.
    pub fn next_node_id(&mut self, node_type: &str) -> NodeId {
        self.ids.node_id(node_type)
    }

    /// Adds a node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if the id is taken.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.state.contains_node(&node.id) {
            debug!(node_id = %node.id, "rejected duplicate node");
            return Err(GraphError::DuplicateNode { node_id: node.id });
        }
        self.commit(|state| state.nodes.push(node));
        Ok(())
    }

    /// Removes a node and every edge touching it.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<Node> {
        let position = self.state.nodes.iter().position(|n| &n.id == node_id)?;
        let removed = self.commit(|state| {
            state.edges.retain(|e| !e.touches(node_id));
            state.nodes.remove(position)
        });
        debug!(node_id = %node_id, "removed node");
        Some(removed)
    }

    /// Appends edges. Either every edge is added or none is.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EdgeEndpointMissing`] if an endpoint is not in
    /// the graph, or [`GraphError::DuplicateEdge`] if an id is already used
    /// by the graph or earlier in the batch.
    pub fn add_edges(&mut self, edges: Vec<Edge>) -> Result<(), GraphError> {
        let mut seen: HashSet<&EdgeId> = self.state.edges.iter().map(|e| &e.id).collect();
        for edge in &edges {
            for endpoint in [&edge.source, &edge.target] {
                if !self.state.contains_node(endpoint) {
                    debug!(edge_id = %edge.id, node_id = %endpoint, "rejected dangling edge");
                    return Err(GraphError::EdgeEndpointMissing {
                        edge_id: edge.id.clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
            if !seen.insert(&edge.id) {
                return Err(GraphError::DuplicateEdge {
                    edge_id: edge.id.clone(),
                });
            }
        }
        if edges.is_empty() {
            return Ok(());
        }
        self.commit(|state| state.edges.extend(edges));
        Ok(())
    }

    /// Removes a single edge.
    pub fn remove_edge(&mut self, edge_id: &EdgeId) -> Option<Edge> {
        let position = self.state.edges.iter().position(|e| &e.id == edge_id)?;
        Some(self.commit(|state| state.edges.remove(position)))
    }

    /// Removes every edge with `node_id` as an endpoint. Returns how many
    /// were removed.
    pub fn remove_edges_touching(&mut self, node_id: &NodeId) -> usize {
        let count = self.state.edges.iter().filter(|e| e.touches(node_id)).count();
        if count > 0 {
            self.commit(|state| state.edges.retain(|e| !e.touches(node_id)));
        }
        count
    }

    /// Shallow-merges `partial` into a node's data. Keys in `partial`
    /// overwrite, other keys are kept.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if the node is not in the graph.
    pub fn update_node_data(&mut self, node_id: &NodeId, partial: NodeData) -> Result<(), GraphError> {
        let position = self.position_of(node_id)?;
        self.commit(|state| state.nodes[position].data.extend(partial));
        Ok(())
    }

    /// Moves a node on the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if the node is not in the graph.
    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> Result<(), GraphError> {
        let index = self.position_of(node_id)?;
        self.commit(|state| state.nodes[index].position = position);
        Ok(())
    }

    /// Fills in the registry defaults for keys the node's data lacks.
    /// Existing values are never overwritten. Returns whether anything was
    /// added; unknown node types get no defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if the node is not in the graph.
    pub fn apply_defaults(&mut self, node_id: &NodeId) -> Result<bool, GraphError> {
        let index = self.position_of(node_id)?;
        let node = &self.state.nodes[index];
        let Some(kind) = NodeKind::from_type_id(&node.node_type) else {
            return Ok(false);
        };
        let missing: NodeData = kind
            .default_data()
            .into_iter()
            .filter(|(key, _)| !node.data.contains_key(key))
            .collect();
        if missing.is_empty() {
            return Ok(false);
        }
        self.commit(|state| state.nodes[index].data.extend(missing));
        Ok(true)
    }

    /// Replaces the whole graph, e.g. after loading a saved workflow.
    ///
    /// Later nodes with an id already seen are dropped, as are edges whose
    /// endpoints are missing or whose id repeats. Returns how many items
    /// were dropped.
    pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> usize {
        let total = nodes.len() + edges.len();

        let mut node_ids = HashSet::new();
        let nodes: Vec<Node> = nodes
            .into_iter()
            .filter(|n| {
                let fresh = node_ids.insert(n.id.clone());
                if !fresh {
                    warn!(node_id = %n.id, "dropping node with duplicate id");
                }
                fresh
            })
            .collect();

        let mut edge_ids = HashSet::new();
        let edges: Vec<Edge> = edges
            .into_iter()
            .filter(|e| {
                if !(node_ids.contains(&e.source) && node_ids.contains(&e.target)) {
                    warn!(edge_id = %e.id, source = %e.source, target = %e.target, "dropping edge with missing endpoint");
                    return false;
                }
                let fresh = edge_ids.insert(e.id.clone());
                if !fresh {
                    warn!(edge_id = %e.id, "dropping edge with duplicate id");
                }
                fresh
            })
            .collect();

        let dropped = total - nodes.len() - edges.len();
        self.commit(|state| {
            state.nodes = nodes;
            state.edges = edges;
        });
        dropped
    }

    /// Clears the graph.
    pub fn reset(&mut self) {
        self.commit(|state| {
            state.nodes.clear();
            state.edges.clear();
        });
    }

    fn position_of(&self, node_id: &NodeId) -> Result<usize, GraphError> {
        self.state
            .nodes
            .iter()
            .position(|n| &n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: node_id.clone(),
            })
    }

    /// Applies `mutate` to a copy of the current state and publishes it.
    fn commit<R>(&mut self, mutate: impl FnOnce(&mut GraphState) -> R) -> R {
        let mut next = GraphState::clone(&self.state);
        let out = mutate(&mut next);
        next.revision += 1;
        self.state = Arc::new(next);
        self.updates.send_replace(Arc::clone(&self.state));
        out
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, node_type: &str) -> Node {
        Node::new(NodeId::new(id), node_type, Position::default())
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge::new(EdgeId::new(id), NodeId::new(source), NodeId::new(target))
    }

    fn store_with(ids: &[(&str, &str)]) -> GraphStore {
        let mut store = GraphStore::new();
        for (id, node_type) in ids {
            store.add_node(node(id, node_type)).expect("add node");
        }
        store
    }

    #[test]
    fn add_and_get_node() {
        let store = store_with(&[("agent-1", "agent")]);
        assert_eq!(store.revision(), 1);
        assert_eq!(
            store.node(&NodeId::new("agent-1")).map(|n| n.node_type.as_str()),
            Some("agent")
        );
    }

    #[test]
    fn duplicate_node_is_rejected_without_revision_change() {
        let mut store = store_with(&[("a", "agent")]);
        let err = store.add_node(node("a", "tavily")).unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateNode {
                node_id: NodeId::new("a")
            }
        );
        assert_eq!(store.revision(), 1);
        assert_eq!(store.nodes().len(), 1);
    }

    #[test]
    fn remove_node_removes_exactly_touching_edges() {
        let mut store = store_with(&[("a", "chatInput"), ("b", "agent"), ("c", "chatOutput")]);
        store
            .add_edges(vec![edge("ab", "a", "b"), edge("bc", "b", "c"), edge("ac", "a", "c")])
            .expect("add edges");

        let removed = store.remove_node(&NodeId::new("b")).expect("node exists");
        assert_eq!(removed.id, "b");

        let remaining: Vec<_> = store.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(remaining, vec!["ac"]);
        assert!(store.remove_node(&NodeId::new("b")).is_none());
    }

    #[test]
    fn add_edges_is_all_or_nothing() {
        let mut store = store_with(&[("a", "chatInput"), ("b", "agent")]);
        let before = store.revision();

        let err = store
            .add_edges(vec![edge("ab", "a", "b"), edge("bx", "b", "ghost")])
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::EdgeEndpointMissing {
                edge_id: EdgeId::new("bx"),
                node_id: NodeId::new("ghost"),
            }
        );
        assert!(store.edges().is_empty());
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn add_edges_rejects_repeated_ids() {
        let mut store = store_with(&[("a", "chatInput"), ("b", "agent")]);
        let err = store
            .add_edges(vec![edge("e", "a", "b"), edge("e", "b", "a")])
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateEdge { .. }));
        assert!(store.edges().is_empty());
    }

    #[test]
    fn remove_edges_touching_counts() {
        let mut store = store_with(&[("a", "chatInput"), ("b", "agent"), ("c", "chatOutput")]);
        store
            .add_edges(vec![edge("ab", "a", "b"), edge("bc", "b", "c")])
            .expect("add edges");
        assert_eq!(store.remove_edges_touching(&NodeId::new("c")), 1);
        let revision = store.revision();
        assert_eq!(store.remove_edges_touching(&NodeId::new("c")), 0);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn update_node_data_merges_shallowly() {
        let mut store = GraphStore::new();
        store
            .add_node(node("t", "tavily").with_data("API_key", "k").with_data("search_query", "old"))
            .expect("add node");

        let mut partial = NodeData::new();
        partial.insert("search_query".to_string(), json!("rust"));
        store
            .update_node_data(&NodeId::new("t"), partial)
            .expect("update");

        let data = &store.node(&NodeId::new("t")).expect("node").data;
        assert_eq!(data["API_key"], json!("k"));
        assert_eq!(data["search_query"], json!("rust"));
    }

    #[test]
    fn update_unknown_node_fails() {
        let mut store = GraphStore::new();
        let err = store
            .update_node_data(&NodeId::new("ghost"), NodeData::new())
            .unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound { .. }));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn apply_defaults_never_overwrites() {
        let mut store = GraphStore::new();
        store
            .add_node(node("api", "apiRequest").with_data("method", "POST"))
            .expect("add node");
        let id = NodeId::new("api");

        assert!(store.apply_defaults(&id).expect("apply"));
        let data = &store.node(&id).expect("node").data;
        assert_eq!(data["method"], json!("POST"));
        assert_eq!(data["type"], json!("api_request"));

        assert!(!store.apply_defaults(&id).expect("apply again"));
    }

    #[test]
    fn apply_defaults_ignores_unknown_types() {
        let mut store = store_with(&[("w", "webhook")]);
        assert!(!store.apply_defaults(&NodeId::new("w")).expect("apply"));
    }

    #[test]
    fn replace_drops_dangling_edges() {
        let mut store = GraphStore::new();
        let dropped = store.replace(
            vec![node("a", "chatInput"), node("b", "chatOutput"), node("a", "agent")],
            vec![edge("ab", "a", "b"), edge("ax", "a", "x")],
        );
        assert_eq!(dropped, 2);
        assert_eq!(store.nodes().len(), 2);
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.nodes()[0].node_type, "chatInput");
    }

    #[test]
    fn replace_drops_duplicate_edge_ids() {
        let mut store = GraphStore::new();
        let dropped = store.replace(
            vec![node("a", "chatInput"), node("b", "chatOutput")],
            vec![edge("e", "a", "b"), edge("e", "b", "a")],
        );
        assert_eq!(dropped, 1);
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.edges()[0].source, "a");
    }

    #[test]
    fn remove_edge_removes_exactly_one() {
        let mut store = store_with(&[("a", "agent"), ("t", "tavily")]);
        store
            .add_edges(vec![edge("fwd", "a", "t"), edge("back", "t", "a")])
            .expect("add edges");
        let mut updates = store.subscribe();
        let before = store.revision();

        let removed = store.remove_edge(&EdgeId::new("fwd")).expect("edge exists");
        assert_eq!(removed.id, "fwd");
        assert_eq!(store.revision(), before + 1);
        assert!(updates.has_changed().expect("sender alive"));

        let remaining: Vec<_> = store.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(remaining, vec!["back"]);
        assert_eq!(store.nodes().len(), 2);
    }

    #[test]
    fn remove_missing_edge_changes_nothing() {
        let mut store = store_with(&[("a", "agent")]);
        let updates = store.subscribe();
        let before = store.revision();

        assert!(store.remove_edge(&EdgeId::new("ghost")).is_none());
        assert_eq!(store.revision(), before);
        assert!(!updates.has_changed().expect("sender alive"));
    }

    #[test]
    fn move_node_publishes_new_position() {
        let mut store = store_with(&[("a", "agent")]);
        let mut updates = store.subscribe();
        let before = store.revision();

        store
            .move_node(&NodeId::new("a"), Position::new(120.0, -35.5))
            .expect("move");

        assert_eq!(store.revision(), before + 1);
        assert!(updates.has_changed().expect("sender alive"));
        let latest = updates.borrow_and_update().clone();
        assert_eq!(
            latest.node(&NodeId::new("a")).map(|n| n.position),
            Some(Position::new(120.0, -35.5))
        );
    }

    #[test]
    fn move_missing_node_is_rejected() {
        let mut store = store_with(&[("a", "agent")]);
        let before = store.revision();

        let err = store
            .move_node(&NodeId::new("ghost"), Position::new(1.0, 1.0))
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::NodeNotFound {
                node_id: NodeId::new("ghost")
            }
        );
        assert_eq!(store.revision(), before);
        assert_eq!(
            store.node(&NodeId::new("a")).map(|n| n.position),
            Some(Position::default())
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = store_with(&[("a", "chatInput")]);
        store.reset();
        assert!(store.nodes().is_empty());
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn subscribers_see_new_snapshots() {
        let mut store = GraphStore::new();
        let mut updates = store.subscribe();
        let held = store.snapshot();

        store.add_node(node("a", "chatInput")).expect("add node");

        assert!(updates.has_changed().expect("sender alive"));
        let latest = updates.borrow_and_update().clone();
        assert_eq!(latest.revision(), 1);
        assert_eq!(latest.nodes().len(), 1);
        assert!(held.nodes().is_empty());
    }

    #[test]
    fn topology_queries() {
        let mut store = store_with(&[("in", "chatInput"), ("agent", "agent"), ("out", "chatOutput")]);
        store
            .add_edges(vec![edge("e1", "in", "agent"), edge("e2", "agent", "out")])
            .expect("add edges");
        let state = store.snapshot();

        let entries: Vec<_> = state.entry_nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(entries, vec!["in"]);
        let terminals: Vec<_> = state.terminal_nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(terminals, vec!["out"]);

        let next = state.successors(&NodeId::new("agent"));
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].0.id, "out");
        assert_eq!(next[0].1.id, "e2");

        let prev = state.predecessors(&NodeId::new("agent"));
        assert_eq!(prev[0].0.id, "in");
        assert!(state.successors(&NodeId::new("ghost")).is_empty());
    }
}
