//! Plain-text rendering of workflows and the node palette.

use agentflow_workflow::{
    GraphState, Node, NodeKind, NodeRegistry, Readiness, Workflow, WorkflowSummary,
};
use std::fmt::Write;

pub fn summaries(items: &[WorkflowSummary]) -> String {
    if items.is_empty() {
        return "no workflows\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let id = item.id.as_ref().map_or("-", |id| id.as_str());
        let updated = item
            .updated_at
            .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
        let _ = writeln!(
            out,
            "{id}  {}  v{}  {} nodes, {} edges  updated {updated}",
            item.title, item.version, item.node_count, item.edge_count
        );
    }
    out
}

/// Renders a workflow with per-node readiness and the graph's entry and
/// terminal nodes.
pub fn workflow(document: &Workflow, graph: &GraphState) -> String {
    let mut out = String::new();
    let id = document.id.as_ref().map_or("(unsaved)", |id| id.as_str());
    let _ = writeln!(out, "{} [{id}] v{}", document.title, document.version);
    if !document.description.is_empty() {
        let _ = writeln!(out, "{}", document.description);
    }

    let _ = writeln!(out, "\nnodes:");
    for node in graph.nodes() {
        let kind = NodeKind::from_type_id(&node.node_type);
        let name = kind.map_or(node.node_type.as_str(), |kind| kind.display_name());
        let status = match kind.map(|kind| kind.readiness(&node.data)) {
            Some(Readiness::Ready) => "ready".to_string(),
            Some(Readiness::Incomplete { missing }) => format!("missing {}", missing.join(", ")),
            None => "unknown type".to_string(),
        };
        let _ = writeln!(out, "  {}  {name}  ({status})", node.id);
    }

    let _ = writeln!(out, "\nedges:");
    for edge in graph.edges() {
        let _ = writeln!(
            out,
            "  {} -> {}  [{}]",
            edge.source, edge.target, edge.kind
        );
    }

    let ids = |nodes: Vec<&Node>| {
        nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let _ = writeln!(out, "\nentry: {}", ids(graph.entry_nodes()));
    let _ = writeln!(out, "terminal: {}", ids(graph.terminal_nodes()));
    out
}

pub fn palette(registry: &NodeRegistry) -> String {
    let mut out = String::new();
    for (category, descriptors) in registry.by_category() {
        let _ = writeln!(out, "{}", category.label());
        for descriptor in descriptors {
            let _ = writeln!(
                out,
                "  {:<14} {:<16} {}",
                descriptor.type_id, descriptor.display_name, descriptor.description
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_core::{EdgeId, NodeId, WorkflowId};
    use agentflow_workflow::{Edge, GraphStore, Position};

    #[test]
    fn palette_lists_categories_in_order() {
        let text = palette(NodeRegistry::global());
        let io = text.find("I/O").expect("io");
        let ai = text.find("AI & Agents").expect("ai");
        let tools = text.find("Tools & Integrations").expect("tools");
        assert!(io < ai && ai < tools);
        assert!(text.contains("yahooFinance"));
    }

    #[test]
    fn workflow_shows_readiness_and_topology() {
        let mut store = GraphStore::new();
        store
            .add_node(Node::new(NodeId::new("in"), "chatInput", Position::default()))
            .expect("add");
        store
            .add_node(Node::new(NodeId::new("fin"), "yahooFinance", Position::default()))
            .expect("add");
        store
            .add_edges(vec![Edge::new(
                EdgeId::new("e1"),
                NodeId::new("in"),
                NodeId::new("fin"),
            )])
            .expect("edge");

        let document = Workflow::new("Stocks").with_id(WorkflowId::new("abc"));
        let text = workflow(&document, &store.snapshot());

        assert!(text.starts_with("Stocks [abc] v1.0.0"));
        assert!(text.contains("missing ticker"));
        assert!(text.contains("in -> fin"));
        assert!(text.contains("entry: in"));
        assert!(text.contains("terminal: fin"));
    }

    #[test]
    fn empty_list() {
        assert_eq!(summaries(&[]), "no workflows\n");
    }
}
