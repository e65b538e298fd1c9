//! Workflow documents.
//!
//! A workflow is a titled, versioned graph owned by the remote service.
//! The editor keeps a local copy of the document and a [`GraphStore`] with
//! the nodes and edges being edited; [`Workflow::set_graph`] folds the
//! store back into the document before it is saved.
//!
//! [`GraphStore`]: crate::graph::GraphStore

use crate::edge::Edge;
use crate::graph::GraphState;
use crate::node::Node;
use agentflow_core::WorkflowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Version given to newly created workflows.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Server-maintained timestamp fields kept in [`Workflow::extra`].
const CREATED_AT_KEY: &str = "createdAt";
const UPDATED_AT_KEY: &str = "updatedAt";

/// A complete workflow document.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    /// Assigned by the service on creation; `None` until then.
    pub id: Option<WorkflowId>,
    pub title: String,
    pub version: String,
    pub description: String,
    pub icons: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metadata: Map<String, JsonValue>,
    /// Top-level fields this model does not interpret (timestamps, `__v`).
    pub extra: Map<String, JsonValue>,
}

impl Workflow {
    /// Creates an empty, unsaved workflow.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            version: DEFAULT_VERSION.to_string(),
            description: String::new(),
            icons: String::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: Map::new(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: WorkflowId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Copies the nodes and edges of `state` into the document.
    pub fn set_graph(&mut self, state: &GraphState) {
        self.nodes = state.nodes().to_vec();
        self.edges = state.edges().to_vec();
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        timestamp(&self.extra, CREATED_AT_KEY)
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        timestamp(&self.extra, UPDATED_AT_KEY)
    }

    #[must_use]
    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            updated_at: self.updated_at(),
        }
    }
}

fn timestamp(fields: &Map<String, JsonValue>, key: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(key)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// A workflow as shown in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: Option<WorkflowId>,
    pub title: String,
    pub version: String,
    pub description: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Workflow> for WorkflowSummary {
    fn from(workflow: &Workflow) -> Self {
        workflow.summary()
    }
}
