//! Wire format of the workflow service.
//!
//! The service stores workflows as documents with a server-assigned `_id`.
//! Every field is optional on the way in: list responses and save
//! responses may carry only part of a document. Fields this model does not
//! know are kept in `extra` and sent back unchanged.

use agentflow_core::WorkflowId;
use agentflow_workflow::{Edge, Node, Workflow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A workflow document as exchanged with the service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemoteWorkflowPayload {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkflowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<Edge>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, JsonValue>>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl RemoteWorkflowPayload {
    /// Overwrites the fields of `workflow` that this payload carries.
    pub fn merge_into(self, workflow: &mut Workflow) {
        if let Some(id) = self.id {
            workflow.id = Some(id);
        }
        if let Some(title) = self.title {
            workflow.title = title;
        }
        if let Some(version) = self.version {
            workflow.version = version;
        }
        if let Some(description) = self.description {
            workflow.description = description;
        }
        if let Some(icons) = self.icons {
            workflow.icons = icons;
        }
        if let Some(nodes) = self.nodes {
            workflow.nodes = nodes;
        }
        if let Some(edges) = self.edges {
            workflow.edges = edges;
        }
        if let Some(metadata) = self.metadata {
            workflow.metadata = metadata;
        }
        workflow.extra.extend(self.extra);
    }
}

/// Keys only a workflow document carries. A bare `id` is not one of them:
/// the generator answers a save with `{ "id", "status" }`.
const DOCUMENT_KEYS: &[&str] = &[
    "_id",
    "title",
    "version",
    "description",
    "icons",
    "nodes",
    "edges",
    "metadata",
];

/// Returns true if `value` is a workflow document, possibly partial, rather
/// than some other kind of reply.
#[must_use]
pub fn is_workflow_document(value: &JsonValue) -> bool {
    value
        .as_object()
        .is_some_and(|map| DOCUMENT_KEYS.iter().any(|key| map.contains_key(*key)))
}

/// Converts a workflow into its wire form. Local-only node state is not
/// serialized.
#[must_use]
pub fn to_remote(workflow: &Workflow) -> RemoteWorkflowPayload {
    RemoteWorkflowPayload {
        id: workflow.id.clone(),
        title: Some(workflow.title.clone()),
        version: Some(workflow.version.clone()),
        description: Some(workflow.description.clone()),
        icons: Some(workflow.icons.clone()),
        nodes: Some(workflow.nodes.iter().map(Node::without_local_state).collect()),
        edges: Some(workflow.edges.clone()),
        metadata: Some(workflow.metadata.clone()),
        extra: workflow.extra.clone(),
    }
}

/// Converts a wire document into a workflow, filling defaults for absent
/// fields.
#[must_use]
pub fn from_remote(payload: RemoteWorkflowPayload) -> Workflow {
    let mut workflow = Workflow::new(String::new());
    payload.merge_into(&mut workflow);
    workflow
}

/// Unwraps the service envelope `{ success, data, message }`: returns
/// `data` when it is present and non-null, else the whole body.
#[must_use]
pub fn unwrap_envelope(body: JsonValue) -> JsonValue {
    match body {
        JsonValue::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            Some(data) => {
                map.insert("data".to_string(), data);
                JsonValue::Object(map)
            }
            None => JsonValue::Object(map),
        },
        other => other,
    }
}
