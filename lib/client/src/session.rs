//! An editing session on one workflow.
//!
//! The session ties the local graph to the remote document: it loads a
//! workflow into a [`GraphStore`], folds the store back into the document
//! on save, and runs the workflow through the [`ExecutionOrchestrator`].

use crate::adapter::PersistenceAdapter;
use crate::error::{PersistenceError, RunFailure};
use crate::orchestrator::{ExecutionOrchestrator, RunState};
use crate::service::WorkflowService;
use agentflow_core::WorkflowId;
use agentflow_workflow::{GraphStore, Workflow};
use rootcause::prelude::Report;
use tracing::{info, warn};

/// Title given to a session before anything is opened or created.
pub const UNTITLED: &str = "Untitled Workflow";

pub struct EditorSession<S: WorkflowService> {
    adapter: PersistenceAdapter<S>,
    orchestrator: ExecutionOrchestrator,
    store: GraphStore,
    document: Workflow,
}

impl<S: WorkflowService> EditorSession<S> {
    pub fn new(adapter: PersistenceAdapter<S>, orchestrator: ExecutionOrchestrator) -> Self {
        Self {
            adapter,
            orchestrator,
            store: GraphStore::new(),
            document: Workflow::new(UNTITLED),
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    /// The open document. Its nodes and edges are those of the last load or
    /// save; the live graph is in [`EditorSession::store`].
    pub fn document(&self) -> &Workflow {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Workflow {
        &mut self.document
    }

    pub fn adapter(&self) -> &PersistenceAdapter<S> {
        &self.adapter
    }

    /// Loads a workflow and replaces the graph with its contents.
    ///
    /// # Errors
    ///
    /// Fails if the workflow cannot be fetched; the session is unchanged.
    pub async fn open(&mut self, id: &WorkflowId) -> Result<(), Report<PersistenceError>> {
        let workflow = self.adapter.fetch(id).await?;
        self.load(workflow);
        info!(workflow_id = %id, node_count = self.store.nodes().len(), "opened workflow");
        Ok(())
    }

    /// Creates a new, empty workflow remotely and starts editing it.
    ///
    /// # Errors
    ///
    /// Fails if the workflow cannot be created; the session is unchanged.
    pub async fn new_workflow(
        &mut self,
        title: &str,
        description: Option<&str>,
    ) -> Result<WorkflowId, Report<PersistenceError>> {
        let draft = Workflow::new(title).with_description(description.unwrap_or_default());
        let id = self.adapter.create(&draft).await?;
        let created = self
            .adapter
            .cached(&id)
            .cloned()
            .unwrap_or_else(|| draft.with_id(id.clone()));
        self.load(created);
        Ok(id)
    }

    /// Saves the current graph. A document without an id is created first.
    /// The graph is reloaded only if the server's copy differs from it.
    ///
    /// # Errors
    ///
    /// Fails if the save fails; the graph and document are unchanged.
    pub async fn save(&mut self) -> Result<WorkflowId, Report<PersistenceError>> {
        let mut outgoing = self.document.clone();
        outgoing.set_graph(&self.store.snapshot());

        let id = match outgoing.id.clone() {
            Some(id) => id,
            None => self.adapter.create(&outgoing).await?,
        };
        let saved = self.adapter.save(&id, &outgoing).await?;
        self.adopt_saved(saved);
        Ok(id)
    }

    /// Saves and executes the workflow with `input`.
    ///
    /// Once the save went through, the session takes the saved copy just
    /// like [`EditorSession::save`]. If the run stopped before that, the
    /// graph and document are unchanged.
    pub async fn run(&mut self, input: &str) -> RunState {
        let mut outgoing = self.document.clone();
        outgoing.set_graph(&self.store.snapshot());
        let state = self
            .orchestrator
            .run(&mut self.adapter, outgoing.id.as_ref(), &outgoing, input)
            .await;

        let saved = !matches!(
            state,
            RunState::Failed(RunFailure::MissingId | RunFailure::Save(_))
        );
        if let Some(copy) = outgoing
            .id
            .as_ref()
            .filter(|_| saved)
            .and_then(|id| self.adapter.cached(id))
            .cloned()
        {
            self.adopt_saved(copy);
        }
        state
    }

    /// Deletes the workflow remotely and resets the session. Returns false
    /// if the document was never created remotely.
    ///
    /// # Errors
    ///
    /// Fails if the delete fails; the session is unchanged.
    pub async fn delete(&mut self) -> Result<bool, Report<PersistenceError>> {
        let Some(id) = self.document.id.clone() else {
            return Ok(false);
        };
        self.adapter.delete(&id).await?;
        self.document = Workflow::new(UNTITLED);
        self.store.reset();
        Ok(true)
    }

    /// Takes the saved copy as the document and reloads the graph only if
    /// the server's nodes or edges differ from it.
    fn adopt_saved(&mut self, saved: Workflow) {
        if saved.nodes != self.store.nodes() || saved.edges != self.store.edges() {
            let dropped = self
                .store
                .replace(saved.nodes.clone(), saved.edges.clone());
            if dropped > 0 {
                warn!(workflow_id = ?saved.id, dropped, "server copy had invalid graph items");
            }
        }
        self.document = saved;
    }

    fn load(&mut self, workflow: Workflow) {
        let dropped = self
            .store
            .replace(workflow.nodes.clone(), workflow.edges.clone());
        if dropped > 0 {
            warn!(dropped, "loaded workflow had invalid graph items");
        }
        self.document = workflow;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::tests::ScriptedService;
    use agentflow_core::NodeId;
    use agentflow_workflow::{Connection, ConnectionPolicy, Node, Position};
    use serde_json::{Value as JsonValue, json};

    fn session(service: ScriptedService) -> EditorSession<ScriptedService> {
        EditorSession::new(
            PersistenceAdapter::new(service),
            ExecutionOrchestrator::default(),
        )
    }

    #[tokio::test]
    async fn open_loads_graph() {
        let service = ScriptedService::new().respond(Ok(json!({
            "success": true,
            "data": {
                "_id": "abc",
                "title": "Research",
                "nodes": [
                    { "id": "in", "type": "chatInput", "data": { "category": "IO" } },
                    { "id": "agent", "type": "agent", "data": { "category": "AI_AGENTS" } }
                ],
                "edges": [
                    { "id": "e1", "source": "in", "target": "agent" },
                    { "id": "e2", "source": "agent", "target": "gone" }
                ]
            }
        })));
        let mut session = session(service);

        session.open(&WorkflowId::new("abc")).await.expect("open");

        assert_eq!(session.document().title, "Research");
        assert_eq!(session.store().nodes().len(), 2);
        assert_eq!(session.store().edges().len(), 1);
    }

    #[tokio::test]
    async fn failed_open_keeps_session() {
        let service = ScriptedService::new().respond(Err(PersistenceError::NotFound {
            resource: "workflow abc".to_string(),
        }));
        let mut session = session(service);
        session
            .store_mut()
            .add_node(Node::new(NodeId::new("n"), "chatInput", Position::default()))
            .expect("add node");

        assert!(session.open(&WorkflowId::new("abc")).await.is_err());
        assert_eq!(session.store().nodes().len(), 1);
        assert_eq!(session.document().title, UNTITLED);
    }

    #[tokio::test]
    async fn new_workflow_starts_empty() {
        let service = ScriptedService::new().respond(Ok(json!({
            "success": true,
            "data": { "_id": "new1", "title": "Stock bot", "description": "" }
        })));
        let mut session = session(service);

        let id = session
            .new_workflow("Stock bot", None)
            .await
            .expect("create");
        assert_eq!(id, "new1");
        assert_eq!(session.document().id, Some(id));
        assert!(session.store().nodes().is_empty());
    }

    #[tokio::test]
    async fn save_sends_live_graph() {
        let service = ScriptedService::new()
            .respond(Ok(json!({ "data": { "_id": "abc", "title": "t" } })))
            .respond(Ok(json!({ "success": true, "data": { "status": "generated" } })));
        let mut session = session(service);
        session.open(&WorkflowId::new("abc")).await.expect("open");

        let store = session.store_mut();
        for (id, node_type) in [("agent-1", "agent"), ("tavily-1", "tavily")] {
            store
                .add_node(Node::new(NodeId::new(id), node_type, Position::default()))
                .expect("add node");
        }
        ConnectionPolicy::new()
            .connect(
                store,
                &Connection::new(NodeId::new("agent-1"), NodeId::new("tavily-1")),
            )
            .expect("connect");
        let revision = session.store().revision();

        session.save().await.expect("save");

        let sent = session.adapter().service().last_body().expect("body");
        assert_eq!(sent["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(sent["edges"].as_array().map(Vec::len), Some(2));
        assert_eq!(session.document().nodes.len(), 2);
        assert_eq!(session.store().revision(), revision);
    }

    #[tokio::test]
    async fn save_without_id_creates_first() {
        let service = ScriptedService::new()
            .respond(Ok(json!({ "data": { "_id": "fresh" } })))
            .respond(Ok(JsonValue::Null));
        let mut session = session(service);

        let id = session.save().await.expect("save");
        assert_eq!(id, "fresh");
        assert_eq!(
            session.adapter().service().operations(),
            vec!["create".to_string(), "update fresh".to_string()]
        );
    }

    #[tokio::test]
    async fn run_on_unsaved_document_needs_id() {
        let mut session = session(ScriptedService::new());
        let state = session.run("hello").await;
        assert_eq!(state, RunState::Failed(RunFailure::MissingId));
        assert_eq!(session.adapter().service().call_count(), 0);
    }

    #[tokio::test]
    async fn failed_run_keeps_local_edits() {
        let service = ScriptedService::new()
            .respond(Ok(json!({ "data": { "_id": "abc", "title": "Old title" } })))
            .respond(Err(PersistenceError::Network {
                details: "connection refused".to_string(),
            }));
        let mut session = session(service);
        session.open(&WorkflowId::new("abc")).await.expect("open");
        session.document_mut().title = "New title".to_string();

        let state = session.run("hi").await;

        assert!(matches!(
            state,
            RunState::Failed(RunFailure::Save(PersistenceError::Network { .. }))
        ));
        assert_eq!(session.document().title, "New title");
    }

    #[tokio::test]
    async fn run_reloads_graph_from_saved_copy() {
        let service = ScriptedService::new()
            .respond(Ok(json!({ "data": { "_id": "abc", "title": "t" } })))
            .respond(Ok(json!({
                "data": {
                    "_id": "abc",
                    "title": "t",
                    "nodes": [{ "id": "agent-1", "type": "agent", "data": { "model": "gpt-4o" } }],
                    "edges": []
                }
            })))
            .respond(Ok(json!({ "data": "done" })));
        let mut session = session(service);
        session.open(&WorkflowId::new("abc")).await.expect("open");
        session
            .store_mut()
            .add_node(Node::new(NodeId::new("agent-1"), "agent", Position::default()))
            .expect("add node");

        let state = session.run("hi").await;

        assert_eq!(
            state,
            RunState::Completed {
                content: "done".to_string()
            }
        );
        let node = session.store().node(&NodeId::new("agent-1")).expect("node");
        assert_eq!(node.data.get("model"), Some(&json!("gpt-4o")));
        assert_eq!(session.document().nodes, session.store().nodes());
    }

    #[tokio::test]
    async fn delete_resets_session() {
        let service = ScriptedService::new()
            .respond(Ok(json!({ "data": { "_id": "abc", "title": "t", "nodes": [{ "id": "n", "type": "agent" }] } })))
            .respond(Ok(json!({ "success": true })));
        let mut session = session(service);
        session.open(&WorkflowId::new("abc")).await.expect("open");

        assert!(session.delete().await.expect("delete"));
        assert!(session.document().id.is_none());
        assert!(session.store().nodes().is_empty());
        assert!(!session.delete().await.expect("second delete"));
    }
}
