//! Persistence of workflow documents.
//!
//! [`PersistenceAdapter`] maps between [`Workflow`] and the wire form and
//! keeps a cache of the last known copy of each workflow. Failed calls
//! never touch the cache.

use crate::error::PersistenceError;
use crate::service::WorkflowService;
use crate::wire::{
    RemoteWorkflowPayload, from_remote, is_workflow_document, to_remote, unwrap_envelope,
};
use agentflow_core::WorkflowId;
use agentflow_workflow::{Workflow, WorkflowSummary};
use rootcause::prelude::Report;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// Downstream result returned when a saved workflow is handed to the agent
/// generator. Its shape belongs to the generator, so it stays opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult(pub JsonValue);

impl GenerationResult {
    #[must_use]
    pub fn into_inner(self) -> JsonValue {
        self.0
    }
}

/// Creates, loads, saves and deletes workflows through a [`WorkflowService`].
#[derive(Debug)]
pub struct PersistenceAdapter<S: WorkflowService> {
    service: S,
    cache: HashMap<WorkflowId, Workflow>,
}

impl<S: WorkflowService> PersistenceAdapter<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            cache: HashMap::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns the last known copy of a workflow.
    pub fn cached(&self, id: &WorkflowId) -> Option<&Workflow> {
        self.cache.get(id)
    }

    /// Creates `workflow` remotely and returns its new id.
    ///
    /// # Errors
    ///
    /// Fails if the request fails or the response carries no id.
    #[instrument(skip(self, workflow), fields(title = %workflow.title))]
    pub async fn create(&mut self, workflow: &Workflow) -> Result<WorkflowId, Report<PersistenceError>> {
        let body = self.service.create(&to_remote(workflow)).await?;
        let payload = parse_payload(unwrap_envelope(body))?;

        let mut created = workflow.clone();
        payload.merge_into(&mut created);
        let Some(id) = created.id.clone() else {
            return Err(PersistenceError::MalformedResponse {
                details: "create response carries no workflow id".to_string(),
            }
            .into());
        };

        info!(workflow_id = %id, "created workflow");
        self.cache.insert(id.clone(), created);
        Ok(id)
    }

    /// Loads a workflow.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NotFound`] for unknown ids, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(workflow_id = %id))]
    pub async fn fetch(&mut self, id: &WorkflowId) -> Result<Workflow, Report<PersistenceError>> {
        let body = self.service.fetch(id).await?;
        let mut workflow = from_remote(parse_payload(unwrap_envelope(body))?);
        if workflow.id.is_none() {
            workflow.id = Some(id.clone());
        }
        self.cache.insert(id.clone(), workflow.clone());
        Ok(workflow)
    }

    /// Lists all workflows.
    ///
    /// # Errors
    ///
    /// Fails if the request fails or the body is not a list of workflows.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<WorkflowSummary>, Report<PersistenceError>> {
        let body = unwrap_envelope(self.service.list().await?);
        let JsonValue::Array(items) = body else {
            return Err(PersistenceError::MalformedResponse {
                details: "expected a list of workflows".to_string(),
            }
            .into());
        };

        items
            .into_iter()
            .map(|item| parse_payload(item).map(|payload| from_remote(payload).summary()))
            .collect()
    }

    /// Deletes a workflow.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NotFound`] for unknown ids, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(workflow_id = %id))]
    pub async fn delete(&mut self, id: &WorkflowId) -> Result<(), Report<PersistenceError>> {
        self.service.delete(id).await?;
        self.cache.remove(id);
        info!(workflow_id = %id, "deleted workflow");
        Ok(())
    }

    /// Saves `workflow` and returns the reconciled copy.
    ///
    /// The response is merged over the copy that was sent, field by field:
    /// fields the response omits keep the values that were saved, so a
    /// partial response never clears nodes or edges. A response that is
    /// not a workflow document, such as the generator's `{ id, status }`
    /// reply, leaves the sent copy as is. The result
    /// replaces the cached copy.
    ///
    /// # Errors
    ///
    /// Fails if the request fails or the response is a malformed workflow.
    #[instrument(skip(self, workflow), fields(workflow_id = %id))]
    pub async fn save(
        &mut self,
        id: &WorkflowId,
        workflow: &Workflow,
    ) -> Result<Workflow, Report<PersistenceError>> {
        let body = self.service.update(id, &to_remote(workflow)).await?;
        let data = unwrap_envelope(body);

        let mut saved = workflow.clone();
        saved.id = Some(id.clone());
        if is_workflow_document(&data) {
            parse_payload(data)?.merge_into(&mut saved);
        }

        info!(
            workflow_id = %id,
            node_count = saved.nodes.len(),
            edge_count = saved.edges.len(),
            "saved workflow"
        );
        self.cache.insert(id.clone(), saved.clone());
        Ok(saved)
    }

    /// Saves `workflow` and returns what the service produced from it
    /// downstream instead of a workflow document.
    ///
    /// # Errors
    ///
    /// Fails if the request fails.
    #[instrument(skip(self, workflow), fields(workflow_id = %id))]
    pub async fn save_for_generation(
        &mut self,
        id: &WorkflowId,
        workflow: &Workflow,
    ) -> Result<GenerationResult, Report<PersistenceError>> {
        let body = self.service.update(id, &to_remote(workflow)).await?;

        let mut saved = workflow.clone();
        saved.id = Some(id.clone());
        self.cache.insert(id.clone(), saved);

        info!(workflow_id = %id, "saved workflow for generation");
        Ok(GenerationResult(unwrap_envelope(body)))
    }
}

fn parse_payload(value: JsonValue) -> Result<RemoteWorkflowPayload, Report<PersistenceError>> {
    if !value.is_object() {
        return Err(PersistenceError::MalformedResponse {
            details: "expected a workflow object".to_string(),
        }
        .into());
    }
    serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, "unreadable workflow document");
        PersistenceError::MalformedResponse {
            details: e.to_string(),
        }
        .into()
    })
}
