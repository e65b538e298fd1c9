//! The remote workflow service.
//!
//! This trait abstracts the HTTP API so the persistence adapter and the
//! execution orchestrator can be tested without a server. Implementations
//! return the response body as JSON after checking the status; envelope
//! unwrapping and interpretation happen in the callers.

use crate::error::PersistenceError;
use crate::wire::RemoteWorkflowPayload;
use agentflow_core::WorkflowId;
use async_trait::async_trait;
use rootcause::prelude::Report;
use serde_json::Value as JsonValue;

#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// `POST /workflows`
    async fn create(
        &self,
        payload: &RemoteWorkflowPayload,
    ) -> Result<JsonValue, Report<PersistenceError>>;

    /// `GET /workflows`
    async fn list(&self) -> Result<JsonValue, Report<PersistenceError>>;

    /// `GET /workflows/{id}`
    async fn fetch(&self, id: &WorkflowId) -> Result<JsonValue, Report<PersistenceError>>;

    /// `PUT /workflows/{id}`
    async fn update(
        &self,
        id: &WorkflowId,
        payload: &RemoteWorkflowPayload,
    ) -> Result<JsonValue, Report<PersistenceError>>;

    /// `DELETE /workflows/{id}`
    async fn delete(&self, id: &WorkflowId) -> Result<(), Report<PersistenceError>>;

    /// `POST /workflows/{id}/execute` with `{ "input": input }`.
    ///
    /// Implementations must not impose their own deadline; the caller
    /// bounds the call.
    async fn execute(
        &self,
        id: &WorkflowId,
        input: &str,
    ) -> Result<JsonValue, Report<PersistenceError>>;
}
