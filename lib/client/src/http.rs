//! HTTP implementation of [`WorkflowService`].

use crate::config::ClientConfig;
use crate::error::PersistenceError;
use crate::service::WorkflowService;
use crate::wire::RemoteWorkflowPayload;
use agentflow_core::WorkflowId;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rootcause::prelude::Report;
use serde_json::{Value as JsonValue, json};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Talks to the workflow service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpWorkflowService {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpWorkflowService {
    /// Creates a service client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, Report<PersistenceError>> {
        let client = Client::builder()
            .build()
            .map_err(|e| PersistenceError::Network {
                details: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
        })
    }

    fn workflows_url(&self) -> String {
        format!("{}/workflows", self.base_url)
    }

    fn workflow_url(&self, id: &WorkflowId) -> String {
        format!("{}/workflows/{id}", self.base_url)
    }

    /// Sends `request` and returns the parsed body of a successful response.
    ///
    /// Non-JSON success bodies are returned as a JSON string; an empty body
    /// is `null`.
    async fn send(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<JsonValue, Report<PersistenceError>> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, resource, "workflow service request failed");
            if e.is_timeout() {
                PersistenceError::Timeout
            } else {
                PersistenceError::Network {
                    details: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PersistenceError::Network {
                details: e.to_string(),
            })?;
        let body = parse_body(&text);

        if !status.is_success() {
            warn!(status = %status, resource, "workflow service returned error");
            return Err(PersistenceError::from_status(status.as_u16(), resource, &body).into());
        }

        debug!(status = %status, resource, "workflow service responded");
        Ok(body)
    }
}

fn parse_body(text: &str) -> JsonValue {
    if text.trim().is_empty() {
        return JsonValue::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_string()))
}

#[async_trait]
impl WorkflowService for HttpWorkflowService {
    #[instrument(skip(self, payload))]
    async fn create(
        &self,
        payload: &RemoteWorkflowPayload,
    ) -> Result<JsonValue, Report<PersistenceError>> {
        let request = self
            .client
            .post(self.workflows_url())
            .timeout(self.request_timeout)
            .json(payload);
        self.send(request, "workflows").await
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<JsonValue, Report<PersistenceError>> {
        let request = self
            .client
            .get(self.workflows_url())
            .timeout(self.request_timeout);
        self.send(request, "workflows").await
    }

    #[instrument(skip(self), fields(workflow_id = %id))]
    async fn fetch(&self, id: &WorkflowId) -> Result<JsonValue, Report<PersistenceError>> {
        let request = self
            .client
            .get(self.workflow_url(id))
            .timeout(self.request_timeout);
        self.send(request, &format!("workflow {id}")).await
    }

    #[instrument(skip(self, payload), fields(workflow_id = %id))]
    async fn update(
        &self,
        id: &WorkflowId,
        payload: &RemoteWorkflowPayload,
    ) -> Result<JsonValue, Report<PersistenceError>> {
        let request = self
            .client
            .put(self.workflow_url(id))
            .timeout(self.request_timeout)
            .json(payload);
        self.send(request, &format!("workflow {id}")).await
    }

    #[instrument(skip(self), fields(workflow_id = %id))]
    async fn delete(&self, id: &WorkflowId) -> Result<(), Report<PersistenceError>> {
        let request = self
            .client
            .delete(self.workflow_url(id))
            .timeout(self.request_timeout);
        self.send(request, &format!("workflow {id}")).await?;
        Ok(())
    }

    #[instrument(skip(self, input), fields(workflow_id = %id))]
    async fn execute(
        &self,
        id: &WorkflowId,
        input: &str,
    ) -> Result<JsonValue, Report<PersistenceError>> {
        let request = self
            .client
            .post(format!("{}/execute", self.workflow_url(id)))
            .json(&json!({ "input": input }));
        self.send(request, &format!("workflow {id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_ignore_trailing_slash() {
        let config = ClientConfig {
            base_url: "http://localhost:8004/api/".to_string(),
            ..ClientConfig::default()
        };
        let service = HttpWorkflowService::new(&config).expect("client");
        assert_eq!(service.workflows_url(), "http://localhost:8004/api/workflows");
        assert_eq!(
            service.workflow_url(&WorkflowId::new("abc")),
            "http://localhost:8004/api/workflows/abc"
        );
    }

    #[test]
    fn body_parsing() {
        assert_eq!(parse_body(""), JsonValue::Null);
        assert_eq!(parse_body("{\"a\":1}"), json!({ "a": 1 }));
        assert_eq!(parse_body("done"), json!("done"));
    }
}
