//! Running a workflow remotely.
//!
//! A run always saves first and executes only after the save succeeded:
//!
//! ```text
//! Idle -> Saving -> Executing -> Completed
//!            \          \
//!             +----------+----> Failed
//! ```
//!
//! Execution is bounded by a local deadline. When it passes the run fails
//! with [`RunFailure::Timeout`]; the remote execution is not cancelled.
//! There are no automatic retries: calling [`ExecutionOrchestrator::run`]
//! again starts over from `Idle`.

use crate::adapter::PersistenceAdapter;
use crate::error::RunFailure;
use crate::normalize::execution_content;
use crate::service::WorkflowService;
use agentflow_core::WorkflowId;
use agentflow_workflow::Workflow;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Default local deadline for execution.
pub const DEFAULT_EXECUTE_TIMEOUT: Duration = Duration::from_secs(60);

/// State of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Saving,
    Executing,
    Completed { content: String },
    Failed(RunFailure),
}

impl RunState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Saving => "saving",
            Self::Executing => "executing",
            Self::Completed { .. } => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Drives save-then-execute runs and publishes each state change.
#[derive(Debug)]
pub struct ExecutionOrchestrator {
    execute_timeout: Duration,
    state: watch::Sender<RunState>,
}

impl ExecutionOrchestrator {
    #[must_use]
    pub fn new(execute_timeout: Duration) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            execute_timeout,
            state,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Saves `workflow`, executes it with `input` and returns the terminal
    /// state.
    ///
    /// Without a workflow id the run fails immediately with
    /// [`RunFailure::MissingId`] and nothing is sent.
    #[instrument(skip(self, adapter, workflow_id, workflow, input), fields(workflow_id = tracing::field::Empty))]
    pub async fn run<S: WorkflowService>(
        &mut self,
        adapter: &mut PersistenceAdapter<S>,
        workflow_id: Option<&WorkflowId>,
        workflow: &Workflow,
        input: &str,
    ) -> RunState {
        self.transition(RunState::Idle);

        let Some(id) = workflow_id else {
            warn!("workflow has no id; refusing to run");
            return self.transition(RunState::Failed(RunFailure::MissingId));
        };
        tracing::Span::current().record("workflow_id", tracing::field::display(id));

        self.transition(RunState::Saving);
        if let Err(report) = adapter.save(id, workflow).await {
            let error = report.current_context().clone();
            warn!(error = %error, "save before run failed");
            return self.transition(RunState::Failed(RunFailure::Save(error)));
        }

        self.transition(RunState::Executing);
        let outcome = tokio::time::timeout(
            self.execute_timeout,
            adapter.service().execute(id, input),
        )
        .await;

        let terminal = match outcome {
            Err(_) => RunState::Failed(RunFailure::Timeout {
                after: self.execute_timeout,
            }),
            Ok(Err(report)) => RunState::Failed(RunFailure::from(report.current_context().clone())),
            Ok(Ok(body)) => RunState::Completed {
                content: execution_content(&body),
            },
        };
        self.transition(terminal)
    }

    fn transition(&self, next: RunState) -> RunState {
        match &next {
            RunState::Failed(failure) => warn!(state = next.as_str(), %failure, "run state changed"),
            _ => info!(state = next.as_str(), "run state changed"),
        }
        self.state.send_replace(next.clone());
        next
    }
}

impl Default for ExecutionOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTE_TIMEOUT)
    }
}
