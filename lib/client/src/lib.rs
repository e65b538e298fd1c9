//! Remote side of the agentflow editor.
//!
//! - **Service**: The [`WorkflowService`] seam and its HTTP implementation
//! - **Persistence**: Mapping workflows to and from the wire form, with a cache
//! - **Execution**: Save-then-execute runs with a local deadline
//! - **Session**: One open workflow, its live graph and its runs
//! - **Config**: Layered client configuration

pub mod adapter;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod orchestrator;
pub mod service;
pub mod session;
pub mod wire;

pub use adapter::{GenerationResult, PersistenceAdapter};
pub use config::ClientConfig;
pub use error::{PersistenceError, RunFailure};
pub use http::HttpWorkflowService;
pub use normalize::execution_content;
pub use orchestrator::{DEFAULT_EXECUTE_TIMEOUT, ExecutionOrchestrator, RunState};
pub use service::WorkflowService;
pub use session::EditorSession;
pub use wire::RemoteWorkflowPayload;
