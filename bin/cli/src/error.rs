//! CLI error types.

use agentflow_client::{PersistenceError, RunFailure};
use rootcause::prelude::Report;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// A call to the workflow service failed.
    Service(PersistenceError),
    /// A workflow run ended in failure.
    Run(RunFailure),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "configuration error: {details}"),
            Self::Service(error) => write!(f, "{error}"),
            Self::Run(failure) => write!(f, "run failed: {failure}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<Report<PersistenceError>> for CliError {
    fn from(report: Report<PersistenceError>) -> Self {
        Self::Service(report.current_context().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_failure_display() {
        let err = CliError::Run(RunFailure::MissingId);
        assert!(err.to_string().starts_with("run failed: "));
    }

    #[test]
    fn service_error_display_is_passed_through() {
        let inner = PersistenceError::NotFound {
            resource: "workflow abc".to_string(),
        };
        assert_eq!(CliError::Service(inner.clone()).to_string(), inner.to_string());
    }
}
