//! Core types and utilities for agentflow.
//!
//! This crate provides the identifier types and the error-handling
//! foundation shared by the workflow model and the remote client.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EdgeId, IdGenerator, NodeId, ParseIdError, WorkflowId};
