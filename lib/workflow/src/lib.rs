//! Workflow graph model for the agentflow editor.
//!
//! This crate provides the local side of workflow editing:
//!
//! - **Graph Model**: Nodes with free-form configuration, edges between handles
//! - **Node Registry**: The built-in node kinds, their defaults and readiness rules
//! - **Graph Store**: The single owner of the graph being edited, publishing snapshots
//! - **Connection Policy**: Turning connection gestures into simple or dual tool edges
//! - **Drag and Drop**: Creating nodes from palette drops

pub mod connection;
pub mod definition;
pub mod dragdrop;
pub mod edge;
pub mod error;
pub mod graph;
pub mod handle;
pub mod node;
pub mod registry;

pub use connection::{Connection, ConnectionPolicy};
pub use definition::{Workflow, WorkflowSummary};
pub use dragdrop::{CoordinateTransform, DragDropController, DragPayload, ScreenPoint, Viewport};
pub use edge::{Edge, EdgeKind};
pub use error::GraphError;
pub use graph::{GraphState, GraphStore};
pub use handle::{HandleSide, HandleSpec};
pub use node::{Node, NodeCategory, NodeData, Position};
pub use registry::{NodeDescriptor, NodeKind, NodeRegistry, Readiness};
