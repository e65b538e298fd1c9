//! Workflow node types.
//!
//! Nodes are the building blocks of workflows. Each node has:
//! - A unique ID within the workflow
//! - A type id naming its [`NodeKind`](crate::registry::NodeKind)
//! - A canvas position
//! - A free-form `data` map carrying its category and configuration
//!
//! The `data` map is deliberately untyped: configuration forms write
//! arbitrary keys into it and the remote runtime reads them back, so the
//! model only interprets `category`.

use agentflow_core::NodeId;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

/// Configuration payload of a node.
pub type NodeData = Map<String, JsonValue>;

/// Key under which a node's category is stored in its data map.
pub const CATEGORY_KEY: &str = "category";

/// The category of a workflow node.
///
/// Categories drive the connection policy: edges touching a
/// [`NodeCategory::Tools`] node are synthesized in pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Text and chat input/output.
    #[serde(rename = "IO", alias = "I/O")]
    Io,
    /// LLM-backed agents.
    #[serde(rename = "AI_AGENTS", alias = "AI & Agents")]
    AiAgents,
    /// Tool integrations called by agents.
    #[serde(rename = "TOOLS", alias = "Tools & Integrations")]
    Tools,
}

impl NodeCategory {
    /// All categories in palette order.
    pub const ALL: [Self; 3] = [Self::Io, Self::AiAgents, Self::Tools];

    /// Returns the canonical wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "IO",
            Self::AiAgents => "AI_AGENTS",
            Self::Tools => "TOOLS",
        }
    }

    /// Returns the human-readable palette heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Io => "I/O",
            Self::AiAgents => "AI & Agents",
            Self::Tools => "Tools & Integrations",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node category: '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for NodeCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "IO" | "I/O" => Ok(Self::Io),
            "AI_AGENTS" | "AI & Agents" => Ok(Self::AiAgents),
            "TOOLS" | "Tools & Integrations" => Ok(Self::Tools),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Editor state the canvas attaches to nodes. It is stripped before a
/// node is sent to the server.
pub const LOCAL_ONLY_KEYS: &[&str] = &["selected", "dragging"];

/// A point in canvas space.
///
/// Whole coordinates are written as JSON integers, so `250` read from the
/// server is sent back as `250` rather than `250.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(serialize_with = "coordinate")]
    pub x: f64,
    #[serde(serialize_with = "coordinate")]
    pub y: f64,
}

/// Largest magnitude below which every whole `f64` is an exact `i64`.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

#[allow(clippy::trivially_copy_pass_by_ref, clippy::cast_possible_truncation)]
fn coordinate<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < EXACT_INTEGER_LIMIT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node within the workflow.
    pub id: NodeId,
    /// Registry type id, e.g. `"agent"` or `"tavily"`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Position on the canvas.
    #[serde(default)]
    pub position: Position,
    /// Category plus type-specific configuration.
    #[serde(default)]
    pub data: NodeData,
    /// Fields this model does not interpret. Everything except
    /// [`LOCAL_ONLY_KEYS`] is sent back to the server.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Node {
    /// Creates a node with empty data.
    #[must_use]
    pub fn new(id: NodeId, node_type: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            node_type: node_type.into(),
            position,
            data: NodeData::new(),
            extra: Map::new(),
        }
    }

    /// Sets the category entry of the data map.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.data
            .insert(CATEGORY_KEY.to_string(), JsonValue::String(category.into()));
        self
    }

    /// Inserts a configuration value.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Returns the category recorded in the node's data, if it parses.
    #[must_use]
    pub fn category(&self) -> Option<NodeCategory> {
        self.data
            .get(CATEGORY_KEY)
            .and_then(JsonValue::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// Returns a copy without the editor state listed in
    /// [`LOCAL_ONLY_KEYS`].
    #[must_use]
    pub fn without_local_state(&self) -> Self {
        let mut node = self.clone();
        node.extra
            .retain(|key, _| !LOCAL_ONLY_KEYS.contains(&key.as_str()));
        node
    }
}
