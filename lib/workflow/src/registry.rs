//! Built-in node kinds and the palette registry.
//!
//! Every node type the editor understands is a [`NodeKind`] variant. The
//! variant owns its descriptor, its handle layout, its default
//! configuration and its readiness rule, so adding a node type means adding
//! one variant and filling in the matches below.
//!
//! [`NodeRegistry`] is the immutable, process-wide table built from those
//! variants on first use.

use crate::handle::{DEFAULT_SOURCE_HANDLE, DEFAULT_TARGET_HANDLE, HandleSpec};
use crate::node::{NodeCategory, NodeData};
use serde_json::{Value as JsonValue, json};
use std::sync::OnceLock;

/// Azure deployments need extra connection settings.
const AZURE_PROVIDER: &str = "azure";

const DEFAULT_AZURE_API_VERSION: &str = "2024-06-01";

const INPUT_ONLY: &[HandleSpec] = &[HandleSpec::input(DEFAULT_TARGET_HANDLE)];
const OUTPUT_ONLY: &[HandleSpec] = &[HandleSpec::output(DEFAULT_SOURCE_HANDLE)];
const PASS_THROUGH: &[HandleSpec] = &[
    HandleSpec::input(DEFAULT_TARGET_HANDLE),
    HandleSpec::output(DEFAULT_SOURCE_HANDLE),
];
const AGENT_HANDLES: &[HandleSpec] = &[
    HandleSpec::input("instructions"),
    HandleSpec::input("tools"),
    HandleSpec::input(DEFAULT_TARGET_HANDLE),
    HandleSpec::output(DEFAULT_SOURCE_HANDLE),
];

/// A node type the editor can place on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    TextInput,
    ChatInput,
    TextOutput,
    ChatOutput,
    Agent,
    Tavily,
    ApiRequest,
    YahooFinance,
}

impl NodeKind {
    /// All built-in kinds in palette order.
    pub const ALL: [Self; 8] = [
        Self::TextInput,
        Self::ChatInput,
        Self::TextOutput,
        Self::ChatOutput,
        Self::Agent,
        Self::Tavily,
        Self::ApiRequest,
        Self::YahooFinance,
    ];

    /// Returns the type id stored in a node's `type` field.
    #[must_use]
    pub const fn type_id(self) -> &'static str {
        match self {
            Self::TextInput => "textInput",
            Self::ChatInput => "chatInput",
            Self::TextOutput => "textOutput",
            Self::ChatOutput => "chatOutput",
            Self::Agent => "agent",
            Self::Tavily => "tavily",
            Self::ApiRequest => "apiRequest",
            Self::YahooFinance => "yahooFinance",
        }
    }

    /// Resolves a type id. Matching is exact.
    #[must_use]
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_id() == type_id)
    }

    #[must_use]
    pub const fn category(self) -> NodeCategory {
        match self {
            Self::TextInput | Self::ChatInput | Self::TextOutput | Self::ChatOutput => {
                NodeCategory::Io
            }
            Self::Agent => NodeCategory::AiAgents,
            Self::Tavily | Self::ApiRequest | Self::YahooFinance => NodeCategory::Tools,
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::TextInput => "Text Input",
            Self::ChatInput => "Chat Input",
            Self::TextOutput => "Text Output",
            Self::ChatOutput => "Chat Output",
            Self::Agent => "Agent",
            Self::Tavily => "Tavily",
            Self::ApiRequest => "API Request",
            Self::YahooFinance => "Yahoo Finance",
        }
    }

    /// Icon name from the lucide set.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::TextInput => "file-text",
            Self::ChatInput => "message-circle",
            Self::TextOutput => "file-output",
            Self::ChatOutput => "message-square",
            Self::Agent => "user",
            Self::Tavily => "search",
            Self::ApiRequest => "globe",
            Self::YahooFinance => "trending-up",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::TextInput => "Text input for workflows",
            Self::ChatInput => "Chat input for conversation workflows",
            Self::TextOutput => "Text output from workflows",
            Self::ChatOutput => "Chat output for conversation workflows",
            Self::Agent => "AI agent with reasoning capabilities",
            Self::Tavily => "Real-time web search and content extraction",
            Self::ApiRequest => "HTTP API requests with multiple methods",
            Self::YahooFinance => "Stock market data and financial information",
        }
    }

    /// Returns the handles this kind exposes.
    #[must_use]
    pub const fn handles(self) -> &'static [HandleSpec] {
        match self {
            Self::TextInput | Self::YahooFinance => PASS_THROUGH,
            Self::ChatInput | Self::Tavily | Self::ApiRequest => OUTPUT_ONLY,
            Self::TextOutput | Self::ChatOutput => INPUT_ONLY,
            Self::Agent => AGENT_HANDLES,
        }
    }

    #[must_use]
    pub fn descriptor(self) -> NodeDescriptor {
        NodeDescriptor {
            kind: self,
            type_id: self.type_id(),
            display_name: self.display_name(),
            icon: self.icon(),
            category: self.category(),
            description: self.description(),
        }
    }

    /// Returns the configuration a freshly rendered node starts from.
    #[must_use]
    pub fn default_data(self) -> NodeData {
        let value = match self {
            Self::TextInput => json!({
                "title": "Text Input",
                "description": "Enter text to pass through the workflow",
                "textValue": "",
                "placeholder": "Type your text here...",
            }),
            Self::ChatInput => json!({ "title": "Chat Input" }),
            Self::TextOutput => json!({ "title": "Text Output" }),
            Self::ChatOutput => json!({ "title": "Chat Output" }),
            Self::Agent => json!({
                "label": "Agent",
                "title": "LLM Node (agent)",
                "description": "Configure and run an AI agent",
                "provider": "",
                "model": "",
                "API_key": "",
                "api_version": DEFAULT_AZURE_API_VERSION,
                "azure_endpoint": "",
                "system_message": "",
                "input": "",
                "type": "agent",
            }),
            Self::Tavily => json!({
                "label": "Tool",
                "title": "Tavily Search",
                "description": "Perform web search using Tavily API",
                "API_key": "",
                "search_query": "",
                "type": "tavily",
            }),
            Self::ApiRequest => json!({
                "label": "Tool",
                "title": "API Request",
                "description": "Make HTTP API requests",
                "url": "",
                "method": "GET",
                "payload": "",
                "headers": { "Content-Type": "application/json" },
                "type": "api_request",
            }),
            Self::YahooFinance => json!({
                "label": "Tool",
                "title": "Yahoo Finance",
                "description": "Fetch stock and company information",
                "ticker_symbol": "",
                "type": "yahoo_finance",
            }),
        };
        match value {
            JsonValue::Object(map) => map,
            _ => NodeData::new(),
        }
    }

    /// Checks whether `data` holds everything this kind needs to run.
    #[must_use]
    pub fn readiness(self, data: &NodeData) -> Readiness {
        let mut missing = Vec::new();
        let mut require = |key: &'static str| {
            if is_blank(data, key) {
                missing.push(key);
            }
        };
        match self {
            Self::TextInput => require("textValue"),
            Self::ChatInput | Self::TextOutput | Self::ChatOutput => {}
            Self::Agent => {
                require("provider");
                require("model");
                require("API_key");
                require("system_message");
                if str_value(data, "provider") == Some(AZURE_PROVIDER) {
                    require("api_version");
                    require("azure_endpoint");
                }
            }
            Self::Tavily => {
                require("API_key");
                require("search_query");
            }
            Self::ApiRequest => require("url"),
            Self::YahooFinance => {
                if !str_value(data, "ticker_symbol").is_some_and(is_ticker_symbol) {
                    missing.push("ticker_symbol");
                }
            }
        }
        Readiness::from_missing(missing)
    }
}

fn str_value<'a>(data: &'a NodeData, key: &str) -> Option<&'a str> {
    data.get(key).and_then(JsonValue::as_str)
}

fn is_blank(data: &NodeData, key: &str) -> bool {
    str_value(data, key).is_none_or(|value| value.trim().is_empty())
}

/// One to five uppercase ASCII letters.
fn is_ticker_symbol(value: &str) -> bool {
    (1..=5).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_uppercase())
}

/// Whether a node's configuration is complete enough to run.
///
/// This is an indicator for the editor, not an error: incomplete nodes can
/// still be saved and connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Incomplete { missing: Vec<&'static str> },
}

impl Readiness {
    fn from_missing(missing: Vec<&'static str>) -> Self {
        if missing.is_empty() {
            Self::Ready
        } else {
            Self::Incomplete { missing }
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Palette entry for a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub kind: NodeKind,
    pub type_id: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub category: NodeCategory,
    pub description: &'static str,
}

/// Immutable table of the node kinds available to the editor.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    descriptors: Vec<NodeDescriptor>,
}

impl NodeRegistry {
    /// Builds a registry holding every built-in kind.
    #[must_use]
    pub fn builtin() -> Self {
        Self::with_kinds(NodeKind::ALL)
    }

    /// Builds a registry restricted to `kinds`, in the given order.
    #[must_use]
    pub fn with_kinds(kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        Self {
            descriptors: kinds.into_iter().map(NodeKind::descriptor).collect(),
        }
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<NodeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::builtin)
    }

    #[must_use]
    pub fn lookup(&self, type_id: &str) -> Option<&NodeDescriptor> {
        self.descriptors.iter().find(|d| d.type_id == type_id)
    }

    #[must_use]
    pub fn descriptors(&self) -> &[NodeDescriptor] {
        &self.descriptors
    }

    /// Groups descriptors by category for the palette. Empty categories are
    /// omitted.
    #[must_use]
    pub fn by_category(&self) -> Vec<(NodeCategory, Vec<&NodeDescriptor>)> {
        NodeCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let entries: Vec<_> = self
                    .descriptors
                    .iter()
                    .filter(|d| d.category == category)
                    .collect();
                (!entries.is_empty()).then_some((category, entries))
            })
            .collect()
    }
}
