//! Connection handles on workflow nodes.
//!
//! Handles are the named points an edge attaches to. Each node kind has a
//! fixed handle layout; edges created without explicit handles use the
//! default names below.

use serde::{Deserialize, Serialize};

/// Source handle name used when a connection does not specify one.
pub const DEFAULT_SOURCE_HANDLE: &str = "output";

/// Target handle name used when a connection does not specify one.
pub const DEFAULT_TARGET_HANDLE: &str = "input";

/// Which side of a node a handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    /// Accepts incoming edges.
    Input,
    /// Emits outgoing edges.
    Output,
}

/// A named handle on a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HandleSpec {
    pub name: &'static str,
    pub side: HandleSide,
}

impl HandleSpec {
    #[must_use]
    pub const fn input(name: &'static str) -> Self {
        Self {
            name,
            side: HandleSide::Input,
        }
    }

    #[must_use]
    pub const fn output(name: &'static str) -> Self {
        Self {
            name,
            side: HandleSide::Output,
        }
    }

    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self.side, HandleSide::Input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_side() {
        assert!(HandleSpec::input("tools").is_input());
        assert!(!HandleSpec::output(DEFAULT_SOURCE_HANDLE).is_input());
    }

    #[test]
    fn side_serializes_lowercase() {
        let json = serde_json::to_string(&HandleSide::Output).expect("serialize");
        assert_eq!(json, "\"output\"");
    }
}
