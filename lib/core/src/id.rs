//! Identifier types for workflow entities.
//!
//! Identifiers are opaque strings. Workflow ids are assigned by the remote
//! persistence service; node and edge ids are minted locally and must stay
//! stable once a node or edge is part of a persisted graph, so ids received
//! from the server are accepted verbatim.
//!
//! Locally minted ids carry a ULID stamp from a monotonic generator. Two ids
//! created within the same millisecond still differ, which a wall-clock
//! timestamp cannot guarantee.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::{Generator, Ulid};

/// Error returned when an identifier string is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a string-backed identifier newtype.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier string without validation.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        id_type: stringify!($name),
                        reason: "identifier is empty".to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

define_id!(
    /// Identifier of a workflow, assigned by the persistence service.
    WorkflowId
);

define_id!(
    /// Identifier of a node, unique within one workflow.
    NodeId
);

define_id!(
    /// Identifier of an edge, unique within one workflow.
    EdgeId
);

/// Mints collision-free stamps for locally created ids.
///
/// Wraps [`ulid::Generator`], which increments the random part when two
/// stamps fall in the same millisecond.
pub struct IdGenerator {
    inner: Generator,
}

impl IdGenerator {
    /// Creates a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Generator::new(),
        }
    }

    /// Returns the next stamp, strictly greater than every previous one.
    pub fn stamp(&mut self) -> Ulid {
        // Overflow needs 2^80 stamps inside one millisecond; fall back to a
        // fresh ULID rather than failing the caller.
        self.inner.generate().unwrap_or_else(|_| Ulid::new())
    }

    /// Mints a node id of the form `{node_type}-{stamp}`.
    pub fn node_id(&mut self, node_type: &str) -> NodeId {
        NodeId(format!("{node_type}-{}", self.stamp()))
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
