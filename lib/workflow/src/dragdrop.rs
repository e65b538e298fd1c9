//! Creating nodes from palette drops.
//!
//! The palette attaches a [`DragPayload`] to a drag; when it is released
//! over the canvas the rendering surface hands the payload and the screen
//! point to [`DragDropController::on_drop`]. Converting the point to canvas
//! space depends on the surface's pan and zoom, so it goes through the
//! [`CoordinateTransform`] seam.

use crate::graph::GraphStore;
use crate::node::{Node, Position};
use crate::registry::{NodeKind, NodeRegistry};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Data carried by a palette drag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    #[serde(default)]
    pub node_type: String,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub node_category: String,
}

impl DragPayload {
    /// The payload the palette attaches when `kind` is dragged.
    #[must_use]
    pub fn for_kind(kind: NodeKind) -> Self {
        Self {
            node_type: kind.type_id().to_string(),
            node_name: kind.display_name().to_string(),
            node_category: kind.category().as_str().to_string(),
        }
    }
}

/// A point in screen space, e.g. the pointer position on release.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Converts screen coordinates into canvas coordinates.
pub trait CoordinateTransform {
    fn to_canvas(&self, point: ScreenPoint) -> Position;
}

impl<F> CoordinateTransform for F
where
    F: Fn(ScreenPoint) -> Position,
{
    fn to_canvas(&self, point: ScreenPoint) -> Position {
        self(point)
    }
}

/// Pan and zoom state of a canvas element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner of the canvas element on screen.
    pub bounds: ScreenPoint,
    /// Pan offset in screen pixels.
    pub pan: ScreenPoint,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            bounds: ScreenPoint::default(),
            pan: ScreenPoint::default(),
            zoom: 1.0,
        }
    }
}

impl CoordinateTransform for Viewport {
    fn to_canvas(&self, point: ScreenPoint) -> Position {
        // A degenerate zoom would send the node to infinity.
        let zoom = if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        };
        Position::new(
            (point.x - self.bounds.x - self.pan.x) / zoom,
            (point.y - self.bounds.y - self.pan.y) / zoom,
        )
    }
}

/// Turns palette drops into new nodes.
#[derive(Debug, Clone, Copy)]
pub struct DragDropController<'r> {
    registry: &'r NodeRegistry,
}

impl DragDropController<'static> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(NodeRegistry::global())
    }
}

impl Default for DragDropController<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> DragDropController<'r> {
    #[must_use]
    pub const fn with_registry(registry: &'r NodeRegistry) -> Self {
        Self { registry }
    }

    /// Adds a node for `payload` at `point` and returns it.
    ///
    /// Returns `None` without touching the store when the payload names no
    /// registered type. The new node's data only records its category;
    /// type defaults are filled later by [`GraphStore::apply_defaults`].
    pub fn on_drop(
        &self,
        store: &mut GraphStore,
        payload: &DragPayload,
        point: ScreenPoint,
        transform: &dyn CoordinateTransform,
    ) -> Option<Node> {
        let node_type = payload.node_type.trim();
        if node_type.is_empty() {
            debug!("ignored drop without node type");
            return None;
        }
        let Some(descriptor) = self.registry.lookup(node_type) else {
            debug!(node_type, "ignored drop of unregistered node type");
            return None;
        };

        let category = match payload.node_category.trim() {
            "" => descriptor.category.as_str(),
            given => given,
        };
        let id = store.next_node_id(descriptor.type_id);
        let node = Node::new(id, descriptor.type_id, transform.to_canvas(point))
            .with_category(category);

        match store.add_node(node.clone()) {
            Ok(()) => {
                debug!(node_id = %node.id, node_type, "dropped node");
                Some(node)
            }
            Err(error) => {
                debug!(%error, "drop rejected");
                None
            }
        }
    }
}
