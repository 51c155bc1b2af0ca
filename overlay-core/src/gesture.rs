//! Pointer gesture boundary.
//!
//! The rendering surface reports finished drags and transforms in its own
//! node coordinates; this module turns them into [`ElementPatch`]es and
//! applies the practical size minimums that only interactive resizing enforces.

use serde::{Deserialize, Serialize};

use crate::{Element, ElementKind, ElementPatch};

/// Smallest width/height an interactive resize can produce for boxes.
pub const MIN_BOX_SIZE: f32 = 10.0;

/// Smallest radius an interactive resize can produce for circles.
pub const MIN_CIRCLE_RADIUS: f32 = 5.0;

/// Result of a finished pointer gesture, in surface node coordinates.
///
/// Circle nodes are positioned by their center; every other node by its
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "camelCase")]
pub enum GestureOutcome {
    /// Drag ended at the given node position.
    Drag {
        /// Node x.
        x: f32,
        /// Node y.
        y: f32,
    },
    /// Resize/rotate ended.
    #[serde(rename_all = "camelCase")]
    Transform {
        /// Node x.
        x: f32,
        /// Node y.
        y: f32,
        /// Horizontal scale accumulated by the handles.
        scale_x: f32,
        /// Vertical scale accumulated by the handles.
        scale_y: f32,
        /// Final rotation in degrees.
        rotation: f32,
    },
}

/// Whether the surface should offer pointer interaction for an element.
#[must_use]
pub fn is_interactive(element: &Element) -> bool {
    element.visible
}

/// Whether the surface may drag an element.
#[must_use]
pub fn can_drag(element: &Element, selected: bool) -> bool {
    selected && element.draggable && element.visible && !element.locked
}

/// Convert a gesture outcome into the attribute patch it implies.
#[must_use]
pub fn gesture_patch(element: &Element, outcome: GestureOutcome) -> ElementPatch {
    match (outcome, &element.kind) {
        (GestureOutcome::Drag { x, y }, ElementKind::Circle { radius, .. }) => {
            ElementPatch::position(x - radius, y - radius)
        }
        (GestureOutcome::Drag { x, y }, _) => ElementPatch::position(x, y),
        (
            GestureOutcome::Transform {
                x,
                y,
                scale_x,
                rotation,
                ..
            },
            ElementKind::Circle { radius, .. },
        ) => {
            let scaled = radius * scale_x;
            ElementPatch {
                radius: Some(scaled.max(MIN_CIRCLE_RADIUS)),
                rotation: Some(rotation),
                ..ElementPatch::position(x - scaled, y - scaled)
            }
        }
        (
            GestureOutcome::Transform {
                x,
                y,
                scale_x,
                rotation,
                ..
            },
            ElementKind::Text { .. },
        ) => ElementPatch {
            width: Some((element.transform.width * scale_x).max(MIN_BOX_SIZE)),
            rotation: Some(rotation),
            ..ElementPatch::position(x, y)
        },
        (
            GestureOutcome::Transform {
                x,
                y,
                scale_x,
                scale_y,
                rotation,
            },
            ElementKind::Rectangle { .. } | ElementKind::Image { .. },
        ) => ElementPatch {
            width: Some((element.transform.width * scale_x).max(MIN_BOX_SIZE)),
            height: Some((element.transform.height * scale_y).max(MIN_BOX_SIZE)),
            rotation: Some(rotation),
            ..ElementPatch::position(x, y)
        },
    }
}
