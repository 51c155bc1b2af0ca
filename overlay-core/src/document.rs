//! The graphic document: canvas configuration plus the element list.

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Element, ElementId, OverlayError, OverlayResult};

/// Default document name.
pub const DEFAULT_DOCUMENT_NAME: &str = "Untitled Graphic";

/// Canvas size and background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Background color as hex.
    pub background_color: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            background_color: "#000000".to_string(),
        }
    }
}

/// A whole overlay at one point in time.
///
/// `elements` is kept in insertion order. Paint order is derived from
/// `z_index` by [`GraphicDocument::paint_order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicDocument {
    /// Document identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Canvas configuration.
    pub canvas: CanvasConfig,
    /// Elements in insertion order.
    pub elements: Vec<Element>,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Last structural edit, milliseconds since the Unix epoch.
    pub updated_at: u64,
}

impl Default for GraphicDocument {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT_NAME, CanvasConfig::default())
    }
}

impl GraphicDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new(name: impl Into<String>, canvas: CanvasConfig) -> Self {
        let now = current_timestamp_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            canvas,
            elements: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Check whether an element with this ID exists.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// Element IDs in insertion order.
    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().map(|e| e.id)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements sorted by ascending `z_index`; ties keep insertion order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut sorted: Vec<_> = self.elements.iter().collect();
        sorted.sort_by_key(|e| e.z_index);
        sorted
    }

    /// Elements as listed in the layer panel: topmost first.
    ///
    /// Ties keep insertion order, same as [`Self::paint_order`].
    #[must_use]
    pub fn layer_order(&self) -> Vec<&Element> {
        let mut sorted: Vec<_> = self.elements.iter().collect();
        sorted.sort_by(|a, b| b.z_index.cmp(&a.z_index));
        sorted
    }

    /// Highest `z_index`, or 0 for an empty document.
    #[must_use]
    pub fn max_z_index(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).max().unwrap_or(0)
    }

    /// Lowest `z_index`, or 0 for an empty document.
    #[must_use]
    pub fn min_z_index(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).min().unwrap_or(0)
    }

    /// Stamp `updated_at` with the current time.
    pub fn touch(&mut self) {
        self.updated_at = current_timestamp_ms().max(self.created_at);
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> OverlayResult<String> {
        serde_json::to_string(self).map_err(OverlayError::Serialization)
    }

    /// Serialize the document to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> OverlayResult<String> {
        serde_json::to_string_pretty(self).map_err(OverlayError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        serde_json::from_str(json).map_err(OverlayError::Serialization)
    }
}

/// Get the current Unix timestamp in milliseconds.
#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

/// Get the current Unix timestamp in milliseconds.
///
/// `SystemTime` is unavailable in the browser, so this reads `Date.now()`.
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        js_sys::Date::now() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(z: &[i32]) -> GraphicDocument {
        let mut doc = GraphicDocument::default();
        for &z_index in z {
            doc.elements.push(Element::rectangle(z_index));
        }
        doc
    }

    #[test]
    fn test_default_document() {
        let doc = GraphicDocument::default();
        assert_eq!(doc.name, DEFAULT_DOCUMENT_NAME);
        assert!((doc.canvas.width - 1920.0).abs() < f32::EPSILON);
        assert_eq!(doc.canvas.background_color, "#000000");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_paint_order_is_stable() {
        let doc = doc_with(&[2, 0, 2, -1]);
        let ids: Vec<_> = doc.elements.iter().map(|e| e.id).collect();
        let painted: Vec<_> = doc.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(painted, vec![ids[3], ids[1], ids[0], ids[2]]);

        let layers: Vec<_> = doc.layer_order().iter().map(|e| e.id).collect();
        assert_eq!(layers, vec![ids[0], ids[2], ids[1], ids[3]]);
    }

    #[test]
    fn test_z_extents_default_to_zero() {
        let empty = GraphicDocument::default();
        assert_eq!(empty.max_z_index(), 0);
        assert_eq!(empty.min_z_index(), 0);

        let doc = doc_with(&[-3, 5]);
        assert_eq!(doc.max_z_index(), 5);
        assert_eq!(doc.min_z_index(), -3);
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = doc_with(&[0, 1]);
        let json = doc.to_json().expect("serialize");
        assert!(json.contains("\"backgroundColor\""));
        let back = GraphicDocument::from_json(&json).expect("deserialize");
        assert_eq!(back, doc);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            GraphicDocument::from_json("{ nope }"),
            Err(OverlayError::Serialization(_))
        ));
    }
}
