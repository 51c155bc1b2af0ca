//! WebAssembly bindings for overlay-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! Structured values cross the boundary as JSON strings; element ids as
//! their UUID string form.

use std::collections::BTreeMap;

use wasm_bindgen::prelude::*;

use crate::animation::Phase;
use crate::keymap::{self, EditorCommand, Key, KeyChord};
use crate::{
    ArtifactExporter, EditorConfig, EditorMode, EditorStore, ElementId, ElementPatch,
    ExportConfig, GestureOutcome, GraphicDocument, PreviewPlayer, Tool, VisualState,
};

/// Initialize the overlay WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn parse_id(id: &str) -> Result<ElementId, String> {
    ElementId::parse(id).map_err(|e| e.to_string())
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    store: EditorStore,
    preview: Option<PreviewPlayer>,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor with an empty default document.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: EditorStore::new(),
            preview: None,
        }
    }

    /// Replace the open document. History restarts from it.
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON parsing fails.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, json: &str) -> Result<(), String> {
        let document = GraphicDocument::from_json(json).map_err(|e| e.to_string())?;
        self.store = EditorStore::with_document(document, EditorConfig::default());
        self.preview = None;
        Ok(())
    }

    /// Get the current document as JSON.
    #[wasm_bindgen(js_name = getDocumentJson)]
    #[must_use]
    pub fn get_document_json(&self) -> String {
        self.store.document().to_json().unwrap_or_default()
    }

    /// Get the selected ids as a JSON array.
    #[wasm_bindgen(js_name = getSelectionJson)]
    #[must_use]
    pub fn get_selection_json(&self) -> String {
        serde_json::to_string(self.store.selection()).unwrap_or_default()
    }

    /// Add a default text element. Returns its id.
    #[wasm_bindgen(js_name = addText)]
    pub fn add_text(&mut self) -> Option<String> {
        self.store.add_text().map(|id| id.to_string())
    }

    /// Add a default rectangle. Returns its id.
    #[wasm_bindgen(js_name = addRectangle)]
    pub fn add_rectangle(&mut self) -> Option<String> {
        self.store.add_rectangle().map(|id| id.to_string())
    }

    /// Add a default circle. Returns its id.
    #[wasm_bindgen(js_name = addCircle)]
    pub fn add_circle(&mut self) -> Option<String> {
        self.store.add_circle().map(|id| id.to_string())
    }

    /// Add an image. Returns its id.
    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&mut self, src: &str) -> Option<String> {
        self.store.add_image(src).map(|id| id.to_string())
    }

    /// Merge a JSON patch into an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id or patch cannot be parsed.
    #[wasm_bindgen(js_name = updateElement)]
    pub fn update_element(&mut self, id: &str, patch_json: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        let patch: ElementPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        Ok(self.store.update_element(id, &patch))
    }

    /// Delete one element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id cannot be parsed.
    #[wasm_bindgen(js_name = deleteElement)]
    pub fn delete_element(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.store.delete_element(parse_id(id)?))
    }

    /// Delete every selected element.
    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> usize {
        self.store.delete_selected_elements()
    }

    /// Duplicate one element. Returns the copy's id.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id cannot be parsed.
    #[wasm_bindgen(js_name = duplicateElement)]
    pub fn duplicate_element(&mut self, id: &str) -> Result<Option<String>, String> {
        Ok(self
            .store
            .duplicate_element(parse_id(id)?)
            .map(|id| id.to_string()))
    }

    /// Select an element, optionally adding to the selection.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id cannot be parsed.
    #[wasm_bindgen(js_name = selectElement)]
    pub fn select_element(&mut self, id: &str, add_to_selection: bool) -> Result<(), String> {
        self.store.select_element(parse_id(id)?, add_to_selection);
        Ok(())
    }

    /// Clear the selection.
    #[wasm_bindgen(js_name = deselectAll)]
    pub fn deselect_all(&mut self) {
        self.store.deselect_all();
    }

    /// Move an element above all others.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id cannot be parsed.
    #[wasm_bindgen(js_name = bringToFront)]
    pub fn bring_to_front(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.store.bring_to_front(parse_id(id)?))
    }

    /// Move an element below all others.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id cannot be parsed.
    #[wasm_bindgen(js_name = sendToBack)]
    pub fn send_to_back(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.store.send_to_back(parse_id(id)?))
    }

    /// Apply a finished drag/transform reported by the canvas surface.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id or gesture cannot be parsed.
    #[wasm_bindgen(js_name = commitGesture)]
    pub fn commit_gesture(&mut self, id: &str, gesture_json: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        let outcome: GestureOutcome =
            serde_json::from_str(gesture_json).map_err(|e| e.to_string())?;
        Ok(self.store.commit_gesture(id, outcome))
    }

    /// Set the active tool by name (`select`, `text`, `rectangle`, `circle`).
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown tool.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, tool: &str) -> Result<(), String> {
        let tool: Tool =
            serde_json::from_value(serde_json::Value::String(tool.to_string()))
                .map_err(|e| e.to_string())?;
        self.store.set_tool(tool);
        Ok(())
    }

    /// Set the zoom factor.
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f32) {
        self.store.set_zoom(zoom);
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.store.zoom()
    }

    /// Push a history checkpoint.
    #[wasm_bindgen(js_name = saveHistory)]
    pub fn save_history(&mut self) {
        self.store.save_history();
    }

    /// Step back in history.
    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    /// Step forward in history.
    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    /// Check if undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    /// Check if redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Enter or leave preview mode. Entering resets playback.
    #[wasm_bindgen(js_name = setPreview)]
    pub fn set_preview(&mut self, preview: bool) {
        if preview {
            self.store.set_mode(EditorMode::Preview);
            self.preview = Some(PreviewPlayer::for_document(self.store.document()));
        } else {
            self.store.set_mode(EditorMode::Edit);
            self.preview = None;
        }
    }

    /// Check if the editor is in preview mode.
    #[wasm_bindgen(js_name = isPreview)]
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.store.mode() == EditorMode::Preview
    }

    /// Trigger a phase (`enter` or `exit`) in the preview.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown phase.
    #[wasm_bindgen(js_name = playPhase)]
    pub fn play_phase(&mut self, phase: &str) -> Result<(), String> {
        let phase: Phase = phase.parse()?;
        self.play(phase);
        Ok(())
    }

    /// Handle a DOM key press. Returns true if it was bound.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str, ctrl: bool, meta: bool, shift: bool) -> bool {
        let Some(key) = Key::from_dom(key) else {
            return false;
        };
        let chord = KeyChord {
            key,
            ctrl,
            meta,
            shift,
        };
        let Some(command) = keymap::resolve(chord, self.store.mode().key_context()) else {
            return false;
        };
        if let Some(phase) = self.store.execute(command) {
            self.play(phase);
        }
        !matches!(command, EditorCommand::Play(_)) || self.preview.is_some()
    }

    /// Advance the preview clock by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if let Some(player) = &mut self.preview {
            player.advance(dt);
        }
    }

    /// Effective preview state of every element as a JSON object keyed by id.
    #[wasm_bindgen(js_name = getPreviewStatesJson)]
    #[must_use]
    pub fn get_preview_states_json(&self) -> String {
        let states: BTreeMap<String, VisualState> = self
            .preview
            .as_ref()
            .map(|player| {
                player
                    .states()
                    .into_iter()
                    .map(|(id, state)| (id.to_string(), state))
                    .collect()
            })
            .unwrap_or_default();
        serde_json::to_string(&states).unwrap_or_default()
    }

    /// Export the document as a standalone HTML page.
    ///
    /// # Errors
    ///
    /// Returns an error string if rendering fails.
    #[wasm_bindgen(js_name = exportHtml)]
    pub fn export_html(&self) -> Result<String, String> {
        ArtifactExporter::new(ExportConfig::default())
            .export_html(self.store.document())
            .map_err(|e| e.to_string())
    }
}

impl WasmEditor {
    fn play(&mut self, phase: Phase) {
        if let Some(player) = &mut self.preview {
            player.play(self.store.document(), phase);
        }
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}
