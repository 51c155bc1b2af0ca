//! Editor document store.
//!
//! [`EditorStore`] owns the live document, the selection, the active tool,
//! zoom, editor mode and the undo history, and exposes every mutation the UI
//! can perform. It is single-writer and synchronous: each call runs to
//! completion and then notifies subscribers.
//!
//! Structural edits (add, delete, duplicate) checkpoint history. Attribute
//! edits through [`EditorStore::update_element`] do not, so continuous drags
//! stay out of history; callers checkpoint at gesture end with
//! [`EditorStore::save_history`] or [`EditorStore::commit_gesture`].

use serde::{Deserialize, Serialize};

use crate::animation::Phase;
use crate::gesture::{self, GestureOutcome};
use crate::history::{History, DEFAULT_HISTORY_CAPACITY};
use crate::keymap::{EditorCommand, KeyContext};
use crate::{Element, ElementId, ElementPatch, GraphicDocument};

/// Editor tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum number of history snapshots.
    pub history_capacity: usize,
    /// Lowest zoom factor.
    pub min_zoom: f32,
    /// Highest zoom factor.
    pub max_zoom: f32,
    /// Zoom change per zoom-in/zoom-out step.
    pub zoom_step: f32,
    /// Offset applied on both axes to duplicates.
    pub duplicate_offset: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            min_zoom: 0.1,
            max_zoom: 3.0,
            zoom_step: 0.1,
            duplicate_offset: 20.0,
        }
    }
}

/// Active toolbar tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select and manipulate elements.
    #[default]
    Select,
    /// Place text.
    Text,
    /// Place rectangles.
    Rectangle,
    /// Place circles.
    Circle,
}

/// Whether the editor is editing or previewing animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Editing canvas.
    #[default]
    Edit,
    /// Animation preview.
    Preview,
}

impl EditorMode {
    /// Keyboard context for this mode.
    #[must_use]
    pub const fn key_context(self) -> KeyContext {
        match self {
            Self::Edit => KeyContext::Editing,
            Self::Preview => KeyContext::Playback,
        }
    }
}

/// What a committed mutation changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreChange {
    /// An element was added (and selected).
    ElementAdded(ElementId),
    /// An element's attributes changed.
    ElementUpdated(ElementId),
    /// Elements were removed.
    ElementsDeleted(Vec<ElementId>),
    /// The selection changed.
    SelectionChanged,
    /// The active tool changed.
    ToolChanged(Tool),
    /// The zoom factor changed.
    ZoomChanged(f32),
    /// The editor mode changed.
    ModeChanged(EditorMode),
    /// A history checkpoint was pushed explicitly.
    HistorySaved {
        /// Index of the new snapshot.
        index: usize,
    },
    /// Undo or redo replaced the document.
    HistoryRestored {
        /// Index of the restored snapshot.
        index: usize,
    },
}

/// Handle returned by [`EditorStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked after every committed mutation.
pub type ChangeListener = Box<dyn Fn(&EditorStore, &StoreChange)>;

/// Editor state for one open document session.
///
/// # Example
///
/// ```
/// use overlay_core::store::EditorStore;
///
/// let mut store = EditorStore::new();
/// let id = store.add_rectangle().unwrap();
///
/// assert_eq!(store.selection(), &[id]);
/// assert!(store.undo());
/// assert!(store.document().is_empty());
/// ```
pub struct EditorStore {
    document: GraphicDocument,
    /// Selected ids in selection order; may hold ids removed by undo/redo.
    selection: Vec<ElementId>,
    tool: Tool,
    zoom: f32,
    mode: EditorMode,
    history: History,
    config: EditorConfig,
    listeners: Vec<(SubscriptionId, ChangeListener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for EditorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorStore")
            .field("document", &self.document)
            .field("selection", &self.selection)
            .field("tool", &self.tool)
            .field("zoom", &self.zoom)
            .field("mode", &self.mode)
            .field("history_index", &self.history.index())
            .field("history_len", &self.history.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorStore {
    /// Create a store with an empty default document.
    #[must_use]
    pub fn new() -> Self {
        Self::with_document(GraphicDocument::default(), EditorConfig::default())
    }

    /// Create a store with custom configuration.
    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        Self::with_document(GraphicDocument::default(), config)
    }

    /// Open an existing document. History is seeded with it.
    #[must_use]
    pub fn with_document(document: GraphicDocument, config: EditorConfig) -> Self {
        let history = History::with_capacity(&document, config.history_capacity);
        Self {
            document,
            selection: Vec::new(),
            tool: Tool::default(),
            zoom: 1.0,
            mode: EditorMode::default(),
            history,
            config,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The live document.
    #[must_use]
    pub fn document(&self) -> &GraphicDocument {
        &self.document
    }

    /// Selected ids in selection order. May contain ids that no longer exist.
    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    /// Check if an id is selected.
    #[must_use]
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected elements that exist in the document, in selection order.
    pub fn selected_elements(&self) -> impl Iterator<Item = &Element> {
        self.selection.iter().filter_map(|&id| self.document.get(id))
    }

    /// Active tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Current editor mode.
    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Undo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Store configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Register a listener called after every committed mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&EditorStore, &StoreChange) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&self, change: &StoreChange) {
        for (_, listener) in &self.listeners {
            listener(self, change);
        }
    }

    // -----------------------------------------------------------------------
    // Elements
    // -----------------------------------------------------------------------

    /// Append an element, select it alone, stamp the document and checkpoint.
    ///
    /// No-op returning `None` if an element with the same id already exists.
    pub fn add_element(&mut self, element: Element) -> Option<ElementId> {
        let id = element.id;
        if self.document.contains(id) {
            tracing::trace!("add_element: duplicate id {id} ignored");
            return None;
        }
        self.document.elements.push(element);
        self.document.touch();
        self.selection = vec![id];
        self.checkpoint();
        tracing::debug!("Added element {id}");
        self.notify(&StoreChange::ElementAdded(id));
        Some(id)
    }

    /// Add a default text element on top of the paint order.
    pub fn add_text(&mut self) -> Option<ElementId> {
        let element = Element::text(self.next_z_index());
        self.add_element(element)
    }

    /// Add a default rectangle on top of the paint order.
    pub fn add_rectangle(&mut self) -> Option<ElementId> {
        let element = Element::rectangle(self.next_z_index());
        self.add_element(element)
    }

    /// Add a default circle on top of the paint order.
    pub fn add_circle(&mut self) -> Option<ElementId> {
        let element = Element::circle(self.next_z_index());
        self.add_element(element)
    }

    /// Add an image showing `src` on top of the paint order.
    pub fn add_image(&mut self, src: impl Into<String>) -> Option<ElementId> {
        let element = Element::image(src, self.next_z_index());
        self.add_element(element)
    }

    /// New elements get a `z_index` equal to the current element count.
    fn next_z_index(&self) -> i32 {
        i32::try_from(self.document.len()).unwrap_or(i32::MAX)
    }

    /// Merge `patch` into an element.
    ///
    /// Neither checkpoints history nor stamps `updated_at`. Returns false if
    /// the element does not exist.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let Some(element) = self.document.get_mut(id) else {
            tracing::trace!("update_element: no element {id}");
            return false;
        };
        patch.apply(element);
        self.notify(&StoreChange::ElementUpdated(id));
        true
    }

    /// Remove an element and drop it from the selection; checkpoints.
    ///
    /// Returns false (and leaves history alone) if the element does not exist.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        if !self.document.contains(id) {
            tracing::trace!("delete_element: no element {id}");
            return false;
        }
        self.document.elements.retain(|e| e.id != id);
        self.selection.retain(|&sid| sid != id);
        self.checkpoint();
        tracing::debug!("Deleted element {id}");
        self.notify(&StoreChange::ElementsDeleted(vec![id]));
        true
    }

    /// Remove every selected element and clear the selection; checkpoints.
    ///
    /// Returns the number of elements removed.
    pub fn delete_selected_elements(&mut self) -> usize {
        let selected = std::mem::take(&mut self.selection);
        let removed: Vec<ElementId> = self
            .document
            .element_ids()
            .filter(|id| selected.contains(id))
            .collect();

        if removed.is_empty() {
            if !selected.is_empty() {
                self.notify(&StoreChange::SelectionChanged);
            }
            return 0;
        }

        self.document.elements.retain(|e| !removed.contains(&e.id));
        self.checkpoint();
        tracing::debug!("Deleted {} selected element(s)", removed.len());
        let count = removed.len();
        self.notify(&StoreChange::ElementsDeleted(removed));
        count
    }

    /// Clone an element with a fresh id, offset and " Copy" name, then add it.
    pub fn duplicate_element(&mut self, id: ElementId) -> Option<ElementId> {
        let Some(element) = self.document.get(id) else {
            tracing::trace!("duplicate_element: no element {id}");
            return None;
        };
        let copy = element.duplicate(self.config.duplicate_offset);
        self.add_element(copy)
    }

    /// Duplicate every selected element. The last copy ends up selected.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let selected = self.selection.clone();
        selected
            .into_iter()
            .filter_map(|id| self.duplicate_element(id))
            .collect()
    }

    /// Put an element above every other one. History-silent.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        let z = self.document.max_z_index().saturating_add(1);
        self.update_element(id, &ElementPatch::z_index(z))
    }

    /// Put an element below every other one. History-silent.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        let z = self.document.min_z_index().saturating_sub(1);
        self.update_element(id, &ElementPatch::z_index(z))
    }

    /// Flip an element's visibility. History-silent.
    pub fn toggle_visibility(&mut self, id: ElementId) -> bool {
        let Some(visible) = self.document.get(id).map(|e| e.visible) else {
            return false;
        };
        let patch = ElementPatch {
            visible: Some(!visible),
            ..ElementPatch::default()
        };
        self.update_element(id, &patch)
    }

    /// Flip an element's lock. History-silent.
    pub fn toggle_lock(&mut self, id: ElementId) -> bool {
        let Some(locked) = self.document.get(id).map(|e| e.locked) else {
            return false;
        };
        let patch = ElementPatch {
            locked: Some(!locked),
            ..ElementPatch::default()
        };
        self.update_element(id, &patch)
    }

    /// Apply a finished pointer gesture and checkpoint once.
    pub fn commit_gesture(&mut self, id: ElementId, outcome: GestureOutcome) -> bool {
        let Some(element) = self.document.get(id) else {
            return false;
        };
        let patch = gesture::gesture_patch(element, outcome);
        self.update_element(id, &patch);
        self.save_history();
        true
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select an element.
    ///
    /// With `add_to_selection` false the selection becomes exactly `[id]`;
    /// otherwise `id` is appended unless already selected. No-op for unknown ids.
    pub fn select_element(&mut self, id: ElementId, add_to_selection: bool) {
        if !self.document.contains(id) {
            tracing::trace!("select_element: no element {id}");
            return;
        }
        if add_to_selection {
            if self.selection.contains(&id) {
                return;
            }
            self.selection.push(id);
        } else {
            self.selection = vec![id];
        }
        self.notify(&StoreChange::SelectionChanged);
    }

    /// Add every element to the selection, in document order.
    pub fn select_all(&mut self) {
        let missing: Vec<_> = self
            .document
            .element_ids()
            .filter(|id| !self.selection.contains(id))
            .collect();
        if missing.is_empty() {
            return;
        }
        self.selection.extend(missing);
        self.notify(&StoreChange::SelectionChanged);
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.notify(&StoreChange::SelectionChanged);
    }

    // -----------------------------------------------------------------------
    // Tool, zoom, mode
    // -----------------------------------------------------------------------

    /// Set the active tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.notify(&StoreChange::ToolChanged(tool));
    }

    /// Set the zoom factor, clamped to the configured range.
    ///
    /// Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if !zoom.is_finite() {
            return;
        }
        self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        self.notify(&StoreChange::ZoomChanged(self.zoom));
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.config.zoom_step);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.config.zoom_step);
    }

    /// Reset zoom to 100%.
    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0);
    }

    /// Switch between editing and preview.
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
        self.notify(&StoreChange::ModeChanged(mode));
    }

    /// Flip between editing and preview.
    pub fn toggle_mode(&mut self) {
        let next = match self.mode {
            EditorMode::Edit => EditorMode::Preview,
            EditorMode::Preview => EditorMode::Edit,
        };
        self.set_mode(next);
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    fn checkpoint(&mut self) {
        self.history.checkpoint(&self.document);
    }

    /// Push a checkpoint of the current document.
    pub fn save_history(&mut self) {
        self.checkpoint();
        self.notify(&StoreChange::HistorySaved {
            index: self.history.index(),
        });
    }

    /// Restore the previous snapshot. Selection is left as is.
    ///
    /// Returns false at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        let Some(document) = self.history.undo() else {
            return false;
        };
        self.document = document;
        tracing::debug!("Undo to history index {}", self.history.index());
        self.notify(&StoreChange::HistoryRestored {
            index: self.history.index(),
        });
        true
    }

    /// Restore the next snapshot. Selection is left as is.
    ///
    /// Returns false at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        let Some(document) = self.history.redo() else {
            return false;
        };
        self.document = document;
        tracing::debug!("Redo to history index {}", self.history.index());
        self.notify(&StoreChange::HistoryRestored {
            index: self.history.index(),
        });
        true
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Run a keyboard command.
    ///
    /// Phase triggers do not touch the store; they are returned for the
    /// caller to route to a timeline executor.
    pub fn execute(&mut self, command: EditorCommand) -> Option<Phase> {
        match command {
            EditorCommand::DeleteSelected => {
                self.delete_selected_elements();
            }
            EditorCommand::DuplicateSelected => {
                self.duplicate_selected();
            }
            EditorCommand::Undo => {
                self.undo();
            }
            EditorCommand::Redo => {
                self.redo();
            }
            EditorCommand::SelectAll => self.select_all(),
            EditorCommand::Play(phase) => return Some(phase),
        }
        None
    }
}
