//! Editor Workflow Integration Tests
//!
//! Drives the document store the way the editor UI does:
//! - Toolbar adds and z-order commands
//! - Gesture commits and history checkpoints
//! - Undo/redo laws over arbitrary edit sequences
//! - Keyboard routing by editor mode

use overlay_core::keymap::{self, Key, KeyChord};
use overlay_core::{
    EditorCommand, EditorConfig, EditorMode, EditorStore, Element, ElementPatch, GestureOutcome,
    GraphicDocument, History, Phase,
};
use proptest::prelude::*;

/// Toolbar add actions.
#[derive(Debug, Clone, Copy)]
enum AddAction {
    Text,
    Rectangle,
    Circle,
    Image,
}

fn add(store: &mut EditorStore, action: AddAction) {
    let id = match action {
        AddAction::Text => store.add_text(),
        AddAction::Rectangle => store.add_rectangle(),
        AddAction::Circle => store.add_circle(),
        AddAction::Image => store.add_image("logo.png"),
    };
    assert!(id.is_some(), "fresh elements always insert");
}

fn arb_add_action() -> impl Strategy<Value = AddAction> {
    prop_oneof![
        Just(AddAction::Text),
        Just(AddAction::Rectangle),
        Just(AddAction::Circle),
        Just(AddAction::Image),
    ]
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_send_circle_behind_rectangle() {
    let mut store = EditorStore::new();
    let rect = store.add_rectangle().expect("rectangle");
    let circle = store.add_circle().expect("circle");
    assert_eq!(store.document().get(rect).expect("rect").z_index, 0);
    assert_eq!(store.document().get(circle).expect("circle").z_index, 1);

    store.send_to_back(circle);

    assert_eq!(store.document().get(circle).expect("circle").z_index, -1);
    let paint: Vec<_> = store
        .document()
        .paint_order()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(paint, vec![circle, rect]);
    let layers: Vec<_> = store
        .document()
        .layer_order()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(layers, vec![rect, circle]);
}

#[test]
fn test_bring_to_front_above_existing_max() {
    let mut doc = GraphicDocument::default();
    doc.elements.push(Element::rectangle(5));
    doc.elements.push(Element::circle(2));
    let target = doc.elements[1].id;
    let mut store = EditorStore::with_document(doc, EditorConfig::default());

    store.bring_to_front(target);
    assert_eq!(store.document().get(target).expect("el").z_index, 6);
}

#[test]
fn test_zoom_clamp_law() {
    let mut store = EditorStore::new();
    store.set_zoom(10.0);
    assert!((store.zoom() - 3.0).abs() < f32::EPSILON);
    store.set_zoom(-5.0);
    assert!((store.zoom() - 0.1).abs() < f32::EPSILON);
}

#[test]
fn test_undo_redo_at_bounds_are_noops() {
    let mut store = EditorStore::new();
    let before = store.document().clone();
    assert!(!store.undo());
    assert_eq!(store.document(), &before);

    store.add_rectangle();
    let after = store.document().clone();
    assert!(!store.redo());
    assert_eq!(store.document(), &after);
}

#[test]
fn test_drag_session_is_one_undo_step() {
    let mut store = EditorStore::new();
    let id = store.add_text().expect("text");
    let len = store.history().len();

    // Live drag updates stay out of history.
    for step in 1..=10 {
        #[allow(clippy::cast_precision_loss)]
        let x = 100.0 + step as f32 * 5.0;
        store.update_element(id, &ElementPatch::position(x, 100.0));
    }
    assert_eq!(store.history().len(), len);

    store.commit_gesture(id, GestureOutcome::Drag { x: 150.0, y: 120.0 });
    assert_eq!(store.history().len(), len + 1);

    assert!(store.undo());
    let el = store.document().get(id).expect("text");
    assert!((el.transform.x - 100.0).abs() < f32::EPSILON);
    assert!((el.transform.y - 100.0).abs() < f32::EPSILON);
}

#[test]
fn test_mid_stack_save_truncates_redo_tail() {
    let mut store = EditorStore::new();
    let a = store.add_rectangle().expect("a");
    store.add_circle();
    store.add_text();
    assert!(store.undo());
    assert!(store.undo());
    assert_eq!(store.history().index(), 1);

    store.update_element(a, &ElementPatch::position(0.0, 0.0));
    store.save_history();

    assert_eq!(store.history().len(), 3);
    assert!(!store.can_redo());
    assert_eq!(store.document().len(), 1);
}

#[test]
fn test_stale_selection_after_undo_is_harmless() {
    let mut store = EditorStore::new();
    let id = store.add_circle().expect("circle");
    store.undo();

    assert_eq!(store.selection(), &[id]);
    assert!(!store.update_element(id, &ElementPatch::position(1.0, 1.0)));
    assert!(store.duplicate_element(id).is_none());
    assert_eq!(store.delete_selected_elements(), 0);
    assert!(store.selection().is_empty());
}

#[test]
fn test_keyboard_routes_by_mode() {
    let mut store = EditorStore::new();
    store.add_rectangle();
    store.add_circle();

    let select_all = keymap::resolve(KeyChord::ctrl('a'), store.mode().key_context());
    assert_eq!(select_all, Some(EditorCommand::SelectAll));
    store.execute(EditorCommand::SelectAll);
    assert_eq!(store.selection().len(), 2);

    let delete = keymap::resolve(KeyChord::plain(Key::Delete), store.mode().key_context())
        .expect("delete bound");
    store.execute(delete);
    assert!(store.document().is_empty());

    store.set_mode(EditorMode::Preview);
    let enter = keymap::resolve(KeyChord::plain(Key::Char('1')), store.mode().key_context())
        .expect("enter bound");
    assert_eq!(store.execute(enter), Some(Phase::Enter));
    assert_eq!(
        keymap::resolve(KeyChord::plain(Key::Delete), store.mode().key_context()),
        None
    );
}

#[test]
fn test_document_survives_json_round_trip() {
    let mut store = EditorStore::new();
    store.add_text();
    store.add_rectangle();
    store.add_image("data:image/png;base64,AAAA");

    let json = store.document().to_json_pretty().expect("json");
    let loaded = GraphicDocument::from_json(&json).expect("parse");
    assert_eq!(&loaded, store.document());
}

// ============================================================================
// Laws
// ============================================================================

proptest! {
    #[test]
    fn prop_add_assigns_insertion_index(actions in prop::collection::vec(arb_add_action(), 0..30)) {
        let mut store = EditorStore::new();
        for action in &actions {
            add(&mut store, *action);
        }

        prop_assert_eq!(store.document().len(), actions.len());
        for (i, element) in store.document().elements.iter().enumerate() {
            prop_assert_eq!(element.z_index, i32::try_from(i).expect("small index"));
        }
    }

    #[test]
    fn prop_history_is_bounded(actions in prop::collection::vec(arb_add_action(), 0..80)) {
        let mut store = EditorStore::new();
        for action in &actions {
            add(&mut store, *action);
            prop_assert!(store.history().len() <= 50);
        }
        prop_assert_eq!(store.history().len(), (actions.len() + 1).min(50));
        prop_assert_eq!(store.history().index(), store.history().len() - 1);
    }

    #[test]
    fn prop_undo_redo_round_trip(
        actions in prop::collection::vec(arb_add_action(), 1..20),
        undos in 1usize..10,
    ) {
        let mut store = EditorStore::new();
        for action in &actions {
            add(&mut store, *action);
        }

        let steps = undos.min(actions.len());
        let mut snapshots = vec![store.document().clone()];
        for _ in 0..steps {
            prop_assert!(store.undo());
            snapshots.push(store.document().clone());
        }
        for expected in snapshots.iter().rev().skip(1) {
            prop_assert!(store.redo());
            prop_assert_eq!(store.document(), expected);
        }
        prop_assert!(!store.can_redo());
    }

    #[test]
    fn prop_eviction_keeps_newest_in_order(pushes in 51usize..90) {
        let mut doc = GraphicDocument::default();
        let mut history = History::new(&doc);
        for i in 0..pushes {
            doc.name = format!("rev {i}");
            history.checkpoint(&doc);
        }

        prop_assert_eq!(history.len(), 50);
        for slot in 0..50 {
            let expected = format!("rev {}", pushes - 50 + slot);
            prop_assert_eq!(&history.get(slot).expect("slot").name, &expected);
        }
    }
}
