//! Integration tests: full input sequences through `CanvasEngine`.
//!
//! Each test drives the engine only through its public surface (input
//! events, thin API calls, JSON documents) and checks the store, viewport
//! and listener traffic that results.

use mm_core::{GraphStore, NodeId, Point, Vector};
use mm_editor::*;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn engine_with_sample() -> CanvasEngine {
    CanvasEngine::with_store(GraphStore::with_sample_data(), EditorConfig::default())
}

fn record(engine: &mut CanvasEngine) -> Rc<RefCell<Vec<CanvasChange>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.subscribe(move |change| sink.borrow_mut().push(*change));
    seen
}

fn screen_of(engine: &CanvasEngine, id: NodeId) -> Point {
    engine.to_screen(engine.store().node(id).map(|n| n.position).unwrap_or_default())
}

#[test]
fn tap_shift_tap_then_drag_moves_both_nodes() {
    init_logger();
    let mut engine = engine_with_sample();
    let ids: Vec<NodeId> = engine.store().nodes().iter().map(|n| n.id).collect();
    let (a, b) = (ids[1], ids[2]);
    let before_a = engine.store().node(a).unwrap().position;
    let before_b = engine.store().node(b).unwrap().position;

    let pa = screen_of(&engine, a);
    engine.handle_input(&InputEvent::pointer_down(pa.x, pa.y, 0));
    engine.handle_input(&InputEvent::pointer_up(pa.x, pa.y, 40));

    let pb = screen_of(&engine, b);
    engine.handle_input(&InputEvent::PointerDown {
        x: pb.x,
        y: pb.y,
        time_ms: 1000,
        modifiers: Modifiers::SHIFT,
    });
    engine.handle_input(&InputEvent::pointer_up(pb.x, pb.y, 1040));
    assert_eq!(engine.store().selection(), &HashSet::from([a, b]));

    // drag an already-selected node: the whole selection follows
    engine.handle_input(&InputEvent::pointer_down(pb.x, pb.y, 2000));
    engine.handle_input(&InputEvent::pointer_move(pb.x + 30.0, pb.y));
    engine.handle_input(&InputEvent::pointer_move(pb.x + 50.0, pb.y - 10.0));
    engine.handle_input(&InputEvent::pointer_up(pb.x + 50.0, pb.y - 10.0, 2100));

    let offset = Vector::new(50.0, -10.0);
    assert_eq!(engine.store().node(a).unwrap().position, before_a + offset);
    assert_eq!(engine.store().node(b).unwrap().position, before_b + offset);
}

#[test]
fn dragging_unselected_node_drags_only_that_node() {
    init_logger();
    let mut engine = engine_with_sample();
    let ids: Vec<NodeId> = engine.store().nodes().iter().map(|n| n.id).collect();
    engine.select_node(ids[0], true);
    engine.select_node(ids[1], false);
    let core_before = engine.store().node(ids[0]).unwrap().position;

    let p = screen_of(&engine, ids[2]);
    engine.handle_input(&InputEvent::pointer_down(p.x, p.y, 0));
    engine.handle_input(&InputEvent::pointer_move(p.x, p.y + 25.0));
    engine.handle_input(&InputEvent::pointer_up(p.x, p.y + 25.0, 60));

    assert_eq!(engine.store().selection(), &HashSet::from([ids[2]]));
    assert_eq!(engine.store().node(ids[0]).unwrap().position, core_before);
    assert_eq!(
        engine.store().node(ids[2]).unwrap().position,
        Point::new(600.0, 425.0)
    );
}

#[test]
fn pan_then_tap_hits_through_transform() {
    init_logger();
    let mut engine = CanvasEngine::default();
    let id = engine.add_node("target", Point::new(200.0, 0.0));
    engine.set_zoom(2.0);

    // pan left by 100 screen px on empty canvas
    engine.handle_input(&InputEvent::pointer_down(50.0, 50.0, 0));
    engine.handle_input(&InputEvent::pointer_move(0.0, 50.0));
    engine.handle_input(&InputEvent::pointer_move(-50.0, 50.0));
    engine.handle_input(&InputEvent::pointer_up(-50.0, 50.0, 30));
    assert_eq!(engine.viewport().pan_offset(), Vector::new(-50.0, 0.0));

    // logical (200, 0) → 200*2 - 50 + 400 = 750
    let p = engine.to_screen(Point::new(200.0, 0.0));
    assert_eq!(p, Point::new(750.0, 300.0));
    assert_eq!(engine.hit_test(p), Some(id));

    engine.handle_input(&InputEvent::pointer_down(p.x, p.y, 500));
    engine.handle_input(&InputEvent::pointer_up(p.x, p.y, 520));
    assert!(engine.store().is_selected(id));
}

#[test]
fn fixed_reference_pan_through_engine_api() {
    let mut engine = CanvasEngine::default();
    engine.set_zoom(2.0);
    engine.begin_pan();
    let start = engine.viewport().drag_start_offset();

    engine.update_pan(Vector::new(30.0, 0.0));
    assert_eq!(engine.viewport().pan_offset(), start + Vector::new(15.0, 0.0));
    engine.update_pan(Vector::new(60.0, 0.0));
    assert_eq!(engine.viewport().pan_offset(), start + Vector::new(30.0, 0.0));
    engine.end_pan();
    assert!(!engine.viewport().is_dragging());
}

#[test]
fn zoom_is_clamped_through_every_path() {
    let mut engine = CanvasEngine::default();
    engine.set_zoom(10.0);
    assert_eq!(engine.viewport().zoom(), 3.0);
    engine.set_zoom(-5.0);
    assert_eq!(engine.viewport().zoom(), 0.1);

    engine.handle_input(&InputEvent::Pinch { scale: 100.0 });
    assert_eq!(engine.viewport().zoom(), 3.0);
    engine.handle_input(&InputEvent::PinchEnd);
    engine.handle_input(&InputEvent::Pinch { scale: 0.0001 });
    assert_eq!(engine.viewport().zoom(), 0.1);
}

#[test]
fn pinch_is_relative_to_gesture_start() {
    let mut engine = CanvasEngine::default();
    engine.set_zoom(2.0);
    engine.handle_input(&InputEvent::Pinch { scale: 1.2 });
    engine.handle_input(&InputEvent::Pinch { scale: 1.4 });
    assert!((engine.viewport().zoom() - 2.8).abs() < 1e-9);
    engine.handle_input(&InputEvent::PinchEnd);

    // the next pinch starts from 2.8, not from 1.0
    engine.handle_input(&InputEvent::Pinch { scale: 1.0 });
    assert!((engine.viewport().zoom() - 2.8).abs() < 1e-9);
}

#[test]
fn listeners_see_one_notification_per_aspect_per_event() {
    init_logger();
    let mut engine = engine_with_sample();
    let ids: Vec<NodeId> = engine.store().nodes().iter().map(|n| n.id).collect();
    let seen = record(&mut engine);

    // first drag frame selects and moves in one batch
    let p = screen_of(&engine, ids[0]);
    engine.handle_input(&InputEvent::pointer_down(p.x, p.y, 0));
    engine.handle_input(&InputEvent::pointer_move(p.x + 10.0, p.y));
    assert_eq!(
        *seen.borrow(),
        vec![CanvasChange::Selection, CanvasChange::Nodes]
    );

    seen.borrow_mut().clear();
    engine.handle_input(&InputEvent::pointer_up(p.x + 10.0, p.y, 20));
    assert!(seen.borrow().is_empty());
}

#[test]
fn listener_observes_consistent_state() {
    let mut engine = engine_with_sample();
    engine.select_all();

    let counts = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&counts);
    engine.subscribe(move |change| sink.borrow_mut().push(*change));

    engine.delete_selected();
    assert!(engine.store().is_empty());
    assert!(engine.store().connections().is_empty());
    assert!(engine.store().selection().is_empty());
    let seen: HashSet<CanvasChange> = counts.borrow().iter().copied().collect();
    assert_eq!(
        seen,
        HashSet::from([
            CanvasChange::Nodes,
            CanvasChange::Selection,
            CanvasChange::Connections
        ])
    );
    assert_eq!(counts.borrow().len(), 3);
}

#[test]
fn edit_flow_with_keyboard() {
    init_logger();
    let mut engine = engine_with_sample();
    let core = engine.store().nodes()[0].id;
    engine.select_node(core, true);

    engine.handle_input(&InputEvent::key("Enter", Modifiers::NONE));
    assert_eq!(engine.gesture_state(), GestureState::Editing(core));

    // keys go to the text field, not to shortcuts
    engine.handle_input(&InputEvent::key("Backspace", Modifiers::NONE));
    assert_eq!(engine.store().nodes().len(), 3);

    engine.handle_input(&InputEvent::CommitText {
        text: "Mission".into(),
    });
    assert_eq!(engine.store().node(core).unwrap().text, "Mission");
    assert_eq!(engine.gesture_state(), GestureState::Idle);

    engine.handle_input(&InputEvent::key("Enter", Modifiers::NONE));
    engine.handle_input(&InputEvent::CancelEdit);
    assert_eq!(engine.store().node(core).unwrap().text, "Mission");
}

#[test]
fn duplicate_and_connect_shortcuts() {
    let mut engine = engine_with_sample();
    let core = engine.store().nodes()[0].id;
    engine.select_node(core, true);

    engine.handle_input(&InputEvent::key("d", Modifiers::CMD));
    assert_eq!(engine.store().nodes().len(), 4);
    let copy = engine.store().nodes()[3].id;
    assert_eq!(engine.store().selection(), &HashSet::from([copy]));
    assert_eq!(engine.store().node(copy).unwrap().text, "Core Idea");

    engine.select_node(core, false);
    engine.handle_input(&InputEvent::key("l", Modifiers::CMD));
    // chain in z-order: core → copy
    assert!(engine.store().has_connection(core, copy));
    assert_eq!(engine.store().connections().len(), 3);

    engine.handle_input(&InputEvent::key("l", Modifiers::CMD));
    assert_eq!(engine.store().connections().len(), 3);
}

#[test]
fn document_replacement_resets_interaction() {
    init_logger();
    let source = engine_with_sample();
    let json = source.save_json().unwrap();

    let mut engine = CanvasEngine::default();
    engine.add_node("scratch", Point::ZERO);
    engine.handle_input(&InputEvent::pointer_down(10.0, 10.0, 0));
    engine.handle_input(&InputEvent::pointer_move(60.0, 10.0));
    assert_eq!(engine.gesture_state(), GestureState::PanningCanvas);

    engine.load_json(&json).unwrap();
    assert_eq!(engine.gesture_state(), GestureState::Idle);
    assert!(!engine.viewport().is_dragging());
    assert_eq!(engine.store().nodes(), source.store().nodes());
    assert!(engine.store().selection().is_empty());
}

#[test]
fn rejected_document_leaves_everything_untouched() {
    init_logger();
    let mut engine = engine_with_sample();
    engine.select_all();
    let before = engine.save_json().unwrap();
    let seen = record(&mut engine);

    let mut doc: serde_json::Value = serde_json::from_str(&before).unwrap();
    doc["nodes"][1]["id"] = doc["nodes"][0]["id"].clone();
    let err = engine.load_json(&doc.to_string()).unwrap_err();
    assert!(err.to_string().contains("duplicate"), "{err}");

    assert_eq!(engine.save_json().unwrap(), before);
    assert_eq!(engine.store().selection().len(), 3);
    assert!(seen.borrow().is_empty());
}

#[test]
fn config_drives_editor_defaults() {
    let config = EditorConfig::from_json(r#"{ "zoomMax": 5.0, "newNodeText": "Idea" }"#).unwrap();
    let mut engine = CanvasEngine::new(config);
    engine.set_zoom(4.0);
    assert_eq!(engine.viewport().zoom(), 4.0);

    engine.handle_input(&InputEvent::key(" ", Modifiers::NONE));
    assert_eq!(engine.store().nodes()[0].text, "Idea");
}
