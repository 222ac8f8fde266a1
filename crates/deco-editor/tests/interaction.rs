//! Integration tests: pointer interaction state machine (deco-editor).
//!
//! Drives `InteractionController` with raw input events and checks the
//! scene, the used-file registry, and what reached the persistence sink.

use deco_core::DecoConfig;
use deco_core::model::{CharacterEntity, EntityRef, ShapeEntity, ShapeKind};
use deco_editor::input::{InputEvent, Modifiers};
use deco_editor::tools::Tool;
use deco_editor::{
    CursorHint, InteractionController, InteractionMode, InteractionState, Notice, RecordingSink,
};
use deco_render::EstimatedMeasure;
use pretty_assertions::assert_eq;

fn controller(config: &DecoConfig) -> InteractionController<RecordingSink> {
    InteractionController::new(
        config,
        RecordingSink::default(),
        Box::new(EstimatedMeasure::default()),
    )
}

fn glyph(id: u32, x: f64, y: f64) -> CharacterEntity {
    CharacterEntity {
        id,
        glyph: "★".into(),
        x,
        y,
        size: 40.0,
        color: "#f1c40f".into(),
        metadata: None,
    }
}

fn square(id: u32, x: f64, y: f64, w: f64, h: f64) -> ShapeEntity {
    ShapeEntity {
        id,
        kind: ShapeKind::Square,
        x,
        y,
        width: w,
        height: h,
        color: "#3498db".into(),
    }
}

fn down(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerDown { x, y }
}

fn mv(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove { x, y }
}

fn click(x: f64, y: f64) -> InputEvent {
    InputEvent::Click { x, y }
}

fn drop_file(path: &str, x: f64, y: f64) -> InputEvent {
    let name = path.rsplit('/').next().unwrap_or(path);
    InputEvent::Drop {
        x,
        y,
        payload: format!(r#"{{"path":"{path}","name":"{name}","type":"file"}}"#),
    }
}

fn files_on_canvas(c: &InteractionController<RecordingSink>, path: &str) -> usize {
    c.scene()
        .characters()
        .iter()
        .filter(|ch| ch.file_path() == Some(path))
        .count()
}

// ─── Drag / resize ──────────────────────────────────────────────────────

#[test]
fn resize_handle_wins_over_shape_body() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![square(1, 0.0, 0.0, 100.0, 100.0)]);

    // Inside the square and within reach of its bottom-right handle.
    assert!(c.handle(&down(95.0, 95.0)));
    assert_eq!(c.state(), InteractionState::Resizing { shape: 1 });
    assert_eq!(c.cursor(), CursorHint::Resize);
}

#[test]
fn drag_clamps_shape_to_canvas() {
    let config = DecoConfig {
        canvas_width: 100.0,
        canvas_height: 100.0,
        ..DecoConfig::default()
    };
    let mut c = controller(&config);
    c.load(vec![], vec![square(1, 0.0, 0.0, 80.0, 80.0)]);

    c.handle(&down(10.0, 10.0));
    assert!(matches!(c.state(), InteractionState::Dragging { .. }));
    c.handle(&mv(510.0, 10.0));
    c.handle(&InputEvent::PointerUp);

    let s = c.scene().shape(1).unwrap();
    assert_eq!((s.x, s.y), (20.0, 0.0));
    assert_eq!(c.state(), InteractionState::Idle);
    assert_eq!(c.sink().shape_saves.len(), 1);
    assert_eq!(c.sink().shape_saves[0].0[0].x, 20.0);
}

#[test]
fn drag_keeps_character_center_inside() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0)], vec![]);

    c.handle(&down(100.0, 100.0));
    c.handle(&mv(-300.0, 9000.0));
    let ch = c.scene().character(1).unwrap();
    assert_eq!((ch.x, ch.y), (20.0, 580.0));
}

#[test]
fn moves_do_not_persist_until_release() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0)], vec![]);

    c.handle(&down(100.0, 100.0));
    for i in 0..10 {
        c.handle(&mv(100.0 + i as f64, 100.0));
    }
    assert_eq!(c.sink().save_count(), 0);
    c.handle(&InputEvent::PointerUp);
    assert_eq!(c.sink().save_count(), 1);
    assert!(!c.sink().character_saves[0].1, "drag release autosaves silently");
}

#[test]
fn resize_floors_at_minimum() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![square(1, 100.0, 100.0, 60.0, 60.0)]);

    c.handle(&down(160.0, 160.0));
    c.handle(&mv(105.0, 300.0));
    let s = c.scene().shape(1).unwrap();
    assert_eq!((s.width, s.height), (20.0, 200.0));
}

#[test]
fn pointer_leave_commits_like_release() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0)], vec![]);

    c.handle(&down(100.0, 100.0));
    c.handle(&mv(150.0, 150.0));
    assert!(c.handle(&InputEvent::PointerLeave));
    assert_eq!(c.state(), InteractionState::Idle);
    assert_eq!(c.sink().character_saves.len(), 1);
}

#[test]
fn picking_up_brings_entity_to_front() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0), glyph(2, 300.0, 300.0)], vec![]);

    c.handle(&down(100.0, 100.0));
    let order: Vec<u32> = c.scene().characters().iter().map(|ch| ch.id).collect();
    assert_eq!(order, vec![2, 1]);
}

#[test]
fn escape_force_releases_at_last_position() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0)], vec![]);

    c.handle(&down(100.0, 100.0));
    c.handle(&mv(50.0, 50.0));
    assert!(c.handle(&InputEvent::key("Escape")));

    let ch = c.scene().character(1).unwrap();
    assert_eq!((ch.x, ch.y), (50.0, 50.0));
    assert_eq!(c.sink().save_count(), 1);
    assert_eq!(c.state(), InteractionState::Idle);

    // Nothing left in flight.
    assert!(!c.handle(&InputEvent::key("Escape")));
    assert_eq!(c.sink().save_count(), 1);
}

#[test]
fn empty_space_stays_idle() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0)], vec![]);
    assert!(!c.handle(&down(700.0, 500.0)));
    assert_eq!(c.state(), InteractionState::Idle);
}

// ─── Placing from the palette ───────────────────────────────────────────

#[test]
fn palette_glyph_places_and_autosaves() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0), glyph(3, 200.0, 100.0)], vec![]);
    c.select_tool(Tool::Glyph("♥".into()));

    assert!(c.handle(&down(400.0, 300.0)));
    assert_eq!(c.state(), InteractionState::Idle);
    let placed = c.scene().characters().last().unwrap();
    assert_eq!(placed.id, 4);
    assert_eq!(placed.glyph, "♥");
    assert_eq!((placed.x, placed.y), (400.0, 300.0));
    assert_eq!(c.sink().character_saves.len(), 1);
}

#[test]
fn shape_shortcut_then_place_centers_shape() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![]);
    c.handle(&InputEvent::key("c"));
    assert_eq!(c.cursor(), CursorHint::Place);

    c.handle(&down(400.0, 300.0));
    let s = c.scene().shapes().last().unwrap();
    assert_eq!(s.kind, ShapeKind::Circle);
    assert_eq!(s.id, 1);
    assert_eq!((s.x, s.y), (370.0, 270.0));
    assert_eq!(c.sink().shape_saves.len(), 1);
}

// ─── Carry mode ─────────────────────────────────────────────────────────

#[test]
fn carry_pick_up_then_drop() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0)], vec![]);
    c.set_mode(InteractionMode::Carry);

    // Pointer-down does nothing in carry mode.
    assert!(!c.handle(&down(100.0, 100.0)));

    assert!(c.handle(&click(100.0, 100.0)));
    assert_eq!(
        c.state(),
        InteractionState::Carrying {
            target: EntityRef::Character(1)
        }
    );

    c.handle(&mv(250.0, 260.0));
    assert_eq!(c.scene().character(1).unwrap().x, 250.0);
    assert_eq!(c.sink().save_count(), 0);

    assert!(c.handle(&click(300.0, 310.0)));
    let ch = c.scene().character(1).unwrap();
    assert_eq!((ch.x, ch.y), (300.0, 310.0));
    assert_eq!(c.state(), InteractionState::Idle);
    assert_eq!(c.sink().character_saves.len(), 1);
}

#[test]
fn escape_releases_carried_entity() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![square(1, 100.0, 100.0, 40.0, 40.0)]);
    c.set_mode(InteractionMode::Carry);

    c.handle(&click(110.0, 110.0));
    c.handle(&mv(400.0, 400.0));
    assert!(c.handle(&InputEvent::key("Escape")));
    let s = c.scene().shape(1).unwrap();
    assert_eq!((s.x, s.y), (400.0, 400.0));
    assert_eq!(c.sink().shape_saves.len(), 1);
}

// ─── Drops from the explorer ────────────────────────────────────────────

#[test]
fn duplicate_drop_flashes_instead_of_adding() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![]);

    assert!(c.handle(&drop_file("/a.txt", 200.0, 200.0)));
    assert!(!c.handle(&drop_file("/a.txt", 300.0, 300.0)));

    assert_eq!(files_on_canvas(&c, "/a.txt"), 1);
    assert_eq!(c.registry().len(), 1);
    let id = c.scene().character_for_path("/a.txt").unwrap();
    assert_eq!(
        c.sink().notices,
        vec![Notice::MarkUsed("/a.txt".into()), Notice::Flash(id)]
    );
    assert_eq!(c.sink().character_saves.len(), 1);
}

#[test]
fn dropped_file_gets_file_glyph() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![]);
    c.handle(&InputEvent::Drop {
        x: 10.0,
        y: 10.0,
        payload: r#"{"path":"/src","name":"src","type":"folder"}"#.into(),
    });
    let ch = &c.scene().characters()[0];
    assert_eq!(ch.glyph, "📁");
    // Clamped so the glyph stays on the canvas.
    assert_eq!((ch.x, ch.y), (20.0, 20.0));
}

#[test]
fn orphaned_registry_entry_is_repaired_on_drop() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![]);
    c.registry_mut().insert("/ghost.txt");

    assert!(c.handle(&drop_file("/ghost.txt", 200.0, 200.0)));
    assert_eq!(files_on_canvas(&c, "/ghost.txt"), 1);
    assert_eq!(c.registry().len(), 1);
    assert_eq!(c.sink().notices, vec![Notice::MarkUsed("/ghost.txt".into())]);
}

#[test]
fn malformed_drop_is_ignored() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![]);
    let event = InputEvent::Drop {
        x: 0.0,
        y: 0.0,
        payload: "text/plain: hello".into(),
    };
    assert!(!c.handle(&event));
    assert!(c.scene().characters().is_empty());
    assert!(c.sink().notices.is_empty());
    assert_eq!(c.sink().save_count(), 0);
}

// ─── Delete mode ────────────────────────────────────────────────────────

#[test]
fn delete_releases_registry_entry() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![]);
    c.handle(&drop_file("/a.txt", 200.0, 200.0));
    assert_eq!(c.registry().len(), 1);

    assert!(c.toggle_delete_mode());
    assert_eq!(c.cursor(), CursorHint::Delete);
    assert!(c.handle(&click(200.0, 200.0)));

    assert!(c.scene().characters().is_empty());
    assert!(!c.registry().contains("/a.txt"));
    assert_eq!(
        c.sink().notices.last(),
        Some(&Notice::MarkAvailable("/a.txt".into()))
    );

    // The path can be placed again.
    c.toggle_delete_mode();
    assert!(c.handle(&drop_file("/a.txt", 200.0, 200.0)));
    assert_eq!(files_on_canvas(&c, "/a.txt"), 1);
}

#[test]
fn delete_removes_one_entity_per_click_shapes_first() {
    let mut c = controller(&DecoConfig::default());
    c.load(
        vec![glyph(1, 120.0, 120.0)],
        vec![square(1, 100.0, 100.0, 50.0, 50.0), square(2, 100.0, 100.0, 50.0, 50.0)],
    );
    c.handle(&InputEvent::key("Delete"));

    c.handle(&click(120.0, 120.0));
    assert_eq!(c.scene().shapes().len(), 1);
    assert_eq!(c.scene().shapes()[0].id, 1);
    assert_eq!(c.scene().characters().len(), 1);

    c.handle(&click(120.0, 120.0));
    c.handle(&click(120.0, 120.0));
    assert!(c.scene().shapes().is_empty());
    assert!(c.scene().characters().is_empty());

    assert!(!c.handle(&click(120.0, 120.0)));
    assert_eq!(c.sink().shape_saves.len(), 2);
    assert_eq!(c.sink().character_saves.len(), 1);
}

#[test]
fn pointer_down_is_inert_while_delete_armed() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0)], vec![]);
    c.toggle_delete_mode();
    assert!(!c.handle(&down(100.0, 100.0)));
    assert_eq!(c.state(), InteractionState::Idle);
}

// ─── Save / reset / hover ───────────────────────────────────────────────

#[test]
fn explicit_save_notifies() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0)], vec![]);
    c.handle(&InputEvent::Key {
        key: "s".into(),
        modifiers: Modifiers {
            meta: true,
            ..Modifiers::NONE
        },
    });
    assert_eq!(c.sink().character_saves.len(), 1);
    assert_eq!(c.sink().shape_saves.len(), 1);
    assert!(c.sink().character_saves[0].1);
}

#[test]
fn reset_characters_frees_dropped_files() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![]);
    c.handle(&drop_file("/a.txt", 200.0, 200.0));

    let fresh = c.reset_characters().to_vec();
    assert_eq!(fresh, deco_core::catalog::default_characters());
    assert!(c.registry().is_empty());
    assert_eq!(
        c.sink().notices.last(),
        Some(&Notice::MarkAvailable("/a.txt".into()))
    );
    let (saved, notify) = c.sink().character_saves.last().unwrap();
    assert_eq!(saved, &fresh);
    assert!(*notify);
}

#[test]
fn hover_updates_cursor_only() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![glyph(1, 100.0, 100.0)], vec![square(1, 300.0, 300.0, 50.0, 50.0)]);

    assert!(c.handle(&mv(100.0, 100.0)));
    assert_eq!(c.cursor(), CursorHint::Move);
    assert!(!c.handle(&mv(101.0, 100.0)));
    c.handle(&mv(350.0, 350.0));
    assert_eq!(c.cursor(), CursorHint::Resize);
    c.handle(&mv(700.0, 50.0));
    assert_eq!(c.cursor(), CursorHint::Default);
    assert_eq!(c.sink().save_count(), 0);
}

#[test]
fn restore_registry_announces_orphans() {
    let mut c = controller(&DecoConfig::default());
    c.load(vec![], vec![]);
    c.handle(&drop_file("/kept.txt", 100.0, 100.0));
    c.sink_mut().notices.clear();

    c.restore_registry(["/kept.txt".to_string(), "/gone.txt".to_string()]);
    assert_eq!(c.registry().paths().collect::<Vec<_>>(), vec!["/kept.txt"]);
    assert_eq!(c.sink().notices, vec![Notice::MarkAvailable("/gone.txt".into())]);
}
