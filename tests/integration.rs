//! Integration tests for the Memoria constructor.
//!
//! These tests drive a full session the way the editor does and verify:
//! - New blocks land where their type and template say they should
//! - Drags, resizes and deletions leave the page overlap-free
//! - Pinned blocks hold their position through every operation
//! - Pages survive a save/load cycle through both stores

use memoria::layout::{self, resize, resolve_conflicts, Resolution, ResizeOutcome, MAX_RESOLVE_ITERATIONS};
use memoria::model::*;
use memoria::store::{self, FileStore, KeyValueStore, MemoryStore};
use memoria::{page_from_json, DragOutcome, Session, SessionError, StoreError};

// ─── Helpers ────────────────────────────────────────────────────

fn block(id: &str, row: u32, column: u32, width: u32, height: u32) -> Block {
    Block::new(id, BlockType::Photo, "rounded-square", Position::new(row, column), Size::new(width, height))
}

fn session_with(blocks: Vec<Block>) -> Session {
    Session::with_page(
        Page {
            blocks,
            ..Page::default()
        },
        None,
    )
}

fn position_of(session: &Session, id: &str) -> Position {
    session.block(&id.into()).map(|b| b.position).unwrap()
}

fn assert_valid(blocks: &[Block]) {
    let violations = layout::validate(blocks);
    assert!(violations.is_empty(), "layout violations: {violations:?}");
}

// ─── Creation ───────────────────────────────────────────────────

#[test]
fn test_gallery_on_empty_canvas() {
    let mut session = Session::new(None);
    let id = session.add_block(BlockType::Photo, "gallery").unwrap();
    let block = session.block(&id).unwrap();
    assert_eq!(block.position, Position::new(0, 0));
    assert_eq!(block.size, Size::new(12, 8));
}

#[test]
fn test_profile_square_is_centered() {
    let mut session = Session::new(None);
    let id = session.add_block(BlockType::Profile, "square").unwrap();
    assert_eq!(session.block(&id).unwrap().position, Position::new(0, 4));
}

#[test]
fn test_blocks_stack_downward() {
    let mut session = Session::new(None);
    let banner = session.add_block(BlockType::Photo, "banner").unwrap();
    let profile = session.add_block(BlockType::Profile, "square").unwrap();
    let video = session.add_block(BlockType::Video, "rounded-square").unwrap();

    assert_eq!(session.block(&banner).unwrap().position, Position::new(0, 0));
    assert_eq!(session.block(&profile).unwrap().position, Position::new(6, 4));
    // Right-aligned 3-wide video sits beside the centred profile.
    assert_eq!(session.block(&video).unwrap().position, Position::new(6, 9));
    assert_valid(session.blocks());
}

#[test]
fn test_every_catalog_template_places_cleanly() {
    let mut session = Session::new(None);
    for kind in BlockType::ALL {
        for template in catalog::templates(kind) {
            session.add_block(kind, template).unwrap();
            session.apply_settings().unwrap();
        }
    }
    assert_valid(session.blocks());
    for block in session.blocks() {
        assert!(block.right() <= GRID_COLUMNS);
        if block.is_full_width() {
            assert_eq!(block.position.column, 0, "{} not at column 0", block.id);
        }
    }
}

// ─── Drag ───────────────────────────────────────────────────────

#[test]
fn test_drag_collision_keeps_column() {
    let mut session = session_with(vec![block("a", 0, 0, 4, 4), block("b", 10, 0, 4, 4)]);
    session.drag_stop(&"b".into(), 2, 0).unwrap();
    assert_eq!(position_of(&session, "b"), Position::new(4, 0));
    assert_valid(session.blocks());
}

#[test]
fn test_drag_full_width_snaps_to_column_zero() {
    let mut tree = block("tree", 0, 0, 12, 4);
    tree.kind = BlockType::FamilyTree;
    let mut session = session_with(vec![tree, block("a", 4, 0, 4, 4)]);

    let outcome = session.drag_stop(&"tree".into(), 6, 5).unwrap();
    assert_eq!(
        outcome,
        DragOutcome::Moved {
            resolution: Resolution::Relocated {
                from: Position::new(6, 0),
                to: Position::new(8, 0),
                iterations: 1,
            }
        }
    );
    assert_valid(session.blocks());
}

#[test]
fn test_drag_around_pinned_block() {
    let mut session = session_with(vec![block("pin", 4, 0, 6, 4).pinned(), block("a", 0, 0, 4, 4)]);
    session.drag_stop(&"a".into(), 5, 2).unwrap();
    assert_eq!(position_of(&session, "pin"), Position::new(4, 0));
    assert_eq!(position_of(&session, "a"), Position::new(8, 2));
}

#[test]
fn test_far_pixel_drop_then_add_keeps_page_valid() {
    let mut session = Session::new(None);
    let a = session.add_block(BlockType::Photo, "rounded-square").unwrap();
    session.apply_settings().unwrap();

    session.drag_stop_pixels(&a, 0.0, 1e12).unwrap();
    let dropped = session.block(&a).unwrap();
    assert!(dropped.bottom() <= layout::SEARCH_DISTANCE);

    session.add_block(BlockType::Text, "circle").unwrap();
    session.apply_settings().unwrap();
    assert_valid(session.blocks());
}

// ─── Resize ─────────────────────────────────────────────────────

#[test]
fn test_resize_pushes_neighbour_right() {
    let mut session = session_with(vec![block("a", 0, 0, 2, 2), block("b", 0, 2, 2, 2)]);
    let outcome = session.resize_block(&"a".into(), 2, 0).unwrap();
    assert!(matches!(outcome, ResizeOutcome::Resized { .. }));
    assert!(position_of(&session, "b").column >= 4);
    assert_valid(session.blocks());
}

#[test]
fn test_resize_into_pinned_block_is_refused() {
    let blocks = vec![block("a", 0, 0, 2, 2), block("pin", 0, 2, 2, 2).pinned()];
    let out = resize(&blocks, &"a".into(), 2, 0, MAX_RESOLVE_ITERATIONS);
    assert_eq!(out.outcome, ResizeOutcome::Blocked { by: "pin".into() });
    assert_eq!(out.blocks, blocks);
}

#[test]
fn test_circle_resize_stays_square() {
    let mut circle = block("c", 0, 0, 3, 3);
    circle.template = CIRCLE_TEMPLATE.to_string();
    let mut session = session_with(vec![circle]);
    session.resize_block(&"c".into(), 0, 2).unwrap();
    assert_eq!(session.block(&"c".into()).unwrap().size, Size::new(5, 5));
}

#[test]
fn test_unbounded_height_delta_stops_near_page_bottom() {
    let mut session = session_with(vec![block("a", 0, 0, 4, 4), block("b", 0, 4, 4, 10)]);
    session.resize_block(&"a".into(), 0, i32::MAX).unwrap();
    let a = session.block(&"a".into()).unwrap();
    assert_eq!(a.size.height, 10 + layout::SEARCH_DISTANCE);
    assert_valid(session.blocks());
}

// ─── Delete ─────────────────────────────────────────────────────

#[test]
fn test_delete_compacts_column_stack() {
    let mut session = session_with(vec![
        block("a", 0, 0, 4, 3),
        block("b", 3, 0, 4, 2),
        block("c", 5, 0, 4, 2),
        block("other", 3, 6, 6, 2),
    ]);
    session.delete_block(&"a".into()).unwrap();
    assert_eq!(position_of(&session, "b"), Position::new(0, 0));
    assert_eq!(position_of(&session, "c"), Position::new(2, 0));
    assert_eq!(position_of(&session, "other"), Position::new(3, 6));
}

#[test]
fn test_delete_leaves_pinned_blocks_alone() {
    let mut session = session_with(vec![block("a", 0, 0, 4, 3), block("pin", 3, 0, 4, 2).pinned()]);
    session.delete_block(&"a".into()).unwrap();
    assert_eq!(position_of(&session, "pin"), Position::new(3, 0));
}

// ─── Resolver ───────────────────────────────────────────────────

#[test]
fn test_resolver_is_idempotent_on_clean_layout() {
    let blocks = vec![block("a", 0, 0, 4, 4), block("b", 0, 4, 4, 4), block("c", 4, 0, 12, 2)];
    for b in &blocks {
        let out = resolve_conflicts(&blocks, &b.id, MAX_RESOLVE_ITERATIONS);
        assert_eq!(out.resolution, Resolution::Clear);
        assert_eq!(out.blocks, blocks);
    }
}

// ─── Sessions and storage ───────────────────────────────────────

#[test]
fn test_settings_cancel_after_resize_restores_layout() {
    let mut session = session_with(vec![block("a", 0, 0, 4, 4), block("b", 4, 0, 4, 4)]);
    let before = session.blocks().to_vec();
    session.open_settings(&"a".into()).unwrap();
    session.resize_block(&"a".into(), 0, 3).unwrap();
    assert_ne!(session.blocks(), &before[..]);
    session.cancel_settings().unwrap();
    assert_eq!(session.blocks(), &before[..]);
}

#[test]
fn test_preview_mode_rejects_layout_changes() {
    let mut session = session_with(vec![block("a", 0, 0, 4, 4)]);
    session.toggle_preview();
    assert!(matches!(session.toggle_fixed(&"a".into()), Err(SessionError::PreviewMode)));
    assert!(matches!(session.set_show_on_map(false), Err(SessionError::PreviewMode)));
}

#[test]
fn test_save_and_reload_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());

    let mut session = Session::new(Some("42".to_string()));
    session.add_block(BlockType::Profile, "square").unwrap();
    session.apply_settings().unwrap();
    session.add_block(BlockType::Text, "semicircle").unwrap();
    session.apply_settings().unwrap();
    session.set_background_color("#F5F5DC").unwrap();
    session.set_show_on_map(false).unwrap();
    session.save(&mut store).unwrap();

    assert!(dir.path().join("pageMemoryData_42.json").exists());

    let reloaded = Session::load(&store, Some("42".to_string())).unwrap();
    assert_eq!(reloaded.blocks(), session.blocks());
    assert_eq!(reloaded.page().background_color, "#F5F5DC");
    assert!(!reloaded.page().show_on_map);

    let anonymous = Session::load(&store, None).unwrap();
    assert!(anonymous.blocks().is_empty());
}

#[test]
fn test_load_reads_camel_case_blob() {
    let mut store = MemoryStore::new();
    let json = r##"{
        "blocks": [{
            "id": "block-1",
            "type": "familyTree",
            "template": "standard",
            "content": { "familyMembers": [] },
            "position": { "row": 0, "column": 0 },
            "size": { "width": 12, "height": 4 },
            "style": {
                "backgroundColor": "#ffffff",
                "color": "#000000",
                "borderColor": "#e0e0e0",
                "borderRadius": "8px",
                "borderWidth": "1px",
                "shadowIntensity": "light",
                "opacity": 1.0
            },
            "isFixed": true
        }],
        "backgroundColor": "#FFFFFF",
        "showOnMap": true,
        "timestamp": "2024-05-01T12:00:00Z"
    }"##;
    store.set(&store::storage_key(None), json).unwrap();

    let session = Session::load(&store, None).unwrap();
    let block = &session.blocks()[0];
    assert_eq!(block.kind, BlockType::FamilyTree);
    assert!(block.is_fixed);
    assert!(block.is_full_width());
}

#[test]
fn test_saving_resolves_blocks_under_a_pinned_block() {
    let mut store = MemoryStore::new();
    let stored = Page {
        blocks: vec![block("b", 0, 0, 4, 4), block("p", 2, 2, 4, 4).pinned()],
        ..Page::default()
    };
    store::save_page(&mut store, None, &stored).unwrap();

    let mut session = Session::load(&store, None).unwrap();
    assert!(!layout::validate(session.blocks()).is_empty());
    session.save(&mut store).unwrap();

    let reloaded = Session::load(&store, None).unwrap();
    assert_valid(reloaded.blocks());
    assert_eq!(position_of(&reloaded, "p"), Position::new(2, 2));
    assert_eq!(position_of(&reloaded, "b"), Position::new(6, 0));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_page_from_json_reads_export() {
    let mut session = Session::new(None);
    session.add_block(BlockType::Profile, "square").unwrap();
    session.apply_settings().unwrap();
    let mut store = MemoryStore::new();
    let saved = session.save(&mut store).unwrap();

    let exported = serde_json::to_string(&saved).unwrap();
    let parsed = page_from_json(&exported).unwrap();
    assert_eq!(parsed.into_page().blocks, session.blocks());
}

#[test]
fn test_page_from_json_rejects_bad_input() {
    assert!(matches!(page_from_json("{ \"blocks\": "), Err(StoreError::Parse { .. })));

    let far = r##"{
        "blocks": [{
            "id": "far",
            "type": "text",
            "template": "circle",
            "position": { "row": 4294967295, "column": 0 },
            "size": { "width": 4, "height": 4 }
        }],
        "backgroundColor": "#FFFFFF",
        "showOnMap": true,
        "timestamp": "2024-05-01T12:00:00Z"
    }"##;
    assert!(matches!(page_from_json(far), Err(StoreError::OutOfGrid { .. })));
}
