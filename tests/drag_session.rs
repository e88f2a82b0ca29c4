//! End-to-end drag sessions through the public API: catalog drags, pointer
//! gestures, re-placement, observers and gesture-file replay.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use roomplan::config::RoomConfig;
use roomplan::event::{read_events, replay, RoomEvent};
use roomplan::geometry::Point;
use roomplan::grid::{CellId, ImageSize, Surface};
use roomplan::placement::{DragConstraints, EndReason, Rejection, SessionPhase};
use roomplan::state::{PlacementStore, StoreEvent};

fn cell(id: &str) -> CellId {
    id.parse().unwrap()
}

fn furnished_store() -> PlacementStore {
    let config = RoomConfig::default();
    let mut store = PlacementStore::new(config.layout());
    store.set_catalog(config.catalog);
    store.set_image_size(ImageSize::new(1200.0, 900.0));
    store
}

fn center(store: &PlacementStore, id: &str) -> Point {
    store.grid().unwrap().cell(&cell(id)).unwrap().center
}

fn record(store: &mut PlacementStore) -> Rc<RefCell<Vec<StoreEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    store.subscribe(move |event: &StoreEvent, _: &PlacementStore| {
        sink.borrow_mut().push(event.clone());
    });
    log
}

#[test]
fn pointer_gesture_places_item() {
    let mut store = furnished_store();
    assert!(store.start_drag_from_catalog("armchair"));
    assert_eq!(store.ghost().unwrap().anchor_cell_id, cell("floor-1-1"));

    let start = center(&store, "floor-5-5");
    assert!(store.pointer_down(1, start));
    assert!(store.is_pointer_dragging());

    // A second finger does not steal the drag
    let stray = center(&store, "floor-2-9");
    assert!(!store.pointer_move(2, stray));

    let target = center(&store, "floor-6-7");
    assert!(store.pointer_move(1, target));
    assert!(store.pointer_up(1));
    assert!(!store.is_pointer_dragging());

    let ghost = store.ghost().unwrap();
    assert_eq!(ghost.anchor_cell_id, cell("floor-6-7"));
    assert!(ghost.is_valid);

    assert!(store.stage_placement());
    assert_eq!(store.phase(), SessionPhase::Staged);
    assert!(store.commit_placement());
    assert_eq!(store.phase(), SessionPhase::Idle);

    let item = &store.draft_items()[0];
    assert_eq!(item.item_id, "armchair");
    assert_eq!(
        item.footprint_cell_ids,
        vec![
            cell("floor-6-7"),
            cell("floor-6-8"),
            cell("floor-7-7"),
            cell("floor-7-8"),
        ]
    );
    assert!(store.occupancy().contains(&cell("floor-7-8")));
}

#[test]
fn wall_item_stays_on_its_wall() {
    let mut store = furnished_store();
    assert!(store.start_drag_from_catalog("painting"));
    assert_eq!(store.ghost().unwrap().anchor_cell_id, cell("leftWall-1-1"));

    store.hover_cell(cell("floor-3-3"));
    let ghost = store.ghost().unwrap();
    assert!(!ghost.is_valid);
    assert_eq!(ghost.rejection, Some(Rejection::SurfaceMismatch));
    assert!(!store.stage_placement());

    store.hover_cell(cell("leftWall-4-2"));
    assert!(store.stage_placement());
    assert!(store.commit_placement());
    assert_eq!(store.draft_items()[0].surface, Surface::LeftWall);
}

#[test]
fn moving_an_item_frees_its_old_cells() {
    let mut store = furnished_store();
    store.start_drag_from_catalog("sofa");
    store.hover_cell(cell("floor-1-1"));
    store.stage_placement();
    store.commit_placement();
    let placed_id = store.draft_items()[0].id.clone();

    // Overlapping its own former footprint is fine while it is being moved
    assert!(store.start_drag_from_placed(&placed_id));
    assert!(store.draft_items().is_empty());
    store.hover_cell(cell("floor-2-2"));
    assert!(store.ghost().unwrap().is_valid);
    assert!(store.stage_placement());
    assert!(store.commit_placement());

    assert_eq!(store.draft_items().len(), 1);
    let moved = &store.draft_items()[0];
    assert_eq!(moved.id, placed_id);
    assert_eq!(moved.anchor_cell_id, cell("floor-2-2"));
    assert!(!store.occupancy().contains(&cell("floor-1-1")));
}

#[test]
fn occupied_cells_block_new_items() {
    let mut store = furnished_store();
    store.start_drag_from_catalog("rug");
    store.hover_cell(cell("floor-4-4"));
    store.stage_placement();
    store.commit_placement();

    store.start_drag_from_catalog("lamp");
    store.hover_cell(cell("floor-5-6"));
    let ghost = store.ghost().unwrap();
    assert_eq!(ghost.rejection, Some(Rejection::Occupied));
    assert!(!store.stage_placement());

    store.hover_cell(cell("floor-8-8"));
    assert!(store.stage_placement());
}

#[test]
fn preview_session_never_touches_draft() {
    let mut store = furnished_store();
    let log = record(&mut store);

    let constraints = DragConstraints::new(2, 2).preview(true);
    assert!(store.start_drag_from_inventory("sofa", constraints));
    store.hover_cell(cell("floor-3-3"));
    assert!(store.stage_placement());
    assert!(!store.commit_placement());

    assert!(store.draft_items().is_empty());
    assert!(store.session().is_none());
    assert!(log.borrow().iter().any(|event| matches!(
        event,
        StoreEvent::SessionEnded {
            reason: EndReason::Previewed,
            ..
        }
    )));
}

#[test]
fn observer_sees_full_session() {
    let mut store = furnished_store();
    let log = record(&mut store);

    store.start_drag_from_catalog("clock");
    store.hover_cell(cell("rightWall-2-2"));
    store.stage_placement();
    store.commit_placement();

    let log = log.borrow();
    assert!(matches!(
        log.first(),
        Some(StoreEvent::SessionStarted { replacement: false, .. })
    ));
    assert!(log.iter().any(|event| matches!(event, StoreEvent::Staged { .. })));
    assert!(log
        .iter()
        .any(|event| matches!(event, StoreEvent::DraftChanged { items: 1, .. })));
    assert!(matches!(
        log.last(),
        Some(StoreEvent::SessionEnded {
            reason: EndReason::Committed,
            ..
        })
    ));
}

#[test]
fn snapshot_lists_committed_items() {
    let mut store = furnished_store();
    store.start_drag_from_catalog("plant");
    store.hover_cell(cell("rightWall-6-6"));
    store.stage_placement();
    store.commit_placement();

    let json = store.draft_snapshot_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["item_id"], "plant");
    assert_eq!(items[0]["anchor_cell_id"], "rightWall-6-6");
}

#[test]
fn replay_gesture_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"type": "image", "width": 1200, "height": 900}}"#).unwrap();
    writeln!(
        file,
        r#"{{"type": "start_from_inventory", "item_id": "crate", "constraints": {{"x_length": 2, "y_length": 2}}}}"#
    )
    .unwrap();
    writeln!(file, r#"{{"type": "hover", "cell_id": "floor-11-11"}}"#).unwrap();
    writeln!(file).unwrap();
    writeln!(file, r#"{{"type": "stage"}}"#).unwrap();
    writeln!(file, r#"{{"type": "commit"}}"#).unwrap();
    // The same drag pushed off the edge of the floor
    writeln!(
        file,
        r#"{{"type": "start_from_inventory", "item_id": "crate", "constraints": {{"x_length": 2, "y_length": 2}}}}"#
    )
    .unwrap();
    writeln!(file, r#"{{"type": "hover", "cell_id": "floor-12-12"}}"#).unwrap();
    writeln!(file, r#"{{"type": "stage"}}"#).unwrap();
    writeln!(file, r#"{{"type": "cancel"}}"#).unwrap();
    file.flush().unwrap();

    let events = read_events(file.path()).unwrap();
    assert_eq!(events.len(), 9);
    assert_eq!(events[3], RoomEvent::Stage);

    let mut store = PlacementStore::default();
    let applied = replay(&mut store, &events);
    // Only the second stage is refused
    assert_eq!(applied, 8);

    assert_eq!(store.draft_items().len(), 1);
    assert_eq!(
        store.draft_items()[0].footprint_cell_ids,
        vec![
            cell("floor-11-11"),
            cell("floor-11-12"),
            cell("floor-12-11"),
            cell("floor-12-12"),
        ]
    );
    assert!(store.session().is_none());
}

#[test]
fn malformed_gesture_line_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"type": "stage"}}"#).unwrap();
    writeln!(file, r#"{{"type": "teleport"}}"#).unwrap();
    file.flush().unwrap();

    let err = read_events(file.path()).unwrap_err();
    assert!(err.to_string().starts_with("line 2:"));
}

#[test]
fn oversized_item_in_gesture_file_is_refused() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"type": "image", "width": 1200, "height": 900}}"#).unwrap();
    writeln!(
        file,
        r#"{{"type": "start_from_inventory", "item_id": "hall", "constraints": {{"x_length": 70000, "y_length": 70000}}}}"#
    )
    .unwrap();
    writeln!(file, r#"{{"type": "hover", "cell_id": "floor-1-1"}}"#).unwrap();
    file.flush().unwrap();

    let events = read_events(file.path()).unwrap();
    let mut store = PlacementStore::default();
    assert_eq!(replay(&mut store, &events), 1);
    assert!(store.session().is_none());
    assert!(store.draft_items().is_empty());
}
