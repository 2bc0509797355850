use std::collections::HashMap;

use kart_protocol::{parse_layout, ConnectionState, NameList};
use kart_state::{paint, AppState, NameSource, NameState, RenderedGrid, StateError};

fn no_cache() -> HashMap<String, String> {
    HashMap::new()
}

fn grid(source: &str) -> RenderedGrid {
    RenderedGrid::render(&parse_layout(source).expect("layout"))
}

#[test]
fn test_render_address_invariant() {
    let layout = parse_layout("0 1 2\n3   0\n  1").unwrap();
    let grid = RenderedGrid::render(&layout);
    assert_eq!(grid.spot_count(), layout.spot_count());
    let rendered: Vec<_> = grid.spots().iter().map(|s| s.orientation()).collect();
    assert_eq!(rendered, layout.orientations());
}

#[test]
fn test_paint_sets_labels_in_order() {
    let mut grid = grid("0 1\n 2");
    let names = NameList::from_iter(["A", "B", "C"]);
    paint(&names, &mut grid).expect("paint should fit");
    assert_eq!(grid.labels(), vec!["A", "B", "C"]);
}

#[test]
fn test_paint_guards_surplus_names() {
    let mut grid = grid("012");
    let names = NameList::from_iter(["A", "B", "C", "D", "E"]);
    let err = paint(&names, &mut grid).unwrap_err();
    assert_eq!(err, StateError::RenderMismatch { names: 5, spots: 3 });
    assert_eq!(grid.labels(), vec!["A", "B", "C"]);
}

#[test]
fn test_short_list_leaves_remaining_labels() {
    let mut grid = grid("0123");
    paint(&NameList::from_iter(["A", "B", "C", "D"]), &mut grid).unwrap();
    paint(&NameList::from_iter(["x"]), &mut grid).unwrap();
    assert_eq!(grid.labels(), vec!["x", "B", "C", "D"]);
}

#[test]
fn test_replace_is_wholesale() {
    let mut grid = grid("01");
    let mut state = NameState::initial(&no_cache(), "kart", 0);
    state
        .replace(NameList::from_iter(["A", "B"]), &mut grid)
        .unwrap();
    state
        .replace(NameList::parse("X,Y"), &mut grid)
        .unwrap();
    assert_eq!(state.names().as_slice(), &["X", "Y"]);
    assert_eq!(state.source(), NameSource::Server);
    assert_eq!(grid.labels(), vec!["X", "Y"]);
}

#[test]
fn test_initial_prefers_cache() {
    let mut cache = HashMap::new();
    cache.insert("kart".to_string(), "Ana,Bo".to_string());
    let state = NameState::initial(&cache, "kart", 16);
    assert_eq!(state.source(), NameSource::Cache);
    assert_eq!(state.names().as_slice(), &["Ana", "Bo"]);
}

#[test]
fn test_initial_ignores_empty_cache_value() {
    let mut cache = HashMap::new();
    cache.insert("kart".to_string(), String::new());
    let state = NameState::initial(&cache, "kart", 16);
    assert_eq!(state.source(), NameSource::Default);
    assert_eq!(state.names().len(), 16);
    assert_eq!(state.names().get(15), Some("15"));
}

#[test]
fn test_default_count_is_independent_of_layout() {
    let mut app = AppState::new(
        grid("0 1\n2 3"),
        NameState::initial(&no_cache(), "kart", 16),
        "ws://localhost:9003".into(),
    );
    let result = app.paint_current();
    assert_eq!(result, Err(StateError::RenderMismatch { names: 16, spots: 4 }));
    assert_eq!(app.grid.labels(), vec!["0", "1", "2", "3"]);
    assert_eq!(app.mismatches, 1);
}

#[test]
fn test_mismatch_does_not_block_later_frames() {
    let mut app = AppState::new(
        grid("01"),
        NameState::initial(&no_cache(), "kart", 2),
        "ws://localhost:9003".into(),
    );
    app.paint_current().unwrap();
    assert!(app.apply_names(NameList::parse("a,b,c")).is_err());
    app.apply_names(NameList::parse("c,d")).unwrap();
    assert_eq!(app.grid.labels(), vec!["c", "d"]);
    assert_eq!(app.frames_received, 2);
}

#[test]
fn test_connection_loss_marks_stale() {
    let mut app = AppState::new(
        grid("01"),
        NameState::initial(&no_cache(), "kart", 2),
        "ws://localhost:9003".into(),
    );
    app.set_connection(ConnectionState::Connecting);
    app.set_connection(ConnectionState::Open);
    assert!(!app.stale);
    app.mark_lost(ConnectionState::Closed, "server went away".into());
    assert!(app.stale);
    assert_eq!(app.connection, ConnectionState::Closed);
    assert_eq!(app.lost_reason.as_deref(), Some("server went away"));
}

#[test]
fn test_render_text_draws_arrows_and_labels() {
    let mut grid = grid("0 1\n2 3");
    paint(&NameList::from_iter(["A", "B", "C", "D"]), &mut grid).unwrap();
    assert_eq!(grid.render_text(), vec!["▲ A     ▶ B", "▼ C     ◀ D"]);
}
