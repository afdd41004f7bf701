//! Integration tests for the full annotate/erase/undo interaction cycle
//! (formink-core).

use formink_core::{
    AnnotationList, BaseImageRef, DisplayPoint, Document, HistoryStrategy, PointerEvent, Session,
    ToolKind,
};

/// Build a ready session over a square form with a 1:1 viewport fit.
fn square_session() -> Session {
    let doc = Document::new("lab-results", BaseImageRef::resolved("lab.png", 1000, 1000));
    Session::new(doc, 1000.0, 1000.0).expect("session")
}

fn drag(session: &mut Session, points: &[(f64, f64)]) {
    let mut iter = points.iter();
    let &(x, y) = iter.next().expect("at least one point");
    session
        .handle_pointer(PointerEvent::Down {
            position: DisplayPoint::new(x, y),
        })
        .expect("down");
    for &(x, y) in iter {
        session.frame_tick();
        session
            .handle_pointer(PointerEvent::Move {
                position: DisplayPoint::new(x, y),
            })
            .expect("move");
    }
    session.handle_pointer(PointerEvent::Up).expect("up");
}

fn erase_tool(session: &mut Session, radius: f64) {
    let mut tool = session.tool().clone();
    tool.tool = ToolKind::Erase;
    tool.erase_radius = radius;
    session.set_tool(tool);
}

fn pen_tool(session: &mut Session) {
    let mut tool = session.tool().clone();
    tool.tool = ToolKind::Pen;
    session.set_tool(tool);
}

#[test]
fn draw_erase_undo_redo_cycle() {
    let mut s = square_session();

    drag(&mut s, &[(100.0, 100.0), (200.0, 100.0), (300.0, 100.0)]);
    s.insert_text(DisplayPoint::new(500.0, 500.0), "checked");
    assert_eq!(s.annotations().len(), 2);

    // Erase the middle point of the 3-point stroke. Both surviving runs are
    // single points and are dropped, so the whole stroke goes away and only
    // the text remains.
    erase_tool(&mut s, 30.0);
    drag(&mut s, &[(200.0, 100.0), (201.0, 100.0)]);
    assert_eq!(s.annotations().len(), 1);

    // Undo restores the erased stroke, then the text, then the baseline.
    assert!(s.undo());
    assert_eq!(s.annotations().len(), 2);
    assert!(s.undo());
    assert_eq!(s.annotations().len(), 1);
    assert!(s.undo());
    assert!(s.annotations().is_empty());
    assert!(!s.undo());

    // Redo all the way forward again.
    assert!(s.redo());
    assert!(s.redo());
    assert!(s.redo());
    assert_eq!(s.annotations().len(), 1);
    assert!(!s.redo());
}

#[test]
fn new_stroke_after_undo_truncates_redo() {
    let mut s = square_session();
    drag(&mut s, &[(10.0, 10.0), (50.0, 10.0)]);
    drag(&mut s, &[(10.0, 50.0), (50.0, 50.0)]);

    assert!(s.undo());
    pen_tool(&mut s);
    drag(&mut s, &[(10.0, 90.0), (50.0, 90.0)]);

    assert!(!s.redo());
    assert_eq!(s.annotations().len(), 2);
}

#[test]
fn per_form_cache_round_trip_restores_overlay() {
    let mut s = square_session();
    drag(&mut s, &[(100.0, 100.0), (200.0, 200.0)]);
    s.insert_text(DisplayPoint::new(300.0, 300.0), "see notes");

    // Switching forms: the external cache keeps the overlay as JSON.
    let cached = s.annotations().to_json().expect("serialize");

    // Coming back: a fresh document restores the cached overlay.
    let restored = AnnotationList::from_json(&cached).expect("deserialize");
    let doc = Document::new("lab-results", BaseImageRef::resolved("lab.png", 1000, 1000))
        .with_annotations(restored);
    let s2 = Session::new(doc, 1000.0, 1000.0).expect("session");

    assert_eq!(s2.annotations(), s.annotations());
}

#[test]
fn strategy_choice_is_per_document_configuration() {
    let doc = Document::new("billing", BaseImageRef::resolved("billing.png", 800, 600))
        .with_strategy(HistoryStrategy::RasterSnapshot);
    assert_eq!(doc.strategy, HistoryStrategy::RasterSnapshot);

    // The session's own op-log stack is unaffected by the document's raster
    // strategy flag; the raster stack lives with the renderer surface.
    let s = Session::new(doc, 800.0, 600.0).expect("session");
    assert_eq!(s.history_len(), 1);
}

#[test]
fn viewport_resize_does_not_move_existing_annotations() {
    let mut s = square_session();
    drag(&mut s, &[(100.0, 100.0), (200.0, 200.0)]);
    let before = s.annotations().clone();

    s.set_viewport(500.0, 400.0).expect("resize");
    assert_eq!(s.annotations(), &before);
}
