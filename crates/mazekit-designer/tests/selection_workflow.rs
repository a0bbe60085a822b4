//! End-to-end selection flows through the public tool API: click and marquee
//! selection, double-click vertex editing, and the vertex deletion floor.

use mazekit_core::geometry::Point;
use mazekit_designer::{
    Document, DocumentStore, ElementSpec, Modifiers, PointerEvent, SelectTool, Tool,
};

fn maze_scene() -> (Document, u64, u64, u64) {
    let mut doc = Document::new();
    let outer = doc.add_element(ElementSpec::rectangle(0.0, 0.0, 100.0, 100.0, 2.0));
    let corridor = doc.add_element(ElementSpec::path(
        vec![
            Point::new(10.0, 10.0),
            Point::new(10.0, 50.0),
            Point::new(40.0, 50.0),
        ],
        3.0,
    ));
    let island = doc.add_element(ElementSpec::rectangle(60.0, 60.0, 20.0, 20.0, 2.0));
    (doc, outer, corridor, island)
}

fn click(tool: &mut SelectTool, doc: &mut Document, at: Point) {
    tool.on_pointer_down(doc, &PointerEvent::at(at));
    tool.on_pointer_up(doc, &PointerEvent::at(at));
}

#[test]
fn click_selects_topmost_element_under_cursor() {
    let (mut doc, outer, _, island) = maze_scene();
    let mut tool = SelectTool::new();

    // The island sits on top of the outer boundary region.
    click(&mut tool, &mut doc, Point::new(70.0, 70.0));
    assert!(doc.selection().contains(&island), "topmost wins");
    assert!(!doc.selection().contains(&outer));
}

#[test]
fn shift_click_builds_a_multi_selection() {
    let (mut doc, _, corridor, island) = maze_scene();
    let mut tool = SelectTool::new();
    let shift = Modifiers {
        shift: true,
        ..Default::default()
    };

    click(&mut tool, &mut doc, Point::new(10.0, 30.0)); // corridor edge
    tool.on_pointer_down(
        &mut doc,
        &PointerEvent::at(Point::new(70.0, 70.0)).with_modifiers(shift),
    );
    tool.on_pointer_up(
        &mut doc,
        &PointerEvent::at(Point::new(70.0, 70.0)).with_modifiers(shift),
    );

    assert!(doc.selection().contains(&corridor));
    assert!(doc.selection().contains(&island));
    assert_eq!(doc.selection().len(), 2);
}

#[test]
fn marquee_selects_every_intersecting_element() {
    let mut doc = Document::new();
    let a = doc.add_element(ElementSpec::rectangle(0.0, 0.0, 10.0, 10.0, 1.0));
    let b = doc.add_element(ElementSpec::rectangle(20.0, 0.0, 10.0, 10.0, 1.0));
    let far = doc.add_element(ElementSpec::rectangle(200.0, 200.0, 10.0, 10.0, 1.0));
    let mut tool = SelectTool::new();

    // Sweep that clips the left half of `a` and the left edge of `b`.
    tool.on_pointer_down(&mut doc, &PointerEvent::at(Point::new(-5.0, -5.0)));
    tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(22.0, 15.0)));
    tool.on_pointer_up(&mut doc, &PointerEvent::at(Point::new(22.0, 15.0)));

    assert!(doc.selection().contains(&a));
    assert!(doc.selection().contains(&b), "partial overlap is enough");
    assert!(!doc.selection().contains(&far));
}

#[test]
fn double_click_opens_vertex_session_on_the_element() {
    let (mut doc, _, corridor, _) = maze_scene();
    let mut tool = SelectTool::new();

    let at = Point::new(10.0, 30.0);
    tool.on_pointer_down(&mut doc, &PointerEvent::at(at).with_time(1000));
    tool.on_pointer_up(&mut doc, &PointerEvent::at(at).with_time(1000));
    tool.on_pointer_down(&mut doc, &PointerEvent::at(at).with_time(1250));
    tool.on_pointer_up(&mut doc, &PointerEvent::at(at).with_time(1250));

    assert_eq!(doc.vertex_edit_target(), Some(corridor));
    assert_eq!(doc.selection().iter().copied().collect::<Vec<_>>(), vec![corridor]);
    // The vertex nearest the click starts out selected; an exact tie between
    // the two ends of the edge resolves to the earlier index.
    assert!(doc.selected_vertex_indices().contains(&0));
}

#[test]
fn vertex_drag_reshapes_a_corridor() {
    let (mut doc, _, corridor, _) = maze_scene();
    let mut tool = SelectTool::new();
    tool.set_grid(None);
    doc.enter_vertex_edit(Some(corridor)).unwrap();

    // Drag the corner vertex at (10,50) outward.
    tool.on_pointer_down(&mut doc, &PointerEvent::at(Point::new(10.0, 50.0)));
    tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(15.0, 55.0)));
    tool.on_pointer_up(&mut doc, &PointerEvent::at(Point::new(15.0, 55.0)));

    let el = doc.get(corridor).unwrap();
    assert_eq!(el.points[1], Point::new(15.0, 55.0));
    assert_eq!(el.points[0], Point::new(10.0, 10.0), "other vertices stay");
    assert_eq!(el.points[2], Point::new(40.0, 50.0));
}

#[test]
fn vertex_deletion_keeps_elements_above_the_floor() {
    let (mut doc, _, corridor, island) = maze_scene();

    // Open path with 3 points: deleting 2 would leave 1, refused outright.
    doc.enter_vertex_edit(Some(corridor)).unwrap();
    doc.set_selected_vertices(&[0, 1]);
    assert!(doc.delete_selected_vertices().is_err());
    assert_eq!(doc.get(corridor).unwrap().points.len(), 3, "untouched on refusal");

    // Deleting one is fine: 2 points remain on an open path.
    doc.set_selected_vertices(&[1]);
    doc.delete_selected_vertices().unwrap();
    assert_eq!(doc.get(corridor).unwrap().points.len(), 2);

    // Closed shape floor is 3.
    doc.enter_vertex_edit(Some(island)).unwrap();
    doc.set_selected_vertices(&[0, 1]);
    assert!(doc.delete_selected_vertices().is_err());
    doc.set_selected_vertices(&[0]);
    doc.delete_selected_vertices().unwrap();
    assert_eq!(doc.get(island).unwrap().points.len(), 3);
}

#[test]
fn undo_after_vertex_drag_restores_the_original_shape() {
    let (mut doc, _, corridor, _) = maze_scene();
    let mut tool = SelectTool::new();
    tool.set_grid(None);
    doc.enter_vertex_edit(Some(corridor)).unwrap();

    tool.on_pointer_down(&mut doc, &PointerEvent::at(Point::new(10.0, 10.0)));
    for i in 1..=8 {
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(10.0 - i as f64, 10.0)));
    }
    tool.on_pointer_up(&mut doc, &PointerEvent::at(Point::new(2.0, 10.0)));

    assert_eq!(doc.undo_depth(), 1, "one snapshot for the whole drag");
    assert!(doc.undo());
    assert_eq!(doc.get(corridor).unwrap().points[0], Point::new(10.0, 10.0));
}
