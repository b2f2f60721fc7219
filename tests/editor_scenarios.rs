use egui::{Key, Modifiers, PointerButton, Pos2, pos2};
use pixel_studio::event::{FeedbackEvent, RecordingFeedback};
use pixel_studio::fill::FillStrategy;
use pixel_studio::image::encode_png_data_uri;
use pixel_studio::tools::TextCommitTrigger;
use pixel_studio::util::time::ManualClock;
use pixel_studio::{Editor, EditorConfig, InputEvent, Tool};

fn small_canvas(fill_strategy: FillStrategy) -> EditorConfig {
    EditorConfig {
        canvas_width: 40.0,
        canvas_height: 30.0,
        fill_strategy,
        ..EditorConfig::default()
    }
}

fn click(editor: &mut Editor, pos: Pos2) {
    editor.handle_event(InputEvent::pointer_down(pos));
    editor.handle_event(InputEvent::pointer_up(pos));
}

fn draw(editor: &mut Editor, from: Pos2, to: Pos2) {
    editor.handle_event(InputEvent::pointer_down(from));
    editor.handle_event(InputEvent::PointerMove { pos: to });
    editor.handle_event(InputEvent::pointer_up(to));
}

fn shift_drag(editor: &mut Editor, from: Pos2, to: Pos2) {
    editor.handle_event(InputEvent::PointerDown {
        pos: from,
        button: PointerButton::Primary,
        modifiers: Modifiers::SHIFT,
    });
    editor.handle_event(InputEvent::PointerMove { pos: to });
    editor.handle_event(InputEvent::pointer_up(to));
}

fn red_pixel_uri() -> String {
    encode_png_data_uri(1, 1, &[255, 0, 0, 255]).unwrap()
}

#[test]
fn reference_image_arrives_on_poll() {
    let mut editor = Editor::default();
    editor.set_reference_image(red_pixel_uri(), 0.4);
    assert!(editor.reference().is_none());
    assert_eq!(editor.pending_count(), 1);

    assert_eq!(editor.poll_pending(), 1);
    let reference = editor.reference().unwrap();
    assert_eq!(reference.image.width, 1);
    assert!((reference.opacity - 0.4).abs() < f32::EPSILON);
}

#[test]
fn stale_reference_decode_is_dropped() {
    let mut editor = Editor::default();
    editor.set_reference_image(red_pixel_uri(), 0.5);
    editor.set_tool(Tool::Rectangle);
    assert_eq!(editor.poll_pending(), 0);
    assert!(editor.reference().is_none());
    assert_eq!(editor.pending_count(), 0);
}

#[test]
fn broken_reference_leaves_a_notice() {
    let mut editor = Editor::default();
    editor.set_reference_image("data:image/png;base64,bm9wZQ==", 0.5);
    assert_eq!(editor.poll_pending(), 0);
    assert!(editor.reference().is_none());
    assert!(editor.take_notice().is_some());
}

#[test]
fn flood_fill_commits_after_poll() {
    let mut editor = Editor::new(small_canvas(FillStrategy::FloodRaster));
    editor.set_brush_color("#00ff00");
    editor.set_tool(Tool::Fill);
    click(&mut editor, pos2(5.0, 5.0));
    assert!(editor.layers()[0].lines.is_empty());

    assert_eq!(editor.poll_pending(), 1);
    let lines = &editor.layers()[0].lines;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tool, Tool::Fill);
    assert!(lines[0].filled_image.is_some());
    assert!(
        editor.persisted_state().layers[0].lines[0]
            .filled_image
            .is_none()
    );
}

#[test]
fn flood_fill_dropped_after_undo() {
    let mut editor = Editor::new(small_canvas(FillStrategy::FloodRaster));
    draw(&mut editor, pos2(0.0, 15.0), pos2(40.0, 15.0));
    editor.set_tool(Tool::Fill);
    click(&mut editor, pos2(5.0, 5.0));
    assert!(editor.undo());
    assert_eq!(editor.poll_pending(), 0);
    assert!(editor.layers()[0].lines.is_empty());
}

#[test]
fn canvas_fill_commits_immediately() {
    let mut editor = Editor::new(small_canvas(FillStrategy::CanvasRect));
    let feedback = RecordingFeedback::new();
    editor.event_bus().subscribe(Box::new(feedback.clone()));
    editor.set_tool(Tool::Fill);
    click(&mut editor, pos2(5.0, 5.0));

    let lines = &editor.layers()[0].lines;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].points, vec![0.0, 0.0, 40.0, 30.0]);
    assert_eq!(feedback.events(), vec![FeedbackEvent::StrokeCommit]);
    assert_eq!(editor.pending_count(), 0);
}

#[test]
fn text_blur_inside_guard_window_is_ignored() {
    let clock = ManualClock::new(10_000);
    let mut editor = Editor::with_clock(EditorConfig::default(), Box::new(clock.clone()));
    editor.set_tool(Tool::Text);
    click(&mut editor, pos2(50.0, 60.0));
    editor.set_text_input("hello");

    clock.advance(100);
    assert!(!editor.commit_text(TextCommitTrigger::Blur));
    assert!(editor.text_entry().is_some());

    clock.advance(500);
    assert!(editor.commit_text(TextCommitTrigger::Blur));
    let line = &editor.layers()[0].lines[0];
    assert_eq!(line.text.as_deref(), Some("hello"));
    assert_eq!((line.x, line.y), (Some(50.0), Some(60.0)));
}

#[test]
fn enter_commits_text_right_away() {
    let clock = ManualClock::new(0);
    let mut editor = Editor::with_clock(EditorConfig::default(), Box::new(clock));
    let feedback = RecordingFeedback::new();
    editor.event_bus().subscribe(Box::new(feedback.clone()));
    editor.set_tool(Tool::Text);
    click(&mut editor, pos2(5.0, 5.0));
    editor.set_text_input("  padded  ");
    editor.handle_event(InputEvent::key(Key::Enter, Modifiers::NONE));

    assert!(editor.text_entry().is_none());
    let line = &editor.layers()[0].lines[0];
    assert_eq!(line.text.as_deref(), Some("  padded  "));
    assert_eq!(feedback.events(), vec![FeedbackEvent::TextCommit]);
}

#[test]
fn whitespace_text_is_discarded_and_escape_cancels() {
    let mut editor = Editor::default();
    editor.set_tool(Tool::Text);
    click(&mut editor, pos2(5.0, 5.0));
    editor.set_text_input("   ");
    assert!(!editor.commit_text(TextCommitTrigger::Enter));
    assert!(editor.text_entry().is_none());

    click(&mut editor, pos2(5.0, 5.0));
    editor.set_text_input("draft");
    editor.handle_event(InputEvent::key(Key::Escape, Modifiers::NONE));
    assert!(editor.text_entry().is_none());
    assert!(editor.layers()[0].lines.is_empty());
}

#[test]
fn switching_tools_commits_open_text() {
    let mut editor = Editor::default();
    editor.set_tool(Tool::Text);
    click(&mut editor, pos2(5.0, 5.0));
    editor.set_text_input("kept");
    editor.set_tool(Tool::Brush);
    assert_eq!(editor.layers()[0].lines.len(), 1);
    assert!(editor.interaction().is_idle());
}

#[test]
fn selecting_a_stroke_pulls_in_overlapping_erasers() {
    let mut editor = Editor::default();
    draw(&mut editor, pos2(0.0, 0.0), pos2(100.0, 100.0));
    editor.set_tool(Tool::Eraser);
    draw(&mut editor, pos2(90.0, 90.0), pos2(95.0, 95.0));
    editor.set_tool(Tool::Eraser);
    draw(&mut editor, pos2(400.0, 400.0), pos2(420.0, 420.0));

    let stroke_id = editor.layers()[0].lines[0].id.clone();
    let near_eraser = editor.layers()[0].lines[1].id.clone();
    let far_eraser = editor.layers()[0].lines[2].id.clone();

    editor.set_tool(Tool::Select);
    assert!(editor.select_shape(&stroke_id, false));
    assert!(editor.selection().contains(&stroke_id));
    assert!(editor.selection().contains(&near_eraser));
    assert!(!editor.selection().contains(&far_eraser));
}

#[test]
fn delete_key_removes_selection() {
    let mut editor = Editor::default();
    let feedback = RecordingFeedback::new();
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    draw(&mut editor, pos2(200.0, 0.0), pos2(220.0, 20.0));
    editor.event_bus().subscribe(Box::new(feedback.clone()));

    editor.set_tool(Tool::Select);
    click(&mut editor, pos2(10.0, 10.0));
    assert_eq!(editor.selection().len(), 1);
    editor.handle_event(InputEvent::key(Key::Delete, Modifiers::NONE));

    assert_eq!(editor.layers()[0].lines.len(), 1);
    assert!(editor.selection().is_empty());
    assert_eq!(feedback.events(), vec![FeedbackEvent::Delete]);

    editor.handle_event(InputEvent::key(Key::Z, Modifiers::CTRL));
    assert_eq!(editor.layers()[0].lines.len(), 2);
    let ctrl_shift = Modifiers {
        ctrl: true,
        shift: true,
        ..Modifiers::NONE
    };
    editor.handle_event(InputEvent::key(Key::Z, ctrl_shift));
    assert_eq!(editor.layers()[0].lines.len(), 1);
}

#[test]
fn dragging_a_selected_line_moves_it_once() {
    let mut editor = Editor::default();
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    let step = editor.document().history_step();
    let points = editor.layers()[0].lines[0].points.clone();

    editor.set_tool(Tool::Select);
    draw(&mut editor, pos2(10.0, 10.0), pos2(40.0, 25.0));

    let line = &editor.layers()[0].lines[0];
    assert_eq!((line.x, line.y), (Some(30.0), Some(15.0)));
    assert_eq!(line.points, points);
    assert_eq!(editor.document().history_step(), step + 1);
}

#[test]
fn dragging_several_lines_is_one_undo_step() {
    let mut editor = Editor::default();
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    draw(&mut editor, pos2(200.0, 0.0), pos2(220.0, 20.0));
    editor.set_tool(Tool::Select);
    click(&mut editor, pos2(10.0, 10.0));
    let step = editor.document().history_step();

    shift_drag(&mut editor, pos2(210.0, 10.0), pos2(240.0, 30.0));
    let offsets: Vec<_> = editor.layers()[0].lines.iter().map(|l| (l.x, l.y)).collect();
    assert_eq!(offsets, vec![(Some(30.0), Some(20.0)); 2]);
    assert_eq!(editor.document().history_step(), step + 1);

    assert!(editor.undo());
    assert!(editor.layers()[0].lines.iter().all(|l| l.x.is_none() && l.y.is_none()));
}

#[test]
fn box_selection_replaces_unless_shift_is_held() {
    let mut editor = Editor::default();
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    draw(&mut editor, pos2(200.0, 0.0), pos2(220.0, 20.0));
    let first = editor.layers()[0].lines[0].id.clone();
    let second = editor.layers()[0].lines[1].id.clone();
    editor.set_tool(Tool::Select);

    draw(&mut editor, pos2(-5.0, -5.0), pos2(30.0, 30.0));
    assert_eq!(editor.selection().len(), 1);
    assert!(editor.selection().contains(&first));

    shift_drag(&mut editor, pos2(190.0, -5.0), pos2(230.0, 30.0));
    assert_eq!(editor.selection().len(), 2);
    assert!(editor.selection().contains(&second));

    draw(&mut editor, pos2(190.0, -5.0), pos2(230.0, 30.0));
    assert_eq!(editor.selection().len(), 1);
    assert!(editor.selection().contains(&second));

    click(&mut editor, pos2(100.0, 100.0));
    assert!(editor.selection().is_empty());
}

#[test]
fn deleting_an_unknown_layer_is_silent() {
    let mut editor = Editor::default();
    assert!(!editor.delete_layer("missing"));
    assert!(editor.take_notice().is_none());

    let only = editor.layers()[0].id.clone();
    assert!(!editor.delete_layer(&only));
    assert!(editor.take_notice().is_some());
}

#[test]
fn locked_layer_refuses_strokes() {
    let mut editor = Editor::default();
    let id = editor.layers()[0].id.clone();
    assert!(editor.toggle_layer_lock(&id));
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    assert!(editor.layers()[0].lines.is_empty());
    assert!(editor.take_notice().is_some());
}

#[test]
fn strokes_land_on_the_active_layer() {
    let mut editor = Editor::default();
    let background = editor.layers()[0].id.clone();
    let second = editor.add_layer();
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    assert!(editor.document().layer(&background).unwrap().lines.is_empty());
    assert_eq!(editor.document().layer(&second).unwrap().lines.len(), 1);

    assert!(editor.set_active_layer(&background));
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    assert_eq!(editor.document().layer(&background).unwrap().lines.len(), 1);
}

#[test]
fn invalid_project_leaves_scene_untouched() {
    let mut editor = Editor::default();
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    let before = editor.layers().to_vec();

    let duplicate_layers = r#"[
        {"id": "a", "name": "A", "lines": []},
        {"id": "a", "name": "B", "lines": []}
    ]"#;
    assert!(editor.load_project_json(duplicate_layers).is_err());
    assert_eq!(editor.layers(), before.as_slice());
    assert!(editor.take_notice().is_some());

    assert!(editor.load_project_json("{ not json").is_err());
    assert!(editor.load_project_json("[]").is_err());
    assert_eq!(editor.layers(), before.as_slice());
}

#[test]
fn projects_with_older_tool_names_load() {
    let mut editor = Editor::default();
    let project = r##"[{
        "id": "layer-1",
        "name": "Background",
        "lines": [
            {"id": "a", "tool": "shape", "points": [0, 0, 10, 10], "color": "#000000", "size": 5},
            {"id": "b", "tool": "eyedropper", "points": [5, 5], "color": "#000000", "size": 5},
            {"id": "c", "tool": "bucket", "points": [0, 0, 40, 30], "color": "#ff0000", "size": 0}
        ]
    }]"##;
    editor.load_project_json(project).unwrap();
    let tools: Vec<Tool> = editor.layers()[0].lines.iter().map(|l| l.tool).collect();
    assert_eq!(tools, vec![Tool::Brush, Tool::Brush, Tool::Fill]);
}

#[test]
fn project_json_round_trips_through_the_editor() {
    let mut editor = Editor::default();
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    editor.add_layer();
    let json = editor.save_project_json().unwrap();

    let mut other = Editor::default();
    other.load_project_json(&json).unwrap();
    assert_eq!(other.layers(), editor.layers());
    assert_eq!(other.document().active_layer_id(), editor.layers()[0].id);
    assert!(!other.undo());
}

#[test]
fn export_produces_a_png_at_the_pixel_ratio() {
    let mut editor = Editor::new(small_canvas(FillStrategy::CanvasRect));
    draw(&mut editor, pos2(0.0, 0.0), pos2(20.0, 20.0));
    let png = editor.export_png_with(None).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (80, 60));
}
