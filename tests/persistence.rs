use egui::pos2;
use pixel_studio::fill::FillStrategy;
use pixel_studio::persistence::{FileStore, MemoryStore, StateStore};
use pixel_studio::render::{SceneOptions, render_scene, unpremultiplied_rgba};
use pixel_studio::{Editor, EditorConfig, InputEvent, Layer, Tool};

fn draw_stroke(editor: &mut Editor) {
    editor.handle_event(InputEvent::pointer_down(pos2(0.0, 0.0)));
    editor.handle_event(InputEvent::PointerMove {
        pos: pos2(20.0, 20.0),
    });
    editor.handle_event(InputEvent::pointer_up(pos2(20.0, 20.0)));
}

#[test]
fn every_mutation_is_persisted() {
    let store = MemoryStore::new();
    let mut editor = Editor::default();
    editor.set_store(Box::new(store.clone()));

    draw_stroke(&mut editor);
    let after_stroke = store.writes();
    assert!(after_stroke >= 1);

    editor.set_brush_color("#ff0000");
    assert!(store.writes() > after_stroke);

    let state = store.hydrate().unwrap().unwrap();
    assert_eq!(state.brush_color, "#ff0000");
    assert_eq!(state.layers[0].lines.len(), 1);
}

#[test]
fn hydrating_restores_the_durable_state() {
    let store = MemoryStore::new();
    let mut editor = Editor::default();
    editor.set_store(Box::new(store.clone()));
    draw_stroke(&mut editor);
    let layer = editor.add_layer();
    editor.set_tool(Tool::Circle);
    editor.set_brush_size(12.0);
    editor.set_user(Some("Ana".to_string()), "#123456");

    let mut restored = Editor::default();
    restored.set_store(Box::new(store));
    assert!(restored.hydrate_from_store());
    assert_eq!(restored.layers(), editor.layers());
    assert_eq!(restored.document().active_layer_id(), layer);
    assert_eq!(restored.active_tool(), Tool::Circle);
    assert_eq!(restored.brush_size(), 12.0);
    assert_eq!(restored.user_name(), Some("Ana"));
    assert_eq!(restored.user_color(), "#123456");
    assert!(!restored.undo());
}

fn pixel(layers: &[Layer], x: usize, y: usize) -> [u8; 4] {
    let options = SceneOptions {
        pixel_ratio: 1.0,
        background: Some([255, 255, 255, 255]),
        ..SceneOptions::default()
    };
    let rgba = unpremultiplied_rgba(&render_scene(layers, 40.0, 20.0, &options).unwrap());
    let at = (y * 40 + x) * 4;
    [rgba[at], rgba[at + 1], rgba[at + 2], rgba[at + 3]]
}

#[test]
fn reloaded_flood_fill_does_not_cover_the_canvas() {
    let config = EditorConfig {
        canvas_width: 40.0,
        canvas_height: 20.0,
        fill_strategy: FillStrategy::FloodRaster,
        ..EditorConfig::default()
    };
    let store = MemoryStore::new();
    let mut editor = Editor::new(config.clone());
    editor.set_store(Box::new(store.clone()));

    editor.handle_event(InputEvent::pointer_down(pos2(20.0, 0.0)));
    editor.handle_event(InputEvent::PointerMove {
        pos: pos2(20.0, 20.0),
    });
    editor.handle_event(InputEvent::pointer_up(pos2(20.0, 20.0)));
    editor.set_brush_color("#ff0000");
    editor.set_tool(Tool::Fill);
    editor.handle_event(InputEvent::pointer_down(pos2(5.0, 10.0)));
    editor.handle_event(InputEvent::pointer_up(pos2(5.0, 10.0)));
    assert_eq!(editor.poll_pending(), 1);
    assert_eq!(pixel(editor.layers(), 5, 10), [255, 0, 0, 255]);
    assert_eq!(pixel(editor.layers(), 35, 10), [255, 255, 255, 255]);

    let mut restored = Editor::new(config);
    restored.set_store(Box::new(store));
    assert!(restored.hydrate_from_store());
    assert_eq!(restored.layers()[0].lines.len(), 2);
    assert_eq!(pixel(restored.layers(), 35, 10), [255, 255, 255, 255]);
    assert_eq!(pixel(restored.layers(), 20, 10), [0, 0, 0, 255]);
}

#[test]
fn empty_store_hydrates_nothing() {
    let mut editor = Editor::default();
    editor.set_store(Box::new(MemoryStore::new()));
    assert!(!editor.hydrate_from_store());
    assert_eq!(editor.layers().len(), 1);
}

#[test]
fn file_store_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("nested");

    let mut editor = Editor::default();
    editor.set_store(Box::new(FileStore::new(&state_dir)));
    draw_stroke(&mut editor);
    assert!(FileStore::new(&state_dir).path().exists());

    let mut restored = Editor::default();
    restored.set_store(Box::new(FileStore::new(&state_dir)));
    assert!(restored.hydrate_from_store());
    assert_eq!(restored.layers(), editor.layers());
}

#[test]
fn corrupt_state_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    std::fs::write(store.path(), "{ definitely not state").unwrap();

    let mut editor = Editor::default();
    editor.set_store(Box::new(store));
    assert!(!editor.hydrate_from_store());
    assert_eq!(editor.layers().len(), 1);
}
