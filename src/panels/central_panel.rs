use egui::{FontId, Key, Order, Sense, TextEdit};

use crate::PaintApp;
use crate::color::hex_to_color32;
use crate::geometry::hit_testing::selection_bounds;
use crate::gizmo::{LineTransform, TransformGizmo};
use crate::input::InputEvent;
use crate::line::Tool;
use crate::render::text_font_px;
use crate::renderer::{CanvasView, paint_line};
use crate::tools::TextCommitTrigger;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("Tool: {}", app.editor.active_tool().name()));
            ui.separator();
            ui.label(app.editor.interaction().name());
            if let Some(cursor) = app.editor.cursor() {
                ui.separator();
                ui.label(format!("{:.0}, {:.0}", cursor.x, cursor.y));
            }
            if let Some(status) = &app.status {
                ui.separator();
                ui.label(status);
            }
        });
    });

    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
            let rect = response.rect;

            // Handle input
            let keyboard_free = !ctx.wants_keyboard_input();
            let events = ctx.input(|input| app.input.translate(input, rect, keyboard_free));
            let press_origin = ctx.input(|i| i.pointer.press_origin());
            let gizmo_owns_pointer = app.gizmo_target.is_some()
                && (app.gizmo.is_active() || press_origin.is_some_and(|pos| app.gizmo.hit(pos)));
            for event in events {
                let is_pointer = matches!(
                    event,
                    InputEvent::PointerDown { .. }
                        | InputEvent::PointerMove { .. }
                        | InputEvent::PointerUp { .. }
                );
                if is_pointer && gizmo_owns_pointer {
                    continue;
                }
                app.editor.handle_event(event);
            }

            // Render the canvas
            if let Some(renderer) = &mut app.renderer {
                renderer.render(&painter, rect, &app.editor);
            }

            transform_gizmo(app, ui, rect);
            text_entry(app, ctx, rect);
        });
}

/// Rotate/scale handles for a single selected line.
fn transform_gizmo(app: &mut PaintApp, ui: &mut egui::Ui, rect: egui::Rect) {
    let editor = &app.editor;
    let target = (editor.active_tool() == Tool::Select
        && editor.selection().len() == 1
        && editor.drag_offset().is_none())
    .then(|| editor.selection().ids().next().map(str::to_owned))
    .flatten()
    .and_then(|id| editor.document().active_layer()?.line(&id).cloned());
    let Some(line) = target else {
        app.gizmo_target = None;
        app.gizmo = TransformGizmo::default();
        return;
    };

    let view = CanvasView {
        origin: rect.min,
        viewport: app.editor.viewport(),
    };
    let bounds = view.rect_to_screen(&selection_bounds(&line));
    if app.gizmo_target.as_deref() != Some(line.id.as_str()) {
        app.gizmo = TransformGizmo::new(bounds);
        app.gizmo_target = Some(line.id.clone());
    } else {
        app.gizmo.update_bounds(bounds);
    }

    let mut transform = LineTransform::of(&line);
    if app.gizmo.update(ui, &mut transform, view.scale()) {
        let mut preview = line.clone();
        preview.x = Some(transform.offset.x);
        preview.y = Some(transform.offset.y);
        preview.rotation = Some(transform.rotation);
        preview.scale_x = Some(transform.scale.x);
        preview.scale_y = Some(transform.scale.y);
        paint_line(ui.painter(), &preview, &view);
    }

    if let Some(done) = app.gizmo.completed_transform.take() {
        app.editor.transform_end(
            &line.id,
            done.offset.x,
            done.offset.y,
            done.rotation,
            done.scale.x,
            done.scale.y,
        );
    }
}

/// The floating text box of the text tool.
fn text_entry(app: &mut PaintApp, ctx: &egui::Context, rect: egui::Rect) {
    let Some(entry) = app.editor.text_entry().cloned() else {
        app.focused_text_entry = None;
        return;
    };
    let view = CanvasView {
        origin: rect.min,
        viewport: app.editor.viewport(),
    };
    let screen = view.to_screen(entry.anchor);
    let font_px = text_font_px(app.editor.brush_size()) * view.scale();
    let color = hex_to_color32(app.editor.brush_color());

    let mut text = entry.text.clone();
    egui::Area::new(egui::Id::new("text_entry"))
        .order(Order::Foreground)
        .fixed_pos(screen)
        .show(ctx, |ui| {
            let response = ui.add(
                TextEdit::singleline(&mut text)
                    .font(FontId::proportional(font_px))
                    .text_color(color)
                    .desired_width(240.0)
                    .hint_text("Type, then Enter"),
            );
            if app.focused_text_entry != Some(entry.opened_at_ms) {
                response.request_focus();
                app.focused_text_entry = Some(entry.opened_at_ms);
            }
            if response.changed() {
                app.editor.set_text_input(text.clone());
            }
            if response.lost_focus() {
                let (enter, escape) =
                    ui.input(|i| (i.key_pressed(Key::Enter), i.key_pressed(Key::Escape)));
                if escape {
                    app.editor.cancel_text();
                } else {
                    let trigger = if enter {
                        TextCommitTrigger::Enter
                    } else {
                        TextCommitTrigger::Blur
                    };
                    if !app.editor.commit_text(trigger) && app.editor.text_entry().is_some() {
                        // Still inside the guard window
                        response.request_focus();
                    }
                }
            }
        });
}
