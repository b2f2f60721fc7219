use egui::{Color32, Slider};

use crate::PaintApp;
use crate::color::{color32_to_hex, hex_to_color32};
use crate::editor::{MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use crate::fill::FillStrategy;
use crate::line::Tool;

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.editor.active_tool();
            egui::Grid::new("tool_grid").num_columns(2).show(ui, |ui| {
                for (i, tool) in Tool::ALL.into_iter().enumerate() {
                    if ui.selectable_label(active == tool, tool.name()).clicked() {
                        log::info!("Tool selected from UI: {}", tool.name());
                        app.editor.set_tool(tool);
                    }
                    if i % 2 == 1 {
                        ui.end_row();
                    }
                }
            });
            ui.separator();

            // Brush
            ui.horizontal(|ui| {
                ui.label("Color:");
                let mut color = hex_to_color32(app.editor.brush_color());
                if egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut color,
                    egui::color_picker::Alpha::Opaque,
                )
                .changed()
                {
                    app.editor.set_brush_color(color32_to_hex(color));
                }
            });
            ui.horizontal(|ui| {
                ui.label("Size:");
                let mut size = app.editor.brush_size();
                if ui.add(Slider::new(&mut size, MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE)).changed() {
                    app.editor.set_brush_size(size);
                }
            });
            if active == Tool::Fill {
                let mut strategy = app.editor.config().fill_strategy;
                egui::ComboBox::from_label("Fill")
                    .selected_text(fill_label(strategy))
                    .show_ui(ui, |ui| {
                        for option in [FillStrategy::CanvasRect, FillStrategy::FloodRaster] {
                            ui.selectable_value(&mut strategy, option, fill_label(option));
                        }
                    });
                if strategy != app.editor.config().fill_strategy {
                    app.editor.set_fill_strategy(strategy);
                }
            }
            let mut axis = app.editor.mirror_axis_visible();
            if ui.checkbox(&mut axis, "Show mirror axis").changed() {
                app.editor.toggle_mirror_axis();
            }
            ui.separator();

            // History and view
            ui.horizontal(|ui| {
                let can_undo = app.editor.document().can_undo();
                let can_redo = app.editor.document().can_redo();
                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.editor.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.editor.redo();
                }
            });
            ui.label(format!(
                "History: step {} of {}",
                app.editor.document().history_step() + 1,
                app.editor.document().history().len().max(1)
            ));
            ui.horizontal(|ui| {
                let anchor = egui::pos2(200.0, 150.0);
                let step = app.editor.config().zoom_step;
                if ui.button("-").clicked() {
                    app.editor.viewport_mut().zoom_step_at(anchor, false, step);
                }
                ui.label(format!("{:.0}%", app.editor.viewport().scale() * 100.0));
                if ui.button("+").clicked() {
                    app.editor.viewport_mut().zoom_step_at(anchor, true, step);
                }
                if ui.button("Reset").clicked() {
                    app.editor.viewport_mut().reset();
                }
            });
            ui.separator();

            // Files
            ui.horizontal(|ui| {
                if ui.button("Export PNG").clicked() {
                    match app.editor.export_png() {
                        Ok(png) => app.deliver(ctx, "pixel-studio.png", "image/png", &png),
                        Err(err) => app.set_status(format!("Export failed: {err}")),
                    }
                }
                if ui.button("Save project").clicked() {
                    match app.editor.save_project_json() {
                        Ok(json) => app.deliver(
                            ctx,
                            "pixel-studio.json",
                            "application/json",
                            json.as_bytes(),
                        ),
                        Err(err) => app.set_status(format!("Save failed: {err}")),
                    }
                }
            });
            ui.small("Drop a project .json to load it, or an image to trace over.");

            if let Some(opacity) = app.editor.reference().map(|reference| reference.opacity) {
                ui.horizontal(|ui| {
                    let mut opacity = opacity;
                    ui.label("Reference:");
                    if ui.add(Slider::new(&mut opacity, 0.0..=1.0)).changed() {
                        app.editor.set_reference_opacity(opacity);
                    }
                    if ui.small_button("x").clicked() {
                        app.editor.clear_reference_image();
                    }
                });
            }
            ui.separator();

            // Identity used for the export watermark
            ui.horizontal(|ui| {
                ui.label("Name:");
                let response = ui.text_edit_singleline(&mut app.user_name_buffer);
                let mut color = hex_to_color32(app.editor.user_color());
                let color_changed = egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut color,
                    egui::color_picker::Alpha::Opaque,
                )
                .changed();
                if response.lost_focus() || color_changed {
                    let name = app.user_name_buffer.trim();
                    let name = (!name.is_empty()).then(|| name.to_owned());
                    app.editor.set_user(name, color32_to_hex(color));
                }
            });
            if let Some(name) = app.editor.user_name() {
                ui.colored_label(hex_to_color32(app.editor.user_color()), name);
            } else {
                ui.colored_label(Color32::GRAY, "Anonymous");
            }
        });
}

fn fill_label(strategy: FillStrategy) -> &'static str {
    match strategy {
        FillStrategy::CanvasRect => "Whole canvas",
        FillStrategy::FloodRaster => "Flood area",
    }
}
