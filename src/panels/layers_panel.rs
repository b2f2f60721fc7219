use egui::Slider;

use crate::PaintApp;

pub fn layers_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::right("layers_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Layers");
            ui.horizontal(|ui| {
                if ui.button("Add").clicked() {
                    app.editor.add_layer();
                }
                let can_delete = app.editor.layers().len() > 1;
                let active = app.editor.document().active_layer_id().to_owned();
                if ui.add_enabled(can_delete, egui::Button::new("Delete")).clicked() {
                    app.editor.delete_layer(&active);
                }
            });
            ui.separator();

            // Topmost layer first
            let layers: Vec<_> = app
                .editor
                .layers()
                .iter()
                .rev()
                .map(|layer| (layer.id.clone(), layer.name.clone(), layer.visible, layer.locked, layer.opacity))
                .collect();
            let active_id = app.editor.document().active_layer_id().to_owned();
            for (id, name, visible, locked, opacity) in layers {
                let is_active = id == active_id;
                ui.horizontal(|ui| {
                    let mut shown = visible;
                    if ui.checkbox(&mut shown, "").on_hover_text("Visible").changed() {
                        app.editor.toggle_layer_visibility(&id);
                    }
                    let lock_label = if locked { "Locked" } else { "Lock" };
                    if ui.selectable_label(locked, lock_label).clicked() {
                        app.editor.toggle_layer_lock(&id);
                    }
                    if is_active {
                        let mut edited = name.clone();
                        let response = ui.text_edit_singleline(&mut edited);
                        if response.changed() {
                            app.editor.rename_layer(&id, &edited);
                        }
                    } else if ui.selectable_label(false, &name).clicked() {
                        app.editor.set_active_layer(&id);
                    }
                });
                if is_active {
                    ui.horizontal(|ui| {
                        ui.label("Opacity:");
                        let mut value = opacity;
                        if ui.add(Slider::new(&mut value, 0.0..=1.0)).changed() {
                            app.editor.set_layer_opacity(&id, value);
                        }
                    });
                }
                ui.separator();
            }
        });
}
