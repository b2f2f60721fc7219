use std::collections::hash_map::DefaultHasher;
use std::f32::consts::TAU;
use std::hash::{Hash, Hasher};

use eframe::egui::{self, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2};

use crate::color::hex_to_color32;
use crate::editor::Editor;
use crate::geometry::Bounds;
use crate::geometry::hit_testing::selection_bounds;
use crate::geometry::shapes::{self, Placement};
use crate::line::{Line, Tool};
use crate::render::{
    self, RAINBOW_STOPS, REFERENCE_HEIGHT, REFERENCE_ORIGIN, SPARKLE_COLOR, SceneOptions,
    stroke_width, text_font_px, unpremultiplied_rgba,
};
use crate::texture_manager::{TextureGenerationError, TextureManager};
use crate::viewport::Viewport;

const CIRCLE_SEGMENTS: usize = 48;
const SPARKLE_DASH: f32 = 1.0;
const SPARKLE_GAP: f32 = 10.0;
const SELECTION_COLOR: Color32 = Color32::from_rgb(0x63, 0x66, 0xf1);
const MIRROR_AXIS_COLOR: Color32 = Color32::from_rgb(0x94, 0xa3, 0xb8);
const ERASER_PREVIEW_COLOR: Color32 = Color32::from_rgba_premultiplied(120, 120, 120, 120);
const STAGE_COLOR: Color32 = Color32::from_gray(230);

/// Maps world coordinates into the screen rect the canvas widget occupies.
#[derive(Debug, Clone, Copy)]
pub struct CanvasView<'a> {
    pub origin: Pos2,
    pub viewport: &'a Viewport,
}

impl CanvasView<'_> {
    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        self.origin + self.viewport.world_to_screen(world).to_vec2()
    }

    pub fn rect_to_screen(&self, bounds: &Bounds) -> Rect {
        Rect::from_min_max(self.to_screen(bounds.min()), self.to_screen(bounds.max()))
    }

    pub fn scale(&self) -> f32 {
        self.viewport.scale()
    }
}

/// Paints the editor into an egui canvas.
///
/// Committed layers are rasterised once per scene revision and shown as a texture, so
/// erasers composite exactly as they do in exports. Everything transient (the stroke being
/// drawn, selection outlines, the brush cursor) is painted live with egui shapes.
#[derive(Debug)]
pub struct Renderer {
    textures: TextureManager,
    ctx: egui::Context,
}

impl Renderer {
    /// Creates a new renderer bound to the app's egui context
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_context(cc.egui_ctx.clone())
    }

    pub fn with_context(ctx: egui::Context) -> Self {
        Self {
            textures: TextureManager::new(4),
            ctx,
        }
    }

    /// Renders the current frame
    pub fn render(&mut self, painter: &Painter, rect: Rect, editor: &Editor) {
        self.textures.begin_frame();
        painter.rect_filled(rect, 0.0, STAGE_COLOR);

        let view = CanvasView {
            origin: rect.min,
            viewport: editor.viewport(),
        };
        let config = editor.config();
        let page = Bounds::new(0.0, 0.0, config.canvas_width, config.canvas_height);
        let page_rect = view.rect_to_screen(&page);

        match self.scene_texture(editor) {
            Ok(texture) => {
                painter.image(texture, page_rect, full_uv(), Color32::WHITE);
            }
            Err(err) => {
                log::warn!("Scene texture unavailable: {err}");
                painter.rect_filled(page_rect, 0.0, Color32::WHITE);
            }
        }
        self.paint_reference(painter, &view, editor);

        if let Some(offset) = editor.drag_offset() {
            if let Some(layer) = editor.document().active_layer() {
                for line in layer.lines.iter().filter(|l| editor.selection().contains(&l.id)) {
                    let mut ghost = line.clone();
                    ghost.x = Some(line.offset().x + offset.x);
                    ghost.y = Some(line.offset().y + offset.y);
                    paint_line(painter, &ghost, &view);
                }
            }
        }
        self.paint_selection(painter, &view, editor);

        if let Some(candidate) = editor.candidate() {
            paint_line(painter, candidate, &view);
        }
        if let Some(selection_box) = editor.selection_box() {
            let rect = view.rect_to_screen(&selection_box.bounds());
            painter.rect_filled(rect, 0.0, SELECTION_COLOR.gamma_multiply(0.1));
            painter.rect_stroke(rect, 0.0, Stroke::new(1.0, SELECTION_COLOR));
        }
        if editor.active_tool() == Tool::Mirror || editor.mirror_axis_visible() {
            let x = config.canvas_width / 2.0;
            let axis = [
                view.to_screen(pos2(x, 0.0)),
                view.to_screen(pos2(x, config.canvas_height)),
            ];
            painter.extend(Shape::dashed_line(
                &axis,
                Stroke::new(1.0, MIRROR_AXIS_COLOR),
                6.0,
                4.0,
            ));
        }
        self.paint_cursor(painter, &view, editor);
    }

    fn scene_texture(&mut self, editor: &Editor) -> Result<egui::TextureId, TextureGenerationError> {
        // Rasterise at roughly the on-screen density, in quarter steps so zooming does not
        // re-render every frame.
        let density = editor.viewport().scale() * self.ctx.pixels_per_point();
        let ratio = ((density * 4.0).round() / 4.0).clamp(0.25, 2.0);
        let mut hasher = DefaultHasher::new();
        editor.revision().hash(&mut hasher);
        ratio.to_bits().hash(&mut hasher);

        let config = editor.config();
        let (width, height) = (config.canvas_width, config.canvas_height);
        self.textures.get_or_create_texture(
            "scene",
            hasher.finish(),
            || {
                let options = SceneOptions {
                    pixel_ratio: ratio,
                    background: Some([255, 255, 255, 255]),
                    ..SceneOptions::default()
                };
                let pixmap = render::render_scene(editor.layers(), width, height, &options)?;
                let size = [pixmap.width() as usize, pixmap.height() as usize];
                Ok(egui::ColorImage::from_rgba_unmultiplied(
                    size,
                    &unpremultiplied_rgba(&pixmap),
                ))
            },
            &self.ctx,
        )
    }

    fn paint_reference(&mut self, painter: &Painter, view: &CanvasView<'_>, editor: &Editor) {
        let Some(reference) = editor.reference() else {
            return;
        };
        let image = &reference.image;
        if image.height == 0 {
            return;
        }
        let mut hasher = DefaultHasher::new();
        reference.data_uri.hash(&mut hasher);
        let texture = self.textures.get_or_create_texture(
            "reference",
            hasher.finish(),
            || Ok(image.to_color_image()),
            &self.ctx,
        );
        match texture {
            Ok(texture) => {
                let width = image.width as f32 * REFERENCE_HEIGHT / image.height as f32;
                let (x, y) = REFERENCE_ORIGIN;
                let rect = view.rect_to_screen(&Bounds::new(x, y, width, REFERENCE_HEIGHT));
                let tint = Color32::WHITE.gamma_multiply(reference.opacity.clamp(0.0, 1.0));
                painter.image(texture, rect, full_uv(), tint);
            }
            Err(err) => log::warn!("Reference texture unavailable: {err}"),
        }
    }

    fn paint_selection(&self, painter: &Painter, view: &CanvasView<'_>, editor: &Editor) {
        let Some(layer) = editor.document().active_layer() else {
            return;
        };
        let offset = editor.drag_offset().unwrap_or(Vec2::ZERO);
        for line in layer.lines.iter().filter(|l| editor.selection().contains(&l.id)) {
            let rect = view.rect_to_screen(&selection_bounds(line)).translate(offset * view.scale());
            painter.rect_stroke(rect, 2.0, Stroke::new(1.5, SELECTION_COLOR));
        }
    }

    fn paint_cursor(&self, painter: &Painter, view: &CanvasView<'_>, editor: &Editor) {
        let tool = editor.active_tool();
        if !tool.is_drawing() || editor.is_space_held() {
            return;
        }
        let Some(cursor) = editor.cursor() else {
            return;
        };
        let mut size = editor.brush_size();
        if tool == Tool::Eraser {
            size *= editor.config().eraser_size_multiplier;
        }
        painter.circle_stroke(
            view.to_screen(cursor),
            (size * view.scale() / 2.0).max(1.0),
            Stroke::new(1.0, Color32::from_gray(80)),
        );
    }
}

fn full_uv() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0))
}

/// Paints one line with egui shapes. Used for previews; committed lines go through the
/// rasteriser.
pub fn paint_line(painter: &Painter, line: &Line, view: &CanvasView<'_>) {
    if !line.has_valid_geometry() {
        return;
    }
    let placement = Placement::of(line);
    let place = |p: Pos2| view.to_screen(placement.apply(p));
    let mean_scale = (placement.scale.x.abs() + placement.scale.y.abs()) / 2.0;
    let width = stroke_width(line) * view.scale() * mean_scale;
    let color = hex_to_color32(&line.color);

    match line.tool {
        Tool::Text => {
            if let Some(text) = line.text.as_deref() {
                painter.text(
                    place(Pos2::ZERO),
                    egui::Align2::LEFT_TOP,
                    text,
                    FontId::proportional(text_font_px(line.size) * view.scale()),
                    color,
                );
            }
        }
        Tool::Fill => {
            if let Some(area) = shapes::fill_area(line) {
                let rect = Rect::from_min_max(place(area.min()), place(area.max()));
                painter.rect_filled(rect, 0.0, color);
            }
        }
        Tool::Rectangle => {
            if let Some(b) = shapes::rectangle(line) {
                let corners = [
                    b.min(),
                    pos2(b.max().x, b.min().y),
                    b.max(),
                    pos2(b.min().x, b.max().y),
                ];
                let points = corners.into_iter().map(place).collect();
                painter.add(Shape::closed_line(points, Stroke::new(width, color)));
            }
        }
        Tool::Circle => {
            if let Some((center, radius)) = shapes::circle(line) {
                let points = (0..CIRCLE_SEGMENTS)
                    .map(|i| {
                        let angle = TAU * i as f32 / CIRCLE_SEGMENTS as f32;
                        place(center + Vec2::angled(angle) * radius)
                    })
                    .collect();
                painter.add(Shape::closed_line(points, Stroke::new(width, color)));
            }
        }
        Tool::Triangle | Tool::Star => {
            if let Some(vertices) = shapes::polygon(line) {
                let points = vertices.into_iter().map(place).collect();
                painter.add(Shape::closed_line(points, Stroke::new(width, color)));
            }
        }
        Tool::Sparkles => {
            let points: Vec<Pos2> = line.local_points().map(place).collect();
            painter.extend(Shape::dashed_line(
                &points,
                Stroke::new(width, hex_to_color32(SPARKLE_COLOR)),
                SPARKLE_DASH * view.scale(),
                SPARKLE_GAP * view.scale(),
            ));
        }
        Tool::Rainbow => {
            let points: Vec<Pos2> = line.local_points().map(place).collect();
            let segments = points.len().saturating_sub(1).max(1);
            for (i, pair) in points.windows(2).enumerate() {
                let t = i as f32 / segments as f32;
                painter.line_segment([pair[0], pair[1]], Stroke::new(width, rainbow_at(t)));
            }
        }
        tool => {
            let points: Vec<Pos2> = line.local_points().map(place).collect();
            let color = if tool == Tool::Eraser { ERASER_PREVIEW_COLOR } else { color };
            if let [only] = points.as_slice() {
                painter.circle_filled(*only, width / 2.0, color);
            } else {
                painter.add(Shape::line(points, Stroke::new(width, color)));
            }
        }
    }
}

/// Colour of the rainbow gradient at `t` in `0..=1`.
pub fn rainbow_at(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    for pair in RAINBOW_STOPS.windows(2) {
        let ((start, a), (end, b)) = (pair[0], pair[1]);
        if t <= end {
            let local = if end > start { (t - start) / (end - start) } else { 0.0 };
            let mix = |i: usize| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * local).round() as u8;
            return Color32::from_rgb(mix(0), mix(1), mix(2));
        }
    }
    let [r, g, b, _] = RAINBOW_STOPS[RAINBOW_STOPS.len() - 1].1;
    Color32::from_rgb(r, g, b)
}
