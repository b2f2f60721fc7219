//! Software rasteriser for the scene, used for export and flood-fill snapshots.
//!
//! Each layer is drawn into its own surface so erasers only punch through their own layer,
//! then composited with the layer's opacity over an optional background.

use tiny_skia::{
    BlendMode, FillRule, GradientStop, LineCap, LineJoin, LinearGradient, Paint, PathBuilder,
    Pixmap, PixmapPaint, Point, Rect, Shader, SpreadMode, Stroke, StrokeDash, Transform,
};

use crate::color::{hex_to_rgba, to_skia};
use crate::error::ExportError;
use crate::geometry::shapes::{self, Placement};
use crate::image::{RasterImage, decode_data_uri};
use crate::layer::Layer;
use crate::line::{Line, Tool};

pub mod text;

pub const SPARKLE_COLOR: &str = "#F59E0B";
const SPARKLE_DASH: [f32; 2] = [1.0, 10.0];
/// Rainbow stops from the first to the last point of a stroke.
pub const RAINBOW_STOPS: [(f32, [u8; 4]); 6] = [
    (0.0, [255, 0, 0, 255]),
    (0.2, [255, 255, 0, 255]),
    (0.4, [0, 128, 0, 255]),
    (0.6, [0, 0, 255, 255]),
    (0.8, [128, 0, 128, 255]),
    (1.0, [255, 0, 0, 255]),
];
pub const REFERENCE_ORIGIN: (f32, f32) = (10.0, 10.0);
pub const REFERENCE_HEIGHT: f32 = 150.0;

/// Text is drawn at three times the line size, or 24 px when the size is unusable.
pub fn text_font_px(size: f32) -> f32 {
    if size.is_finite() && size > 0.0 { size * 3.0 } else { 24.0 }
}

/// Stroke width a tool actually paints with.
pub fn stroke_width(line: &Line) -> f32 {
    match line.tool {
        Tool::Sparkles if line.size > 0.0 => line.size * 0.5,
        Tool::Sparkles => 5.0,
        _ => line.size.max(0.0),
    }
}

/// A tracing image drawn above the layers.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceOverlay<'a> {
    pub image: &'a RasterImage,
    pub opacity: f32,
}

/// Text stamped into the bottom-left corner of an export.
#[derive(Debug, Clone)]
pub struct Watermark {
    pub text: String,
    pub origin: (f32, f32),
    pub font_px: f32,
    pub color: [u8; 4],
    pub opacity: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SceneOptions<'a> {
    /// Output pixels per canvas unit
    pub pixel_ratio: f32,
    /// Solid background under all layers; transparent when `None`
    pub background: Option<[u8; 4]>,
    pub reference: Option<ReferenceOverlay<'a>>,
    pub watermark: Option<Watermark>,
}

fn surface(width: u32, height: u32) -> Result<Pixmap, ExportError> {
    Pixmap::new(width.max(1), height.max(1)).ok_or(ExportError::Surface { width, height })
}

fn scaled(length: f32, ratio: f32) -> u32 {
    (length * ratio).round().max(1.0) as u32
}

/// Composes every visible layer of a `canvas_width` x `canvas_height` scene.
pub fn render_scene(
    layers: &[Layer],
    canvas_width: f32,
    canvas_height: f32,
    options: &SceneOptions<'_>,
) -> Result<Pixmap, ExportError> {
    let ratio = if options.pixel_ratio > 0.0 { options.pixel_ratio } else { 1.0 };
    let (width, height) = (scaled(canvas_width, ratio), scaled(canvas_height, ratio));
    let mut scene = surface(width, height)?;
    if let Some(background) = options.background {
        scene.fill(to_skia(background));
    }

    let base = Transform::from_scale(ratio, ratio);
    for layer in layers.iter().filter(|layer| layer.visible) {
        let mut surface_for_layer = surface(width, height)?;
        draw_lines(&mut surface_for_layer, &layer.lines, base);
        let paint = PixmapPaint {
            opacity: layer.opacity.clamp(0.0, 1.0),
            ..PixmapPaint::default()
        };
        scene.draw_pixmap(0, 0, surface_for_layer.as_ref(), &paint, Transform::identity(), None);
    }

    if let Some(reference) = &options.reference {
        draw_reference(&mut scene, reference, base);
    }
    if let Some(watermark) = &options.watermark {
        let (x, y) = watermark.origin;
        text::draw_text(
            &mut scene,
            &watermark.text,
            watermark.font_px,
            watermark.color,
            watermark.opacity,
            base.pre_translate(x, y),
        );
    }
    Ok(scene)
}

/// One layer at 1:1 on a transparent surface, ignoring visibility and opacity.
pub fn render_layer(layer: &Layer, width: u32, height: u32) -> Result<Pixmap, ExportError> {
    let mut pixmap = surface(width, height)?;
    draw_lines(&mut pixmap, &layer.lines, Transform::identity());
    Ok(pixmap)
}

/// Straight RGBA bytes of a premultiplied surface.
pub fn unpremultiplied_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

fn draw_reference(scene: &mut Pixmap, reference: &ReferenceOverlay<'_>, base: Transform) {
    let image = reference.image;
    if image.height == 0 {
        return;
    }
    let Some(pixmap) = image.to_pixmap() else {
        return;
    };
    let scale = REFERENCE_HEIGHT / image.height as f32;
    let (x, y) = REFERENCE_ORIGIN;
    let transform = base.pre_translate(x, y).pre_scale(scale, scale);
    let paint = PixmapPaint {
        opacity: reference.opacity.clamp(0.0, 1.0),
        ..PixmapPaint::default()
    };
    scene.draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, None);
}

fn draw_lines(pixmap: &mut Pixmap, lines: &[Line], base: Transform) {
    for line in lines {
        if !draw_line(pixmap, line, base) {
            log::warn!("Skipping line {} with unusable {:?} geometry", line.id, line.tool);
        }
    }
}

/// Draws one line. Returns `false` when its geometry is unusable and it was skipped.
pub fn draw_line(pixmap: &mut Pixmap, line: &Line, base: Transform) -> bool {
    if !line.has_valid_geometry() {
        return false;
    }
    let transform = base.pre_concat(Placement::of(line).to_skia());
    match line.tool {
        Tool::Text => draw_text_line(pixmap, line, transform),
        Tool::Fill => draw_fill(pixmap, line, base),
        Tool::Rectangle => shapes::rectangle(line)
            .and_then(|b| Rect::from_xywh(b.x, b.y, b.width, b.height))
            .map(PathBuilder::from_rect)
            .is_some_and(|path| stroke_path(pixmap, &path, line, transform)),
        Tool::Circle => shapes::circle(line)
            .and_then(|(c, r)| PathBuilder::from_circle(c.x, c.y, r))
            .is_some_and(|path| stroke_path(pixmap, &path, line, transform)),
        Tool::Triangle | Tool::Star => shapes::polygon(line)
            .and_then(|vertices| closed_path(&vertices))
            .is_some_and(|path| stroke_path(pixmap, &path, line, transform)),
        _ => polyline(line).is_some_and(|path| stroke_path(pixmap, &path, line, transform)),
    }
}

fn polyline(line: &Line) -> Option<tiny_skia::Path> {
    let mut points = line.local_points();
    let first = points.next()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    let mut segments = 0;
    for p in points {
        pb.line_to(p.x, p.y);
        segments += 1;
    }
    if segments == 0 {
        pb.line_to(first.x, first.y);
    }
    pb.finish()
}

fn closed_path(vertices: &[egui::Pos2]) -> Option<tiny_skia::Path> {
    let (first, rest) = vertices.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

fn line_paint(line: &Line) -> Paint<'static> {
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    match line.tool {
        Tool::Eraser => {
            paint.set_color_rgba8(0, 0, 0, 255);
            paint.blend_mode = BlendMode::DestinationOut;
        }
        Tool::Sparkles => paint.set_color(to_skia(hex_to_rgba(SPARKLE_COLOR))),
        Tool::Rainbow => {
            paint.shader = rainbow_shader(line)
                .unwrap_or_else(|| Shader::SolidColor(to_skia(RAINBOW_STOPS[0].1)));
        }
        _ => paint.set_color(to_skia(hex_to_rgba(&line.color))),
    }
    paint
}

fn rainbow_shader(line: &Line) -> Option<Shader<'static>> {
    let mut points = line.local_points();
    let start = points.next()?;
    let end = points.last().unwrap_or(start);
    let stops = RAINBOW_STOPS
        .iter()
        .map(|(offset, rgba)| GradientStop::new(*offset, to_skia(*rgba)))
        .collect();
    LinearGradient::new(
        Point::from_xy(start.x, start.y),
        Point::from_xy(end.x, end.y),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
}

fn stroke_path(pixmap: &mut Pixmap, path: &tiny_skia::Path, line: &Line, transform: Transform) -> bool {
    let width = stroke_width(line);
    if !width.is_finite() {
        return false;
    }
    let mut stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    if line.tool == Tool::Sparkles {
        stroke.dash = StrokeDash::new(SPARKLE_DASH.to_vec(), 0.0);
    }
    pixmap.stroke_path(path, &line_paint(line), &stroke, transform, None);
    true
}

fn draw_text_line(pixmap: &mut Pixmap, line: &Line, transform: Transform) -> bool {
    let Some(content) = line.text.as_deref() else {
        return false;
    };
    text::draw_text(
        pixmap,
        content,
        text_font_px(line.size),
        hex_to_rgba(&line.color),
        1.0,
        transform,
    );
    true
}

fn draw_fill(pixmap: &mut Pixmap, line: &Line, base: Transform) -> bool {
    if let Some(uri) = &line.filled_image {
        return match decode_data_uri(uri) {
            Ok(image) => {
                let Some(stamp) = image.to_pixmap() else {
                    return false;
                };
                let offset = line.offset();
                pixmap.draw_pixmap(
                    0,
                    0,
                    stamp.as_ref(),
                    &PixmapPaint::default(),
                    base.pre_translate(offset.x, offset.y),
                    None,
                );
                true
            }
            Err(err) => {
                log::warn!("Fill stamp {} could not be decoded: {err}", line.id);
                false
            }
        };
    }
    let Some(area) = shapes::fill_area(line) else {
        return false;
    };
    let Some(rect) = Rect::from_xywh(area.x, area.y, area.width, area.height) else {
        return false;
    };
    let mut paint = Paint::default();
    paint.set_color(to_skia(hex_to_rgba(&line.color)));
    let offset = line.offset();
    pixmap.fill_path(
        &PathBuilder::from_rect(rect),
        &paint,
        FillRule::Winding,
        base.pre_translate(offset.x, offset.y),
        None,
    );
    true
}
