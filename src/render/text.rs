use std::fs;
use std::sync::OnceLock;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rusttype::{Font, Scale, point};
use tiny_skia::{Pixmap, PixmapPaint, Transform};

fn system_sans() -> Option<Font<'static>> {
    let mut db = Database::new();
    db.load_system_fonts();
    let query = Query {
        families: &[Family::SansSerif],
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = db.query(&query)?;
    let face = db.face(id)?;
    let bytes = match &face.source {
        fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => fs::read(path).ok()?,
        fontdb::Source::Binary(bytes) => bytes.as_ref().as_ref().to_vec(),
    };
    Font::try_from_vec_and_index(bytes, face.index)
}

/// The first proportional font egui ships with.
fn bundled_sans() -> Option<Font<'static>> {
    let definitions = egui::FontDefinitions::default();
    let name = definitions
        .families
        .get(&egui::FontFamily::Proportional)?
        .first()?;
    let data = definitions.font_data.get(name)?;
    Font::try_from_vec_and_index(data.font.to_vec(), data.index)
}

/// Sans-serif font used for text lines and the export watermark.
pub fn sans_font() -> Option<&'static Font<'static>> {
    static FONT: OnceLock<Option<Font<'static>>> = OnceLock::new();
    FONT.get_or_init(|| {
        let font = system_sans().or_else(|| {
            log::info!("No system sans-serif font found, using the bundled one");
            bundled_sans()
        });
        if font.is_none() {
            log::warn!("No usable font; text will not be rasterised");
        }
        font
    })
    .as_ref()
}

/// Rasterises `text` with its top-left corner at the origin of `transform` and composites
/// it onto `target`. Newlines start a new line. Returns `false` if nothing could be drawn.
pub fn draw_text(
    target: &mut Pixmap,
    text: &str,
    font_px: f32,
    rgba: [u8; 4],
    opacity: f32,
    transform: Transform,
) -> bool {
    let Some(font) = sans_font() else {
        return false;
    };
    let Some(glyphs) = rasterise(font, text, font_px, rgba) else {
        return false;
    };
    let paint = PixmapPaint {
        opacity,
        ..PixmapPaint::default()
    };
    target.draw_pixmap(0, 0, glyphs.as_ref(), &paint, transform, None);
    true
}

fn rasterise(font: &Font<'static>, text: &str, font_px: f32, rgba: [u8; 4]) -> Option<Pixmap> {
    if !font_px.is_finite() || font_px <= 0.0 || text.is_empty() {
        return None;
    }
    let scale = Scale::uniform(font_px);
    let metrics = font.v_metrics(scale);
    let line_height = metrics.ascent - metrics.descent + metrics.line_gap;

    let positioned: Vec<_> = text
        .lines()
        .enumerate()
        .flat_map(|(row, line)| {
            let baseline = metrics.ascent + row as f32 * line_height;
            font.layout(line, scale, point(0.0, baseline))
        })
        .collect();

    let width = positioned
        .iter()
        .filter_map(|glyph| glyph.pixel_bounding_box())
        .map(|bb| bb.max.x)
        .max()
        .unwrap_or(0)
        .max(1) as u32;
    let rows = text.lines().count().max(1) as f32;
    let height = (rows * line_height).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height)?;
    let [r, g, b, a] = rgba;
    let pixels = pixmap.pixels_mut();
    for glyph in &positioned {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = gx as i32 + bb.min.x;
            let py = gy as i32 + bb.min.y;
            if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                return;
            }
            let alpha = (coverage * a as f32).round().clamp(0.0, 255.0) as u8;
            let index = py as usize * width as usize + px as usize;
            if alpha > pixels[index].alpha() {
                pixels[index] = tiny_skia::ColorU8::from_rgba(r, g, b, alpha).premultiply();
            }
        });
    }
    Some(pixmap)
}
