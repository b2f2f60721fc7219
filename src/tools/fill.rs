use egui::Pos2;

use crate::error::ExportError;
use crate::fill::flood_fill_rgba;
use crate::color::hex_to_rgba;
use crate::image::encode_png_data_uri;
use crate::layer::Layer;
use crate::line::{Line, Tool};
use crate::render::{render_layer, unpremultiplied_rgba};

/// The fill marker committed by [`FillStrategy::CanvasRect`](crate::fill::FillStrategy):
/// a solid rectangle over the whole canvas.
pub fn canvas_fill(color: &str, canvas_width: f32, canvas_height: f32) -> Line {
    let mut line = Line::new(
        Tool::Fill,
        vec![0.0, 0.0, canvas_width, canvas_height],
        color,
        0.0,
    );
    line.x = Some(0.0);
    line.y = Some(0.0);
    line
}

/// Flood fills a snapshot of `layer` from `point` and returns the painted pixels as an image
/// stamp, or `None` if the click changed nothing.
///
/// The stamp only carries the newly painted pixels, so committing it never duplicates the
/// strokes already on the layer. The line itself has no points: once the image is
/// stripped it draws nothing rather than falling back to a canvas rect.
pub fn flood_stamp(
    layer: &Layer,
    canvas_width: u32,
    canvas_height: u32,
    point: Pos2,
    color: &str,
    tolerance: u8,
) -> Result<Option<Line>, ExportError> {
    let snapshot = render_layer(layer, canvas_width, canvas_height)?;
    let before = unpremultiplied_rgba(&snapshot);
    let mut after = before.clone();
    let fill = hex_to_rgba(color);
    let painted = flood_fill_rgba(
        &mut after,
        canvas_width as usize,
        canvas_height as usize,
        point.x,
        point.y,
        fill,
        tolerance,
    );
    if painted == 0 {
        return Ok(None);
    }

    let stamp: Vec<u8> = before
        .chunks_exact(4)
        .zip(after.chunks_exact(4))
        .flat_map(|(old, new)| if old == new { [0; 4] } else { fill })
        .collect();
    let uri = encode_png_data_uri(canvas_width, canvas_height, &stamp)?;
    log::debug!("Flood fill painted {painted} pixels");

    let mut line = Line::new(Tool::Fill, Vec::new(), color, 0.0);
    line.x = Some(0.0);
    line.y = Some(0.0);
    line.filled_image = Some(uri);
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::decode_data_uri;
    use egui::pos2;

    #[test]
    fn canvas_fill_spans_canvas() {
        let line = canvas_fill("#abcdef", 1200.0, 800.0);
        assert_eq!(line.points, vec![0.0, 0.0, 1200.0, 800.0]);
        assert_eq!(line.size, 0.0);
        assert_eq!((line.x, line.y), (Some(0.0), Some(0.0)));
    }

    #[test]
    fn stamp_contains_only_the_enclosed_region() {
        let mut layer = Layer::background();
        layer.add_line(Line::new(Tool::Brush, vec![10.0, 0.0, 10.0, 20.0], "#000000", 2.0));
        let line = flood_stamp(&layer, 20, 20, pos2(2.0, 2.0), "#ff0000", 30)
            .unwrap()
            .unwrap();
        assert!(line.points.is_empty());
        assert!(line.has_valid_geometry());
        let image = decode_data_uri(line.filled_image.as_deref().unwrap()).unwrap();
        let at = |x: usize, y: usize| &image.rgba[(y * 20 + x) * 4..(y * 20 + x) * 4 + 4];
        assert_eq!(at(2, 2), &[255, 0, 0, 255]);
        assert_eq!(at(15, 2)[3], 0);
    }
}
