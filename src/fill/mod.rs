//! Scan-line flood fill over an RGBA pixel buffer.
//!
//! The buffer is row-major, 4 bytes per pixel. The fill compares every candidate pixel
//! against the colour originally sampled at the start point and keeps a visited bitmap, so
//! it terminates and never re-enters a span no matter how the tolerance and the fill colour
//! relate. Reading the full buffer is `O(width * height)`; on very large canvases that is
//! the dominant cost.

use serde::{Deserialize, Serialize};

use crate::color::hex_to_rgba;

pub const DEFAULT_TOLERANCE: u8 = 30;

/// How the fill tool turns a click into a committed primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillStrategy {
    /// Commit a filled rectangle covering the whole canvas. Small, persistable, authoritative.
    #[default]
    CanvasRect,
    /// Flood fill a raster snapshot of the active layer and commit it as an image stamp.
    FloodRaster,
}

fn channels_within(a: &[u8], b: &[u8; 4], tolerance: u8) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| x.abs_diff(*y) <= tolerance)
}

/// Fills the region connected to `(start_x, start_y)` with `fill_color_hex`.
///
/// See [`flood_fill_rgba`].
pub fn flood_fill(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    start_x: f32,
    start_y: f32,
    fill_color_hex: &str,
    tolerance: u8,
) -> usize {
    flood_fill_rgba(
        pixels,
        width,
        height,
        start_x,
        start_y,
        hex_to_rgba(fill_color_hex),
        tolerance,
    )
}

/// Fills the region connected to the start pixel whose colour is within `tolerance` (per
/// channel, inclusive) of the start pixel's colour. Returns the number of pixels painted.
///
/// The start coordinates are floored and clamped into the buffer. When the start pixel
/// already matches `fill` within `tolerance` nothing is touched.
pub fn flood_fill_rgba(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    start_x: f32,
    start_y: f32,
    fill: [u8; 4],
    tolerance: u8,
) -> usize {
    if width == 0 || height == 0 || pixels.len() < width * height * 4 {
        log::warn!(
            "Flood fill skipped: buffer of {} bytes does not cover {}x{}",
            pixels.len(),
            width,
            height
        );
        return 0;
    }
    if !start_x.is_finite() || !start_y.is_finite() {
        return 0;
    }

    let sx = (start_x.floor().max(0.0) as usize).min(width - 1);
    let sy = (start_y.floor().max(0.0) as usize).min(height - 1);
    let index = |x: usize, y: usize| (y * width + x) * 4;

    let start_pos = index(sx, sy);
    let mut start_color = [0u8; 4];
    start_color.copy_from_slice(&pixels[start_pos..start_pos + 4]);

    if channels_within(&start_color, &fill, tolerance) {
        return 0;
    }

    let mut visited = vec![false; width * height];
    let matches = |pixels: &[u8], visited: &[bool], x: usize, y: usize| {
        let pos = index(x, y);
        !visited[y * width + x] && channels_within(&pixels[pos..pos + 4], &start_color, tolerance)
    };

    let mut painted = 0;
    let mut stack = vec![(sx, sy)];

    while let Some((x, y)) = stack.pop() {
        if !matches(pixels, &visited, x, y) {
            continue;
        }

        // Walk up to the top of this column's span.
        let mut top = y;
        while top > 0 && matches(pixels, &visited, x, top - 1) {
            top -= 1;
        }

        let mut span_left = false;
        let mut span_right = false;
        let mut row = top;
        while row < height && matches(pixels, &visited, x, row) {
            let pos = index(x, row);
            pixels[pos..pos + 4].copy_from_slice(&fill);
            visited[row * width + x] = true;
            painted += 1;

            if x > 0 {
                if matches(pixels, &visited, x - 1, row) {
                    if !span_left {
                        stack.push((x - 1, row));
                        span_left = true;
                    }
                } else {
                    span_left = false;
                }
            }

            if x + 1 < width {
                if matches(pixels, &visited, x + 1, row) {
                    if !span_right {
                        stack.push((x + 1, row));
                        span_right = true;
                    }
                } else {
                    span_right = false;
                }
            }

            row += 1;
        }
    }

    log::debug!("Flood fill painted {painted} pixels from ({sx}, {sy})");
    painted
}
