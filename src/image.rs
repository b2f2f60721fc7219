//! Decoded raster images and `data:` URI conversion.
//!
//! Fill stamps and the reference image travel as `data:image/png;base64,...` strings; the
//! renderers need straight RGBA pixels.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{DecodeError, ExportError};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Straight (non-premultiplied) RGBA pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn size(&self) -> egui::Vec2 {
        egui::vec2(self.width as f32, self.height as f32)
    }

    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(
            [self.width as usize, self.height as usize],
            &self.rgba,
        )
    }

    /// Premultiplied copy for drawing with tiny-skia.
    pub fn to_pixmap(&self) -> Option<tiny_skia::Pixmap> {
        let mut pixmap = tiny_skia::Pixmap::new(self.width, self.height)?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(self.rgba.chunks_exact(4)) {
            *dst = tiny_skia::ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Some(pixmap)
    }
}

/// Decodes any image format the `image` crate understands.
pub fn decode_bytes(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    log::debug!("Decoded {width}x{height} image");
    Ok(RasterImage::new(width, height, decoded.into_raw()))
}

/// Decodes a base64 `data:` URI of any image type.
pub fn decode_data_uri(uri: &str) -> Result<RasterImage, DecodeError> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or(DecodeError::NotDataUri)?;
    let bytes = STANDARD.decode(payload.trim())?;
    decode_bytes(&bytes)
}

/// Encodes raw bytes of a dropped file as a data URI, keeping its MIME type.
pub fn bytes_to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Encodes straight RGBA pixels as PNG bytes.
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut bytes),
        rgba,
        width,
        height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )?;
    Ok(bytes)
}

pub fn encode_png_data_uri(width: u32, height: u32, rgba: &[u8]) -> Result<String, ExportError> {
    let png = encode_png(width, height, rgba)?;
    Ok(format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(png)))
}
