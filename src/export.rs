//! Flattened PNG export and the portable project format.
//!
//! Export never mutates the scene: selection decorations are simply not part of the render
//! pass, and the watermark only exists in the produced image.

use chrono::{DateTime, TimeZone};

use crate::error::{ExportError, ProjectError};
use crate::image::encode_png;
use crate::layer::Layer;
use crate::render::{self, ReferenceOverlay, SceneOptions, Watermark, unpremultiplied_rgba};

pub const DEFAULT_WATERMARK_NAME: &str = "Pixel Studio";
pub const WATERMARK_FONT_PX: f32 = 14.0;
pub const WATERMARK_COLOR: [u8; 4] = [0x66, 0x66, 0x66, 0xff];
pub const WATERMARK_OPACITY: f32 = 0.7;
const WATERMARK_MARGIN: f32 = 10.0;
const WATERMARK_BOTTOM_OFFSET: f32 = 30.0;
const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// `"<name> • 05 Mar 2025 14:07"`, falling back to the app name when no user is set.
pub fn watermark_text<Tz: TimeZone>(user_name: Option<&str>, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let name = user_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_WATERMARK_NAME);
    format!("{name} \u{2022} {}", at.format("%d %b %Y %H:%M"))
}

/// Everything an export needs besides the layers.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest<'a> {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub pixel_ratio: f32,
    /// Watermark text; `None` exports without one
    pub watermark: Option<String>,
    pub reference: Option<ReferenceOverlay<'a>>,
}

/// Renders the visible layers over white and encodes them as PNG bytes.
pub fn export_png(layers: &[Layer], request: &ExportRequest<'_>) -> Result<Vec<u8>, ExportError> {
    let watermark = request.watermark.as_ref().map(|text| Watermark {
        text: text.clone(),
        origin: (
            WATERMARK_MARGIN,
            request.canvas_height - WATERMARK_BOTTOM_OFFSET,
        ),
        font_px: WATERMARK_FONT_PX,
        color: WATERMARK_COLOR,
        opacity: WATERMARK_OPACITY,
    });
    let options = SceneOptions {
        pixel_ratio: request.pixel_ratio,
        background: Some(BACKGROUND),
        reference: request.reference,
        watermark,
    };
    let pixmap = render::render_scene(layers, request.canvas_width, request.canvas_height, &options)?;
    let png = encode_png(pixmap.width(), pixmap.height(), &unpremultiplied_rgba(&pixmap))?;
    log::info!(
        "Exported {}x{} PNG ({} bytes)",
        pixmap.width(),
        pixmap.height(),
        png.len()
    );
    Ok(png)
}

/// Serialises the layer list as the portable JSON project format.
pub fn save_project_json(layers: &[Layer]) -> Result<String, ExportError> {
    let json = serde_json::to_string(layers)?;
    log::info!("Saved project with {} layers", layers.len());
    Ok(json)
}

/// Parses a project file. The top level must be an array of layers.
///
/// Only parsing happens here; semantic checks run when the layers are loaded into a
/// document.
pub fn parse_project_json(json: &str) -> Result<Vec<Layer>, ProjectError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(ProjectError::invalid("expected an array of layers"));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn watermark_uses_name_date_and_time() {
        let at = Utc.with_ymd_and_hms(2025, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(watermark_text(Some("Ana"), &at), "Ana \u{2022} 05 Mar 2025 14:07");
        assert_eq!(
            watermark_text(None, &at),
            "Pixel Studio \u{2022} 05 Mar 2025 14:07"
        );
        assert!(watermark_text(Some("  "), &at).starts_with(DEFAULT_WATERMARK_NAME));
    }

    #[test]
    fn project_must_be_an_array() {
        assert!(matches!(
            parse_project_json(r#"{"layers": []}"#),
            Err(ProjectError::Invalid { .. })
        ));
        assert!(matches!(parse_project_json("not json"), Err(ProjectError::Json(_))));
        let layers = parse_project_json(r#"[{"id":"a","name":"A","lines":[]}]"#).unwrap();
        assert_eq!(layers[0].id, "a");
    }

    #[test]
    fn export_is_double_resolution_png() {
        let request = ExportRequest {
            canvas_width: 30.0,
            canvas_height: 20.0,
            pixel_ratio: 2.0,
            watermark: None,
            reference: None,
        };
        let png = export_png(&[Layer::background()], &request).unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!((image.width(), image.height()), (60, 40));
    }
}
