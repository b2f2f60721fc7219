use egui::{Pos2, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

use crate::id_generator::generate_line_id;

/// Every tool the editor knows. Committed lines remember the tool that drew them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Select,
    /// Also reads the picker and generic shape tools, which leave plain polylines.
    #[default]
    #[serde(alias = "eyedropper", alias = "shape")]
    Brush,
    Eraser,
    Rainbow,
    Sparkles,
    Mirror,
    #[serde(alias = "bucket")]
    Fill,
    Text,
    Line,
    Rectangle,
    Circle,
    Triangle,
    Star,
}

impl Tool {
    pub const ALL: [Tool; 13] = [
        Tool::Select,
        Tool::Brush,
        Tool::Eraser,
        Tool::Rainbow,
        Tool::Sparkles,
        Tool::Mirror,
        Tool::Fill,
        Tool::Text,
        Tool::Line,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Triangle,
        Tool::Star,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Rainbow => "Rainbow",
            Tool::Sparkles => "Sparkles",
            Tool::Mirror => "Mirror",
            Tool::Fill => "Fill",
            Tool::Text => "Text",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Triangle => "Triangle",
            Tool::Star => "Star",
        }
    }

    /// Tools whose geometry is a 4-number drag diagonal `x1,y1,x2,y2`.
    pub fn is_shape(self) -> bool {
        matches!(
            self,
            Tool::Line | Tool::Rectangle | Tool::Circle | Tool::Triangle | Tool::Star
        )
    }

    /// Tools that append a point per pointer move.
    pub fn is_freehand(self) -> bool {
        matches!(
            self,
            Tool::Brush | Tool::Eraser | Tool::Rainbow | Tool::Sparkles | Tool::Mirror
        )
    }

    /// Tools that enter the drawing state on pointer-down.
    pub fn is_drawing(self) -> bool {
        self.is_freehand() || self.is_shape()
    }
}

/// A single drawable primitive. Despite the name this covers strokes, shapes, text and fills.
///
/// `points` is a flat `x,y` list in the line's local space; `x`/`y` is the offset of that
/// space in the layer, `rotation` (degrees) and `scale_x`/`scale_y` apply around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(default)]
    pub id: String,
    pub tool: Tool,
    #[serde(default)]
    pub points: Vec<f32>,
    pub color: String,
    #[serde(default)]
    pub size: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f32>,
}

impl Line {
    /// A line without an id yet; the document assigns one when it is added.
    pub fn new(tool: Tool, points: Vec<f32>, color: impl Into<String>, size: f32) -> Self {
        Self {
            id: String::new(),
            tool,
            points,
            color: color.into(),
            size,
            filled_image: None,
            x: None,
            y: None,
            text: None,
            rotation: None,
            scale_x: None,
            scale_y: None,
        }
    }

    pub fn new_text(text: impl Into<String>, anchor: Pos2, color: impl Into<String>, size: f32) -> Self {
        Self {
            text: Some(text.into()),
            x: Some(anchor.x),
            y: Some(anchor.y),
            ..Self::new(Tool::Text, Vec::new(), color, size)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Assigns a fresh id unless one is already present.
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = generate_line_id();
        }
    }

    pub fn offset(&self) -> Vec2 {
        vec2(self.x.unwrap_or(0.0), self.y.unwrap_or(0.0))
    }

    pub fn scale(&self) -> Vec2 {
        vec2(self.scale_x.unwrap_or(1.0), self.scale_y.unwrap_or(1.0))
    }

    /// Point pairs in local space. A trailing odd number is ignored.
    pub fn local_points(&self) -> impl Iterator<Item = Pos2> + '_ {
        self.points.chunks_exact(2).map(|p| pos2(p[0], p[1]))
    }

    /// The drag diagonal of a shape, if the line carries exactly four finite numbers.
    pub fn diagonal(&self) -> Option<(Pos2, Pos2)> {
        match self.points.as_slice() {
            [x1, y1, x2, y2] if [x1, y1, x2, y2].iter().all(|v| v.is_finite()) => {
                Some((pos2(*x1, *y1), pos2(*x2, *y2)))
            }
            _ => None,
        }
    }

    /// Whether the geometry satisfies the per-tool point invariant.
    pub fn has_valid_geometry(&self) -> bool {
        if self.points.len() % 2 != 0 {
            return false;
        }
        match self.tool {
            tool if tool.is_shape() => self.diagonal().is_some(),
            Tool::Fill if self.filled_image.is_none() => self.diagonal().is_some(),
            _ => true,
        }
    }

    /// Copy of this line reflected across the vertical line `x = width / 2`.
    pub fn mirrored(&self, width: f32) -> Self {
        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, v)| if i % 2 == 0 { width - v } else { *v })
            .collect();
        Self {
            id: String::new(),
            points,
            ..self.clone()
        }
    }
}

/// A partial update merged into an existing line. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinePatch {
    pub points: Option<Vec<f32>>,
    pub color: Option<String>,
    pub size: Option<f32>,
    pub text: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub rotation: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
}

impl LinePatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn transform(x: f32, y: f32, rotation: f32, scale_x: f32, scale_y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            rotation: Some(rotation),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            ..Default::default()
        }
    }

    pub fn apply(&self, line: &mut Line) {
        if let Some(points) = &self.points {
            line.points = points.clone();
        }
        if let Some(color) = &self.color {
            line.color = color.clone();
        }
        if let Some(size) = self.size {
            line.size = size;
        }
        if let Some(text) = &self.text {
            line.text = Some(text.clone());
        }
        if self.x.is_some() {
            line.x = self.x;
        }
        if self.y.is_some() {
            line.y = self.y;
        }
        if self.rotation.is_some() {
            line.rotation = self.rotation;
        }
        if self.scale_x.is_some() {
            line.scale_x = self.scale_x;
        }
        if self.scale_y.is_some() {
            line.scale_y = self.scale_y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_and_skips_absent_fields() {
        let mut line = Line::new(Tool::Rectangle, vec![1.0, 2.0, 3.0, 4.0], "#ff0000", 2.0)
            .with_id("line-a");
        line.scale_x = Some(2.0);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["tool"], "rectangle");
        assert_eq!(json["scaleX"], 2.0);
        assert!(json.get("filledImage").is_none());
        assert!(json.get("rotation").is_none());
    }

    #[test]
    fn shape_geometry_needs_four_numbers() {
        let good = Line::new(Tool::Circle, vec![0.0, 0.0, 5.0, 5.0], "#000000", 1.0);
        let bad = Line::new(Tool::Circle, vec![0.0, 0.0], "#000000", 1.0);
        let odd = Line::new(Tool::Brush, vec![0.0, 0.0, 1.0], "#000000", 1.0);
        assert!(good.has_valid_geometry());
        assert!(!bad.has_valid_geometry());
        assert!(!odd.has_valid_geometry());
    }

    #[test]
    fn legacy_tool_names_still_load() {
        let tools: Vec<Tool> =
            serde_json::from_str(r#"["bucket", "eyedropper", "shape", "star"]"#).unwrap();
        assert_eq!(tools, vec![Tool::Fill, Tool::Brush, Tool::Brush, Tool::Star]);
        assert!(serde_json::from_str::<Tool>(r#""lasso""#).is_err());
    }

    #[test]
    fn fill_without_points_needs_an_image() {
        let mut stamp = Line::new(Tool::Fill, Vec::new(), "#ff0000", 0.0);
        assert!(!stamp.has_valid_geometry());
        stamp.filled_image = Some("data:image/png;base64,AAAA".to_string());
        assert!(stamp.has_valid_geometry());
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut line = Line::new(Tool::Brush, vec![0.0, 0.0], "#000000", 3.0);
        LinePatch::position(10.0, 20.0).apply(&mut line);
        assert_eq!(line.offset(), vec2(10.0, 20.0));
        assert_eq!(line.rotation, None);
        assert_eq!(line.size, 3.0);
    }

    #[test]
    fn mirrored_reflects_only_x() {
        let line = Line::new(Tool::Mirror, vec![10.0, 1.0, 30.0, 2.0], "#000000", 3.0);
        assert_eq!(line.mirrored(100.0).points, vec![90.0, 1.0, 70.0, 2.0]);
    }
}
