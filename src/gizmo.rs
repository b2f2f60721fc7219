use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2};

use crate::geometry::shapes::effective_rotation;
use crate::line::Line;

const HANDLE_SIZE: f32 = 8.0;
const ROTATION_HANDLE_OFFSET: f32 = 30.0;
const HANDLE_COLOR: Color32 = Color32::from_rgb(0x63, 0x66, 0xf1);
const HANDLE_HOVER_COLOR: Color32 = Color32::from_rgb(0xa5, 0xb4, 0xfc);
const HANDLE_STROKE_WIDTH: f32 = 2.0;
const MIN_SCALE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GizmoHandle {
    ScaleTopLeft,
    ScaleTopRight,
    ScaleBottomLeft,
    ScaleBottomRight,
    Rotate,
}

/// Position, rotation (degrees) and scale of one line, as edited by the gizmo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTransform {
    pub offset: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl LineTransform {
    pub fn of(line: &Line) -> Self {
        Self {
            offset: line.offset(),
            rotation: effective_rotation(line),
            scale: line.scale(),
        }
    }
}

impl Default for LineTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::splat(1.0),
        }
    }
}

/// Rotate and scale handles around a single selected line.
///
/// Works in screen space; `view_scale` converts pointer deltas back into world units.
/// When a drag on a handle ends, the finished transform is left in `completed_transform`
/// for the caller to commit.
#[derive(Debug, Clone)]
pub struct TransformGizmo {
    bounds: Rect,
    active_handle: Option<GizmoHandle>,
    initial_transform: LineTransform,
    initial_pointer_pos: Option<Pos2>,
    pub completed_transform: Option<LineTransform>,
}

impl TransformGizmo {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Updates the bounds of the gizmo to match the transformed shape
    pub fn update_bounds(&mut self, new_bounds: Rect) {
        if self.active_handle.is_none() {
            self.bounds = new_bounds;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_handle.is_some()
    }

    /// Whether a screen position lands on one of the handles.
    pub fn hit(&self, pos: Pos2) -> bool {
        if self.bounds == Rect::NOTHING {
            return false;
        }
        let center = self.bounds.center();
        [
            self.bounds.left_top(),
            self.bounds.right_top(),
            self.bounds.left_bottom(),
            self.bounds.right_bottom(),
            Pos2::new(center.x, self.bounds.min.y - ROTATION_HANDLE_OFFSET),
        ]
        .into_iter()
        .any(|handle| Rect::from_center_size(handle, Vec2::splat(HANDLE_SIZE * 1.5)).contains(pos))
    }

    pub fn update(&mut self, ui: &mut Ui, transform: &mut LineTransform, view_scale: f32) -> bool {
        let mut changed = false;
        let painter = ui.painter().clone();

        painter.rect_stroke(self.bounds, 0.0, Stroke::new(1.0, HANDLE_COLOR));

        let center = self.bounds.center();
        let rotation_pos = Pos2::new(center.x, self.bounds.min.y - ROTATION_HANDLE_OFFSET);
        let handles = [
            (GizmoHandle::ScaleTopLeft, self.bounds.left_top()),
            (GizmoHandle::ScaleTopRight, self.bounds.right_top()),
            (GizmoHandle::ScaleBottomLeft, self.bounds.left_bottom()),
            (GizmoHandle::ScaleBottomRight, self.bounds.right_bottom()),
            (GizmoHandle::Rotate, rotation_pos),
        ];

        painter.line_segment(
            [Pos2::new(center.x, self.bounds.min.y), rotation_pos],
            Stroke::new(1.0, HANDLE_COLOR),
        );

        for (handle_type, pos) in handles {
            let handle_rect = Rect::from_center_size(pos, Vec2::splat(HANDLE_SIZE));
            let handle_response = ui.allocate_rect(handle_rect, Sense::drag());
            let is_active = self.active_handle == Some(handle_type);
            let color = if handle_response.hovered() || is_active {
                HANDLE_HOVER_COLOR
            } else {
                HANDLE_COLOR
            };

            match handle_type {
                GizmoHandle::Rotate => {
                    painter.circle_stroke(pos, HANDLE_SIZE / 2.0, Stroke::new(HANDLE_STROKE_WIDTH, color));
                }
                _ => {
                    painter.rect_filled(handle_rect, 0.0, color);
                }
            }

            if handle_response.drag_started() {
                self.active_handle = Some(handle_type);
                self.initial_transform = *transform;
                self.initial_pointer_pos = handle_response.interact_pointer_pos();
            }

            let (Some(handle), Some(initial_pos)) = (self.active_handle, self.initial_pointer_pos)
            else {
                continue;
            };
            if handle != handle_type {
                continue;
            }

            if let Some(current_pos) = handle_response.interact_pointer_pos() {
                match handle {
                    GizmoHandle::Rotate => {
                        let initial_vec = initial_pos - center;
                        let current_vec = current_pos - center;
                        // Screen y points down, so a positive delta is clockwise like the
                        // stored rotation.
                        let mut angle_delta = current_vec.angle() - initial_vec.angle();
                        if angle_delta > std::f32::consts::PI {
                            angle_delta -= std::f32::consts::TAU;
                        } else if angle_delta < -std::f32::consts::PI {
                            angle_delta += std::f32::consts::TAU;
                        }

                        let radius = ROTATION_HANDLE_OFFSET * 0.8;
                        let start = initial_vec.angle();
                        let arc: Vec<Pos2> = (0..=30)
                            .map(|i| {
                                let t = i as f32 / 30.0;
                                center + Vec2::angled(start + t * angle_delta) * radius
                            })
                            .collect();
                        painter.add(Shape::line(arc, Stroke::new(1.0, HANDLE_HOVER_COLOR)));

                        transform.rotation =
                            self.initial_transform.rotation + angle_delta.to_degrees();
                        changed = true;
                    }
                    corner => {
                        let fixed_point = match corner {
                            GizmoHandle::ScaleTopLeft => self.bounds.right_bottom(),
                            GizmoHandle::ScaleTopRight => self.bounds.left_bottom(),
                            GizmoHandle::ScaleBottomLeft => self.bounds.right_top(),
                            _ => self.bounds.left_top(),
                        };
                        let initial_vec = initial_pos - fixed_point;
                        let current_vec = current_pos - fixed_point;
                        let ratio = |current: f32, initial: f32| {
                            if initial.abs() < f32::EPSILON { 1.0 } else { current / initial }
                        };
                        let mut scale = Vec2::new(
                            ratio(current_vec.x, initial_vec.x),
                            ratio(current_vec.y, initial_vec.y),
                        );
                        // Shift keeps the aspect ratio
                        if ui.input(|i| i.modifiers.shift) {
                            let uniform = scale.x.abs().max(scale.y.abs());
                            scale = Vec2::new(uniform * scale.x.signum(), uniform * scale.y.signum());
                        }

                        transform.scale = (self.initial_transform.scale * scale).max(Vec2::splat(MIN_SCALE));
                        transform.rotation = self.initial_transform.rotation;

                        // Keep the opposite corner where it was
                        let grown = self.bounds.size() * (scale.max(Vec2::splat(MIN_SCALE)) - Vec2::splat(1.0));
                        let shift = match corner {
                            GizmoHandle::ScaleTopLeft => -grown,
                            GizmoHandle::ScaleTopRight => Vec2::new(0.0, -grown.y),
                            GizmoHandle::ScaleBottomLeft => Vec2::new(-grown.x, 0.0),
                            _ => Vec2::ZERO,
                        };
                        transform.offset = self.initial_transform.offset + shift / view_scale.max(f32::EPSILON);
                        changed = true;
                    }
                }
            }

            if handle_response.drag_stopped() {
                self.completed_transform = Some(*transform);
                self.active_handle = None;
                self.initial_pointer_pos = None;
            }
        }

        changed
    }
}

impl Default for TransformGizmo {
    fn default() -> Self {
        Self {
            bounds: Rect::NOTHING,
            active_handle: None,
            initial_transform: LineTransform::default(),
            initial_pointer_pos: None,
            completed_transform: None,
        }
    }
}
