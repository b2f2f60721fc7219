use egui::{Event, InputState, MouseWheelUnit, PointerButton, Pos2, Rect, TouchId, TouchPhase};

use super::InputEvent;

/// Points scrolled per wheel "line", matching what browsers report in pixel mode.
const LINE_SCROLL_POINTS: f32 = 40.0;

/// Converts raw egui input into the editor's [`InputEvent`]s.
///
/// Positions are made relative to the canvas rect, and wheel deltas follow the browser
/// convention (positive `y` scrolls down).
#[derive(Debug, Default)]
pub struct CanvasInputTranslator {
    last_pointer_pos: Option<Pos2>,
    inside: bool,
    held_buttons: Vec<PointerButton>,
    touches: Vec<(TouchId, Pos2)>,
}

impl CanvasInputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one frame of input. Key events are only forwarded when `keyboard_free` is set,
    /// i.e. no text field has focus.
    pub fn translate(
        &mut self,
        input: &InputState,
        canvas: Rect,
        keyboard_free: bool,
    ) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let local = |pos: Pos2| (pos - canvas.min).to_pos2();

        // Pointer position
        let hover = input.pointer.hover_pos();
        let now_inside = hover.is_some_and(|pos| canvas.contains(pos));
        if let Some(pos) = hover {
            if now_inside && Some(pos) != self.last_pointer_pos {
                events.push(InputEvent::PointerMove { pos: local(pos) });
            }
        }
        if self.inside && !now_inside {
            events.push(InputEvent::PointerLeave);
            self.held_buttons.clear();
        }
        self.inside = now_inside;
        self.last_pointer_pos = hover;

        // Buttons
        for button in [
            PointerButton::Primary,
            PointerButton::Secondary,
            PointerButton::Middle,
        ] {
            let Some(pos) = hover else { continue };
            if input.pointer.button_pressed(button) && now_inside {
                events.push(InputEvent::PointerDown {
                    pos: local(pos),
                    button,
                    modifiers: input.modifiers,
                });
                self.held_buttons.push(button);
            }
            if input.pointer.button_released(button) && self.held_buttons.contains(&button) {
                events.push(InputEvent::PointerUp {
                    pos: local(pos),
                    button,
                });
                self.held_buttons.retain(|held| *held != button);
            }
        }

        // Wheel, pinch, touches and keys
        let mut touches_changed = false;
        for event in &input.raw.events {
            match event {
                Event::MouseWheel {
                    unit,
                    delta,
                    modifiers,
                } if now_inside => {
                    let points = match unit {
                        MouseWheelUnit::Point => 1.0,
                        MouseWheelUnit::Line => LINE_SCROLL_POINTS,
                        MouseWheelUnit::Page => canvas.height(),
                    };
                    if let Some(pos) = hover {
                        events.push(InputEvent::Wheel {
                            pos: local(pos),
                            delta: -*delta * points,
                            modifiers: *modifiers,
                        });
                    }
                }
                Event::Zoom(factor) if now_inside && *factor != 1.0 => {
                    if let Some(pos) = hover {
                        let direction = if *factor > 1.0 { -1.0 } else { 1.0 };
                        events.push(InputEvent::Wheel {
                            pos: local(pos),
                            delta: egui::vec2(0.0, direction),
                            modifiers: egui::Modifiers::CTRL,
                        });
                    }
                }
                Event::Touch { id, phase, pos, .. } => {
                    touches_changed = true;
                    self.touches.retain(|(touch, _)| touch != id);
                    if matches!(phase, TouchPhase::Start | TouchPhase::Move) {
                        self.touches.push((*id, local(*pos)));
                    }
                }
                Event::Key {
                    key,
                    pressed,
                    repeat,
                    modifiers,
                    ..
                } if keyboard_free => {
                    events.push(if *pressed {
                        InputEvent::KeyDown {
                            key: *key,
                            modifiers: *modifiers,
                            repeat: *repeat,
                        }
                    } else {
                        InputEvent::KeyUp { key: *key }
                    });
                }
                _ => {}
            }
        }
        if touches_changed {
            events.push(InputEvent::Touch {
                contacts: self.touches.iter().map(|(_, pos)| *pos).collect(),
            });
        }

        events
    }
}
