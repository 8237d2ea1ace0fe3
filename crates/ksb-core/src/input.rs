use crate::camera::DragMode;
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// DOM `MouseEvent.button` numbering.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

/// A pointer-down as seen by the engine, in client (CSS px) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    pub pointer_id: i32,
    pub position: Vec2,
    pub button: PointerButton,
    pub shift: bool,
}

impl PointerInput {
    pub fn new(pointer_id: i32, x: f32, y: f32) -> Self {
        Self {
            pointer_id,
            position: Vec2::new(x, y),
            button: PointerButton::Primary,
            shift: false,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    /// Secondary button or Shift pans; anything else orbits.
    pub fn drag_mode(&self) -> DragMode {
        if self.button == PointerButton::Secondary || self.shift {
            DragMode::Pan
        } else {
            DragMode::Orbit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_button_and_modifier() {
        let p = PointerInput::new(1, 0.0, 0.0);
        assert_eq!(p.drag_mode(), DragMode::Orbit);
        assert_eq!(p.with_shift(true).drag_mode(), DragMode::Pan);
        assert_eq!(
            p.with_button(PointerButton::from_dom(2)).drag_mode(),
            DragMode::Pan
        );
        assert_eq!(
            p.with_button(PointerButton::Middle).drag_mode(),
            DragMode::Orbit
        );
    }
}
