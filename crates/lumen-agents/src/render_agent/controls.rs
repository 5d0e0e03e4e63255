// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Mapping of user input onto camera, light and mode changes.

use lumen_core::platform::MouseButton;

/// Input tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSettings {
    /// Distance moved per key press, in world units.
    pub move_step: f32,
    /// Radians of rotation per pixel of mouse drag.
    pub mouse_sensitivity: f32,
    /// The button that must be held to look around.
    pub look_button: MouseButton,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            move_step: 0.1,
            mouse_sensitivity: 5e-3,
            look_button: MouseButton::Left,
        }
    }
}

/// What a key press does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    /// Move along the view direction by `sign * step`.
    MoveNormal(f32),
    /// Move along the camera tangent by `sign * step`.
    MoveTangent(f32),
    /// Cycle the intensity of the light in this slot.
    CycleLight(usize),
    /// Switch to the next render mode.
    NextRenderMode,
}

impl KeyAction {
    /// Looks up the action bound to a physical key code name.
    ///
    /// W/S move forward and back, A/D strafe left and right, 1/2/3 cycle the
    /// lights and Tab switches render mode.
    pub fn from_key_code(key_code: &str) -> Option<Self> {
        match key_code {
            "KeyW" => Some(KeyAction::MoveNormal(1.0)),
            "KeyS" => Some(KeyAction::MoveNormal(-1.0)),
            // The tangent points to the camera's left.
            "KeyA" => Some(KeyAction::MoveTangent(1.0)),
            "KeyD" => Some(KeyAction::MoveTangent(-1.0)),
            "Digit1" => Some(KeyAction::CycleLight(0)),
            "Digit2" => Some(KeyAction::CycleLight(1)),
            "Digit3" => Some(KeyAction::CycleLight(2)),
            "Tab" => Some(KeyAction::NextRenderMode),
            _ => None,
        }
    }

    /// Whether auto-repeated presses of a held key perform the action again.
    ///
    /// Movement keeps going while the key is held; toggles fire once per press.
    pub fn repeats_while_held(&self) -> bool {
        matches!(self, KeyAction::MoveNormal(_) | KeyAction::MoveTangent(_))
    }
}

/// Turns cursor positions into drag deltas.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    dragging: bool,
    last_position: Option<(f32, f32)>,
}

impl DragTracker {
    /// Creates a tracker with no button held and no known cursor position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts or stops dragging.
    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Whether the look button is held.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Records a cursor position and returns the movement since the previous one
    /// when dragging.
    pub fn move_to(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        let previous = self.last_position.replace((x, y));
        match previous {
            Some((px, py)) if self.dragging => Some((x - px, y - py)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(KeyAction::from_key_code("KeyW"), Some(KeyAction::MoveNormal(1.0)));
        assert_eq!(KeyAction::from_key_code("KeyD"), Some(KeyAction::MoveTangent(-1.0)));
        assert_eq!(KeyAction::from_key_code("Digit3"), Some(KeyAction::CycleLight(2)));
        assert_eq!(KeyAction::from_key_code("Tab"), Some(KeyAction::NextRenderMode));
        assert_eq!(KeyAction::from_key_code("KeyQ"), None);
        assert_eq!(KeyAction::from_key_code("Digit4"), None);
    }

    #[test]
    fn test_only_movement_repeats() {
        assert!(KeyAction::MoveNormal(-1.0).repeats_while_held());
        assert!(KeyAction::MoveTangent(1.0).repeats_while_held());
        assert!(!KeyAction::CycleLight(0).repeats_while_held());
        assert!(!KeyAction::NextRenderMode.repeats_while_held());
    }

    #[test]
    fn test_drag_reports_deltas_only_while_held() {
        let mut drag = DragTracker::new();
        assert_eq!(drag.move_to(10.0, 10.0), None);
        assert_eq!(drag.move_to(20.0, 15.0), None);

        drag.set_dragging(true);
        assert_eq!(drag.move_to(25.0, 5.0), Some((5.0, -10.0)));
        assert_eq!(drag.move_to(25.0, 5.0), Some((0.0, 0.0)));

        drag.set_dragging(false);
        assert_eq!(drag.move_to(0.0, 0.0), None);
    }

    #[test]
    fn test_first_position_while_dragging_has_no_delta() {
        let mut drag = DragTracker::new();
        drag.set_dragging(true);
        assert_eq!(drag.move_to(3.0, 4.0), None);
        assert_eq!(drag.move_to(4.0, 4.0), Some((1.0, 0.0)));
    }
}
