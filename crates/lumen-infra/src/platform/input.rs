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

//! Translation of winit window events into engine [`InputEvent`]s.

use lumen_core::platform::{InputEvent, MouseButton};
use winit::event::{
    ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::keyboard::PhysicalKey;

/// Translates a `WindowEvent` into an [`InputEvent`].
///
/// Returns `None` for events that are not user input (resize, focus, redraw...).
/// Auto-repeated key presses are forwarded with `repeat: true`.
pub fn translate_winit_input(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => translate_key(event),
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::MouseMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button);
            Some(match state {
                ElementState::Pressed => InputEvent::MouseButtonPressed { button },
                ElementState::Released => InputEvent::MouseButtonReleased { button },
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (delta_x, delta_y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
            };
            (delta_x != 0.0 || delta_y != 0.0)
                .then_some(InputEvent::MouseWheelScrolled { delta_x, delta_y })
        }
        _ => None,
    }
}

fn translate_key(event: &KeyEvent) -> Option<InputEvent> {
    key_input(event.physical_key, event.state, event.repeat)
}

fn key_input(physical_key: PhysicalKey, state: ElementState, repeat: bool) -> Option<InputEvent> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };
    let key_code = format!("{code:?}");
    Some(match state {
        ElementState::Pressed => InputEvent::KeyPressed { key_code, repeat },
        ElementState::Released => InputEvent::KeyReleased { key_code },
    })
}

fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, TouchPhase};
    use winit::keyboard::{KeyCode, NativeKeyCode};

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(map_mouse_button(WinitMouseButton::Back), MouseButton::Other(3));
        assert_eq!(map_mouse_button(WinitMouseButton::Other(9)), MouseButton::Other(9));

        let pressed = WindowEvent::MouseInput {
            device_id: DeviceId::dummy(),
            state: ElementState::Pressed,
            button: WinitMouseButton::Left,
        };
        assert_eq!(
            translate_winit_input(&pressed),
            Some(InputEvent::MouseButtonPressed {
                button: MouseButton::Left
            })
        );
    }

    #[test]
    fn test_key_presses_keep_repeat_flag() {
        let w = PhysicalKey::Code(KeyCode::KeyW);
        assert_eq!(
            key_input(w, ElementState::Pressed, false),
            Some(InputEvent::key_pressed("KeyW"))
        );
        assert_eq!(
            key_input(w, ElementState::Pressed, true),
            Some(InputEvent::key_repeated("KeyW"))
        );
        assert_eq!(
            key_input(PhysicalKey::Code(KeyCode::Digit1), ElementState::Released, false),
            Some(InputEvent::KeyReleased {
                key_code: "Digit1".to_string()
            })
        );
        assert_eq!(
            key_input(
                PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
                ElementState::Pressed,
                false
            ),
            None
        );
    }

    #[test]
    fn test_cursor_moves() {
        let moved = WindowEvent::CursorMoved {
            device_id: DeviceId::dummy(),
            position: PhysicalPosition::new(12.5, 40.0),
        };
        assert_eq!(
            translate_winit_input(&moved),
            Some(InputEvent::MouseMoved { x: 12.5, y: 40.0 })
        );
    }

    #[test]
    fn test_zero_scroll_is_dropped() {
        let still = WindowEvent::MouseWheel {
            device_id: DeviceId::dummy(),
            delta: MouseScrollDelta::LineDelta(0.0, 0.0),
            phase: TouchPhase::Moved,
        };
        assert_eq!(translate_winit_input(&still), None);

        let scrolled = WindowEvent::MouseWheel {
            device_id: DeviceId::dummy(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -3.0)),
            phase: TouchPhase::Moved,
        };
        assert_eq!(
            translate_winit_input(&scrolled),
            Some(InputEvent::MouseWheelScrolled {
                delta_x: 0.0,
                delta_y: -3.0
            })
        );
    }

    #[test]
    fn test_window_events_are_not_input() {
        assert_eq!(translate_winit_input(&WindowEvent::Focused(true)), None);
        assert_eq!(translate_winit_input(&WindowEvent::CloseRequested), None);
        assert_eq!(
            translate_winit_input(&WindowEvent::Resized(winit::dpi::PhysicalSize::new(8, 8))),
            None
        );
    }
}
