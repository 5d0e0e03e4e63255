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

//! Backend-agnostic user input events.
//!
//! The windowing layer translates its native events into [`InputEvent`]s; the frame
//! orchestrator only ever sees these.

/// An engine-internal representation of a user input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A keyboard key was pressed, or is held and auto-repeating.
    KeyPressed {
        /// The physical key code name, e.g. `"KeyW"` or `"Digit1"`.
        key_code: String,
        /// `true` for presses generated by holding the key down.
        repeat: bool,
    },
    /// A keyboard key was released.
    KeyReleased {
        /// The physical key code name.
        key_code: String,
    },
    /// A mouse button was pressed.
    MouseButtonPressed {
        /// The mouse button that was pressed.
        button: MouseButton,
    },
    /// A mouse button was released.
    MouseButtonReleased {
        /// The mouse button that was released.
        button: MouseButton,
    },
    /// The mouse cursor moved.
    MouseMoved {
        /// The new x-coordinate of the cursor, in physical pixels.
        x: f32,
        /// The new y-coordinate of the cursor, in physical pixels.
        y: f32,
    },
    /// The mouse wheel was scrolled.
    MouseWheelScrolled {
        /// Horizontal scroll, in lines.
        delta_x: f32,
        /// Vertical scroll, in lines.
        delta_y: f32,
    },
}

impl InputEvent {
    /// Shorthand for a first [`InputEvent::KeyPressed`] event.
    pub fn key_pressed(key_code: impl Into<String>) -> Self {
        InputEvent::KeyPressed {
            key_code: key_code.into(),
            repeat: false,
        }
    }

    /// Shorthand for an auto-repeated [`InputEvent::KeyPressed`] event.
    pub fn key_repeated(key_code: impl Into<String>) -> Self {
        InputEvent::KeyPressed {
            key_code: key_code.into(),
            repeat: true,
        }
    }
}

/// An engine-internal representation of a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// Another mouse button, identified by a numeric code.
    Other(u16),
}
