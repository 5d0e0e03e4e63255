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

//! Creation of the application window.

use std::sync::Arc;

use lumen_core::math::Extent2D;
use winit::{dpi::LogicalSize, error::OsError, event_loop::ActiveEventLoop, window::Window};

/// A builder for the renderer's window.
#[derive(Debug, Clone)]
pub struct WinitWindowBuilder {
    title: String,
    size: Extent2D,
}

impl WinitWindowBuilder {
    /// Creates a builder with the default title and a 1024x768 size.
    pub fn new() -> Self {
        Self {
            title: "Lumen".to_string(),
            size: Extent2D::new(1024, 768),
        }
    }

    /// Sets the title of the window to be built.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial inner size, in logical pixels.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.size = Extent2D::new(width, height);
        self
    }

    /// Builds the window on the active event loop.
    ///
    /// # Errors
    /// Returns an `OsError` if the underlying `winit` window creation fails.
    pub fn build(self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>, OsError> {
        log::info!(
            "Building window with title: '{}' and size: {}x{}",
            self.title,
            self.size.width,
            self.size.height
        );
        let attributes = Window::default_attributes()
            .with_title(self.title)
            .with_inner_size(LogicalSize::new(self.size.width, self.size.height))
            .with_visible(true);
        let window = event_loop.create_window(attributes)?;
        log::info!("Winit window created successfully (id: {:?}).", window.id());
        Ok(Arc::new(window))
    }
}

impl Default for WinitWindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The physical inner size of `window`.
pub fn physical_size(window: &Window) -> Extent2D {
    let size = window.inner_size();
    Extent2D::new(size.width, size.height)
}
