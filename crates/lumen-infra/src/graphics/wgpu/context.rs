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

use std::sync::Arc;

use anyhow::{anyhow, Result};
use lumen_core::math::Extent2D;
use winit::window::Window;

/// Holds the core wgpu state objects required for rendering to one window.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    pub(crate) surface: wgpu::Surface<'static>,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    adapter_name: String,
}

impl WgpuGraphicsContext {
    /// Asynchronously initializes the graphics context for a window.
    ///
    /// ## Arguments
    /// * `window` - The window to present to. The surface keeps it alive.
    /// * `size` - The initial physical size of the window surface.
    /// * `vsync` - Whether presentation waits for vertical blank.
    ///
    /// ## Returns
    /// * `Result<Self>` - The initialized context, or why no adapter or device could be used.
    pub async fn new(window: Arc<Window>, size: Extent2D, vsync: bool) -> Result<Self> {
        log::info!("Initializing wgpu graphics context...");

        // --- 1. Instance and Surface ---
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(|e| anyhow!("Failed to create surface: {e}"))?;
        log::debug!("wgpu surface created for the window.");

        // --- 2. Adapter ---
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("No suitable graphics adapter: {e}"))?;
        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?}, Type: {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        // --- 3. Logical Device and Command Queue ---
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Lumen Logical Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {e}"))?;
        log::info!("Logical device and command queue created.");

        device.on_uncaptured_error(Box::new(|e| {
            log::error!("wgpu uncaptured error: {e:?}");
        }));

        // --- 4. Configure Surface ---
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;
        if !surface_format.is_srgb() {
            log::warn!("No sRGB surface format available, using {surface_format:?}");
        }

        let present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|m| matches!(m, wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate))
                .unwrap_or(wgpu::PresentMode::Fifo) // Fifo is guaranteed to be supported
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "Surface configured: {}x{} {:?} ({:?})",
            surface_config.width,
            surface_config.height,
            surface_format,
            present_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            adapter_name: adapter_info.name,
        })
    }

    /// Reconfigures the surface (swapchain) when the window is resized.
    /// Zero sizes, as reported for minimized windows, are ignored.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            log::info!("Resizing surface configuration to {new_width}x{new_height}");
            self.surface_config.width = new_width;
            self.surface_config.height = new_height;
            self.reconfigure();
        } else {
            log::warn!("Ignoring resize request to zero dimensions: {new_width}x{new_height}");
        }
    }

    /// Applies the current configuration again, after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// The size of the swapchain.
    pub fn size(&self) -> Extent2D {
        Extent2D::new(self.surface_config.width, self.surface_config.height)
    }

    /// The format of the swapchain images.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// The name of the adapter in use.
    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }
}
