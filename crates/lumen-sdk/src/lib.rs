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

//! # Lumen SDK
//!
//! Opens the window, creates the wgpu device and drives a
//! [`FrameOrchestrator`] from the winit event loop.

#![warn(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use lumen_agents::render_agent::{FrameOrchestrator, OrchestratorSettings};
use lumen_core::math::Extent2D;
use lumen_core::renderer::{FrameStatus, GraphicsDevice};
use lumen_core::Stopwatch;
use lumen_infra::platform::window::physical_size;
use lumen_infra::{translate_winit_input, WgpuDevice, WgpuGraphicsContext, WinitWindowBuilder};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

/// How often the frame rate is logged.
const FPS_LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Window parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSettings {
    /// The window title.
    pub title: String,
    /// Initial inner width, in logical pixels.
    pub width: u32,
    /// Initial inner height, in logical pixels.
    pub height: u32,
    /// Wait for vertical blank when presenting.
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Lumen".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Everything [`Engine::run`] needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSettings {
    /// The window.
    pub window: WindowSettings,
    /// The scene and renderer.
    pub orchestrator: OrchestratorSettings,
}

/// Counts presented frames and logs the rate once per interval.
#[derive(Debug)]
struct FpsCounter {
    stopwatch: Stopwatch,
    frames: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            stopwatch: Stopwatch::new(),
            frames: 0,
        }
    }

    fn frame_presented(&mut self) {
        self.frames += 1;
        let elapsed = self.stopwatch.elapsed();
        if elapsed >= FPS_LOG_INTERVAL {
            let fps = self.frames as f32 / elapsed.as_secs_f32();
            log::info!("{fps:.1} FPS ({:.2} ms/frame)", 1000.0 / fps);
            self.stopwatch = Stopwatch::new();
            self.frames = 0;
        }
    }
}

struct Running {
    orchestrator: FrameOrchestrator,
    window: Arc<Window>,
    fps: FpsCounter,
}

struct EngineState {
    settings: EngineSettings,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl EngineState {
    fn initialize(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let window_settings = &self.settings.window;
        let window = WinitWindowBuilder::new()
            .with_title(window_settings.title.clone())
            .with_dimensions(window_settings.width, window_settings.height)
            .build(event_loop)
            .context("Failed to create the window")?;

        let size = physical_size(&window);
        let context = pollster::block_on(WgpuGraphicsContext::new(
            Arc::clone(&window),
            size,
            window_settings.vsync,
        ))
        .context("Failed to initialize the graphics context")?;
        log::info!("Rendering with {}", context.adapter_name());

        let device: Arc<dyn GraphicsDevice> = Arc::new(WgpuDevice::new(context));
        let orchestrator = FrameOrchestrator::new(device, self.settings.orchestrator.clone())?;

        Ok(Running {
            orchestrator,
            window,
            fps: FpsCounter::new(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for EngineState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        log::info!("Application resumed. Initializing window and renderer...");
        match self.initialize(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if running.window.id() != id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let size = Extent2D::new(size.width, size.height);
                if let Err(e) = running.orchestrator.resize(size) {
                    self.fail(event_loop, anyhow::Error::new(e).context("Resize failed"));
                }
            }
            WindowEvent::RedrawRequested => match running.orchestrator.render_frame() {
                Ok(FrameStatus::Ready) => running.fps.frame_presented(),
                Ok(FrameStatus::Skipped) => {}
                Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("Rendering failed")),
            },
            other => {
                if let Some(input) = translate_winit_input(&other) {
                    log::trace!("Input event: {input:?}");
                    running.orchestrator.handle_input(&input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}

/// The application entry point.
pub struct Engine;

impl Engine {
    /// Opens the window and renders until it is closed.
    ///
    /// Blocks the calling thread. Returns the first initialization or rendering error.
    pub fn run(settings: EngineSettings) -> Result<()> {
        log::info!("Lumen: starting...");
        let event_loop = EventLoop::new()?;
        let mut state = EngineState {
            settings,
            running: None,
            error: None,
        };
        event_loop.run_app(&mut state)?;

        if let Some(running) = state.running.take() {
            log::info!(
                "Shutting down after {} frames",
                running.orchestrator.frame_count()
            );
        }
        match state.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
