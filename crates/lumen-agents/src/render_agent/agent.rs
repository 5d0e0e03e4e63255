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

//! Defines the `FrameOrchestrator`, the agent responsible for the rendering subsystem.

use std::sync::Arc;

use anyhow::Context;
use lumen_core::camera::Camera;
use lumen_core::luminance::AdaptationSettings;
use lumen_core::math::{Extent2D, Mat4, Vec3};
use lumen_core::mesh::generate_sphere;
use lumen_core::platform::InputEvent;
use lumen_core::renderer::{
    ColorTarget, FrameStatus, GraphicsDevice, MeshDescriptor, OwnedMesh, OwnedRenderTarget,
    PointLight, RenderError, RenderMode, RenderTargetDescriptor, ResourceError, SceneProgram,
    TextureFormat,
};
use lumen_core::utils::timer::FrameClock;
use lumen_lanes::render_lane::{
    ExtractedMesh, ExtractedView, LitForwardLane, LuminanceAdaptationPipeline, LuminanceReport,
    RenderLane, RenderWorld,
};

use super::controls::{DragTracker, InputSettings, KeyAction};
use super::scene::{ring_lights, SceneSettings};

/// Format of the off-screen scene target in [`RenderMode::Pbr`].
pub const HDR_FORMAT: TextureFormat = TextureFormat::Rgba16Float;

/// Format of the depth buffer.
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Everything the orchestrator is configured with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrchestratorSettings {
    /// Scene content and camera start.
    pub scene: SceneSettings,
    /// Input tunables.
    pub input: InputSettings,
    /// Luminance adaptation tunables.
    pub adaptation: AdaptationSettings,
    /// The initial render mode.
    pub render_mode: RenderMode,
}

/// Size-dependent targets, recreated on resize.
#[derive(Debug)]
struct FrameTargets {
    hdr: OwnedRenderTarget,
    depth: OwnedRenderTarget,
}

impl FrameTargets {
    fn allocate(device: &Arc<dyn GraphicsDevice>, size: Extent2D) -> Result<Self, ResourceError> {
        let hdr = OwnedRenderTarget::new(
            device,
            &RenderTargetDescriptor::new("HDR Scene Target", size, HDR_FORMAT),
        )?;
        let depth = OwnedRenderTarget::new(
            device,
            &RenderTargetDescriptor::new("Depth Target", size, DEPTH_FORMAT),
        )?;
        Ok(Self { hdr, depth })
    }
}

/// Owns the scene and sequences every frame.
///
/// A frame runs `begin -> scene -> luminance pipeline -> present`. In the debug render
/// modes the scene goes straight to the back buffer and the luminance pipeline is
/// skipped.
#[derive(Debug)]
pub struct FrameOrchestrator {
    device: Arc<dyn GraphicsDevice>,
    scene: SceneSettings,
    input: InputSettings,
    camera: Camera,
    lights: Vec<PointLight>,
    render_mode: RenderMode,
    sphere: OwnedMesh,
    environment: OwnedMesh,
    targets: FrameTargets,
    viewport: Extent2D,
    luminance: LuminanceAdaptationPipeline,
    lane: LitForwardLane,
    world: RenderWorld,
    clock: FrameClock,
    drag: DragTracker,
    last_report: Option<LuminanceReport>,
    frame_count: u64,
}

impl FrameOrchestrator {
    /// Builds the meshes, targets and luminance chain for the current surface size.
    pub fn new(device: Arc<dyn GraphicsDevice>, settings: OrchestratorSettings) -> anyhow::Result<Self> {
        let OrchestratorSettings {
            scene,
            input,
            adaptation,
            render_mode,
        } = settings;

        let camera = Camera::new(scene.camera_position, scene.camera_direction)
            .context("Camera direction must be finite, non-zero and not vertical")?;

        let sphere = upload_sphere(&device, "Lit Sphere", scene.sphere_radius, &scene, true)?;
        let environment = upload_sphere(&device, "Environment Sphere", 1.0, &scene, false)?;

        let viewport = device.surface_size();
        if viewport.is_empty() {
            anyhow::bail!(
                "Cannot render to an empty surface ({}x{})",
                viewport.width,
                viewport.height
            );
        }
        let targets =
            FrameTargets::allocate(&device, viewport).context("Failed to create frame targets")?;
        let luminance = LuminanceAdaptationPipeline::new(Arc::clone(&device), viewport, adaptation)
            .context("Failed to create the luminance adaptation pipeline")?;

        log::info!(
            "FrameOrchestrator created: {}x{} viewport, mode {:?}",
            viewport.width,
            viewport.height,
            render_mode
        );

        Ok(Self {
            device,
            lights: ring_lights(scene.light_radius, scene.light_height),
            scene,
            input,
            camera,
            render_mode,
            sphere,
            environment,
            targets,
            viewport,
            luminance,
            lane: LitForwardLane::new(),
            world: RenderWorld::new(),
            clock: FrameClock::new(),
            drag: DragTracker::new(),
            last_report: None,
            frame_count: 0,
        })
    }

    /// Routes a user input event into the camera, the lights or the render mode.
    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyPressed { key_code, repeat } => {
                match KeyAction::from_key_code(key_code) {
                    Some(action) if !*repeat || action.repeats_while_held() => {
                        self.apply_key_action(action)
                    }
                    _ => {}
                }
            }
            InputEvent::MouseButtonPressed { button } if *button == self.input.look_button => {
                self.drag.set_dragging(true);
            }
            InputEvent::MouseButtonReleased { button } if *button == self.input.look_button => {
                self.drag.set_dragging(false);
            }
            InputEvent::MouseMoved { x, y } => {
                if let Some((dx, dy)) = self.drag.move_to(*x, *y) {
                    let sensitivity = self.input.mouse_sensitivity;
                    self.camera.rotate_horizontal(dx * sensitivity);
                    self.camera.rotate_vertical(dy * sensitivity);
                }
            }
            _ => {}
        }
    }

    fn apply_key_action(&mut self, action: KeyAction) {
        let step = self.input.move_step;
        match action {
            KeyAction::MoveNormal(sign) => {
                self.camera.move_normal(sign * step);
                self.camera.position_clip(&self.scene.borders);
            }
            KeyAction::MoveTangent(sign) => {
                self.camera.move_tangent(sign * step);
                self.camera.position_clip(&self.scene.borders);
            }
            KeyAction::CycleLight(slot) => match self.lights.get_mut(slot) {
                Some(light) => {
                    light.cycle_intensity();
                    log::debug!("Light {slot} intensity is now {}", light.intensity());
                }
                None => log::trace!("No light in slot {slot}"),
            },
            KeyAction::NextRenderMode => {
                self.render_mode = self.render_mode.next();
                log::info!("Render mode: {:?}", self.render_mode);
            }
        }
    }

    /// Follows a surface resize. Empty sizes (minimized windows) are ignored.
    ///
    /// If a target cannot be allocated the previous targets are kept, and the next
    /// [`render_frame`](Self::render_frame) retries for the surface size.
    pub fn resize(&mut self, size: Extent2D) -> Result<(), RenderError> {
        if size.is_empty() || size == self.viewport {
            return Ok(());
        }
        self.device.resize_surface(size)?;
        self.rebuild_targets(size)
    }

    fn rebuild_targets(&mut self, size: Extent2D) -> Result<(), RenderError> {
        // Nothing is replaced until every allocation succeeded.
        let targets = FrameTargets::allocate(&self.device, size)?;
        self.luminance.resize(size)?;
        self.targets = targets;
        self.viewport = size;
        log::info!("Viewport resized to {}x{}", size.width, size.height);
        Ok(())
    }

    /// Renders and presents one frame.
    ///
    /// Returns [`FrameStatus::Skipped`] when no back buffer could be acquired; nothing
    /// is drawn and the adaptation state is untouched in that case.
    pub fn render_frame(&mut self) -> Result<FrameStatus, RenderError> {
        let surface = self.device.surface_size();
        if !surface.is_empty() && surface != self.viewport {
            log::warn!(
                "Targets are {}x{} but the surface is {}x{}, reallocating",
                self.viewport.width,
                self.viewport.height,
                surface.width,
                surface.height
            );
            self.rebuild_targets(surface)?;
        }
        if self.device.begin_frame()? == FrameStatus::Skipped {
            log::debug!("Frame skipped, surface was reconfigured");
            return Ok(FrameStatus::Skipped);
        }

        self.extract();

        let hdr = self.targets.hdr.id();
        let depth = self.targets.depth.id();
        if self.render_mode.uses_luminance_pipeline() {
            self.lane
                .render(&self.world, self.device.as_ref(), ColorTarget::Offscreen(hdr), depth)?;
            let measured = self.luminance.measure(hdr)?;
            let dt = self.clock.sample_dt();
            let report = self.luminance.apply(hdr, measured, dt, ColorTarget::Surface)?;
            self.last_report = Some(report);
        } else {
            self.lane
                .render(&self.world, self.device.as_ref(), ColorTarget::Surface, depth)?;
            self.clock.sample_dt();
        }

        self.device.present()?;
        self.frame_count += 1;
        Ok(FrameStatus::Ready)
    }

    /// Fills the render world from the current scene state.
    fn extract(&mut self) {
        self.world.clear();
        let position = self.camera.position();
        self.world.view = ExtractedView {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(self.viewport.aspect_ratio()),
            position,
        };
        self.world.lights.extend_from_slice(&self.lights);
        self.world.ambient = self.scene.ambient;
        self.world.mode = self.render_mode;
        self.world.clear_color = self.scene.clear_color;

        // The sky goes first, the lit sphere is drawn over it.
        let sky_transform = Mat4::from_translation(position)
            * Mat4::from_scale(Vec3::splat(self.scene.environment_scale));
        self.world.meshes.push(ExtractedMesh {
            mesh: self.environment.id(),
            program: SceneProgram::Environment,
            transform: sky_transform,
            surface: self.scene.surface,
        });
        self.world.meshes.push(ExtractedMesh {
            mesh: self.sphere.id(),
            program: SceneProgram::Lit,
            transform: Mat4::IDENTITY,
            surface: self.scene.surface,
        });
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The point lights, in slot order.
    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// The active render mode.
    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// The current viewport size.
    pub fn viewport(&self) -> Extent2D {
        self.viewport
    }

    /// The luminance pipeline.
    pub fn luminance(&self) -> &LuminanceAdaptationPipeline {
        &self.luminance
    }

    /// The luminance figures of the last tone-mapped frame.
    pub fn last_report(&self) -> Option<LuminanceReport> {
        self.last_report
    }

    /// Number of frames presented so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Index counts of the lit sphere and the sky sphere.
    pub fn mesh_index_counts(&self) -> (u32, u32) {
        (self.sphere.index_count(), self.environment.index_count())
    }
}

fn upload_sphere(
    device: &Arc<dyn GraphicsDevice>,
    label: &str,
    radius: f32,
    scene: &SceneSettings,
    lit: bool,
) -> anyhow::Result<OwnedMesh> {
    let tessellation = if lit {
        scene.sphere_tessellation
    } else {
        scene.environment_tessellation
    };
    // The sky is seen from inside, so its triangles face inward.
    let mesh = generate_sphere(radius, tessellation.n_theta, tessellation.n_phi, lit, true)
        .with_context(|| format!("Invalid tessellation for {label}"))?;
    let mesh = OwnedMesh::new(
        device,
        &MeshDescriptor {
            label: Some(label),
            vertices: mesh.vertices(),
            indices: mesh.indices(),
        },
    )
    .with_context(|| format!("Failed to upload {label}"))?;
    Ok(mesh)
}
