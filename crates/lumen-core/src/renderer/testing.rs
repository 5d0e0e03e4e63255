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

//! An in-memory [`GraphicsDevice`] that records every call.
//!
//! Available to this crate's tests and, through the `test-utils` feature, to the
//! tests of downstream crates. It tracks live resources and enforces the same
//! contracts as the wgpu backend: passes only inside a frame, IDs must be live, and
//! texels are only read back from 1x1 targets.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::math::Extent2D;
use crate::renderer::api::*;
use crate::renderer::error::{RenderError, ResourceError};
use crate::renderer::traits::GraphicsDevice;

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// `create_render_target`.
    CreateRenderTarget {
        /// The assigned ID.
        id: RenderTargetId,
        /// The requested size.
        size: Extent2D,
        /// The requested format.
        format: TextureFormat,
    },
    /// `destroy_render_target`.
    DestroyRenderTarget(RenderTargetId),
    /// `create_mesh`.
    CreateMesh {
        /// The assigned ID.
        id: MeshId,
        /// Number of indices uploaded.
        index_count: usize,
    },
    /// `destroy_mesh`.
    DestroyMesh(MeshId),
    /// `create_readback`.
    CreateReadback(ReadbackId),
    /// `destroy_readback`.
    DestroyReadback(ReadbackId),
    /// `resize_surface`.
    ResizeSurface(Extent2D),
    /// `begin_frame`.
    BeginFrame,
    /// `draw_scene`.
    DrawScene {
        /// The pass label.
        label: String,
        /// The color output.
        target: ColorTarget,
        /// The programs of the draws, in order.
        programs: Vec<SceneProgram>,
        /// The render mode index from the frame uniforms.
        render_mode: u32,
    },
    /// `draw_fullscreen`.
    DrawFullscreen {
        /// The program.
        program: FullscreenProgram,
        /// The sampled texture.
        source: RenderTargetId,
        /// The color output.
        target: ColorTarget,
        /// Size of the output, the surface size for [`ColorTarget::Surface`].
        target_size: Extent2D,
        /// The program parameters.
        uniforms: FullscreenUniforms,
    },
    /// `read_texel`.
    ReadTexel {
        /// The 1x1 source.
        source: RenderTargetId,
    },
    /// `present`.
    Present,
}

/// A recording test double for [`GraphicsDevice`].
#[derive(Debug)]
pub struct RecordingDevice {
    calls: Mutex<Vec<DeviceCall>>,
    next_id: AtomicUsize,
    targets: Mutex<HashMap<usize, (Extent2D, TextureFormat)>>,
    meshes: Mutex<HashMap<usize, usize>>,
    readbacks: Mutex<HashMap<usize, ()>>,
    surface_size: Mutex<Extent2D>,
    texel: Mutex<[f32; 4]>,
    next_frame_status: Mutex<FrameStatus>,
    in_frame: AtomicBool,
    target_budget: Mutex<Option<usize>>,
}

impl RecordingDevice {
    /// Creates a device whose surface has the given size.
    pub fn new(surface_size: Extent2D) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            targets: Mutex::new(HashMap::new()),
            meshes: Mutex::new(HashMap::new()),
            readbacks: Mutex::new(HashMap::new()),
            surface_size: Mutex::new(surface_size),
            texel: Mutex::new([0.0; 4]),
            next_frame_status: Mutex::new(FrameStatus::Ready),
            in_frame: AtomicBool::new(false),
            target_budget: Mutex::new(None),
        }
    }

    /// Sets the value every subsequent `read_texel` returns in its red channel.
    pub fn set_texel_value(&self, value: f32) {
        *self.texel.lock().unwrap() = [value, value, value, 1.0];
    }

    /// Sets what the next `begin_frame` calls report.
    pub fn set_frame_status(&self, status: FrameStatus) {
        *self.next_frame_status.lock().unwrap() = status;
    }

    /// Limits how many more render targets can be created before creation fails
    /// with [`ResourceError::BackendError`]. `None` lifts the limit.
    pub fn set_render_target_budget(&self, budget: Option<usize>) {
        *self.target_budget.lock().unwrap() = budget;
    }

    /// A snapshot of the calls recorded so far.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Forgets the calls recorded so far. Live resources are kept.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Number of render targets, meshes and readbacks currently alive.
    pub fn live_resource_count(&self) -> usize {
        self.targets.lock().unwrap().len()
            + self.meshes.lock().unwrap().len()
            + self.readbacks.lock().unwrap().len()
    }

    /// Size and format of a live render target.
    pub fn render_target_info(&self, id: RenderTargetId) -> Option<(Extent2D, TextureFormat)> {
        self.targets.lock().unwrap().get(&id.0).copied()
    }

    fn record(&self, call: DeviceCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn allocate_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn ensure_in_frame(&self) -> Result<(), RenderError> {
        if self.in_frame.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(RenderError::NoFrameInFlight)
        }
    }

    fn target_size(&self, target: ColorTarget) -> Result<Extent2D, ResourceError> {
        match target {
            ColorTarget::Surface => Ok(*self.surface_size.lock().unwrap()),
            ColorTarget::Offscreen(id) => self
                .render_target_info(id)
                .map(|(size, _)| size)
                .ok_or(ResourceError::NotFound {
                    kind: "render target",
                    id: id.0,
                }),
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetId, ResourceError> {
        if descriptor.size.is_empty() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "render target {:?} has zero size",
                descriptor.label
            )));
        }
        if let Some(budget) = self.target_budget.lock().unwrap().as_mut() {
            if *budget == 0 {
                return Err(ResourceError::BackendError(format!(
                    "out of memory creating {:?}",
                    descriptor.label
                )));
            }
            *budget -= 1;
        }
        let id = RenderTargetId(self.allocate_id());
        self.targets
            .lock()
            .unwrap()
            .insert(id.0, (descriptor.size, descriptor.format));
        self.record(DeviceCall::CreateRenderTarget {
            id,
            size: descriptor.size,
            format: descriptor.format,
        });
        Ok(id)
    }

    fn destroy_render_target(&self, id: RenderTargetId) -> Result<(), ResourceError> {
        self.targets
            .lock()
            .unwrap()
            .remove(&id.0)
            .ok_or(ResourceError::NotFound {
                kind: "render target",
                id: id.0,
            })?;
        self.record(DeviceCall::DestroyRenderTarget(id));
        Ok(())
    }

    fn create_mesh(&self, descriptor: &MeshDescriptor<'_>) -> Result<MeshId, ResourceError> {
        let id = MeshId(self.allocate_id());
        self.meshes
            .lock()
            .unwrap()
            .insert(id.0, descriptor.indices.len());
        self.record(DeviceCall::CreateMesh {
            id,
            index_count: descriptor.indices.len(),
        });
        Ok(id)
    }

    fn destroy_mesh(&self, id: MeshId) -> Result<(), ResourceError> {
        self.meshes
            .lock()
            .unwrap()
            .remove(&id.0)
            .ok_or(ResourceError::NotFound { kind: "mesh", id: id.0 })?;
        self.record(DeviceCall::DestroyMesh(id));
        Ok(())
    }

    fn create_readback(&self, _label: Option<&str>) -> Result<ReadbackId, ResourceError> {
        let id = ReadbackId(self.allocate_id());
        self.readbacks.lock().unwrap().insert(id.0, ());
        self.record(DeviceCall::CreateReadback(id));
        Ok(id)
    }

    fn destroy_readback(&self, id: ReadbackId) -> Result<(), ResourceError> {
        self.readbacks
            .lock()
            .unwrap()
            .remove(&id.0)
            .ok_or(ResourceError::NotFound {
                kind: "readback",
                id: id.0,
            })?;
        self.record(DeviceCall::DestroyReadback(id));
        Ok(())
    }

    fn surface_size(&self) -> Extent2D {
        *self.surface_size.lock().unwrap()
    }

    fn resize_surface(&self, size: Extent2D) -> Result<(), RenderError> {
        if !size.is_empty() {
            *self.surface_size.lock().unwrap() = size;
        }
        self.record(DeviceCall::ResizeSurface(size));
        Ok(())
    }

    fn begin_frame(&self) -> Result<FrameStatus, RenderError> {
        self.record(DeviceCall::BeginFrame);
        let status = *self.next_frame_status.lock().unwrap();
        self.in_frame
            .store(status == FrameStatus::Ready, Ordering::Relaxed);
        Ok(status)
    }

    fn draw_scene(&self, pass: &ScenePass) -> Result<(), RenderError> {
        self.ensure_in_frame()?;
        self.target_size(pass.target)?;
        let depth_ok = self
            .render_target_info(pass.depth)
            .is_some_and(|(_, format)| format.is_depth());
        if !depth_ok {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{:?} is not a live depth target",
                pass.depth
            ))
            .into());
        }
        {
            let meshes = self.meshes.lock().unwrap();
            if let Some(draw) = pass.draws.iter().find(|d| !meshes.contains_key(&d.mesh.0)) {
                return Err(ResourceError::NotFound {
                    kind: "mesh",
                    id: draw.mesh.0,
                }
                .into());
            }
        }
        self.record(DeviceCall::DrawScene {
            label: pass.label.clone(),
            target: pass.target,
            programs: pass.draws.iter().map(|d| d.program).collect(),
            render_mode: pass.frame.render_mode,
        });
        Ok(())
    }

    fn draw_fullscreen(&self, pass: &FullscreenPass) -> Result<(), RenderError> {
        self.ensure_in_frame()?;
        if self.render_target_info(pass.source).is_none() {
            return Err(ResourceError::NotFound {
                kind: "render target",
                id: pass.source.0,
            }
            .into());
        }
        let target_size = self.target_size(pass.target)?;
        self.record(DeviceCall::DrawFullscreen {
            program: pass.program,
            source: pass.source,
            target: pass.target,
            target_size,
            uniforms: pass.uniforms,
        });
        Ok(())
    }

    fn read_texel(
        &self,
        source: RenderTargetId,
        staging: ReadbackId,
    ) -> Result<[f32; 4], RenderError> {
        self.ensure_in_frame()?;
        if !self.readbacks.lock().unwrap().contains_key(&staging.0) {
            return Err(ResourceError::NotFound {
                kind: "readback",
                id: staging.0,
            }
            .into());
        }
        match self.render_target_info(source) {
            Some((size, _)) if size == Extent2D::square(1) => {}
            Some((size, _)) => {
                return Err(RenderError::ReadbackFailed(format!(
                    "source must be 1x1, got {}x{}",
                    size.width, size.height
                )))
            }
            None => {
                return Err(ResourceError::NotFound {
                    kind: "render target",
                    id: source.0,
                }
                .into())
            }
        }
        self.record(DeviceCall::ReadTexel { source });
        Ok(*self.texel.lock().unwrap())
    }

    fn present(&self) -> Result<(), RenderError> {
        self.ensure_in_frame()?;
        self.in_frame.store(false, Ordering::Relaxed);
        self.record(DeviceCall::Present);
        Ok(())
    }
}
