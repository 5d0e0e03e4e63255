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

use crate::math::Extent2D;
use crate::renderer::api::*;
use crate::renderer::error::{RenderError, ResourceError};
use std::fmt::Debug;

/// The device and surface the renderer draws with.
///
/// All methods take `&self`; implementations use interior mutability so that a
/// single `Arc<dyn GraphicsDevice>` can be shared by every lane and resource handle.
/// Passes may only be recorded between [`begin_frame`](Self::begin_frame) returning
/// [`FrameStatus::Ready`] and [`present`](Self::present).
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a render target (color or depth texture) that can be drawn to and sampled.
    /// ## Errors
    /// * `ResourceError` - If the size is zero or the backend fails to allocate it.
    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetId, ResourceError>;

    /// Destroys a render target.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the ID is not live.
    fn destroy_render_target(&self, id: RenderTargetId) -> Result<(), ResourceError>;

    /// Uploads a mesh's vertex and index buffers.
    /// ## Errors
    /// * `ResourceError` - If the mesh is empty or the upload fails.
    fn create_mesh(&self, descriptor: &MeshDescriptor<'_>) -> Result<MeshId, ResourceError>;

    /// Destroys a mesh.
    fn destroy_mesh(&self, id: MeshId) -> Result<(), ResourceError>;

    /// Creates a CPU-readable staging resource holding one texel.
    fn create_readback(&self, label: Option<&str>) -> Result<ReadbackId, ResourceError>;

    /// Destroys a staging resource.
    fn destroy_readback(&self, id: ReadbackId) -> Result<(), ResourceError>;

    /// The current size of the presentation surface.
    fn surface_size(&self) -> Extent2D;

    /// Reconfigures the presentation surface. Zero sizes are ignored.
    fn resize_surface(&self, size: Extent2D) -> Result<(), RenderError>;

    /// Acquires the next back buffer.
    fn begin_frame(&self) -> Result<FrameStatus, RenderError>;

    /// Records and submits a scene pass.
    fn draw_scene(&self, pass: &ScenePass) -> Result<(), RenderError>;

    /// Records and submits a full-screen pass.
    fn draw_fullscreen(&self, pass: &FullscreenPass) -> Result<(), RenderError>;

    /// Copies the top-left texel of `source` into `staging` and blocks until the
    /// GPU has written it, returning its four channels as `f32`.
    ///
    /// This is the only call that waits on the GPU.
    fn read_texel(&self, source: RenderTargetId, staging: ReadbackId)
        -> Result<[f32; 4], RenderError>;

    /// Presents the back buffer acquired by `begin_frame`.
    fn present(&self) -> Result<(), RenderError>;
}
