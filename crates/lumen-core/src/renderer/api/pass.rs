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

//! The passes a frame is made of.
//!
//! A frame is a sequence of passes bracketed by
//! [`GraphicsDevice::begin_frame`](crate::renderer::GraphicsDevice::begin_frame) and
//! [`GraphicsDevice::present`](crate::renderer::GraphicsDevice::present). Each pass
//! binds exactly the resources it names; nothing stays bound from one pass to the next.

use super::resource::{MeshId, RenderTargetId};
use super::uniforms::{FrameUniforms, FullscreenUniforms, ObjectUniforms};

/// Where a pass writes its color output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTarget {
    /// The back buffer acquired by `begin_frame`.
    Surface,
    /// An off-screen render target.
    Offscreen(RenderTargetId),
}

/// The outcome of acquiring a back buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A back buffer is ready and passes may be recorded.
    Ready,
    /// The surface was out of date and has been reconfigured. Skip this frame.
    Skipped,
}

/// The shader program used by a scene draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneProgram {
    /// The lit surface program. The term it outputs depends on the frame's render mode.
    Lit,
    /// The environment sky, drawn on an inward-facing sphere around the camera.
    Environment,
}

/// One indexed draw within a scene pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneDraw {
    /// The mesh to draw.
    pub mesh: MeshId,
    /// The program to draw it with.
    pub program: SceneProgram,
    /// Transform and material for this draw.
    pub object: ObjectUniforms,
}

/// A depth-tested pass drawing meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePass {
    /// A debug label.
    pub label: String,
    /// The color output.
    pub target: ColorTarget,
    /// The depth buffer, created with a depth format and the same size as `target`.
    pub depth: RenderTargetId,
    /// Clear value for the color target. `None` keeps the previous contents.
    pub clear_color: Option<[f32; 4]>,
    /// Camera and lights, shared by every draw.
    pub frame: FrameUniforms,
    /// The draws, issued in order.
    pub draws: Vec<SceneDraw>,
}

/// The full-screen programs of the luminance pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullscreenProgram {
    /// Bilinear resample of the source into the target.
    Copy,
    /// Writes `log(luminance + epsilon)` of the source.
    LogLuminance,
    /// Maps the HDR source to display range using the adapted luminance.
    ToneMapping,
}

impl FullscreenProgram {
    /// A short name used in labels and logs.
    pub fn name(&self) -> &'static str {
        match self {
            FullscreenProgram::Copy => "copy",
            FullscreenProgram::LogLuminance => "log-luminance",
            FullscreenProgram::ToneMapping => "tone-mapping",
        }
    }
}

/// A pass drawing one full-screen triangle that samples `source`.
///
/// The viewport covers the whole target.
#[derive(Debug, Clone, PartialEq)]
pub struct FullscreenPass {
    /// A debug label.
    pub label: String,
    /// The program to run.
    pub program: FullscreenProgram,
    /// The sampled texture.
    pub source: RenderTargetId,
    /// The color output.
    pub target: ColorTarget,
    /// Program parameters.
    pub uniforms: FullscreenUniforms,
}
