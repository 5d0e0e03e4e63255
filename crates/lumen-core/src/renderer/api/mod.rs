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

//! Backend-agnostic rendering API.
//!
//! - **[`resource`]**: opaque resource IDs, formats and creation descriptors.
//! - **[`pass`]**: the two kinds of pass the renderer records, scene and full-screen.
//! - **[`uniforms`]**: `#[repr(C)]` uniform blocks shared with the WGSL programs.
//! - **[`mode`]**: the render mode switch and material parameters.

pub mod mode;
pub mod pass;
pub mod resource;
pub mod uniforms;

pub use self::mode::{RenderMode, SurfaceProperties};
pub use self::pass::{
    ColorTarget, FrameStatus, FullscreenPass, FullscreenProgram, SceneDraw, ScenePass,
    SceneProgram,
};
pub use self::resource::{
    MeshDescriptor, MeshId, ReadbackId, RenderTargetDescriptor, RenderTargetId, TextureFormat,
};
pub use self::uniforms::{
    FrameUniforms, FullscreenUniforms, GpuPointLight, ObjectUniforms, MAX_LIGHTS,
};
