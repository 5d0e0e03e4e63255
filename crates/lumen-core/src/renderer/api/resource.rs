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

//! Opaque resource handles and their creation descriptors.

use crate::math::Extent2D;
use crate::mesh::MeshVertex;

/// An opaque handle to an off-screen render target (color or depth texture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub usize);

/// An opaque handle to an uploaded mesh (vertex and index buffers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// An opaque handle to a CPU-readable staging resource for a single texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadbackId(pub usize);

/// Texel formats understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Four 16-bit float channels. Used for the HDR frame and the luminance chain.
    Rgba16Float,
    /// Four 8-bit channels, sRGB encoded.
    Rgba8UnormSrgb,
    /// Four 8-bit channels in BGRA order, sRGB encoded. Common swapchain format.
    Bgra8UnormSrgb,
    /// Four 8-bit channels, linear.
    Rgba8Unorm,
    /// Four 8-bit channels in BGRA order, linear.
    Bgra8Unorm,
    /// 32-bit float depth.
    Depth32Float,
}

impl TextureFormat {
    /// Returns `true` for depth formats.
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }

    /// Returns `true` if values written to this format may exceed `1.0`.
    pub fn is_hdr(&self) -> bool {
        matches!(self, TextureFormat::Rgba16Float)
    }

    /// Size of one texel in bytes.
    pub fn bytes_per_texel(&self) -> u32 {
        match self {
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8UnormSrgb
            | TextureFormat::Rgba8Unorm
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Depth32Float => 4,
        }
    }
}

/// Describes a render target to create.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDescriptor {
    /// A debug label.
    pub label: Option<String>,
    /// The size in texels.
    pub size: Extent2D,
    /// The texel format.
    pub format: TextureFormat,
}

impl RenderTargetDescriptor {
    /// A color or depth target with the given label, size and format.
    pub fn new(label: impl Into<String>, size: Extent2D, format: TextureFormat) -> Self {
        Self {
            label: Some(label.into()),
            size,
            format,
        }
    }
}

/// Describes a mesh to upload.
#[derive(Debug, Clone, Copy)]
pub struct MeshDescriptor<'a> {
    /// A debug label.
    pub label: Option<&'a str>,
    /// Vertex data.
    pub vertices: &'a [MeshVertex],
    /// Triangle list indices into `vertices`.
    pub indices: &'a [u32],
}
