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

//! Conversions between engine types and their wgpu counterparts.

use lumen_core::math::Extent2D;
use lumen_core::renderer::TextureFormat;

/// A local extension trait to convert engine types into wgpu types.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a wgpu-compatible type.
    fn into_wgpu(self) -> T;
}

impl IntoWgpu<wgpu::Extent3d> for Extent2D {
    fn into_wgpu(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

impl IntoWgpu<wgpu::TextureFormat> for TextureFormat {
    fn into_wgpu(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
            TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureFormat::Bgra8UnormSrgb => wgpu::TextureFormat::Bgra8UnormSrgb,
            TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
            TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
        }
    }
}

impl IntoWgpu<wgpu::Color> for [f32; 4] {
    fn into_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self[0] as f64,
            g: self[1] as f64,
            b: self[2] as f64,
            a: self[3] as f64,
        }
    }
}

/// Maps a wgpu format back to the engine format, if the engine knows it.
pub fn from_wgpu_texture_format(format: wgpu::TextureFormat) -> Option<TextureFormat> {
    match format {
        wgpu::TextureFormat::Rgba16Float => Some(TextureFormat::Rgba16Float),
        wgpu::TextureFormat::Rgba8UnormSrgb => Some(TextureFormat::Rgba8UnormSrgb),
        wgpu::TextureFormat::Bgra8UnormSrgb => Some(TextureFormat::Bgra8UnormSrgb),
        wgpu::TextureFormat::Rgba8Unorm => Some(TextureFormat::Rgba8Unorm),
        wgpu::TextureFormat::Bgra8Unorm => Some(TextureFormat::Bgra8Unorm),
        wgpu::TextureFormat::Depth32Float => Some(TextureFormat::Depth32Float),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_formats_round_trip() {
        for format in [
            TextureFormat::Rgba16Float,
            TextureFormat::Rgba8UnormSrgb,
            TextureFormat::Bgra8UnormSrgb,
            TextureFormat::Rgba8Unorm,
            TextureFormat::Bgra8Unorm,
            TextureFormat::Depth32Float,
        ] {
            let wgpu_format: wgpu::TextureFormat = format.into_wgpu();
            assert_eq!(from_wgpu_texture_format(wgpu_format), Some(format));
        }
        assert_eq!(from_wgpu_texture_format(wgpu::TextureFormat::R8Unorm), None);
    }

    #[test]
    fn test_extent_is_single_layer() {
        let extent: wgpu::Extent3d = Extent2D::new(640, 480).into_wgpu();
        assert_eq!(extent.depth_or_array_layers, 1);
        assert_eq!((extent.width, extent.height), (640, 480));
    }
}
