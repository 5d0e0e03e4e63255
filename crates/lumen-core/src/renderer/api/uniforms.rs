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

//! Uniform blocks shared with the WGSL programs.
//!
//! Every struct here is `#[repr(C)]`, `Pod`, and laid out with 16-byte aligned
//! members so it can be copied into a uniform buffer byte for byte.

use super::mode::{RenderMode, SurfaceProperties};
use crate::math::{Mat4, Vec3};
use crate::renderer::light::PointLight;

/// The number of light slots in [`FrameUniforms`].
pub const MAX_LIGHTS: usize = 4;

/// One point light as the scene shader sees it.
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct GpuPointLight {
    /// World-space position, `w = 1`.
    pub position: [f32; 4],
    /// Linear RGBA color.
    pub color: [f32; 4],
    /// Constant, linear and quadratic attenuation, then intensity.
    pub attenuation_intensity: [f32; 4],
}

impl From<&PointLight> for GpuPointLight {
    fn from(light: &PointLight) -> Self {
        let att = light.attenuation;
        Self {
            position: light.position.to_array(),
            color: light.color.to_array(),
            attenuation_intensity: [att.constant, att.linear, att.quadratic, light.intensity()],
        }
    }
}

/// Per-pass scene data: camera, lights and mode.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct FrameUniforms {
    /// World to view.
    pub view: [[f32; 4]; 4],
    /// View to clip.
    pub projection: [[f32; 4]; 4],
    /// Camera position in world space, `w = 1`.
    pub camera_position: [f32; 4],
    /// Ambient light color, `w` unused.
    pub ambient: [f32; 4],
    /// Number of valid entries in `lights`.
    pub light_count: u32,
    /// [`RenderMode::shader_index`].
    pub render_mode: u32,
    /// Padding to a 16-byte boundary.
    pub _padding: [u32; 2],
    /// Light slots, only the first `light_count` are read.
    pub lights: [GpuPointLight; MAX_LIGHTS],
}

impl FrameUniforms {
    /// Packs the frame data. Lights beyond [`MAX_LIGHTS`] are dropped with a warning.
    pub fn new(
        view: Mat4,
        projection: Mat4,
        camera_position: Vec3,
        ambient: f32,
        lights: &[PointLight],
        mode: RenderMode,
    ) -> Self {
        if lights.len() > MAX_LIGHTS {
            log::warn!(
                "{} lights submitted, only the first {MAX_LIGHTS} are shaded",
                lights.len()
            );
        }
        let mut slots = [GpuPointLight::default(); MAX_LIGHTS];
        for (slot, light) in slots.iter_mut().zip(lights) {
            *slot = light.into();
        }
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            camera_position: camera_position.extend(1.0).to_array(),
            ambient: [ambient, ambient, ambient, 1.0],
            light_count: lights.len().min(MAX_LIGHTS) as u32,
            render_mode: mode.shader_index(),
            _padding: [0; 2],
            lights: slots,
        }
    }
}

/// Per-draw data: model transform and material.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct ObjectUniforms {
    /// Object to world.
    pub world: [[f32; 4]; 4],
    /// Linear base color, `w = 1`.
    pub base_color: [f32; 4],
    /// Roughness, metalness, then padding.
    pub roughness_metalness: [f32; 4],
}

impl ObjectUniforms {
    /// Packs a world transform and its material.
    pub fn new(world: Mat4, surface: &SurfaceProperties) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            base_color: surface.base_color.extend(1.0).to_array(),
            roughness_metalness: [surface.roughness, surface.metalness, 0.0, 0.0],
        }
    }
}

/// Parameters of the full-screen programs.
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct FullscreenUniforms {
    /// Added to the luminance before the logarithm.
    pub log_epsilon: f32,
    /// The adapted log-average luminance.
    pub adapted_log_luminance: f32,
    /// Linear exposure derived from the adapted luminance.
    pub exposure: f32,
    /// Padding to 16 bytes.
    pub _padding: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec4;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<GpuPointLight>(), 48);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 64 + 64 + 16 + 16 + 16 + 48 * MAX_LIGHTS);
        assert_eq!(std::mem::size_of::<ObjectUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<FullscreenUniforms>(), 16);
    }

    #[test]
    fn test_frame_uniforms_pack_lights() {
        let mut light = PointLight::new(Vec4::new(1.0, 2.0, 3.0, 1.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        light.cycle_intensity();
        let lights = vec![light; 6];
        let u = FrameUniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::ZERO,
            0.1,
            &lights,
            RenderMode::Fresnel,
        );
        assert_eq!(u.light_count, MAX_LIGHTS as u32);
        assert_eq!(u.render_mode, 3);
        assert_eq!(u.lights[0].position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.lights[0].attenuation_intensity, [0.1, 1.0, 1.0, 10.0]);
    }

    #[test]
    fn test_unused_light_slots_are_zeroed() {
        let light = PointLight::new(Vec4::ZERO, Vec4::ZERO);
        let u = FrameUniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::ZERO,
            0.1,
            std::slice::from_ref(&light),
            RenderMode::Pbr,
        );
        assert_eq!(u.light_count, 1);
        assert_eq!(u.lights[1], GpuPointLight::default());
    }
}
