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

//! The demo scene: a lit sphere inside a sky sphere, three colored point lights and
//! a camera confined to the world borders.

use lumen_core::math::{Vec3, Vec4, WorldBorders, TAU};
use lumen_core::renderer::{Attenuation, PointLight, SurfaceProperties};

/// Tessellation of a UV-sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SphereTessellation {
    /// Latitude vertex count, poles included.
    pub n_theta: u32,
    /// Longitude segment count.
    pub n_phi: u32,
}

impl SphereTessellation {
    /// Creates a tessellation.
    pub const fn new(n_theta: u32, n_phi: u32) -> Self {
        Self { n_theta, n_phi }
    }
}

/// Everything needed to build the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    /// Radius of the lit sphere.
    pub sphere_radius: f32,
    /// Tessellation of the lit sphere.
    pub sphere_tessellation: SphereTessellation,
    /// Tessellation of the sky sphere.
    pub environment_tessellation: SphereTessellation,
    /// Uniform scale of the unit sky sphere around the camera.
    pub environment_scale: f32,
    /// Material of the lit sphere.
    pub surface: SurfaceProperties,
    /// Uniform ambient term.
    pub ambient: f32,
    /// Clear color of the color target.
    pub clear_color: [f32; 4],
    /// Initial camera position.
    pub camera_position: Vec3,
    /// Initial camera direction. Need not be normalized.
    pub camera_direction: Vec3,
    /// Box confining the camera.
    pub borders: WorldBorders,
    /// Horizontal distance of the lights from the vertical axis.
    pub light_radius: f32,
    /// Height of the light ring.
    pub light_height: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            sphere_radius: 1.0,
            sphere_tessellation: SphereTessellation::new(30, 30),
            environment_tessellation: SphereTessellation::new(10, 10),
            environment_scale: 5.0,
            surface: SurfaceProperties::default(),
            ambient: 0.1,
            clear_color: [0.05, 0.05, 0.1, 1.0],
            camera_position: Vec3::new(0.0, 1.5, -3.0),
            camera_direction: Vec3::Z,
            borders: WorldBorders::default(),
            light_radius: 2.0,
            light_height: 5.0,
        }
    }
}

const LIGHT_COLORS: [Vec4; 3] = [
    Vec4::new(1.0, 0.0, 0.0, 1.0),
    Vec4::new(0.0, 1.0, 0.0, 1.0),
    Vec4::new(0.0, 0.0, 1.0, 1.0),
];

/// Places the red, green and blue lights.
///
/// The first light sits below the scene at `(0, -height, radius)`; the others are
/// spread on a ring at `+height`, a third of a turn apart.
pub fn ring_lights(radius: f32, height: f32) -> Vec<PointLight> {
    LIGHT_COLORS
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let position = if i == 0 {
                Vec4::new(0.0, -height, radius, 1.0)
            } else {
                let angle = i as f32 * TAU / LIGHT_COLORS.len() as f32;
                Vec4::new(radius * angle.sin(), height, radius * angle.cos(), 1.0)
            };
            PointLight::new(position, *color).with_attenuation(Attenuation::default())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ring_lights_positions() {
        let lights = ring_lights(2.0, 5.0);
        assert_eq!(lights.len(), 3);
        assert_eq!(lights[0].position, Vec4::new(0.0, -5.0, 2.0, 1.0));

        let third = TAU / 3.0;
        assert_abs_diff_eq!(lights[1].position.x, 2.0 * third.sin(), epsilon = 1e-6);
        assert_abs_diff_eq!(lights[1].position.y, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(lights[1].position.z, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(lights[2].position.x, -lights[1].position.x, epsilon = 1e-5);
        assert_abs_diff_eq!(lights[2].position.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ring_lights_are_red_green_blue_at_lowest_preset() {
        let lights = ring_lights(2.0, 5.0);
        assert_eq!(lights[0].color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(lights[1].color, Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(lights[2].color, Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert!(lights.iter().all(|l| l.intensity() == 1.0));
    }

    #[test]
    fn test_default_camera_starts_inside_borders() {
        let settings = SceneSettings::default();
        assert!(settings.borders.contains(settings.camera_position));
    }
}
