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

//! Render modes and material parameters.

use crate::math::{srgb_to_linear, Vec3};
use serde::{Deserialize, Serialize};

/// What the scene pass outputs.
///
/// [`RenderMode::Pbr`] renders the lit scene into the HDR target and goes through the
/// luminance adaptation pipeline. The other modes visualize a single term of the
/// lighting model and are written straight to the back buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Full lighting, tone mapped.
    #[default]
    Pbr,
    /// Normal distribution term only.
    Ndf,
    /// Geometry (shadowing/masking) term only.
    Geometry,
    /// Fresnel term only.
    Fresnel,
}

impl RenderMode {
    /// Every mode, in cycling order.
    pub const ALL: [RenderMode; 4] = [
        RenderMode::Pbr,
        RenderMode::Ndf,
        RenderMode::Geometry,
        RenderMode::Fresnel,
    ];

    /// The next mode in [`RenderMode::ALL`], wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Whether frames in this mode go through the HDR target and tone mapping.
    pub fn uses_luminance_pipeline(self) -> bool {
        self == RenderMode::Pbr
    }

    /// The value the scene shader switches on.
    pub fn shader_index(self) -> u32 {
        match self {
            RenderMode::Pbr => 0,
            RenderMode::Ndf => 1,
            RenderMode::Geometry => 2,
            RenderMode::Fresnel => 3,
        }
    }
}

/// Material parameters of the lit sphere, in linear space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProperties {
    /// Linear base color (the metal `F0` for metallic surfaces).
    pub base_color: Vec3,
    /// Perceptual roughness in `[0, 1]`.
    pub roughness: f32,
    /// Metalness in `[0, 1]`.
    pub metalness: f32,
}

impl SurfaceProperties {
    /// Builds the properties from a gamma-encoded color picked by a user.
    pub fn from_srgb(color: [f32; 3], roughness: f32, metalness: f32) -> Self {
        Self {
            base_color: Vec3::new(
                srgb_to_linear(color[0]),
                srgb_to_linear(color[1]),
                srgb_to_linear(color[2]),
            ),
            roughness: roughness.clamp(0.0, 1.0),
            metalness: metalness.clamp(0.0, 1.0),
        }
    }
}

impl Default for SurfaceProperties {
    fn default() -> Self {
        Self::from_srgb([0.2, 0.0, 0.0], 0.3, 0.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mode_cycle_visits_all() {
        let mut mode = RenderMode::Pbr;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(seen, RenderMode::ALL.to_vec());
        assert_eq!(mode, RenderMode::Pbr);
    }

    #[test]
    fn test_only_pbr_is_tone_mapped() {
        assert!(RenderMode::Pbr.uses_luminance_pipeline());
        assert!(!RenderMode::Ndf.uses_luminance_pipeline());
        assert!(!RenderMode::Geometry.uses_luminance_pipeline());
        assert!(!RenderMode::Fresnel.uses_luminance_pipeline());
    }

    #[test]
    fn test_default_surface_is_linearized() {
        let s = SurfaceProperties::default();
        assert_relative_eq!(s.base_color.x, 0.2_f32.powf(2.2), epsilon = 1e-7);
        assert_eq!(s.base_color.y, 0.0);
        assert_eq!(s.roughness, 0.3);
        assert_eq!(s.metalness, 0.2);
    }
}
