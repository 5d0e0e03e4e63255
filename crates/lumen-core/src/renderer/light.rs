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

//! Defines the point light consumed by the scene pass.

use crate::math::Vec4;

/// The intensity multipliers a [`PointLight`] cycles through.
pub const INTENSITY_PRESETS: [f32; 3] = [1.0, 10.0, 100.0];

/// Distance attenuation coefficients: `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// The constant term.
    pub constant: f32,
    /// The linear term.
    pub linear: f32,
    /// The quadratic term.
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 0.1,
            linear: 1.0,
            quadratic: 1.0,
        }
    }
}

impl Attenuation {
    /// Evaluates the attenuation factor at `distance`.
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// A point light with a selectable intensity preset.
///
/// Position, color and attenuation are fixed once the scene is set up. The only
/// runtime mutation is [`PointLight::cycle_intensity`].
///
/// # Examples
///
/// ```
/// use lumen_core::math::Vec4;
/// use lumen_core::renderer::light::PointLight;
///
/// let mut light = PointLight::new(Vec4::new(0.0, 5.0, 2.0, 1.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
/// assert_eq!(light.intensity(), 1.0);
/// light.cycle_intensity();
/// assert_eq!(light.intensity(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Homogeneous world-space position.
    pub position: Vec4,
    /// Linear RGBA color.
    pub color: Vec4,
    /// Distance attenuation.
    pub attenuation: Attenuation,
    intensity_index: usize,
}

impl PointLight {
    /// Creates a light using the first intensity preset and default attenuation.
    pub fn new(position: Vec4, color: Vec4) -> Self {
        Self {
            position,
            color,
            attenuation: Attenuation::default(),
            intensity_index: 0,
        }
    }

    /// Replaces the attenuation coefficients.
    pub fn with_attenuation(mut self, attenuation: Attenuation) -> Self {
        self.attenuation = attenuation;
        self
    }

    /// The current intensity, one of [`INTENSITY_PRESETS`].
    pub fn intensity(&self) -> f32 {
        INTENSITY_PRESETS[self.intensity_index]
    }

    /// The index of the current preset, always in `0..3`.
    pub fn intensity_index(&self) -> usize {
        self.intensity_index
    }

    /// Advances to the next intensity preset, wrapping around.
    pub fn cycle_intensity(&mut self) {
        self.intensity_index = (self.intensity_index + 1) % INTENSITY_PRESETS.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn light() -> PointLight {
        PointLight::new(Vec4::new(0.0, -5.0, 2.0, 1.0), Vec4::new(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn test_intensity_sequence() {
        let mut l = light();
        let mut seen = vec![l.intensity()];
        for _ in 0..3 {
            l.cycle_intensity();
            seen.push(l.intensity());
        }
        assert_eq!(seen, vec![1.0, 10.0, 100.0, 1.0]);
    }

    #[test]
    fn test_three_cycles_restore_intensity() {
        let mut l = light();
        l.cycle_intensity();
        let before = l.intensity();
        for _ in 0..3 {
            l.cycle_intensity();
        }
        assert_eq!(l.intensity(), before);
        assert!(l.intensity_index() < 3);
    }

    #[test]
    fn test_cycle_leaves_other_fields() {
        let mut l = light();
        let original = l;
        l.cycle_intensity();
        assert_eq!(l.position, original.position);
        assert_eq!(l.color, original.color);
        assert_eq!(l.attenuation, original.attenuation);
    }

    #[test]
    fn test_attenuation_factor() {
        let att = Attenuation::default();
        assert_relative_eq!(att.factor(0.0), 10.0, epsilon = 1e-5);
        assert_relative_eq!(att.factor(1.0), 1.0 / 2.1, epsilon = 1e-6);
    }
}
