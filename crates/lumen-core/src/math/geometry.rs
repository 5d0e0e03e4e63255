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

//! Provides the axis-aligned world bounds that confine the camera.

use super::Vec3;

/// An axis-aligned box in world space, defined by its minimum and maximum corners.
///
/// The constructor orders the corners so that `min <= max` holds componentwise for
/// every value of this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBorders {
    min: Vec3,
    max: Vec3,
}

impl WorldBorders {
    /// Creates borders from explicit corners.
    ///
    /// Returns `None` unless `min <= max` on every axis and both corners are finite.
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Option<Self> {
        (min.is_finite() && max.is_finite() && min.all_le(max)).then_some(Self { min, max })
    }

    /// Creates borders from two opposite corners, in any order.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The corner with the smallest coordinates on all axes.
    #[inline]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// The corner with the largest coordinates on all axes.
    #[inline]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Clamps `point` into the box, componentwise.
    #[inline]
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Returns `true` if `point` lies inside the box or on its boundary.
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        self.min.all_le(point) && point.all_le(self.max)
    }
}

impl Default for WorldBorders {
    /// The scene bounds used by the demo: `[-20, 20] x [-10, 10] x [-20, 20]`.
    fn default() -> Self {
        Self::from_min_max(Vec3::new(-20.0, -10.0, -20.0), Vec3::new(20.0, 10.0, 20.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_min_max_orders_corners() {
        let b = WorldBorders::from_min_max(Vec3::new(1.0, -1.0, 5.0), Vec3::new(-1.0, 1.0, 2.0));
        assert_eq!(b.min(), Vec3::new(-1.0, -1.0, 2.0));
        assert_eq!(b.max(), Vec3::new(1.0, 1.0, 5.0));
    }

    #[test]
    fn test_new_rejects_inverted_corners() {
        assert!(WorldBorders::new(Vec3::splat(-1.0), Vec3::splat(1.0)).is_some());
        assert!(WorldBorders::new(Vec3::splat(1.0), Vec3::splat(1.0)).is_some());
        assert!(WorldBorders::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 1.0, 1.0)).is_none());
        assert!(WorldBorders::new(Vec3::splat(f32::NAN), Vec3::ONE).is_none());
    }

    #[test]
    fn test_clamp_inside_is_noop() {
        let b = WorldBorders::default();
        let p = Vec3::new(3.0, -2.0, 19.0);
        assert_eq!(b.clamp(p), p);
        assert!(b.contains(p));
    }
}
