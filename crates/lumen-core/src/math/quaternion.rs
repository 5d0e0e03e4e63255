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

//! Provides a Quaternion type for representing 3D rotations.

use super::Vec3;

/// A unit quaternion used to rotate camera directions.
///
/// Stored as `(x, y, z, w)`, where `[x, y, z]` is the vector part and `w` the scalar part.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Quaternion {
    /// The x component of the vector part.
    pub x: f32,
    /// The y component of the vector part.
    pub y: f32,
    /// The z component of the vector part.
    pub z: f32,
    /// The scalar (real) part.
    pub w: f32,
}

impl Quaternion {
    /// The identity quaternion, representing no rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Creates a quaternion representing a rotation of `angle_radians` around `axis`.
    ///
    /// The axis is normalized internally. A degenerate axis yields a quaternion that
    /// leaves vectors unchanged.
    #[inline]
    pub fn from_axis_angle(axis: Vec3, angle_radians: f32) -> Self {
        let normalized_axis = axis.normalize();
        let half_angle = angle_radians * 0.5;
        let s = half_angle.sin();
        let c = half_angle.cos();
        Self {
            x: normalized_axis.x * s,
            y: normalized_axis.y * s,
            z: normalized_axis.z * s,
            w: c,
        }
    }

    /// Rotates a vector by this quaternion.
    #[inline]
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let s: f32 = self.w;
        2.0 * u.dot(v) * u + (s * s - u.dot(u)) * v + 2.0 * s * u.cross(v)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FRAC_PI_2;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rotation_about_up_turns_forward_to_right() {
        let q = Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2);
        let v = q.rotate_vec3(Vec3::Z);
        assert_abs_diff_eq!(v.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_preserves_length() {
        let q = Quaternion::from_axis_angle(Vec3::new(1.0, 2.0, -0.5), 0.7);
        let v = Vec3::new(0.3, -4.0, 2.0);
        assert_abs_diff_eq!(q.rotate_vec3(v).length(), v.length(), epsilon = 1e-5);
    }

    #[test]
    fn test_identity_is_noop() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Quaternion::IDENTITY.rotate_vec3(v), v);
    }
}
