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

//! Provides a column-major 4x4 matrix type for 3D transformations.

use super::{Vec3, Vec4, EPSILON};
use std::ops::Mul;

/// A 4x4 column-major matrix.
///
/// Transformations compose right-to-left: `projection * view * model * v`.
/// The memory layout matches what WGSL expects for a `mat4x4<f32>` uniform.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// The four columns of the matrix.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns a row of the matrix.
    #[inline]
    pub fn row(&self, index: usize) -> Vec4 {
        let pick = |c: &Vec4| match index {
            0 => c.x,
            1 => c.y,
            2 => c.z,
            _ => c.w,
        };
        Vec4::new(
            pick(&self.cols[0]),
            pick(&self.cols[1]),
            pick(&self.cols[2]),
            pick(&self.cols[3]),
        )
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            v.extend(1.0),
        )
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, scale.z, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }

    /// Creates a left-handed perspective projection with a `[0, 1]` depth range.
    ///
    /// Points in front of the camera have positive view-space `z`.
    #[inline]
    pub fn perspective_lh_zo(fov_y_radians: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        debug_assert!(z_near > 0.0 && z_far > z_near);
        let f = 1.0 / (fov_y_radians * 0.5).tan();
        let range = z_far / (z_far - z_near);

        Self::from_cols(
            Vec4::new(f / aspect_ratio, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, range, 1.0),
            Vec4::new(0.0, 0.0, -range * z_near, 0.0),
        )
    }

    /// Creates a left-handed view matrix looking from `eye` towards `target`.
    ///
    /// Returns `None` if `eye` and `target` coincide or if `up` is parallel to the
    /// viewing direction.
    #[inline]
    pub fn look_at_lh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let forward = target - eye;
        if forward.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let f = forward.normalize();
        let s = up.cross(f);
        if s.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let s = s.normalize();
        let u = f.cross(s);

        Some(Self::from_cols(
            Vec4::new(s.x, u.x, f.x, 0.0),
            Vec4::new(s.y, u.y, f.y, 0.0),
            Vec4::new(s.z, u.z, f.z, 0.0),
            Vec4::new(-eye.dot(s), -eye.dot(u), -eye.dot(f), 1.0),
        ))
    }

    /// Returns the matrix as a nested array, column by column.
    #[inline]
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        [
            self.cols[0].to_array(),
            self.cols[1].to_array(),
            self.cols[2].to_array(),
            self.cols[3].to_array(),
        ]
    }

    /// Transforms a point (implicit `w = 1`) and returns the `xyz` part.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (*self * p.extend(1.0)).truncate()
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, v: Vec4) -> Self::Output {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FRAC_PI_2;
    use approx::assert_abs_diff_eq;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-5);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn test_look_at_lh_maps_target_onto_positive_z() {
        let eye = Vec3::new(0.0, 1.0, -2.0);
        let view = Mat4::look_at_lh(eye, eye + Vec3::Z, Vec3::Y).unwrap();
        assert_vec3_eq(view.transform_point(eye), Vec3::ZERO);
        assert_vec3_eq(view.transform_point(eye + Vec3::Z * 3.0), Vec3::new(0.0, 0.0, 3.0));
        // World +X stays on the right.
        assert_vec3_eq(view.transform_point(eye + Vec3::X), Vec3::X);
    }

    #[test]
    fn test_look_at_lh_degenerate_inputs() {
        assert!(Mat4::look_at_lh(Vec3::ZERO, Vec3::ZERO, Vec3::Y).is_none());
        assert!(Mat4::look_at_lh(Vec3::ZERO, Vec3::Y, Vec3::Y).is_none());
    }

    #[test]
    fn test_perspective_lh_zo_depth_range() {
        let proj = Mat4::perspective_lh_zo(FRAC_PI_2, 1.0, 0.01, 100.0);
        let near = proj * Vec4::new(0.0, 0.0, 0.01, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, 100.0, 1.0);
        assert_abs_diff_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_translation_then_scale_composition() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::from_scale(Vec3::splat(5.0));
        assert_vec3_eq(m.transform_point(Vec3::X), Vec3::new(6.0, 2.0, 3.0));
        assert_eq!(Mat4::IDENTITY * m, m);
    }
}
