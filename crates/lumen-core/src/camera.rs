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

//! A first-person fly camera for a left-handed, Y-up world.
//!
//! The camera keeps a unit viewing direction and the accumulated pitch so that
//! vertical rotation can be clamped short of the poles. Positive pitch looks down.

use crate::math::{Mat4, Quaternion, Vec3, WorldBorders, FRAC_PI_2};

/// Gap kept between the pitch limit and the poles, in radians.
pub const PITCH_MARGIN: f32 = 1e-3;

/// The largest pitch magnitude the camera will accept.
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - PITCH_MARGIN;

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// The vertical field of view in radians.
    pub fov_y_radians: f32,
    /// The distance to the near clipping plane.
    pub z_near: f32,
    /// The distance to the far clipping plane.
    pub z_far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_radians: FRAC_PI_2,
            z_near: 0.01,
            z_far: 100.0,
        }
    }
}

/// First-person camera state.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    direction: Vec3,
    up: Vec3,
    pitch: f32,
    projection: Projection,
}

impl Camera {
    /// Creates a camera at `position` looking along `direction`.
    ///
    /// Returns `None` if `direction` is degenerate or closer to vertical than
    /// [`PITCH_LIMIT`] allows.
    pub fn new(position: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.normalize();
        if direction == Vec3::ZERO {
            return None;
        }
        let pitch = (-direction.y).clamp(-1.0, 1.0).asin();
        if pitch.abs() > PITCH_LIMIT {
            return None;
        }
        Some(Self {
            position,
            direction,
            up: Vec3::Y,
            pitch,
            projection: Projection::default(),
        })
    }

    /// Replaces the projection parameters.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// The camera position in world space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The unit viewing direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// The fixed world-up vector.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// The accumulated vertical angle in radians.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// The projection parameters.
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Unit vector to the camera's left, `normalize(direction x up)`.
    pub fn tangent(&self) -> Vec3 {
        self.direction.cross(self.up).normalize()
    }

    /// Moves along the viewing direction.
    pub fn move_normal(&mut self, distance: f32) {
        self.position += self.direction * distance;
    }

    /// Moves along the tangent. Positive distances strafe left.
    pub fn move_tangent(&mut self, distance: f32) {
        self.position += self.tangent() * distance;
    }

    /// Rotates the direction around the world-up axis.
    pub fn rotate_horizontal(&mut self, angle: f32) {
        let q = Quaternion::from_axis_angle(self.up, angle);
        self.direction = q.rotate_vec3(self.direction).normalize();
    }

    /// Rotates the direction around the negated tangent, keeping the accumulated
    /// pitch within `[-PITCH_LIMIT, PITCH_LIMIT]`.
    pub fn rotate_vertical(&mut self, angle: f32) {
        let angle = angle.clamp(-PITCH_LIMIT - self.pitch, PITCH_LIMIT - self.pitch);
        if angle == 0.0 {
            return;
        }
        let axis = -self.tangent();
        let q = Quaternion::from_axis_angle(axis, angle);
        self.direction = q.rotate_vec3(self.direction).normalize();
        self.pitch += angle;
    }

    /// Clamps the position into `borders`.
    pub fn position_clip(&mut self, borders: &WorldBorders) {
        self.position = borders.clamp(self.position);
    }

    /// The left-handed view matrix looking from the position along the direction.
    pub fn view_matrix(&self) -> Mat4 {
        // The pitch clamp keeps direction and up apart, so this only falls back on
        // non-finite positions.
        Mat4::look_at_lh(self.position, self.position + self.direction, self.up)
            .unwrap_or(Mat4::IDENTITY)
    }

    /// The left-handed, zero-to-one depth projection matrix for `aspect_ratio`.
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let p = self.projection;
        Mat4::perspective_lh_zo(p.fov_y_radians, aspect_ratio, p.z_near, p.z_far)
    }
}
