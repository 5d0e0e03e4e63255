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

//! Procedural mesh data consumed by the renderer.
//!
//! Meshes are produced on the CPU as plain vertex and index lists, then uploaded
//! through [`GraphicsDevice::create_mesh`](crate::renderer::GraphicsDevice::create_mesh).

pub mod sphere;

pub use self::sphere::{generate_sphere, SphereMesh};

use crate::math::{Vec2, Vec3};
use std::fmt;

/// A vertex with position, normal and texture coordinates.
///
/// The layout is `#[repr(C)]` and matches the scene shader's vertex input
/// (`location(0)` position, `location(1)` normal, `location(2)` uv).
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: Vec3,
    /// Unit object-space normal.
    pub normal: Vec3,
    /// Texture coordinates in `[0, 1]`.
    pub uv: Vec2,
}

/// An error raised when mesh generation parameters are invalid.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A tessellation argument is outside its valid range.
    InvalidArgument {
        /// The offending argument name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::InvalidArgument { name, reason } => {
                write!(f, "Invalid mesh argument '{name}': {reason}")
            }
        }
    }
}

impl std::error::Error for MeshError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
    }

    #[test]
    fn test_mesh_error_display() {
        let err = MeshError::InvalidArgument {
            name: "n_theta",
            reason: "must be at least 3, got 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid mesh argument 'n_theta': must be at least 3, got 2"
        );
    }
}
