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

//! UV-sphere tessellation.
//!
//! The sphere is built from `n_theta` polar samples (two of which are the poles) and
//! `n_phi` azimuthal segments per ring. Vertex `0` is the top pole, the last vertex is
//! the bottom pole, and the `n_theta - 2` interior rings are stored in between, ring
//! by ring.
//!
//! With `correct_winding` the triangles are clockwise when seen from outside the
//! sphere in the left-handed world, which is the front face used by the scene
//! pipelines. Passing `outer_normals = false` reverses the whole index list so the
//! same vertices are seen from the inside, which is how the environment sphere is
//! drawn.

use super::{MeshError, MeshVertex};
use crate::math::{Vec2, Vec3, PI, TAU};

/// An immutable, CPU-side sphere mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl SphereMesh {
    /// The generated vertices, top pole first and bottom pole last.
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Triangle list indices, three per triangle.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Consumes the mesh and returns its buffers.
    pub fn into_parts(self) -> (Vec<MeshVertex>, Vec<u32>) {
        (self.vertices, self.indices)
    }
}

/// Generates a UV-sphere.
///
/// # Errors
///
/// Returns [`MeshError::InvalidArgument`] when `n_theta < 3`, `n_phi < 2`, when
/// `radius` is not a finite positive number, or when the index count overflows `u32`.
///
/// # Examples
///
/// ```
/// use lumen_core::mesh::generate_sphere;
///
/// let sphere = generate_sphere(1.0, 30, 30, true, true).unwrap();
/// assert_eq!(sphere.vertices().len(), 28 * 30 + 2);
/// assert_eq!(sphere.indices().len(), 6 * 28 * 30);
/// ```
pub fn generate_sphere(
    radius: f32,
    n_theta: u32,
    n_phi: u32,
    outer_normals: bool,
    correct_winding: bool,
) -> Result<SphereMesh, MeshError> {
    if n_theta < 3 {
        return Err(MeshError::InvalidArgument {
            name: "n_theta",
            reason: format!("must be at least 3, got {n_theta}"),
        });
    }
    if n_phi < 2 {
        return Err(MeshError::InvalidArgument {
            name: "n_phi",
            reason: format!("must be at least 2, got {n_phi}"),
        });
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(MeshError::InvalidArgument {
            name: "radius",
            reason: format!("must be a finite positive number, got {radius}"),
        });
    }
    // The index count bounds the vertex count, so one check covers both buffers.
    if 6u32
        .checked_mul(n_theta - 2)
        .and_then(|count| count.checked_mul(n_phi))
        .is_none()
    {
        return Err(MeshError::InvalidArgument {
            name: "n_phi",
            reason: format!("{n_theta}x{n_phi} needs more indices than fit in u32"),
        });
    }

    let vertices = sphere_vertices(radius, n_theta, n_phi);
    let mut indices = sphere_indices(vertices.len() as u32, n_theta, n_phi, correct_winding);
    if !outer_normals {
        indices.reverse();
    }

    log::debug!(
        "Generated sphere r={radius} ({n_theta}x{n_phi}): {} vertices, {} indices",
        vertices.len(),
        indices.len()
    );

    Ok(SphereMesh { vertices, indices })
}

fn sphere_vertices(radius: f32, n_theta: u32, n_phi: u32) -> Vec<MeshVertex> {
    let rings = n_theta - 2;
    let d_theta = PI / (n_theta - 1) as f32;
    let d_phi = TAU / n_phi as f32;

    let mut vertices = Vec::with_capacity((rings * n_phi + 2) as usize);
    vertices.push(MeshVertex {
        position: Vec3::new(0.0, radius, 0.0),
        normal: Vec3::Y,
        uv: Vec2::new(0.5, 0.0),
    });

    for i in 0..rings {
        let theta = (i + 1) as f32 * d_theta;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for j in 0..n_phi {
            let phi = j as f32 * d_phi;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let normal = Vec3::new(sin_theta * sin_phi, cos_theta, -sin_theta * cos_phi);
            vertices.push(MeshVertex {
                position: normal * radius,
                normal,
                uv: Vec2::new(phi / TAU, theta / PI),
            });
        }
    }

    vertices.push(MeshVertex {
        position: Vec3::new(0.0, -radius, 0.0),
        normal: -Vec3::Y,
        uv: Vec2::new(0.5, 1.0),
    });
    vertices
}

fn sphere_indices(n_vertices: u32, n_theta: u32, n_phi: u32, correct_winding: bool) -> Vec<u32> {
    let top_pole = 0;
    let bottom_pole = n_vertices - 1;
    let top_ring = 1;
    let bottom_ring = n_vertices - n_phi - 1;

    let mut indices = Vec::with_capacity((6 * (n_theta - 2) * n_phi) as usize);
    let mut triangle = |a: u32, b: u32, c: u32| {
        if correct_winding {
            indices.extend_from_slice(&[a, b, c]);
        } else {
            indices.extend_from_slice(&[a, c, b]);
        }
    };

    for j in 0..n_phi {
        triangle(top_pole, top_ring + (j + 1) % n_phi, top_ring + j);
    }

    for i in 0..n_theta - 3 {
        let ring = top_ring + i * n_phi;
        let next_ring = ring + n_phi;
        for j in 0..n_phi {
            let j_next = (j + 1) % n_phi;
            triangle(ring + j, ring + j_next, next_ring + j);
            triangle(next_ring + j, ring + j_next, next_ring + j_next);
        }
    }

    for j in 0..n_phi {
        triangle(bottom_pole, bottom_ring + j, bottom_ring + (j + 1) % n_phi);
    }

    indices
}
