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

//! Defines the intermediate `RenderWorld`.
//!
//! The `RenderWorld` is a frame-by-frame snapshot of what must be drawn. The render
//! agent fills it from its camera, lights and meshes; lanes consume it read-only.

use lumen_core::math::{Mat4, Vec3};
use lumen_core::renderer::{MeshId, PointLight, RenderMode, SceneProgram, SurfaceProperties};

/// The camera as seen by a lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedView {
    /// World to view.
    pub view: Mat4,
    /// View to clip.
    pub projection: Mat4,
    /// Eye position in world space.
    pub position: Vec3,
}

impl Default for ExtractedView {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            position: Vec3::ZERO,
        }
    }
}

/// One mesh to draw, with everything its draw call needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedMesh {
    /// The GPU mesh.
    pub mesh: MeshId,
    /// The program drawing it.
    pub program: SceneProgram,
    /// Object to world.
    pub transform: Mat4,
    /// Material parameters.
    pub surface: SurfaceProperties,
}

/// All data needed to render a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderWorld {
    /// The camera.
    pub view: ExtractedView,
    /// Point lights, in slot order.
    pub lights: Vec<PointLight>,
    /// Uniform ambient term.
    pub ambient: f32,
    /// Which shading term the lit program outputs.
    pub mode: RenderMode,
    /// Clear color of the color target.
    pub clear_color: [f32; 4],
    /// Meshes, drawn in order.
    pub meshes: Vec<ExtractedMesh>,
}

impl Default for RenderWorld {
    fn default() -> Self {
        Self {
            view: ExtractedView::default(),
            lights: Vec::new(),
            ambient: 0.0,
            mode: RenderMode::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            meshes: Vec::new(),
        }
    }
}

impl RenderWorld {
    /// Creates a new, empty `RenderWorld`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the per-frame lists, preparing the world for the next extraction.
    pub fn clear(&mut self) {
        self.lights.clear();
        self.meshes.clear();
    }
}
