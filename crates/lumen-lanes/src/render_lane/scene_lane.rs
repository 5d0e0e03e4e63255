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

//! Implements the forward scene pass.
//!
//! The `LitForwardLane` draws every extracted mesh in one depth-tested pass. The
//! lit program evaluates the term selected by the world's [`RenderMode`]: the full
//! Cook-Torrance BRDF for [`RenderMode::Pbr`], or one of its factors for the debug
//! modes. The environment program ignores lights and mode.
//!
//! [`RenderMode`]: lumen_core::renderer::RenderMode
//! [`RenderMode::Pbr`]: lumen_core::renderer::RenderMode::Pbr

use super::{RenderLane, RenderWorld};
use lumen_core::renderer::{
    ColorTarget, FrameUniforms, GraphicsDevice, ObjectUniforms, RenderError, RenderTargetId,
    SceneDraw, ScenePass,
};

/// A lane that implements a lit forward rendering strategy.
#[derive(Debug, Default)]
pub struct LitForwardLane;

impl LitForwardLane {
    /// Creates a new `LitForwardLane`.
    pub fn new() -> Self {
        Self
    }

    /// Packs `world` into the pass the device executes.
    pub fn build_pass(
        &self,
        world: &RenderWorld,
        target: ColorTarget,
        depth: RenderTargetId,
    ) -> ScenePass {
        let frame = FrameUniforms::new(
            world.view.view,
            world.view.projection,
            world.view.position,
            world.ambient,
            &world.lights,
            world.mode,
        );
        let draws = world
            .meshes
            .iter()
            .map(|extracted| SceneDraw {
                mesh: extracted.mesh,
                program: extracted.program,
                object: ObjectUniforms::new(extracted.transform, &extracted.surface),
            })
            .collect();
        ScenePass {
            label: format!("{} Pass ({:?})", self.strategy_name(), world.mode),
            target,
            depth,
            clear_color: Some(world.clear_color),
            frame,
            draws,
        }
    }
}

impl RenderLane for LitForwardLane {
    fn strategy_name(&self) -> &'static str {
        "LitForward"
    }

    fn render(
        &self,
        world: &RenderWorld,
        device: &dyn GraphicsDevice,
        target: ColorTarget,
        depth: RenderTargetId,
    ) -> Result<(), RenderError> {
        if world.meshes.is_empty() {
            log::trace!("{}: nothing to draw, clearing only", self.strategy_name());
        }
        device.draw_scene(&self.build_pass(world, target, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_lane::{ExtractedMesh, ExtractedView};
    use lumen_core::math::{Mat4, Vec3, Vec4};
    use lumen_core::renderer::{
        MeshId, PointLight, RenderMode, SceneProgram, SurfaceProperties,
    };

    fn world() -> RenderWorld {
        RenderWorld {
            view: ExtractedView {
                view: Mat4::IDENTITY,
                projection: Mat4::IDENTITY,
                position: Vec3::new(0.0, 1.5, -3.0),
            },
            lights: vec![PointLight::new(
                Vec4::new(0.0, 5.0, 2.0, 1.0),
                Vec4::new(1.0, 0.0, 0.0, 1.0),
            )],
            ambient: 0.1,
            mode: RenderMode::Geometry,
            clear_color: [0.05, 0.05, 0.1, 1.0],
            meshes: vec![
                ExtractedMesh {
                    mesh: MeshId(7),
                    program: SceneProgram::Environment,
                    transform: Mat4::from_scale(Vec3::splat(5.0)),
                    surface: SurfaceProperties::default(),
                },
                ExtractedMesh {
                    mesh: MeshId(3),
                    program: SceneProgram::Lit,
                    transform: Mat4::IDENTITY,
                    surface: SurfaceProperties::default(),
                },
            ],
        }
    }

    #[test]
    fn test_pass_carries_world_data() {
        let lane = LitForwardLane::new();
        let pass = lane.build_pass(&world(), ColorTarget::Surface, RenderTargetId(1));
        assert_eq!(pass.target, ColorTarget::Surface);
        assert_eq!(pass.depth, RenderTargetId(1));
        assert_eq!(pass.clear_color, Some([0.05, 0.05, 0.1, 1.0]));
        assert_eq!(pass.frame.light_count, 1);
        assert_eq!(pass.frame.render_mode, RenderMode::Geometry.shader_index());
        assert_eq!(pass.frame.camera_position, [0.0, 1.5, -3.0, 1.0]);
        assert_eq!(pass.frame.ambient[0], 0.1);
    }

    #[test]
    fn test_draws_keep_extraction_order() {
        let lane = LitForwardLane::new();
        let pass = lane.build_pass(&world(), ColorTarget::Surface, RenderTargetId(1));
        let meshes: Vec<_> = pass.draws.iter().map(|d| (d.mesh, d.program)).collect();
        assert_eq!(
            meshes,
            vec![
                (MeshId(7), SceneProgram::Environment),
                (MeshId(3), SceneProgram::Lit)
            ]
        );
        assert_eq!(pass.draws[0].object.world[0][0], 5.0);
    }

    #[test]
    fn test_empty_world_still_clears() {
        let lane = LitForwardLane::new();
        let pass = lane.build_pass(&RenderWorld::new(), ColorTarget::Surface, RenderTargetId(2));
        assert!(pass.draws.is_empty());
        assert!(pass.clear_color.is_some());
        assert_eq!(pass.frame.light_count, 0);
    }
}
