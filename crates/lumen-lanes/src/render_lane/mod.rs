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

//! Rendering lanes.

use lumen_core::renderer::{ColorTarget, GraphicsDevice, RenderError, RenderTargetId};

mod luminance_lane;
mod scene_lane;
mod world;

pub use luminance_lane::*;
pub use scene_lane::*;
pub use world::*;

/// A rendering strategy that draws a [`RenderWorld`].
///
/// Lanes only see the abstract [`GraphicsDevice`], so they run unchanged against the
/// wgpu backend and against test doubles.
pub trait RenderLane: Send + Sync {
    /// A human-readable identifier for this strategy, used in pass labels and logs.
    fn strategy_name(&self) -> &'static str;

    /// Records the passes drawing `world` into `target`, depth-tested against `depth`.
    fn render(
        &self,
        world: &RenderWorld,
        device: &dyn GraphicsDevice,
        target: ColorTarget,
        depth: RenderTargetId,
    ) -> Result<(), RenderError>;
}
