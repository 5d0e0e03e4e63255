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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" of the renderer: the abstract
//! [`GraphicsDevice`] trait, the pass and resource descriptions it consumes, the
//! uniform layouts shared with the shaders, and the error types. The wgpu backend in
//! `lumen-infra` implements these contracts; `lumen-lanes` and `lumen-agents` only
//! ever talk to the trait.

pub mod api;
pub mod error;
pub mod handle;
pub mod light;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{PipelineError, RenderError, ResourceError};
pub use self::handle::{OwnedMesh, OwnedReadback, OwnedRenderTarget};
pub use self::light::{Attenuation, PointLight, INTENSITY_PRESETS};
pub use self::traits::GraphicsDevice;
