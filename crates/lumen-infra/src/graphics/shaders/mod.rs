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

//! WGSL sources of the renderer's programs.
//!
//! Each program is assembled from a shared prelude (bindings and, for full-screen
//! programs, the vertex stage) and its own stages. Entry points are always
//! `vs_main` and `fs_main`.

use lumen_core::renderer::{FullscreenProgram, SceneProgram};

/// Uniform blocks, bindings and vertex input of the scene programs.
pub const SCENE_COMMON_WGSL: &str = include_str!("scene_common.wgsl");
/// Cook-Torrance shading with debug outputs.
pub const SCENE_WGSL: &str = include_str!("scene.wgsl");
/// Procedural sky gradient.
pub const ENVIRONMENT_WGSL: &str = include_str!("environment.wgsl");
/// Full-screen triangle vertex stage and the source/params bindings.
pub const FULLSCREEN_COMMON_WGSL: &str = include_str!("fullscreen_common.wgsl");
/// Bilinear copy.
pub const COPY_WGSL: &str = include_str!("copy.wgsl");
/// `log(luminance + epsilon)`.
pub const LOG_LUMINANCE_WGSL: &str = include_str!("log_luminance.wgsl");
/// Exposure and Reinhard tone mapping.
pub const TONE_MAPPING_WGSL: &str = include_str!("tone_mapping.wgsl");

/// Name of the vertex entry point of every program.
pub const VERTEX_ENTRY_POINT: &str = "vs_main";
/// Name of the fragment entry point of every program.
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// The full WGSL source of a scene program.
pub fn scene_program_source(program: SceneProgram) -> String {
    let body = match program {
        SceneProgram::Lit => SCENE_WGSL,
        SceneProgram::Environment => ENVIRONMENT_WGSL,
    };
    format!("{SCENE_COMMON_WGSL}\n{body}")
}

/// The full WGSL source of a full-screen program.
pub fn fullscreen_program_source(program: FullscreenProgram) -> String {
    let body = match program {
        FullscreenProgram::Copy => COPY_WGSL,
        FullscreenProgram::LogLuminance => LOG_LUMINANCE_WGSL,
        FullscreenProgram::ToneMapping => TONE_MAPPING_WGSL,
    };
    format!("{FULLSCREEN_COMMON_WGSL}\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::renderer::MAX_LIGHTS;

    #[test]
    fn test_every_program_has_both_stages() {
        let sources = [
            scene_program_source(SceneProgram::Lit),
            scene_program_source(SceneProgram::Environment),
            fullscreen_program_source(FullscreenProgram::Copy),
            fullscreen_program_source(FullscreenProgram::LogLuminance),
            fullscreen_program_source(FullscreenProgram::ToneMapping),
        ];
        for source in &sources {
            assert_eq!(source.matches("@vertex").count(), 1);
            assert_eq!(source.matches("@fragment").count(), 1);
            assert!(source.contains(&format!("fn {VERTEX_ENTRY_POINT}(")));
            assert!(source.contains(&format!("fn {FRAGMENT_ENTRY_POINT}(")));
        }
    }

    #[test]
    fn test_light_slot_count_matches_uniforms() {
        assert!(SCENE_COMMON_WGSL.contains(&format!("const MAX_LIGHTS: u32 = {MAX_LIGHTS}u;")));
        assert!(SCENE_COMMON_WGSL.contains(&format!("array<PointLight, {MAX_LIGHTS}>")));
    }

    #[test]
    fn test_scene_shader_handles_every_render_mode() {
        for index in 1..=3 {
            assert!(SCENE_WGSL.contains(&format!("case {index}u")));
        }
        assert!(SCENE_WGSL.contains("default"));
    }

    #[test]
    fn test_log_luminance_uses_epsilon() {
        assert!(LOG_LUMINANCE_WGSL.contains("params.log_epsilon"));
        assert!(TONE_MAPPING_WGSL.contains("params.exposure"));
    }
}
