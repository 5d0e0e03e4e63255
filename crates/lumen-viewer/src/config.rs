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

//! Viewer configuration, read from a RON or JSON file.

use std::fmt;
use std::path::{Path, PathBuf};

use lumen_agents::render_agent::{
    InputSettings, OrchestratorSettings, SceneSettings, SphereTessellation,
};
use lumen_core::luminance::AdaptationSettings;
use lumen_core::renderer::{RenderMode, SurfaceProperties};
use lumen_sdk::{EngineSettings, WindowSettings};
use serde::{Deserialize, Serialize};

/// An error raised while loading or validating a [`ViewerConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The file extension is neither `ron` nor `json`.
    UnsupportedFormat(PathBuf),
    /// The file content did not parse.
    Parse {
        /// The file that failed.
        path: PathBuf,
        /// The parser message.
        message: String,
    },
    /// A value is out of range.
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Could not read '{}': {source}", path.display())
            }
            ConfigError::UnsupportedFormat(path) => write!(
                f,
                "Unsupported config format for '{}', expected .ron or .json",
                path.display()
            ),
            ConfigError::Parse { path, message } => {
                write!(f, "Could not parse '{}': {message}", path.display())
            }
            ConfigError::Invalid { field, reason } => write!(f, "Invalid '{field}': {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The window section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// The window title.
    pub title: String,
    /// Initial width, in logical pixels.
    pub width: u32,
    /// Initial height, in logical pixels.
    pub height: u32,
    /// Wait for vertical blank when presenting.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        let defaults = WindowSettings::default();
        Self {
            title: "Lumen Viewer".to_string(),
            width: defaults.width,
            height: defaults.height,
            vsync: defaults.vsync,
        }
    }
}

/// The camera controls section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// World units moved per key press.
    pub move_step: f32,
    /// Radians of rotation per dragged pixel.
    pub mouse_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        let defaults = InputSettings::default();
        Self {
            move_step: defaults.move_step,
            mouse_sensitivity: defaults.mouse_sensitivity,
        }
    }
}

/// The lit sphere section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    /// Latitude vertex count, poles included. At least 3.
    pub n_theta: u32,
    /// Longitude segment count. At least 2.
    pub n_phi: u32,
    /// Gamma-encoded base color.
    pub base_color: [f32; 3],
    /// Roughness in `[0, 1]`.
    pub roughness: f32,
    /// Metalness in `[0, 1]`.
    pub metalness: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        let tessellation = SceneSettings::default().sphere_tessellation;
        Self {
            n_theta: tessellation.n_theta,
            n_phi: tessellation.n_phi,
            base_color: [0.2, 0.0, 0.0],
            roughness: 0.3,
            metalness: 0.2,
        }
    }
}

/// The whole viewer configuration. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// The window.
    pub window: WindowConfig,
    /// The render mode at startup.
    pub render_mode: RenderMode,
    /// Luminance adaptation tunables.
    pub adaptation: AdaptationSettings,
    /// Camera controls.
    pub controls: ControlsConfig,
    /// The lit sphere.
    pub sphere: SphereConfig,
}

impl ViewerConfig {
    /// Reads and validates a config file. The format follows the extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config = match extension.as_deref() {
            Some("ron") => Self::from_ron(&text),
            Some("json") => Self::from_json(&text),
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
        .map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        config.validate()?;
        log::info!("Loaded config from '{}'", path.display());
        Ok(config)
    }

    fn from_ron(text: &str) -> Result<Self, String> {
        ron::de::from_str(text).map_err(|e| e.to_string())
    }

    fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    /// Rejects values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid(
                "window",
                format!("size must be non-zero, got {}x{}", self.window.width, self.window.height),
            ));
        }
        check_positive("adaptation.time_constant", self.adaptation.time_constant)?;
        check_positive("adaptation.log_epsilon", self.adaptation.log_epsilon)?;
        check_positive("adaptation.key_value", self.adaptation.key_value)?;
        check_positive("controls.move_step", self.controls.move_step)?;
        check_positive("controls.mouse_sensitivity", self.controls.mouse_sensitivity)?;
        if self.sphere.n_theta < 3 {
            return Err(invalid(
                "sphere.n_theta",
                format!("must be at least 3, got {}", self.sphere.n_theta),
            ));
        }
        if self.sphere.n_phi < 2 {
            return Err(invalid(
                "sphere.n_phi",
                format!("must be at least 2, got {}", self.sphere.n_phi),
            ));
        }
        Ok(())
    }

    /// Converts the file layout into engine settings.
    pub fn into_engine_settings(self) -> EngineSettings {
        let scene = SceneSettings {
            sphere_tessellation: SphereTessellation::new(self.sphere.n_theta, self.sphere.n_phi),
            surface: SurfaceProperties::from_srgb(
                self.sphere.base_color,
                self.sphere.roughness,
                self.sphere.metalness,
            ),
            ..Default::default()
        };
        let input = InputSettings {
            move_step: self.controls.move_step,
            mouse_sensitivity: self.controls.mouse_sensitivity,
            ..Default::default()
        };
        EngineSettings {
            window: WindowSettings {
                title: self.window.title,
                width: self.window.width,
                height: self.window.height,
                vsync: self.window.vsync,
            },
            orchestrator: OrchestratorSettings {
                scene,
                input,
                adaptation: self.adaptation,
                render_mode: self.render_mode,
            },
        }
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a finite positive number, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        let settings = config.into_engine_settings();
        assert_eq!(settings.orchestrator, OrchestratorSettings::default());
        assert_eq!(settings.window.title, "Lumen Viewer");
    }

    #[test]
    fn test_partial_ron() {
        let config = ViewerConfig::from_ron(
            "(render_mode: Fresnel, adaptation: (time_constant: 0.5), window: (vsync: false))",
        )
        .unwrap();
        assert_eq!(config.render_mode, RenderMode::Fresnel);
        assert_relative_eq!(config.adaptation.time_constant, 0.5);
        assert_relative_eq!(config.adaptation.key_value, 0.18);
        assert!(!config.window.vsync);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn test_partial_json() {
        let config = ViewerConfig::from_json(
            r#"{ "sphere": { "n_theta": 12, "n_phi": 16 }, "controls": { "move_step": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!((config.sphere.n_theta, config.sphere.n_phi), (12, 16));
        assert_relative_eq!(config.controls.move_step, 0.5);

        let settings = config.into_engine_settings();
        assert_eq!(
            settings.orchestrator.scene.sphere_tessellation,
            SphereTessellation::new(12, 16)
        );
        assert_relative_eq!(settings.orchestrator.input.move_step, 0.5);
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let config = ViewerConfig::from_ron(include_str!("../config/viewer.ron")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_unknown_render_mode_is_a_parse_error() {
        assert!(ViewerConfig::from_json(r#"{ "render_mode": "Wireframe" }"#).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ViewerConfig::default();
        config.adaptation.time_constant = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "adaptation.time_constant",
                ..
            })
        ));

        let mut config = ViewerConfig::default();
        config.sphere.n_phi = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "sphere.n_phi",
                ..
            })
        ));

        let mut config = ViewerConfig::default();
        config.window.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_picks_format_from_extension() {
        let dir = std::env::temp_dir().join(format!("lumen-viewer-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let ron_path = dir.join("viewer.ron");
        std::fs::write(&ron_path, "(render_mode: Ndf)").unwrap();
        assert_eq!(ViewerConfig::load(&ron_path).unwrap().render_mode, RenderMode::Ndf);

        let json_path = dir.join("viewer.JSON");
        std::fs::write(&json_path, r#"{ "render_mode": "Geometry" }"#).unwrap();
        assert_eq!(
            ViewerConfig::load(&json_path).unwrap().render_mode,
            RenderMode::Geometry
        );

        let toml_path = dir.join("viewer.toml");
        std::fs::write(&toml_path, "").unwrap();
        assert!(matches!(
            ViewerConfig::load(&toml_path),
            Err(ConfigError::UnsupportedFormat(_))
        ));

        assert!(matches!(
            ViewerConfig::load(&dir.join("missing.ron")),
            Err(ConfigError::Io { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
