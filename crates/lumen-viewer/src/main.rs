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

//! Interactive viewer: a lit sphere under three colored lights, rendered in HDR and
//! tone mapped with automatic luminance adaptation.
//!
//! Usage: `lumen-viewer [config.ron | config.json]`
//!
//! W/S/A/D move, dragging with the left mouse button looks around, 1/2/3 cycle the
//! light intensities and Tab switches between the PBR and debug render modes.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use lumen_sdk::Engine;

use crate::config::ViewerConfig;

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => ViewerConfig::load(&path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => {
            log::info!("No config file given, using defaults");
            ViewerConfig::default()
        }
    };

    Engine::run(config.into_engine_settings())?;
    Ok(())
}
