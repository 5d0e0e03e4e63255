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

//! Implements automatic exposure through luminance adaptation.
//!
//! Each frame the HDR scene is reduced to its log-average luminance on the GPU:
//!
//! 1. a bilinear copy into a `2^n` square,
//! 2. `log(luminance + epsilon)` into chain level `0`,
//! 3. `n` bilinear downsamples, each halving the side, down to a single texel,
//! 4. a blocking read of that texel.
//!
//! The measured value is smoothed over time by [`LuminanceAdaptation`] and the
//! smoothed value drives the tone-mapping pass that writes the displayable image.

use std::sync::Arc;

use lumen_core::luminance::{
    exposure_from_log_luminance, AdaptationSettings, LuminanceAdaptation, LuminanceChainLayout,
};
use lumen_core::math::Extent2D;
use lumen_core::renderer::{
    ColorTarget, FullscreenPass, FullscreenProgram, FullscreenUniforms, GraphicsDevice,
    OwnedReadback, OwnedRenderTarget, RenderError, RenderTargetDescriptor, RenderTargetId,
    ResourceError, TextureFormat,
};

/// The format of the square copy and of every chain level.
pub const LUMINANCE_FORMAT: TextureFormat = TextureFormat::Rgba16Float;

/// What one run of the pipeline measured and applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceReport {
    /// The log-average luminance read back this frame.
    pub measured_log_luminance: f32,
    /// The adapted log-luminance after this frame's update.
    pub adapted_log_luminance: f32,
    /// The exposure the tone-mapping pass used.
    pub exposure: f32,
}

/// The GPU resources sized for one viewport.
#[derive(Debug)]
struct LuminanceChain {
    layout: LuminanceChainLayout,
    square: OwnedRenderTarget,
    levels: Vec<OwnedRenderTarget>,
}

impl LuminanceChain {
    fn allocate(
        device: &Arc<dyn GraphicsDevice>,
        layout: LuminanceChainLayout,
    ) -> Result<Self, ResourceError> {
        let square = OwnedRenderTarget::new(
            device,
            &RenderTargetDescriptor::new("Luminance Square", layout.square_size(), LUMINANCE_FORMAT),
        )?;
        let levels = layout
            .level_sizes()
            .enumerate()
            .map(|(level, size)| {
                OwnedRenderTarget::new(
                    device,
                    &RenderTargetDescriptor::new(
                        format!("Luminance Level {level}"),
                        size,
                        LUMINANCE_FORMAT,
                    ),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "Allocated luminance chain: {} levels from {}x{}",
            levels.len(),
            layout.square_size().width,
            layout.square_size().height
        );
        Ok(Self {
            layout,
            square,
            levels,
        })
    }
}

/// Measures, adapts and tone-maps the HDR scene.
#[derive(Debug)]
pub struct LuminanceAdaptationPipeline {
    device: Arc<dyn GraphicsDevice>,
    settings: AdaptationSettings,
    chain: LuminanceChain,
    readback: OwnedReadback,
    adaptation: LuminanceAdaptation,
}

impl LuminanceAdaptationPipeline {
    /// Allocates the chain for `viewport`.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        viewport: Extent2D,
        settings: AdaptationSettings,
    ) -> Result<Self, ResourceError> {
        let chain = LuminanceChain::allocate(&device, LuminanceChainLayout::for_viewport(viewport))?;
        let readback = OwnedReadback::new(&device, Some("Luminance Readback"))?;
        log::info!(
            "Luminance adaptation pipeline created ({} levels, tau = {}s)",
            chain.layout.level_count(),
            settings.time_constant
        );
        Ok(Self {
            device,
            settings,
            chain,
            readback,
            adaptation: LuminanceAdaptation::new(settings.time_constant),
        })
    }

    /// Rebuilds the chain for a new viewport size.
    ///
    /// The chain is only reallocated when its layout changes. The adaptation state is
    /// kept, the scene brightness does not change with the window size. On error the
    /// previous chain is left untouched.
    pub fn resize(&mut self, viewport: Extent2D) -> Result<(), ResourceError> {
        let layout = LuminanceChainLayout::for_viewport(viewport);
        if layout == self.chain.layout {
            return Ok(());
        }
        // The old chain stays in place, and usable, until the new one is complete.
        self.chain = LuminanceChain::allocate(&self.device, layout)?;
        log::info!(
            "Luminance chain rebuilt for {}x{}: {} levels",
            viewport.width,
            viewport.height,
            layout.level_count()
        );
        Ok(())
    }

    /// The current chain layout.
    pub fn layout(&self) -> LuminanceChainLayout {
        self.chain.layout
    }

    /// The tunables in use.
    pub fn settings(&self) -> &AdaptationSettings {
        &self.settings
    }

    /// The adaptation state.
    pub fn adaptation(&self) -> &LuminanceAdaptation {
        &self.adaptation
    }

    /// Runs steps 1 to 4: reduces `hdr` to one texel and reads its log-luminance back.
    ///
    /// Must be called inside a frame.
    pub fn measure(&self, hdr: RenderTargetId) -> Result<f32, RenderError> {
        let chain = &self.chain;
        self.fullscreen(
            "Luminance Square Copy",
            FullscreenProgram::Copy,
            hdr,
            ColorTarget::Offscreen(chain.square.id()),
            FullscreenUniforms::default(),
        )?;

        let first = chain.levels.first().ok_or_else(|| {
            RenderError::ReadbackFailed("luminance chain has no levels".to_string())
        })?;
        self.fullscreen(
            "Log Luminance",
            FullscreenProgram::LogLuminance,
            chain.square.id(),
            ColorTarget::Offscreen(first.id()),
            FullscreenUniforms {
                log_epsilon: self.settings.log_epsilon,
                ..Default::default()
            },
        )?;

        for pair in chain.levels.windows(2) {
            self.fullscreen(
                "Luminance Downsample",
                FullscreenProgram::Copy,
                pair[0].id(),
                ColorTarget::Offscreen(pair[1].id()),
                FullscreenUniforms::default(),
            )?;
        }

        let last = chain.levels.last().unwrap_or(first);
        let texel = self.device.read_texel(last.id(), self.readback.id())?;
        Ok(texel[0])
    }

    /// Runs steps 5 and 6: folds `measured` into the adapted value after `dt` seconds
    /// and tone-maps `hdr` into `output`.
    pub fn apply(
        &mut self,
        hdr: RenderTargetId,
        measured: f32,
        dt: f32,
        output: ColorTarget,
    ) -> Result<LuminanceReport, RenderError> {
        let adapted = self.adaptation.step(measured, dt);
        let exposure = exposure_from_log_luminance(adapted, self.settings.key_value);
        self.fullscreen(
            "Tone Mapping",
            FullscreenProgram::ToneMapping,
            hdr,
            output,
            FullscreenUniforms {
                log_epsilon: self.settings.log_epsilon,
                adapted_log_luminance: adapted,
                exposure,
                _padding: 0.0,
            },
        )?;
        log::trace!("Luminance: measured {measured:.4}, adapted {adapted:.4}, exposure {exposure:.4}");
        Ok(LuminanceReport {
            measured_log_luminance: measured,
            adapted_log_luminance: adapted,
            exposure,
        })
    }

    /// Runs the whole pipeline with a known `dt`.
    pub fn run(
        &mut self,
        hdr: RenderTargetId,
        dt: f32,
        output: ColorTarget,
    ) -> Result<LuminanceReport, RenderError> {
        let measured = self.measure(hdr)?;
        self.apply(hdr, measured, dt, output)
    }

    fn fullscreen(
        &self,
        label: &str,
        program: FullscreenProgram,
        source: RenderTargetId,
        target: ColorTarget,
        uniforms: FullscreenUniforms,
    ) -> Result<(), RenderError> {
        self.device.draw_fullscreen(&FullscreenPass {
            label: label.to_string(),
            program,
            source,
            target,
            uniforms,
        })
    }
}
